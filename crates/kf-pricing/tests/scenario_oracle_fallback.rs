//! Scenario: remote price oracles degrade to the local price table
//!
//! # Invariants under test
//!
//! 1. A well-formed vendor answer becomes a `vendor` quote with the vendor's totals.
//! 2. Non-2xx, malformed bodies and timeouts are `OracleError`s from the remote leg.
//! 3. Behind `FallbackOracle` every one of those failures yields the local quote,
//!    byte-identical to `estimate_local`.
//! 4. The SKU backend receives the touch kit only when touch is enabled.
//!
//! HTTP is served by `httpmock`; nothing leaves the machine.

use httpmock::prelude::*;
use kf_catalog::{default_spec, ConstraintCatalog};
use kf_pricing::{
    estimate_local, FallbackOracle, OracleError, PriceOracle, RemoteOracle, SkuPricingOracle,
};
use kf_schemas::{Estimator, Money, Spec, YesNo};
use serde_json::json;
use std::time::Duration;

fn fixture() -> (ConstraintCatalog, Spec) {
    let c = ConstraintCatalog::default();
    let s = default_spec(&c);
    (c, s)
}

#[tokio::test]
async fn vendor_quote_is_taken_verbatim() {
    let server = MockServer::start_async().await;
    let m = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/vendor/estimate")
                .body_contains("\"screenSize\"");
            then.status(200).json_body(json!({
                "currency": "USD",
                "subtotal": 2100.0,
                "shipping": 150.0,
                "tax": 0.0,
                "total": 2250.0,
                "lineItems": [{"label": "Vendor kiosk build", "amount": 2100.0}]
            }));
        })
        .await;

    let (c, s) = fixture();
    let oracle = RemoteOracle::new_with_base_url(server.base_url());
    let q = oracle.estimate(&s, &c).await.unwrap();
    m.assert_async().await;

    assert_eq!(q.estimator, Estimator::Vendor);
    assert_eq!(q.total, Money::units(2250));
    assert_eq!(q.line_items.len(), 1);
    assert_eq!(q.line_items[0].qty, 1);
}

#[tokio::test]
async fn server_error_is_reported_and_recovered() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/vendor/estimate");
            then.status(500).body("estimator down");
        })
        .await;

    let (c, s) = fixture();
    let remote = RemoteOracle::new_with_base_url(server.base_url());
    let err = remote.estimate(&s, &c).await.unwrap_err();
    assert!(matches!(err, OracleError::Status { code: 500, .. }), "{err}");

    let oracle = FallbackOracle::with_local(Box::new(remote));
    let q = oracle.estimate(&s, &c).await.unwrap();
    assert_eq!(q, estimate_local(&s.extended, &c));
}

#[tokio::test]
async fn malformed_body_falls_back() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/vendor/estimate");
            then.status(200)
                .json_body(json!({"currency": "USD", "subtotal": "lots"}));
        })
        .await;

    let (c, s) = fixture();
    let remote = RemoteOracle::new_with_base_url(server.base_url());
    assert!(matches!(
        remote.estimate(&s, &c).await,
        Err(OracleError::Decode(_))
    ));

    let q = FallbackOracle::with_local(Box::new(remote))
        .estimate(&s, &c)
        .await
        .unwrap();
    assert_eq!(q.estimator, Estimator::Local);
}

#[tokio::test]
async fn slow_vendor_times_out_and_falls_back() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/vendor/estimate");
            then.status(200)
                .delay(Duration::from_millis(500))
                .json_body(json!({
                    "currency": "USD", "subtotal": 1.0, "shipping": 0.0, "tax": 0.0, "total": 1.0
                }));
        })
        .await;

    let (c, s) = fixture();
    let remote = RemoteOracle::with_timeout(server.base_url(), Duration::from_millis(50));
    let err = remote.estimate(&s, &c).await.unwrap_err();
    assert!(matches!(err, OracleError::Timeout { after_ms: 50 }), "{err}");

    let q = FallbackOracle::with_local(Box::new(remote))
        .estimate(&s, &c)
        .await
        .unwrap();
    assert_eq!(q.estimator, Estimator::Local);
}

#[tokio::test]
async fn unreachable_vendor_falls_back() {
    let (c, s) = fixture();
    // Port 9 (discard) on localhost: connection refused.
    let remote = RemoteOracle::with_timeout(
        "http://127.0.0.1:9".to_string(),
        Duration::from_millis(500),
    );
    let q = FallbackOracle::with_local(Box::new(remote))
        .estimate(&s, &c)
        .await
        .unwrap();
    assert_eq!(q, estimate_local(&s.extended, &c));
}

#[tokio::test]
async fn sku_backend_prices_the_selection() {
    let server = MockServer::start_async().await;
    let m = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/pricing")
                .body_contains("TOUCH-KIT-PCAP");
            then.status(200).json_body(json!({
                "subtotal": 1499.0,
                "shipping_total": 60.0,
                "tax_total": 0.0,
                "grand_total": 1559.0
            }));
        })
        .await;

    let (c, mut s) = fixture();
    s.has_touch = YesNo::Yes;
    let q = SkuPricingOracle::new_with_base_url(server.base_url())
        .estimate(&s, &c)
        .await
        .unwrap();
    m.assert_async().await;

    assert_eq!(q.estimator, Estimator::Sku);
    assert_eq!(q.shipping, Money::units(60));
    assert_eq!(q.total, Money::units(1559));
    assert_eq!(
        q.line_items[0].label,
        "SKU Selection (DISP-24-TOUCH, PC-NUC-I5, TOUCH-KIT-PCAP)"
    );
}

#[tokio::test]
async fn local_estimate_is_deterministic() {
    let (c, s) = fixture();
    let a = serde_json::to_vec(&estimate_local(&s.extended, &c)).unwrap();
    let b = serde_json::to_vec(&estimate_local(&s.extended, &c)).unwrap();
    assert_eq!(a, b);
}
