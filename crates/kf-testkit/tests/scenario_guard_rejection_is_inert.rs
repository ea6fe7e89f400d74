//! Scenario: rejected commands change nothing
//!
//! # Invariants under test
//!
//! 1. GenerateQuote with compliance warnings is refused before any oracle
//!    is consulted, and the refusal lists the warnings.
//! 2. A command from the wrong status leaves status, audit, quote and
//!    `updatedAt` exactly as they were.
//! 3. Spec edits are refused once a quote has been sent.

use std::sync::Arc;

use kf_engine::{Command, GuardViolation};
use kf_schemas::OrderStatus;
use kf_testkit::{memory_engine, name_client, ScriptedOracle};

#[tokio::test]
async fn warnings_block_quote_before_pricing() {
    let oracle = ScriptedOracle::new(vec![]);
    let mut e = memory_engine(Arc::new(oracle.clone()));
    name_client(&mut e);
    e.edit_spec(|s| s.extended.ports.hdmi_out = Some(0)).unwrap();
    assert_eq!(e.warnings().len(), 1);
    let before = e.current().clone();

    match e.generate_quote().await {
        Err(GuardViolation::NotQuotable { warnings }) => {
            assert_eq!(
                warnings,
                vec!["At least one HDMI output is required for the video signal path"]
            );
        }
        other => panic!("expected NotQuotable, got {other:?}"),
    }
    assert_eq!(oracle.calls(), 0);
    assert_eq!(e.current(), &before);
}

#[tokio::test]
async fn ceo_approve_from_intake_is_refused_without_side_effects() {
    let mut e = memory_engine(Arc::new(ScriptedOracle::new(vec![])));
    name_client(&mut e);
    let before = e.current().clone();

    let err = e.ceo_approve("CEO", "looks fine").unwrap_err();
    assert_eq!(
        err,
        GuardViolation::WrongStatus {
            command: Command::CeoApprove,
            actual: OrderStatus::Intake
        }
    );
    assert_eq!(
        err.to_string(),
        "CEOApprove requires status CLIENT_ACCEPTED (current: INTAKE)"
    );
    assert_eq!(e.current(), &before);

    assert!(e.client_accept(None).is_err());
    assert!(e.place_vendor_order("Acme", "", "").is_err());
    assert!(e.update_fulfillment(Default::default()).is_err());
    assert_eq!(e.current(), &before);
}

#[tokio::test]
async fn spec_is_locked_after_quote() {
    let mut e = memory_engine(Arc::new(kf_pricing::LocalHeuristicOracle));
    name_client(&mut e);
    e.generate_quote().await.unwrap();
    let before = e.current().clone();

    let err = e.edit_spec(|s| s.logo_text = "NEW".to_string()).unwrap_err();
    assert_eq!(
        err,
        GuardViolation::SpecLocked {
            status: OrderStatus::QuoteSent
        }
    );
    assert_eq!(e.current(), &before);
}

#[tokio::test]
async fn vendor_order_needs_a_vendor() {
    let mut e = memory_engine(Arc::new(kf_pricing::LocalHeuristicOracle));
    name_client(&mut e);
    e.generate_quote().await.unwrap();
    e.client_accept(None).unwrap();
    e.ceo_approve("CEO", "").unwrap();
    let before = e.current().clone();

    assert_eq!(
        e.place_vendor_order("   ", "PO-1", ""),
        Err(GuardViolation::VendorMissing)
    );
    assert_eq!(e.current(), &before);
}
