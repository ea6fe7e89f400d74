//! Scenario: storage outage
//!
//! # Invariants under test
//!
//! 1. A failing repository never blocks a transition; the in-memory order
//!    stays authoritative.
//! 2. Once storage recovers, the next committed change persists the full
//!    current order.

use std::sync::Arc;

use kf_catalog::ConstraintCatalog;
use kf_engine::OrderEngine;
use kf_pricing::LocalHeuristicOracle;
use kf_schemas::OrderStatus;
use kf_store::OrderRepository;
use kf_testkit::{name_client, stepping_clock, t0, FlakyRepository};

#[tokio::test]
async fn transitions_proceed_while_storage_is_down() {
    let (repo, switch) = FlakyRepository::with_switch();
    let mut e = OrderEngine::open(
        repo,
        ConstraintCatalog::default(),
        Arc::new(LocalHeuristicOracle),
    )
    .with_clock(stepping_clock(t0(), chrono::Duration::seconds(1)));
    let id = e.current().order_id.clone();

    switch.set_failing(true);
    name_client(&mut e);
    e.begin_spec_review().unwrap();
    e.generate_quote().await.unwrap();
    assert_eq!(e.current().status, OrderStatus::QuoteSent);
    assert!(switch.failed_writes() >= 3);

    let stored = e.repository().get(&id).unwrap().unwrap();
    assert_eq!(stored.status, OrderStatus::Intake);

    switch.set_failing(false);
    e.client_accept(None).unwrap();
    let stored = e.repository().get(&id).unwrap().unwrap();
    assert_eq!(&stored, e.current());
    assert_eq!(stored.audit.len(), 4);
}
