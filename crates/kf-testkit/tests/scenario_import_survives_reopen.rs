//! Scenario: import through the engine into a file repository
//!
//! # Invariants under test
//!
//! 1. An accepted import is stored, becomes the latest order and is what a
//!    reopened engine resumes.
//! 2. The imported audit history is mirrored into the order's journal.
//! 3. An import whose id is not a safe file name is refused: the current
//!    order, the stored orders and the latest pointer are untouched, and no
//!    file is written outside the data directory.

use std::path::Path;
use std::sync::Arc;

use kf_audit::{verify_journal, VerifyResult};
use kf_catalog::ConstraintCatalog;
use kf_engine::{JournalConfig, OrderEngine};
use kf_pricing::LocalHeuristicOracle;
use kf_schemas::OrderStatus;
use kf_store::{FileOrderRepository, ImportError, OrderRepository};
use kf_testkit::{stepping_clock, t0};

fn open_engine(root: &Path) -> OrderEngine<FileOrderRepository> {
    let repo = FileOrderRepository::open(root).unwrap();
    OrderEngine::open(repo, ConstraintCatalog::default(), Arc::new(LocalHeuristicOracle))
        .with_clock(stepping_clock(t0(), chrono::Duration::seconds(1)))
        .with_journal(JournalConfig {
            dir: root.join("audit"),
            hash_chain: true,
        })
}

#[test]
fn accepted_import_is_stored_and_resumed() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("data");
    {
        let mut e = open_engine(&root);
        let o = e
            .import(r#"{"orderId":"ORD-IMP001","client":{"clientName":"Acme Rail"}}"#)
            .unwrap();
        assert_eq!(o.order_id, "ORD-IMP001");

        let stored = e.repository().get("ORD-IMP001").unwrap().unwrap();
        assert_eq!(stored.client.client_name, "Acme Rail");
        assert_eq!(
            e.repository().latest_id().unwrap().as_deref(),
            Some("ORD-IMP001")
        );
        assert_eq!(
            verify_journal(e.repository().journal_path("ORD-IMP001").unwrap()).unwrap(),
            VerifyResult::Valid { lines: 1 }
        );
    }

    let e = open_engine(&root);
    assert_eq!(e.current().order_id, "ORD-IMP001");
    assert_eq!(e.current().status, OrderStatus::Intake);
    assert_eq!(e.current().audit.entries()[0].action, "ORDER_NORMALIZED");
}

#[test]
fn path_like_import_id_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("data");
    let mut e = open_engine(&root);
    let before = e.current().clone();
    let ids_before = e.repository().order_ids().unwrap();

    let err = e.import(r#"{"orderId":"../../escaped"}"#).unwrap_err();
    assert!(matches!(err, ImportError::Malformed(_)), "{err}");

    assert_eq!(e.current(), &before);
    assert_eq!(e.repository().order_ids().unwrap(), ids_before);
    assert_eq!(
        e.repository().latest_id().unwrap().as_deref(),
        Some(before.order_id.as_str())
    );
    assert!(!dir.path().join("escaped.jsonl").exists());
    assert!(!dir.path().join("escaped.json").exists());

    drop(e);
    let e = open_engine(&root);
    assert_eq!(e.current().order_id, before.order_id);
}
