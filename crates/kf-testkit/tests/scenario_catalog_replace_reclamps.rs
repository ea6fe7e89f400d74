//! Scenario: catalog replaced under a live order
//!
//! # Invariants under test
//!
//! 1. Replacing the catalog re-clamps the current spec against the new one.
//! 2. Validation and pricing use the new catalog immediately.
//! 3. A replacement that changes nothing in the spec leaves the order as is.

use std::sync::Arc;

use kf_catalog::{load_layered_yaml_from_strings, ConstraintCatalog};
use kf_pricing::LocalHeuristicOracle;
use kf_testkit::{memory_engine, name_client};

const NARROW: &str = r#"
display:
  allowed_brands: ["Samsung"]
  min_brightness: 700
"#;

#[tokio::test]
async fn narrowed_catalog_reclamps_and_reprices() {
    let mut e = memory_engine(Arc::new(LocalHeuristicOracle));
    name_client(&mut e);
    let before = e.current().updated_at;

    let narrow = load_layered_yaml_from_strings(&[NARROW]).unwrap().catalog;
    let o = e.replace_catalog(narrow);
    assert_eq!(o.spec.display_brand, "Samsung");
    assert_eq!(o.spec.brightness, 700);
    assert!(o.updated_at > before);
    assert_eq!(o.audit.len(), 1);
    assert!(e.warnings().is_empty());

    e.generate_quote().await.unwrap();
    assert_eq!(e.catalog().display.min_brightness, 700);
}

#[test]
fn identical_catalog_is_a_no_op() {
    let mut e = memory_engine(Arc::new(LocalHeuristicOracle));
    let before = e.current().clone();
    e.replace_catalog(ConstraintCatalog::default());
    assert_eq!(e.current(), &before);
}
