//! kf-compliance
//!
//! Spec reconciliation and compliance checking against a
//! [`kf_catalog::ConstraintCatalog`].
//!
//! - [`clamp`] repairs a spec through a declarative per-field policy table.
//! - [`validate`] evaluates base and catalog rules into ordered warnings.
//!
//! Deterministic, pure logic. No IO, no time.

mod clamp;
mod field;
mod validate;

pub use clamp::{clamp, policy_table, ClampField, ClampPolicy, Pinned};
pub use field::{resolve, FieldValue};
pub use validate::{base_rules, evaluate, validate, Warning};

/// True when the spec may be priced: no compliance warnings at all.
pub fn is_quotable(
    spec: &kf_schemas::Spec,
    catalog: &kf_catalog::ConstraintCatalog,
    client: &kf_schemas::Client,
) -> bool {
    validate(spec, catalog, client).is_empty()
}
