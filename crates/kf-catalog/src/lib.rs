//! kf-catalog
//!
//! The administrator-editable [`ConstraintCatalog`]: allowed enumerations,
//! numeric floors, documentation policy, custom fields, the estimator price
//! table and declarative compliance rules.
//!
//! Catalogs load as layered YAML over the built-in defaults and are
//! identified by a SHA-256 hash of their canonical JSON.

mod catalog;
mod custom;
mod defaults;
mod load;
mod prices;
mod rules;

pub use catalog::{
    ComputeConstraints, ConstraintCatalog, DisplayConstraints, DocumentationPolicy,
    EnclosureOptions, OptionsCatalog, PeripheralModels, PeripheralOptions, PortDefaults,
    TouchConstraints, WarrantyPolicy,
};
pub use custom::{CustomField, CustomFieldKind};
pub use defaults::{default_extended, default_rules, default_spec, GROUPED_PERIPHERALS};
pub use load::{catalog_hash, load_layered_yaml, load_layered_yaml_from_strings, LoadedCatalog};
pub use prices::{PortUnitPrices, PriceMap, PriceTable, WarrantyUplift};
pub use rules::{FieldRef, RuleCheck, RuleCondition, RuleDomain, RuleSpec};
