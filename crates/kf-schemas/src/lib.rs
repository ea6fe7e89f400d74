//! kf-schemas
//!
//! Persisted data model of a kiosk order: the [`Order`] aggregate, its
//! technical [`Spec`], the [`Quote`] snapshot and the fixed-point [`Money`]
//! type. Serde field names follow the persisted/exported camelCase shape.

mod lenient;
mod money;
mod order;
mod quote;
mod spec;

pub use kf_audit::{AuditEntry, AuditLog};
pub use money::{Money, MICROS_SCALE};
pub use order::{
    CeoApproval, Client, ClientAcceptance, Fulfillment, Order, OrderStatus, Payment,
    PaymentMethod, VendorOrder,
};
pub use quote::{Estimator, LineItem, Quote};
pub use spec::{
    CustomValue, Enclosure, ExtendedSpec, Logistics, PeripheralSelection, Ports, Software, Spec,
    WarrantyOptions, YesNo,
};
