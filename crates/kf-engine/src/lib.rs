//! kf-engine
//!
//! The order lifecycle: a pure transition function over [`kf_schemas::Order`]
//! and the [`OrderEngine`] that drives it against a repository, a price
//! oracle and an optional audit journal.

mod engine;
mod machine;
mod summary;

pub use engine::{new_order_id, Clock, JournalConfig, OrderEngine};
pub use machine::{
    advance_clock, check_quotable, check_spec_editable, new_order, reset_order, transition,
    Command, FulfillmentUpdate, GuardViolation, OrderEvent,
};
pub use summary::order_summary;
