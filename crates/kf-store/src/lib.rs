//! kf-store
//!
//! Order persistence behind [`OrderRepository`], plus export/import of the
//! persisted order shape and the recent-client-name history.

mod file;
mod history;
mod memory;
mod repo;
mod transfer;

pub use file::{check_order_id, FileOrderRepository};
pub use history::{push_client_name, CLIENT_HISTORY_CAP};
pub use memory::InMemoryOrderRepository;
pub use repo::OrderRepository;
pub use transfer::{export_order, import_order, ImportError};
