use anyhow::Result;
use kf_schemas::Order;

/// Storage the order engine writes through.
///
/// Only the latest write per order id must be retrievable. `latest_id` is an
/// advisory pointer to the most recently written order and may lag.
pub trait OrderRepository: Send {
    fn get(&self, order_id: &str) -> Result<Option<Order>>;

    fn put(&mut self, order: &Order) -> Result<()>;

    fn latest_id(&self) -> Result<Option<String>>;

    /// Recently used client names, most recent first.
    fn client_names(&self) -> Result<Vec<String>>;

    fn remember_client(&mut self, name: &str) -> Result<()>;

    /// The order `latest_id` points at, if both exist.
    fn latest(&self) -> Result<Option<Order>> {
        match self.latest_id()? {
            Some(id) => self.get(&id),
            None => Ok(None),
        }
    }
}
