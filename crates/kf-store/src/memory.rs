use anyhow::Result;
use kf_schemas::Order;
use std::collections::BTreeMap;

use crate::history::push_client_name;
use crate::repo::OrderRepository;

/// Process-local repository. Used by tests and by sessions without a data dir.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderRepository {
    orders: BTreeMap<String, Order>,
    latest: Option<String>,
    clients: Vec<String>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

impl OrderRepository for InMemoryOrderRepository {
    fn get(&self, order_id: &str) -> Result<Option<Order>> {
        Ok(self.orders.get(order_id).cloned())
    }

    fn put(&mut self, order: &Order) -> Result<()> {
        self.orders.insert(order.order_id.clone(), order.clone());
        self.latest = Some(order.order_id.clone());
        Ok(())
    }

    fn latest_id(&self) -> Result<Option<String>> {
        Ok(self.latest.clone())
    }

    fn client_names(&self) -> Result<Vec<String>> {
        Ok(self.clients.clone())
    }

    fn remember_client(&mut self, name: &str) -> Result<()> {
        self.clients = push_client_name(&self.clients, name);
        Ok(())
    }
}
