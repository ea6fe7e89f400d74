//! kf-testkit
//!
//! Shared fixtures for cross-crate scenario tests: a scripted price oracle,
//! a repository that can be told to fail, a stepping clock, and helpers that
//! drive an order through the lifecycle.

use anyhow::{bail, Result};
use chrono::{DateTime, Duration, TimeZone, Utc};
use kf_catalog::ConstraintCatalog;
use kf_engine::{Clock, FulfillmentUpdate, GuardViolation, OrderEngine};
use kf_pricing::{OracleError, PriceOracle};
use kf_schemas::{Estimator, LineItem, Money, Order, Quote, Spec};
use kf_store::{InMemoryOrderRepository, OrderRepository};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const CLIENT_NAME: &str = "Harbor Transit";

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 4, 1, 9, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// Each call returns the previous value plus `step`, starting at `start + step`.
pub fn stepping_clock(start: DateTime<Utc>, step: Duration) -> Clock {
    let now = Mutex::new(start);
    Arc::new(move || {
        let mut g = match now.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        *g += step;
        *g
    })
}

/// A clock stuck at one instant.
pub fn frozen_clock(at: DateTime<Utc>) -> Clock {
    Arc::new(move || at)
}

/// A vendor-shaped quote with a single line.
pub fn vendor_quote(total_units: i64) -> Quote {
    Quote::from_lines(
        Estimator::Vendor,
        "USD",
        vec![LineItem::single("Vendor kiosk build", Money::units(total_units))],
        Money::ZERO,
        Money::ZERO,
        vec!["scripted".to_string()],
    )
}

// ---------------------------------------------------------------------------
// ScriptedOracle
// ---------------------------------------------------------------------------

/// Oracle that replays a fixed script of results and counts calls.
/// An exhausted script answers with a transport error.
#[derive(Clone, Default)]
pub struct ScriptedOracle {
    script: Arc<Mutex<VecDeque<Result<Quote, OracleError>>>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedOracle {
    pub fn new(script: Vec<Result<Quote, OracleError>>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into())),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl PriceOracle for ScriptedOracle {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn estimate(
        &self,
        _spec: &Spec,
        _catalog: &ConstraintCatalog,
    ) -> Result<Quote, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = match self.script.lock() {
            Ok(mut g) => g.pop_front(),
            Err(poisoned) => poisoned.into_inner().pop_front(),
        };
        next.unwrap_or_else(|| Err(OracleError::Transport("script exhausted".to_string())))
    }
}

// ---------------------------------------------------------------------------
// FlakyRepository
// ---------------------------------------------------------------------------

/// In-memory repository whose writes fail while the shared switch is on.
#[derive(Default)]
pub struct FlakyRepository {
    inner: InMemoryOrderRepository,
    failing: Arc<AtomicBool>,
    failed_writes: Arc<AtomicUsize>,
}

/// Handle for flipping a [`FlakyRepository`] from outside the engine.
#[derive(Clone)]
pub struct FlakySwitch {
    failing: Arc<AtomicBool>,
    failed_writes: Arc<AtomicUsize>,
}

impl FlakySwitch {
    pub fn set_failing(&self, on: bool) {
        self.failing.store(on, Ordering::SeqCst);
    }

    pub fn failed_writes(&self) -> usize {
        self.failed_writes.load(Ordering::SeqCst)
    }
}

impl FlakyRepository {
    pub fn with_switch() -> (Self, FlakySwitch) {
        let repo = Self::default();
        let switch = FlakySwitch {
            failing: Arc::clone(&repo.failing),
            failed_writes: Arc::clone(&repo.failed_writes),
        };
        (repo, switch)
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            self.failed_writes.fetch_add(1, Ordering::SeqCst);
            bail!("storage unavailable");
        }
        Ok(())
    }
}

impl OrderRepository for FlakyRepository {
    fn get(&self, order_id: &str) -> Result<Option<Order>> {
        self.inner.get(order_id)
    }

    fn put(&mut self, order: &Order) -> Result<()> {
        self.check()?;
        self.inner.put(order)
    }

    fn latest_id(&self) -> Result<Option<String>> {
        self.inner.latest_id()
    }

    fn client_names(&self) -> Result<Vec<String>> {
        self.inner.client_names()
    }

    fn remember_client(&mut self, name: &str) -> Result<()> {
        self.check()?;
        self.inner.remember_client(name)
    }
}

// ---------------------------------------------------------------------------
// Engine helpers
// ---------------------------------------------------------------------------

/// Engine over a fresh in-memory repository with a stepping clock.
pub fn memory_engine(oracle: Arc<dyn PriceOracle>) -> OrderEngine<InMemoryOrderRepository> {
    OrderEngine::open(
        InMemoryOrderRepository::new(),
        ConstraintCatalog::default(),
        oracle,
    )
    .with_clock(stepping_clock(t0(), Duration::seconds(1)))
}

/// Name the client so the default spec is quotable.
pub fn name_client<R: OrderRepository>(engine: &mut OrderEngine<R>) {
    engine.edit_client(|c| c.client_name = CLIENT_NAME.to_string());
}

/// Drive the current order from INTAKE to CLOSED through every stage.
pub async fn drive_to_closed<R: OrderRepository>(
    engine: &mut OrderEngine<R>,
) -> Result<(), GuardViolation> {
    name_client(engine);
    engine.begin_spec_review()?;
    engine.generate_quote().await?;
    engine.client_accept(None)?;
    engine.ceo_approve("CEO", "approved")?;
    engine.place_vendor_order("Shenzhen Display Co", "PO-1001", "")?;
    engine.update_fulfillment(FulfillmentUpdate {
        tracking: "1Z999".to_string(),
        carrier: "UPS".to_string(),
        ..Default::default()
    })?;
    engine.update_fulfillment(FulfillmentUpdate {
        delivered_at: Some(t0() + Duration::days(10)),
        ..Default::default()
    })?;
    Ok(())
}
