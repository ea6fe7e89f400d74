//! Order engine: one current order, commands run to completion.
//!
//! The engine owns the current [`Order`], the loaded catalog, a price oracle
//! and a repository. Each command computes the next order from the current
//! one and only then commits it: swap in memory, then persist and mirror the
//! new audit entries. Persistence and journal writes are best-effort; a
//! failure is logged and the in-memory order stays authoritative.

use anyhow::Result;
use chrono::{DateTime, Utc};
use kf_audit::AuditJournal;
use kf_catalog::ConstraintCatalog;
use kf_compliance::{clamp, validate, Warning};
use kf_pricing::{estimate_local, PriceOracle};
use kf_schemas::{Client, Order, Payment, Spec};
use kf_store::{check_order_id, export_order, import_order, ImportError, OrderRepository};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::machine::{
    advance_clock, check_quotable, check_spec_editable, new_order, reset_order, transition,
    FulfillmentUpdate, GuardViolation, OrderEvent,
};
use crate::summary::order_summary;

/// Source of "now". Swappable so tests can step time.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// `ORD-` followed by six uppercase alphanumerics.
pub fn new_order_id() -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    let tail: String = hex.chars().take(6).collect();
    format!("ORD-{}", tail.to_uppercase())
}

/// Where audit entries are mirrored, one JSONL file per order.
#[derive(Debug, Clone)]
pub struct JournalConfig {
    pub dir: PathBuf,
    pub hash_chain: bool,
}

pub struct OrderEngine<R: OrderRepository> {
    repo: R,
    catalog: ConstraintCatalog,
    oracle: Arc<dyn PriceOracle>,
    journal: Option<JournalConfig>,
    clock: Clock,
    actor: String,
    current: Order,
}

impl<R: OrderRepository> OrderEngine<R> {
    /// Resume the repository's latest order, or start a new one.
    pub fn open(repo: R, catalog: ConstraintCatalog, oracle: Arc<dyn PriceOracle>) -> Self {
        let clock: Clock = Arc::new(Utc::now);
        let resumed = match repo.latest() {
            Ok(found) => found,
            Err(err) => {
                warn!(error = %err, "could not load latest order; starting fresh");
                None
            }
        };
        let fresh = resumed.is_none();
        let current = match resumed {
            Some(mut o) => {
                o.spec = clamp(&o.spec, &catalog);
                o
            }
            None => new_order(&catalog, new_order_id(), "system", clock()),
        };
        let mut engine = Self {
            repo,
            catalog,
            oracle,
            journal: None,
            clock,
            actor: "system".to_string(),
            current,
        };
        if fresh {
            engine.persist();
        }
        engine
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Mirror audit entries into `journal.dir`. A current order with no
    /// journal file yet gets its whole audit log written first.
    pub fn with_journal(mut self, journal: JournalConfig) -> Self {
        let fresh = self
            .journal_path(&journal)
            .is_ok_and(|path| !path.exists());
        self.journal = Some(journal);
        if fresh {
            self.mirror(self.current.audit.entries().to_vec());
        }
        self
    }

    /// Actor recorded in audit entries for commands that do not name one.
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = actor.into();
        self
    }

    // -----------------------------------------------------------------------
    // Read side
    // -----------------------------------------------------------------------

    pub fn current(&self) -> &Order {
        &self.current
    }

    pub fn catalog(&self) -> &ConstraintCatalog {
        &self.catalog
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Live compliance warnings for the current spec and client.
    pub fn warnings(&self) -> Vec<Warning> {
        validate(&self.current.spec, &self.catalog, &self.current.client)
    }

    pub fn summary(&self) -> String {
        order_summary(&self.current, &self.catalog)
    }

    pub fn export(&self) -> Result<String> {
        export_order(&self.current)
    }

    pub fn client_names(&self) -> Vec<String> {
        self.repo.client_names().unwrap_or_else(|err| {
            warn!(error = %err, "client history unavailable");
            Vec::new()
        })
    }

    // -----------------------------------------------------------------------
    // Lifecycle commands
    // -----------------------------------------------------------------------

    pub fn start_new_order(&mut self) -> &Order {
        let at = (self.clock)();
        let order = new_order(&self.catalog, new_order_id(), &self.actor, at);
        info!(order_id = %order.order_id, "order created");
        self.commit(order)
    }

    pub fn begin_spec_review(&mut self) -> Result<&Order, GuardViolation> {
        self.apply(OrderEvent::BeginSpecReview)
    }

    /// Price the current spec and send the quote.
    ///
    /// The guard runs before any oracle is consulted. An oracle error falls
    /// back to the local price table, so pricing itself never blocks.
    pub async fn generate_quote(&mut self) -> Result<&Order, GuardViolation> {
        check_quotable(&self.current, &self.catalog)?;
        let quote = match self.oracle.estimate(&self.current.spec, &self.catalog).await {
            Ok(q) => q,
            Err(err) => {
                warn!(
                    oracle = self.oracle.name(),
                    error = %err,
                    "price oracle failed; using local price table"
                );
                estimate_local(&self.current.spec.extended, &self.catalog)
            }
        };
        self.apply(OrderEvent::QuoteGenerated { quote })
    }

    pub fn client_accept(&mut self, accepted_by: Option<&str>) -> Result<&Order, GuardViolation> {
        self.apply(OrderEvent::ClientAccepted {
            accepted_by: accepted_by.map(str::to_string),
        })
    }

    pub fn ceo_approve(
        &mut self,
        approved_by: &str,
        comment: &str,
    ) -> Result<&Order, GuardViolation> {
        self.apply(OrderEvent::CeoApproved {
            approved_by: approved_by.to_string(),
            comment: comment.to_string(),
        })
    }

    pub fn place_vendor_order(
        &mut self,
        vendor: &str,
        po_number: &str,
        link: &str,
    ) -> Result<&Order, GuardViolation> {
        self.apply(OrderEvent::VendorOrderPlaced {
            vendor: vendor.to_string(),
            po_number: po_number.to_string(),
            link: link.to_string(),
        })
    }

    pub fn update_fulfillment(
        &mut self,
        update: FulfillmentUpdate,
    ) -> Result<&Order, GuardViolation> {
        self.apply(OrderEvent::FulfillmentUpdated(update))
    }

    /// Catalog defaults under the current id; audit restarts at `ORDER_RESET`.
    pub fn full_reset(&mut self) -> &Order {
        let at = (self.clock)();
        let next = reset_order(&self.current, &self.catalog, &self.actor, at);
        info!(order_id = %next.order_id, "order reset");
        self.commit(next)
    }

    // -----------------------------------------------------------------------
    // Edits (not transitions: no audit entry)
    // -----------------------------------------------------------------------

    /// Edit the spec; the result is clamped against the catalog.
    pub fn edit_spec(&mut self, edit: impl FnOnce(&mut Spec)) -> Result<&Order, GuardViolation> {
        check_spec_editable(&self.current)?;
        let mut next = self.current.clone();
        edit(&mut next.spec);
        next.spec = clamp(&next.spec, &self.catalog);
        next.updated_at = advance_clock(next.updated_at, (self.clock)());
        Ok(self.commit(next))
    }

    pub fn edit_client(&mut self, edit: impl FnOnce(&mut Client)) -> &Order {
        let mut next = self.current.clone();
        edit(&mut next.client);
        next.updated_at = advance_clock(next.updated_at, (self.clock)());
        let name = next.client.client_name.clone();
        if !name.trim().is_empty() {
            if let Err(err) = self.repo.remember_client(&name) {
                warn!(error = %err, "client history write failed");
            }
        }
        self.commit(next)
    }

    pub fn edit_payment(&mut self, edit: impl FnOnce(&mut Payment)) -> &Order {
        let mut next = self.current.clone();
        edit(&mut next.payment);
        next.updated_at = advance_clock(next.updated_at, (self.clock)());
        self.commit(next)
    }

    // -----------------------------------------------------------------------
    // Catalog and transfer
    // -----------------------------------------------------------------------

    /// Swap the catalog and re-clamp the current spec against it.
    pub fn replace_catalog(&mut self, catalog: ConstraintCatalog) -> &Order {
        self.catalog = catalog;
        let clamped = clamp(&self.current.spec, &self.catalog);
        if clamped == self.current.spec {
            return &self.current;
        }
        let mut next = self.current.clone();
        next.spec = clamped;
        next.updated_at = advance_clock(next.updated_at, (self.clock)());
        info!(order_id = %next.order_id, "spec re-clamped after catalog change");
        self.commit(next)
    }

    /// Replace the current order with an imported one. On error nothing
    /// changes.
    pub fn import(&mut self, raw: &str) -> Result<&Order, ImportError> {
        let order = import_order(raw, &self.catalog, (self.clock)())?;
        info!(order_id = %order.order_id, status = %order.status, "order imported");
        Ok(self.commit(order))
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn apply(&mut self, event: OrderEvent) -> Result<&Order, GuardViolation> {
        let command = event.command();
        let at = (self.clock)();
        match transition(&self.current, event, &self.actor, at) {
            Ok(next) => {
                info!(
                    order_id = %next.order_id,
                    command = %command,
                    status = %next.status,
                    "transition"
                );
                Ok(self.commit(next))
            }
            Err(violation) => {
                info!(
                    order_id = %self.current.order_id,
                    command = %command,
                    reason = %violation,
                    "command rejected"
                );
                Err(violation)
            }
        }
    }

    fn commit(&mut self, next: Order) -> &Order {
        let mirrored = self.new_entries(&next);
        self.current = next;
        self.persist();
        self.mirror(mirrored);
        &self.current
    }

    /// Audit entries in `next` that the journal has not seen.
    fn new_entries(&self, next: &Order) -> Vec<kf_schemas::AuditEntry> {
        let same_order = next.order_id == self.current.order_id;
        let prev = &self.current.audit;
        let extends = same_order
            && next.audit.len() >= prev.len()
            && next.audit.entries()[..prev.len()] == *prev.entries();
        let skip = if extends { prev.len() } else { 0 };
        next.audit.entries()[skip..].to_vec()
    }

    fn persist(&mut self) {
        if let Err(err) = self.repo.put(&self.current) {
            warn!(order_id = %self.current.order_id, error = %err, "order persist failed");
        }
    }

    fn journal_path(&self, cfg: &JournalConfig) -> Result<PathBuf> {
        let id = &self.current.order_id;
        check_order_id(id)?;
        Ok(cfg.dir.join(format!("{id}.jsonl")))
    }

    fn mirror(&self, entries: Vec<kf_schemas::AuditEntry>) {
        let Some(cfg) = &self.journal else {
            return;
        };
        if entries.is_empty() {
            return;
        }
        let result = self.journal_path(cfg).and_then(|path| {
            let mut j = AuditJournal::open(&path, cfg.hash_chain)?;
            for e in &entries {
                j.append(&self.current.order_id, e)?;
            }
            Ok(())
        });
        if let Err(err) = result {
            warn!(
                order_id = %self.current.order_id,
                error = %err,
                "audit journal write failed"
            );
        }
    }
}
