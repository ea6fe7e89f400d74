use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Action tags written by the order lifecycle.
pub mod action {
    pub const ORDER_CREATED: &str = "ORDER_CREATED";
    pub const ORDER_NORMALIZED: &str = "ORDER_NORMALIZED";
    pub const ORDER_RESET: &str = "ORDER_RESET";
    pub const SPEC_REVIEW_STARTED: &str = "SPEC_REVIEW_STARTED";
    pub const QUOTE_GENERATED: &str = "QUOTE_GENERATED";
    pub const CLIENT_ACCEPTED: &str = "CLIENT_ACCEPTED";
    pub const CEO_APPROVED: &str = "CEO_APPROVED";
    pub const VENDOR_ORDER_PLACED: &str = "VENDOR_ORDER_PLACED";
    pub const FULFILLMENT_UPDATE: &str = "FULFILLMENT_UPDATE";
    pub const DELIVERED: &str = "DELIVERED";
}

/// One immutable record of an action against an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub at: DateTime<Utc>,
    pub by: String,
    pub action: String,
    #[serde(default)]
    pub detail: Option<String>,
}

impl AuditEntry {
    pub fn new(
        at: DateTime<Utc>,
        by: impl Into<String>,
        action: impl Into<String>,
        detail: Option<String>,
    ) -> Self {
        Self {
            at,
            by: by.into(),
            action: action.into(),
            detail,
        }
    }
}

/// Append-only audit log.
///
/// There is no way to edit or remove a single entry. The only way to shrink
/// the log is [`AuditLog::reset`], which backs the explicit full-order reset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditLog {
    entries: Vec<AuditEntry>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A log holding exactly one seed entry.
    pub fn seeded(entry: AuditEntry) -> Self {
        Self {
            entries: vec![entry],
        }
    }

    pub fn append(&mut self, entry: AuditEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&AuditEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry and start over from `seed`.
    pub fn reset(&mut self, seed: AuditEntry) {
        self.entries.clear();
        self.entries.push(seed);
    }
}
