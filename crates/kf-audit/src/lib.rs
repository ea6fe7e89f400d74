//! kf-audit
//!
//! Order audit trail.
//!
//! - [`AuditLog`] is the append-only entry list embedded in every order.
//! - [`AuditJournal`] mirrors entries into a JSON Lines file with an optional
//!   SHA-256 hash chain, verifiable with [`verify_journal`].

mod journal;
mod log;

pub use journal::{
    compute_record_hash, verify_journal, verify_journal_str, AuditJournal, JournalRecord,
    VerifyResult,
};
pub use log::{action, AuditEntry, AuditLog};
