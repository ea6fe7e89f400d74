use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::AuditEntry;

/// Append-only JSONL mirror of an order's audit entries (one record per line).
/// Optional hash chain: each record carries hash_prev + hash_self.
pub struct AuditJournal {
    path: PathBuf,
    hash_chain: bool,
    last_hash: Option<String>,
    seq: u64,
}

impl AuditJournal {
    /// Opens (or creates) a journal and restores the chain tip from the last
    /// line already on disk, so appends after a restart keep chaining.
    pub fn open(path: impl AsRef<Path>, hash_chain: bool) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create_dir_all {:?}", parent))?;
        }

        let mut journal = Self {
            path,
            hash_chain,
            last_hash: None,
            seq: 0,
        };

        if journal.path.exists() {
            let content = fs::read_to_string(&journal.path)
                .with_context(|| format!("read audit journal {:?}", journal.path))?;
            for (i, line) in content.lines().enumerate() {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let rec: JournalRecord = serde_json::from_str(trimmed)
                    .with_context(|| format!("parse journal record at line {}", i + 1))?;
                journal.seq = rec.seq + 1;
                journal.last_hash = rec.hash_self;
            }
        }

        Ok(journal)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn last_hash(&self) -> Option<String> {
        self.last_hash.clone()
    }

    /// Number of records written so far (the next record's seq).
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Append one audit entry for `order_id`.
    pub fn append(&mut self, order_id: &str, entry: &AuditEntry) -> Result<JournalRecord> {
        let mut rec = JournalRecord {
            seq: self.seq,
            order_id: order_id.to_string(),
            at: entry.at,
            by: entry.by.clone(),
            action: entry.action.clone(),
            detail: entry.detail.clone(),
            hash_prev: None,
            hash_self: None,
        };

        if self.hash_chain {
            rec.hash_prev = self.last_hash.clone();
            let self_hash = compute_record_hash(&rec)?;
            rec.hash_self = Some(self_hash.clone());
            self.last_hash = Some(self_hash);
        }

        let line = canonical_json_line(&rec)?;
        append_line(&self.path, &line)?;
        self.seq += 1;

        Ok(rec)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalRecord {
    pub seq: u64,
    pub order_id: String,
    pub at: DateTime<Utc>,
    pub by: String,
    pub action: String,
    pub detail: Option<String>,
    pub hash_prev: Option<String>,
    pub hash_self: Option<String>,
}

fn append_line(path: &Path, line: &str) -> Result<()> {
    let mut f = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open audit journal {:?}", path))?;
    f.write_all(line.as_bytes())
        .context("write journal line failed")?;
    f.write_all(b"\n").context("write newline failed")?;
    Ok(())
}

/// Canonicalize by sorting keys recursively and emitting compact JSON.
fn canonical_json_line<T: Serialize>(v: &T) -> Result<String> {
    let raw = serde_json::to_value(v).context("serialize journal record failed")?;
    let sorted = sort_keys(&raw);
    serde_json::to_string(&sorted).context("json stringify failed")
}

fn sort_keys(v: &Value) -> Value {
    match v {
        Value::Object(map) => {
            let mut keys: Vec<_> = map.keys().cloned().collect();
            keys.sort();
            let mut new = serde_json::Map::new();
            for k in keys {
                new.insert(k.clone(), sort_keys(&map[&k]));
            }
            Value::Object(new)
        }
        Value::Array(arr) => Value::Array(arr.iter().map(sort_keys).collect()),
        _ => v.clone(),
    }
}

/// Hash of the canonical JSON of a record WITHOUT hash_self.
pub fn compute_record_hash(rec: &JournalRecord) -> Result<String> {
    let mut clone = rec.clone();
    clone.hash_self = None;

    let canonical = canonical_json_line(&clone)?;
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Verify the hash chain of a journal file.
pub fn verify_journal(path: impl AsRef<Path>) -> Result<VerifyResult> {
    let content = fs::read_to_string(path.as_ref())
        .with_context(|| format!("read audit journal {:?}", path.as_ref()))?;
    verify_journal_str(&content)
}

/// Same as [`verify_journal`] over in-memory JSONL content.
pub fn verify_journal_str(content: &str) -> Result<VerifyResult> {
    let mut prev_hash: Option<String> = None;
    let mut line_count = 0usize;

    for (i, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let rec: JournalRecord = serde_json::from_str(trimmed)
            .with_context(|| format!("parse journal record at line {}", i + 1))?;

        line_count += 1;

        if rec.hash_prev != prev_hash {
            return Ok(VerifyResult::Broken {
                line: i + 1,
                reason: format!(
                    "hash_prev mismatch: expected {:?}, got {:?}",
                    prev_hash, rec.hash_prev
                ),
            });
        }

        if let Some(ref claimed_hash) = rec.hash_self {
            let recomputed = compute_record_hash(&rec)?;
            if *claimed_hash != recomputed {
                return Ok(VerifyResult::Broken {
                    line: i + 1,
                    reason: format!(
                        "hash_self mismatch: claimed {}, recomputed {}",
                        claimed_hash, recomputed
                    ),
                });
            }
        }

        prev_hash = rec.hash_self.clone();
    }

    Ok(VerifyResult::Valid { lines: line_count })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyResult {
    Valid { lines: usize },
    Broken { line: usize, reason: String },
}
