use anyhow::{bail, Context, Result};
use kf_schemas::Order;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::history::push_client_name;
use crate::repo::OrderRepository;

const LATEST_FILE: &str = "latest_order_id";
const CLIENTS_FILE: &str = "clients.json";

/// Directory-backed repository.
///
/// ```text
/// <root>/orders/<orderId>.json
/// <root>/latest_order_id
/// <root>/clients.json
/// ```
///
/// Files are written to a sibling temp file and renamed into place.
#[derive(Debug, Clone)]
pub struct FileOrderRepository {
    root: PathBuf,
}

impl FileOrderRepository {
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let orders = root.join("orders");
        fs::create_dir_all(&orders)
            .with_context(|| format!("create data dir failed: {}", orders.display()))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn order_path(&self, order_id: &str) -> Result<PathBuf> {
        check_order_id(order_id)?;
        Ok(self.root.join("orders").join(format!("{order_id}.json")))
    }

    /// Per-order audit journal location.
    pub fn journal_path(&self, order_id: &str) -> Result<PathBuf> {
        check_order_id(order_id)?;
        Ok(self.root.join("audit").join(format!("{order_id}.jsonl")))
    }

    /// Every stored order id, sorted.
    pub fn order_ids(&self) -> Result<Vec<String>> {
        let dir = self.root.join("orders");
        let mut ids = Vec::new();
        for entry in fs::read_dir(&dir).with_context(|| format!("list {}", dir.display()))? {
            let path = entry.context("read dir entry")?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    ids.push(stem.to_string());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }
}

/// Ids become file names; keep them to `[A-Za-z0-9_-]`.
pub fn check_order_id(order_id: &str) -> Result<()> {
    let ok = !order_id.is_empty()
        && order_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !ok {
        bail!("order id not usable as a file name: {order_id:?}");
    }
    Ok(())
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, contents).with_context(|| format!("write failed: {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("rename {} -> {} failed", tmp.display(), path.display()))?;
    Ok(())
}

impl OrderRepository for FileOrderRepository {
    fn get(&self, order_id: &str) -> Result<Option<Order>> {
        let path = self.order_path(order_id)?;
        if !path.exists() {
            return Ok(None);
        }
        let raw =
            fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
        let order = serde_json::from_str(&raw)
            .with_context(|| format!("parse stored order {}", path.display()))?;
        Ok(Some(order))
    }

    fn put(&mut self, order: &Order) -> Result<()> {
        let path = self.order_path(&order.order_id)?;
        let json = serde_json::to_string_pretty(order).context("serialize order failed")?;
        write_atomic(&path, &format!("{json}\n"))?;
        write_atomic(&self.root.join(LATEST_FILE), &order.order_id)?;
        debug!(order_id = %order.order_id, status = %order.status, "order written");
        Ok(())
    }

    fn latest_id(&self) -> Result<Option<String>> {
        let path = self.root.join(LATEST_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let raw =
            fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
        let id = raw.trim();
        Ok((!id.is_empty()).then(|| id.to_string()))
    }

    fn client_names(&self) -> Result<Vec<String>> {
        let path = self.root.join(CLIENTS_FILE);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let raw =
            fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))
    }

    fn remember_client(&mut self, name: &str) -> Result<()> {
        let known = self.client_names().unwrap_or_else(|err| {
            warn!(error = %err, "client history unreadable; starting over");
            Vec::new()
        });
        let next = push_client_name(&known, name);
        let json = serde_json::to_string_pretty(&next).context("serialize client names")?;
        write_atomic(&self.root.join(CLIENTS_FILE), &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(id: &str) -> Order {
        serde_json::from_str(&format!(r#"{{"orderId":"{id}"}}"#)).unwrap()
    }

    #[test]
    fn put_get_latest_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut r = FileOrderRepository::open(dir.path()).unwrap();
            r.put(&order("ORD-AAAAAA")).unwrap();
            r.put(&order("ORD-BBBBBB")).unwrap();
            r.remember_client("Acme").unwrap();
            r.remember_client("Harbor").unwrap();
        }
        let r = FileOrderRepository::open(dir.path()).unwrap();
        assert_eq!(r.latest_id().unwrap().as_deref(), Some("ORD-BBBBBB"));
        assert!(r.get("ORD-AAAAAA").unwrap().is_some());
        assert_eq!(r.order_ids().unwrap(), vec!["ORD-AAAAAA", "ORD-BBBBBB"]);
        assert_eq!(r.client_names().unwrap(), vec!["Harbor", "Acme"]);
    }

    #[test]
    fn empty_dir_has_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let r = FileOrderRepository::open(dir.path()).unwrap();
        assert!(r.latest().unwrap().is_none());
        assert!(r.client_names().unwrap().is_empty());
    }

    #[test]
    fn path_like_ids_are_refused() {
        let dir = tempfile::tempdir().unwrap();
        let mut r = FileOrderRepository::open(dir.path()).unwrap();
        assert!(r.put(&order("../escape")).is_err());
        assert!(r.get("a/b").is_err());
    }
}
