use anyhow::{bail, Context, Result};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;

use crate::catalog::ConstraintCatalog;

/// Secret-like prefixes. A catalog is shared with clients and vendors, so a
/// leaf string starting with one of these aborts the load with
/// CATALOG_SECRET_DETECTED.
const SECRET_PREFIXES: &[&str] = &[
    "sk-",
    "sk_live",
    "sk_test",
    "AKIA",
    "-----BEGIN",
    "ghp_",
    "gho_",
    "glpat-",
    "xoxb-",
    "xoxp-",
];

#[derive(Debug, Clone)]
pub struct LoadedCatalog {
    pub catalog: ConstraintCatalog,
    /// SHA-256 of `canonical_json`.
    pub catalog_hash: String,
    pub canonical_json: String,
}

pub fn load_layered_yaml(paths: &[&str]) -> Result<LoadedCatalog> {
    let mut docs: Vec<String> = Vec::new();
    for p in paths {
        let raw =
            fs::read_to_string(p).with_context(|| format!("failed to read catalog yaml: {p}"))?;
        docs.push(raw);
    }
    let doc_refs: Vec<&str> = docs.iter().map(|s| s.as_str()).collect();
    load_layered_yaml_from_strings(&doc_refs)
}

/// Merge YAML layers over the built-in default catalog. Later layers win;
/// maps merge key by key, everything else (lists included) is replaced.
pub fn load_layered_yaml_from_strings(yaml_docs: &[&str]) -> Result<LoadedCatalog> {
    let mut merged = serde_json::to_value(ConstraintCatalog::default())
        .context("default catalog serialize failed")?;
    for (i, raw) in yaml_docs.iter().enumerate() {
        let v_yaml: serde_yaml::Value = serde_yaml::from_str(raw)
            .with_context(|| format!("invalid catalog yaml (layer {i})"))?;
        if v_yaml.is_null() {
            continue;
        }
        let v_json = serde_json::to_value(v_yaml).context("yaml->json conversion failed")?;
        merged = deep_merge(merged, v_json);
    }

    enforce_no_secret_literals(&merged)?;

    let catalog: ConstraintCatalog =
        serde_json::from_value(merged).context("catalog does not match the expected shape")?;
    let canonical_json = canonical_json(&catalog)?;
    let catalog_hash = sha256_hex(canonical_json.as_bytes());
    Ok(LoadedCatalog {
        catalog,
        catalog_hash,
        canonical_json,
    })
}

/// Stable identity of a catalog: SHA-256 over its key-sorted JSON.
pub fn catalog_hash(catalog: &ConstraintCatalog) -> Result<String> {
    Ok(sha256_hex(canonical_json(catalog)?.as_bytes()))
}

fn deep_merge(a: Value, b: Value) -> Value {
    match (a, b) {
        (Value::Object(mut a_map), Value::Object(b_map)) => {
            for (k, b_val) in b_map {
                let a_val = a_map.remove(&k).unwrap_or(Value::Null);
                a_map.insert(k, deep_merge(a_val, b_val));
            }
            Value::Object(a_map)
        }
        (_, b_other) => b_other,
    }
}

fn canonical_json(catalog: &ConstraintCatalog) -> Result<String> {
    let v = serde_json::to_value(catalog).context("catalog serialize failed")?;
    serde_json::to_string(&sort_keys(v)).context("canonical json serialize failed")
}

fn sort_keys(v: Value) -> Value {
    match v {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut out = serde_json::Map::new();
            for (k, v) in entries {
                out.insert(k, sort_keys(v));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

fn enforce_no_secret_literals(v: &Value) -> Result<()> {
    let mut leaves = Vec::new();
    collect_string_leaves(v, "", &mut leaves);
    for (ptr, s) in leaves {
        if looks_like_secret(s) {
            bail!("CATALOG_SECRET_DETECTED leaf={} value=REDACTED", ptr);
        }
    }
    Ok(())
}

fn collect_string_leaves<'a>(v: &'a Value, prefix: &str, out: &mut Vec<(String, &'a str)>) {
    match v {
        Value::Object(map) => {
            for (k, vv) in map {
                let next = format!("{}/{}", prefix, k.replace('~', "~0").replace('/', "~1"));
                collect_string_leaves(vv, &next, out);
            }
        }
        Value::Array(arr) => {
            for (i, vv) in arr.iter().enumerate() {
                collect_string_leaves(vv, &format!("{prefix}/{i}"), out);
            }
        }
        Value::String(s) => out.push((prefix.to_string(), s.as_str())),
        _ => {}
    }
}

fn looks_like_secret(s: &str) -> bool {
    let t = s.trim();
    if t.len() < 8 {
        return false;
    }
    SECRET_PREFIXES.iter().any(|p| t.starts_with(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deep_merge_replaces_lists_and_merges_maps() {
        let a = serde_json::json!({"display": {"allowed_brands": ["LG"], "min_brightness": 400}});
        let b = serde_json::json!({"display": {"allowed_brands": ["Sharp"]}});
        let m = deep_merge(a, b);
        assert_eq!(m["display"]["allowed_brands"], serde_json::json!(["Sharp"]));
        assert_eq!(m["display"]["min_brightness"], 400);
    }

    #[test]
    fn short_strings_are_never_secrets() {
        assert!(!looks_like_secret("sk-1"));
        assert!(looks_like_secret("sk_live_abcdefgh"));
    }
}
