//! `key=value` assignments against a spec's persisted JSON shape.

use anyhow::{anyhow, bail, Context, Result};
use kf_schemas::{CustomValue, Spec, YesNo};
use serde_json::Value;

/// Apply `path=value` assignments to a copy of `spec`.
///
/// Paths use the persisted camelCase names, dotted for nesting
/// (`brightness`, `extended.enclosure.ipRating`). `custom.<key>` sets a
/// custom field value. The result is not clamped.
pub fn apply_assignments(spec: &Spec, assignments: &[String]) -> Result<Spec> {
    let mut doc = serde_json::to_value(spec).context("serialize spec failed")?;
    for raw in assignments {
        let (path, value) = raw
            .split_once('=')
            .with_context(|| format!("expected path=value, got {raw:?}"))?;
        let path = path.trim();
        if let Some(key) = path.strip_prefix("custom.") {
            set_custom(&mut doc, key, value)?;
        } else {
            set_path(&mut doc, path, value)?;
        }
    }
    serde_json::from_value(doc).context("spec does not accept these values")
}

fn set_path(doc: &mut Value, path: &str, raw: &str) -> Result<()> {
    let mut slot = &mut *doc;
    for part in path.split('.') {
        slot = slot
            .get_mut(part)
            .ok_or_else(|| anyhow!("unknown spec field: {path}"))?;
    }
    *slot = typed_like(slot, raw).with_context(|| format!("bad value for {path}"))?;
    Ok(())
}

/// Parse `raw` into the JSON type the field already holds.
fn typed_like(current: &Value, raw: &str) -> Result<Value> {
    let raw = raw.trim();
    Ok(match current {
        Value::String(_) => Value::String(raw.to_string()),
        Value::Bool(_) => Value::Bool(parse_bool(raw)?),
        Value::Number(_) => {
            let n: u64 = raw.parse().with_context(|| format!("not a number: {raw}"))?;
            Value::from(n)
        }
        Value::Array(_) => {
            if raw.starts_with('[') {
                serde_json::from_str(raw).context("invalid JSON list")?
            } else {
                Value::Array(
                    raw.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(|s| Value::String(s.to_string()))
                        .collect(),
                )
            }
        }
        Value::Null => {
            if raw.is_empty() {
                Value::Null
            } else {
                serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
            }
        }
        Value::Object(_) => serde_json::from_str(raw).context("invalid JSON object")?,
    })
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        other => bail!("not a boolean: {other}"),
    }
}

fn set_custom(doc: &mut Value, key: &str, raw: &str) -> Result<()> {
    let raw = raw.trim();
    let value = match raw {
        "Yes" => CustomValue::YesNo(YesNo::Yes),
        "No" => CustomValue::YesNo(YesNo::No),
        _ => match raw.parse::<f64>() {
            Ok(n) if n.is_finite() => CustomValue::Number(n),
            _ => CustomValue::Text(raw.to_string()),
        },
    };
    let custom = doc
        .get_mut("custom")
        .and_then(Value::as_object_mut)
        .context("spec has no custom section")?;
    custom.insert(
        key.to_string(),
        serde_json::to_value(value).context("serialize custom value failed")?,
    );
    Ok(())
}
