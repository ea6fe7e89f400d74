//! Order export / import.
//!
//! Export writes the persisted order shape verbatim. Import is lenient about
//! shape (older exports leave sections out or store amounts as strings) but
//! strict about identity: no `orderId`, no import, and the id must be usable
//! as a file name.

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use kf_audit::action;
use kf_catalog::ConstraintCatalog;
use kf_compliance::clamp;
use kf_schemas::{AuditEntry, AuditLog, Order};
use serde_json::{Map, Value};
use std::fmt;

use crate::file::check_order_id;

/// Why an import was refused. The current order is never touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    /// Not JSON, not an object, or a section of the wrong type.
    Malformed(String),
    MissingOrderId,
    /// Status claims a stage whose records are absent.
    Inconsistent(String),
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportError::Malformed(msg) => write!(f, "import malformed: {msg}"),
            ImportError::MissingOrderId => write!(f, "import malformed: orderId is missing"),
            ImportError::Inconsistent(msg) => write!(f, "import inconsistent: {msg}"),
        }
    }
}

impl std::error::Error for ImportError {}

/// Pretty JSON of the persisted order shape.
pub fn export_order(order: &Order) -> Result<String> {
    serde_json::to_string_pretty(order).context("serialize order for export failed")
}

/// Parse, normalize and clamp an exported order against `catalog`.
///
/// Missing sections are filled (status `INTAKE`, blank credit-card payment,
/// timestamps `now`); quote amounts given as strings are coerced; an order
/// arriving with no audit history is seeded with `ORDER_NORMALIZED`.
pub fn import_order(
    raw: &str,
    catalog: &ConstraintCatalog,
    now: DateTime<Utc>,
) -> Result<Order, ImportError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| ImportError::Malformed(e.to_string()))?;
    let Value::Object(mut obj) = value else {
        return Err(ImportError::Malformed("expected a JSON object".to_string()));
    };

    let has_id = obj
        .get("orderId")
        .and_then(Value::as_str)
        .is_some_and(|s| !s.trim().is_empty());
    if !has_id {
        return Err(ImportError::MissingOrderId);
    }

    normalize(&mut obj, now);

    let mut order: Order = serde_json::from_value(Value::Object(obj))
        .map_err(|e| ImportError::Malformed(e.to_string()))?;
    order.order_id = order.order_id.trim().to_string();
    check_order_id(&order.order_id).map_err(|e| ImportError::Malformed(e.to_string()))?;

    if order.audit.is_empty() {
        order.audit = AuditLog::seeded(AuditEntry::new(
            now,
            "system",
            action::ORDER_NORMALIZED,
            Some("imported without audit history".to_string()),
        ));
    }
    order.check_consistency().map_err(ImportError::Inconsistent)?;

    order.spec = clamp(&order.spec, catalog);
    Ok(order)
}

const NON_NULL_SECTIONS: &[&str] = &["status", "client", "spec", "payment", "audit"];
const QUOTE_AMOUNTS: &[&str] = &["subtotal", "shipping", "tax", "total"];

fn normalize(obj: &mut Map<String, Value>, now: DateTime<Utc>) {
    for key in NON_NULL_SECTIONS {
        if obj.get(*key).is_some_and(Value::is_null) {
            obj.remove(*key);
        }
    }
    let stamp = now.to_rfc3339_opts(SecondsFormat::Millis, true);
    for key in ["createdAt", "updatedAt"] {
        let usable = obj
            .get(key)
            .and_then(Value::as_str)
            .is_some_and(|s| DateTime::parse_from_rfc3339(s).is_ok());
        if !usable {
            obj.insert(key.to_string(), Value::String(stamp.clone()));
        }
    }
    if let Some(Value::Object(quote)) = obj.get_mut("quote") {
        normalize_quote(quote);
    }
}

fn normalize_quote(q: &mut Map<String, Value>) {
    for key in QUOTE_AMOUNTS {
        coerce_number(q, key);
    }
    if !q.get("estimator").is_some_and(Value::is_string) {
        q.insert("estimator".to_string(), Value::String("local".to_string()));
    }
    if !q.get("currency").is_some_and(Value::is_string) {
        q.insert("currency".to_string(), Value::String("USD".to_string()));
    }
    if let Some(Value::Array(lines)) = q.get_mut("lineItems") {
        for line in lines.iter_mut() {
            if let Value::Object(l) = line {
                coerce_number(l, "amount");
                if !l.get("qty").is_some_and(Value::is_u64) {
                    l.insert("qty".to_string(), Value::from(1u32));
                }
                if !l.contains_key("total") {
                    let amount = l.get("amount").and_then(Value::as_f64).unwrap_or(0.0);
                    let qty = l.get("qty").and_then(Value::as_f64).unwrap_or(1.0);
                    l.insert("total".to_string(), number(amount * qty));
                } else {
                    coerce_number(l, "total");
                }
            }
        }
    }
}

/// Numbers stay, numeric strings parse, anything else becomes 0.
fn coerce_number(map: &mut Map<String, Value>, key: &str) {
    let n = match map.get(key) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    map.insert(key.to_string(), number(n));
}

fn number(n: f64) -> Value {
    serde_json::Number::from_f64(n)
        .map(Value::Number)
        .unwrap_or_else(|| Value::from(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use kf_schemas::{Money, OrderStatus, PaymentMethod};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, 9, 30, 0).unwrap()
    }

    #[test]
    fn missing_id_is_refused() {
        let c = ConstraintCatalog::default();
        assert_eq!(
            import_order(r#"{"status":"INTAKE"}"#, &c, now()),
            Err(ImportError::MissingOrderId)
        );
        assert_eq!(
            import_order(r#"{"orderId":"  "}"#, &c, now()),
            Err(ImportError::MissingOrderId)
        );
    }

    #[test]
    fn garbage_is_malformed() {
        let c = ConstraintCatalog::default();
        assert!(matches!(
            import_order("{not json", &c, now()),
            Err(ImportError::Malformed(_))
        ));
        assert!(matches!(
            import_order("[1,2]", &c, now()),
            Err(ImportError::Malformed(_))
        ));
        assert!(matches!(
            import_order(r#"{"orderId":"ORD-X","status":"LOST"}"#, &c, now()),
            Err(ImportError::Malformed(_))
        ));
    }

    #[test]
    fn path_like_ids_are_malformed() {
        let c = ConstraintCatalog::default();
        for id in ["../../escaped", "a/b", "ORD 1", "..", "ORD-\\x"] {
            let raw = serde_json::json!({ "orderId": id }).to_string();
            let err = import_order(&raw, &c, now()).unwrap_err();
            assert!(matches!(err, ImportError::Malformed(_)), "{id}: {err}");
        }
        // surrounding whitespace is trimmed, not refused
        let o = import_order(r#"{"orderId":"  ORD-OK_01 "}"#, &c, now()).unwrap();
        assert_eq!(o.order_id, "ORD-OK_01");
    }

    #[test]
    fn sparse_order_is_normalized() {
        let c = ConstraintCatalog::default();
        let o = import_order(
            r#"{"orderId":"ORD-OLD001","payment":null,"client":{"clientName":"Acme"}}"#,
            &c,
            now(),
        )
        .unwrap();
        assert_eq!(o.status, OrderStatus::Intake);
        assert_eq!(o.payment.method, PaymentMethod::CreditCard);
        assert_eq!(o.created_at, now());
        assert_eq!(o.audit.len(), 1);
        assert_eq!(o.audit.entries()[0].action, "ORDER_NORMALIZED");
        // clamped against the catalog
        assert_eq!(o.spec.display_brand, "LG");
    }

    #[test]
    fn string_amounts_in_quote_are_coerced() {
        let c = ConstraintCatalog::default();
        let raw = r#"{
            "orderId":"ORD-OLD002","status":"QUOTE_SENT",
            "quote":{"subtotal":"1220.00","shipping":"0","tax":null,"total":"1220",
                     "lineItems":[{"label":"Panel","amount":"800"}]}
        }"#;
        let o = import_order(raw, &c, now()).unwrap();
        let q = o.quote.unwrap();
        assert_eq!(q.total, Money::units(1220));
        assert_eq!(q.tax, Money::ZERO);
        assert_eq!(q.line_items[0].qty, 1);
        assert_eq!(q.line_items[0].total, Money::units(800));
    }

    #[test]
    fn status_without_records_is_inconsistent() {
        let c = ConstraintCatalog::default();
        let err = import_order(r#"{"orderId":"ORD-X","status":"CEO_APPROVED"}"#, &c, now())
            .unwrap_err();
        assert!(matches!(err, ImportError::Inconsistent(_)), "{err}");
    }
}
