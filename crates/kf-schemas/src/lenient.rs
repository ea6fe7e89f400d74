//! Tolerant field decoders for imported orders.
//!
//! Older exports stored numbers as strings (`"brightness": "450"`). These
//! decoders accept numbers or numeric strings and map anything else to the
//! field's "unset" value so the clamp pass can repair it.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

fn as_u32(v: &Value) -> Option<u32> {
    match v {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .map(|n| n.min(u32::MAX as u64) as u32),
        Value::String(s) => s.trim().parse::<f64>().ok().and_then(|f| {
            if f.is_finite() && f >= 0.0 {
                Some(f.min(u32::MAX as f64) as u32)
            } else {
                None
            }
        }),
        _ => None,
    }
}

pub fn u32_or_zero<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(as_u32(&v).unwrap_or(0))
}

pub fn opt_u32<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(as_u32(&v))
}

pub fn bool_flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(match v {
        Value::Bool(b) => b,
        Value::String(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "yes" | "true"),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "u32_or_zero")]
        a: u32,
        #[serde(default, deserialize_with = "opt_u32")]
        b: Option<u32>,
        #[serde(default, deserialize_with = "bool_flag")]
        c: bool,
    }

    #[test]
    fn numeric_strings_are_accepted() {
        let p: Probe = serde_json::from_str(r#"{"a":"450","b":"3","c":"Yes"}"#).unwrap();
        assert_eq!(p.a, 450);
        assert_eq!(p.b, Some(3));
        assert!(p.c);
    }

    #[test]
    fn garbage_maps_to_unset() {
        let p: Probe = serde_json::from_str(r#"{"a":"bright","b":-2,"c":null}"#).unwrap();
        assert_eq!(p.a, 0);
        assert_eq!(p.b, None);
        assert!(!p.c);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let p: Probe = serde_json::from_str("{}").unwrap();
        assert_eq!(p.a, 0);
        assert_eq!(p.b, None);
        assert!(!p.c);
    }
}
