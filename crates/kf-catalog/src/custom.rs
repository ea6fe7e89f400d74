use kf_schemas::{CustomValue, YesNo};
use serde::{Deserialize, Serialize};

/// Administrator-defined extra spec field.
///
/// ```yaml
/// custom_fields:
///   - key: max_ambient_c
///     type: number
///     default: 35
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomField {
    pub key: String,
    #[serde(flatten)]
    pub kind: CustomFieldKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CustomFieldKind {
    Text {
        #[serde(default)]
        default: String,
    },
    Number {
        #[serde(default)]
        default: f64,
    },
    #[serde(rename = "yesno")]
    YesNo {
        #[serde(default)]
        default: YesNo,
    },
}

impl CustomFieldKind {
    pub fn default_value(&self) -> CustomValue {
        match self {
            CustomFieldKind::Text { default } => CustomValue::Text(default.clone()),
            CustomFieldKind::Number { default } => CustomValue::Number(*default),
            CustomFieldKind::YesNo { default } => CustomValue::YesNo(*default),
        }
    }

    /// Coerce a stored value to this field's type; values that cannot be
    /// read as the declared type fall back to the default.
    pub fn coerce(&self, value: Option<&CustomValue>) -> CustomValue {
        match (self, value) {
            (CustomFieldKind::Text { .. }, Some(CustomValue::Text(s))) => {
                CustomValue::Text(s.clone())
            }
            (CustomFieldKind::Text { .. }, Some(CustomValue::Number(n))) => {
                CustomValue::Text(n.to_string())
            }
            (CustomFieldKind::Text { .. }, Some(CustomValue::YesNo(y))) => {
                CustomValue::Text(y.as_str().to_string())
            }
            (CustomFieldKind::Number { .. }, Some(CustomValue::Number(n))) if n.is_finite() => {
                CustomValue::Number(*n)
            }
            (CustomFieldKind::Number { default }, Some(CustomValue::Text(s))) => {
                match s.trim().parse::<f64>() {
                    Ok(n) if n.is_finite() => CustomValue::Number(n),
                    _ => CustomValue::Number(*default),
                }
            }
            (CustomFieldKind::YesNo { .. }, Some(CustomValue::YesNo(y))) => CustomValue::YesNo(*y),
            (CustomFieldKind::YesNo { default }, Some(CustomValue::Text(s))) => {
                match s.trim().to_ascii_lowercase().as_str() {
                    "yes" => CustomValue::YesNo(YesNo::Yes),
                    "no" => CustomValue::YesNo(YesNo::No),
                    _ => CustomValue::YesNo(*default),
                }
            }
            (kind, _) => kind.default_value(),
        }
    }
}
