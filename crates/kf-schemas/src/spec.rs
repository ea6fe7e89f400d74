use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::lenient;

/// Yes/No flag as stored in the persisted spec.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum YesNo {
    Yes,
    #[default]
    No,
}

impl YesNo {
    pub fn from_bool(b: bool) -> Self {
        if b {
            YesNo::Yes
        } else {
            YesNo::No
        }
    }

    pub fn is_yes(self) -> bool {
        self == YesNo::Yes
    }

    pub fn as_str(self) -> &'static str {
        match self {
            YesNo::Yes => "Yes",
            YesNo::No => "No",
        }
    }
}

/// Value of an administrator-defined custom field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum CustomValue {
    Text(String),
    Number(f64),
    YesNo(YesNo),
}

impl std::fmt::Display for CustomValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CustomValue::Text(s) => write!(f, "{s}"),
            CustomValue::Number(n) => write!(f, "{n}"),
            CustomValue::YesNo(y) => write!(f, "{}", y.as_str()),
        }
    }
}

/// Technical configuration of one kiosk.
///
/// The flat fields mirror the procurement form; `extended` is the nested
/// options sheet consumed by pricing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Spec {
    // Display
    pub display_brand: String,
    pub size: String,
    pub resolution: String,
    #[serde(deserialize_with = "lenient::u32_or_zero")]
    pub brightness: u32,
    #[serde(deserialize_with = "lenient::u32_or_zero")]
    pub contrast: u32,

    // Compute
    pub cpu_ram: String,
    pub os: String,

    // Touch
    pub has_touch: YesNo,
    pub touch_type: String,

    // Cosmetics
    pub enclosure_type: String,
    pub color: String,
    pub logo_text: String,

    // Documentation & QA
    pub labels_provided: YesNo,
    pub manual_provided: YesNo,
    pub proof_before_ship: YesNo,
    pub visual_proof: YesNo,
    pub packaging: String,
    pub certifications: String,
    pub origin_country: String,
    pub canadian_wire_colors: YesNo,

    // Substitution & warranty
    pub no_substitutions: YesNo,
    #[serde(deserialize_with = "lenient::u32_or_zero")]
    pub warranty_years: u32,

    // Accessories
    pub camera_model: String,
    pub mic_model: String,
    pub speaker_model: String,
    pub qr_model: String,
    pub badge_printer_model: String,
    pub wall_mount: String,
    /// Grouped peripheral toggles (`mic`, `speaker`, `webcam`, `qr`).
    pub peripherals: Vec<String>,

    /// Values for administrator-defined custom fields, keyed by field key.
    pub custom: BTreeMap<String, CustomValue>,

    pub extended: ExtendedSpec,
}

impl Spec {
    pub fn touch_enabled(&self) -> bool {
        self.has_touch.is_yes()
    }
}

/// Nested options sheet priced by the estimator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtendedSpec {
    pub screen_size: String,
    pub panel_brand_tier: String,
    pub brightness_tier: String,
    pub touch_tech: String,
    pub touch_glass: Vec<String>,

    pub os: String,
    pub cpu: String,
    pub ram: String,
    pub storage: String,
    #[serde(deserialize_with = "lenient::bool_flag")]
    pub gpu_required: bool,

    pub ports: Ports,
    pub peripherals: PeripheralSelection,
    pub enclosure: Enclosure,
    pub software: Software,
    pub warranty: WarrantyOptions,
    pub logistics: Logistics,
    pub certifications: Vec<String>,
}

/// Port counts. `None` means "not specified" and is filled from the
/// catalog's port defaults by the clamp pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Ports {
    #[serde(deserialize_with = "lenient::opt_u32")]
    pub usb2: Option<u32>,
    #[serde(deserialize_with = "lenient::opt_u32")]
    pub usb3: Option<u32>,
    #[serde(deserialize_with = "lenient::opt_u32")]
    pub rj45: Option<u32>,
    #[serde(deserialize_with = "lenient::bool_flag")]
    pub add_second_lan: bool,
    #[serde(deserialize_with = "lenient::opt_u32")]
    pub hdmi_in: Option<u32>,
    #[serde(deserialize_with = "lenient::opt_u32")]
    pub hdmi_out: Option<u32>,
    #[serde(deserialize_with = "lenient::opt_u32")]
    pub serial: Option<u32>,
    #[serde(deserialize_with = "lenient::bool_flag")]
    pub add_second_serial: bool,
    #[serde(deserialize_with = "lenient::opt_u32")]
    pub audio: Option<u32>,
    pub wifi: String,
    pub bluetooth: String,
    #[serde(deserialize_with = "lenient::bool_flag")]
    pub lte_module: bool,
    #[serde(deserialize_with = "lenient::bool_flag")]
    pub gpio_required: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PeripheralSelection {
    pub payment_id: Vec<String>,
    pub printing: Vec<String>,
    pub cameras: Vec<String>,
    pub audio: Vec<String>,
    pub other: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Enclosure {
    pub material: String,
    pub finish: String,
    pub custom_ral: String,
    pub base: String,
    pub ip_rating: String,
    pub branding: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Software {
    pub cms: String,
    #[serde(deserialize_with = "lenient::bool_flag")]
    pub kiosk_lockdown: bool,
}

impl Default for Software {
    fn default() -> Self {
        Self {
            cms: String::new(),
            kiosk_lockdown: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WarrantyOptions {
    #[serde(deserialize_with = "lenient::u32_or_zero")]
    pub years: u32,
    #[serde(deserialize_with = "lenient::bool_flag")]
    pub on_site_service: bool,
    #[serde(deserialize_with = "lenient::u32_or_zero")]
    pub spare_touch_glass: u32,
    #[serde(deserialize_with = "lenient::u32_or_zero")]
    pub spare_power_adapter: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Logistics {
    /// Incoterm (`FOB`, `CIF`, `DDP`, `EXW`, ...).
    pub shipping: String,
    #[serde(deserialize_with = "lenient::bool_flag")]
    pub sample_unit: bool,
}

impl Default for Logistics {
    fn default() -> Self {
        Self {
            shipping: String::new(),
            sample_unit: true,
        }
    }
}
