//! Declarative compliance rules stored in the catalog.
//!
//! Rules are data: an administrator adds a rule by adding a YAML entry, not
//! by changing code. Evaluation lives in `kf-compliance`.
//!
//! ```yaml
//! rules:
//!   - id: thermal-ambient
//!     domain: thermal
//!     check: ceiling_at
//!     field: custom.max_ambient_c
//!     max: 40
//! ```

use serde::{Deserialize, Serialize};

/// Engineering area a rule belongs to. Used for grouping in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleDomain {
    Client,
    Display,
    Panel,
    Touch,
    Thermal,
    Compute,
    IoSecurity,
    VideoSignal,
    Firmware,
    Documentation,
    Warranty,
    Custom,
}

impl RuleDomain {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleDomain::Client => "client",
            RuleDomain::Display => "display",
            RuleDomain::Panel => "panel",
            RuleDomain::Touch => "touch",
            RuleDomain::Thermal => "thermal",
            RuleDomain::Compute => "compute",
            RuleDomain::IoSecurity => "io_security",
            RuleDomain::VideoSignal => "video_signal",
            RuleDomain::Firmware => "firmware",
            RuleDomain::Documentation => "documentation",
            RuleDomain::Warranty => "warranty",
            RuleDomain::Custom => "custom",
        }
    }
}

/// A path into the order (spec or client) that a rule inspects.
///
/// Serialized as a dotted string: `brightness`, `ext.ports.hdmi_out`,
/// `custom.max_ambient_c`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FieldRef {
    ClientName,
    Company,
    Email,
    DisplayBrand,
    Size,
    Resolution,
    Brightness,
    Contrast,
    CpuRam,
    Os,
    HasTouch,
    TouchType,
    EnclosureType,
    Color,
    LabelsProvided,
    ManualProvided,
    ProofBeforeShip,
    VisualProof,
    Packaging,
    Certifications,
    OriginCountry,
    CanadianWireColors,
    NoSubstitutions,
    WarrantyYears,
    Peripherals,
    ExtScreenSize,
    ExtPanelBrandTier,
    ExtBrightnessTier,
    ExtTouchTech,
    ExtTouchGlass,
    ExtOs,
    ExtCpu,
    ExtRam,
    ExtStorage,
    ExtGpuRequired,
    ExtUsb2,
    ExtUsb3,
    ExtRj45,
    ExtHdmiIn,
    ExtHdmiOut,
    ExtSerial,
    ExtAudio,
    ExtPaymentId,
    ExtPrinting,
    ExtEnclosureMaterial,
    ExtIpRating,
    ExtSoftwareCms,
    ExtWarrantyYears,
    ExtShipping,
    ExtCertifications,
    Custom(String),
}

const NAMED: &[(&str, FieldRef)] = &[
    ("client_name", FieldRef::ClientName),
    ("company", FieldRef::Company),
    ("email", FieldRef::Email),
    ("display_brand", FieldRef::DisplayBrand),
    ("size", FieldRef::Size),
    ("resolution", FieldRef::Resolution),
    ("brightness", FieldRef::Brightness),
    ("contrast", FieldRef::Contrast),
    ("cpu_ram", FieldRef::CpuRam),
    ("os", FieldRef::Os),
    ("has_touch", FieldRef::HasTouch),
    ("touch_type", FieldRef::TouchType),
    ("enclosure_type", FieldRef::EnclosureType),
    ("color", FieldRef::Color),
    ("labels_provided", FieldRef::LabelsProvided),
    ("manual_provided", FieldRef::ManualProvided),
    ("proof_before_ship", FieldRef::ProofBeforeShip),
    ("visual_proof", FieldRef::VisualProof),
    ("packaging", FieldRef::Packaging),
    ("certifications", FieldRef::Certifications),
    ("origin_country", FieldRef::OriginCountry),
    ("canadian_wire_colors", FieldRef::CanadianWireColors),
    ("no_substitutions", FieldRef::NoSubstitutions),
    ("warranty_years", FieldRef::WarrantyYears),
    ("peripherals", FieldRef::Peripherals),
    ("ext.screen_size", FieldRef::ExtScreenSize),
    ("ext.panel_brand_tier", FieldRef::ExtPanelBrandTier),
    ("ext.brightness_tier", FieldRef::ExtBrightnessTier),
    ("ext.touch_tech", FieldRef::ExtTouchTech),
    ("ext.touch_glass", FieldRef::ExtTouchGlass),
    ("ext.os", FieldRef::ExtOs),
    ("ext.cpu", FieldRef::ExtCpu),
    ("ext.ram", FieldRef::ExtRam),
    ("ext.storage", FieldRef::ExtStorage),
    ("ext.gpu_required", FieldRef::ExtGpuRequired),
    ("ext.ports.usb2", FieldRef::ExtUsb2),
    ("ext.ports.usb3", FieldRef::ExtUsb3),
    ("ext.ports.rj45", FieldRef::ExtRj45),
    ("ext.ports.hdmi_in", FieldRef::ExtHdmiIn),
    ("ext.ports.hdmi_out", FieldRef::ExtHdmiOut),
    ("ext.ports.serial", FieldRef::ExtSerial),
    ("ext.ports.audio", FieldRef::ExtAudio),
    ("ext.peripherals.payment_id", FieldRef::ExtPaymentId),
    ("ext.peripherals.printing", FieldRef::ExtPrinting),
    ("ext.enclosure.material", FieldRef::ExtEnclosureMaterial),
    ("ext.enclosure.ip_rating", FieldRef::ExtIpRating),
    ("ext.software.cms", FieldRef::ExtSoftwareCms),
    ("ext.warranty.years", FieldRef::ExtWarrantyYears),
    ("ext.logistics.shipping", FieldRef::ExtShipping),
    ("ext.certifications", FieldRef::ExtCertifications),
];

const CUSTOM_PREFIX: &str = "custom.";

impl FieldRef {
    pub fn path(&self) -> String {
        if let FieldRef::Custom(key) = self {
            return format!("{CUSTOM_PREFIX}{key}");
        }
        NAMED
            .iter()
            .find(|(_, f)| f == self)
            .map(|(name, _)| (*name).to_string())
            .unwrap_or_default()
    }

    /// Human label used in warning messages.
    pub fn label(&self) -> String {
        match self {
            FieldRef::ClientName => "Client name".to_string(),
            FieldRef::Company => "Company".to_string(),
            FieldRef::Email => "Email".to_string(),
            FieldRef::DisplayBrand => "Display brand".to_string(),
            FieldRef::Size => "Display size".to_string(),
            FieldRef::Resolution => "Resolution".to_string(),
            FieldRef::Brightness => "Brightness".to_string(),
            FieldRef::Contrast => "Contrast".to_string(),
            FieldRef::CpuRam => "CPU/RAM".to_string(),
            FieldRef::Os => "OS".to_string(),
            FieldRef::HasTouch => "Touch".to_string(),
            FieldRef::TouchType => "Touch type".to_string(),
            FieldRef::EnclosureType => "Enclosure type".to_string(),
            FieldRef::Color => "Color".to_string(),
            FieldRef::LabelsProvided => "Labels".to_string(),
            FieldRef::ManualProvided => "Manual".to_string(),
            FieldRef::ProofBeforeShip => "Proof before ship".to_string(),
            FieldRef::VisualProof => "Visual proof".to_string(),
            FieldRef::Packaging => "Packaging".to_string(),
            FieldRef::Certifications => "Certifications".to_string(),
            FieldRef::OriginCountry => "Origin country".to_string(),
            FieldRef::CanadianWireColors => "Canadian wiring colors".to_string(),
            FieldRef::NoSubstitutions => "No substitutions".to_string(),
            FieldRef::WarrantyYears => "Warranty years".to_string(),
            FieldRef::Peripherals => "Peripherals".to_string(),
            FieldRef::ExtScreenSize => "Screen size".to_string(),
            FieldRef::ExtPanelBrandTier => "Panel brand tier".to_string(),
            FieldRef::ExtBrightnessTier => "Brightness tier".to_string(),
            FieldRef::ExtTouchTech => "Touch technology".to_string(),
            FieldRef::ExtTouchGlass => "Touch glass".to_string(),
            FieldRef::ExtOs => "Operating system".to_string(),
            FieldRef::ExtCpu => "CPU".to_string(),
            FieldRef::ExtRam => "RAM".to_string(),
            FieldRef::ExtStorage => "Storage".to_string(),
            FieldRef::ExtGpuRequired => "GPU".to_string(),
            FieldRef::ExtUsb2 => "USB 2.0 ports".to_string(),
            FieldRef::ExtUsb3 => "USB 3.0 ports".to_string(),
            FieldRef::ExtRj45 => "RJ45 ports".to_string(),
            FieldRef::ExtHdmiIn => "HDMI inputs".to_string(),
            FieldRef::ExtHdmiOut => "HDMI outputs".to_string(),
            FieldRef::ExtSerial => "Serial ports".to_string(),
            FieldRef::ExtAudio => "Audio ports".to_string(),
            FieldRef::ExtPaymentId => "Payment/ID peripherals".to_string(),
            FieldRef::ExtPrinting => "Printing".to_string(),
            FieldRef::ExtEnclosureMaterial => "Enclosure material".to_string(),
            FieldRef::ExtIpRating => "IP rating".to_string(),
            FieldRef::ExtSoftwareCms => "Software".to_string(),
            FieldRef::ExtWarrantyYears => "Extended warranty years".to_string(),
            FieldRef::ExtShipping => "Shipping term".to_string(),
            FieldRef::ExtCertifications => "Extended certifications".to_string(),
            FieldRef::Custom(key) => key.clone(),
        }
    }
}

impl TryFrom<String> for FieldRef {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        let t = raw.trim();
        if let Some(key) = t.strip_prefix(CUSTOM_PREFIX) {
            if key.is_empty() {
                return Err("custom field reference is missing its key".to_string());
            }
            return Ok(FieldRef::Custom(key.to_string()));
        }
        NAMED
            .iter()
            .find(|(name, _)| *name == t)
            .map(|(_, f)| f.clone())
            .ok_or_else(|| format!("unknown field reference: {t}"))
    }
}

impl From<FieldRef> for String {
    fn from(f: FieldRef) -> Self {
        f.path()
    }
}

impl std::fmt::Display for FieldRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path())
    }
}

/// The predicate a rule asserts about its field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum RuleCheck {
    /// Text value must be one of `allowed`.
    MemberOf { field: FieldRef, allowed: Vec<String> },
    /// Numeric value must be at least `min`.
    FloorAt { field: FieldRef, min: f64 },
    /// Numeric value must be at most `max`.
    CeilingAt { field: FieldRef, max: f64 },
    /// Value must be present and non-blank.
    NonBlank { field: FieldRef },
    /// List value must contain every entry of `values`.
    Requires { field: FieldRef, values: Vec<String> },
}

impl RuleCheck {
    pub fn field(&self) -> &FieldRef {
        match self {
            RuleCheck::MemberOf { field, .. }
            | RuleCheck::FloorAt { field, .. }
            | RuleCheck::CeilingAt { field, .. }
            | RuleCheck::NonBlank { field }
            | RuleCheck::Requires { field, .. } => field,
        }
    }
}

/// Optional guard: the rule applies only when `field` equals `equals`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleCondition {
    pub field: FieldRef,
    pub equals: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSpec {
    pub id: String,
    pub domain: RuleDomain,
    #[serde(flatten)]
    pub check: RuleCheck,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<RuleCondition>,
    /// Overrides the generated warning text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
