use serde::{Deserialize, Serialize};

use crate::custom::CustomField;
use crate::prices::PriceTable;
use crate::rules::RuleSpec;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

/// Administrator-editable constraint catalog.
///
/// Every field has a built-in default, so a YAML layer only needs to carry
/// the keys it overrides. Lists replace wholesale on merge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstraintCatalog {
    pub org_name: String,
    pub display: DisplayConstraints,
    pub compute: ComputeConstraints,
    pub touch: TouchConstraints,
    pub peripherals: PeripheralModels,
    pub docs: DocumentationPolicy,
    pub warranty: WarrantyPolicy,
    pub custom_fields: Vec<CustomField>,
    pub options: OptionsCatalog,
    pub prices: PriceTable,
    pub rules: Vec<RuleSpec>,
}

impl ConstraintCatalog {
    pub fn custom_field(&self, key: &str) -> Option<&CustomField> {
        self.custom_fields.iter().find(|f| f.key == key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConstraints {
    pub allowed_brands: Vec<String>,
    pub size_options: Vec<String>,
    pub resolution_options: Vec<String>,
    pub min_brightness: u32,
    pub min_contrast: u32,
}

impl Default for DisplayConstraints {
    fn default() -> Self {
        Self {
            allowed_brands: strings(&["LG", "Samsung"]),
            size_options: strings(&[
                "32-inch", "43-inch", "49-inch", "55-inch", "65-inch", "75-inch",
            ]),
            resolution_options: strings(&["FHD (1920x1080)", "UHD (3840x2160)"]),
            min_brightness: 400,
            min_contrast: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComputeConstraints {
    pub cpu_options: Vec<String>,
    pub os_options: Vec<String>,
}

impl Default for ComputeConstraints {
    fn default() -> Self {
        Self {
            cpu_options: strings(&["i5 / 16GB / 512GB", "i7 / 32GB / 1TB"]),
            os_options: strings(&["Windows 11 Pro", "Ubuntu 22.04 LTS"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TouchConstraints {
    pub types: Vec<String>,
}

impl Default for TouchConstraints {
    fn default() -> Self {
        Self {
            types: strings(&["PCAP", "IR"]),
        }
    }
}

/// Approved accessory models for the procurement form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeripheralModels {
    pub cameras: Vec<String>,
    pub mics: Vec<String>,
    pub speakers: Vec<String>,
    pub qr_scanners: Vec<String>,
    pub badge_printers: Vec<String>,
    pub wall_mounts: Vec<String>,
}

impl Default for PeripheralModels {
    fn default() -> Self {
        Self {
            cameras: strings(&["Logitech Brio 4K"]),
            mics: strings(&["Shure MV5C"]),
            speakers: strings(&["Logitech Z207"]),
            qr_scanners: strings(&["Zebra DS2208"]),
            badge_printers: strings(&["Zebra ZD421"]),
            wall_mounts: strings(&["VESA 400x400"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentationPolicy {
    pub labels: bool,
    pub manual: bool,
    pub proof_before_ship: bool,
    pub visual_proof: bool,
    pub packaging_options: Vec<String>,
    pub certifications: Vec<String>,
    pub require_canadian_wiring_colors: bool,
}

impl Default for DocumentationPolicy {
    fn default() -> Self {
        Self {
            labels: true,
            manual: true,
            proof_before_ship: true,
            visual_proof: true,
            packaging_options: strings(&["Basic Box", "Retail Box", "Flight Case"]),
            certifications: strings(&["FCC", "CE", "UL"]),
            require_canadian_wiring_colors: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarrantyPolicy {
    pub no_substitutions: bool,
    /// Minimum warranty term; specs asking for less are raised to it.
    pub years: u32,
}

impl Default for WarrantyPolicy {
    fn default() -> Self {
        Self {
            no_substitutions: true,
            years: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortDefaults {
    pub usb2: u32,
    pub usb3: u32,
    pub rj45: u32,
    pub hdmi_in: u32,
    pub hdmi_out: u32,
    pub serial: u32,
    pub audio: u32,
    pub wifi: String,
    pub bluetooth: String,
}

impl Default for PortDefaults {
    fn default() -> Self {
        Self {
            usb2: 2,
            usb3: 2,
            rj45: 1,
            hdmi_in: 1,
            hdmi_out: 1,
            serial: 1,
            audio: 1,
            wifi: "Dual-band (2.4/5GHz)".to_string(),
            bluetooth: "5.0".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeripheralOptions {
    pub payment_id: Vec<String>,
    pub printing: Vec<String>,
    pub cameras: Vec<String>,
    pub audio: Vec<String>,
    pub other: Vec<String>,
}

impl Default for PeripheralOptions {
    fn default() -> Self {
        Self {
            payment_id: strings(&[
                "RFID (125k/13.56MHz)",
                "NFC Reader",
                "EMV Credit Card Pin Pad",
                "Bill/Coin Acceptor",
                "Barcode/QR Scanner",
                "Face Recognition Camera",
                "Fingerprint Scanner",
            ]),
            printing: strings(&["Thermal 58mm", "Ticket 80mm", "Label Printer"]),
            cameras: strings(&["Internal 2MP", "External 1080p", "5MP", "8MP"]),
            audio: strings(&[
                "Internal Speakers 2x10W",
                "External Speaker Set",
                "Noise-Canceling Mic Array",
            ]),
            other: strings(&["VESA Mount", "External Button Kit", "Keyboard Drawer"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnclosureOptions {
    pub materials: Vec<String>,
    pub finishes: Vec<String>,
    pub base_options: Vec<String>,
    pub ip_ratings: Vec<String>,
    pub branding: Vec<String>,
}

impl Default for EnclosureOptions {
    fn default() -> Self {
        Self {
            materials: strings(&["Aluminum + Steel", "Stainless Steel"]),
            finishes: strings(&[
                "Brushed Silver",
                "Powder-Coated Black",
                "Powder-Coated White",
                "Custom RAL",
            ]),
            base_options: strings(&[
                "Fixed Weighted Base",
                "Motorized Height-Adjustable Stand",
                "Mobile Base (Castors)",
                "Wall Mount",
            ]),
            ip_ratings: strings(&["IP20", "IP54", "IP65"]),
            branding: strings(&["No Logos", "Silkscreen Logo", "Laser Engraving"]),
        }
    }
}

/// Extended options sheet: the enumerations behind `Spec::extended`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionsCatalog {
    pub screen_sizes: Vec<String>,
    pub panel_brand_tiers: Vec<String>,
    pub brightness_tiers: Vec<String>,
    pub touch_tech: Vec<String>,
    pub touch_glass_options: Vec<String>,
    pub os_options: Vec<String>,
    pub cpu_options: Vec<String>,
    pub ram_options: Vec<String>,
    pub storage_options: Vec<String>,
    pub ports_defaults: PortDefaults,
    pub peripherals: PeripheralOptions,
    pub enclosure: EnclosureOptions,
    pub software_options: Vec<String>,
    pub shipping_terms: Vec<String>,
    pub certifications: Vec<String>,
    pub warranty_years: Vec<u32>,
}

impl Default for OptionsCatalog {
    fn default() -> Self {
        Self {
            screen_sizes: strings(&[
                "21.5\" FHD",
                "32\" FHD",
                "43\" FHD",
                "43\" 4K",
                "49\" 4K",
                "55\" 4K",
                "65\" 4K",
                "75\" 4K",
                "86\" 4K",
            ]),
            panel_brand_tiers: strings(&["Standard (BOE/Innolux/etc.)", "Premium (LG/Samsung)"]),
            brightness_tiers: strings(&["300–350", "500–550", "1000+", "1500–2000"]),
            touch_tech: strings(&["IR 10-Point", "IR 20-Point", "PCAP"]),
            touch_glass_options: strings(&[
                "4mm Tempered",
                "6mm Thick",
                "Anti-Glare",
                "Anti-Fingerprint",
            ]),
            os_options: strings(&[
                "Android 12",
                "Android 13",
                "Windows 11 Pro",
                "Dual-Boot (Android + Win)",
                "No OS",
            ]),
            cpu_options: strings(&[
                "RK3288",
                "RK3566",
                "RK3588",
                "Intel Celeron J4125",
                "Intel i3",
                "Intel i5",
            ]),
            ram_options: strings(&["2GB", "4GB", "8GB", "16GB"]),
            storage_options: strings(&[
                "32GB eMMC",
                "64GB eMMC",
                "128GB eMMC",
                "256GB SSD",
                "512GB SSD",
                "1TB SSD",
            ]),
            ports_defaults: PortDefaults::default(),
            peripherals: PeripheralOptions::default(),
            enclosure: EnclosureOptions::default(),
            software_options: strings(&[
                "No software",
                "Basic Android Signage App",
                "1-Year Cloud CMS License",
                "Windows Signage Software",
            ]),
            shipping_terms: strings(&["FOB", "CIF", "DDP", "EXW"]),
            certifications: strings(&["CE", "FCC", "RoHS", "ISO 9001:2015"]),
            warranty_years: vec![1, 2, 3],
        }
    }
}

impl Default for ConstraintCatalog {
    fn default() -> Self {
        Self {
            org_name: "Brand M3dia".to_string(),
            display: DisplayConstraints::default(),
            compute: ComputeConstraints::default(),
            touch: TouchConstraints::default(),
            peripherals: PeripheralModels::default(),
            docs: DocumentationPolicy::default(),
            warranty: WarrantyPolicy::default(),
            custom_fields: Vec::new(),
            options: OptionsCatalog::default(),
            prices: PriceTable::default(),
            rules: crate::defaults::default_rules(),
        }
    }
}
