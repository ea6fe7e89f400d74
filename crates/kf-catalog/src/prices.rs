//! Price table consumed by the local heuristic estimator.
//!
//! Every amount is a unit price in the table's currency. Option prices are
//! keyed by the exact option label the spec stores; labels with no entry
//! cost nothing.

use kf_schemas::Money;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type PriceMap = BTreeMap<String, Money>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortUnitPrices {
    pub usb2: Money,
    pub usb3: Money,
    pub rj45: Money,
    pub hdmi_in: Money,
    pub hdmi_out: Money,
    pub serial: Money,
    pub audio: Money,
}

impl Default for PortUnitPrices {
    fn default() -> Self {
        Self {
            usb2: Money::units(5),
            usb3: Money::units(10),
            rj45: Money::units(20),
            hdmi_in: Money::units(15),
            hdmi_out: Money::units(15),
            serial: Money::units(10),
            audio: Money::units(5),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarrantyUplift {
    pub years: u32,
    /// Percent of the hardware subtotal.
    pub pct: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceTable {
    pub currency: String,

    pub panel_by_size: PriceMap,
    pub panel_fallback: Money,
    /// Tiers whose name contains this keyword (case-insensitive) pay
    /// `premium_tier_pct` percent of the base panel on top.
    pub premium_tier_keyword: String,
    pub premium_tier_pct: i64,
    pub brightness_tier: PriceMap,

    pub touch_tech: PriceMap,
    pub touch_glass: PriceMap,

    pub os: PriceMap,
    pub cpu: PriceMap,
    pub ram: PriceMap,
    pub storage: PriceMap,
    pub gpu: Money,

    /// Charged per port above the catalog's port defaults.
    pub port_unit: PortUnitPrices,
    pub second_lan: Money,
    pub second_serial: Money,
    pub lte_module: Money,
    pub gpio: Money,

    pub payment_id: PriceMap,
    pub printing: PriceMap,
    pub cameras: PriceMap,
    pub audio: PriceMap,
    pub other_accessories: PriceMap,

    pub enclosure_material: PriceMap,
    pub enclosure_finish: PriceMap,
    pub enclosure_base: PriceMap,
    pub ip_rating: PriceMap,
    pub branding: PriceMap,

    pub software: PriceMap,
    pub kiosk_lockdown: Money,
    /// Lockdown is billed only on this OS; other images ship it built in.
    pub kiosk_lockdown_os: String,

    pub warranty_uplift: Vec<WarrantyUplift>,
    pub on_site_service: Money,
    pub spare_touch_glass: Money,
    pub spare_power_adapter: Money,

    pub shipping: PriceMap,
    pub sample_unit: Money,

    pub notes: Vec<String>,
}

fn table(entries: &[(&str, i64)]) -> PriceMap {
    entries
        .iter()
        .map(|(k, v)| ((*k).to_string(), Money::units(*v)))
        .collect()
}

impl PriceTable {
    /// Look up an option label; missing labels are free.
    pub fn lookup(map: &PriceMap, label: &str) -> Money {
        map.get(label).copied().unwrap_or(Money::ZERO)
    }

    pub fn panel_base(&self, screen_size: &str) -> Money {
        self.panel_by_size
            .get(screen_size)
            .copied()
            .unwrap_or(self.panel_fallback)
    }

    pub fn is_premium_tier(&self, tier: &str) -> bool {
        let kw = self.premium_tier_keyword.trim().to_ascii_lowercase();
        !kw.is_empty() && tier.to_ascii_lowercase().contains(&kw)
    }

    pub fn warranty_uplift_pct(&self, years: u32) -> i64 {
        self.warranty_uplift
            .iter()
            .find(|u| u.years == years)
            .map(|u| u.pct)
            .unwrap_or(0)
    }
}

impl Default for PriceTable {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
            panel_by_size: table(&[
                ("21.5\" FHD", 250),
                ("32\" FHD", 320),
                ("43\" FHD", 450),
                ("43\" 4K", 520),
                ("49\" 4K", 650),
                ("55\" 4K", 800),
                ("65\" 4K", 1100),
                ("75\" 4K", 1600),
                ("86\" 4K", 2400),
            ]),
            panel_fallback: Money::units(500),
            premium_tier_keyword: "premium".to_string(),
            premium_tier_pct: 15,
            brightness_tier: table(&[
                ("300–350", 0),
                ("500–550", 50),
                ("1000+", 300),
                ("1500–2000", 600),
            ]),
            touch_tech: table(&[
                ("IR 10-Point", 120),
                ("IR 20-Point", 180),
                ("PCAP", 350),
            ]),
            touch_glass: table(&[
                ("4mm Tempered", 0),
                ("6mm Thick", 70),
                ("Anti-Glare", 40),
                ("Anti-Fingerprint", 40),
            ]),
            os: table(&[
                ("Android 12", 0),
                ("Android 13", 0),
                ("Windows 11 Pro", 120),
                ("Dual-Boot (Android + Win)", 180),
                ("No OS", -20),
            ]),
            cpu: table(&[
                ("RK3288", 0),
                ("RK3566", 40),
                ("RK3588", 180),
                ("Intel Celeron J4125", 120),
                ("Intel i3", 250),
                ("Intel i5", 400),
            ]),
            ram: table(&[("2GB", 0), ("4GB", 20), ("8GB", 60), ("16GB", 140)]),
            storage: table(&[
                ("32GB eMMC", 0),
                ("64GB eMMC", 20),
                ("128GB eMMC", 40),
                ("256GB SSD", 80),
                ("512GB SSD", 140),
                ("1TB SSD", 240),
            ]),
            gpu: Money::units(220),
            port_unit: PortUnitPrices::default(),
            second_lan: Money::units(20),
            second_serial: Money::units(15),
            lte_module: Money::units(90),
            gpio: Money::units(30),
            payment_id: table(&[
                ("RFID (125k/13.56MHz)", 45),
                ("NFC Reader", 60),
                ("EMV Credit Card Pin Pad", 350),
                ("Bill/Coin Acceptor", 280),
                ("Barcode/QR Scanner", 120),
                ("Face Recognition Camera", 220),
                ("Fingerprint Scanner", 80),
            ]),
            printing: table(&[
                ("Thermal 58mm", 120),
                ("Ticket 80mm", 220),
                ("Label Printer", 200),
            ]),
            cameras: table(&[
                ("Internal 2MP", 20),
                ("External 1080p", 50),
                ("5MP", 80),
                ("8MP", 120),
            ]),
            audio: table(&[
                ("Internal Speakers 2x10W", 20),
                ("External Speaker Set", 60),
                ("Noise-Canceling Mic Array", 80),
            ]),
            other_accessories: table(&[
                ("VESA Mount", 35),
                ("External Button Kit", 40),
                ("Keyboard Drawer", 70),
            ]),
            enclosure_material: table(&[("Stainless Steel", 180)]),
            enclosure_finish: table(&[
                ("Powder-Coated Black", 30),
                ("Powder-Coated White", 30),
                ("Custom RAL", 120),
            ]),
            enclosure_base: table(&[
                ("Motorized Height-Adjustable Stand", 280),
                ("Mobile Base (Castors)", 150),
                ("Wall Mount", 40),
            ]),
            ip_rating: table(&[("IP54", 120), ("IP65", 260)]),
            branding: table(&[("Silkscreen Logo", 90), ("Laser Engraving", 140)]),
            software: table(&[
                ("Basic Android Signage App", 40),
                ("1-Year Cloud CMS License", 180),
                ("Windows Signage Software", 120),
            ]),
            kiosk_lockdown: Money::units(45),
            kiosk_lockdown_os: "Windows 11 Pro".to_string(),
            warranty_uplift: vec![
                WarrantyUplift { years: 2, pct: 8 },
                WarrantyUplift { years: 3, pct: 12 },
            ],
            on_site_service: Money::units(200),
            spare_touch_glass: Money::units(50),
            spare_power_adapter: Money::units(30),
            shipping: table(&[("FOB", 0), ("CIF", 150), ("DDP", 350), ("EXW", -50)]),
            sample_unit: Money::units(100),
            notes: vec![
                "Heuristic estimate based on selected options; vendor quote may vary.".to_string(),
            ],
        }
    }
}
