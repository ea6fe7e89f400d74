//! Built-in rules and the starting spec for a new order.

use kf_schemas::{
    Enclosure, ExtendedSpec, Logistics, PeripheralSelection, Ports, Software, Spec,
    WarrantyOptions, YesNo,
};

use crate::catalog::ConstraintCatalog;
use crate::rules::{FieldRef, RuleCheck, RuleCondition, RuleDomain, RuleSpec};

/// Grouped peripheral toggles offered on the procurement form.
pub const GROUPED_PERIPHERALS: &[&str] = &["mic", "speaker", "webcam", "qr"];

fn pick(options: &[String], idx: usize) -> String {
    options
        .get(idx)
        .or_else(|| options.first())
        .cloned()
        .unwrap_or_default()
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

/// Starting spec for a fresh order under `catalog`.
pub fn default_spec(catalog: &ConstraintCatalog) -> Spec {
    let display = &catalog.display;
    let docs = &catalog.docs;
    let models = &catalog.peripherals;

    Spec {
        display_brand: pick(&display.allowed_brands, 0),
        size: pick(&display.size_options, 3),
        resolution: pick(&display.resolution_options, 0),
        brightness: display.min_brightness,
        contrast: display.min_contrast,
        cpu_ram: pick(&catalog.compute.cpu_options, 0),
        os: pick(&catalog.compute.os_options, 0),
        has_touch: YesNo::Yes,
        touch_type: pick(&catalog.touch.types, 0),
        enclosure_type: "Wall-mount".to_string(),
        color: "Black".to_string(),
        logo_text: catalog.org_name.clone(),
        labels_provided: YesNo::from_bool(docs.labels),
        manual_provided: YesNo::from_bool(docs.manual),
        proof_before_ship: YesNo::from_bool(docs.proof_before_ship),
        visual_proof: YesNo::from_bool(docs.visual_proof),
        packaging: pick(&docs.packaging_options, 2),
        certifications: docs.certifications.join(", "),
        origin_country: String::new(),
        canadian_wire_colors: YesNo::from_bool(docs.require_canadian_wiring_colors),
        no_substitutions: YesNo::from_bool(catalog.warranty.no_substitutions),
        warranty_years: catalog.warranty.years,
        camera_model: pick(&models.cameras, 0),
        mic_model: pick(&models.mics, 0),
        speaker_model: pick(&models.speakers, 0),
        qr_model: pick(&models.qr_scanners, 0),
        badge_printer_model: pick(&models.badge_printers, 0),
        wall_mount: pick(&models.wall_mounts, 0),
        peripherals: owned(GROUPED_PERIPHERALS),
        custom: catalog
            .custom_fields
            .iter()
            .map(|f| (f.key.clone(), f.kind.default_value()))
            .collect(),
        extended: default_extended(catalog),
    }
}

/// Starting options sheet. Selections that are not in the catalog's
/// enumerations are dropped.
pub fn default_extended(catalog: &ConstraintCatalog) -> ExtendedSpec {
    let o = &catalog.options;
    let d = &o.ports_defaults;
    let offered = |list: &[String], wanted: &[&str]| -> Vec<String> {
        wanted
            .iter()
            .filter(|w| list.iter().any(|l| l == *w))
            .map(|w| (*w).to_string())
            .collect()
    };

    ExtendedSpec {
        screen_size: pick(&o.screen_sizes, 2),
        panel_brand_tier: pick(&o.panel_brand_tiers, 0),
        brightness_tier: pick(&o.brightness_tiers, 1),
        touch_tech: pick(&o.touch_tech, 0),
        touch_glass: offered(&o.touch_glass_options, &["4mm Tempered"]),
        os: pick(&o.os_options, 0),
        cpu: pick(&o.cpu_options, 1),
        ram: pick(&o.ram_options, 1),
        storage: pick(&o.storage_options, 1),
        gpu_required: false,
        ports: Ports {
            usb2: Some(d.usb2),
            usb3: Some(d.usb3),
            rj45: Some(d.rj45),
            add_second_lan: false,
            hdmi_in: Some(d.hdmi_in),
            hdmi_out: Some(d.hdmi_out),
            serial: Some(d.serial),
            add_second_serial: false,
            audio: Some(d.audio),
            wifi: d.wifi.clone(),
            bluetooth: d.bluetooth.clone(),
            lte_module: false,
            gpio_required: false,
        },
        peripherals: PeripheralSelection {
            payment_id: Vec::new(),
            printing: Vec::new(),
            cameras: offered(&o.peripherals.cameras, &["Internal 2MP"]),
            audio: offered(&o.peripherals.audio, &["Internal Speakers 2x10W"]),
            other: offered(&o.peripherals.other, &["VESA Mount"]),
        },
        enclosure: Enclosure {
            material: pick(&o.enclosure.materials, 0),
            finish: pick(&o.enclosure.finishes, 0),
            custom_ral: String::new(),
            base: pick(&o.enclosure.base_options, 0),
            ip_rating: pick(&o.enclosure.ip_ratings, 0),
            branding: pick(&o.enclosure.branding, 0),
        },
        software: Software {
            cms: pick(&o.software_options, 0),
            kiosk_lockdown: true,
        },
        warranty: WarrantyOptions {
            years: o.warranty_years.first().copied().unwrap_or(1),
            on_site_service: false,
            spare_touch_glass: 0,
            spare_power_adapter: 0,
        },
        logistics: Logistics {
            shipping: pick(&o.shipping_terms, 0),
            sample_unit: true,
        },
        certifications: offered(&o.certifications, &["CE", "FCC", "RoHS"]),
    }
}

/// Administrator rules shipped with the default catalog.
pub fn default_rules() -> Vec<RuleSpec> {
    vec![
        RuleSpec {
            id: "touch-tech-selected".to_string(),
            domain: RuleDomain::Touch,
            check: RuleCheck::NonBlank {
                field: FieldRef::ExtTouchTech,
            },
            when: Some(RuleCondition {
                field: FieldRef::HasTouch,
                equals: "Yes".to_string(),
            }),
            message: Some("Touch is enabled but no touch technology is selected".to_string()),
        },
        RuleSpec {
            id: "video-hdmi-out".to_string(),
            domain: RuleDomain::VideoSignal,
            check: RuleCheck::FloorAt {
                field: FieldRef::ExtHdmiOut,
                min: 1.0,
            },
            when: None,
            message: Some("At least one HDMI output is required for the video signal path".to_string()),
        },
        RuleSpec {
            id: "network-uplink".to_string(),
            domain: RuleDomain::IoSecurity,
            check: RuleCheck::FloorAt {
                field: FieldRef::ExtRj45,
                min: 1.0,
            },
            when: None,
            message: Some("A wired RJ45 uplink is required for managed deployment".to_string()),
        },
        RuleSpec {
            id: "firmware-image".to_string(),
            domain: RuleDomain::Firmware,
            check: RuleCheck::MemberOf {
                field: FieldRef::ExtOs,
                allowed: owned(&[
                    "Android 12",
                    "Android 13",
                    "Windows 11 Pro",
                    "Dual-Boot (Android + Win)",
                ]),
            },
            when: None,
            message: Some("Units must ship with a provisioned OS image".to_string()),
        },
        RuleSpec {
            id: "market-certifications".to_string(),
            domain: RuleDomain::Documentation,
            check: RuleCheck::Requires {
                field: FieldRef::ExtCertifications,
                values: owned(&["CE", "FCC"]),
            },
            when: None,
            message: None,
        },
    ]
}
