use kf_catalog::{ConstraintCatalog, GROUPED_PERIPHERALS};
use kf_schemas::{Spec, YesNo};

// ---------------------------------------------------------------------------
// Policy table
// ---------------------------------------------------------------------------

/// Spec fields the clamp pass reconciles against the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClampField {
    DisplayBrand,
    Size,
    Resolution,
    Brightness,
    Contrast,
    CpuRam,
    Os,
    TouchType,
    CameraModel,
    MicModel,
    SpeakerModel,
    QrModel,
    BadgePrinterModel,
    WallMount,
    Packaging,
    Certifications,
    LabelsProvided,
    ManualProvided,
    ProofBeforeShip,
    VisualProof,
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
    ExtUsb2,
    ExtUsb3,
    ExtRj45,
    ExtHdmiIn,
    ExtHdmiOut,
    ExtSerial,
    ExtAudio,
    ExtWifi,
    ExtBluetooth,
    ExtPaymentId,
    ExtPrinting,
    ExtCameras,
    ExtAudioPeripherals,
    ExtOtherPeripherals,
    ExtMaterial,
    ExtFinish,
    ExtBase,
    ExtIpRating,
    ExtBranding,
    ExtSoftwareCms,
    ExtWarrantyYears,
    ExtShipping,
    ExtCertifications,
}

/// How a field is brought into catalog bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClampPolicy {
    /// Catalog-authoritative value; always replaced.
    Overwrite(Pinned),
    /// Raise values below the floor; never lower.
    FloorAt(u32),
    /// Out-of-set values become the first allowed value (or empty).
    MemberOf(Vec<String>),
    /// Numeric variant of `MemberOf`; an empty set leaves the value alone.
    MemberOfCount(Vec<u32>),
    /// Drop list entries that are not allowed.
    IntersectWith(Vec<String>),
    /// Unspecified count takes the catalog default.
    FillMissing(u32),
    /// Blank text takes the catalog default.
    FillBlank(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pinned {
    Text(String),
    Flag(YesNo),
}

/// The full clamp policy for `catalog`, in application order.
pub fn policy_table(catalog: &ConstraintCatalog) -> Vec<(ClampField, ClampPolicy)> {
    use ClampField as F;
    use ClampPolicy as P;

    let c = catalog;
    let o = &c.options;
    let d = &o.ports_defaults;
    let member = |list: &Vec<String>| P::MemberOf(list.clone());
    let within = |list: &Vec<String>| P::IntersectWith(list.clone());
    let flag = |b: bool| P::Overwrite(Pinned::Flag(YesNo::from_bool(b)));

    vec![
        (F::DisplayBrand, member(&c.display.allowed_brands)),
        (F::Size, member(&c.display.size_options)),
        (F::Resolution, member(&c.display.resolution_options)),
        (F::Brightness, P::FloorAt(c.display.min_brightness)),
        (F::Contrast, P::FloorAt(c.display.min_contrast)),
        (F::CpuRam, member(&c.compute.cpu_options)),
        (F::Os, member(&c.compute.os_options)),
        (F::TouchType, member(&c.touch.types)),
        (F::CameraModel, member(&c.peripherals.cameras)),
        (F::MicModel, member(&c.peripherals.mics)),
        (F::SpeakerModel, member(&c.peripherals.speakers)),
        (F::QrModel, member(&c.peripherals.qr_scanners)),
        (F::BadgePrinterModel, member(&c.peripherals.badge_printers)),
        (F::WallMount, member(&c.peripherals.wall_mounts)),
        (F::Packaging, member(&c.docs.packaging_options)),
        (
            F::Certifications,
            P::Overwrite(Pinned::Text(c.docs.certifications.join(", "))),
        ),
        (F::LabelsProvided, flag(c.docs.labels)),
        (F::ManualProvided, flag(c.docs.manual)),
        (F::ProofBeforeShip, flag(c.docs.proof_before_ship)),
        (F::VisualProof, flag(c.docs.visual_proof)),
        (
            F::CanadianWireColors,
            flag(c.docs.require_canadian_wiring_colors),
        ),
        (F::NoSubstitutions, flag(c.warranty.no_substitutions)),
        (F::WarrantyYears, P::FloorAt(c.warranty.years)),
        (
            F::Peripherals,
            P::IntersectWith(GROUPED_PERIPHERALS.iter().map(|s| s.to_string()).collect()),
        ),
        (F::ExtScreenSize, member(&o.screen_sizes)),
        (F::ExtPanelBrandTier, member(&o.panel_brand_tiers)),
        (F::ExtBrightnessTier, member(&o.brightness_tiers)),
        (F::ExtTouchTech, member(&o.touch_tech)),
        (F::ExtTouchGlass, within(&o.touch_glass_options)),
        (F::ExtOs, member(&o.os_options)),
        (F::ExtCpu, member(&o.cpu_options)),
        (F::ExtRam, member(&o.ram_options)),
        (F::ExtStorage, member(&o.storage_options)),
        (F::ExtUsb2, P::FillMissing(d.usb2)),
        (F::ExtUsb3, P::FillMissing(d.usb3)),
        (F::ExtRj45, P::FillMissing(d.rj45)),
        (F::ExtHdmiIn, P::FillMissing(d.hdmi_in)),
        (F::ExtHdmiOut, P::FillMissing(d.hdmi_out)),
        (F::ExtSerial, P::FillMissing(d.serial)),
        (F::ExtAudio, P::FillMissing(d.audio)),
        (F::ExtWifi, P::FillBlank(d.wifi.clone())),
        (F::ExtBluetooth, P::FillBlank(d.bluetooth.clone())),
        (F::ExtPaymentId, within(&o.peripherals.payment_id)),
        (F::ExtPrinting, within(&o.peripherals.printing)),
        (F::ExtCameras, within(&o.peripherals.cameras)),
        (F::ExtAudioPeripherals, within(&o.peripherals.audio)),
        (F::ExtOtherPeripherals, within(&o.peripherals.other)),
        (F::ExtMaterial, member(&o.enclosure.materials)),
        (F::ExtFinish, member(&o.enclosure.finishes)),
        (F::ExtBase, member(&o.enclosure.base_options)),
        (F::ExtIpRating, member(&o.enclosure.ip_ratings)),
        (F::ExtBranding, member(&o.enclosure.branding)),
        (F::ExtSoftwareCms, member(&o.software_options)),
        (F::ExtWarrantyYears, P::MemberOfCount(o.warranty_years.clone())),
        (F::ExtShipping, member(&o.shipping_terms)),
        (F::ExtCertifications, within(&o.certifications)),
    ]
}

// ---------------------------------------------------------------------------
// Application
// ---------------------------------------------------------------------------

#[derive(Debug)]
enum Slot<'s> {
    Text(&'s mut String),
    Count(&'s mut u32),
    OptCount(&'s mut Option<u32>),
    Flag(&'s mut YesNo),
    List(&'s mut Vec<String>),
}

impl ClampField {
    fn slot<'s>(&self, s: &'s mut Spec) -> Slot<'s> {
        use ClampField as F;
        let x = &mut s.extended;
        match self {
            F::DisplayBrand => Slot::Text(&mut s.display_brand),
            F::Size => Slot::Text(&mut s.size),
            F::Resolution => Slot::Text(&mut s.resolution),
            F::Brightness => Slot::Count(&mut s.brightness),
            F::Contrast => Slot::Count(&mut s.contrast),
            F::CpuRam => Slot::Text(&mut s.cpu_ram),
            F::Os => Slot::Text(&mut s.os),
            F::TouchType => Slot::Text(&mut s.touch_type),
            F::CameraModel => Slot::Text(&mut s.camera_model),
            F::MicModel => Slot::Text(&mut s.mic_model),
            F::SpeakerModel => Slot::Text(&mut s.speaker_model),
            F::QrModel => Slot::Text(&mut s.qr_model),
            F::BadgePrinterModel => Slot::Text(&mut s.badge_printer_model),
            F::WallMount => Slot::Text(&mut s.wall_mount),
            F::Packaging => Slot::Text(&mut s.packaging),
            F::Certifications => Slot::Text(&mut s.certifications),
            F::LabelsProvided => Slot::Flag(&mut s.labels_provided),
            F::ManualProvided => Slot::Flag(&mut s.manual_provided),
            F::ProofBeforeShip => Slot::Flag(&mut s.proof_before_ship),
            F::VisualProof => Slot::Flag(&mut s.visual_proof),
            F::CanadianWireColors => Slot::Flag(&mut s.canadian_wire_colors),
            F::NoSubstitutions => Slot::Flag(&mut s.no_substitutions),
            F::WarrantyYears => Slot::Count(&mut s.warranty_years),
            F::Peripherals => Slot::List(&mut s.peripherals),
            F::ExtScreenSize => Slot::Text(&mut x.screen_size),
            F::ExtPanelBrandTier => Slot::Text(&mut x.panel_brand_tier),
            F::ExtBrightnessTier => Slot::Text(&mut x.brightness_tier),
            F::ExtTouchTech => Slot::Text(&mut x.touch_tech),
            F::ExtTouchGlass => Slot::List(&mut x.touch_glass),
            F::ExtOs => Slot::Text(&mut x.os),
            F::ExtCpu => Slot::Text(&mut x.cpu),
            F::ExtRam => Slot::Text(&mut x.ram),
            F::ExtStorage => Slot::Text(&mut x.storage),
            F::ExtUsb2 => Slot::OptCount(&mut x.ports.usb2),
            F::ExtUsb3 => Slot::OptCount(&mut x.ports.usb3),
            F::ExtRj45 => Slot::OptCount(&mut x.ports.rj45),
            F::ExtHdmiIn => Slot::OptCount(&mut x.ports.hdmi_in),
            F::ExtHdmiOut => Slot::OptCount(&mut x.ports.hdmi_out),
            F::ExtSerial => Slot::OptCount(&mut x.ports.serial),
            F::ExtAudio => Slot::OptCount(&mut x.ports.audio),
            F::ExtWifi => Slot::Text(&mut x.ports.wifi),
            F::ExtBluetooth => Slot::Text(&mut x.ports.bluetooth),
            F::ExtPaymentId => Slot::List(&mut x.peripherals.payment_id),
            F::ExtPrinting => Slot::List(&mut x.peripherals.printing),
            F::ExtCameras => Slot::List(&mut x.peripherals.cameras),
            F::ExtAudioPeripherals => Slot::List(&mut x.peripherals.audio),
            F::ExtOtherPeripherals => Slot::List(&mut x.peripherals.other),
            F::ExtMaterial => Slot::Text(&mut x.enclosure.material),
            F::ExtFinish => Slot::Text(&mut x.enclosure.finish),
            F::ExtBase => Slot::Text(&mut x.enclosure.base),
            F::ExtIpRating => Slot::Text(&mut x.enclosure.ip_rating),
            F::ExtBranding => Slot::Text(&mut x.enclosure.branding),
            F::ExtSoftwareCms => Slot::Text(&mut x.software.cms),
            F::ExtWarrantyYears => Slot::Count(&mut x.warranty.years),
            F::ExtShipping => Slot::Text(&mut x.logistics.shipping),
            F::ExtCertifications => Slot::List(&mut x.certifications),
        }
    }
}

/// Apply one policy to one slot. Returns false when the policy does not
/// fit the slot's shape (the slot is left untouched).
fn apply(slot: Slot<'_>, policy: &ClampPolicy) -> bool {
    match (slot, policy) {
        (Slot::Text(v), ClampPolicy::MemberOf(allowed)) => {
            if !allowed.iter().any(|a| *a == *v) {
                *v = allowed.first().cloned().unwrap_or_default();
            }
        }
        (Slot::Text(v), ClampPolicy::Overwrite(Pinned::Text(t))) => *v = t.clone(),
        (Slot::Text(v), ClampPolicy::FillBlank(d)) => {
            if v.trim().is_empty() {
                *v = d.clone();
            }
        }
        (Slot::Flag(v), ClampPolicy::Overwrite(Pinned::Flag(f))) => *v = *f,
        (Slot::Count(v), ClampPolicy::FloorAt(min)) => {
            if *v < *min {
                *v = *min;
            }
        }
        (Slot::Count(v), ClampPolicy::MemberOfCount(allowed)) => {
            if !allowed.contains(v) {
                if let Some(first) = allowed.first() {
                    *v = *first;
                }
            }
        }
        (Slot::OptCount(v), ClampPolicy::FillMissing(d)) => {
            if v.is_none() {
                *v = Some(*d);
            }
        }
        (Slot::List(v), ClampPolicy::IntersectWith(allowed)) => {
            v.retain(|x| allowed.contains(x));
        }
        _ => return false,
    }
    true
}

/// Reconcile `spec` against `catalog`.
///
/// Pure and idempotent: `clamp(&clamp(s, c), c) == clamp(s, c)`. Custom
/// values are coerced to their declared kind; keys the catalog no longer
/// declares are dropped and missing ones take the field default.
pub fn clamp(spec: &Spec, catalog: &ConstraintCatalog) -> Spec {
    let mut out = spec.clone();
    for (field, policy) in policy_table(catalog) {
        apply(field.slot(&mut out), &policy);
    }
    out.custom = catalog
        .custom_fields
        .iter()
        .map(|f| (f.key.clone(), f.kind.coerce(spec.custom.get(&f.key))))
        .collect();
    out
}
