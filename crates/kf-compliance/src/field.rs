use kf_catalog::FieldRef;
use kf_schemas::{Client, CustomValue, Spec};

/// A field's current value as seen by rule evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    List(Vec<String>),
    /// Custom field with no stored value, or an unspecified port count.
    Absent,
}

impl FieldValue {
    fn text(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }

    fn count(n: Option<u32>) -> Self {
        n.map(|n| FieldValue::Number(n as f64))
            .unwrap_or(FieldValue::Absent)
    }

    fn yes_no(b: bool) -> Self {
        FieldValue::text(if b { "Yes" } else { "No" })
    }

    /// Text rendering used for conditions and messages.
    pub fn render(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Number(n) => n.to_string(),
            FieldValue::List(items) => items.join(", "),
            FieldValue::Absent => String::new(),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => s.trim().parse::<f64>().ok(),
            FieldValue::List(_) | FieldValue::Absent => None,
        }
    }

    /// List view: lists as-is, comma-separated text split and trimmed.
    pub fn as_list(&self) -> Vec<String> {
        match self {
            FieldValue::List(items) => items.clone(),
            FieldValue::Text(s) => s
                .split(',')
                .map(|p| p.trim())
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect(),
            FieldValue::Number(n) => vec![n.to_string()],
            FieldValue::Absent => Vec::new(),
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::Number(_) => false,
            FieldValue::List(items) => items.iter().all(|i| i.trim().is_empty()),
            FieldValue::Absent => true,
        }
    }
}

pub fn resolve(field: &FieldRef, spec: &Spec, client: &Client) -> FieldValue {
    use FieldRef as F;
    let x = &spec.extended;
    match field {
        F::ClientName => FieldValue::text(&client.client_name),
        F::Company => FieldValue::text(&client.company),
        F::Email => FieldValue::text(&client.email),
        F::DisplayBrand => FieldValue::text(&spec.display_brand),
        F::Size => FieldValue::text(&spec.size),
        F::Resolution => FieldValue::text(&spec.resolution),
        F::Brightness => FieldValue::Number(spec.brightness as f64),
        F::Contrast => FieldValue::Number(spec.contrast as f64),
        F::CpuRam => FieldValue::text(&spec.cpu_ram),
        F::Os => FieldValue::text(&spec.os),
        F::HasTouch => FieldValue::text(spec.has_touch.as_str()),
        F::TouchType => FieldValue::text(&spec.touch_type),
        F::EnclosureType => FieldValue::text(&spec.enclosure_type),
        F::Color => FieldValue::text(&spec.color),
        F::LabelsProvided => FieldValue::text(spec.labels_provided.as_str()),
        F::ManualProvided => FieldValue::text(spec.manual_provided.as_str()),
        F::ProofBeforeShip => FieldValue::text(spec.proof_before_ship.as_str()),
        F::VisualProof => FieldValue::text(spec.visual_proof.as_str()),
        F::Packaging => FieldValue::text(&spec.packaging),
        F::Certifications => FieldValue::text(&spec.certifications),
        F::OriginCountry => FieldValue::text(&spec.origin_country),
        F::CanadianWireColors => FieldValue::text(spec.canadian_wire_colors.as_str()),
        F::NoSubstitutions => FieldValue::text(spec.no_substitutions.as_str()),
        F::WarrantyYears => FieldValue::Number(spec.warranty_years as f64),
        F::Peripherals => FieldValue::List(spec.peripherals.clone()),
        F::ExtScreenSize => FieldValue::text(&x.screen_size),
        F::ExtPanelBrandTier => FieldValue::text(&x.panel_brand_tier),
        F::ExtBrightnessTier => FieldValue::text(&x.brightness_tier),
        F::ExtTouchTech => FieldValue::text(&x.touch_tech),
        F::ExtTouchGlass => FieldValue::List(x.touch_glass.clone()),
        F::ExtOs => FieldValue::text(&x.os),
        F::ExtCpu => FieldValue::text(&x.cpu),
        F::ExtRam => FieldValue::text(&x.ram),
        F::ExtStorage => FieldValue::text(&x.storage),
        F::ExtGpuRequired => FieldValue::yes_no(x.gpu_required),
        F::ExtUsb2 => FieldValue::count(x.ports.usb2),
        F::ExtUsb3 => FieldValue::count(x.ports.usb3),
        F::ExtRj45 => FieldValue::count(x.ports.rj45),
        F::ExtHdmiIn => FieldValue::count(x.ports.hdmi_in),
        F::ExtHdmiOut => FieldValue::count(x.ports.hdmi_out),
        F::ExtSerial => FieldValue::count(x.ports.serial),
        F::ExtAudio => FieldValue::count(x.ports.audio),
        F::ExtPaymentId => FieldValue::List(x.peripherals.payment_id.clone()),
        F::ExtPrinting => FieldValue::List(x.peripherals.printing.clone()),
        F::ExtEnclosureMaterial => FieldValue::text(&x.enclosure.material),
        F::ExtIpRating => FieldValue::text(&x.enclosure.ip_rating),
        F::ExtSoftwareCms => FieldValue::text(&x.software.cms),
        F::ExtWarrantyYears => FieldValue::Number(x.warranty.years as f64),
        F::ExtShipping => FieldValue::text(&x.logistics.shipping),
        F::ExtCertifications => FieldValue::List(x.certifications.clone()),
        F::Custom(key) => match spec.custom.get(key) {
            Some(CustomValue::Text(s)) => FieldValue::Text(s.clone()),
            Some(CustomValue::Number(n)) => FieldValue::Number(*n),
            Some(CustomValue::YesNo(y)) => FieldValue::text(y.as_str()),
            None => FieldValue::Absent,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kf_schemas::YesNo;

    #[test]
    fn resolves_flat_nested_and_custom_fields() {
        let mut spec = Spec::default();
        spec.brightness = 450;
        spec.extended.ports.hdmi_out = Some(2);
        spec.custom
            .insert("ada".to_string(), CustomValue::YesNo(YesNo::Yes));
        let client = Client {
            client_name: "Dana".to_string(),
            ..Client::default()
        };

        assert_eq!(
            resolve(&FieldRef::Brightness, &spec, &client),
            FieldValue::Number(450.0)
        );
        assert_eq!(
            resolve(&FieldRef::ExtHdmiOut, &spec, &client),
            FieldValue::Number(2.0)
        );
        assert_eq!(
            resolve(&FieldRef::ExtUsb2, &spec, &client),
            FieldValue::Absent
        );
        assert_eq!(
            resolve(&FieldRef::Custom("ada".to_string()), &spec, &client).render(),
            "Yes"
        );
        assert_eq!(
            resolve(&FieldRef::ClientName, &spec, &client).render(),
            "Dana"
        );
    }

    #[test]
    fn text_lists_split_on_commas() {
        let v = FieldValue::Text("FCC, CE,UL ".to_string());
        assert_eq!(v.as_list(), vec!["FCC", "CE", "UL"]);
        assert!(FieldValue::Text("  ".to_string()).is_blank());
        assert!(FieldValue::Absent.is_blank());
    }
}
