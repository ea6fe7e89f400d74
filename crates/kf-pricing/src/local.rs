//! Local heuristic estimator.
//!
//! Sums independent line items from the catalog price table. Line amounts
//! are never rounded; only the quote totals are.

use kf_catalog::{ConstraintCatalog, PriceMap, PriceTable};
use kf_schemas::{Estimator, ExtendedSpec, LineItem, Money, Quote};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Category {
    Hardware,
    Software,
}

struct Lines {
    items: Vec<(Category, LineItem)>,
}

impl Lines {
    fn new() -> Self {
        Self { items: Vec::new() }
    }

    fn push(&mut self, label: impl Into<String>, amount: Money) {
        self.push_qty(Category::Hardware, label, amount, 1);
    }

    /// Adds the line only when the amount is non-zero.
    fn push_nonzero(&mut self, label: impl Into<String>, amount: Money) {
        if !amount.is_zero() {
            self.push(label, amount);
        }
    }

    fn push_qty(&mut self, cat: Category, label: impl Into<String>, amount: Money, qty: u32) {
        self.items.push((cat, LineItem::new(label, amount, qty)));
    }

    fn each(&mut self, selected: &[String], prices: &PriceMap, prefix: &str) {
        for item in selected {
            self.push_nonzero(
                format!("{prefix} – {item}"),
                PriceTable::lookup(prices, item),
            );
        }
    }

    fn hardware_subtotal(&self) -> Money {
        self.items
            .iter()
            .filter(|(c, _)| *c == Category::Hardware)
            .map(|(_, li)| li.total)
            .sum()
    }

    fn into_items(self) -> Vec<LineItem> {
        self.items.into_iter().map(|(_, li)| li).collect()
    }
}

fn ip_label(rating: &str) -> String {
    match rating {
        "IP54" => "IP54 Dust/Splash Protection".to_string(),
        "IP65" => "IP65 Water Jet Protection".to_string(),
        other => format!("{other} Protection"),
    }
}

fn excess(selected: Option<u32>, default: u32, unit: Money) -> Money {
    let have = selected.unwrap_or(default);
    unit.times(have.saturating_sub(default))
}

/// Price `spec` with the catalog's price table. Deterministic and total.
pub fn estimate_local(spec: &ExtendedSpec, catalog: &ConstraintCatalog) -> Quote {
    let p = &catalog.prices;
    let mut lines = Lines::new();

    // Panel
    let base = p.panel_base(&spec.screen_size);
    lines.push(format!("Display Panel ({})", spec.screen_size), base);
    if p.is_premium_tier(&spec.panel_brand_tier) {
        lines.push_nonzero("Premium Panel Tier", base.percent(p.premium_tier_pct));
    }
    lines.push_nonzero(
        format!("High Brightness ({} nits)", spec.brightness_tier),
        PriceTable::lookup(&p.brightness_tier, &spec.brightness_tier),
    );

    // Touch
    lines.push_nonzero(
        format!("Touch Technology ({})", spec.touch_tech),
        PriceTable::lookup(&p.touch_tech, &spec.touch_tech),
    );
    lines.each(&spec.touch_glass, &p.touch_glass, "Touch Glass Option");

    // Compute
    lines.push_nonzero(format!("OS ({})", spec.os), PriceTable::lookup(&p.os, &spec.os));
    lines.push_nonzero(format!("CPU ({})", spec.cpu), PriceTable::lookup(&p.cpu, &spec.cpu));
    lines.push_nonzero(format!("RAM ({})", spec.ram), PriceTable::lookup(&p.ram, &spec.ram));
    lines.push_nonzero(
        format!("Storage ({})", spec.storage),
        PriceTable::lookup(&p.storage, &spec.storage),
    );
    if spec.gpu_required {
        lines.push("Dedicated GPU Requirement", p.gpu);
    }

    // Ports: excess over catalog defaults only
    let d = &catalog.options.ports_defaults;
    let u = &p.port_unit;
    let ports = &spec.ports;
    let extra_ports = excess(ports.usb2, d.usb2, u.usb2)
        + excess(ports.usb3, d.usb3, u.usb3)
        + excess(ports.rj45, d.rj45, u.rj45)
        + excess(ports.hdmi_in, d.hdmi_in, u.hdmi_in)
        + excess(ports.hdmi_out, d.hdmi_out, u.hdmi_out)
        + excess(ports.serial, d.serial, u.serial)
        + excess(ports.audio, d.audio, u.audio);
    lines.push_nonzero("Extra Ports Above Standard", extra_ports);
    if ports.add_second_lan {
        lines.push("Add Second LAN", p.second_lan);
    }
    if ports.add_second_serial {
        lines.push("Add Second Serial", p.second_serial);
    }
    if ports.lte_module {
        lines.push("Internal 4G/LTE Module", p.lte_module);
    }
    if ports.gpio_required {
        lines.push("GPIO Interface", p.gpio);
    }

    // Peripherals
    let per = &spec.peripherals;
    lines.each(&per.payment_id, &p.payment_id, "Payment/ID");
    lines.each(&per.printing, &p.printing, "Printing");
    lines.each(&per.cameras, &p.cameras, "Camera");
    lines.each(&per.audio, &p.audio, "Audio");
    lines.each(&per.other, &p.other_accessories, "Accessory");

    // Enclosure
    let e = &spec.enclosure;
    lines.push_nonzero(
        format!("Enclosure Material – {}", e.material),
        PriceTable::lookup(&p.enclosure_material, &e.material),
    );
    let finish_label = if e.finish == "Custom RAL" {
        let ral = if e.custom_ral.trim().is_empty() {
            "TBD"
        } else {
            e.custom_ral.trim()
        };
        format!("Finish – Custom RAL ({ral})")
    } else {
        format!("Finish – {}", e.finish)
    };
    lines.push_nonzero(
        finish_label,
        PriceTable::lookup(&p.enclosure_finish, &e.finish),
    );
    lines.push_nonzero(
        format!("Base – {}", e.base),
        PriceTable::lookup(&p.enclosure_base, &e.base),
    );
    lines.push_nonzero(
        ip_label(&e.ip_rating),
        PriceTable::lookup(&p.ip_rating, &e.ip_rating),
    );
    lines.push_nonzero(
        format!("Branding – {}", e.branding),
        PriceTable::lookup(&p.branding, &e.branding),
    );

    // Software
    let cms = PriceTable::lookup(&p.software, &spec.software.cms);
    if !cms.is_zero() {
        lines.push_qty(
            Category::Software,
            format!("Software – {}", spec.software.cms),
            cms,
            1,
        );
    }
    if spec.software.kiosk_lockdown && spec.os == p.kiosk_lockdown_os {
        lines.push_nonzero(
            format!("Kiosk Lockdown Setup ({})", spec.os),
            p.kiosk_lockdown,
        );
    }

    // Warranty: uplift on everything priced so far except software licenses
    let w = &spec.warranty;
    let pct = p.warranty_uplift_pct(w.years);
    if pct != 0 {
        let uplift = lines.hardware_subtotal().percent(pct);
        lines.push(format!("Warranty Extension to {} Years", w.years), uplift);
    }
    if w.on_site_service {
        lines.push("On-site Service", p.on_site_service);
    }
    if w.spare_touch_glass > 0 {
        lines.push_qty(
            Category::Hardware,
            "Spare Touch Glass",
            p.spare_touch_glass,
            w.spare_touch_glass,
        );
    }
    if w.spare_power_adapter > 0 {
        lines.push_qty(
            Category::Hardware,
            "Spare Power Adapter",
            p.spare_power_adapter,
            w.spare_power_adapter,
        );
    }

    // Logistics
    let shipping = PriceTable::lookup(&p.shipping, &spec.logistics.shipping);
    if spec.logistics.sample_unit {
        lines.push("Sample Unit Handling", p.sample_unit);
    }

    Quote::from_lines(
        Estimator::Local,
        p.currency.clone(),
        lines.into_items(),
        shipping,
        Money::ZERO,
        p.notes.clone(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use kf_catalog::default_spec;

    fn bare() -> ExtendedSpec {
        let mut s = ExtendedSpec::default();
        s.logistics.sample_unit = false;
        s
    }

    #[test]
    fn panel_touch_and_glass() {
        let c = ConstraintCatalog::default();
        let mut s = bare();
        s.screen_size = "55\" 4K".to_string();
        s.touch_tech = "PCAP".to_string();
        s.touch_glass = vec!["6mm Thick".to_string()];
        s.logistics.shipping = "FOB".to_string();

        let q = estimate_local(&s, &c);
        assert_eq!(q.subtotal, Money::units(1220));
        assert_eq!(q.shipping, Money::ZERO);
        assert_eq!(q.total, Money::units(1220));
        assert_eq!(q.total.to_string(), "1220.00");
        let labels: Vec<&str> = q.line_items.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "Display Panel (55\" 4K)",
                "Touch Technology (PCAP)",
                "Touch Glass Option – 6mm Thick"
            ]
        );
    }

    #[test]
    fn two_year_warranty_is_eight_percent_of_hardware() {
        let c = ConstraintCatalog::default();
        let mut s = bare();
        s.screen_size = "43\" FHD".to_string(); // 450
        s.touch_tech = "PCAP".to_string(); // 350
        s.cpu = "RK3588".to_string(); // 180
        s.ram = "4GB".to_string(); // 20
        s.software.cms = "1-Year Cloud CMS License".to_string(); // excluded
        s.warranty.years = 2;

        let q = estimate_local(&s, &c);
        let w = q
            .line_items
            .iter()
            .find(|l| l.label == "Warranty Extension to 2 Years")
            .unwrap();
        assert_eq!(w.total, Money::units(80));
        assert_eq!(q.subtotal, Money::units(1000 + 180 + 80));
    }

    #[test]
    fn one_year_warranty_adds_nothing() {
        let c = ConstraintCatalog::default();
        let mut s = bare();
        s.warranty.years = 1;
        let q = estimate_local(&s, &c);
        assert!(q.line_items.iter().all(|l| !l.label.starts_with("Warranty")));
    }

    #[test]
    fn ports_charge_only_the_excess() {
        let c = ConstraintCatalog::default();
        let mut s = bare();
        s.ports.usb3 = Some(4); // +2 * 10
        s.ports.rj45 = Some(0); // below default: never negative
        s.ports.hdmi_in = Some(3); // +2 * 15
        let q = estimate_local(&s, &c);
        let ports = q
            .line_items
            .iter()
            .find(|l| l.label == "Extra Ports Above Standard")
            .unwrap();
        assert_eq!(ports.total, Money::units(50));
    }

    #[test]
    fn lockdown_fee_only_on_desktop_os() {
        let c = ConstraintCatalog::default();
        let mut s = bare();
        s.os = "Android 12".to_string();
        let android = estimate_local(&s, &c);
        assert!(android.line_items.iter().all(|l| !l.label.contains("Lockdown")));

        s.os = "Windows 11 Pro".to_string();
        let win = estimate_local(&s, &c);
        assert!(win
            .line_items
            .iter()
            .any(|l| l.label == "Kiosk Lockdown Setup (Windows 11 Pro)" && l.total == Money::units(45)));
    }

    #[test]
    fn exw_discounts_shipping_and_sample_unit_is_a_line() {
        let c = ConstraintCatalog::default();
        let mut s = bare();
        s.logistics.shipping = "EXW".to_string();
        s.logistics.sample_unit = true;
        let q = estimate_local(&s, &c);
        assert_eq!(q.shipping, Money::units(-50));
        assert!(q
            .line_items
            .iter()
            .any(|l| l.label == "Sample Unit Handling" && l.total == Money::units(100)));
        assert_eq!(q.total, q.subtotal - Money::units(50));
    }

    #[test]
    fn spare_parts_are_priced_per_unit() {
        let c = ConstraintCatalog::default();
        let mut s = bare();
        s.warranty.spare_touch_glass = 3;
        let q = estimate_local(&s, &c);
        let spare = q
            .line_items
            .iter()
            .find(|l| l.label == "Spare Touch Glass")
            .unwrap();
        assert_eq!(spare.qty, 3);
        assert_eq!(spare.amount, Money::units(50));
        assert_eq!(spare.total, Money::units(150));
    }

    #[test]
    fn custom_ral_label_carries_the_code() {
        let c = ConstraintCatalog::default();
        let mut s = bare();
        s.enclosure.finish = "Custom RAL".to_string();
        let tbd = estimate_local(&s, &c);
        assert!(tbd.line_items.iter().any(|l| l.label == "Finish – Custom RAL (TBD)"));
        s.enclosure.custom_ral = "RAL 5015".to_string();
        let coded = estimate_local(&s, &c);
        assert!(coded
            .line_items
            .iter()
            .any(|l| l.label == "Finish – Custom RAL (RAL 5015)"));
    }

    #[test]
    fn premium_tier_is_fifteen_percent_of_panel() {
        let c = ConstraintCatalog::default();
        let mut s = bare();
        s.screen_size = "55\" 4K".to_string();
        s.panel_brand_tier = "Premium (LG/Samsung)".to_string();
        let q = estimate_local(&s, &c);
        assert_eq!(q.line_items[1].label, "Premium Panel Tier");
        assert_eq!(q.line_items[1].total, Money::units(120));
    }

    #[test]
    fn default_spec_is_deterministic() {
        let c = ConstraintCatalog::default();
        let s = default_spec(&c).extended;
        let a = serde_json::to_string(&estimate_local(&s, &c)).unwrap();
        let b = serde_json::to_string(&estimate_local(&s, &c)).unwrap();
        assert_eq!(a, b);
    }
}
