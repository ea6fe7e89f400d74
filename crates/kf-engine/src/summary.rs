use kf_catalog::ConstraintCatalog;
use kf_compliance::validate;
use kf_schemas::{Order, PaymentMethod};

fn or_dash(s: &str) -> &str {
    if s.trim().is_empty() {
        "-"
    } else {
        s
    }
}

/// Plain-text order summary for printing or pasting into mail.
///
/// Payment shows the card's last four digits only.
pub fn order_summary(order: &Order, catalog: &ConstraintCatalog) -> String {
    let mut out: Vec<String> = Vec::new();
    let s = &order.spec;
    let x = &s.extended;
    let c = &order.client;

    out.push(format!("{} | Kiosk Order {}", catalog.org_name, order.order_id));
    out.push(format!("Status: {}", order.status));
    out.push(String::new());

    out.push("1. Client".to_string());
    out.push(format!("   Name: {}", or_dash(&c.client_name)));
    out.push(format!("   Company: {}", or_dash(&c.company)));
    out.push(format!("   Email: {}  Phone: {}", or_dash(&c.email), or_dash(&c.phone)));
    out.push(format!("   Project: {}", or_dash(&c.project_name)));
    out.push(format!("   Ship to: {}", or_dash(&c.shipping_address)));

    out.push("2. Display".to_string());
    out.push(format!(
        "   {} {} {}, {} nits, {}:1 contrast",
        s.display_brand, s.size, s.resolution, s.brightness, s.contrast
    ));
    out.push(format!(
        "   Panel: {} ({}, {})",
        or_dash(&x.screen_size),
        or_dash(&x.panel_brand_tier),
        or_dash(&x.brightness_tier)
    ));

    out.push("3. Compute".to_string());
    out.push(format!("   {} / {}", s.cpu_ram, s.os));
    out.push(format!(
        "   Board: {} {} RAM {} storage{}",
        or_dash(&x.cpu),
        or_dash(&x.ram),
        or_dash(&x.storage),
        if x.gpu_required { ", dedicated GPU" } else { "" }
    ));

    out.push("4. Touch".to_string());
    if s.touch_enabled() {
        out.push(format!("   {} ({})", s.touch_type, or_dash(&x.touch_tech)));
        if !x.touch_glass.is_empty() {
            out.push(format!("   Glass: {}", x.touch_glass.join(", ")));
        }
    } else {
        out.push("   None".to_string());
    }

    out.push("5. Cosmetics".to_string());
    out.push(format!(
        "   {} enclosure, {} color, logo: {}",
        or_dash(&s.enclosure_type),
        or_dash(&s.color),
        or_dash(&s.logo_text)
    ));
    out.push(format!(
        "   {} / {} / {} / {}",
        or_dash(&x.enclosure.material),
        or_dash(&x.enclosure.finish),
        or_dash(&x.enclosure.base),
        or_dash(&x.enclosure.ip_rating)
    ));

    out.push("6. Peripherals".to_string());
    let p = &x.peripherals;
    let picked: Vec<&str> = s
        .peripherals
        .iter()
        .chain(&p.payment_id)
        .chain(&p.printing)
        .chain(&p.cameras)
        .chain(&p.audio)
        .chain(&p.other)
        .map(String::as_str)
        .collect();
    if picked.is_empty() {
        out.push("   None".to_string());
    } else {
        out.push(format!("   {}", picked.join(", ")));
    }

    out.push("7. Documentation".to_string());
    out.push(format!(
        "   Labels {} | Manual {} | Proof {} | Visual proof {}",
        s.labels_provided.as_str(),
        s.manual_provided.as_str(),
        s.proof_before_ship.as_str(),
        s.visual_proof.as_str()
    ));
    out.push(format!(
        "   Packaging: {}  Certifications: {}",
        or_dash(&s.packaging),
        or_dash(&s.certifications)
    ));

    out.push("8. Warranty".to_string());
    out.push(format!(
        "   {} year(s), no substitutions: {}",
        s.warranty_years,
        s.no_substitutions.as_str()
    ));

    out.push("9. Custom fields".to_string());
    if s.custom.is_empty() {
        out.push("   None".to_string());
    }
    for (k, v) in &s.custom {
        out.push(format!("   {k}: {v}"));
    }

    out.push("10. Payment".to_string());
    out.push(match order.payment.method {
        PaymentMethod::CreditCard => {
            format!("   Credit Card ending {}", order.payment.card_last4())
        }
        PaymentMethod::PurchaseOrder => {
            format!("   Purchase Order {}", or_dash(&order.payment.po_number))
        }
    });

    out.push("11. Quote".to_string());
    out.push(match &order.quote {
        Some(q) => format!(
            "   Subtotal {} {} | Shipping {} | Tax {} | Total {} ({})",
            q.currency,
            q.subtotal,
            q.shipping,
            q.tax,
            q.total,
            q.estimator.as_str()
        ),
        None => "   Not quoted".to_string(),
    });

    out.push("12. Compliance".to_string());
    let warnings = validate(s, catalog, c);
    if warnings.is_empty() {
        out.push("   No warnings".to_string());
    }
    for w in warnings {
        out.push(format!("   - {w}"));
    }

    let mut text = out.join("\n");
    text.push('\n');
    text
}
