//! Scenario: spec clamp is idempotent and catalog-valid
//!
//! # Invariants under test
//!
//! 1. `clamp(clamp(s, c), c) == clamp(s, c)` for every spec in the corpus
//!    (defaults, empty, hostile values, legacy imports) and every catalog
//!    (default, narrowed, emptied).
//! 2. Every enumerated field of a clamped spec is a member of its catalog
//!    enumeration (or empty when the enumeration is empty).
//! 3. Numeric floors raise, never lower.
//! 4. Catalog-authoritative flags are overwritten from the catalog.
//! 5. List fields are intersected with the allowed set.
//! 6. Missing nested objects are filled from catalog defaults.
//! 7. Custom fields are coerced to their declared kind; unknown keys dropped.
//!
//! All tests are pure in-process.

use kf_catalog::{default_spec, ConstraintCatalog, CustomField, CustomFieldKind};
use kf_compliance::{clamp, policy_table, ClampPolicy};
use kf_schemas::{CustomValue, Spec, YesNo};

fn narrowed_catalog() -> ConstraintCatalog {
    let mut c = ConstraintCatalog::default();
    c.display.allowed_brands = vec!["Samsung".to_string()];
    c.display.min_brightness = 700;
    c.docs.labels = false;
    c.options.touch_glass_options = vec!["Anti-Glare".to_string()];
    c.options.warranty_years = vec![2, 3];
    c.custom_fields = vec![
        CustomField {
            key: "max_ambient_c".to_string(),
            kind: CustomFieldKind::Number { default: 35.0 },
        },
        CustomField {
            key: "ada".to_string(),
            kind: CustomFieldKind::YesNo {
                default: YesNo::No,
            },
        },
    ];
    c
}

fn emptied_catalog() -> ConstraintCatalog {
    let mut c = ConstraintCatalog::default();
    c.display.allowed_brands.clear();
    c.display.size_options.clear();
    c.compute.cpu_options.clear();
    c.touch.types.clear();
    c.options.screen_sizes.clear();
    c.options.shipping_terms.clear();
    c.options.warranty_years.clear();
    c.options.peripherals.cameras.clear();
    c
}

fn hostile_spec() -> Spec {
    let mut s = default_spec(&ConstraintCatalog::default());
    s.display_brand = "Sony".to_string();
    s.size = "110-inch".to_string();
    s.brightness = 10;
    s.contrast = 5_000;
    s.touch_type = "Resistive".to_string();
    s.labels_provided = YesNo::No;
    s.certifications = "none".to_string();
    s.warranty_years = 0;
    s.peripherals = vec!["mic".to_string(), "hologram".to_string()];
    s.extended.screen_size = "110\" 8K".to_string();
    s.extended.touch_glass = vec!["Bulletproof".to_string(), "Anti-Glare".to_string()];
    s.extended.ports.usb2 = None;
    s.extended.ports.wifi = String::new();
    s.extended.peripherals.cameras = vec!["Thermal".to_string(), "5MP".to_string()];
    s.extended.warranty.years = 7;
    s.extended.logistics.shipping = "Teleport".to_string();
    s.custom
        .insert("max_ambient_c".to_string(), CustomValue::Text("41".to_string()));
    s.custom
        .insert("ada".to_string(), CustomValue::Number(1.0));
    s.custom
        .insert("retired_key".to_string(), CustomValue::Text("x".to_string()));
    s
}

fn legacy_import_spec() -> Spec {
    serde_json::from_str(
        r#"{"displayBrand":"LG","brightness":"450","extended":{"ports":{"usb3":"6"}}}"#,
    )
    .unwrap()
}

fn corpus() -> Vec<Spec> {
    vec![
        Spec::default(),
        default_spec(&ConstraintCatalog::default()),
        default_spec(&narrowed_catalog()),
        hostile_spec(),
        legacy_import_spec(),
    ]
}

fn catalogs() -> Vec<ConstraintCatalog> {
    vec![
        ConstraintCatalog::default(),
        narrowed_catalog(),
        emptied_catalog(),
    ]
}

#[test]
fn clamp_is_idempotent_over_corpus() {
    for (ci, c) in catalogs().iter().enumerate() {
        for (si, s) in corpus().iter().enumerate() {
            let once = clamp(s, c);
            let twice = clamp(&once, c);
            assert_eq!(once, twice, "catalog #{ci}, spec #{si}");
        }
    }
}

#[test]
fn clamped_enumerations_are_catalog_valid() {
    for c in catalogs() {
        let table = policy_table(&c);
        for s in corpus() {
            let out = clamp(&s, &c);
            let v = serde_json::to_value(&out).unwrap();
            for (field, policy) in &table {
                if pointer(*field).is_none() {
                    continue;
                }
                if let ClampPolicy::MemberOf(allowed) = policy {
                    let text = field_text(&v, *field);
                    if allowed.is_empty() {
                        assert_eq!(text, "", "{field:?}");
                    } else {
                        assert!(allowed.contains(&text), "{field:?} = {text:?}");
                    }
                }
                if let ClampPolicy::IntersectWith(allowed) = policy {
                    for item in field_list(&v, *field) {
                        assert!(allowed.contains(&item), "{field:?} kept {item:?}");
                    }
                }
            }
        }
    }
}

/// JSON pointer for the handful of fields checked above.
fn pointer(field: kf_compliance::ClampField) -> Option<&'static str> {
    use kf_compliance::ClampField as F;
    Some(match field {
        F::DisplayBrand => "/displayBrand",
        F::Size => "/size",
        F::Resolution => "/resolution",
        F::CpuRam => "/cpuRam",
        F::Os => "/os",
        F::TouchType => "/touchType",
        F::Packaging => "/packaging",
        F::ExtScreenSize => "/extended/screenSize",
        F::ExtOs => "/extended/os",
        F::ExtCpu => "/extended/cpu",
        F::ExtShipping => "/extended/logistics/shipping",
        F::ExtTouchGlass => "/extended/touchGlass",
        F::ExtCameras => "/extended/peripherals/cameras",
        F::ExtCertifications => "/extended/certifications",
        F::Peripherals => "/peripherals",
        _ => return None,
    })
}

fn field_text(v: &serde_json::Value, field: kf_compliance::ClampField) -> String {
    pointer(field)
        .and_then(|p| v.pointer(p))
        .and_then(|x| x.as_str())
        .unwrap_or("")
        .to_string()
}

fn field_list(v: &serde_json::Value, field: kf_compliance::ClampField) -> Vec<String> {
    pointer(field)
        .and_then(|p| v.pointer(p))
        .and_then(|x| x.as_array())
        .map(|a| {
            a.iter()
                .filter_map(|i| i.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[test]
fn hostile_spec_is_repaired() {
    let c = narrowed_catalog();
    let out = clamp(&hostile_spec(), &c);

    assert_eq!(out.display_brand, "Samsung");
    assert_eq!(out.size, "32-inch");
    assert_eq!(out.brightness, 700, "floor raises");
    assert_eq!(out.contrast, 5_000, "floor never lowers");
    assert_eq!(out.touch_type, "PCAP");
    assert_eq!(out.labels_provided, YesNo::No, "catalog flag wins");
    assert_eq!(out.certifications, "FCC, CE, UL");
    assert_eq!(out.warranty_years, 2);
    assert_eq!(out.peripherals, vec!["mic"]);

    let x = &out.extended;
    assert_eq!(x.screen_size, "21.5\" FHD");
    assert_eq!(x.touch_glass, vec!["Anti-Glare"]);
    assert_eq!(x.ports.usb2, Some(2));
    assert_eq!(x.ports.wifi, "Dual-band (2.4/5GHz)");
    assert_eq!(x.peripherals.cameras, vec!["5MP"]);
    assert_eq!(x.warranty.years, 2);
    assert_eq!(x.logistics.shipping, "FOB");

    assert_eq!(
        out.custom.get("max_ambient_c"),
        Some(&CustomValue::Number(41.0))
    );
    assert_eq!(out.custom.get("ada"), Some(&CustomValue::YesNo(YesNo::No)));
    assert!(!out.custom.contains_key("retired_key"));
}

#[test]
fn empty_spec_is_filled_from_catalog() {
    let c = ConstraintCatalog::default();
    let out = clamp(&Spec::default(), &c);
    assert_eq!(out.display_brand, "LG");
    assert_eq!(out.brightness, 400);
    assert_eq!(out.extended.ports.hdmi_out, Some(1));
    assert_eq!(out.extended.software.cms, "No software");
    assert_eq!(out.extended.enclosure.material, "Aluminum + Steel");
    assert!(out.extended.logistics.sample_unit);
}

#[test]
fn emptied_catalog_yields_empty_enumerations() {
    let out = clamp(&hostile_spec(), &emptied_catalog());
    assert_eq!(out.display_brand, "");
    assert_eq!(out.extended.screen_size, "");
    assert_eq!(out.extended.logistics.shipping, "");
    assert!(out.extended.peripherals.cameras.is_empty());
    // no allowed warranty years: value is left alone
    assert_eq!(out.extended.warranty.years, 7);
}
