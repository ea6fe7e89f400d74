use kf_catalog::{ConstraintCatalog, FieldRef, RuleCheck, RuleCondition, RuleDomain, RuleSpec};
use kf_schemas::{Client, Spec};
use serde::Serialize;
use std::collections::BTreeSet;

use crate::field::{resolve, FieldValue};

/// One unmet compliance rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub rule_id: String,
    pub domain: RuleDomain,
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

fn rule(id: &str, domain: RuleDomain, check: RuleCheck) -> RuleSpec {
    RuleSpec {
        id: id.to_string(),
        domain,
        check,
        when: None,
        message: None,
    }
}

fn required_flag(id: &str, field: FieldRef, enabled: bool, message: &str) -> Option<RuleSpec> {
    enabled.then(|| RuleSpec {
        message: Some(message.to_string()),
        ..rule(
            id,
            RuleDomain::Documentation,
            RuleCheck::MemberOf {
                field,
                allowed: vec!["Yes".to_string()],
            },
        )
    })
}

/// Rules every catalog implies, in reporting order.
pub fn base_rules(catalog: &ConstraintCatalog) -> Vec<RuleSpec> {
    use FieldRef as F;
    let c = catalog;

    let mut rules = vec![
        rule(
            "display-brand",
            RuleDomain::Display,
            RuleCheck::MemberOf {
                field: F::DisplayBrand,
                allowed: c.display.allowed_brands.clone(),
            },
        ),
        rule(
            "display-brightness",
            RuleDomain::Display,
            RuleCheck::FloorAt {
                field: F::Brightness,
                min: c.display.min_brightness as f64,
            },
        ),
        rule(
            "display-contrast",
            RuleDomain::Display,
            RuleCheck::FloorAt {
                field: F::Contrast,
                min: c.display.min_contrast as f64,
            },
        ),
        RuleSpec {
            when: Some(RuleCondition {
                field: F::HasTouch,
                equals: "Yes".to_string(),
            }),
            ..rule(
                "touch-type",
                RuleDomain::Touch,
                RuleCheck::MemberOf {
                    field: F::TouchType,
                    allowed: c.touch.types.clone(),
                },
            )
        },
        RuleSpec {
            message: Some("Client name is required".to_string()),
            ..rule(
                "client-name",
                RuleDomain::Client,
                RuleCheck::NonBlank {
                    field: F::ClientName,
                },
            )
        },
        rule(
            "display-resolution",
            RuleDomain::Display,
            RuleCheck::MemberOf {
                field: F::Resolution,
                allowed: c.display.resolution_options.clone(),
            },
        ),
        rule(
            "display-size",
            RuleDomain::Display,
            RuleCheck::MemberOf {
                field: F::Size,
                allowed: c.display.size_options.clone(),
            },
        ),
        rule(
            "compute-cpu",
            RuleDomain::Compute,
            RuleCheck::MemberOf {
                field: F::CpuRam,
                allowed: c.compute.cpu_options.clone(),
            },
        ),
        rule(
            "compute-os",
            RuleDomain::Compute,
            RuleCheck::MemberOf {
                field: F::Os,
                allowed: c.compute.os_options.clone(),
            },
        ),
        rule(
            "warranty-floor",
            RuleDomain::Warranty,
            RuleCheck::FloorAt {
                field: F::WarrantyYears,
                min: c.warranty.years as f64,
            },
        ),
        rule(
            "docs-packaging",
            RuleDomain::Documentation,
            RuleCheck::MemberOf {
                field: F::Packaging,
                allowed: c.docs.packaging_options.clone(),
            },
        ),
    ];

    rules.extend(
        [
            required_flag(
                "docs-labels",
                F::LabelsProvided,
                c.docs.labels,
                "Labels are required by documentation policy",
            ),
            required_flag(
                "docs-manual",
                F::ManualProvided,
                c.docs.manual,
                "A manual is required by documentation policy",
            ),
            required_flag(
                "docs-proof",
                F::ProofBeforeShip,
                c.docs.proof_before_ship,
                "Proof before shipping is required by documentation policy",
            ),
            required_flag(
                "docs-visual-proof",
                F::VisualProof,
                c.docs.visual_proof,
                "Visual proof is required by documentation policy",
            ),
        ]
        .into_iter()
        .flatten(),
    );
    rules
}

fn condition_holds(cond: &RuleCondition, spec: &Spec, client: &Client) -> bool {
    resolve(&cond.field, spec, client).render().trim() == cond.equals.trim()
}

fn fmt_number(n: f64) -> String {
    n.to_string()
}

/// Evaluate one rule. `None` means the rule holds (or does not apply).
pub fn evaluate(rule: &RuleSpec, spec: &Spec, client: &Client) -> Option<Warning> {
    if let Some(cond) = &rule.when {
        if !condition_holds(cond, spec, client) {
            return None;
        }
    }

    let field = rule.check.field();
    let label = field.label();
    let value = resolve(field, spec, client);

    let failure = match &rule.check {
        RuleCheck::MemberOf { allowed, .. } => {
            let listed = |v: &str| allowed.iter().any(|a| a == v);
            match &value {
                FieldValue::Absent => Some(format!("{label} is not set")),
                FieldValue::List(items) => {
                    let bad: Vec<&str> = items
                        .iter()
                        .map(String::as_str)
                        .filter(|i| !listed(i))
                        .collect();
                    (!bad.is_empty()).then(|| {
                        format!(
                            "{label} includes '{}' which is not allowed (allowed: {})",
                            bad.join(", "),
                            allowed.join(", ")
                        )
                    })
                }
                other => {
                    let v = other.render();
                    (!listed(&v)).then(|| {
                        format!(
                            "{label} '{v}' is not allowed (allowed: {})",
                            allowed.join(", ")
                        )
                    })
                }
            }
        }
        RuleCheck::FloorAt { min, .. } => match value.as_number() {
            None => Some(format!("{label} is not set")),
            Some(n) if n < *min => Some(format!(
                "{label} {} is below the minimum of {}",
                fmt_number(n),
                fmt_number(*min)
            )),
            Some(_) => None,
        },
        RuleCheck::CeilingAt { max, .. } => match value.as_number() {
            None => Some(format!("{label} is not set")),
            Some(n) if n > *max => Some(format!(
                "{label} {} exceeds the maximum of {}",
                fmt_number(n),
                fmt_number(*max)
            )),
            Some(_) => None,
        },
        RuleCheck::NonBlank { .. } => value.is_blank().then(|| format!("{label} is required")),
        RuleCheck::Requires { values, .. } => {
            let have = value.as_list();
            let missing: Vec<&str> = values
                .iter()
                .map(String::as_str)
                .filter(|v| !have.iter().any(|h| h == v))
                .collect();
            (!missing.is_empty()).then(|| format!("{label} must include {}", missing.join(", ")))
        }
    };

    failure.map(|generated| Warning {
        rule_id: rule.id.clone(),
        domain: rule.domain,
        field: field.path(),
        message: rule.message.clone().unwrap_or(generated),
    })
}

/// All compliance warnings for `spec` under `catalog`.
///
/// Every rule is evaluated (no short-circuit). Base rules come first, then
/// the catalog's own rules in declaration order; a message already reported
/// is not repeated.
pub fn validate(spec: &Spec, catalog: &ConstraintCatalog, client: &Client) -> Vec<Warning> {
    let mut seen: BTreeSet<String> = BTreeSet::new();
    base_rules(catalog)
        .iter()
        .chain(catalog.rules.iter())
        .filter_map(|r| evaluate(r, spec, client))
        .filter(|w| seen.insert(w.message.clone()))
        .collect()
}
