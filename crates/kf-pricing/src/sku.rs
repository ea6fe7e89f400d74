//! SKU pricing backend (`POST /pricing`).
//!
//! The flat spec is reduced to a handful of catalog SKUs; the backend
//! prices the selection and returns totals only.

use kf_catalog::ConstraintCatalog;
use kf_schemas::{Estimator, LineItem, Money, Quote, Spec};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::oracle::{OracleError, PriceOracle};
use crate::remote::{money, post_json, DEFAULT_TIMEOUT_MS};

/// SKU codes a spec maps onto.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkuMap {
    pub display: String,
    pub pc: String,
    /// Added only when the spec has touch enabled.
    pub touch_kit: String,
}

impl Default for SkuMap {
    fn default() -> Self {
        Self {
            display: "DISP-24-TOUCH".to_string(),
            pc: "PC-NUC-I5".to_string(),
            touch_kit: "TOUCH-KIT-PCAP".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkuSelection {
    pub display_sku: String,
    pub pc_sku: String,
    pub touch_sku: Option<String>,
}

impl SkuSelection {
    pub fn from_spec(spec: &Spec, map: &SkuMap) -> Self {
        Self {
            display_sku: map.display.clone(),
            pc_sku: map.pc.clone(),
            touch_sku: spec.touch_enabled().then(|| map.touch_kit.clone()),
        }
    }

    fn codes(&self) -> Vec<&str> {
        let mut v = vec![self.display_sku.as_str(), self.pc_sku.as_str()];
        if let Some(t) = &self.touch_sku {
            v.push(t.as_str());
        }
        v
    }
}

#[derive(Serialize)]
struct PricingRequest<'a> {
    selection_json: &'a SkuSelection,
}

#[derive(Debug, Deserialize)]
struct PricingResponse {
    subtotal: f64,
    #[serde(default)]
    shipping_total: Option<f64>,
    #[serde(default)]
    tax_total: Option<f64>,
    #[serde(default)]
    grand_total: Option<f64>,
}

impl PricingResponse {
    fn into_quote(self, selection: &SkuSelection, currency: &str) -> Result<Quote, OracleError> {
        let subtotal = money("subtotal", self.subtotal)?;
        let shipping = money("shipping_total", self.shipping_total.unwrap_or(0.0))?;
        let tax = money("tax_total", self.tax_total.unwrap_or(0.0))?;
        let total = match self.grand_total {
            Some(g) => money("grand_total", g)?,
            None => subtotal
                .checked_add(shipping)
                .and_then(|m| m.checked_add(tax))
                .ok_or_else(|| OracleError::Shape("amounts out of range".to_string()))?,
        };
        if subtotal.is_negative() || total.is_negative() {
            return Err(OracleError::Shape("negative subtotal or total".to_string()));
        }

        Ok(Quote {
            estimator: Estimator::Sku,
            currency: currency.to_string(),
            line_items: vec![LineItem::single(
                format!("SKU Selection ({})", selection.codes().join(", ")),
                subtotal,
            )],
            subtotal: subtotal.round_cents(),
            shipping: shipping.round_cents(),
            tax: tax.round_cents(),
            total: total.round_cents(),
            notes: Vec::new(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct SkuPricingOracle {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
    skus: SkuMap,
}

impl SkuPricingOracle {
    pub fn new_with_base_url(base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            skus: SkuMap::default(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_skus(mut self, skus: SkuMap) -> Self {
        self.skus = skus;
        self
    }

    fn pricing_url(&self) -> String {
        format!("{}/pricing", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait::async_trait]
impl PriceOracle for SkuPricingOracle {
    fn name(&self) -> &'static str {
        "sku"
    }

    async fn estimate(
        &self,
        spec: &Spec,
        catalog: &ConstraintCatalog,
    ) -> Result<Quote, OracleError> {
        let selection = SkuSelection::from_spec(spec, &self.skus);
        let body = PricingRequest {
            selection_json: &selection,
        };
        let resp: PricingResponse =
            post_json(&self.http, self.pricing_url(), &body, self.timeout).await?;
        resp.into_quote(&selection, &catalog.prices.currency)
    }
}
