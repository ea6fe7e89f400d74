//! Remote vendor estimator (`POST /vendor/estimate`).

use kf_catalog::ConstraintCatalog;
use kf_schemas::{Estimator, LineItem, Money, Quote, Spec};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::oracle::{OracleError, PriceOracle};

pub const DEFAULT_TIMEOUT_MS: u64 = 4000;

const ONE_CENT: Money = Money::from_micros(10_000);

/// POST `body` as JSON and decode the answer, bounded by `timeout`.
pub(crate) async fn post_json<B, T>(
    http: &reqwest::Client,
    url: String,
    body: &B,
    timeout: Duration,
) -> Result<T, OracleError>
where
    B: Serialize + Sync,
    T: DeserializeOwned,
{
    let call = async {
        let resp = http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| OracleError::Transport(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| OracleError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(OracleError::Status {
                code: status.as_u16(),
                body: text.chars().take(200).collect(),
            });
        }
        serde_json::from_str::<T>(&text).map_err(|e| OracleError::Decode(e.to_string()))
    };

    tokio::time::timeout(timeout, call)
        .await
        .map_err(|_| OracleError::Timeout {
            after_ms: timeout.as_millis() as u64,
        })?
}

pub(crate) fn money(field: &str, v: f64) -> Result<Money, OracleError> {
    Money::from_f64(v).ok_or_else(|| OracleError::Shape(format!("{field} is not a finite number")))
}

// ---------------------------------------------------------------------------
// Vendor estimator
// ---------------------------------------------------------------------------

/// Vendor estimator client. The extended spec is sent as-is; the vendor's
/// totals are taken verbatim (rounded to cents) once they pass shape checks.
#[derive(Debug, Clone)]
pub struct RemoteOracle {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl RemoteOracle {
    pub fn new_with_base_url(base_url: String) -> Self {
        Self::with_timeout(base_url, Duration::from_millis(DEFAULT_TIMEOUT_MS))
    }

    pub fn with_timeout(base_url: String, timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            timeout,
        }
    }

    fn estimate_url(&self) -> String {
        format!("{}/vendor/estimate", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Serialize)]
struct EstimateRequest<'a> {
    spec: &'a kf_schemas::ExtendedSpec,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VendorEstimate {
    currency: String,
    subtotal: f64,
    shipping: f64,
    tax: f64,
    total: f64,
    #[serde(default)]
    line_items: Vec<VendorLine>,
    #[serde(default)]
    notes: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct VendorLine {
    label: String,
    amount: f64,
    #[serde(default)]
    qty: Option<u32>,
    #[serde(default)]
    total: Option<f64>,
}

impl VendorEstimate {
    fn into_quote(self) -> Result<Quote, OracleError> {
        if self.currency.trim().is_empty() {
            return Err(OracleError::Shape("currency is blank".to_string()));
        }
        let subtotal = money("subtotal", self.subtotal)?;
        let shipping = money("shipping", self.shipping)?;
        let tax = money("tax", self.tax)?;
        let total = money("total", self.total)?;
        if subtotal.is_negative() || total.is_negative() || tax.is_negative() {
            return Err(OracleError::Shape("negative subtotal, tax or total".to_string()));
        }
        let drift = subtotal
            .checked_add(shipping)
            .and_then(|m| m.checked_add(tax))
            .and_then(|m| m.checked_sub(total))
            .ok_or_else(|| OracleError::Shape("amounts out of range".to_string()))?
            .round_cents();
        if drift.micros().unsigned_abs() > ONE_CENT.micros().unsigned_abs() {
            return Err(OracleError::Shape(format!(
                "total {total} does not add up (subtotal {subtotal}, shipping {shipping}, tax {tax})"
            )));
        }

        let mut line_items = Vec::with_capacity(self.line_items.len());
        for l in self.line_items {
            let amount = money("lineItems.amount", l.amount)?;
            let qty = l.qty.unwrap_or(1);
            let line_total = match l.total {
                Some(t) => money("lineItems.total", t)?,
                None => amount.times(qty),
            };
            line_items.push(LineItem {
                label: l.label,
                amount,
                qty,
                total: line_total,
            });
        }

        Ok(Quote {
            estimator: Estimator::Vendor,
            currency: self.currency,
            line_items,
            subtotal: subtotal.round_cents(),
            shipping: shipping.round_cents(),
            tax: tax.round_cents(),
            total: total.round_cents(),
            notes: self.notes,
        })
    }
}

#[async_trait::async_trait]
impl PriceOracle for RemoteOracle {
    fn name(&self) -> &'static str {
        "vendor"
    }

    async fn estimate(
        &self,
        spec: &Spec,
        _catalog: &ConstraintCatalog,
    ) -> Result<Quote, OracleError> {
        let body = EstimateRequest {
            spec: &spec.extended,
        };
        let est: VendorEstimate =
            post_json(&self.http, self.estimate_url(), &body, self.timeout).await?;
        let quote = est.into_quote()?;
        tracing::debug!(total = %quote.total, lines = quote.line_items.len(), "vendor estimate");
        Ok(quote)
    }
}
