use serde::{Deserialize, Serialize};

use crate::Money;

/// Which oracle produced a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Estimator {
    /// Local heuristic price table.
    Local,
    /// Remote vendor estimator (`/vendor/estimate`).
    Vendor,
    /// SKU pricing backend (`/pricing`).
    Sku,
}

impl Estimator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Estimator::Local => "local",
            Estimator::Vendor => "vendor",
            Estimator::Sku => "sku",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub label: String,
    /// Unit amount (not rounded).
    pub amount: Money,
    pub qty: u32,
    /// `amount * qty` (not rounded).
    pub total: Money,
}

impl LineItem {
    pub fn new(label: impl Into<String>, amount: Money, qty: u32) -> Self {
        Self {
            label: label.into(),
            amount,
            qty,
            total: amount.times(qty),
        }
    }

    pub fn single(label: impl Into<String>, amount: Money) -> Self {
        Self::new(label, amount, 1)
    }
}

/// Immutable quotation snapshot. Replaced wholesale, never edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub estimator: Estimator,
    pub currency: String,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    pub subtotal: Money,
    pub shipping: Money,
    pub tax: Money,
    pub total: Money,
    #[serde(default)]
    pub notes: Vec<String>,
}

impl Quote {
    /// Build a quote from unrounded line items and shipping; subtotal,
    /// shipping, tax and total are rounded to cents here and only here.
    pub fn from_lines(
        estimator: Estimator,
        currency: impl Into<String>,
        line_items: Vec<LineItem>,
        shipping: Money,
        tax: Money,
        notes: Vec<String>,
    ) -> Self {
        let subtotal: Money = line_items.iter().map(|li| li.total).sum();
        let total = subtotal + shipping + tax;
        Self {
            estimator,
            currency: currency.into(),
            line_items,
            subtotal: subtotal.round_cents(),
            shipping: shipping.round_cents(),
            tax: tax.round_cents(),
            total: total.round_cents(),
            notes,
        }
    }
}
