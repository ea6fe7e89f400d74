use chrono::{DateTime, Utc};
use kf_audit::AuditLog;
use serde::{Deserialize, Serialize};

use crate::{Quote, Spec};

// ---------------------------------------------------------------------------
// OrderStatus
// ---------------------------------------------------------------------------

/// Lifecycle states of an order. The graph is fixed:
///
/// ```text
/// INTAKE ─► SPEC_REVIEW (optional) ─► QUOTE_SENT ─► CLIENT_ACCEPTED ─► CEO_APPROVED
///        └────────────────────────────►                                    │
///                                                   CLOSED ◄─ FULFILLMENT ◄─ VENDOR_ORDERED
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Intake,
    SpecReview,
    QuoteSent,
    ClientAccepted,
    CeoApproved,
    VendorOrdered,
    Fulfillment,
    Closed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Intake => "INTAKE",
            OrderStatus::SpecReview => "SPEC_REVIEW",
            OrderStatus::QuoteSent => "QUOTE_SENT",
            OrderStatus::ClientAccepted => "CLIENT_ACCEPTED",
            OrderStatus::CeoApproved => "CEO_APPROVED",
            OrderStatus::VendorOrdered => "VENDOR_ORDERED",
            OrderStatus::Fulfillment => "FULFILLMENT",
            OrderStatus::Closed => "CLOSED",
        }
    }

    /// Spec edits are accepted only before a quote is sent.
    pub fn spec_editable(&self) -> bool {
        matches!(self, OrderStatus::Intake | OrderStatus::SpecReview)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Closed)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Client {
    pub client_name: String,
    pub company: String,
    pub email: String,
    pub phone: String,
    pub billing_address: String,
    pub shipping_address: String,
    pub project_name: String,
    pub notes: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[default]
    #[serde(rename = "Credit Card")]
    CreditCard,
    #[serde(rename = "Purchase Order")]
    PurchaseOrder,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CreditCard => "Credit Card",
            PaymentMethod::PurchaseOrder => "Purchase Order",
        }
    }
}

/// Payment details as captured at intake. Not a payment processor: the
/// record is stored and exported verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Payment {
    pub method: PaymentMethod,
    pub card_number: String,
    pub expiry: String,
    pub cvv: String,
    pub po_number: String,
}

impl Payment {
    /// Last four digits of the card number, or `----` when absent.
    pub fn card_last4(&self) -> String {
        let digits: Vec<char> = self
            .card_number
            .chars()
            .filter(|c| c.is_ascii_digit())
            .collect();
        if digits.len() < 4 {
            return "----".to_string();
        }
        digits[digits.len() - 4..].iter().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientAcceptance {
    pub accepted_by: String,
    pub accepted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CeoApproval {
    pub approved_by: String,
    pub approved_at: DateTime<Utc>,
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorOrder {
    pub vendor: String,
    #[serde(default)]
    pub po_number: String,
    #[serde(default)]
    pub link: String,
    pub ordered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Fulfillment {
    pub tracking: String,
    pub carrier: String,
    pub eta: String,
    pub delivered_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Order aggregate
// ---------------------------------------------------------------------------

/// The order aggregate root. Transitions replace the whole value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: String,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub client: Client,
    #[serde(default)]
    pub spec: Spec,
    #[serde(default)]
    pub payment: Payment,
    #[serde(default)]
    pub quote: Option<Quote>,
    #[serde(default)]
    pub client_acceptance: Option<ClientAcceptance>,
    #[serde(default)]
    pub ceo_approval: Option<CeoApproval>,
    #[serde(default)]
    pub vendor_order: Option<VendorOrder>,
    #[serde(default)]
    pub fulfillment: Option<Fulfillment>,
    #[serde(default)]
    pub audit: AuditLog,
}

impl Order {
    /// Check that the status agrees with the populated optional records.
    ///
    /// Returns the first missing record as an error message.
    pub fn check_consistency(&self) -> Result<(), String> {
        let s = self.status;
        let need = |present: bool, from: OrderStatus, what: &str| -> Result<(), String> {
            if s >= from && !present {
                Err(format!("status {} requires {}", s, what))
            } else {
                Ok(())
            }
        };
        need(self.quote.is_some(), OrderStatus::QuoteSent, "quote")?;
        need(
            self.client_acceptance.is_some(),
            OrderStatus::ClientAccepted,
            "clientAcceptance",
        )?;
        need(
            self.ceo_approval.is_some(),
            OrderStatus::CeoApproved,
            "ceoApproval",
        )?;
        need(
            self.vendor_order.is_some(),
            OrderStatus::VendorOrdered,
            "vendorOrder",
        )?;
        need(
            self.fulfillment.is_some(),
            OrderStatus::Fulfillment,
            "fulfillment",
        )?;
        if s == OrderStatus::Closed {
            let delivered = self
                .fulfillment
                .as_ref()
                .and_then(|f| f.delivered_at)
                .is_some();
            if !delivered {
                return Err("status CLOSED requires fulfillment.deliveredAt".to_string());
            }
        }
        Ok(())
    }
}
