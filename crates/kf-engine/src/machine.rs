//! Order lifecycle state machine.
//!
//! # Design
//!
//! [`transition`] takes the current order by reference and returns the next
//! one; the input is never mutated. A rejected command returns
//! [`GuardViolation`] and nothing else happens: no status change, no audit
//! entry, no timestamp bump.
//!
//! Every accepted transition appends exactly one audit entry and moves
//! `updatedAt` strictly forward.
//!
//! ```text
//! INTAKE ──BeginSpecReview──► SPEC_REVIEW
//!   │                            │
//!   └──────────GenerateQuote─────┴──► QUOTE_SENT ◄─┐ (re-quote)
//!                                        │─────────┘
//!                                   ClientAccept
//!                                        ▼
//!                                 CLIENT_ACCEPTED ──CEOApprove──► CEO_APPROVED
//!                                                                     │
//!                                                              PlaceVendorOrder
//!                                                                     ▼
//!            CLOSED ◄──delivered── FULFILLMENT ◄──UpdateFulfillment── VENDOR_ORDERED
//! ```
//!
//! Deterministic, pure logic. No IO; time is passed in.

use chrono::{DateTime, Duration, Utc};
use kf_audit::action;
use kf_catalog::{default_spec, ConstraintCatalog};
use kf_compliance::{clamp, validate};
use kf_schemas::{
    AuditEntry, AuditLog, CeoApproval, ClientAcceptance, Fulfillment, Order, OrderStatus, Quote,
    VendorOrder,
};
use std::fmt;

use OrderStatus as S;

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Guarded lifecycle commands, named as operators know them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    BeginSpecReview,
    GenerateQuote,
    ClientAccept,
    CeoApprove,
    PlaceVendorOrder,
    UpdateFulfillment,
    EditSpec,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::BeginSpecReview => "BeginSpecReview",
            Command::GenerateQuote => "GenerateQuote",
            Command::ClientAccept => "ClientAccept",
            Command::CeoApprove => "CEOApprove",
            Command::PlaceVendorOrder => "PlaceVendorOrder",
            Command::UpdateFulfillment => "UpdateFulfillment",
            Command::EditSpec => "EditSpec",
        }
    }

    /// Statuses from which the command may run.
    pub fn allowed_from(&self) -> &'static [OrderStatus] {
        match self {
            Command::BeginSpecReview => &[S::Intake],
            Command::GenerateQuote => &[S::Intake, S::SpecReview, S::QuoteSent],
            Command::ClientAccept => &[S::QuoteSent],
            Command::CeoApprove => &[S::ClientAccepted],
            Command::PlaceVendorOrder => &[S::CeoApproved],
            Command::UpdateFulfillment => &[S::VendorOrdered, S::Fulfillment],
            Command::EditSpec => &[S::Intake, S::SpecReview],
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Partial fulfillment data. Blank fields leave existing values alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FulfillmentUpdate {
    pub tracking: String,
    pub carrier: String,
    pub eta: String,
    pub delivered_at: Option<DateTime<Utc>>,
}

/// Input to [`transition`].
#[derive(Debug, Clone, PartialEq)]
pub enum OrderEvent {
    BeginSpecReview,
    /// The quote has already been priced. Compliance is checked by
    /// [`check_quotable`] before pricing; `transition` re-checks only status
    /// and client name.
    QuoteGenerated { quote: Quote },
    ClientAccepted { accepted_by: Option<String> },
    CeoApproved { approved_by: String, comment: String },
    VendorOrderPlaced {
        vendor: String,
        po_number: String,
        link: String,
    },
    FulfillmentUpdated(FulfillmentUpdate),
}

impl OrderEvent {
    pub fn command(&self) -> Command {
        match self {
            OrderEvent::BeginSpecReview => Command::BeginSpecReview,
            OrderEvent::QuoteGenerated { .. } => Command::GenerateQuote,
            OrderEvent::ClientAccepted { .. } => Command::ClientAccept,
            OrderEvent::CeoApproved { .. } => Command::CeoApprove,
            OrderEvent::VendorOrderPlaced { .. } => Command::PlaceVendorOrder,
            OrderEvent::FulfillmentUpdated(_) => Command::UpdateFulfillment,
        }
    }
}

// ---------------------------------------------------------------------------
// GuardViolation
// ---------------------------------------------------------------------------

/// An unmet command precondition. Always recoverable; the order is unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardViolation {
    WrongStatus {
        command: Command,
        actual: OrderStatus,
    },
    /// Compliance warnings block pricing.
    NotQuotable { warnings: Vec<String> },
    ClientNameMissing,
    QuoteMissing,
    /// No explicit acceptor and the client record names nobody.
    AcceptorMissing,
    VendorMissing,
    SpecLocked { status: OrderStatus },
}

impl fmt::Display for GuardViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuardViolation::WrongStatus { command, actual } => {
                let need: Vec<&str> = command.allowed_from().iter().map(|s| s.as_str()).collect();
                write!(
                    f,
                    "{command} requires status {} (current: {actual})",
                    need.join(" or ")
                )
            }
            GuardViolation::NotQuotable { warnings } => write!(
                f,
                "GenerateQuote blocked by {} compliance warning(s): {}",
                warnings.len(),
                warnings.join("; ")
            ),
            GuardViolation::ClientNameMissing => {
                write!(f, "GenerateQuote requires a client name")
            }
            GuardViolation::QuoteMissing => write!(f, "ClientAccept requires a quote"),
            GuardViolation::AcceptorMissing => {
                write!(f, "ClientAccept requires an acceptor name")
            }
            GuardViolation::VendorMissing => write!(f, "PlaceVendorOrder requires a vendor"),
            GuardViolation::SpecLocked { status } => {
                write!(f, "spec is locked in status {status}")
            }
        }
    }
}

impl std::error::Error for GuardViolation {}

// ---------------------------------------------------------------------------
// Guards
// ---------------------------------------------------------------------------

fn require_status(order: &Order, command: Command) -> Result<(), GuardViolation> {
    if command.allowed_from().contains(&order.status) {
        Ok(())
    } else {
        Err(GuardViolation::WrongStatus {
            command,
            actual: order.status,
        })
    }
}

fn non_blank(s: &str) -> Option<String> {
    let t = s.trim();
    (!t.is_empty()).then(|| t.to_string())
}

/// Full GenerateQuote guard: status, client name, then compliance.
///
/// Run before pricing so a blocked order never reaches an oracle.
pub fn check_quotable(order: &Order, catalog: &ConstraintCatalog) -> Result<(), GuardViolation> {
    require_status(order, Command::GenerateQuote)?;
    if non_blank(&order.client.client_name).is_none() {
        return Err(GuardViolation::ClientNameMissing);
    }
    let warnings = validate(&order.spec, catalog, &order.client);
    if !warnings.is_empty() {
        return Err(GuardViolation::NotQuotable {
            warnings: warnings.into_iter().map(|w| w.message).collect(),
        });
    }
    Ok(())
}

/// Spec edits are accepted only before a quote is sent.
pub fn check_spec_editable(order: &Order) -> Result<(), GuardViolation> {
    if order.status.spec_editable() {
        Ok(())
    } else {
        Err(GuardViolation::SpecLocked {
            status: order.status,
        })
    }
}

/// Next `updatedAt`: `at`, or one millisecond past `prev` if the clock has
/// not moved on.
pub fn advance_clock(prev: DateTime<Utc>, at: DateTime<Utc>) -> DateTime<Utc> {
    if at > prev {
        at
    } else {
        prev + Duration::milliseconds(1)
    }
}

// ---------------------------------------------------------------------------
// Transition
// ---------------------------------------------------------------------------

/// Apply `event` to `order` on behalf of `by`.
pub fn transition(
    order: &Order,
    event: OrderEvent,
    by: &str,
    at: DateTime<Utc>,
) -> Result<Order, GuardViolation> {
    require_status(order, event.command())?;

    let stamp = advance_clock(order.updated_at, at);
    let mut next = order.clone();

    let (tag, detail) = match event {
        OrderEvent::BeginSpecReview => {
            next.status = S::SpecReview;
            (action::SPEC_REVIEW_STARTED, None)
        }

        OrderEvent::QuoteGenerated { quote } => {
            if non_blank(&order.client.client_name).is_none() {
                return Err(GuardViolation::ClientNameMissing);
            }
            let provenance = quote.estimator.as_str().to_string();
            next.quote = Some(quote);
            next.status = S::QuoteSent;
            (action::QUOTE_GENERATED, Some(provenance))
        }

        OrderEvent::ClientAccepted { accepted_by } => {
            if order.quote.is_none() {
                return Err(GuardViolation::QuoteMissing);
            }
            let who = accepted_by
                .as_deref()
                .and_then(non_blank)
                .or_else(|| non_blank(&order.client.client_name))
                .or_else(|| non_blank(&order.client.company))
                .ok_or(GuardViolation::AcceptorMissing)?;
            next.client_acceptance = Some(ClientAcceptance {
                accepted_by: who.clone(),
                accepted_at: stamp,
            });
            next.status = S::ClientAccepted;
            (action::CLIENT_ACCEPTED, Some(who))
        }

        OrderEvent::CeoApproved {
            approved_by,
            comment,
        } => {
            let who = non_blank(&approved_by).unwrap_or_else(|| "CEO".to_string());
            let comment = comment.trim().to_string();
            let detail = non_blank(&comment);
            next.ceo_approval = Some(CeoApproval {
                approved_by: who,
                approved_at: stamp,
                comment,
            });
            next.status = S::CeoApproved;
            (action::CEO_APPROVED, detail)
        }

        OrderEvent::VendorOrderPlaced {
            vendor,
            po_number,
            link,
        } => {
            let vendor = non_blank(&vendor).ok_or(GuardViolation::VendorMissing)?;
            let po_number = po_number.trim().to_string();
            let detail = if po_number.is_empty() {
                vendor.clone()
            } else {
                format!("{vendor} PO {po_number}")
            };
            next.vendor_order = Some(VendorOrder {
                vendor,
                po_number,
                link: link.trim().to_string(),
                ordered_at: stamp,
            });
            next.status = S::VendorOrdered;
            (action::VENDOR_ORDER_PLACED, Some(detail))
        }

        OrderEvent::FulfillmentUpdated(update) => {
            let mut f = order.fulfillment.clone().unwrap_or_default();
            merge_text(&mut f.tracking, &update.tracking);
            merge_text(&mut f.carrier, &update.carrier);
            merge_text(&mut f.eta, &update.eta);
            if update.delivered_at.is_some() {
                f.delivered_at = update.delivered_at;
            }
            let detail = fulfillment_detail(&f);
            let delivered = f.delivered_at.is_some();
            next.fulfillment = Some(f);
            if delivered {
                next.status = S::Closed;
                (action::DELIVERED, detail)
            } else {
                next.status = S::Fulfillment;
                (action::FULFILLMENT_UPDATE, detail)
            }
        }
    };

    next.updated_at = stamp;
    next.audit.append(AuditEntry::new(stamp, by, tag, detail));
    Ok(next)
}

fn merge_text(slot: &mut String, incoming: &str) {
    if let Some(v) = non_blank(incoming) {
        *slot = v;
    }
}

fn fulfillment_detail(f: &Fulfillment) -> Option<String> {
    let parts: Vec<String> = [
        ("carrier", &f.carrier),
        ("tracking", &f.tracking),
        ("eta", &f.eta),
    ]
    .iter()
    .filter(|(_, v)| !v.is_empty())
    .map(|(k, v)| format!("{k}={v}"))
    .collect();
    (!parts.is_empty()).then(|| parts.join(" "))
}

// ---------------------------------------------------------------------------
// Unguarded constructors
// ---------------------------------------------------------------------------

/// A fresh order from catalog defaults, seeded with `ORDER_CREATED`.
pub fn new_order(
    catalog: &ConstraintCatalog,
    order_id: String,
    by: &str,
    at: DateTime<Utc>,
) -> Order {
    Order {
        order_id,
        status: S::Intake,
        created_at: at,
        updated_at: at,
        client: Default::default(),
        spec: clamp(&default_spec(catalog), catalog),
        payment: Default::default(),
        quote: None,
        client_acceptance: None,
        ceo_approval: None,
        vendor_order: None,
        fulfillment: None,
        audit: AuditLog::seeded(AuditEntry::new(at, by, action::ORDER_CREATED, None)),
    }
}

/// Back to catalog defaults under the same id; the audit log restarts at
/// `ORDER_RESET`.
pub fn reset_order(
    order: &Order,
    catalog: &ConstraintCatalog,
    by: &str,
    at: DateTime<Utc>,
) -> Order {
    let stamp = advance_clock(order.updated_at, at);
    let mut next = new_order(catalog, order.order_id.clone(), by, stamp);
    next.created_at = order.created_at;
    next.audit.reset(AuditEntry::new(
        stamp,
        by,
        action::ORDER_RESET,
        Some(format!("reset from {}", order.status)),
    ));
    next
}
