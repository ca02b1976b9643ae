//! Status callbacks (IPN) sent by NOWPayments for payments and payouts.
//!
//! Callbacks are acknowledged unconditionally; redelivery is the
//! notifier's business. The relay only classifies the status and hands the
//! notification to a [`CallbackHooks`] implementation.

use serde::Deserialize;
use serde_json::Value;

use crate::field;

/// Which webhook the notification arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackKind {
    Payment,
    Payout,
}

impl CallbackKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallbackKind::Payment => "payment",
            CallbackKind::Payout => "payout",
        }
    }
}

/// Recognised callback statuses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackStatus {
    Finished,
    Failed,
    Other(String),
}

impl CallbackStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "finished" => CallbackStatus::Finished,
            "failed" => CallbackStatus::Failed,
            other => CallbackStatus::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            CallbackStatus::Finished => "finished",
            CallbackStatus::Failed => "failed",
            CallbackStatus::Other(s) => s,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawCallback {
    payment_id: Option<Value>,
    id: Option<Value>,
    order_id: Option<Value>,
    status: Option<Value>,
    payment_status: Option<Value>,
    address: Option<Value>,
    payout_address: Option<Value>,
    pay_address: Option<Value>,
    currency: Option<Value>,
    pay_currency: Option<Value>,
    amount: Option<Value>,
    actually_paid: Option<Value>,
    price_amount: Option<Value>,
}

/// A parsed status notification.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusCallback {
    pub kind: CallbackKind,
    /// `payment_id` for payments, `id` for payouts.
    pub id: Option<String>,
    pub order_id: Option<String>,
    pub status: CallbackStatus,
    pub address: Option<String>,
    pub currency: Option<String>,
    pub amount: Option<String>,
}

impl StatusCallback {
    /// Parse a notification body. Returns `None` when the body is not a JSON
    /// object or carries no status.
    pub fn parse(kind: CallbackKind, body: &[u8]) -> Option<Self> {
        let raw: RawCallback = serde_json::from_slice(body).ok()?;
        // Payment IPNs report `payment_status`; payout callbacks report `status`.
        let status = match kind {
            CallbackKind::Payment => field::text(raw.payment_status.as_ref())
                .or_else(|| field::text(raw.status.as_ref())),
            CallbackKind::Payout => field::text(raw.status.as_ref())
                .or_else(|| field::text(raw.payment_status.as_ref())),
        }?;

        let id = match kind {
            CallbackKind::Payment => field::text(raw.payment_id.as_ref()),
            CallbackKind::Payout => {
                field::text(raw.id.as_ref()).or_else(|| field::text(raw.payment_id.as_ref()))
            }
        };
        let order_id = match kind {
            CallbackKind::Payment => field::text(raw.order_id.as_ref()),
            CallbackKind::Payout => None,
        };

        Some(Self {
            kind,
            id,
            order_id,
            status: CallbackStatus::parse(&status),
            address: field::text(raw.address.as_ref())
                .or_else(|| field::text(raw.payout_address.as_ref()))
                .or_else(|| field::text(raw.pay_address.as_ref())),
            currency: field::text(raw.currency.as_ref())
                .or_else(|| field::text(raw.pay_currency.as_ref())),
            amount: field::text(raw.amount.as_ref())
                .or_else(|| field::text(raw.actually_paid.as_ref()))
                .or_else(|| field::text(raw.price_amount.as_ref())),
        })
    }
}

/// Failure reported by a hook. Logged, never surfaced to the notifier.
#[derive(Debug, thiserror::Error)]
pub enum HookError {
    #[error("ledger unavailable: {0}")]
    LedgerUnavailable(String),

    #[error("unknown reference: {0}")]
    UnknownReference(String),
}

/// Side effects triggered by terminal callback statuses.
///
/// Crediting PG coins and refunding failed payouts need an order/payout
/// ledger this service does not own; implementations bridge to it.
pub trait CallbackHooks: Send + Sync {
    /// A payment or payout reached `finished`.
    fn on_finished(&self, callback: &StatusCallback) -> Result<(), HookError>;

    /// A payment or payout reached `failed`.
    fn on_failed(&self, callback: &StatusCallback) -> Result<(), HookError>;
}

/// Default hooks: record the event in the log and nothing else.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHooks;

impl CallbackHooks for LoggingHooks {
    fn on_finished(&self, callback: &StatusCallback) -> Result<(), HookError> {
        match callback.kind {
            CallbackKind::Payment => tracing::info!(
                payment_id = callback.id.as_deref().unwrap_or("-"),
                order_id = callback.order_id.as_deref().unwrap_or("-"),
                "payment finished; crediting the player is left to the ledger"
            ),
            CallbackKind::Payout => tracing::info!(
                payout_id = callback.id.as_deref().unwrap_or("-"),
                address = callback.address.as_deref().unwrap_or("-"),
                "payout finished"
            ),
        }
        Ok(())
    }

    fn on_failed(&self, callback: &StatusCallback) -> Result<(), HookError> {
        tracing::warn!(
            kind = callback.kind.as_str(),
            id = callback.id.as_deref().unwrap_or("-"),
            "callback reported failure; refund or flag for review"
        );
        Ok(())
    }
}

/// What the relay did with a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    /// `finished` and the hook succeeded.
    Settled,
    /// `failed` and the hook succeeded.
    Reversed,
    /// A hook returned an error; still acknowledged.
    HookFailed,
    /// Non-terminal status, logged only.
    Ignored,
    /// Body could not be parsed; still acknowledged.
    Malformed,
}

impl CallbackAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallbackAction::Settled => "settled",
            CallbackAction::Reversed => "reversed",
            CallbackAction::HookFailed => "hook_failed",
            CallbackAction::Ignored => "ignored",
            CallbackAction::Malformed => "malformed",
        }
    }
}
