//! Relay core for PG coin purchases and payouts through NOWPayments.
//!
//! The game client talks to this layer instead of the processor directly, so
//! the API key never ships with the client. Each operation checks the key,
//! validates and normalizes the client payload, forwards it, and maps the
//! outcome onto a [`RelayError`] with a fixed HTTP status.
//!
//! # Modules
//!
//! - [`relay`]: the [`Relay`] service and its [`RelayConfig`]
//! - [`processor`]: the [`PaymentProcessor`] trait over the upstream API
//! - [`nowpayments`]: reqwest implementation of [`PaymentProcessor`]
//! - [`payment`] / [`payout`]: inbound drafts and outbound request shapes
//! - [`callback`]: IPN parsing and the [`CallbackHooks`] collaborator
//! - [`constants`]: conversion rate, payout minimum, defaults

pub mod callback;
pub mod constants;
pub mod error;
mod field;
pub mod nowpayments;
pub mod payment;
pub mod payout;
pub mod processor;
pub mod relay;

pub use callback::{
    CallbackAction, CallbackHooks, CallbackKind, CallbackStatus, HookError, LoggingHooks,
    StatusCallback,
};
pub use error::RelayError;
pub use nowpayments::NowPaymentsClient;
pub use payment::{PaymentDraft, PaymentRequest};
pub use payout::{PayoutDraft, PayoutRequest, PayoutSummary, WithdrawalBatch};
pub use processor::PaymentProcessor;
pub use relay::{Relay, RelayConfig};
