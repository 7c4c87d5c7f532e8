//! Voice micropayment agent
//!
//! Accepts a natural-language instruction (text or transcribed speech)
//! describing a USDC transfer, extracts a structured payment intent,
//! resolves the recipient to an on-chain address, and executes an
//! idempotent, retryable transfer against the Circle developer API.
//!
//! Pipeline: raw text -> intent extraction (model-backed with a
//! deterministic pattern fallback) -> actionability validation -> transfer
//! execution (recipient resolution, limit checks, idempotency key, bounded
//! retry with backoff, best-effort audit logging).

pub mod api;
pub mod audit;
pub mod config;
pub mod error;
pub mod intent;
pub mod payment;
pub mod voice;

pub use config::AppConfig;
pub use error::{IntentError, VoiceError};
pub use intent::{IntentAction, IntentExtractor, PaymentIntent};
pub use payment::{ErrorCode, PaymentResult, SendOptions, TransferExecutor};
