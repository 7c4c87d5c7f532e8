//! Transfer execution types
//!
//! [`PaymentResult`] is the single terminal outcome type of the executor:
//! every validation failure, provider rejection, and transport failure is a
//! structured result, never an unhandled fault.

pub mod executor;
pub mod idempotency;
pub mod resolver;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use executor::TransferExecutor;
pub use idempotency::idempotency_key;
pub use resolver::RecipientResolver;

/// Per-transfer ceiling in whole USDC units
pub const MAX_SINGLE_TRANSFER: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);

/// Maximum outbound attempts per transfer (initial call + retries)
pub const MAX_ATTEMPTS: u32 = 3;

/// Machine-readable failure codes, stable across the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidAmount,
    UnsupportedCurrency,
    RecipientUnknown,
    AmountLimit,
    /// Provider rejected the request (after retries for transient statuses)
    CircleError,
    /// Transport-level failure after exhausting retries
    NetworkError,
    /// Defensive fallback; seeing this in tests indicates a logic gap
    Unknown,
}

impl ErrorCode {
    /// Short lowercase description used in the wire `error` field
    pub fn as_message(&self) -> &'static str {
        match self {
            ErrorCode::InvalidAmount => "invalid_amount",
            ErrorCode::UnsupportedCurrency => "unsupported_currency",
            ErrorCode::RecipientUnknown => "unknown_recipient",
            ErrorCode::AmountLimit => "amount_exceeds_limit",
            ErrorCode::CircleError => "circle_error",
            ErrorCode::NetworkError => "network_error",
            ErrorCode::Unknown => "unexpected_failure",
        }
    }
}

/// Terminal outcome of a transfer attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PaymentResult {
    Success {
        #[serde(rename = "txId")]
        tx_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        explorer: Option<String>,
    },
    Failure {
        error: String,
        code: ErrorCode,
        #[serde(skip_serializing_if = "Option::is_none")]
        details: Option<Value>,
    },
}

impl PaymentResult {
    pub fn success(tx_id: impl Into<String>, explorer: Option<String>) -> Self {
        Self::Success {
            tx_id: tx_id.into(),
            explorer,
        }
    }

    pub fn failure(code: ErrorCode) -> Self {
        Self::Failure {
            error: code.as_message().to_string(),
            code,
            details: None,
        }
    }

    pub fn failure_with_details(code: ErrorCode, details: Value) -> Self {
        Self::Failure {
            error: code.as_message().to_string(),
            code,
            details: Some(details),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Per-request execution context supplied by the caller
#[derive(Debug, Clone)]
pub struct SendOptions {
    /// Authenticated user id, or the anonymous sentinel
    pub user_id: String,
    /// Client-supplied trace id. MUST NOT be generated server-side: the
    /// idempotency key depends on it surviving client retries unchanged.
    pub trace_id: Option<String>,
}

impl SendOptions {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            trace_id: None,
        }
    }

    pub fn anonymous() -> Self {
        Self::new("anonymous")
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_wire_format() {
        let json = serde_json::to_string(&ErrorCode::AmountLimit).unwrap();
        assert_eq!(json, "\"AMOUNT_LIMIT\"");
        let json = serde_json::to_string(&ErrorCode::CircleError).unwrap();
        assert_eq!(json, "\"CIRCLE_ERROR\"");
    }

    #[test]
    fn test_max_transfer_constant() {
        assert_eq!(MAX_SINGLE_TRANSFER, Decimal::from(10_000));
    }

    #[test]
    fn test_failure_serialization() {
        let result = PaymentResult::failure(ErrorCode::RecipientUnknown);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["error"], "unknown_recipient");
        assert_eq!(json["code"], "RECIPIENT_UNKNOWN");
    }

    #[test]
    fn test_anonymous_options() {
        let opts = SendOptions::anonymous();
        assert_eq!(opts.user_id, "anonymous");
        assert!(opts.trace_id.is_none());
    }

    #[test]
    fn test_success_serialization_skips_missing_explorer() {
        let result = PaymentResult::success("tx-1", None);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["txId"], "tx-1");
        assert!(json.get("explorer").is_none());
    }
}
