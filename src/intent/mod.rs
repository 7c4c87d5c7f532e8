//! Payment intent types and normalization
//!
//! The extractor (model-backed or pattern-based) produces a normalized
//! [`PaymentIntent`]. The route layer validates actionability; the intent is
//! immutable and discarded after validation.

pub mod extractor;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use extractor::{IntentExtractor, ModelExtractor, PatternExtractor};

/// Sentinel amount meaning "no amount found in the input"
pub const AMOUNT_NONE: &str = "null";

/// What the user asked the agent to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntentAction {
    Send,
    /// The extractor could not confidently parse the instruction
    Unknown,
}

/// Normalized representation of "who gets how much of what"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub action: IntentAction,
    /// Canonical numeric string (no separators or symbols), or [`AMOUNT_NONE`]
    pub amount: String,
    /// "USDC" when recognized; anything else is rejected downstream
    pub currency: String,
    /// `@alias` token, 0x-prefixed 40-hex address, or empty string
    pub recipient: String,
}

impl PaymentIntent {
    /// Intent with nothing usable in it
    pub fn unknown() -> Self {
        Self {
            action: IntentAction::Unknown,
            amount: AMOUNT_NONE.to_string(),
            currency: "USDC".to_string(),
            recipient: String::new(),
        }
    }

    /// An intent can be executed iff it is a send of a positive USDC amount
    /// to a named recipient. Checked by the caller, not the extractor.
    pub fn is_actionable(&self) -> bool {
        self.action == IntentAction::Send
            && self.currency == "USDC"
            && !self.recipient.is_empty()
            && matches!(
                self.amount.parse::<Decimal>(),
                Ok(amount) if amount > Decimal::ZERO
            )
    }

    /// Normalize a loosely-shaped model JSON object into an intent.
    ///
    /// The model is prompted for a strict shape but treated defensively:
    /// amount may arrive as a number or string, fields may be missing, and
    /// anything unusable degrades to the corresponding empty/sentinel value.
    pub fn from_model_value(value: &Value) -> Self {
        let action = match value.get("action").and_then(Value::as_str) {
            Some("send") => IntentAction::Send,
            _ => IntentAction::Unknown,
        };

        let amount = match value.get("amount") {
            Some(Value::String(s)) => canonical_amount(s).unwrap_or_else(|| AMOUNT_NONE.into()),
            Some(Value::Number(n)) => {
                canonical_amount(&n.to_string()).unwrap_or_else(|| AMOUNT_NONE.into())
            }
            _ => AMOUNT_NONE.to_string(),
        };

        let recipient = value
            .get("recipient")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Self {
            action,
            amount,
            currency: "USDC".to_string(),
            recipient,
        }
    }
}

/// Canonicalize a raw amount string: strip thousands separators, reject
/// non-numeric input, drop trailing zeros ("5.50" becomes "5.5").
pub(crate) fn canonical_amount(raw: &str) -> Option<String> {
    let cleaned = raw.trim().replace(',', "");
    let amount: Decimal = cleaned.parse().ok()?;
    Some(amount.normalize().to_string())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_amount_strips_trailing_zeros() {
        assert_eq!(canonical_amount("5.50"), Some("5.5".to_string()));
        assert_eq!(canonical_amount("10"), Some("10".to_string()));
        assert_eq!(canonical_amount("1,000.25"), Some("1000.25".to_string()));
    }

    #[test]
    fn test_canonical_amount_rejects_garbage() {
        assert_eq!(canonical_amount("null"), None);
        assert_eq!(canonical_amount(""), None);
        assert_eq!(canonical_amount("ten"), None);
    }

    #[test]
    fn test_actionable_intent() {
        let intent = PaymentIntent {
            action: IntentAction::Send,
            amount: "5".to_string(),
            currency: "USDC".to_string(),
            recipient: "@alice".to_string(),
        };
        assert!(intent.is_actionable());
    }

    #[test]
    fn test_non_actionable_variants() {
        let base = PaymentIntent {
            action: IntentAction::Send,
            amount: "5".to_string(),
            currency: "USDC".to_string(),
            recipient: "@alice".to_string(),
        };

        let mut missing_amount = base.clone();
        missing_amount.amount = AMOUNT_NONE.to_string();
        assert!(!missing_amount.is_actionable());

        let mut zero_amount = base.clone();
        zero_amount.amount = "0".to_string();
        assert!(!zero_amount.is_actionable());

        let mut wrong_currency = base.clone();
        wrong_currency.currency = "EUR".to_string();
        assert!(!wrong_currency.is_actionable());

        let mut no_recipient = base.clone();
        no_recipient.recipient = String::new();
        assert!(!no_recipient.is_actionable());

        let mut unknown = base;
        unknown.action = IntentAction::Unknown;
        assert!(!unknown.is_actionable());
    }

    #[test]
    fn test_from_model_value_numeric_amount() {
        let intent = PaymentIntent::from_model_value(&json!({
            "action": "send",
            "amount": 5.50,
            "currency": "USDC",
            "recipient": "@alice"
        }));
        assert_eq!(intent.action, IntentAction::Send);
        assert_eq!(intent.amount, "5.5");
        assert_eq!(intent.recipient, "@alice");
    }

    #[test]
    fn test_from_model_value_missing_fields() {
        let intent = PaymentIntent::from_model_value(&json!({}));
        assert_eq!(intent.action, IntentAction::Unknown);
        assert_eq!(intent.amount, AMOUNT_NONE);
        assert_eq!(intent.currency, "USDC");
        assert_eq!(intent.recipient, "");
    }

    #[test]
    fn test_from_model_value_forces_currency() {
        let intent = PaymentIntent::from_model_value(&json!({
            "action": "send",
            "amount": "3",
            "currency": "EUR",
            "recipient": "@bob"
        }));
        assert_eq!(intent.currency, "USDC");
    }
}
