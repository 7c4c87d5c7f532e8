//! Intent extraction: model-backed with a deterministic pattern fallback
//!
//! Two implementations of one [`IntentExtractor`] capability:
//!
//! 1. [`PatternExtractor`] - pure, total regex extraction. Never fails.
//! 2. [`ModelExtractor`] - prompts a chat model to emit a strict JSON
//!    intent, then normalizes it. Any model, transport, or shape failure
//!    delegates to the pattern extractor; model-specific response shapes
//!    never leak past this module.

use super::{canonical_amount, IntentAction, PaymentIntent, AMOUNT_NONE};
use crate::config::ModelConfig;
use crate::error::IntentError;
use regex::Regex;
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// System prompt that constrains the model to a bare JSON intent object
const SYSTEM_PROMPT: &str = r#"You are a strict parser. Given a plain user instruction about sending money, return ONLY a single JSON object and nothing else.

Schema:
{"action":"send"|"unknown", "amount":"<numeric string or null>", "currency":"USDC"|"null", "recipient":"<alias starting with @ or hex address or empty>"}

Rules:
- Normalize currency to "USDC" where implied.
- Amount: return as numeric string without commas or symbols (e.g. "10", "5.50"). If you cannot find an amount, set "amount":"null".
- recipient: return the alias exactly (e.g., "@CoolStreamer") or a hex address (0x...). If not present, set to empty string "".
- If ambiguous or you can't confidently parse, set action to "unknown".
"#;

/// Converts free-form text into a normalized payment intent
#[async_trait::async_trait]
pub trait IntentExtractor: Send + Sync {
    /// Extract an intent. The only error is [`IntentError::EmptyInput`];
    /// everything else degrades internally to a best-effort intent.
    async fn extract(&self, text: &str) -> Result<PaymentIntent, IntentError>;
}

// ============================================================================
// Pattern extractor
// ============================================================================

/// Deterministic regex-based extractor. Pure function of the input text:
/// it never performs I/O and never fails on non-empty input.
pub struct PatternExtractor {
    amount: Regex,
    alias: Regex,
    address: Regex,
    transfer_verb: Regex,
}

impl PatternExtractor {
    pub fn new() -> Self {
        Self {
            amount: Regex::new(r"[0-9]+(?:\.[0-9]+)?").unwrap(),
            alias: Regex::new(r"@[\w-]{1,64}").unwrap(),
            address: Regex::new(r"0x[a-fA-F0-9]{40}").unwrap(),
            transfer_verb: Regex::new(r"(?i)send|transfer|pay").unwrap(),
        }
    }

    /// Total extraction: first decimal number as amount, first @alias or
    /// 40-hex address as recipient, action "send" iff a transfer verb is
    /// present. Currency is always forced to USDC.
    pub fn extract_from(&self, text: &str) -> PaymentIntent {
        let amount = self
            .amount
            .find(text)
            .and_then(|m| canonical_amount(m.as_str()))
            .unwrap_or_else(|| AMOUNT_NONE.to_string());

        let recipient = self
            .alias
            .find(text)
            .or_else(|| self.address.find(text))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();

        let action = if self.transfer_verb.is_match(text) {
            IntentAction::Send
        } else {
            IntentAction::Unknown
        };

        PaymentIntent {
            action,
            amount,
            currency: "USDC".to_string(),
            recipient,
        }
    }
}

impl Default for PatternExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IntentExtractor for PatternExtractor {
    async fn extract(&self, text: &str) -> Result<PaymentIntent, IntentError> {
        if text.trim().is_empty() {
            return Err(IntentError::EmptyInput);
        }
        Ok(self.extract_from(text))
    }
}

// ============================================================================
// Model extractor
// ============================================================================

/// Model-backed extractor with the pattern extractor as internal fallback
pub struct ModelExtractor {
    config: ModelConfig,
    client: Client,
    fallback: PatternExtractor,
}

impl ModelExtractor {
    /// Create a model extractor. Returns None when the endpoint or
    /// credential is missing, so callers fall back to pattern-only mode.
    pub fn new(config: ModelConfig) -> Option<Self> {
        if !config.is_configured() {
            return None;
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .ok()?;

        Some(Self {
            config,
            client,
            fallback: PatternExtractor::new(),
        })
    }

    /// Send the instruction to the chat endpoint and return the raw
    /// response body as JSON.
    async fn send_request(&self, text: &str) -> Result<Value, reqwest::Error> {
        // is_configured() was checked in new()
        let api_url = self.config.api_url.as_deref().unwrap_or_default();
        let api_key = self.config.api_key.as_deref().unwrap_or_default();
        let url = format!("{}/{}", api_url.trim_end_matches('/'), self.config.model);

        let body = json!({
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": text },
            ],
            "max_tokens": self.config.max_tokens,
        });

        debug!("Sending intent-extraction request to {}", self.config.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        response.json().await
    }

    /// Probe the known response shapes for the model's output text.
    /// An unrecognized shape is treated as "no usable text".
    fn response_text(value: &Value) -> Option<String> {
        if let Some(text) = value.get("response").and_then(Value::as_str) {
            return Some(text.to_string());
        }
        if let Some(text) = value
            .get("result")
            .and_then(|r| r.get("response"))
            .and_then(Value::as_str)
        {
            return Some(text.to_string());
        }
        if let Some(items) = value.get("output").and_then(Value::as_array) {
            if let Some(first) = items.first() {
                if let Some(text) = first.get("content").and_then(Value::as_str) {
                    return Some(text.to_string());
                }
                if let Some(text) = first.as_str() {
                    return Some(text.to_string());
                }
            }
        }
        if let Some(text) = value.get("output_text").and_then(Value::as_str) {
            return Some(text.to_string());
        }
        None
    }

    /// Locate the first brace-delimited JSON object in the model's text
    fn locate_json(text: &str) -> Option<&str> {
        let trimmed = text.trim();
        let start = trimmed.find('{')?;
        let end = trimmed.rfind('}')?;
        (end > start).then(|| &trimmed[start..=end])
    }

    /// Reduce the model's raw output text to an intent, falling back to
    /// pattern extraction over that same text when no JSON can be parsed.
    fn intent_from_text(&self, text: &str) -> PaymentIntent {
        if let Some(candidate) = Self::locate_json(text) {
            match serde_json::from_str::<Value>(candidate) {
                Ok(parsed) => return PaymentIntent::from_model_value(&parsed),
                Err(e) => {
                    debug!("Model emitted unparseable JSON: {}", e);
                }
            }
        }
        // No usable JSON; pattern-extract the model's own words
        self.fallback.extract_from(text)
    }
}

#[async_trait::async_trait]
impl IntentExtractor for ModelExtractor {
    async fn extract(&self, text: &str) -> Result<PaymentIntent, IntentError> {
        if text.trim().is_empty() {
            return Err(IntentError::EmptyInput);
        }

        match self.send_request(text).await {
            Ok(body) => match Self::response_text(&body) {
                Some(model_text) => Ok(self.intent_from_text(&model_text)),
                None => {
                    warn!("Model response had no recognizable text field");
                    Ok(self.fallback.extract_from(text))
                }
            },
            Err(e) => {
                warn!("Model call failed, using pattern fallback: {}", e);
                Ok(self.fallback.extract_from(text))
            }
        }
    }
}

/// Build the configured extractor: model-backed when credentials exist,
/// otherwise the bare pattern extractor.
pub fn build_extractor(config: &ModelConfig) -> Arc<dyn IntentExtractor> {
    match ModelExtractor::new(config.clone()) {
        Some(model) => Arc::new(model),
        None => Arc::new(PatternExtractor::new()),
    }
}

// ============================================================================
// Tests
// ============================================================================
