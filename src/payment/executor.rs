//! Transfer execution state machine
//!
//! Sequential stages, first failure short-circuits: amount validation,
//! currency validation, recipient resolution, limit check, idempotency-key
//! derivation, then dispatch. Dispatch is either a deterministic offline
//! simulation (no provider credential configured) or a live POST to the
//! Circle developer-transfer endpoint with a bounded retry loop.
//!
//! Every terminal outcome emits a best-effort audit event.

use super::{
    idempotency_key, ErrorCode, PaymentResult, RecipientResolver, SendOptions, MAX_ATTEMPTS,
    MAX_SINGLE_TRANSFER,
};
use crate::audit::AuditLogger;
use crate::config::CircleConfig;
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Explorer URL prefix for confirmed transaction ids
const EXPLORER_TX_URL: &str = "https://explorer.arc.network/tx";

/// Prefix for transaction ids synthesized in demo mode
const DEMO_TX_PREFIX: &str = "demo-";

/// Transient provider statuses worth another attempt
fn is_retryable_status(status: StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 502 | 503 | 504)
}

/// Delay before retry `attempt` (0-indexed): 200ms, 400ms, ...
fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_millis(200 * (1u64 << attempt))
}

/// Executes validated transfers against the payments provider
pub struct TransferExecutor {
    config: CircleConfig,
    client: Client,
    resolver: RecipientResolver,
    audit: AuditLogger,
}

impl TransferExecutor {
    pub fn new(config: CircleConfig, resolver: RecipientResolver, audit: AuditLogger) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .unwrap_or_default();
        Self {
            config,
            client,
            resolver,
            audit,
        }
    }

    /// Run the full transfer state machine. Never panics and never returns
    /// an unstructured error: every outcome is a [`PaymentResult`].
    pub async fn execute(
        &self,
        amount: &str,
        currency: &str,
        recipient_token: &str,
        opts: &SendOptions,
    ) -> PaymentResult {
        // Stage 1: amount must be a finite positive decimal
        let amount = match amount.trim().parse::<Decimal>() {
            Ok(value) if value > Decimal::ZERO => value.normalize(),
            _ => return PaymentResult::failure(ErrorCode::InvalidAmount),
        };

        // Stage 2: only USDC is supported
        if !currency.eq_ignore_ascii_case("USDC") {
            return PaymentResult::failure(ErrorCode::UnsupportedCurrency);
        }

        // Stage 3: resolve the recipient to an address
        let Some(address) = self.resolver.resolve(recipient_token) else {
            return PaymentResult::failure(ErrorCode::RecipientUnknown);
        };

        // Stage 4: per-transfer ceiling
        if amount > MAX_SINGLE_TRANSFER {
            return PaymentResult::failure(ErrorCode::AmountLimit);
        }

        // Stage 5: one key for every retry of this logical transfer
        let amount_str = amount.to_string();
        let key = idempotency_key(
            &opts.user_id,
            &address,
            &amount_str,
            "USDC",
            opts.trace_id.as_deref(),
        );

        // Stage 6: dispatch
        let Some(api_key) = self.config.api_key.clone() else {
            return self.simulate(&key, &address, &amount_str, opts);
        };

        let payload = self.build_payload(&key, &address, &amount_str, opts);
        self.dispatch(&api_key, payload, opts).await
    }

    /// Demo/offline dispatch: deterministic pseudo-transaction, no network
    fn simulate(
        &self,
        key: &str,
        address: &str,
        amount: &str,
        opts: &SendOptions,
    ) -> PaymentResult {
        let tx_id = format!("{}{}", DEMO_TX_PREFIX, &key[..12]);
        let explorer = format!("{}/{}", EXPLORER_TX_URL, tx_id);

        info!("Simulated transfer {} ({} USDC to {})", tx_id, amount, address);
        self.audit.emit(json!({
            "event": "simulated_transfer",
            "userId": opts.user_id,
            "recipientAddress": address,
            "amount": amount,
            "txId": tx_id,
        }));

        PaymentResult::success(tx_id, Some(explorer))
    }

    /// Circle developer-transfer request body
    fn build_payload(
        &self,
        key: &str,
        address: &str,
        amount: &str,
        opts: &SendOptions,
    ) -> Value {
        let mut payload = json!({
            "idempotencyKey": key,
            "amount": { "amount": amount, "currency": "USDC" },
            "blockchain": "ARC-T",
            "to": { "address": address, "chain": "ARC-T" },
            "metadata": {
                "traceId": opts.trace_id.as_deref().unwrap_or(""),
                "note": "voice-micropayment",
            },
        });

        // Accounts are addressed either by wallet id or by source address
        if let Some(wallet) = &self.config.wallet_id {
            let field = if wallet.starts_with("0x") {
                "walletAddress"
            } else {
                "walletId"
            };
            payload[field] = Value::String(wallet.clone());
        }

        if let Some(token) = &self.config.token_address {
            payload["tokenAddress"] = Value::String(token.clone());
        }

        payload
    }

    /// Live dispatch: bounded retry loop with exponential backoff.
    ///
    /// Retryable outcomes are HTTP 429/502/503/504 and transport errors;
    /// everything else, and any failure on the final attempt, terminates.
    async fn dispatch(&self, api_key: &str, payload: Value, opts: &SendOptions) -> PaymentResult {
        for attempt in 0..MAX_ATTEMPTS {
            debug!(
                "Transfer attempt {}/{} to {}",
                attempt + 1,
                MAX_ATTEMPTS,
                self.config.api_url
            );

            let response = self
                .client
                .post(&self.config.api_url)
                .bearer_auth(api_key)
                .json(&payload)
                .send()
                .await;

            match response {
                Ok(response) => {
                    let status = response.status();
                    let text = response.text().await.unwrap_or_default();
                    let body: Value = serde_json::from_str(&text)
                        .unwrap_or_else(|_| json!({ "raw": text }));

                    if !status.is_success() {
                        if is_retryable_status(status) && attempt + 1 < MAX_ATTEMPTS {
                            warn!("Provider returned {}, retrying", status);
                            tokio::time::sleep(backoff_delay(attempt)).await;
                            continue;
                        }
                        self.audit.emit(json!({
                            "event": "circle_error",
                            "status": status.as_u16(),
                            "body": body,
                            "userId": opts.user_id,
                        }));
                        return PaymentResult::failure_with_details(ErrorCode::CircleError, body);
                    }

                    return self.interpret_success(&body, opts);
                }
                Err(e) => {
                    if attempt + 1 < MAX_ATTEMPTS {
                        warn!("Transfer attempt failed ({}), retrying", e);
                        tokio::time::sleep(backoff_delay(attempt)).await;
                        continue;
                    }
                    self.audit.emit(json!({
                        "event": "network_error",
                        "err": e.to_string(),
                        "userId": opts.user_id,
                    }));
                    return PaymentResult::failure_with_details(
                        ErrorCode::NetworkError,
                        Value::String(e.to_string()),
                    );
                }
            }
        }

        // Unreachable: the loop always returns on the final attempt
        PaymentResult::failure(ErrorCode::Unknown)
    }

    /// Pull a transaction id out of whichever shape the provider used;
    /// synthesize a bounded id from the body when none is present so the
    /// caller always receives a non-empty txId.
    fn interpret_success(&self, body: &Value, opts: &SendOptions) -> PaymentResult {
        let tx_id = extract_tx_id(body);
        let explorer = tx_id
            .as_ref()
            .map(|id| format!("{}/{}", EXPLORER_TX_URL, id));

        let tx_id = tx_id.unwrap_or_else(|| {
            body.to_string().chars().take(64).collect::<String>()
        });

        info!("Transfer accepted, txId {}", tx_id);
        self.audit.emit(json!({
            "event": "transfer_success",
            "userId": opts.user_id,
            "txId": tx_id,
        }));

        PaymentResult::success(tx_id, explorer)
    }
}

/// Provider response shapes, checked in priority order. A present but
/// unusable candidate (null, empty string) falls through to the next key;
/// numeric ids are stringified.
fn extract_tx_id(body: &Value) -> Option<String> {
    [
        body.pointer("/data/id"),
        body.get("transactionId"),
        body.get("id"),
        body.get("transferId"),
    ]
    .into_iter()
    .flatten()
    .find_map(usable_tx_id)
}

fn usable_tx_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================
