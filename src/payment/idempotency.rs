//! Idempotency-key derivation
//!
//! The key is a pure content hash of the logical transfer: identical
//! `(user, address, amount, currency, trace)` tuples always produce the
//! same key, so the provider deduplicates retried and duplicated client
//! submissions. Computed once per execute call and reused for every retry.

use sha2::{Digest, Sha256};

/// Derive the idempotency key for a logical transfer.
///
/// `trace_id` is the client-supplied value or `None`; an absent trace
/// hashes as the empty string so client omission is stable too.
pub fn idempotency_key(
    user_id: &str,
    resolved_address: &str,
    amount: &str,
    currency: &str,
    trace_id: Option<&str>,
) -> String {
    let seed = format!(
        "{}|{}|{}|{}|{}",
        user_id,
        resolved_address,
        amount,
        currency,
        trace_id.unwrap_or("")
    );
    let digest = Sha256::digest(seed.as_bytes());
    hex::encode(digest)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR: &str = "0xabcdefabcdefabcdefabcdefabcdefabcdefabcd";

    #[test]
    fn test_identical_inputs_identical_keys() {
        let a = idempotency_key("user-1", ADDR, "5", "USDC", Some("trace-1"));
        let b = idempotency_key("user-1", ADDR, "5", "USDC", Some("trace-1"));
        assert_eq!(a, b);
        assert_eq!(a.len(), 64); // sha-256 hex
    }

    #[test]
    fn test_each_component_changes_key() {
        let base = idempotency_key("user-1", ADDR, "5", "USDC", Some("trace-1"));
        assert_ne!(base, idempotency_key("user-2", ADDR, "5", "USDC", Some("trace-1")));
        assert_ne!(base, idempotency_key("user-1", "0x0", "5", "USDC", Some("trace-1")));
        assert_ne!(base, idempotency_key("user-1", ADDR, "6", "USDC", Some("trace-1")));
        assert_ne!(base, idempotency_key("user-1", ADDR, "5", "usdc", Some("trace-1")));
        assert_ne!(base, idempotency_key("user-1", ADDR, "5", "USDC", Some("trace-2")));
    }

    #[test]
    fn test_missing_trace_is_stable() {
        let a = idempotency_key("user-1", ADDR, "5", "USDC", None);
        let b = idempotency_key("user-1", ADDR, "5", "USDC", None);
        assert_eq!(a, b);
        assert_ne!(a, idempotency_key("user-1", ADDR, "5", "USDC", Some("t")));
    }
}
