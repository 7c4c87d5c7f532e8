//! Recipient resolution: alias tokens to on-chain addresses
//!
//! The alias table is an immutable per-process snapshot parsed from
//! configuration. Resolution never raises: a malformed table degrades to
//! "no aliases known" and every miss is reported as `None`.

use regex::Regex;
use std::collections::HashMap;
use tracing::warn;

/// Alias-map key holding the fallback address for empty recipient tokens
const DEFAULT_RECIPIENT_KEY: &str = "default_recipient";

/// Maps alias tokens to canonical 0x addresses
pub struct RecipientResolver {
    aliases: HashMap<String, String>,
    address: Regex,
}

impl RecipientResolver {
    /// Build a resolver from the raw JSON alias map. A missing or
    /// unparseable map yields an empty table rather than an error.
    pub fn from_json(raw: Option<&str>) -> Self {
        let aliases = match raw {
            Some(raw) => match serde_json::from_str::<HashMap<String, String>>(raw) {
                Ok(map) => map,
                Err(e) => {
                    warn!("RECIPIENT_MAP parse failed, treating as empty: {}", e);
                    HashMap::new()
                }
            },
            None => HashMap::new(),
        };
        Self::from_map(aliases)
    }

    pub fn from_map(aliases: HashMap<String, String>) -> Self {
        Self {
            aliases,
            address: Regex::new(r"^0x[a-fA-F0-9]{40}$").unwrap(),
        }
    }

    /// True when the token is already a well-formed on-chain address
    pub fn is_address(&self, token: &str) -> bool {
        self.address.is_match(token)
    }

    /// Resolve a token to an address.
    ///
    /// Well-formed addresses pass through untouched with no lookup. Aliases
    /// are matched exactly first, then case-insensitively. An empty token
    /// resolves to the `default_recipient` entry when one is configured.
    pub fn resolve(&self, token: &str) -> Option<String> {
        if self.is_address(token) {
            return Some(token.to_string());
        }

        if token.is_empty() {
            return self.aliases.get(DEFAULT_RECIPIENT_KEY).cloned();
        }

        if let Some(address) = self.aliases.get(token) {
            return Some(address.clone());
        }

        self.aliases
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(token))
            .map(|(_, address)| address.clone())
    }
}

// ============================================================================
// Tests
// ============================================================================
