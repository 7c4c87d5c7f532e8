//! Environment-derived configuration
//!
//! All configuration is read once at startup and passed down as immutable
//! snapshots. No component reads the environment after construction, which
//! keeps resolution and execution testable without process-global state.

use serde::{Deserialize, Serialize};

/// Default Circle developer-transfer endpoint
pub const CIRCLE_TRANSFER_URL: &str =
    "https://api.circle.com/v1/w3s/developer/transactions/transfer";

/// Default chat model when none is configured
pub const DEFAULT_MODEL: &str = "@cf/mistral/mistral-7b-instruct-v0.1";

/// Default ElevenLabs voice used for spoken responses
pub const DEFAULT_VOICE_ID: &str = "21m00Tcm4TlvDq8ikWAM";

/// Chat-model endpoint configuration
///
/// When `api_url` or `api_key` is absent the agent runs without a model
/// handle and intent extraction uses the deterministic pattern path only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub timeout_seconds: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_url: std::env::var("MODEL_API_URL").ok(),
            api_key: std::env::var("MODEL_API_KEY").ok(),
            model: std::env::var("MODEL_NAME").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            max_tokens: 200,
            timeout_seconds: 30,
        }
    }
}

impl ModelConfig {
    /// True when both an endpoint and a credential are configured
    pub fn is_configured(&self) -> bool {
        self.api_url.is_some() && self.api_key.is_some()
    }
}

/// Circle payments provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircleConfig {
    /// Absent key means demo mode: no outbound transfer calls are made
    pub api_key: Option<String>,
    pub api_url: String,
    /// Wallet id, or a 0x source address depending on account setup
    pub wallet_id: Option<String>,
    /// Optional USDC token-contract override on the Arc testnet
    pub token_address: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for CircleConfig {
    fn default() -> Self {
        Self {
            api_key: std::env::var("CIRCLE_API_KEY").ok(),
            api_url: std::env::var("CIRCLE_API_URL")
                .unwrap_or_else(|_| CIRCLE_TRANSFER_URL.to_string()),
            wallet_id: std::env::var("CIRCLE_WALLET_ID").ok(),
            token_address: std::env::var("ARC_USDC_TOKEN_ADDRESS").ok(),
            timeout_seconds: 30,
        }
    }
}

impl CircleConfig {
    /// Demo mode synthesizes deterministic transactions instead of calling out
    pub fn is_demo(&self) -> bool {
        self.api_key.is_none()
    }
}

/// ElevenLabs STT/TTS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub voice_id: String,
    pub timeout_seconds: u64,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            api_key: std::env::var("ELEVENLABS_API_KEY").ok(),
            base_url: "https://api.elevenlabs.io".to_string(),
            voice_id: std::env::var("ELEVENLABS_VOICE_ID")
                .unwrap_or_else(|_| DEFAULT_VOICE_ID.to_string()),
            timeout_seconds: 30,
        }
    }
}

/// Full agent configuration snapshot
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub model: ModelConfig,
    pub circle: CircleConfig,
    pub voice: VoiceConfig,
    /// Raw JSON alias map, e.g. {"@alice":"0x...","default_recipient":"0x..."}
    pub recipient_map: Option<String>,
    /// Audit event sink; absent means audit events go to tracing only
    pub event_log_url: Option<String>,
}

impl AppConfig {
    /// Read the full configuration from the process environment
    pub fn from_env() -> Self {
        Self {
            model: ModelConfig::default(),
            circle: CircleConfig::default(),
            voice: VoiceConfig::default(),
            recipient_map: std::env::var("RECIPIENT_MAP").ok(),
            event_log_url: std::env::var("EVENT_LOG_URL").ok(),
        }
    }
}
