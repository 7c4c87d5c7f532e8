//! Error types for the voice micropayment agent
//!
//! This module provides idiomatic error types using thiserror. Transfer
//! outcomes are NOT errors: the executor returns a structured
//! [`crate::payment::PaymentResult`] for every terminal outcome, and the
//! route layer maps it to a protocol response. The types here cover the
//! two boundaries that can genuinely fail upstream of that: input
//! validation and the speech collaborators.

use thiserror::Error;

/// Errors from the intent-extraction boundary
///
/// Model failures are deliberately absent: the model-backed extractor
/// recovers from them internally via the pattern fallback and never lets
/// them reach the caller.
#[derive(Error, Debug)]
pub enum IntentError {
    #[error("No transcription or text provided")]
    EmptyInput,
}

/// Errors from the speech-to-text / text-to-speech collaborators
#[derive(Error, Debug)]
pub enum VoiceError {
    #[error("Missing ElevenLabs API key")]
    MissingApiKey,

    #[error("Provider rejected request: HTTP {status} - {body}")]
    Api { status: u16, body: String },

    #[error("Transport error: {0}")]
    Http(#[from] reqwest::Error),
}
