//! Voice payment routes
//!
//! Endpoints:
//! - GET  /                 - liveness line
//! - GET  /api/health       - health check
//! - POST /api/voice        - JSON {transcription|text, userId?, traceId?}
//! - POST /api/voice/audio  - multipart audio (or text fallback), replies
//!                            with synthesized speech when TTS is available
//!
//! The route layer owns actionability validation and the mapping from
//! structured transfer outcomes to protocol responses. Voice-mode failures
//! are spoken back with a 500 so the user always hears something.

use super::AppState;
use crate::intent::PaymentIntent;
use crate::payment::{PaymentResult, SendOptions};
use axum::extract::{Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

/// JSON body of POST /api/voice
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceCommandRequest {
    /// Transcribed speech; `text` is accepted as an alias
    pub transcription: Option<String>,
    pub text: Option<String>,
    pub user_id: Option<String>,
    /// Client-supplied trace id; never generated server-side
    pub trace_id: Option<String>,
}

impl VoiceCommandRequest {
    fn text(&self) -> Option<&str> {
        self.transcription
            .as_deref()
            .or(self.text.as_deref())
            .filter(|t| !t.trim().is_empty())
    }
}

/// Outcome of the extract-validate-execute pipeline
enum CommandOutcome {
    NotUnderstood(PaymentIntent),
    Executed {
        intent: PaymentIntent,
        result: PaymentResult,
    },
}

async fn run_pipeline(
    state: &AppState,
    text: &str,
    user_id: Option<String>,
    trace_id: Option<String>,
) -> CommandOutcome {
    // The extractor only fails on empty input, which the routes rule out
    let intent = match state.extractor.extract(text).await {
        Ok(intent) => intent,
        Err(_) => return CommandOutcome::NotUnderstood(PaymentIntent::unknown()),
    };

    if !intent.is_actionable() {
        return CommandOutcome::NotUnderstood(intent);
    }

    let mut opts = user_id
        .map(SendOptions::new)
        .unwrap_or_else(SendOptions::anonymous);
    opts.trace_id = trace_id;

    info!(
        "Executing transfer of {} {} to {}",
        intent.amount, intent.currency, intent.recipient
    );

    let result = state
        .executor
        .execute(&intent.amount, &intent.currency, &intent.recipient, &opts)
        .await;

    CommandOutcome::Executed { intent, result }
}

/// GET /
pub async fn root() -> &'static str {
    "Voice Micropayment Agent is running."
}

/// GET /api/health
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// POST /api/voice - text command, JSON response
pub async fn voice_text(
    State(state): State<AppState>,
    Json(req): Json<VoiceCommandRequest>,
) -> Response {
    let Some(text) = req.text() else {
        return missing_text_response();
    };

    let outcome = run_pipeline(&state, text, req.user_id.clone(), req.trace_id.clone()).await;
    json_response(outcome)
}

/// POST /api/voice/audio - multipart audio command, spoken response
pub async fn voice_audio(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let mut audio: Option<bytes::Bytes> = None;
    let mut text: Option<String> = None;
    let mut user_id: Option<String> = None;
    let mut trace_id: Option<String> = None;

    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                let name = field.name().unwrap_or_default().to_string();
                match name.as_str() {
                    "audio" => audio = field.bytes().await.ok(),
                    "text" | "transcription" => text = field.text().await.ok(),
                    "userId" => user_id = field.text().await.ok(),
                    "traceId" => trace_id = field.text().await.ok(),
                    _ => {}
                }
            }
            Ok(None) => break,
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "success": false, "error": format!("Malformed multipart body: {}", e) })),
                )
                    .into_response();
            }
        }
    }

    // Prefer uploaded audio; fall back to the text field
    let transcription = match (audio, &state.voice) {
        (Some(bytes), Some(voice)) => match voice.transcribe(bytes).await {
            Ok(transcribed) => Some(transcribed),
            Err(e) => {
                error!("Transcription failed: {}", e);
                None
            }
        },
        _ => None,
    };

    let Some(command) = transcription.or(text).filter(|t| !t.trim().is_empty()) else {
        return missing_text_response();
    };

    let outcome = run_pipeline(&state, &command, user_id, trace_id).await;
    let (status, sentence) = spoken_outcome(&outcome);

    // Speak the outcome when TTS is available; otherwise degrade to JSON
    if let Some(voice) = &state.voice {
        match voice.synthesize(&sentence, voice.default_voice()).await {
            Ok(bytes) => {
                return (status, [(header::CONTENT_TYPE, "audio/mpeg")], bytes).into_response();
            }
            Err(e) => error!("Speech synthesis failed: {}", e),
        }
    }

    json_response(outcome)
}

fn missing_text_response() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "success": false,
            "error": "Missing transcription or text field in request body",
        })),
    )
        .into_response()
}

/// Map a pipeline outcome to the JSON wire shape
fn json_response(outcome: CommandOutcome) -> Response {
    match outcome {
        CommandOutcome::NotUnderstood(intent) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "success": false,
                "error": "Could not understand payment intent",
                "intent": intent,
            })),
        )
            .into_response(),
        CommandOutcome::Executed { intent, result } => match result {
            PaymentResult::Success { tx_id, explorer } => (
                StatusCode::OK,
                Json(json!({
                    "success": true,
                    "message": format!(
                        "Sent {} {} to {}",
                        intent.amount, intent.currency, intent.recipient
                    ),
                    "txId": tx_id,
                    "explorer": explorer,
                })),
            )
                .into_response(),
            PaymentResult::Failure {
                error,
                code,
                details,
            } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "success": false,
                    "error": error,
                    "code": code,
                    "details": details,
                })),
            )
                .into_response(),
        },
    }
}

/// Short human sentence for the spoken reply, with the matching HTTP status
fn spoken_outcome(outcome: &CommandOutcome) -> (StatusCode, String) {
    match outcome {
        CommandOutcome::NotUnderstood(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Sorry, I could not understand that payment request.".to_string(),
        ),
        CommandOutcome::Executed { intent, result } => match result {
            PaymentResult::Success { .. } => (
                StatusCode::OK,
                format!(
                    "Done. Sent {} {} to {}.",
                    intent.amount, intent.currency, intent.recipient
                ),
            ),
            PaymentResult::Failure { code, .. } => {
                use crate::payment::ErrorCode;
                let sentence = match code {
                    ErrorCode::InvalidAmount => "Sorry, that amount is not valid.",
                    ErrorCode::UnsupportedCurrency => "Sorry, I can only send USDC.",
                    ErrorCode::RecipientUnknown => "Sorry, I don't know that recipient.",
                    ErrorCode::AmountLimit => "Sorry, that amount is over the transfer limit.",
                    ErrorCode::CircleError | ErrorCode::NetworkError | ErrorCode::Unknown => {
                        "Sorry, the payment could not be completed right now."
                    }
                };
                (StatusCode::INTERNAL_SERVER_ERROR, sentence.to_string())
            }
        },
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_text_alias() {
        let req = VoiceCommandRequest {
            transcription: None,
            text: Some("send 5 to @alice".to_string()),
            user_id: None,
            trace_id: None,
        };
        assert_eq!(req.text(), Some("send 5 to @alice"));
    }

    #[test]
    fn test_request_transcription_preferred() {
        let req = VoiceCommandRequest {
            transcription: Some("pay 1 to @bob".to_string()),
            text: Some("ignored".to_string()),
            user_id: None,
            trace_id: None,
        };
        assert_eq!(req.text(), Some("pay 1 to @bob"));
    }

    #[test]
    fn test_blank_text_is_missing() {
        let req = VoiceCommandRequest {
            transcription: Some("   ".to_string()),
            text: None,
            user_id: None,
            trace_id: None,
        };
        assert_eq!(req.text(), None);
    }

    #[test]
    fn test_spoken_outcome_for_failures() {
        use crate::payment::ErrorCode;
        let outcome = CommandOutcome::Executed {
            intent: PaymentIntent::unknown(),
            result: PaymentResult::failure(ErrorCode::RecipientUnknown),
        };
        let (status, sentence) = spoken_outcome(&outcome);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(sentence.contains("recipient"));
    }
}
