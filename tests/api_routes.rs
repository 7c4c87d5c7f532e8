//! HTTP surface tests
//!
//! Serves the real router in demo mode on an ephemeral port and drives it
//! with a plain HTTP client: request validation, intent rejection, and the
//! success/failure wire shapes.

use serde_json::{json, Value};

use voicepay::api::{router, AppState};
use voicepay::config::{AppConfig, CircleConfig, ModelConfig, VoiceConfig};

const ALICE: &str = "0xabcdefabcdefabcdefabcdefabcdefabcdefabcd";

fn demo_config() -> AppConfig {
    AppConfig {
        model: ModelConfig {
            api_url: None,
            api_key: None,
            model: "test-model".to_string(),
            max_tokens: 200,
            timeout_seconds: 5,
        },
        circle: CircleConfig {
            api_key: None,
            api_url: "http://127.0.0.1:1/unused".to_string(),
            wallet_id: None,
            token_address: None,
            timeout_seconds: 5,
        },
        voice: VoiceConfig {
            api_key: None,
            base_url: "http://127.0.0.1:1/unused".to_string(),
            voice_id: "test-voice".to_string(),
            timeout_seconds: 5,
        },
        recipient_map: Some(format!(r#"{{"@alice":"{}"}}"#, ALICE)),
        event_log_url: None,
    }
}

async fn serve() -> String {
    let state = AppState::from_config(&demo_config());
    let app = router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let base = serve().await;
    let body: Value = reqwest::get(format!("{}/api/health", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn text_command_executes_demo_transfer() {
    let base = serve().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/voice", base))
        .json(&json!({
            "text": "send 5 USDC to @alice",
            "userId": "user-1",
            "traceId": "trace-1",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Sent 5 USDC to @alice");
    assert!(body["txId"].as_str().unwrap().starts_with("demo-"));
    assert!(body["explorer"].as_str().unwrap().contains("explorer.arc.network"));
}

#[tokio::test]
async fn missing_text_is_a_bad_request() {
    let base = serve().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/voice", base))
        .json(&json!({ "userId": "user-1" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn missing_amount_is_not_actionable() {
    let base = serve().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/voice", base))
        .json(&json!({ "text": "send some money to @alice" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Could not understand payment intent");
    // The unparsed intent is echoed back for diagnostics
    assert_eq!(body["intent"]["amount"], "null");
    assert_eq!(body["intent"]["recipient"], "@alice");
}

#[tokio::test]
async fn audio_route_text_fallback_executes_demo_transfer() {
    // No ElevenLabs key in demo_config(): the route takes the text field
    // and degrades the spoken reply to the JSON shape
    let base = serve().await;
    let client = reqwest::Client::new();

    let form = reqwest::multipart::Form::new()
        .text("text", "send 5 USDC to @alice")
        .text("userId", "user-1")
        .text("traceId", "trace-1");

    let response = client
        .post(format!("{}/api/voice/audio", base))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert!(body["txId"].as_str().unwrap().starts_with("demo-"));
}

#[tokio::test]
async fn audio_route_accepts_transcription_field_name() {
    let base = serve().await;
    let client = reqwest::Client::new();

    let form = reqwest::multipart::Form::new().text("transcription", "pay 2 USDC to @alice");

    let response = client
        .post(format!("{}/api/voice/audio", base))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Sent 2 USDC to @alice");
}

#[tokio::test]
async fn audio_route_without_usable_fields_is_bad_request() {
    let base = serve().await;
    let client = reqwest::Client::new();

    // Unrelated field only: no audio, no text
    let form = reqwest::multipart::Form::new().text("other", "ignored");

    let response = client
        .post(format!("{}/api/voice/audio", base))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn audio_route_rejects_non_actionable_text() {
    let base = serve().await;
    let client = reqwest::Client::new();

    let form = reqwest::multipart::Form::new().text("text", "send money to @alice");

    let response = client
        .post(format!("{}/api/voice/audio", base))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Could not understand payment intent");
}

#[tokio::test]
async fn unknown_recipient_maps_to_500_with_code() {
    let base = serve().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/voice", base))
        .json(&json!({ "text": "send 5 USDC to @ghost" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "RECIPIENT_UNKNOWN");
    assert_eq!(body["error"], "unknown_recipient");
}
