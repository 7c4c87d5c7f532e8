//! HTTP surface: router construction and shared application state

pub mod payment_routes;

use crate::audit::AuditLogger;
use crate::config::AppConfig;
use crate::intent::extractor::build_extractor;
use crate::intent::IntentExtractor;
use crate::payment::{RecipientResolver, TransferExecutor};
use crate::voice::ElevenLabsClient;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

/// Immutable per-process service handles shared by all requests
#[derive(Clone)]
pub struct AppState {
    pub extractor: Arc<dyn IntentExtractor>,
    pub executor: Arc<TransferExecutor>,
    pub voice: Option<Arc<ElevenLabsClient>>,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> Self {
        let resolver = RecipientResolver::from_json(config.recipient_map.as_deref());
        let audit = AuditLogger::new(config.event_log_url.clone());
        let executor = Arc::new(TransferExecutor::new(
            config.circle.clone(),
            resolver,
            audit,
        ));
        let extractor = build_extractor(&config.model);
        let voice = ElevenLabsClient::new(config.voice.clone()).map(Arc::new);

        Self {
            extractor,
            executor,
            voice,
        }
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(payment_routes::root))
        .route("/api/health", get(payment_routes::health))
        .route("/api/voice", post(payment_routes::voice_text))
        .route("/api/voice/audio", post(payment_routes::voice_audio))
        .with_state(state)
}
