//! Voice micropayment agent server
//!
//! ## Usage
//!
//! ```bash
//! # Demo mode (no Circle credential, deterministic simulated transfers)
//! RECIPIENT_MAP='{"@alice":"0xabc..."}' cargo run --bin voicepay_server
//!
//! # Test endpoints
//! curl -X POST http://localhost:3000/api/voice \
//!   -H "Content-Type: application/json" \
//!   -d '{"text": "send 5 USDC to @alice", "userId": "demo", "traceId": "t-1"}'
//!
//! curl http://localhost:3000/api/health
//! ```

use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use voicepay::api::{router, AppState};
use voicepay::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();
    if config.circle.is_demo() {
        info!("No CIRCLE_API_KEY configured - running in demo mode");
    }
    if !config.model.is_configured() {
        info!("No model endpoint configured - using pattern-based intent extraction");
    }

    let state = AppState::from_config(&config);

    let app = router(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);
    let addr = SocketAddr::from(([127, 0, 0, 1], port));

    info!("Voice micropayment agent listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
