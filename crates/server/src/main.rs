use std::sync::Arc;

use server::clients::gemini::GeminiClient;
use server::config::Config;
use server::routes;
use server::state::AppState;

use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Load .env if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env();

    if config.gemini_api_key.is_some() {
        tracing::info!("Gemini move selector configured (default model {})", config.default_model);
    } else {
        tracing::warn!("GEMINI_API_KEY not set - move requests will fail until it is provided");
    }

    let selector = Arc::new(GeminiClient::new(&config));
    let state = AppState::new(selector, config.default_model.clone());

    // CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API routes plus the static browser client for everything else
    let app = routes::build_router(state)
        .fallback_service(ServeDir::new(&config.static_dir))
        .layer(cors);

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind");

    axum::serve(listener, app).await.expect("Server error");
}
