use axum::{
    Router,
    routing::{get, post},
};
use axum::http::{HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};
use tribelink::handlers::{self, AppState};
use tribelink::{Config, get_db_pool, utils};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    utils::init_logging();

    let config = Config::from_env()?;
    let db_config = tribelink::db::DatabaseConfig::from_env()?;
    let pool = get_db_pool(&db_config).await?;

    // Run migrations
    tribelink::db::migrations::run_migrations(&pool).await?;

    let port = config.port;
    let app = create_router(AppState::new(pool, &config), &config);

    let listener = tokio::net::TcpListener::bind(&format!("0.0.0.0:{}", port)).await?;
    tracing::info!("Server running on port {}", port);

    axum::serve(listener, app).await?;

    Ok(())
}

fn create_router(state: AppState, config: &Config) -> Router {
    let cors_layer = create_cors_layer(config);

    Router::new()
        .route("/health", get(health_check))
        // Connect protocol
        .route(
            "/api/connect",
            post(handlers::connect_message).delete(handlers::remove_connection),
        )
        .route("/api/connect/validate", post(handlers::validate_connection))
        .route("/api/connect/qrcode/{user_id}", get(handlers::get_qr_code))
        .route("/api/connect/{user_id}/all", get(handlers::get_all_connections))
        .route("/api/connect/messages/{user_id}", get(handlers::poll_messages))
        // SMS challenge codes
        .route("/api/sms/challenge", post(handlers::send_sms_challenge))
        .route("/api/sms/verify", post(handlers::verify_sms_challenge))
        .layer(cors_layer)
        .with_state(state)
}

fn create_cors_layer(_config: &Config) -> CorsLayer {
    let mut cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
        .allow_credentials(false);

    // Check if ALLOWED_ORIGINS environment variable is set for multiple domains
    if let Ok(cors_origins) = std::env::var("ALLOWED_ORIGINS") {
        let origins: Vec<HeaderValue> = cors_origins
            .split(',')
            .filter_map(|origin| {
                let trimmed = origin.trim();
                if !trimmed.is_empty() {
                    trimmed.parse().ok()
                } else {
                    None
                }
            })
            .collect();

        if !origins.is_empty() {
            cors = cors.allow_origin(origins);
        } else {
            // Fallback to permissive if parsing fails
            cors = cors.allow_origin(Any);
        }
    } else {
        // Default to permissive for development
        cors = cors.allow_origin(Any);
    }

    cors
}

async fn health_check() -> &'static str {
    "OK"
}
