use axum::routing::{delete, get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod config;
mod engine;
mod events;
mod models;
mod routes;
mod schema;

use config::AppConfig;
use amora_shared::clients::db::{create_pool, DbPool};
use amora_shared::clients::rabbitmq::RabbitMQClient;

pub struct AppState {
    pub db: DbPool,
    pub config: AppConfig,
    pub rabbitmq: RabbitMQClient,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    amora_shared::middleware::init_tracing("amora-matching");

    let config = AppConfig::load()?;
    let port = config.port;

    // The auth extractor reads the secret from the environment
    std::env::set_var("JWT_SECRET", &config.jwt_secret);

    let db = create_pool(&config.database_url);
    let rabbitmq = RabbitMQClient::connect(&config.rabbitmq_url).await?;

    let state = Arc::new(AppState { db, config, rabbitmq });

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/likes", post(routes::likes::send_like))
        .route("/matches", get(routes::matches::list_matches))
        .route("/matches/pending", get(routes::matches::list_pending))
        .route("/matches/unread-count", get(routes::matches::unread_count))
        .route("/matches/check/:user_id", get(routes::matches::check_match))
        .route("/matches/:id/reject", post(routes::matches::reject_match))
        .route("/matches/:id", delete(routes::matches::unmatch))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "amora-matching starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
