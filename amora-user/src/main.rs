use axum::{routing::{get, post}, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod config;
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
    amora_shared::middleware::init_tracing("amora-user");

    let config = AppConfig::load()?;
    let port = config.port;

    std::env::set_var("JWT_SECRET", &config.jwt_secret);

    let db = create_pool(&config.database_url);
    let rabbitmq = RabbitMQClient::connect(&config.rabbitmq_url).await?;

    let state = Arc::new(AppState { db, config, rabbitmq });

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route(
            "/me",
            get(routes::profile::get_profile)
                .patch(routes::profile::update_profile)
                .delete(routes::account::delete_account),
        )
        .route(
            "/me/preferences",
            get(routes::preferences::get_preferences).put(routes::preferences::update_preferences),
        )
        .route("/profiles/:id", get(routes::profile::get_public_profile))
        .route("/browse", get(routes::browse::browse))
        .route("/blocks", get(routes::blocks::list_blocks))
        .route(
            "/blocks/:id",
            post(routes::blocks::block_user).delete(routes::blocks::unblock_user),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "amora-user starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
