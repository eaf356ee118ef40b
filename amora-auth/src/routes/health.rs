use axum::Json;
use amora_shared::types::api::HealthResponse;

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy("amora-auth", env!("CARGO_PKG_VERSION")))
}
