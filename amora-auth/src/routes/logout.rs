use axum::extract::State;
use axum::Json;
use chrono::Utc;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;

use amora_shared::errors::{AppError, AppResult};
use amora_shared::middleware::RequestMeta;
use amora_shared::types::auth::AuthUser;
use amora_shared::types::ApiResponse;

use crate::models::NewActivityLog;
use crate::schema::{activity_logs, refresh_tokens, users};
use crate::services::token_service;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    pub refresh_token: String,
}

pub async fn logout(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    Json(req): Json<LogoutRequest>,
) -> AppResult<Json<ApiResponse<&'static str>>> {
    let token_hash = token_service::hash_token(&req.refresh_token);
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    diesel::update(
        refresh_tokens::table
            .filter(refresh_tokens::token_hash.eq(&token_hash))
            .filter(refresh_tokens::revoked_at.is_null()),
    )
    .set(refresh_tokens::revoked_at.eq(Some(Utc::now())))
    .execute(&mut conn)?;

    diesel::update(users::table.find(user.id))
        .set((
            users::is_online.eq(false),
            users::last_active.eq(Utc::now()),
        ))
        .execute(&mut conn)?;

    diesel::insert_into(activity_logs::table)
        .values(&NewActivityLog {
            user_id: Some(user.id),
            action: "logout".to_string(),
            description: "Logged out".to_string(),
            ip_address: meta.ip_address,
            user_agent: meta.user_agent,
        })
        .execute(&mut conn)?;

    Ok(Json(ApiResponse::ok("logged out")))
}
