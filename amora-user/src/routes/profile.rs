use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use diesel::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

use amora_shared::errors::{AppError, AppResult, ErrorCode};
use amora_shared::types::auth::AuthUser;
use amora_shared::types::user::UserStatus;
use amora_shared::types::ApiResponse;

use crate::events::publisher;
use crate::models::{PublicProfile, UpdateProfile, User};
use crate::schema::users;
use crate::AppState;

// --- GET /me ---

pub async fn get_profile(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<User>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let profile = users::table
        .find(user.id)
        .first::<User>(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))?;

    Ok(Json(ApiResponse::ok(profile)))
}

// --- PATCH /me ---

pub async fn update_profile(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<UpdateProfile>,
) -> AppResult<Json<ApiResponse<User>>> {
    if let Some(ref name) = payload.name {
        if name.trim().is_empty() {
            return Err(AppError::new(ErrorCode::ValidationError, "name cannot be empty"));
        }
    }

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let updated = diesel::update(users::table.find(user.id))
        .set((
            &payload,
            users::updated_at.eq(Utc::now()),
        ))
        .get_result::<User>(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))?;

    publisher::publish_profile_updated(&state.rabbitmq, updated.id).await;

    Ok(Json(ApiResponse::ok(updated)))
}

// --- GET /profiles/:id ---

pub async fn get_public_profile(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<PublicProfile>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let profile = users::table
        .find(id)
        .filter(users::status.eq(UserStatus::Active.as_str()))
        .first::<User>(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))?;

    Ok(Json(ApiResponse::ok(PublicProfile::from_user(
        profile,
        Utc::now().date_naive(),
    ))))
}
