use axum::extract::State;
use axum::Json;
use chrono::Utc;
use diesel::prelude::*;
use std::sync::Arc;

use amora_shared::errors::{AppError, AppResult, ErrorCode};
use amora_shared::types::auth::AuthUser;
use amora_shared::types::user::InterestedIn;
use amora_shared::types::ApiResponse;

use crate::models::{UpdatePreferences, UserPreference};
use crate::schema::user_preferences;
use crate::AppState;

// --- GET /me/preferences ---

pub async fn get_preferences(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<UserPreference>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let prefs = user_preferences::table
        .filter(user_preferences::user_id.eq(user.id))
        .first::<UserPreference>(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::PreferencesNotFound, "preferences not found"))?;

    Ok(Json(ApiResponse::ok(prefs)))
}

// --- PUT /me/preferences ---

pub async fn update_preferences(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<UpdatePreferences>,
) -> AppResult<Json<ApiResponse<UserPreference>>> {
    if let Some(ref interest) = payload.interested_in {
        interest
            .parse::<InterestedIn>()
            .map_err(|_| AppError::new(ErrorCode::ValidationError, "interested_in must be M, F or B"))?;
    }

    let min_age = payload.min_age.unwrap_or(18);
    let max_age = payload.max_age.unwrap_or(99);
    if payload.min_age.is_some() || payload.max_age.is_some() {
        if min_age < 18 || max_age > 99 || min_age > max_age {
            return Err(AppError::new(
                ErrorCode::ValidationError,
                "age range must fall between 18 and 99",
            ));
        }
    }

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let updated = diesel::update(
        user_preferences::table.filter(user_preferences::user_id.eq(user.id)),
    )
    .set((
        &payload,
        user_preferences::updated_at.eq(Utc::now()),
    ))
    .get_result::<UserPreference>(&mut conn)
    .map_err(|e| match e {
        diesel::result::Error::NotFound => {
            AppError::new(ErrorCode::PreferencesNotFound, "preferences not found")
        }
        other => AppError::Database(other),
    })?;

    Ok(Json(ApiResponse::ok(updated)))
}
