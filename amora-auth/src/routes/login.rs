use axum::extract::State;
use axum::Json;
use chrono::{Duration, Utc};
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;

use amora_shared::errors::{AppError, AppResult, ErrorCode};
use amora_shared::middleware::RequestMeta;
use amora_shared::types::auth::{TokenPair, UserRole};
use amora_shared::types::user::UserStatus;
use amora_shared::types::ApiResponse;

use crate::models::{NewActivityLog, NewRefreshToken, User};
use crate::schema::{activity_logs, refresh_tokens, users};
use crate::services::{auth_service, token_service};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<TokenPair>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    // Lockout counter: repeated failures from the same address within the
    // window refuse further attempts outright.
    let window_start = Utc::now() - Duration::minutes(state.config.lockout_window_mins);
    let recent_failures: i64 = activity_logs::table
        .filter(activity_logs::action.eq("failed_login"))
        .filter(activity_logs::ip_address.eq(&meta.ip_address))
        .filter(activity_logs::created_at.gt(window_start))
        .count()
        .get_result(&mut conn)?;

    if recent_failures >= state.config.max_login_attempts {
        return Err(AppError::new(
            ErrorCode::TooManyLoginAttempts,
            "too many login attempts, try again later",
        ));
    }

    let user: Option<User> = users::table
        .filter(users::username.eq(&req.username))
        .first::<User>(&mut conn)
        .optional()?;

    let Some(user) = user else {
        log_failed_attempt(&mut conn, &req.username, &meta)?;
        return Err(AppError::new(ErrorCode::InvalidCredentials, "invalid username or password"));
    };

    match user.status.parse::<UserStatus>() {
        Ok(UserStatus::Active) => {}
        Ok(UserStatus::Blocked) => {
            return Err(AppError::new(ErrorCode::AccountBlocked, "this account has been blocked"));
        }
        _ => {
            log_failed_attempt(&mut conn, &req.username, &meta)?;
            return Err(AppError::new(ErrorCode::InvalidCredentials, "invalid username or password"));
        }
    }

    let valid = auth_service::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        log_failed_attempt(&mut conn, &req.username, &meta)?;
        return Err(AppError::new(ErrorCode::InvalidCredentials, "invalid username or password"));
    }

    diesel::update(users::table.find(user.id))
        .set((
            users::last_login.eq(Utc::now()),
            users::is_online.eq(true),
        ))
        .execute(&mut conn)?;

    diesel::insert_into(activity_logs::table)
        .values(&NewActivityLog {
            user_id: Some(user.id),
            action: "login".to_string(),
            description: "Logged in".to_string(),
            ip_address: meta.ip_address.clone(),
            user_agent: meta.user_agent.clone(),
        })
        .execute(&mut conn)?;

    let role = user.role.parse::<UserRole>().unwrap_or(UserRole::User);

    let (token_pair, refresh_hash) = token_service::create_token_pair(
        user.id,
        role,
        &state.config.jwt_secret,
        state.config.jwt_access_ttl,
    )?;

    diesel::insert_into(refresh_tokens::table)
        .values(&NewRefreshToken {
            user_id: user.id,
            token_hash: refresh_hash,
            expires_at: Utc::now() + Duration::seconds(state.config.jwt_refresh_ttl),
        })
        .execute(&mut conn)?;

    tracing::info!(user_id = %user.id, "user logged in");

    Ok(Json(ApiResponse::ok(token_pair)))
}

fn log_failed_attempt(
    conn: &mut diesel::pg::PgConnection,
    username: &str,
    meta: &RequestMeta,
) -> AppResult<()> {
    diesel::insert_into(activity_logs::table)
        .values(&NewActivityLog {
            user_id: None,
            action: "failed_login".to_string(),
            description: format!("Failed login attempt for {username}"),
            ip_address: meta.ip_address.clone(),
            user_agent: meta.user_agent.clone(),
        })
        .execute(conn)?;
    Ok(())
}
