use axum::extract::State;
use axum::Json;
use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use amora_shared::errors::{AppError, AppResult, ErrorCode};
use amora_shared::middleware::RequestMeta;
use amora_shared::types::auth::TokenPair;
use amora_shared::types::user::{Gender, UserStatus};
use amora_shared::types::ApiResponse;

use crate::models::{NewActivityLog, NewRefreshToken, NewUser, NewUserPreference, User};
use crate::schema::{activity_logs, refresh_tokens, user_preferences, users};
use crate::services::{auth_service, token_service};
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    pub username: String,
    #[validate(email(message = "invalid email format"))]
    pub email: String,
    pub password: String,
    pub name: String,
    pub gender: String,
    pub birth_date: String,
    pub bio: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    Json(req): Json<RegisterRequest>,
) -> AppResult<Json<ApiResponse<TokenPair>>> {
    req.validate()
        .map_err(|e| AppError::new(ErrorCode::ValidationError, e.to_string()))?;

    auth_service::validate_username(&req.username)?;
    auth_service::validate_password(&req.password)?;

    if req.name.trim().is_empty() {
        return Err(AppError::new(ErrorCode::ValidationError, "name is required"));
    }

    let gender = req
        .gender
        .parse::<Gender>()
        .map_err(|_| AppError::new(ErrorCode::ValidationError, "gender must be M, F or O"))?;

    let birth_date = NaiveDate::parse_from_str(&req.birth_date, "%Y-%m-%d")
        .map_err(|_| AppError::new(ErrorCode::ValidationError, "invalid birth_date format, expected YYYY-MM-DD"))?;
    auth_service::validate_age(birth_date, Utc::now().date_naive())?;

    let password_hash = auth_service::hash_password(&req.password)?;
    let email = req.email.to_lowercase();

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let user = conn.transaction::<_, AppError, _>(|conn| {
        let username_taken: i64 = users::table
            .filter(users::username.eq(&req.username))
            .count()
            .get_result(conn)?;
        if username_taken > 0 {
            return Err(AppError::new(ErrorCode::UsernameTaken, "username is already taken"));
        }

        let email_taken: i64 = users::table
            .filter(users::email.eq(&email))
            .count()
            .get_result(conn)?;
        if email_taken > 0 {
            return Err(AppError::new(ErrorCode::EmailAlreadyExists, "email already registered"));
        }

        let user: User = diesel::insert_into(users::table)
            .values(&NewUser {
                username: req.username.clone(),
                email: email.clone(),
                password_hash: password_hash.clone(),
                name: req.name.trim().to_string(),
                gender: gender.as_str().to_string(),
                birth_date,
                bio: req.bio.clone(),
                city: req.city.clone(),
                country: req.country.clone(),
                status: UserStatus::Active.as_str().to_string(),
            })
            .get_result(conn)?;

        diesel::insert_into(user_preferences::table)
            .values(&NewUserPreference {
                user_id: user.id,
                interested_in: gender.default_interest().as_str().to_string(),
                min_age: auth_service::MIN_AGE,
                max_age: auth_service::MAX_AGE,
                max_distance: 100,
                notifications_enabled: true,
            })
            .execute(conn)?;

        diesel::insert_into(activity_logs::table)
            .values(&NewActivityLog {
                user_id: Some(user.id),
                action: "register".to_string(),
                description: format!("Account created for {}", user.username),
                ip_address: meta.ip_address.clone(),
                user_agent: meta.user_agent.clone(),
            })
            .execute(conn)?;

        Ok(user)
    })?;

    let role = user.role.parse().unwrap_or(amora_shared::types::auth::UserRole::User);
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
            expires_at: Utc::now() + chrono::Duration::seconds(state.config.jwt_refresh_ttl),
        })
        .execute(&mut conn)?;

    crate::events::publisher::publish_user_registered(&state.rabbitmq, user.id, &user.username).await;

    tracing::info!(user_id = %user.id, username = %user.username, "user registered");

    Ok(Json(ApiResponse::ok(token_pair)))
}
