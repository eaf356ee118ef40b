use axum::extract::State;
use axum::Json;
use chrono::Utc;
use diesel::prelude::*;
use std::sync::Arc;

use amora_shared::errors::{AppError, AppResult, ErrorCode};
use amora_shared::middleware::RequestMeta;
use amora_shared::types::auth::AuthUser;
use amora_shared::types::user::UserStatus;
use amora_shared::types::ApiResponse;

use crate::events::publisher;
use crate::models::{NewActivityLog, User};
use crate::schema::{activity_logs, users};
use crate::AppState;

/// DELETE /me - soft-delete the account. The row is kept but the status
/// flips to `deleted` and the unique identifiers are anonymized so they
/// free up for re-registration.
pub async fn delete_account(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    conn.transaction::<_, AppError, _>(|conn| {
        let record: User = users::table
            .find(user.id)
            .first::<User>(conn)
            .optional()?
            .ok_or_else(|| AppError::new(ErrorCode::UserNotFound, "user not found"))?;

        diesel::insert_into(activity_logs::table)
            .values(&NewActivityLog {
                user_id: Some(user.id),
                action: "delete_account".to_string(),
                description: "Account deleted".to_string(),
                ip_address: meta.ip_address.clone(),
                user_agent: meta.user_agent.clone(),
            })
            .execute(conn)?;

        diesel::update(users::table.find(user.id))
            .set((
                users::status.eq(UserStatus::Deleted.as_str()),
                users::email.eq(format!("deleted_{}_{}", record.id, record.email)),
                users::username.eq(format!("deleted_{}_{}", record.id, record.username)),
                users::is_online.eq(false),
                users::updated_at.eq(Utc::now()),
            ))
            .execute(conn)?;

        Ok(())
    })?;

    publisher::publish_account_deleted(&state.rabbitmq, user.id).await;

    tracing::info!(user_id = %user.id, "account soft-deleted");

    Ok(Json(ApiResponse::ok(serde_json::json!({ "deleted": true }))))
}
