use axum::extract::{Path, State};
use axum::Json;
use diesel::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use amora_shared::errors::{AppError, AppResult, ErrorCode};
use amora_shared::middleware::RequestMeta;
use amora_shared::types::auth::AuthUser;
use amora_shared::types::ApiResponse;

use crate::models::{Block, NewActivityLog, NewBlock};
use crate::schema::{activity_logs, blocks, users};
use crate::AppState;

/// POST /blocks/:id - block another user.
pub async fn block_user(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    Path(target_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Block>>> {
    if target_id == user.id {
        return Err(AppError::new(ErrorCode::CannotBlockSelf, "you cannot block yourself"));
    }

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let target_exists: i64 = users::table
        .filter(users::id.eq(target_id))
        .count()
        .get_result(&mut conn)?;
    if target_exists == 0 {
        return Err(AppError::new(ErrorCode::ProfileNotFound, "user not found"));
    }

    let already: i64 = blocks::table
        .filter(blocks::blocker_id.eq(user.id))
        .filter(blocks::blocked_id.eq(target_id))
        .count()
        .get_result(&mut conn)?;
    if already > 0 {
        return Err(AppError::new(ErrorCode::AlreadyBlocked, "user is already blocked"));
    }

    let block: Block = diesel::insert_into(blocks::table)
        .values(&NewBlock {
            blocker_id: user.id,
            blocked_id: target_id,
        })
        .get_result(&mut conn)?;

    diesel::insert_into(activity_logs::table)
        .values(&NewActivityLog {
            user_id: Some(user.id),
            action: "block".to_string(),
            description: format!("Blocked user {target_id}"),
            ip_address: meta.ip_address,
            user_agent: meta.user_agent,
        })
        .execute(&mut conn)?;

    Ok(Json(ApiResponse::ok(block)))
}

/// DELETE /blocks/:id - unblock.
pub async fn unblock_user(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    Path(target_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let removed = diesel::delete(
        blocks::table
            .filter(blocks::blocker_id.eq(user.id))
            .filter(blocks::blocked_id.eq(target_id)),
    )
    .execute(&mut conn)?;

    if removed == 0 {
        return Err(AppError::new(ErrorCode::BlockNotFound, "block not found"));
    }

    diesel::insert_into(activity_logs::table)
        .values(&NewActivityLog {
            user_id: Some(user.id),
            action: "unblock".to_string(),
            description: format!("Unblocked user {target_id}"),
            ip_address: meta.ip_address,
            user_agent: meta.user_agent,
        })
        .execute(&mut conn)?;

    Ok(Json(ApiResponse::ok(serde_json::json!({ "unblocked": target_id }))))
}

#[derive(Debug, Queryable, Serialize)]
pub struct BlockedUser {
    pub id: Uuid,
    pub username: String,
    pub name: String,
}

/// GET /blocks - the caller's block list.
pub async fn list_blocks(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<BlockedUser>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let blocked_ids: Vec<Uuid> = blocks::table
        .filter(blocks::blocker_id.eq(user.id))
        .order(blocks::created_at.desc())
        .select(blocks::blocked_id)
        .load::<Uuid>(&mut conn)?;

    let blocked: Vec<BlockedUser> = users::table
        .filter(users::id.eq_any(&blocked_ids))
        .select((users::id, users::username, users::name))
        .load::<BlockedUser>(&mut conn)?;

    Ok(Json(ApiResponse::ok(blocked)))
}
