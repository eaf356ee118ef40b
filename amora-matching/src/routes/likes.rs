use axum::extract::State;
use axum::Json;
use chrono::Utc;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use amora_shared::errors::{AppError, AppResult, ErrorCode};
use amora_shared::middleware::RequestMeta;
use amora_shared::types::auth::AuthUser;
use amora_shared::types::user::UserStatus;
use amora_shared::types::ApiResponse;

use crate::engine::{canonical_pair, decide_like, LikeDecision, PairView};
use crate::events::publisher;
use crate::models::{Match, MatchStatus, NewActivityLog, NewMatch, NewNotification};
use crate::schema::{activity_logs, blocks, matches, notifications, users};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SendLikeRequest {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct LikeResponse {
    pub matched: bool,
    #[serde(rename = "match")]
    pub record: Match,
}

/// POST /likes - like another user; a reciprocal pending like becomes a
/// mutual match within the same transaction.
pub async fn send_like(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    Json(req): Json<SendLikeRequest>,
) -> AppResult<Json<ApiResponse<LikeResponse>>> {
    if req.user_id == user.id {
        return Err(AppError::new(ErrorCode::CannotLikeSelf, "you cannot like yourself"));
    }

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let (record, matched) = conn.transaction::<_, AppError, _>(|conn| {
        // Target must exist and be active
        let target_status: String = users::table
            .find(req.user_id)
            .select(users::status)
            .first::<String>(conn)
            .optional()?
            .ok_or_else(|| AppError::new(ErrorCode::TargetUnavailable, "user not found"))?;

        if target_status != UserStatus::Active.as_str() {
            return Err(AppError::new(ErrorCode::TargetUnavailable, "user is not available"));
        }

        // A block in either direction forbids the like
        let blocked: i64 = blocks::table
            .filter(
                blocks::blocker_id.eq(user.id).and(blocks::blocked_id.eq(req.user_id))
                    .or(blocks::blocker_id.eq(req.user_id).and(blocks::blocked_id.eq(user.id))),
            )
            .count()
            .get_result(conn)?;

        if blocked > 0 {
            return Err(AppError::new(ErrorCode::PairBlocked, "you cannot interact with this user"));
        }

        let (user_lo, user_hi) = canonical_pair(user.id, req.user_id);

        // The unique index on (user_lo, user_hi) makes this race-safe: of
        // two simultaneous likes only one insert lands, the other falls
        // through to the reciprocity path below.
        let inserted: Option<Match> = diesel::insert_into(matches::table)
            .values(&NewMatch {
                user_lo,
                user_hi,
                initiated_by: user.id,
                status: MatchStatus::Pending.as_str().to_string(),
            })
            .on_conflict((matches::user_lo, matches::user_hi))
            .do_nothing()
            .get_result::<Match>(conn)
            .optional()?;

        if let Some(record) = inserted {
            log_activity(conn, user.id, "like", format!("Liked user {}", req.user_id), &meta)?;
            return Ok((record, false));
        }

        // Row already exists for this pair
        let existing: Match = matches::table
            .filter(matches::user_lo.eq(user_lo))
            .filter(matches::user_hi.eq(user_hi))
            .first::<Match>(conn)?;

        let status = existing
            .status
            .parse::<MatchStatus>()
            .map_err(AppError::internal)?;

        let view = PairView { status, initiated_by: existing.initiated_by };
        match decide_like(view, user.id) {
            LikeDecision::AlreadyInteracted => Err(AppError::new(
                ErrorCode::AlreadyInteracted,
                "you have already interacted with this user",
            )),
            LikeDecision::FlipToMatched => {
                let record: Match = diesel::update(matches::table.find(existing.id))
                    .set((
                        matches::status.eq(MatchStatus::Matched.as_str()),
                        matches::matched_at.eq(Utc::now()),
                        matches::updated_at.eq(Utc::now()),
                    ))
                    .get_result(conn)?;

                // One notification per participant, same transaction as the flip
                let match_notifications = vec![
                    NewNotification {
                        user_id: record.user_lo,
                        kind: "match".to_string(),
                        title: "New match!".to_string(),
                        body: "You have a new match!".to_string(),
                        related_id: Some(record.id),
                    },
                    NewNotification {
                        user_id: record.user_hi,
                        kind: "match".to_string(),
                        title: "New match!".to_string(),
                        body: "You have a new match!".to_string(),
                        related_id: Some(record.id),
                    },
                ];

                diesel::insert_into(notifications::table)
                    .values(&match_notifications)
                    .execute(conn)?;

                log_activity(conn, user.id, "match", format!("Matched with user {}", req.user_id), &meta)?;

                Ok((record, true))
            }
        }
    })?;

    if matched {
        publisher::publish_match_created(&state.rabbitmq, record.id, record.user_lo, record.user_hi).await;
        tracing::info!(match_id = %record.id, liker = %user.id, "mutual match created");
    } else {
        publisher::publish_like_created(&state.rabbitmq, record.id, user.id, req.user_id).await;
        tracing::debug!(match_id = %record.id, liker = %user.id, "pending like created");
    }

    Ok(Json(ApiResponse::ok(LikeResponse { matched, record })))
}

pub(crate) fn log_activity(
    conn: &mut diesel::pg::PgConnection,
    user_id: Uuid,
    action: &str,
    description: String,
    meta: &RequestMeta,
) -> AppResult<()> {
    diesel::insert_into(activity_logs::table)
        .values(&NewActivityLog {
            user_id: Some(user_id),
            action: action.to_string(),
            description,
            ip_address: meta.ip_address.clone(),
            user_agent: meta.user_agent.clone(),
        })
        .execute(conn)?;
    Ok(())
}
