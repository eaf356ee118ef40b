use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use diesel::dsl::{count_distinct, count_star};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use amora_shared::errors::{AppError, AppResult, ErrorCode};
use amora_shared::middleware::RequestMeta;
use amora_shared::types::auth::AuthUser;
use amora_shared::types::user::UserStatus;
use amora_shared::types::ApiResponse;

use crate::engine::{can_reject, can_unmatch, canonical_pair};
use crate::events::publisher;
use crate::models::{Match, MatchStatus, NewNotification};
use crate::routes::likes::log_activity;
use crate::schema::{matches, messages, notifications, users};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 { 20 }

/// Counterpart columns exposed in match listings. Blocked and deleted
/// users drop out of the listing entirely.
#[derive(Debug, Queryable, Serialize)]
pub struct CounterpartProfile {
    pub id: Uuid,
    pub username: String,
    pub name: String,
    pub city: Option<String>,
    pub country: Option<String>,
    pub is_online: bool,
    pub last_active: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct MatchSummary {
    pub id: Uuid,
    pub status: String,
    pub matched_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub user: CounterpartProfile,
    pub messages_count: i64,
    pub unread_count: i64,
    pub last_message: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
}

fn load_counterpart(
    conn: &mut diesel::pg::PgConnection,
    user_id: Uuid,
) -> AppResult<Option<CounterpartProfile>> {
    let profile = users::table
        .filter(users::id.eq(user_id))
        .filter(users::status.eq(UserStatus::Active.as_str()))
        .select((
            users::id,
            users::username,
            users::name,
            users::city,
            users::country,
            users::is_online,
            users::last_active,
        ))
        .first::<CounterpartProfile>(conn)
        .optional()?;
    Ok(profile)
}

/// GET /matches - active (mutual) matches with conversation previews,
/// most recently active first.
pub async fn list_matches(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<ApiResponse<Vec<MatchSummary>>>> {
    let limit = params.limit.clamp(1, 100);
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let rows: Vec<Match> = matches::table
        .filter(matches::user_lo.eq(user.id).or(matches::user_hi.eq(user.id)))
        .filter(matches::status.eq(MatchStatus::Matched.as_str()))
        .order(matches::matched_at.desc())
        .limit(100)
        .load::<Match>(&mut conn)?;

    let mut summaries = Vec::with_capacity(rows.len());
    for row in rows {
        let other_id = row.other_participant(user.id);
        let Some(profile) = load_counterpart(&mut conn, other_id)? else {
            continue;
        };

        let messages_count: i64 = messages::table
            .filter(messages::match_id.eq(row.id))
            .select(count_star())
            .first(&mut conn)?;

        let unread_count: i64 = messages::table
            .filter(messages::match_id.eq(row.id))
            .filter(messages::sender_id.ne(user.id))
            .filter(messages::is_read.eq(false))
            .select(count_star())
            .first(&mut conn)?;

        let last: Option<(String, DateTime<Utc>)> = messages::table
            .filter(messages::match_id.eq(row.id))
            .order(messages::created_at.desc())
            .select((messages::body, messages::created_at))
            .first(&mut conn)
            .optional()?;

        summaries.push(MatchSummary {
            id: row.id,
            status: row.status,
            matched_at: row.matched_at,
            created_at: row.created_at,
            user: profile,
            messages_count,
            unread_count,
            last_message: last.as_ref().map(|(body, _)| body.clone()),
            last_message_at: last.map(|(_, at)| at),
        });
    }

    // Conversations with recent traffic float to the top, quiet matches
    // fall back to their matched_at timestamp.
    summaries.sort_by_key(|s| std::cmp::Reverse(s.last_message_at.or(s.matched_at)));
    summaries.truncate(limit as usize);

    Ok(Json(ApiResponse::ok(summaries)))
}

#[derive(Debug, Serialize)]
pub struct PendingLike {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub user: CounterpartProfile,
}

/// GET /matches/pending - the viewer's own outgoing likes still waiting
/// for reciprocity. Incoming pending likes stay invisible to the target.
pub async fn list_pending(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<ApiResponse<Vec<PendingLike>>>> {
    let limit = params.limit.clamp(1, 100);
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let rows: Vec<Match> = matches::table
        .filter(matches::user_lo.eq(user.id).or(matches::user_hi.eq(user.id)))
        .filter(matches::initiated_by.eq(user.id))
        .filter(matches::status.eq(MatchStatus::Pending.as_str()))
        .order(matches::created_at.desc())
        .limit(limit)
        .load::<Match>(&mut conn)?;

    let mut pending = Vec::with_capacity(rows.len());
    for row in rows {
        let other_id = row.other_participant(user.id);
        if let Some(profile) = load_counterpart(&mut conn, other_id)? {
            pending.push(PendingLike {
                id: row.id,
                created_at: row.created_at,
                user: profile,
            });
        }
    }

    Ok(Json(ApiResponse::ok(pending)))
}

/// GET /matches/check/:user_id - return the mutual match with the given
/// user, if one exists.
pub async fn check_match(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(other_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Option<Match>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let (user_lo, user_hi) = canonical_pair(user.id, other_id);

    let record: Option<Match> = matches::table
        .filter(matches::user_lo.eq(user_lo))
        .filter(matches::user_hi.eq(user_hi))
        .filter(matches::status.eq(MatchStatus::Matched.as_str()))
        .first::<Match>(&mut conn)
        .optional()?;

    Ok(Json(ApiResponse::ok(record)))
}

#[derive(Debug, Serialize)]
pub struct UnreadMatchesResponse {
    pub unread_matches: i64,
}

/// GET /matches/unread-count - number of conversations holding unread
/// counterpart messages.
pub async fn unread_count(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<UnreadMatchesResponse>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let unread_matches: i64 = messages::table
        .inner_join(matches::table)
        .filter(matches::user_lo.eq(user.id).or(matches::user_hi.eq(user.id)))
        .filter(matches::status.eq(MatchStatus::Matched.as_str()))
        .filter(messages::sender_id.ne(user.id))
        .filter(messages::is_read.eq(false))
        .select(count_distinct(messages::match_id))
        .first(&mut conn)?;

    Ok(Json(ApiResponse::ok(UnreadMatchesResponse { unread_matches })))
}

/// POST /matches/:id/reject - close a pending like. Either participant
/// may reject; the transition is terminal and emits no notification.
pub async fn reject_match(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    Path(match_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Match>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let record = conn.transaction::<_, AppError, _>(|conn| {
        let existing: Match = matches::table
            .find(match_id)
            .first::<Match>(conn)
            .optional()?
            .filter(|m| m.involves(user.id))
            .ok_or_else(|| AppError::new(ErrorCode::MatchNotFound, "match not found"))?;

        let status = existing.status.parse::<MatchStatus>().map_err(AppError::internal)?;
        if !can_reject(status) {
            return Err(AppError::new(ErrorCode::MatchNotPending, "match is no longer pending"));
        }

        let record: Match = diesel::update(matches::table.find(match_id))
            .set((
                matches::status.eq(MatchStatus::Rejected.as_str()),
                matches::updated_at.eq(Utc::now()),
            ))
            .get_result(conn)?;

        log_activity(conn, user.id, "reject", format!("Rejected match {match_id}"), &meta)?;

        Ok(record)
    })?;

    Ok(Json(ApiResponse::ok(record)))
}

/// DELETE /matches/:id - unmatch. Deletes the conversation history and
/// the match row itself; the counterpart is notified. Irreversible.
pub async fn unmatch(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    Path(match_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let other_id = conn.transaction::<_, AppError, _>(|conn| {
        let existing: Match = matches::table
            .find(match_id)
            .first::<Match>(conn)
            .optional()?
            .filter(|m| m.involves(user.id))
            .ok_or_else(|| AppError::new(ErrorCode::MatchNotFound, "match not found"))?;

        let status = existing.status.parse::<MatchStatus>().map_err(AppError::internal)?;
        if !can_unmatch(status) {
            return Err(AppError::new(ErrorCode::MatchNotFound, "match not found"));
        }

        let other_id = existing.other_participant(user.id);

        diesel::delete(messages::table.filter(messages::match_id.eq(match_id))).execute(conn)?;
        diesel::delete(matches::table.find(match_id)).execute(conn)?;

        diesel::insert_into(notifications::table)
            .values(&NewNotification {
                user_id: other_id,
                kind: "unmatch".to_string(),
                title: "Match ended".to_string(),
                body: "A user has unmatched you".to_string(),
                related_id: Some(match_id),
            })
            .execute(conn)?;

        log_activity(conn, user.id, "unmatch", format!("Unmatched match {match_id}"), &meta)?;

        Ok(other_id)
    })?;

    publisher::publish_match_ended(&state.rabbitmq, match_id, user.id, other_id).await;

    tracing::info!(match_id = %match_id, ended_by = %user.id, "match ended");

    Ok(Json(ApiResponse::ok(serde_json::json!({ "match_id": match_id }))))
}
