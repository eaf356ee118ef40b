use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use diesel::dsl::count_star;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use amora_shared::errors::{AppError, AppResult, ErrorCode};
use amora_shared::middleware::RequestMeta;
use amora_shared::types::auth::AuthUser;
use amora_shared::types::ApiResponse;

use crate::events::publisher;
use crate::gating::{conversation_open, is_participant, validate_body, within_delete_window, BodyRejection};
use crate::models::{Match, Message, NewActivityLog, NewMessage, NewNotification};
use crate::schema::{activity_logs, matches, messages, notifications, user_preferences, users};
use crate::AppState;

// --- Helpers ---

/// Load the match and verify the caller may converse in it. A missing
/// row, a non-participant, and a non-matched status all collapse into
/// the same not-found answer so probing reveals nothing.
fn load_open_match(
    conn: &mut diesel::pg::PgConnection,
    match_id: Uuid,
    user_id: Uuid,
) -> AppResult<Match> {
    matches::table
        .find(match_id)
        .first::<Match>(conn)
        .optional()?
        .filter(|m| is_participant(m.user_lo, m.user_hi, user_id))
        .filter(|m| conversation_open(&m.status))
        .ok_or_else(|| AppError::new(ErrorCode::MatchNotFound, "match not found"))
}

fn log_activity(
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

// --- POST /matches/:id/messages ---

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub message: String,
}

pub async fn send_message(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    Path(match_id): Path<Uuid>,
    Json(req): Json<SendMessageRequest>,
) -> AppResult<Json<ApiResponse<Message>>> {
    let body = validate_body(&req.message, state.config.chat_max_length).map_err(|r| match r {
        BodyRejection::Empty => AppError::new(ErrorCode::ValidationError, "message is empty"),
        BodyRejection::TooLong => AppError::new(
            ErrorCode::MessageTooLong,
            format!("message exceeds {} characters", state.config.chat_max_length),
        ),
    })?;

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let (message, recipient_id) = conn.transaction::<_, AppError, _>(|conn| {
        let record = load_open_match(conn, match_id, user.id)?;
        let recipient_id = record.other_participant(user.id);

        let message: Message = diesel::insert_into(messages::table)
            .values(&NewMessage {
                match_id,
                sender_id: user.id,
                body: body.clone(),
            })
            .get_result(conn)?;

        // Notification is opt-out via the recipient's preferences; a
        // missing preferences row counts as enabled.
        let notifications_enabled: bool = user_preferences::table
            .filter(user_preferences::user_id.eq(recipient_id))
            .select(user_preferences::notifications_enabled)
            .first::<bool>(conn)
            .optional()?
            .unwrap_or(true);

        if notifications_enabled {
            diesel::insert_into(notifications::table)
                .values(&NewNotification {
                    user_id: recipient_id,
                    kind: "message".to_string(),
                    title: "New message".to_string(),
                    body: "You received a new message".to_string(),
                    related_id: Some(message.id),
                })
                .execute(conn)?;
        }

        log_activity(conn, user.id, "send_message", format!("Sent message in conversation {match_id}"), &meta)?;

        diesel::update(users::table.find(user.id))
            .set((
                users::last_active.eq(Utc::now()),
                users::is_online.eq(true),
            ))
            .execute(conn)?;

        Ok((message, recipient_id))
    })?;

    let preview: String = message.body.chars().take(100).collect();
    publisher::publish_message_sent(&state.rabbitmq, message.id, match_id, user.id, recipient_id, &preview).await;

    Ok(Json(ApiResponse::ok(message)))
}

// --- GET /matches/:id/messages ---

#[derive(Debug, Deserialize)]
pub struct ListMessagesParams {
    pub limit: Option<i64>,
    /// Message id cursor: return messages sent before this one.
    pub before: Option<Uuid>,
}

#[derive(Debug, Queryable, Serialize)]
pub struct CounterpartInfo {
    pub id: Uuid,
    pub username: String,
    pub name: String,
    pub is_online: bool,
    pub last_active: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct ConversationResponse {
    #[serde(rename = "match")]
    pub record: Match,
    pub user: Option<CounterpartInfo>,
    pub messages: Vec<Message>,
}

/// Returns the latest page in ascending chronological order. Reading has
/// a write side effect: unread counterpart messages are marked read.
pub async fn list_messages(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    meta: RequestMeta,
    Path(match_id): Path<Uuid>,
    Query(params): Query<ListMessagesParams>,
) -> AppResult<Json<ApiResponse<ConversationResponse>>> {
    let limit = params
        .limit
        .unwrap_or(state.config.chat_page_size)
        .clamp(1, state.config.chat_max_messages);

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let response = conn.transaction::<_, AppError, _>(|conn| {
        let record = load_open_match(conn, match_id, user.id)?;
        let other_id = record.other_participant(user.id);

        let mut query = messages::table
            .filter(messages::match_id.eq(match_id))
            .into_boxed();

        if let Some(before) = params.before {
            // Message ids are uuidv7, so id order is send order.
            query = query.filter(messages::id.lt(before));
        }

        // Newest page first, then reversed so callers always see
        // ascending send order.
        let mut page: Vec<Message> = query
            .order(messages::created_at.desc())
            .limit(limit)
            .load::<Message>(conn)?;
        page.reverse();

        diesel::update(
            messages::table
                .filter(messages::match_id.eq(match_id))
                .filter(messages::sender_id.ne(user.id))
                .filter(messages::is_read.eq(false)),
        )
        .set((
            messages::is_read.eq(true),
            messages::read_at.eq(Utc::now()),
        ))
        .execute(conn)?;

        log_activity(conn, user.id, "read_messages", format!("Read conversation {match_id}"), &meta)?;

        let counterpart: Option<CounterpartInfo> = users::table
            .filter(users::id.eq(other_id))
            .select((
                users::id,
                users::username,
                users::name,
                users::is_online,
                users::last_active,
            ))
            .first::<CounterpartInfo>(conn)
            .optional()?;

        Ok(ConversationResponse {
            record,
            user: counterpart,
            messages: page,
        })
    })?;

    Ok(Json(ApiResponse::ok(response)))
}

// --- GET /messages/unread-count ---

#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub total_unread: i64,
}

pub async fn unread_count(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<UnreadCountResponse>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let total_unread: i64 = messages::table
        .inner_join(matches::table)
        .filter(matches::user_lo.eq(user.id).or(matches::user_hi.eq(user.id)))
        .filter(matches::status.eq("matched"))
        .filter(messages::sender_id.ne(user.id))
        .filter(messages::is_read.eq(false))
        .select(count_star())
        .first(&mut conn)?;

    Ok(Json(ApiResponse::ok(UnreadCountResponse { total_unread })))
}

// --- DELETE /messages/:id ---

/// Senders may retract a message within a short window of sending it;
/// after that the log is append-only.
pub async fn delete_message(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(message_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let message: Message = messages::table
        .find(message_id)
        .first::<Message>(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::MessageNotFound, "message not found"))?;

    if message.sender_id != user.id {
        return Err(AppError::new(
            ErrorCode::NotMessageSender,
            "you can only delete your own messages",
        ));
    }

    if !within_delete_window(message.created_at, Utc::now()) {
        return Err(AppError::new(
            ErrorCode::DeleteWindowExpired,
            "messages can only be deleted within 5 minutes of sending",
        ));
    }

    diesel::delete(messages::table.find(message_id)).execute(&mut conn)?;

    tracing::debug!(message_id = %message_id, sender = %user.id, "message retracted");

    Ok(Json(ApiResponse::ok(serde_json::json!({ "message_id": message_id }))))
}
