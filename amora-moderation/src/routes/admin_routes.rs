use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use diesel::dsl::count_star;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use amora_shared::errors::{AppError, AppResult, ErrorCode};
use amora_shared::middleware::{AdminUser, ModeratorUser, RequestMeta};
use amora_shared::types::api::ApiResponse;
use amora_shared::types::pagination::{Paginated, PaginationParams};
use amora_shared::types::user::UserStatus;

use crate::events::publisher;
use crate::models::{ActivityLog, AdminUserRow, NewActivityLog, Report};
use crate::schema::{activity_logs, matches, messages, reports, users};
use crate::workflow::{apply_action, ReportStatus, Resolution, ReviewAction, Transition, TransitionError};
use crate::AppState;

// --- Request / Response types ---

#[derive(Debug, Deserialize)]
pub struct ReportFilterParams {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
    pub status: Option<String>,
    pub report_type: Option<String>,
}

fn default_page() -> u64 { 1 }
fn default_per_page() -> u64 { 20 }

impl ReportFilterParams {
    fn pagination(&self) -> PaginationParams {
        PaginationParams {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ReviewReportRequest {
    pub action: ReviewAction,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UserFilterParams {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
    pub status: Option<String>,
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UserStatusRequest {
    pub action: UserAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserAction {
    Block,
    Unblock,
    Delete,
}

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub active_users: i64,
    pub blocked_users: i64,
    pub total_matches: i64,
    pub total_messages: i64,
    pub pending_reports: i64,
    pub reports_today: i64,
}

// --- List reports (paginated, optional status/type filter) ---

pub async fn list_reports(
    State(state): State<Arc<AppState>>,
    _moderator: ModeratorUser,
    Query(params): Query<ReportFilterParams>,
) -> AppResult<Json<ApiResponse<Paginated<Report>>>> {
    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    let pagination = params.pagination();
    let offset = pagination.offset() as i64;
    let limit = pagination.limit() as i64;

    let mut items_query = reports::table.into_boxed();
    let mut count_query = reports::table.select(count_star()).into_boxed();

    if let Some(ref status) = params.status {
        items_query = items_query.filter(reports::status.eq(status.clone()));
        count_query = count_query.filter(reports::status.eq(status.clone()));
    }
    if let Some(ref report_type) = params.report_type {
        items_query = items_query.filter(reports::report_type.eq(report_type.clone()));
        count_query = count_query.filter(reports::report_type.eq(report_type.clone()));
    }

    let items = items_query
        .order(reports::created_at.desc())
        .offset(offset)
        .limit(limit)
        .load::<Report>(&mut conn)?;

    let total: i64 = count_query.first(&mut conn)?;

    let paginated = Paginated::new(items, total as u64, &pagination);
    Ok(Json(ApiResponse::ok(paginated)))
}

// --- Get report details ---

pub async fn get_report(
    State(state): State<Arc<AppState>>,
    _moderator: ModeratorUser,
    Path(report_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Report>>> {
    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    let report = reports::table
        .find(report_id)
        .first::<Report>(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::ReportNotFound, "report not found"))?;

    Ok(Json(ApiResponse::ok(report)))
}

// --- Review report ---

pub async fn review_report(
    State(state): State<Arc<AppState>>,
    moderator: ModeratorUser,
    meta: RequestMeta,
    Path(report_id): Path<Uuid>,
    Json(body): Json<ReviewReportRequest>,
) -> AppResult<Json<ApiResponse<Report>>> {
    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    let (updated_report, transition) = conn.transaction::<_, AppError, _>(|conn| {
        let report = reports::table
            .find(report_id)
            .first::<Report>(conn)
            .optional()?
            .ok_or_else(|| AppError::new(ErrorCode::ReportNotFound, "report not found"))?;

        let status = report.status.parse::<ReportStatus>().map_err(AppError::internal)?;

        let transition = apply_action(status, body.action).map_err(|e| match e {
            TransitionError::AlreadyResolved => AppError::new(
                ErrorCode::ReportAlreadyResolved,
                "this report has already been resolved",
            ),
            TransitionError::AlreadyReviewing => AppError::new(
                ErrorCode::InvalidReportAction,
                "this report is already under review",
            ),
        })?;

        let updated: Report = match transition {
            Transition::MarkReviewing => {
                diesel::update(reports::table.find(report_id))
                    .set((
                        reports::status.eq(ReportStatus::Reviewing.as_str()),
                        reports::reviewer_id.eq(moderator.0.id),
                        reports::updated_at.eq(Utc::now()),
                    ))
                    .get_result(conn)?
            }
            Transition::Resolve(resolution) => {
                if resolution == Resolution::Dismissed
                    && body.notes.as_deref().map_or(true, |n| n.trim().is_empty())
                {
                    return Err(AppError::new(
                        ErrorCode::NotesRequired,
                        "dismissing a report requires notes",
                    ));
                }

                let updated: Report = diesel::update(reports::table.find(report_id))
                    .set((
                        reports::status.eq(ReportStatus::Resolved.as_str()),
                        reports::resolution.eq(resolution.as_str()),
                        reports::resolved_by.eq(moderator.0.id),
                        reports::resolved_at.eq(Utc::now()),
                        reports::notes.eq(body.notes.clone()),
                        reports::updated_at.eq(Utc::now()),
                    ))
                    .get_result(conn)?;

                // Blocking resolution cascades to the reported account in
                // the same transaction.
                if resolution == Resolution::Blocked {
                    diesel::update(users::table.find(report.reported_id))
                        .set((
                            users::status.eq(UserStatus::Blocked.as_str()),
                            users::is_online.eq(false),
                            users::updated_at.eq(Utc::now()),
                        ))
                        .execute(conn)?;
                }

                updated
            }
        };

        diesel::insert_into(activity_logs::table)
            .values(&NewActivityLog {
                user_id: Some(moderator.0.id),
                action: match transition {
                    Transition::MarkReviewing => "report_reviewing".to_string(),
                    Transition::Resolve(Resolution::Blocked) => "report_blocked".to_string(),
                    Transition::Resolve(Resolution::Dismissed) => "report_dismissed".to_string(),
                },
                description: format!("Reviewed report {report_id}"),
                ip_address: meta.ip_address.clone(),
                user_agent: meta.user_agent.clone(),
            })
            .execute(conn)?;

        Ok((updated, transition))
    })?;

    if let Transition::Resolve(resolution) = transition {
        publisher::publish_report_resolved(
            &state.rabbitmq,
            report_id,
            updated_report.reported_id,
            resolution.as_str(),
        )
        .await;

        if resolution == Resolution::Blocked {
            publisher::publish_user_blocked(
                &state.rabbitmq,
                updated_report.reported_id,
                Some(report_id),
            )
            .await;
        }
    }

    Ok(Json(ApiResponse::ok(updated_report)))
}

// --- List users (paginated, filters) ---

pub async fn list_users(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(params): Query<UserFilterParams>,
) -> AppResult<Json<ApiResponse<Paginated<AdminUserRow>>>> {
    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    let pagination = PaginationParams { page: params.page, per_page: params.per_page };
    let offset = pagination.offset() as i64;
    let limit = pagination.limit() as i64;

    let select_columns = (
        users::id,
        users::username,
        users::email,
        users::name,
        users::gender,
        users::birth_date,
        users::role,
        users::status,
        users::is_online,
        users::last_active,
        users::created_at,
    );

    let mut items_query = users::table.select(select_columns).into_boxed();
    let mut count_query = users::table.select(count_star()).into_boxed();

    if let Some(ref status) = params.status {
        items_query = items_query.filter(users::status.eq(status.clone()));
        count_query = count_query.filter(users::status.eq(status.clone()));
    }
    if let Some(ref q) = params.q {
        let pattern = format!("%{}%", q.trim());
        items_query = items_query.filter(
            users::username.ilike(pattern.clone())
                .or(users::name.ilike(pattern.clone()))
                .or(users::email.ilike(pattern.clone())),
        );
        count_query = count_query.filter(
            users::username.ilike(pattern.clone())
                .or(users::name.ilike(pattern.clone()))
                .or(users::email.ilike(pattern)),
        );
    }

    let items = items_query
        .order(users::created_at.desc())
        .offset(offset)
        .limit(limit)
        .load::<AdminUserRow>(&mut conn)?;

    let total: i64 = count_query.first(&mut conn)?;

    let paginated = Paginated::new(items, total as u64, &pagination);
    Ok(Json(ApiResponse::ok(paginated)))
}

// --- Block / unblock / soft-delete a user ---

pub async fn set_user_status(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    meta: RequestMeta,
    Path(user_id): Path<Uuid>,
    Json(body): Json<UserStatusRequest>,
) -> AppResult<Json<ApiResponse<AdminUserRow>>> {
    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    let updated = conn.transaction::<_, AppError, _>(|conn| {
        let (username, email): (String, String) = users::table
            .find(user_id)
            .select((users::username, users::email))
            .first(conn)
            .optional()?
            .ok_or_else(|| AppError::new(ErrorCode::UserNotFound, "user not found"))?;

        match body.action {
            UserAction::Block => {
                diesel::update(users::table.find(user_id))
                    .set((
                        users::status.eq(UserStatus::Blocked.as_str()),
                        users::is_online.eq(false),
                        users::updated_at.eq(Utc::now()),
                    ))
                    .execute(conn)?;
            }
            UserAction::Unblock => {
                diesel::update(users::table.find(user_id))
                    .set((
                        users::status.eq(UserStatus::Active.as_str()),
                        users::updated_at.eq(Utc::now()),
                    ))
                    .execute(conn)?;
            }
            UserAction::Delete => {
                diesel::update(users::table.find(user_id))
                    .set((
                        users::status.eq(UserStatus::Deleted.as_str()),
                        users::email.eq(format!("deleted_{user_id}_{email}")),
                        users::username.eq(format!("deleted_{user_id}_{username}")),
                        users::is_online.eq(false),
                        users::updated_at.eq(Utc::now()),
                    ))
                    .execute(conn)?;
            }
        }

        diesel::insert_into(activity_logs::table)
            .values(&NewActivityLog {
                user_id: Some(admin.0.id),
                action: match body.action {
                    UserAction::Block => "block".to_string(),
                    UserAction::Unblock => "unblock".to_string(),
                    UserAction::Delete => "delete".to_string(),
                },
                description: format!("Admin action on user {user_id}"),
                ip_address: meta.ip_address.clone(),
                user_agent: meta.user_agent.clone(),
            })
            .execute(conn)?;

        let updated: AdminUserRow = users::table
            .find(user_id)
            .select((
                users::id,
                users::username,
                users::email,
                users::name,
                users::gender,
                users::birth_date,
                users::role,
                users::status,
                users::is_online,
                users::last_active,
                users::created_at,
            ))
            .first(conn)?;

        Ok(updated)
    })?;

    if body.action == UserAction::Block {
        publisher::publish_user_blocked(&state.rabbitmq, user_id, None).await;
    }

    Ok(Json(ApiResponse::ok(updated)))
}

// --- Dashboard stats ---

pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    _moderator: ModeratorUser,
) -> AppResult<Json<ApiResponse<DashboardStats>>> {
    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    let active_users: i64 = users::table
        .filter(users::status.eq(UserStatus::Active.as_str()))
        .count()
        .get_result(&mut conn)?;

    let blocked_users: i64 = users::table
        .filter(users::status.eq(UserStatus::Blocked.as_str()))
        .count()
        .get_result(&mut conn)?;

    let total_matches: i64 = matches::table
        .filter(matches::status.eq("matched"))
        .count()
        .get_result(&mut conn)?;

    let total_messages: i64 = messages::table.count().get_result(&mut conn)?;

    let pending_reports: i64 = reports::table
        .filter(reports::status.eq(ReportStatus::Pending.as_str()))
        .count()
        .get_result(&mut conn)?;

    let today_start = Utc::now().date_naive().and_hms_opt(0, 0, 0).unwrap().and_utc();

    let reports_today: i64 = reports::table
        .filter(reports::created_at.ge(today_start))
        .count()
        .get_result(&mut conn)?;

    Ok(Json(ApiResponse::ok(DashboardStats {
        active_users,
        blocked_users,
        total_matches,
        total_messages,
        pending_reports,
        reports_today,
    })))
}

// --- Activity log (paginated) ---

pub async fn get_activity_log(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<Paginated<ActivityLog>>>> {
    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    let offset = params.offset() as i64;
    let limit = params.limit() as i64;

    let items = activity_logs::table
        .order(activity_logs::created_at.desc())
        .offset(offset)
        .limit(limit)
        .load::<ActivityLog>(&mut conn)?;

    let total: i64 = activity_logs::table.count().get_result(&mut conn)?;

    let paginated = Paginated::new(items, total as u64, &params);
    Ok(Json(ApiResponse::ok(paginated)))
}
