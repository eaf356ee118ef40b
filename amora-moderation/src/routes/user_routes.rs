use axum::extract::State;
use axum::Json;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use amora_shared::errors::{AppError, AppResult, ErrorCode};
use amora_shared::middleware::RequestMeta;
use amora_shared::types::auth::AuthUser;
use amora_shared::types::api::ApiResponse;

use crate::events::publisher;
use crate::models::{NewActivityLog, NewReport, Report};
use crate::schema::{activity_logs, reports, users};
use crate::workflow::{valid_report_type, ReportStatus};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateReportRequest {
    pub reported_id: Uuid,
    pub report_type: String,
    pub reason: String,
}

pub async fn create_report(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    meta: RequestMeta,
    Json(body): Json<CreateReportRequest>,
) -> AppResult<Json<ApiResponse<Report>>> {
    if auth.id == body.reported_id {
        return Err(AppError::new(ErrorCode::CannotReportSelf, "you cannot report yourself"));
    }

    if !valid_report_type(&body.report_type) {
        return Err(AppError::new(
            ErrorCode::ValidationError,
            "report_type must be one of: fake, inappropriate, harassment, spam, other",
        ));
    }

    if body.reason.trim().is_empty() {
        return Err(AppError::new(ErrorCode::ValidationError, "reason is required"));
    }

    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    let reported_exists: i64 = users::table
        .filter(users::id.eq(body.reported_id))
        .count()
        .get_result(&mut conn)?;
    if reported_exists == 0 {
        return Err(AppError::new(ErrorCode::UserNotFound, "reported user not found"));
    }

    // One open report per (reporter, reported) pair at a time
    let existing: i64 = reports::table
        .filter(reports::reporter_id.eq(auth.id))
        .filter(reports::reported_id.eq(body.reported_id))
        .filter(reports::status.ne(ReportStatus::Resolved.as_str()))
        .count()
        .get_result(&mut conn)?;

    if existing > 0 {
        return Err(AppError::new(
            ErrorCode::DuplicateReport,
            "you already have an open report against this user",
        ));
    }

    let report: Report = diesel::insert_into(reports::table)
        .values(&NewReport {
            reporter_id: auth.id,
            reported_id: body.reported_id,
            report_type: body.report_type.clone(),
            reason: body.reason.trim().to_string(),
        })
        .get_result(&mut conn)?;

    diesel::insert_into(activity_logs::table)
        .values(&NewActivityLog {
            user_id: Some(auth.id),
            action: "report".to_string(),
            description: format!("Reported user {}", body.reported_id),
            ip_address: meta.ip_address,
            user_agent: meta.user_agent,
        })
        .execute(&mut conn)?;

    publisher::publish_report_created(
        &state.rabbitmq,
        report.id,
        report.reporter_id,
        report.reported_id,
        &report.report_type,
    )
    .await;

    Ok(Json(ApiResponse::ok(report)))
}
