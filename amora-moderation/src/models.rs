use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::schema::{reports, activity_logs};

// --- Report ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = reports)]
pub struct Report {
    pub id: Uuid,
    pub reporter_id: Uuid,
    pub reported_id: Uuid,
    pub report_type: String,
    pub reason: String,
    pub status: String,
    pub resolution: Option<String>,
    pub notes: Option<String>,
    pub reviewer_id: Option<Uuid>,
    pub resolved_by: Option<Uuid>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = reports)]
pub struct NewReport {
    pub reporter_id: Uuid,
    pub reported_id: Uuid,
    pub report_type: String,
    pub reason: String,
}

// --- Admin user listing (no password hash leaves this service) ---

#[derive(Debug, Queryable, Serialize)]
pub struct AdminUserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub name: String,
    pub gender: String,
    pub birth_date: NaiveDate,
    pub role: String,
    pub status: String,
    pub is_online: bool,
    pub last_active: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

// --- ActivityLog ---

#[derive(Debug, Queryable, Identifiable, Serialize)]
#[diesel(table_name = activity_logs)]
pub struct ActivityLog {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub action: String,
    pub description: String,
    pub ip_address: String,
    pub user_agent: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = activity_logs)]
pub struct NewActivityLog {
    pub user_id: Option<Uuid>,
    pub action: String,
    pub description: String,
    pub ip_address: String,
    pub user_agent: String,
}
