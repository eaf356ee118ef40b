use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::schema::{users, user_preferences, refresh_tokens, activity_logs};

// --- User ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = users)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub gender: String,
    pub birth_date: NaiveDate,
    pub bio: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub role: String,
    pub status: String,
    pub is_online: bool,
    pub last_active: Option<DateTime<Utc>>,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub gender: String,
    pub birth_date: NaiveDate,
    pub bio: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub status: String,
}

// --- UserPreference ---

#[derive(Debug, Insertable)]
#[diesel(table_name = user_preferences)]
pub struct NewUserPreference {
    pub user_id: Uuid,
    pub interested_in: String,
    pub min_age: i32,
    pub max_age: i32,
    pub max_distance: i32,
    pub notifications_enabled: bool,
}

// --- RefreshToken ---

#[derive(Debug, Queryable, Identifiable, Serialize)]
#[diesel(table_name = refresh_tokens)]
pub struct RefreshToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = refresh_tokens)]
pub struct NewRefreshToken {
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
}

// --- ActivityLog ---

#[derive(Debug, Insertable)]
#[diesel(table_name = activity_logs)]
pub struct NewActivityLog {
    pub user_id: Option<Uuid>,
    pub action: String,
    pub description: String,
    pub ip_address: String,
    pub user_agent: String,
}
