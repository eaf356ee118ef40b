use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::schema::{matches, messages, notifications, activity_logs};

// --- Match (owned by the matching service; read here for gating) ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = matches)]
pub struct Match {
    pub id: Uuid,
    pub user_lo: Uuid,
    pub user_hi: Uuid,
    pub initiated_by: Uuid,
    pub status: String,
    pub matched_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Match {
    pub fn other_participant(&self, user_id: Uuid) -> Uuid {
        if self.user_lo == user_id { self.user_hi } else { self.user_lo }
    }
}

// --- Message ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = messages)]
pub struct Message {
    pub id: Uuid,
    pub match_id: Uuid,
    pub sender_id: Uuid,
    pub body: String,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = messages)]
pub struct NewMessage {
    pub match_id: Uuid,
    pub sender_id: Uuid,
    pub body: String,
}

// --- Notification ---

#[derive(Debug, Insertable)]
#[diesel(table_name = notifications)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub kind: String,
    pub title: String,
    pub body: String,
    pub related_id: Option<Uuid>,
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
