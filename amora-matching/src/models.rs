use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::{matches, notifications, activity_logs};

/// Match lifecycle. `pending` is a unilateral like; `matched` is mutual.
/// `rejected` is terminal; an unmatch deletes the row outright, so
/// `unmatched` only ever appears in transit, never at rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Pending,
    Matched,
    Rejected,
    Unmatched,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Pending => "pending",
            MatchStatus::Matched => "matched",
            MatchStatus::Rejected => "rejected",
            MatchStatus::Unmatched => "unmatched",
        }
    }
}

impl std::str::FromStr for MatchStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(MatchStatus::Pending),
            "matched" => Ok(MatchStatus::Matched),
            "rejected" => Ok(MatchStatus::Rejected),
            "unmatched" => Ok(MatchStatus::Unmatched),
            _ => Err(format!("unknown match status: {s}")),
        }
    }
}

// --- Match ---

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
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.user_lo == user_id || self.user_hi == user_id
    }

    pub fn other_participant(&self, user_id: Uuid) -> Uuid {
        if self.user_lo == user_id { self.user_hi } else { self.user_lo }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = matches)]
pub struct NewMatch {
    pub user_lo: Uuid,
    pub user_hi: Uuid,
    pub initiated_by: Uuid,
    pub status: String,
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
