use chrono::{DateTime, Datelike, NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::{users, user_preferences, blocks, activity_logs};

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

#[derive(Debug, AsChangeset, Deserialize, Default)]
#[diesel(table_name = users)]
pub struct UpdateProfile {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}

/// Profile shape exposed to other users: no email, no account internals.
#[derive(Debug, Serialize)]
pub struct PublicProfile {
    pub id: Uuid,
    pub username: String,
    pub name: String,
    pub gender: String,
    pub age: i32,
    pub bio: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub is_online: bool,
    pub last_active: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl PublicProfile {
    pub fn from_user(user: User, today: NaiveDate) -> Self {
        Self {
            age: age_on(user.birth_date, today),
            id: user.id,
            username: user.username,
            name: user.name,
            gender: user.gender,
            bio: user.bio,
            city: user.city,
            country: user.country,
            is_online: user.is_online,
            last_active: user.last_active,
            created_at: user.created_at,
        }
    }
}

pub fn age_on(birth_date: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth_date.year();
    if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
        age -= 1;
    }
    age
}

// --- UserPreference ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = user_preferences)]
pub struct UserPreference {
    pub id: Uuid,
    pub user_id: Uuid,
    pub interested_in: String,
    pub min_age: i32,
    pub max_age: i32,
    pub max_distance: i32,
    pub notifications_enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, AsChangeset, Deserialize, Default)]
#[diesel(table_name = user_preferences)]
pub struct UpdatePreferences {
    pub interested_in: Option<String>,
    pub min_age: Option<i32>,
    pub max_age: Option<i32>,
    pub max_distance: Option<i32>,
    pub notifications_enabled: Option<bool>,
}

// --- Block ---

#[derive(Debug, Queryable, Identifiable, Serialize)]
#[diesel(table_name = blocks)]
pub struct Block {
    pub id: Uuid,
    pub blocker_id: Uuid,
    pub blocked_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = blocks)]
pub struct NewBlock {
    pub blocker_id: Uuid,
    pub blocked_id: Uuid,
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

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn age_counts_completed_years() {
        let today = date(2026, 8, 5);
        assert_eq!(age_on(date(2000, 8, 5), today), 26); // birthday today
        assert_eq!(age_on(date(2000, 8, 6), today), 25); // birthday tomorrow
        assert_eq!(age_on(date(2000, 1, 1), today), 26);
    }
}
