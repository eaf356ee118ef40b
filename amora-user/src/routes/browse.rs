use axum::extract::{Query, State};
use axum::Json;
use chrono::{Days, Months, NaiveDate, Utc};
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use amora_shared::errors::{AppError, AppResult};
use amora_shared::types::auth::AuthUser;
use amora_shared::types::user::{InterestedIn, UserStatus};
use amora_shared::types::ApiResponse;

use crate::models::{PublicProfile, User, UserPreference};
use crate::schema::{blocks, user_preferences, users};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct BrowseParams {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub online_only: bool,
    pub q: Option<String>,
}

fn default_limit() -> i64 { 20 }

/// Candidates must be born within this window to fall inside the
/// viewer's [min_age, max_age] span.
fn birth_date_bounds(min_age: i32, max_age: i32, today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let latest = today - Months::new((12 * min_age) as u32);
    let earliest = today - Months::new((12 * (max_age + 1)) as u32) + Days::new(1);
    (earliest, latest)
}

/// GET /browse - discover active users matching the viewer's preferences.
pub async fn browse(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<BrowseParams>,
) -> AppResult<Json<ApiResponse<Vec<PublicProfile>>>> {
    let limit = params.limit.clamp(1, 50);
    let today = Utc::now().date_naive();

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let prefs: Option<UserPreference> = user_preferences::table
        .filter(user_preferences::user_id.eq(user.id))
        .first::<UserPreference>(&mut conn)
        .optional()?;

    let interest = prefs
        .as_ref()
        .and_then(|p| p.interested_in.parse::<InterestedIn>().ok())
        .unwrap_or(InterestedIn::Both);
    let (min_age, max_age) = prefs
        .as_ref()
        .map(|p| (p.min_age, p.max_age))
        .unwrap_or((18, 99));

    // Blocks hide in both directions
    let blocked_by_me: Vec<Uuid> = blocks::table
        .filter(blocks::blocker_id.eq(user.id))
        .select(blocks::blocked_id)
        .load::<Uuid>(&mut conn)?;
    let blocked_me: Vec<Uuid> = blocks::table
        .filter(blocks::blocked_id.eq(user.id))
        .select(blocks::blocker_id)
        .load::<Uuid>(&mut conn)?;

    let mut excluded = blocked_by_me;
    excluded.extend(blocked_me);
    excluded.push(user.id);

    let (earliest_birth, latest_birth) = birth_date_bounds(min_age, max_age, today);

    let mut query = users::table
        .filter(users::status.eq(UserStatus::Active.as_str()))
        .filter(users::id.ne_all(&excluded))
        .filter(users::birth_date.ge(earliest_birth))
        .filter(users::birth_date.le(latest_birth))
        .into_boxed();

    if interest != InterestedIn::Both {
        query = query.filter(users::gender.eq(match interest {
            InterestedIn::Male => "M",
            InterestedIn::Female => "F",
            InterestedIn::Both => unreachable!(),
        }));
    }

    if params.online_only {
        query = query.filter(users::is_online.eq(true));
    }

    if let Some(ref q) = params.q {
        let pattern = format!("%{}%", q.trim());
        query = query.filter(users::username.ilike(pattern.clone()).or(users::name.ilike(pattern)));
    }

    let candidates: Vec<User> = query
        .order(users::created_at.desc())
        .limit(limit)
        .load::<User>(&mut conn)?;

    let profiles = candidates
        .into_iter()
        .map(|u| PublicProfile::from_user(u, today))
        .collect();

    Ok(Json(ApiResponse::ok(profiles)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn bounds_cover_exactly_the_age_span() {
        let today = date(2026, 8, 5);
        let (earliest, latest) = birth_date_bounds(18, 30, today);
        // 18 today is the youngest allowed
        assert_eq!(latest, date(2008, 8, 5));
        // Turns 31 tomorrow, still 30 today
        assert_eq!(earliest, date(1995, 8, 6));
    }
}
