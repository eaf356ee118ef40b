//! Pure validation for the conversation surface: body limits, match
//! gating, and the short sender self-delete window.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// Senders may retract a message for this long after sending it.
pub const SELF_DELETE_WINDOW_MINS: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyRejection {
    Empty,
    TooLong,
}

/// Trim and validate a message body. Length counts characters, not
/// bytes, so multi-byte text gets the full budget.
pub fn validate_body(raw: &str, max_chars: usize) -> Result<String, BodyRejection> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(BodyRejection::Empty);
    }
    if trimmed.chars().count() > max_chars {
        return Err(BodyRejection::TooLong);
    }
    Ok(trimmed.to_string())
}

/// Messaging is open only while the pair's match row says `matched`.
pub fn conversation_open(status: &str) -> bool {
    status == "matched"
}

pub fn is_participant(user_lo: Uuid, user_hi: Uuid, user_id: Uuid) -> bool {
    user_lo == user_id || user_hi == user_id
}

pub fn within_delete_window(created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now - created_at < Duration::minutes(SELF_DELETE_WINDOW_MINS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_whitespace_bodies_are_rejected() {
        assert_eq!(validate_body("", 1000), Err(BodyRejection::Empty));
        assert_eq!(validate_body("   \n\t ", 1000), Err(BodyRejection::Empty));
    }

    #[test]
    fn body_at_limit_passes_over_limit_fails() {
        let at_limit = "a".repeat(1000);
        assert_eq!(validate_body(&at_limit, 1000), Ok(at_limit.clone()));
        let over = "a".repeat(1001);
        assert_eq!(validate_body(&over, 1000), Err(BodyRejection::TooLong));
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let accented = "é".repeat(1000);
        assert!(validate_body(&accented, 1000).is_ok());
    }

    #[test]
    fn body_is_trimmed() {
        assert_eq!(validate_body("  hello  ", 1000), Ok("hello".to_string()));
    }

    #[test]
    fn gate_requires_matched_status() {
        assert!(conversation_open("matched"));
        assert!(!conversation_open("pending"));
        assert!(!conversation_open("rejected"));
        assert!(!conversation_open("unmatched"));
    }

    #[test]
    fn delete_window_is_five_minutes() {
        let sent = Utc::now();
        assert!(within_delete_window(sent, sent + Duration::minutes(4)));
        assert!(!within_delete_window(sent, sent + Duration::minutes(5)));
        assert!(!within_delete_window(sent, sent + Duration::hours(1)));
    }

    #[test]
    fn participant_check() {
        let (a, b, c) = (Uuid::now_v7(), Uuid::now_v7(), Uuid::now_v7());
        assert!(is_participant(a, b, a));
        assert!(is_participant(a, b, b));
        assert!(!is_participant(a, b, c));
    }
}
