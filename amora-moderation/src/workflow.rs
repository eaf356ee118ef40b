//! Pure state machine for the report review workflow.
//!
//! Transitions only move forward: `pending -> reviewing -> resolved`,
//! with `pending` allowed to resolve directly. A resolved report is
//! immutable.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Pending,
    Reviewing,
    Resolved,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "pending",
            ReportStatus::Reviewing => "reviewing",
            ReportStatus::Resolved => "resolved",
        }
    }
}

impl std::str::FromStr for ReportStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ReportStatus::Pending),
            "reviewing" => Ok(ReportStatus::Reviewing),
            "resolved" => Ok(ReportStatus::Resolved),
            _ => Err(format!("unknown report status: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    Blocked,
    Dismissed,
}

impl Resolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::Blocked => "blocked",
            Resolution::Dismissed => "dismissed",
        }
    }
}

/// Reviewer action as received from the admin surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewAction {
    Reviewing,
    BlockUser,
    Dismiss,
}

/// Where the report lands after a valid action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    MarkReviewing,
    Resolve(Resolution),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionError {
    AlreadyResolved,
    AlreadyReviewing,
}

pub fn apply_action(current: ReportStatus, action: ReviewAction) -> Result<Transition, TransitionError> {
    if current == ReportStatus::Resolved {
        return Err(TransitionError::AlreadyResolved);
    }
    match action {
        ReviewAction::Reviewing => {
            if current == ReportStatus::Reviewing {
                return Err(TransitionError::AlreadyReviewing);
            }
            Ok(Transition::MarkReviewing)
        }
        ReviewAction::BlockUser => Ok(Transition::Resolve(Resolution::Blocked)),
        ReviewAction::Dismiss => Ok(Transition::Resolve(Resolution::Dismissed)),
    }
}

pub const REPORT_TYPES: &[&str] = &["fake", "inappropriate", "harassment", "spam", "other"];

pub fn valid_report_type(report_type: &str) -> bool {
    REPORT_TYPES.contains(&report_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_can_move_to_reviewing() {
        assert_eq!(
            apply_action(ReportStatus::Pending, ReviewAction::Reviewing),
            Ok(Transition::MarkReviewing)
        );
    }

    #[test]
    fn pending_and_reviewing_can_resolve_either_way() {
        for status in [ReportStatus::Pending, ReportStatus::Reviewing] {
            assert_eq!(
                apply_action(status, ReviewAction::BlockUser),
                Ok(Transition::Resolve(Resolution::Blocked))
            );
            assert_eq!(
                apply_action(status, ReviewAction::Dismiss),
                Ok(Transition::Resolve(Resolution::Dismissed))
            );
        }
    }

    #[test]
    fn resolved_is_terminal() {
        for action in [ReviewAction::Reviewing, ReviewAction::BlockUser, ReviewAction::Dismiss] {
            assert_eq!(
                apply_action(ReportStatus::Resolved, action),
                Err(TransitionError::AlreadyResolved)
            );
        }
    }

    #[test]
    fn reviewing_does_not_repeat() {
        assert_eq!(
            apply_action(ReportStatus::Reviewing, ReviewAction::Reviewing),
            Err(TransitionError::AlreadyReviewing)
        );
    }

    #[test]
    fn report_type_validation() {
        assert!(valid_report_type("spam"));
        assert!(valid_report_type("other"));
        assert!(!valid_report_type("rude"));
    }
}
