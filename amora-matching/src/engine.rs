//! Pure decision logic for the like/match state machine.
//!
//! A pair of users is identified by its canonical ordering (lower uuid
//! first) and owns at most one `matches` row, enforced by a unique index
//! on (user_lo, user_hi). Handlers insert with ON CONFLICT DO NOTHING and
//! route the conflict through [`decide_like`], which makes the
//! simultaneous-mutual-like race converge instead of leaving two pending
//! rows behind.

use uuid::Uuid;

use crate::models::MatchStatus;

/// Canonical ordering for an unordered user pair.
pub fn canonical_pair(a: Uuid, b: Uuid) -> (Uuid, Uuid) {
    if a < b { (a, b) } else { (b, a) }
}

/// What the caller saw in the existing row for the pair.
#[derive(Debug, Clone, Copy)]
pub struct PairView {
    pub status: MatchStatus,
    pub initiated_by: Uuid,
}

/// Outcome of a like attempt against an existing row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeDecision {
    /// The counterpart liked first; flip the pending row to matched.
    FlipToMatched,
    /// Any other prior interaction is final: a repeat like, a rejected
    /// pair, or an already-matched pair all refuse a new like.
    AlreadyInteracted,
}

pub fn decide_like(existing: PairView, actor: Uuid) -> LikeDecision {
    match existing.status {
        MatchStatus::Pending if existing.initiated_by != actor => LikeDecision::FlipToMatched,
        _ => LikeDecision::AlreadyInteracted,
    }
}

/// A pending match may be closed (rejected) by either participant;
/// every other state refuses the transition.
pub fn can_reject(status: MatchStatus) -> bool {
    status == MatchStatus::Pending
}

/// Only an active mutual match can be unmatched.
pub fn can_unmatch(status: MatchStatus) -> bool {
    status == MatchStatus::Matched
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> (Uuid, Uuid) {
        (Uuid::now_v7(), Uuid::now_v7())
    }

    #[test]
    fn canonical_pair_is_symmetric() {
        let (a, b) = pair();
        assert_eq!(canonical_pair(a, b), canonical_pair(b, a));
        let (lo, hi) = canonical_pair(a, b);
        assert!(lo < hi);
    }

    #[test]
    fn reciprocal_like_flips_to_matched() {
        let (a, b) = pair();
        let view = PairView { status: MatchStatus::Pending, initiated_by: a };
        assert_eq!(decide_like(view, b), LikeDecision::FlipToMatched);
    }

    #[test]
    fn repeat_like_is_a_conflict() {
        let (a, _) = pair();
        let view = PairView { status: MatchStatus::Pending, initiated_by: a };
        assert_eq!(decide_like(view, a), LikeDecision::AlreadyInteracted);
    }

    #[test]
    fn rejected_and_matched_pairs_refuse_new_likes() {
        let (a, b) = pair();
        for status in [MatchStatus::Rejected, MatchStatus::Matched, MatchStatus::Unmatched] {
            let view = PairView { status, initiated_by: a };
            assert_eq!(decide_like(view, b), LikeDecision::AlreadyInteracted);
            assert_eq!(decide_like(view, a), LikeDecision::AlreadyInteracted);
        }
    }

    #[test]
    fn only_pending_can_be_rejected() {
        assert!(can_reject(MatchStatus::Pending));
        assert!(!can_reject(MatchStatus::Matched));
        assert!(!can_reject(MatchStatus::Rejected));
    }

    #[test]
    fn only_matched_can_be_unmatched() {
        assert!(can_unmatch(MatchStatus::Matched));
        assert!(!can_unmatch(MatchStatus::Pending));
        assert!(!can_unmatch(MatchStatus::Rejected));
    }
}
