use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// RabbitMQ event envelope wrapping all domain events.
///
/// Routing key format: `amora.{domain}.{entity}.{action}`
/// Example: `amora.matching.match.created`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event<T: Serialize> {
    pub id: Uuid,
    pub source: String,
    pub event_type: String,
    pub timestamp: DateTime<Utc>,
    pub correlation_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub data: T,
}

impl<T: Serialize> Event<T> {
    pub fn new(source: impl Into<String>, event_type: impl Into<String>, data: T) -> Self {
        Self {
            id: Uuid::now_v7(),
            source: source.into(),
            event_type: event_type.into(),
            timestamp: Utc::now(),
            correlation_id: None,
            user_id: None,
            data,
        }
    }

    pub fn with_user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_correlation(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }
}

/// RabbitMQ routing keys
pub mod routing_keys {
    // Auth events
    pub const AUTH_USER_REGISTERED: &str = "amora.auth.user.registered";

    // User events
    pub const USER_PROFILE_UPDATED: &str = "amora.user.profile.updated";
    pub const USER_ACCOUNT_DELETED: &str = "amora.user.account.deleted";

    // Matching events
    pub const MATCHING_LIKE_CREATED: &str = "amora.matching.like.created";
    pub const MATCHING_MATCH_CREATED: &str = "amora.matching.match.created";
    pub const MATCHING_MATCH_ENDED: &str = "amora.matching.match.ended";

    // Messaging events
    pub const MESSAGING_MESSAGE_SENT: &str = "amora.messaging.message.sent";

    // Moderation events
    pub const MODERATION_REPORT_CREATED: &str = "amora.moderation.report.created";
    pub const MODERATION_REPORT_RESOLVED: &str = "amora.moderation.report.resolved";
    pub const MODERATION_USER_BLOCKED: &str = "amora.moderation.user.blocked";
}

/// Common event data payloads
pub mod payloads {
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct UserRegistered {
        pub user_id: Uuid,
        pub username: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ProfileUpdated {
        pub user_id: Uuid,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct AccountDeleted {
        pub user_id: Uuid,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct LikeCreated {
        pub match_id: Uuid,
        pub liker_id: Uuid,
        pub liked_id: Uuid,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct MatchCreated {
        pub match_id: Uuid,
        pub user_lo: Uuid,
        pub user_hi: Uuid,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct MatchEnded {
        pub match_id: Uuid,
        pub ended_by: Uuid,
        pub other_user_id: Uuid,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct MessageSent {
        pub message_id: Uuid,
        pub match_id: Uuid,
        pub sender_id: Uuid,
        pub recipient_id: Uuid,
        pub content_preview: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ReportCreated {
        pub report_id: Uuid,
        pub reporter_id: Uuid,
        pub reported_id: Uuid,
        pub report_type: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ReportResolved {
        pub report_id: Uuid,
        pub reported_id: Uuid,
        pub resolution: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct UserBlocked {
        pub user_id: Uuid,
        pub report_id: Option<Uuid>,
    }
}
