use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::types::ApiErrorResponse;

/// Application error codes following the pattern E{service}{sequence}
///
/// Ranges:
/// - E0xxx: Shared/infrastructure errors
/// - E1xxx: Auth errors
/// - E2xxx: User errors
/// - E3xxx: Matching errors
/// - E4xxx: Messaging errors
/// - E5xxx: Notification errors
/// - E6xxx: Moderation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Shared (E0xxx)
    InternalError,
    ValidationError,
    NotFound,
    Unauthorized,
    Forbidden,
    RateLimited,
    BadRequest,

    // Auth (E1xxx)
    InvalidCredentials,
    UsernameTaken,
    EmailAlreadyExists,
    PasswordTooWeak,
    TokenExpired,
    TokenInvalid,
    RefreshTokenRevoked,
    TooManyLoginAttempts,
    AccountBlocked,
    AccountDeleted,
    InvalidUsername,
    UnderageUser,

    // User (E2xxx)
    ProfileNotFound,
    PreferencesNotFound,
    CannotBlockSelf,
    AlreadyBlocked,
    BlockNotFound,

    // Matching (E3xxx)
    MatchNotFound,
    AlreadyInteracted,
    CannotLikeSelf,
    MatchNotPending,
    TargetUnavailable,
    PairBlocked,

    // Messaging (E4xxx)
    MessageNotFound,
    MessageTooLong,
    NotMessageSender,
    DeleteWindowExpired,

    // Notification (E5xxx)
    NotificationNotFound,

    // Moderation (E6xxx)
    ReportNotFound,
    ReportAlreadyResolved,
    CannotReportSelf,
    DuplicateReport,
    NotesRequired,
    UserNotFound,
    InvalidReportAction,
}

impl ErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            // Shared
            Self::InternalError => "E0001",
            Self::ValidationError => "E0002",
            Self::NotFound => "E0003",
            Self::Unauthorized => "E0004",
            Self::Forbidden => "E0005",
            Self::RateLimited => "E0006",
            Self::BadRequest => "E0007",

            // Auth
            Self::InvalidCredentials => "E1001",
            Self::UsernameTaken => "E1002",
            Self::EmailAlreadyExists => "E1003",
            Self::PasswordTooWeak => "E1004",
            Self::TokenExpired => "E1005",
            Self::TokenInvalid => "E1006",
            Self::RefreshTokenRevoked => "E1007",
            Self::TooManyLoginAttempts => "E1008",
            Self::AccountBlocked => "E1009",
            Self::AccountDeleted => "E1010",
            Self::InvalidUsername => "E1011",
            Self::UnderageUser => "E1012",

            // User
            Self::ProfileNotFound => "E2001",
            Self::PreferencesNotFound => "E2002",
            Self::CannotBlockSelf => "E2003",
            Self::AlreadyBlocked => "E2004",
            Self::BlockNotFound => "E2005",

            // Matching
            Self::MatchNotFound => "E3001",
            Self::AlreadyInteracted => "E3002",
            Self::CannotLikeSelf => "E3003",
            Self::MatchNotPending => "E3004",
            Self::TargetUnavailable => "E3005",
            Self::PairBlocked => "E3006",

            // Messaging
            Self::MessageNotFound => "E4001",
            Self::MessageTooLong => "E4002",
            Self::NotMessageSender => "E4003",
            Self::DeleteWindowExpired => "E4004",

            // Notification
            Self::NotificationNotFound => "E5001",

            // Moderation
            Self::ReportNotFound => "E6001",
            Self::ReportAlreadyResolved => "E6002",
            Self::CannotReportSelf => "E6003",
            Self::DuplicateReport => "E6004",
            Self::NotesRequired => "E6005",
            Self::UserNotFound => "E6006",
            Self::InvalidReportAction => "E6007",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ValidationError | Self::BadRequest | Self::PasswordTooWeak
            | Self::InvalidUsername | Self::UnderageUser | Self::MessageTooLong
            | Self::NotesRequired | Self::InvalidReportAction => StatusCode::BAD_REQUEST,
            Self::NotFound | Self::ProfileNotFound | Self::PreferencesNotFound
            | Self::BlockNotFound | Self::MatchNotFound | Self::TargetUnavailable
            | Self::MessageNotFound | Self::NotificationNotFound
            | Self::ReportNotFound | Self::UserNotFound => StatusCode::NOT_FOUND,
            Self::Unauthorized | Self::InvalidCredentials | Self::TokenExpired
            | Self::TokenInvalid | Self::RefreshTokenRevoked => StatusCode::UNAUTHORIZED,
            Self::Forbidden | Self::AccountBlocked | Self::AccountDeleted
            | Self::CannotBlockSelf | Self::CannotLikeSelf | Self::CannotReportSelf
            | Self::PairBlocked | Self::NotMessageSender
            | Self::DeleteWindowExpired => StatusCode::FORBIDDEN,
            Self::RateLimited | Self::TooManyLoginAttempts => StatusCode::TOO_MANY_REQUESTS,
            Self::UsernameTaken | Self::EmailAlreadyExists | Self::AlreadyBlocked
            | Self::AlreadyInteracted | Self::MatchNotPending
            | Self::ReportAlreadyResolved | Self::DuplicateReport => StatusCode::CONFLICT,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Known {
        code: ErrorCode,
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Known {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(code: ErrorCode, message: impl Into<String>, details: serde_json::Value) -> Self {
        Self::Known {
            code,
            message: message.into(),
            details: Some(details),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match &self {
            AppError::Known { code, message, details } => {
                let status = code.status_code();
                let mut resp = ApiErrorResponse::new(code.code(), message);
                if let Some(d) = details {
                    resp = resp.with_details(d.clone());
                }
                (status, resp)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorResponse::new("E0001", "internal server error"),
                )
            }
            AppError::Database(err) => {
                tracing::error!(error = %err, "database error");
                match err {
                    diesel::result::Error::NotFound => (
                        StatusCode::NOT_FOUND,
                        ApiErrorResponse::new("E0003", "resource not found"),
                    ),
                    _ => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ApiErrorResponse::new("E0001", "database error"),
                    ),
                }
            }
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ApiErrorResponse::new("E0002", msg),
            ),
        };

        (status, Json(error_response)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const ALL: &[ErrorCode] = &[
        ErrorCode::InternalError,
        ErrorCode::ValidationError,
        ErrorCode::NotFound,
        ErrorCode::Unauthorized,
        ErrorCode::Forbidden,
        ErrorCode::RateLimited,
        ErrorCode::BadRequest,
        ErrorCode::InvalidCredentials,
        ErrorCode::UsernameTaken,
        ErrorCode::EmailAlreadyExists,
        ErrorCode::PasswordTooWeak,
        ErrorCode::TokenExpired,
        ErrorCode::TokenInvalid,
        ErrorCode::RefreshTokenRevoked,
        ErrorCode::TooManyLoginAttempts,
        ErrorCode::AccountBlocked,
        ErrorCode::AccountDeleted,
        ErrorCode::InvalidUsername,
        ErrorCode::UnderageUser,
        ErrorCode::ProfileNotFound,
        ErrorCode::PreferencesNotFound,
        ErrorCode::CannotBlockSelf,
        ErrorCode::AlreadyBlocked,
        ErrorCode::BlockNotFound,
        ErrorCode::MatchNotFound,
        ErrorCode::AlreadyInteracted,
        ErrorCode::CannotLikeSelf,
        ErrorCode::MatchNotPending,
        ErrorCode::TargetUnavailable,
        ErrorCode::PairBlocked,
        ErrorCode::MessageNotFound,
        ErrorCode::MessageTooLong,
        ErrorCode::NotMessageSender,
        ErrorCode::DeleteWindowExpired,
        ErrorCode::NotificationNotFound,
        ErrorCode::ReportNotFound,
        ErrorCode::ReportAlreadyResolved,
        ErrorCode::CannotReportSelf,
        ErrorCode::DuplicateReport,
        ErrorCode::NotesRequired,
        ErrorCode::UserNotFound,
        ErrorCode::InvalidReportAction,
    ];

    #[test]
    fn error_codes_are_unique() {
        let mut seen = HashSet::new();
        for code in ALL {
            assert!(seen.insert(code.code()), "duplicate code {}", code.code());
        }
    }

    #[test]
    fn status_mapping() {
        assert_eq!(ErrorCode::MatchNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::AlreadyInteracted.status_code(), StatusCode::CONFLICT);
        assert_eq!(ErrorCode::TooManyLoginAttempts.status_code(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(ErrorCode::DeleteWindowExpired.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorCode::MessageTooLong.status_code(), StatusCode::BAD_REQUEST);
    }
}
