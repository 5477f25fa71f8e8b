use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, RuntimeErr};
use serde::Serialize;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `TOKEN_MISSING`,
    /// `TOKEN_INVALID`, `UNAUTHORIZED`, `INVALID_CREDENTIALS`, `PERMISSION_DENIED`,
    /// `CROSS_TENANT_ACCESS`, `NOT_FOUND`, `TENANT_INACTIVE`, `NICKNAME_TAKEN`,
    /// `USERNAME_TAKEN`, `CONFLICT`, `NOT_JOINED`, `SESSION_NOT_ACTIVE`, `ROUND_NOT_STARTED`,
    /// `DUPLICATE_ANSWER`, `MAX_ROUNDS_REACHED`, `STORAGE_UNAVAILABLE`, `INTERNAL_ERROR`.
    #[schema(example = "NICKNAME_TAKEN")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Nickname is already taken in this tenant")]
    pub message: String,
}

/// Application-level error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("missing bearer token")]
    TokenMissing,
    #[error("invalid or expired token")]
    TokenInvalid,
    /// The credential is valid but names a different subject.
    #[error("credential does not grant access to this resource")]
    Unauthorized,
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("insufficient permissions")]
    PermissionDenied,
    #[error("cross-tenant access denied")]
    CrossTenantAccess,
    #[error("{0}")]
    NotFound(String),
    #[error("tenant is inactive")]
    TenantInactive,
    #[error("nickname is already taken")]
    NicknameTaken,
    #[error("username is already taken")]
    UsernameTaken,
    /// Invalid state transition or other write conflict.
    #[error("{0}")]
    Conflict(String),
    #[error("participant has not joined this session")]
    NotJoined,
    #[error("session is not active")]
    SessionNotActive,
    #[error("round {0} is not the active round")]
    RoundNotStarted(i32),
    #[error("answer already submitted for round {0}")]
    DuplicateAnswer(i32),
    #[error("session already has the maximum number of rounds")]
    MaxRoundsReached,
    #[error("storage temporarily unavailable: {0}")]
    StorageTransientFailure(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Failures worth retrying with backoff. Validation outcomes never are.
    pub fn is_transient(&self) -> bool {
        matches!(self, AppError::StorageTransientFailure(_))
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::TokenMissing => "TOKEN_MISSING",
            AppError::TokenInvalid => "TOKEN_INVALID",
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::PermissionDenied => "PERMISSION_DENIED",
            AppError::CrossTenantAccess => "CROSS_TENANT_ACCESS",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::TenantInactive => "TENANT_INACTIVE",
            AppError::NicknameTaken => "NICKNAME_TAKEN",
            AppError::UsernameTaken => "USERNAME_TAKEN",
            AppError::Conflict(_) => "CONFLICT",
            AppError::NotJoined => "NOT_JOINED",
            AppError::SessionNotActive => "SESSION_NOT_ACTIVE",
            AppError::RoundNotStarted(_) => "ROUND_NOT_STARTED",
            AppError::DuplicateAnswer(_) => "DUPLICATE_ANSWER",
            AppError::MaxRoundsReached => "MAX_ROUNDS_REACHED",
            AppError::StorageTransientFailure(_) => "STORAGE_UNAVAILABLE",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        let code = self.code();
        let (status, message) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::TokenMissing => (StatusCode::UNAUTHORIZED, "Authentication required".into()),
            AppError::TokenInvalid => (StatusCode::UNAUTHORIZED, "Invalid or expired token".into()),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Credential does not grant access to this resource".into(),
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "Invalid username or password".into(),
            ),
            AppError::PermissionDenied => {
                (StatusCode::FORBIDDEN, "Insufficient permissions".into())
            }
            AppError::CrossTenantAccess => (
                StatusCode::FORBIDDEN,
                "Access to another tenant's data is not allowed".into(),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::TenantInactive => (StatusCode::FORBIDDEN, "Tenant is inactive".into()),
            AppError::NicknameTaken => (
                StatusCode::CONFLICT,
                "Nickname is already taken in this tenant".into(),
            ),
            AppError::UsernameTaken => {
                (StatusCode::CONFLICT, "Username is already taken".into())
            }
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::NotJoined => (
                StatusCode::CONFLICT,
                "Join the session before answering".into(),
            ),
            AppError::SessionNotActive => (StatusCode::CONFLICT, "Session is not active".into()),
            AppError::RoundNotStarted(n) => (
                StatusCode::CONFLICT,
                format!("Round {n} has not been started"),
            ),
            AppError::DuplicateAnswer(n) => (
                StatusCode::CONFLICT,
                format!("An answer for round {n} was already submitted"),
            ),
            AppError::MaxRoundsReached => (
                StatusCode::CONFLICT,
                "Session already has the maximum number of rounds".into(),
            ),
            AppError::StorageTransientFailure(detail) => {
                tracing::warn!("Transient storage failure: {}", detail);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Storage is temporarily unavailable, please retry".into(),
                )
            }
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred".into(),
                )
            }
        };
        (status, ErrorBody { code, message })
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        if is_transient_db_error(&err) {
            AppError::StorageTransientFailure(err.to_string())
        } else {
            AppError::Internal(err.to_string())
        }
    }
}

/// Connection loss, pool exhaustion and lock contention are worth a retry.
fn is_transient_db_error(err: &DbErr) -> bool {
    match err {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => true,
        DbErr::Exec(RuntimeErr::SqlxError(e)) | DbErr::Query(RuntimeErr::SqlxError(e)) => {
            let msg = e.to_string();
            msg.contains("database is locked")
                || msg.contains("deadlock detected")
                || msg.contains("could not serialize")
        }
        _ => false,
    }
}
