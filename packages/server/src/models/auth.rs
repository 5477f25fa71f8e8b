use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::utils::jwt::ActorRole;

/// Request body for admin login.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    #[schema(example = "venue_admin")]
    pub username: String,
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
}

pub fn validate_login_request(payload: &LoginRequest) -> Result<(), AppError> {
    if payload.username.trim().is_empty() {
        return Err(AppError::Validation("Username must not be empty".into()));
    }
    if payload.password.is_empty() {
        return Err(AppError::Validation("Password must not be empty".into()));
    }
    Ok(())
}

/// Successful login response.
#[derive(Serialize, utoipa::ToSchema)]
pub struct LoginResponse {
    /// JWT bearer token.
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
    pub admin_id: Uuid,
    pub role: ActorRole,
    /// Absent for super admins.
    pub tenant_id: Option<Uuid>,
}

/// The authenticated actor, as read from its credential.
#[derive(Serialize, utoipa::ToSchema)]
pub struct MeResponse {
    /// Admin ID or participant ID.
    pub id: Uuid,
    pub role: ActorRole,
    pub tenant_id: Option<Uuid>,
}
