use chrono::{DateTime, Utc};
use common::AdminRole;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::shared::{validate_password, validate_username};
use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateAdminRequest {
    #[schema(example = "venue_admin")]
    pub username: String,
    /// 8-128 characters.
    pub password: String,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateAdminRequest {
    pub username: String,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct ResetPasswordRequest {
    pub password: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AdminResponse {
    pub id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub username: String,
    pub role: AdminRole,
    pub created_at: DateTime<Utc>,
}

impl From<crate::entity::admin::Model> for AdminResponse {
    fn from(m: crate::entity::admin::Model) -> Self {
        Self {
            id: m.id,
            tenant_id: m.tenant_id,
            username: m.username,
            role: m.role,
            created_at: m.created_at,
        }
    }
}

pub fn validate_create_admin(req: &CreateAdminRequest) -> Result<(), AppError> {
    validate_username(&req.username)?;
    validate_password(&req.password)
}
