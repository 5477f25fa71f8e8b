use chrono::{DateTime, Utc};
use common::TenantStatus;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::shared::{double_option, validate_description, validate_name};
use crate::error::AppError;

const MAX_TENANT_NAME: usize = 128;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateTenantRequest {
    #[schema(example = "The Crown & Anchor")]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct UpdateTenantRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    pub status: Option<TenantStatus>,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct TenantListQuery {
    /// Filter by status (`active` or `inactive`).
    pub status: Option<TenantStatus>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct TenantResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub status: TenantStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<crate::entity::tenant::Model> for TenantResponse {
    fn from(m: crate::entity::tenant::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            status: m.status,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

pub fn validate_create_tenant(req: &CreateTenantRequest) -> Result<(), AppError> {
    validate_name("Name", &req.name, MAX_TENANT_NAME)?;
    validate_description(req.description.as_deref())
}

pub fn validate_update_tenant(req: &UpdateTenantRequest) -> Result<(), AppError> {
    if let Some(name) = &req.name {
        validate_name("Name", name, MAX_TENANT_NAME)?;
    }
    if let Some(Some(d)) = &req.description {
        validate_description(Some(d))?;
    }
    Ok(())
}
