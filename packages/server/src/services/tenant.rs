use chrono::Utc;
use common::TenantStatus;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::info;
use uuid::Uuid;

use crate::entity::tenant;
use crate::error::AppError;

/// Field changes for [`update_tenant`]. `None` leaves a field untouched;
/// `description: Some(None)` clears it.
#[derive(Debug, Default)]
pub struct TenantChanges {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<TenantStatus>,
}

/// Look up a tenant by ID, returning 404 if not found.
pub async fn find_tenant<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<tenant::Model, AppError> {
    tenant::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Tenant not found".into()))
}

/// Like [`find_tenant`] but fails `TenantInactive` for soft-deleted tenants.
/// Gate for anything that creates new sessions, participants or participations.
pub async fn require_active_tenant<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<tenant::Model, AppError> {
    let model = find_tenant(db, id).await?;
    if !model.status.is_active() {
        return Err(AppError::TenantInactive);
    }
    Ok(model)
}

pub async fn create_tenant<C: ConnectionTrait>(
    db: &C,
    name: &str,
    description: Option<String>,
) -> Result<tenant::Model, AppError> {
    let now = Utc::now();
    let model = tenant::ActiveModel {
        id: Set(Uuid::now_v7()),
        name: Set(name.trim().to_string()),
        description: Set(description),
        status: Set(TenantStatus::Active),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;

    info!(tenant_id = %model.id, name = %model.name, "Tenant created");
    Ok(model)
}

/// All tenants, newest first, optionally filtered by status.
pub async fn list_tenants<C: ConnectionTrait>(
    db: &C,
    status: Option<TenantStatus>,
) -> Result<Vec<tenant::Model>, AppError> {
    let mut select = tenant::Entity::find();
    if let Some(status) = status {
        select = select.filter(tenant::Column::Status.eq(status));
    }
    Ok(select
        .order_by_desc(tenant::Column::CreatedAt)
        .all(db)
        .await?)
}

pub async fn update_tenant<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    changes: TenantChanges,
) -> Result<tenant::Model, AppError> {
    let existing = find_tenant(db, id).await?;

    let mut active: tenant::ActiveModel = existing.into();
    if let Some(name) = changes.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(description) = changes.description {
        active.description = Set(description);
    }
    if let Some(status) = changes.status {
        active.status = Set(status);
    }
    active.updated_at = Set(Utc::now());

    Ok(active.update(db).await?)
}

/// Soft delete: the tenant turns inactive and keeps all of its history readable.
pub async fn deactivate_tenant<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<tenant::Model, AppError> {
    let model = update_tenant(
        db,
        id,
        TenantChanges {
            status: Some(TenantStatus::Inactive),
            ..Default::default()
        },
    )
    .await?;
    info!(tenant_id = %id, "Tenant deactivated");
    Ok(model)
}
