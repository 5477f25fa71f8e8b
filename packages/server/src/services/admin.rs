use chrono::{Duration, Utc};
use common::AdminRole;
use sea_orm::*;
use tracing::info;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::entity::admin;
use crate::error::AppError;
use crate::services::tenant::require_active_tenant;
use crate::utils::jwt::{self, ActorRole};
use crate::utils::hash;

pub async fn find_admin<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<admin::Model, AppError> {
    admin::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Admin not found".into()))
}

/// Create an admin account. Tenant admins need an existing, active tenant;
/// super admins have none. Usernames are unique across all tenants.
pub async fn create_admin<C: ConnectionTrait>(
    db: &C,
    tenant_id: Option<Uuid>,
    username: &str,
    password: &str,
) -> Result<admin::Model, AppError> {
    let role = match tenant_id {
        Some(tid) => {
            require_active_tenant(db, tid).await?;
            AdminRole::Tenant
        }
        None => AdminRole::Super,
    };

    let password_hash = hash::hash_password(password)?;
    let now = Utc::now();
    let new_admin = admin::ActiveModel {
        id: Set(Uuid::now_v7()),
        tenant_id: Set(tenant_id),
        username: Set(username.trim().to_string()),
        password_hash: Set(password_hash),
        role: Set(role),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let model = new_admin.insert(db).await.map_err(map_username_conflict)?;
    info!(admin_id = %model.id, role = %model.role, "Admin created");
    Ok(model)
}

/// Verify a username/password pair. Unknown users and wrong passwords are indistinguishable.
pub async fn authenticate<C: ConnectionTrait>(
    db: &C,
    username: &str,
    password: &str,
) -> Result<admin::Model, AppError> {
    let model = admin::Entity::find()
        .filter(admin::Column::Username.eq(username.trim()))
        .one(db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !hash::verify_password(password, &model.password_hash)? {
        return Err(AppError::InvalidCredentials);
    }
    Ok(model)
}

pub fn actor_role(role: AdminRole) -> ActorRole {
    match role {
        AdminRole::Super => ActorRole::SuperAdmin,
        AdminRole::Tenant => ActorRole::TenantAdmin,
    }
}

/// An admin credential stays valid only while its account exists with the
/// tenant and role it was issued for.
pub async fn verify_credential<C: ConnectionTrait>(
    db: &C,
    admin_id: Uuid,
    tenant_id: Option<Uuid>,
    role: ActorRole,
) -> Result<(), AppError> {
    let model = admin::Entity::find_by_id(admin_id)
        .one(db)
        .await?
        .ok_or(AppError::TokenInvalid)?;
    if model.tenant_id != tenant_id || actor_role(model.role) != role {
        return Err(AppError::TokenInvalid);
    }
    Ok(())
}

/// Sign an admin bearer token carrying the admin's tenant and role.
pub fn issue_token(auth: &AuthConfig, model: &admin::Model) -> Result<String, AppError> {
    jwt::sign(
        &auth.jwt_secret,
        model.id,
        model.tenant_id,
        actor_role(model.role),
        Duration::hours(auth.admin_token_hours),
    )
    .map_err(|e| AppError::Internal(format!("JWT sign error: {e}")))
}

pub async fn list_tenant_admins<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
) -> Result<Vec<admin::Model>, AppError> {
    Ok(admin::Entity::find()
        .filter(admin::Column::TenantId.eq(tenant_id))
        .order_by_asc(admin::Column::Username)
        .all(db)
        .await?)
}

pub async fn rename_admin<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    username: &str,
) -> Result<admin::Model, AppError> {
    let existing = find_admin(db, id).await?;
    let mut active: admin::ActiveModel = existing.into();
    active.username = Set(username.trim().to_string());
    active.updated_at = Set(Utc::now());
    active.update(db).await.map_err(map_username_conflict)
}

pub async fn reset_password<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    password: &str,
) -> Result<(), AppError> {
    let existing = find_admin(db, id).await?;
    let mut active: admin::ActiveModel = existing.into();
    active.password_hash = Set(hash::hash_password(password)?);
    active.updated_at = Set(Utc::now());
    active.update(db).await?;
    info!(admin_id = %id, "Admin password reset");
    Ok(())
}

/// Hard delete. An admin cannot remove its own account.
pub async fn delete_admin<C: ConnectionTrait>(
    db: &C,
    actor_id: Uuid,
    id: Uuid,
) -> Result<(), AppError> {
    if actor_id == id {
        return Err(AppError::Conflict("Cannot delete your own account".into()));
    }
    let result = admin::Entity::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Admin not found".into()));
    }
    info!(admin_id = %id, "Admin deleted");
    Ok(())
}

fn map_username_conflict(e: DbErr) -> AppError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            tracing::debug!("Username unique constraint caught on write");
            AppError::UsernameTaken
        }
        _ => AppError::from(e),
    }
}
