//! Participant identities, one per (tenant, display name).

use chrono::{Duration, Utc};
use sea_orm::*;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::entity::participant;
use crate::error::AppError;
use crate::extractors::auth::AuthUser;
use crate::services::guard;
use crate::services::tenant::require_active_tenant;
use crate::utils::jwt::{self, ActorRole};

pub const DEFAULT_AVATAR: &str = "😀";
const MAX_NAME_CHARS: usize = 50;
const MAX_AVATAR_CHARS: usize = 64;

/// Profile changes for [`update_profile`]. `None` leaves a field untouched.
#[derive(Debug, Default)]
pub struct ProfileChanges {
    pub display_name: Option<String>,
    pub avatar: Option<String>,
}

/// Trim and validate a display name.
pub fn normalize_display_name(name: &str) -> Result<String, AppError> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > MAX_NAME_CHARS {
        return Err(AppError::Validation(format!(
            "Name must be 1-{MAX_NAME_CHARS} characters"
        )));
    }
    Ok(name.to_string())
}

/// Trim and validate an avatar token, falling back to the default when blank.
pub fn normalize_avatar(avatar: Option<&str>) -> Result<String, AppError> {
    match avatar.map(str::trim) {
        None | Some("") => Ok(DEFAULT_AVATAR.to_string()),
        Some(a) if a.chars().count() > MAX_AVATAR_CHARS => Err(AppError::Validation(format!(
            "Avatar must be at most {MAX_AVATAR_CHARS} characters"
        ))),
        Some(a) => Ok(a.to_string()),
    }
}

/// Whether another live participant of the tenant already uses `name`.
async fn name_taken<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    name: &str,
    exclude: Option<Uuid>,
) -> Result<bool, AppError> {
    let mut select = participant::Entity::find()
        .filter(participant::Column::TenantId.eq(tenant_id))
        .filter(participant::Column::DisplayName.eq(name))
        .filter(participant::Column::DeletedAt.is_null());
    if let Some(id) = exclude {
        select = select.filter(participant::Column::Id.ne(id));
    }
    Ok(select.one(db).await?.is_some())
}

/// Best-effort uniqueness: a transient lookup failure lets the write through.
async fn ensure_name_available<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    name: &str,
    exclude: Option<Uuid>,
) -> Result<(), AppError> {
    match name_taken(db, tenant_id, name, exclude).await {
        Ok(true) => Err(AppError::NicknameTaken),
        Ok(false) => Ok(()),
        Err(e) if e.is_transient() => {
            warn!(
                tenant_id = %tenant_id,
                error = %e,
                "Nickname check failed, proceeding without it"
            );
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Register a new participant and issue its long-lived credential.
pub async fn register<C: ConnectionTrait>(
    db: &C,
    auth: &AuthConfig,
    tenant_id: Uuid,
    name: &str,
    avatar: Option<&str>,
) -> Result<participant::Model, AppError> {
    require_active_tenant(db, tenant_id).await?;
    let display_name = normalize_display_name(name)?;
    let avatar = normalize_avatar(avatar)?;

    ensure_name_available(db, tenant_id, &display_name, None).await?;

    let id = Uuid::now_v7();
    let credential = jwt::sign(
        &auth.jwt_secret,
        id,
        Some(tenant_id),
        ActorRole::Participant,
        Duration::days(auth.participant_token_days),
    )
    .map_err(|e| AppError::Internal(format!("JWT sign error: {e}")))?;

    let now = Utc::now();
    let model = participant::ActiveModel {
        id: Set(id),
        tenant_id: Set(tenant_id),
        display_name: Set(display_name),
        avatar: Set(avatar),
        credential: Set(credential),
        deleted_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;

    info!(participant_id = %model.id, tenant_id = %tenant_id, "Participant registered");
    Ok(model)
}

/// Look up a participant that has not been deleted, returning 404 otherwise.
pub async fn find_participant<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<participant::Model, AppError> {
    participant::Entity::find_by_id(id)
        .filter(participant::Column::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Participant not found".into()))
}

/// The participant a credential belongs to. Deleted participants' credentials stop working.
pub async fn resolve_participant<C: ConnectionTrait>(
    db: &C,
    actor: &AuthUser,
) -> Result<participant::Model, AppError> {
    let (participant_id, tenant_id) = actor.require_participant()?;
    participant::Entity::find_by_id(participant_id)
        .filter(participant::Column::TenantId.eq(tenant_id))
        .filter(participant::Column::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or(AppError::TokenInvalid)
}

/// Load `participant_id` for the participant that owns it; anyone else is `Unauthorized`.
async fn find_own_profile<C: ConnectionTrait>(
    db: &C,
    actor: &AuthUser,
    participant_id: Uuid,
) -> Result<participant::Model, AppError> {
    let model = find_participant(db, participant_id).await?;
    if actor.role != ActorRole::Participant || actor.subject_id != participant_id {
        return Err(AppError::Unauthorized);
    }
    guard::authorize(actor.tenant_id, model.tenant_id)?;
    Ok(model)
}

pub async fn get_profile<C: ConnectionTrait>(
    db: &C,
    actor: &AuthUser,
    participant_id: Uuid,
) -> Result<participant::Model, AppError> {
    find_own_profile(db, actor, participant_id).await
}

/// Apply name and avatar changes in one write. History rows only reference the
/// participant id, so scoreboards pick up the new profile on their next read.
pub async fn update_profile<C: ConnectionTrait>(
    db: &C,
    actor: &AuthUser,
    participant_id: Uuid,
    changes: ProfileChanges,
) -> Result<participant::Model, AppError> {
    let existing = find_own_profile(db, actor, participant_id).await?;
    let tenant_id = existing.tenant_id;

    let mut active: participant::ActiveModel = existing.into();
    if let Some(name) = changes.display_name {
        let name = normalize_display_name(&name)?;
        ensure_name_available(db, tenant_id, &name, Some(participant_id)).await?;
        active.display_name = Set(name);
    }
    if let Some(avatar) = changes.avatar {
        active.avatar = Set(normalize_avatar(Some(&avatar))?);
    }
    active.updated_at = Set(Utc::now());

    Ok(active.update(db).await?)
}

/// Soft delete. Participations and answers are kept; the name becomes free again.
pub async fn delete_participant<C: ConnectionTrait>(
    db: &C,
    actor: &AuthUser,
    participant_id: Uuid,
) -> Result<(), AppError> {
    let existing = find_own_profile(db, actor, participant_id).await?;
    let now = Utc::now();
    let mut active: participant::ActiveModel = existing.into();
    active.deleted_at = Set(Some(now));
    active.updated_at = Set(now);
    active.update(db).await?;
    info!(participant_id = %participant_id, "Participant deleted");
    Ok(())
}
