use chrono::Utc;
use common::AdminRole;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::BootstrapConfig;
use crate::entity::admin;
use crate::error::AppError;
use crate::utils::hash;

/// Create the configured super admin if its username is not taken yet.
/// Does nothing when the bootstrap credentials are not configured.
pub async fn ensure_super_admin(
    db: &DatabaseConnection,
    bootstrap: &BootstrapConfig,
) -> Result<(), AppError> {
    let (Some(username), Some(password)) = (
        bootstrap.super_admin_username.as_deref(),
        bootstrap.super_admin_password.as_deref(),
    ) else {
        warn!("No bootstrap super admin configured");
        return Ok(());
    };

    let now = Utc::now();
    let model = admin::ActiveModel {
        id: Set(Uuid::now_v7()),
        tenant_id: Set(None),
        username: Set(username.trim().to_string()),
        password_hash: Set(hash::hash_password(password)?),
        role: Set(AdminRole::Super),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let result = admin::Entity::insert(model)
        .on_conflict(
            OnConflict::column(admin::Column::Username)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await;

    match result {
        Ok(0) | Err(DbErr::RecordNotInserted) => {}
        Ok(_) => info!(username = %username.trim(), "Seeded super admin"),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
