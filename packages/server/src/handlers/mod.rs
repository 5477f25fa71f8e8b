pub mod admin;
pub mod auth;
pub mod participant;
pub mod play;
pub mod session;
pub mod tenant;

use uuid::Uuid;

use crate::error::AppError;
use crate::extractors::auth::AuthUser;
use crate::services::identity;
use crate::state::AppState;
use crate::utils::jwt::ActorRole;

/// Tenant whose data the caller may read. Participants are re-checked
/// against the directory so a deleted participant's credential stops working.
pub(crate) async fn viewer_tenant(
    state: &AppState,
    auth_user: &AuthUser,
) -> Result<Option<Uuid>, AppError> {
    match auth_user.role {
        ActorRole::Participant => {
            let me = identity::resolve_participant(&state.db, auth_user).await?;
            Ok(Some(me.tenant_id))
        }
        ActorRole::TenantAdmin | ActorRole::SuperAdmin => Ok(auth_user.tenant_id),
    }
}
