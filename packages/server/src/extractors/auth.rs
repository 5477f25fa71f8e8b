use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::AppError;
use crate::services::admin;
use crate::state::AppState;
use crate::utils::jwt::{self, ActorRole};

/// Authenticated actor extracted from the `Authorization: Bearer <token>` header.
///
/// Add this as a handler parameter to require authentication.
/// Role checks happen via the `require_*` helpers in the handler body;
/// tenant checks go through `services::guard`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Admin ID or participant ID, depending on `role`.
    pub subject_id: Uuid,
    /// `None` only for super admins.
    pub tenant_id: Option<Uuid>,
    pub role: ActorRole,
}

impl AuthUser {
    pub fn is_super_admin(&self) -> bool {
        self.role == ActorRole::SuperAdmin
    }

    /// Returns `Ok(())` for super admins, `Err(PermissionDenied)` otherwise.
    pub fn require_super_admin(&self) -> Result<(), AppError> {
        if self.is_super_admin() {
            Ok(())
        } else {
            Err(AppError::PermissionDenied)
        }
    }

    /// Any admin. Yields the admin's tenant, `None` for a super admin.
    pub fn require_admin(&self) -> Result<Option<Uuid>, AppError> {
        match self.role {
            ActorRole::SuperAdmin => Ok(None),
            ActorRole::TenantAdmin => Ok(self.tenant_id),
            ActorRole::Participant => Err(AppError::PermissionDenied),
        }
    }

    /// A tenant admin, yielding its tenant. Super admins have no tenant to act in.
    pub fn require_tenant_admin(&self) -> Result<Uuid, AppError> {
        match (self.role, self.tenant_id) {
            (ActorRole::TenantAdmin, Some(tid)) => Ok(tid),
            (ActorRole::SuperAdmin, _) => Err(AppError::CrossTenantAccess),
            _ => Err(AppError::PermissionDenied),
        }
    }

    /// A participant, yielding `(participant_id, tenant_id)`.
    pub fn require_participant(&self) -> Result<(Uuid, Uuid), AppError> {
        match (self.role, self.tenant_id) {
            (ActorRole::Participant, Some(tid)) => Ok((self.subject_id, tid)),
            _ => Err(AppError::PermissionDenied),
        }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::TokenMissing)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AppError::TokenInvalid)?;

        let claims = jwt::verify(&state.config.auth.jwt_secret, token)
            .map_err(|_| AppError::TokenInvalid)?;

        // Only super admins may lack a tenant.
        if claims.tid.is_none() && claims.role != ActorRole::SuperAdmin {
            return Err(AppError::TokenInvalid);
        }

        // Participants are re-checked by the services that load their profile.
        if claims.role != ActorRole::Participant {
            admin::verify_credential(&state.db, claims.sub, claims.tid, claims.role).await?;
        }

        Ok(AuthUser {
            subject_id: claims.sub,
            tenant_id: claims.tid,
            role: claims.role,
        })
    }
}
