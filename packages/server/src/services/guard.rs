//! Tenant isolation guard.
//!
//! Every read or write of tenant-owned data passes through [`authorize`]
//! with the actor's tenant (from the verified credential) and the tenant
//! that owns the record. Super admins carry no tenant and are therefore
//! denied here; their bypass is limited to tenant and admin management,
//! which use [`authorize_management`].

use tracing::warn;
use uuid::Uuid;

use crate::error::AppError;
use crate::extractors::auth::AuthUser;

/// Allow only when the actor belongs to the tenant that owns the resource.
pub fn authorize(actor_tenant: Option<Uuid>, resource_tenant: Uuid) -> Result<(), AppError> {
    match actor_tenant {
        Some(tid) if tid == resource_tenant => Ok(()),
        Some(tid) => {
            warn!(
                actor_tenant = %tid,
                resource_tenant = %resource_tenant,
                "Cross-tenant access denied"
            );
            Err(AppError::CrossTenantAccess)
        }
        None => {
            warn!(
                resource_tenant = %resource_tenant,
                "Tenant-less actor denied access to tenant data"
            );
            Err(AppError::CrossTenantAccess)
        }
    }
}

/// Tenant and admin management: super admins pass, tenant admins only for their own tenant.
pub fn authorize_management(actor: &AuthUser, tenant_id: Uuid) -> Result<(), AppError> {
    if actor.is_super_admin() {
        return Ok(());
    }
    actor.require_admin()?;
    authorize(actor.tenant_id, tenant_id)
}
