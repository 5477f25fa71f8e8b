use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;
use uuid::Uuid;

use super::viewer_tenant;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::request::{AppJson, AppPath};
use crate::models::admin::{AdminResponse, CreateAdminRequest, validate_create_admin};
use crate::models::tenant::*;
use crate::services::aggregation::{self, LeaderboardEntry};
use crate::services::{admin, guard, tenant};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/",
    tag = "Tenants",
    operation_id = "createTenant",
    summary = "Create a tenant",
    description = "Creates an active tenant. Super admin only.",
    request_body = CreateTenantRequest,
    responses(
        (status = 201, description = "Tenant created", body = TenantResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(name = %payload.name))]
pub async fn create_tenant(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateTenantRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_super_admin()?;
    validate_create_tenant(&payload)?;

    let model = tenant::create_tenant(&state.db, &payload.name, payload.description).await?;
    Ok((StatusCode::CREATED, Json(TenantResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Tenants",
    operation_id = "listTenants",
    summary = "List tenants",
    description = "Lists all tenants, newest first. Super admin only.",
    params(TenantListQuery),
    responses(
        (status = 200, description = "Tenants", body = Vec<TenantResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_tenants(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<TenantListQuery>,
) -> Result<Json<Vec<TenantResponse>>, AppError> {
    auth_user.require_super_admin()?;
    let tenants = tenant::list_tenants(&state.db, query.status).await?;
    Ok(Json(tenants.into_iter().map(TenantResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Tenants",
    operation_id = "getTenant",
    summary = "Get a tenant",
    description = "Super admins can read any tenant; tenant admins only their own.",
    params(("id" = Uuid, Path, description = "Tenant ID")),
    responses(
        (status = 200, description = "Tenant", body = TenantResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED, CROSS_TENANT_ACCESS)", body = ErrorBody),
        (status = 404, description = "Tenant not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn get_tenant(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<TenantResponse>, AppError> {
    guard::authorize_management(&auth_user, id)?;
    let model = tenant::find_tenant(&state.db, id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Tenants",
    operation_id = "updateTenant",
    summary = "Update a tenant",
    description = "Renames a tenant, edits its description or flips its status. Super admin only.",
    params(("id" = Uuid, Path, description = "Tenant ID")),
    request_body = UpdateTenantRequest,
    responses(
        (status = 200, description = "Tenant updated", body = TenantResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Tenant not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id = %id))]
pub async fn update_tenant(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateTenantRequest>,
) -> Result<Json<TenantResponse>, AppError> {
    auth_user.require_super_admin()?;
    validate_update_tenant(&payload)?;

    let model = tenant::update_tenant(
        &state.db,
        id,
        tenant::TenantChanges {
            name: payload.name,
            description: payload.description,
            status: payload.status,
        },
    )
    .await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Tenants",
    operation_id = "deleteTenant",
    summary = "Deactivate a tenant",
    description = "Soft delete: the tenant becomes inactive, rejects new sessions, registrations and joins, and keeps its history readable. Super admin only.",
    params(("id" = Uuid, Path, description = "Tenant ID")),
    responses(
        (status = 200, description = "Tenant deactivated", body = TenantResponse),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Tenant not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn delete_tenant(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<TenantResponse>, AppError> {
    auth_user.require_super_admin()?;
    let model = tenant::deactivate_tenant(&state.db, id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    post,
    path = "/{id}/admins",
    tag = "Admins",
    operation_id = "createTenantAdmin",
    summary = "Create a tenant admin",
    description = "Creates an admin scoped to the tenant. The tenant must be active and the username globally unique. Super admin only.",
    params(("id" = Uuid, Path, description = "Tenant ID")),
    request_body = CreateAdminRequest,
    responses(
        (status = 201, description = "Admin created", body = AdminResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED, TENANT_INACTIVE)", body = ErrorBody),
        (status = 404, description = "Tenant not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Username taken (USERNAME_TAKEN)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(tenant_id = %id, username = %payload.username))]
pub async fn create_tenant_admin(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<CreateAdminRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_super_admin()?;
    validate_create_admin(&payload)?;

    let model =
        admin::create_admin(&state.db, Some(id), &payload.username, &payload.password).await?;
    Ok((StatusCode::CREATED, Json(AdminResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/{id}/admins",
    tag = "Admins",
    operation_id = "listTenantAdmins",
    summary = "List a tenant's admins",
    params(("id" = Uuid, Path, description = "Tenant ID")),
    responses(
        (status = 200, description = "Admins", body = Vec<AdminResponse>),
        (status = 403, description = "Forbidden (PERMISSION_DENIED, CROSS_TENANT_ACCESS)", body = ErrorBody),
        (status = 404, description = "Tenant not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(tenant_id = %id))]
pub async fn list_tenant_admins(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Vec<AdminResponse>>, AppError> {
    guard::authorize_management(&auth_user, id)?;
    tenant::find_tenant(&state.db, id).await?;
    let admins = admin::list_tenant_admins(&state.db, id).await?;
    Ok(Json(admins.into_iter().map(AdminResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/{id}/leaderboard",
    tag = "Scores",
    operation_id = "getTenantLeaderboard",
    summary = "Cross-session leaderboard",
    description = "Merges every session scoreboard of the tenant by participant, summing points and correct answers. Computed on every request. Available to the tenant's admins and participants.",
    params(("id" = Uuid, Path, description = "Tenant ID")),
    responses(
        (status = 200, description = "Ranked leaderboard", body = Vec<LeaderboardEntry>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (CROSS_TENANT_ACCESS)", body = ErrorBody),
        (status = 404, description = "Tenant not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(tenant_id = %id))]
pub async fn get_tenant_leaderboard(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Vec<LeaderboardEntry>>, AppError> {
    let viewer = viewer_tenant(&state, &auth_user).await?;
    guard::authorize(viewer, id)?;
    tenant::find_tenant(&state.db, id).await?;
    let entries = aggregation::tenant_leaderboard(&state.db, id).await?;
    Ok(Json(entries))
}
