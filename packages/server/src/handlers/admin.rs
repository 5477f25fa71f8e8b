use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::request::{AppJson, AppPath};
use crate::models::admin::{AdminResponse, ResetPasswordRequest, UpdateAdminRequest};
use crate::models::shared::{validate_password, validate_username};
use crate::services::admin;
use crate::state::AppState;

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Admins",
    operation_id = "updateAdmin",
    summary = "Rename an admin",
    params(("id" = Uuid, Path, description = "Admin ID")),
    request_body = UpdateAdminRequest,
    responses(
        (status = 200, description = "Admin updated", body = AdminResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Admin not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Username taken (USERNAME_TAKEN)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id = %id))]
pub async fn update_admin(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateAdminRequest>,
) -> Result<Json<AdminResponse>, AppError> {
    auth_user.require_super_admin()?;
    validate_username(&payload.username)?;

    let model = admin::rename_admin(&state.db, id, &payload.username).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    put,
    path = "/{id}/password",
    tag = "Admins",
    operation_id = "resetAdminPassword",
    summary = "Set a new password for an admin",
    params(("id" = Uuid, Path, description = "Admin ID")),
    request_body = ResetPasswordRequest,
    responses(
        (status = 204, description = "Password reset"),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Admin not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id = %id))]
pub async fn reset_admin_password(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<ResetPasswordRequest>,
) -> Result<StatusCode, AppError> {
    auth_user.require_super_admin()?;
    validate_password(&payload.password)?;

    admin::reset_password(&state.db, id, &payload.password).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Admins",
    operation_id = "deleteAdmin",
    summary = "Delete an admin",
    description = "Removes an admin account. Super admins cannot delete themselves.",
    params(("id" = Uuid, Path, description = "Admin ID")),
    responses(
        (status = 204, description = "Admin deleted"),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Admin not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Own account (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn delete_admin(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<StatusCode, AppError> {
    auth_user.require_super_admin()?;
    admin::delete_admin(&state.db, auth_user.subject_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
