use axum::{Json, extract::State};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::request::AppJson;
use crate::models::auth::{LoginRequest, LoginResponse, MeResponse, validate_login_request};
use crate::services::admin;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/login",
    tag = "Auth",
    operation_id = "adminLogin",
    summary = "Log in as an admin",
    description = "Exchanges a username and password for a bearer token. Super admin tokens carry no tenant; tenant admin tokens are scoped to their tenant.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Wrong username or password (INVALID_CREDENTIALS)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    validate_login_request(&payload)?;

    let model = admin::authenticate(&state.db, &payload.username, &payload.password).await?;
    let token = admin::issue_token(&state.config.auth, &model)?;

    Ok(Json(LoginResponse {
        token,
        admin_id: model.id,
        role: admin::actor_role(model.role),
        tenant_id: model.tenant_id,
    }))
}

#[utoipa::path(
    get,
    path = "/me",
    tag = "Auth",
    operation_id = "getMe",
    summary = "Describe the current credential",
    responses(
        (status = 200, description = "Current actor", body = MeResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(auth_user), fields(subject_id = %auth_user.subject_id))]
pub async fn me(auth_user: AuthUser) -> Json<MeResponse> {
    Json(MeResponse {
        id: auth_user.subject_id,
        role: auth_user.role,
        tenant_id: auth_user.tenant_id,
    })
}
