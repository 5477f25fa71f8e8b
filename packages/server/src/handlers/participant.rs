use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::request::{AppJson, AppPath};
use crate::models::participant::*;
use crate::services::{identity, participation};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/register",
    tag = "Participants",
    operation_id = "registerParticipant",
    summary = "Register a participant",
    description = "Creates a tenant-scoped participant and returns its long-lived credential. The trimmed name must not be used by another participant of the same tenant.",
    request_body = RegisterParticipantRequest,
    responses(
        (status = 201, description = "Participant registered", body = RegisterParticipantResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Tenant inactive (TENANT_INACTIVE)", body = ErrorBody),
        (status = 404, description = "Tenant not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Name in use (NICKNAME_TAKEN)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(tenant_id = %payload.tenant_id))]
pub async fn register_participant(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterParticipantRequest>,
) -> Result<impl IntoResponse, AppError> {
    let model = identity::register(
        &state.db,
        &state.config.auth,
        payload.tenant_id,
        &payload.name,
        payload.avatar.as_deref(),
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterParticipantResponse::from(model)),
    ))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Participants",
    operation_id = "getParticipant",
    summary = "Get a participant profile",
    description = "Only the participant named by the credential may read its profile.",
    params(("id" = Uuid, Path, description = "Participant ID")),
    responses(
        (status = 200, description = "Profile", body = ParticipantResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, UNAUTHORIZED)", body = ErrorBody),
        (status = 404, description = "Participant not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn get_participant(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ParticipantResponse>, AppError> {
    let model = identity::get_profile(&state.db, &auth_user, id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Participants",
    operation_id = "updateParticipant",
    summary = "Edit a participant profile",
    description = "Changes name and/or avatar. Scoreboards show the new profile on their next read.",
    params(("id" = Uuid, Path, description = "Participant ID")),
    request_body = UpdateParticipantRequest,
    responses(
        (status = 200, description = "Profile updated", body = ParticipantResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, UNAUTHORIZED)", body = ErrorBody),
        (status = 404, description = "Participant not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Name in use (NICKNAME_TAKEN)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id = %id))]
pub async fn update_participant(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateParticipantRequest>,
) -> Result<Json<ParticipantResponse>, AppError> {
    let model = identity::update_profile(
        &state.db,
        &auth_user,
        id,
        identity::ProfileChanges {
            display_name: payload.name,
            avatar: payload.avatar,
        },
    )
    .await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Participants",
    operation_id = "deleteParticipant",
    summary = "Delete a participant",
    description = "Soft delete by the participant itself. The credential stops working and the participant disappears from scoreboards; history rows are kept.",
    params(("id" = Uuid, Path, description = "Participant ID")),
    responses(
        (status = 204, description = "Participant deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, UNAUTHORIZED)", body = ErrorBody),
        (status = 404, description = "Participant not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn delete_participant(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<StatusCode, AppError> {
    identity::delete_participant(&state.db, &auth_user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/{id}/participations",
    tag = "Participants",
    operation_id = "listMyParticipations",
    summary = "List a participant's session history",
    params(("id" = Uuid, Path, description = "Participant ID")),
    responses(
        (status = 200, description = "Participations, most recent first", body = Vec<ParticipationResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, UNAUTHORIZED)", body = ErrorBody),
        (status = 404, description = "Participant not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn list_my_participations(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Vec<ParticipationResponse>>, AppError> {
    let me = identity::get_profile(&state.db, &auth_user, id).await?;
    let rows = participation::list_for_participant(&state.db, &me).await?;
    Ok(Json(rows.into_iter().map(ParticipationResponse::from).collect()))
}
