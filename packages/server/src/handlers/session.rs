use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::SessionTransition;
use tracing::instrument;
use uuid::Uuid;

use super::viewer_tenant;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::request::{AppJson, AppPath};
use crate::models::session::*;
use crate::services::{guard, session};
use crate::state::AppState;
use crate::utils::jwt::ActorRole;

#[utoipa::path(
    post,
    path = "/",
    tag = "Sessions",
    operation_id = "createSession",
    summary = "Create a quiz session",
    description = "Creates a draft session in the caller's tenant. Tenant admin only; a `tenant_id` other than the caller's own is rejected.",
    request_body = CreateSessionRequest,
    responses(
        (status = 201, description = "Session created", body = SessionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED, CROSS_TENANT_ACCESS, TENANT_INACTIVE)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(title = %payload.title))]
pub async fn create_session(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateSessionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let tenant_id = auth_user.require_tenant_admin()?;
    if let Some(requested) = payload.tenant_id {
        guard::authorize(Some(tenant_id), requested)?;
    }
    validate_create_session(&payload)?;

    let model = session::create_session(
        &state.db,
        tenant_id,
        auth_user.subject_id,
        &payload.title,
        payload.description,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(SessionResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Sessions",
    operation_id = "listSessions",
    summary = "List the tenant's sessions",
    description = "Lists sessions of the caller's tenant, newest first. Open to the tenant's admins and participants.",
    params(SessionListQuery),
    responses(
        (status = 200, description = "Sessions", body = Vec<SessionResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (CROSS_TENANT_ACCESS)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_sessions(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<SessionListQuery>,
) -> Result<Json<Vec<SessionResponse>>, AppError> {
    let viewer = viewer_tenant(&state, &auth_user).await?;
    let tenant_id = query.tenant_id.or(viewer).ok_or(AppError::CrossTenantAccess)?;
    guard::authorize(viewer, tenant_id)?;

    let sessions = session::list_sessions(&state.db, tenant_id, query.status).await?;
    Ok(Json(sessions.into_iter().map(SessionResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Sessions",
    operation_id = "getSession",
    summary = "Get a session with its rounds",
    description = "Participants poll this to see the live round. They receive rounds without the correct option.",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Session", body = SessionDetailResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (CROSS_TENANT_ACCESS)", body = ErrorBody),
        (status = 404, description = "Session not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn get_session(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<SessionDetailResponse>, AppError> {
    let viewer = viewer_tenant(&state, &auth_user).await?;
    let model = session::find_session_scoped(&state.db, viewer, id).await?;
    let rounds = session::list_rounds(&state.db, model.id).await?;

    let view = if auth_user.role == ActorRole::Participant {
        RoundResponse::for_participant
    } else {
        RoundResponse::for_admin
    };
    Ok(Json(SessionDetailResponse {
        session: model.into(),
        rounds: rounds.into_iter().map(view).collect(),
    }))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Sessions",
    operation_id = "updateSession",
    summary = "Edit a session's title or description",
    params(("id" = Uuid, Path, description = "Session ID")),
    request_body = UpdateSessionRequest,
    responses(
        (status = 200, description = "Session updated", body = SessionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED, CROSS_TENANT_ACCESS)", body = ErrorBody),
        (status = 404, description = "Session not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id = %id))]
pub async fn update_session(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateSessionRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let tenant_id = auth_user.require_tenant_admin()?;
    validate_update_session(&payload)?;

    let existing = session::find_session_scoped(&state.db, Some(tenant_id), id).await?;
    let model = session::update_session(
        &state.db,
        existing,
        session::SessionChanges {
            title: payload.title,
            description: payload.description,
        },
    )
    .await?;
    Ok(Json(model.into()))
}

async fn apply_transition(
    auth_user: &AuthUser,
    state: &AppState,
    id: Uuid,
    transition: SessionTransition,
) -> Result<Json<SessionResponse>, AppError> {
    let tenant_id = auth_user.require_tenant_admin()?;
    let existing = session::find_session_scoped(&state.db, Some(tenant_id), id).await?;
    let model = session::transition(&state.db, existing.id, transition).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    post,
    path = "/{id}/activate",
    tag = "Sessions",
    operation_id = "activateSession",
    summary = "Activate a draft session",
    description = "draft → active. Activating an active session is a no-op.",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Session active", body = SessionResponse),
        (status = 403, description = "Forbidden (PERMISSION_DENIED, CROSS_TENANT_ACCESS)", body = ErrorBody),
        (status = 404, description = "Session not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Invalid transition (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn activate_session(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    apply_transition(&auth_user, &state, id, SessionTransition::Activate).await
}

#[utoipa::path(
    post,
    path = "/{id}/deactivate",
    tag = "Sessions",
    operation_id = "deactivateSession",
    summary = "Return an active session to draft",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Session in draft", body = SessionResponse),
        (status = 403, description = "Forbidden (PERMISSION_DENIED, CROSS_TENANT_ACCESS)", body = ErrorBody),
        (status = 404, description = "Session not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Invalid transition (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn deactivate_session(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    apply_transition(&auth_user, &state, id, SessionTransition::Deactivate).await
}

#[utoipa::path(
    post,
    path = "/{id}/complete",
    tag = "Sessions",
    operation_id = "completeSession",
    summary = "Complete an active session",
    description = "active → completed, which is terminal. Completing a completed session is a no-op.",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Session completed", body = SessionResponse),
        (status = 403, description = "Forbidden (PERMISSION_DENIED, CROSS_TENANT_ACCESS)", body = ErrorBody),
        (status = 404, description = "Session not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Invalid transition (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn complete_session(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    apply_transition(&auth_user, &state, id, SessionTransition::Complete).await
}

#[utoipa::path(
    post,
    path = "/{id}/rounds",
    tag = "Rounds",
    operation_id = "addRound",
    summary = "Append a round",
    description = "Appends a four-option round with the next round number. At most 30 rounds per session; completed sessions take no more rounds.",
    params(("id" = Uuid, Path, description = "Session ID")),
    request_body = AddRoundRequest,
    responses(
        (status = 201, description = "Round added", body = RoundResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED, CROSS_TENANT_ACCESS)", body = ErrorBody),
        (status = 404, description = "Session not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Cap reached or session completed (MAX_ROUNDS_REACHED, CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id = %id))]
pub async fn add_round(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<AddRoundRequest>,
) -> Result<impl IntoResponse, AppError> {
    let tenant_id = auth_user.require_tenant_admin()?;
    let existing = session::find_session_scoped(&state.db, Some(tenant_id), id).await?;
    let model = session::add_round(&state.db, existing.id, payload.into()).await?;
    Ok((StatusCode::CREATED, Json(RoundResponse::for_admin(model))))
}

#[utoipa::path(
    get,
    path = "/{id}/rounds",
    tag = "Rounds",
    operation_id = "listRounds",
    summary = "List a session's rounds",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Rounds in order", body = Vec<RoundResponse>),
        (status = 403, description = "Forbidden (PERMISSION_DENIED, CROSS_TENANT_ACCESS)", body = ErrorBody),
        (status = 404, description = "Session not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn list_rounds(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Vec<RoundResponse>>, AppError> {
    let tenant_id = auth_user.require_tenant_admin()?;
    let existing = session::find_session_scoped(&state.db, Some(tenant_id), id).await?;
    let rounds = session::list_rounds(&state.db, existing.id).await?;
    Ok(Json(rounds.into_iter().map(RoundResponse::for_admin).collect()))
}

#[utoipa::path(
    post,
    path = "/{id}/rounds/{round_number}/start",
    tag = "Rounds",
    operation_id = "startRound",
    summary = "Start a round",
    description = "Makes the round live and stamps its start time. The session must be active.",
    params(
        ("id" = Uuid, Path, description = "Session ID"),
        ("round_number" = i32, Path, description = "Round number"),
    ),
    responses(
        (status = 200, description = "Round started", body = SessionResponse),
        (status = 403, description = "Forbidden (PERMISSION_DENIED, CROSS_TENANT_ACCESS)", body = ErrorBody),
        (status = 404, description = "Session or round not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Session not active (SESSION_NOT_ACTIVE)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id, round_number = round_number))]
pub async fn start_round(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath((id, round_number)): AppPath<(Uuid, i32)>,
) -> Result<Json<SessionResponse>, AppError> {
    let tenant_id = auth_user.require_tenant_admin()?;
    let existing = session::find_session_scoped(&state.db, Some(tenant_id), id).await?;
    let model = session::start_round(&state.db, existing.id, round_number).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}/rounds/{round_number}",
    tag = "Rounds",
    operation_id = "deleteRound",
    summary = "Delete a round",
    description = "Removes a round nobody has answered yet. The live round and rounds of a completed session cannot be removed. Other rounds keep their numbers.",
    params(
        ("id" = Uuid, Path, description = "Session ID"),
        ("round_number" = i32, Path, description = "Round number"),
    ),
    responses(
        (status = 204, description = "Round deleted"),
        (status = 403, description = "Forbidden (PERMISSION_DENIED, CROSS_TENANT_ACCESS)", body = ErrorBody),
        (status = 404, description = "Session or round not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Round live or answered, or session completed (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id, round_number = round_number))]
pub async fn delete_round(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath((id, round_number)): AppPath<(Uuid, i32)>,
) -> Result<StatusCode, AppError> {
    let tenant_id = auth_user.require_tenant_admin()?;
    let existing = session::find_session_scoped(&state.db, Some(tenant_id), id).await?;
    session::delete_round(&state.db, existing.id, round_number).await?;
    Ok(StatusCode::NO_CONTENT)
}
