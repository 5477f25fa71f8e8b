use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;
use uuid::Uuid;

use super::viewer_tenant;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::request::{AppJson, AppPath};
use crate::models::participant::ParticipationResponse;
use crate::models::session::{AnswerResponse, SubmitAnswerRequest};
use crate::services::aggregation::{self, ScoreboardEntry};
use crate::services::scoring::{self, Submission};
use crate::services::{identity, participation, session};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/{id}/join",
    tag = "Play",
    operation_id = "joinSession",
    summary = "Join a session",
    description = "Idempotent: the first call creates the participation (201), later calls return the same record (200). Concurrent calls converge on one record.",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 201, description = "Joined", body = ParticipationResponse),
        (status = 200, description = "Already joined", body = ParticipationResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED, CROSS_TENANT_ACCESS, TENANT_INACTIVE)", body = ErrorBody),
        (status = 404, description = "Session not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(session_id = %id))]
pub async fn join_session(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let me = identity::resolve_participant(&state.db, &auth_user).await?;
    let outcome = participation::join(&state.db, &me, id).await?;

    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(ParticipationResponse::from(outcome.participation))))
}

#[utoipa::path(
    post,
    path = "/{id}/answers",
    tag = "Play",
    operation_id = "submitAnswer",
    summary = "Answer the live round",
    description = "Scores the answer by how quickly it arrived after the round started and adds the points to the participation. A second answer for the same round is rejected with DUPLICATE_ANSWER, which callers may treat as already recorded.",
    params(("id" = Uuid, Path, description = "Session ID")),
    request_body = SubmitAnswerRequest,
    responses(
        (status = 201, description = "Answer recorded", body = AnswerResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED, CROSS_TENANT_ACCESS)", body = ErrorBody),
        (status = 404, description = "Session not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Rejected (NOT_JOINED, SESSION_NOT_ACTIVE, ROUND_NOT_STARTED, DUPLICATE_ANSWER)", body = ErrorBody),
        (status = 503, description = "Storage unavailable after retries (STORAGE_UNAVAILABLE)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(session_id = %id, round_number = payload.round_number))]
pub async fn submit_answer(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<SubmitAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let me = identity::resolve_participant(&state.db, &auth_user).await?;
    let submission = Submission {
        session_id: id,
        round_number: payload.round_number,
        selected_option_index: payload.selected_option_index,
        elapsed_seconds: None,
    };

    let outcome = scoring::submit_answer(
        &state.db,
        &state.config.scoring.policy,
        &state.config.scoring.retry,
        &me,
        &submission,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(AnswerResponse::from(outcome))))
}

#[utoipa::path(
    get,
    path = "/{id}/scoreboard",
    tag = "Scores",
    operation_id = "getSessionScoreboard",
    summary = "Session scoreboard",
    description = "Participations ranked by points, then correct answers, then join time, with current names and avatars. Computed on every request.",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Ranked scoreboard", body = Vec<ScoreboardEntry>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (CROSS_TENANT_ACCESS)", body = ErrorBody),
        (status = 404, description = "Session not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(session_id = %id))]
pub async fn get_session_scoreboard(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Vec<ScoreboardEntry>>, AppError> {
    let viewer = viewer_tenant(&state, &auth_user).await?;
    let model = session::find_session_scoped(&state.db, viewer, id).await?;
    let entries = aggregation::session_scoreboard(&state.db, &model).await?;
    Ok(Json(entries))
}
