use chrono::{DateTime, Utc};
use common::{ScoreTier, SessionStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::shared::{double_option, validate_description, validate_name};
use crate::entity::{round, session};
use crate::error::AppError;
use crate::services::scoring::AnswerOutcome;
use crate::services::session::NewRound;

const MAX_TITLE: usize = 256;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateSessionRequest {
    #[schema(example = "Friday Night Music Quiz")]
    pub title: String,
    pub description: Option<String>,
    /// Optional; when present it must be the caller's own tenant.
    pub tenant_id: Option<Uuid>,
}

#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct UpdateSessionRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct SessionListQuery {
    pub status: Option<SessionStatus>,
    /// Optional; when present it must be the caller's own tenant.
    pub tenant_id: Option<Uuid>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct AddRoundRequest {
    #[schema(example = "Who recorded this track?")]
    pub prompt: String,
    /// Exactly four answer options.
    #[schema(example = json!(["Queen", "ABBA", "Blondie", "Eurythmics"]))]
    pub options: Vec<String>,
    /// 0-based index into `options`.
    #[schema(example = 1)]
    pub correct_option_index: i32,
    /// Optional audio or image reference shown with the round.
    pub media_url: Option<String>,
}

impl From<AddRoundRequest> for NewRound {
    fn from(req: AddRoundRequest) -> Self {
        Self {
            prompt: req.prompt,
            options: req.options,
            correct_option_index: req.correct_option_index,
            media_url: req.media_url,
        }
    }
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct SubmitAnswerRequest {
    #[schema(example = 1)]
    pub round_number: i32,
    /// 0-based option index.
    #[schema(example = 2)]
    pub selected_option_index: i32,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct RoundResponse {
    pub round_number: i32,
    pub prompt: String,
    pub options: Vec<String>,
    /// Present for admins only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_option_index: Option<i32>,
    pub media_url: Option<String>,
}

impl RoundResponse {
    pub fn for_admin(m: round::Model) -> Self {
        let options = m.option_list();
        Self {
            round_number: m.round_number,
            prompt: m.prompt,
            options,
            correct_option_index: Some(m.correct_option_index),
            media_url: m.media_url,
        }
    }

    pub fn for_participant(m: round::Model) -> Self {
        Self {
            correct_option_index: None,
            ..Self::for_admin(m)
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SessionResponse {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: SessionStatus,
    pub round_count: i32,
    /// The live round, polled by participants.
    pub active_round_number: Option<i32>,
    pub active_round_started_at: Option<DateTime<Utc>>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<session::Model> for SessionResponse {
    fn from(m: session::Model) -> Self {
        Self {
            id: m.id,
            tenant_id: m.tenant_id,
            title: m.title,
            description: m.description,
            status: m.status,
            round_count: m.round_count,
            active_round_number: m.active_round_number,
            active_round_started_at: m.active_round_started_at,
            created_by: m.created_by,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// A session with its rounds.
#[derive(Serialize, utoipa::ToSchema)]
pub struct SessionDetailResponse {
    #[serde(flatten)]
    pub session: SessionResponse,
    pub rounds: Vec<RoundResponse>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AnswerResponse {
    pub answer_id: Uuid,
    pub round_number: i32,
    pub is_correct: bool,
    #[schema(example = 10)]
    pub points_awarded: i32,
    pub tier: ScoreTier,
    /// Session totals after this answer.
    pub total_points: i32,
    pub correct_answers: i32,
}

impl From<AnswerOutcome> for AnswerResponse {
    fn from(o: AnswerOutcome) -> Self {
        Self {
            answer_id: o.answer_id,
            round_number: o.round_number,
            is_correct: o.is_correct,
            points_awarded: o.points_awarded,
            tier: o.tier,
            total_points: o.total_points,
            correct_answers: o.correct_answers,
        }
    }
}

pub fn validate_create_session(req: &CreateSessionRequest) -> Result<(), AppError> {
    validate_name("Title", &req.title, MAX_TITLE)?;
    validate_description(req.description.as_deref())
}

pub fn validate_update_session(req: &UpdateSessionRequest) -> Result<(), AppError> {
    if let Some(title) = &req.title {
        validate_name("Title", title, MAX_TITLE)?;
    }
    if let Some(Some(d)) = &req.description {
        validate_description(Some(d))?;
    }
    Ok(())
}
