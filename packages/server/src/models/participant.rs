use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request body for participant registration.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct RegisterParticipantRequest {
    /// Tenant to register in.
    pub tenant_id: Uuid,
    /// Display name, trimmed. Unique within the tenant.
    #[schema(example = "Alice")]
    pub name: String,
    /// Avatar token, usually an emoji. Defaults to 😀.
    #[schema(example = "🦊")]
    pub avatar: Option<String>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateParticipantRequest {
    #[schema(example = "Alice B.")]
    pub name: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ParticipantResponse {
    pub id: Uuid,
    pub tenant_id: Uuid,
    #[schema(example = "Alice")]
    pub display_name: String,
    #[schema(example = "🦊")]
    pub avatar: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<crate::entity::participant::Model> for ParticipantResponse {
    fn from(m: crate::entity::participant::Model) -> Self {
        Self {
            id: m.id,
            tenant_id: m.tenant_id,
            display_name: m.display_name,
            avatar: m.avatar,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Successful registration: the profile plus the credential to keep.
#[derive(Serialize, utoipa::ToSchema)]
pub struct RegisterParticipantResponse {
    pub participant_id: Uuid,
    /// Long-lived bearer credential for all participant calls.
    pub credential: String,
    pub profile: ParticipantResponse,
}

impl From<crate::entity::participant::Model> for RegisterParticipantResponse {
    fn from(m: crate::entity::participant::Model) -> Self {
        Self {
            participant_id: m.id,
            credential: m.credential.clone(),
            profile: m.into(),
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ParticipationResponse {
    pub id: Uuid,
    pub participant_id: Uuid,
    pub session_id: Uuid,
    pub tenant_id: Uuid,
    pub joined_at: DateTime<Utc>,
    pub total_points: i32,
    pub correct_answers: i32,
}

impl From<crate::entity::participation::Model> for ParticipationResponse {
    fn from(m: crate::entity::participation::Model) -> Self {
        Self {
            id: m.id,
            participant_id: m.participant_id,
            session_id: m.session_id,
            tenant_id: m.tenant_id,
            joined_at: m.joined_at,
            total_points: m.total_points,
            correct_answers: m.correct_answers,
        }
    }
}
