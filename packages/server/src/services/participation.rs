use chrono::Utc;
use sea_orm::*;
use tracing::{debug, info};
use uuid::Uuid;

use crate::entity::{participant, participation};
use crate::error::AppError;
use crate::services::session::find_session_scoped;
use crate::services::tenant::require_active_tenant;

/// Result of [`join`]. Joining twice is not an error; `created` tells the two apart.
#[derive(Debug, Clone)]
pub struct JoinOutcome {
    pub participation: participation::Model,
    pub created: bool,
}

pub async fn find_participation<C: ConnectionTrait>(
    db: &C,
    participant_id: Uuid,
    session_id: Uuid,
) -> Result<Option<participation::Model>, AppError> {
    Ok(participation::Entity::find()
        .filter(participation::Column::ParticipantId.eq(participant_id))
        .filter(participation::Column::SessionId.eq(session_id))
        .one(db)
        .await?)
}

/// Bind a participant to a session, idempotently.
///
/// The insert is the uniqueness check: the `(participant_id, session_id)` unique
/// index rejects a second row, and the loser reads back the winner's record.
/// Concurrent callers therefore all observe the same participation.
pub async fn join<C: ConnectionTrait>(
    db: &C,
    participant: &participant::Model,
    session_id: Uuid,
) -> Result<JoinOutcome, AppError> {
    let session = find_session_scoped(db, Some(participant.tenant_id), session_id).await?;

    if let Some(existing) = find_participation(db, participant.id, session.id).await? {
        debug!(participation_id = %existing.id, "Already joined");
        return Ok(JoinOutcome {
            participation: existing,
            created: false,
        });
    }

    require_active_tenant(db, session.tenant_id).await?;

    let new_participation = participation::ActiveModel {
        id: Set(Uuid::now_v7()),
        participant_id: Set(participant.id),
        session_id: Set(session.id),
        tenant_id: Set(session.tenant_id),
        joined_at: Set(Utc::now()),
        total_points: Set(0),
        correct_answers: Set(0),
    };

    match new_participation.insert(db).await {
        Ok(model) => {
            info!(
                participation_id = %model.id,
                participant_id = %participant.id,
                session_id = %session.id,
                "Participant joined session"
            );
            Ok(JoinOutcome {
                participation: model,
                created: true,
            })
        }
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            debug!("Concurrent join caught by unique constraint, reading back");
            let existing = find_participation(db, participant.id, session.id)
                .await?
                .ok_or_else(|| AppError::Internal("participation vanished after conflict".into()))?;
            Ok(JoinOutcome {
                participation: existing,
                created: false,
            })
        }
        Err(e) => Err(e.into()),
    }
}

/// Every participation of one participant, most recent first.
pub async fn list_for_participant<C: ConnectionTrait>(
    db: &C,
    participant: &participant::Model,
) -> Result<Vec<participation::Model>, AppError> {
    Ok(participation::Entity::find()
        .filter(participation::Column::TenantId.eq(participant.tenant_id))
        .filter(participation::Column::ParticipantId.eq(participant.id))
        .order_by_desc(participation::Column::JoinedAt)
        .all(db)
        .await?)
}
