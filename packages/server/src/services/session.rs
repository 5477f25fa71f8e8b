//! Quiz sessions, their rounds and the draft/active/completed state machine.

use chrono::{DateTime, Utc};
use common::{SessionStatus, SessionTransition, TransitionOutcome};
use sea_orm::prelude::Expr;
use sea_orm::*;
use tracing::{debug, info};
use uuid::Uuid;

use crate::entity::{answer, round, session};
use crate::error::AppError;
use crate::services::guard;
use crate::services::tenant::require_active_tenant;

/// Rounds a session may hold.
pub const MAX_ROUNDS: i32 = 30;
/// Options every round offers.
pub const OPTION_COUNT: usize = 4;

/// A round to append to a session.
#[derive(Debug, Clone)]
pub struct NewRound {
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_option_index: i32,
    pub media_url: Option<String>,
}

impl NewRound {
    pub fn validate(&self) -> Result<(), AppError> {
        let prompt = self.prompt.trim();
        if prompt.is_empty() || prompt.chars().count() > 1000 {
            return Err(AppError::Validation(
                "Prompt must be 1-1000 characters".into(),
            ));
        }
        if self.options.len() != OPTION_COUNT {
            return Err(AppError::Validation(format!(
                "A round needs exactly {OPTION_COUNT} options"
            )));
        }
        if self.options.iter().any(|o| o.trim().is_empty()) {
            return Err(AppError::Validation("Options must not be empty".into()));
        }
        if !(0..OPTION_COUNT as i32).contains(&self.correct_option_index) {
            return Err(AppError::Validation(format!(
                "correct_option_index must be between 0 and {}",
                OPTION_COUNT - 1
            )));
        }
        Ok(())
    }
}

/// Field changes for [`update_session`]. `description: Some(None)` clears it.
#[derive(Debug, Default)]
pub struct SessionChanges {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
}

/// Look up a session within the actor's tenant.
///
/// The lookup is keyed by tenant. On a miss, a session owned by another
/// tenant yields `CrossTenantAccess`; one that does not exist at all is 404.
pub async fn find_session_scoped<C: ConnectionTrait>(
    db: &C,
    actor_tenant: Option<Uuid>,
    id: Uuid,
) -> Result<session::Model, AppError> {
    if let Some(tid) = actor_tenant
        && let Some(model) = session::Entity::find_by_id(id)
            .filter(session::Column::TenantId.eq(tid))
            .one(db)
            .await?
    {
        return Ok(model);
    }

    let owner: Option<Uuid> = session::Entity::find_by_id(id)
        .select_only()
        .column(session::Column::TenantId)
        .into_tuple()
        .one(db)
        .await?;

    match owner {
        Some(owner) => {
            guard::authorize(actor_tenant, owner)?;
            // Owner matched after all: the scoped read raced a concurrent write.
            Err(AppError::NotFound("Session not found".into()))
        }
        None => Err(AppError::NotFound("Session not found".into())),
    }
}

async fn reload<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<session::Model, AppError> {
    session::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Session not found".into()))
}

/// New sessions start in `draft` in the given tenant, which must be active.
pub async fn create_session<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    created_by: Uuid,
    title: &str,
    description: Option<String>,
) -> Result<session::Model, AppError> {
    require_active_tenant(db, tenant_id).await?;

    let now = Utc::now();
    let model = session::ActiveModel {
        id: Set(Uuid::now_v7()),
        tenant_id: Set(tenant_id),
        title: Set(title.trim().to_string()),
        description: Set(description),
        status: Set(SessionStatus::Draft),
        round_count: Set(0),
        active_round_number: Set(None),
        active_round_started_at: Set(None),
        created_by: Set(created_by),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;

    info!(session_id = %model.id, tenant_id = %tenant_id, "Session created");
    Ok(model)
}

/// Sessions of one tenant, newest first.
pub async fn list_sessions<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    status: Option<SessionStatus>,
) -> Result<Vec<session::Model>, AppError> {
    let mut select = session::Entity::find().filter(session::Column::TenantId.eq(tenant_id));
    if let Some(status) = status {
        select = select.filter(session::Column::Status.eq(status));
    }
    Ok(select
        .order_by_desc(session::Column::CreatedAt)
        .all(db)
        .await?)
}

pub async fn update_session<C: ConnectionTrait>(
    db: &C,
    existing: session::Model,
    changes: SessionChanges,
) -> Result<session::Model, AppError> {
    let mut active: session::ActiveModel = existing.into();
    if let Some(title) = changes.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(description) = changes.description {
        active.description = Set(description);
    }
    active.updated_at = Set(Utc::now());
    Ok(active.update(db).await?)
}

/// Apply an admin-driven transition with a conditional update on the source state.
/// Leaving `active` clears the live round.
///
/// If no row moved, the session is re-read: already being in the target state
/// is a no-op success, anything else is a `Conflict`.
pub async fn transition<C: ConnectionTrait>(
    db: &C,
    session_id: Uuid,
    transition: SessionTransition,
) -> Result<session::Model, AppError> {
    let target = transition.target();
    let mut update = session::Entity::update_many()
        .col_expr(session::Column::Status, Expr::value(target))
        .col_expr(session::Column::UpdatedAt, Expr::value(Utc::now()));
    if transition.ends_live_round() {
        update = update
            .col_expr(
                session::Column::ActiveRoundNumber,
                Expr::value(Option::<i32>::None),
            )
            .col_expr(
                session::Column::ActiveRoundStartedAt,
                Expr::value(Option::<DateTime<Utc>>::None),
            );
    }
    let result = update
        .filter(session::Column::Id.eq(session_id))
        .filter(session::Column::Status.eq(transition.source()))
        .exec(db)
        .await?;

    let current = reload(db, session_id).await?;
    if result.rows_affected > 0 {
        info!(session_id = %session_id, to = %target, "Session {}d", transition.as_str());
        return Ok(current);
    }
    match current.status.apply(transition) {
        TransitionOutcome::Unchanged => {
            debug!(session_id = %session_id, status = %target, "Transition is a no-op");
            Ok(current)
        }
        TransitionOutcome::Move { .. } | TransitionOutcome::Rejected => Err(AppError::Conflict(
            format!("Cannot {} a {} session", transition.as_str(), current.status),
        )),
    }
}

/// Append a round. The round counter is bumped conditionally so concurrent
/// appends never pass the cap. The new round takes the number after the
/// highest one in use; the session row stays locked until commit, so
/// concurrent appends never reuse a number.
pub async fn add_round(
    db: &DatabaseConnection,
    session_id: Uuid,
    new_round: NewRound,
) -> Result<round::Model, AppError> {
    new_round.validate()?;

    let txn = db.begin().await?;

    let bumped = session::Entity::update_many()
        .col_expr(
            session::Column::RoundCount,
            Expr::col(session::Column::RoundCount).add(1),
        )
        .col_expr(session::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(session::Column::Id.eq(session_id))
        .filter(session::Column::RoundCount.lt(MAX_ROUNDS))
        .filter(session::Column::Status.ne(SessionStatus::Completed))
        .exec(&txn)
        .await?;

    let current = reload(&txn, session_id).await?;
    if bumped.rows_affected == 0 {
        if current.status.is_terminal() {
            return Err(AppError::Conflict(
                "Cannot add rounds to a completed session".into(),
            ));
        }
        return Err(AppError::MaxRoundsReached);
    }

    let highest: Option<Option<i32>> = round::Entity::find()
        .select_only()
        .column_as(round::Column::RoundNumber.max(), "highest")
        .filter(round::Column::SessionId.eq(session_id))
        .into_tuple()
        .one(&txn)
        .await?;
    let round_number = highest.flatten().unwrap_or(0) + 1;

    let options = new_round
        .options
        .iter()
        .map(|o| o.trim().to_string())
        .collect::<Vec<_>>();
    let model = round::ActiveModel {
        id: Set(Uuid::now_v7()),
        session_id: Set(session_id),
        round_number: Set(round_number),
        prompt: Set(new_round.prompt.trim().to_string()),
        options: Set(serde_json::json!(options)),
        correct_option_index: Set(new_round.correct_option_index),
        media_url: Set(new_round.media_url),
        created_at: Set(Utc::now()),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    info!(session_id = %session_id, round_number = model.round_number, "Round added");
    Ok(model)
}

/// Remove a round that nobody has answered.
///
/// The live round and rounds of a completed session cannot be removed. The
/// counter is decremented under the same conditions in one transaction with
/// the delete. Remaining rounds keep their numbers.
pub async fn delete_round(
    db: &DatabaseConnection,
    session_id: Uuid,
    round_number: i32,
) -> Result<(), AppError> {
    let txn = db.begin().await?;

    let target = find_round(&txn, session_id, round_number).await?;

    let answered = answer::Entity::find()
        .filter(answer::Column::SessionId.eq(session_id))
        .filter(answer::Column::RoundNumber.eq(round_number))
        .count(&txn)
        .await?;
    if answered > 0 {
        return Err(AppError::Conflict(format!(
            "Round {round_number} already has answers"
        )));
    }

    let shrunk = session::Entity::update_many()
        .col_expr(
            session::Column::RoundCount,
            Expr::col(session::Column::RoundCount).sub(1),
        )
        .col_expr(session::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(session::Column::Id.eq(session_id))
        .filter(session::Column::RoundCount.gt(0))
        .filter(session::Column::Status.ne(SessionStatus::Completed))
        .filter(
            Condition::any()
                .add(session::Column::ActiveRoundNumber.is_null())
                .add(session::Column::ActiveRoundNumber.ne(round_number)),
        )
        .exec(&txn)
        .await?;

    if shrunk.rows_affected == 0 {
        let current = reload(&txn, session_id).await?;
        if current.status.is_terminal() {
            return Err(AppError::Conflict(
                "Cannot delete rounds of a completed session".into(),
            ));
        }
        return Err(AppError::Conflict(format!(
            "Round {round_number} is live"
        )));
    }

    round::Entity::delete_by_id(target.id).exec(&txn).await?;
    txn.commit().await?;
    info!(session_id = %session_id, round_number, "Round deleted");
    Ok(())
}

pub async fn list_rounds<C: ConnectionTrait>(
    db: &C,
    session_id: Uuid,
) -> Result<Vec<round::Model>, AppError> {
    Ok(round::Entity::find()
        .filter(round::Column::SessionId.eq(session_id))
        .order_by_asc(round::Column::RoundNumber)
        .all(db)
        .await?)
}

pub async fn find_round<C: ConnectionTrait>(
    db: &C,
    session_id: Uuid,
    round_number: i32,
) -> Result<round::Model, AppError> {
    round::Entity::find()
        .filter(round::Column::SessionId.eq(session_id))
        .filter(round::Column::RoundNumber.eq(round_number))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Round {round_number} not found")))
}

/// Make round `round_number` the live one and stamp its start time.
/// Only valid while the session is active.
pub async fn start_round<C: ConnectionTrait>(
    db: &C,
    session_id: Uuid,
    round_number: i32,
) -> Result<session::Model, AppError> {
    find_round(db, session_id, round_number).await?;

    let now = Utc::now();
    let result = session::Entity::update_many()
        .col_expr(session::Column::ActiveRoundNumber, Expr::value(round_number))
        .col_expr(session::Column::ActiveRoundStartedAt, Expr::value(now))
        .col_expr(session::Column::UpdatedAt, Expr::value(now))
        .filter(session::Column::Id.eq(session_id))
        .filter(session::Column::Status.eq(SessionStatus::Active))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::SessionNotActive);
    }
    info!(session_id = %session_id, round_number, "Round started");
    reload(db, session_id).await
}
