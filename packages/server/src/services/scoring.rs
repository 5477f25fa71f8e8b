//! Answer validation, scoring and the atomic score update.

use chrono::{DateTime, Utc};
use common::{RetryPolicy, ScoreTier, ScoringPolicy, SessionStatus};
use sea_orm::prelude::Expr;
use sea_orm::*;
use tracing::{info, warn};
use uuid::Uuid;

use crate::entity::{answer, participant, participation};
use crate::error::AppError;
use crate::services::participation::find_participation;
use crate::services::session::{OPTION_COUNT, find_round, find_session_scoped};

/// One answer submission.
#[derive(Debug, Clone)]
pub struct Submission {
    pub session_id: Uuid,
    pub round_number: i32,
    pub selected_option_index: i32,
    /// Seconds since the round started. `None` measures it from the session's
    /// `active_round_started_at`, which is what the HTTP boundary does.
    pub elapsed_seconds: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct AnswerOutcome {
    pub answer_id: Uuid,
    pub round_number: i32,
    pub is_correct: bool,
    pub points_awarded: i32,
    pub tier: ScoreTier,
    pub total_points: i32,
    pub correct_answers: i32,
}

/// Seconds between `started_at` and `now`, never negative.
pub fn elapsed_since(started_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
    started_at
        .map(|t| (now - t).num_milliseconds().max(0) as f64 / 1000.0)
        .unwrap_or(0.0)
}

/// Validate, score and persist an answer.
///
/// The whole check-and-write runs in one transaction, so the answer row and
/// the score increment land together or not at all. Transient storage
/// failures are retried with backoff; validation failures never are.
pub async fn submit_answer(
    db: &DatabaseConnection,
    policy: &ScoringPolicy,
    retry: &RetryPolicy,
    participant: &participant::Model,
    submission: &Submission,
) -> Result<AnswerOutcome, AppError> {
    if !(0..OPTION_COUNT as i32).contains(&submission.selected_option_index) {
        return Err(AppError::Validation(format!(
            "selected_option_index must be between 0 and {}",
            OPTION_COUNT - 1
        )));
    }

    let mut failed: u8 = 0;
    loop {
        match try_submit(db, policy, participant, submission).await {
            Ok(outcome) => return Ok(outcome),
            Err(e) if e.is_transient() && retry.should_retry(failed + 1) => {
                failed += 1;
                let delay = retry.delay_for(failed);
                warn!(
                    attempt = failed,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Score persistence failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

async fn try_submit(
    db: &DatabaseConnection,
    policy: &ScoringPolicy,
    participant: &participant::Model,
    submission: &Submission,
) -> Result<AnswerOutcome, AppError> {
    let round_number = submission.round_number;
    let txn = db.begin().await?;

    let session =
        find_session_scoped(&txn, Some(participant.tenant_id), submission.session_id).await?;

    let participation = find_participation(&txn, participant.id, session.id)
        .await?
        .ok_or(AppError::NotJoined)?;

    if session.status != SessionStatus::Active {
        return Err(AppError::SessionNotActive);
    }
    if session.active_round_number != Some(round_number) {
        return Err(AppError::RoundNotStarted(round_number));
    }

    let already_answered = answer::Entity::find()
        .filter(answer::Column::ParticipationId.eq(participation.id))
        .filter(answer::Column::RoundNumber.eq(round_number))
        .one(&txn)
        .await?
        .is_some();
    if already_answered {
        return Err(AppError::DuplicateAnswer(round_number));
    }

    let round = find_round(&txn, session.id, round_number).await?;
    let is_correct = submission.selected_option_index == round.correct_option_index;

    let now = Utc::now();
    let elapsed = submission
        .elapsed_seconds
        .unwrap_or_else(|| elapsed_since(session.active_round_started_at, now));
    let tier = policy.tier(is_correct, elapsed);
    let points = policy.points_for(tier);

    let new_answer = answer::ActiveModel {
        id: Set(Uuid::now_v7()),
        participant_id: Set(participant.id),
        participation_id: Set(participation.id),
        session_id: Set(session.id),
        tenant_id: Set(session.tenant_id),
        round_number: Set(round_number),
        selected_option_index: Set(submission.selected_option_index),
        is_correct: Set(is_correct),
        points_awarded: Set(points),
        elapsed_seconds: Set(elapsed),
        submitted_at: Set(now),
    };
    let saved = new_answer.insert(&txn).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::DuplicateAnswer(round_number),
        _ => AppError::from(e),
    })?;

    // Increment in place; never read-modify-write the score.
    participation::Entity::update_many()
        .col_expr(
            participation::Column::TotalPoints,
            Expr::col(participation::Column::TotalPoints).add(points),
        )
        .col_expr(
            participation::Column::CorrectAnswers,
            Expr::col(participation::Column::CorrectAnswers).add(i32::from(is_correct)),
        )
        .filter(participation::Column::Id.eq(participation.id))
        .exec(&txn)
        .await?;

    let updated = participation::Entity::find_by_id(participation.id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::Internal("participation vanished during scoring".into()))?;

    txn.commit().await?;

    info!(
        participation_id = %participation.id,
        round_number,
        is_correct,
        points,
        "Answer recorded"
    );

    Ok(AnswerOutcome {
        answer_id: saved.id,
        round_number,
        is_correct,
        points_awarded: points,
        tier,
        total_points: updated.total_points,
        correct_answers: updated.correct_answers,
    })
}
