//! Scoreboards and tenant leaderboards, computed on every read.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::*;
use serde::Serialize;
use uuid::Uuid;

use crate::entity::{participant, participation, session};
use crate::error::AppError;

/// One row of a session scoreboard.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct ScoreboardEntry {
    /// 1-based position after sorting.
    #[schema(example = 1)]
    pub rank: usize,
    pub participant_id: Uuid,
    /// Current profile name, never a snapshot.
    #[schema(example = "Alice")]
    pub display_name: String,
    #[schema(example = "🦊")]
    pub avatar: String,
    #[schema(example = 18)]
    pub total_points: i32,
    #[schema(example = 2)]
    pub correct_answers: i32,
    pub joined_at: DateTime<Utc>,
}

/// One row of a tenant leaderboard, summed over every session the participant joined.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct LeaderboardEntry {
    #[schema(example = 1)]
    pub rank: usize,
    pub participant_id: Uuid,
    #[schema(example = "Alice")]
    pub display_name: String,
    #[schema(example = "🦊")]
    pub avatar: String,
    #[schema(example = 120)]
    pub total_points: i32,
    #[schema(example = 14)]
    pub correct_answers: i32,
    /// Distinct sessions contributing to this row.
    #[schema(example = 3)]
    pub sessions_played: usize,
    /// Earliest join across those sessions; breaks full ties.
    pub first_joined_at: DateTime<Utc>,
}

/// Shared ranking: points desc, then correct answers desc, then earliest join.
trait Ranked {
    fn key(&self) -> (i32, i32, DateTime<Utc>, Uuid);
    fn set_rank(&mut self, rank: usize);
}

impl Ranked for ScoreboardEntry {
    fn key(&self) -> (i32, i32, DateTime<Utc>, Uuid) {
        (
            self.total_points,
            self.correct_answers,
            self.joined_at,
            self.participant_id,
        )
    }
    fn set_rank(&mut self, rank: usize) {
        self.rank = rank;
    }
}

impl Ranked for LeaderboardEntry {
    fn key(&self) -> (i32, i32, DateTime<Utc>, Uuid) {
        (
            self.total_points,
            self.correct_answers,
            self.first_joined_at,
            self.participant_id,
        )
    }
    fn set_rank(&mut self, rank: usize) {
        self.rank = rank;
    }
}

fn compare<T: Ranked>(a: &T, b: &T) -> Ordering {
    let (a_points, a_correct, a_joined, a_id) = a.key();
    let (b_points, b_correct, b_joined, b_id) = b.key();
    b_points
        .cmp(&a_points)
        .then(b_correct.cmp(&a_correct))
        .then(a_joined.cmp(&b_joined))
        .then(a_id.cmp(&b_id))
}

fn rank<T: Ranked>(entries: &mut [T]) {
    entries.sort_by(compare);
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.set_rank(i + 1);
    }
}

/// Ranked participations of one session joined with live profiles.
/// Deleted participants are left out.
pub async fn session_scoreboard<C: ConnectionTrait>(
    db: &C,
    session: &session::Model,
) -> Result<Vec<ScoreboardEntry>, AppError> {
    let rows = participation::Entity::find()
        .filter(participation::Column::TenantId.eq(session.tenant_id))
        .filter(participation::Column::SessionId.eq(session.id))
        .find_also_related(participant::Entity)
        .all(db)
        .await?;

    let mut entries: Vec<ScoreboardEntry> = rows
        .into_iter()
        .filter_map(|(p, profile)| {
            let profile = profile.filter(|profile| !profile.is_deleted())?;
            Some(ScoreboardEntry {
                rank: 0,
                participant_id: p.participant_id,
                display_name: profile.display_name,
                avatar: profile.avatar,
                total_points: p.total_points,
                correct_answers: p.correct_answers,
                joined_at: p.joined_at,
            })
        })
        .collect();

    rank(&mut entries);
    Ok(entries)
}

/// Merge per-session scoreboards by participant and rank the totals.
pub fn merge_scoreboards<I>(scoreboards: I) -> Vec<LeaderboardEntry>
where
    I: IntoIterator<Item = Vec<ScoreboardEntry>>,
{
    let mut merged: HashMap<Uuid, LeaderboardEntry> = HashMap::new();
    for board in scoreboards {
        for entry in board {
            merged
                .entry(entry.participant_id)
                .and_modify(|acc| {
                    acc.total_points += entry.total_points;
                    acc.correct_answers += entry.correct_answers;
                    acc.sessions_played += 1;
                    acc.first_joined_at = acc.first_joined_at.min(entry.joined_at);
                })
                .or_insert_with(|| LeaderboardEntry {
                    rank: 0,
                    participant_id: entry.participant_id,
                    display_name: entry.display_name.clone(),
                    avatar: entry.avatar.clone(),
                    total_points: entry.total_points,
                    correct_answers: entry.correct_answers,
                    sessions_played: 1,
                    first_joined_at: entry.joined_at,
                });
        }
    }

    let mut entries: Vec<LeaderboardEntry> = merged.into_values().collect();
    rank(&mut entries);
    entries
}

/// Cross-session leaderboard for a tenant: every session's scoreboard, merged.
pub async fn tenant_leaderboard<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
) -> Result<Vec<LeaderboardEntry>, AppError> {
    let sessions = session::Entity::find()
        .filter(session::Column::TenantId.eq(tenant_id))
        .all(db)
        .await?;

    let mut boards = Vec::with_capacity(sessions.len());
    for s in &sessions {
        boards.push(session_scoreboard(db, s).await?);
    }
    Ok(merge_scoreboards(boards))
}
