#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ParseStatusError;

/// Lifecycle state of a quiz session.
///
/// ```text
/// draft --activate--> active --deactivate--> draft
///                     active --complete----> completed (terminal)
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Being assembled by an admin. Joinable, but answers are rejected.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "draft"))]
    Draft,
    /// Running. Rounds can be started and answered.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "active"))]
    Active,
    /// Finished. No further transitions.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "completed"))]
    Completed,
}

/// An admin-driven session transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionTransition {
    Activate,
    Deactivate,
    Complete,
}

/// What applying a transition to the current status means.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The session moves from `from` to `to`.
    Move {
        from: SessionStatus,
        to: SessionStatus,
    },
    /// The session is already in the target state.
    Unchanged,
    /// The transition is not allowed from the current state.
    Rejected,
}

impl SessionTransition {
    /// Status the session ends up in after this transition.
    pub fn target(&self) -> SessionStatus {
        match self {
            Self::Activate => SessionStatus::Active,
            Self::Deactivate => SessionStatus::Draft,
            Self::Complete => SessionStatus::Completed,
        }
    }

    /// The only status this transition may start from.
    pub fn source(&self) -> SessionStatus {
        match self {
            Self::Activate => SessionStatus::Draft,
            Self::Deactivate | Self::Complete => SessionStatus::Active,
        }
    }

    /// Leaving `active` ends whatever round was live; only a fresh
    /// `start_round` may make a round live again.
    pub fn ends_live_round(&self) -> bool {
        self.source() == SessionStatus::Active
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Activate => "activate",
            Self::Deactivate => "deactivate",
            Self::Complete => "complete",
        }
    }
}

impl SessionStatus {
    pub const ALL: &'static [SessionStatus] = &[Self::Draft, Self::Active, Self::Completed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }

    /// Completed sessions accept no transitions, rounds or answers.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Decide what `transition` does when applied to a session in this state.
    ///
    /// Re-applying a transition whose target is the current state is a no-op,
    /// so completing an already completed session is not an error.
    pub fn apply(&self, transition: SessionTransition) -> TransitionOutcome {
        if *self == transition.target() {
            return TransitionOutcome::Unchanged;
        }
        if *self == transition.source() {
            return TransitionOutcome::Move {
                from: *self,
                to: transition.target(),
            };
        }
        TransitionOutcome::Rejected
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for SessionStatus {
    fn default() -> Self {
        Self::Draft
    }
}

impl FromStr for SessionStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseStatusError::new(
                s,
                SessionStatus::ALL.iter().map(|s| s.as_str()),
            )),
        }
    }
}
