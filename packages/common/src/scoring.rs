use serde::{Deserialize, Serialize};

/// Tiered timing policy used to award points for an answer.
///
/// Only correct answers score. The tier is picked by how many seconds passed
/// between the round start and the submission:
///
/// | elapsed                               | points          |
/// |---------------------------------------|-----------------|
/// | `<= fast_window_secs`                 | `fast_points`   |
/// | `<= medium_window_secs`               | `medium_points` |
/// | anything slower                       | `slow_points`   |
/// | incorrect answer                      | `0`             |
///
/// The defaults (2s / 5s, 10 / 8 / 5 points) match the live event format
/// where a round's song clip is about six seconds long.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ScoringPolicy {
    #[serde(default = "default_fast_window_secs")]
    pub fast_window_secs: f64,
    #[serde(default = "default_medium_window_secs")]
    pub medium_window_secs: f64,
    #[serde(default = "default_fast_points")]
    pub fast_points: i32,
    #[serde(default = "default_medium_points")]
    pub medium_points: i32,
    #[serde(default = "default_slow_points")]
    pub slow_points: i32,
}

fn default_fast_window_secs() -> f64 {
    2.0
}
fn default_medium_window_secs() -> f64 {
    5.0
}
fn default_fast_points() -> i32 {
    10
}
fn default_medium_points() -> i32 {
    8
}
fn default_slow_points() -> i32 {
    5
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            fast_window_secs: default_fast_window_secs(),
            medium_window_secs: default_medium_window_secs(),
            fast_points: default_fast_points(),
            medium_points: default_medium_points(),
            slow_points: default_slow_points(),
        }
    }
}

/// Which timing tier an answer fell into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScoreTier {
    Fast,
    Medium,
    Slow,
    Incorrect,
}

impl ScoringPolicy {
    /// Classify a submission. Negative elapsed times (clock skew) count as fast.
    pub fn tier(&self, is_correct: bool, elapsed_secs: f64) -> ScoreTier {
        if !is_correct {
            return ScoreTier::Incorrect;
        }
        if elapsed_secs <= self.fast_window_secs {
            ScoreTier::Fast
        } else if elapsed_secs <= self.medium_window_secs {
            ScoreTier::Medium
        } else {
            ScoreTier::Slow
        }
    }

    pub fn points_for(&self, tier: ScoreTier) -> i32 {
        match tier {
            ScoreTier::Fast => self.fast_points,
            ScoreTier::Medium => self.medium_points,
            ScoreTier::Slow => self.slow_points,
            ScoreTier::Incorrect => 0,
        }
    }

    /// Tier windows must be ordered and points non-negative.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.fast_window_secs >= 0.0 && self.medium_window_secs >= self.fast_window_secs) {
            return Err("scoring windows must satisfy 0 <= fast <= medium".into());
        }
        if self.fast_points < 0 || self.medium_points < 0 || self.slow_points < 0 {
            return Err("scoring points must be non-negative".into());
        }
        Ok(())
    }
}
