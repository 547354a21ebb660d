//! Validation errors raised by the scoring engine

use thiserror::Error;

use crate::project::ProjectId;
use crate::ring::{PlayerId, MAX_PLAYERS, MIN_PLAYERS};
use crate::rules::Age;

/// Errors that abort a single evaluation call.
///
/// Missing snapshot fields and unknown card/project ids are not errors;
/// they are reported inside the results instead.
#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("seating ring must hold {min}-{max} players, got {0}", min = MIN_PLAYERS, max = MAX_PLAYERS)]
    RingSize(usize),

    #[error("player {0} appears more than once in the seating ring")]
    DuplicatePlayer(PlayerId),

    #[error("player {0} is not seated in this game")]
    UnknownPlayer(PlayerId),

    #[error("no city snapshot for player {0}")]
    MissingSnapshot(PlayerId),

    #[error("no conflict entry for player {0}")]
    MissingConflictEntry(PlayerId),

    #[error("player {player} boards both left and right in age {age:?}")]
    ConflictingBoarding { player: PlayerId, age: Age },

    #[error("more than one project selected for age {0:?}")]
    DuplicateProjectAge(Age),

    #[error("project {project:?} belongs to age {expected:?}, not age {age:?}")]
    ProjectAgeMismatch { project: ProjectId, age: Age, expected: Age },

    #[error("{field} must be non-negative, got {value}")]
    NegativeCount { field: &'static str, value: i64 },

    #[error("invalid rules document: {0}")]
    Rules(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ScoreError>;
