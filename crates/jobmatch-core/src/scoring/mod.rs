//! Score Composer
//!
//! Blends embedding similarity with skill overlap, experience and level
//! into a 0-100 total with a per-factor breakdown.

mod composer;
mod weights;

pub use composer::{experience_score, level_score, skill_score, PreparedCandidate, ScoreComposer};
pub use weights::{
    ScoreWeights, ADJACENT_LEVEL_SCORE, DEFAULT_WEIGHTS, PREFERRED_SKILL_WEIGHT, REQUIRED_SKILL_WEIGHT,
};
