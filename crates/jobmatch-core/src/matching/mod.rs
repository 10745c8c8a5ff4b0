//! Match Engine
//!
//! Online path from a candidate profile to a ranked, explained list of
//! postings:
//! 1. Embed the candidate text (LRU-cached)
//! 2. Retrieve a superset of neighbours from one index snapshot
//! 3. Apply region, industry and level filters
//! 4. Score, rank and truncate
//!
//! Also hosts the catalogue insights, which read the same snapshots.

mod engine;
mod filters;
mod insights;

pub use engine::{MatchEngine, MatchOutcome, RankedMatch};
pub use filters::{validate_top_k, MatchFilters, MatchRequest, RawFilters};
pub use insights::{
    recommend_skills, regional_insights, Priority, RegionalInsights, SkillCount, SkillRecommendation,
    HIGH_PRIORITY_DEMAND, MEDIUM_PRIORITY_DEMAND, TOP_SKILLS,
};
