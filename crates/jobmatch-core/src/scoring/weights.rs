/// Weight of each factor in the total score
pub const DEFAULT_WEIGHTS: ScoreWeights = ScoreWeights {
    similarity: 0.5,
    skills: 0.3,
    experience: 0.1,
    level: 0.1,
};

/// Required skills count double against preferred ones
pub const REQUIRED_SKILL_WEIGHT: f64 = 2.0;
pub const PREFERRED_SKILL_WEIGHT: f64 = 1.0;

/// Level score when candidate and posting are one rung apart
pub const ADJACENT_LEVEL_SCORE: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub similarity: f64,
    pub skills: f64,
    pub experience: f64,
    pub level: f64,
}

impl ScoreWeights {
    pub fn sum(&self) -> f64 {
        self.similarity + self.skills + self.experience + self.level
    }
}
