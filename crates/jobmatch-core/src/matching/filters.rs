//! Hard filters and request validation

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::{CandidateProfile, Industry, JobLevel, JobPosting, Region, ValidationError};

/// Region, industry and level restrictions applied after retrieval
///
/// An empty set places no restriction on that attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchFilters {
    pub regions: BTreeSet<Region>,
    pub industries: BTreeSet<Industry>,
    pub levels: BTreeSet<JobLevel>,
}

impl MatchFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn region(mut self, region: Region) -> Self {
        self.regions.insert(region);
        self
    }

    pub fn industry(mut self, industry: Industry) -> Self {
        self.industries.insert(industry);
        self
    }

    pub fn level(mut self, level: JobLevel) -> Self {
        self.levels.insert(level);
        self
    }

    pub fn is_unrestricted(&self) -> bool {
        self.region_unrestricted() && self.industries.is_empty() && self.levels.is_empty()
    }

    fn region_unrestricted(&self) -> bool {
        self.regions.is_empty() || self.regions.contains(&Region::Global)
    }

    /// Whether `job` survives every filter
    pub fn accepts(&self, job: &JobPosting) -> bool {
        let region_ok =
            self.region_unrestricted() || job.region == Region::Global || self.regions.contains(&job.region);
        let industry_ok = self.industries.is_empty() || self.industries.contains(&job.industry);
        let level_ok = self.levels.is_empty() || self.levels.contains(&job.level);
        region_ok && industry_ok && level_ok
    }
}

/// Filters as they arrive over the wire, before taxonomy validation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawFilters {
    #[serde(default)]
    pub regions: Vec<String>,
    #[serde(default)]
    pub industries: Vec<String>,
    #[serde(default)]
    pub levels: Vec<String>,
}

impl RawFilters {
    /// Parse every string; the first unknown value is returned as an error
    pub fn parse(&self) -> Result<MatchFilters, ValidationError> {
        Ok(MatchFilters {
            regions: self.regions.iter().map(|s| s.parse::<Region>()).collect::<Result<_, _>>()?,
            industries: self.industries.iter().map(|s| s.parse::<Industry>()).collect::<Result<_, _>>()?,
            levels: self.levels.iter().map(|s| s.parse::<JobLevel>()).collect::<Result<_, _>>()?,
        })
    }
}

/// A match request at the service boundary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatchRequest {
    pub candidate: CandidateProfile,
    #[serde(default)]
    pub filters: RawFilters,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<usize>,
}

/// Check `top_k` against `1..=max_top_k`
pub fn validate_top_k(top_k: usize, max_top_k: usize) -> Result<usize, ValidationError> {
    if top_k == 0 || top_k > max_top_k {
        return Err(ValidationError::OutOfRange {
            field: "top_k",
            reason: format!("must be between 1 and {}, got {}", max_top_k, top_k),
        });
    }
    Ok(top_k)
}
