//! Closed taxonomies used for hard filtering
//!
//! Regions, industries, levels and education levels parse from a fixed alias
//! table. Anything outside that table is a [`ValidationError`]; nothing is
//! silently mapped to a fallback variant.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ValidationError;

/// Lowercase, treat `-` and `_` as spaces, collapse runs of whitespace
fn normalize_key(input: &str) -> String {
    input
        .to_lowercase()
        .replace(['-', '_'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================================
// REGION
// ============================================================================

/// Geographic market a posting belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Region {
    Mena,
    NorthAfrica,
    SubSaharanAfrica,
    Europe,
    NorthAmerica,
    LatinAmerica,
    AsiaPacific,
    /// Open worldwide. A `Global` posting passes every region filter.
    Global,
}

impl Region {
    pub const ALL: [Region; 8] = [
        Region::Mena,
        Region::NorthAfrica,
        Region::SubSaharanAfrica,
        Region::Europe,
        Region::NorthAmerica,
        Region::LatinAmerica,
        Region::AsiaPacific,
        Region::Global,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Mena => "MENA",
            Region::NorthAfrica => "North Africa",
            Region::SubSaharanAfrica => "Sub-Saharan Africa",
            Region::Europe => "Europe",
            Region::NorthAmerica => "North America",
            Region::LatinAmerica => "Latin America",
            Region::AsiaPacific => "Asia Pacific",
            Region::Global => "Global",
        }
    }
}

impl FromStr for Region {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_key(s).as_str() {
            "mena" | "middle east" | "middle east and north africa" | "middle east & north africa" => {
                Ok(Region::Mena)
            }
            "north africa" => Ok(Region::NorthAfrica),
            "sub saharan africa" | "sub saharan" | "ssa" => Ok(Region::SubSaharanAfrica),
            "europe" | "eu" => Ok(Region::Europe),
            "north america" | "na" => Ok(Region::NorthAmerica),
            "latin america" | "latam" => Ok(Region::LatinAmerica),
            "asia pacific" | "apac" => Ok(Region::AsiaPacific),
            "global" | "worldwide" => Ok(Region::Global),
            _ => Err(ValidationError::UnknownVariant {
                kind: "region",
                value: s.to_string(),
            }),
        }
    }
}

// ============================================================================
// INDUSTRY
// ============================================================================

/// Industry sector of a posting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Industry {
    Technology,
    Finance,
    Fintech,
    Healthcare,
    Education,
    Manufacturing,
    Retail,
    Construction,
    Energy,
    Agriculture,
    Transportation,
    Telecommunications,
    Media,
    Hospitality,
    Consulting,
    Ngo,
}

impl Industry {
    pub const ALL: [Industry; 16] = [
        Industry::Technology,
        Industry::Finance,
        Industry::Fintech,
        Industry::Healthcare,
        Industry::Education,
        Industry::Manufacturing,
        Industry::Retail,
        Industry::Construction,
        Industry::Energy,
        Industry::Agriculture,
        Industry::Transportation,
        Industry::Telecommunications,
        Industry::Media,
        Industry::Hospitality,
        Industry::Consulting,
        Industry::Ngo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Industry::Technology => "Technology",
            Industry::Finance => "Finance",
            Industry::Fintech => "Fintech",
            Industry::Healthcare => "Healthcare",
            Industry::Education => "Education",
            Industry::Manufacturing => "Manufacturing",
            Industry::Retail => "Retail",
            Industry::Construction => "Construction",
            Industry::Energy => "Energy",
            Industry::Agriculture => "Agriculture",
            Industry::Transportation => "Transportation",
            Industry::Telecommunications => "Telecommunications",
            Industry::Media => "Media",
            Industry::Hospitality => "Hospitality",
            Industry::Consulting => "Consulting",
            Industry::Ngo => "NGO",
        }
    }
}

impl FromStr for Industry {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = normalize_key(s);
        match key.as_str() {
            "technology" | "tech" | "it" | "software" => return Ok(Industry::Technology),
            "finance" | "banking" | "financial services" => return Ok(Industry::Finance),
            "fintech" | "fin tech" => return Ok(Industry::Fintech),
            "healthcare" | "health" | "health care" => return Ok(Industry::Healthcare),
            "telecommunications" | "telecom" | "telco" => return Ok(Industry::Telecommunications),
            "ngo" | "non profit" | "nonprofit" => return Ok(Industry::Ngo),
            _ => {}
        }
        Industry::ALL
            .into_iter()
            .find(|i| i.as_str().eq_ignore_ascii_case(&key))
            .ok_or_else(|| ValidationError::UnknownVariant {
                kind: "industry",
                value: s.to_string(),
            })
    }
}

// ============================================================================
// JOB LEVEL
// ============================================================================

/// Seniority of a posting, ordered from most junior to most senior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum JobLevel {
    Junior,
    Mid,
    Senior,
    Lead,
}

impl JobLevel {
    pub const ALL: [JobLevel; 4] = [JobLevel::Junior, JobLevel::Mid, JobLevel::Senior, JobLevel::Lead];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobLevel::Junior => "Junior",
            JobLevel::Mid => "Mid",
            JobLevel::Senior => "Senior",
            JobLevel::Lead => "Lead",
        }
    }

    /// Minimum years of experience implied by the level
    pub fn min_years(&self) -> f64 {
        match self {
            JobLevel::Junior => 0.0,
            JobLevel::Mid => 3.0,
            JobLevel::Senior => 6.0,
            JobLevel::Lead => 10.0,
        }
    }

    /// Position on the seniority ladder
    pub fn ordinal(&self) -> u8 {
        match self {
            JobLevel::Junior => 0,
            JobLevel::Mid => 1,
            JobLevel::Senior => 2,
            JobLevel::Lead => 3,
        }
    }

    /// Number of rungs between two levels
    pub fn distance(&self, other: JobLevel) -> u8 {
        self.ordinal().abs_diff(other.ordinal())
    }

    /// Highest level whose minimum is covered by `years`
    pub fn from_experience(years: f64) -> Self {
        Self::ALL
            .into_iter()
            .rev()
            .find(|level| years >= level.min_years())
            .unwrap_or(JobLevel::Junior)
    }
}

impl FromStr for JobLevel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_key(s).as_str() {
            "junior" | "entry" | "entry level" | "graduate" => Ok(JobLevel::Junior),
            "mid" | "mid level" | "intermediate" => Ok(JobLevel::Mid),
            "senior" => Ok(JobLevel::Senior),
            "lead" | "principal" | "staff" => Ok(JobLevel::Lead),
            _ => Err(ValidationError::UnknownVariant {
                kind: "level",
                value: s.to_string(),
            }),
        }
    }
}

// ============================================================================
// EDUCATION
// ============================================================================

/// Highest completed education of a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EducationLevel {
    #[default]
    Unspecified,
    HighSchool,
    Diploma,
    Bachelor,
    Master,
    Doctorate,
}

impl EducationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EducationLevel::Unspecified => "Unspecified",
            EducationLevel::HighSchool => "High School",
            EducationLevel::Diploma => "Diploma",
            EducationLevel::Bachelor => "Bachelor",
            EducationLevel::Master => "Master",
            EducationLevel::Doctorate => "Doctorate",
        }
    }
}

impl FromStr for EducationLevel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_key(s).as_str() {
            "" | "unspecified" | "none" => Ok(EducationLevel::Unspecified),
            "high school" | "secondary" => Ok(EducationLevel::HighSchool),
            "diploma" | "associate" => Ok(EducationLevel::Diploma),
            "bachelor" | "bachelors" | "bachelor's" | "bsc" | "ba" => Ok(EducationLevel::Bachelor),
            "master" | "masters" | "master's" | "msc" | "mba" => Ok(EducationLevel::Master),
            "doctorate" | "phd" | "doctoral" => Ok(EducationLevel::Doctorate),
            _ => Err(ValidationError::UnknownVariant {
                kind: "education level",
                value: s.to_string(),
            }),
        }
    }
}

// ============================================================================
// SHARED IMPLS
// ============================================================================

macro_rules! string_enum_impls {
    ($($ty:ty),* $(,)?) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }

            impl TryFrom<String> for $ty {
                type Error = ValidationError;

                fn try_from(value: String) -> Result<Self, Self::Error> {
                    value.parse()
                }
            }

            impl From<$ty> for String {
                fn from(value: $ty) -> Self {
                    value.as_str().to_string()
                }
            }
        )*
    };
}

string_enum_impls!(Region, Industry, JobLevel, EducationLevel);

// ============================================================================
// TESTS
// ============================================================================
