//! Market insights over the indexed catalogue
//!
//! Both reports read one snapshot, so counts always describe a single
//! published version of the index.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::model::{normalize_skill, Industry, Region};
use crate::scoring::{PREFERRED_SKILL_WEIGHT, REQUIRED_SKILL_WEIGHT};
use crate::search::JobSnapshot;

/// Number of skills reported by both insights
pub const TOP_SKILLS: usize = 10;

/// Demand above which a missing skill is high priority
pub const HIGH_PRIORITY_DEMAND: f64 = 5.0;
/// Demand above which a missing skill is medium priority
pub const MEDIUM_PRIORITY_DEMAND: f64 = 2.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillCount {
    pub skill: String,
    pub count: usize,
}

/// Summary of the postings open in one region
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionalInsights {
    pub region: Region,
    pub job_count: usize,
    pub industries: BTreeMap<Industry, usize>,
    /// Most requested skills, required and preferred counted alike
    pub top_skills: Vec<SkillCount>,
    /// Mean of the level minimums; 0 for an empty region
    pub average_min_experience: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn from_demand(demand: f64) -> Self {
        if demand > HIGH_PRIORITY_DEMAND {
            Priority::High
        } else if demand > MEDIUM_PRIORITY_DEMAND {
            Priority::Medium
        } else {
            Priority::Low
        }
    }
}

/// A skill the candidate lacks, weighted by how often postings ask for it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillRecommendation {
    pub skill: String,
    pub demand_score: f64,
    pub job_count: usize,
    pub priority: Priority,
}

/// Tally keyed by normalized skill, remembering the first spelling seen
#[derive(Default)]
struct SkillTally {
    entries: BTreeMap<String, (String, f64, BTreeSet<String>)>,
}

impl SkillTally {
    fn add(&mut self, skill: &str, weight: f64, job_id: &str) {
        let key = normalize_skill(skill);
        if key.is_empty() {
            return;
        }
        let entry = self
            .entries
            .entry(key)
            .or_insert_with(|| (skill.trim().to_string(), 0.0, BTreeSet::new()));
        entry.1 += weight;
        entry.2.insert(job_id.to_string());
    }

    /// Highest weight first, ties by skill name
    fn ranked(self) -> Vec<(String, f64, usize)> {
        let mut ranked: Vec<(String, f64, usize)> = self
            .entries
            .into_values()
            .map(|(skill, weight, jobs)| (skill, weight, jobs.len()))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(TOP_SKILLS);
        ranked
    }
}

/// Job count, industry mix, top skills and mean experience for `region`
pub fn regional_insights(snapshot: &JobSnapshot, region: Region) -> RegionalInsights {
    let mut job_count = 0;
    let mut industries = BTreeMap::new();
    let mut tally = SkillTally::default();
    let mut total_years = 0.0;

    for job in snapshot.payloads().filter(|job| job.region == region) {
        job_count += 1;
        *industries.entry(job.industry).or_insert(0) += 1;
        total_years += job.level.min_years();
        for skill in job.required_skills.iter().chain(&job.preferred_skills) {
            tally.add(skill, 1.0, &job.id);
        }
    }

    let average_min_experience = if job_count == 0 {
        0.0
    } else {
        total_years / job_count as f64
    };

    RegionalInsights {
        region,
        job_count,
        industries,
        top_skills: tally
            .ranked()
            .into_iter()
            .map(|(skill, count, _)| SkillCount {
                skill,
                count: count as usize,
            })
            .collect(),
        average_min_experience,
    }
}

/// Missing skills ranked by demand across postings, optionally in one region
pub fn recommend_skills(
    snapshot: &JobSnapshot,
    candidate_skills: &BTreeSet<String>,
    region: Option<Region>,
) -> Vec<SkillRecommendation> {
    let known: BTreeSet<String> = candidate_skills.iter().map(|s| normalize_skill(s)).collect();
    let mut tally = SkillTally::default();

    for job in snapshot.payloads() {
        if region.is_some_and(|r| job.region != r) {
            continue;
        }
        for skill in &job.required_skills {
            if !known.contains(&normalize_skill(skill)) {
                tally.add(skill, REQUIRED_SKILL_WEIGHT, &job.id);
            }
        }
        for skill in &job.preferred_skills {
            if !known.contains(&normalize_skill(skill)) {
                tally.add(skill, PREFERRED_SKILL_WEIGHT, &job.id);
            }
        }
    }

    tally
        .ranked()
        .into_iter()
        .map(|(skill, demand_score, job_count)| SkillRecommendation {
            skill,
            demand_score,
            job_count,
            priority: Priority::from_demand(demand_score),
        })
        .collect()
}
