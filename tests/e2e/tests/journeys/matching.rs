//! Matching journeys: seed a catalogue, match candidates, inspect the scores

use std::sync::Arc;

use jobmatch_core::{sample_postings, CandidateProfile, Industry, JobLevel, JobPosting, MatchFilters, Region};
use jobmatch_e2e_tests::{senior_python_engineer, ConstantEmbedder, FailingEmbedder, KeywordEmbedder, TestService};

#[test]
fn test_skill_breakdown_for_partial_match() {
    let harness = TestService::new(64);
    harness.service.rebuild(vec![senior_python_engineer("JOB001")]).unwrap();

    let candidate = CandidateProfile::new(["Python", "SQL"], 4.0).unwrap();
    let results = harness.service.find_matches(&candidate, &MatchFilters::new(), 5).unwrap();

    assert_eq!(results.len(), 1);
    let result = &results[0];
    assert_eq!(result.job_id, "JOB001");
    assert_eq!(result.matched_required_skills.iter().collect::<Vec<_>>(), ["Python"]);
    assert_eq!(result.matched_preferred_skills.iter().collect::<Vec<_>>(), ["SQL"]);
    assert_eq!(result.missing_skills.iter().collect::<Vec<_>>(), ["AWS", "Django"]);
    assert!((result.skill_score - 300.0 / 7.0).abs() < 0.1);
    assert!((0.0..=100.0).contains(&result.total_score));
    assert_eq!(result.total_score, result.total_score.round());
}

#[test]
fn test_empty_index_returns_no_matches() {
    let harness = TestService::new(64);
    let candidate = CandidateProfile::new(["Python"], 2.0).unwrap();

    let results = harness.service.find_matches(&candidate, &MatchFilters::new(), 10).unwrap();
    assert!(results.is_empty());
}

#[test]
fn test_identical_postings_rank_by_ascending_id() {
    let harness = TestService::with_provider(Arc::new(ConstantEmbedder::new(16)));
    let twin = |id: &str| {
        JobPosting::new(id, "Data Analyst", Region::Europe, Industry::Finance, JobLevel::Mid)
            .with_required_skills(["SQL"])
    };
    harness.service.rebuild(vec![twin("JOB-B"), twin("JOB-C"), twin("JOB-A")]).unwrap();

    let candidate = CandidateProfile::new(["SQL"], 3.0).unwrap();
    for _ in 0..3 {
        let results = harness.service.find_matches(&candidate, &MatchFilters::new(), 3).unwrap();
        let ids: Vec<&str> = results.iter().map(|r| r.job_id.as_str()).collect();
        assert_eq!(ids, ["JOB-A", "JOB-B", "JOB-C"]);
        assert!(results.windows(2).all(|w| w[0].total_score == w[1].total_score));
    }
}

#[test]
fn test_semantic_neighbour_ranks_first() {
    let provider = Arc::new(KeywordEmbedder::new(["python", "nurse", "accountant"]));
    let harness = TestService::with_provider(provider);
    harness
        .service
        .rebuild(vec![
            JobPosting::new("J1", "Registered Nurse", Region::Europe, Industry::Healthcare, JobLevel::Mid),
            JobPosting::new("J2", "Python Developer", Region::Europe, Industry::Technology, JobLevel::Mid),
            JobPosting::new("J3", "Accountant", Region::Europe, Industry::Finance, JobLevel::Mid),
        ])
        .unwrap();

    let candidate = CandidateProfile::new(["Python"], 3.0).unwrap();
    let results = harness.service.find_matches(&candidate, &MatchFilters::new(), 3).unwrap();
    assert_eq!(results[0].job_id, "J2");
    assert!(results[0].similarity > results[1].similarity);
}

#[test]
fn test_filters_restrict_sample_catalogue() {
    let harness = TestService::new(128);
    let report = harness.service.rebuild(sample_postings()).unwrap();
    assert_eq!(report.indexed, 10);

    let candidate = CandidateProfile::new(["Python", "SQL", "Excel"], 5.0).unwrap();
    let filters = MatchFilters::new().region(Region::SubSaharanAfrica).level(JobLevel::Mid);
    let outcome = harness.service.find_matches_detailed(&candidate, &filters, 10).unwrap();

    assert!(!outcome.matches.is_empty());
    for m in &outcome.matches {
        assert_eq!(m.posting.region, Region::SubSaharanAfrica);
        assert_eq!(m.posting.level, JobLevel::Mid);
    }
    let scores: Vec<f64> = outcome.matches.iter().map(|m| m.result.total_score).collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn test_top_k_smaller_than_catalogue() {
    let harness = TestService::new(64);
    harness.service.rebuild(sample_postings()).unwrap();

    let candidate = CandidateProfile::new(["Python"], 2.0).unwrap();
    let results = harness.service.find_matches(&candidate, &MatchFilters::new(), 3).unwrap();
    assert_eq!(results.len(), 3);
}

#[test]
fn test_embedding_failure_skips_only_that_posting() {
    let harness = TestService::with_provider(Arc::new(FailingEmbedder::new("FAIL", 32)));
    let mut broken = senior_python_engineer("JOB002");
    broken.description = "FAIL".to_string();

    let report = harness
        .service
        .rebuild(vec![senior_python_engineer("JOB001"), broken, senior_python_engineer("JOB003")])
        .unwrap();

    assert_eq!(report.indexed, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.failures[0].id, "JOB002");
    assert!(harness.service.posting("JOB002").is_none());
    assert!(harness.service.posting("JOB003").is_some());
}

#[test]
fn test_market_insights_over_sample_catalogue() {
    let harness = TestService::new(64);
    harness.service.rebuild(sample_postings()).unwrap();

    let insights = harness.service.regional_insights(Region::Mena);
    assert_eq!(insights.job_count, 4);
    assert!(!insights.top_skills.is_empty());

    let known = ["Python".to_string()].into_iter().collect();
    let recommendations = harness.service.recommend_skills(&known, None);
    assert!(!recommendations.is_empty());
    assert!(recommendations.iter().all(|r| r.skill.to_lowercase() != "python"));
    assert!(recommendations.windows(2).all(|w| w[0].demand_score >= w[1].demand_score));
}
