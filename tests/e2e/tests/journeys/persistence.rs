//! Persistence journeys: restart, model changes and damaged stores

use std::sync::Arc;

use jobmatch_core::{
    sample_postings, BuildKind, CandidateProfile, HashEmbedder, Health, MatchError, MatchFilters, Region,
};
use jobmatch_e2e_tests::{senior_python_engineer, PostingFactory, TestService};

fn candidate() -> CandidateProfile {
    CandidateProfile::new(["Python", "Django", "PostgreSQL"], 3.0).unwrap()
}

#[test]
fn test_restart_restores_identical_results() {
    let harness = TestService::new(96);
    harness.service.rebuild(sample_postings()).unwrap();
    let before = harness.service.find_matches(&candidate(), &MatchFilters::new(), 10).unwrap();

    let harness = harness.reopen();
    assert!(harness.service.health().is_ready());
    assert_eq!(harness.service.index().len(), 10);

    let after = harness.service.find_matches(&candidate(), &MatchFilters::new(), 10).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_incremental_changes_survive_restart() {
    let harness = TestService::new(64);
    harness.service.rebuild(PostingFactory::new("A").count(5).build()).unwrap();
    harness.service.add(vec![senior_python_engineer("JOB900")]).unwrap();
    assert!(harness.service.remove("A002").unwrap());

    let harness = harness.reopen();
    assert_eq!(harness.service.index().len(), 5);
    assert!(harness.service.posting("JOB900").is_some());
    assert!(harness.service.posting("A002").is_none());

    let runs = harness.service.build_runs(10).unwrap();
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].kind, BuildKind::Incremental);
    assert_eq!(runs[1].kind, BuildKind::Rebuild);
}

#[test]
fn test_dimension_change_degrades_until_rebuild() {
    let harness = TestService::new(64);
    harness.service.rebuild(sample_postings()).unwrap();

    let harness = harness.reopen_with(Arc::new(HashEmbedder::new(48)));
    assert!(matches!(harness.service.health(), Health::Degraded { .. }));

    let err = harness
        .service
        .find_matches(&candidate(), &MatchFilters::new(), 5)
        .unwrap_err();
    assert!(matches!(err, MatchError::Degraded(_)));
    // Adding to a degraded catalogue would mix dimensions
    assert!(harness.service.add(vec![senior_python_engineer("JOB900")]).is_err());

    harness.service.rebuild(sample_postings()).unwrap();
    assert!(harness.service.health().is_ready());
    assert_eq!(harness.service.index().dimensions(), 48);
    assert!(!harness.service.find_matches(&candidate(), &MatchFilters::new(), 5).unwrap().is_empty());

    // The new dimension is what a later restart expects
    let harness = harness.reopen();
    assert!(harness.service.health().is_ready());
}

#[test]
fn test_missing_embedding_degrades_on_open() {
    let harness = TestService::new(64);
    harness.service.rebuild(sample_postings()).unwrap();

    let db_path = harness.db_path();
    {
        let conn = rusqlite::Connection::open(&db_path).unwrap();
        conn.execute("DELETE FROM job_embeddings WHERE job_id = 'JOB003'", []).unwrap();
    }

    let harness = harness.reopen();
    match harness.service.health() {
        Health::Degraded { reason } => assert!(reason.contains("JOB003"), "reason: {}", reason),
        Health::Ready => panic!("expected a degraded service"),
    }
    assert!(harness.service.find_matches(&candidate(), &MatchFilters::new(), 5).is_err());

    // Insights only need postings that made it into the index
    assert_eq!(harness.service.regional_insights(Region::Mena).job_count, 0);
}
