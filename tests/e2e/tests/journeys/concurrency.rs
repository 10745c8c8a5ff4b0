//! Concurrency journeys: searches racing rebuilds and incremental updates

use std::sync::atomic::{AtomicBool, Ordering};

use jobmatch_core::{CandidateProfile, JobStore, MatchFilters, Region};
use jobmatch_e2e_tests::{PostingFactory, TestService};

const CATALOGUE_SIZE: usize = 40;

fn candidate() -> CandidateProfile {
    CandidateProfile::new(["Python", "SQL"], 4.0).unwrap()
}

#[test]
fn test_searches_see_one_whole_catalogue_during_rebuilds() {
    let harness = TestService::new(64);
    let old = PostingFactory::new("OLD").count(CATALOGUE_SIZE).build();
    let new = PostingFactory::new("NEW").count(CATALOGUE_SIZE).build();
    harness.service.rebuild(old.clone()).unwrap();

    let done = AtomicBool::new(false);
    std::thread::scope(|scope| {
        let readers: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(|| {
                    let mut searches = 0;
                    while !done.load(Ordering::SeqCst) || searches == 0 {
                        let outcome = harness
                            .service
                            .find_matches_detailed(&candidate(), &MatchFilters::new(), CATALOGUE_SIZE)
                            .unwrap();
                        assert_eq!(outcome.matches.len(), CATALOGUE_SIZE);
                        let old_ids = outcome.matches.iter().filter(|m| m.result.job_id.starts_with("OLD")).count();
                        assert!(
                            old_ids == 0 || old_ids == CATALOGUE_SIZE,
                            "saw a mixed catalogue at version {}",
                            outcome.index_version
                        );
                        searches += 1;
                    }
                    searches
                })
            })
            .collect();

        for round in 0..6 {
            let catalogue = if round % 2 == 0 { new.clone() } else { old.clone() };
            harness.service.rebuild(catalogue).unwrap();
        }
        done.store(true, Ordering::SeqCst);

        for reader in readers {
            assert!(reader.join().unwrap() > 0);
        }
    });

    let last = harness.service.find_matches(&candidate(), &MatchFilters::new(), 5).unwrap();
    assert!(last.iter().all(|r| r.job_id.starts_with("OLD")));
}

#[test]
fn test_concurrent_adds_and_searches() {
    let harness = TestService::new(64);
    harness
        .service
        .rebuild(PostingFactory::new("BASE").count(10).regions([Region::Europe]).build())
        .unwrap();

    std::thread::scope(|scope| {
        for writer in 0..3 {
            let service = &harness.service;
            scope.spawn(move || {
                let batch = PostingFactory::new(format!("W{}-", writer)).count(10).build();
                service.add(batch).unwrap();
            });
        }
        for _ in 0..3 {
            let service = &harness.service;
            scope.spawn(move || {
                for _ in 0..20 {
                    let results = service.find_matches(&candidate(), &MatchFilters::new(), 100).unwrap();
                    assert!(results.len() >= 10);
                    let europe = MatchFilters::new().region(Region::Europe);
                    let filtered = service.find_matches(&candidate(), &europe, 100).unwrap();
                    assert_eq!(filtered.len(), 10);
                }
            });
        }
    });

    assert_eq!(harness.service.index().len(), 40);
    let harness = harness.reopen();
    assert_eq!(harness.service.index().len(), 40);
}

#[test]
fn test_adds_racing_a_rebuild_land_in_store_and_index_alike() {
    let harness = TestService::new(32);
    let big = PostingFactory::new("BIG").count(2000).build();

    for round in 0..5 {
        std::thread::scope(|scope| {
            let service = &harness.service;
            let catalogue = big.clone();
            scope.spawn(move || service.rebuild(catalogue).unwrap());
            scope.spawn(move || {
                for i in 0..25 {
                    let posting = PostingFactory::new(format!("ADD{}-{}-", round, i)).count(1).build();
                    service.add(posting).unwrap();
                }
            });
        });

        let mut indexed: Vec<String> = harness
            .service
            .index()
            .snapshot()
            .iter()
            .map(|(id, _, _)| id.to_string())
            .collect();
        indexed.sort();

        let store = JobStore::open(Some(harness.data_dir().to_path_buf())).unwrap();
        let mut stored: Vec<String> = store.load_all().unwrap().into_iter().map(|j| j.posting.id.clone()).collect();
        stored.sort();

        assert_eq!(indexed, stored, "store and index drifted in round {}", round);
    }

    let reopened = harness.reopen();
    assert!(reopened.service.health().is_ready());
}
