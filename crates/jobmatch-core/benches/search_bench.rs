//! JobMatch Search Benchmarks
//!
//! Benchmarks for the online match path using Criterion.
//! Run with: cargo bench -p jobmatch-core

use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion, black_box};
use jobmatch_core::embeddings::{dot_product, EmbeddingProvider, HashEmbedder};
use jobmatch_core::{
    CandidateProfile, HnswParams, IndexConfig, Industry, JobIndex, JobLevel, JobPosting, Region,
    ScoreComposer, SearchStrategy,
};

fn vectors(count: usize, dimensions: usize) -> Vec<Vec<f32>> {
    (0..count)
        .map(|i| {
            (0..dimensions)
                .map(|j| ((i * dimensions + j) as f32).sin())
                .collect()
        })
        .collect()
}

fn catalogue(config: IndexConfig, count: usize, dimensions: usize) -> JobIndex {
    let index = JobIndex::new(dimensions, config);
    let entries = vectors(count, dimensions).into_iter().enumerate().map(|(i, v)| {
        let id = format!("JOB{:05}", i);
        let posting = JobPosting::new(&id, "Engineer", Region::Mena, Industry::Technology, JobLevel::Mid);
        (id, v, Arc::new(posting))
    });
    index.rebuild(entries).unwrap();
    index
}

fn bench_dot_product(c: &mut Criterion) {
    let v = vectors(2, 256);
    c.bench_function("dot_256d", |b| {
        b.iter(|| black_box(dot_product(&v[0], &v[1])))
    });
}

fn bench_exact_search(c: &mut Criterion) {
    let index = catalogue(IndexConfig::exact(), 5_000, 256);
    let query = vectors(1, 256).remove(0);
    c.bench_function("exact_search_5k_256d_k30", |b| {
        b.iter(|| black_box(index.search(&query, 30).unwrap()))
    });
}

fn bench_hnsw_search(c: &mut Criterion) {
    let config = IndexConfig {
        strategy: SearchStrategy::Approximate(HnswParams::default()),
        exact_below: 0,
        compaction_threshold: 256,
    };
    let index = catalogue(config, 5_000, 256);
    let query = vectors(1, 256).remove(0);
    c.bench_function("hnsw_search_5k_256d_k30", |b| {
        b.iter(|| black_box(index.search(&query, 30).unwrap()))
    });
}

fn bench_hash_embedding(c: &mut Criterion) {
    let embedder = HashEmbedder::default();
    let text = "Senior Software Engineer\nBuild scalable applications\nRequired skills: AWS, Django, Python";
    c.bench_function("hash_embed_256d", |b| {
        b.iter(|| black_box(embedder.embed(text).unwrap()))
    });
}

fn bench_compose(c: &mut Criterion) {
    let composer = ScoreComposer::default();
    let candidate = CandidateProfile::new(["Python", "SQL", "Docker"], 4.0).unwrap();
    let job = jobmatch_core::sample_postings().remove(0);
    c.bench_function("compose_score", |b| {
        b.iter(|| black_box(composer.compose(&candidate, &job, 0.72)))
    });
}

criterion_group!(
    benches,
    bench_dot_product,
    bench_exact_search,
    bench_hnsw_search,
    bench_hash_embedding,
    bench_compose,
);
criterion_main!(benches);
