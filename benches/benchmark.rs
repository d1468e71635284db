// Ranking throughput over synthetic catalogs
use clausematch_core::{Catalog, FieldName, Query, TemplateEntry, Vector};
use clausematch_similarity::{ExplainedCandidate, Ranker, DEFAULT_TOP_K};
use clausematch_storage::{build_catalog, CatalogOptions};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::prelude::*;

const DIM: usize = 1024;

const CATEGORIES: [&str; 5] = ["买卖合同", "租赁合同", "建设工程", "技术服务", "借款合同"];

fn generate_random_vector(rng: &mut impl Rng, dim: usize) -> Vector {
    let data: Vec<f32> = (0..dim).map(|_| rng.random_range(-1.0f32..1.0f32)).collect();
    Vector::new(data)
}

fn generate_catalog(size: usize, dim: usize) -> Catalog {
    let mut rng = rand::rng();
    let entries = (0..size)
        .map(|i| {
            let mut entry = TemplateEntry::new(format!("template_{}", i))
                .with_categories(CATEGORIES[i % CATEGORIES.len()], "");
            for field in FieldName::ALL {
                // Roughly one field in ten is missing, as in real catalogs
                if rng.random_range(0..10) > 0 {
                    entry = entry.with_field(field, generate_random_vector(&mut rng, dim));
                }
            }
            entry
        })
        .collect();

    Catalog::build(entries, Some(dim), 0, false).0
}

fn generate_query(dim: usize) -> Query {
    let mut rng = rand::rng();
    FieldName::ALL
        .into_iter()
        .fold(Query::default().with_categories("【买卖合同】", ""), |q, f| {
            q.with_field(f, generate_random_vector(&mut rng, dim))
        })
}

fn benchmark_rank(c: &mut Criterion) {
    let mut group = c.benchmark_group("rank");
    let ranker = Ranker::default();
    let query = generate_query(DIM);

    for size in [100, 500, 2000].iter() {
        let catalog = generate_catalog(*size, DIM);
        group.bench_with_input(BenchmarkId::new("top3", size), size, |b, _| {
            b.iter(|| {
                let ranked = ranker
                    .rank(black_box(&query), catalog.all_entries(), DEFAULT_TOP_K)
                    .unwrap();
                black_box(ranked)
            });
        });
    }

    group.finish();
}

fn benchmark_explain(c: &mut Criterion) {
    let ranker = Ranker::default();
    let query = generate_query(DIM);
    let catalog = generate_catalog(500, DIM);

    c.bench_function("rank_and_explain_500", |b| {
        b.iter(|| {
            let ranked = ranker.rank(&query, catalog.all_entries(), DEFAULT_TOP_K).unwrap();
            black_box(ExplainedCandidate::from_ranked_list(
                ranked,
                catalog.all_entries(),
                ranker.policy(),
                false,
            ))
        });
    });
}

fn benchmark_load(c: &mut Criterion) {
    let catalog = generate_catalog(200, 256);
    let document = serde_json::to_string(catalog.all_entries()).unwrap();
    // Drop the closing bracket to force the recovery scanner
    let truncated = &document[..document.len() - 1];

    let mut group = c.benchmark_group("load");
    group.bench_function("well_formed_200", |b| {
        b.iter(|| build_catalog(black_box(&document), CatalogOptions::default()).unwrap())
    });
    group.bench_function("recovered_200", |b| {
        b.iter(|| build_catalog(black_box(truncated), CatalogOptions::default()).unwrap())
    });
    group.finish();
}

criterion_group!(benches, benchmark_rank, benchmark_explain, benchmark_load);
criterion_main!(benches);
