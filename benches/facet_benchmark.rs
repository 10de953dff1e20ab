//! Performance benchmarks for facet recomputation
//! Target: a full filter-and-count pass over 20k items well under a frame

use catalog_facets::config::SizeBucket;
use catalog_facets::engine::ThresholdClassifier;
use catalog_facets::{FacetDimension, FacetEngine, FilterState, Item, ItemStatus};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;

const CREATORS: [&str; 8] = ["Alice", "Bob", "Carol", "Dana", "Eve", "Frank", "Grace", "Heidi"];
const CATEGORIES: [&str; 5] = ["Scenes", "Looks", "Clothing", "Hair", "Audio"];

fn synthetic_catalog(size: usize) -> Vec<Item> {
    (0..size)
        .map(|i| {
            let creator = CREATORS[i % CREATORS.len()];
            let mut item = Item::new(format!("{}.Package{}.{}", creator, i, i % 3 + 1))
                .with_name(format!("Package {} {}", i, CATEGORIES[i % CATEGORIES.len()]))
                .with_creator(creator)
                .with_category(CATEGORIES[i % CATEGORIES.len()])
                .with_status(ItemStatus::ALL[i % ItemStatus::ALL.len()])
                .with_size((i as u64 * 7_919) % 500_000_000);
            if i % 4 == 0 {
                item = item.with_category(CATEGORIES[(i / 4) % CATEGORIES.len()]);
            }
            item.is_duplicate = i % 17 == 0;
            item.is_old_version = i % 3 != 0;
            item.dependency_count = (i % 5) as u32;
            item
        })
        .collect()
}

fn engine() -> FacetEngine {
    let classifier = ThresholdClassifier::new(vec![
        SizeBucket::new("Small", Some(10_000_000)),
        SizeBucket::new("Medium", Some(100_000_000)),
        SizeBucket::new("Large", None),
    ])
    .unwrap();
    FacetEngine::new().with_classifier(Arc::new(classifier))
}

fn bench_compute(c: &mut Criterion) {
    let engine = engine();
    let mut group = c.benchmark_group("facet_compute");

    for size in [1_000, 5_000, 20_000].iter() {
        let catalog = synthetic_catalog(*size);

        let mut state = FilterState::new();
        state.set_selected_values(FacetDimension::Creator, &["Alice", "Dana"]);
        state.set_selected_values(FacetDimension::Category, &["Scenes", "Hair"]);
        state.search_text = "package".to_string();

        group.bench_with_input(BenchmarkId::new("flat", size), &catalog, |b, catalog| {
            b.iter(|| engine.compute(black_box(catalog), black_box(&state)))
        });

        let cascading = state.clone().with_cascade_mode(true);
        group.bench_with_input(BenchmarkId::new("cascading", size), &catalog, |b, catalog| {
            b.iter(|| engine.compute(black_box(catalog), black_box(&cascading)))
        });
    }

    group.finish();
}

fn bench_filter_only(c: &mut Criterion) {
    let engine = engine();
    let catalog = synthetic_catalog(20_000);
    let mut state = FilterState::new();
    state.set_selected_values(FacetDimension::Status, &["Loaded", "Duplicate"]);

    c.bench_function("filter_20k_status", |b| {
        b.iter(|| engine.filter_indices(black_box(&catalog), black_box(&state)))
    });
}

criterion_group!(benches, bench_compute, bench_filter_only);
criterion_main!(benches);
