use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use marine_axis::crud::filters::{LIMIT, PAGE, SEARCH, SORT_ORDER, STATUS};
use marine_axis::FilterSet;

fn sample_filters() -> FilterSet {
    FilterSet::new()
        .with(SEARCH, "tug boat & crane")
        .with(STATUS, "active")
        .with(PAGE, "3")
        .with(LIMIT, "25")
        .with(SORT_ORDER, "desc")
}

fn bench_filter_key(c: &mut Criterion) {
    let filters = sample_filters();

    c.bench_function("filter_key", |b| b.iter(|| black_box(&filters).key()));

    c.bench_function("filter_to_query", |b| {
        b.iter(|| black_box(&filters).to_query())
    });
}

fn bench_filter_merge(c: &mut Criterion) {
    let base = sample_filters();
    let partial = FilterSet::new().with(STATUS, "pending").with(SEARCH, "");

    c.bench_function("filter_merge", |b| {
        b.iter(|| {
            let mut filters = base.clone();
            filters.merge(black_box(partial.clone()));
            filters
        })
    });

    c.bench_function("filter_memo_compare", |b| {
        let last = base.key();
        b.iter(|| black_box(&base).key() == last)
    });
}

criterion_group!(benches, bench_filter_key, bench_filter_merge);
criterion_main!(benches);
