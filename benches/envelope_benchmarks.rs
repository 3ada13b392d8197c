use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use marine_axis::api::envelope::{decode_item, decode_page, server_message};
use serde_json::{json, Value};

fn page_body(n: usize) -> Value {
    let items: Vec<Value> = (0..n)
        .map(|i| json!({ "id": format!("p{}", i), "name": "Harbour Tugs", "status": "active" }))
        .collect();
    json!({
        "success": true,
        "data": { "data": items, "pagination": { "page": 1, "limit": n, "total": n * 4 } }
    })
}

fn bench_decode_page(c: &mut Criterion) {
    let small = page_body(10);
    let large = page_body(100);

    c.bench_function("decode_page_10", |b| {
        b.iter(|| decode_page::<Value>(black_box(small.clone()), "/providers"))
    });

    c.bench_function("decode_page_100", |b| {
        b.iter(|| decode_page::<Value>(black_box(large.clone()), "/providers"))
    });
}

fn bench_decode_item(c: &mut Criterion) {
    let body = json!({ "success": true, "data": { "id": "j1", "title": "Hull inspection" } });

    c.bench_function("decode_item", |b| {
        b.iter(|| decode_item::<Value>(black_box(body.clone()), "/jobs/j1"))
    });

    let error = json!({ "success": false, "error": { "message": "Quota exceeded" } });
    c.bench_function("server_message_nested", |b| {
        b.iter(|| server_message(black_box(&error)))
    });
}

criterion_group!(benches, bench_decode_page, bench_decode_item);
criterion_main!(benches);
