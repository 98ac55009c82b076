use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use serde::{Deserialize, Serialize};

use kindstore::{InMemoryEntityStore, KindManager, ManagerConfig, QueryParams, SortOrder};

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Reading {
    ref_id: String,
    timestamp: i64,
    status: String,
}

fn make_manager_with_data() -> KindManager {
    let store = Arc::new(InMemoryEntityStore::new());
    let config = ManagerConfig::default().with_warn_unbounded(false);
    let manager = KindManager::with_config(store, "Reading", config).unwrap();

    // 2048 readings split across two ref ids with scrambled timestamps.
    for i in 0..2048i64 {
        let reading = Reading {
            ref_id: if i % 2 == 0 { "ref-a" } else { "ref-b" }.to_string(),
            timestamp: (i * 7919) % 2048,
            status: "Sent".to_string(),
        };
        manager.create("", 0, &reading).unwrap();
    }
    manager
}

fn bench_index_window(c: &mut Criterion) {
    let manager = make_manager_with_data();
    let params = QueryParams::new("RefId", "=", "ref-a")
        .with_sort("Timestamp", SortOrder::Ascending)
        .with_window(0, 50);

    let mut group = c.benchmark_group("query_modes");
    group.throughput(Throughput::Elements(50));
    group.bench_function("index_window_50", |b| {
        b.iter(|| {
            let page: Vec<Reading> = manager.query(&params).unwrap();
            page.len()
        });
    });
    group.finish();
}

fn bench_accumulate_all(c: &mut Criterion) {
    let manager = make_manager_with_data();
    let params = QueryParams::new("RefId", "=", "ref-b")
        .with_sort("Timestamp", SortOrder::Descending);

    let mut group = c.benchmark_group("query_modes");
    group.throughput(Throughput::Elements(1024));
    group.bench_function("accumulate_all_1024", |b| {
        b.iter(|| {
            let all: Vec<Reading> = manager.get_all(&params).unwrap();
            all.len()
        });
    });
    group.finish();
}

criterion_group!(query_modes, bench_index_window, bench_accumulate_all);
criterion_main!(query_modes);
