use criterion::{criterion_group, criterion_main, Criterion};
use hangar_cluster::{ClusterStorage, MemoryStorage};
use hangar_schema::Node;
use std::collections::BTreeMap;
use std::time::Duration;

fn populated_storage(count: usize) -> MemoryStorage {
    let storage = MemoryStorage::new();
    for i in 0..count {
        let pool = if i % 2 == 0 { "even" } else { "odd" };
        storage
            .store_node(Node::new(format!("10.0.{}.{}", i / 256, i % 256)).with_metadata("pool", pool))
            .unwrap();
    }
    storage
}

fn bench_store_nodes(c: &mut Criterion) {
    c.bench_function("store_500_nodes", |b| {
        b.iter(|| populated_storage(500));
    });
}

fn bench_metadata_filter(c: &mut Criterion) {
    let storage = populated_storage(1000);
    let filter = BTreeMap::from([("pool".to_owned(), "even".to_owned())]);
    c.bench_function("retrieve_nodes_by_metadata_1000", |b| {
        b.iter(|| storage.retrieve_nodes_by_metadata(&filter).unwrap());
    });
}

fn bench_healing_lock_cycle(c: &mut Criterion) {
    let storage = populated_storage(100);
    c.bench_function("healing_lock_unlock", |b| {
        b.iter(|| {
            assert!(storage
                .lock_node_for_healing("10.0.0.42", false, Duration::from_secs(30))
                .unwrap());
            storage.unlock_node("10.0.0.42").unwrap();
        });
    });
}

criterion_group!(
    benches,
    bench_store_nodes,
    bench_metadata_filter,
    bench_healing_lock_cycle
);
criterion_main!(benches);
