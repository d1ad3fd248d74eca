//! Benchmarks for the Witter indexes and store
//!
//! Run with: cargo bench

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use witter::index::{IdentityTable, OrderedIndex, RankList};
use witter::{StoreConfig, Timestamp, User, Weet, Witter};

fn base_time() -> Timestamp {
    Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()
}

/// Pseudo-random but repeatable key order
fn scrambled(count: u32) -> Vec<u32> {
    (0..count).map(|i| i.wrapping_mul(2_654_435_761) % count).collect()
}

fn create_test_store(users: u32, weets: u32) -> Witter {
    let mut store = Witter::new(StoreConfig::default());
    let start = base_time();

    for id in 0..users {
        store.add_user(User::new(id, format!("user{}", id), start + Duration::hours(id as i64)));
    }
    for id in 1..users {
        for step in [1, 7, 31] {
            let followee = (id + step) % users;
            if followee != id {
                store
                    .add_follower(id, followee, start + Duration::minutes(id as i64))
                    .expect("bench setup");
            }
        }
    }
    for id in 0..weets {
        let text = format!("weet {} #tag{}", id, id % 25);
        store
            .add_weet(Weet::new(id, id % users, text, start + Duration::minutes(id as i64 * 7)))
            .expect("bench setup");
    }

    store
}

fn bench_ordered_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("ordered_index");

    for size in [1_000u32, 10_000, 100_000] {
        let keys = scrambled(size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("insert_{}", size), |b| {
            b.iter(|| {
                let mut index = OrderedIndex::new();
                for &key in &keys {
                    index.insert(key, key);
                }
                black_box(index.height())
            })
        });

        let mut index = OrderedIndex::new();
        for &key in &keys {
            index.insert(key, key);
        }

        group.bench_function(format!("search_{}", size), |b| {
            b.iter(|| {
                for &key in keys.iter().take(1000) {
                    black_box(index.search(&key));
                }
            })
        });

        group.bench_function(format!("iter_rev_{}", size), |b| {
            b.iter(|| black_box(index.iter_rev().count()))
        });
    }

    group.finish();
}

fn bench_identity_table(c: &mut Criterion) {
    let mut group = c.benchmark_group("identity_table");
    let start = base_time();

    group.bench_function("insert_10000", |b| {
        b.iter_batched(
            || (0..10_000).map(|id| User::new(id, "u", start)).collect::<Vec<_>>(),
            |users| {
                let mut table = IdentityTable::new();
                for user in users {
                    table.insert_if_absent(user);
                }
                black_box(table.len())
            },
            BatchSize::SmallInput,
        )
    });

    let mut table = IdentityTable::new();
    for id in 0..10_000 {
        table.insert_if_absent(User::new(id, "u", start));
    }

    group.bench_function("get_10000", |b| {
        b.iter(|| {
            for id in (0..10_000u64).step_by(97) {
                black_box(table.get(id));
            }
        })
    });

    group.finish();
}

fn bench_rank_list(c: &mut Criterion) {
    let labels: Vec<String> = (0..50).map(|i| format!("#tag{}", i)).collect();

    c.bench_function("rank_list_record_10000", |b| {
        b.iter(|| {
            let mut ranks = RankList::new();
            for i in 0..10_000usize {
                ranks.record(&labels[(i * i) % labels.len()]);
            }
            black_box(ranks.top(10))
        })
    });
}

fn bench_store(c: &mut Criterion) {
    let mut group = c.benchmark_group("store");
    let store = create_test_store(2_000, 20_000);
    let day = NaiveDate::from_ymd_opt(2020, 1, 15).unwrap();

    group.bench_function("get_weets", |b| b.iter(|| black_box(store.weets().get_weets().len())));

    group.bench_function("get_weets_on", |b| {
        b.iter(|| black_box(store.weets().get_weets_on(black_box(day)).len()))
    });

    group.bench_function("is_a_follower", |b| {
        b.iter(|| {
            for id in 1..500 {
                black_box(store.follows().is_a_follower(id, (id + 7) % 2_000));
            }
        })
    });

    group.bench_function("mutual_followers", |b| {
        b.iter(|| black_box(store.follows().get_mutual_followers(black_box(100), black_box(101))))
    });

    group.bench_function("top_users", |b| b.iter(|| black_box(store.follows().get_top_users())));

    group.finish();
}

criterion_group!(benches, bench_ordered_index, bench_identity_table, bench_rank_list, bench_store);
criterion_main!(benches);
