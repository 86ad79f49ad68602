//! # Operation Engine Benchmarks
//!
//! | Group | Measures |
//! |-------|----------|
//! | `transfer` | pre-process plus process of one transfer by item count |
//! | `decode` | hinted JSON to `Operation` through the standard registry |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ledger_operations::prelude::*;
use ledger_tests::fixtures::*;
use std::time::Duration;

fn wide_transfer(ledger: &Ledger, items: u32) -> Operation {
    let alice_kp = keypair(1);
    let alice = ledger.fund(&alice_kp, u64::MAX / 2);
    let items = (0..items)
        .map(|i| TransferItem::new(ledger.fund(&keypair(10 + i), 0), vec![amount(1)]))
        .collect();
    ledger.sign(TransferFact::new("bench", alice, items), &alice_kp)
}

fn bench_transfer(c: &mut Criterion) {
    let mut group = c.benchmark_group("transfer");
    group.measurement_time(Duration::from_secs(5));

    for size in [1u32, 10, 100, 1000] {
        let ledger = Ledger::new();
        let op = wide_transfer(&ledger, size);
        let ctx = ProcessContext::new(1);

        group.throughput(Throughput::Elements(u64::from(size)));
        group.bench_with_input(BenchmarkId::new("pre_process_and_process", size), &op, |b, op| {
            b.iter(|| {
                ledger.engine.pre_process(&ctx, op, &*ledger.store).unwrap();
                black_box(ledger.engine.process(&ctx, op, &*ledger.store).unwrap())
            })
        });
    }

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    for size in [1u32, 100] {
        let ledger = Ledger::new();
        let json = wide_transfer(&ledger, size).to_json().unwrap();

        group.throughput(Throughput::Elements(u64::from(size)));
        group.bench_with_input(BenchmarkId::new("transfer", size), &json, |b, json| {
            b.iter(|| black_box(registry().decode(json).unwrap()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_transfer, bench_decode);
criterion_main!(benches);
