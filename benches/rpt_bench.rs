use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use rmqtt_rpt::Rpt;
use std::hint::black_box;
use std::time::Duration;

const SEC: i64 = 1_000_000_000;

fn filled(size: usize) -> Rpt {
    let mut rpt = Rpt::new(size, Duration::from_secs(1)).unwrap();
    for i in 0..size as i64 {
        rpt.add_requests_at_nanos(i as u64, i * SEC).unwrap();
    }
    rpt
}

fn bench_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("add");
    group.throughput(Throughput::Elements(1));

    group.bench_function("add_requests_next_slot", |b| {
        let mut rpt = Rpt::new(60, Duration::from_secs(1)).unwrap();
        let mut n = 0i64;
        b.iter(|| {
            rpt.add_requests_at_nanos(black_box(n as u64), n * SEC).unwrap();
            n += 1;
        });
    });

    group.bench_function("add_requests_same_slot", |b| {
        let mut rpt = Rpt::new(60, Duration::from_secs(1)).unwrap();
        b.iter(|| {
            rpt.add_requests_at_nanos(black_box(1), 0).unwrap();
        });
    });

    group.bench_function("add_request_now", |b| {
        let mut rpt = Rpt::new(60, Duration::from_secs(1)).unwrap();
        b.iter(|| {
            rpt.add_request().unwrap();
        });
    });

    group.finish();
}

fn bench_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("query");
    let rpt = filled(100);

    group.bench_function("get", |b| b.iter(|| black_box(rpt.get())));
    group.bench_function("range", |b| b.iter(|| black_box(rpt.range(-90, -10))));

    group.finish();
}

criterion_group!(benches, bench_add, bench_query);
criterion_main!(benches);
