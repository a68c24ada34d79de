//! Parser Benchmark for droplatch
//!
//! Measures the command-line parser across the command shapes the
//! server sees in practice.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use droplatch::protocol::parse_line;

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    group.throughput(Throughput::Elements(1));

    group.bench_function("echo", |b| {
        b.iter(|| black_box(parse_line(black_box("echo"))));
    });

    group.bench_function("numeric", |b| {
        b.iter(|| black_box(parse_line(black_box("toggle 3"))));
    });

    group.bench_function("bad_number", |b| {
        b.iter(|| black_box(parse_line(black_box("set banana"))));
    });

    group.bench_function("unrecognized", |b| {
        b.iter(|| black_box(parse_line(black_box("definitely not a command"))));
    });

    group.finish();
}

criterion_group!(benches, bench_parse);
criterion_main!(benches);
