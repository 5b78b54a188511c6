//! Benchmarks for parsing and formatting Agency programs.
//!
//! Run with: cargo bench -p agency-parser
//! Results are saved to target/criterion/

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

const FIXTURES: &[(&str, &str)] = &[
    ("hello", include_str!("../tests/fixtures/hello.agency")),
    ("weather", include_str!("../tests/fixtures/weather.agency")),
    ("approvals", include_str!("../tests/fixtures/approvals.agency")),
];

/// A synthetic program with `n` functions and a node calling each of them.
fn synthetic_program(n: usize) -> String {
    let mut source = String::new();
    for i in 0..n {
        source.push_str(&format!(
            "def step{i}(input: string): string {{\n  result = `Process ${{input}} in step {i}`\n  return result\n}}\n\n"
        ));
    }
    source.push_str("node main(input: string) {\n");
    for i in 0..n {
        source.push_str(&format!("  out{i} = step{i}(input)\n"));
    }
    source.push_str("}\n");
    source
}

fn bench_fixtures(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_fixture");
    for (name, source) in FIXTURES {
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::new("parse", name), source, |b, source| {
            b.iter(|| black_box(agency_parser::parse(source)));
        });
    }
    group.finish();
}

fn bench_synthetic(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_synthetic");
    for size in [10, 50, 200] {
        let source = synthetic_program(size);
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::new("parse", size), &source, |b, source| {
            b.iter(|| black_box(agency_parser::parse(source)));
        });
        group.bench_with_input(
            BenchmarkId::new("parse_format", size),
            &source,
            |b, source| {
                b.iter(|| {
                    if let Ok(program) = agency_parser::parse(source) {
                        black_box(agency_parser::serialize(&program));
                    }
                });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_fixtures, bench_synthetic);
criterion_main!(benches);
