//! Hot-path benchmarks for the watcher crate

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use driftsync_core::{FileRecord, SyncConfig};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use watcher::{ChangeAggregator, IgnoreRules};

fn bench_ignore_matching(c: &mut Criterion) {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join(".gitignore"),
        "# build output\ndist/\n/target\n*.log\ncoverage\n.env\n",
    )
    .unwrap();

    let rules = IgnoreRules::load(temp_dir.path(), &SyncConfig::default()).unwrap();
    let root = rules.root().to_path_buf();

    let paths: Vec<(&str, PathBuf)> = vec![
        ("kept_shallow", root.join("main.go")),
        ("kept_deep", root.join("src/api/handlers/users/mod.rs")),
        ("builtin", root.join("web/node_modules/react/index.jsx")),
        ("glob", root.join("logs/server.log")),
        ("rooted", root.join("target/debug/build.rs")),
    ];

    let mut group = c.benchmark_group("ignore_matches");
    for (name, path) in &paths {
        group.bench_with_input(BenchmarkId::from_parameter(name), path, |b, path| {
            b.iter(|| black_box(rules.matches(black_box(path))));
        });
    }
    group.finish();
}

fn bench_aggregation(c: &mut Criterion) {
    let records: Vec<FileRecord> = (0..1_000)
        .map(|i| FileRecord::new(format!("/repo/src/file{}.rs", i % 250), "fn main() {}\n"))
        .collect();

    // 1000 events over 250 distinct files, then one drain
    c.bench_function("aggregate_burst_1k", |b| {
        b.iter(|| {
            let mut changes = ChangeAggregator::new();
            for record in &records {
                changes.record(record.clone());
            }
            black_box(changes.drain())
        });
    });
}

criterion_group!(benches, bench_ignore_matching, bench_aggregation);
criterion_main!(benches);
