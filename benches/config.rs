// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Benchmarks for configuration loading and merging.
//!
//! Run with: `cargo bench --bench config`

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::fs;
use std::hint::black_box;
use tempfile::TempDir;

use osc::config::{decode, encode, merge_layers, AuthInfo, Cluster, Config, Context, LoadingRules};

/// A document with `n` clusters, users and contexts.
fn sample_config(prefix: &str, n: usize) -> Config {
    let mut config = Config::new();
    for i in 0..n {
        let name = format!("{}-{}", prefix, i);
        config.clusters.insert(
            name.clone(),
            Cluster {
                server: format!("https://{}.example.com:8443", name),
                certificate_authority: "ca.crt".to_string(),
                ..Default::default()
            },
        );
        config.auth_infos.insert(
            name.clone(),
            AuthInfo {
                token: format!("token-{}", i),
                ..Default::default()
            },
        );
        config.contexts.insert(
            name.clone(),
            Context {
                cluster: name.clone(),
                auth_info: name,
                namespace: "default".to_string(),
            },
        );
    }
    config.current_context = format!("{}-0", prefix);
    config
}

/// Benchmark loading through the rules with several files present.
fn bench_config_loading(c: &mut Criterion) {
    let temp = TempDir::new().unwrap();
    let mut rules = LoadingRules::new();
    for tier in 0..3 {
        let path = temp.path().join(format!("config-{}", tier));
        let bytes = encode(&sample_config(&format!("tier{}", tier), 20)).unwrap();
        fs::write(&path, bytes).unwrap();
        rules.append_rule("", path.to_string_lossy().into_owned(), "", "");
    }

    let mut group = c.benchmark_group("config_loading");
    group.throughput(Throughput::Elements(1));

    group.bench_function("load_three_tiers", |b| {
        b.iter(|| black_box(&rules).load());
    });

    let empty = LoadingRules::new();
    group.bench_function("load_no_files", |b| {
        b.iter(|| black_box(&empty).load());
    });

    group.finish();
}

/// Benchmark the merge primitive.
fn bench_config_merging(c: &mut Criterion) {
    let layers: Vec<Config> = (0..5)
        .map(|i| sample_config(if i % 2 == 0 { "even" } else { "odd" }, 50))
        .collect();

    let mut group = c.benchmark_group("config_merging");
    group.throughput(Throughput::Elements(layers.len() as u64));

    group.bench_function("merge_overlapping_layers", |b| {
        b.iter(|| merge_layers(black_box(&layers)));
    });

    group.finish();
}

/// Benchmark the YAML codec.
fn bench_config_codec(c: &mut Criterion) {
    let config = sample_config("codec", 50);
    let yaml = encode(&config).unwrap();

    let mut group = c.benchmark_group("config_codec");

    group.bench_function("encode_yaml", |b| {
        b.iter(|| encode(black_box(&config)));
    });

    group.bench_function("decode_yaml", |b| {
        b.iter(|| decode(black_box(&yaml)));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_config_loading,
    bench_config_merging,
    bench_config_codec
);
criterion_main!(benches);
