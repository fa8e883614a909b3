//! Criterion micro-benchmarks for the ACL codec path.
//!
//! These benchmarks measure:
//! - Encoding DeleteAcls responses, classic vs flexible
//! - Decoding the same responses back into typed messages
//! - Layout resolution (cached after the first call)
//!
//! Run with: `cargo bench --bench codec_bench`

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use kafkaesque_admin::protocol::Message;
use kafkaesque_admin::protocol::messages::{
    DELETE_ACLS_RESPONSE, DeleteAclsFilterResult, DeleteAclsMatchingAcl, DeleteAclsResponseData,
};

fn response(acls: usize) -> DeleteAclsResponseData {
    DeleteAclsResponseData {
        throttle_time_ms: 0,
        filter_results: vec![DeleteAclsFilterResult {
            error_code: 0,
            error_message: None,
            matching_acls: (0..acls)
                .map(|i| DeleteAclsMatchingAcl {
                    error_code: 0,
                    error_message: None,
                    resource_type: 2,
                    resource_name: format!("topic-{}", i),
                    pattern_type: 3,
                    principal: format!("User:service-{}", i % 16),
                    host: "*".to_string(),
                    operation: 3,
                    permission_type: 3,
                })
                .collect(),
        }],
    }
}

/// Benchmark encoding at a classic and a flexible version.
fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("delete_acls_encode");

    for acls in [1, 100, 10_000].iter() {
        let value = response(*acls);
        group.throughput(Throughput::Elements(*acls as u64));

        for version in [1i16, 3] {
            group.bench_with_input(
                BenchmarkId::new(format!("v{}", version), acls),
                acls,
                |b, _| {
                    b.iter(|| black_box(&value).encode(version));
                },
            );
        }
    }

    group.finish();
}

/// Benchmark decoding into typed messages.
fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("delete_acls_decode");

    for acls in [1, 100, 10_000].iter() {
        for version in [1i16, 3] {
            let Ok(bytes) = response(*acls).encode(version) else {
                continue;
            };
            group.throughput(Throughput::Bytes(bytes.len() as u64));
            group.bench_with_input(
                BenchmarkId::new(format!("v{}", version), acls),
                acls,
                |b, _| {
                    b.iter(|| DeleteAclsResponseData::decode(black_box(bytes.clone()), version));
                },
            );
        }
    }

    group.finish();
}

/// Benchmark cached layout lookup.
fn bench_layout(c: &mut Criterion) {
    c.bench_function("layout_resolve_cached", |b| {
        b.iter(|| DELETE_ACLS_RESPONSE.layout(black_box(3)));
    });
}

criterion_group!(benches, bench_encode, bench_decode, bench_layout);
criterion_main!(benches);
