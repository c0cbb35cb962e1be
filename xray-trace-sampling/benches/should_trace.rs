// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use xray_trace_sampling::{wildcard_match, LocalizedStrategy};

struct BenchmarkConfig {
    name: &'static str,
    manifest: &'static str,
    service_name: &'static str,
    url_path: &'static str,
    http_method: &'static str,
    should_keep: Option<bool>,
}

fn create_benchmark_configs() -> Vec<BenchmarkConfig> {
    vec![
        // 1. Bundled rules, default rule decides
        BenchmarkConfig {
            name: "default_rule_only",
            manifest: r#"{"version":1,"default":{"fixed_target":1,"rate":0.05},"rules":[]}"#,
            service_name: "checkout",
            url_path: "/cart/items",
            http_method: "GET",
            should_keep: None,
        },
        // 2. Reservoir exhausted, rate always drops
        BenchmarkConfig {
            name: "always_drop",
            manifest: r#"{"version":1,"default":{"fixed_target":0,"rate":0},"rules":[]}"#,
            service_name: "checkout",
            url_path: "/cart/items",
            http_method: "GET",
            should_keep: Some(false),
        },
        // 3. First rule matching with literal patterns
        BenchmarkConfig {
            name: "literal_rule_matching",
            manifest: r#"{"version":1,"default":{"fixed_target":0,"rate":0},"rules":[
                {"service_name":"checkout","url_path":"/health","http_method":"GET","fixed_target":0,"rate":1}
            ]}"#,
            service_name: "CHECKOUT",
            url_path: "/health",
            http_method: "get",
            should_keep: Some(true),
        },
        // 4. Many wildcard rules, none matching
        BenchmarkConfig {
            name: "wildcard_rules_not_matching",
            manifest: r#"{"version":1,"default":{"fixed_target":0,"rate":1},"rules":[
                {"service_name":"billing-*","url_path":"/invoices/*/lines/*","http_method":"*","fixed_target":0,"rate":0},
                {"service_name":"*-worker","url_path":"*/jobs/?","http_method":"POST","fixed_target":0,"rate":0},
                {"service_name":"*","url_path":"/admin/*","http_method":"*","fixed_target":0,"rate":0},
                {"service_name":"*","url_path":"*.php","http_method":"*","fixed_target":0,"rate":0}
            ]}"#,
            service_name: "checkout-api",
            url_path: "/cart/items/42",
            http_method: "PUT",
            should_keep: Some(true),
        },
    ]
}

fn bench_should_trace(c: &mut Criterion) {
    for config in create_benchmark_configs() {
        let strategy = match LocalizedStrategy::from_slice(config.manifest.as_bytes()) {
            Ok(strategy) => strategy,
            Err(e) => panic!("invalid benchmark manifest {}: {e}", config.name),
        };

        c.bench_function(&format!("should_trace/{}", config.name), |b| {
            b.iter(|| {
                bench_decision(
                    &strategy,
                    config.service_name,
                    config.url_path,
                    config.http_method,
                    config.should_keep,
                )
            })
        });
    }
}

#[inline(never)]
fn bench_decision(
    strategy: &LocalizedStrategy,
    service_name: &str,
    url_path: &str,
    http_method: &str,
    should_keep: Option<bool>,
) {
    let keep = black_box(strategy).should_trace(
        black_box(service_name),
        black_box(url_path),
        black_box(http_method),
    );
    if let Some(should_keep) = should_keep {
        assert_eq!(keep, should_keep);
    }
    black_box(keep);
}

fn bench_wildcard_match(c: &mut Criterion) {
    let cases = [
        ("literal", "/api/v1/orders", "/API/V1/ORDERS"),
        ("trailing_star", "/api/*", "/api/v1/orders/42/lines"),
        ("multi_star", "*a*b*c*d*", "xxaxxbxxcxxdxx-but-much-longer-text"),
        ("question_marks", "/orders/??/lines/?", "/orders/42/lines/7"),
    ];

    for (name, pattern, text) in cases {
        c.bench_function(&format!("wildcard_match/{name}"), |b| {
            b.iter(|| wildcard_match(black_box(pattern), black_box(text), true))
        });
    }
}

criterion_group!(
    name = wall_time_benches;
    config = Criterion::default();
    targets = bench_should_trace, bench_wildcard_match
);
criterion_main!(wall_time_benches);
