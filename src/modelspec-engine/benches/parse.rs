// Copyright 2026 The Modelspec Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Parser benchmarks over representative model specifications.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use modelspec_engine::parse;

static SPECS: &[(&str, &str)] = &[
    ("plain", "y ~ x1 + x2 + x3"),
    ("conditioned", "y | diabetes = 0, male ~ age + bmi + smoking"),
    (
        "gwas",
        "[tte=t, event=e] | g(rs12345) ~ age + factor(site) as site + ln(bmi) + pow(age, 2) + g(rs6789) * sex + SNPs",
    ),
];

fn parse_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for (name, spec) in SPECS {
        group.bench_with_input(BenchmarkId::from_parameter(name), spec, |b, spec| {
            b.iter(|| parse(black_box(spec)).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, parse_benchmark);
criterion_main!(benches);
