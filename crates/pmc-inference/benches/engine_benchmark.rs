use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use pmc_core::EmpiricalSample;
use pmc_inference::statistics;
use pmc_inference::{
    GaussianKde, Histogram, Op, PredictiveCheck, Tail, highest_density_region, sample,
    sample_parallel,
};
use pmc_prob::{Family, Gamma};
use std::hint::black_box;
use std::time::Duration;

fn bench_sampling(c: &mut Criterion) {
    let g = Gamma::new(68.0, 45.0).unwrap();
    let mut group = c.benchmark_group("sampling");
    for n in [10_000usize, 100_000] {
        group.bench_with_input(BenchmarkId::new("sequential", n), &n, |b, &n| {
            b.iter(|| black_box(sample(&g, n, Some(1)).unwrap()))
        });
        group.bench_with_input(BenchmarkId::new("parallel", n), &n, |b, &n| {
            b.iter(|| black_box(sample_parallel(&g, n, Some(1)).unwrap()))
        });
    }
    group.finish();
}

fn bench_transform(c: &mut Criterion) {
    let x = sample(&Gamma::new(219.0, 112.0).unwrap(), 100_000, Some(1)).unwrap();
    let y = sample(&Gamma::new(68.0, 45.0).unwrap(), 100_000, Some(2)).unwrap();
    c.bench_function("ratio_100k", |b| b.iter(|| black_box(Op::Ratio.apply(&[&x, &y]).unwrap())));
}

fn bench_hdr(c: &mut Criterion) {
    let s = sample(&Gamma::new(2.0, 1.0).unwrap(), 50_000, Some(3)).unwrap();
    let mut group = c.benchmark_group("hdr");
    group.measurement_time(Duration::from_secs(10));
    group.bench_function("kde_512", |b| {
        b.iter(|| black_box(highest_density_region(&s, 0.9, &GaussianKde::default()).unwrap()))
    });
    group.bench_function("histogram_fd", |b| {
        b.iter(|| black_box(highest_density_region(&s, 0.9, &Histogram::default()).unwrap()))
    });
    group.finish();
}

fn bench_predictive_check(c: &mut Criterion) {
    let lambda = EmpiricalSample::observed(vec![4.0; 1_000]).unwrap();
    let observed: Vec<f64> = (0..50).map(|i| (i % 9) as f64).collect();
    let pc = PredictiveCheck::new(Tail::TwoSided, Some(7));
    c.bench_function("ppc_poisson_1000x50", |b| {
        b.iter(|| {
            black_box(
                pc.check(&[&lambda], &Family::Poisson, &observed, &statistics::variance).unwrap(),
            )
        })
    });
}

criterion_group!(benches, bench_sampling, bench_transform, bench_hdr, bench_predictive_check);
criterion_main!(benches);
