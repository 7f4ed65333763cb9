use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tameike::{
    ChaoSampler, EfraimidisSampler, LiLSampler, SequentialPoissonSampler, VitterXSampler,
    VitterZSampler, WatermanSampler,
};

fn bench_uniform_reservoir(c: &mut Criterion) {
    let mut group = c.benchmark_group("reservoir");

    let sizes = [1_000, 10_000, 100_000];
    let k = 100;

    for &size in &sizes {
        group.bench_function(format!("waterman_n{}_k{}", size, k), |b| {
            b.iter(|| {
                let mut sampler = WatermanSampler::<_>::new(k).unwrap();
                for i in 0..size {
                    sampler.feed(black_box(i)).unwrap();
                }
                black_box(sampler.sample());
            })
        });
    }

    for &size in &sizes {
        group.bench_function(format!("vitter_x_n{}_k{}", size, k), |b| {
            b.iter(|| {
                let mut sampler = VitterXSampler::<_>::new(k).unwrap();
                for i in 0..size {
                    sampler.feed(black_box(i)).unwrap();
                }
                black_box(sampler.sample());
            })
        });
    }

    // The skip-based variants should stay fast as N grows.
    for &size in &sizes {
        group.bench_function(format!("vitter_z_n{}_k{}", size, k), |b| {
            b.iter(|| {
                let mut sampler = VitterZSampler::<_>::new(k).unwrap();
                for i in 0..size {
                    sampler.feed(black_box(i)).unwrap();
                }
                black_box(sampler.sample());
            })
        });
    }

    for &size in &sizes {
        group.bench_function(format!("li_l_n{}_k{}", size, k), |b| {
            b.iter(|| {
                let mut sampler = LiLSampler::<_>::new(k).unwrap();
                for i in 0..size {
                    sampler.feed(black_box(i)).unwrap();
                }
                black_box(sampler.sample());
            })
        });
    }
    group.finish();
}

fn bench_weighted_reservoir(c: &mut Criterion) {
    let mut group = c.benchmark_group("weighted_reservoir");

    let sizes = [1_000, 10_000, 100_000];
    let k = 100;

    for &size in &sizes {
        group.bench_function(format!("a_res_n{}_k{}", size, k), |b| {
            b.iter(|| {
                let mut sampler = EfraimidisSampler::<_>::new(k).unwrap();
                for i in 0..size {
                    sampler.feed_weighted(black_box(i), 1.0).unwrap();
                }
                black_box(sampler.sample().count());
            })
        });
    }

    for &size in &sizes {
        group.bench_function(format!("seq_poisson_n{}_k{}", size, k), |b| {
            b.iter(|| {
                let mut sampler = SequentialPoissonSampler::<_>::new(k).unwrap();
                for i in 0..size {
                    sampler.feed_weighted(black_box(i), 1.0).unwrap();
                }
                black_box(sampler.sample().count());
            })
        });
    }
    group.finish();
}

fn bench_chao(c: &mut Criterion) {
    let mut group = c.benchmark_group("chao");

    let sizes = [1_000, 10_000];
    let k = 100;

    for &size in &sizes {
        group.bench_function(format!("proportional_n{}_k{}", size, k), |b| {
            b.iter(|| {
                let mut sampler = ChaoSampler::<_>::new(k).unwrap();
                for i in 0..size {
                    sampler
                        .feed_weighted(black_box(i), (i % 17 + 1) as f64)
                        .unwrap();
                }
                black_box(sampler.sample().count());
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_uniform_reservoir,
    bench_weighted_reservoir,
    bench_chao
);
criterion_main!(benches);
