use criterion::{Criterion, black_box, criterion_group, criterion_main};
use seismo_core::registry::{self, Capability, Installation, StaticBackend};
use seismo_core::{Samples, Stats, UtcDateTime};

fn installation() -> Installation {
    let mut installation = Installation::new();
    for (module, prefix) in [("seismo.mseed", "mseed"), ("seismo.wav", "wav")] {
        installation.install(
            module,
            StaticBackend::new()
                .with(&format!("is_{prefix}"), Capability::detect(|data| !data.is_empty()))
                .with(
                    &format!("read_{prefix}"),
                    Capability::read(|_| Ok((Samples::default(), Stats::new()))),
                )
                .with(&format!("write_{prefix}"), Capability::write(|_, _, _| Ok(()))),
        );
    }
    installation
}

fn bench_time(c: &mut Criterion) {
    let mut group = c.benchmark_group("time");

    group.bench_function("from_timestamp", |b| {
        b.iter(|| UtcDateTime::from_timestamp(black_box(1240561632.005)).unwrap())
    });

    let t = UtcDateTime::new(2009, 4, 24, 8, 27, 12, 5000).unwrap();
    group.bench_function("to_epoch", |b| b.iter(|| black_box(t).to_epoch()));

    group.finish();
}

fn bench_stats(c: &mut Criterion) {
    let mut group = c.benchmark_group("stats");

    group.bench_function("new", |b| b.iter(Stats::new));
    group.bench_function("with_initial", |b| {
        b.iter(|| Stats::with_initial(black_box([("station", "ROTZ"), ("network", "BW")])))
    });

    let stats = Stats::new();
    group.bench_function("get", |b| b.iter(|| black_box(&stats).get("sampling_rate")));

    group.finish();
}

fn bench_discover(c: &mut Criterion) {
    let installation = installation();
    let mut group = c.benchmark_group("registry");

    group.bench_function("discover/2of3", |b| {
        b.iter(|| registry::discover(black_box(&installation), false))
    });

    let discovery = registry::discover(&installation, false);
    group.bench_function("detect", |b| {
        b.iter(|| discovery.detect(black_box(b"WAVE")).map(|f| f.name()))
    });

    group.finish();
}

criterion_group!(benches, bench_time, bench_stats, bench_discover);
criterion_main!(benches);
