//! Stopping power and path benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use dedx::{
    batch, Bps, Cursor, Field, LiPetrasso, Mehlhorn, PartialField, PartialSpecies, Species,
    StoppingPower, Tabulated,
};

fn table() -> Tabulated {
    let rows = (1..=400)
        .map(|i| {
            let e = 0.05 * i as f64;
            (e, 0.1 / (e + 0.5))
        })
        .collect();
    Tabulated::new(rows, 2.7).unwrap()
}

fn plasma() -> LiPetrasso {
    let d = Species::new(2.0, 1.0, 1.0, 1e24);
    LiPetrasso::new(1.007276, 1.0, Field::with_electrons(vec![d], 1.0).unwrap()).unwrap()
}

fn bench_dedx(c: &mut Criterion) {
    let t = table();
    let lp = plasma();

    c.bench_function("tabulated_dedx", |b| {
        b.iter(|| t.dedx(black_box(7.3)))
    });
    c.bench_function("tabulated_dedx_hinted_sweep", |b| {
        b.iter(|| {
            let mut cursor = Cursor::new();
            (1..1000)
                .map(|i| t.dedx_mev_um_hinted(0.05 + 0.0199 * i as f64, &mut cursor).unwrap_or(0.0))
                .sum::<f64>()
        })
    });
    c.bench_function("li_petrasso_dedx", |b| {
        b.iter(|| lp.dedx(black_box(3.0)))
    });

    let bps = Bps::new(1.007276, 1.0, lp.field().clone()).unwrap();
    c.bench_function("bps_dedx", |b| b.iter(|| bps.dedx(black_box(3.0))));

    let carbon = PartialSpecies::new(12.011, 6.0, 0.05, 5e22, 3.0);
    let mehlhorn =
        Mehlhorn::new(1.007276, 1.0, PartialField::new(vec![carbon], 0.05).unwrap()).unwrap();
    c.bench_function("mehlhorn_dedx", |b| b.iter(|| mehlhorn.dedx(black_box(3.0))));
}

fn bench_path(c: &mut Criterion) {
    let t = table();
    let lp = plasma();

    c.bench_function("tabulated_eout", |b| {
        b.iter(|| t.eout(black_box(15.0), black_box(200.0)))
    });
    c.bench_function("tabulated_ein", |b| {
        b.iter(|| t.ein(black_box(10.0), black_box(200.0)))
    });
    c.bench_function("li_petrasso_eout", |b| {
        b.iter(|| lp.eout(black_box(14.7), black_box(100.0)))
    });
}

fn bench_batch(c: &mut Criterion) {
    let t = table();
    let energies: Vec<f64> = (0..10_000).map(|i| 1.0 + 0.0018 * i as f64).collect();

    c.bench_function("batch_range_10k", |b| {
        b.iter(|| batch::range_many(&t, black_box(&energies)))
    });
}

criterion_group!(benches, bench_dedx, bench_path, bench_batch);
criterion_main!(benches);
