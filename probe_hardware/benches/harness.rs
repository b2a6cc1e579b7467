use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use probe_core::DriverCfg;
use probe_hardware::{FaultPlan, SimulationHarness, Stimulus, TemperatureProfile};

fn bench_closed_loop(c: &mut Criterion) {
    let mut group = c.benchmark_group("closed_loop");

    for &ticks in &[1_000u64, 10_000] {
        group.bench_with_input(BenchmarkId::new("calm", ticks), &ticks, |b, &n| {
            b.iter(|| {
                let mut h = SimulationHarness::new(DriverCfg::default());
                for t in 0..n {
                    black_box(h.tick(Stimulus::calm(20 + (t % 5) as i32)));
                }
            })
        });

        group.bench_with_input(BenchmarkId::new("bursty", ticks), &ticks, |b, &n| {
            let plan = FaultPlan::none().with_burst(17, 3).unwrap();
            let profile = TemperatureProfile::Ramp {
                start: 0,
                step: 1,
                every: 7,
            };
            b.iter(|| {
                let mut h = SimulationHarness::new(DriverCfg::default());
                black_box(h.run(&plan, &profile, n));
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_closed_loop);
criterion_main!(benches);
