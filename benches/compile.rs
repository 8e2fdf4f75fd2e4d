use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use md5_sat::{md5, Circuit, CircuitConfig, SolveConfig};

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");
    for rounds in [1, 4] {
        let config = CircuitConfig::default().with_rounds(rounds);
        group.bench_with_input(BenchmarkId::new("rounds", rounds), &config, |b, config| {
            b.iter(|| Circuit::compile_with(black_box(512), &[], config).unwrap())
        });
    }
    group.finish();
}

fn bench_fixed_input_solve(c: &mut Criterion) {
    let padded = md5::pad(b"The quick brown fox jumps over the lazy dog");
    let mut circuit = Circuit::compile(512, &[]).unwrap();
    circuit.fix_input(&padded, &[]).unwrap();
    let config = SolveConfig::default().with_verify(false);

    let mut group = c.benchmark_group("solve");
    group.sample_size(10);
    group.bench_function("fixed_input", |b| {
        b.iter(|| circuit.solve(black_box(&config)).unwrap())
    });
    group.finish();
}

criterion_group!(benches, bench_compile, bench_fixed_input_solve);
criterion_main!(benches);
