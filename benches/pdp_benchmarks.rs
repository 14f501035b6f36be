use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pardep::data::{Column, Frame, Value};
use pardep::interpreter::InterpreterBuilder;
use pardep::model::LinearModel;
use pardep::predictor::{Predictor, Task};
use pardep::utils::{fast_sum, interpolate, linspace};
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Duration;

fn synthetic_predictor(rows: usize) -> Arc<Predictor> {
    let mut rng = StdRng::seed_from_u64(0);
    let x: Vec<f64> = (0..rows).map(|_| rng.gen_range(0.0..10.0)).collect();
    let w: Vec<f64> = (0..rows).map(|_| rng.gen_range(-1.0..1.0)).collect();
    let c: Vec<String> = (0..rows)
        .map(|_| ["a", "b", "c", "d"][rng.gen_range(0..4)].to_string())
        .collect();
    let y: Vec<f64> = x.iter().zip(w.iter()).map(|(x, w)| 2.0 * x - w).collect();
    let data = Frame::new(vec![
        ("x", Column::Numeric(x)),
        ("w", Column::Numeric(w)),
        ("c", Column::Categorical(c)),
        ("y", Column::Numeric(y)),
    ])
    .unwrap();
    let model = LinearModel::new(0.5)
        .set_coefficient("x", 2.0)
        .set_coefficient("w", -1.0)
        .set_level_offset("c", "b", 1.0)
        .set_level_offset("c", "d", -2.0);
    Arc::new(Predictor::new(model, data, "y", Task::Regression).unwrap())
}

pub fn pdp_benchmarks(c: &mut Criterion) {
    let v: Vec<f64> = vec![10.; 300000];
    c.bench_function("fast sum", |b| b.iter(|| fast_sum(black_box(&v))));

    let grid = linspace(0.0, 10.0, 51);
    let values: Vec<f64> = grid.iter().map(|g| g * g).collect();
    c.bench_function("interpolate", |b| {
        b.iter(|| interpolate(black_box(&grid), black_box(&values), black_box(3.3)))
    });

    let predictor = synthetic_predictor(2_000);
    let mut interpreter_build = c.benchmark_group("build_interpreter");
    interpreter_build.warm_up_time(Duration::from_secs(5));
    interpreter_build.sample_size(20);
    interpreter_build.bench_function("build_1d_serial", |b| {
        b.iter(|| {
            InterpreterBuilder::new(black_box(predictor.clone()))
                .set_parallel(false)
                .build()
                .unwrap()
        })
    });
    interpreter_build.bench_function("build_1d_parallel", |b| {
        b.iter(|| InterpreterBuilder::new(black_box(predictor.clone())).build().unwrap())
    });
    interpreter_build.bench_function("build_with_pair", |b| {
        b.iter(|| {
            InterpreterBuilder::new(black_box(predictor.clone()))
                .set_pairs(&[("x", "w")])
                .build()
                .unwrap()
        })
    });
    interpreter_build.finish();

    let interpreter = InterpreterBuilder::new(predictor).set_pairs(&[("x", "c")]).build().unwrap();
    c.bench_function("evaluate_1d", |b| {
        b.iter(|| interpreter.evaluate(black_box("x"), black_box(&Value::Number(4.2))).unwrap())
    });
    c.bench_function("evaluate_2d", |b| {
        b.iter(|| {
            interpreter
                .evaluate_2d(
                    black_box("x"),
                    black_box(&Value::Number(4.2)),
                    black_box("c"),
                    black_box(&Value::from("b")),
                )
                .unwrap()
        })
    });
}

criterion_group!(benches, pdp_benchmarks);
criterion_main!(benches);
