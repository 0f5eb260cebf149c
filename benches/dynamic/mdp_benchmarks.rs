use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mdp_planning::env::{random_mdp, CliffWalk};
use mdp_planning::{policy_evaluation, policy_iteration, value_iteration, SolverConfig};

fn bench_cliff_walk(c: &mut Criterion) {
    let mdp = CliffWalk::new(0.6).unwrap().mdp().unwrap();
    let config = SolverConfig::default().with_tolerance(1e-5);

    let mut group = c.benchmark_group("cliff_walk");
    group.bench_function("value_iteration", |b| {
        b.iter(|| value_iteration(black_box(&mdp), &config).unwrap())
    });
    group.bench_function("policy_iteration", |b| {
        b.iter(|| policy_iteration(black_box(&mdp), &config).unwrap())
    });
    group.finish();
}

fn bench_policy_evaluation(c: &mut Criterion) {
    let mut group = c.benchmark_group("policy_evaluation");
    for &num_states in &[16, 64, 256] {
        let mdp = random_mdp(num_states, 4, 0.95, 1).unwrap();
        let policy = vec![0; num_states];
        group.bench_with_input(
            BenchmarkId::from_parameter(num_states),
            &num_states,
            |b, _| b.iter(|| policy_evaluation(black_box(&mdp), black_box(&policy)).unwrap()),
        );
    }
    group.finish();
}

fn bench_value_iteration_scaling(c: &mut Criterion) {
    let config = SolverConfig::default().with_tolerance(1e-6);
    let mut group = c.benchmark_group("value_iteration");
    for &num_states in &[16, 64, 256] {
        let mdp = random_mdp(num_states, 4, 0.9, 1).unwrap();
        group.bench_with_input(
            BenchmarkId::from_parameter(num_states),
            &num_states,
            |b, _| b.iter(|| value_iteration(black_box(&mdp), &config).unwrap()),
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_cliff_walk,
    bench_policy_evaluation,
    bench_value_iteration_scaling
);
criterion_main!(benches);
