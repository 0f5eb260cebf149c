//! Solves Cliff Walk with value iteration and policy iteration and checks
//! that both reach the same policy.

use std::time::Instant;

use clap::Parser;
use log::{info, LevelFilter};
use mdp_planning::env::CliffWalk;
use mdp_planning::mdp::max_abs_diff;
use mdp_planning::{policy_evaluation, policy_iteration, value_iteration, SolverConfig};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Probability that an action moves in its intended direction
    #[arg(long, default_value_t = 0.6)]
    proba_succ: f64,
    /// Discount factor
    #[arg(long, default_value_t = CliffWalk::DEFAULT_GAMMA)]
    gamma: f64,
    /// Stopping tolerance shared by both solvers
    #[arg(long, default_value_t = 1e-5)]
    tol: f64,
    #[arg(long, default_value_t = 10_000)]
    max_iterations: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Args::parse();
    let mdp = CliffWalk::new(args.proba_succ)?.with_gamma(args.gamma).mdp()?;
    let config = SolverConfig::default()
        .with_tolerance(args.tol)
        .with_max_iterations(args.max_iterations);

    let started = Instant::now();
    let vi = value_iteration(&mdp, &config)?;
    let greedy_values = policy_evaluation(&mdp, &vi.policy)?;
    info!(
        "value iteration: {} backups in {:?}",
        vi.iterations,
        started.elapsed()
    );

    let errors = vi.convergence_errors(&greedy_values)?;
    if let (Some(first), Some(last)) = (errors.first(), errors.last()) {
        info!("value iteration error: {first:.4e} -> {last:.4e}");
    }

    let started = Instant::now();
    let pi = policy_iteration(&mdp, &config)?;
    info!(
        "policy iteration: {} evaluations in {:?}",
        pi.iterations,
        started.elapsed()
    );

    println!("[VI] greedy policy: {:?}", vi.policy);
    println!("[PI] final policy:  {:?}", pi.policy);

    if vi.policy != pi.policy {
        return Err("value iteration and policy iteration disagree on the policy".into());
    }
    let gap = max_abs_diff(&greedy_values, &pi.values);
    if gap > 1e-6 {
        return Err(format!("policies match but values differ by {gap:e}").into());
    }
    info!("both solvers agree (max value gap {gap:.2e})");
    Ok(())
}
