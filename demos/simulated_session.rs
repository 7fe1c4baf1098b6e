//! A full interactive session against a simulated user.
//!
//! Generates a 20-attribute table, hides a utility function that only cares about
//! three attributes, and lets the session discover them and recommend a tuple.
//!
//! Pass a point file path to use real data instead (header `<count> <dim>`).
//! `DATA_DIR` and `SESSION_ID` select where the session record is written when
//! `RECORD_SESSION` is set.
//!
//! Run: `RUST_LOG=debug cargo run --example simulated_session`

use interactive_regret::config::{seeded_rng, HighDimConfig, MaxUtilityConfig, SelectionStrategy};
use interactive_regret::dataset::Dataset;
use interactive_regret::geometry::dot;
use interactive_regret::presenter::SimulatedUser;
use interactive_regret::session::SessionLog;
use interactive_regret::{InteractiveHighDim, PointSet};
use rand::prelude::*;
use tracing_subscriber::EnvFilter;

fn synthetic(dim: usize, n: usize, seed: u64) -> PointSet {
    let mut rng = StdRng::seed_from_u64(seed);
    let rows = (0..n)
        .map(|_| (0..dim).map(|_| rng.random_range(0.0..1000.0)).collect())
        .collect();
    PointSet::from_rows(dim, rows).expect("synthetic rows are well formed")
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let data = match std::env::args().nth(1) {
        Some(path) => Dataset::load(path)?,
        None => Dataset::from_points(synthetic(20, 2000, 1)),
    };
    let dim = data.raw.dim();
    println!(
        "=== {} tuples, {} attributes, {} on the skyline ===\n",
        data.raw.len(),
        dim,
        data.skyline.len()
    );

    // Hidden preferences: attributes 2, 9 and 15 (or the first three if fewer).
    let mut utility = vec![0.0; dim];
    for (k, weight) in [(2, 0.5), (9, 0.3), (15, 0.2)] {
        utility[k.min(dim - 1)] += weight;
    }

    let config = HighDimConfig::default()
        .with_seed(11)
        .with_max_utility(MaxUtilityConfig::default().with_selection(SelectionStrategy::Simplex));
    let mut rng = seeded_rng(config.seed);
    let mut user = SimulatedUser::new(utility.clone(), &data.normalized);

    let mut session = InteractiveHighDim::from_dataset(&data, config);
    if std::env::var_os("RECORD_SESSION").is_some() {
        session = session.with_session_log(SessionLog::from_env());
    }
    let output = session.run(&mut user, &mut rng)?;

    println!("final attributes:   {:?}", output.final_dimensions);
    println!("questions asked:    {}", output.questions_asked);
    println!("output mode:        {:?}", output.mode);
    println!(
        "time (narrow/rec.): {:?} / {:?}",
        output.narrowing_time, output.recommendation_time
    );
    if let Some(mu) = &output.max_utility {
        println!(
            "max-utility:        {} questions, {} candidates left, regret bound {:.4}",
            mu.questions_asked, mu.candidates_left, mu.regret_bound
        );
    }

    let true_best = data
        .normalized
        .points()
        .iter()
        .max_by(|a, b| dot(&utility, &a.coords).total_cmp(&dot(&utility, &b.coords)))
        .map(|p| p.id);
    println!("\nrecommended:");
    for p in output.points.points().iter().take(10) {
        let score = user.utility_of(p.id).unwrap_or_default();
        let mark = if Some(p.id) == true_best { "  <- true favourite" } else { "" };
        println!("  {} utility {:.4}{}", p.id, score, mark);
    }
    Ok(())
}
