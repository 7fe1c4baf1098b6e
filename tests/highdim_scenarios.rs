use interactive_regret::config::seeded_rng;
use interactive_regret::dataset::Dataset;
use interactive_regret::geometry::dot;
use interactive_regret::max_utility::Termination;
use interactive_regret::presenter::SimulatedUser;
use interactive_regret::regret_set::RegretHeuristic;
use interactive_regret::session::{Phase, SessionLog};
use interactive_regret::{
    ConfigError, Error, HighDimConfig, InteractiveHighDim, OutputMode, PointId, PointSet,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::Value;

const DIM: usize = 12;

/// 200 random tuples plus the two extremes of attributes 0 and 1.
fn dataset() -> Dataset {
    let mut rng = StdRng::seed_from_u64(2024);
    let mut rows: Vec<Vec<f64>> = (0..200)
        .map(|_| (0..DIM).map(|_| rng.random_range(0.0..100.0)).collect())
        .collect();
    let mut best_first = vec![50.0; DIM];
    best_first[0] = 150.0;
    best_first[1] = -50.0;
    let mut best_second = vec![50.0; DIM];
    best_second[0] = -50.0;
    best_second[1] = 150.0;
    rows.push(best_first);
    rows.push(best_second);
    Dataset::from_points(PointSet::from_rows(DIM, rows).unwrap())
}

fn utility() -> Vec<f64> {
    let mut u = vec![0.0; DIM];
    u[0] = 0.7;
    u[1] = 0.3;
    u
}

fn config() -> HighDimConfig {
    HighDimConfig::default().with_d_hat(3).with_d_bar(2).with_seed(17)
}

fn recorded_phase(log: &SessionLog) -> Value {
    let text = std::fs::read_to_string(log.path()).unwrap();
    serde_json::from_str::<Value>(&text).unwrap()["phase"].clone()
}

#[test]
fn simulated_user_gets_true_favourite() {
    let data = dataset();
    let dir = tempfile::tempdir().unwrap();
    let log = SessionLog::new(dir.path(), "e2e");
    let u = utility();
    let mut user = SimulatedUser::new(u.clone(), &data.normalized);
    let cfg = config();
    let mut rng = seeded_rng(cfg.seed);

    let output = InteractiveHighDim::from_dataset(&data, cfg)
        .with_session_log(log.clone())
        .run(&mut user, &mut rng)
        .unwrap();

    let favourite = data
        .normalized
        .points()
        .iter()
        .max_by(|a, b| dot(&u, &a.coords).total_cmp(&dot(&u, &b.coords)))
        .map(|p| p.id)
        .unwrap();

    assert_eq!(output.mode, OutputMode::ExactTuple);
    assert_eq!(output.final_dimensions, vec![0, 1]);
    assert_eq!(output.points.ids(), vec![favourite]);
    assert_eq!(output.points.dim(), DIM);
    assert_eq!(output.stopped_in, None);
    let mu = output.max_utility.as_ref().unwrap();
    assert_eq!(mu.termination, Termination::Converged);
    // 4 screening + 3 refinement questions precede the max-utility loop.
    assert_eq!(output.questions_asked, 7 + mu.questions_asked);
    assert_eq!(recorded_phase(&log), 3);
}

#[test]
fn stop_in_screening_falls_back_to_attribute_subset() {
    let data = dataset();
    let dir = tempfile::tempdir().unwrap();
    let log = SessionLog::new(dir.path(), "stop1");
    let mut user = SimulatedUser::new(utility(), &data.normalized).with_stop_after(1);
    let cfg = config();
    let mut rng = seeded_rng(cfg.seed);

    let output = InteractiveHighDim::from_dataset(&data, cfg)
        .with_session_log(log.clone())
        .run(&mut user, &mut rng)
        .unwrap();

    assert_eq!(output.stopped_in, Some(Phase::DimensionScreening));
    assert_eq!(output.mode, OutputMode::RegretSet);
    assert_eq!(output.questions_asked, 1);
    // Nothing was eliminated, so the guard dropped three random attributes.
    assert_eq!(output.final_dimensions.len(), DIM - 3);
    assert_eq!(output.points.len(), 30);
    let mut ids = output.points.ids();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 30);
    assert_eq!(recorded_phase(&log), 1);
}

#[test]
fn stop_in_group_testing_records_phase_two() {
    let data = dataset();
    let dir = tempfile::tempdir().unwrap();
    let log = SessionLog::new(dir.path(), "stop2");
    // Four screening answers, then a stop on the first group question.
    let mut user = SimulatedUser::new(utility(), &data.normalized).with_stop_after(4);
    let cfg = config();
    let mut rng = seeded_rng(cfg.seed);

    let output = InteractiveHighDim::from_dataset(&data, cfg)
        .with_session_log(log.clone())
        .run(&mut user, &mut rng)
        .unwrap();

    assert_eq!(output.stopped_in, Some(Phase::GroupTesting));
    assert_eq!(output.mode, OutputMode::RegretSet);
    assert_eq!(output.questions_asked, 4);
    assert_eq!(output.final_dimensions, vec![0, 1, 2]);
    assert!(output.max_utility.is_none());
    assert!(!output.points.is_empty() && output.points.len() <= 30);
    assert_eq!(recorded_phase(&log), 2);
}

#[test]
fn exhausted_budget_returns_heuristic_set() {
    let data = dataset();
    let dir = tempfile::tempdir().unwrap();
    let log = SessionLog::new(dir.path(), "budget");
    let mut user = SimulatedUser::new(utility(), &data.normalized);
    let cfg = config().with_question_budget(3);
    let mut rng = seeded_rng(cfg.seed);

    let output = InteractiveHighDim::from_dataset(&data, cfg)
        .with_session_log(log.clone())
        .run(&mut user, &mut rng)
        .unwrap();

    // Blocks 1 and 2 eliminated, block 3 never asked.
    assert_eq!(output.final_dimensions, vec![0, 1, 2, 9, 10, 11]);
    assert_eq!(output.questions_asked, 3);
    assert_eq!(output.stopped_in, None);
    assert_eq!(output.mode, OutputMode::RegretSet);
    assert!(!output.points.is_empty() && output.points.len() <= 30);
    assert_eq!(recorded_phase(&log), 3);
}

struct FirstThree;

impl RegretHeuristic for FirstThree {
    fn select(&self, points: &PointSet, _k: usize) -> Vec<PointId> {
        points.ids().into_iter().take(3).collect()
    }
}

#[test]
fn short_heuristic_output_is_padded_to_k() {
    let data = dataset();
    let mut user = SimulatedUser::new(utility(), &data.normalized).with_stop_after(0);
    let cfg = config().with_output_size(5).with_d_hat_2(2);
    let mut rng = seeded_rng(cfg.seed);

    let output = InteractiveHighDim::from_dataset(&data, cfg)
        .with_heuristic(FirstThree)
        .run(&mut user, &mut rng)
        .unwrap();

    assert_eq!(output.mode, OutputMode::RegretSet);
    let ids = output.points.ids();
    assert_eq!(ids.len(), 5);
    let mut unique = ids.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), 5);
}

#[test]
fn stop_during_recommendation_still_returns_a_tuple() {
    let data = dataset();
    let dir = tempfile::tempdir().unwrap();
    let log = SessionLog::new(dir.path(), "stop3");
    let mut user = SimulatedUser::new(utility(), &data.normalized).with_stop_after(7);
    let cfg = config();
    let mut rng = seeded_rng(cfg.seed);

    let output = InteractiveHighDim::from_dataset(&data, cfg)
        .with_session_log(log.clone())
        .run(&mut user, &mut rng)
        .unwrap();

    assert_eq!(output.mode, OutputMode::ExactTuple);
    assert_eq!(output.points.len(), 1);
    assert_eq!(output.stopped_in, Some(Phase::Recommendation));
    assert_eq!(
        output.max_utility.map(|m| m.termination),
        Some(Termination::UserStopped)
    );
    assert_eq!(recorded_phase(&log), 3);
}

#[test]
fn invalid_block_size_is_rejected() {
    let data = dataset();
    let mut user = SimulatedUser::new(utility(), &data.normalized);
    let mut rng = StdRng::seed_from_u64(0);
    let err = InteractiveHighDim::from_dataset(&data, config().with_d_hat(DIM))
        .run(&mut user, &mut rng)
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Config(ConfigError::Invalid { field: "d_hat", .. })
    ));
}

#[test]
fn empty_skyline_is_rejected() {
    let empty = PointSet::new(4).unwrap();
    let mut user = SimulatedUser::new(vec![1.0; 4], &empty);
    let mut rng = StdRng::seed_from_u64(0);
    let err = InteractiveHighDim::new(&empty, HighDimConfig::default().with_d_hat(2))
        .run(&mut user, &mut rng)
        .unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::EmptyPointSet)));
}
