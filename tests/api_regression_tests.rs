use std::io::Write;

use interactive_regret::cone::frame;
use interactive_regret::dataset::{linear_normalize, read_points, Dataset};
use interactive_regret::lp::{inside_cone, worst_direction, LinearProgram, LpOutcome, Relation};
use interactive_regret::skyline::{skyline, skyline_set};
use interactive_regret::{DatasetError, PointId, PointSet, PointSetError};

fn write_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn read_points_assigns_sequential_ids() {
    let file = write_file("3 2\n0.5 0.5\n0.1 0.9\n0.9 0.1\n");
    let set = read_points(file.path()).unwrap();
    assert_eq!(set.ids(), vec![PointId(0), PointId(1), PointId(2)]);
    assert_eq!(set.get(2).coords, vec![0.9, 0.1]);
}

#[test]
fn read_points_reports_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_points(dir.path().join("missing.txt")).unwrap_err();
    assert!(matches!(err, DatasetError::Io { .. }));
}

#[test]
fn read_points_rejects_nan() {
    let file = write_file("1 2\n1.0 NaN\n");
    let err = read_points(file.path()).unwrap_err();
    assert!(matches!(
        err,
        DatasetError::PointSet(PointSetError::NonFinite {
            id: PointId(0),
            attribute: 1
        })
    ));
}

#[test]
fn dataset_load_keeps_raw_and_normalized_skyline() {
    let file = write_file("4 2\n10 100\n20 50\n30 0\n15 40\n");
    let data = Dataset::load(file.path()).unwrap();
    assert_eq!(data.raw.get(0).coords, vec![10.0, 100.0]);
    assert_eq!(data.normalized.get(2).coords, vec![1.0, 0.0]);
    // (15, 40) is covered by (20, 50).
    assert_eq!(data.skyline.ids(), vec![PointId(0), PointId(1), PointId(2)]);
}

#[test]
fn normalization_preserves_skyline() {
    let mut set =
        PointSet::from_rows(3, vec![vec![3.0, 1.0, 7.0], vec![1.0, 5.0, 2.0], vec![2.0, 0.5, 1.0]])
            .unwrap();
    let before = skyline(&set);
    linear_normalize(&mut set);
    assert_eq!(skyline(&set), before);
}

#[test]
fn skyline_set_keeps_ids_of_survivors() {
    let set = PointSet::from_rows(
        2,
        vec![vec![0.1, 0.1], vec![0.9, 0.2], vec![0.3, 0.8], vec![0.2, 0.2]],
    )
    .unwrap();
    assert_eq!(skyline_set(&set).ids(), vec![PointId(1), PointId(2)]);
}

#[test]
fn worst_direction_fixtures() {
    let reference = vec![vec![1.0, 0.0], vec![0.0, 1.0]];

    let worst = worst_direction(&reference, &[0.9, 0.9]).unwrap();
    assert!((worst.regret_ratio - 0.4444).abs() < 1e-4);
    assert!((worst.direction[0] - 0.5556).abs() < 1e-4);
    assert!((worst.direction[1] - 0.5556).abs() < 1e-4);

    let worst = worst_direction(&reference, &[0.4, 0.4]).unwrap();
    assert!(worst.regret_ratio < 0.0);
    assert!((worst.direction[0] - 1.25).abs() < 1e-4);
    assert!((worst.direction[1] - 1.25).abs() < 1e-4);
}

#[test]
fn three_dimensional_program() {
    // max x + y + z  s.t.  x + y <= 1, y + z <= 1, x + z <= 1
    let mut lp = LinearProgram::maximize(vec![1.0, 1.0, 1.0]);
    lp.subject_to(vec![1.0, 1.0, 0.0], Relation::Le, 1.0)
        .subject_to(vec![0.0, 1.0, 1.0], Relation::Le, 1.0)
        .subject_to(vec![1.0, 0.0, 1.0], Relation::Le, 1.0);
    match lp.solve() {
        LpOutcome::Optimal { value, x } => {
            assert!((value - 1.5).abs() < 1e-9);
            assert!(x.iter().all(|v| (v - 0.5).abs() < 1e-9));
        }
        other => panic!("expected optimum, got {other:?}"),
    }
}

#[test]
fn cone_membership_and_frame_agree() {
    let rays = vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0], vec![1.0, 1.0, 0.0], vec![0.0, 0.0, 1.0]];
    assert!(inside_cone(&rays, &[2.0, 3.0, 0.5]));
    assert!(!inside_cone(&rays, &[-1.0, 0.0, 0.0]));
    assert_eq!(frame(&rays), vec![0, 1, 3]);
}
