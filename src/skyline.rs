//! Skyline (Pareto frontier) of a point set, all attributes maximized.
//!
//! A point survives iff no other point covers it in every attribute. Exact
//! duplicates keep their first occurrence. The result is an index view into the
//! input arena; [`skyline_set`] materializes it when an owned set is needed (for
//! example after projecting onto fewer attributes).

use crate::geometry::{covers, EPS};
use crate::point::PointSet;

/// Indices of the skyline points of `set`, in order of first appearance.
///
/// Block-nested-loop: each point is compared against the current window; it is
/// dropped if some window point covers it, otherwise it evicts every window point
/// it covers and joins the window.
///
/// ```rust
/// use interactive_regret::{skyline::skyline, PointSet};
///
/// // [Price score, Comfort score] - higher is better
/// let set = PointSet::from_rows(2, vec![
///     vec![0.9, 0.1], // A
///     vec![0.5, 0.5], // B
///     vec![0.1, 0.9], // C
///     vec![0.4, 0.4], // D (covered by B)
/// ]).unwrap();
///
/// assert_eq!(skyline(&set), vec![0, 1, 2]);
/// ```
pub fn skyline(set: &PointSet) -> Vec<usize> {
    skyline_with_eps(set, EPS)
}

/// [`skyline`] with an explicit domination tolerance.
pub fn skyline_with_eps(set: &PointSet, eps: f64) -> Vec<usize> {
    let points = set.points();
    block_nested_loop(points.len(), |i| points[i].coords.as_slice(), eps)
}

/// Owned skyline of `set`; identifiers are preserved.
pub fn skyline_set(set: &PointSet) -> PointSet {
    set.subset(&skyline(set))
}

/// Skyline of `set` projected onto `attributes`, as an owned set of projected points.
pub fn projected_skyline(set: &PointSet, attributes: &[usize]) -> PointSet {
    skyline_set(&set.project(attributes))
}

/// Indices of the rows of `rows` not covered by another row (a skyline over raw
/// vectors). Used by candidate pruning, where the "attributes" are utilities under
/// the extreme rays of the utility range.
pub(crate) fn nondominated_rows(rows: &[Vec<f64>], eps: f64) -> Vec<usize> {
    block_nested_loop(rows.len(), |i| rows[i].as_slice(), eps)
}

fn block_nested_loop<'a>(n: usize, row: impl Fn(usize) -> &'a [f64], eps: f64) -> Vec<usize> {
    let mut window: Vec<usize> = Vec::new();
    'outer: for i in 0..n {
        let p = row(i);
        for &j in &window {
            if covers(row(j), p, eps) {
                continue 'outer;
            }
        }
        window.retain(|&j| !covers(p, row(j), eps));
        window.push(i);
    }
    window.sort_unstable();
    window
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicates_keep_first_occurrence() {
        let set = PointSet::from_rows(2, vec![vec![0.5, 0.5], vec![0.5, 0.5], vec![0.1, 0.9]])
            .unwrap();
        assert_eq!(skyline(&set), vec![0, 2]);
    }

    #[test]
    fn later_point_evicts_covered_window_points() {
        let set = PointSet::from_rows(
            2,
            vec![vec![0.2, 0.2], vec![0.3, 0.1], vec![0.4, 0.4], vec![0.0, 1.0]],
        )
        .unwrap();
        assert_eq!(skyline(&set), vec![2, 3]);
    }

    #[test]
    fn single_attribute_skyline_is_the_maximum() {
        let set = PointSet::from_rows(1, vec![vec![0.3], vec![0.9], vec![0.5]]).unwrap();
        assert_eq!(skyline(&set), vec![1]);
    }

    #[test]
    fn projected_skyline_keeps_ids() {
        let set = PointSet::from_rows(
            3,
            vec![vec![1.0, 0.0, 0.2], vec![0.0, 1.0, 0.9], vec![0.5, 0.5, 0.1]],
        )
        .unwrap();
        // On attribute 2 alone only point 1 survives.
        let sky = projected_skyline(&set, &[2]);
        assert_eq!(sky.ids(), vec![crate::PointId(1)]);
    }

    #[test]
    fn nondominated_rows_matches_skyline() {
        let rows = vec![vec![0.9, 0.1], vec![0.5, 0.5], vec![0.4, 0.4]];
        assert_eq!(nondominated_rows(&rows, EPS), vec![0, 1]);
    }
}
