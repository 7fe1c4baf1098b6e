//! The utility range and its extreme rays.
//!
//! Every answered question contributes constraints `h·u <= 0` ("the rejected tuple
//! is not better than the chosen one"). Together with `u >= 0` they describe a
//! polyhedral cone `R` of utility vectors still consistent with the user. The
//! candidate engine needs two views of `R`:
//!
//! - the constraint vectors themselves (the *extreme vectors*), for the cone LP and
//!   the exact regret bound;
//! - the extreme rays of `R`, for the utility estimate and the ray-based
//!   domination test.
//!
//! Rays are maintained incrementally with the double-description step: adding a
//! constraint keeps the rays on its feasible side and combines every pair that
//! straddles it. A combination is kept only if it is extreme in the new cone,
//! i.e. the constraints it satisfies with equality have rank `dim - 1`.

use nalgebra::DMatrix;
use tracing::{debug, warn};

use crate::geometry::{dot, is_zero, normalize, scale, to_simplex, EPS};
use crate::lp::inside_cone;

/// Tolerance for "ray lies on the constraint hyperplane". Looser than [`EPS`]
/// because rays accumulate round-off across many combinations.
const ON_PLANE_TOL: f64 = 1e-7;

/// Singular values at or below this count as zero in the extremality test.
const RANK_TOL: f64 = 1e-10;

/// Unit rays closer than this (max-norm) are the same ray.
const PARALLEL_TOL: f64 = 1e-7;

/// Constraint set `{h}` with the extreme rays of `{u : h·u <= 0 for all h}`.
#[derive(Debug, Clone)]
pub struct UtilityRange {
    dim: usize,
    extreme_vectors: Vec<Vec<f64>>,
    rays: Vec<Vec<f64>>,
}

impl UtilityRange {
    /// The non-negative orthant: constraints `-e_i`, rays `e_j`.
    pub fn new(dim: usize) -> Self {
        let axis = |i: usize, v: f64| {
            let mut e = vec![0.0; dim];
            e[i] = v;
            e
        };
        Self {
            dim,
            extreme_vectors: (0..dim).map(|i| axis(i, -1.0)).collect(),
            rays: (0..dim).map(|j| axis(j, 1.0)).collect(),
        }
    }

    /// Dimension of the utility space.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Every constraint added so far, the initial `-e_i` first.
    pub fn extreme_vectors(&self) -> &[Vec<f64>] {
        &self.extreme_vectors
    }

    /// Extreme rays of the range, each of unit length.
    pub fn rays(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.rays.iter().map(Vec::as_slice)
    }

    /// Number of extreme rays.
    pub fn ray_count(&self) -> usize {
        self.rays.len()
    }

    /// `false` once the feedback has become contradictory and only `u = 0` remains.
    pub fn is_consistent(&self) -> bool {
        !self.rays.is_empty()
    }

    /// Add the constraint `h·u <= 0`, stored normalized.
    ///
    /// A zero `h` is stored as-is and leaves the range unchanged.
    pub fn add_constraint(&mut self, h: &[f64]) {
        debug_assert_eq!(h.len(), self.dim);
        let h = normalize(h);
        let sides: Vec<f64> = self.rays.iter().map(|r| dot(&h, r)).collect();
        self.extreme_vectors.push(h);

        if sides.iter().all(|&s| s <= ON_PLANE_TOL) {
            return;
        }

        let mut rays: Vec<Vec<f64>> = Vec::with_capacity(self.rays.len());
        for (ray, &s) in self.rays.iter().zip(&sides) {
            if s <= ON_PLANE_TOL {
                rays.push(ray.clone());
            }
        }
        for (p, &sp) in self.rays.iter().zip(&sides) {
            if sp <= ON_PLANE_TOL {
                continue;
            }
            for (n, &sn) in self.rays.iter().zip(&sides) {
                if sn >= -ON_PLANE_TOL {
                    continue;
                }
                let dir: Vec<f64> = n.iter().zip(p).map(|(rn, rp)| sp * rn - sn * rp).collect();
                let dir = normalize(&dir);
                if dir.iter().all(|&v| is_zero(v)) || !self.is_extreme(&dir) {
                    continue;
                }
                if !rays.iter().any(|r| parallel(r, &dir)) {
                    rays.push(dir);
                }
            }
        }
        self.rays = rays;

        debug!(
            constraints = self.extreme_vectors.len(),
            rays = self.rays.len(),
            "utility range updated"
        );
        if self.rays.is_empty() {
            warn!("user feedback is inconsistent; utility range collapsed to the origin");
        }
    }

    /// A feasible direction is an extreme ray iff its tight constraints span a
    /// space of dimension `dim - 1`.
    fn is_extreme(&self, dir: &[f64]) -> bool {
        let tight: Vec<f64> = self
            .extreme_vectors
            .iter()
            .filter(|h| dot(h, dir).abs() <= ON_PLANE_TOL)
            .flat_map(|h| h.iter().copied())
            .collect();
        let rows = tight.len() / self.dim;
        if rows + 1 < self.dim {
            return false;
        }
        if rows == 0 {
            return true;
        }
        DMatrix::from_row_slice(rows, self.dim, &tight).rank(RANK_TOL) + 1 >= self.dim
    }

    /// Utility estimate: the mean of the extreme points of `R ∩ {Σu = 1}`.
    ///
    /// Falls back to uniform weights when the range is inconsistent.
    pub fn utility_estimate(&self) -> Vec<f64> {
        let vertices: Vec<Vec<f64>> = self.rays.iter().filter_map(|r| to_simplex(r)).collect();
        if vertices.is_empty() {
            return vec![1.0 / self.dim as f64; self.dim];
        }
        let mut mean = vec![0.0; self.dim];
        for v in &vertices {
            for (m, x) in mean.iter_mut().zip(v) {
                *m += x;
            }
        }
        scale(1.0 / vertices.len() as f64, &mean)
    }

    /// Does `u` satisfy every constraint (within [`EPS`])?
    pub fn contains(&self, u: &[f64]) -> bool {
        self.extreme_vectors.iter().all(|h| dot(h, u) <= EPS)
    }
}

fn parallel(a: &[f64], b: &[f64]) -> bool {
    a.iter().zip(b).all(|(x, y)| (x - y).abs() <= PARALLEL_TOL)
}

/// Indices of the rays not inside the conical hull of the others.
///
/// Parallel rays keep only their first occurrence; zero rays are never in the
/// frame. Indices refer to `rays`.
pub fn frame<R: AsRef<[f64]>>(rays: &[R]) -> Vec<usize> {
    let mut distinct: Vec<(usize, Vec<f64>)> = Vec::new();
    for (i, r) in rays.iter().enumerate() {
        let unit = normalize(r.as_ref());
        if unit.iter().all(|&v| is_zero(v)) {
            continue;
        }
        if !distinct.iter().any(|(_, u)| parallel(u, &unit)) {
            distinct.push((i, unit));
        }
    }

    (0..distinct.len())
        .filter(|&k| {
            let others: Vec<&[f64]> = distinct
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != k)
                .map(|(_, (_, u))| u.as_slice())
                .collect();
            !inside_cone(&others, &distinct[k].1)
        })
        .map(|k| distinct[k].0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::approx_eq;

    fn sorted_rays(range: &UtilityRange) -> Vec<Vec<f64>> {
        let mut rays: Vec<Vec<f64>> = range.rays().map(<[f64]>::to_vec).collect();
        rays.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        rays
    }

    #[test]
    fn initial_range_is_the_orthant() {
        let range = UtilityRange::new(3);
        assert_eq!(range.extreme_vectors().len(), 3);
        assert_eq!(range.ray_count(), 3);
        let est = range.utility_estimate();
        assert!(approx_eq(&est, &[1.0 / 3.0; 3]));
    }

    #[test]
    fn cut_in_two_dimensions() {
        // Chose (1, 0) over (0, 1): u1 - u0 <= 0.
        let mut range = UtilityRange::new(2);
        range.add_constraint(&[-1.0, 1.0]);
        let rays = sorted_rays(&range);
        assert_eq!(rays.len(), 2);
        let diag = std::f64::consts::FRAC_1_SQRT_2;
        assert!(approx_eq(&rays[0], &[diag, diag]));
        assert!(approx_eq(&rays[1], &[1.0, 0.0]));
        let est = range.utility_estimate();
        assert!(approx_eq(&est, &[0.75, 0.25]));
    }

    #[test]
    fn cut_in_three_dimensions_replaces_cut_ray() {
        // u2 <= u0 cuts e2; e1 lies on the plane and stays.
        let mut range = UtilityRange::new(3);
        range.add_constraint(&[-1.0, 0.0, 1.0]);
        assert_eq!(range.ray_count(), 3);
        assert!(range
            .rays()
            .any(|r| approx_eq(r, &normalize(&[1.0, 0.0, 1.0]))));
        assert!(range.rays().all(|r| range.contains(r)));
    }

    #[test]
    fn only_extreme_combinations_survive_a_cut() {
        // u0 <= u2 and u1 <= u2: a square cross-section with four rays.
        let mut range = UtilityRange::new(3);
        range.add_constraint(&[1.0, 0.0, -1.0]);
        range.add_constraint(&[0.0, 1.0, -1.0]);
        assert_eq!(range.ray_count(), 4);
        assert!(range
            .rays()
            .any(|r| approx_eq(r, &normalize(&[1.0, 1.0, 1.0]))));

        // Cut off the (1, 1, 1) corner. Its combination with e2 runs along the
        // square's diagonal and is not extreme.
        range.add_constraint(&[1.0, 1.0, -1.5]);
        assert_eq!(range.ray_count(), 5);
        for expected in [[1.0, 0.5, 1.0], [0.5, 1.0, 1.0], [0.0, 0.0, 1.0]] {
            assert!(range.rays().any(|r| approx_eq(r, &normalize(&expected))));
        }
        assert!(range.rays().all(|r| range.contains(r)));
        let rays: Vec<&[f64]> = range.rays().collect();
        assert_eq!(frame(&rays).len(), 5);
    }

    #[test]
    fn contradictory_feedback_empties_range() {
        let mut range = UtilityRange::new(2);
        range.add_constraint(&[-1.0, 1.0]);
        range.add_constraint(&[1.0, -1.0]);
        // Only the diagonal survives; it satisfies both with equality.
        assert_eq!(range.ray_count(), 1);
        range.add_constraint(&[1.0, 1.0]);
        assert!(!range.is_consistent());
        assert!(approx_eq(&range.utility_estimate(), &[0.5, 0.5]));
    }

    #[test]
    fn zero_constraint_is_recorded_but_vacuous() {
        let mut range = UtilityRange::new(2);
        range.add_constraint(&[0.0, 0.0]);
        assert_eq!(range.extreme_vectors().len(), 3);
        assert_eq!(range.ray_count(), 2);
    }

    #[test]
    fn frame_drops_interior_and_parallel_rays() {
        let rays = vec![
            vec![1.0, 0.0],
            vec![1.0, 1.0],
            vec![0.0, 1.0],
            vec![2.0, 0.0],
            vec![0.0, 0.0],
        ];
        assert_eq!(frame(&rays), vec![0, 2]);
    }
}
