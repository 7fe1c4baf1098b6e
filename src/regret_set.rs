//! Bounded-size regret-minimizing sets.
//!
//! Given a point set and a size `k`, pick at most `k` points such that every linear
//! utility finds a point in the selection close to its favourite in the whole set.

use tracing::debug;

use crate::geometry::{first_argmax, EPS};
use crate::lp::worst_direction;
use crate::point::{PointId, PointSet};

/// Chooses a representative subset of at most `k` points.
pub trait RegretHeuristic {
    /// Identifiers of at most `k` distinct points of `points`.
    fn select(&self, points: &PointSet, k: usize) -> Vec<PointId>;
}

impl<H: RegretHeuristic + ?Sized> RegretHeuristic for &H {
    fn select(&self, points: &PointSet, k: usize) -> Vec<PointId> {
        (**self).select(points, k)
    }
}

/// Greedy insertion by worst regret direction.
///
/// Starts from the point with the largest first attribute, then repeatedly adds
/// the point with the largest regret ratio against the current selection, until
/// `k` points are chosen or no point has positive regret left.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyRegret;

impl RegretHeuristic for GreedyRegret {
    fn select(&self, points: &PointSet, k: usize) -> Vec<PointId> {
        if points.len() <= k {
            return points.ids();
        }
        if k == 0 {
            return Vec::new();
        }

        let Some(first) = first_argmax(0..points.len(), |&i| points.get(i).coords[0]) else {
            return Vec::new();
        };
        let mut chosen = vec![first];
        let mut in_set = vec![false; points.len()];
        in_set[first] = true;

        while chosen.len() < k {
            let reference: Vec<&[f64]> = chosen.iter().map(|&i| points.get(i).coords.as_slice()).collect();
            let ratios: Vec<(usize, f64)> = (0..points.len())
                .filter(|&i| !in_set[i])
                .filter_map(|i| {
                    worst_direction(&reference, &points.get(i).coords).map(|w| (i, w.regret_ratio))
                })
                .collect();
            let Some(&(next, ratio)) = first_argmax(ratios.iter(), |(_, r)| *r) else {
                break;
            };
            if ratio <= EPS {
                break;
            }
            chosen.push(next);
            in_set[next] = true;
        }

        debug!(points = points.len(), k, selected = chosen.len(), "greedy regret set");
        chosen.into_iter().map(|i| points.get(i).id).collect()
    }
}
