//! Candidate-set geometry for the max-utility loop.
//!
//! Candidates are indices into the (projected) skyline. Given the current
//! [`UtilityRange`] this module estimates the favourite, drops candidates that can
//! no longer be the favourite, bounds the regret of stopping now, and picks the
//! tuples to show next.

use rand::seq::index::sample;
use rand::Rng;
use tracing::debug;

use crate::cone::{frame, UtilityRange};
use crate::config::{DominationTest, SelectionStrategy, StopRule};
use crate::geometry::{dot, first_argmax, sub, EPS};
use crate::lp::{inside_cone, max_over_region, worst_direction, LpOutcome};
use crate::point::PointSet;
use crate::skyline::nondominated_rows;

/// Candidate with the largest estimated utility; ties keep the first in `candidates`.
pub fn current_best(points: &PointSet, candidates: &[usize], range: &UtilityRange) -> Option<usize> {
    let u = range.utility_estimate();
    first_argmax(candidates.iter().copied(), |&i| dot(&u, &points.get(i).coords))
}

/// Result of one pruning pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PruneOutcome {
    pub removed: usize,
    /// Upper bound on the regret ratio of recommending the current best now.
    pub regret_ratio: f64,
}

/// Remove every candidate another candidate beats for all utilities in `range`,
/// then recompute the regret bound.
///
/// When two candidates beat each other (equal utility everywhere) the lower index
/// survives. With an inconsistent range only the current best survives.
pub fn prune(
    points: &PointSet,
    candidates: &mut Vec<usize>,
    range: &UtilityRange,
    domination: DominationTest,
    stop_rule: StopRule,
) -> PruneOutcome {
    candidates.sort_unstable();
    let before = candidates.len();

    if !range.is_consistent() {
        if let Some(best) = current_best(points, candidates, range) {
            candidates.retain(|&c| c == best);
        }
    } else {
        let survivors = match domination {
            DominationTest::Hyperplane => prune_by_rays(points, candidates, range),
            DominationTest::ConicalHull => prune_by_cone(points, candidates, range),
        };
        *candidates = survivors;
    }

    let regret_ratio = match current_best(points, candidates, range) {
        Some(best) => regret_bound(points, candidates, best, range, stop_rule),
        None => 0.0,
    };
    let removed = before - candidates.len();
    debug!(removed, remaining = candidates.len(), regret_ratio, "pruned candidates");
    PruneOutcome {
        removed,
        regret_ratio,
    }
}

fn prune_by_rays(points: &PointSet, candidates: &[usize], range: &UtilityRange) -> Vec<usize> {
    let rays: Vec<&[f64]> = range.rays().collect();
    let utilities: Vec<Vec<f64>> = candidates
        .iter()
        .map(|&c| rays.iter().map(|r| dot(r, &points.get(c).coords)).collect())
        .collect();
    nondominated_rows(&utilities, EPS)
        .into_iter()
        .map(|k| candidates[k])
        .collect()
}

fn prune_by_cone(points: &PointSet, candidates: &[usize], range: &UtilityRange) -> Vec<usize> {
    let h = range.extreme_vectors();
    let u = range.utility_estimate();
    let score: Vec<f64> = candidates
        .iter()
        .map(|&c| dot(&u, &points.get(c).coords))
        .collect();
    // q beats p everywhere iff p - q lies in the cone of the constraint vectors.
    let beats = |q: usize, p: usize| {
        score[q] + EPS >= score[p]
            && inside_cone(h, &sub(&points.get(candidates[p]).coords, &points.get(candidates[q]).coords))
    };
    (0..candidates.len())
        .filter(|&p| {
            !(0..candidates.len()).any(|q| q != p && beats(q, p) && (q < p || !beats(p, q)))
        })
        .map(|p| candidates[p])
        .collect()
}

/// Largest regret ratio of recommending `best` over any remaining candidate.
///
/// Clamped at zero; `NoBound` always reports one.
pub fn regret_bound(
    points: &PointSet,
    candidates: &[usize],
    best: usize,
    range: &UtilityRange,
    stop_rule: StopRule,
) -> f64 {
    let best_coords = &points.get(best).coords;
    let others = candidates.iter().copied().filter(|&c| c != best);
    let bound = match stop_rule {
        StopRule::NoBound => return 1.0,
        StopRule::ExactBound => others
            .map(|c| {
                match max_over_region(&points.get(c).coords, best_coords, range.extreme_vectors()) {
                    LpOutcome::Optimal { value, .. } if value > EPS => 1.0 - 1.0 / value,
                    LpOutcome::Optimal { .. } => 0.0,
                    LpOutcome::Infeasible | LpOutcome::Unbounded => 1.0,
                }
            })
            .fold(0.0, f64::max),
        StopRule::ApproxBound => others
            .filter_map(|c| worst_direction(&[best_coords], &points.get(c).coords))
            .map(|w| w.regret_ratio)
            .fold(0.0, f64::max),
    };
    bound.max(0.0)
}

/// Picks the tuples shown in one question.
///
/// The frame used by [`SelectionStrategy::Simplex`] only depends on the current
/// best, so it is cached until the best changes.
#[derive(Debug, Clone)]
pub struct OptionSelector {
    strategy: SelectionStrategy,
    frame: Option<(usize, Vec<usize>)>,
}

impl OptionSelector {
    /// A selector with an empty frame cache.
    pub fn new(strategy: SelectionStrategy) -> Self {
        Self {
            strategy,
            frame: None,
        }
    }

    /// Up to `s` distinct candidate indices, the current best first when it is
    /// still a candidate.
    pub fn select<R: Rng + ?Sized>(
        &mut self,
        points: &PointSet,
        candidates: &[usize],
        best: usize,
        s: usize,
        rng: &mut R,
    ) -> Vec<usize> {
        let target = s.min(candidates.len());
        let mut shown = Vec::with_capacity(target);
        if candidates.contains(&best) {
            shown.push(best);
        }
        let others: Vec<usize> = candidates.iter().copied().filter(|&c| c != best).collect();

        let strategy = self.strategy;
        match strategy {
            SelectionStrategy::Random => {
                let want = target.saturating_sub(shown.len());
                shown.extend(sample(rng, others.len(), want).into_iter().map(|k| others[k]));
            }
            SelectionStrategy::Simplex => {
                for &n in self.neighbours(points, best) {
                    if shown.len() >= target {
                        break;
                    }
                    if others.contains(&n) {
                        shown.push(n);
                    }
                }
                for &c in &others {
                    if shown.len() >= target {
                        break;
                    }
                    if !shown.contains(&c) {
                        shown.push(c);
                    }
                }
            }
        }
        shown
    }

    /// Points whose direction from `best` is on the frame of all such directions.
    fn neighbours(&mut self, points: &PointSet, best: usize) -> &[usize] {
        let stale = !matches!(&self.frame, Some((b, _)) if *b == best);
        if stale {
            let origin = &points.get(best).coords;
            let others: Vec<usize> = (0..points.len()).filter(|&i| i != best).collect();
            let rays: Vec<Vec<f64>> = others
                .iter()
                .map(|&i| sub(&points.get(i).coords, origin))
                .collect();
            let neighbours = frame(&rays).into_iter().map(|k| others[k]).collect();
            self.frame = Some((best, neighbours));
        }
        self.frame.as_ref().map(|(_, f)| f.as_slice()).unwrap_or(&[])
    }
}
