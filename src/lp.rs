//! Linear programs over the utility space.
//!
//! [`LinearProgram`] is a small row-oriented front end to the `microlp` solver.
//! On top of it sit the three programs the interactive loop needs:
//!
//! - [`worst_direction`]: the utility direction in which a point has the largest
//!   regret ratio with respect to a reference set,
//! - [`inside_cone`]: whether a vector is a conical combination of given rays,
//! - [`max_over_region`]: the largest value of a linear function over the
//!   current utility range, normalized by the current best point.
//!
//! Infeasibility is an ordinary outcome ([`LpOutcome::Infeasible`]); callers decide
//! what it means in their context.

use microlp::{ComparisonOp, OptimizationDirection, Problem, Variable};
use tracing::warn;

use crate::geometry::{sub, EPS};

/// Sense of a constraint row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Le,
    Ge,
    Eq,
}

impl Relation {
    fn holds(self, lhs: f64, rhs: f64) -> bool {
        match self {
            Relation::Le => lhs <= rhs + EPS,
            Relation::Ge => lhs >= rhs - EPS,
            Relation::Eq => (lhs - rhs).abs() <= EPS,
        }
    }
}

impl From<Relation> for ComparisonOp {
    fn from(relation: Relation) -> Self {
        match relation {
            Relation::Le => ComparisonOp::Le,
            Relation::Ge => ComparisonOp::Ge,
            Relation::Eq => ComparisonOp::Eq,
        }
    }
}

#[derive(Debug, Clone)]
struct Row {
    coeffs: Vec<f64>,
    relation: Relation,
    rhs: f64,
}

/// Result of [`LinearProgram::solve`].
#[derive(Debug, Clone, PartialEq)]
pub enum LpOutcome {
    Optimal { value: f64, x: Vec<f64> },
    Infeasible,
    Unbounded,
}

impl LpOutcome {
    /// Optimal objective value, if any.
    pub fn value(&self) -> Option<f64> {
        match self {
            LpOutcome::Optimal { value, .. } => Some(*value),
            _ => None,
        }
    }

    /// Anything but [`LpOutcome::Infeasible`].
    pub fn is_feasible(&self) -> bool {
        !matches!(self, LpOutcome::Infeasible)
    }
}

/// A maximization program `max c·x  s.t.  rows, bounds`.
#[derive(Debug, Clone)]
pub struct LinearProgram {
    objective: Vec<f64>,
    free: Vec<bool>,
    rows: Vec<Row>,
}

impl LinearProgram {
    /// Maximize `objective · x` with every variable non-negative.
    pub fn maximize(objective: Vec<f64>) -> Self {
        let n = objective.len();
        Self {
            objective,
            free: vec![false; n],
            rows: Vec::new(),
        }
    }

    /// Pure feasibility program over `n` non-negative variables.
    pub fn feasibility(n: usize) -> Self {
        Self::maximize(vec![0.0; n])
    }

    /// Make variable `var` free.
    pub fn free(mut self, var: usize) -> Self {
        self.free[var] = true;
        self
    }

    /// Add the row `coeffs · x  (relation)  rhs`.
    pub fn subject_to(&mut self, coeffs: Vec<f64>, relation: Relation, rhs: f64) -> &mut Self {
        debug_assert_eq!(coeffs.len(), self.objective.len());
        self.rows.push(Row {
            coeffs,
            relation,
            rhs,
        });
        self
    }

    pub fn num_vars(&self) -> usize {
        self.objective.len()
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Solve with `microlp`.
    ///
    /// Rows without a non-zero coefficient are checked directly instead of being
    /// handed to the solver. A solver failure other than infeasibility or
    /// unboundedness is logged and reported as infeasible.
    pub fn solve(&self) -> LpOutcome {
        let mut problem = Problem::new(OptimizationDirection::Maximize);
        let vars: Vec<Variable> = self
            .objective
            .iter()
            .zip(&self.free)
            .map(|(&c, &free)| {
                let lower = if free { f64::NEG_INFINITY } else { 0.0 };
                problem.add_var(c, (lower, f64::INFINITY))
            })
            .collect();

        for row in &self.rows {
            let terms: Vec<(Variable, f64)> = vars
                .iter()
                .zip(&row.coeffs)
                .filter(|&(_, &c)| c != 0.0)
                .map(|(&v, &c)| (v, c))
                .collect();
            if terms.is_empty() {
                if !row.relation.holds(0.0, row.rhs) {
                    return LpOutcome::Infeasible;
                }
                continue;
            }
            problem.add_constraint(terms.as_slice(), row.relation.into(), row.rhs);
        }

        match problem.solve() {
            Ok(solution) => LpOutcome::Optimal {
                value: solution.objective(),
                x: vars.iter().map(|&v| solution[v]).collect(),
            },
            Err(microlp::Error::Infeasible) => LpOutcome::Infeasible,
            Err(microlp::Error::Unbounded) => LpOutcome::Unbounded,
            Err(err) => {
                warn!(%err, vars = self.num_vars(), rows = self.num_rows(), "linear program failed; treating it as infeasible");
                LpOutcome::Infeasible
            }
        }
    }
}

// ============================================================================
// Domain programs
// ============================================================================

/// Worst regret direction of a point against a reference set.
#[derive(Debug, Clone, PartialEq)]
pub struct WorstDirection {
    /// `1 - max_{s in S} v·s / v·p` at the worst `v`; negative when `p` is
    /// beaten by `S` in every direction.
    pub regret_ratio: f64,
    /// The worst utility vector, scaled so that `v·p = 1`.
    pub direction: Vec<f64>,
}

/// Utility direction `v >= 0` in which `point` beats the best of `reference` by
/// the largest relative margin.
///
/// Solves `max x  s.t.  x <= (p - s)·v  for all s in S,  p·v = 1,  v >= 0,  x free`.
/// Returns `None` when `point` is zero (no direction gives it positive utility).
///
/// ```rust
/// use interactive_regret::lp::worst_direction;
///
/// let reference = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
/// let worst = worst_direction(&reference, &[0.9, 0.9]).unwrap();
/// assert!((worst.regret_ratio - 4.0 / 9.0).abs() < 1e-6);
/// ```
pub fn worst_direction<S: AsRef<[f64]>>(reference: &[S], point: &[f64]) -> Option<WorstDirection> {
    let d = point.len();
    let mut objective = vec![0.0; d + 1];
    objective[d] = 1.0;
    let mut lp = LinearProgram::maximize(objective).free(d);
    for s in reference {
        let diff = sub(point, s.as_ref());
        let mut row: Vec<f64> = diff.iter().map(|c| -c).collect();
        row.push(1.0);
        lp.subject_to(row, Relation::Le, 0.0);
    }
    let mut normalizer = point.to_vec();
    normalizer.push(0.0);
    lp.subject_to(normalizer, Relation::Eq, 1.0);

    match lp.solve() {
        LpOutcome::Optimal { value, mut x } => {
            x.truncate(d);
            Some(WorstDirection {
                regret_ratio: value,
                direction: x,
            })
        }
        // Empty reference set: the point has unbounded advantage.
        LpOutcome::Unbounded => Some(WorstDirection {
            regret_ratio: 1.0,
            direction: vec![0.0; d],
        }),
        LpOutcome::Infeasible => None,
    }
}

/// Is `point` a conical combination `Σ λ_j r_j, λ >= 0` of `rays`?
pub fn inside_cone<R: AsRef<[f64]>>(rays: &[R], point: &[f64]) -> bool {
    if rays.is_empty() {
        return point.iter().all(|&v| v.abs() < EPS);
    }
    let mut lp = LinearProgram::feasibility(rays.len());
    for (k, &target) in point.iter().enumerate() {
        let row = rays.iter().map(|r| r.as_ref()[k]).collect();
        lp.subject_to(row, Relation::Eq, target);
    }
    lp.solve().is_feasible()
}

/// `max objective·u  s.t.  normalizer·u = 1,  h·u <= 0  for every constraint h,  u >= 0`.
///
/// With `normalizer` the current best point this is the largest utility ratio any
/// admissible utility vector gives `objective` over the best point.
pub fn max_over_region<H: AsRef<[f64]>>(
    objective: &[f64],
    normalizer: &[f64],
    constraints: &[H],
) -> LpOutcome {
    let mut lp = LinearProgram::maximize(objective.to_vec());
    for h in constraints {
        lp.subject_to(h.as_ref().to_vec(), Relation::Le, 0.0);
    }
    lp.subject_to(normalizer.to_vec(), Relation::Eq, 1.0);
    lp.solve()
}
