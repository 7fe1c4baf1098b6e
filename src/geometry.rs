//! Vector primitives shared by every other module.
//!
//! All functions operate on plain coordinate slices so that points, extreme
//! vectors and utility vectors can be mixed freely. Comparisons against zero go
//! through [`is_zero`] with the crate-wide tolerance [`EPS`].

/// Tolerance for every comparison against zero.
///
/// Large enough to absorb the round-off of the simplex solver, small enough that
/// normalized attribute values in `[0, 1]` are never conflated.
pub const EPS: f64 = 1e-9;

/// Is `x` within [`EPS`] of zero?
#[inline]
pub fn is_zero(x: f64) -> bool {
    x > -EPS && x < EPS
}

/// Inner product. Extra coordinates of the longer slice are ignored.
#[inline]
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// `a - b`, coordinate-wise.
pub fn sub(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter().zip(b).map(|(x, y)| x - y).collect()
}

/// `c * a`.
pub fn scale(c: f64, a: &[f64]) -> Vec<f64> {
    a.iter().map(|x| c * x).collect()
}

/// Euclidean length.
#[inline]
pub fn norm(a: &[f64]) -> f64 {
    dot(a, a).sqrt()
}

/// Unit vector in the direction of `a`.
///
/// A (numerically) zero vector is returned unchanged as the zero vector: it
/// encodes no direction and callers treat it as a vacuous constraint.
pub fn normalize(a: &[f64]) -> Vec<f64> {
    let len = norm(a);
    if is_zero(len) {
        vec![0.0; a.len()]
    } else {
        scale(1.0 / len, a)
    }
}

/// Coordinate-wise equality with tolerance [`EPS`].
pub fn approx_eq(a: &[f64], b: &[f64]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| is_zero(x - y))
}

/// Weak domination: `a` is at least as large as `b` in every attribute.
///
/// Identical points cover each other; the skyline keeps whichever it saw first.
pub fn covers(a: &[f64], b: &[f64], eps: f64) -> bool {
    a.iter().zip(b).all(|(&av, &bv)| av + eps >= bv)
}

/// Strict domination: `a` covers `b` and is larger in at least one attribute.
pub fn dominates(a: &[f64], b: &[f64], eps: f64) -> bool {
    let mut strictly_better = false;
    for (&av, &bv) in a.iter().zip(b) {
        if av + eps < bv {
            return false;
        }
        if av > bv + eps {
            strictly_better = true;
        }
    }
    strictly_better
}

/// Rescale a non-negative direction so its coordinates sum to one.
///
/// Returns `None` when the coordinate sum is (numerically) zero.
pub fn to_simplex(a: &[f64]) -> Option<Vec<f64>> {
    let total: f64 = a.iter().sum();
    if is_zero(total) {
        None
    } else {
        Some(scale(1.0 / total, a))
    }
}

/// Index of the first maximum of `score` over `items`.
///
/// Ties keep the earliest item; `None` only for an empty iterator.
pub fn first_argmax<T>(items: impl IntoIterator<Item = T>, score: impl Fn(&T) -> f64) -> Option<T> {
    let mut best: Option<(T, f64)> = None;
    for item in items {
        let value = score(&item);
        match &best {
            Some((_, best_value)) if value <= *best_value => {}
            _ => best = Some((item, value)),
        }
    }
    best.map(|(item, _)| item)
}
