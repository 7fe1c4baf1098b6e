//! Points and the owning point-set arena.
//!
//! A [`PointSet`] owns every coordinate it holds. Derived sets are either index
//! views (`Vec<usize>` into the arena, as returned by [`crate::skyline::skyline`])
//! or new owned sets built by [`PointSet::project`] / [`PointSet::subset`]. Point
//! identifiers survive both, so a tuple can always be traced back to the input.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

/// Stable identifier of a tuple, unique within the set that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PointId(pub usize);

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A tuple with numeric attributes (larger is better in every attribute).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub id: PointId,
    pub coords: Vec<f64>,
}

impl Point {
    pub fn new(id: PointId, coords: Vec<f64>) -> Self {
        Self { id, coords }
    }

    pub fn dim(&self) -> usize {
        self.coords.len()
    }
}

/// Errors returned when building a point set from raw rows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PointSetError {
    /// The set must have at least one attribute.
    #[error("point sets need at least one attribute")]
    ZeroDimension,
    /// A row had a different length than the set.
    #[error("point {id} has {found} attributes, expected {expected}")]
    InconsistentDimensions {
        id: PointId,
        expected: usize,
        found: usize,
    },
    /// A value was NaN or infinite.
    #[error("point {id} attribute {attribute} is not finite")]
    NonFinite { id: PointId, attribute: usize },
    /// Two points carried the same identifier.
    #[error("duplicate point identifier {0}")]
    DuplicateId(PointId),
}

/// Owning collection of points sharing one dimensionality.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PointSet {
    dim: usize,
    points: Vec<Point>,
}

impl PointSet {
    /// An empty set of `dim`-attribute points.
    pub fn new(dim: usize) -> Result<Self, PointSetError> {
        if dim == 0 {
            return Err(PointSetError::ZeroDimension);
        }
        Ok(Self {
            dim,
            points: Vec::new(),
        })
    }

    /// Build a set from rows, assigning identifiers `0..rows.len()`.
    ///
    /// ```rust
    /// use interactive_regret::PointSet;
    ///
    /// let set = PointSet::from_rows(2, vec![vec![0.9, 0.1], vec![0.2, 0.8]]).unwrap();
    /// assert_eq!(set.len(), 2);
    /// assert_eq!(set.get(1).coords, vec![0.2, 0.8]);
    /// ```
    pub fn from_rows(dim: usize, rows: Vec<Vec<f64>>) -> Result<Self, PointSetError> {
        let mut set = Self::new(dim)?;
        for row in rows {
            set.push(row)?;
        }
        Ok(set)
    }

    /// Append a point with the next sequential identifier.
    ///
    /// Sequential identifiers cannot collide unless the set also holds points
    /// added through [`PointSet::push_point`].
    pub fn push(&mut self, coords: Vec<f64>) -> Result<PointId, PointSetError> {
        let id = PointId(self.points.len());
        let point = Point::new(id, coords);
        self.validate(&point)?;
        self.points.push(point);
        Ok(id)
    }

    /// Append a point keeping its identifier.
    pub fn push_point(&mut self, point: Point) -> Result<(), PointSetError> {
        self.validate(&point)?;
        if self.points.iter().any(|p| p.id == point.id) {
            return Err(PointSetError::DuplicateId(point.id));
        }
        self.points.push(point);
        Ok(())
    }

    fn validate(&self, point: &Point) -> Result<(), PointSetError> {
        if point.dim() != self.dim {
            return Err(PointSetError::InconsistentDimensions {
                id: point.id,
                expected: self.dim,
                found: point.dim(),
            });
        }
        if let Some(attribute) = point.coords.iter().position(|v| !v.is_finite()) {
            return Err(PointSetError::NonFinite {
                id: point.id,
                attribute,
            });
        }
        Ok(())
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points in insertion order.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Point at arena position `index`. Panics when out of range, like slice indexing.
    pub fn get(&self, index: usize) -> &Point {
        &self.points[index]
    }

    /// Identifiers in insertion order.
    pub fn ids(&self) -> Vec<PointId> {
        self.points.iter().map(|p| p.id).collect()
    }

    /// Arena position of the point carrying `id` (linear scan).
    pub fn position_of(&self, id: PointId) -> Option<usize> {
        self.points.iter().position(|p| p.id == id)
    }

    /// Map from identifier to arena position, for repeated lookups.
    pub fn id_index(&self) -> HashMap<PointId, usize> {
        self.points
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id, i))
            .collect()
    }

    /// Mutable coordinates, used by in-place normalization.
    pub(crate) fn coords_mut(&mut self) -> impl Iterator<Item = &mut Vec<f64>> {
        self.points.iter_mut().map(|p| &mut p.coords)
    }

    /// New set with every point restricted to `attributes` (in the given order).
    ///
    /// Identifiers are preserved. Projecting onto `0..dim` reproduces the set.
    pub fn project(&self, attributes: &[usize]) -> PointSet {
        debug_assert!(attributes.iter().all(|&a| a < self.dim));
        PointSet {
            dim: attributes.len(),
            points: self
                .points
                .iter()
                .map(|p| Point::new(p.id, attributes.iter().map(|&a| p.coords[a]).collect()))
                .collect(),
        }
    }

    /// New set holding copies of the points at `indices` (in the given order).
    pub fn subset(&self, indices: &[usize]) -> PointSet {
        PointSet {
            dim: self.dim,
            points: indices.iter().map(|&i| self.points[i].clone()).collect(),
        }
    }

    /// New set holding copies of the points whose identifiers are in `ids`.
    ///
    /// Unknown identifiers are skipped; order follows `ids`.
    pub fn select_ids(&self, ids: &[PointId]) -> PointSet {
        let index = self.id_index();
        PointSet {
            dim: self.dim,
            points: ids
                .iter()
                .filter_map(|id| index.get(id).map(|&i| self.points[i].clone()))
                .collect(),
        }
    }
}
