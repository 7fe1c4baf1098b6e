//! Reading and normalizing point files.
//!
//! The format is whitespace separated: a header `<count> <dim>` followed by
//! `count` rows of `dim` numbers. Line breaks inside a row are not significant.
//! Points receive identifiers `0..count` in file order.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::DatasetError;
use crate::point::PointSet;
use crate::skyline::skyline_set;

/// Parse a point file held in memory.
///
/// ```rust
/// use interactive_regret::dataset::parse_points;
///
/// let set = parse_points("2 3\n0.1 0.2 0.3\n0.4 0.5 0.6\n").unwrap();
/// assert_eq!((set.len(), set.dim()), (2, 3));
/// ```
pub fn parse_points(text: &str) -> Result<PointSet, DatasetError> {
    let mut tokens = text
        .lines()
        .enumerate()
        .flat_map(|(line, content)| content.split_whitespace().map(move |tok| (line + 1, tok)));

    let mut header = || -> Result<usize, DatasetError> {
        let (_, tok) = tokens.next().ok_or(DatasetError::MissingHeader)?;
        tok.parse().map_err(|_| DatasetError::MissingHeader)
    };
    let count = header()?;
    let dim = header()?;

    let total = count
        .checked_mul(dim)
        .ok_or(DatasetError::HeaderTooLarge { count, dim })?;

    let mut set = PointSet::new(dim)?;
    let mut row = Vec::new();
    let mut seen = 0;
    for (line, tok) in tokens.by_ref().take(total) {
        let value: f64 = tok.parse().map_err(|_| DatasetError::InvalidNumber {
            line,
            token: tok.to_string(),
        })?;
        row.push(value);
        seen += 1;
        if row.len() == dim {
            set.push(std::mem::take(&mut row))?;
        }
    }
    if seen < total {
        return Err(DatasetError::TooFewValues {
            expected: total,
            found: seen,
        });
    }
    if set.is_empty() {
        return Err(DatasetError::Empty);
    }
    Ok(set)
}

/// Read and parse the point file at `path`.
pub fn read_points(path: impl AsRef<Path>) -> Result<PointSet, DatasetError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let set = parse_points(&text)?;
    debug!(path = %path.display(), points = set.len(), dim = set.dim(), "loaded point file");
    Ok(set)
}

/// Min-max scale every attribute to `[0, 1]` in place.
///
/// A constant attribute becomes all zeros.
pub fn linear_normalize(set: &mut PointSet) {
    let dim = set.dim();
    let mut lo = vec![f64::INFINITY; dim];
    let mut hi = vec![f64::NEG_INFINITY; dim];
    for p in set.points() {
        for (k, &v) in p.coords.iter().enumerate() {
            lo[k] = lo[k].min(v);
            hi[k] = hi[k].max(v);
        }
    }
    for coords in set.coords_mut() {
        for (k, v) in coords.iter_mut().enumerate() {
            let range = hi[k] - lo[k];
            *v = if range > 0.0 { (*v - lo[k]) / range } else { 0.0 };
        }
    }
}

/// A loaded point file with the derived sets every session needs.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Values as read.
    pub raw: PointSet,
    /// Values scaled to `[0, 1]`.
    pub normalized: PointSet,
    /// Skyline of `normalized`.
    pub skyline: PointSet,
}

impl Dataset {
    /// Read the point file at `path` and derive the normalized sets.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        Ok(Self::from_points(read_points(path)?))
    }

    /// Normalize `raw` and compute its skyline.
    pub fn from_points(raw: PointSet) -> Self {
        let mut normalized = raw.clone();
        linear_normalize(&mut normalized);
        let skyline = skyline_set(&normalized);
        debug!(points = raw.len(), skyline = skyline.len(), "prepared dataset");
        Self {
            raw,
            normalized,
            skyline,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::PointSetError;

    #[test]
    fn rows_may_span_lines() {
        let set = parse_points("2 2\n1 2 3\n4\n").unwrap();
        assert_eq!(set.get(0).coords, vec![1.0, 2.0]);
        assert_eq!(set.get(1).coords, vec![3.0, 4.0]);
    }

    #[test]
    fn missing_header() {
        assert!(matches!(parse_points(""), Err(DatasetError::MissingHeader)));
        assert!(matches!(parse_points("x 2"), Err(DatasetError::MissingHeader)));
    }

    #[test]
    fn oversized_header_is_an_error() {
        // Only one value follows a header declaring `usize::MAX` attributes.
        assert!(matches!(
            parse_points("1 18446744073709551615\n1\n"),
            Err(DatasetError::TooFewValues {
                expected: usize::MAX,
                found: 1
            })
        ));
        assert!(matches!(
            parse_points("4611686018427387904 8\n1\n"),
            Err(DatasetError::HeaderTooLarge {
                count: 4611686018427387904,
                dim: 8
            })
        ));
    }

    #[test]
    fn invalid_number_reports_line() {
        match parse_points("1 2\n0.5 abc\n") {
            Err(DatasetError::InvalidNumber { line, token }) => {
                assert_eq!(line, 2);
                assert_eq!(token, "abc");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn truncated_file() {
        assert!(matches!(
            parse_points("2 2\n1 2 3\n"),
            Err(DatasetError::TooFewValues {
                expected: 4,
                found: 3
            })
        ));
    }

    #[test]
    fn zero_dimension_and_empty() {
        assert!(matches!(
            parse_points("1 0\n"),
            Err(DatasetError::PointSet(PointSetError::ZeroDimension))
        ));
        assert!(matches!(parse_points("0 2\n"), Err(DatasetError::Empty)));
    }

    #[test]
    fn non_finite_rejected() {
        assert!(matches!(
            parse_points("1 2\n1 inf\n"),
            Err(DatasetError::PointSet(PointSetError::NonFinite { .. }))
        ));
    }

    #[test]
    fn normalize_scales_and_zeroes_constants() {
        let mut set = PointSet::from_rows(2, vec![vec![2.0, 5.0], vec![4.0, 5.0], vec![3.0, 5.0]])
            .unwrap();
        linear_normalize(&mut set);
        let first: Vec<f64> = set.points().iter().map(|p| p.coords[0]).collect();
        assert_eq!(first, vec![0.0, 1.0, 0.5]);
        assert!(set.points().iter().all(|p| p.coords[1] == 0.0));
    }
}
