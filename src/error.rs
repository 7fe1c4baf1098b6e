//! Error types.
//!
//! User stops and budget exhaustion are not errors; they are reported through
//! [`crate::max_utility::Termination`] and [`crate::highdim::HighDimOutput::stopped_in`].

use std::path::PathBuf;

use thiserror::Error;

use crate::point::PointSetError;

/// Invalid parameters or a parameter combination the data cannot support.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Fewer final attributes than the attribute-subset sample size.
    #[error("only {final_d} final attributes, attribute subsets need {d_hat_2}")]
    ProjectionTooNarrow { final_d: usize, d_hat_2: usize },
    /// Dimension screening eliminated every attribute.
    #[error("no attributes left alive after dimension screening")]
    NoAliveAttributes,
    /// The group regime produced a group size outside `[1, d_left]`.
    #[error("group size {group_size} is outside [1, {d_left}]")]
    InvalidGroupSize { group_size: usize, d_left: usize },
    /// A single parameter is out of range.
    #[error("invalid `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
    /// The input (or its skyline) holds no points.
    #[error("point set is empty")]
    EmptyPointSet,
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Failures while reading a point file.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The first line must be `<count> <dim>`.
    #[error("missing or malformed `<count> <dim>` header")]
    MissingHeader,
    /// `count * dim` does not fit in memory addressing.
    #[error("header declares {count} points of {dim} attributes, too many to read")]
    HeaderTooLarge { count: usize, dim: usize },
    #[error("line {line}: `{token}` is not a number")]
    InvalidNumber { line: usize, token: String },
    #[error("expected {expected} values, found {found}")]
    TooFewValues { expected: usize, found: usize },
    /// Dimension mismatch or non-finite value.
    #[error(transparent)]
    PointSet(#[from] PointSetError),
    #[error("dataset holds no points")]
    Empty,
}

/// Top-level error of the interactive pipeline.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Dataset(#[from] DatasetError),
}
