//! Interactive dimension narrowing and regret-minimizing recommendation.
//!
//! Given a large table of tuples with many numeric attributes (larger is better),
//! a session asks the user a bounded number of questions to find out which
//! attributes matter and then which tuple is their favourite:
//!
//! 1. [`narrowing`] screens blocks of attributes and isolates the interesting ones
//!    by group testing;
//! 2. [`max_utility`] shrinks the range of linear utilities consistent with the
//!    user's choices until one candidate tuple remains;
//! 3. when questions run out, [`attribute_subset`] and [`regret_set`] return a
//!    fixed-size set of tuples with small regret instead.
//!
//! [`highdim::InteractiveHighDim`] runs all of it. Questions go through the
//! [`presenter::QuestionPresenter`] trait, so the same session can be driven by a
//! terminal, a web front end, or the bundled [`presenter::SimulatedUser`].
//!
//! ```rust
//! use interactive_regret::config::{seeded_rng, HighDimConfig};
//! use interactive_regret::highdim::InteractiveHighDim;
//! use interactive_regret::presenter::SimulatedUser;
//! use interactive_regret::{skyline::skyline_set, PointSet};
//!
//! let rows: Vec<Vec<f64>> = (0..40)
//!     .map(|i| (0..10).map(|k| ((i * 7 + k * 13) % 17) as f64 / 16.0).collect())
//!     .collect();
//! let skyline = skyline_set(&PointSet::from_rows(10, rows).unwrap());
//!
//! let config = HighDimConfig::default().with_d_hat(3).with_d_bar(2).with_seed(7);
//! let mut user = SimulatedUser::new(vec![0.6, 0.4, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0], &skyline);
//! let mut rng = seeded_rng(config.seed);
//!
//! let output = InteractiveHighDim::new(&skyline, config).run(&mut user, &mut rng).unwrap();
//! assert!(!output.points.is_empty());
//! ```

pub mod attribute_subset;
pub mod budget;
pub mod candidates;
pub mod cone;
pub mod config;
pub mod dataset;
pub mod error;
pub mod geometry;
pub mod highdim;
pub mod lp;
pub mod max_utility;
pub mod narrowing;
pub mod point;
pub mod presenter;
pub mod regret_set;
pub mod session;
pub mod skyline;

pub use config::{HighDimConfig, MaxUtilityConfig};
pub use error::{ConfigError, DatasetError, Error};
pub use highdim::{HighDimOutput, InteractiveHighDim, OutputMode};
pub use point::{Point, PointId, PointSet, PointSetError};
pub use presenter::{Answer, Question, QuestionPresenter};
