//! The full session: narrow the attributes, then recommend.
//!
//! Phases 1 and 2 ([`crate::narrowing`]) decide which attributes matter. Phase 3
//! projects the skyline onto them and either keeps asking (the max-utility loop
//! returns one tuple) or, once the budget is spent or the user has stopped,
//! returns a regret-minimizing set of `K` tuples without further questions.

use std::time::{Duration, Instant};

use rand::Rng;
use tracing::info;

use crate::attribute_subset::attribute_subset;
use crate::budget::QuestionBudget;
use crate::config::HighDimConfig;
use crate::dataset::Dataset;
use crate::error::{ConfigError, Error};
use crate::max_utility::{InteractiveMaxUtility, MaxUtilityOutcome, Termination};
use crate::narrowing::{DimensionNarrowing, Flow};
use crate::point::PointSet;
use crate::presenter::{DisplayTable, QuestionPresenter};
use crate::regret_set::{GreedyRegret, RegretHeuristic};
use crate::session::{Phase, SessionLog};
use crate::skyline::projected_skyline;

/// What phase 3 produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OutputMode {
    /// A single tuple found by the max-utility loop.
    ExactTuple,
    /// Up to `K` tuples chosen without further questions.
    RegretSet,
}

/// Result of a session.
#[derive(Debug, Clone)]
pub struct HighDimOutput {
    /// Recommended skyline tuples with all their attributes.
    pub points: PointSet,
    /// Attributes phase 3 worked on, ascending.
    pub final_dimensions: Vec<usize>,
    /// Time spent in phases 1 and 2.
    pub narrowing_time: Duration,
    /// Time spent in phase 3.
    pub recommendation_time: Duration,
    pub mode: OutputMode,
    /// Questions answered over the whole session.
    pub questions_asked: usize,
    /// Phase in which the user stopped, if they did.
    pub stopped_in: Option<Phase>,
    /// Diagnostics of the max-utility loop when it ran.
    pub max_utility: Option<MaxUtilityOutcome>,
}

/// Session driver.
///
/// `skyline` holds the normalized skyline with every attribute; questions show the
/// tuples of the display set (by default the skyline itself).
#[derive(Debug, Clone)]
pub struct InteractiveHighDim<'a, H = GreedyRegret> {
    skyline: &'a PointSet,
    display: &'a PointSet,
    config: HighDimConfig,
    heuristic: H,
    session: Option<SessionLog>,
}

impl<'a> InteractiveHighDim<'a, GreedyRegret> {
    /// Work on `skyline` and show its own values.
    pub fn new(skyline: &'a PointSet, config: HighDimConfig) -> Self {
        Self {
            skyline,
            display: skyline,
            config,
            heuristic: GreedyRegret,
            session: None,
        }
    }

    /// Work on the dataset's skyline and show its raw values.
    pub fn from_dataset(dataset: &'a Dataset, config: HighDimConfig) -> Self {
        Self::new(&dataset.skyline, config).with_display(&dataset.raw)
    }
}

impl<'a, H: RegretHeuristic> InteractiveHighDim<'a, H> {
    /// Show the values of `display` in questions, looked up by id.
    pub fn with_display(mut self, display: &'a PointSet) -> Self {
        self.display = display;
        self
    }

    /// Use `heuristic` for the regret-set output.
    pub fn with_heuristic<H2: RegretHeuristic>(self, heuristic: H2) -> InteractiveHighDim<'a, H2> {
        InteractiveHighDim {
            skyline: self.skyline,
            display: self.display,
            config: self.config,
            heuristic,
            session: self.session,
        }
    }

    /// Record the final phase in this session file.
    pub fn with_session_log(mut self, log: SessionLog) -> Self {
        self.session = Some(log);
        self
    }

    pub fn config(&self) -> &HighDimConfig {
        &self.config
    }

    /// Run narrowing and recommendation against `presenter`.
    pub fn run<P, R>(&self, presenter: &mut P, rng: &mut R) -> Result<HighDimOutput, Error>
    where
        P: QuestionPresenter + ?Sized,
        R: Rng + ?Sized,
    {
        let config = &self.config;
        if self.skyline.is_empty() {
            return Err(ConfigError::EmptyPointSet.into());
        }
        config.validate(self.skyline.dim())?;
        let mut budget = QuestionBudget::new(config.question_budget);
        let mut stopped_in = None;

        let narrowing_start = Instant::now();
        let mut narrowing =
            DimensionNarrowing::new(self.skyline, DisplayTable::new(self.display), config);
        if narrowing.screen_blocks(&mut budget, presenter, rng) == Flow::Stopped {
            stopped_in = Some(Phase::DimensionScreening);
        }
        narrowing.ensure_elimination(rng)?;
        if stopped_in.is_none() && narrowing.refine(&mut budget, presenter, rng)? == Flow::Stopped {
            stopped_in = Some(Phase::GroupTesting);
        }
        let final_dimensions = narrowing.into_state().final_dimensions(config.d_bar);
        let narrowing_time = narrowing_start.elapsed();
        info!(
            final_dimensions = ?final_dimensions,
            questions = budget.asked(),
            stopped_in = ?stopped_in,
            "dimension narrowing finished"
        );

        let recommendation_start = Instant::now();
        let (points, mode, max_utility) = if !budget.is_exhausted() && stopped_in.is_none() {
            let reduced = projected_skyline(self.skyline, &final_dimensions);
            let outcome = InteractiveMaxUtility::new(&reduced, config.max_utility.clone())
                .with_display(DisplayTable::new(self.display), final_dimensions.clone())
                .run(&mut budget, presenter, rng)?;
            if outcome.termination == Termination::UserStopped {
                stopped_in = Some(Phase::Recommendation);
            }
            let points = self.skyline.select_ids(&[outcome.best_id]);
            (points, OutputMode::ExactTuple, Some(outcome))
        } else {
            let ids = if final_dimensions.len() <= config.d_hat_2 {
                let reduced = projected_skyline(self.skyline, &final_dimensions);
                self.heuristic.select(&reduced, config.output_size)
            } else {
                attribute_subset(
                    &self.skyline.project(&final_dimensions),
                    config.d_hat_2,
                    config.output_size,
                    &self.heuristic,
                    rng,
                )?
            };
            (self.skyline.select_ids(&ids), OutputMode::RegretSet, None)
        };
        let recommendation_time = recommendation_start.elapsed();

        if let Some(log) = &self.session {
            let recorded = match stopped_in {
                Some(phase @ (Phase::DimensionScreening | Phase::GroupTesting)) => phase,
                _ => Phase::Recommendation,
            };
            log.record_phase(recorded);
        }

        info!(
            mode = ?mode,
            returned = points.len(),
            questions = budget.asked(),
            "session finished"
        );
        Ok(HighDimOutput {
            points,
            final_dimensions,
            narrowing_time,
            recommendation_time,
            mode,
            questions_asked: budget.asked(),
            stopped_in,
            max_utility,
        })
    }
}
