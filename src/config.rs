//! Session parameters.
//!
//! Defaults reproduce the reference deployment: questions of two tuples, screening
//! blocks of seven attributes, five attributes kept, a budget of one hundred
//! questions and thirty tuples in the fallback output.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::ConfigError;

/// How the max-utility loop picks the tuples shown in one question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SelectionStrategy {
    /// Current best plus uniformly random other candidates.
    #[default]
    Random,
    /// Current best plus its neighbours on the frame of the point set.
    Simplex,
}

/// How the regret bound is recomputed after pruning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StopRule {
    /// Never stop on regret; run until one candidate or the budget is left.
    NoBound,
    /// Tight bound over the current utility range (one LP per candidate).
    #[default]
    ExactBound,
    /// Worst-direction bound ignoring the utility range (never smaller than exact).
    ApproxBound,
}

/// Which test decides that a candidate can never be the favourite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DominationTest {
    /// Compare utilities on every extreme ray of the utility range.
    #[default]
    Hyperplane,
    /// LP membership of the difference in the cone of extreme vectors.
    ConicalHull,
}

/// Parameters of the max-utility loop.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MaxUtilityConfig {
    /// Tuples shown per question (`s`).
    pub options_per_question: usize,
    /// Target regret ratio; the loop converges once the bound drops to it.
    pub epsilon: f64,
    /// Hard cap on questions asked by this loop.
    pub max_rounds: usize,
    pub selection: SelectionStrategy,
    pub stop_rule: StopRule,
    pub domination: DominationTest,
}

impl Default for MaxUtilityConfig {
    fn default() -> Self {
        Self {
            options_per_question: 3,
            epsilon: 0.0,
            max_rounds: 1000,
            selection: SelectionStrategy::Random,
            stop_rule: StopRule::ExactBound,
            domination: DominationTest::Hyperplane,
        }
    }
}

impl MaxUtilityConfig {
    /// Tuples shown per question (`s`).
    pub fn with_options_per_question(mut self, s: usize) -> Self {
        self.options_per_question = s;
        self
    }

    /// Regret bound at which the loop stops.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Hard cap on questions, independent of the shared budget.
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// How the alternatives to the current best are picked.
    pub fn with_selection(mut self, selection: SelectionStrategy) -> Self {
        self.selection = selection;
        self
    }

    /// Which regret bound drives the stopping test.
    pub fn with_stop_rule(mut self, stop_rule: StopRule) -> Self {
        self.stop_rule = stop_rule;
        self
    }

    /// Which test prunes dominated candidates.
    pub fn with_domination(mut self, domination: DominationTest) -> Self {
        self.domination = domination;
        self
    }

    /// Check every field for its allowed range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.options_per_question < 2 {
            return Err(ConfigError::invalid(
                "options_per_question",
                "a question needs at least two tuples",
            ));
        }
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err(ConfigError::invalid(
                "epsilon",
                format!("{} is not a non-negative number", self.epsilon),
            ));
        }
        Ok(())
    }
}

/// Parameters of the full high-dimensional session.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HighDimConfig {
    /// Tuples shown per screening question.
    pub question_size: usize,
    /// Attributes per screening block and per padded question (`d_hat`).
    pub d_hat: usize,
    /// Attributes sampled per attribute-subset round (`d_hat_2`).
    pub d_hat_2: usize,
    /// Size of the fallback output (`K`).
    pub output_size: usize,
    /// Number of attributes the session aims to keep (`d_bar`).
    pub d_bar: usize,
    /// Questions allowed across all phases.
    pub question_budget: usize,
    pub max_utility: MaxUtilityConfig,
    /// Seed for every random choice; `None` seeds from the clock.
    pub seed: Option<u64>,
}

impl Default for HighDimConfig {
    fn default() -> Self {
        Self {
            question_size: 2,
            d_hat: 7,
            d_hat_2: 6,
            output_size: 30,
            d_bar: 5,
            question_budget: 100,
            max_utility: MaxUtilityConfig::default(),
            seed: None,
        }
    }
}

impl HighDimConfig {
    /// Tuples shown per attribute question.
    pub fn with_question_size(mut self, question_size: usize) -> Self {
        self.question_size = question_size;
        self
    }

    /// Block size for screening and attributes shown per question.
    pub fn with_d_hat(mut self, d_hat: usize) -> Self {
        self.d_hat = d_hat;
        self
    }

    /// Attributes per random projection in the subset heuristic.
    pub fn with_d_hat_2(mut self, d_hat_2: usize) -> Self {
        self.d_hat_2 = d_hat_2;
        self
    }

    /// Tuples returned in regret-set mode (`K`).
    pub fn with_output_size(mut self, k: usize) -> Self {
        self.output_size = k;
        self
    }

    /// Attributes to confirm before recommending.
    pub fn with_d_bar(mut self, d_bar: usize) -> Self {
        self.d_bar = d_bar;
        self
    }

    /// Total questions across all phases.
    pub fn with_question_budget(mut self, budget: usize) -> Self {
        self.question_budget = budget;
        self
    }

    /// Settings of the recommendation loop.
    pub fn with_max_utility(mut self, max_utility: MaxUtilityConfig) -> Self {
        self.max_utility = max_utility;
        self
    }

    /// Seed for [`seeded_rng`].
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check the parameters against a point set of `dim` attributes.
    pub fn validate(&self, dim: usize) -> Result<(), ConfigError> {
        if self.d_hat == 0 || self.d_hat >= dim {
            return Err(ConfigError::invalid(
                "d_hat",
                format!("{} must lie in [1, {})", self.d_hat, dim),
            ));
        }
        for (field, value) in [
            ("question_size", self.question_size),
            ("d_hat_2", self.d_hat_2),
            ("output_size", self.output_size),
            ("d_bar", self.d_bar),
        ] {
            if value == 0 {
                return Err(ConfigError::invalid(field, "must be positive"));
            }
        }
        self.max_utility.validate()
    }
}

/// Random generator for a session: deterministic with a seed, clock-seeded otherwise.
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    let seed = seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default()
    });
    StdRng::seed_from_u64(seed)
}
