//! Interactive search for the user's favourite tuple.
//!
//! Each round shows a few candidates; the choice adds one constraint per rejected
//! tuple to the [`UtilityRange`], the rejected tuples leave the candidate set, and
//! pruning removes every candidate that can no longer be the favourite. The loop
//! ends when one candidate remains, the regret bound reaches the target, the
//! question budget runs out, or the user stops.
//!
//! ```rust
//! use interactive_regret::budget::QuestionBudget;
//! use interactive_regret::config::MaxUtilityConfig;
//! use interactive_regret::max_utility::{InteractiveMaxUtility, Termination};
//! use interactive_regret::presenter::SimulatedUser;
//! use interactive_regret::PointSet;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let set = PointSet::from_rows(2, vec![
//!     vec![1.0, 0.0], vec![0.8, 0.5], vec![0.5, 0.8], vec![0.0, 1.0],
//! ]).unwrap();
//! let mut user = SimulatedUser::new(vec![0.3, 0.7], &set);
//! let mut budget = QuestionBudget::new(20);
//! let mut rng = StdRng::seed_from_u64(1);
//!
//! let outcome = InteractiveMaxUtility::new(&set, MaxUtilityConfig::default())
//!     .run(&mut budget, &mut user, &mut rng)
//!     .unwrap();
//! assert_eq!(outcome.termination, Termination::Converged);
//! assert_eq!(outcome.best_id.0, 2);
//! ```

use rand::Rng;
use tracing::{debug, info};

use crate::budget::QuestionBudget;
use crate::candidates::{current_best, prune, OptionSelector};
use crate::cone::UtilityRange;
use crate::config::MaxUtilityConfig;
use crate::error::ConfigError;
use crate::geometry::{is_zero, sub};
use crate::point::{PointId, PointSet};
use crate::presenter::{Answer, DisplayTable, Question, QuestionOption, QuestionPresenter};

/// Why the loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Termination {
    /// One candidate left or the regret bound reached the target.
    Converged,
    /// The shared budget or the round cap ran out.
    BudgetExhausted,
    /// The user answered [`Answer::Stop`].
    UserStopped,
}

/// State of a [`MaxUtilitySession`] after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Done(Termination),
}

/// Result of a finished loop.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MaxUtilityOutcome {
    /// Arena index of the recommended tuple in the input set.
    pub best: usize,
    pub best_id: PointId,
    /// Candidates left when the loop ended.
    pub candidates_left: usize,
    /// Questions answered in this loop.
    pub questions_asked: usize,
    /// Last regret bound (1 before any pruning).
    pub regret_bound: f64,
    pub termination: Termination,
}

/// Entry point: configuration plus how questions are displayed.
#[derive(Debug, Clone)]
pub struct InteractiveMaxUtility<'a> {
    points: &'a PointSet,
    config: MaxUtilityConfig,
    display: DisplayTable<'a>,
    attributes: Vec<usize>,
}

impl<'a> InteractiveMaxUtility<'a> {
    /// Questions show the points' own coordinates.
    pub fn new(points: &'a PointSet, config: MaxUtilityConfig) -> Self {
        Self {
            points,
            config,
            display: DisplayTable::new(points),
            attributes: (0..points.dim()).collect(),
        }
    }

    /// Show `attributes` (one per coordinate of the points, in the display set's
    /// attribute space) of the display set's tuples instead.
    pub fn with_display(mut self, display: DisplayTable<'a>, attributes: Vec<usize>) -> Self {
        debug_assert_eq!(attributes.len(), self.points.dim());
        self.display = display;
        self.attributes = attributes;
        self
    }

    /// Validate the configuration and open a session on all points.
    pub fn start(&self) -> Result<MaxUtilitySession<'_>, ConfigError> {
        self.config.validate()?;
        let candidates: Vec<usize> = (0..self.points.len()).collect();
        let range = UtilityRange::new(self.points.dim());
        let best = current_best(self.points, &candidates, &range).ok_or(ConfigError::EmptyPointSet)?;
        Ok(MaxUtilitySession {
            driver: self,
            candidates,
            range,
            selector: OptionSelector::new(self.config.selection),
            best,
            regret_ratio: 1.0,
            questions: 0,
            state: LoopState::Running,
        })
    }

    /// Run the loop to completion.
    pub fn run<P, R>(
        &self,
        budget: &mut QuestionBudget,
        presenter: &mut P,
        rng: &mut R,
    ) -> Result<MaxUtilityOutcome, ConfigError>
    where
        P: QuestionPresenter + ?Sized,
        R: Rng + ?Sized,
    {
        let mut session = self.start()?;
        while session.step(budget, presenter, rng) == LoopState::Running {}
        let outcome = session.outcome();
        info!(
            best = %outcome.best_id,
            questions = outcome.questions_asked,
            candidates = outcome.candidates_left,
            regret_bound = outcome.regret_bound,
            termination = ?outcome.termination,
            "max-utility finished"
        );
        Ok(outcome)
    }
}

/// Loop state between questions.
#[derive(Debug, Clone)]
pub struct MaxUtilitySession<'a> {
    driver: &'a InteractiveMaxUtility<'a>,
    candidates: Vec<usize>,
    range: UtilityRange,
    selector: OptionSelector,
    best: usize,
    regret_ratio: f64,
    questions: usize,
    state: LoopState,
}

impl MaxUtilitySession<'_> {
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Indices of the points still in the running.
    pub fn candidates(&self) -> &[usize] {
        &self.candidates
    }

    /// Utility vectors consistent with the answers so far.
    pub fn range(&self) -> &UtilityRange {
        &self.range
    }

    /// Questions answered in this session.
    pub fn questions_asked(&self) -> usize {
        self.questions
    }

    /// Ask one question (if the loop is still running) and return the new state.
    pub fn step<P, R>(&mut self, budget: &mut QuestionBudget, presenter: &mut P, rng: &mut R) -> LoopState
    where
        P: QuestionPresenter + ?Sized,
        R: Rng + ?Sized,
    {
        if self.state != LoopState::Running {
            return self.state;
        }
        if let Some(done) = self.check(budget) {
            self.state = LoopState::Done(done);
            return self.state;
        }

        let points = self.driver.points;
        self.candidates.sort_unstable();
        let shown = self.selector.select(
            points,
            &self.candidates,
            self.best,
            self.driver.config.options_per_question,
            rng,
        );
        let question = self.question(&shown);

        let chosen_pos = match presenter.ask(&question) {
            Answer::Stop => {
                debug!(questions = self.questions, "user stopped");
                self.state = LoopState::Done(Termination::UserStopped);
                return self.state;
            }
            Answer::Favorite(k) if k < shown.len() => k,
            Answer::Favorite(_) | Answer::NotInterested => 0,
        };
        budget.consume();
        self.questions += 1;

        let chosen = shown[chosen_pos];
        let chosen_coords = &points.get(chosen).coords;
        for (pos, &rejected) in shown.iter().enumerate() {
            if pos == chosen_pos {
                continue;
            }
            self.range
                .add_constraint(&sub(&points.get(rejected).coords, chosen_coords));
            self.candidates.retain(|&c| c != rejected);
        }
        self.best = chosen;
        debug!(
            question = self.questions,
            shown = shown.len(),
            chosen = %points.get(chosen).id,
            candidates = self.candidates.len(),
            "answer recorded"
        );

        if self.candidates.len() > 1 {
            let pruned = prune(
                points,
                &mut self.candidates,
                &self.range,
                self.driver.config.domination,
                self.driver.config.stop_rule,
            );
            self.regret_ratio = pruned.regret_ratio;
            if !self.candidates.contains(&self.best) {
                if let Some(best) = current_best(points, &self.candidates, &self.range) {
                    self.best = best;
                }
            }
        }

        if let Some(done) = self.check(budget) {
            self.state = LoopState::Done(done);
        }
        self.state
    }

    fn check(&self, budget: &QuestionBudget) -> Option<Termination> {
        let epsilon = self.driver.config.epsilon;
        if self.candidates.len() <= 1
            || self.regret_ratio < epsilon
            || is_zero(self.regret_ratio - epsilon)
        {
            Some(Termination::Converged)
        } else if budget.is_exhausted() || self.questions >= self.driver.config.max_rounds {
            Some(Termination::BudgetExhausted)
        } else {
            None
        }
    }

    fn question(&self, shown: &[usize]) -> Question {
        let driver = self.driver;
        let options = shown
            .iter()
            .map(|&i| {
                let point = driver.points.get(i);
                let values = driver
                    .display
                    .values(point.id, &driver.attributes)
                    .unwrap_or_else(|| point.coords.clone());
                QuestionOption {
                    id: point.id,
                    values,
                }
            })
            .collect();
        Question {
            attributes: driver.attributes.clone(),
            options,
        }
    }

    /// Recommendation for the current state: the estimated favourite among the
    /// remaining candidates.
    pub fn outcome(&self) -> MaxUtilityOutcome {
        let points = self.driver.points;
        let best = current_best(points, &self.candidates, &self.range).unwrap_or(self.best);
        MaxUtilityOutcome {
            best,
            best_id: points.get(best).id,
            candidates_left: self.candidates.len(),
            questions_asked: self.questions,
            regret_bound: self.regret_ratio,
            termination: match self.state {
                LoopState::Done(t) => t,
                LoopState::Running => Termination::BudgetExhausted,
            },
        }
    }
}
