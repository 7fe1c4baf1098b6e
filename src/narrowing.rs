//! Interactive narrowing of the attribute space.
//!
//! Phase 1 screens fixed blocks of `d_hat` attributes and drops every block the
//! user is not interested in. Phase 2 runs generalized binary splitting over the
//! surviving attributes: groups of a power-of-two size are tested at once, and a
//! group that interests the user is halved until one attribute is isolated and
//! confirmed. Phase 2 ends when `d_bar` attributes are confirmed, nothing is left
//! to test, the budget runs out, or the user stops.
//!
//! Every question shows a handful of random skyline tuples restricted to the
//! attributes under test, padded to `d_hat` attributes with attributes already
//! ruled out.

use std::collections::BTreeSet;

use rand::seq::index::sample;
use rand::Rng;
use tracing::{debug, info};

use crate::budget::QuestionBudget;
use crate::config::HighDimConfig;
use crate::error::ConfigError;
use crate::point::PointSet;
use crate::presenter::{Answer, DisplayTable, Question, QuestionPresenter};

/// Whether the session may continue after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep asking.
    Continue,
    /// The user answered [`Answer::Stop`].
    Stopped,
}

/// The user's reaction to one attribute question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reply {
    Interested,
    NotInterested,
    Stopped,
}

/// Attribute bookkeeping. `alive` and `confirmed` are disjoint subsets of `universe`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeState {
    universe: BTreeSet<usize>,
    alive: BTreeSet<usize>,
    confirmed: BTreeSet<usize>,
}

impl AttributeState {
    /// All `dim` attributes alive, none confirmed.
    pub fn new(dim: usize) -> Self {
        let universe: BTreeSet<usize> = (0..dim).collect();
        Self {
            alive: universe.clone(),
            universe,
            confirmed: BTreeSet::new(),
        }
    }

    /// Every attribute index.
    pub fn universe(&self) -> &BTreeSet<usize> {
        &self.universe
    }

    /// Attributes not yet ruled out nor confirmed.
    pub fn alive(&self) -> &BTreeSet<usize> {
        &self.alive
    }

    /// Attributes the user is known to care about.
    pub fn confirmed(&self) -> &BTreeSet<usize> {
        &self.confirmed
    }

    fn eliminate(&mut self, attributes: &[usize]) {
        for a in attributes {
            self.alive.remove(a);
        }
    }

    fn confirm(&mut self, attribute: usize) {
        self.alive.remove(&attribute);
        self.confirmed.insert(attribute);
    }

    /// Attributes that reach the recommendation phase, ascending.
    ///
    /// The confirmed attributes when nothing else is alive or `d_bar` are
    /// confirmed, otherwise confirmed and alive together. An empty result falls
    /// back to the first alive attributes, then to the first attributes overall.
    pub fn final_dimensions(&self, d_bar: usize) -> Vec<usize> {
        let chosen: BTreeSet<usize> = if self.alive.is_empty() || self.confirmed.len() == d_bar {
            self.confirmed.clone()
        } else {
            self.confirmed.union(&self.alive).copied().collect()
        };
        if !chosen.is_empty() {
            return chosen.into_iter().collect();
        }
        if !self.alive.is_empty() {
            return self.alive.iter().copied().take(d_bar).collect();
        }
        self.universe.iter().copied().take(d_bar).collect()
    }
}

/// Size of the next test group in the splitting regime.
///
/// With `l = d_left - d_target + 1`, the largest power of two `g` with
/// `d_target * g <= l`.
pub fn group_size(d_left: usize, d_target: usize) -> Result<usize, ConfigError> {
    let invalid = |group_size| ConfigError::InvalidGroupSize { group_size, d_left };
    if d_target == 0 || d_left + 1 < d_target {
        return Err(invalid(0));
    }
    let l = d_left + 1 - d_target;
    if l < d_target {
        return Err(invalid(0));
    }
    let mut group = 1usize;
    while d_target * group * 2 <= l {
        group *= 2;
    }
    if group > d_left {
        return Err(invalid(group));
    }
    Ok(group)
}

/// Phase 1 and phase 2 driver over a skyline with all attributes.
#[derive(Debug, Clone)]
pub struct DimensionNarrowing<'a> {
    skyline: &'a PointSet,
    display: DisplayTable<'a>,
    question_size: usize,
    d_hat: usize,
    d_bar: usize,
    state: AttributeState,
}

impl<'a> DimensionNarrowing<'a> {
    /// Narrow the attributes of `skyline`, showing values from `display`.
    pub fn new(skyline: &'a PointSet, display: DisplayTable<'a>, config: &HighDimConfig) -> Self {
        Self {
            skyline,
            display,
            question_size: config.question_size,
            d_hat: config.d_hat,
            d_bar: config.d_bar,
            state: AttributeState::new(skyline.dim()),
        }
    }

    pub fn state(&self) -> &AttributeState {
        &self.state
    }

    pub fn into_state(self) -> AttributeState {
        self.state
    }

    /// Phase 1: test blocks `[i * d_hat, (i + 1) * d_hat)`. A trailing partial
    /// block is never tested and stays alive.
    pub fn screen_blocks<P, R>(
        &mut self,
        budget: &mut QuestionBudget,
        presenter: &mut P,
        rng: &mut R,
    ) -> Flow
    where
        P: QuestionPresenter + ?Sized,
        R: Rng + ?Sized,
    {
        let blocks = self.skyline.dim() / self.d_hat;
        for i in 0..blocks {
            if budget.is_exhausted() {
                break;
            }
            let block: Vec<usize> = (i * self.d_hat..(i + 1) * self.d_hat).collect();
            match self.ask(&block, budget, presenter, rng) {
                Reply::Stopped => {
                    info!(block = i, "user stopped during dimension screening");
                    return Flow::Stopped;
                }
                Reply::NotInterested => {
                    self.state.eliminate(&block);
                    debug!(block = i, alive = self.state.alive.len(), "block eliminated");
                }
                Reply::Interested => {}
            }
        }
        Flow::Continue
    }

    /// If screening removed nothing, drop `d_hat` random attributes so that
    /// phase 2 questions have padding to draw from.
    pub fn ensure_elimination<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), ConfigError> {
        if self.state.alive == self.state.universe {
            let alive: Vec<usize> = self.state.alive.iter().copied().collect();
            let take = self.d_hat.min(alive.len());
            let dropped: Vec<usize> = sample(rng, alive.len(), take)
                .into_iter()
                .map(|k| alive[k])
                .collect();
            debug!(?dropped, "no block eliminated; dropping random attributes");
            self.state.eliminate(&dropped);
        }
        if self.state.alive.is_empty() {
            return Err(ConfigError::NoAliveAttributes);
        }
        Ok(())
    }

    /// Phase 2: confirm up to `d_bar` attributes.
    pub fn refine<P, R>(
        &mut self,
        budget: &mut QuestionBudget,
        presenter: &mut P,
        rng: &mut R,
    ) -> Result<Flow, ConfigError>
    where
        P: QuestionPresenter + ?Sized,
        R: Rng + ?Sized,
    {
        while !self.state.alive.is_empty()
            && self.state.confirmed.len() < self.d_bar
            && !budget.is_exhausted()
        {
            let d_target = self.d_bar - self.state.confirmed.len();
            let d_left = self.state.alive.len();

            if d_left + 2 <= 2 * d_target {
                let Some(&first) = self.state.alive.iter().next() else {
                    break;
                };
                match self.ask(&[first], budget, presenter, rng) {
                    Reply::Stopped => return Ok(Flow::Stopped),
                    Reply::NotInterested => self.state.eliminate(&[first]),
                    Reply::Interested => self.state.confirm(first),
                }
                continue;
            }

            let size = group_size(d_left, d_target)?;
            let group: Vec<usize> = self.state.alive.iter().copied().take(size).collect();
            debug!(d_left, d_target, group_size = size, "testing group");
            match self.ask(&group, budget, presenter, rng) {
                Reply::Stopped => return Ok(Flow::Stopped),
                Reply::NotInterested => self.state.eliminate(&group),
                Reply::Interested => {
                    if self.isolate_one(group, budget, presenter, rng) == Flow::Stopped {
                        return Ok(Flow::Stopped);
                    }
                }
            }
        }
        info!(
            confirmed = ?self.state.confirmed,
            alive = self.state.alive.len(),
            "dimension refinement finished"
        );
        Ok(Flow::Continue)
    }

    /// Binary search for one interesting attribute in `block` (which the user is
    /// known to care about). Each question tests the left `ceil(n / 2)`
    /// attributes; the last one left is confirmed. If the budget runs out first,
    /// the rest of the block stays alive.
    pub fn isolate_one<P, R>(
        &mut self,
        mut block: Vec<usize>,
        budget: &mut QuestionBudget,
        presenter: &mut P,
        rng: &mut R,
    ) -> Flow
    where
        P: QuestionPresenter + ?Sized,
        R: Rng + ?Sized,
    {
        while block.len() > 1 {
            if budget.is_exhausted() {
                return Flow::Continue;
            }
            let half = block.len().div_ceil(2);
            match self.ask(&block[..half], budget, presenter, rng) {
                Reply::Stopped => return Flow::Stopped,
                Reply::NotInterested => {
                    self.state.eliminate(&block[..half]);
                    block = block.split_off(half);
                }
                Reply::Interested => block.truncate(half),
            }
        }
        if let Some(&found) = block.first() {
            debug!(attribute = found, "attribute confirmed");
            self.state.confirm(found);
        }
        Flow::Continue
    }

    /// `attributes` plus random filler from the ruled-out attributes, up to
    /// `d_hat` in total, ascending.
    fn padded<R: Rng + ?Sized>(&self, attributes: &[usize], rng: &mut R) -> Vec<usize> {
        let pool: Vec<usize> = self
            .state
            .universe
            .iter()
            .copied()
            .filter(|a| {
                !self.state.alive.contains(a)
                    && !self.state.confirmed.contains(a)
                    && !attributes.contains(a)
            })
            .collect();
        let need = self.d_hat.saturating_sub(attributes.len()).min(pool.len());
        let mut shown: Vec<usize> = attributes.to_vec();
        shown.extend(sample(rng, pool.len(), need).into_iter().map(|k| pool[k]));
        shown.sort_unstable();
        shown
    }

    fn ask<P, R>(
        &self,
        attributes: &[usize],
        budget: &mut QuestionBudget,
        presenter: &mut P,
        rng: &mut R,
    ) -> Reply
    where
        P: QuestionPresenter + ?Sized,
        R: Rng + ?Sized,
    {
        let shown = self.padded(attributes, rng);
        let count = self.question_size.min(self.skyline.len());
        let ids: Vec<_> = sample(rng, self.skyline.len(), count)
            .into_iter()
            .map(|k| self.skyline.get(k).id)
            .collect();
        let question = Question::from_display(&self.display, &ids, &shown);
        match presenter.ask(&question) {
            Answer::Stop => Reply::Stopped,
            Answer::NotInterested => {
                budget.consume();
                Reply::NotInterested
            }
            Answer::Favorite(_) => {
                budget.consume();
                Reply::Interested
            }
        }
    }
}
