//! Questions, answers and the parties that answer them.
//!
//! Every interactive phase talks to the user through [`QuestionPresenter`]. The
//! crate ships two presenters: [`SimulatedUser`], which answers from a known
//! utility vector, and [`ScriptedPresenter`], which replays fixed answers.

use std::collections::{HashMap, VecDeque};

use crate::geometry::{dot, first_argmax, is_zero};
use crate::point::{PointId, PointSet};

/// One tuple shown to the user.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QuestionOption {
    pub id: PointId,
    /// Values of the shown attributes, in `Question::attributes` order.
    pub values: Vec<f64>,
}

/// A question: a few tuples restricted to a few attributes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Question {
    /// Indices of the shown attributes in the full attribute space.
    pub attributes: Vec<usize>,
    pub options: Vec<QuestionOption>,
}

impl Question {
    /// Build a question showing `attributes` of the points of `display` with the
    /// given identifiers. Unknown identifiers are skipped.
    pub fn from_display(display: &DisplayTable<'_>, ids: &[PointId], attributes: &[usize]) -> Self {
        let options = ids
            .iter()
            .filter_map(|&id| {
                display.values(id, attributes).map(|values| QuestionOption { id, values })
            })
            .collect();
        Self {
            attributes: attributes.to_vec(),
            options,
        }
    }
}

/// The user's reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Answer {
    /// Position (0-based) of the preferred option.
    Favorite(usize),
    /// None of the shown attributes matter to the user.
    NotInterested,
    /// End the session now.
    Stop,
}

/// Something that can answer questions (a terminal, a web form, a simulation).
pub trait QuestionPresenter {
    fn ask(&mut self, question: &Question) -> Answer;
}

impl<P: QuestionPresenter + ?Sized> QuestionPresenter for &mut P {
    fn ask(&mut self, question: &Question) -> Answer {
        (**self).ask(question)
    }
}

/// Values shown to the user, looked up by identifier.
///
/// Usually the raw (unnormalized) input, so questions show the numbers the user
/// knows rather than the scaled ones the algorithms work on.
#[derive(Debug, Clone)]
pub struct DisplayTable<'a> {
    set: &'a PointSet,
    index: HashMap<PointId, usize>,
}

impl<'a> DisplayTable<'a> {
    /// Index `set` by point identifier.
    pub fn new(set: &'a PointSet) -> Self {
        Self {
            set,
            index: set.id_index(),
        }
    }

    /// Values of point `id` at `attributes`, or `None` for an unknown id.
    pub fn values(&self, id: PointId, attributes: &[usize]) -> Option<Vec<f64>> {
        let point = self.set.get(*self.index.get(&id)?);
        attributes.iter().map(|&a| point.coords.get(a).copied()).collect()
    }
}

/// Answers like a user with a fixed linear utility over the full attribute space.
///
/// Attributes with zero weight are of no interest: a question whose attributes all
/// have zero weight gets [`Answer::NotInterested`]. Otherwise the option with the
/// highest utility on the shown attributes wins (first on ties).
#[derive(Debug, Clone)]
pub struct SimulatedUser<'a> {
    utility: Vec<f64>,
    display: DisplayTable<'a>,
    stop_after: Option<usize>,
    answered: usize,
}

impl<'a> SimulatedUser<'a> {
    /// `points` supplies the values the user judges by; they are looked up by id.
    pub fn new(utility: Vec<f64>, points: &'a PointSet) -> Self {
        Self {
            utility,
            display: DisplayTable::new(points),
            stop_after: None,
            answered: 0,
        }
    }

    /// Answer `n` questions, then stop.
    pub fn with_stop_after(mut self, n: usize) -> Self {
        self.stop_after = Some(n);
        self
    }

    /// Questions answered so far, not counting the stop.
    pub fn answered(&self) -> usize {
        self.answered
    }

    /// Full-space utility of the point with `id`, if known.
    pub fn utility_of(&self, id: PointId) -> Option<f64> {
        let all: Vec<usize> = (0..self.utility.len()).collect();
        self.display.values(id, &all).map(|v| dot(&self.utility, &v))
    }
}

impl QuestionPresenter for SimulatedUser<'_> {
    fn ask(&mut self, question: &Question) -> Answer {
        if self.stop_after.is_some_and(|n| self.answered >= n) {
            return Answer::Stop;
        }
        self.answered += 1;

        let weights: Vec<f64> = question
            .attributes
            .iter()
            .map(|&a| self.utility.get(a).copied().unwrap_or(0.0))
            .collect();
        if weights.iter().all(|&w| is_zero(w)) {
            return Answer::NotInterested;
        }
        // Judge by the user's own values, not by what the question happens to display.
        let score = |k: &usize| {
            let option = &question.options[*k];
            self.display
                .values(option.id, &question.attributes)
                .map_or(f64::NEG_INFINITY, |v| dot(&weights, &v))
        };
        match first_argmax(0..question.options.len(), score) {
            Some(k) => Answer::Favorite(k),
            None => Answer::NotInterested,
        }
    }
}

/// Replays a fixed list of answers; stops once the list runs out.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPresenter {
    answers: VecDeque<Answer>,
    asked: Vec<Question>,
}

impl ScriptedPresenter {
    /// Replay `answers` in order, then stop.
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            asked: Vec::new(),
        }
    }

    /// Every question received so far.
    pub fn questions(&self) -> &[Question] {
        &self.asked
    }
}

impl QuestionPresenter for ScriptedPresenter {
    fn ask(&mut self, question: &Question) -> Answer {
        self.asked.push(question.clone());
        self.answers.pop_front().unwrap_or(Answer::Stop)
    }
}
