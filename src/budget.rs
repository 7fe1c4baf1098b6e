/// Questions still allowed in a session, shared by every phase.
///
/// One unit is consumed per answered question; a stop is not an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QuestionBudget {
    remaining: usize,
    asked: usize,
}

impl QuestionBudget {
    /// A budget of `limit` answered questions.
    pub fn new(limit: usize) -> Self {
        Self {
            remaining: limit,
            asked: 0,
        }
    }

    /// No questions left.
    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// Record one answered question. Returns `false` (and records nothing) when
    /// the budget was already exhausted.
    pub fn consume(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        self.asked += 1;
        true
    }

    /// Questions that may still be asked.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Questions answered so far.
    pub fn asked(&self) -> usize {
        self.asked
    }
}
