//! Player decisions as synchronous request/response.
//!
//! The engine never blocks on input: whenever a rule needs a choice it
//! calls the game's [`DecisionProvider`] and gets an answer immediately.
//! Hosts bridge this to real players; timeouts are their concern — a
//! provider that cannot answer returns a default, which is exactly what
//! [`DefaultDecisions`] does.

use std::collections::VecDeque;

use crate::core::{ObjectId, PlayerId};

/// A choice the engine needs from a player.
#[derive(Clone, Debug, PartialEq)]
pub enum ChoiceSpec {
    /// Pick between `min` and `max` targets from `candidates`.
    Targets {
        candidates: Vec<ObjectId>,
        min: usize,
        max: usize,
    },
    /// A yes/no question.
    YesNo { prompt: String },
    /// Pick exactly `count` objects from `candidates` (sacrifices,
    /// discards).
    SelectObjects {
        candidates: Vec<ObjectId>,
        count: usize,
        prompt: String,
    },
    /// Order the listed items (simultaneous triggers, replacement
    /// effects). The answer is a permutation of indices.
    Order { options: Vec<String> },
}

/// A player's answer.
#[derive(Clone, Debug, PartialEq)]
pub enum Choice {
    Targets(Vec<ObjectId>),
    YesNo(bool),
    Objects(Vec<ObjectId>),
    Order(Vec<usize>),
}

/// Synchronous choice source.
///
/// Implementations must answer every call; returning a default is always
/// acceptable and never an error.
pub trait DecisionProvider: Send {
    fn choose(&mut self, player: PlayerId, spec: ChoiceSpec) -> Choice;
}

/// Answers every choice with the first legal default.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultDecisions;

impl DecisionProvider for DefaultDecisions {
    fn choose(&mut self, _player: PlayerId, spec: ChoiceSpec) -> Choice {
        match spec {
            ChoiceSpec::Targets {
                candidates, max, ..
            } => Choice::Targets(candidates.into_iter().take(max).collect()),
            ChoiceSpec::YesNo { .. } => Choice::YesNo(true),
            ChoiceSpec::SelectObjects {
                candidates, count, ..
            } => Choice::Objects(candidates.into_iter().take(count).collect()),
            ChoiceSpec::Order { options } => Choice::Order((0..options.len()).collect()),
        }
    }
}

/// Test provider: pops scripted answers, falls back to defaults.
#[derive(Debug, Default)]
pub struct ScriptedDecisions {
    queue: VecDeque<Choice>,
}

impl ScriptedDecisions {
    #[must_use]
    pub fn new(answers: impl IntoIterator<Item = Choice>) -> Self {
        Self {
            queue: answers.into_iter().collect(),
        }
    }

    pub fn push(&mut self, answer: Choice) {
        self.queue.push_back(answer);
    }
}

impl DecisionProvider for ScriptedDecisions {
    fn choose(&mut self, player: PlayerId, spec: ChoiceSpec) -> Choice {
        self.queue
            .pop_front()
            .unwrap_or_else(|| DefaultDecisions.choose(player, spec))
    }
}
