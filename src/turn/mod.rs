//! The turn/phase state machine.
//!
//! A fixed cycle of steps; the orchestrator raises a phase-change event on
//! every transition and performs the turn-based actions (untap, draw,
//! cleanup). Untap and cleanup do not normally grant priority.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Steps of a turn, in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Step {
    Untap,
    Upkeep,
    Draw,
    Main1,
    BeginCombat,
    DeclareAttackers,
    DeclareBlockers,
    CombatDamage,
    EndCombat,
    Main2,
    End,
    Cleanup,
}

impl Step {
    /// All steps in turn order.
    pub const ALL: [Step; 12] = [
        Step::Untap,
        Step::Upkeep,
        Step::Draw,
        Step::Main1,
        Step::BeginCombat,
        Step::DeclareAttackers,
        Step::DeclareBlockers,
        Step::CombatDamage,
        Step::EndCombat,
        Step::Main2,
        Step::End,
        Step::Cleanup,
    ];

    /// First step of a turn.
    #[must_use]
    pub fn first() -> Step {
        Step::Untap
    }

    /// Next step, or `None` at the end of the turn.
    #[must_use]
    pub fn next(self) -> Option<Step> {
        let index = Step::ALL.iter().position(|&s| s == self)?;
        Step::ALL.get(index + 1).copied()
    }

    /// Index within the turn (used as the amount on phase-change events).
    #[must_use]
    pub fn index(self) -> usize {
        Step::ALL.iter().position(|&s| s == self).unwrap_or(0)
    }

    /// Whether this is a combat step.
    #[must_use]
    pub fn is_combat(self) -> bool {
        matches!(
            self,
            Step::BeginCombat
                | Step::DeclareAttackers
                | Step::DeclareBlockers
                | Step::CombatDamage
                | Step::EndCombat
        )
    }

    #[must_use]
    pub fn is_main(self) -> bool {
        matches!(self, Step::Main1 | Step::Main2)
    }

    /// Whether players receive priority during this step.
    #[must_use]
    pub fn grants_priority(self) -> bool {
        !matches!(self, Step::Untap | Step::Cleanup)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}
