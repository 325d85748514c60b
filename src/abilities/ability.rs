//! Ability records: the five kinds of card behavior.
//!
//! Abilities are declarative data on card records. Each belongs to exactly
//! one source object once granted; the registry owns that association.

use serde::{Deserialize, Serialize};

use crate::continuous::{EffectScope, Modification};
use crate::effects::{DynamicValue, ObjectFilter, OneShot, TargetSpec};
use crate::events::{EventWatch, ReplacementAction};

/// A card ability.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Ability {
    Static(StaticAbility),
    Triggered(TriggeredAbility),
    Activated(ActivatedAbility),
    Mana(ManaAbility),
    Replacement(ReplacementAbility),
}

/// Applies a continuous modification for as long as the source is on the
/// battlefield.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StaticAbility {
    pub scope: EffectScope,
    pub modification: Modification,
}

/// Fires on a watched event and goes on the stack.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TriggeredAbility {
    pub watch: EventWatch,
    pub targets: TargetSpec,
    pub effects: Vec<OneShot>,
    /// Rules text shown in ordering choices and logs.
    pub text: String,
}

/// Activated for a cost; goes on the stack.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActivatedAbility {
    pub cost: Cost,
    pub targets: TargetSpec,
    pub effects: Vec<OneShot>,
    pub text: String,
}

/// Activated for a cost; resolves immediately without using the stack.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ManaAbility {
    pub cost: Cost,
    pub amount: DynamicValue,
}

/// Intercepts a watched event instead of reacting to it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReplacementAbility {
    pub watch: EventWatch,
    pub action: ReplacementAction,
}

/// What activating an ability (or casting a spell) costs.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Cost {
    pub mana: i64,
    pub tap_self: bool,
    /// Sacrifice a permanent matching the filter.
    pub sacrifice: Option<ObjectFilter>,
}

impl Cost {
    #[must_use]
    pub fn free() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn mana(amount: i64) -> Self {
        Self {
            mana: amount,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn tapping(mut self) -> Self {
        self.tap_self = true;
        self
    }

    #[must_use]
    pub fn sacrificing(mut self, filter: ObjectFilter) -> Self {
        self.sacrifice = Some(filter);
        self
    }
}
