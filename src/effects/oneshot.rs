//! One-shot effects: applied once when a spell or ability resolves.
//!
//! These are declarative records; the orchestrator interprets them. Any
//! state change they describe goes through the event bus, so replacement
//! and prevention effects get their chance at each of them.

use serde::{Deserialize, Serialize};

use super::value::DynamicValue;
use crate::continuous::{Duration, EffectScope, Modification};

/// A single resolution-time action.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum OneShot {
    /// Deal damage to each chosen target.
    DealDamage(DynamicValue),
    /// Destroy each chosen target.
    DestroyTarget,
    TapTarget,
    UntapTarget,
    /// Controller draws cards.
    DrawCards(usize),
    /// Controller gains life.
    GainLife(DynamicValue),
    /// Add mana to the controller's pool.
    AddMana(DynamicValue),
    /// Start a continuous effect.
    ApplyContinuous {
        scope: EffectScope,
        modification: Modification,
        duration: Duration,
    },
    /// Install a one-shot shield that prevents the next destruction of the
    /// source this turn, tapping it, removing it from combat and clearing
    /// its damage instead.
    RegenerateSource,
    /// Attach the resolving aura to its chosen target.
    AttachToTarget,
}
