//! The ability registry: which abilities each object currently has.
//!
//! Authoritative store queried by the layering engine (static abilities),
//! the replacement layer (replacement abilities) and the orchestrator
//! (activated, mana, triggered). Printed abilities are installed at
//! instantiation; effects can grant more with a duration.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::{ObjectId, Timestamp};

use super::ability::Ability;

/// How long a granted ability lasts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrantDuration {
    /// Printed abilities: function while the object is in their
    /// functional zone, and come back when it returns.
    WhileOnBattlefield,
    EndOfTurn,
    Permanent,
}

/// An ability bound to its source object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GrantedAbility {
    pub ability: Ability,
    pub source: ObjectId,
    pub duration: GrantDuration,
    pub timestamp: Timestamp,
}

/// Per-object ability storage.
#[derive(Clone, Debug, Default)]
pub struct AbilityRegistry {
    by_object: FxHashMap<ObjectId, Vec<GrantedAbility>>,
}

impl AbilityRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install an object's printed abilities.
    pub fn install_printed(
        &mut self,
        object: ObjectId,
        abilities: &[Ability],
        timestamp: Timestamp,
    ) {
        let entry = self.by_object.entry(object).or_default();
        for ability in abilities {
            entry.push(GrantedAbility {
                ability: ability.clone(),
                source: object,
                duration: GrantDuration::WhileOnBattlefield,
                timestamp,
            });
        }
    }

    /// Grant an extra ability with a duration.
    pub fn grant(
        &mut self,
        object: ObjectId,
        ability: Ability,
        duration: GrantDuration,
        timestamp: Timestamp,
    ) {
        self.by_object.entry(object).or_default().push(GrantedAbility {
            ability,
            source: object,
            duration,
            timestamp,
        });
    }

    /// Every ability the object currently carries.
    #[must_use]
    pub fn abilities_of(&self, object: ObjectId) -> &[GrantedAbility] {
        self.by_object.get(&object).map_or(&[], Vec::as_slice)
    }

    /// Drop until-end-of-turn grants at cleanup.
    pub fn expire_end_of_turn(&mut self) {
        for abilities in self.by_object.values_mut() {
            abilities.retain(|g| g.duration != GrantDuration::EndOfTurn);
        }
    }

    /// Drop non-printed grants when an object changes zone.
    pub fn purge_granted(&mut self, object: ObjectId) {
        if let Some(abilities) = self.by_object.get_mut(&object) {
            abilities.retain(|g| g.duration == GrantDuration::WhileOnBattlefield);
        }
    }
}
