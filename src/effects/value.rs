//! Dynamic magnitudes, evaluated from live state.
//!
//! "Plus one for each card in your hand", "damage equal to its power",
//! "one mana for each creature with power 4 or greater you control" —
//! these never snapshot their value. Every evaluation reads the current
//! state through an [`EvalContext`], so a boost that depends on hand size
//! changes the moment a card is drawn or discarded.

use serde::{Deserialize, Serialize};

use super::filter::ObjectFilter;
use crate::continuous::EvalContext;
use crate::core::{ObjectId, PlayerId};

/// A quantity computed at use time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum DynamicValue {
    Fixed(i64),
    /// Number of cards in the controller's hand.
    CardsInHand,
    /// The computed power of the effect's source.
    SourcePower,
    /// Battlefield permanents matching a filter.
    CountMatching(ObjectFilter),
}

impl DynamicValue {
    /// Evaluate against live state.
    ///
    /// `source` and `controller` belong to the ability or effect the value
    /// is part of.
    #[must_use]
    pub fn evaluate(
        &self,
        ctx: &EvalContext<'_>,
        source: ObjectId,
        controller: PlayerId,
    ) -> i64 {
        match self {
            DynamicValue::Fixed(n) => *n,
            DynamicValue::CardsInHand => ctx.state.hand_size(controller) as i64,
            DynamicValue::SourcePower => ctx
                .characteristics_of(source)
                .map_or(0, |chars| chars.power),
            DynamicValue::CountMatching(filter) => ctx
                .state
                .battlefield()
                .into_iter()
                .filter(|&id| filter.matches(ctx, id, controller))
                .count() as i64,
        }
    }
}

impl From<i64> for DynamicValue {
    fn from(n: i64) -> Self {
        DynamicValue::Fixed(n)
    }
}
