//! Continuous effect records and the active-effect set.
//!
//! A continuous effect is a modification, a scope, a duration and the
//! timestamp at which it started applying. The layering engine gathers
//! active effects on every recomputation; this module only stores them.

use serde::{Deserialize, Serialize};

use crate::cards::CardId;
use crate::core::{CardType, Color, Keyword, ObjectId, PlayerId, Timestamp};
use crate::effects::{DynamicValue, ObjectFilter};

/// Layers, in strict application order.
///
/// Characteristics are computed by folding modifications layer by layer:
/// copy effects first, power/toughness switches last. The derived `Ord`
/// follows declaration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Layer {
    Copy,
    Control,
    Text,
    Type,
    Color,
    Ability,
    PowerSet,
    PowerModify,
    PowerSwitch,
}

impl Layer {
    /// All layers in application order.
    pub const ALL: [Layer; 9] = [
        Layer::Copy,
        Layer::Control,
        Layer::Text,
        Layer::Type,
        Layer::Color,
        Layer::Ability,
        Layer::PowerSet,
        Layer::PowerModify,
        Layer::PowerSwitch,
    ];
}

/// How long a continuous effect applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Duration {
    EndOfTurn,
    /// Active only while the source permanent is on the battlefield.
    WhileSourceOnBattlefield,
    Permanent,
}

/// What a static ability's effect applies to, relative to its source.
///
/// Resolved to a concrete [`AppliesTo`] when the effect is gathered
/// (statics) or installed (one-shots).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum EffectScope {
    /// The source object itself.
    Source,
    /// Whatever the source is attached to (auras).
    AttachedTo,
    /// The targets chosen for the resolving spell or ability.
    Target,
    /// Every battlefield object matching a filter.
    AllMatching(ObjectFilter),
}

/// Concrete application set of an active effect.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum AppliesTo {
    Object(ObjectId),
    AllMatching { filter: ObjectFilter, you: PlayerId },
}

/// A single characteristic modification. Each variant belongs to exactly
/// one layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Modification {
    /// Replace base characteristics with another card's printed values.
    CopyBase(CardId),
    SetController(PlayerId),
    SetName(String),
    AddCardType(CardType),
    RemoveCardType(CardType),
    SetColors(Vec<Color>),
    AddColor(Color),
    AddKeyword(Keyword),
    RemoveKeyword(Keyword),
    RemoveAllAbilities,
    SetPowerToughness(DynamicValue, DynamicValue),
    /// Set power equal to (current) toughness. Depends on same-layer
    /// effects that set toughness.
    SetPowerToToughness,
    Boost {
        power: DynamicValue,
        toughness: DynamicValue,
    },
    SwitchPowerToughness,
}

impl Modification {
    /// The layer this modification applies in.
    #[must_use]
    pub fn layer(&self) -> Layer {
        match self {
            Modification::CopyBase(_) => Layer::Copy,
            Modification::SetController(_) => Layer::Control,
            Modification::SetName(_) => Layer::Text,
            Modification::AddCardType(_) | Modification::RemoveCardType(_) => Layer::Type,
            Modification::SetColors(_) | Modification::AddColor(_) => Layer::Color,
            Modification::AddKeyword(_)
            | Modification::RemoveKeyword(_)
            | Modification::RemoveAllAbilities => Layer::Ability,
            Modification::SetPowerToughness(_, _) | Modification::SetPowerToToughness => {
                Layer::PowerSet
            }
            Modification::Boost { .. } => Layer::PowerModify,
            Modification::SwitchPowerToughness => Layer::PowerSwitch,
        }
    }
}

/// Identifier for an installed continuous effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EffectId(pub u64);

/// An active continuous effect.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContinuousEffect {
    pub id: EffectId,
    pub source: ObjectId,
    pub controller: PlayerId,
    pub applies_to: AppliesTo,
    pub modification: Modification,
    pub duration: Duration,
    pub timestamp: Timestamp,
}

/// The set of continuous effects installed by resolved one-shots.
///
/// Effects contributed by static abilities are not stored here; the
/// layering engine derives them from the ability registry on every
/// recomputation, so they stop applying the instant their source leaves
/// its functional zone.
#[derive(Clone, Debug, Default)]
pub struct ContinuousEffects {
    effects: Vec<ContinuousEffect>,
    next_id: u64,
}

impl ContinuousEffects {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(
        &mut self,
        source: ObjectId,
        controller: PlayerId,
        applies_to: AppliesTo,
        modification: Modification,
        duration: Duration,
        timestamp: Timestamp,
    ) -> EffectId {
        let id = EffectId(self.next_id);
        self.next_id += 1;
        self.effects.push(ContinuousEffect {
            id,
            source,
            controller,
            applies_to,
            modification,
            duration,
            timestamp,
        });
        id
    }

    pub fn remove(&mut self, id: EffectId) -> bool {
        let before = self.effects.len();
        self.effects.retain(|e| e.id != id);
        self.effects.len() != before
    }

    /// Drop until-end-of-turn effects at cleanup.
    pub fn expire_end_of_turn(&mut self) {
        self.effects.retain(|e| e.duration != Duration::EndOfTurn);
    }

    /// Drop while-on-battlefield effects whose source just left.
    pub fn remove_for_source(&mut self, source: ObjectId) {
        self.effects
            .retain(|e| !(e.source == source && e.duration == Duration::WhileSourceOnBattlefield));
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContinuousEffect> {
        self.effects.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_order_is_total() {
        for window in Layer::ALL.windows(2) {
            assert!(window[0] < window[1]);
        }
        assert!(Layer::Copy < Layer::PowerSwitch);
        assert!(Layer::PowerSet < Layer::PowerModify);
        assert!(Layer::PowerModify < Layer::PowerSwitch);
    }

    #[test]
    fn test_every_modification_has_a_layer() {
        let samples = [
            Modification::CopyBase(CardId(1)),
            Modification::SetController(PlayerId::new(0)),
            Modification::SetName("X".into()),
            Modification::AddCardType(CardType::Artifact),
            Modification::RemoveCardType(CardType::Creature),
            Modification::SetColors(vec![Color::Blue]),
            Modification::AddColor(Color::Red),
            Modification::AddKeyword(Keyword::Flying),
            Modification::RemoveKeyword(Keyword::Flying),
            Modification::RemoveAllAbilities,
            Modification::SetPowerToughness(DynamicValue::Fixed(1), DynamicValue::Fixed(1)),
            Modification::SetPowerToToughness,
            Modification::Boost {
                power: DynamicValue::Fixed(1),
                toughness: DynamicValue::Fixed(1),
            },
            Modification::SwitchPowerToughness,
        ];

        // Partitioning by layer must cover every variant.
        for m in &samples {
            assert!(Layer::ALL.contains(&m.layer()));
        }
    }

    #[test]
    fn test_duration_expiry() {
        let mut effects = ContinuousEffects::new();
        let p0 = PlayerId::new(0);
        let until_eot = effects.add(
            ObjectId(5),
            p0,
            AppliesTo::Object(ObjectId(5)),
            Modification::Boost {
                power: DynamicValue::Fixed(2),
                toughness: DynamicValue::Fixed(2),
            },
            Duration::EndOfTurn,
            Timestamp(1),
        );
        let while_on = effects.add(
            ObjectId(6),
            p0,
            AppliesTo::Object(ObjectId(7)),
            Modification::AddKeyword(Keyword::Flying),
            Duration::WhileSourceOnBattlefield,
            Timestamp(2),
        );

        effects.expire_end_of_turn();
        assert!(effects.iter().all(|e| e.id != until_eot));
        assert!(effects.iter().any(|e| e.id == while_on));

        effects.remove_for_source(ObjectId(6));
        assert!(effects.is_empty());
    }
}
