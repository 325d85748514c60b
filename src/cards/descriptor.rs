//! Declarative card records.
//!
//! A card is data: printed characteristics, a cost, ability records, and
//! (for instants and sorceries) the one-shot effects the spell performs on
//! resolution. The engine interprets these records; cards carry no code.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::abilities::Ability;
use crate::core::{CardType, Characteristics, Color, Keyword, PlayerId};
use crate::effects::{OneShot, TargetSpec};

/// Identifier for a card record in the catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CardId(pub u32);

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "card{}", self.0)
    }
}

/// The printed description of a card.
#[derive(Clone, Debug)]
pub struct CardDescriptor {
    pub id: CardId,
    pub name: String,
    /// Generic mana cost to cast.
    pub cost: i64,
    pub card_types: Vec<CardType>,
    pub subtypes: Vec<String>,
    pub colors: Vec<Color>,
    pub keywords: Vec<Keyword>,
    pub power: i64,
    pub toughness: i64,
    /// Printed abilities, installed into the registry on instantiation.
    pub abilities: Vec<Ability>,
    /// Target requirement of the spell itself (instants, sorceries, auras).
    pub spell_targets: TargetSpec,
    /// One-shot effects applied when the spell resolves.
    pub spell_effects: Vec<OneShot>,
}

impl CardDescriptor {
    #[must_use]
    pub fn new(id: CardId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            cost: 0,
            card_types: Vec::new(),
            subtypes: Vec::new(),
            colors: Vec::new(),
            keywords: Vec::new(),
            power: 0,
            toughness: 0,
            abilities: Vec::new(),
            spell_targets: TargetSpec::None,
            spell_effects: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_cost(mut self, cost: i64) -> Self {
        self.cost = cost;
        self
    }

    /// Mark the card a creature with the given printed power/toughness.
    #[must_use]
    pub fn creature(mut self, power: i64, toughness: i64) -> Self {
        if !self.card_types.contains(&CardType::Creature) {
            self.card_types.push(CardType::Creature);
        }
        self.power = power;
        self.toughness = toughness;
        self
    }

    #[must_use]
    pub fn with_card_type(mut self, ty: CardType) -> Self {
        if !self.card_types.contains(&ty) {
            self.card_types.push(ty);
        }
        self
    }

    #[must_use]
    pub fn with_subtype(mut self, subtype: impl Into<String>) -> Self {
        self.subtypes.push(subtype.into());
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        if !self.colors.contains(&color) {
            self.colors.push(color);
        }
        self
    }

    #[must_use]
    pub fn with_keyword(mut self, keyword: Keyword) -> Self {
        if !self.keywords.contains(&keyword) {
            self.keywords.push(keyword);
        }
        self
    }

    #[must_use]
    pub fn with_ability(mut self, ability: Ability) -> Self {
        self.abilities.push(ability);
        self
    }

    #[must_use]
    pub fn with_spell_targets(mut self, targets: TargetSpec) -> Self {
        self.spell_targets = targets;
        self
    }

    #[must_use]
    pub fn with_spell_effect(mut self, effect: OneShot) -> Self {
        self.spell_effects.push(effect);
        self
    }

    /// The characteristics this card contributes before any continuous
    /// effect applies.
    #[must_use]
    pub fn base_characteristics(&self, controller: PlayerId) -> Characteristics {
        Characteristics {
            name: self.name.clone(),
            card_types: self.card_types.clone(),
            subtypes: self.subtypes.clone(),
            colors: self.colors.clone(),
            keywords: self.keywords.clone(),
            power: self.power,
            toughness: self.toughness,
            controller,
        }
    }
}
