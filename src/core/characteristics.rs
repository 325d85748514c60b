//! Object characteristics: the values the layering engine computes.
//!
//! A `Characteristics` value is always *derived*: base values come from the
//! printed card, and the continuous-effects engine folds active
//! modifications over them in layer order. Nothing in the engine caches a
//! computed `Characteristics`; callers recompute on demand.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::entity::PlayerId;

/// Card types relevant to the rules engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CardType {
    Creature,
    Instant,
    Sorcery,
    Enchantment,
    Artifact,
    Land,
}

impl CardType {
    /// Whether objects of this type stay on the battlefield.
    #[must_use]
    pub fn is_permanent(self) -> bool {
        !matches!(self, CardType::Instant | CardType::Sorcery)
    }
}

impl fmt::Display for CardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CardType::Creature => "creature",
            CardType::Instant => "instant",
            CardType::Sorcery => "sorcery",
            CardType::Enchantment => "enchantment",
            CardType::Artifact => "artifact",
            CardType::Land => "land",
        };
        f.write_str(name)
    }
}

/// The five colors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Color {
    White,
    Blue,
    Black,
    Red,
    Green,
}

/// Keyword abilities carried as part of characteristics.
///
/// Keywords live in the ability layer: continuous effects can add or
/// remove them, and "loses all abilities" clears them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Keyword {
    Flying,
    Trample,
    Haste,
    Vigilance,
    Defender,
    Reach,
}

/// The full derived characteristics of a game object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Characteristics {
    pub name: String,
    pub card_types: Vec<CardType>,
    pub subtypes: Vec<String>,
    pub colors: Vec<Color>,
    pub keywords: Vec<Keyword>,
    pub power: i64,
    pub toughness: i64,
    /// Controller is a characteristic: the control layer may change it.
    pub controller: PlayerId,
}

impl Characteristics {
    #[must_use]
    pub fn has_type(&self, ty: CardType) -> bool {
        self.card_types.contains(&ty)
    }

    #[must_use]
    pub fn is_creature(&self) -> bool {
        self.has_type(CardType::Creature)
    }

    #[must_use]
    pub fn has_keyword(&self, keyword: Keyword) -> bool {
        self.keywords.contains(&keyword)
    }

    #[must_use]
    pub fn has_subtype(&self, subtype: &str) -> bool {
        self.subtypes.iter().any(|s| s == subtype)
    }

    /// Whether the object can stay on the battlefield.
    #[must_use]
    pub fn is_permanent(&self) -> bool {
        self.card_types.iter().any(|t| t.is_permanent())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bear() -> Characteristics {
        Characteristics {
            name: "Bear".into(),
            card_types: vec![CardType::Creature],
            subtypes: vec!["Bear".into()],
            colors: vec![Color::Green],
            keywords: vec![],
            power: 2,
            toughness: 2,
            controller: PlayerId::new(0),
        }
    }

    #[test]
    fn test_type_queries() {
        let c = bear();
        assert!(c.is_creature());
        assert!(c.is_permanent());
        assert!(!c.has_type(CardType::Instant));
        assert!(c.has_subtype("Bear"));
        assert!(!c.has_subtype("Troll"));
    }

    #[test]
    fn test_permanence_by_type() {
        assert!(CardType::Enchantment.is_permanent());
        assert!(!CardType::Instant.is_permanent());
        assert!(!CardType::Sorcery.is_permanent());
    }
}
