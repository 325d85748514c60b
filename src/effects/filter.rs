//! Object filters: immutable predicates over computed characteristics.
//!
//! Filters are value objects shared freely between abilities, target
//! requirements and dynamic magnitudes. They never mutate and never hold
//! references into game state; matching always goes through an
//! [`EvalContext`] so type and power checks see *computed* characteristics,
//! not printed ones.

use serde::{Deserialize, Serialize};

use crate::continuous::EvalContext;
use crate::core::{CardType, Characteristics, ObjectId, PlayerId};

/// Whose permanents a filter accepts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControllerFilter {
    #[default]
    Any,
    You,
    Opponents,
}

/// A predicate over game objects.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectFilter {
    /// Required card types (all must be present). Empty means any.
    pub card_types: Vec<CardType>,
    pub subtype: Option<String>,
    pub controller: ControllerFilter,
    pub min_power: Option<i64>,
}

impl ObjectFilter {
    /// Matches every object.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn creature() -> Self {
        Self {
            card_types: vec![CardType::Creature],
            ..Self::default()
        }
    }

    #[must_use]
    pub fn creature_you_control() -> Self {
        Self {
            card_types: vec![CardType::Creature],
            controller: ControllerFilter::You,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_subtype(mut self, subtype: impl Into<String>) -> Self {
        self.subtype = Some(subtype.into());
        self
    }

    #[must_use]
    pub fn with_min_power(mut self, power: i64) -> Self {
        self.min_power = Some(power);
        self
    }

    /// Match against already-computed characteristics.
    ///
    /// `you` is the controller of whatever carries the filter; controller
    /// tests read the controller characteristic, so control-changing
    /// effects are respected.
    #[must_use]
    pub fn matches_characteristics(&self, chars: &Characteristics, you: PlayerId) -> bool {
        if !self.card_types.iter().all(|t| chars.has_type(*t)) {
            return false;
        }
        if let Some(subtype) = &self.subtype {
            if !chars.has_subtype(subtype) {
                return false;
            }
        }
        match self.controller {
            ControllerFilter::Any => {}
            ControllerFilter::You => {
                if chars.controller != you {
                    return false;
                }
            }
            ControllerFilter::Opponents => {
                if chars.controller == you {
                    return false;
                }
            }
        }
        if let Some(min) = self.min_power {
            if chars.power < min {
                return false;
            }
        }
        true
    }

    /// Match a battlefield object by id, computing its characteristics.
    #[must_use]
    pub fn matches(&self, ctx: &EvalContext<'_>, object: ObjectId, you: PlayerId) -> bool {
        match ctx.characteristics_of(object) {
            Some(chars) => self.matches_characteristics(&chars, you),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Color;

    fn chars(types: Vec<CardType>, power: i64, controller: u8) -> Characteristics {
        Characteristics {
            name: "X".into(),
            card_types: types,
            subtypes: vec!["Troll".into()],
            colors: vec![Color::Green],
            keywords: vec![],
            power,
            toughness: 3,
            controller: PlayerId::new(controller),
        }
    }

    #[test]
    fn test_type_and_controller_checks() {
        let you = PlayerId::new(0);
        let creature = chars(vec![CardType::Creature], 2, 0);
        let theirs = chars(vec![CardType::Creature], 2, 1);
        let artifact = chars(vec![CardType::Artifact], 0, 0);

        assert!(ObjectFilter::creature().matches_characteristics(&creature, you));
        assert!(!ObjectFilter::creature().matches_characteristics(&artifact, you));
        assert!(!ObjectFilter::creature_you_control().matches_characteristics(&theirs, you));
        assert!(ObjectFilter::any().matches_characteristics(&artifact, you));
    }

    #[test]
    fn test_power_threshold_reads_given_characteristics() {
        let you = PlayerId::new(0);
        let filter = ObjectFilter::creature().with_min_power(4);

        assert!(!filter.matches_characteristics(&chars(vec![CardType::Creature], 3, 0), you));
        assert!(filter.matches_characteristics(&chars(vec![CardType::Creature], 4, 0), you));
    }

    #[test]
    fn test_subtype_check() {
        let you = PlayerId::new(0);
        let filter = ObjectFilter::creature().with_subtype("Troll");
        let other = ObjectFilter::creature().with_subtype("Drake");
        let c = chars(vec![CardType::Creature], 2, 0);

        assert!(filter.matches_characteristics(&c, you));
        assert!(!other.matches_characteristics(&c, you));
    }
}
