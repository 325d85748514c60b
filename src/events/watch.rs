//! Event watching: the cheap-filter / full-check capability pair.
//!
//! Everything that reacts to events — replacement effects, prevention
//! shields, triggered abilities — implements [`EventObserver`]:
//!
//! - `checks_event_type` is a constant-time kind filter the bus uses to
//!   skip observers wholesale;
//! - `applies` is the full eligibility check and may read phase, zones
//!   and computed characteristics.
//!
//! [`EventWatch`] is the declarative form card records use; watches are
//! written relative to their source ("when *this* would be destroyed"),
//! and [`BoundWatch`] binds one to a concrete source and controller.

use serde::{Deserialize, Serialize};

use crate::continuous::EvalContext;
use crate::core::{CardType, ObjectId, PlayerId};

use super::event::{EventKind, GameEvent};

/// The two-method observer capability.
pub trait EventObserver {
    /// Cheap kind filter; must not read state.
    fn checks_event_type(&self, event: &GameEvent) -> bool;

    /// Full eligibility check; may read phase, zones, characteristics.
    fn applies(&self, event: &GameEvent, ctx: &EvalContext<'_>) -> bool;
}

/// Declarative event condition, relative to the ability's source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum EventWatch {
    /// Any event of the given kind.
    Kind(EventKind),
    /// Any event of the given kind concerning the watcher's controller.
    KindForYou(EventKind),
    /// The watcher's own source would be destroyed.
    SelfDestroyed,
    /// Damage would be dealt to the watcher's own source.
    DamageToSelf,
    /// A spell of the given (computed) type is cast during a combat step.
    CastDuringCombat(CardType),
    /// A non-mana ability is activated during a combat step.
    NonManaActivationDuringCombat,
}

impl EventWatch {
    /// The event kind this watch reacts to.
    #[must_use]
    pub fn event_kind(&self) -> EventKind {
        match self {
            EventWatch::Kind(kind) | EventWatch::KindForYou(kind) => *kind,
            EventWatch::SelfDestroyed => EventKind::Destroyed,
            EventWatch::DamageToSelf => EventKind::DamageDealt,
            EventWatch::CastDuringCombat(_) => EventKind::CastSpell,
            EventWatch::NonManaActivationDuringCombat => EventKind::ActivateAbility,
        }
    }
}

/// An [`EventWatch`] bound to a concrete source and controller.
pub struct BoundWatch<'a> {
    pub watch: &'a EventWatch,
    pub source: ObjectId,
    pub controller: PlayerId,
}

impl EventObserver for BoundWatch<'_> {
    fn checks_event_type(&self, event: &GameEvent) -> bool {
        self.watch.event_kind() == event.kind
    }

    fn applies(&self, event: &GameEvent, ctx: &EvalContext<'_>) -> bool {
        if !self.checks_event_type(event) {
            return false;
        }
        match self.watch {
            EventWatch::Kind(_) => true,
            EventWatch::KindForYou(_) => event.player == Some(self.controller),
            EventWatch::SelfDestroyed | EventWatch::DamageToSelf => {
                event.target == Some(self.source)
            }
            EventWatch::CastDuringCombat(card_type) => {
                if !ctx.state.step.is_combat() {
                    return false;
                }
                match event.source {
                    Some(spell) => ctx
                        .characteristics_of(spell)
                        .is_some_and(|chars| chars.has_type(*card_type)),
                    None => false,
                }
            }
            EventWatch::NonManaActivationDuringCombat => {
                ctx.state.step.is_combat() && !event.has_tag("mana")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind_mapping() {
        assert_eq!(EventWatch::SelfDestroyed.event_kind(), EventKind::Destroyed);
        assert_eq!(EventWatch::DamageToSelf.event_kind(), EventKind::DamageDealt);
        assert_eq!(
            EventWatch::CastDuringCombat(CardType::Instant).event_kind(),
            EventKind::CastSpell
        );
        assert_eq!(
            EventWatch::Kind(EventKind::DrawCard).event_kind(),
            EventKind::DrawCard
        );
    }

    #[test]
    fn test_kind_filter_needs_no_state() {
        let watch = EventWatch::SelfDestroyed;
        let bound = BoundWatch {
            watch: &watch,
            source: ObjectId(5),
            controller: PlayerId::new(0),
        };

        let destroy = GameEvent::new(EventKind::Destroyed).with_target(ObjectId(5));
        let draw = GameEvent::new(EventKind::DrawCard);

        assert!(bound.checks_event_type(&destroy));
        assert!(!bound.checks_event_type(&draw));
    }
}
