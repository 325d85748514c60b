//! Game events.
//!
//! Every observable state change is announced as a `GameEvent` before it
//! happens. Events are immutable once raised: replacement effects never
//! edit an event in place, they produce a new one, and the raiser branches
//! on the returned [`EventOutcome`].

use serde::{Deserialize, Serialize};

use crate::core::{ObjectId, PlayerId, Timestamp};
use crate::zones::Zone;

/// The closed set of event kinds.
///
/// Being an enum (rather than stringly-typed ids) makes malformed event
/// kinds unrepresentable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    PhaseChanged,
    CastSpell,
    ActivateAbility,
    ZoneChange,
    EnteredBattlefield,
    DamageDealt,
    Destroyed,
    DrawCard,
    Tapped,
    Untapped,
    LifeChanged,
    AttackerDeclared,
}

/// An announced state change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    pub kind: EventKind,
    /// The object causing the change (spell, ability source, attacker).
    pub source: Option<ObjectId>,
    /// The object or player the change happens to.
    pub target: Option<ObjectId>,
    /// The player the event concerns (drawer, caster, life-changer).
    pub player: Option<PlayerId>,
    /// Magnitude: damage amount, life delta, step index.
    pub amount: i64,
    pub zone_from: Option<Zone>,
    pub zone_to: Option<Zone>,
    /// Free-form markers ("mana" on mana-ability activations).
    pub tags: Vec<String>,
    /// Stamped by the bus when raised.
    pub timestamp: Timestamp,
}

impl GameEvent {
    #[must_use]
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            source: None,
            target: None,
            player: None,
            amount: 0,
            zone_from: None,
            zone_to: None,
            tags: Vec::new(),
            timestamp: Timestamp::default(),
        }
    }

    /// Damage from `source` to `target`.
    #[must_use]
    pub fn damage(source: ObjectId, target: ObjectId, amount: i64) -> Self {
        Self::new(EventKind::DamageDealt)
            .with_source(source)
            .with_target(target)
            .with_amount(amount)
    }

    #[must_use]
    pub fn with_source(mut self, source: ObjectId) -> Self {
        self.source = Some(source);
        self
    }

    #[must_use]
    pub fn with_target(mut self, target: ObjectId) -> Self {
        self.target = Some(target);
        self
    }

    #[must_use]
    pub fn with_player(mut self, player: PlayerId) -> Self {
        self.player = Some(player);
        self
    }

    #[must_use]
    pub fn with_amount(mut self, amount: i64) -> Self {
        self.amount = amount;
        self
    }

    #[must_use]
    pub fn with_zones(mut self, from: Zone, to: Zone) -> Self {
        self.zone_from = Some(from);
        self.zone_to = Some(to);
        self
    }

    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// What happened to a raised event.
///
/// The raiser must branch on this: a `Replaced` outcome means the original
/// change must not be applied — the returned event describes what happens
/// instead.
#[derive(Clone, Debug, PartialEq)]
pub enum EventOutcome {
    /// No replacement applied; apply the change as announced.
    Proceeded,
    /// A replacement rewrote the event; apply the returned one instead.
    Replaced(GameEvent),
    /// A prevention effect stopped the change entirely.
    Prevented,
}
