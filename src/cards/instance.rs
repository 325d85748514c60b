//! Game objects: card instances in play.
//!
//! A `GameObject` carries the *base* characteristics (a copy of the
//! printed record at instantiation) plus the mutable per-object counters
//! the rules track directly: damage, tapped, attacking, attachment. The
//! final characteristics of an object always come from the layering
//! engine, never from this struct alone.

use serde::{Deserialize, Serialize};

use super::descriptor::{CardDescriptor, CardId};
use crate::core::{Characteristics, ObjectId, PlayerId, Timestamp};

/// A card instance somewhere in the game.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameObject {
    pub id: ObjectId,
    pub card: CardId,
    pub owner: PlayerId,
    pub controller: PlayerId,
    /// Printed characteristics, copied at instantiation.
    pub base: Characteristics,
    /// Damage marked this turn.
    pub damage: i64,
    pub tapped: bool,
    pub attacking: bool,
    /// For auras: the object this one is attached to.
    pub attached_to: Option<ObjectId>,
    /// When this object last entered its current zone.
    pub timestamp: Timestamp,
}

impl GameObject {
    #[must_use]
    pub fn new(
        id: ObjectId,
        descriptor: &CardDescriptor,
        owner: PlayerId,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            id,
            card: descriptor.id,
            owner,
            controller: owner,
            base: descriptor.base_characteristics(owner),
            damage: 0,
            tapped: false,
            attacking: false,
            attached_to: None,
            timestamp,
        }
    }

    /// Reset battlefield-only status when the object changes zone.
    pub fn reset_on_zone_exit(&mut self) {
        self.damage = 0;
        self.tapped = false;
        self.attacking = false;
        self.attached_to = None;
        self.controller = self.owner;
    }
}
