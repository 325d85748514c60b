//! Read-only serializable views of a game.
//!
//! A snapshot carries *computed* characteristics: hosts render what the
//! layering engine says, not printed values.

use serde::Serialize;

use crate::core::{CardType, Keyword, ObjectId, PlayerId};
use crate::turn::Step;
use crate::zones::Zone;

/// One object as the players see it.
#[derive(Clone, Debug, Serialize)]
pub struct ObjectView {
    pub id: ObjectId,
    pub name: String,
    pub card_types: Vec<CardType>,
    pub keywords: Vec<Keyword>,
    pub power: i64,
    pub toughness: i64,
    pub damage: i64,
    pub tapped: bool,
    pub controller: PlayerId,
}

/// A zone and its visible contents.
#[derive(Clone, Debug, Serialize)]
pub struct ZoneView {
    pub zone: Zone,
    pub objects: Vec<ObjectView>,
}

/// One pending stack item.
#[derive(Clone, Debug, Serialize)]
pub struct StackItemView {
    pub description: String,
    pub controller: PlayerId,
    pub targets: Vec<ObjectId>,
}

/// Per-player counters.
#[derive(Clone, Debug, Serialize)]
pub struct PlayerView {
    pub player: PlayerId,
    pub life: i64,
    pub mana: i64,
    pub hand_size: usize,
}

/// The full read-only view.
#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub turn_number: u32,
    pub step: Step,
    pub active_player: PlayerId,
    pub players: Vec<PlayerView>,
    pub zones: Vec<ZoneView>,
    pub stack: Vec<StackItemView>,
    pub event_count: usize,
}
