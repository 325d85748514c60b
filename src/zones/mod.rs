//! Zones and object placement.
//!
//! Every object is in exactly one zone at any time — `ZoneManager` owns
//! that invariant. Libraries, graveyards and the stack zone keep order;
//! hands, battlefield and exile do not. Library, hand and graveyard are
//! per-player; battlefield, stack and exile are shared.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::{GameRng, ObjectId, PlayerId};

/// The kinds of zone the rules know about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneKind {
    Library,
    Hand,
    Battlefield,
    Graveyard,
    Stack,
    Exile,
}

impl ZoneKind {
    /// Whether object order within the zone is meaningful.
    #[must_use]
    pub fn is_ordered(self) -> bool {
        matches!(self, ZoneKind::Library | ZoneKind::Graveyard | ZoneKind::Stack)
    }

    /// Whether the zone is shared by all players.
    #[must_use]
    pub fn is_shared(self) -> bool {
        matches!(self, ZoneKind::Battlefield | ZoneKind::Stack | ZoneKind::Exile)
    }
}

/// A concrete zone: kind plus owner for per-player zones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Zone {
    pub kind: ZoneKind,
    /// `None` for shared zones.
    pub owner: Option<PlayerId>,
}

impl Zone {
    #[must_use]
    pub fn library(player: PlayerId) -> Self {
        Self { kind: ZoneKind::Library, owner: Some(player) }
    }

    #[must_use]
    pub fn hand(player: PlayerId) -> Self {
        Self { kind: ZoneKind::Hand, owner: Some(player) }
    }

    #[must_use]
    pub fn graveyard(player: PlayerId) -> Self {
        Self { kind: ZoneKind::Graveyard, owner: Some(player) }
    }

    #[must_use]
    pub fn battlefield() -> Self {
        Self { kind: ZoneKind::Battlefield, owner: None }
    }

    #[must_use]
    pub fn stack() -> Self {
        Self { kind: ZoneKind::Stack, owner: None }
    }

    #[must_use]
    pub fn exile() -> Self {
        Self { kind: ZoneKind::Exile, owner: None }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.owner {
            Some(p) => write!(f, "{:?}({p})", self.kind),
            None => write!(f, "{:?}", self.kind),
        }
    }
}

/// Position within an ordered zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZonePosition {
    Top,
    Bottom,
    Index(usize),
}

/// Tracks which zone every object is in, plus order for ordered zones.
#[derive(Clone, Debug, Default)]
pub struct ZoneManager {
    locations: FxHashMap<ObjectId, Zone>,
    ordered: FxHashMap<Zone, Vec<ObjectId>>,
    unordered: FxHashMap<Zone, Vec<ObjectId>>,
}

impl ZoneManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Place an object that is not yet in any zone.
    ///
    /// Panics if the object is already placed — callers move objects with
    /// [`ZoneManager::move_to`].
    pub fn place(&mut self, object: ObjectId, zone: Zone, position: ZonePosition) {
        assert!(
            !self.locations.contains_key(&object),
            "object {object} is already in a zone"
        );
        self.locations.insert(object, zone);
        self.insert_into(object, zone, position);
    }

    /// Move an object to a new zone. Returns the zone it came from, or
    /// `None` if the object was not placed anywhere.
    pub fn move_to(
        &mut self,
        object: ObjectId,
        zone: Zone,
        position: ZonePosition,
    ) -> Option<Zone> {
        let from = self.remove(object)?;
        self.locations.insert(object, zone);
        self.insert_into(object, zone, position);
        Some(from)
    }

    /// Remove an object from its zone entirely.
    pub fn remove(&mut self, object: ObjectId) -> Option<Zone> {
        let zone = self.locations.remove(&object)?;
        let list = if zone.kind.is_ordered() {
            self.ordered.get_mut(&zone)
        } else {
            self.unordered.get_mut(&zone)
        };
        if let Some(list) = list {
            list.retain(|&id| id != object);
        }
        Some(zone)
    }

    #[must_use]
    pub fn zone_of(&self, object: ObjectId) -> Option<Zone> {
        self.locations.get(&object).copied()
    }

    #[must_use]
    pub fn is_in(&self, object: ObjectId, zone: Zone) -> bool {
        self.zone_of(object) == Some(zone)
    }

    /// Objects in a zone. For ordered zones index 0 is the bottom and the
    /// last element is the top.
    #[must_use]
    pub fn objects_in(&self, zone: Zone) -> &[ObjectId] {
        let list = if zone.kind.is_ordered() {
            self.ordered.get(&zone)
        } else {
            self.unordered.get(&zone)
        };
        list.map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn size(&self, zone: Zone) -> usize {
        self.objects_in(zone).len()
    }

    /// Top object of an ordered zone.
    #[must_use]
    pub fn top(&self, zone: Zone) -> Option<ObjectId> {
        debug_assert!(zone.kind.is_ordered());
        self.ordered.get(&zone).and_then(|l| l.last().copied())
    }

    /// Remove and return the top object of an ordered zone.
    pub fn pop_top(&mut self, zone: Zone) -> Option<ObjectId> {
        debug_assert!(zone.kind.is_ordered());
        let top = self.ordered.get_mut(&zone)?.pop()?;
        self.locations.remove(&top);
        Some(top)
    }

    /// Shuffle an ordered zone.
    pub fn shuffle(&mut self, zone: Zone, rng: &mut GameRng) {
        debug_assert!(zone.kind.is_ordered());
        if let Some(list) = self.ordered.get_mut(&zone) {
            rng.shuffle(list);
        }
    }

    fn insert_into(&mut self, object: ObjectId, zone: Zone, position: ZonePosition) {
        if zone.kind.is_ordered() {
            let list = self.ordered.entry(zone).or_default();
            match position {
                ZonePosition::Top => list.push(object),
                ZonePosition::Bottom => list.insert(0, object),
                ZonePosition::Index(i) => {
                    let i = i.min(list.len());
                    list.insert(i, object);
                }
            }
        } else {
            self.unordered.entry(zone).or_default().push(object);
        }
    }
}
