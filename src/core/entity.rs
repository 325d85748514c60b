//! Object and player identity.
//!
//! Every game object (card in a zone, spell on the stack) gets an
//! `ObjectId`. Player ids occupy the low range `0..player_count`, so an
//! `ObjectId` can be checked against the player range without a lookup
//! table — damage events target creatures and players through the same id
//! space.
//!
//! `Timestamp` is a monotonic counter ticked by the game state whenever an
//! object enters a zone or a continuous effect starts applying. Layer
//! ordering leans on it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a game object.
///
/// Players occupy ids `0..player_count`; all other objects are allocated
/// above that range and never reused within a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

impl ObjectId {
    /// The id reserved for a player.
    #[must_use]
    pub fn for_player(player: PlayerId) -> Self {
        Self(u32::from(player.0))
    }

    /// Interpret this id as a player, given the game's player count.
    #[must_use]
    pub fn as_player(self, player_count: usize) -> Option<PlayerId> {
        if (self.0 as usize) < player_count {
            Some(PlayerId(self.0 as u8))
        } else {
            None
        }
    }

    /// First id available for non-player objects.
    #[must_use]
    pub fn first_object(player_count: usize) -> Self {
        Self(player_count as u32)
    }

    /// Raw value, for indexing and display.
    #[must_use]
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Player identifier (seat number, 0-based).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    #[must_use]
    pub fn new(id: u8) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// The next player in turn order.
    #[must_use]
    pub fn next(self, player_count: usize) -> Self {
        Self(((self.index() + 1) % player_count) as u8)
    }

    /// All players, starting from seat 0.
    pub fn all(player_count: usize) -> impl Iterator<Item = PlayerId> {
        (0..player_count as u8).map(PlayerId)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Per-player storage indexed by `PlayerId`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerMap<T> {
    values: Vec<T>,
}

impl<T: Clone> PlayerMap<T> {
    /// Create a map with `player_count` copies of `value`.
    #[must_use]
    pub fn filled(player_count: usize, value: T) -> Self {
        Self {
            values: vec![value; player_count],
        }
    }
}

impl<T> PlayerMap<T> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &T)> {
        self.values
            .iter()
            .enumerate()
            .map(|(i, v)| (PlayerId(i as u8), v))
    }
}

impl<T> std::ops::Index<PlayerId> for PlayerMap<T> {
    type Output = T;

    fn index(&self, player: PlayerId) -> &T {
        &self.values[player.index()]
    }
}

impl<T> std::ops::IndexMut<PlayerId> for PlayerMap<T> {
    fn index_mut(&mut self, player: PlayerId) -> &mut T {
        &mut self.values[player.index()]
    }
}

/// Monotonic ordering stamp for objects and continuous effects.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Timestamp(pub u64);

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}
