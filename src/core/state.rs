//! Mutable game state: objects, zones, life, mana, turn position.
//!
//! `GameState` is the single mutation target. Everything else — the
//! layering engine, the trigger dispatcher, the replacement layer — reads
//! it and asks the orchestrator to mutate it through events.

use rustc_hash::FxHashMap;

use super::entity::{ObjectId, PlayerId, PlayerMap, Timestamp};
use super::rng::GameRng;
use crate::cards::GameObject;
use crate::turn::Step;
use crate::zones::{Zone, ZoneManager, ZonePosition};

/// The complete mutable state of one game instance.
#[derive(Clone, Debug)]
pub struct GameState {
    player_count: usize,
    pub turn_number: u32,
    pub step: Step,
    pub active_player: PlayerId,
    life: PlayerMap<i64>,
    mana: PlayerMap<i64>,
    objects: FxHashMap<ObjectId, GameObject>,
    pub zones: ZoneManager,
    pub rng: GameRng,
    next_object_id: u32,
    next_timestamp: u64,
}

impl GameState {
    #[must_use]
    pub fn new(player_count: usize, starting_life: i64, seed: u64) -> Self {
        Self {
            player_count,
            turn_number: 1,
            step: Step::first(),
            active_player: PlayerId::new(0),
            life: PlayerMap::filled(player_count, starting_life),
            mana: PlayerMap::filled(player_count, 0),
            objects: FxHashMap::default(),
            zones: ZoneManager::new(),
            rng: GameRng::new(seed),
            next_object_id: ObjectId::first_object(player_count).raw(),
            next_timestamp: 1,
        }
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.player_count
    }

    pub fn players(&self) -> impl Iterator<Item = PlayerId> {
        PlayerId::all(self.player_count)
    }

    /// Players in turn order starting from `from`.
    #[must_use]
    pub fn turn_order_from(&self, from: PlayerId) -> Vec<PlayerId> {
        let mut order = Vec::with_capacity(self.player_count);
        let mut p = from;
        for _ in 0..self.player_count {
            order.push(p);
            p = p.next(self.player_count);
        }
        order
    }

    /// Allocate a fresh object id.
    pub fn alloc_object_id(&mut self) -> ObjectId {
        let id = ObjectId(self.next_object_id);
        self.next_object_id += 1;
        id
    }

    /// Tick the monotonic timestamp counter.
    pub fn tick(&mut self) -> Timestamp {
        let t = Timestamp(self.next_timestamp);
        self.next_timestamp += 1;
        t
    }

    /// Insert a new object and place it in its first zone.
    pub fn add_object(&mut self, object: GameObject, zone: Zone, position: ZonePosition) {
        let id = object.id;
        self.zones.place(id, zone, position);
        self.objects.insert(id, object);
    }

    #[must_use]
    pub fn object(&self, id: ObjectId) -> Option<&GameObject> {
        self.objects.get(&id)
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut GameObject> {
        self.objects.get_mut(&id)
    }

    /// Objects currently on the battlefield.
    #[must_use]
    pub fn battlefield(&self) -> Vec<ObjectId> {
        self.zones.objects_in(Zone::battlefield()).to_vec()
    }

    #[must_use]
    pub fn life(&self, player: PlayerId) -> i64 {
        self.life[player]
    }

    pub fn modify_life(&mut self, player: PlayerId, delta: i64) -> i64 {
        self.life[player] += delta;
        self.life[player]
    }

    #[must_use]
    pub fn mana(&self, player: PlayerId) -> i64 {
        self.mana[player]
    }

    pub fn add_mana(&mut self, player: PlayerId, amount: i64) {
        self.mana[player] += amount;
    }

    /// Deduct mana if the player has enough. Returns false otherwise.
    pub fn spend_mana(&mut self, player: PlayerId, amount: i64) -> bool {
        if self.mana[player] < amount {
            return false;
        }
        self.mana[player] -= amount;
        true
    }

    /// Mana pools empty between steps.
    pub fn clear_mana(&mut self) {
        for p in PlayerId::all(self.player_count).collect::<Vec<_>>() {
            self.mana[p] = 0;
        }
    }

    #[must_use]
    pub fn hand_size(&self, player: PlayerId) -> usize {
        self.zones.size(Zone::hand(player))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_allocation_skips_player_range() {
        let mut state = GameState::new(2, 20, 42);
        assert_eq!(state.alloc_object_id(), ObjectId(2));
        assert_eq!(state.alloc_object_id(), ObjectId(3));
    }

    #[test]
    fn test_timestamps_are_monotonic() {
        let mut state = GameState::new(2, 20, 42);
        let a = state.tick();
        let b = state.tick();
        assert!(a < b);
    }

    #[test]
    fn test_life_and_mana_accounting() {
        let mut state = GameState::new(2, 20, 42);
        let p1 = PlayerId::new(1);

        assert_eq!(state.modify_life(p1, -3), 17);
        state.add_mana(p1, 4);
        assert!(state.spend_mana(p1, 3));
        assert!(!state.spend_mana(p1, 2));
        assert_eq!(state.mana(p1), 1);

        state.clear_mana();
        assert_eq!(state.mana(p1), 0);
    }

    #[test]
    fn test_turn_order_wraps() {
        let state = GameState::new(3, 20, 42);
        let order = state.turn_order_from(PlayerId::new(2));
        assert_eq!(
            order,
            vec![PlayerId::new(2), PlayerId::new(0), PlayerId::new(1)]
        );
    }
}
