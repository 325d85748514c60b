//! The stack: LIFO resolution with priority passing.
//!
//! Spells and non-mana abilities go on as items with their chosen targets;
//! the top item resolves when every player passes priority in succession.
//! `remove` supports counterspell-style cancellation of any queued item.
//!
//! The stack stores and orders; resolving an item's effects is the
//! orchestrator's job.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{ObjectId, PlayerId};
use crate::effects::{OneShot, TargetSpec};
use crate::triggers::TriggerInstanceId;

/// Identifier for a stack item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StackItemId(pub u32);

/// What kind of thing a stack item is.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum StackItemKind {
    /// A spell; `object` is the card on the stack zone.
    Spell { object: ObjectId },
    /// An activated ability of `source`.
    Ability { source: ObjectId },
    /// A fired triggered ability of `source`.
    Trigger {
        source: ObjectId,
        instance: TriggerInstanceId,
    },
}

/// A spell or ability waiting to resolve.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StackItem {
    pub id: StackItemId,
    pub kind: StackItemKind,
    pub controller: PlayerId,
    /// Targets chosen at placement; re-validated at resolution.
    pub targets: SmallVec<[ObjectId; 2]>,
    /// The requirement the targets were chosen against.
    pub target_spec: TargetSpec,
    pub effects: Vec<OneShot>,
    pub description: String,
}

/// LIFO stack plus the priority-passing counter.
#[derive(Clone, Debug)]
pub struct Stack {
    items: Vec<StackItem>,
    player_count: usize,
    current_priority: PlayerId,
    consecutive_passes: usize,
    next_id: u32,
}

impl Stack {
    #[must_use]
    pub fn new(player_count: usize) -> Self {
        Self {
            items: Vec::new(),
            player_count,
            current_priority: PlayerId::new(0),
            consecutive_passes: 0,
            next_id: 0,
        }
    }

    /// Push an item. Priority goes back to its controller and the pass
    /// counter resets — everyone gets a chance to respond.
    pub fn push(
        &mut self,
        kind: StackItemKind,
        controller: PlayerId,
        targets: SmallVec<[ObjectId; 2]>,
        target_spec: TargetSpec,
        effects: Vec<OneShot>,
        description: String,
    ) -> StackItemId {
        let id = StackItemId(self.next_id);
        self.next_id += 1;
        self.items.push(StackItem {
            id,
            kind,
            controller,
            targets,
            target_spec,
            effects,
            description,
        });
        self.current_priority = controller;
        self.consecutive_passes = 0;
        id
    }

    /// Remove and return the top item.
    pub fn pop(&mut self) -> Option<StackItem> {
        self.items.pop()
    }

    /// Remove a specific queued item (counterspell-style).
    pub fn remove(&mut self, id: StackItemId) -> Option<StackItem> {
        let index = self.items.iter().position(|i| i.id == id)?;
        Some(self.items.remove(index))
    }

    #[must_use]
    pub fn peek_top(&self) -> Option<&StackItem> {
        self.items.last()
    }

    /// Bottom-to-top view.
    #[must_use]
    pub fn items(&self) -> &[StackItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn priority_player(&self) -> PlayerId {
        self.current_priority
    }

    /// Hand priority to a player and reset the pass counter.
    pub fn set_priority(&mut self, player: PlayerId) {
        self.current_priority = player;
        self.consecutive_passes = 0;
    }

    /// The priority player passes. Returns true when every player has
    /// passed in succession — time to resolve the top item (or leave the
    /// step when the stack is empty).
    pub fn pass(&mut self, player: PlayerId) -> bool {
        if player != self.current_priority {
            return false;
        }
        self.consecutive_passes += 1;
        if self.consecutive_passes >= self.player_count {
            return true;
        }
        self.current_priority = self.current_priority.next(self.player_count);
        false
    }

    /// A player responded instead of passing: the chain restarts.
    pub fn reset_passes(&mut self) {
        self.consecutive_passes = 0;
    }
}
