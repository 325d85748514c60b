//! Triggered abilities: arming, firing, batching.
//!
//! Each triggered ability of a battlefield permanent is an armed instance
//! in the dispatcher. The instance state machine:
//!
//! ```text
//! Armed --(matching event)--> Fired --(batched)--> Placed --(item resolves)--> Resolved --> Armed
//!   \                            \
//!    `--(source leaves)--> Expired `--(source leaves before placement)--> Expired
//! ```
//!
//! All instances fired by one event go onto the stack as a batch: each
//! controller orders their own, the active player's go on first, then the
//! rest in turn order (so the last player's resolve first). Targets are
//! chosen at placement, never at firing.

use serde::{Deserialize, Serialize};

use crate::abilities::TriggeredAbility;
use crate::continuous::EvalContext;
use crate::core::{GameState, ObjectId, PlayerId};
use crate::decision::{Choice, ChoiceSpec, DecisionProvider};
use crate::events::{BoundWatch, EventObserver, GameEvent};

/// Identifier for an armed trigger instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TriggerInstanceId(pub u64);

/// Lifecycle state of a trigger instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerState {
    /// Watching for its event.
    Armed,
    /// Matched an event; waiting to be placed on the stack.
    Fired,
    /// Drained into a stack batch; its item is pending resolution.
    Placed,
    /// Its stack item resolved. Transient: the dispatcher re-arms the
    /// instance immediately if the source is still around.
    Resolved,
    /// Source left its functional zone; the instance is dead.
    Expired,
}

/// One armed triggered ability.
#[derive(Clone, Debug)]
pub struct TriggerInstance {
    pub id: TriggerInstanceId,
    pub source: ObjectId,
    pub controller: PlayerId,
    pub ability: TriggeredAbility,
    pub state: TriggerState,
    /// The event that fired this instance, while `Fired`.
    pub fired_on: Option<GameEvent>,
}

/// A fired trigger handed to the stack.
#[derive(Clone, Debug)]
pub struct FiredTrigger {
    pub instance: TriggerInstanceId,
    pub source: ObjectId,
    pub controller: PlayerId,
    pub ability: TriggeredAbility,
    pub event: GameEvent,
}

/// Watches events and batches fired triggers for stack placement.
#[derive(Clone, Debug, Default)]
pub struct TriggerDispatcher {
    instances: Vec<TriggerInstance>,
    next_id: u64,
}

impl TriggerDispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a triggered ability for a source entering its functional zone.
    pub fn arm(
        &mut self,
        source: ObjectId,
        controller: PlayerId,
        ability: TriggeredAbility,
    ) -> TriggerInstanceId {
        let id = TriggerInstanceId(self.next_id);
        self.next_id += 1;
        self.instances.push(TriggerInstance {
            id,
            source,
            controller,
            ability,
            state: TriggerState::Armed,
            fired_on: None,
        });
        id
    }

    /// Expire every instance of a source that left its functional zone.
    pub fn expire_for_source(&mut self, source: ObjectId) {
        for instance in &mut self.instances {
            if instance.source == source {
                instance.state = TriggerState::Expired;
                instance.fired_on = None;
            }
        }
        self.instances
            .retain(|i| i.state != TriggerState::Expired);
    }

    /// Deliver an event to every armed instance. Returns how many fired.
    pub fn observe(&mut self, event: &GameEvent, ctx: &EvalContext<'_>) -> usize {
        let mut fired = 0;
        for instance in &mut self.instances {
            if instance.state != TriggerState::Armed {
                continue;
            }
            let bound = BoundWatch {
                watch: &instance.ability.watch,
                source: instance.source,
                controller: instance.controller,
            };
            if bound.checks_event_type(event) && bound.applies(event, ctx) {
                instance.state = TriggerState::Fired;
                instance.fired_on = Some(event.clone());
                fired += 1;
            }
        }
        fired
    }

    #[must_use]
    pub fn has_fired(&self) -> bool {
        self.instances
            .iter()
            .any(|i| i.state == TriggerState::Fired)
    }

    #[must_use]
    pub fn state_of(&self, id: TriggerInstanceId) -> Option<TriggerState> {
        self.instances.iter().find(|i| i.id == id).map(|i| i.state)
    }

    /// Collect every fired instance in stack-placement order.
    ///
    /// The returned list is in *push* order: the active player's triggers
    /// first (they resolve last), then each other player's in turn order.
    /// Controllers with several fired triggers order their own.
    pub fn take_batch(
        &mut self,
        state: &GameState,
        decisions: &mut dyn DecisionProvider,
    ) -> Vec<FiredTrigger> {
        let mut batch = Vec::new();
        for controller in state.turn_order_from(state.active_player) {
            let mut own: Vec<FiredTrigger> = Vec::new();
            for instance in &mut self.instances {
                if instance.state == TriggerState::Fired && instance.controller == controller {
                    let Some(event) = instance.fired_on.take() else {
                        instance.state = TriggerState::Armed;
                        continue;
                    };
                    instance.state = TriggerState::Placed;
                    own.push(FiredTrigger {
                        instance: instance.id,
                        source: instance.source,
                        controller,
                        ability: instance.ability.clone(),
                        event,
                    });
                }
            }
            if own.len() > 1 {
                let options = own.iter().map(|t| t.ability.text.clone()).collect();
                if let Choice::Order(order) =
                    decisions.choose(controller, ChoiceSpec::Order { options })
                {
                    let mut reordered = Vec::with_capacity(own.len());
                    let mut taken = vec![false; own.len()];
                    for &i in order.iter().filter(|&&i| i < own.len()) {
                        if !taken[i] {
                            taken[i] = true;
                            reordered.push(own[i].clone());
                        }
                    }
                    for (i, trigger) in own.into_iter().enumerate() {
                        if !taken[i] {
                            reordered.push(trigger);
                        }
                    }
                    own = reordered;
                }
            }
            batch.extend(own);
        }
        batch
    }

    /// Record that a fired instance's stack item finished resolving.
    ///
    /// The instance passes through `Resolved` and re-arms when the source
    /// is still in its functional zone, otherwise expires.
    pub fn note_resolved(&mut self, id: TriggerInstanceId, rearm: bool) {
        for instance in &mut self.instances {
            if instance.id == id {
                instance.state = if rearm {
                    TriggerState::Armed
                } else {
                    TriggerState::Expired
                };
                instance.fired_on = None;
            }
        }
        self.instances
            .retain(|i| i.state != TriggerState::Expired);
    }
}
