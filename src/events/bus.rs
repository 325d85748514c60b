//! The event bus: raise, intercept, notify, log.
//!
//! Strict ordering contract: the replacement/prevention layer runs before
//! informational triggers see anything. A prevented event is logged but
//! never delivered; a replaced event is delivered in its replaced form.

use im::Vector;

use crate::abilities::AbilityRegistry;
use crate::cards::CardCatalog;
use crate::continuous::{ContinuousEffects, EvalContext};
use crate::core::GameState;
use crate::decision::DecisionProvider;
use crate::triggers::TriggerDispatcher;

use super::event::{EventOutcome, GameEvent};
use super::replacement::{Interception, ReplacementLayer};

/// Central dispatch point for all game events.
#[derive(Clone, Debug, Default)]
pub struct EventBus {
    pub replacements: ReplacementLayer,
    /// Append-only history of delivered and prevented events. Persistent
    /// vector: snapshots clone it in O(1).
    log: Vector<GameEvent>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise an event: replacement first, then trigger observation.
    ///
    /// The caller applies the actual state change afterwards, branching on
    /// the outcome — `Prevented` means do nothing, `Replaced` means apply
    /// the returned event instead of the announced one.
    #[allow(clippy::too_many_arguments)]
    pub fn raise(
        &mut self,
        event: GameEvent,
        state: &mut GameState,
        catalog: &CardCatalog,
        registry: &AbilityRegistry,
        effects: &ContinuousEffects,
        dispatcher: &mut TriggerDispatcher,
        decisions: &mut dyn DecisionProvider,
    ) -> EventOutcome {
        let mut event = event;
        event.timestamp = state.tick();

        match self
            .replacements
            .intercept(event.clone(), state, catalog, registry, effects, decisions)
        {
            Interception::Prevented => {
                log::debug!("prevented: {:?} {}", event.kind, event.timestamp);
                self.log.push_back(event.with_tag("prevented"));
                EventOutcome::Prevented
            }
            Interception::Unchanged => {
                let ctx = EvalContext::new(state, catalog, registry, effects);
                dispatcher.observe(&event, &ctx);
                self.log.push_back(event);
                EventOutcome::Proceeded
            }
            Interception::Replaced(replaced) => {
                let ctx = EvalContext::new(state, catalog, registry, effects);
                dispatcher.observe(&replaced, &ctx);
                self.log.push_back(replaced.clone());
                EventOutcome::Replaced(replaced)
            }
        }
    }

    /// The delivered-event history.
    #[must_use]
    pub fn log(&self) -> &Vector<GameEvent> {
        &self.log
    }
}
