//! Replacement and prevention effects.
//!
//! `intercept` runs before any event takes effect. Each applicable effect
//! applies at most once per event — that is what rules out infinite
//! regress when a replacement produces an event other replacements also
//! watch. When several effects could apply, the affected player orders
//! them through the decision provider.
//!
//! Regeneration lives here: a one-shot shield that turns a specific
//! destruction into "tap it, remove it from combat, clear its damage".
//! The destroy event never reaches the zone-change step, and informational
//! triggers on destruction never see it.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::abilities::{Ability, AbilityRegistry};
use crate::cards::CardCatalog;
use crate::continuous::{ContinuousEffects, Duration, EvalContext};
use crate::core::{GameState, ObjectId, PlayerId};
use crate::decision::{Choice, ChoiceSpec, DecisionProvider};
use crate::zones::Zone;

use super::event::GameEvent;
use super::watch::{BoundWatch, EventObserver, EventWatch};

/// Result of running an event through the replacement layer.
#[derive(Clone, Debug, PartialEq)]
pub enum Interception {
    Unchanged,
    Replaced(GameEvent),
    Prevented,
}

/// What a replacement effect does to its event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ReplacementAction {
    /// Stop the event; the message is logged for the players.
    Prevent { message: String },
    /// Prevent a destruction and apply the regeneration follow-ons.
    Regenerate,
    /// Reduce incoming damage; `None` prevents all of it.
    PreventDamage { amount: Option<i64> },
    /// Redirect the event to a different target.
    Redirect { to: ObjectId },
}

/// Identifier for an installed replacement effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReplacementId(pub u64);

/// An installed replacement or prevention effect.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReplacementEffect {
    pub id: ReplacementId,
    pub source: ObjectId,
    pub controller: PlayerId,
    pub watch: EventWatch,
    pub action: ReplacementAction,
    /// Consumed by its first application (regeneration shields).
    pub one_shot: bool,
    pub duration: Duration,
}

impl EventObserver for ReplacementEffect {
    fn checks_event_type(&self, event: &GameEvent) -> bool {
        self.watch.event_kind() == event.kind
    }

    fn applies(&self, event: &GameEvent, ctx: &EvalContext<'_>) -> bool {
        BoundWatch {
            watch: &self.watch,
            source: self.source,
            controller: self.controller,
        }
        .applies(event, ctx)
    }
}

/// Distinguishes installed shields from ability-derived candidates in the
/// once-per-event bookkeeping.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
enum CandidateKey {
    Installed(ReplacementId),
    Granted(ObjectId, usize),
}

/// The replacement/prevention layer.
///
/// Candidates come from two places: shields installed by resolved
/// one-shots (stored here) and replacement abilities of battlefield
/// permanents (derived from the registry on every interception, so they
/// stop the moment their source leaves).
#[derive(Clone, Debug, Default)]
pub struct ReplacementLayer {
    installed: Vec<ReplacementEffect>,
    next_id: u64,
}

impl ReplacementLayer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn install(
        &mut self,
        source: ObjectId,
        controller: PlayerId,
        watch: EventWatch,
        action: ReplacementAction,
        one_shot: bool,
        duration: Duration,
    ) -> ReplacementId {
        let id = ReplacementId(self.next_id);
        self.next_id += 1;
        self.installed.push(ReplacementEffect {
            id,
            source,
            controller,
            watch,
            action,
            one_shot,
            duration,
        });
        id
    }

    pub fn expire_end_of_turn(&mut self) {
        self.installed.retain(|e| e.duration != Duration::EndOfTurn);
    }

    pub fn remove_for_source(&mut self, source: ObjectId) {
        self.installed.retain(|e| e.source != source);
    }

    #[must_use]
    pub fn installed(&self) -> &[ReplacementEffect] {
        &self.installed
    }

    /// Run an event through every applicable replacement effect.
    #[allow(clippy::too_many_arguments)]
    pub fn intercept(
        &mut self,
        event: GameEvent,
        state: &mut GameState,
        catalog: &CardCatalog,
        registry: &AbilityRegistry,
        effects: &ContinuousEffects,
        decisions: &mut dyn DecisionProvider,
    ) -> Interception {
        let mut current = event;
        let mut changed = false;
        let mut applied: FxHashSet<CandidateKey> = FxHashSet::default();

        loop {
            let mut candidates =
                self.applicable(&current, state, catalog, registry, effects, &applied);
            if candidates.is_empty() {
                break;
            }

            let pick = if candidates.len() == 1 {
                0
            } else {
                let chooser = affected_player(&current, state);
                let options = candidates
                    .iter()
                    .map(|(_, e)| describe(e, state))
                    .collect();
                let first = match decisions.choose(chooser, ChoiceSpec::Order { options }) {
                    Choice::Order(order) => order.first().copied().unwrap_or(0),
                    _ => 0,
                };
                first.min(candidates.len() - 1)
            };
            let (key, effect) = candidates.swap_remove(pick);

            applied.insert(key);
            if effect.one_shot {
                if let CandidateKey::Installed(id) = key {
                    self.installed.retain(|e| e.id != id);
                }
            }

            match effect.action {
                ReplacementAction::Prevent { ref message } => {
                    log::info!("{message}");
                    return Interception::Prevented;
                }
                ReplacementAction::Regenerate => {
                    if let Some(target) = current.target {
                        if let Some(object) = state.object_mut(target) {
                            object.tapped = true;
                            object.attacking = false;
                            object.damage = 0;
                            log::info!("{} regenerates", object.base.name);
                        }
                    }
                    return Interception::Prevented;
                }
                ReplacementAction::PreventDamage { amount } => {
                    let prevented = amount.unwrap_or(current.amount).min(current.amount);
                    current.amount -= prevented;
                    if current.amount <= 0 {
                        log::info!("all damage prevented");
                        return Interception::Prevented;
                    }
                    changed = true;
                }
                ReplacementAction::Redirect { to } => {
                    current.target = Some(to);
                    changed = true;
                }
            }
        }

        if changed {
            Interception::Replaced(current)
        } else {
            Interception::Unchanged
        }
    }

    /// Collect effects that watch this event and pass the full check,
    /// skipping ones already applied to it.
    fn applicable(
        &self,
        event: &GameEvent,
        state: &GameState,
        catalog: &CardCatalog,
        registry: &AbilityRegistry,
        effects: &ContinuousEffects,
        applied: &FxHashSet<CandidateKey>,
    ) -> Vec<(CandidateKey, ReplacementEffect)> {
        let ctx = EvalContext::new(state, catalog, registry, effects);
        let mut out = Vec::new();

        for effect in &self.installed {
            let key = CandidateKey::Installed(effect.id);
            if applied.contains(&key) || !effect.checks_event_type(event) {
                continue;
            }
            if effect.applies(event, &ctx) {
                out.push((key, effect.clone()));
            }
        }

        for &source in state.zones.objects_in(Zone::battlefield()) {
            let Some(object) = state.object(source) else {
                continue;
            };
            for (slot, granted) in registry.abilities_of(source).iter().enumerate() {
                let Ability::Replacement(ability) = &granted.ability else {
                    continue;
                };
                let key = CandidateKey::Granted(source, slot);
                if applied.contains(&key) {
                    continue;
                }
                let effect = ReplacementEffect {
                    id: ReplacementId(u64::MAX),
                    source,
                    controller: object.controller,
                    watch: ability.watch.clone(),
                    action: ability.action.clone(),
                    one_shot: false,
                    duration: Duration::WhileSourceOnBattlefield,
                };
                if effect.checks_event_type(event) && effect.applies(event, &ctx) {
                    out.push((key, effect));
                }
            }
        }
        out
    }
}

/// The player who gets to order simultaneous replacements: the one the
/// event happens to.
fn affected_player(event: &GameEvent, state: &GameState) -> PlayerId {
    if let Some(target) = event.target {
        if let Some(player) = target.as_player(state.player_count()) {
            return player;
        }
        if let Some(object) = state.object(target) {
            return object.controller;
        }
    }
    event.player.unwrap_or(state.active_player)
}

fn describe(effect: &ReplacementEffect, state: &GameState) -> String {
    let name = state
        .object(effect.source)
        .map(|o| o.base.name.clone())
        .or_else(|| {
            effect
                .source
                .as_player(state.player_count())
                .map(|p| p.to_string())
        })
        .unwrap_or_else(|| effect.source.to_string());
    match &effect.action {
        ReplacementAction::Prevent { message } => message.clone(),
        ReplacementAction::Regenerate => format!("regenerate with {name}"),
        ReplacementAction::PreventDamage { .. } => format!("prevent damage with {name}"),
        ReplacementAction::Redirect { .. } => format!("redirect with {name}"),
    }
}
