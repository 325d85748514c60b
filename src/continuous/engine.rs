//! The layering engine: computing characteristics on demand.
//!
//! `characteristics_of` is a pure function of the game state plus the
//! active continuous effects. Nothing is cached between calls; two calls
//! with no intervening state change return identical values.
//!
//! Effects from two places feed each computation:
//!
//! - installed effects (resolved one-shots) stored in [`ContinuousEffects`]
//! - effects derived live from static abilities of battlefield objects,
//!   via the ability registry
//!
//! Application order: the fixed layer order, then timestamps within a
//! layer, with dependency edges overriding timestamps. A dependency cycle
//! is logged, recorded on the context, and the layer falls back to
//! timestamp order.

use std::cell::RefCell;
use rustc_hash::FxHashSet;

use crate::abilities::{Ability, AbilityRegistry, GrantDuration};
use crate::cards::CardCatalog;
use crate::core::{Characteristics, EngineError, GameState, ObjectId};
use crate::zones::Zone;

use super::dependency;
use super::effect::{
    AppliesTo, ContinuousEffect, ContinuousEffects, Duration, EffectId, EffectScope, Layer,
    Modification,
};

/// Read-only view over everything characteristic computation needs.
pub struct EvalContext<'a> {
    pub state: &'a GameState,
    pub catalog: &'a CardCatalog,
    pub registry: &'a AbilityRegistry,
    pub effects: &'a ContinuousEffects,
    /// Objects currently being computed; breaks self-referential
    /// magnitude loops by falling back to base characteristics.
    in_progress: RefCell<FxHashSet<ObjectId>>,
    /// Last dependency cycle hit during computation, for the orchestrator
    /// to surface.
    cycle: RefCell<Option<EngineError>>,
}

impl<'a> EvalContext<'a> {
    #[must_use]
    pub fn new(
        state: &'a GameState,
        catalog: &'a CardCatalog,
        registry: &'a AbilityRegistry,
        effects: &'a ContinuousEffects,
    ) -> Self {
        Self {
            state,
            catalog,
            registry,
            effects,
            in_progress: RefCell::new(FxHashSet::default()),
            cycle: RefCell::new(None),
        }
    }

    /// Take the dependency-cycle defect recorded during computation, if any.
    pub fn take_cycle(&self) -> Option<EngineError> {
        self.cycle.borrow_mut().take()
    }

    /// Compute the current characteristics of an object.
    ///
    /// Returns `None` for ids that are not objects (players, removed ids).
    #[must_use]
    pub fn characteristics_of(&self, id: ObjectId) -> Option<Characteristics> {
        let object = self.state.object(id)?;

        let mut base = object.base.clone();
        base.controller = object.controller;

        // A magnitude that reads another object's power can loop back to
        // the object under computation; cut it off at base values.
        if !self.in_progress.borrow_mut().insert(id) {
            return Some(base);
        }
        let result = self.apply_layers(id, base);
        self.in_progress.borrow_mut().remove(&id);
        Some(result)
    }

    fn apply_layers(&self, id: ObjectId, mut chars: Characteristics) -> Characteristics {
        let active = self.gather_active();

        for layer in Layer::ALL {
            let in_layer: Vec<&ContinuousEffect> = active
                .iter()
                .filter(|e| e.modification.layer() == layer)
                .collect();
            if in_layer.is_empty() {
                continue;
            }

            let order = match dependency::order_layer(&in_layer) {
                Ok(order) => order,
                Err(err) => {
                    log::warn!("{err}; falling back to timestamp order");
                    *self.cycle.borrow_mut() = Some(err);
                    let mut by_time: Vec<usize> = (0..in_layer.len()).collect();
                    by_time.sort_by_key(|&i| (in_layer[i].timestamp, in_layer[i].id.0));
                    by_time
                }
            };

            for i in order {
                let effect = in_layer[i];
                if self.effect_covers(effect, id, &chars) {
                    self.apply(&effect.modification, &mut chars, effect);
                }
            }
        }
        chars
    }

    /// All effects currently applying, installed and static-derived.
    fn gather_active(&self) -> Vec<ContinuousEffect> {
        let battlefield = Zone::battlefield();
        let mut active: Vec<ContinuousEffect> = self
            .effects
            .iter()
            .filter(|e| match e.duration {
                Duration::EndOfTurn | Duration::Permanent => true,
                Duration::WhileSourceOnBattlefield => {
                    self.state.zones.is_in(e.source, battlefield)
                }
            })
            .cloned()
            .collect();

        for &source in self.state.zones.objects_in(battlefield) {
            let Some(object) = self.state.object(source) else {
                continue;
            };
            for (slot, granted) in self.registry.abilities_of(source).iter().enumerate() {
                let Ability::Static(ability) = &granted.ability else {
                    continue;
                };
                let applies_to = match &ability.scope {
                    EffectScope::Source => AppliesTo::Object(source),
                    EffectScope::AttachedTo => match object.attached_to {
                        Some(host) => AppliesTo::Object(host),
                        None => continue,
                    },
                    EffectScope::AllMatching(filter) => AppliesTo::AllMatching {
                        filter: filter.clone(),
                        you: object.controller,
                    },
                    // Target scopes only make sense for resolved one-shots.
                    EffectScope::Target => continue,
                };
                // Printed abilities use the object's battlefield timestamp;
                // granted ones the grant time.
                let timestamp = match granted.duration {
                    GrantDuration::WhileOnBattlefield => object.timestamp,
                    _ => granted.timestamp,
                };
                active.push(ContinuousEffect {
                    // Synthetic ids above the installed range keep ordering
                    // ties deterministic.
                    id: EffectId(u64::from(source.raw()) << 16 | slot as u64 | 1 << 63),
                    source,
                    controller: object.controller,
                    applies_to,
                    modification: ability.modification.clone(),
                    duration: Duration::WhileSourceOnBattlefield,
                    timestamp,
                });
            }
        }
        active
    }

    fn effect_covers(
        &self,
        effect: &ContinuousEffect,
        id: ObjectId,
        working: &Characteristics,
    ) -> bool {
        match &effect.applies_to {
            AppliesTo::Object(target) => *target == id,
            AppliesTo::AllMatching { filter, you } => {
                filter.matches_characteristics(working, *you)
            }
        }
    }

    fn apply(
        &self,
        modification: &Modification,
        chars: &mut Characteristics,
        effect: &ContinuousEffect,
    ) {
        match modification {
            Modification::CopyBase(card) => {
                if let Some(descriptor) = self.catalog.get(*card) {
                    let copied = descriptor.base_characteristics(chars.controller);
                    *chars = copied;
                }
            }
            Modification::SetController(player) => chars.controller = *player,
            Modification::SetName(name) => chars.name = name.clone(),
            Modification::AddCardType(ty) => {
                if !chars.card_types.contains(ty) {
                    chars.card_types.push(*ty);
                }
            }
            Modification::RemoveCardType(ty) => chars.card_types.retain(|t| t != ty),
            Modification::SetColors(colors) => chars.colors = colors.clone(),
            Modification::AddColor(color) => {
                if !chars.colors.contains(color) {
                    chars.colors.push(*color);
                }
            }
            Modification::AddKeyword(keyword) => {
                if !chars.keywords.contains(keyword) {
                    chars.keywords.push(*keyword);
                }
            }
            Modification::RemoveKeyword(keyword) => chars.keywords.retain(|k| k != keyword),
            Modification::RemoveAllAbilities => chars.keywords.clear(),
            Modification::SetPowerToughness(power, toughness) => {
                chars.power = power.evaluate(self, effect.source, effect.controller);
                chars.toughness = toughness.evaluate(self, effect.source, effect.controller);
            }
            Modification::SetPowerToToughness => chars.power = chars.toughness,
            Modification::Boost { power, toughness } => {
                chars.power += power.evaluate(self, effect.source, effect.controller);
                chars.toughness += toughness.evaluate(self, effect.source, effect.controller);
            }
            Modification::SwitchPowerToughness => {
                std::mem::swap(&mut chars.power, &mut chars.toughness);
            }
        }
    }
}
