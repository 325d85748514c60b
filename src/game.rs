//! The orchestrator: one playable game instance.
//!
//! `Game` owns the state and every subsystem, and is the only place that
//! mutates state. The flow for any observable change is always the same:
//! announce it on the bus, branch on the outcome, apply it (or the
//! replacement), then batch fired triggers onto the stack and run
//! state-based actions.
//!
//! A `Game` is self-contained and `Send`; independent instances can run on
//! separate threads with nothing shared.

use smallvec::SmallVec;

use crate::abilities::{Ability, AbilityRegistry, ActivatedAbility, Cost, ManaAbility};
use crate::cards::{CardCatalog, CardId, GameObject};
use crate::continuous::{
    AppliesTo, ContinuousEffects, Duration, EffectScope, EvalContext,
};
use crate::core::{
    Characteristics, EngineError, FizzleReason, GameState, Keyword, ObjectId, PlayerId,
};
use crate::decision::{Choice, ChoiceSpec, DecisionProvider, DefaultDecisions};
use crate::effects::{OneShot, TargetSpec};
use crate::events::{
    EventBus, EventKind, EventOutcome, EventWatch, GameEvent, ReplacementAction,
    ReplacementLayer,
};
use crate::snapshot::{ObjectView, PlayerView, Snapshot, StackItemView, ZoneView};
use crate::stack::{Stack, StackItemKind};
use crate::triggers::TriggerDispatcher;
use crate::turn::Step;
use crate::zones::{Zone, ZonePosition};

/// Result of a player action (cast, activate, declare).
#[derive(Clone, Debug, PartialEq)]
pub enum ActionOutcome {
    Accepted,
    /// The action degraded to a logged no-op.
    Fizzled(FizzleReason),
    /// A replacement effect refused the action (e.g. a cast restriction).
    Prevented,
}

/// Result of resolving the top of the stack.
#[derive(Clone, Debug, PartialEq)]
pub enum ResolutionOutcome {
    Resolved,
    Fizzled(FizzleReason),
}

/// Result of a priority pass.
#[derive(Clone, Debug, PartialEq)]
pub enum PassOutcome {
    /// Someone still has priority.
    Waiting(PlayerId),
    /// Everyone passed and the top item resolved.
    Resolved(ResolutionOutcome),
    /// Everyone passed on an empty stack; the step is over.
    StackEmpty,
}

/// Terminal result of a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameResult {
    Winner(PlayerId),
    Draw,
}

/// Builder-style configuration for a game instance.
pub struct GameBuilder {
    catalog: CardCatalog,
    player_count: usize,
    starting_life: i64,
    starting_hand: usize,
    seed: u64,
    decisions: Box<dyn DecisionProvider>,
}

impl GameBuilder {
    #[must_use]
    pub fn new(catalog: CardCatalog) -> Self {
        Self {
            catalog,
            player_count: 2,
            starting_life: 20,
            starting_hand: 7,
            seed: 0,
            decisions: Box::new(DefaultDecisions),
        }
    }

    #[must_use]
    pub fn players(mut self, count: usize) -> Self {
        self.player_count = count;
        self
    }

    #[must_use]
    pub fn starting_life(mut self, life: i64) -> Self {
        self.starting_life = life;
        self
    }

    #[must_use]
    pub fn starting_hand(mut self, cards: usize) -> Self {
        self.starting_hand = cards;
        self
    }

    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn decisions(mut self, decisions: Box<dyn DecisionProvider>) -> Self {
        self.decisions = decisions;
        self
    }

    #[must_use]
    pub fn build(self) -> Game {
        Game {
            starting_hand: self.starting_hand,
            state: GameState::new(self.player_count, self.starting_life, self.seed),
            catalog: self.catalog,
            registry: AbilityRegistry::new(),
            continuous: ContinuousEffects::new(),
            bus: EventBus::new(),
            dispatcher: TriggerDispatcher::new(),
            stack: Stack::new(self.player_count),
            decisions: self.decisions,
            defect: None,
        }
    }
}

/// One game instance.
pub struct Game {
    starting_hand: usize,
    pub state: GameState,
    catalog: CardCatalog,
    registry: AbilityRegistry,
    continuous: ContinuousEffects,
    bus: EventBus,
    dispatcher: TriggerDispatcher,
    stack: Stack,
    decisions: Box<dyn DecisionProvider>,
    defect: Option<EngineError>,
}

impl Game {
    #[must_use]
    pub fn builder(catalog: CardCatalog) -> GameBuilder {
        GameBuilder::new(catalog)
    }

    /// The first non-recoverable defect hit by this instance, if any.
    #[must_use]
    pub fn defect(&self) -> Option<&EngineError> {
        self.defect.as_ref()
    }

    /// The delivered-event history.
    #[must_use]
    pub fn event_log(&self) -> &im::Vector<GameEvent> {
        self.bus.log()
    }

    /// The replacement/prevention layer, for hosts that install shields
    /// outside card effects.
    pub fn replacements_mut(&mut self) -> &mut ReplacementLayer {
        &mut self.bus.replacements
    }

    /// Compute an object's current characteristics.
    #[must_use]
    pub fn characteristics_of(&self, object: ObjectId) -> Option<Characteristics> {
        self.ctx().characteristics_of(object)
    }

    fn ctx(&self) -> EvalContext<'_> {
        EvalContext::new(&self.state, &self.catalog, &self.registry, &self.continuous)
    }

    /// Raise an event through the bus.
    pub fn raise(&mut self, event: GameEvent) -> EventOutcome {
        self.bus.raise(
            event,
            &mut self.state,
            &self.catalog,
            &self.registry,
            &self.continuous,
            &mut self.dispatcher,
            self.decisions.as_mut(),
        )
    }

    // ----- object lifecycle -------------------------------------------------

    /// Create an instance of a card in its owner's hand.
    ///
    /// Panics on an unknown card id; catalogs are fixed before play.
    pub fn instantiate(&mut self, card: CardId, owner: PlayerId) -> ObjectId {
        let descriptor = self.catalog.get_unchecked(card).clone();
        let id = self.state.alloc_object_id();
        let timestamp = self.state.tick();
        let object = GameObject::new(id, &descriptor, owner, timestamp);
        self.state
            .add_object(object, Zone::hand(owner), ZonePosition::Top);
        self.registry
            .install_printed(id, &descriptor.abilities, timestamp);
        id
    }

    /// Create an instance of a card on top of its owner's library.
    pub fn instantiate_in_library(&mut self, card: CardId, owner: PlayerId) -> ObjectId {
        let id = self.instantiate(card, owner);
        self.state
            .zones
            .move_to(id, Zone::library(owner), ZonePosition::Top);
        id
    }

    /// Move an object onto the battlefield, arming its triggered
    /// abilities and announcing the entry.
    pub fn put_on_battlefield(&mut self, object: ObjectId) {
        let from = match self.state.zones.zone_of(object) {
            Some(zone) => zone,
            None => return,
        };
        self.state
            .zones
            .move_to(object, Zone::battlefield(), ZonePosition::Top);
        let timestamp = self.state.tick();
        let controller = match self.state.object_mut(object) {
            Some(obj) => {
                obj.timestamp = timestamp;
                obj.controller
            }
            None => return,
        };
        for granted in self.registry.abilities_of(object).to_vec() {
            if let Ability::Triggered(ability) = granted.ability {
                self.dispatcher.arm(object, controller, ability);
            }
        }
        self.raise(
            GameEvent::new(EventKind::EnteredBattlefield)
                .with_target(object)
                .with_player(controller)
                .with_zones(from, Zone::battlefield()),
        );
        self.flush_triggers();
    }

    /// Announce a destruction; the replacement layer may regenerate.
    /// Returns true when the object actually died.
    pub fn destroy(&mut self, object: ObjectId) -> bool {
        let died = self.destroy_inner(object);
        self.state_based_actions();
        self.flush_triggers();
        died
    }

    fn destroy_inner(&mut self, object: ObjectId) -> bool {
        if !self.state.zones.is_in(object, Zone::battlefield()) {
            return false;
        }
        match self.raise(GameEvent::new(EventKind::Destroyed).with_target(object)) {
            EventOutcome::Prevented => false,
            EventOutcome::Proceeded => {
                self.move_to_graveyard(object);
                true
            }
            EventOutcome::Replaced(event) => {
                // A redirect names a new victim; the original survives.
                let victim = event.target.unwrap_or(object);
                if self.state.zones.is_in(victim, Zone::battlefield()) {
                    self.move_to_graveyard(victim);
                }
                victim == object
            }
        }
    }

    fn move_to_graveyard(&mut self, object: ObjectId) {
        let owner = match self.state.object(object) {
            Some(obj) => obj.owner,
            None => return,
        };
        let from = self
            .state
            .zones
            .move_to(object, Zone::graveyard(owner), ZonePosition::Top);
        if let Some(obj) = self.state.object_mut(object) {
            obj.reset_on_zone_exit();
        }
        self.registry.purge_granted(object);
        self.continuous.remove_for_source(object);
        self.bus.replacements.remove_for_source(object);
        self.dispatcher.expire_for_source(object);
        if let Some(from) = from {
            self.raise(
                GameEvent::new(EventKind::ZoneChange)
                    .with_target(object)
                    .with_zones(from, Zone::graveyard(owner)),
            );
        }
    }

    /// Shuffle every library and deal opening hands.
    ///
    /// Call after stocking libraries and before the first turn.
    pub fn draw_opening_hands(&mut self) {
        for player in self.state.players().collect::<Vec<_>>() {
            self.state
                .zones
                .shuffle(Zone::library(player), &mut self.state.rng);
            for _ in 0..self.starting_hand {
                self.draw_card(player);
            }
        }
    }

    fn draw_card(&mut self, player: PlayerId) {
        let library = Zone::library(player);
        if self.state.zones.top(library).is_none() {
            log::info!("{player} draws from an empty library");
            return;
        }
        let drawer = match self.raise(GameEvent::new(EventKind::DrawCard).with_player(player)) {
            EventOutcome::Prevented => return,
            EventOutcome::Proceeded => player,
            EventOutcome::Replaced(event) => {
                // A redirect hands the draw to whoever it now names.
                let players = self.state.player_count();
                event
                    .target
                    .and_then(|t| t.as_player(players))
                    .or(event.player)
                    .unwrap_or(player)
            }
        };
        match self.state.zones.pop_top(Zone::library(drawer)) {
            Some(card) => {
                self.state
                    .zones
                    .place(card, Zone::hand(drawer), ZonePosition::Top);
            }
            None => log::info!("{drawer} draws from an empty library"),
        }
    }

    // ----- casting and activation -------------------------------------------

    /// Cast a spell from hand, with targets chosen up front.
    pub fn cast_spell(
        &mut self,
        player: PlayerId,
        object: ObjectId,
        targets: &[ObjectId],
    ) -> ActionOutcome {
        if !self.state.zones.is_in(object, Zone::hand(player)) {
            return self.fizzle_action("cast", FizzleReason::ZoneMismatch);
        }
        let Some(card) = self.state.object(object).map(|o| o.card) else {
            return self.fizzle_action("cast", FizzleReason::ZoneMismatch);
        };
        let descriptor = self.catalog.get_unchecked(card).clone();

        if !self.targets_valid(&descriptor.spell_targets, player, targets) {
            return self.fizzle_action(&descriptor.name, FizzleReason::IllegalTarget);
        }
        if self.state.mana(player) < descriptor.cost {
            return self.fizzle_action(&descriptor.name, FizzleReason::InsufficientCost);
        }

        match self.raise(
            GameEvent::new(EventKind::CastSpell)
                .with_source(object)
                .with_player(player),
        ) {
            EventOutcome::Prevented => return ActionOutcome::Prevented,
            _ => {}
        }

        self.state.spend_mana(player, descriptor.cost);
        self.state
            .zones
            .move_to(object, Zone::stack(), ZonePosition::Top);
        self.stack.push(
            StackItemKind::Spell { object },
            player,
            SmallVec::from_slice(targets),
            descriptor.spell_targets.clone(),
            descriptor.spell_effects.clone(),
            descriptor.name.clone(),
        );
        self.flush_triggers();
        ActionOutcome::Accepted
    }

    /// Activate the `index`-th activated or mana ability of `source`.
    pub fn activate_ability(
        &mut self,
        player: PlayerId,
        source: ObjectId,
        index: usize,
        targets: &[ObjectId],
    ) -> ActionOutcome {
        if !self.state.zones.is_in(source, Zone::battlefield()) {
            return self.fizzle_action("activation", FizzleReason::ZoneMismatch);
        }
        let controller = self.state.object(source).map(|o| o.controller);
        if controller != Some(player) {
            return self.fizzle_action("activation", FizzleReason::ZoneMismatch);
        }

        let ability = self
            .registry
            .abilities_of(source)
            .iter()
            .filter_map(|g| match &g.ability {
                Ability::Activated(a) => Some(Activation::Stacked(a.clone())),
                Ability::Mana(m) => Some(Activation::Mana(m.clone())),
                _ => None,
            })
            .nth(index);
        let Some(ability) = ability else {
            return self.fizzle_action("activation", FizzleReason::ZoneMismatch);
        };

        match ability {
            Activation::Mana(mana) => self.activate_mana(player, source, &mana),
            Activation::Stacked(activated) => {
                self.activate_stacked(player, source, &activated, targets)
            }
        }
    }

    fn activate_mana(
        &mut self,
        player: PlayerId,
        source: ObjectId,
        ability: &ManaAbility,
    ) -> ActionOutcome {
        if !self.cost_payable(player, source, &ability.cost) {
            return self.fizzle_action("mana ability", FizzleReason::InsufficientCost);
        }
        match self.raise(
            GameEvent::new(EventKind::ActivateAbility)
                .with_source(source)
                .with_player(player)
                .with_tag("mana"),
        ) {
            EventOutcome::Prevented => return ActionOutcome::Prevented,
            _ => {}
        }
        if !self.pay_cost(player, source, &ability.cost) {
            return self.fizzle_action("mana ability", FizzleReason::InsufficientCost);
        }
        // Mana abilities skip the stack and resolve at once.
        let amount = {
            let ctx = self.ctx();
            ability.amount.evaluate(&ctx, source, player)
        };
        self.state.add_mana(player, amount);
        self.flush_triggers();
        ActionOutcome::Accepted
    }

    fn activate_stacked(
        &mut self,
        player: PlayerId,
        source: ObjectId,
        ability: &ActivatedAbility,
        targets: &[ObjectId],
    ) -> ActionOutcome {
        if !self.targets_valid(&ability.targets, player, targets) {
            return self.fizzle_action(&ability.text, FizzleReason::IllegalTarget);
        }
        if !self.cost_payable(player, source, &ability.cost) {
            return self.fizzle_action(&ability.text, FizzleReason::InsufficientCost);
        }
        match self.raise(
            GameEvent::new(EventKind::ActivateAbility)
                .with_source(source)
                .with_player(player),
        ) {
            EventOutcome::Prevented => return ActionOutcome::Prevented,
            _ => {}
        }
        if !self.pay_cost(player, source, &ability.cost) {
            return self.fizzle_action(&ability.text, FizzleReason::InsufficientCost);
        }
        self.stack.push(
            StackItemKind::Ability { source },
            player,
            SmallVec::from_slice(targets),
            ability.targets.clone(),
            ability.effects.clone(),
            ability.text.clone(),
        );
        self.flush_triggers();
        ActionOutcome::Accepted
    }

    fn cost_payable(&self, player: PlayerId, source: ObjectId, cost: &Cost) -> bool {
        if self.state.mana(player) < cost.mana {
            return false;
        }
        if cost.tap_self {
            match self.state.object(source) {
                Some(obj) if !obj.tapped => {}
                _ => return false,
            }
        }
        if let Some(filter) = &cost.sacrifice {
            let ctx = self.ctx();
            let any = self
                .state
                .battlefield()
                .into_iter()
                .any(|id| filter.matches(&ctx, id, player));
            if !any {
                return false;
            }
        }
        true
    }

    /// Pay a checked cost. Sacrifices pick their victim through the
    /// decision provider.
    fn pay_cost(&mut self, player: PlayerId, source: ObjectId, cost: &Cost) -> bool {
        if !self.state.spend_mana(player, cost.mana) {
            return false;
        }
        if cost.tap_self {
            match self.state.object_mut(source) {
                Some(obj) if !obj.tapped => obj.tapped = true,
                _ => return false,
            }
        }
        if let Some(filter) = &cost.sacrifice {
            let candidates: Vec<ObjectId> = {
                let ctx = self.ctx();
                self.state
                    .battlefield()
                    .into_iter()
                    .filter(|&id| filter.matches(&ctx, id, player))
                    .collect()
            };
            if candidates.is_empty() {
                return false;
            }
            let chosen = match self.decisions.choose(
                player,
                ChoiceSpec::SelectObjects {
                    candidates: candidates.clone(),
                    count: 1,
                    prompt: "sacrifice a permanent".into(),
                },
            ) {
                Choice::Objects(picked) => picked
                    .into_iter()
                    .find(|id| candidates.contains(id))
                    .unwrap_or(candidates[0]),
                _ => candidates[0],
            };
            self.move_to_graveyard(chosen);
        }
        true
    }

    fn targets_valid(&self, spec: &TargetSpec, player: PlayerId, targets: &[ObjectId]) -> bool {
        if targets.len() < spec.min_targets() || targets.len() > spec.max_targets() {
            return false;
        }
        if !spec.requires_targets() {
            return true;
        }
        let ctx = self.ctx();
        targets.iter().all(|&t| spec.is_legal(&ctx, player, t))
    }

    fn fizzle_action(&self, what: &str, reason: FizzleReason) -> ActionOutcome {
        log::info!("{what} fizzles: {reason}");
        ActionOutcome::Fizzled(reason)
    }

    // ----- the stack and priority -------------------------------------------

    #[must_use]
    pub fn stack_size(&self) -> usize {
        self.stack.len()
    }

    #[must_use]
    pub fn priority_player(&self) -> PlayerId {
        self.stack.priority_player()
    }

    /// Cancel a queued stack item (counterspell-style). The spell card, if
    /// any, goes to its owner's graveyard.
    pub fn cancel_stack_item(&mut self, id: crate::stack::StackItemId) -> bool {
        let Some(item) = self.stack.remove(id) else {
            return false;
        };
        match item.kind {
            StackItemKind::Spell { object } => self.move_to_graveyard(object),
            StackItemKind::Trigger { source, instance } => {
                let rearm = self.state.zones.is_in(source, Zone::battlefield());
                self.dispatcher.note_resolved(instance, rearm);
            }
            StackItemKind::Ability { .. } => {}
        }
        true
    }

    #[must_use]
    pub fn stack_items(&self) -> &[crate::stack::StackItem] {
        self.stack.items()
    }

    /// The priority player passes.
    pub fn pass_priority(&mut self, player: PlayerId) -> Result<PassOutcome, EngineError> {
        if !self.stack.pass(player) {
            return Ok(PassOutcome::Waiting(self.stack.priority_player()));
        }
        if self.stack.is_empty() {
            self.stack.set_priority(self.state.active_player);
            return Ok(PassOutcome::StackEmpty);
        }
        let outcome = self.resolve_top()?;
        Ok(PassOutcome::Resolved(outcome))
    }

    /// Resolve the top item of the stack.
    pub fn resolve_top(&mut self) -> Result<ResolutionOutcome, EngineError> {
        let Some(mut item) = self.stack.pop() else {
            let err = EngineError::StackCorruption("resolve requested on empty stack".into());
            self.defect = Some(err.clone());
            return Err(err);
        };

        // Re-validate targets; dropping to zero legal targets fizzles.
        if item.target_spec.requires_targets() && !item.targets.is_empty() {
            let legal: SmallVec<[ObjectId; 2]> = {
                let ctx = self.ctx();
                let kept: SmallVec<[ObjectId; 2]> = item
                    .targets
                    .iter()
                    .copied()
                    .filter(|&t| item.target_spec.is_legal(&ctx, item.controller, t))
                    .collect();
                if let Some(err) = ctx.take_cycle() {
                    self.defect.get_or_insert(err);
                }
                kept
            };
            if legal.is_empty() {
                log::info!("{} fizzles: {}", item.description, FizzleReason::IllegalTarget);
                self.finish_resolution(&item.kind, false);
                return Ok(ResolutionOutcome::Fizzled(FizzleReason::IllegalTarget));
            }
            item.targets = legal;
        }

        let effects = item.effects.clone();
        for effect in &effects {
            self.apply_one_shot(&item, effect);
        }

        self.finish_resolution(&item.kind, true);
        Ok(ResolutionOutcome::Resolved)
    }

    /// Common tail of resolution and fizzling: dispose of the item's
    /// object, update trigger state, then batch, check, re-grant priority.
    fn finish_resolution(&mut self, kind: &StackItemKind, resolved: bool) {
        match *kind {
            StackItemKind::Spell { object } => {
                let is_permanent = self
                    .characteristics_of(object)
                    .is_some_and(|c| c.is_permanent());
                if resolved && is_permanent {
                    self.put_on_battlefield(object);
                } else {
                    self.move_to_graveyard(object);
                }
            }
            StackItemKind::Trigger { source, instance } => {
                let rearm = self.state.zones.is_in(source, Zone::battlefield());
                self.dispatcher.note_resolved(instance, rearm);
            }
            StackItemKind::Ability { .. } => {}
        }
        self.state_based_actions();
        self.flush_triggers();
        self.stack.set_priority(self.state.active_player);
    }

    fn apply_one_shot(&mut self, item: &crate::stack::StackItem, effect: &OneShot) {
        let source = match item.kind {
            StackItemKind::Spell { object } => object,
            StackItemKind::Ability { source } | StackItemKind::Trigger { source, .. } => source,
        };
        let controller = item.controller;

        match effect {
            OneShot::DealDamage(value) => {
                let amount = {
                    let ctx = self.ctx();
                    value.evaluate(&ctx, source, controller)
                };
                if amount <= 0 {
                    return;
                }
                for &target in item.targets.iter() {
                    self.deal_damage(source, target, amount);
                }
            }
            OneShot::DestroyTarget => {
                for &target in item.targets.clone().iter() {
                    self.destroy_inner(target);
                }
            }
            OneShot::TapTarget => {
                for &target in item.targets.iter() {
                    if let Some(obj) = self.state.object_mut(target) {
                        obj.tapped = true;
                    }
                    self.raise(GameEvent::new(EventKind::Tapped).with_target(target));
                }
            }
            OneShot::UntapTarget => {
                for &target in item.targets.iter() {
                    if let Some(obj) = self.state.object_mut(target) {
                        obj.tapped = false;
                    }
                    self.raise(GameEvent::new(EventKind::Untapped).with_target(target));
                }
            }
            OneShot::DrawCards(count) => {
                for _ in 0..*count {
                    self.draw_card(controller);
                }
            }
            OneShot::GainLife(value) => {
                let amount = {
                    let ctx = self.ctx();
                    value.evaluate(&ctx, source, controller)
                };
                let outcome = self.raise(
                    GameEvent::new(EventKind::LifeChanged)
                        .with_player(controller)
                        .with_amount(amount),
                );
                match outcome {
                    EventOutcome::Prevented => {}
                    EventOutcome::Proceeded => {
                        self.state.modify_life(controller, amount);
                    }
                    EventOutcome::Replaced(e) => {
                        if let Some(player) = e.player {
                            self.state.modify_life(player, e.amount);
                        }
                    }
                }
            }
            OneShot::AddMana(value) => {
                let amount = {
                    let ctx = self.ctx();
                    value.evaluate(&ctx, source, controller)
                };
                self.state.add_mana(controller, amount);
            }
            OneShot::ApplyContinuous {
                scope,
                modification,
                duration,
            } => {
                let applies: Vec<AppliesTo> = match scope {
                    EffectScope::Source => vec![AppliesTo::Object(source)],
                    EffectScope::AttachedTo => self
                        .state
                        .object(source)
                        .and_then(|o| o.attached_to)
                        .map(AppliesTo::Object)
                        .into_iter()
                        .collect(),
                    EffectScope::Target => item
                        .targets
                        .iter()
                        .map(|&t| AppliesTo::Object(t))
                        .collect(),
                    EffectScope::AllMatching(filter) => vec![AppliesTo::AllMatching {
                        filter: filter.clone(),
                        you: controller,
                    }],
                };
                for applies_to in applies {
                    let timestamp = self.state.tick();
                    self.continuous.add(
                        source,
                        controller,
                        applies_to,
                        modification.clone(),
                        *duration,
                        timestamp,
                    );
                }
            }
            OneShot::RegenerateSource => {
                self.bus.replacements.install(
                    source,
                    controller,
                    EventWatch::SelfDestroyed,
                    ReplacementAction::Regenerate,
                    true,
                    Duration::EndOfTurn,
                );
                if let Some(obj) = self.state.object(source) {
                    log::info!("{} gains a regeneration shield", obj.base.name);
                }
            }
            OneShot::AttachToTarget => {
                if let Some(&target) = item.targets.first() {
                    if let Some(obj) = self.state.object_mut(source) {
                        obj.attached_to = Some(target);
                    }
                }
            }
        }
    }

    /// Announce and apply damage to a creature or player.
    fn deal_damage(&mut self, source: ObjectId, target: ObjectId, amount: i64) {
        let outcome = self.raise(GameEvent::damage(source, target, amount));
        let applied = match outcome {
            EventOutcome::Prevented => return,
            EventOutcome::Proceeded => GameEvent::damage(source, target, amount),
            EventOutcome::Replaced(e) => e,
        };
        let Some(final_target) = applied.target else {
            return;
        };
        if let Some(player) = final_target.as_player(self.state.player_count()) {
            self.state.modify_life(player, -applied.amount);
        } else if let Some(obj) = self.state.object_mut(final_target) {
            obj.damage += applied.amount;
        }
    }

    /// Batch every fired trigger onto the stack, choosing targets at
    /// placement time.
    fn flush_triggers(&mut self) {
        while self.dispatcher.has_fired() {
            let batch = self
                .dispatcher
                .take_batch(&self.state, self.decisions.as_mut());
            for trigger in batch {
                let targets: SmallVec<[ObjectId; 2]> = if trigger.ability.targets.requires_targets()
                {
                    let candidates = {
                        let ctx = self.ctx();
                        trigger.ability.targets.candidates(&ctx, trigger.controller)
                    };
                    if candidates.len() < trigger.ability.targets.min_targets() {
                        // No legal targets at placement: the trigger is
                        // logged and never hits the stack.
                        log::info!(
                            "{} fizzles: {}",
                            trigger.ability.text,
                            FizzleReason::IllegalTarget
                        );
                        let rearm = self
                            .state
                            .zones
                            .is_in(trigger.source, Zone::battlefield());
                        self.dispatcher.note_resolved(trigger.instance, rearm);
                        continue;
                    }
                    let max = trigger
                        .ability
                        .targets
                        .max_targets()
                        .min(candidates.len());
                    match self.decisions.choose(
                        trigger.controller,
                        ChoiceSpec::Targets {
                            candidates: candidates.clone(),
                            min: trigger.ability.targets.min_targets(),
                            max,
                        },
                    ) {
                        Choice::Targets(picked) => picked
                            .into_iter()
                            .filter(|t| candidates.contains(t))
                            .take(max)
                            .collect(),
                        _ => candidates.iter().copied().take(1).collect(),
                    }
                } else {
                    SmallVec::new()
                };
                self.stack.push(
                    StackItemKind::Trigger {
                        source: trigger.source,
                        instance: trigger.instance,
                    },
                    trigger.controller,
                    targets,
                    trigger.ability.targets.clone(),
                    trigger.ability.effects.clone(),
                    trigger.ability.text.clone(),
                );
            }
        }
    }

    // ----- state-based actions ----------------------------------------------

    /// Run the death checks until the battlefield is stable. Returns how
    /// many objects left the battlefield.
    pub fn state_based_actions(&mut self) -> usize {
        let mut total = 0;
        loop {
            let mut doomed_direct: Vec<ObjectId> = Vec::new();
            let mut doomed_lethal: Vec<ObjectId> = Vec::new();
            {
                let ctx = self.ctx();
                for id in self.state.battlefield() {
                    let Some(obj) = self.state.object(id) else {
                        continue;
                    };
                    let Some(chars) = ctx.characteristics_of(id) else {
                        continue;
                    };
                    if chars.is_creature() {
                        if chars.toughness <= 0 {
                            // Zero toughness is not destruction;
                            // regeneration cannot save it.
                            doomed_direct.push(id);
                        } else if obj.damage >= chars.toughness {
                            doomed_lethal.push(id);
                        }
                    }
                    // An aura whose host is gone goes to the graveyard.
                    if let Some(host) = obj.attached_to {
                        if !self.state.zones.is_in(host, Zone::battlefield()) {
                            doomed_direct.push(id);
                        }
                    }
                }
                if let Some(err) = ctx.take_cycle() {
                    self.defect.get_or_insert(err);
                }
            }

            let mut acted = 0;
            for id in doomed_direct {
                if self.state.zones.is_in(id, Zone::battlefield()) {
                    self.move_to_graveyard(id);
                    acted += 1;
                }
            }
            for id in doomed_lethal {
                if self.state.zones.is_in(id, Zone::battlefield()) && self.destroy_inner(id) {
                    acted += 1;
                }
            }
            if acted == 0 {
                return total;
            }
            total += acted;
        }
    }

    /// Win/loss check, kept outside the state-based loop.
    #[must_use]
    pub fn result(&self) -> Option<GameResult> {
        let alive: Vec<PlayerId> = self
            .state
            .players()
            .filter(|&p| self.state.life(p) > 0)
            .collect();
        match alive.len() {
            0 => Some(GameResult::Draw),
            1 if self.state.player_count() > 1 => Some(GameResult::Winner(alive[0])),
            _ => None,
        }
    }

    // ----- turn structure ---------------------------------------------------

    /// Advance to the next step, performing turn-based actions.
    pub fn advance_step(&mut self) {
        self.state.clear_mana();
        match self.state.step.next() {
            Some(step) => self.state.step = step,
            None => {
                self.state.turn_number += 1;
                self.state.active_player = self
                    .state
                    .active_player
                    .next(self.state.player_count());
                self.state.step = Step::first();
            }
        }
        let step = self.state.step;
        let active = self.state.active_player;
        self.raise(
            GameEvent::new(EventKind::PhaseChanged)
                .with_player(active)
                .with_amount(step.index() as i64),
        );

        match step {
            Step::Untap => self.untap_step(active),
            Step::Draw => self.draw_card(active),
            Step::CombatDamage => self.combat_damage(active),
            Step::Cleanup => self.cleanup_step(),
            _ => {}
        }

        self.flush_triggers();
        self.state_based_actions();
        if step.grants_priority() {
            self.stack.set_priority(active);
        }
    }

    fn untap_step(&mut self, active: PlayerId) {
        let to_untap: Vec<ObjectId> = self
            .state
            .battlefield()
            .into_iter()
            .filter(|&id| {
                self.state
                    .object(id)
                    .is_some_and(|o| o.controller == active && o.tapped)
            })
            .collect();
        for id in to_untap {
            if let Some(obj) = self.state.object_mut(id) {
                obj.tapped = false;
            }
            self.raise(GameEvent::new(EventKind::Untapped).with_target(id));
        }
    }

    fn cleanup_step(&mut self) {
        for id in self.state.battlefield() {
            if let Some(obj) = self.state.object_mut(id) {
                obj.damage = 0;
                obj.attacking = false;
            }
        }
        self.registry.expire_end_of_turn();
        self.continuous.expire_end_of_turn();
        self.bus.replacements.expire_end_of_turn();
    }

    /// Declare an attacker during the declare-attackers step.
    pub fn declare_attacker(&mut self, player: PlayerId, creature: ObjectId) -> ActionOutcome {
        if self.state.step != Step::DeclareAttackers || player != self.state.active_player {
            return self.fizzle_action("attack", FizzleReason::ZoneMismatch);
        }
        let vigilance = {
            let ctx = self.ctx();
            match ctx.characteristics_of(creature) {
                Some(chars) if chars.is_creature() => chars.has_keyword(Keyword::Vigilance),
                _ => return self.fizzle_action("attack", FizzleReason::IllegalTarget),
            }
        };
        match self.state.object(creature) {
            Some(obj) if obj.controller == player && !obj.tapped => {}
            _ => return self.fizzle_action("attack", FizzleReason::IllegalTarget),
        }
        match self.raise(
            GameEvent::new(EventKind::AttackerDeclared)
                .with_source(creature)
                .with_player(player),
        ) {
            EventOutcome::Prevented => return ActionOutcome::Prevented,
            _ => {}
        }
        if let Some(obj) = self.state.object_mut(creature) {
            obj.attacking = true;
            if !vigilance {
                obj.tapped = true;
            }
        }
        self.flush_triggers();
        ActionOutcome::Accepted
    }

    fn combat_damage(&mut self, active: PlayerId) {
        let defender = active.next(self.state.player_count());
        let attackers: Vec<(ObjectId, i64)> = {
            let ctx = self.ctx();
            self.state
                .battlefield()
                .into_iter()
                .filter(|&id| {
                    self.state
                        .object(id)
                        .is_some_and(|o| o.controller == active && o.attacking)
                })
                .filter_map(|id| ctx.characteristics_of(id).map(|c| (id, c.power)))
                .collect()
        };
        for (attacker, power) in attackers {
            if power > 0 {
                self.deal_damage(attacker, ObjectId::for_player(defender), power);
            }
        }
        self.state_based_actions();
    }

    // ----- views ------------------------------------------------------------

    /// Build a read-only serializable view of the game.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        let ctx = self.ctx();
        let view = |id: ObjectId| -> Option<ObjectView> {
            let obj = self.state.object(id)?;
            let chars = ctx.characteristics_of(id)?;
            Some(ObjectView {
                id,
                name: chars.name,
                card_types: chars.card_types,
                keywords: chars.keywords,
                power: chars.power,
                toughness: chars.toughness,
                damage: obj.damage,
                tapped: obj.tapped,
                controller: chars.controller,
            })
        };
        let zone_view = |zone: Zone| -> ZoneView {
            ZoneView {
                zone,
                objects: self
                    .state
                    .zones
                    .objects_in(zone)
                    .iter()
                    .filter_map(|&id| view(id))
                    .collect(),
            }
        };

        let mut zones = vec![zone_view(Zone::battlefield())];
        for player in self.state.players() {
            zones.push(zone_view(Zone::hand(player)));
            zones.push(zone_view(Zone::graveyard(player)));
        }

        Snapshot {
            turn_number: self.state.turn_number,
            step: self.state.step,
            active_player: self.state.active_player,
            players: self
                .state
                .players()
                .map(|player| PlayerView {
                    player,
                    life: self.state.life(player),
                    mana: self.state.mana(player),
                    hand_size: self.state.hand_size(player),
                })
                .collect(),
            zones,
            stack: self
                .stack
                .items()
                .iter()
                .map(|item| StackItemView {
                    description: item.description.clone(),
                    controller: item.controller,
                    targets: item.targets.to_vec(),
                })
                .collect(),
            event_count: self.bus.log().len(),
        }
    }
}

/// Internal: the two activation shapes.
enum Activation {
    Stacked(ActivatedAbility),
    Mana(ManaAbility),
}
