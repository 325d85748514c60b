//! Whole-engine flow: the turn machine, turn-based actions, state-based
//! deaths, mana and sacrifice costs, combat, auras, snapshots.

use arbiter::abilities::{Ability, ActivatedAbility, Cost, ManaAbility, StaticAbility};
use arbiter::cards::{CardCatalog, CardDescriptor, CardId};
use arbiter::continuous::{Duration, EffectScope, Modification};
use arbiter::core::{CardType, FizzleReason, Keyword, ObjectId, PlayerId};
use arbiter::effects::{DynamicValue, ObjectFilter, OneShot, TargetSpec};
use arbiter::events::EventKind;
use arbiter::game::{ActionOutcome, Game, GameResult, ResolutionOutcome};
use arbiter::turn::Step;
use arbiter::zones::Zone;

const BEAR: CardId = CardId(1);
const ZAP: CardId = CardId(2);
const CRYSTAL_VEIN: CardId = CardId(3);
const DEEP_VAULT: CardId = CardId(4);
const BLOOD_ALTAR: CardId = CardId(5);
const SAVAGE_RALLY: CardId = CardId(6);
const WITHERING_CURSE: CardId = CardId(7);
const SENTRY_OX: CardId = CardId(8);
const BINDING_ROOTS: CardId = CardId(9);
const EMBER_COLOSSUS: CardId = CardId(10);
const VERDANT_SHRINE: CardId = CardId(11);

fn catalog() -> CardCatalog {
    let mut c = CardCatalog::new();
    c.register(CardDescriptor::new(BEAR, "Meadow Bear").with_cost(1).creature(2, 2));
    c.register(
        CardDescriptor::new(ZAP, "Zap")
            .with_card_type(CardType::Instant)
            .with_spell_targets(TargetSpec::Any)
            .with_spell_effect(OneShot::DealDamage(DynamicValue::Fixed(2))),
    );
    c.register(
        CardDescriptor::new(CRYSTAL_VEIN, "Crystal Vein")
            .with_card_type(CardType::Land)
            .with_ability(Ability::Mana(ManaAbility {
                cost: Cost::free().tapping(),
                amount: DynamicValue::Fixed(1),
            })),
    );
    c.register(
        CardDescriptor::new(DEEP_VAULT, "Deep Vault")
            .with_card_type(CardType::Land)
            .with_ability(Ability::Mana(ManaAbility {
                cost: Cost::free().tapping(),
                amount: DynamicValue::CardsInHand,
            })),
    );
    c.register(
        CardDescriptor::new(BLOOD_ALTAR, "Blood Altar")
            .with_card_type(CardType::Enchantment)
            .with_ability(Ability::Activated(ActivatedAbility {
                cost: Cost::free().sacrificing(ObjectFilter::creature()),
                targets: TargetSpec::None,
                effects: vec![OneShot::GainLife(DynamicValue::Fixed(3))],
                text: "sacrifice a creature: gain 3 life".into(),
            })),
    );
    c.register(
        CardDescriptor::new(SAVAGE_RALLY, "Savage Rally")
            .with_card_type(CardType::Instant)
            .with_spell_targets(TargetSpec::one_creature())
            .with_spell_effect(OneShot::ApplyContinuous {
                scope: EffectScope::Target,
                modification: Modification::Boost {
                    power: DynamicValue::Fixed(3),
                    toughness: DynamicValue::Fixed(3),
                },
                duration: Duration::EndOfTurn,
            }),
    );
    c.register(
        CardDescriptor::new(WITHERING_CURSE, "Withering Curse")
            .with_card_type(CardType::Instant)
            .with_spell_targets(TargetSpec::one_creature())
            .with_spell_effect(OneShot::ApplyContinuous {
                scope: EffectScope::Target,
                modification: Modification::Boost {
                    power: DynamicValue::Fixed(0),
                    toughness: DynamicValue::Fixed(-3),
                },
                duration: Duration::EndOfTurn,
            }),
    );
    c.register(
        CardDescriptor::new(SENTRY_OX, "Sentry Ox")
            .creature(3, 3)
            .with_keyword(Keyword::Vigilance),
    );
    c.register(
        CardDescriptor::new(BINDING_ROOTS, "Binding Roots")
            .with_card_type(CardType::Enchantment)
            .with_spell_targets(TargetSpec::one_creature())
            .with_spell_effect(OneShot::AttachToTarget)
            .with_ability(Ability::Static(StaticAbility {
                scope: EffectScope::AttachedTo,
                modification: Modification::Boost {
                    power: DynamicValue::Fixed(1),
                    toughness: DynamicValue::Fixed(1),
                },
            })),
    );
    c.register(
        CardDescriptor::new(EMBER_COLOSSUS, "Ember Colossus")
            .creature(2, 4)
            .with_ability(Ability::Activated(ActivatedAbility {
                cost: Cost::free().tapping(),
                targets: TargetSpec::Any,
                effects: vec![OneShot::DealDamage(DynamicValue::SourcePower)],
                text: "tap: deal damage equal to this creature's power".into(),
            })),
    );
    c.register(
        CardDescriptor::new(VERDANT_SHRINE, "Verdant Shrine")
            .with_card_type(CardType::Land)
            .with_ability(Ability::Mana(ManaAbility {
                cost: Cost::free().tapping(),
                amount: DynamicValue::CountMatching(
                    ObjectFilter::creature_you_control().with_min_power(4),
                ),
            })),
    );
    c
}

fn on_battlefield(game: &mut Game, card: CardId, owner: PlayerId) -> ObjectId {
    let id = game.instantiate(card, owner);
    game.put_on_battlefield(id);
    id
}

fn cast_and_resolve(game: &mut Game, player: PlayerId, card: CardId, targets: &[ObjectId]) {
    let spell = game.instantiate(card, player);
    assert_eq!(game.cast_spell(player, spell, targets), ActionOutcome::Accepted);
    assert_eq!(game.resolve_top().unwrap(), ResolutionOutcome::Resolved);
}

#[test]
fn test_turn_cycle_rotates_active_player() {
    let mut game = Game::builder(catalog()).build();
    assert_eq!(game.state.turn_number, 1);
    assert_eq!(game.state.active_player, PlayerId::new(0));
    assert_eq!(game.state.step, Step::Untap);

    for _ in 0..12 {
        game.advance_step();
    }
    assert_eq!(game.state.turn_number, 2);
    assert_eq!(game.state.active_player, PlayerId::new(1));
    assert_eq!(game.state.step, Step::Untap);
}

#[test]
fn test_untap_and_draw_turn_actions() {
    let mut game = Game::builder(catalog()).build();
    let p1 = PlayerId::new(1);
    let ox = on_battlefield(&mut game, SENTRY_OX, p1);
    game.state.object_mut(ox).unwrap().tapped = true;
    game.instantiate_in_library(BEAR, p1);

    game.state.step = Step::Cleanup;
    game.advance_step();
    assert_eq!(game.state.step, Step::Untap);
    assert_eq!(game.state.active_player, p1);
    assert!(!game.state.object(ox).unwrap().tapped);

    game.advance_step();
    assert_eq!(game.state.hand_size(p1), 0);
    game.advance_step();
    assert_eq!(game.state.step, Step::Draw);
    assert_eq!(game.state.hand_size(p1), 1);
}

#[test]
fn test_cleanup_clears_damage_and_expires_boosts() {
    let mut game = Game::builder(catalog()).build();
    let p0 = PlayerId::new(0);
    let bear = on_battlefield(&mut game, BEAR, p0);

    cast_and_resolve(&mut game, p0, SAVAGE_RALLY, &[bear]);
    let chars = game.characteristics_of(bear).unwrap();
    assert_eq!((chars.power, chars.toughness), (5, 5));

    game.state.object_mut(bear).unwrap().damage = 1;
    game.state.step = Step::End;
    game.advance_step();
    assert_eq!(game.state.step, Step::Cleanup);

    let chars = game.characteristics_of(bear).unwrap();
    assert_eq!((chars.power, chars.toughness), (2, 2));
    assert_eq!(game.state.object(bear).unwrap().damage, 0);
}

#[test]
fn test_lethal_damage_is_a_destruction() {
    let mut game = Game::builder(catalog()).build();
    let p0 = PlayerId::new(0);
    let p1 = PlayerId::new(1);
    let bear = on_battlefield(&mut game, BEAR, p1);

    cast_and_resolve(&mut game, p0, ZAP, &[bear]);
    assert!(game.state.zones.is_in(bear, Zone::graveyard(p1)));
    assert!(game
        .event_log()
        .iter()
        .any(|e| e.kind == EventKind::Destroyed));
}

#[test]
fn test_zero_toughness_skips_the_destroy_event() {
    let mut game = Game::builder(catalog()).build();
    let p0 = PlayerId::new(0);
    let p1 = PlayerId::new(1);
    let bear = on_battlefield(&mut game, BEAR, p1);

    cast_and_resolve(&mut game, p0, WITHERING_CURSE, &[bear]);
    assert!(game.state.zones.is_in(bear, Zone::graveyard(p1)));
    // Not a destruction: regeneration could not have saved it.
    assert!(!game
        .event_log()
        .iter()
        .any(|e| e.kind == EventKind::Destroyed));
}

#[test]
fn test_mana_ability_skips_the_stack() {
    let mut game = Game::builder(catalog()).build();
    let p0 = PlayerId::new(0);
    let vein = on_battlefield(&mut game, CRYSTAL_VEIN, p0);

    assert_eq!(game.activate_ability(p0, vein, 0, &[]), ActionOutcome::Accepted);
    assert_eq!(game.stack_size(), 0);
    assert_eq!(game.state.mana(p0), 1);
    assert!(game.state.object(vein).unwrap().tapped);

    // Tapped: the cost is no longer payable.
    assert_eq!(
        game.activate_ability(p0, vein, 0, &[]),
        ActionOutcome::Fizzled(FizzleReason::InsufficientCost)
    );

    let bear = game.instantiate(BEAR, p0);
    assert_eq!(game.cast_spell(p0, bear, &[]), ActionOutcome::Accepted);
    game.resolve_top().unwrap();
    assert!(game.state.zones.is_in(bear, Zone::battlefield()));
    assert_eq!(game.state.mana(p0), 0);
}

#[test]
fn test_dynamic_mana_reads_live_state() {
    let mut game = Game::builder(catalog()).build();
    let p0 = PlayerId::new(0);
    let vault = on_battlefield(&mut game, DEEP_VAULT, p0);
    game.instantiate(BEAR, p0);
    game.instantiate(BEAR, p0);
    game.instantiate(BEAR, p0);

    assert_eq!(game.activate_ability(p0, vault, 0, &[]), ActionOutcome::Accepted);
    assert_eq!(game.state.mana(p0), 3);
}

#[test]
fn test_counting_mana_reads_computed_power() {
    let mut game = Game::builder(catalog()).build();
    let p0 = PlayerId::new(0);
    let p1 = PlayerId::new(1);
    let shrine = on_battlefield(&mut game, VERDANT_SHRINE, p0);
    let mine = on_battlefield(&mut game, BEAR, p0);
    let theirs = on_battlefield(&mut game, BEAR, p1);

    // Both bears get boosted past the threshold; only mine counts.
    cast_and_resolve(&mut game, p0, SAVAGE_RALLY, &[mine]);
    cast_and_resolve(&mut game, p0, SAVAGE_RALLY, &[theirs]);

    assert_eq!(game.activate_ability(p0, shrine, 0, &[]), ActionOutcome::Accepted);
    assert_eq!(game.state.mana(p0), 1);
}

#[test]
fn test_sacrifice_cost_is_paid_up_front() {
    let mut game = Game::builder(catalog()).build();
    let p0 = PlayerId::new(0);
    let bear = on_battlefield(&mut game, BEAR, p0);
    let altar = on_battlefield(&mut game, BLOOD_ALTAR, p0);

    assert_eq!(game.activate_ability(p0, altar, 0, &[]), ActionOutcome::Accepted);
    // The creature is gone before the ability resolves.
    assert!(game.state.zones.is_in(bear, Zone::graveyard(p0)));
    assert_eq!(game.stack_size(), 1);

    game.resolve_top().unwrap();
    assert_eq!(game.state.life(p0), 23);

    // No creature left to sacrifice.
    assert_eq!(
        game.activate_ability(p0, altar, 0, &[]),
        ActionOutcome::Fizzled(FizzleReason::InsufficientCost)
    );
}

#[test]
fn test_combat_damage_and_winner() {
    let mut game = Game::builder(catalog()).build();
    let p0 = PlayerId::new(0);
    let p1 = PlayerId::new(1);
    let ox = on_battlefield(&mut game, SENTRY_OX, p0);
    let bear = on_battlefield(&mut game, BEAR, p0);
    game.state.modify_life(p1, -16);

    game.state.step = Step::DeclareAttackers;
    assert_eq!(game.declare_attacker(p0, ox), ActionOutcome::Accepted);
    assert_eq!(game.declare_attacker(p0, bear), ActionOutcome::Accepted);
    // Vigilance keeps the ox untapped; the bear taps.
    assert!(!game.state.object(ox).unwrap().tapped);
    assert!(game.state.object(bear).unwrap().tapped);

    game.advance_step();
    assert_eq!(game.state.step, Step::DeclareBlockers);
    game.advance_step();
    assert_eq!(game.state.step, Step::CombatDamage);

    assert_eq!(game.state.life(p1), -1);
    assert_eq!(game.result(), Some(GameResult::Winner(p0)));
}

#[test]
fn test_attack_preconditions() {
    let mut game = Game::builder(catalog()).build();
    let p0 = PlayerId::new(0);
    let ox = on_battlefield(&mut game, SENTRY_OX, p0);

    // Wrong step.
    game.state.step = Step::Main1;
    assert_eq!(
        game.declare_attacker(p0, ox),
        ActionOutcome::Fizzled(FizzleReason::ZoneMismatch)
    );

    // Tapped creatures cannot attack.
    game.state.step = Step::DeclareAttackers;
    game.state.object_mut(ox).unwrap().tapped = true;
    assert_eq!(
        game.declare_attacker(p0, ox),
        ActionOutcome::Fizzled(FizzleReason::IllegalTarget)
    );
}

#[test]
fn test_aura_boosts_host_and_follows_it_to_the_graveyard() {
    let mut game = Game::builder(catalog()).build();
    let p0 = PlayerId::new(0);
    let bear = on_battlefield(&mut game, BEAR, p0);

    let roots = game.instantiate(BINDING_ROOTS, p0);
    assert_eq!(game.cast_spell(p0, roots, &[bear]), ActionOutcome::Accepted);
    game.resolve_top().unwrap();

    assert!(game.state.zones.is_in(roots, Zone::battlefield()));
    assert_eq!(game.state.object(roots).unwrap().attached_to, Some(bear));
    let chars = game.characteristics_of(bear).unwrap();
    assert_eq!((chars.power, chars.toughness), (3, 3));

    // The host dies; the orphaned aura goes with it.
    assert!(game.destroy(bear));
    assert!(game.state.zones.is_in(roots, Zone::graveyard(p0)));
}

#[test]
fn test_activated_damage_tracks_computed_power() {
    let mut game = Game::builder(catalog()).build();
    let p0 = PlayerId::new(0);
    let p1 = PlayerId::new(1);
    let colossus = on_battlefield(&mut game, EMBER_COLOSSUS, p0);

    cast_and_resolve(&mut game, p0, SAVAGE_RALLY, &[colossus]);
    assert_eq!(
        game.activate_ability(p0, colossus, 0, &[ObjectId::for_player(p1)]),
        ActionOutcome::Accepted
    );
    assert_eq!(game.resolve_top().unwrap(), ResolutionOutcome::Resolved);

    // Printed power 2, boosted to 5: the damage reads the boost.
    assert_eq!(game.state.life(p1), 15);
}

#[test]
fn test_opening_hands_are_drawn_from_the_library() {
    let mut game = Game::builder(catalog()).starting_hand(3).seed(7).build();
    let p0 = PlayerId::new(0);
    let p1 = PlayerId::new(1);
    for _ in 0..5 {
        game.instantiate_in_library(BEAR, p0);
        game.instantiate_in_library(ZAP, p1);
    }

    game.draw_opening_hands();
    assert_eq!(game.state.hand_size(p0), 3);
    assert_eq!(game.state.hand_size(p1), 3);
    assert_eq!(game.state.zones.size(Zone::library(p0)), 2);
}

#[test]
fn test_snapshot_serializes_computed_state() {
    let mut game = Game::builder(catalog()).build();
    let p0 = PlayerId::new(0);
    let bear = on_battlefield(&mut game, BEAR, p0);
    cast_and_resolve(&mut game, p0, SAVAGE_RALLY, &[bear]);
    game.instantiate(ZAP, p0);

    let snapshot = game.snapshot();
    let json = serde_json::to_value(&snapshot).unwrap();

    assert_eq!(json["players"].as_array().unwrap().len(), 2);
    assert_eq!(json["players"][0]["life"], 20);
    assert_eq!(json["players"][0]["hand_size"], 1);
    assert_eq!(json["step"], "Untap");
    assert_eq!(json["stack"].as_array().unwrap().len(), 0);

    // The battlefield view carries computed power, not printed.
    let battlefield = &json["zones"][0]["objects"];
    assert_eq!(battlefield[0]["name"], "Meadow Bear");
    assert_eq!(battlefield[0]["power"], 5);
}
