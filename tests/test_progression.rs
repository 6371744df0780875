mod common;

use noize_voice::cassette::Track;
use noize_voice::progression::{ProgressEvent, Progression, MAX_ENERGY, MAX_HEALTH};
use noize_voice::Ability;
use rand::seq::SliceRandom;
use rand::Rng;

#[test]
fn health_stays_in_bounds_under_any_damage_and_healing() {
    let mut rng = common::rng();
    let mut progress = Progression::new();

    for _ in 0..1000 {
        let amount = rng.gen_range(0..150);
        if rng.gen_bool(0.5) {
            progress.take_damage(amount);
        } else {
            progress.heal(amount);
        }
        assert!(progress.health() <= MAX_HEALTH);
    }

    progress.take_damage(u32::MAX);
    assert_eq!(progress.health(), 0);
    progress.heal(u32::MAX);
    assert_eq!(progress.health(), MAX_HEALTH);
}

#[test]
fn energy_stays_in_bounds_and_overspending_is_rejected() {
    let mut rng = common::rng();
    let mut progress = Progression::new();

    for _ in 0..1000 {
        let amount = rng.gen_range(0..150);
        if rng.gen_bool(0.5) {
            let before = progress.energy();
            let spent = progress.use_energy(amount);
            if amount > before {
                assert!(!spent);
                assert_eq!(progress.energy(), before);
            } else {
                assert!(spent);
                assert_eq!(progress.energy(), before - amount);
            }
        } else {
            progress.restore_energy(amount);
        }
        assert!(progress.energy() <= MAX_ENERGY);
    }
}

#[test]
fn collecting_a_cassette_twice_changes_the_set_once() {
    let mut progress = Progression::new();

    assert!(progress.collect_cassette("vidihay"));
    assert!(!progress.collect_cassette("vidihay"));
    assert_eq!(progress.cassette_count(), 1);
    assert!(progress.has_ability(Ability::Vidihay));

    let events = progress.drain_events();
    let collected = events
        .iter()
        .filter(|e| matches!(e, ProgressEvent::CassetteCollected(_)))
        .count();
    assert_eq!(collected, 1);
}

#[test]
fn four_story_cassettes_in_any_order_unlock_the_combo() {
    let mut rng = common::rng();

    for _ in 0..10 {
        let mut order = Track::STORY;
        order.shuffle(&mut rng);
        let mut progress = Progression::new();

        for (i, track) in order.iter().enumerate() {
            progress.collect_cassette(track.id());
            let unlocked = progress.has_ability(Ability::UltimateCombo);
            if i < 3 {
                assert!(!unlocked, "combo unlocked after {} cassettes", i + 1);
            } else {
                assert!(unlocked);
            }
        }

        for ability in [
            Ability::MakeSomeNoize,
            Ability::Vidihay,
            Ability::Vselennaya,
            Ability::IgraSlov,
        ] {
            assert!(progress.has_ability(ability));
        }
    }
}

#[test]
fn bonus_tracks_grant_no_ability() {
    let mut progress = Progression::new();
    progress.collect_cassette("moe_more");
    progress.collect_cassette("mercedes");
    assert!(progress.unlocked_abilities().is_empty());
}

#[test]
fn ability_unlocks_are_idempotent_and_reported_once() {
    let mut progress = Progression::new();
    assert!(progress.unlock_ability(Ability::RhythmMaster));
    assert!(!progress.unlock_ability(Ability::RhythmMaster));

    let events = progress.drain_events();
    assert_eq!(events, vec![ProgressEvent::AbilityUnlocked(Ability::RhythmMaster)]);
    assert!(!progress.has_pending_events());
}

#[test]
fn tick_regenerates_one_energy_per_call() {
    let mut progress = Progression::new();
    assert!(progress.use_energy(50));

    progress.tick(0.5);
    progress.tick(0.5);
    assert_eq!(progress.energy(), 52);
    assert!((progress.play_time() - 1.0).abs() < 1e-6);

    progress.restore_energy(100);
    progress.tick(0.1);
    assert_eq!(progress.energy(), MAX_ENERGY);
}

#[test]
fn set_operations_ignore_duplicates() {
    let mut progress = Progression::new();

    assert!(progress.complete_level("act1_level1"));
    assert!(!progress.complete_level("act1_level1"));
    assert!(progress.unlock_memory("first_concert_memory"));
    assert!(!progress.unlock_memory("first_concert_memory"));
    assert!(progress.read_diary("tour_diary"));
    assert!(!progress.read_diary("tour_diary"));
    assert!(progress.watch_cutscene("prologue_intro"));
    assert!(!progress.watch_cutscene("prologue_intro"));
    assert!(progress.find_secret("system_core"));
    assert!(!progress.find_secret("system_core"));

    assert_eq!(progress.memory_count(), 1);
    assert!((progress.completion() - 1.0 / 30.0).abs() < 1e-6);
}

#[test]
fn restore_vitals_fills_both_bars() {
    let mut progress = Progression::new();
    progress.take_damage(70);
    assert!(progress.use_energy(90));

    progress.restore_vitals();
    assert_eq!(progress.health(), MAX_HEALTH);
    assert_eq!(progress.energy(), MAX_ENERGY);
}

#[test]
fn equality_ignores_pending_events() {
    let mut a = Progression::new();
    let mut b = Progression::new();
    a.collect_cassette("vidihay");
    b.collect_cassette("vidihay");
    b.drain_events();
    assert_eq!(a, b);
}
