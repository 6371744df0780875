mod common;

use common::{RecordingAudio, DT};
use noize_voice::kinematics::{Aabb, FLOOR_Y, WORLD_WIDTH};
use noize_voice::player::{
    AbilityOutcome, Player, PlayerInput, PlayerState, MOVE_SPEED, PLAYER_START, TELEPORT_DISTANCE,
};
use noize_voice::progression::{Progression, MAX_HEALTH};
use noize_voice::Ability;

fn step(player: &mut Player, input: PlayerInput, progress: &mut Progression, audio: &mut RecordingAudio) -> Option<AbilityOutcome> {
    player.update(DT, &input, &[], progress, audio)
}

#[test]
fn starts_grounded_and_walks() {
    let mut player = Player::default();
    let mut progress = Progression::new();
    let mut audio = RecordingAudio::default();
    assert!(player.body.grounded);
    assert_eq!(player.body.position, PLAYER_START);

    let right = PlayerInput {
        right: true,
        ..PlayerInput::default()
    };
    for _ in 0..60 {
        step(&mut player, right, &mut progress, &mut audio);
    }
    assert!((player.body.position.x - (PLAYER_START.x + MOVE_SPEED)).abs() < 1.0);
    assert_eq!(player.state, PlayerState::Walking);
    assert!(player.facing_right);
}

#[test]
fn double_jump_is_allowed_once_per_airtime() {
    let mut player = Player::default();
    let mut audio = RecordingAudio::default();

    assert!(player.jump(&mut audio));
    assert!(!player.body.grounded);
    assert!(player.can_double_jump());
    assert!(player.jump(&mut audio));
    assert!(!player.jump(&mut audio));
    assert_eq!(audio.played("jump"), 2);
}

#[test]
fn landing_restores_the_jump_and_platforms_hold_the_player() {
    let mut player = Player::default();
    let mut progress = Progression::new();
    let mut audio = RecordingAudio::default();
    let ledge = [Aabb::new(0.0, 150.0, 400.0, 20.0)];

    let jump = PlayerInput {
        jump: true,
        ..PlayerInput::default()
    };
    player.update(DT, &jump, &ledge, &mut progress, &mut audio);
    for _ in 0..120 {
        player.update(DT, &PlayerInput::default(), &ledge, &mut progress, &mut audio);
    }

    assert!(player.body.grounded);
    assert_eq!(player.body.position.y, 170.0);
    assert!(!player.can_double_jump());
    assert_eq!(player.state, PlayerState::Idle);
}

#[test]
fn position_stays_inside_the_world() {
    let mut player = Player::new(macroquad::math::vec2(WORLD_WIDTH - 70.0, FLOOR_Y));
    let mut progress = Progression::new();
    let mut audio = RecordingAudio::default();
    let right = PlayerInput {
        right: true,
        ..PlayerInput::default()
    };
    for _ in 0..30 {
        step(&mut player, right, &mut progress, &mut audio);
    }
    assert!(player.hitbox().right() <= WORLD_WIDTH);
}

#[test]
fn ability_gates_apply_in_order() {
    let mut player = Player::default();
    let mut progress = Progression::new();
    let mut audio = RecordingAudio::default();

    assert_eq!(
        player.use_ability(Ability::Vselennaya, &mut progress, &mut audio),
        AbilityOutcome::Locked
    );

    progress.unlock_ability(Ability::RhythmMaster);
    assert_eq!(
        player.use_ability(Ability::RhythmMaster, &mut progress, &mut audio),
        AbilityOutcome::Passive
    );

    progress.collect_cassette("vselennaya");
    assert!(progress.use_energy(70));
    assert_eq!(
        player.use_ability(Ability::Vselennaya, &mut progress, &mut audio),
        AbilityOutcome::NotEnoughEnergy
    );
    assert_eq!(progress.energy(), 30);
    assert_eq!(player.body.position, PLAYER_START);

    progress.restore_energy(100);
    assert!(player.attack(&mut audio));
    assert_eq!(
        player.use_ability(Ability::Vselennaya, &mut progress, &mut audio),
        AbilityOutcome::Activated(Ability::Vselennaya)
    );
    assert_eq!(progress.energy(), 60);
    assert_eq!(player.state, PlayerState::UsingAbility);
}

#[test]
fn ability_press_right_after_an_attack_still_activates() {
    let mut player = Player::default();
    let mut progress = Progression::new();
    let mut audio = RecordingAudio::default();
    progress.collect_cassette("vidihay");

    let swing = PlayerInput { attack: true, ..PlayerInput::default() };
    step(&mut player, swing, &mut progress, &mut audio);
    assert!(player.is_attacking());

    let cast = PlayerInput { ability: Some(Ability::Vidihay), ..PlayerInput::default() };
    let outcome = step(&mut player, cast, &mut progress, &mut audio);
    assert_eq!(outcome, Some(AbilityOutcome::Activated(Ability::Vidihay)));
    assert_eq!(progress.energy(), 70);
    assert!(player.is_stealthed());
    assert_eq!(player.state, PlayerState::UsingAbility);
}

#[test]
fn teleport_moves_in_the_facing_direction() {
    let mut player = Player::default();
    let mut progress = Progression::new();
    let mut audio = RecordingAudio::default();
    progress.collect_cassette("vselennaya");

    let outcome = player.use_ability(Ability::Vselennaya, &mut progress, &mut audio);
    assert_eq!(outcome, AbilityOutcome::Activated(Ability::Vselennaya));
    assert_eq!(player.body.position.x, PLAYER_START.x + TELEPORT_DISTANCE);
    assert_eq!(progress.energy(), 60);
    assert_eq!(player.state, PlayerState::UsingAbility);
}

#[test]
fn vidihay_heals_and_hides_until_an_attack() {
    let mut player = Player::default();
    let mut progress = Progression::new();
    let mut audio = RecordingAudio::default();
    progress.collect_cassette("vidihay");
    progress.take_damage(50);

    let cast = PlayerInput {
        ability: Some(Ability::Vidihay),
        ..PlayerInput::default()
    };
    assert_eq!(
        step(&mut player, cast, &mut progress, &mut audio),
        Some(AbilityOutcome::Activated(Ability::Vidihay))
    );
    assert_eq!(progress.health(), 70);
    assert!(player.is_stealthed());

    for _ in 0..30 {
        step(&mut player, PlayerInput::default(), &mut progress, &mut audio);
    }
    assert_eq!(player.state, PlayerState::Stealth);

    let attack = PlayerInput {
        attack: true,
        ..PlayerInput::default()
    };
    step(&mut player, attack, &mut progress, &mut audio);
    assert!(!player.is_stealthed());
    assert!(player.is_attacking());
    assert!(progress.health() <= MAX_HEALTH);
}

#[test]
fn each_attack_is_a_new_swing() {
    let mut player = Player::default();
    let mut progress = Progression::new();
    let mut audio = RecordingAudio::default();
    let attack = PlayerInput {
        attack: true,
        ..PlayerInput::default()
    };

    step(&mut player, attack, &mut progress, &mut audio);
    let first = player.swing();
    step(&mut player, attack, &mut progress, &mut audio);
    assert_eq!(player.swing(), first);

    for _ in 0..30 {
        step(&mut player, PlayerInput::default(), &mut progress, &mut audio);
    }
    assert!(!player.is_attacking());
    step(&mut player, attack, &mut progress, &mut audio);
    assert_eq!(player.swing(), first + 1);
}
