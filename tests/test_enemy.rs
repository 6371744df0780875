mod common;

use common::DT;
use macroquad::math::vec2;
use noize_voice::enemy::{DefeatReward, Enemy, EnemyAction, EnemyKind, RANGED_COOLDOWN};
use noize_voice::kinematics::FLOOR_Y;
use noize_voice::progression::{ProgressEvent, Progression};

fn run(enemy: &mut Enemy, seconds: f32, target: macroquad::math::Vec2) -> Vec<EnemyAction> {
    let ticks = (seconds / DT).round() as usize;
    (0..ticks).filter_map(|_| enemy.update(DT, target, &[])).collect()
}

#[test]
fn patrol_walks_then_turns_around() {
    let mut enemy = Enemy::new(EnemyKind::NoiseMaker, 400.0, FLOOR_Y);
    let far = vec2(5000.0, 0.0);

    run(&mut enemy, 1.0, far);
    assert!(enemy.body.velocity.x > 0.0);
    assert!(enemy.body.position.x > 450.0);

    run(&mut enemy, 1.5, far);
    assert!(enemy.body.velocity.x < 0.0);
}

#[test]
fn basic_movers_wait_before_moving() {
    let mut enemy = Enemy::new(EnemyKind::Silencer, 600.0, FLOOR_Y);
    let far = vec2(5000.0, 0.0);

    run(&mut enemy, 2.5, far);
    assert_eq!(enemy.body.position.x, 600.0);

    run(&mut enemy, 1.0, far);
    assert!(enemy.body.velocity.x > 0.0);
    assert!(enemy.body.position.x > 600.0);
}

#[test]
fn ground_enemies_fall_to_the_floor_and_drones_hover() {
    let mut walker = Enemy::new(EnemyKind::MediaSpammer, 300.0, 400.0);
    let mut drone = Enemy::new(EnemyKind::CensorDrone, 300.0, 400.0);
    let far = vec2(5000.0, 0.0);

    run(&mut walker, 2.0, far);
    run(&mut drone, 2.0, far);
    assert_eq!(walker.body.position.y, FLOOR_Y);
    assert!(walker.body.grounded);
    assert_eq!(drone.body.position.y, 400.0);
}

#[test]
fn critic_fires_when_the_player_is_in_range() {
    let mut critic = Enemy::new(EnemyKind::Critic, 500.0, FLOOR_Y);
    let near = critic.body.center() + vec2(100.0, 0.0);

    let shots = run(&mut critic, 3.0, near);
    assert_eq!(shots.len(), 2);
    assert!(matches!(shots[0], EnemyAction::RangedAttack { .. }));
    assert!(RANGED_COOLDOWN > 1.0);

    let mut idle = Enemy::new(EnemyKind::Critic, 500.0, FLOOR_Y);
    assert!(run(&mut idle, 3.0, vec2(1800.0, FLOOR_Y)).is_empty());
}

#[test]
fn defeat_pays_its_reward_exactly_once() {
    let mut progress = Progression::new();
    progress.use_energy(50);

    let mut silencer = Enemy::new(EnemyKind::Silencer, 0.0, FLOOR_Y);
    assert_eq!(silencer.take_damage(30, &mut progress), None);
    assert_eq!(silencer.health, 20);
    assert_eq!(
        silencer.take_damage(30, &mut progress),
        Some(DefeatReward::RestoreEnergy(20))
    );
    assert!(silencer.defeated);
    assert_eq!(silencer.take_damage(30, &mut progress), None);
    assert_eq!(progress.energy(), 70);

    let events = progress.drain_events();
    assert_eq!(events, vec![ProgressEvent::EnemyDefeated(EnemyKind::Silencer)]);
}

#[test]
fn critic_defeat_unlocks_a_memory_and_others_heal() {
    let mut progress = Progression::new();
    progress.take_damage(20);

    let mut critic = Enemy::new(EnemyKind::Critic, 0.0, FLOOR_Y);
    assert_eq!(critic.take_damage(100, &mut progress), Some(DefeatReward::CriticMemory));
    assert_eq!(progress.memory_count(), 1);
    assert!(progress
        .unlocked_memories()
        .iter()
        .all(|id| id.starts_with("critic_defeat_")));

    let mut phantom = Enemy::new(EnemyKind::FanaticPhantom, 0.0, FLOOR_Y);
    assert_eq!(phantom.take_damage(35, &mut progress), Some(DefeatReward::Heal(5)));
    assert_eq!(progress.health(), 85);
}

#[test]
fn critics_falling_on_the_same_tick_leave_separate_memories() {
    let mut progress = Progression::new();
    let mut first = Enemy::new(EnemyKind::Critic, 0.0, FLOOR_Y);
    let mut second = Enemy::new(EnemyKind::Critic, 300.0, FLOOR_Y);

    first.take_damage(40, &mut progress);
    second.take_damage(40, &mut progress);

    assert_eq!(progress.memory_count(), 2);
    assert!(progress.unlocked_memories().contains("critic_defeat_1"));
    assert!(progress.unlocked_memories().contains("critic_defeat_2"));
}

#[test]
fn defeated_enemies_stop_updating() {
    let mut progress = Progression::new();
    let mut enemy = Enemy::new(EnemyKind::NoiseMaker, 200.0, FLOOR_Y);
    enemy.take_damage(30, &mut progress);

    let before = enemy.body.position;
    assert!(run(&mut enemy, 1.0, vec2(210.0, FLOOR_Y)).is_empty());
    assert_eq!(enemy.body.position, before);
    assert!(!enemy.is_alive());
}
