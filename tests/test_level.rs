mod common;

use common::{RecordingAudio, DT};
use macroquad::math::{vec2, Vec2};
use noize_voice::cassette::CASSETTE_SIZE;
use noize_voice::enemy::EnemyKind;
use noize_voice::kinematics::{Aabb, FLOOR_Y, WORLD_WIDTH};
use noize_voice::level::{
    CassetteSpawn, EnemySpawn, LevelCatalog, LevelDef, LevelError, SecretKind, SecretSpawn,
    FIRST_LEVEL,
};
use noize_voice::level_run::{LevelEvent, LevelRun, CONTACT_DAMAGE, SECRET_SIZE};
use noize_voice::player::{Player, PlayerInput, PLAYER_SIZE};
use noize_voice::progression::{ProgressEvent, Progression, MAX_HEALTH};
use noize_voice::Ability;
use std::io::Write;

fn arena(enemies: Vec<EnemySpawn>, cassettes: Vec<CassetteSpawn>, secrets: Vec<SecretSpawn>) -> LevelDef {
    LevelDef {
        id: "test_arena".to_string(),
        name: "Test Arena".to_string(),
        act: 1,
        music: String::new(),
        platforms: Vec::new(),
        enemies,
        cassettes,
        secrets,
        dialogue: None,
        next_level: Some("after_arena".to_string()),
    }
}

fn spawn(kind: EnemyKind, x: f32) -> EnemySpawn {
    EnemySpawn { x, y: 100.0, kind }
}

fn idle() -> PlayerInput {
    PlayerInput::default()
}

fn press_attack() -> PlayerInput {
    PlayerInput {
        attack: true,
        ..PlayerInput::default()
    }
}

fn press_ability(ability: Ability) -> PlayerInput {
    PlayerInput {
        ability: Some(ability),
        ..PlayerInput::default()
    }
}

fn run_ticks(
    run: &mut LevelRun,
    ticks: usize,
    progress: &mut Progression,
    audio: &mut RecordingAudio,
) -> Vec<LevelEvent> {
    let mut events = Vec::new();
    for _ in 0..ticks {
        events.extend(run.update(DT, &idle(), progress, audio));
    }
    events
}

#[test]
fn builtin_catalog_opens_with_the_first_level_only() {
    let catalog = LevelCatalog::builtin();
    let progress = Progression::new();

    assert_eq!(catalog.levels().len(), 8);
    assert!(catalog.is_level_unlocked(FIRST_LEVEL, &progress));
    for def in catalog.levels().iter().filter(|d| d.id != FIRST_LEVEL) {
        assert!(!catalog.is_level_unlocked(&def.id, &progress), "{} is open", def.id);
    }
    assert!(!catalog.is_level_unlocked("no_such_level", &progress));
    assert_eq!(catalog.current_act(&progress), 1);
}

#[test]
fn completing_a_level_opens_its_successor() {
    let catalog = LevelCatalog::builtin();
    let mut progress = Progression::new();

    progress.complete_level("act1_level1");
    assert!(catalog.is_level_unlocked("act1_level2", &progress));
    assert!(!catalog.is_level_unlocked("act2_level1", &progress));
    assert_eq!(catalog.current_act(&progress), 2);

    progress.complete_level("act3_level1");
    assert_eq!(catalog.current_act(&progress), 4);
    assert_eq!(catalog.next_level("final_boss"), Some("epilogue"));
    assert_eq!(catalog.next_level("epilogue"), None);
}

#[test]
fn levels_nothing_points_at_stay_locked() {
    let mut orphan = arena(Vec::new(), Vec::new(), Vec::new());
    orphan.id = "orphan".to_string();
    orphan.next_level = None;
    let mut first = arena(Vec::new(), Vec::new(), Vec::new());
    first.id = FIRST_LEVEL.to_string();
    first.next_level = None;

    let catalog = LevelCatalog::from_levels(vec![first, orphan]).unwrap();
    let mut progress = Progression::new();
    for id in [FIRST_LEVEL, "orphan", "test_arena"] {
        progress.complete_level(id);
    }
    assert!(!catalog.is_level_unlocked("orphan", &progress));
}

#[test]
fn catalog_rejects_empty_and_duplicate_definitions() {
    assert!(matches!(LevelCatalog::from_levels(Vec::new()), Err(LevelError::Invalid(_))));

    let a = arena(Vec::new(), Vec::new(), Vec::new());
    let b = a.clone();
    assert!(matches!(LevelCatalog::from_levels(vec![a, b]), Err(LevelError::Invalid(_))));
}

#[test]
fn catalog_loads_from_json_and_falls_back_on_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("levels.json");
    let mut def = arena(Vec::new(), Vec::new(), Vec::new());
    def.id = FIRST_LEVEL.to_string();
    std::fs::write(&path, serde_json::to_string(&vec![def]).unwrap()).unwrap();

    let catalog = LevelCatalog::load_from_file(&path).unwrap();
    assert_eq!(catalog.levels().len(), 1);
    assert_eq!(catalog.level(FIRST_LEVEL).unwrap().name, "Test Arena");

    let broken = dir.path().join("broken.json");
    let mut file = std::fs::File::create(&broken).unwrap();
    file.write_all(b"[{\"id\": ").unwrap();
    assert!(matches!(LevelCatalog::load_from_file(&broken), Err(LevelError::Json { .. })));

    let fallback = LevelCatalog::load_or_builtin(broken.to_str());
    assert_eq!(fallback.levels().len(), 8);
    let missing = dir.path().join("missing.json");
    assert!(matches!(LevelCatalog::load_from_file(&missing), Err(LevelError::Io { .. })));
    assert_eq!(LevelCatalog::load_or_builtin(None).levels().len(), 8);
}

#[test]
fn one_swing_lands_once_per_enemy() {
    let def = arena(vec![spawn(EnemyKind::Silencer, 120.0)], Vec::new(), Vec::new());
    let mut run = LevelRun::new(&def, 1.0);
    let mut progress = Progression::new();
    let mut audio = RecordingAudio::default();
    assert!(progress.use_energy(50));

    run.update(DT, &press_attack(), &mut progress, &mut audio);
    assert_eq!(run.enemies()[0].health, 25);

    run_ticks(&mut run, 30, &mut progress, &mut audio);
    assert_eq!(run.enemies()[0].health, 25);

    let events = run.update(DT, &press_attack(), &mut progress, &mut audio);
    assert!(run.enemies()[0].defeated);
    assert!(events
        .iter()
        .any(|e| matches!(e, LevelEvent::EnemyDefeated { kind: EnemyKind::Silencer, .. })));
    assert_eq!(progress.energy(), 70);

    assert!(run.is_completed());
    assert!(progress.is_level_completed("test_arena"));
    assert!(events.contains(&LevelEvent::Completed {
        level_id: "test_arena".to_string(),
        next_level: Some("after_arena".to_string()),
    }));
    assert!(run.update(DT, &idle(), &mut progress, &mut audio).is_empty());
}

#[test]
fn contact_damage_is_followed_by_invincibility() {
    let def = arena(vec![spawn(EnemyKind::Silencer, 120.0)], Vec::new(), Vec::new());
    let mut run = LevelRun::new(&def, 1.0);
    let mut progress = Progression::new();
    let mut audio = RecordingAudio::default();

    let events = run.update(DT, &idle(), &mut progress, &mut audio);
    assert_eq!(events, vec![LevelEvent::PlayerHurt { amount: CONTACT_DAMAGE }]);
    assert_eq!(progress.health(), MAX_HEALTH - CONTACT_DAMAGE);
    assert!(run.player_invincible());

    run_ticks(&mut run, 50, &mut progress, &mut audio);
    assert_eq!(progress.health(), MAX_HEALTH - CONTACT_DAMAGE);

    run_ticks(&mut run, 20, &mut progress, &mut audio);
    assert_eq!(progress.health(), MAX_HEALTH - 2 * CONTACT_DAMAGE);
    assert_eq!(audio.played("hurt"), 2);
}

#[test]
fn stealth_blocks_contact_damage() {
    let def = arena(vec![spawn(EnemyKind::Silencer, 120.0)], Vec::new(), Vec::new());
    let mut run = LevelRun::new(&def, 1.0);
    let mut progress = Progression::new();
    let mut audio = RecordingAudio::default();
    progress.collect_cassette("vidihay");

    run.update(DT, &press_ability(Ability::Vidihay), &mut progress, &mut audio);
    run_ticks(&mut run, 90, &mut progress, &mut audio);

    assert!(run.player.is_stealthed());
    assert_eq!(progress.health(), MAX_HEALTH);
    assert_eq!(progress.energy(), 70);
}

#[test]
fn noise_blast_hits_only_enemies_in_radius() {
    let def = arena(
        vec![spawn(EnemyKind::NoiseMaker, 250.0), spawn(EnemyKind::Critic, 1500.0)],
        Vec::new(),
        Vec::new(),
    );
    let mut run = LevelRun::new(&def, 1.0);
    let mut progress = Progression::new();
    let mut audio = RecordingAudio::default();
    progress.collect_cassette("make_some_noize");

    let events = run.update(DT, &press_ability(Ability::MakeSomeNoize), &mut progress, &mut audio);
    assert!(events
        .iter()
        .any(|e| matches!(e, LevelEvent::AbilityUsed { ability: Ability::MakeSomeNoize, .. })));
    assert_eq!(run.enemies()[0].health, 10);
    assert_eq!(run.enemies()[1].health, 40);
    assert_eq!(progress.energy(), 80);

    run_ticks(&mut run, 30, &mut progress, &mut audio);
    run.update(DT, &press_ability(Ability::MakeSomeNoize), &mut progress, &mut audio);
    assert!(run.enemies()[0].defeated);
    assert!(!run.enemies()[1].defeated);
    assert!(!run.is_completed());
}

#[test]
fn cassette_pickup_collects_and_clears_the_level() {
    let def = arena(
        Vec::new(),
        vec![CassetteSpawn {
            x: 110.0,
            y: 110.0,
            track_id: "make_some_noize".to_string(),
        }],
        Vec::new(),
    );
    let mut run = LevelRun::new(&def, 1.0);
    let mut progress = Progression::new();
    let mut audio = RecordingAudio::default();

    let events = run.update(DT, &idle(), &mut progress, &mut audio);

    assert!(matches!(
        events.first(),
        Some(LevelEvent::CassettePicked { track_id, .. }) if track_id == "make_some_noize"
    ));
    assert!(run.cassettes()[0].collected);
    assert!(progress.has_cassette("make_some_noize"));
    assert!(progress.has_ability(Ability::MakeSomeNoize));
    assert!(run.is_completed());
    assert_eq!(audio.played("cassette_pickup"), 1);
}

#[test]
fn diary_secret_is_found_and_read_once() {
    let def = arena(
        vec![spawn(EnemyKind::NoiseMaker, 1500.0)],
        Vec::new(),
        vec![SecretSpawn {
            x: 100.0,
            y: 100.0,
            secret_id: "tour_diary".to_string(),
            kind: SecretKind::Diary,
        }],
    );
    let mut run = LevelRun::new(&def, 1.0);
    let mut progress = Progression::new();
    let mut audio = RecordingAudio::default();

    let first = run.update(DT, &idle(), &mut progress, &mut audio);
    let later = run_ticks(&mut run, 10, &mut progress, &mut audio);

    assert!(first.contains(&LevelEvent::SecretFound {
        id: "tour_diary".to_string(),
        kind: SecretKind::Diary,
    }));
    assert!(!later.iter().any(|e| matches!(e, LevelEvent::SecretFound { .. })));
    assert!(run.secrets()[0].found);
    assert!(progress.found_secrets().contains("tour_diary"));
    assert!(progress.read_diaries().contains("tour_diary"));

    let queued = progress.drain_events();
    assert!(queued.contains(&ProgressEvent::SecretFound("tour_diary".to_string())));
    assert!(queued.contains(&ProgressEvent::DiaryRead("tour_diary".to_string())));
}

/// Jumps from `start` holding one direction, double jumping `double_jump`
/// ticks after take-off. Marks every target the player overlaps and returns
/// where the player came to rest.
fn jump_arc(
    start: Vec2,
    held: Option<bool>,
    double_jump: usize,
    platforms: &[Aabb],
    targets: &[Aabb],
    touched: &mut [bool],
) -> Option<Vec2> {
    let mut progress = Progression::new();
    let mut audio = RecordingAudio::default();
    let mut player = Player::new(start);
    player.update(DT, &idle(), platforms, &mut progress, &mut audio);
    if !player.body.grounded {
        return None;
    }

    for tick in 0..240 {
        let input = PlayerInput {
            left: held == Some(false),
            right: held == Some(true),
            jump: tick == 0 || tick == double_jump,
            ..PlayerInput::default()
        };
        player.update(DT, &input, platforms, &mut progress, &mut audio);
        let hitbox = player.hitbox();
        for (target, hit) in targets.iter().zip(touched.iter_mut()) {
            *hit |= hitbox.overlaps(target);
        }
        if tick > 0 && player.body.grounded {
            return Some(player.body.position);
        }
    }
    None
}

/// Searches every surface reachable from the floor and reports which targets
/// some jump can touch.
fn reachable_targets(platforms: &[Aabb], targets: &[Aabb]) -> Vec<bool> {
    let mut touched = vec![false; targets.len()];
    let mut visited: Vec<bool> = platforms.iter().map(|p| p.top() <= FLOOR_Y).collect();
    let mut pending = vec![Aabb::new(0.0, 0.0, WORLD_WIDTH, FLOOR_Y)];

    while let Some(surface) = pending.pop() {
        let mut x = (surface.x - PLAYER_SIZE.x + 4.0).max(0.0);
        while x < surface.right().min(WORLD_WIDTH - PLAYER_SIZE.x) {
            for held in [None, Some(false), Some(true)] {
                for double_jump in (1..60).step_by(3) {
                    let start = vec2(x, surface.top());
                    let Some(rest) = jump_arc(start, held, double_jump, platforms, targets, &mut touched) else {
                        continue;
                    };
                    for (platform, seen) in platforms.iter().zip(visited.iter_mut()) {
                        let under = platform.x < rest.x + PLAYER_SIZE.x && rest.x < platform.right();
                        if !*seen && under && platform.top() == rest.y {
                            *seen = true;
                            pending.push(*platform);
                        }
                    }
                }
            }
            x += 20.0;
        }
    }
    touched
}

#[test]
fn every_builtin_pickup_can_be_reached_on_foot() {
    let catalog = LevelCatalog::builtin();
    for def in catalog.levels() {
        let targets: Vec<Aabb> = def
            .cassettes
            .iter()
            .map(|c| Aabb::at(vec2(c.x, c.y), CASSETTE_SIZE))
            .chain(def.secrets.iter().map(|s| Aabb::at(vec2(s.x, s.y), SECRET_SIZE)))
            .collect();
        let touched = reachable_targets(&def.platforms, &targets);
        for (target, hit) in targets.iter().zip(&touched) {
            assert!(*hit, "{}: pickup at ({}, {}) is out of reach", def.id, target.x, target.y);
        }
    }
}
