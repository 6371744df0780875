mod common;

use common::{RecordingAudio, DT};
use noize_voice::rhythm::{
    bpm_for, BattleResult, Grade, Judgment, RhythmBattle, HIT_ZONE_Y, LANES, OFFSCREEN_Y, SPAWN_Y,
};
use noize_voice::AudioSink;

const NO_PRESS: [bool; LANES] = [false; LANES];

#[test]
fn notes_spawn_on_the_beat_while_music_plays() {
    let mut rng = common::rng();
    let mut audio = RecordingAudio::default();
    let mut battle = RhythmBattle::new();
    battle.start("make_some_noize", &mut audio);
    assert_eq!(battle.bpm(), 140.0);
    assert_eq!(audio.playing(), Some("make_some_noize"));

    for _ in 0..60 {
        assert!(battle.update(DT, NO_PRESS, &mut audio, &mut rng).is_none());
    }
    assert_eq!(battle.notes().len(), 2);
    assert!(battle.notes().iter().all(|n| n.y < SPAWN_Y && !n.hit));
}

#[test]
fn no_notes_spawn_without_music() {
    let mut rng = common::rng();
    let mut audio = RecordingAudio::default();
    let mut battle = RhythmBattle::new();
    battle.start("vidihay", &mut audio);
    audio.pause_music();

    battle.update(2.0, NO_PRESS, &mut audio, &mut rng);
    assert!(battle.notes().is_empty());
}

#[test]
fn presses_are_judged_by_distance_to_the_hit_line() {
    let mut audio = RecordingAudio::default();
    let mut battle = RhythmBattle::new();
    battle.start("vselennaya", &mut audio);

    battle.spawn_note(0, HIT_ZONE_Y + 10.0, 0.0);
    battle.spawn_note(1, HIT_ZONE_Y - 60.0, 0.0);
    battle.spawn_note(2, HIT_ZONE_Y + 100.0, 0.0);

    assert_eq!(battle.press_lane(0, &mut audio), Judgment::Perfect);
    assert_eq!(battle.score(), 100);
    assert_eq!(battle.press_lane(1, &mut audio), Judgment::Good);
    assert_eq!(battle.score(), 155);
    assert_eq!(battle.combo(), 2);

    assert_eq!(battle.press_lane(2, &mut audio), Judgment::Miss);
    assert_eq!(battle.combo(), 0);
    assert_eq!(battle.score(), 155);
    assert_eq!(audio.played("rhythm_hit"), 2);
}

#[test]
fn pressing_an_empty_lane_breaks_the_combo() {
    let mut audio = RecordingAudio::default();
    let mut battle = RhythmBattle::new();
    battle.start("igra_slov", &mut audio);

    battle.spawn_note(0, HIT_ZONE_Y, 0.0);
    battle.press_lane(0, &mut audio);
    assert_eq!(battle.combo(), 1);

    assert_eq!(battle.press_lane(3, &mut audio), Judgment::Miss);
    assert_eq!(battle.combo(), 0);
}

#[test]
fn notes_leaving_the_screen_reset_the_combo() {
    let mut rng = common::rng();
    let mut audio = RecordingAudio::default();
    let mut battle = RhythmBattle::new();
    battle.start("mercedes", &mut audio);

    battle.spawn_note(0, HIT_ZONE_Y, 0.0);
    battle.press_lane(0, &mut audio);
    battle.spawn_note(1, OFFSCREEN_Y + 1.0, 300.0);

    battle.update(DT, NO_PRESS, &mut audio, &mut rng);
    assert_eq!(battle.combo(), 0);
    assert!(battle.notes().iter().all(|n| n.lane != 1));
}

#[test]
fn battle_ends_once_music_stops_and_notes_clear() {
    let mut rng = common::rng();
    let mut audio = RecordingAudio::default();
    let mut battle = RhythmBattle::new();
    battle.start("make_some_noize", &mut audio);

    for _ in 0..40 {
        battle.spawn_note(0, HIT_ZONE_Y, 0.0);
        assert_eq!(battle.press_lane(0, &mut audio), Judgment::Perfect);
    }
    audio.stop_music();

    let result = battle.update(0.2, NO_PRESS, &mut audio, &mut rng);
    assert_eq!(
        result,
        Some(BattleResult {
            score: 11_800,
            max_combo: 40,
            grade: Grade::S,
        })
    );
    assert!(!battle.is_active());
    assert!(battle.update(DT, NO_PRESS, &mut audio, &mut rng).is_none());
}

#[test]
fn silent_battle_ends_with_the_lowest_grade() {
    let mut rng = common::rng();
    let mut audio = RecordingAudio::default();
    audio.toggle_music();
    let mut battle = RhythmBattle::new();
    battle.start("vidihay", &mut audio);

    let result = battle.update(DT, NO_PRESS, &mut audio, &mut rng).unwrap();
    assert_eq!(result.grade, Grade::D);
    assert_eq!(result.score, 0);
}

#[test]
fn cancel_stops_the_track_without_a_result() {
    let mut rng = common::rng();
    let mut audio = RecordingAudio::default();
    let mut battle = RhythmBattle::new();
    battle.start("vselennaya", &mut audio);
    battle.spawn_note(2, HIT_ZONE_Y, 0.0);

    battle.cancel(&mut audio);
    assert!(!battle.is_active());
    assert!(battle.notes().is_empty());
    assert_eq!(audio.playing(), None);
    assert!(battle.update(DT, NO_PRESS, &mut audio, &mut rng).is_none());
}

#[test]
fn unknown_tracks_use_the_default_tempo() {
    assert_eq!(bpm_for("not_a_track"), 120.0);
    assert_eq!(bpm_for("igra_slov"), 160.0);
    assert_eq!(Grade::S.reward(), (50, 50));
    assert_eq!(Grade::D.reward(), (10, 0));
}
