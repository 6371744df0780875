mod common;

use common::RecordingAudio;
use noize_voice::dialogue::{
    Dialogue, DialogueLine, DialogueSystem, Emotion, NoticeBoard, TYPEWRITER_SPEED,
};
use noize_voice::progression::Progression;

fn two_liner() -> Dialogue {
    Dialogue {
        id: "talk".to_string(),
        music: Some("vidihay".to_string()),
        lines: vec![
            DialogueLine {
                speaker: "Ivan".to_string(),
                text: "Hello there".to_string(),
                emotion: Emotion::Happy,
                sound: Some("collect".to_string()),
            },
            DialogueLine {
                speaker: "Fan".to_string(),
                text: "Hi".to_string(),
                emotion: Emotion::Neutral,
                sound: None,
            },
        ],
    }
}

#[test]
fn start_plays_music_and_marks_the_cutscene() {
    let mut system = DialogueSystem::with_dialogues(vec![two_liner()]);
    let mut progress = Progression::new();
    let mut audio = RecordingAudio::default();

    assert!(system.start("talk", &mut progress, &mut audio));
    assert!(system.is_active());
    assert_eq!(system.active_id(), Some("talk"));
    assert_eq!(audio.playing(), Some("vidihay"));
    assert_eq!(audio.played("collect"), 1);
    assert!(progress.watched_cutscenes().contains("talk"));

    assert!(!system.start("missing", &mut progress, &mut audio));
    assert_eq!(system.active_id(), Some("talk"));
}

#[test]
fn text_is_revealed_over_time() {
    let mut system = DialogueSystem::with_dialogues(vec![two_liner()]);
    let mut progress = Progression::new();
    let mut audio = RecordingAudio::default();
    system.start("talk", &mut progress, &mut audio);

    assert_eq!(system.visible_text(), "");
    system.update(5.0 / TYPEWRITER_SPEED + 0.001);
    assert_eq!(system.visible_text(), "Hello");
    assert!(!system.line_fully_shown());

    system.update(10.0);
    assert_eq!(system.visible_text(), "Hello there");
    assert!(system.line_fully_shown());
}

#[test]
fn advance_reveals_then_moves_on_then_ends() {
    let mut system = DialogueSystem::with_dialogues(vec![two_liner()]);
    let mut progress = Progression::new();
    let mut audio = RecordingAudio::default();
    system.start("talk", &mut progress, &mut audio);

    assert!(system.advance(&mut audio));
    assert_eq!(system.visible_text(), "Hello there");
    assert_eq!(system.current_line().unwrap().speaker, "Ivan");

    assert!(system.advance(&mut audio));
    assert_eq!(system.current_line().unwrap().speaker, "Fan");

    assert!(system.advance(&mut audio));
    assert!(!system.advance(&mut audio));
    assert!(!system.is_active());
    assert!(system.current_line().is_none());
}

#[test]
fn skip_ends_immediately() {
    let mut system = DialogueSystem::new();
    let mut progress = Progression::new();
    let mut audio = RecordingAudio::default();

    assert!(system.start("prologue_intro", &mut progress, &mut audio));
    system.skip();
    assert!(!system.is_active());
    assert_eq!(system.visible_text(), "");
}

#[test]
fn notices_expire_after_their_ticks() {
    let mut board = NoticeBoard::default();
    board.push("Level complete", 2);
    board.push("Secret found", 3);
    assert_eq!(board.current(), Some("Level complete"));

    board.tick();
    board.tick();
    assert_eq!(board.current(), Some("Secret found"));
    board.tick();
    assert!(board.is_empty());
}
