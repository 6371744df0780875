use crate::audio::AudioSink;
use crate::progression::Progression;
use std::collections::{BTreeMap, VecDeque};
use tracing::debug;

pub const TYPEWRITER_SPEED: f32 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emotion {
    Neutral,
    Happy,
    Sad,
    Angry,
    Surprised,
    Thoughtful,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DialogueLine {
    pub speaker: String,
    pub text: String,
    pub emotion: Emotion,
    pub sound: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dialogue {
    pub id: String,
    pub lines: Vec<DialogueLine>,
    pub music: Option<String>,
}

fn line(speaker: &str, text: &str, emotion: Emotion) -> DialogueLine {
    DialogueLine {
        speaker: speaker.to_string(),
        text: text.to_string(),
        emotion,
        sound: None,
    }
}

fn dialogue(id: &str, music: Option<&str>, lines: Vec<DialogueLine>) -> Dialogue {
    Dialogue {
        id: id.to_string(),
        lines,
        music: music.map(str::to_string),
    }
}

pub fn default_dialogues() -> Vec<Dialogue> {
    use Emotion::*;

    vec![
        dialogue(
            "prologue_intro",
            Some("make_some_noize"),
            vec![
                line("", "The studio is wrecked...", Sad),
                line("", "Broken speakers, instruments scattered across the floor...", Thoughtful),
                line("Ivan", "The studio is gone. My songs...", Sad),
                line("Shadow", "You thought they were yours? Without a voice you are nobody.", Angry),
                line("Ivan", "I will take it all back. My music, my freedom.", Angry),
            ],
        ),
        dialogue(
            "act1_street",
            None,
            vec![
                line("Fan", "Ivan, they are banning your concerts!", Surprised),
                line("Ivan", "Music is stronger than any ban.", Thoughtful),
            ],
        ),
        dialogue(
            "act2_dorm",
            Some("vselennaya"),
            vec![
                line("Friend", "Remember how we dreamed about the stage?", Happy),
                line("Ivan", "Every song is my voice. I want the world to hear it.", Thoughtful),
            ],
        ),
        dialogue(
            "act3_silence",
            Some("vidihay"),
            vec![
                line("Ivan", "I can't hear myself. The voice is gone.", Sad),
                line("Shadow", "Your music fades along with your confidence.", Angry),
            ],
        ),
        dialogue(
            "act5_system",
            None,
            vec![line("Ivan", "Every song, every story is my road.", Thoughtful)],
        ),
        dialogue(
            "final_barkov",
            Some("mercedes"),
            vec![
                line("Barkov", "You could have stayed quiet and followed the rules.", Angry),
                line("Ivan", "I will be heard.", Angry),
            ],
        ),
        dialogue(
            "epilogue_sea",
            Some("moe_more"),
            vec![
                line("Ivan", "My music, my words, my freedom. All of it is with me.", Happy),
                line("", "My sea keeps my songs, my dreams and my freedom.", Thoughtful),
            ],
        ),
    ]
}

#[derive(Debug, Clone)]
struct ActiveDialogue {
    id: String,
    line: usize,
    timer: f32,
    visible: usize,
}

#[derive(Debug, Clone)]
pub struct DialogueSystem {
    catalog: BTreeMap<String, Dialogue>,
    active: Option<ActiveDialogue>,
}

impl Default for DialogueSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl DialogueSystem {
    pub fn new() -> Self {
        Self::with_dialogues(default_dialogues())
    }

    pub fn with_dialogues(dialogues: Vec<Dialogue>) -> Self {
        Self {
            catalog: dialogues.into_iter().map(|d| (d.id.clone(), d)).collect(),
            active: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.id.as_str())
    }

    /// Starts a dialogue by id. Unknown ids are ignored.
    pub fn start(&mut self, id: &str, progress: &mut Progression, audio: &mut dyn AudioSink) -> bool {
        let Some(dialogue) = self.catalog.get(id) else {
            debug!(dialogue = %id, "dialogue_missing");
            return false;
        };
        if dialogue.lines.is_empty() {
            return false;
        }
        if let Some(music) = &dialogue.music {
            audio.play_music(music, true);
        }
        progress.watch_cutscene(id);
        self.active = Some(ActiveDialogue {
            id: id.to_string(),
            line: 0,
            timer: 0.0,
            visible: 0,
        });
        self.play_line_sound(audio);
        debug!(dialogue = %id, "dialogue_started");
        true
    }

    pub fn current_line(&self) -> Option<&DialogueLine> {
        let active = self.active.as_ref()?;
        self.catalog.get(&active.id)?.lines.get(active.line)
    }

    pub fn visible_text(&self) -> &str {
        let (Some(active), Some(line)) = (self.active.as_ref(), self.current_line()) else {
            return "";
        };
        let end = line
            .text
            .char_indices()
            .nth(active.visible)
            .map(|(i, _)| i)
            .unwrap_or(line.text.len());
        &line.text[..end]
    }

    pub fn line_fully_shown(&self) -> bool {
        match (self.active.as_ref(), self.current_line()) {
            (Some(active), Some(line)) => active.visible >= line.text.chars().count(),
            _ => true,
        }
    }

    pub fn update(&mut self, dt: f32) {
        let Some(len) = self.current_line().map(|l| l.text.chars().count()) else {
            return;
        };
        if let Some(active) = self.active.as_mut() {
            active.timer += dt;
            active.visible = ((active.timer * TYPEWRITER_SPEED) as usize).min(len);
        }
    }

    /// Reveals the whole line, or moves on if it is already shown. Returns
    /// false once the dialogue has ended.
    pub fn advance(&mut self, audio: &mut dyn AudioSink) -> bool {
        if !self.line_fully_shown() {
            if let (Some(len), Some(active)) = (
                self.current_line().map(|l| l.text.chars().count()),
                self.active.as_mut(),
            ) {
                active.visible = len;
            }
            return true;
        }

        let line_count = self
            .active
            .as_ref()
            .and_then(|a| self.catalog.get(&a.id))
            .map(|d| d.lines.len())
            .unwrap_or(0);
        let Some(active) = self.active.as_mut() else {
            return false;
        };
        if active.line + 1 >= line_count {
            debug!(dialogue = %active.id, "dialogue_finished");
            self.active = None;
            return false;
        }
        active.line += 1;
        active.timer = 0.0;
        active.visible = 0;
        self.play_line_sound(audio);
        true
    }

    pub fn skip(&mut self) {
        if let Some(active) = self.active.take() {
            debug!(dialogue = %active.id, "dialogue_skipped");
        }
    }

    fn play_line_sound(&self, audio: &mut dyn AudioSink) {
        if let Some(sound) = self.current_line().and_then(|l| l.sound.as_deref()) {
            audio.play_sound(sound, 1.0);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub text: String,
    pub ticks_left: u32,
}

/// Transient on-screen messages, dismissed after a fixed number of ticks.
#[derive(Debug, Clone, Default)]
pub struct NoticeBoard {
    notices: VecDeque<Notice>,
}

impl NoticeBoard {
    pub fn push(&mut self, text: impl Into<String>, ticks: u32) {
        self.notices.push_back(Notice {
            text: text.into(),
            ticks_left: ticks.max(1),
        });
    }

    pub fn tick(&mut self) {
        for notice in self.notices.iter_mut() {
            notice.ticks_left = notice.ticks_left.saturating_sub(1);
        }
        self.notices.retain(|n| n.ticks_left > 0);
    }

    pub fn current(&self) -> Option<&str> {
        self.notices.front().map(|n| n.text.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.notices.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }
}
