use crate::audio::AudioSink;
use crate::progression::Progression;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info};

pub const TIME_LIMIT: f32 = 30.0;
pub const SUCCESS_ENERGY: u32 = 20;
pub const MEMORY_PUZZLE_HEAL: u32 = 15;
pub const WORD_ASSOCIATION_ENERGY: u32 = 30;
const MEMORY_MIN_LEN: usize = 10;
const SEQUENCE_LEN: usize = 4;

const LYRIC_TEMPLATES: [&str; 5] = [
    "My voice _ through the noise",
    "Freedom _ in every note",
    "Music _ louder than the bans",
    "I _ in my own words",
    "Sound _ through the walls",
];

const LYRIC_WORDS: [&str; 10] = [
    "sounds", "breaks", "lives", "breathes", "speak", "shout", "sing", "fight", "fly", "bursts",
];

const MEMORY_FRAGMENTS: [&str; 5] = [
    "The first club gig...",
    "The studio on the old street...",
    "Recording the debut album...",
    "Meeting the producer...",
    "The radio interview...",
];

const RHYMES: [&str; 4] = ["choice", "rejoice", "invoice", "noise"];
const SEQUENCE_KEYS: [char; 4] = ['a', 's', 'd', 'f'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MiniGameKind {
    LyricCreation,
    MemoryPuzzle,
    RhythmSequence,
    WordAssociation,
}

impl MiniGameKind {
    pub const ALL: [MiniGameKind; 4] = [
        MiniGameKind::LyricCreation,
        MiniGameKind::MemoryPuzzle,
        MiniGameKind::RhythmSequence,
        MiniGameKind::WordAssociation,
    ];

    pub fn title(self) -> &'static str {
        match self {
            MiniGameKind::LyricCreation => "Write a verse",
            MiniGameKind::MemoryPuzzle => "Restore the memory",
            MiniGameKind::RhythmSequence => "Repeat the rhythm",
            MiniGameKind::WordAssociation => "Wordplay",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MiniGameOutcome {
    pub kind: MiniGameKind,
    pub success: bool,
    pub score: u32,
}

#[derive(Debug, Clone)]
pub struct MiniGame {
    kind: MiniGameKind,
    prompt: String,
    answer: Option<String>,
    input: String,
    elapsed: f32,
    score: u32,
}

impl MiniGame {
    pub fn start(kind: MiniGameKind, rng: &mut impl Rng) -> Self {
        let (prompt, answer) = match kind {
            MiniGameKind::LyricCreation => (pick(&LYRIC_TEMPLATES, rng), None),
            MiniGameKind::MemoryPuzzle => (pick(&MEMORY_FRAGMENTS, rng), None),
            MiniGameKind::RhythmSequence => {
                let sequence: String = (0..SEQUENCE_LEN)
                    .map(|_| SEQUENCE_KEYS[rng.gen_range(0..SEQUENCE_KEYS.len())])
                    .collect();
                let shown = sequence
                    .chars()
                    .map(|c| c.to_ascii_uppercase().to_string())
                    .collect::<Vec<_>>()
                    .join("-");
                (format!("Repeat the rhythm: {shown}"), Some(sequence))
            }
            MiniGameKind::WordAssociation => ("Find a rhyme for: VOICE".to_string(), None),
        };
        debug!(kind = ?kind, "mini_game_started");
        Self {
            kind,
            prompt,
            answer,
            input: String::new(),
            elapsed: 0.0,
            score: 0,
        }
    }

    pub fn kind(&self) -> MiniGameKind {
        self.kind
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn time_left(&self) -> f32 {
        (TIME_LIMIT - self.elapsed).max(0.0)
    }

    /// Accepts letters only.
    pub fn push_char(&mut self, c: char, audio: &mut dyn AudioSink) {
        if c.is_ascii_alphabetic() {
            self.input.push(c.to_ascii_lowercase());
            audio.play_sound("collect", 0.3);
        }
    }

    pub fn backspace(&mut self) {
        self.input.pop();
    }

    /// Checks the typed answer. A wrong answer keeps the game running.
    pub fn submit(
        &mut self,
        progress: &mut Progression,
        audio: &mut dyn AudioSink,
    ) -> Option<MiniGameOutcome> {
        let input = self.input.as_str();
        let (solved, points) = match self.kind {
            MiniGameKind::LyricCreation => (LYRIC_WORDS.iter().any(|w| input.contains(w)), 100),
            MiniGameKind::WordAssociation => (RHYMES.iter().any(|w| input.contains(w)), 100),
            MiniGameKind::MemoryPuzzle => (input.chars().count() >= MEMORY_MIN_LEN, 50),
            MiniGameKind::RhythmSequence => (self.answer.as_deref() == Some(input), 100),
        };
        if !solved {
            return None;
        }
        self.score += points;
        Some(self.finish(true, progress, audio))
    }

    /// Runs the clock. Returns a failure once time is up.
    pub fn update(
        &mut self,
        dt: f32,
        progress: &mut Progression,
        audio: &mut dyn AudioSink,
    ) -> Option<MiniGameOutcome> {
        self.elapsed += dt;
        if self.elapsed > TIME_LIMIT {
            return Some(self.finish(false, progress, audio));
        }
        None
    }

    /// Leaving early counts as a failure.
    pub fn cancel(
        &mut self,
        progress: &mut Progression,
        audio: &mut dyn AudioSink,
    ) -> MiniGameOutcome {
        self.finish(false, progress, audio)
    }

    fn finish(
        &mut self,
        success: bool,
        progress: &mut Progression,
        audio: &mut dyn AudioSink,
    ) -> MiniGameOutcome {
        if success {
            progress.restore_energy(SUCCESS_ENERGY);
            match self.kind {
                MiniGameKind::LyricCreation => {
                    let stamp = (progress.play_time() * 1000.0) as u64;
                    progress.unlock_memory(&format!("created_lyric_{stamp}"));
                }
                MiniGameKind::MemoryPuzzle => progress.heal(MEMORY_PUZZLE_HEAL),
                MiniGameKind::WordAssociation => progress.restore_energy(WORD_ASSOCIATION_ENERGY),
                MiniGameKind::RhythmSequence => {}
            }
            audio.play_sound("ability", 1.0);
            info!(kind = ?self.kind, score = self.score, "mini_game_won");
        } else {
            audio.play_sound("hurt", 0.5);
            info!(kind = ?self.kind, "mini_game_failed");
        }
        MiniGameOutcome {
            kind: self.kind,
            success,
            score: self.score,
        }
    }
}

fn pick(options: &[&str], rng: &mut impl Rng) -> String {
    options.choose(rng).copied().unwrap_or_default().to_string()
}
