use crate::audio::AudioSink;
use crate::kinematics::WORLD_HEIGHT;
use rand::Rng;
use tracing::{debug, info};

pub const LANES: usize = 4;
pub const HIT_ZONE_Y: f32 = 200.0;
pub const PERFECT_ZONE: f32 = 50.0;
pub const GOOD_ZONE: f32 = 80.0;
pub const NOTE_SPEED: f32 = 300.0;
pub const FAST_NOTE_SPEED: f32 = 400.0;
pub const SPAWN_Y: f32 = WORLD_HEIGHT + 50.0;
pub const OFFSCREEN_Y: f32 = -50.0;
pub const LANE_ORIGIN_X: f32 = 200.0;
pub const LANE_SPACING: f32 = 100.0;
const HIT_FADE: f32 = 0.15;
const WORDPLAY_TRACK: &str = "igra_slov";
const WORDPLAY_BONUS_AFTER: f32 = 10.0;
const WORDPLAY_BONUS_CHANCE: f64 = 0.3;

pub fn bpm_for(track: &str) -> f32 {
    match track {
        "make_some_noize" => 140.0,
        "vidihay" => 90.0,
        "vselennaya" => 120.0,
        "igra_slov" => 160.0,
        "mercedes" => 130.0,
        _ => 120.0,
    }
}

pub fn lane_x(lane: usize) -> f32 {
    LANE_ORIGIN_X + lane as f32 * LANE_SPACING
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Judgment {
    Perfect,
    Good,
    Miss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Grade {
    S,
    A,
    B,
    C,
    D,
}

impl Grade {
    pub fn from_score(score: u32) -> Self {
        match score {
            s if s >= 5000 => Grade::S,
            s if s >= 3000 => Grade::A,
            s if s >= 2000 => Grade::B,
            s if s >= 1000 => Grade::C,
            _ => Grade::D,
        }
    }

    /// (heal, energy) granted at the end of a battle.
    pub fn reward(self) -> (u32, u32) {
        match self {
            Grade::S => (50, 50),
            Grade::A => (30, 30),
            Grade::B => (20, 20),
            Grade::C | Grade::D => (10, 0),
        }
    }

    pub fn letter(self) -> &'static str {
        match self {
            Grade::S => "S",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RhythmNote {
    pub lane: usize,
    pub y: f32,
    pub speed: f32,
    pub hit: bool,
    fade: f32,
}

impl RhythmNote {
    pub fn new(lane: usize, y: f32, speed: f32) -> Self {
        Self { lane, y, speed, hit: false, fade: HIT_FADE }
    }

    /// Remaining opacity for a judged note, 1.0 for live ones.
    pub fn alpha(&self) -> f32 {
        if self.hit {
            (self.fade / HIT_FADE).clamp(0.0, 1.0)
        } else {
            1.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BattleResult {
    pub score: u32,
    pub max_combo: u32,
    pub grade: Grade,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleState {
    Inactive,
    Active,
}

#[derive(Debug, Clone)]
pub struct RhythmBattle {
    state: BattleState,
    track: String,
    notes: Vec<RhythmNote>,
    score: u32,
    combo: u32,
    max_combo: u32,
    bpm: f32,
    battle_time: f32,
    spawn_timer: f32,
}

impl Default for RhythmBattle {
    fn default() -> Self {
        Self::new()
    }
}

impl RhythmBattle {
    pub fn new() -> Self {
        Self {
            state: BattleState::Inactive,
            track: String::new(),
            notes: Vec::new(),
            score: 0,
            combo: 0,
            max_combo: 0,
            bpm: 120.0,
            battle_time: 0.0,
            spawn_timer: 0.0,
        }
    }

    pub fn state(&self) -> BattleState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == BattleState::Active
    }

    pub fn track(&self) -> &str {
        &self.track
    }

    pub fn notes(&self) -> &[RhythmNote] {
        &self.notes
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn bpm(&self) -> f32 {
        self.bpm
    }

    pub fn start(&mut self, track: &str, audio: &mut dyn AudioSink) {
        self.state = BattleState::Active;
        self.track = track.to_string();
        self.notes.clear();
        self.score = 0;
        self.combo = 0;
        self.max_combo = 0;
        self.bpm = bpm_for(track);
        self.battle_time = 0.0;
        self.spawn_timer = 0.0;
        audio.start_rhythm_track(track);
        info!(track = %track, bpm = self.bpm, "rhythm_battle_started");
    }

    pub fn cancel(&mut self, audio: &mut dyn AudioSink) {
        if self.is_active() {
            debug!(track = %self.track, "rhythm_battle_cancelled");
            audio.stop_music();
        }
        self.state = BattleState::Inactive;
        self.notes.clear();
    }

    pub fn spawn_note(&mut self, lane: usize, y: f32, speed: f32) {
        self.notes.push(RhythmNote::new(lane.min(LANES - 1), y, speed));
    }

    /// Advances one tick. `pressed` holds the lane presses for this tick.
    /// Returns the result on the tick the battle ends.
    pub fn update(
        &mut self,
        dt: f32,
        pressed: [bool; LANES],
        audio: &mut dyn AudioSink,
        rng: &mut impl Rng,
    ) -> Option<BattleResult> {
        if !self.is_active() {
            return None;
        }

        self.battle_time += dt;
        self.spawn_timer += dt;

        let interval = 60.0 / self.bpm;
        if self.spawn_timer >= interval && audio.is_music_playing() {
            self.spawn_timer = 0.0;
            let lane = rng.gen_range(0..LANES);
            self.spawn_note(lane, SPAWN_Y, NOTE_SPEED);

            if self.track == WORDPLAY_TRACK
                && self.battle_time > WORDPLAY_BONUS_AFTER
                && rng.gen_bool(WORDPLAY_BONUS_CHANCE)
            {
                let lane = rng.gen_range(0..LANES);
                self.spawn_note(lane, SPAWN_Y, FAST_NOTE_SPEED);
            }
        }

        let mut missed = false;
        self.notes.retain_mut(|note| {
            if note.hit {
                note.fade -= dt;
                return note.fade > 0.0;
            }
            note.y -= note.speed * dt;
            if note.y < OFFSCREEN_Y {
                missed = true;
                return false;
            }
            true
        });
        if missed {
            self.combo = 0;
        }

        for (lane, _) in pressed.iter().enumerate().filter(|(_, down)| **down) {
            self.press_lane(lane, audio);
        }

        if !audio.is_music_playing() && self.notes.is_empty() {
            return Some(self.finish());
        }
        None
    }

    /// Judges a press against the closest unjudged note in the lane.
    pub fn press_lane(&mut self, lane: usize, audio: &mut dyn AudioSink) -> Judgment {
        let closest = self
            .notes
            .iter_mut()
            .filter(|n| n.lane == lane && !n.hit)
            .min_by(|a, b| {
                let da = (a.y - HIT_ZONE_Y).abs();
                let db = (b.y - HIT_ZONE_Y).abs();
                da.total_cmp(&db)
            });

        let Some(note) = closest else {
            self.combo = 0;
            return Judgment::Miss;
        };

        let distance = (note.y - HIT_ZONE_Y).abs();
        let judgment = if distance <= PERFECT_ZONE {
            Judgment::Perfect
        } else if distance <= GOOD_ZONE {
            Judgment::Good
        } else {
            Judgment::Miss
        };

        match judgment {
            Judgment::Perfect => {
                note.hit = true;
                self.score += 100 + 10 * self.combo;
                audio.play_sound("rhythm_hit", 1.0);
            }
            Judgment::Good => {
                note.hit = true;
                self.score += 50 + 5 * self.combo;
                audio.play_sound("rhythm_hit", 0.7);
            }
            Judgment::Miss => {
                self.combo = 0;
                debug!(lane, distance, "rhythm_miss");
                return judgment;
            }
        }

        self.combo += 1;
        self.max_combo = self.max_combo.max(self.combo);
        judgment
    }

    fn finish(&mut self) -> BattleResult {
        self.state = BattleState::Inactive;
        self.notes.clear();
        let grade = Grade::from_score(self.score);
        info!(score = self.score, grade = grade.letter(), "rhythm_battle_finished");
        BattleResult {
            score: self.score,
            max_combo: self.max_combo,
            grade,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_thresholds() {
        assert_eq!(Grade::from_score(5000), Grade::S);
        assert_eq!(Grade::from_score(4999), Grade::A);
        assert_eq!(Grade::from_score(2000), Grade::B);
        assert_eq!(Grade::from_score(1999), Grade::C);
        assert_eq!(Grade::from_score(999), Grade::D);
    }

    #[test]
    fn lanes_are_spaced_evenly() {
        assert_eq!(lane_x(0), 200.0);
        assert_eq!(lane_x(3), 500.0);
    }
}
