use crate::ability::Ability;
use crate::audio::{AudioSink, HeadlessAudio};
use crate::boss::{BossEncounter, EncounterStatus, BOSS_LEVEL_ID, BOSS_TRACK};
use crate::cassette::track_display_name;
use crate::cassette::Track;
use crate::dialogue::{DialogueSystem, NoticeBoard};
use crate::level::LevelCatalog;
use crate::level_run::{LevelEvent, LevelRun};
use crate::minigame::{MiniGame, MiniGameKind, MiniGameOutcome};
use crate::particles::ParticleSystem;
use crate::player::PlayerInput;
use crate::progression::{ProgressEvent, Progression};
use crate::quest::QuestTracker;
use crate::rhythm::{BattleResult, RhythmBattle, LANES};
use crate::rules::GameRules;
use crate::save::{KeyValueStore, SaveError, SaveSystem};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    pub player: PlayerInput,
    pub lanes: [bool; LANES],
    pub advance_dialogue: bool,
    pub skip_dialogue: bool,
    pub typed: Vec<char>,
    pub backspace: bool,
    pub submit: bool,
}

impl FrameInput {
    /// Input for catch-up ticks: held movement only, no presses.
    pub fn held_only(&self) -> Self {
        Self {
            player: self.player.held_only(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
pub enum Mode {
    Idle,
    Level(LevelRun),
    Boss(BossEncounter),
    Rhythm(RhythmBattle),
    MiniGame(MiniGame),
}

impl Mode {
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Idle => "idle",
            Mode::Level(_) => "level",
            Mode::Boss(_) => "boss",
            Mode::Rhythm(_) => "rhythm",
            Mode::MiniGame(_) => "mini_game",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    LevelEntered(String),
    LevelCompleted {
        level_id: String,
        next_level: Option<String>,
    },
    PlayerFell(String),
    BossRetried,
    RhythmFinished(BattleResult),
    MiniGameFinished(MiniGameOutcome),
    QuestCompleted(String),
    GameCompleted,
}

#[derive(Debug, Clone, Copy)]
struct StepPlan {
    ticks: u32,
    remaining: f32,
    dropped: f32,
}

fn plan_steps(mut accumulator: f32, tick_dt: f32, max_ticks: u32) -> StepPlan {
    let mut ticks = 0u32;
    while accumulator >= tick_dt && ticks < max_ticks {
        accumulator -= tick_dt;
        ticks += 1;
    }
    if accumulator >= tick_dt {
        StepPlan {
            ticks,
            remaining: 0.0,
            dropped: accumulator,
        }
    } else {
        StepPlan {
            ticks,
            remaining: accumulator,
            dropped: 0.0,
        }
    }
}

/// What a mode asked for during a tick, applied once the mode borrow ends.
enum Transition {
    Stay,
    LevelCleared {
        level_id: String,
        next_level: Option<String>,
    },
    Restart(String),
    ToIdle,
}

pub struct GameSession {
    rules: GameRules,
    tick_dt: f32,
    progress: Progression,
    quests: QuestTracker,
    levels: LevelCatalog,
    audio: Box<dyn AudioSink>,
    rng: StdRng,
    mode: Mode,
    dialogue: DialogueSystem,
    notices: NoticeBoard,
    particles: ParticleSystem,
    accumulator: f32,
    paused: bool,
    ticks: u64,
}

impl GameSession {
    pub fn new(rules: GameRules, levels: LevelCatalog, mut audio: Box<dyn AudioSink>) -> Self {
        let rng = match rules.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        audio.set_music_volume(rules.music_volume);
        audio.set_sound_volume(rules.sfx_volume);
        if audio.music_enabled() != rules.music_enabled {
            audio.toggle_music();
        }
        if audio.sound_enabled() != rules.sfx_enabled {
            audio.toggle_sound();
        }
        info!(
            tick_rate = rules.tick_rate,
            seed = ?rules.seed,
            levels = levels.levels().len(),
            "session_created"
        );
        Self {
            tick_dt: rules.tick_dt(),
            rules,
            progress: Progression::new(),
            quests: QuestTracker::new(),
            levels,
            audio,
            rng,
            mode: Mode::Idle,
            dialogue: DialogueSystem::new(),
            notices: NoticeBoard::default(),
            particles: ParticleSystem::default(),
            accumulator: 0.0,
            paused: false,
            ticks: 0,
        }
    }

    pub fn headless(rules: GameRules) -> Self {
        let audio = Box::new(HeadlessAudio::new(rules.rhythm_track_length));
        Self::new(rules, LevelCatalog::builtin(), audio)
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    pub fn tick_dt(&self) -> f32 {
        self.tick_dt
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn progress(&self) -> &Progression {
        &self.progress
    }

    pub fn progress_mut(&mut self) -> &mut Progression {
        &mut self.progress
    }

    pub fn quests(&self) -> &QuestTracker {
        &self.quests
    }

    pub fn levels(&self) -> &LevelCatalog {
        &self.levels
    }

    pub fn audio(&self) -> &dyn AudioSink {
        self.audio.as_ref()
    }

    pub fn audio_mut(&mut self) -> &mut dyn AudioSink {
        self.audio.as_mut()
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn dialogue(&self) -> &DialogueSystem {
        &self.dialogue
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    pub fn particles(&self) -> &ParticleSystem {
        &self.particles
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        if self.paused == paused {
            return;
        }
        self.paused = paused;
        self.accumulator = 0.0;
        if paused {
            self.audio.pause_music();
        } else {
            self.audio.resume_music();
        }
        debug!(paused, "session_paused");
    }

    pub fn toggle_pause(&mut self) {
        self.set_paused(!self.paused);
    }

    pub fn new_game(&mut self) {
        self.progress = Progression::new();
        self.quests = QuestTracker::new();
        self.reset_screen();
        info!("new_game");
    }

    /// Enters a level if it exists and is unlocked. The boss level runs as
    /// an encounter rather than a regular level.
    pub fn start_level(&mut self, level_id: &str) -> bool {
        let Some(def) = self.levels.level(level_id).cloned() else {
            warn!(level = %level_id, "level_missing");
            return false;
        };
        if !self.levels.is_level_unlocked(level_id, &self.progress) {
            debug!(level = %level_id, "level_locked");
            return false;
        }

        self.reset_screen();
        self.progress.current_act = def.act;
        self.progress.current_level = self
            .levels
            .levels_in_act(def.act)
            .iter()
            .position(|l| l.id == def.id)
            .map_or(1, |i| i as u32 + 1);

        if def.id == BOSS_LEVEL_ID {
            let mut encounter = BossEncounter::with_platforms(def.platforms.clone());
            encounter.start(self.audio.as_mut());
            self.mode = Mode::Boss(encounter);
        } else {
            if !def.music.is_empty() {
                self.audio.play_music(&def.music, true);
            }
            self.mode = Mode::Level(LevelRun::new(&def, self.rules.hit_invincibility_duration));
        }

        if let Some(dialogue_id) = &def.dialogue {
            self.dialogue
                .start(dialogue_id, &mut self.progress, self.audio.as_mut());
        }
        info!(level = %def.id, act = def.act, "level_entered");
        true
    }

    pub fn start_rhythm_battle(&mut self, track_id: &str) -> bool {
        if !matches!(self.mode, Mode::Idle) || Track::from_id(track_id).is_none() {
            return false;
        }
        let mut battle = RhythmBattle::new();
        battle.start(track_id, self.audio.as_mut());
        self.mode = Mode::Rhythm(battle);
        true
    }

    pub fn start_mini_game(&mut self, kind: MiniGameKind) -> bool {
        if !matches!(self.mode, Mode::Idle) {
            return false;
        }
        self.mode = Mode::MiniGame(MiniGame::start(kind, &mut self.rng));
        true
    }

    /// Dialogue is skipped first. Rhythm battles end without a grade and a
    /// mini-game counts as failed.
    pub fn cancel_modal(&mut self) -> Option<SessionEvent> {
        if self.dialogue.is_active() {
            self.dialogue.skip();
            self.restore_mode_music();
            return None;
        }
        match &mut self.mode {
            Mode::Rhythm(battle) => {
                battle.cancel(self.audio.as_mut());
                self.mode = Mode::Idle;
                None
            }
            Mode::MiniGame(game) => {
                let outcome = game.cancel(&mut self.progress, self.audio.as_mut());
                self.mode = Mode::Idle;
                Some(SessionEvent::MiniGameFinished(outcome))
            }
            Mode::Boss(encounter) => {
                encounter.cancel_rhythm(self.audio.as_mut());
                None
            }
            _ => None,
        }
    }

    pub fn leave_level(&mut self) {
        self.reset_screen();
    }

    pub fn save_to<S: KeyValueStore>(
        &self,
        system: &mut SaveSystem<S>,
        now_millis: i64,
    ) -> Result<(), SaveError> {
        system.save(&self.progress, now_millis)
    }

    /// Replaces progression only when the whole load succeeds. Quest
    /// counters are rebuilt from the loaded progression.
    pub fn load_from<S: KeyValueStore>(&mut self, system: &SaveSystem<S>) -> Result<(), SaveError> {
        let progress = system.load()?;
        self.progress = progress;
        self.quests = QuestTracker::new();
        self.quests.restore_from(&self.progress);
        self.reset_screen();
        info!(
            act = self.progress.current_act,
            cassettes = self.progress.cassette_count(),
            "session_loaded"
        );
        Ok(())
    }

    /// Feeds wall-clock frame time into the fixed-step loop. Presses only
    /// count on the first tick of a frame.
    pub fn advance(&mut self, frame_dt: f32, input: &FrameInput) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if self.paused {
            return events;
        }

        self.accumulator += frame_dt.max(0.0);
        let plan = plan_steps(
            self.accumulator,
            self.tick_dt,
            self.rules.max_catch_up_ticks,
        );
        self.accumulator = plan.remaining;
        if plan.dropped > 0.0 {
            debug!(dropped = plan.dropped, "tick_backlog_dropped");
        }

        let held = input.held_only();
        for i in 0..plan.ticks {
            let tick_input = if i == 0 { input } else { &held };
            events.extend(self.tick(tick_input));
        }
        events
    }

    pub fn tick(&mut self, input: &FrameInput) -> Vec<SessionEvent> {
        let dt = self.tick_dt;
        let mut events = Vec::new();
        self.ticks += 1;

        self.audio.update(dt);
        self.notices.tick();
        self.particles.update(dt);

        if self.dialogue.is_active() {
            self.dialogue.update(dt);
            let mut finished = false;
            if input.skip_dialogue {
                self.dialogue.skip();
                finished = true;
            } else if input.advance_dialogue {
                finished = !self.dialogue.advance(self.audio.as_mut());
            }
            if finished {
                self.restore_mode_music();
            }
        } else {
            let transition = self.tick_mode(dt, input, &mut events);
            self.apply_transition(transition, &mut events);
        }

        self.route_progress_events(&mut events);
        events
    }

    fn tick_mode(
        &mut self,
        dt: f32,
        input: &FrameInput,
        events: &mut Vec<SessionEvent>,
    ) -> Transition {
        match &mut self.mode {
            Mode::Idle => Transition::Stay,
            Mode::Level(run) => {
                self.progress.tick(dt);
                let level_events = run.update(dt, &input.player, &mut self.progress, self.audio.as_mut());
                let mut transition = Transition::Stay;
                for event in level_events {
                    match event {
                        LevelEvent::CassettePicked { track_id, at } => {
                            self.particles.cassette_glow(at);
                            self.notices.push(
                                format!("Cassette: {}", track_display_name(&track_id)),
                                self.rules.notice_ticks(),
                            );
                        }
                        LevelEvent::EnemyDefeated { at, .. } => {
                            self.particles.energy_burst(at, &mut self.rng);
                        }
                        LevelEvent::AbilityUsed { ability, at } => match ability {
                            Ability::MakeSomeNoize | Ability::UltimateCombo => {
                                self.particles.sound_wave(at)
                            }
                            Ability::IgraSlov => self.particles.music_notes(at, &mut self.rng),
                            _ => self.particles.energy_burst(at, &mut self.rng),
                        },
                        LevelEvent::Completed {
                            level_id,
                            next_level,
                        } => {
                            transition = Transition::LevelCleared {
                                level_id,
                                next_level,
                            };
                        }
                        LevelEvent::SecretFound { .. }
                        | LevelEvent::EnemyFired { .. }
                        | LevelEvent::PlayerHurt { .. } => {}
                    }
                }
                if matches!(transition, Transition::Stay) && self.progress.health() == 0 {
                    let level_id = run.level_id().to_string();
                    events.push(SessionEvent::PlayerFell(level_id.clone()));
                    transition = Transition::Restart(level_id);
                }
                transition
            }
            Mode::Boss(encounter) => {
                self.progress.tick(dt);
                let tick = encounter.update(
                    dt,
                    &input.player,
                    input.lanes,
                    &mut self.progress,
                    self.audio.as_mut(),
                    &mut self.rng,
                );
                if let Some(result) = tick.rhythm {
                    grant_rhythm_reward(&mut self.progress, &result);
                    events.push(SessionEvent::RhythmFinished(result));
                }
                match tick.status {
                    EncounterStatus::Ongoing => Transition::Stay,
                    EncounterStatus::Retried => {
                        self.notices.push("Try again", self.rules.notice_ticks());
                        events.push(SessionEvent::BossRetried);
                        Transition::Stay
                    }
                    EncounterStatus::Won => {
                        self.particles.sound_wave(encounter.boss_hitbox().center());
                        let rewards: Vec<String> = self
                            .levels
                            .level(BOSS_LEVEL_ID)
                            .map(|def| def.cassettes.iter().map(|c| c.track_id.clone()).collect())
                            .unwrap_or_default();
                        for track_id in rewards {
                            self.progress.collect_cassette(&track_id);
                        }
                        Transition::LevelCleared {
                            level_id: BOSS_LEVEL_ID.to_string(),
                            next_level: self.levels.next_level(BOSS_LEVEL_ID).map(str::to_string),
                        }
                    }
                }
            }
            Mode::Rhythm(battle) => {
                match battle.update(dt, input.lanes, self.audio.as_mut(), &mut self.rng) {
                    Some(result) => {
                        grant_rhythm_reward(&mut self.progress, &result);
                        self.notices
                            .push(format!("Grade {}", result.grade.letter()), self.rules.notice_ticks());
                        events.push(SessionEvent::RhythmFinished(result));
                        Transition::ToIdle
                    }
                    None => Transition::Stay,
                }
            }
            Mode::MiniGame(game) => {
                for c in input.typed.iter().copied() {
                    game.push_char(c, self.audio.as_mut());
                }
                if input.backspace {
                    game.backspace();
                }
                let mut outcome = None;
                if input.submit {
                    outcome = game.submit(&mut self.progress, self.audio.as_mut());
                }
                if outcome.is_none() {
                    outcome = game.update(dt, &mut self.progress, self.audio.as_mut());
                }
                match outcome {
                    Some(outcome) => {
                        events.push(SessionEvent::MiniGameFinished(outcome));
                        Transition::ToIdle
                    }
                    None => Transition::Stay,
                }
            }
        }
    }

    fn apply_transition(&mut self, transition: Transition, events: &mut Vec<SessionEvent>) {
        match transition {
            Transition::Stay => {}
            Transition::ToIdle => self.mode = Mode::Idle,
            Transition::Restart(level_id) => {
                self.progress.restore_vitals();
                self.start_level(&level_id);
            }
            Transition::LevelCleared {
                level_id,
                next_level,
            } => {
                self.notices.push("Level complete", self.rules.notice_ticks());
                events.push(SessionEvent::LevelCompleted {
                    level_id,
                    next_level: next_level.clone(),
                });
                match next_level {
                    Some(next) if self.start_level(&next) => {
                        events.push(SessionEvent::LevelEntered(next));
                    }
                    Some(next) => {
                        warn!(level = %next, "next_level_unavailable");
                        self.reset_screen();
                    }
                    None => {
                        self.progress.set_game_completed();
                        self.reset_screen();
                        events.push(SessionEvent::GameCompleted);
                    }
                }
            }
        }
    }

    /// Hands queued progression events to the quest tracker. Quest rewards
    /// can queue more events, so this runs until the queue is empty.
    fn route_progress_events(&mut self, events: &mut Vec<SessionEvent>) {
        loop {
            let pending = self.progress.drain_events();
            if pending.is_empty() {
                break;
            }
            for event in pending {
                match &event {
                    ProgressEvent::AbilityUnlocked(ability) => {
                        self.audio.play_sound("ability", 1.0);
                        self.notices.push(
                            format!("New ability: {}", ability.display_name()),
                            self.rules.notice_ticks(),
                        );
                    }
                    ProgressEvent::SecretFound(_) => {
                        self.notices.push("Secret found", self.rules.notice_ticks());
                    }
                    _ => {}
                }
                for quest_id in self.quests.handle_event(&event, &mut self.progress) {
                    self.notices
                        .push(format!("Quest complete: {quest_id}"), self.rules.notice_ticks());
                    events.push(SessionEvent::QuestCompleted(quest_id));
                }
            }
        }
    }

    fn restore_mode_music(&mut self) {
        let music = match &self.mode {
            Mode::Level(run) => self
                .levels
                .level(run.level_id())
                .map(|def| def.music.clone())
                .filter(|music| !music.is_empty()),
            Mode::Boss(_) => Some(BOSS_TRACK.to_string()),
            _ => None,
        };
        if let Some(music) = music {
            self.audio.play_music(&music, true);
        }
    }

    fn reset_screen(&mut self) {
        if let Mode::Rhythm(battle) = &mut self.mode {
            battle.cancel(self.audio.as_mut());
        }
        self.mode = Mode::Idle;
        self.dialogue.skip();
        self.particles.clear();
        self.accumulator = 0.0;
        self.audio.stop_music();
    }
}

fn grant_rhythm_reward(progress: &mut Progression, result: &BattleResult) {
    let (heal, energy) = result.grade.reward();
    progress.heal(heal);
    progress.restore_energy(energy);
    progress.record(ProgressEvent::RhythmBattleGraded(result.grade));
    info!(score = result.score, grade = result.grade.letter(), "rhythm_battle_graded");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_plan_runs_whole_ticks_and_keeps_remainder() {
        let plan = plan_steps(0.05, 0.02, 5);
        assert_eq!(plan.ticks, 2);
        assert!((plan.remaining - 0.01).abs() < 1e-6);
        assert_eq!(plan.dropped, 0.0);
    }

    #[test]
    fn step_plan_drops_backlog_past_the_cap() {
        let plan = plan_steps(1.0, 0.1, 3);
        assert_eq!(plan.ticks, 3);
        assert_eq!(plan.remaining, 0.0);
        assert!(plan.dropped > 0.6);
    }
}
