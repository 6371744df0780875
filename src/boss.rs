use crate::ability::Ability;
use crate::audio::AudioSink;
use crate::kinematics::{Aabb, FLOOR_Y};
use crate::player::{AbilityOutcome, Player, PlayerInput};
use crate::progression::{ProgressEvent, Progression};
use crate::rhythm::{BattleResult, RhythmBattle, LANES};
use macroquad::math::{vec2, Vec2};
use rand::Rng;
use tracing::{debug, info};

pub const BOSS_LEVEL_ID: &str = "final_boss";
pub const BOSS_TRACK: &str = "mercedes";
pub const BOSS_MAX_HEALTH: u32 = 300;
pub const BOSS_SIZE: Vec2 = Vec2::new(100.0, 150.0);
pub const BOSS_CENTER: Vec2 = Vec2::new(1720.0, FLOOR_Y + 75.0);
pub const ARENA_PLAYER_START: Vec2 = Vec2::new(100.0, FLOOR_Y);
pub const RHYTHM_PHASE_INTERVAL: f32 = 20.0;
pub const WAVE_DAMAGE: u32 = 15;
pub const PLAYER_RADIUS: f32 = 32.0;
pub const MELEE_RANGE: f32 = 100.0;
pub const MELEE_DAMAGE: u32 = 10;
pub const ULTIMATE_DAMAGE: u32 = 50;
const WAVE_GROWTH_PER_FRAME: f32 = 1.02;
const WAVE_CULL_X: f32 = -100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BossPhase {
    One,
    Two,
    Three,
}

impl BossPhase {
    pub fn from_health(health: u32, max_health: u32) -> Self {
        let fraction = health as f32 / max_health.max(1) as f32;
        if fraction > 0.66 {
            BossPhase::One
        } else if fraction > 0.33 {
            BossPhase::Two
        } else {
            BossPhase::Three
        }
    }

    pub fn attack_interval(self) -> f32 {
        match self {
            BossPhase::One => 3.0,
            BossPhase::Two => 2.0,
            BossPhase::Three => 1.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MediaWave {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    pub life: f32,
}

impl MediaWave {
    fn update(&mut self, dt: f32) {
        self.position += self.velocity * dt;
        self.velocity *= WAVE_GROWTH_PER_FRAME.powf(dt * 60.0);
        self.life -= dt;
    }

    fn is_spent(&self) -> bool {
        self.life <= 0.0 || self.position.x < WAVE_CULL_X
    }

    pub fn touches(&self, point: Vec2, radius: f32) -> bool {
        self.position.distance(point) < self.radius + radius
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncounterStatus {
    Ongoing,
    Won,
    /// The player fell; both sides were restored and the fight goes on.
    Retried,
}

#[derive(Debug, Clone)]
pub struct BossTick {
    pub status: EncounterStatus,
    pub rhythm: Option<BattleResult>,
    pub ability: Option<AbilityOutcome>,
    pub player_hits: u32,
}

#[derive(Debug, Clone)]
pub struct BossEncounter {
    pub player: Player,
    pub boss_health: u32,
    platforms: Vec<Aabb>,
    phase: BossPhase,
    attack_timer: f32,
    battle_time: f32,
    rhythm_timer: f32,
    waves: Vec<MediaWave>,
    rhythm: RhythmBattle,
    last_melee_swing: Option<u32>,
    defeated: bool,
}

impl Default for BossEncounter {
    fn default() -> Self {
        Self::new()
    }
}

impl BossEncounter {
    pub fn new() -> Self {
        Self::with_platforms(Vec::new())
    }

    pub fn with_platforms(platforms: Vec<Aabb>) -> Self {
        Self {
            player: Player::new(ARENA_PLAYER_START),
            boss_health: BOSS_MAX_HEALTH,
            platforms,
            phase: BossPhase::One,
            attack_timer: 0.0,
            battle_time: 0.0,
            rhythm_timer: 0.0,
            waves: Vec::new(),
            rhythm: RhythmBattle::new(),
            last_melee_swing: None,
            defeated: false,
        }
    }

    pub fn start(&mut self, audio: &mut dyn AudioSink) {
        audio.play_music(BOSS_TRACK, true);
        info!("boss_encounter_started");
    }

    pub fn phase(&self) -> BossPhase {
        self.phase
    }

    pub fn platforms(&self) -> &[Aabb] {
        &self.platforms
    }

    pub fn waves(&self) -> &[MediaWave] {
        &self.waves
    }

    pub fn rhythm(&self) -> &RhythmBattle {
        &self.rhythm
    }

    pub fn battle_time(&self) -> f32 {
        self.battle_time
    }

    pub fn is_defeated(&self) -> bool {
        self.defeated
    }

    pub fn boss_hitbox(&self) -> Aabb {
        Aabb::at(BOSS_CENTER - BOSS_SIZE / 2.0, BOSS_SIZE)
    }

    pub fn update(
        &mut self,
        dt: f32,
        input: &PlayerInput,
        lanes: [bool; LANES],
        progress: &mut Progression,
        audio: &mut dyn AudioSink,
        rng: &mut impl Rng,
    ) -> BossTick {
        let mut tick = BossTick {
            status: EncounterStatus::Ongoing,
            rhythm: None,
            ability: None,
            player_hits: 0,
        };
        if self.defeated {
            tick.status = EncounterStatus::Won;
            return tick;
        }

        self.battle_time += dt;
        self.attack_timer += dt;
        if !self.rhythm.is_active() {
            self.rhythm_timer += dt;
        }

        tick.ability = self
            .player
            .update(dt, input, &self.platforms, progress, audio);
        if tick.ability == Some(AbilityOutcome::Activated(Ability::UltimateCombo)) {
            self.damage_boss(ULTIMATE_DAMAGE);
        }

        let phase = BossPhase::from_health(self.boss_health, BOSS_MAX_HEALTH);
        if phase != self.phase {
            debug!(from = ?self.phase, to = ?phase, health = self.boss_health, "boss_phase_changed");
            self.phase = phase;
        }

        if self.rhythm_timer >= RHYTHM_PHASE_INTERVAL {
            self.rhythm_timer = 0.0;
            self.rhythm.start(BOSS_TRACK, audio);
        }
        if self.rhythm.is_active() {
            tick.rhythm = self.rhythm.update(dt, lanes, audio, rng);
            if tick.rhythm.is_some() {
                audio.play_music(BOSS_TRACK, true);
            }
        }

        if self.attack_timer >= self.phase.attack_interval() {
            self.attack_timer = 0.0;
            self.launch_pattern(rng);
        }

        for wave in self.waves.iter_mut() {
            wave.update(dt);
        }
        self.waves.retain(|w| !w.is_spent());

        let player_center = self.player.center();
        let before = self.waves.len();
        self.waves.retain(|w| !w.touches(player_center, PLAYER_RADIUS));
        let hits = (before - self.waves.len()) as u32;
        if hits > 0 {
            progress.take_damage(WAVE_DAMAGE * hits);
            audio.play_sound("hurt", 1.0);
            tick.player_hits = hits;
        }

        if self.player.is_attacking()
            && self.last_melee_swing != Some(self.player.swing())
            && player_center.distance(BOSS_CENTER) < MELEE_RANGE
        {
            self.last_melee_swing = Some(self.player.swing());
            self.damage_boss(MELEE_DAMAGE);
        }

        if self.boss_health == 0 {
            self.defeated = true;
            self.waves.clear();
            self.rhythm.cancel(audio);
            audio.stop_music();
            progress.complete_level(BOSS_LEVEL_ID);
            progress.record(ProgressEvent::BossDefeated);
            info!(time = self.battle_time, "boss_defeated");
            tick.status = EncounterStatus::Won;
        } else if progress.health() == 0 {
            self.boss_health = BOSS_MAX_HEALTH;
            self.phase = BossPhase::One;
            self.attack_timer = 0.0;
            self.waves.clear();
            progress.restore_vitals();
            info!("boss_encounter_retry");
            tick.status = EncounterStatus::Retried;
        }

        tick
    }

    /// Drops an open rhythm battle without grading it and puts the boss
    /// track back on. Returns false when no battle was open.
    pub fn cancel_rhythm(&mut self, audio: &mut dyn AudioSink) -> bool {
        if !self.rhythm.is_active() {
            return false;
        }
        self.rhythm.cancel(audio);
        audio.play_music(BOSS_TRACK, true);
        true
    }

    pub fn damage_boss(&mut self, amount: u32) {
        self.boss_health = self.boss_health.saturating_sub(amount);
        debug!(amount, health = self.boss_health, "boss_hit");
    }

    fn launch_pattern(&mut self, rng: &mut impl Rng) {
        let origin = BOSS_CENTER;
        match self.phase {
            BossPhase::One => self.waves.push(MediaWave {
                position: origin,
                velocity: vec2(-200.0, rng.gen_range(-50.0..=50.0)),
                radius: 30.0,
                life: 5.0,
            }),
            BossPhase::Two => {
                for i in 0..3 {
                    self.waves.push(MediaWave {
                        position: origin + vec2(0.0, i as f32 * 50.0),
                        velocity: vec2(-250.0, rng.gen_range(-100.0..=100.0)),
                        radius: 25.0,
                        life: 4.0,
                    });
                }
            }
            BossPhase::Three => {
                for i in 0..5 {
                    let angle = (i as f32 * 72.0).to_radians();
                    self.waves.push(MediaWave {
                        position: origin,
                        velocity: vec2(angle.cos(), angle.sin()) * 180.0,
                        radius: 40.0,
                        life: 6.0,
                    });
                }
            }
        }
    }
}
