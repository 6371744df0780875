use crate::kinematics::{Aabb, Body, FLOOR_Y};
use crate::progression::{ProgressEvent, Progression};
use macroquad::math::{vec2, Vec2};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const ENEMY_GRAVITY: f32 = 1000.0;
pub const PATROL_FLIP_INTERVAL: f32 = 2.0;
pub const BASIC_FLIP_INTERVAL: f32 = 3.0;
pub const RANGED_COOLDOWN: f32 = 2.0;
pub const CRITIC_MEMORY_PREFIX: &str = "critic_defeat_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnemyKind {
    NoiseMaker,
    Silencer,
    Critic,
    MediaSpammer,
    CensorDrone,
    FanaticPhantom,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyStats {
    pub max_health: u32,
    pub damage: u32,
    pub speed: f32,
    pub attack_range: f32,
    pub name: &'static str,
}

/// Movement policy. Pursuit has no dedicated logic and runs the basic patrol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    Patrol,
    Pursue,
    Ranged,
    Basic,
}

impl EnemyKind {
    pub fn stats(self) -> EnemyStats {
        let (max_health, damage, speed, attack_range, name) = match self {
            EnemyKind::NoiseMaker => (30, 10, 100.0, 150.0, "Noise Maker"),
            EnemyKind::Silencer => (50, 15, 80.0, 200.0, "Silencer"),
            EnemyKind::Critic => (40, 20, 120.0, 300.0, "Critic"),
            EnemyKind::MediaSpammer => (60, 12, 90.0, 250.0, "Media Spammer"),
            EnemyKind::CensorDrone => (80, 25, 70.0, 180.0, "Censor Drone"),
            EnemyKind::FanaticPhantom => (35, 18, 150.0, 120.0, "Fanatic Phantom"),
        };
        EnemyStats { max_health, damage, speed, attack_range, name }
    }

    pub fn size(self) -> Vec2 {
        match self {
            EnemyKind::NoiseMaker => vec2(48.0, 64.0),
            EnemyKind::Silencer => vec2(56.0, 72.0),
            EnemyKind::Critic => vec2(52.0, 68.0),
            EnemyKind::MediaSpammer => vec2(60.0, 76.0),
            EnemyKind::CensorDrone => vec2(64.0, 32.0),
            EnemyKind::FanaticPhantom => vec2(44.0, 60.0),
        }
    }

    pub fn is_flying(self) -> bool {
        matches!(self, EnemyKind::CensorDrone)
    }

    pub fn behavior(self) -> Behavior {
        match self {
            EnemyKind::NoiseMaker => Behavior::Patrol,
            EnemyKind::Silencer => Behavior::Pursue,
            EnemyKind::Critic => Behavior::Ranged,
            EnemyKind::MediaSpammer | EnemyKind::CensorDrone | EnemyKind::FanaticPhantom => {
                Behavior::Basic
            }
        }
    }

    fn defeat_reward(self) -> DefeatReward {
        match self {
            EnemyKind::Critic => DefeatReward::CriticMemory,
            EnemyKind::Silencer => DefeatReward::RestoreEnergy(20),
            _ => DefeatReward::Heal(5),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefeatReward {
    Heal(u32),
    RestoreEnergy(u32),
    /// A memory numbered after the critics already defeated.
    CriticMemory,
}

impl DefeatReward {
    pub fn apply(self, progress: &mut Progression) {
        match self {
            DefeatReward::Heal(amount) => progress.heal(amount),
            DefeatReward::RestoreEnergy(amount) => progress.restore_energy(amount),
            DefeatReward::CriticMemory => {
                let defeated = progress
                    .unlocked_memories()
                    .iter()
                    .filter(|id| id.starts_with(CRITIC_MEMORY_PREFIX))
                    .count();
                progress.unlock_memory(&format!("{CRITIC_MEMORY_PREFIX}{}", defeated + 1));
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnemyAction {
    /// Placeholder volley. Carries the origin so the caller can react.
    RangedAttack { from: Vec2 },
}

#[derive(Debug, Clone)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub body: Body,
    pub health: u32,
    pub defeated: bool,
    move_timer: f32,
    attack_cooldown: f32,
}

impl Enemy {
    pub fn new(kind: EnemyKind, x: f32, y: f32) -> Self {
        let position = vec2(x, y);
        let body = if kind.is_flying() {
            Body::flyer(position, kind.size())
        } else {
            Body::new(position, kind.size(), ENEMY_GRAVITY)
        };
        Self {
            kind,
            body,
            health: kind.stats().max_health,
            defeated: false,
            move_timer: 0.0,
            attack_cooldown: 0.0,
        }
    }

    pub fn hitbox(&self) -> Aabb {
        self.body.hitbox()
    }

    pub fn is_alive(&self) -> bool {
        !self.defeated
    }

    pub fn update(
        &mut self,
        dt: f32,
        player_center: Vec2,
        platforms: &[Aabb],
    ) -> Option<EnemyAction> {
        if self.defeated {
            return None;
        }

        self.move_timer += dt;
        self.attack_cooldown = (self.attack_cooldown - dt).max(0.0);

        let stats = self.kind.stats();
        let mut action = None;
        match self.kind.behavior() {
            Behavior::Patrol => self.patrol(stats.speed),
            Behavior::Pursue | Behavior::Basic => self.basic(stats.speed),
            Behavior::Ranged => {
                self.basic(stats.speed);
                let in_range = self.body.center().distance(player_center) <= stats.attack_range;
                if in_range && self.attack_cooldown <= 0.0 {
                    self.attack_cooldown = RANGED_COOLDOWN;
                    action = Some(EnemyAction::RangedAttack {
                        from: self.body.center(),
                    });
                }
            }
        }

        self.body.step_on(dt, FLOOR_Y, platforms);
        action
    }

    fn patrol(&mut self, speed: f32) {
        if self.move_timer > PATROL_FLIP_INTERVAL {
            self.body.velocity.x = -self.body.velocity.x;
            self.move_timer = 0.0;
        }
        if self.body.velocity.x == 0.0 {
            self.body.velocity.x = speed;
        }
    }

    fn basic(&mut self, speed: f32) {
        if self.move_timer > BASIC_FLIP_INTERVAL {
            self.body.velocity.x = if self.body.velocity.x > 0.0 { -speed } else { speed };
            self.move_timer = 0.0;
        }
    }

    /// Applies damage. Returns the reward exactly once, on the hit that
    /// brings health to zero; the reward is already applied to `progress`.
    pub fn take_damage(&mut self, amount: u32, progress: &mut Progression) -> Option<DefeatReward> {
        if self.defeated {
            return None;
        }
        self.health = self.health.saturating_sub(amount);
        if self.health > 0 {
            return None;
        }

        self.defeated = true;
        let reward = self.kind.defeat_reward();
        reward.apply(progress);
        progress.record(ProgressEvent::EnemyDefeated(self.kind));
        debug!(enemy = self.kind.stats().name, "enemy_defeated");
        Some(reward)
    }
}
