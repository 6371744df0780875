use crate::ability::Ability;
use crate::audio::AudioSink;
use crate::kinematics::{Aabb, Body, FLOOR_Y, WORLD_WIDTH};
use crate::progression::Progression;
use macroquad::math::{vec2, Vec2};
use tracing::debug;

pub const PLAYER_SIZE: Vec2 = Vec2::new(64.0, 96.0);
pub const PLAYER_START: Vec2 = Vec2::new(100.0, FLOOR_Y);
pub const MOVE_SPEED: f32 = 300.0;
pub const JUMP_STRENGTH: f32 = 600.0;
pub const DOUBLE_JUMP_FACTOR: f32 = 0.8;
pub const PLAYER_GRAVITY: f32 = 1800.0;
pub const ATTACK_DURATION: f32 = 0.3;
pub const ABILITY_DURATION: f32 = 0.4;
pub const VIDIHAY_HEAL: u32 = 20;
pub const STEALTH_DURATION: f32 = 3.0;
pub const TELEPORT_DISTANCE: f32 = 300.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Idle,
    Walking,
    Jumping,
    Attacking,
    UsingAbility,
    Stealth,
}

/// Input sampled for one tick. `jump`, `attack` and `ability` are edge
/// presses; `left`/`right` are held.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerInput {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub attack: bool,
    pub ability: Option<Ability>,
}

impl PlayerInput {
    pub fn held_only(&self) -> Self {
        Self {
            left: self.left,
            right: self.right,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbilityOutcome {
    Locked,
    Passive,
    NotEnoughEnergy,
    Activated(Ability),
}

#[derive(Debug, Clone)]
pub struct Player {
    pub body: Body,
    pub state: PlayerState,
    pub facing_right: bool,
    can_double_jump: bool,
    action_timer: f32,
    stealth_timer: f32,
    swing: u32,
}

impl Default for Player {
    fn default() -> Self {
        Self::new(PLAYER_START)
    }
}

impl Player {
    pub fn new(position: Vec2) -> Self {
        let mut body = Body::new(position, PLAYER_SIZE, PLAYER_GRAVITY);
        body.clamp_to_floor(FLOOR_Y);
        Self {
            body,
            state: PlayerState::Idle,
            facing_right: true,
            can_double_jump: false,
            action_timer: 0.0,
            stealth_timer: 0.0,
            swing: 0,
        }
    }

    pub fn hitbox(&self) -> Aabb {
        self.body.hitbox()
    }

    pub fn center(&self) -> Vec2 {
        self.body.center()
    }

    pub fn is_attacking(&self) -> bool {
        self.state == PlayerState::Attacking
    }

    pub fn is_stealthed(&self) -> bool {
        self.stealth_timer > 0.0
    }

    pub fn can_double_jump(&self) -> bool {
        self.can_double_jump
    }

    pub fn swing(&self) -> u32 {
        self.swing
    }

    pub fn update(
        &mut self,
        dt: f32,
        input: &PlayerInput,
        platforms: &[Aabb],
        progress: &mut Progression,
        audio: &mut dyn AudioSink,
    ) -> Option<AbilityOutcome> {
        let direction = match (input.left, input.right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        };
        self.body.velocity.x = direction * MOVE_SPEED;
        if direction != 0.0 {
            self.facing_right = direction > 0.0;
        }

        if input.jump {
            self.jump(audio);
        }
        if input.attack {
            self.attack(audio);
        }
        let outcome = input
            .ability
            .map(|ability| self.use_ability(ability, progress, audio));

        self.body.step_on(dt, FLOOR_Y, platforms);
        self.body.clamp_to_width(WORLD_WIDTH);
        if self.body.grounded {
            self.can_double_jump = false;
        }

        self.action_timer = (self.action_timer - dt).max(0.0);
        self.stealth_timer = (self.stealth_timer - dt).max(0.0);
        self.settle_state();

        outcome
    }

    pub fn jump(&mut self, audio: &mut dyn AudioSink) -> bool {
        if self.body.grounded {
            self.body.velocity.y = JUMP_STRENGTH;
            self.body.grounded = false;
            self.can_double_jump = true;
            audio.play_sound("jump", 1.0);
            true
        } else if self.can_double_jump {
            self.body.velocity.y = JUMP_STRENGTH * DOUBLE_JUMP_FACTOR;
            self.can_double_jump = false;
            audio.play_sound("jump", 0.7);
            true
        } else {
            false
        }
    }

    pub fn attack(&mut self, audio: &mut dyn AudioSink) -> bool {
        if matches!(self.state, PlayerState::Attacking | PlayerState::UsingAbility) {
            return false;
        }
        self.state = PlayerState::Attacking;
        self.action_timer = ATTACK_DURATION;
        self.stealth_timer = 0.0;
        self.swing = self.swing.wrapping_add(1);
        audio.play_sound("attack", 1.0);
        true
    }

    /// Gated on unlock first, then on energy. A rejected activation leaves
    /// every resource untouched; an accepted one replaces any running action.
    pub fn use_ability(
        &mut self,
        ability: Ability,
        progress: &mut Progression,
        audio: &mut dyn AudioSink,
    ) -> AbilityOutcome {
        if !progress.has_ability(ability) {
            return AbilityOutcome::Locked;
        }
        let Some(cost) = ability.energy_cost() else {
            return AbilityOutcome::Passive;
        };
        if !progress.use_energy(cost) {
            return AbilityOutcome::NotEnoughEnergy;
        }

        match ability {
            Ability::Vidihay => {
                progress.heal(VIDIHAY_HEAL);
                self.stealth_timer = STEALTH_DURATION;
            }
            Ability::Vselennaya => {
                let step = if self.facing_right { TELEPORT_DISTANCE } else { -TELEPORT_DISTANCE };
                self.body.position.x += step;
                self.body.clamp_to_width(WORLD_WIDTH);
            }
            // Area effects land in the encounter that owns the targets.
            Ability::MakeSomeNoize
            | Ability::IgraSlov
            | Ability::UltimateCombo
            | Ability::RhythmMaster => {}
        }

        debug!(ability = ability.id(), energy = progress.energy(), "ability_used");
        self.state = PlayerState::UsingAbility;
        self.action_timer = ABILITY_DURATION;
        audio.play_sound("ability", 1.0);
        AbilityOutcome::Activated(ability)
    }

    fn settle_state(&mut self) {
        let busy = matches!(self.state, PlayerState::Attacking | PlayerState::UsingAbility);
        if busy && self.action_timer > 0.0 {
            return;
        }
        self.state = if !self.body.grounded {
            PlayerState::Jumping
        } else if self.is_stealthed() {
            PlayerState::Stealth
        } else if self.body.velocity.x != 0.0 {
            PlayerState::Walking
        } else {
            PlayerState::Idle
        };
    }

    pub fn reset(&mut self, position: Vec2) {
        *self = Self::new(position);
    }

    pub fn move_to(&mut self, x: f32, y: f32) {
        self.body.position = vec2(x, y);
    }
}
