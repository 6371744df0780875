use crate::ability::Ability;
use crate::audio::AudioSink;
use crate::cassette::{track_display_name, Cassette};
use crate::enemy::{Enemy, EnemyAction, EnemyKind};
use crate::kinematics::Aabb;
use crate::level::{LevelDef, SecretKind};
use crate::player::{AbilityOutcome, Player, PlayerInput, PLAYER_START};
use crate::progression::Progression;
use macroquad::math::{vec2, Vec2};
use tracing::{debug, info};

pub const CONTACT_DAMAGE: u32 = 10;
pub const MELEE_DAMAGE: u32 = 25;
pub const NOISE_RADIUS: f32 = 250.0;
pub const NOISE_DAMAGE: u32 = 20;
pub const ULTIMATE_RADIUS: f32 = 400.0;
pub const ULTIMATE_DAMAGE: u32 = 50;
pub const SECRET_SIZE: Vec2 = Vec2::new(32.0, 32.0);

#[derive(Debug, Clone, PartialEq)]
pub struct Secret {
    pub id: String,
    pub kind: SecretKind,
    pub position: Vec2,
    pub found: bool,
}

impl Secret {
    pub fn hitbox(&self) -> Aabb {
        Aabb::at(self.position, SECRET_SIZE)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LevelEvent {
    CassettePicked { track_id: String, at: Vec2 },
    SecretFound { id: String, kind: SecretKind },
    EnemyDefeated { kind: EnemyKind, at: Vec2 },
    EnemyFired { kind: EnemyKind, from: Vec2 },
    PlayerHurt { amount: u32 },
    AbilityUsed { ability: Ability, at: Vec2 },
    Completed { level_id: String, next_level: Option<String> },
}

/// One play-through of a level definition.
#[derive(Debug, Clone)]
pub struct LevelRun {
    level_id: String,
    next_level: Option<String>,
    pub player: Player,
    enemies: Vec<Enemy>,
    swings_landed: Vec<Option<u32>>,
    cassettes: Vec<Cassette>,
    secrets: Vec<Secret>,
    platforms: Vec<Aabb>,
    hit_timer: f32,
    invincibility: f32,
    completed: bool,
}

impl LevelRun {
    pub fn new(def: &LevelDef, invincibility: f32) -> Self {
        let enemies: Vec<Enemy> = def
            .enemies
            .iter()
            .map(|s| Enemy::new(s.kind, s.x, s.y))
            .collect();
        Self {
            level_id: def.id.clone(),
            next_level: def.next_level.clone(),
            player: Player::new(PLAYER_START),
            swings_landed: vec![None; enemies.len()],
            enemies,
            cassettes: def
                .cassettes
                .iter()
                .map(|c| Cassette::new(c.track_id.clone(), c.x, c.y))
                .collect(),
            secrets: def
                .secrets
                .iter()
                .map(|s| Secret {
                    id: s.secret_id.clone(),
                    kind: s.kind,
                    position: vec2(s.x, s.y),
                    found: false,
                })
                .collect(),
            platforms: def.platforms.clone(),
            hit_timer: 0.0,
            invincibility,
            completed: false,
        }
    }

    pub fn level_id(&self) -> &str {
        &self.level_id
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn cassettes(&self) -> &[Cassette] {
        &self.cassettes
    }

    pub fn secrets(&self) -> &[Secret] {
        &self.secrets
    }

    pub fn platforms(&self) -> &[Aabb] {
        &self.platforms
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// True while the player is flashing after a hit.
    pub fn player_invincible(&self) -> bool {
        self.hit_timer > 0.0
    }

    pub fn update(
        &mut self,
        dt: f32,
        input: &PlayerInput,
        progress: &mut Progression,
        audio: &mut dyn AudioSink,
    ) -> Vec<LevelEvent> {
        let mut events = Vec::new();
        if self.completed {
            return events;
        }

        if self.hit_timer > 0.0 {
            self.hit_timer = (self.hit_timer - dt).max(0.0);
        }

        let outcome = self
            .player
            .update(dt, input, &self.platforms, progress, audio);
        if let Some(AbilityOutcome::Activated(ability)) = outcome {
            events.push(LevelEvent::AbilityUsed {
                ability,
                at: self.player.center(),
            });
            match ability {
                Ability::MakeSomeNoize => {
                    self.blast(NOISE_RADIUS, NOISE_DAMAGE, progress, &mut events)
                }
                Ability::UltimateCombo => {
                    self.blast(ULTIMATE_RADIUS, ULTIMATE_DAMAGE, progress, &mut events)
                }
                Ability::IgraSlov => debug!("rhythm_attack"),
                _ => {}
            }
        }

        let player_center = self.player.center();
        for enemy in self.enemies.iter_mut() {
            if let Some(EnemyAction::RangedAttack { from }) =
                enemy.update(dt, player_center, &self.platforms)
            {
                audio.play_sound("attack", 0.5);
                events.push(LevelEvent::EnemyFired { kind: enemy.kind, from });
            }
        }

        for cassette in self.cassettes.iter_mut() {
            cassette.update(dt);
        }

        self.resolve_enemy_contacts(progress, audio, &mut events);
        self.collect_pickups(progress, audio, &mut events);

        let cleared = self.cassettes.iter().all(|c| c.collected)
            && self.enemies.iter().all(|e| e.defeated);
        if cleared {
            self.completed = true;
            progress.complete_level(&self.level_id);
            info!(level = %self.level_id, "level_cleared");
            events.push(LevelEvent::Completed {
                level_id: self.level_id.clone(),
                next_level: self.next_level.clone(),
            });
        }

        events
    }

    fn resolve_enemy_contacts(
        &mut self,
        progress: &mut Progression,
        audio: &mut dyn AudioSink,
        events: &mut Vec<LevelEvent>,
    ) {
        let player_box = self.player.hitbox();
        let attacking = self.player.is_attacking();
        let swing = self.player.swing();

        for (enemy, landed) in self.enemies.iter_mut().zip(self.swings_landed.iter_mut()) {
            if enemy.defeated || !player_box.overlaps(&enemy.hitbox()) {
                continue;
            }

            if attacking {
                if *landed == Some(swing) {
                    continue;
                }
                *landed = Some(swing);
                audio.play_sound("attack", 0.8);
                if enemy.take_damage(MELEE_DAMAGE, progress).is_some() {
                    events.push(LevelEvent::EnemyDefeated {
                        kind: enemy.kind,
                        at: enemy.body.center(),
                    });
                }
            } else if self.hit_timer <= 0.0 && !self.player.is_stealthed() {
                progress.take_damage(CONTACT_DAMAGE);
                self.hit_timer = self.invincibility;
                audio.play_sound("hurt", 1.0);
                events.push(LevelEvent::PlayerHurt {
                    amount: CONTACT_DAMAGE,
                });
            }
        }
    }

    fn collect_pickups(
        &mut self,
        progress: &mut Progression,
        audio: &mut dyn AudioSink,
        events: &mut Vec<LevelEvent>,
    ) {
        let player_box = self.player.hitbox();

        for cassette in self.cassettes.iter_mut() {
            if cassette.collected || !player_box.overlaps(&cassette.hitbox()) {
                continue;
            }
            if cassette.collect(progress) {
                audio.play_sound("cassette_pickup", 1.0);
                info!(track = track_display_name(&cassette.track_id), "cassette_picked");
                events.push(LevelEvent::CassettePicked {
                    track_id: cassette.track_id.clone(),
                    at: cassette.position,
                });
            }
        }

        for secret in self.secrets.iter_mut() {
            if secret.found || !player_box.overlaps(&secret.hitbox()) {
                continue;
            }
            secret.found = true;
            progress.find_secret(&secret.id);
            match secret.kind {
                SecretKind::Diary => {
                    progress.read_diary(&secret.id);
                }
                SecretKind::Memory => {
                    progress.unlock_memory(&secret.id);
                }
                SecretKind::BonusTrack => {
                    progress.collect_cassette(&secret.id);
                }
                SecretKind::EasterEgg => {}
            }
            audio.play_sound("collect", 1.0);
            events.push(LevelEvent::SecretFound {
                id: secret.id.clone(),
                kind: secret.kind,
            });
        }
    }

    fn blast(
        &mut self,
        radius: f32,
        damage: u32,
        progress: &mut Progression,
        events: &mut Vec<LevelEvent>,
    ) {
        let origin = self.player.center();
        for enemy in self.enemies.iter_mut().filter(|e| e.is_alive()) {
            if enemy.body.center().distance(origin) > radius {
                continue;
            }
            if enemy.take_damage(damage, progress).is_some() {
                events.push(LevelEvent::EnemyDefeated {
                    kind: enemy.kind,
                    at: enemy.body.center(),
                });
            }
        }
    }
}
