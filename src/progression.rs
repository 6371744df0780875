use crate::ability::Ability;
use crate::cassette::Track;
use crate::enemy::EnemyKind;
use crate::rhythm::Grade;
use std::collections::BTreeSet;
use tracing::{debug, info};

pub const MAX_HEALTH: u32 = 100;
pub const MAX_ENERGY: u32 = 100;
pub const PLANNED_LEVELS: usize = 30;
pub const TOTAL_CASSETTES: usize = 6;
const ENERGY_REGEN_PER_TICK: u32 = 1;

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    CassetteCollected(String),
    AbilityUnlocked(Ability),
    SecretFound(String),
    DiaryRead(String),
    EnemyDefeated(EnemyKind),
    BossDefeated,
    RhythmBattleGraded(Grade),
}

#[derive(Debug, Clone)]
pub struct Progression {
    pub(crate) health: u32,
    pub(crate) energy: u32,
    pub(crate) collected_cassettes: BTreeSet<String>,
    pub(crate) unlocked_abilities: BTreeSet<Ability>,
    pub(crate) completed_levels: BTreeSet<String>,
    pub(crate) found_secrets: BTreeSet<String>,
    pub(crate) unlocked_memories: BTreeSet<String>,
    pub(crate) read_diaries: BTreeSet<String>,
    pub(crate) watched_cutscenes: BTreeSet<String>,
    pub(crate) play_time: f32,
    pub(crate) game_completed: bool,
    pub current_act: u32,
    pub current_level: u32,
    events: Vec<ProgressEvent>,
}

impl Default for Progression {
    fn default() -> Self {
        Self {
            health: MAX_HEALTH,
            energy: MAX_ENERGY,
            collected_cassettes: BTreeSet::new(),
            unlocked_abilities: BTreeSet::new(),
            completed_levels: BTreeSet::new(),
            found_secrets: BTreeSet::new(),
            unlocked_memories: BTreeSet::new(),
            read_diaries: BTreeSet::new(),
            watched_cutscenes: BTreeSet::new(),
            play_time: 0.0,
            game_completed: false,
            current_act: 1,
            current_level: 1,
            events: Vec::new(),
        }
    }
}

/// Pending events are transient and take no part in equality.
impl PartialEq for Progression {
    fn eq(&self, other: &Self) -> bool {
        self.health == other.health
            && self.energy == other.energy
            && self.collected_cassettes == other.collected_cassettes
            && self.unlocked_abilities == other.unlocked_abilities
            && self.completed_levels == other.completed_levels
            && self.found_secrets == other.found_secrets
            && self.unlocked_memories == other.unlocked_memories
            && self.read_diaries == other.read_diaries
            && self.watched_cutscenes == other.watched_cutscenes
            && self.play_time == other.play_time
            && self.game_completed == other.game_completed
            && self.current_act == other.current_act
            && self.current_level == other.current_level
    }
}

impl Progression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn health(&self) -> u32 {
        self.health
    }

    pub fn energy(&self) -> u32 {
        self.energy
    }

    pub fn play_time(&self) -> f32 {
        self.play_time
    }

    pub fn game_completed(&self) -> bool {
        self.game_completed
    }

    pub fn collected_cassettes(&self) -> &BTreeSet<String> {
        &self.collected_cassettes
    }

    pub fn unlocked_abilities(&self) -> &BTreeSet<Ability> {
        &self.unlocked_abilities
    }

    pub fn completed_levels(&self) -> &BTreeSet<String> {
        &self.completed_levels
    }

    pub fn found_secrets(&self) -> &BTreeSet<String> {
        &self.found_secrets
    }

    pub fn unlocked_memories(&self) -> &BTreeSet<String> {
        &self.unlocked_memories
    }

    pub fn read_diaries(&self) -> &BTreeSet<String> {
        &self.read_diaries
    }

    pub fn watched_cutscenes(&self) -> &BTreeSet<String> {
        &self.watched_cutscenes
    }

    pub fn has_ability(&self, ability: Ability) -> bool {
        self.unlocked_abilities.contains(&ability)
    }

    pub fn has_cassette(&self, track_id: &str) -> bool {
        self.collected_cassettes.contains(track_id)
    }

    pub fn is_level_completed(&self, level_id: &str) -> bool {
        self.completed_levels.contains(level_id)
    }

    /// Returns true only the first time a track is collected.
    pub fn collect_cassette(&mut self, track_id: &str) -> bool {
        if !self.collected_cassettes.insert(track_id.to_string()) {
            return false;
        }
        info!(track = %track_id, total = self.collected_cassettes.len(), "cassette_collected");
        self.events
            .push(ProgressEvent::CassetteCollected(track_id.to_string()));

        if let Some(ability) = Ability::unlocked_by_track(track_id) {
            self.unlock_ability(ability);
        }
        let all_story = Track::STORY
            .iter()
            .all(|track| self.collected_cassettes.contains(track.id()));
        if all_story {
            self.unlock_ability(Ability::UltimateCombo);
        }
        true
    }

    pub fn unlock_ability(&mut self, ability: Ability) -> bool {
        if !self.unlocked_abilities.insert(ability) {
            return false;
        }
        info!(ability = ability.id(), "ability_unlocked");
        self.events.push(ProgressEvent::AbilityUnlocked(ability));
        true
    }

    pub fn take_damage(&mut self, amount: u32) {
        self.health = self.health.saturating_sub(amount);
    }

    pub fn heal(&mut self, amount: u32) {
        self.health = self.health.saturating_add(amount).min(MAX_HEALTH);
    }

    pub fn use_energy(&mut self, amount: u32) -> bool {
        if self.energy < amount {
            return false;
        }
        self.energy -= amount;
        true
    }

    pub fn restore_energy(&mut self, amount: u32) {
        self.energy = self.energy.saturating_add(amount).min(MAX_ENERGY);
    }

    pub fn restore_vitals(&mut self) {
        self.health = MAX_HEALTH;
        self.energy = MAX_ENERGY;
    }

    pub fn complete_level(&mut self, level_id: &str) -> bool {
        let added = self.completed_levels.insert(level_id.to_string());
        if added {
            info!(level = %level_id, "level_completed");
        }
        added
    }

    pub fn unlock_memory(&mut self, memory_id: &str) -> bool {
        let added = self.unlocked_memories.insert(memory_id.to_string());
        if added {
            debug!(memory = %memory_id, "memory_unlocked");
        }
        added
    }

    pub fn read_diary(&mut self, diary_id: &str) -> bool {
        let added = self.read_diaries.insert(diary_id.to_string());
        if added {
            self.events.push(ProgressEvent::DiaryRead(diary_id.to_string()));
        }
        added
    }

    pub fn watch_cutscene(&mut self, cutscene_id: &str) -> bool {
        self.watched_cutscenes.insert(cutscene_id.to_string())
    }

    pub fn find_secret(&mut self, secret_id: &str) -> bool {
        let added = self.found_secrets.insert(secret_id.to_string());
        if added {
            debug!(secret = %secret_id, "secret_found");
            self.events
                .push(ProgressEvent::SecretFound(secret_id.to_string()));
        }
        added
    }

    pub fn set_game_completed(&mut self) {
        if !self.game_completed {
            info!(play_time = self.play_time, "game_completed");
        }
        self.game_completed = true;
    }

    /// Advances play time and regenerates a fixed amount of energy per call.
    pub fn tick(&mut self, dt: f32) {
        self.play_time += dt;
        if self.energy < MAX_ENERGY {
            self.restore_energy(ENERGY_REGEN_PER_TICK);
        }
    }

    pub fn record(&mut self, event: ProgressEvent) {
        self.events.push(event);
    }

    pub fn drain_events(&mut self) -> Vec<ProgressEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn has_pending_events(&self) -> bool {
        !self.events.is_empty()
    }

    pub fn completion(&self) -> f32 {
        (self.completed_levels.len() as f32 / PLANNED_LEVELS as f32).min(1.0)
    }

    pub fn cassette_count(&self) -> usize {
        self.collected_cassettes.len()
    }

    pub fn memory_count(&self) -> usize {
        self.unlocked_memories.len()
    }
}
