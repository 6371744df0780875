use crate::ability::Ability;
use crate::progression::{ProgressEvent, Progression};
use crate::rhythm::Grade;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestKind {
    MainStory,
    SideQuest,
    Collection,
    Exploration,
    RhythmChallenge,
    Biography,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewardKind {
    Health,
    Energy,
    Cassette,
    Memory,
    Diary,
    Ability,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuestReward {
    pub kind: RewardKind,
    pub value: String,
    pub amount: u32,
}

impl QuestReward {
    pub fn health(amount: u32) -> Self {
        Self { kind: RewardKind::Health, value: String::new(), amount }
    }

    pub fn energy(amount: u32) -> Self {
        Self { kind: RewardKind::Energy, value: String::new(), amount }
    }

    pub fn item(kind: RewardKind, value: &str) -> Self {
        Self { kind, value: value.to_string(), amount: 1 }
    }

    fn apply(&self, progress: &mut Progression) {
        match self.kind {
            RewardKind::Health => progress.heal(self.amount),
            RewardKind::Energy => progress.restore_energy(self.amount),
            RewardKind::Cassette => {
                progress.collect_cassette(&self.value);
            }
            RewardKind::Memory => {
                progress.unlock_memory(&self.value);
            }
            RewardKind::Diary => {
                progress.read_diary(&self.value);
            }
            RewardKind::Ability => match Ability::from_id(&self.value) {
                Some(ability) => {
                    progress.unlock_ability(ability);
                }
                None => warn!(ability = %self.value, "unknown_reward_ability"),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuestObjective {
    pub id: String,
    pub description: String,
    pub target: u32,
    pub current: u32,
    pub completed: bool,
}

impl QuestObjective {
    pub fn new(id: &str, description: &str, target: u32) -> Self {
        Self {
            id: id.to_string(),
            description: description.to_string(),
            target,
            current: 0,
            completed: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Quest {
    pub id: String,
    pub title: String,
    pub description: String,
    pub kind: QuestKind,
    pub objectives: Vec<QuestObjective>,
    pub rewards: Vec<QuestReward>,
    pub main_quest: bool,
    pub completed: bool,
}

impl Quest {
    pub fn new(id: &str, title: &str, description: &str, kind: QuestKind) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            kind,
            objectives: Vec::new(),
            rewards: Vec::new(),
            main_quest: false,
            completed: false,
        }
    }

    pub fn objective(mut self, id: &str, description: &str, target: u32) -> Self {
        self.objectives.push(QuestObjective::new(id, description, target));
        self
    }

    pub fn reward(mut self, reward: QuestReward) -> Self {
        self.rewards.push(reward);
        self
    }

    pub fn main(mut self) -> Self {
        self.main_quest = true;
        self
    }

    pub fn progress(&self) -> f32 {
        if self.objectives.is_empty() {
            return if self.completed { 1.0 } else { 0.0 };
        }
        let done = self.objectives.iter().filter(|o| o.completed).count();
        done as f32 / self.objectives.len() as f32
    }
}

pub fn default_quests() -> Vec<Quest> {
    vec![
        Quest::new(
            "main_retrieve_voice",
            "Retrieve the Voice",
            "Find every stolen track and face Barkov.",
            QuestKind::MainStory,
        )
        .objective("collect_all_cassettes", "Collect all 6 cassettes", 6)
        .objective("defeat_barkov", "Defeat Barkov", 1)
        .reward(QuestReward::item(RewardKind::Ability, "ULTIMATE_COMBO"))
        .main(),
        Quest::new(
            "side_street_performances",
            "Street Performances",
            "Play the street stages of the city.",
            QuestKind::SideQuest,
        )
        .objective("find_street_stages", "Find 3 street stages", 3)
        .reward(QuestReward::energy(50))
        .reward(QuestReward::item(RewardKind::Memory, "street_performer_memory")),
        Quest::new(
            "side_dorm_memories",
            "Dorm Memories",
            "Read the diaries left around the dormitory.",
            QuestKind::Biography,
        )
        .objective("read_dorm_diaries", "Read 5 diaries", 5)
        .reward(QuestReward::item(RewardKind::Memory, "university_complete_memory"))
        .reward(QuestReward::health(25)),
        Quest::new(
            "collection_all_secrets",
            "Collector",
            "Uncover every secret hidden in the world.",
            QuestKind::Collection,
        )
        .objective("find_secrets", "Find 15 secrets", 15)
        .reward(QuestReward::item(RewardKind::Cassette, "bonus_track"))
        .reward(QuestReward::item(RewardKind::Memory, "complete_biography")),
        Quest::new(
            "rhythm_master",
            "Rhythm Master",
            "Finish rhythm battles with a perfect grade.",
            QuestKind::RhythmChallenge,
        )
        .objective("perfect_rhythm_battles", "Earn an S grade 5 times", 5)
        .reward(QuestReward::item(RewardKind::Ability, "RHYTHM_MASTER"))
        .reward(QuestReward::energy(20)),
    ]
}

#[derive(Debug, Clone)]
pub struct QuestTracker {
    active: Vec<Quest>,
    completed: BTreeSet<String>,
}

impl Default for QuestTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl QuestTracker {
    pub fn new() -> Self {
        Self::with_quests(default_quests())
    }

    pub fn with_quests(quests: Vec<Quest>) -> Self {
        Self {
            active: quests,
            completed: BTreeSet::new(),
        }
    }

    pub fn active_quests(&self) -> &[Quest] {
        &self.active
    }

    pub fn completed_quests(&self) -> &BTreeSet<String> {
        &self.completed
    }

    pub fn is_completed(&self, quest_id: &str) -> bool {
        self.completed.contains(quest_id)
    }

    pub fn quest_progress(&self, quest_id: &str) -> f32 {
        self.active
            .iter()
            .find(|q| q.id == quest_id)
            .map(Quest::progress)
            .unwrap_or(1.0)
    }

    pub fn has_active_main_quest(&self) -> bool {
        self.active.iter().any(|q| q.main_quest)
    }

    /// Returns the ids of quests completed by this call.
    pub fn update_objective(
        &mut self,
        objective_id: &str,
        increment: u32,
        progress: &mut Progression,
    ) -> Vec<String> {
        let mut finished = Vec::new();

        for quest in self.active.iter_mut() {
            let mut touched = false;
            for objective in quest
                .objectives
                .iter_mut()
                .filter(|o| o.id == objective_id && !o.completed)
            {
                objective.current = objective.current.saturating_add(increment);
                touched = true;
                if objective.current >= objective.target {
                    objective.completed = true;
                    debug!(quest = %quest.id, objective = %objective.id, "objective_completed");
                }
            }

            if touched && !quest.completed && quest.objectives.iter().all(|o| o.completed) {
                quest.completed = true;
                finished.push(quest.id.clone());
            }
        }

        if finished.is_empty() {
            return finished;
        }

        let (done, still_active): (Vec<Quest>, Vec<Quest>) =
            std::mem::take(&mut self.active)
                .into_iter()
                .partition(|q| q.completed);
        self.active = still_active;

        for quest in done {
            info!(quest = %quest.id, title = %quest.title, "quest_completed");
            for reward in &quest.rewards {
                reward.apply(progress);
            }
            self.completed.insert(quest.id);
        }

        finished
    }

    /// Counters come from a loaded progression; quests they finish are not
    /// paid out again.
    pub fn restore_from(&mut self, progress: &Progression) {
        let secrets = progress.found_secrets().len() as u32;
        let counts = [
            ("collect_all_cassettes", progress.cassette_count() as u32),
            ("defeat_barkov", u32::from(progress.is_level_completed("final_boss"))),
            ("find_secrets", secrets),
            ("find_street_stages", secrets),
            ("read_dorm_diaries", progress.read_diaries().len() as u32),
        ];

        for quest in self.active.iter_mut() {
            for objective in quest.objectives.iter_mut() {
                if let Some((_, count)) = counts.iter().find(|(id, _)| *id == objective.id) {
                    objective.current = (*count).min(objective.target);
                    objective.completed = objective.current >= objective.target;
                }
            }
            quest.completed =
                !quest.objectives.is_empty() && quest.objectives.iter().all(|o| o.completed);
        }

        let (done, still_active): (Vec<Quest>, Vec<Quest>) =
            std::mem::take(&mut self.active)
                .into_iter()
                .partition(|q| q.completed);
        self.active = still_active;
        for quest in done {
            debug!(quest = %quest.id, "quest_restored");
            self.completed.insert(quest.id);
        }
    }

    pub fn handle_event(&mut self, event: &ProgressEvent, progress: &mut Progression) -> Vec<String> {
        let mut finished = Vec::new();
        let mut bump = |tracker: &mut Self, id: &str, progress: &mut Progression| {
            finished.extend(tracker.update_objective(id, 1, progress));
        };

        match event {
            ProgressEvent::CassetteCollected(_) => bump(self, "collect_all_cassettes", progress),
            ProgressEvent::BossDefeated => bump(self, "defeat_barkov", progress),
            ProgressEvent::SecretFound(_) => {
                bump(self, "find_secrets", progress);
                bump(self, "find_street_stages", progress);
            }
            ProgressEvent::DiaryRead(_) => bump(self, "read_dorm_diaries", progress),
            ProgressEvent::RhythmBattleGraded(Grade::S) => {
                bump(self, "perfect_rhythm_battles", progress)
            }
            ProgressEvent::RhythmBattleGraded(_)
            | ProgressEvent::EnemyDefeated(_)
            | ProgressEvent::AbilityUnlocked(_) => {}
        }

        finished
    }
}
