use crate::enemy::EnemyKind;
use crate::kinematics::{Aabb, WORLD_WIDTH};
use crate::progression::Progression;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

pub const FIRST_LEVEL: &str = "act1_level1";

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("failed to read level catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse level catalog {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid level catalog: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SecretKind {
    Diary,
    Memory,
    BonusTrack,
    EasterEgg,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemySpawn {
    pub x: f32,
    pub y: f32,
    pub kind: EnemyKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CassetteSpawn {
    pub x: f32,
    pub y: f32,
    pub track_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecretSpawn {
    pub x: f32,
    pub y: f32,
    pub secret_id: String,
    pub kind: SecretKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDef {
    pub id: String,
    pub name: String,
    pub act: u32,
    pub music: String,
    #[serde(default)]
    pub platforms: Vec<Aabb>,
    #[serde(default)]
    pub enemies: Vec<EnemySpawn>,
    #[serde(default)]
    pub cassettes: Vec<CassetteSpawn>,
    #[serde(default)]
    pub secrets: Vec<SecretSpawn>,
    #[serde(default)]
    pub dialogue: Option<String>,
    #[serde(default)]
    pub next_level: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LevelCatalog {
    levels: Vec<LevelDef>,
}

impl Default for LevelCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl LevelCatalog {
    pub fn builtin() -> Self {
        Self { levels: builtin_levels() }
    }

    pub fn from_levels(levels: Vec<LevelDef>) -> Result<Self, LevelError> {
        if levels.is_empty() {
            return Err(LevelError::Invalid("catalog has no levels".to_string()));
        }
        let mut seen = BTreeSet::new();
        for level in &levels {
            if !seen.insert(level.id.as_str()) {
                return Err(LevelError::Invalid(format!("duplicate level id {}", level.id)));
            }
        }
        Ok(Self { levels })
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| LevelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let levels: Vec<LevelDef> =
            serde_json::from_str(&text).map_err(|source| LevelError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        let catalog = Self::from_levels(levels)?;
        info!(path = %path.display(), levels = catalog.levels.len(), "level_catalog_loaded");
        Ok(catalog)
    }

    pub fn load_or_builtin(path: Option<&str>) -> Self {
        match path.filter(|p| !p.trim().is_empty()) {
            Some(path) => Self::load_from_file(path).unwrap_or_else(|e| {
                warn!(error = %e, "level_catalog_fallback");
                Self::builtin()
            }),
            None => Self::builtin(),
        }
    }

    pub fn levels(&self) -> &[LevelDef] {
        &self.levels
    }

    pub fn level(&self, id: &str) -> Option<&LevelDef> {
        self.levels.iter().find(|l| l.id == id)
    }

    pub fn levels_in_act(&self, act: u32) -> Vec<&LevelDef> {
        self.levels.iter().filter(|l| l.act == act).collect()
    }

    pub fn next_level(&self, id: &str) -> Option<&str> {
        self.level(id).and_then(|l| l.next_level.as_deref())
    }

    /// The first level is always open; any other level opens once some
    /// level pointing at it has been completed.
    pub fn is_level_unlocked(&self, id: &str, progress: &Progression) -> bool {
        if self.level(id).is_none() {
            return false;
        }
        if id == FIRST_LEVEL {
            return true;
        }
        self.levels
            .iter()
            .filter(|l| l.next_level.as_deref() == Some(id))
            .any(|l| progress.is_level_completed(&l.id))
    }

    /// Act the player has reached, judged from the furthest act prefix among
    /// completed levels.
    pub fn current_act(&self, progress: &Progression) -> u32 {
        let completed = progress.completed_levels();
        (1..=5)
            .rev()
            .find(|act| {
                let prefix = format!("act{act}");
                completed.iter().any(|id| id.starts_with(&prefix))
            })
            .map(|act| act + 1)
            .unwrap_or(1)
    }
}

fn ground() -> Aabb {
    Aabb::new(0.0, 0.0, WORLD_WIDTH, 100.0)
}

fn ledge(x: f32, y: f32, w: f32, h: f32) -> Aabb {
    Aabb::new(x, y, w, h)
}

fn enemy(x: f32, y: f32, kind: EnemyKind) -> EnemySpawn {
    EnemySpawn { x, y, kind }
}

fn cassette(x: f32, y: f32, track_id: &str) -> CassetteSpawn {
    CassetteSpawn { x, y, track_id: track_id.to_string() }
}

fn secret(x: f32, y: f32, secret_id: &str, kind: SecretKind) -> SecretSpawn {
    SecretSpawn { x, y, secret_id: secret_id.to_string(), kind }
}

struct LevelTemplate<'a> {
    id: &'a str,
    name: &'a str,
    act: u32,
    music: &'a str,
    dialogue: Option<&'a str>,
    next_level: Option<&'a str>,
}

fn level(
    template: LevelTemplate<'_>,
    platforms: Vec<Aabb>,
    enemies: Vec<EnemySpawn>,
    cassettes: Vec<CassetteSpawn>,
    secrets: Vec<SecretSpawn>,
) -> LevelDef {
    LevelDef {
        id: template.id.to_string(),
        name: template.name.to_string(),
        act: template.act,
        music: template.music.to_string(),
        platforms,
        enemies,
        cassettes,
        secrets,
        dialogue: template.dialogue.map(str::to_string),
        next_level: template.next_level.map(str::to_string),
    }
}

fn builtin_levels() -> Vec<LevelDef> {
    use EnemyKind::*;
    use SecretKind::*;

    vec![
        level(
            LevelTemplate {
                id: "act1_level1",
                name: "First Steps",
                act: 1,
                music: "make_some_noize",
                dialogue: Some("act1_street"),
                next_level: Some("act1_level2"),
            },
            vec![
                ground(),
                ledge(300.0, 180.0, 200.0, 50.0),
                ledge(600.0, 310.0, 150.0, 50.0),
                ledge(900.0, 440.0, 200.0, 50.0),
            ],
            vec![enemy(400.0, 150.0, NoiseMaker), enemy(700.0, 150.0, NoiseMaker)],
            vec![cassette(250.0, 250.0, "make_some_noize")],
            vec![secret(150.0, 120.0, "first_concert_memory", Memory)],
        ),
        level(
            LevelTemplate {
                id: "act1_level2",
                name: "City Gigs",
                act: 1,
                music: "make_some_noize",
                dialogue: None,
                next_level: Some("act2_level1"),
            },
            vec![ground(), ledge(200.0, 180.0, 300.0, 50.0), ledge(650.0, 310.0, 250.0, 50.0)],
            vec![
                enemy(500.0, 150.0, Critic),
                enemy(1000.0, 150.0, NoiseMaker),
                enemy(300.0, 300.0, MediaSpammer),
            ],
            vec![],
            vec![secret(700.0, 380.0, "street_performance_diary", Diary)],
        ),
        level(
            LevelTemplate {
                id: "act2_level1",
                name: "Student Years",
                act: 2,
                music: "vselennaya",
                dialogue: Some("act2_dorm"),
                next_level: Some("act3_level1"),
            },
            vec![
                ground(),
                ledge(400.0, 180.0, 400.0, 50.0),
                ledge(100.0, 310.0, 200.0, 50.0),
                ledge(1200.0, 180.0, 300.0, 50.0),
            ],
            vec![enemy(500.0, 150.0, Silencer), enemy(1300.0, 250.0, Critic)],
            vec![cassette(650.0, 280.0, "vselennaya")],
            vec![
                secret(150.0, 380.0, "university_memories", Memory),
                secret(450.0, 250.0, "student_diary", Diary),
            ],
        ),
        level(
            LevelTemplate {
                id: "act3_level1",
                name: "World Without Sound",
                act: 3,
                music: "vidihay",
                dialogue: Some("act3_silence"),
                next_level: Some("act4_level1"),
            },
            vec![
                ground(),
                ledge(300.0, 180.0, 200.0, 50.0),
                ledge(700.0, 310.0, 200.0, 50.0),
                ledge(1100.0, 440.0, 300.0, 50.0),
            ],
            vec![
                enemy(400.0, 150.0, CensorDrone),
                enemy(800.0, 380.0, Silencer),
                enemy(1200.0, 510.0, FanaticPhantom),
            ],
            vec![cassette(450.0, 260.0, "vidihay")],
            vec![secret(50.0, 120.0, "censorship_thoughts", Memory)],
        ),
        level(
            LevelTemplate {
                id: "act4_level1",
                name: "Road to the Stage",
                act: 4,
                music: "igra_slov",
                dialogue: None,
                next_level: Some("act5_level1"),
            },
            vec![
                ground(),
                ledge(250.0, 180.0, 150.0, 50.0),
                ledge(500.0, 310.0, 150.0, 50.0),
                ledge(750.0, 440.0, 150.0, 50.0),
                ledge(1000.0, 280.0, 200.0, 50.0),
            ],
            vec![
                enemy(300.0, 150.0, MediaSpammer),
                enemy(600.0, 150.0, NoiseMaker),
                enemy(1100.0, 350.0, Critic),
            ],
            vec![cassette(550.0, 380.0, "igra_slov")],
            vec![
                secret(800.0, 510.0, "tour_diary", Diary),
                secret(1150.0, 350.0, "fan_meeting", Memory),
            ],
        ),
        level(
            LevelTemplate {
                id: "act5_level1",
                name: "Heart of the System",
                act: 5,
                music: "mercedes",
                dialogue: Some("act5_system"),
                next_level: Some("final_boss"),
            },
            vec![
                ground(),
                ledge(400.0, 180.0, 300.0, 50.0),
                ledge(900.0, 310.0, 300.0, 50.0),
                ledge(1300.0, 440.0, 300.0, 50.0),
            ],
            vec![
                enemy(500.0, 150.0, CensorDrone),
                enemy(1000.0, 380.0, MediaSpammer),
                enemy(1400.0, 510.0, FanaticPhantom),
            ],
            vec![cassette(550.0, 330.0, "mercedes")],
            vec![secret(1100.0, 380.0, "system_core", EasterEgg)],
        ),
        level(
            LevelTemplate {
                id: "final_boss",
                name: "Showdown with Barkov",
                act: 6,
                music: "mercedes",
                dialogue: Some("final_barkov"),
                next_level: Some("epilogue"),
            },
            vec![ground(), ledge(400.0, 180.0, 800.0, 50.0)],
            vec![enemy(WORLD_WIDTH - 200.0, 400.0, Critic)],
            vec![cassette(600.0, 280.0, "moe_more")],
            vec![],
        ),
        level(
            LevelTemplate {
                id: "epilogue",
                name: "My Sea",
                act: 7,
                music: "moe_more",
                dialogue: Some("epilogue_sea"),
                next_level: None,
            },
            vec![ground()],
            vec![],
            vec![],
            vec![secret(500.0, 150.0, "final_reflection", Memory)],
        ),
    ]
}
