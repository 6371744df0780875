use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

pub const DEFAULT_RULES_PATH: &str = "assets/config/rules.json";

#[derive(Debug, Error)]
pub enum RulesError {
    #[error("failed to serialize rules: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write rules file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub left: Vec<String>,
    pub right: Vec<String>,
    pub jump: Vec<String>,
    pub attack: Vec<String>,
    pub ability_make_some_noize: String,
    pub ability_vidihay: String,
    pub ability_vselennaya: String,
    pub ability_igra_slov: String,
    pub ultimate: String,
    pub rhythm_lanes: [String; 4],
    pub pause: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            left: vec!["A".to_string(), "Left".to_string()],
            right: vec!["D".to_string(), "Right".to_string()],
            jump: vec!["Space".to_string(), "W".to_string()],
            attack: vec!["X".to_string()],
            ability_make_some_noize: "Z".to_string(),
            ability_vidihay: "C".to_string(),
            ability_vselennaya: "V".to_string(),
            ability_igra_slov: "B".to_string(),
            ultimate: "Q".to_string(),
            rhythm_lanes: ["A".to_string(), "S".to_string(), "D".to_string(), "F".to_string()],
            pause: "Escape".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameRules {
    pub seed: Option<u64>,
    pub resolution_index: usize,
    pub vsync_enabled: bool,
    pub show_fps: bool,
    pub music_enabled: bool,
    pub sfx_enabled: bool,
    pub music_volume: f32,
    pub sfx_volume: f32,
    /// `both`, `wasd`, `arrows` or `custom`.
    pub control_scheme: String,
    pub keys: KeyBindings,
    pub tick_rate: u32,
    pub max_catch_up_ticks: u32,
    pub hit_invincibility_duration: f32,
    pub notice_duration: f32,
    pub rhythm_track_length: f32,
    pub save_path: String,
    pub level_catalog_path: Option<String>,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            seed: None,
            resolution_index: 1,
            vsync_enabled: true,
            show_fps: false,
            music_enabled: true,
            sfx_enabled: true,
            music_volume: 0.7,
            sfx_volume: 0.8,
            control_scheme: "both".to_string(),
            keys: KeyBindings::default(),
            tick_rate: 60,
            max_catch_up_ticks: 5,
            hit_invincibility_duration: 1.0,
            notice_duration: 2.0,
            rhythm_track_length: 30.0,
            save_path: "saves/noize_voice.json".to_string(),
            level_catalog_path: None,
        }
    }
}

impl GameRules {
    /// Seconds per simulation tick.
    pub fn tick_dt(&self) -> f32 {
        1.0 / self.tick_rate.max(1) as f32
    }

    pub fn notice_ticks(&self) -> u32 {
        (self.notice_duration.max(0.0) * self.tick_rate.max(1) as f32).round() as u32
    }

    fn sanitize(&mut self) {
        self.tick_rate = self.tick_rate.clamp(15, 240);
        self.max_catch_up_ticks = self.max_catch_up_ticks.max(1);
        self.music_volume = self.music_volume.clamp(0.0, 1.0);
        self.sfx_volume = self.sfx_volume.clamp(0.0, 1.0);
        self.hit_invincibility_duration = self.hit_invincibility_duration.max(0.0);
        self.rhythm_track_length = self.rhythm_track_length.max(1.0);
    }
}

/// Reads rules from disk. Any problem falls back to defaults.
pub fn load_rules(path: impl AsRef<Path>) -> GameRules {
    let path = path.as_ref();
    let mut rules = match fs::read_to_string(path) {
        Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "rules_parse_failed");
            GameRules::default()
        }),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "rules_read_failed");
            GameRules::default()
        }
    };
    rules.sanitize();
    info!(path = %path.display(), tick_rate = rules.tick_rate, "rules_loaded");
    rules
}

pub fn save_rules(path: impl AsRef<Path>, rules: &GameRules) -> Result<(), RulesError> {
    let path = path.as_ref();
    let text = serde_json::to_string_pretty(rules)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| RulesError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, text).map_err(|source| RulesError::Io {
        path: path.to_path_buf(),
        source,
    })
}
