use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

pub const DEFAULT_MUSIC_VOLUME: f32 = 0.7;
pub const DEFAULT_SOUND_VOLUME: f32 = 0.8;

pub const MUSIC_TRACKS: [&str; 6] = [
    "make_some_noize",
    "vidihay",
    "vselennaya",
    "igra_slov",
    "moe_more",
    "mercedes",
];

pub const SOUND_EFFECTS: [&str; 7] = [
    "jump",
    "attack",
    "collect",
    "hurt",
    "ability",
    "rhythm_hit",
    "cassette_pickup",
];

pub trait AudioSink {
    fn play_sound(&mut self, name: &str, volume: f32);
    fn play_music(&mut self, name: &str, looped: bool);
    fn stop_music(&mut self);
    fn pause_music(&mut self);
    fn resume_music(&mut self);
    fn is_music_playing(&self) -> bool;

    fn music_volume(&self) -> f32;
    fn set_music_volume(&mut self, volume: f32);
    fn sound_volume(&self) -> f32;
    fn set_sound_volume(&mut self, volume: f32);

    fn music_enabled(&self) -> bool;
    fn toggle_music(&mut self);
    fn sound_enabled(&self) -> bool;
    fn toggle_sound(&mut self);

    /// Advances the playback clock.
    fn update(&mut self, _dt: f32) {}

    /// Plays a track once, without looping, for a rhythm battle.
    fn start_rhythm_track(&mut self, name: &str) {
        self.play_music(name, false);
        debug!(track = %name, "rhythm_track_started");
    }
}

#[derive(Debug, Clone)]
struct PlayingTrack {
    name: String,
    looped: bool,
    position: f32,
    paused: bool,
}

/// Backend that plays nothing but keeps an honest account of what would be
/// playing. Non-looping tracks end after `track_length` seconds.
#[derive(Debug, Clone)]
pub struct HeadlessAudio {
    tracks: BTreeMap<String, f32>,
    sounds: BTreeSet<String>,
    current: Option<PlayingTrack>,
    music_volume: f32,
    sound_volume: f32,
    music_enabled: bool,
    sound_enabled: bool,
    warned: BTreeSet<String>,
}

impl HeadlessAudio {
    pub fn new(track_length: f32) -> Self {
        Self {
            tracks: MUSIC_TRACKS
                .iter()
                .map(|name| (name.to_string(), track_length))
                .collect(),
            sounds: SOUND_EFFECTS.iter().map(|name| name.to_string()).collect(),
            current: None,
            music_volume: DEFAULT_MUSIC_VOLUME,
            sound_volume: DEFAULT_SOUND_VOLUME,
            music_enabled: true,
            sound_enabled: true,
            warned: BTreeSet::new(),
        }
    }

    pub fn current_track(&self) -> Option<&str> {
        self.current.as_ref().map(|t| t.name.as_str())
    }

    pub fn music_position(&self) -> f32 {
        self.current.as_ref().map(|t| t.position).unwrap_or(0.0)
    }

    fn warn_missing(&mut self, kind: &str, name: &str) {
        if self.warned.insert(format!("{kind}:{name}")) {
            warn!(kind = %kind, name = %name, "audio_asset_missing");
        }
    }
}

impl Default for HeadlessAudio {
    fn default() -> Self {
        Self::new(30.0)
    }
}

impl AudioSink for HeadlessAudio {
    fn play_sound(&mut self, name: &str, _volume: f32) {
        if !self.sound_enabled {
            return;
        }
        if !self.sounds.contains(name) {
            self.warn_missing("sound", name);
        }
    }

    fn play_music(&mut self, name: &str, looped: bool) {
        if !self.music_enabled {
            return;
        }
        self.current = None;
        if !self.tracks.contains_key(name) {
            self.warn_missing("music", name);
            return;
        }
        debug!(track = %name, looped, "music_started");
        self.current = Some(PlayingTrack {
            name: name.to_string(),
            looped,
            position: 0.0,
            paused: false,
        });
    }

    fn stop_music(&mut self) {
        self.current = None;
    }

    fn pause_music(&mut self) {
        if let Some(track) = self.current.as_mut() {
            track.paused = true;
        }
    }

    fn resume_music(&mut self) {
        if let Some(track) = self.current.as_mut() {
            track.paused = false;
        }
    }

    fn is_music_playing(&self) -> bool {
        self.current.as_ref().is_some_and(|t| !t.paused)
    }

    fn music_volume(&self) -> f32 {
        self.music_volume
    }

    fn set_music_volume(&mut self, volume: f32) {
        self.music_volume = volume.clamp(0.0, 1.0);
    }

    fn sound_volume(&self) -> f32 {
        self.sound_volume
    }

    fn set_sound_volume(&mut self, volume: f32) {
        self.sound_volume = volume.clamp(0.0, 1.0);
    }

    fn music_enabled(&self) -> bool {
        self.music_enabled
    }

    fn toggle_music(&mut self) {
        self.music_enabled = !self.music_enabled;
        if !self.music_enabled {
            self.stop_music();
        }
    }

    fn sound_enabled(&self) -> bool {
        self.sound_enabled
    }

    fn toggle_sound(&mut self) {
        self.sound_enabled = !self.sound_enabled;
    }

    fn update(&mut self, dt: f32) {
        let Some(track) = self.current.as_mut() else {
            return;
        };
        if track.paused {
            return;
        }
        track.position += dt;
        let length = self.tracks.get(&track.name).copied().unwrap_or(0.0);
        if track.position >= length {
            if track.looped {
                track.position -= length;
            } else {
                self.current = None;
            }
        }
    }
}
