#![allow(dead_code)]

use noize_voice::AudioSink;
use rand::rngs::StdRng;
use rand::SeedableRng;

pub const DT: f32 = 1.0 / 60.0;

pub fn rng() -> StdRng {
    StdRng::seed_from_u64(0x5EED)
}

/// Audio double that remembers every call. Music plays until stopped.
#[derive(Debug)]
pub struct RecordingAudio {
    pub sounds: Vec<String>,
    pub music: Vec<(String, bool)>,
    pub stops: u32,
    playing: Option<String>,
    paused: bool,
    music_enabled: bool,
    sound_enabled: bool,
    music_volume: f32,
    sound_volume: f32,
}

impl Default for RecordingAudio {
    fn default() -> Self {
        Self {
            sounds: Vec::new(),
            music: Vec::new(),
            stops: 0,
            playing: None,
            paused: false,
            music_enabled: true,
            sound_enabled: true,
            music_volume: 0.7,
            sound_volume: 0.8,
        }
    }
}

impl RecordingAudio {
    pub fn playing(&self) -> Option<&str> {
        self.playing.as_deref()
    }

    pub fn played(&self, sound: &str) -> usize {
        self.sounds.iter().filter(|s| s.as_str() == sound).count()
    }
}

impl AudioSink for RecordingAudio {
    fn play_sound(&mut self, name: &str, _volume: f32) {
        if self.sound_enabled {
            self.sounds.push(name.to_string());
        }
    }

    fn play_music(&mut self, name: &str, looped: bool) {
        if !self.music_enabled {
            return;
        }
        self.music.push((name.to_string(), looped));
        self.playing = Some(name.to_string());
        self.paused = false;
    }

    fn stop_music(&mut self) {
        self.stops += 1;
        self.playing = None;
    }

    fn pause_music(&mut self) {
        self.paused = true;
    }

    fn resume_music(&mut self) {
        self.paused = false;
    }

    fn is_music_playing(&self) -> bool {
        self.playing.is_some() && !self.paused
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
}
