use macroquad::audio::{load_sound, play_sound, set_sound_volume, stop_sound, PlaySoundParams, Sound};
use noize_voice::audio::{AudioSink, HeadlessAudio, MUSIC_TRACKS, SOUND_EFFECTS};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Plays through macroquad. A headless clock keeps the track bookkeeping and
/// ends one-shot rhythm tracks after the configured length.
pub struct MacroquadAudio {
    clock: HeadlessAudio,
    music: BTreeMap<String, Sound>,
    sounds: BTreeMap<String, Sound>,
    playing: Option<String>,
}

async fn load_optional(paths: &[String]) -> Option<Sound> {
    for path in paths {
        match load_sound(path).await {
            Ok(sound) => return Some(sound),
            Err(e) => warn!(path = %path, error = %e, "sound_load_failed"),
        }
    }
    None
}

impl MacroquadAudio {
    pub async fn load(track_length: f32) -> Self {
        let mut music = BTreeMap::new();
        for name in MUSIC_TRACKS {
            let paths = [format!("assets/music/{name}.ogg"), format!("assets/music/{name}.wav")];
            if let Some(sound) = load_optional(&paths).await {
                music.insert(name.to_string(), sound);
            }
        }

        let mut sounds = BTreeMap::new();
        for name in SOUND_EFFECTS {
            let paths = [format!("assets/sounds/{name}.wav"), format!("assets/sounds/{name}.ogg")];
            if let Some(sound) = load_optional(&paths).await {
                sounds.insert(name.to_string(), sound);
            }
        }

        debug!(music = music.len(), sounds = sounds.len(), "audio_loaded");
        Self {
            clock: HeadlessAudio::new(track_length),
            music,
            sounds,
            playing: None,
        }
    }

    fn current(&self) -> Option<&Sound> {
        self.playing.as_ref().and_then(|name| self.music.get(name))
    }

    fn silence(&mut self) {
        if let Some(sound) = self.current() {
            stop_sound(sound);
        }
        self.playing = None;
    }
}

impl AudioSink for MacroquadAudio {
    fn play_sound(&mut self, name: &str, volume: f32) {
        self.clock.play_sound(name, volume);
        if !self.clock.sound_enabled() {
            return;
        }
        if let Some(sound) = self.sounds.get(name) {
            play_sound(
                sound,
                PlaySoundParams {
                    looped: false,
                    volume: volume * self.clock.sound_volume(),
                },
            );
        }
    }

    fn play_music(&mut self, name: &str, looped: bool) {
        self.silence();
        self.clock.play_music(name, looped);
        if self.clock.current_track() != Some(name) {
            return;
        }
        if let Some(sound) = self.music.get(name) {
            play_sound(
                sound,
                PlaySoundParams {
                    looped,
                    volume: self.clock.music_volume(),
                },
            );
            self.playing = Some(name.to_string());
        }
    }

    fn stop_music(&mut self) {
        self.silence();
        self.clock.stop_music();
    }

    // macroquad has no pause; a paused track keeps running muted.
    fn pause_music(&mut self) {
        self.clock.pause_music();
        if let Some(sound) = self.current() {
            set_sound_volume(sound, 0.0);
        }
    }

    fn resume_music(&mut self) {
        self.clock.resume_music();
        if let Some(sound) = self.current() {
            set_sound_volume(sound, self.clock.music_volume());
        }
    }

    fn is_music_playing(&self) -> bool {
        self.clock.is_music_playing()
    }

    fn music_volume(&self) -> f32 {
        self.clock.music_volume()
    }

    fn set_music_volume(&mut self, volume: f32) {
        self.clock.set_music_volume(volume);
        if let Some(sound) = self.current() {
            set_sound_volume(sound, self.clock.music_volume());
        }
    }

    fn sound_volume(&self) -> f32 {
        self.clock.sound_volume()
    }

    fn set_sound_volume(&mut self, volume: f32) {
        self.clock.set_sound_volume(volume);
    }

    fn music_enabled(&self) -> bool {
        self.clock.music_enabled()
    }

    fn toggle_music(&mut self) {
        self.clock.toggle_music();
        if !self.clock.music_enabled() {
            self.silence();
        }
    }

    fn sound_enabled(&self) -> bool {
        self.clock.sound_enabled()
    }

    fn toggle_sound(&mut self) {
        self.clock.toggle_sound();
    }

    fn update(&mut self, dt: f32) {
        self.clock.update(dt);
        if self.playing.is_some() && self.clock.current_track().is_none() {
            self.silence();
        }
    }
}
