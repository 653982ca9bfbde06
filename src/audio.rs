//! Audio collaborator
//!
//! The simulation never talks to an audio device; it queues `GameEvent`s and
//! the caller forwards them to an `AudioSink`. Sinks are fire-and-forget:
//! unknown or failing sounds are dropped, never reported back.

use std::collections::HashMap;

use crate::sim::GameEvent;

/// Capability surface the game plays sounds and music through
pub trait AudioSink {
    fn play(&mut self, name: &str);
    fn play_music(&mut self, track: &str, looping: bool);
    fn stop_music(&mut self);
    /// Set volume (0.0 - 1.0) of a named sound
    fn set_volume(&mut self, name: &str, level: f32);
    fn toggle_mute(&mut self);
}

/// A named sound effect and its default volume
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoundEntry {
    pub name: &'static str,
    pub file: &'static str,
    pub volume: f32,
}

/// Every sound effect that can be preloaded
#[derive(Debug, Clone, PartialEq)]
pub struct SoundBank {
    entries: Vec<SoundEntry>,
}

impl Default for SoundBank {
    fn default() -> Self {
        const fn entry(name: &'static str, file: &'static str, volume: f32) -> SoundEntry {
            SoundEntry { name, file, volume }
        }
        Self {
            entries: vec![
                entry("jump", "jump.ogg", 0.05),
                entry("hit", "hit.ogg", 0.0),
                entry("pickup", "pickup.ogg", 0.02),
                entry("stage_clear", "stage_clear.ogg", 0.01),
                entry("miss", "miss.ogg", 0.02),
                entry("pi", "pi.ogg", 0.1),
                entry("loop_reset", "loop_reset.ogg", 0.1),
                entry("key_spawn", "key_spawn.ogg", 0.05),
                entry("select", "select.ogg", 0.1),
                entry("stage_in", "stage_in.ogg", 0.1),
                entry("unmove", "unmove.ogg", 0.1),
                entry("ex_open", "ex_open.ogg", 0.1),
                entry("title_in", "title_in.ogg", 0.1),
                entry("spawn_one", "spawn_one.ogg", 0.02),
            ],
        }
    }
}

impl SoundBank {
    pub fn entries(&self) -> &[SoundEntry] {
        &self.entries
    }

    pub fn get(&self, name: &str) -> Option<&SoundEntry> {
        self.entries.iter().find(|e| e.name == name)
    }
}

/// Forward queued simulation events to a sink
pub fn dispatch(sink: &mut dyn AudioSink, events: &[GameEvent]) {
    for event in events {
        match event {
            GameEvent::Sound(sound) => sink.play(sound.name()),
            GameEvent::PlayMusic { track, looping } => sink.play_music(track, *looping),
            GameEvent::StopMusic => sink.stop_music(),
        }
    }
}

/// Sink that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _name: &str) {}
    fn play_music(&mut self, _track: &str, _looping: bool) {}
    fn stop_music(&mut self) {}
    fn set_volume(&mut self, _name: &str, _level: f32) {}
    fn toggle_mute(&mut self) {}
}

/// Headless sink: logs what would be heard and keeps a tally
#[derive(Debug, Clone)]
pub struct LoggingAudio {
    bank: SoundBank,
    volumes: HashMap<String, f32>,
    muted: bool,
    music: Option<(String, bool)>,
    counts: HashMap<String, u32>,
}

impl Default for LoggingAudio {
    fn default() -> Self {
        Self::new(SoundBank::default())
    }
}

impl LoggingAudio {
    pub fn new(bank: SoundBank) -> Self {
        let volumes = bank
            .entries()
            .iter()
            .map(|e| (e.name.to_string(), e.volume))
            .collect();
        Self {
            bank,
            volumes,
            muted: false,
            music: None,
            counts: HashMap::new(),
        }
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Current music track and whether it loops
    pub fn music(&self) -> Option<(&str, bool)> {
        self.music.as_ref().map(|(t, l)| (t.as_str(), *l))
    }

    /// How many times `name` was audibly played
    pub fn count(&self, name: &str) -> u32 {
        self.counts.get(name).copied().unwrap_or(0)
    }

    /// (name, count) for every sound played, sorted by name
    pub fn tally(&self) -> Vec<(&str, u32)> {
        let mut out: Vec<_> = self.counts.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        out.sort_unstable();
        out
    }
}

impl AudioSink for LoggingAudio {
    fn play(&mut self, name: &str) {
        if self.muted {
            return;
        }
        let Some(entry) = self.bank.get(name) else {
            log::debug!("Unknown sound '{name}' ignored");
            return;
        };
        let volume = self.volumes.get(name).copied().unwrap_or(entry.volume);
        if volume <= 0.0 {
            return;
        }
        log::trace!("play {} ({}) at {volume:.2}", entry.name, entry.file);
        *self.counts.entry(name.to_string()).or_default() += 1;
    }

    fn play_music(&mut self, track: &str, looping: bool) {
        if self.muted {
            return;
        }
        log::debug!("music: {track} (loop={looping})");
        self.music = Some((track.to_string(), looping));
    }

    fn stop_music(&mut self) {
        log::debug!("music stopped");
        self.music = None;
    }

    fn set_volume(&mut self, name: &str, level: f32) {
        self.volumes.insert(name.to_string(), level.clamp(0.0, 1.0));
    }

    fn toggle_mute(&mut self) {
        self.muted = !self.muted;
        log::info!("Audio {}", if self.muted { "muted" } else { "unmuted" });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Sound;

    #[test]
    fn test_bank_has_fourteen_sounds() {
        let bank = SoundBank::default();
        assert_eq!(bank.entries().len(), 14);
        assert_eq!(bank.get("spawn_one").map(|e| e.volume), Some(0.02));
        assert!(bank.get("game_clear").is_none());
    }

    #[test]
    fn test_dispatch_routes_events() {
        let mut audio = LoggingAudio::default();
        dispatch(
            &mut audio,
            &[
                GameEvent::Sound(Sound::Jump),
                GameEvent::Sound(Sound::Jump),
                GameEvent::PlayMusic {
                    track: "heart.mp3",
                    looping: true,
                },
            ],
        );
        assert_eq!(audio.count("jump"), 2);
        assert_eq!(audio.music(), Some(("heart.mp3", true)));

        dispatch(&mut audio, &[GameEvent::StopMusic]);
        assert_eq!(audio.music(), None);
    }

    #[test]
    fn test_missing_and_silent_sounds_are_swallowed() {
        let mut audio = LoggingAudio::default();
        audio.play("game_clear");
        // "hit" ships at zero volume
        audio.play("hit");
        assert!(audio.tally().is_empty());

        audio.set_volume("hit", 0.5);
        audio.play("hit");
        assert_eq!(audio.count("hit"), 1);
    }

    #[test]
    fn test_mute_toggle() {
        let mut audio = LoggingAudio::default();
        audio.toggle_mute();
        audio.play("jump");
        audio.play_music("heart.mp3", true);
        assert_eq!(audio.count("jump"), 0);
        assert_eq!(audio.music(), None);
        audio.toggle_mute();
        audio.play("jump");
        assert_eq!(audio.count("jump"), 1);
    }
}
