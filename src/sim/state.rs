//! Game state and core simulation types
//!
//! A `GameSession` owns everything one stage attempt needs. Side effects for
//! collaborators (audio, music) are queued as `GameEvent`s and drained by the
//! caller after each tick.

use glam::Vec2;

use super::item::Item;
use super::manager::StageManager;
use super::player::{Player, PlayerTuning};
use super::stage::{StageBlueprint, StageId};
use crate::consts::{CAMERA_DT, CAMERA_SMOOTHING};
use crate::settings::DisplayConfig;

const FINAL_STAGE_TRACK: &str = "stage_4-3.mp3";

/// Named one-shot sound effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sound {
    Jump,
    Hit,
    Pickup,
    StageClear,
    GameClear,
    Miss,
    /// Countdown cue
    Pi,
    KeySpawn,
    SpawnOne,
}

impl Sound {
    pub fn name(self) -> &'static str {
        match self {
            Sound::Jump => "jump",
            Sound::Hit => "hit",
            Sound::Pickup => "pickup",
            Sound::StageClear => "stage_clear",
            Sound::GameClear => "game_clear",
            Sound::Miss => "miss",
            Sound::Pi => "pi",
            Sound::KeySpawn => "key_spawn",
            Sound::SpawnOne => "spawn_one",
        }
    }
}

/// Events emitted by the simulation for collaborators
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Sound(Sound),
    PlayMusic { track: &'static str, looping: bool },
    StopMusic,
}

/// Current phase of a stage attempt
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionPhase {
    /// Active gameplay
    Playing,
    /// Clear latched; the clear screen is shown until the delay passes
    StageClear { since: f64 },
    /// Done with this stage, the caller should move on
    Exited,
}

/// Smoothed camera following the player
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Top-left of the view in world space
    pub offset: Vec2,
    accumulator: f32,
    initialized: bool,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            accumulator: 0.0,
            initialized: false,
        }
    }
}

impl Camera {
    /// Ease toward centering `target` in a `viewport`, in fixed steps
    pub fn follow(&mut self, target: Vec2, viewport: Vec2, dt: f32) {
        let desired = target - viewport / 2.0;
        if !self.initialized {
            self.offset = desired;
            self.initialized = true;
            return;
        }
        self.accumulator += dt;
        while self.accumulator >= CAMERA_DT {
            self.offset += (desired - self.offset) * CAMERA_SMOOTHING;
            self.accumulator -= CAMERA_DT;
        }
    }
}

/// One stage attempt: manager, player, live items and the clock
#[derive(Debug, Clone)]
pub struct GameSession {
    pub display: DisplayConfig,
    pub stage_id: Option<StageId>,
    pub manager: StageManager,
    pub player: Player,
    /// Live items, in spawn order
    pub items: Vec<Item>,
    /// Jump held last tick (for edge detection)
    pub prev_jump: bool,
    /// Simulation clock in seconds
    pub clock: f64,
    pub phase: SessionPhase,
    pub camera: Camera,
    /// Times the attempt was restarted by a fall or a manual reset
    pub deaths: u32,
    /// Pending events since the last drain
    pub events: Vec<GameEvent>,
}

impl GameSession {
    pub fn new(
        display: DisplayConfig,
        blueprint: StageBlueprint,
        stage_id: Option<StageId>,
    ) -> Self {
        let player = Player::new(blueprint.player_start, PlayerTuning::from_display(&display));
        let mut session = Self {
            display,
            stage_id,
            manager: StageManager::new(blueprint, 0.0),
            player,
            items: Vec::new(),
            prev_jump: false,
            clock: 0.0,
            phase: SessionPhase::Playing,
            camera: Camera::default(),
            deaths: 0,
            events: Vec::new(),
        };
        session.start_stage_music();
        session
    }

    fn start_stage_music(&mut self) {
        if self.manager.blueprint().is_final() {
            self.events.push(GameEvent::PlayMusic {
                track: FINAL_STAGE_TRACK,
                looping: true,
            });
        }
    }

    /// Restart the attempt from the stage's initial state
    pub fn reset(&mut self) {
        self.manager.reset(self.clock);
        self.player.reset(self.manager.blueprint().player_start);
        self.player.vel = Vec2::ZERO;
        self.items.clear();
        self.phase = SessionPhase::Playing;
        self.camera = Camera::default();
        self.events.push(GameEvent::StopMusic);
        self.start_stage_music();
        log::debug!("Stage reset at t={:.2}", self.clock);
    }

    /// Queue the clear fanfare; the last stage ends the music as well
    pub(crate) fn push_clear_events(&mut self) {
        if self.stage_id.is_some_and(StageId::is_last) {
            self.events.push(GameEvent::Sound(Sound::GameClear));
            self.events.push(GameEvent::StopMusic);
        } else {
            self.events.push(GameEvent::Sound(Sound::StageClear));
        }
    }

    pub fn is_stage_clear(&self) -> bool {
        self.manager.is_stage_clear()
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::stage::StageData;

    #[test]
    fn test_sound_names_unique() {
        let all = [
            Sound::Jump,
            Sound::Hit,
            Sound::Pickup,
            Sound::StageClear,
            Sound::GameClear,
            Sound::Miss,
            Sound::Pi,
            Sound::KeySpawn,
            Sound::SpawnOne,
        ];
        let mut names: Vec<_> = all.iter().map(|s| s.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), all.len());
    }

    #[test]
    fn test_camera_snaps_then_eases() {
        let mut camera = Camera::default();
        let viewport = Vec2::new(100.0, 100.0);
        camera.follow(Vec2::new(50.0, 50.0), viewport, 1.0 / 60.0);
        assert_eq!(camera.offset, Vec2::ZERO);

        camera.follow(Vec2::new(150.0, 50.0), viewport, 1.0 / 60.0);
        assert!(camera.offset.x > 0.0 && camera.offset.x <= 10.0 + 1e-3);
        assert_eq!(camera.offset.y, 0.0);
    }

    fn plain_session(stage_id: Option<StageId>) -> GameSession {
        let display = DisplayConfig::default();
        let blueprint = StageData::default().blueprint(&display);
        GameSession::new(display, blueprint, stage_id)
    }

    #[test]
    fn test_reset_snaps_camera_to_player() {
        let mut session = plain_session(None);
        let viewport = Vec2::new(session.display.width, session.display.height);
        session.camera.follow(Vec2::new(5000.0, 5000.0), viewport, 1.0 / 60.0);

        session.reset();
        let center = session.player.center();
        session.camera.follow(center, viewport, 1.0 / 60.0);
        assert_eq!(session.camera.offset, center - viewport / 2.0);
    }

    #[test]
    fn test_reset_stops_music() {
        let mut session = plain_session(None);
        session.reset();
        assert_eq!(session.drain_events(), vec![GameEvent::StopMusic]);
    }

    #[test]
    fn test_clear_fanfare_depends_on_stage() {
        let mut session = plain_session(Some(StageId::new(2, 3)));
        session.push_clear_events();
        assert_eq!(
            session.drain_events(),
            vec![GameEvent::Sound(Sound::StageClear)]
        );

        let mut last = plain_session(Some(StageId::new(4, 3)));
        last.push_clear_events();
        assert_eq!(
            last.drain_events(),
            vec![GameEvent::Sound(Sound::GameClear), GameEvent::StopMusic]
        );
    }

    #[test]
    fn test_camera_waits_for_full_step() {
        let mut camera = Camera::default();
        let viewport = Vec2::new(100.0, 100.0);
        camera.follow(Vec2::ZERO, viewport, 0.0);
        let start = camera.offset;
        camera.follow(Vec2::new(500.0, 0.0), viewport, 0.001);
        assert_eq!(camera.offset, start);
    }
}
