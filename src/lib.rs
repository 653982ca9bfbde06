//! dIGIT WorLd - a platformer built out of seven-segment digits
//!
//! Core modules:
//! - `sim`: Frame-stepped simulation (digits, platforms, player, stage timing)
//! - `settings`: Display configuration and user preferences
//! - `audio`: Audio collaborator interface and sound bank
//! - `progress`: Stage unlock/clear persistence

pub mod audio;
pub mod progress;
pub mod settings;
pub mod sim;

pub use progress::{Progress, StageProgress};
pub use settings::{DisplayConfig, Settings};

/// Game configuration constants
pub mod consts {
    /// Target update rate
    pub const FPS: u32 = 60;
    /// Fixed simulation timestep used by the native runner
    pub const SIM_DT: f32 = 1.0 / FPS as f32;
    /// Camera smoothing runs on its own fixed step
    pub const CAMERA_DT: f32 = 1.0 / 60.0;
    pub const CAMERA_SMOOTHING: f32 = 0.1;

    /// Segment fade-in/fade-out length (seconds)
    pub const TRANSITION_DURATION: f32 = 0.8;
    /// Flicker frequency of a segment turning off (radians per second)
    pub const FLICKER_RATE: f32 = 10.0;

    /// Segment layout ratios relative to the digit box
    pub const VERTICAL_THICKNESS_DIV: f32 = 3.4;
    pub const HORIZONTAL_THICKNESS_DIV: f32 = 10.3;
    /// Horizontal bars are inset by this fraction of the width on each side
    pub const BAR_INSET: f32 = 0.1;
    /// Bottom bar is raised by this many pixels to close the seam with C/E
    pub const BOTTOM_BAR_OFFSET: f32 = 7.0;

    /// Grace window after leaving a platform (seconds)
    pub const COYOTE_TIME: f32 = 0.05;

    /// Streak must hold this long before the stage clears (seconds)
    pub const GAME_CLEAR_DELAY: f64 = 0.3;
    /// Vertical speed considered "landed" for the clear check
    pub const CLEAR_LANDED_SPEED: f32 = 1.0;
    /// How long the clear banner stays before leaving the stage (seconds)
    pub const STAGE_CLEAR_DISPLAY_TIME: f64 = 2.0;

    /// Default lifetime of a key when the stage omits one (seconds)
    pub const DEFAULT_KEY_LIFESPAN: f64 = 2.0;
    /// Default period of a digit controller (seconds)
    pub const DEFAULT_INITIAL_TIME: f64 = 2.0;

    /// Countdown cue points as fractions of the global change period
    pub const CUE_FRACTIONS: [f64; 3] = [0.55, 0.30, 0.05];

    /// Stages per world for progress cascading
    pub const STAGES_PER_WORLD: u32 = 3;
    /// Last regular world; clearing its final stage unlocks the bonus world
    pub const LAST_REGULAR_WORLD: u32 = 4;
}
