//! Frame-stepped simulation
//!
//! All gameplay logic lives here. Everything is deterministic given the
//! stage data, the per-frame input and `dt`:
//! - Timers run on the session clock, never on wall time
//! - Seeded RNG only (idle driver)
//! - Stable iteration order (stage order for digits, spawn order for items)
//! - No rendering or platform dependencies

pub mod collision;
pub mod controller;
pub mod digit;
pub mod glyph;
pub mod idle;
pub mod item;
pub mod manager;
pub mod player;
pub mod rect;
pub mod stage;
pub mod state;
pub mod tick;

pub use collision::{YContact, resolve_x, resolve_y};
pub use controller::DigitController;
pub use digit::{Digit, DigitGroup, Platform, SegmentPhase, SegmentProperties, SegmentState};
pub use glyph::{Segment, SegmentMask, segments_for};
pub use idle::IdleDriver;
pub use item::{Item, ItemKind, KeyCollector};
pub use manager::StageManager;
pub use player::{Player, PlayerInput, PlayerTuning, WorldBounds};
pub use rect::Rect;
pub use stage::{StageBlueprint, StageData, StageId};
pub use state::{Camera, GameEvent, GameSession, SessionPhase, Sound};
pub use tick::{TickInput, tick};
