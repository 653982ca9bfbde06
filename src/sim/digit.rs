//! Seven-segment digits that double as platforms
//!
//! Each segment runs a small transition state machine when the digit's
//! character changes. A segment's `active` flag (is it solid?) is what the
//! collision resolver sees; `alpha` is only for drawing.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::glyph::{Segment, SegmentMask, segments_for_opt};
use super::rect::Rect;
use crate::consts::*;

/// Transition phase of a single segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SegmentPhase {
    #[default]
    Off,
    /// Lit before and after the change
    Remain,
    TurningOn,
    TurningOff,
}

impl SegmentPhase {
    pub fn is_steady(self) -> bool {
        matches!(self, SegmentPhase::Off | SegmentPhase::Remain)
    }
}

/// Animation state of one segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentState {
    pub phase: SegmentPhase,
    /// Solid (acts as a platform)
    pub active: bool,
    pub alpha: u8,
    /// Seconds since the current transition started
    pub timer: f32,
    pub duration: f32,
}

impl Default for SegmentState {
    fn default() -> Self {
        Self {
            phase: SegmentPhase::Off,
            active: false,
            alpha: 0,
            timer: 0.0,
            duration: TRANSITION_DURATION,
        }
    }
}

impl SegmentState {
    /// Jump straight to the steady state for `lit`
    fn set_steady(&mut self, lit: bool) {
        self.timer = 0.0;
        if lit {
            self.phase = SegmentPhase::Remain;
            self.active = true;
            self.alpha = 255;
        } else {
            self.phase = SegmentPhase::Off;
            self.active = false;
            self.alpha = 0;
        }
    }

    /// Start a transition from `was_lit` to `now_lit`
    fn begin(&mut self, was_lit: bool, now_lit: bool) {
        self.timer = 0.0;
        let (phase, active, alpha) = match (was_lit, now_lit) {
            (true, true) => (SegmentPhase::Remain, true, 255),
            // Stays solid through the flicker
            (true, false) => (SegmentPhase::TurningOff, true, 255),
            (false, true) => (SegmentPhase::TurningOn, false, 0),
            (false, false) => (SegmentPhase::Off, false, 0),
        };
        self.phase = phase;
        self.active = active;
        self.alpha = alpha;
    }

    /// Advance by `dt`; the phase settles on `Off` or `Remain` when done
    fn advance(&mut self, dt: f32) {
        self.timer += dt;
        match self.phase {
            SegmentPhase::Remain => {
                self.alpha = 255;
                self.active = true;
            }
            SegmentPhase::Off => {
                self.alpha = 0;
                self.active = false;
            }
            SegmentPhase::TurningOff => {
                if self.timer < self.duration {
                    let flicker = (self.timer * FLICKER_RATE).sin().abs();
                    self.alpha = (255.0 * flicker) as u8;
                    self.active = true;
                } else {
                    self.phase = SegmentPhase::Off;
                    self.alpha = 0;
                    self.active = false;
                }
            }
            SegmentPhase::TurningOn => {
                if self.timer < self.duration {
                    let ratio = self.timer / self.duration;
                    self.alpha = (255.0 * ratio) as u8;
                    // Solid from the midpoint of the fade-in
                    if ratio > 0.5 {
                        self.active = true;
                    }
                } else {
                    self.phase = SegmentPhase::Remain;
                    self.alpha = 255;
                    self.active = true;
                }
            }
        }
    }
}

/// Final-stage choreography tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DigitGroup {
    /// Hidden at start, revealed when the player climbs high enough
    A,
    #[default]
    B,
}

/// Per-segment collision properties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentProperties {
    pub one_way: [bool; 7],
}

impl Default for SegmentProperties {
    fn default() -> Self {
        Self {
            one_way: Segment::ALL.map(Segment::default_one_way),
        }
    }
}

impl SegmentProperties {
    #[inline]
    pub fn one_way(&self, segment: Segment) -> bool {
        self.one_way[segment.index()]
    }
}

/// A solid (or one-way) rectangle derived from a digit's active segments
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Platform {
    pub rect: Rect,
    pub one_way: bool,
    /// Segments this platform was built from (two for merged pairs)
    pub segments: SegmentMask,
}

/// A seven-segment digit placed in the world
#[derive(Debug, Clone, PartialEq)]
pub struct Digit {
    pub pos: Vec2,
    pub size: Vec2,
    pub group: DigitGroup,
    /// Whole-digit visibility/solidity, independent of segment state
    pub active: bool,
    segments: [SegmentState; 7],
    character: Option<String>,
    is_transitioning: bool,
    properties: SegmentProperties,
}

impl Digit {
    pub fn new(
        pos: Vec2,
        size: Vec2,
        character: Option<&str>,
        group: DigitGroup,
        properties: SegmentProperties,
    ) -> Self {
        let mut digit = Self {
            pos,
            size,
            group,
            active: true,
            segments: [SegmentState::default(); 7],
            character: None,
            is_transitioning: false,
            properties,
        };
        digit.set_character(character);
        digit
    }

    pub fn character(&self) -> Option<&str> {
        self.character.as_deref()
    }

    pub fn is_transitioning(&self) -> bool {
        self.is_transitioning
    }

    pub fn segment(&self, segment: Segment) -> &SegmentState {
        &self.segments[segment.index()]
    }

    pub fn properties(&self) -> &SegmentProperties {
        &self.properties
    }

    /// Show `character` immediately, without animating
    pub fn set_character(&mut self, character: Option<&str>) {
        let mask = segments_for_opt(character);
        for segment in Segment::ALL {
            self.segments[segment.index()].set_steady(mask.is_lit(segment));
        }
        self.character = character.map(str::to_owned);
        self.is_transitioning = false;
    }

    /// Begin animating from the current character to `character`
    pub fn start_transition(&mut self, character: Option<&str>) {
        let old = segments_for_opt(self.character.as_deref());
        let new = segments_for_opt(character);
        for segment in Segment::ALL {
            self.segments[segment.index()].begin(old.is_lit(segment), new.is_lit(segment));
        }
        self.character = character.map(str::to_owned);
        self.is_transitioning = true;
    }

    /// Advance segment animations
    pub fn update(&mut self, dt: f32) {
        if !self.is_transitioning {
            return;
        }
        for state in &mut self.segments {
            state.advance(dt);
        }
        self.is_transitioning = self.segments.iter().any(|s| !s.phase.is_steady());
    }

    /// Layout rectangle of every segment, regardless of lit state
    pub fn segment_rects(&self) -> [Rect; 7] {
        let Vec2 { x, y } = self.pos;
        let Vec2 { x: w, y: h } = self.size;
        let thick_v = (w / VERTICAL_THICKNESS_DIV).trunc();
        let thick_h = (h / HORIZONTAL_THICKNESS_DIV).trunc();
        let bar_x = x + w * BAR_INSET;
        let bar_w = w - w * BAR_INSET * 2.0;
        let half = h / 2.0;
        let side_h = half - thick_h + 1.0;

        [
            // A
            Rect::snapped(bar_x, y, bar_w, thick_h),
            // B
            Rect::snapped(x + w - thick_v, y + thick_h, thick_v, side_h),
            // C
            Rect::snapped(x + w - thick_v, y + half - 1.0, thick_v, side_h),
            // D
            Rect::snapped(
                bar_x,
                y + h - thick_h - BOTTOM_BAR_OFFSET,
                bar_w,
                thick_h,
            ),
            // E
            Rect::snapped(x, y + half - 1.0, thick_v, side_h),
            // F
            Rect::snapped(x, y + thick_h, thick_v, side_h),
            // G
            Rect::snapped(bar_x, y + half - thick_h / 2.0, bar_w, thick_h),
        ]
    }

    /// Solid platforms for this frame.
    ///
    /// Vertically adjacent side bars (B+C, E+F) that are both active are
    /// merged into one rectangle so there is no seam to fall through.
    pub fn platforms(&self) -> Vec<Platform> {
        if !self.active {
            return Vec::new();
        }

        let rects = self.segment_rects();
        let mut out = Vec::with_capacity(5);

        for (upper, lower, flag) in [
            (Segment::B, Segment::C, Segment::B),
            (Segment::F, Segment::E, Segment::E),
        ] {
            let upper_on = self.segment(upper).active;
            let lower_on = self.segment(lower).active;
            if upper_on && lower_on {
                out.push(Platform {
                    rect: rects[upper.index()].vertical_union(&rects[lower.index()]),
                    one_way: self.properties.one_way(flag),
                    segments: SegmentMask(upper.bit() | lower.bit()),
                });
                continue;
            }
            // Emit in canonical pair order (B before C, E before F)
            let singles = if flag == upper { [upper, lower] } else { [lower, upper] };
            for segment in singles {
                if self.segment(segment).active {
                    out.push(self.single_platform(segment, &rects));
                }
            }
        }

        for segment in [Segment::A, Segment::D, Segment::G] {
            if self.segment(segment).active {
                out.push(self.single_platform(segment, &rects));
            }
        }

        out
    }

    fn single_platform(&self, segment: Segment, rects: &[Rect; 7]) -> Platform {
        Platform {
            rect: rects[segment.index()],
            one_way: self.properties.one_way(segment),
            segments: SegmentMask(segment.bit()),
        }
    }
}
