//! The player body and its per-frame update
//!
//! Velocities are in pixels per frame; the coyote timer runs on `dt`.

use glam::Vec2;

use super::collision::{resolve_x, resolve_y};
use super::digit::Platform;
use super::item::{Item, KeyCollector};
use super::rect::Rect;
use super::state::{GameEvent, Sound};
use crate::consts::COYOTE_TIME;
use crate::settings::DisplayConfig;

/// Movement constants derived from the display resolution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerTuning {
    pub size: Vec2,
    pub run_speed: f32,
    pub jump_velocity: f32,
    pub gravity: f32,
    pub max_fall_speed: f32,
    pub coyote_time: f32,
}

impl PlayerTuning {
    pub fn from_display(display: &DisplayConfig) -> Self {
        let (w, h) = display.player_size();
        Self {
            size: Vec2::new(w, h),
            run_speed: display.run_speed(),
            jump_velocity: display.jump_velocity(),
            gravity: display.gravity(),
            max_fall_speed: display.max_fall_speed(),
            coyote_time: COYOTE_TIME,
        }
    }
}

/// Horizontal limits and the fall-death line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldBounds {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
}

impl WorldBounds {
    /// Bounds of the visible screen, used when no stage supplies its own
    pub fn screen(display: &DisplayConfig) -> Self {
        Self {
            left: 0.0,
            right: display.width,
            bottom: display.height,
        }
    }
}

/// Input snapshot for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerInput {
    pub left: bool,
    pub right: bool,
    /// Held: drop through one-way platforms
    pub down: bool,
    /// Jump pressed this frame (edge, not held)
    pub jump_pressed: bool,
}

/// What happened during a player update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlayerStep {
    pub jumped: bool,
    pub fell_out: bool,
    pub keys_collected: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub on_ground: bool,
    pub coyote_timer: f32,
    pub key_count: u32,
    pub is_game_over: bool,
    pub facing_left: bool,
    pub tuning: PlayerTuning,
}

impl Player {
    pub fn new(start: Vec2, tuning: PlayerTuning) -> Self {
        Self {
            pos: start,
            vel: Vec2::ZERO,
            on_ground: false,
            coyote_timer: 0.0,
            key_count: 0,
            is_game_over: false,
            facing_left: false,
            tuning,
        }
    }

    pub fn size(&self) -> Vec2 {
        self.tuning.size
    }

    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.tuning.size)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.tuning.size / 2.0
    }

    /// Put the player back at `start` for a new attempt (key count is kept)
    pub fn reset(&mut self, start: Vec2) {
        self.pos = start;
        self.vel.y = 0.0;
        self.on_ground = false;
        self.is_game_over = false;
        self.coyote_timer = 0.0;
    }

    /// Advance one frame: move, collide, jump, fall, pick up items.
    ///
    /// Falling below `bounds.bottom` sets `is_game_over` and returns early.
    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &mut self,
        dt: f32,
        input: &PlayerInput,
        platforms: &[Platform],
        bounds: &WorldBounds,
        items: &mut [Item],
        collector: &mut dyn KeyCollector,
        events: &mut Vec<GameEvent>,
    ) -> PlayerStep {
        let mut step = PlayerStep::default();
        let size = self.tuning.size;

        // Horizontal intent: constant speed, no acceleration
        self.vel.x = match (input.left, input.right) {
            (true, false) => {
                self.facing_left = true;
                -self.tuning.run_speed
            }
            (false, true) => {
                self.facing_left = false;
                self.tuning.run_speed
            }
            _ => 0.0,
        };

        self.pos.x += self.vel.x;
        resolve_x(&mut self.pos, size, self.vel.x, platforms);
        if self.pos.x < bounds.left {
            self.pos.x = bounds.left;
        } else if self.pos.x + size.x > bounds.right {
            self.pos.x = bounds.right - size.x;
        }

        // Coyote time
        if self.on_ground {
            self.coyote_timer = self.tuning.coyote_time;
        } else {
            self.coyote_timer = (self.coyote_timer - dt).max(0.0);
        }
        if self.coyote_timer > 0.0 && input.jump_pressed {
            self.vel.y = self.tuning.jump_velocity;
            self.on_ground = false;
            self.coyote_timer = 0.0;
            events.push(GameEvent::Sound(Sound::Jump));
            step.jumped = true;
        }

        self.vel.y = (self.vel.y + self.tuning.gravity).min(self.tuning.max_fall_speed);
        self.pos.y += self.vel.y;

        self.on_ground = false;
        let contact = resolve_y(&mut self.pos, size, &mut self.vel.y, platforms, input.down);
        if contact.grounded {
            self.on_ground = true;
            self.coyote_timer = self.tuning.coyote_time;
        }

        if self.pos.y + size.y > bounds.bottom {
            self.is_game_over = true;
            events.push(GameEvent::Sound(Sound::Miss));
            step.fell_out = true;
            return step;
        }

        let body = self.rect();
        for item in items.iter_mut() {
            if item.collected || !body.intersects(&item.rect()) {
                continue;
            }
            item.on_collect(collector, events);
            if item.is_key() {
                self.key_count += 1;
                step.keys_collected += 1;
            }
        }

        step
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::glyph::SegmentMask;
    use crate::sim::item::ItemKind;

    #[derive(Default)]
    struct Streak(u32);

    impl KeyCollector for Streak {
        fn increment_consecutive_keys(&mut self) {
            self.0 += 1;
        }
    }

    fn tuning() -> PlayerTuning {
        PlayerTuning {
            size: Vec2::new(20.0, 20.0),
            run_speed: 8.0,
            jump_velocity: -20.0,
            gravity: 1.0,
            max_fall_speed: 18.0,
            coyote_time: COYOTE_TIME,
        }
    }

    fn bounds() -> WorldBounds {
        WorldBounds {
            left: 0.0,
            right: 1000.0,
            bottom: 1000.0,
        }
    }

    fn floor() -> Platform {
        Platform {
            rect: Rect::new(0.0, 200.0, 1000.0, 40.0),
            one_way: false,
            segments: SegmentMask::EMPTY,
        }
    }

    fn step(player: &mut Player, input: PlayerInput, platforms: &[Platform]) -> PlayerStep {
        let mut streak = Streak::default();
        let mut events = Vec::new();
        player.update(
            1.0 / 60.0,
            &input,
            platforms,
            &bounds(),
            &mut [],
            &mut streak,
            &mut events,
        )
    }

    fn standing_player() -> Player {
        let mut p = Player::new(Vec2::new(100.0, 180.0), tuning());
        step(&mut p, PlayerInput::default(), &[floor()]);
        assert!(p.on_ground);
        p
    }

    #[test]
    fn test_lands_on_floor() {
        let p = standing_player();
        assert_eq!(p.pos.y, 180.0);
        assert_eq!(p.vel.y, 0.0);
        assert_eq!(p.coyote_timer, COYOTE_TIME);
    }

    #[test]
    fn test_jump_from_ground() {
        let mut p = standing_player();
        let input = PlayerInput {
            jump_pressed: true,
            ..Default::default()
        };
        let s = step(&mut p, input, &[floor()]);
        assert!(s.jumped);
        assert!(!p.on_ground);
        assert_eq!(p.vel.y, -19.0);
    }

    #[test]
    fn test_coyote_window_expires() {
        let mut p = standing_player();
        // Walk off into the air: no platforms at all
        step(&mut p, PlayerInput::default(), &[]);
        assert!(!p.on_ground);
        // Coyote timer was refilled by the grounded flag, then counts down
        let jump = PlayerInput {
            jump_pressed: true,
            ..Default::default()
        };
        for _ in 0..4 {
            step(&mut p, PlayerInput::default(), &[]);
        }
        assert_eq!(p.coyote_timer, 0.0);
        assert!(!step(&mut p, jump, &[]).jumped);
    }

    #[test]
    fn test_jump_within_coyote_window() {
        let mut p = standing_player();
        step(&mut p, PlayerInput::default(), &[]);
        assert!(p.coyote_timer > 0.0);
        let jump = PlayerInput {
            jump_pressed: true,
            ..Default::default()
        };
        assert!(step(&mut p, jump, &[]).jumped);
    }

    #[test]
    fn test_run_and_clamp() {
        let mut p = standing_player();
        p.pos.x = 4.0;
        let left = PlayerInput {
            left: true,
            ..Default::default()
        };
        step(&mut p, left, &[floor()]);
        assert_eq!(p.pos.x, 0.0);
        assert!(p.facing_left);
        assert_eq!(p.vel.x, -8.0);

        let both = PlayerInput {
            left: true,
            right: true,
            ..Default::default()
        };
        step(&mut p, both, &[floor()]);
        assert_eq!(p.vel.x, 0.0);
    }

    #[test]
    fn test_one_way_does_not_block_running() {
        let mut p = standing_player();
        let bar = Platform {
            rect: Rect::new(110.0, 170.0, 100.0, 20.0),
            one_way: true,
            segments: SegmentMask::EMPTY,
        };
        let right = PlayerInput {
            right: true,
            ..Default::default()
        };
        step(&mut p, right, &[floor(), bar]);
        assert_eq!(p.pos.x, 108.0);
    }

    #[test]
    fn test_fall_out_of_world() {
        let mut p = Player::new(Vec2::new(100.0, 985.0), tuning());
        let mut streak = Streak::default();
        let mut events = Vec::new();
        let mut items = [Item {
            id: 1,
            kind: ItemKind::Key,
            pos: Vec2::new(100.0, 985.0),
            size: 40.0,
            collected: false,
            spawn_time: 0.0,
            duration: 5.0,
            number: 1,
        }];
        let s = p.update(
            1.0 / 60.0,
            &PlayerInput::default(),
            &[],
            &bounds(),
            &mut items,
            &mut streak,
            &mut events,
        );
        assert!(s.fell_out);
        assert!(p.is_game_over);
        // Item pickup is skipped on the death frame
        assert!(!items[0].collected);
        assert_eq!(events, vec![GameEvent::Sound(Sound::Miss)]);
    }

    #[test]
    fn test_collects_keys() {
        let mut p = standing_player();
        let mut streak = Streak::default();
        let mut events = Vec::new();
        let mut items = [Item {
            id: 1,
            kind: ItemKind::FinalKey,
            pos: Vec2::new(95.0, 170.0),
            size: 30.0,
            collected: false,
            spawn_time: 0.0,
            duration: 5.0,
            number: 1,
        }];
        let s = p.update(
            1.0 / 60.0,
            &PlayerInput::default(),
            &[floor()],
            &bounds(),
            &mut items,
            &mut streak,
            &mut events,
        );
        assert_eq!(s.keys_collected, 1);
        assert_eq!(p.key_count, 1);
        assert_eq!(streak.0, 1);
        assert!(items[0].collected);
    }
}
