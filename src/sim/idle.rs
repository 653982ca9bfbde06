//! Seeded idle/demo input
//!
//! Produces plausible play input without a human: wander in bursts, head
//! for the nearest live key, hop now and then. Seeded so runs are
//! reproducible.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::state::GameSession;
use super::tick::TickInput;

/// Horizontal distance at which the driver stops steering toward a key
const STEER_DEADZONE: f32 = 8.0;

#[derive(Debug, Clone)]
pub struct IdleDriver {
    rng: Pcg32,
    held: TickInput,
    hold_frames: u32,
}

impl IdleDriver {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            held: TickInput::default(),
            hold_frames: 0,
        }
    }

    /// Input for the next tick of `session`
    pub fn next_input(&mut self, session: &GameSession) -> TickInput {
        if self.hold_frames == 0 {
            let (left, right) = match self.rng.random_range(0..3) {
                0 => (true, false),
                1 => (false, true),
                _ => (false, false),
            };
            self.held = TickInput {
                left,
                right,
                down: self.rng.random_bool(0.1),
                ..Default::default()
            };
            self.hold_frames = self.rng.random_range(10..40);
        }
        self.hold_frames -= 1;

        let mut input = self.held;
        let center = session.player.center();
        let target = session
            .items
            .iter()
            .filter(|item| !item.collected)
            .map(|item| item.rect())
            .min_by(|a, b| {
                let da = (a.x - center.x).abs();
                let db = (b.x - center.x).abs();
                da.total_cmp(&db)
            });
        if let Some(rect) = target {
            let dx = rect.x + rect.w / 2.0 - center.x;
            input.left = dx < -STEER_DEADZONE;
            input.right = dx > STEER_DEADZONE;
            input.down = rect.y > center.y;
        }

        // Release between presses so every jump is a fresh edge
        input.jump = !session.prev_jump && self.rng.random_bool(0.08);
        input
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::progress::Progress;
    use crate::settings::DisplayConfig;
    use crate::sim::stage::StageData;
    use crate::sim::tick::tick;

    fn sample_session() -> GameSession {
        let data = StageData::from_json(include_str!("../../stages/stage1-1.json")).unwrap();
        let display = DisplayConfig::default();
        GameSession::new(display, data.blueprint(&display), None)
    }

    #[test]
    fn test_same_seed_same_run() {
        let mut a = sample_session();
        let mut b = sample_session();
        let mut da = IdleDriver::new(7);
        let mut db = IdleDriver::new(7);
        let mut progress = Progress::in_memory();

        for _ in 0..600 {
            let ia = da.next_input(&a);
            let ib = db.next_input(&b);
            assert_eq!(ia, ib);
            tick(&mut a, &ia, SIM_DT, &mut progress);
            tick(&mut b, &ib, SIM_DT, &mut progress);
        }
        assert_eq!(a.player, b.player);
        assert_eq!(a.manager, b.manager);
        assert_eq!(a.items, b.items);
        assert_eq!(a.events, b.events);
    }

    #[test]
    fn test_never_holds_jump() {
        let mut session = sample_session();
        let mut driver = IdleDriver::new(42);
        let mut progress = Progress::in_memory();
        for _ in 0..300 {
            let input = driver.next_input(&session);
            assert!(!(input.jump && session.prev_jump));
            tick(&mut session, &input, SIM_DT, &mut progress);
        }
    }
}
