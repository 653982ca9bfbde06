//! Fixed timestep simulation tick
//!
//! One call per frame: stage timing, digit animation, player movement, then
//! bookkeeping. Persistence is touched only when a clear latches.

use glam::Vec2;

use super::player::PlayerInput;
use super::state::{GameEvent, GameSession, SessionPhase, Sound};
use crate::consts::STAGE_CLEAR_DISPLAY_TIME;
use crate::progress::StageProgress;

/// Input snapshot for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    /// Drop through one-way platforms
    pub down: bool,
    /// Jump key held (the press edge is derived here)
    pub jump: bool,
    /// Restart the attempt
    pub reset: bool,
}

/// Advance the session by one timestep
pub fn tick(
    session: &mut GameSession,
    input: &TickInput,
    dt: f32,
    progress: &mut dyn StageProgress,
) {
    session.clock += f64::from(dt);
    let now = session.clock;

    match session.phase {
        SessionPhase::Exited => return,
        SessionPhase::StageClear { since } => {
            if now - since >= STAGE_CLEAR_DISPLAY_TIME {
                session.phase = SessionPhase::Exited;
                log::info!("Leaving stage after clear");
            }
            return;
        }
        SessionPhase::Playing => {}
    }

    if input.reset {
        session.deaths += 1;
        session.reset();
        return;
    }

    let jump_pressed = input.jump && !session.prev_jump;
    session.prev_jump = input.jump;

    session
        .manager
        .update(now, &session.player, &mut session.items, &mut session.events);
    if session.manager.is_stage_clear() {
        session.push_clear_events();
        if let Some(id) = session.stage_id {
            progress.clear_stage(id.world, id.stage);
        }
        session.phase = SessionPhase::StageClear { since: now };
        return;
    }

    for digit in session.manager.digits_mut() {
        digit.update(dt);
    }

    let platforms = session.manager.platforms();
    let bounds = session.manager.bounds();
    let player_input = PlayerInput {
        left: input.left,
        right: input.right,
        down: input.down,
        jump_pressed,
    };
    let step = session.player.update(
        dt,
        &player_input,
        &platforms,
        &bounds,
        &mut session.items,
        &mut session.manager,
        &mut session.events,
    );

    if step.fell_out {
        // Fall death restarts the attempt on the spot
        session.deaths += 1;
        session.reset();
        session.events.push(GameEvent::Sound(Sound::Hit));
        return;
    }

    session.items.retain(|item| !item.collected);

    let viewport = Vec2::new(session.display.width, session.display.height);
    session.camera.follow(session.player.center(), viewport, dt);
}
