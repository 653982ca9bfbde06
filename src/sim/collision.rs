//! Axis-separated collision resolution against digit platforms
//!
//! X is moved and resolved first, then Y. One-way platforms never take part
//! in X resolution; in Y they only catch a body that is falling onto them
//! from above. Holding down drops through one-way platforms entirely.

use glam::Vec2;

use super::digit::Platform;
use super::rect::Rect;

/// Outcome of Y resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct YContact {
    /// Landed on top of a platform this step
    pub grounded: bool,
    /// Hit a ceiling this step
    pub bumped: bool,
}

/// Push the body out of solid platforms along X.
///
/// `vel_x` is the movement just applied; with no horizontal movement there
/// is no push direction and overlaps are left alone.
pub fn resolve_x(pos: &mut Vec2, size: Vec2, vel_x: f32, platforms: &[Platform]) {
    let mut body = Rect::from_pos_size(*pos, size);
    for platform in platforms {
        // Step-up bars never block sideways, whether or not down is held
        if platform.one_way {
            continue;
        }
        if !body.intersects(&platform.rect) {
            continue;
        }
        if vel_x > 0.0 {
            pos.x = platform.rect.left() - size.x;
        } else if vel_x < 0.0 {
            pos.x = platform.rect.right();
        }
        body = Rect::from_pos_size(*pos, size);
    }
}

/// Resolve the body against platforms along Y after moving by `vel_y`.
///
/// Zeroes `vel_y` on any contact.
pub fn resolve_y(
    pos: &mut Vec2,
    size: Vec2,
    vel_y: &mut f32,
    platforms: &[Platform],
    drop_through: bool,
) -> YContact {
    let mut contact = YContact::default();
    let step = *vel_y;
    let falling = step > 0.0;
    // Bottom edge before this step's move
    let prev_bottom = pos.y + size.y - step;
    let mut body = Rect::from_pos_size(*pos, size);

    for platform in platforms {
        if platform.one_way && drop_through {
            continue;
        }
        if !body.intersects(&platform.rect) {
            continue;
        }
        let top = platform.rect.top();

        if platform.one_way {
            // Only catch a body coming down from above the top edge
            if falling && prev_bottom <= top {
                pos.y = top - size.y;
                *vel_y = 0.0;
                contact.grounded = true;
            }
        } else if falling {
            pos.y = top - size.y;
            *vel_y = 0.0;
            contact.grounded = true;
        } else {
            pos.y = platform.rect.bottom();
            *vel_y = 0.0;
            contact.bumped = true;
        }
        body = Rect::from_pos_size(*pos, size);
    }

    contact
}
