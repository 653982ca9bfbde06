//! Collectible items
//!
//! Every item is a key: an ordinary `Key`, or a `FinalKey` on final stages.
//! The two differ only in sprite and in the pickup sound (final keys are
//! silent).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rect::Rect;
use super::state::{GameEvent, Sound};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    Key,
    FinalKey,
}

impl ItemKind {
    /// Sprite asset for renderers
    pub fn sprite(self) -> &'static str {
        match self {
            ItemKind::Key => "assets/pics/key.png",
            ItemKind::FinalKey => "assets/pics/fin.png",
        }
    }

    pub fn pickup_sound(self) -> Option<Sound> {
        match self {
            ItemKind::Key => Some(Sound::Pickup),
            ItemKind::FinalKey => None,
        }
    }
}

/// Receives streak updates when a key is picked up
pub trait KeyCollector {
    fn increment_consecutive_keys(&mut self);
}

/// A spawned item in world space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: u32,
    pub kind: ItemKind,
    pub pos: Vec2,
    /// Side length of the square pickup box
    pub size: f32,
    pub collected: bool,
    /// Clock value when the item appeared
    pub spawn_time: f64,
    /// Lifetime in seconds before an uncollected item despawns
    pub duration: f64,
    pub number: u32,
}

impl Item {
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.size, self.size)
    }

    /// All current item kinds count toward the player's key total
    pub fn is_key(&self) -> bool {
        matches!(self.kind, ItemKind::Key | ItemKind::FinalKey)
    }

    pub fn is_expired(&self, now: f64) -> bool {
        !self.collected && now - self.spawn_time >= self.duration
    }

    /// Mark collected, bump the streak and queue the pickup sound
    pub fn on_collect(&mut self, collector: &mut dyn KeyCollector, events: &mut Vec<GameEvent>) {
        self.collected = true;
        collector.increment_consecutive_keys();
        if let Some(sound) = self.kind.pickup_sound() {
            events.push(GameEvent::Sound(sound));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Streak(u32);

    impl KeyCollector for Streak {
        fn increment_consecutive_keys(&mut self) {
            self.0 += 1;
        }
    }

    fn item(kind: ItemKind) -> Item {
        Item {
            id: 1,
            kind,
            pos: Vec2::new(10.0, 20.0),
            size: 46.0,
            collected: false,
            spawn_time: 1.0,
            duration: 2.0,
            number: 1,
        }
    }

    #[test]
    fn test_key_plays_pickup() {
        let mut streak = Streak::default();
        let mut events = Vec::new();
        let mut key = item(ItemKind::Key);
        key.on_collect(&mut streak, &mut events);
        assert!(key.collected);
        assert_eq!(streak.0, 1);
        assert_eq!(events, vec![GameEvent::Sound(Sound::Pickup)]);
    }

    #[test]
    fn test_final_key_is_silent() {
        let mut streak = Streak::default();
        let mut events = Vec::new();
        let mut key = item(ItemKind::FinalKey);
        key.on_collect(&mut streak, &mut events);
        assert_eq!(streak.0, 1);
        assert!(events.is_empty());
        assert_ne!(ItemKind::Key.sprite(), ItemKind::FinalKey.sprite());
    }

    #[test]
    fn test_expiry() {
        let mut key = item(ItemKind::Key);
        assert!(!key.is_expired(2.9));
        assert!(key.is_expired(3.0));
        key.collected = true;
        assert!(!key.is_expired(10.0));
    }
}
