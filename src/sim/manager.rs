//! Stage timing and progression
//!
//! `StageManager` drives every digit controller, schedules key spawns,
//! expires keys, detects the clear condition and runs the final-stage
//! reveal. Items themselves live in the session; the manager spawns into
//! and expires from the list it is handed each frame.

use super::controller::DigitController;
use super::digit::{Digit, DigitGroup, Platform};
use super::item::{Item, ItemKind, KeyCollector};
use super::player::{Player, WorldBounds};
use super::stage::{FinalStage, SpawnBlueprint, StageBlueprint};
use super::state::{GameEvent, Sound};
use crate::consts::{CLEAR_LANDED_SPEED, CUE_FRACTIONS, GAME_CLEAR_DELAY};

/// Runtime bookkeeping for one scheduled spawn
#[derive(Debug, Clone, Copy, PartialEq)]
struct SpawnSlot {
    spawn: SpawnBlueprint,
    /// Scheduled appearance time once armed
    spawn_at: Option<f64>,
    /// Already spawned this loop
    spawned: bool,
}

impl SpawnSlot {
    fn new(spawn: &SpawnBlueprint) -> Self {
        Self {
            spawn: *spawn,
            spawn_at: None,
            spawned: false,
        }
    }

    fn is_idle(&self) -> bool {
        self.spawn_at.is_none() && !self.spawned
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StageManager {
    blueprint: StageBlueprint,
    digits: Vec<Digit>,
    controllers: Vec<DigitController>,
    slots: Vec<SpawnSlot>,
    next_item_id: u32,
    consecutive_keys: u32,
    clear_timer_start: Option<f64>,
    is_stage_clear: bool,
    current_loop: u32,
    current_sequence_index: usize,
    cycle_start: f64,
    cue_fired: [bool; 3],
    group_a_revealed: bool,
    group_b_removed: bool,
}

impl StageManager {
    pub fn new(blueprint: StageBlueprint, now: f64) -> Self {
        let mut manager = Self {
            blueprint,
            digits: Vec::new(),
            controllers: Vec::new(),
            slots: Vec::new(),
            next_item_id: 1,
            consecutive_keys: 0,
            clear_timer_start: None,
            is_stage_clear: false,
            current_loop: 1,
            current_sequence_index: 1,
            cycle_start: now,
            cue_fired: [false; 3],
            group_a_revealed: false,
            group_b_removed: false,
        };
        manager.reset(now);
        manager
    }

    /// Rebuild all runtime state from the blueprint
    pub fn reset(&mut self, now: f64) {
        let bp = &self.blueprint;
        self.digits = bp.digits.iter().map(|d| d.instantiate(bp.properties)).collect();
        self.controllers = bp.digits.iter().map(|d| d.controller(now)).collect();
        self.slots = bp.spawns.iter().map(SpawnSlot::new).collect();
        self.next_item_id = 1;
        self.consecutive_keys = 0;
        self.clear_timer_start = None;
        self.is_stage_clear = false;
        self.current_loop = 1;
        self.current_sequence_index = 1;
        self.cycle_start = now;
        self.cue_fired = [false; 3];
        self.group_a_revealed = false;
        self.group_b_removed = false;
    }

    pub fn blueprint(&self) -> &StageBlueprint {
        &self.blueprint
    }

    pub fn digits(&self) -> &[Digit] {
        &self.digits
    }

    pub fn digits_mut(&mut self) -> &mut [Digit] {
        &mut self.digits
    }

    pub fn controllers(&self) -> &[DigitController] {
        &self.controllers
    }

    /// Platforms of every active digit, in stage order
    pub fn platforms(&self) -> Vec<Platform> {
        self.digits.iter().flat_map(Digit::platforms).collect()
    }

    pub fn bounds(&self) -> WorldBounds {
        self.blueprint.bounds
    }

    pub fn consecutive_keys(&self) -> u32 {
        self.consecutive_keys
    }

    pub fn target_keys(&self) -> u32 {
        self.blueprint.target_keys
    }

    pub fn is_stage_clear(&self) -> bool {
        self.is_stage_clear
    }

    pub fn clear_timer_start(&self) -> Option<f64> {
        self.clear_timer_start
    }

    /// 1-based count of completed sequence loops plus the current one
    pub fn current_loop(&self) -> u32 {
        self.current_loop
    }

    /// 1-based sequence position of the digit that changed most recently
    pub fn current_sequence_index(&self) -> usize {
        self.current_sequence_index
    }

    /// Length of the first digit's sequence
    pub fn total_sequences(&self) -> usize {
        self.controllers.first().map_or(0, |c| c.sequence().len())
    }

    pub fn is_group_a_revealed(&self) -> bool {
        self.group_a_revealed
    }

    pub fn is_group_b_removed(&self) -> bool {
        self.group_b_removed
    }

    /// Advance stage timing for the frame at clock `now`.
    ///
    /// Does nothing once the stage is clear.
    pub fn update(
        &mut self,
        now: f64,
        player: &Player,
        items: &mut Vec<Item>,
        events: &mut Vec<GameEvent>,
    ) {
        if self.is_stage_clear {
            return;
        }
        if !self.blueprint.is_final() {
            self.update_cues(now, events);
        }
        self.advance_controllers(now);
        self.arm_initial_spawns(now);
        self.spawn_due(now, items, events);
        self.expire_keys(now, items);
        self.check_clear(now, player);
        if let Some(final_stage) = self.blueprint.final_stage {
            self.update_final_stage(final_stage, player, events);
        }
    }

    fn update_cues(&mut self, now: f64, events: &mut Vec<GameEvent>) {
        let period = self.blueprint.change_time;
        if period <= 0.0 {
            return;
        }
        let mut elapsed = now - self.cycle_start;
        if elapsed >= period {
            self.cycle_start = now;
            self.cue_fired = [false; 3];
            elapsed = 0.0;
        }
        let remaining = period - elapsed;
        for (fired, fraction) in self.cue_fired.iter_mut().zip(CUE_FRACTIONS) {
            if !*fired && remaining <= period * fraction {
                *fired = true;
                events.push(GameEvent::Sound(Sound::Pi));
            }
        }
    }

    fn advance_controllers(&mut self, now: f64) {
        let mut triggers = Vec::new();
        let mut wrapped = false;
        let mut latest = None;

        for (i, (controller, digit)) in self
            .controllers
            .iter_mut()
            .zip(self.digits.iter_mut())
            .enumerate()
        {
            let (changed, character) = controller.update(now);
            if !changed {
                continue;
            }
            digit.start_transition(character);
            latest = Some(controller.index());
            if controller.just_wrapped() {
                wrapped = true;
            } else {
                triggers.push((i, controller.index()));
            }
        }

        if let Some(index) = latest {
            self.current_sequence_index = index + 1;
        }

        if wrapped {
            self.current_loop += 1;
            for slot in &mut self.slots {
                slot.spawn_at = None;
                slot.spawned = false;
            }
            log::debug!("Sequence loop {} started at t={now:.2}", self.current_loop);
        }

        for (digit_index, index) in triggers {
            for slot in &mut self.slots {
                let spawn = &slot.spawn;
                if slot.is_idle() && spawn.digit_index == digit_index && spawn.index == index {
                    slot.spawn_at = Some(now + slot.spawn.delay);
                }
            }
        }
    }

    /// Index-0 spawns arm at stage start and after each loop; final stages
    /// arm everything immediately
    fn arm_initial_spawns(&mut self, now: f64) {
        let final_stage = self.blueprint.is_final();
        let controllers = self.controllers.len();
        for slot in &mut self.slots {
            if !slot.is_idle() || slot.spawn.digit_index >= controllers {
                continue;
            }
            if final_stage {
                slot.spawn_at = Some(now);
            } else if slot.spawn.index == 0 {
                slot.spawn_at = Some(now + slot.spawn.delay);
            }
        }
    }

    fn spawn_due(&mut self, now: f64, items: &mut Vec<Item>, events: &mut Vec<GameEvent>) {
        let final_stage = self.blueprint.is_final();
        let kind = if final_stage {
            ItemKind::FinalKey
        } else {
            ItemKind::Key
        };
        let size = self.blueprint.key_size;

        for slot in &mut self.slots {
            let Some(at) = slot.spawn_at else {
                continue;
            };
            if slot.spawned || now < at {
                continue;
            }
            slot.spawned = true;
            let id = self.next_item_id;
            self.next_item_id += 1;
            items.push(Item {
                id,
                kind,
                pos: slot.spawn.pos,
                size,
                collected: false,
                spawn_time: now,
                duration: slot.spawn.lifespan,
                number: slot.spawn.number,
            });
            if !final_stage {
                events.push(GameEvent::Sound(Sound::KeySpawn));
            }
        }
    }

    /// A key that times out uncollected breaks the streak
    fn expire_keys(&mut self, now: f64, items: &mut Vec<Item>) {
        let before = items.len();
        items.retain(|item| !item.is_expired(now));
        if items.len() != before {
            self.consecutive_keys = 0;
            self.clear_timer_start = None;
            log::debug!("{} key(s) expired, streak reset", before - items.len());
        }
    }

    /// Latch the clear once the streak has been met on solid footing for
    /// `GAME_CLEAR_DELAY`.
    ///
    /// Any airborne frame restarts the wait, so the clear always lands a full
    /// delay after touching down. The session queues the clear sounds.
    fn check_clear(&mut self, now: f64, player: &Player) {
        if self.consecutive_keys < self.blueprint.target_keys {
            self.clear_timer_start = None;
            return;
        }
        let landed = player.on_ground || player.vel.y.abs() < CLEAR_LANDED_SPEED;
        if !landed {
            self.clear_timer_start = None;
            return;
        }
        let start = *self.clear_timer_start.get_or_insert(now);
        if now - start < GAME_CLEAR_DELAY {
            return;
        }

        self.is_stage_clear = true;
        self.clear_timer_start = None;
        log::info!(
            "Stage clear at t={now:.2} with {} consecutive keys",
            self.consecutive_keys
        );
    }

    fn update_final_stage(
        &mut self,
        final_stage: FinalStage,
        player: &Player,
        events: &mut Vec<GameEvent>,
    ) {
        let y = player.pos.y;

        if !self.group_a_revealed
            && let Some(threshold) = final_stage.activation_threshold
            && y < threshold
        {
            self.group_a_revealed = true;
            for digit in self.digits.iter_mut().filter(|d| d.group == DigitGroup::A) {
                digit.active = true;
            }
            events.push(GameEvent::Sound(Sound::SpawnOne));
            events.push(GameEvent::PlayMusic {
                track: "heart.mp3",
                looping: true,
            });
            log::info!("Group A digits revealed at y={y:.0}");
        }

        let revealed = self.group_a_revealed || final_stage.activation_threshold.is_none();
        if revealed
            && !self.group_b_removed
            && let Some(threshold) = final_stage.removal_threshold
            && y < threshold
        {
            self.group_b_removed = true;
            for digit in self
                .digits
                .iter_mut()
                .filter(|d| d.group == DigitGroup::B && d.pos.y > threshold)
            {
                digit.active = false;
            }
            log::info!("Group B digits below y={threshold:.0} removed");
        }
    }
}

impl KeyCollector for StageManager {
    fn increment_consecutive_keys(&mut self) {
        self.consecutive_keys += 1;
    }
}
