//! Timed character sequencing for a single digit

/// Advances a digit through a fixed character sequence on a timer
#[derive(Debug, Clone, PartialEq)]
pub struct DigitController {
    sequence: Vec<String>,
    index: usize,
    /// Seconds per character
    period: f64,
    /// Clock value of the last advance (or reset)
    last_tick: f64,
}

impl DigitController {
    pub fn new(sequence: Vec<String>, period: f64, now: f64) -> Self {
        Self {
            sequence,
            index: 0,
            period,
            last_tick: now,
        }
    }

    pub fn sequence(&self) -> &[String] {
        &self.sequence
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn period(&self) -> f64 {
        self.period
    }

    pub fn last_tick(&self) -> f64 {
        self.last_tick
    }

    /// Character currently shown
    pub fn current(&self) -> Option<&str> {
        self.sequence.get(self.index).map(String::as_str)
    }

    /// Advance if a full period has elapsed since the last tick.
    ///
    /// Returns `(changed, character)`; an empty sequence always yields
    /// `(false, None)` and leaves the timer alone. A change that lands on
    /// index 0 marks a completed loop.
    pub fn update(&mut self, now: f64) -> (bool, Option<&str>) {
        if self.sequence.is_empty() {
            return (false, None);
        }
        let mut changed = false;
        if now - self.last_tick >= self.period {
            self.index = (self.index + 1) % self.sequence.len();
            self.last_tick = now;
            changed = true;
        }
        (changed, self.current())
    }

    /// Back to the first character; the period is kept
    pub fn reset(&mut self, now: f64) {
        self.index = 0;
        self.last_tick = now;
    }

    /// True when the last change wrapped the sequence back to the start
    pub fn just_wrapped(&self) -> bool {
        self.index == 0 && !self.sequence.is_empty()
    }
}
