//! Small stateful stream primitives.
//!
//! Each type holds one value and advances exactly one tick per `step` call.
//! They are plain `Copy` values so a caller can snapshot them, step a copy,
//! and commit only when every other field of the same tick is computed.

/// Latches true the first time its input is true, then never releases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StickyOr {
    latched: bool,
}

impl StickyOr {
    pub const fn new() -> Self {
        Self { latched: false }
    }

    #[inline]
    pub fn step(&mut self, input: bool) -> bool {
        self.latched |= input;
        self.latched
    }

    #[inline]
    pub fn get(&self) -> bool {
        self.latched
    }
}

/// Number of consecutive ticks the input has been true.
///
/// Saturates at `u32::MAX` instead of wrapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsecutiveCount {
    count: u32,
}

impl ConsecutiveCount {
    pub const fn new() -> Self {
        Self { count: 0 }
    }

    #[inline]
    pub fn step(&mut self, input: bool) -> u32 {
        self.count = if input {
            self.count.saturating_add(1)
        } else {
            0
        };
        self.count
    }

    #[inline]
    pub fn get(&self) -> u32 {
        self.count
    }
}

/// True once the input has held for at least `n` consecutive ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeldFor {
    counter: ConsecutiveCount,
    n: u32,
}

impl HeldFor {
    pub const fn new(n: u32) -> Self {
        Self {
            counter: ConsecutiveCount::new(),
            n,
        }
    }

    #[inline]
    pub fn step(&mut self, input: bool) -> bool {
        self.counter.step(input) >= self.n
    }
}

/// True if the input was true at least once within the last `n` ticks
/// (the current tick included).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeenWithin {
    absent: ConsecutiveCount,
    n: u32,
}

impl SeenWithin {
    pub const fn new(n: u32) -> Self {
        Self {
            absent: ConsecutiveCount::new(),
            n,
        }
    }

    #[inline]
    pub fn step(&mut self, input: bool) -> bool {
        self.absent.step(!input) < self.n
    }
}

/// Emits false, true, false, true, ... starting with false.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlternatingClock {
    next: bool,
}

impl AlternatingClock {
    pub const fn new() -> Self {
        Self { next: false }
    }

    #[inline]
    pub fn step(&mut self) -> bool {
        let out = self.next;
        self.next = !out;
        out
    }
}

/// Holds the last value sampled while the clock input was true.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleHold<T: Copy> {
    held: T,
}

impl<T: Copy> SampleHold<T> {
    /// `initial` is reported until the first sampling tick.
    pub const fn new(initial: T) -> Self {
        Self { held: initial }
    }

    #[inline]
    pub fn step(&mut self, value: T, clock: bool) -> T {
        if clock {
            self.held = value;
        }
        self.held
    }

    #[inline]
    pub fn get(&self) -> T {
        self.held
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sticky_or_latches_forever() {
        let mut s = StickyOr::new();
        let out: Vec<bool> = [false, false, true, false, false]
            .into_iter()
            .map(|i| s.step(i))
            .collect();
        assert_eq!(out, [false, false, true, true, true]);
    }

    #[test]
    fn consecutive_count_resets_on_false() {
        let mut c = ConsecutiveCount::new();
        let out: Vec<u32> = [true, true, false, true]
            .into_iter()
            .map(|i| c.step(i))
            .collect();
        assert_eq!(out, [1, 2, 0, 1]);
    }

    #[test]
    fn consecutive_count_saturates() {
        let mut c = ConsecutiveCount { count: u32::MAX - 1 };
        assert_eq!(c.step(true), u32::MAX);
        assert_eq!(c.step(true), u32::MAX);
        assert_eq!(c.step(false), 0);
    }

    #[test]
    fn held_for_needs_n_ticks() {
        let mut h = HeldFor::new(3);
        let out: Vec<bool> = [true, true, true, true, false, true]
            .into_iter()
            .map(|i| h.step(i))
            .collect();
        assert_eq!(out, [false, false, true, true, false, false]);
    }

    #[test]
    fn held_for_zero_is_always_true() {
        let mut h = HeldFor::new(0);
        assert!(h.step(false));
    }

    #[test]
    fn seen_within_window() {
        let mut s = SeenWithin::new(2);
        let out: Vec<bool> = [false, true, false, false, false]
            .into_iter()
            .map(|i| s.step(i))
            .collect();
        // One quiet tick after the event is still inside the window of 2.
        assert_eq!(out, [true, true, true, false, false]);
    }

    #[test]
    fn alternating_clock_starts_low() {
        let mut c = AlternatingClock::new();
        let out: Vec<bool> = (0..5).map(|_| c.step()).collect();
        assert_eq!(out, [false, true, false, true, false]);
    }

    #[test]
    fn sample_hold_tracks_only_on_clock() {
        let mut h = SampleHold::new(0);
        assert_eq!(h.step(5, false), 0);
        assert_eq!(h.step(6, true), 6);
        assert_eq!(h.step(7, false), 6);
        assert_eq!(h.get(), 6);
    }
}
