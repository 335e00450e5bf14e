//! Tact (T-state) bookkeeping shared by every CPU family.

/// Default base clock of a PAL 6510 machine, in Hz.
pub const DEFAULT_BASE_CLOCK_FREQUENCY: u32 = 985_248;

/// Default frame length: 312 raster lines of 63 tacts.
pub const DEFAULT_TACTS_IN_FRAME: u32 = 19_656;

/// Largest supported overclock factor.
pub const MAX_CLOCK_MULTIPLIER: u32 = 24;

/// Longest frame whose overclocked length still fits the frame counter.
pub const MAX_TACTS_IN_FRAME: u32 = u32::MAX / MAX_CLOCK_MULTIPLIER;

/// Monotonic cycle counter with frame tracking and a clock multiplier.
///
/// `frame_tacts` counts overclocked tacts, so a frame at multiplier `m` is
/// `tacts_in_frame * m` tacts long while `current_frame_tact()` stays in the
/// 1x range that video and audio devices synchronize against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TactClock {
    tacts: u64,
    frames: u64,
    frame_tacts: u32,
    tacts_in_frame: u32,
    clock_multiplier: u32,
    tacts_in_current_frame: u32,
    current_frame_tact: u32,
    base_clock_frequency: u32,
}

impl TactClock {
    pub fn new(tacts_in_frame: u32, base_clock_frequency: u32) -> Self {
        let tacts_in_frame = tacts_in_frame.clamp(1, MAX_TACTS_IN_FRAME);
        Self {
            tacts: 0,
            frames: 0,
            frame_tacts: 0,
            tacts_in_frame,
            clock_multiplier: 1,
            tacts_in_current_frame: tacts_in_frame,
            current_frame_tact: 0,
            base_clock_frequency,
        }
    }

    /// Total tacts since the last reset.
    #[inline]
    pub fn tacts(&self) -> u64 {
        self.tacts
    }

    /// Completed frames since the last reset.
    #[inline]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Tacts elapsed since the last frame boundary (multiplied domain).
    #[inline]
    pub fn frame_tacts(&self) -> u32 {
        self.frame_tacts
    }

    #[inline]
    pub fn tacts_in_frame(&self) -> u32 {
        self.tacts_in_frame
    }

    #[inline]
    pub fn clock_multiplier(&self) -> u32 {
        self.clock_multiplier
    }

    /// `tacts_in_frame * clock_multiplier`.
    #[inline]
    pub fn tacts_in_current_frame(&self) -> u32 {
        self.tacts_in_current_frame
    }

    /// Frame position in 1x tacts: `frame_tacts / clock_multiplier`.
    #[inline]
    pub fn current_frame_tact(&self) -> u32 {
        self.current_frame_tact
    }

    #[inline]
    pub fn base_clock_frequency(&self) -> u32 {
        self.base_clock_frequency
    }

    /// Advance the clock by `n` tacts, wrapping the frame counter as often as
    /// the increment requires.
    pub fn increment_tacts(&mut self, n: u32) {
        self.tacts += u64::from(n);
        let frame_tacts = u64::from(self.frame_tacts) + u64::from(n);
        let frame_length = u64::from(self.tacts_in_current_frame);
        self.frames += frame_tacts / frame_length;
        // Less than `tacts_in_current_frame`, so it fits.
        self.frame_tacts = (frame_tacts % frame_length) as u32;
        self.current_frame_tact = self.frame_tacts / self.clock_multiplier;
    }

    /// Change the frame length, clamped to `1..=MAX_TACTS_IN_FRAME`. Callers
    /// reject out-of-range lengths earlier through configuration validation.
    pub fn set_tacts_in_frame(&mut self, tacts: u32) {
        self.tacts_in_frame = tacts.clamp(1, MAX_TACTS_IN_FRAME);
        self.recalculate_frame();
    }

    /// Change the overclock factor, clamped to `1..=MAX_CLOCK_MULTIPLIER`.
    pub fn set_clock_multiplier(&mut self, multiplier: u32) {
        self.clock_multiplier = multiplier.clamp(1, MAX_CLOCK_MULTIPLIER);
        self.recalculate_frame();
    }

    pub fn set_base_clock_frequency(&mut self, hz: u32) {
        self.base_clock_frequency = hz;
    }

    /// Zero the counters and drop back to 1x. Frame length and base
    /// frequency are machine settings and survive.
    pub fn reset(&mut self) {
        self.tacts = 0;
        self.frames = 0;
        self.frame_tacts = 0;
        self.clock_multiplier = 1;
        self.recalculate_frame();
    }

    fn recalculate_frame(&mut self) {
        self.tacts_in_current_frame = self.tacts_in_frame.saturating_mul(self.clock_multiplier);
        self.frame_tacts %= self.tacts_in_current_frame;
        self.current_frame_tact = self.frame_tacts / self.clock_multiplier;
    }
}

impl Default for TactClock {
    fn default() -> Self {
        Self::new(DEFAULT_TACTS_IN_FRAME, DEFAULT_BASE_CLOCK_FREQUENCY)
    }
}
