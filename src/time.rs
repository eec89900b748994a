//! Frame pacing and wall-clock access.
//!
//! `draw_web()` fires at display rate with uneven deltas. [`GameTime`] folds
//! those into whole simulation ticks. A delta too long to have come from a
//! normal frame (the tab was hidden, the laptop slept) is not ticked through;
//! it is handed back as a gap for the offline estimator.

/// Source of wall-clock milliseconds since the Unix epoch.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// The real clock.
pub struct WallClock;

impl Clock for WallClock {
    #[cfg(target_arch = "wasm32")]
    fn now_ms(&self) -> u64 {
        js_sys::Date::now() as u64
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn now_ms(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// What one frame should do to the simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStep {
    /// Whole ticks to run now.
    pub ticks: u32,
    /// Milliseconds skipped because the frame delta was too long.
    pub gap_ms: Option<f64>,
}

pub struct GameTime {
    ms_per_tick: f64,
    max_frame_delta: f64,
    accumulator: f64,
    pub total_ticks: u64,
    last_timestamp: Option<f64>,
}

impl GameTime {
    /// `ms_per_tick`: simulation step length. Frame deltas above
    /// `max_frame_delta` ms are reported as gaps instead of ticked.
    pub fn new(ms_per_tick: f64, max_frame_delta: f64) -> Self {
        Self {
            ms_per_tick,
            max_frame_delta,
            accumulator: 0.0,
            total_ticks: 0,
            last_timestamp: None,
        }
    }

    /// Feed a `performance.now()` timestamp. Call once per frame.
    pub fn update(&mut self, now_ms: f64) -> FrameStep {
        let delta = match self.last_timestamp {
            Some(prev) => (now_ms - prev).max(0.0),
            None => 0.0,
        };
        self.last_timestamp = Some(now_ms);

        if delta > self.max_frame_delta {
            return FrameStep { ticks: 0, gap_ms: Some(delta) };
        }

        self.accumulator += delta;
        let ticks = (self.accumulator / self.ms_per_tick) as u32;
        self.accumulator -= ticks as f64 * self.ms_per_tick;
        self.total_ticks += ticks as u64;
        FrameStep { ticks, gap_ms: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn second_ticks() -> GameTime {
        GameTime::new(1000.0, 5000.0)
    }

    #[test]
    fn first_frame_is_idle() {
        let mut gt = second_ticks();
        assert_eq!(gt.update(12_345.0), FrameStep { ticks: 0, gap_ms: None });
    }

    #[test]
    fn frames_accumulate_into_ticks() {
        let mut gt = second_ticks();
        gt.update(0.0);
        let mut total = 0;
        for i in 1..=180 {
            total += gt.update(i as f64 * 16.7).ticks;
        }
        // 180 frames * 16.7ms = 3.006s
        assert_eq!(total, 3);
        assert_eq!(gt.total_ticks, 3);
    }

    #[test]
    fn remainder_carries_to_next_frame() {
        let mut gt = second_ticks();
        gt.update(0.0);
        assert_eq!(gt.update(1500.0).ticks, 1);
        assert_eq!(gt.update(2000.0).ticks, 1);
    }

    #[test]
    fn long_delta_is_a_gap() {
        let mut gt = second_ticks();
        gt.update(0.0);
        let step = gt.update(60_000.0);
        assert_eq!(step.ticks, 0);
        assert_eq!(step.gap_ms, Some(60_000.0));
        // Pacing resumes from the new timestamp
        assert_eq!(gt.update(61_000.0).ticks, 1);
    }

    #[test]
    fn delta_at_limit_still_ticks() {
        let mut gt = second_ticks();
        gt.update(0.0);
        assert_eq!(gt.update(5000.0), FrameStep { ticks: 5, gap_ms: None });
    }

    #[test]
    fn backwards_timestamp_is_ignored() {
        let mut gt = second_ticks();
        gt.update(10_000.0);
        assert_eq!(gt.update(9_000.0).ticks, 0);
    }

    #[test]
    fn wall_clock_is_after_2020() {
        assert!(WallClock.now_ms() > 1_577_836_800_000);
    }
}
