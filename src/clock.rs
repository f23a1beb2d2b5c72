//! Frame clock
//!
//! Turns host timestamps (seconds, e.g. from `requestAnimationFrame` or
//! `Instant`) into elapsed time and a frame delta. The delta is reported raw:
//! clamping against spikes is the physics world's job, so a stalled or
//! rewound host clock shows up here as a zero delta.

use crate::consts::FIRST_FRAME_DT;

/// Time information for a single frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    /// Seconds since the first tick
    pub elapsed: f32,
    /// Seconds since the previous tick
    pub delta: f32,
    /// Number of ticks so far (1 on the first tick)
    pub frame: u64,
}

#[derive(Debug, Clone, Default)]
pub struct Clock {
    start: Option<f64>,
    last: f64,
    elapsed: f32,
    delta: f32,
    frame: u64,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance to host timestamp `now` (seconds)
    pub fn tick(&mut self, now: f64) -> FrameTime {
        self.frame += 1;
        let Some(start) = self.start else {
            let now = if now.is_finite() { now } else { 0.0 };
            self.start = Some(now);
            self.last = now;
            self.delta = FIRST_FRAME_DT;
            self.elapsed = 0.0;
            return self.now();
        };

        // Non-monotonic or garbage timestamps become a zero-length frame
        if now.is_finite() && now > self.last {
            self.delta = (now - self.last) as f32;
            self.elapsed = (now - start) as f32;
            self.last = now;
        } else {
            self.delta = 0.0;
        }
        self.now()
    }

    /// Advance by a fixed delta (headless drivers, tests)
    pub fn tick_by(&mut self, dt: f32) -> FrameTime {
        let now = match self.start {
            None => 0.0,
            Some(_) => self.last + dt as f64,
        };
        self.tick(now)
    }

    /// Most recent frame time
    pub fn now(&self) -> FrameTime {
        FrameTime {
            elapsed: self.elapsed,
            delta: self.delta,
            frame: self.frame,
        }
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn delta(&self) -> f32 {
        self.delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_tick_uses_default_delta() {
        let mut clock = Clock::new();
        let t = clock.tick(100.0);
        assert_eq!(t.frame, 1);
        assert_eq!(t.elapsed, 0.0);
        assert_eq!(t.delta, FIRST_FRAME_DT);
    }

    #[test]
    fn test_delta_and_elapsed() {
        let mut clock = Clock::new();
        clock.tick(10.0);
        let t = clock.tick(10.5);
        assert!((t.delta - 0.5).abs() < 1e-6);
        assert!((t.elapsed - 0.5).abs() < 1e-6);
        let t = clock.tick(11.0);
        assert!((t.elapsed - 1.0).abs() < 1e-6);
        assert_eq!(t.frame, 3);
    }

    #[test]
    fn test_rewound_clock_gives_zero_delta() {
        let mut clock = Clock::new();
        clock.tick(5.0);
        clock.tick(6.0);
        let t = clock.tick(4.0);
        assert_eq!(t.delta, 0.0);
        assert!((t.elapsed - 1.0).abs() < 1e-6);
        // Recovers once time moves forward past the last good stamp
        let t = clock.tick(6.25);
        assert!((t.delta - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_tick_by() {
        let mut clock = Clock::new();
        clock.tick_by(0.1);
        let t = clock.tick_by(0.25);
        assert!((t.delta - 0.25).abs() < 1e-6);
        assert!((t.elapsed - 0.25).abs() < 1e-6);
    }
}
