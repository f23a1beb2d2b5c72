//! Time-based scalar tweens
//!
//! A tween is plain data: start value, target, start time, duration, easing.
//! Its value is a pure function of the sample time, so nothing has to be
//! scheduled or cancelled. Retargeting replaces the tween with a new one that
//! starts from the value the old one had at that instant (last write wins).

use serde::{Deserialize, Serialize};

/// Easing curves (named after their usual tweening-library counterparts)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Ease {
    Linear,
    /// Quadratic ease-out (the common default)
    #[default]
    Power1Out,
    /// Quadratic ease-in-out
    Power1InOut,
    /// Cubic ease-out
    Power2Out,
}

impl Ease {
    /// Map linear progress in [0, 1] onto the curve
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::Power1Out => 1.0 - (1.0 - t) * (1.0 - t),
            Ease::Power1InOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Ease::Power2Out => 1.0 - (1.0 - t).powi(3),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tween {
    pub from: f32,
    pub to: f32,
    /// Scene time (seconds) the tween was started
    pub start: f32,
    /// Delay before the value starts moving
    pub delay: f32,
    pub duration: f32,
    pub ease: Ease,
}

impl Tween {
    /// A tween already at rest on `value`
    pub fn settled(value: f32) -> Self {
        Self {
            from: value,
            to: value,
            start: 0.0,
            delay: 0.0,
            duration: 0.0,
            ease: Ease::Linear,
        }
    }

    pub fn new(from: f32, to: f32, start: f32, duration: f32) -> Self {
        Self {
            from,
            to,
            start,
            delay: 0.0,
            duration: duration.max(0.0),
            ease: Ease::default(),
        }
    }

    pub fn with_delay(mut self, delay: f32) -> Self {
        self.delay = delay.max(0.0);
        self
    }

    pub fn with_ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    /// Linear progress in [0, 1] at scene time `now`
    pub fn progress(&self, now: f32) -> f32 {
        let local = now - self.start - self.delay;
        if local <= 0.0 {
            // Zero-length tweens snap as soon as their delay has elapsed
            if self.duration <= 0.0 && local >= 0.0 {
                return 1.0;
            }
            return 0.0;
        }
        if self.duration <= 0.0 {
            return 1.0;
        }
        (local / self.duration).min(1.0)
    }

    pub fn value_at(&self, now: f32) -> f32 {
        let k = self.ease.apply(self.progress(now));
        if k >= 1.0 {
            return self.to;
        }
        self.from + (self.to - self.from) * k
    }

    pub fn is_finished(&self, now: f32) -> bool {
        self.progress(now) >= 1.0
    }

    /// Restart toward `to` from wherever this tween is at `now`
    pub fn retarget(&self, now: f32, to: f32, duration: f32) -> Self {
        Tween::new(self.value_at(now), to, now, duration).with_ease(self.ease)
    }
}
