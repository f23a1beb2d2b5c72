//! Screen-space blur intensity
//!
//! Two blur passes (horizontal, vertical) share one owner. Each axis holds a
//! single tween; every request replaces it with a new tween that starts from
//! the axis' current value, so the most recent request wins.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::sim::tween::{Ease, Tween};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlurAxis {
    Horizontal,
    Vertical,
}

/// Uniform block consumed by the blur passes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct EffectUniforms {
    /// `uStrength` of the horizontal pass (x used)
    pub horizontal: [f32; 2],
    /// `uStrength` of the vertical pass (y used)
    pub vertical: [f32; 2],
}

#[derive(Debug, Clone)]
pub struct EffectCoordinator {
    baseline: Vec2,
    horizontal: Tween,
    vertical: Tween,
    /// Multiplier on requested durations (0 = snap)
    duration_scale: f32,
}

impl Default for EffectCoordinator {
    fn default() -> Self {
        Self::new(Vec2::ONE)
    }
}

impl EffectCoordinator {
    /// Start at rest on `baseline` (x = horizontal, y = vertical strength)
    pub fn new(baseline: Vec2) -> Self {
        let baseline = if baseline.is_finite() {
            baseline.max(Vec2::ZERO)
        } else {
            Vec2::ONE
        };
        Self {
            baseline,
            horizontal: Tween::settled(baseline.x),
            vertical: Tween::settled(baseline.y),
            duration_scale: 1.0,
        }
    }

    pub fn with_duration_scale(mut self, scale: f32) -> Self {
        self.duration_scale = scale.max(0.0);
        self
    }

    pub fn baseline(&self) -> Vec2 {
        self.baseline
    }

    fn axis_mut(&mut self, axis: BlurAxis) -> &mut Tween {
        match axis {
            BlurAxis::Horizontal => &mut self.horizontal,
            BlurAxis::Vertical => &mut self.vertical,
        }
    }

    pub fn axis(&self, axis: BlurAxis) -> &Tween {
        match axis {
            BlurAxis::Horizontal => &self.horizontal,
            BlurAxis::Vertical => &self.vertical,
        }
    }

    /// Replace an axis tween: from its value at `now` toward `target`
    pub fn tween_axis(&mut self, axis: BlurAxis, target: f32, now: f32, duration: f32) {
        let duration = duration * self.duration_scale;
        let tween = self.axis_mut(axis);
        *tween = tween.retarget(now, target.max(0.0), duration).with_ease(Ease::Power1Out);
    }

    /// Fade both passes out (zone entered)
    pub fn suppress(&mut self, now: f32, duration: f32) {
        log::trace!("Blur suppress at {now:.2}s over {duration:.2}s");
        self.tween_axis(BlurAxis::Horizontal, 0.0, now, duration);
        self.tween_axis(BlurAxis::Vertical, 0.0, now, duration);
    }

    /// Fade both passes back to baseline (zone left)
    pub fn restore(&mut self, now: f32, duration: f32) {
        log::trace!("Blur restore at {now:.2}s over {duration:.2}s");
        let baseline = self.baseline;
        self.tween_axis(BlurAxis::Horizontal, baseline.x, now, duration);
        self.tween_axis(BlurAxis::Vertical, baseline.y, now, duration);
    }

    /// Strength of both axes at scene time `now`
    pub fn value_at(&self, now: f32) -> Vec2 {
        Vec2::new(self.horizontal.value_at(now), self.vertical.value_at(now))
    }

    pub fn is_settled(&self, now: f32) -> bool {
        self.horizontal.is_finished(now) && self.vertical.is_finished(now)
    }

    pub fn uniforms(&self, now: f32) -> EffectUniforms {
        let v = self.value_at(now);
        EffectUniforms {
            horizontal: [v.x, 0.0],
            vertical: [0.0, v.y],
        }
    }
}
