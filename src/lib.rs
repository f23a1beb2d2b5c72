//! Drive Scene - A vehicle-driven showcase where trigger zones steer the camera
//!
//! Core modules:
//! - `clock`: Frame time source (elapsed + raw delta; physics does the clamping)
//! - `sim`: Deterministic core (physics, vehicle control, zones, areas, tweens)
//! - `camera`: Preset-driven camera rig following the chassis
//! - `effects`: Screen-space blur intensity coordinator
//! - `sections`: Section assemblies wiring zones/areas to camera and effects
//! - `scene`: Per-frame scheduler and render snapshot
//! - `settings`: Data-driven configuration

pub mod camera;
pub mod clock;
pub mod effects;
pub mod error;
pub mod scene;
pub mod sections;
pub mod settings;
pub mod sim;

pub use camera::{CameraAngle, CameraRig};
pub use error::SceneError;
pub use scene::{FrameInput, FrameSnapshot, Scene, SceneAction};
pub use settings::{QualityPreset, Settings};

use glam::{Vec2, Vec3};

/// Scene configuration constants
pub mod consts {
    /// Physics substep length (120 Hz for stable contacts)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per step to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest frame delta the physics world will integrate (tab switches etc.)
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Delta reported by the clock on its very first tick
    pub const FIRST_FRAME_DT: f32 = 1.0 / 60.0;

    /// Gravity along -Z (world is Z-up, ground plane is XY)
    pub const GRAVITY: f32 = 9.82;

    /// Chassis box half-extents (length, width, height)
    pub const CHASSIS_HALF_LENGTH: f32 = 1.02;
    pub const CHASSIS_HALF_WIDTH: f32 = 0.58;
    pub const CHASSIS_HALF_HEIGHT: f32 = 0.35;
    /// Chassis mass (kg)
    pub const CHASSIS_MASS: f32 = 20.0;
    /// Height the chassis is dropped from at world setup
    pub const CHASSIS_SPAWN_HEIGHT: f32 = 1.2;

    /// Camera angle blend duration (seconds)
    pub const CAMERA_BLEND_DURATION: f32 = 2.0;
    /// Default screen effect tween duration (seconds)
    pub const EFFECT_TWEEN_DURATION: f32 = 2.0;
}

/// Project a world-space point onto the ground plane (drops height)
#[inline]
pub fn ground(pos: Vec3) -> Vec2 {
    pos.truncate()
}

/// Lift a ground-plane point into world space at the given height
#[inline]
pub fn lift(pos: Vec2, height: f32) -> Vec3 {
    pos.extend(height)
}

/// Replace non-finite values with zero and clamp to [-1, 1]
#[inline]
pub fn clamp_axis(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ground_drops_height() {
        let p = Vec3::new(3.0, -4.0, 12.0);
        assert_eq!(ground(p), Vec2::new(3.0, -4.0));
        assert_eq!(lift(ground(p), 1.0), Vec3::new(3.0, -4.0, 1.0));
    }

    #[test]
    fn test_clamp_axis() {
        assert_eq!(clamp_axis(0.5), 0.5);
        assert_eq!(clamp_axis(7.0), 1.0);
        assert_eq!(clamp_axis(-7.0), -1.0);
        assert_eq!(clamp_axis(f32::NAN), 0.0);
        assert_eq!(clamp_axis(f32::INFINITY), 0.0);
    }
}
