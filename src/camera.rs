//! Camera rig
//!
//! A closed set of camera angles, each with a static preset, plus a follow
//! target that tracks the chassis on the ground plane (never its height).
//! Switching angle starts a blend from the current view direction toward the
//! new preset; re-requesting the active angle leaves the blend untouched.

use std::str::FromStr;

use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::consts::CAMERA_BLEND_DURATION;
use crate::error::SceneError;
use crate::sim::tween::Ease;

/// Known camera angles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraAngle {
    /// Trailing three-quarter view used while driving around
    #[default]
    Default,
    /// Steep, almost top-down view for reading floor panels
    Projects,
}

/// Static configuration for one camera angle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPreset {
    /// Direction from the look-at point toward the eye (not normalized)
    pub direction: Vec3,
    /// Vertical field of view in degrees
    pub fov: f32,
    /// Seconds to blend into this preset
    pub blend_duration: f32,
    pub ease: Ease,
}

impl CameraAngle {
    pub const ALL: [CameraAngle; 2] = [CameraAngle::Default, CameraAngle::Projects];

    pub fn as_str(&self) -> &'static str {
        match self {
            CameraAngle::Default => "default",
            CameraAngle::Projects => "projects",
        }
    }

    /// Preset table lookup; total over the enum
    pub const fn preset(self) -> CameraPreset {
        match self {
            CameraAngle::Default => CameraPreset {
                direction: Vec3::new(1.135, -1.45, 1.15),
                fov: 40.0,
                blend_duration: CAMERA_BLEND_DURATION,
                ease: Ease::Power1InOut,
            },
            CameraAngle::Projects => CameraPreset {
                direction: Vec3::new(0.38, -1.4, 1.63),
                fov: 40.0,
                blend_duration: CAMERA_BLEND_DURATION,
                ease: Ease::Power1InOut,
            },
        }
    }
}

impl FromStr for CameraAngle {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "default" => Ok(CameraAngle::Default),
            "projects" => Ok(CameraAngle::Projects),
            _ => Err(SceneError::UnknownCameraPreset { name: s.to_string() }),
        }
    }
}

/// Rig tuning (easing is expressed per 60 Hz frame and rescaled by delta)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraTuning {
    /// Fraction of the remaining follow distance closed per 60 Hz frame
    pub follow_easing: f32,
    /// Fraction of the remaining zoom distance closed per 60 Hz frame
    pub zoom_easing: f32,
    /// Eye distance at zoom 0
    pub min_distance: f32,
    /// Extra eye distance at zoom 1
    pub zoom_amplitude: f32,
    /// Starting zoom (0..1)
    pub initial_zoom: f32,
    /// Scale applied to preset blend durations (0 = instant cuts)
    pub blend_scale: f32,
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self {
            follow_easing: 0.15,
            zoom_easing: 0.1,
            min_distance: 14.0,
            zoom_amplitude: 15.0,
            initial_zoom: 0.5,
            blend_scale: 1.0,
        }
    }
}

/// Frame-rate independent version of "move `easing` of the way each frame"
#[inline]
fn ease_factor(easing: f32, dt: f32) -> f32 {
    1.0 - (1.0 - easing.clamp(0.0, 1.0)).powf(dt * 60.0)
}

/// Where the renderer should put the camera this frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CameraPose {
    pub eye: Vec3,
    pub look_at: Vec3,
    /// Vertical field of view in degrees
    pub fov: f32,
}

impl CameraPose {
    /// World is Z-up
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.look_at, Vec3::Z)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov.to_radians(), aspect.max(1e-3), 1.0, 80.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct AngleBlend {
    from_direction: Vec3,
    from_fov: f32,
    duration: f32,
    /// 0 at the request, 1 once the preset is reached; never decreases
    progress: f32,
}

#[derive(Debug, Clone)]
pub struct CameraRig {
    tuning: CameraTuning,
    angle: CameraAngle,
    blend: AngleBlend,
    target: Vec2,
    target_eased: Vec2,
    zoom_target: f32,
    zoom: f32,
    pose: CameraPose,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::new(CameraTuning::default())
    }
}

impl CameraRig {
    pub fn new(tuning: CameraTuning) -> Self {
        let preset = CameraAngle::Default.preset();
        let zoom = tuning.initial_zoom.clamp(0.0, 1.0);
        let mut rig = Self {
            tuning,
            angle: CameraAngle::Default,
            blend: AngleBlend {
                from_direction: preset.direction,
                from_fov: preset.fov,
                duration: 0.0,
                progress: 1.0,
            },
            target: Vec2::ZERO,
            target_eased: Vec2::ZERO,
            zoom_target: zoom,
            zoom,
            pose: CameraPose {
                eye: Vec3::ZERO,
                look_at: Vec3::ZERO,
                fov: preset.fov,
            },
        };
        rig.recompute_pose();
        rig
    }

    pub fn angle(&self) -> CameraAngle {
        self.angle
    }

    pub fn blend_progress(&self) -> f32 {
        self.blend.progress
    }

    pub fn is_blending(&self) -> bool {
        self.blend.progress < 1.0
    }

    pub fn pose(&self) -> CameraPose {
        self.pose
    }

    pub fn target(&self) -> Vec2 {
        self.target
    }

    pub fn target_eased(&self) -> Vec2 {
        self.target_eased
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Request a camera angle; returns false if it was already active
    pub fn set(&mut self, angle: CameraAngle) -> bool {
        if angle == self.angle {
            return false;
        }
        let preset = angle.preset();
        log::debug!("Camera angle {} -> {}", self.angle.as_str(), angle.as_str());
        self.blend = AngleBlend {
            from_direction: self.current_direction(),
            from_fov: self.current_fov(),
            duration: preset.blend_duration * self.tuning.blend_scale.max(0.0),
            progress: 0.0,
        };
        self.angle = angle;
        true
    }

    /// String boundary for config files and zone payloads
    ///
    /// Unknown names are rejected with a warning and leave the rig unchanged.
    pub fn set_named(&mut self, name: &str) -> Result<bool, SceneError> {
        match name.parse::<CameraAngle>() {
            Ok(angle) => Ok(self.set(angle)),
            Err(err) => {
                log::warn!("{err}; keeping camera angle '{}'", self.angle.as_str());
                Err(err)
            }
        }
    }

    /// Ground-plane point to follow (chassis x/y)
    pub fn set_target(&mut self, target: Vec2) {
        if target.is_finite() {
            self.target = target;
        }
    }

    /// Jump the eased follow point onto the target (spawn, respawn)
    pub fn snap_to_target(&mut self) {
        self.target_eased = self.target;
        self.recompute_pose();
    }

    /// Nudge the zoom target (scroll); 0 = closest, 1 = farthest
    pub fn zoom_by(&mut self, delta: f32) {
        if delta.is_finite() {
            self.zoom_target = (self.zoom_target + delta).clamp(0.0, 1.0);
        }
    }

    /// Advance blends and easing by `dt` seconds
    pub fn update(&mut self, dt: f32) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        if self.blend.progress < 1.0 {
            self.blend.progress = if self.blend.duration <= 0.0 {
                1.0
            } else {
                (self.blend.progress + dt / self.blend.duration).min(1.0)
            };
        }

        let k = ease_factor(self.tuning.follow_easing, dt);
        self.target_eased += (self.target - self.target_eased) * k;

        let k = ease_factor(self.tuning.zoom_easing, dt);
        self.zoom += (self.zoom_target - self.zoom) * k;

        self.recompute_pose();
    }

    fn blend_weight(&self) -> f32 {
        self.angle.preset().ease.apply(self.blend.progress)
    }

    fn current_direction(&self) -> Vec3 {
        self.blend
            .from_direction
            .lerp(self.angle.preset().direction, self.blend_weight())
    }

    fn current_fov(&self) -> f32 {
        let to = self.angle.preset().fov;
        self.blend.from_fov + (to - self.blend.from_fov) * self.blend_weight()
    }

    fn recompute_pose(&mut self) {
        let distance = self.tuning.min_distance + self.zoom * self.tuning.zoom_amplitude;
        let look_at = self.target_eased.extend(0.0);
        let direction = self.current_direction().normalize_or(Vec3::Z);
        self.pose = CameraPose {
            eye: look_at + direction * distance,
            look_at,
            fov: self.current_fov(),
        };
    }
}
