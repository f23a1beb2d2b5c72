//! Scene settings and preferences
//!
//! Loaded from a JSON file next to the binary; every field has a default so
//! partial files are fine.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::camera::CameraTuning;
use crate::error::SceneError;
use crate::sections::{SectionSpec, default_layout};
use crate::sim::physics::PhysicsTuning;
use crate::sim::vehicle::VehicleTuning;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    /// Whether the screen-space blur passes run at all
    pub fn blur_enabled(&self) -> bool {
        match self {
            QualityPreset::Low => false,
            QualityPreset::Medium => true,
            QualityPreset::High => true,
        }
    }
}

impl FromStr for QualityPreset {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(QualityPreset::Low),
            "medium" | "med" => Ok(QualityPreset::Medium),
            "high" => Ok(QualityPreset::High),
            _ => Err(SceneError::UnknownQualityPreset { name: s.to_string() }),
        }
    }
}

/// Scene settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Platform ===
    /// Touch device (no blur, pointer interaction)
    pub touch: bool,
    /// Extra setup diagnostics
    pub debug: bool,

    // === Accessibility ===
    /// Reduced motion (camera cuts and instant fades)
    pub reduced_motion: bool,

    // === Visual Effects ===
    /// Baseline blur strength (horizontal, vertical)
    pub blur_strength: [f32; 2],

    // === Simulation ===
    /// Spawn point on the ground plane
    pub spawn: [f32; 2],
    /// Spawn heading (radians, 0 = +X)
    pub spawn_heading: f32,
    pub vehicle: VehicleTuning,
    pub camera: CameraTuning,
    pub physics: PhysicsTuning,

    // === Layout ===
    pub sections: Vec<SectionSpec>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,

            touch: false,
            debug: false,

            reduced_motion: false,

            blur_strength: [1.0, 1.0],

            // Facing +Y, into the section row
            spawn: [0.0, 0.0],
            spawn_heading: std::f32::consts::FRAC_PI_2,
            vehicle: VehicleTuning::default(),
            camera: CameraTuning::default(),
            physics: PhysicsTuning::default(),

            sections: default_layout(),
        }
    }
}

impl Settings {
    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        let mut settings = Self::default();
        settings.quality = preset;
        settings
    }

    /// Override the quality preset by name (command line, launcher)
    pub fn set_quality_named(&mut self, name: &str) -> Result<(), SceneError> {
        self.quality = name.parse()?;
        log::info!("Quality preset {}", self.quality.as_str());
        Ok(())
    }

    /// Blur baseline after quality and touch are taken into account
    pub fn effective_blur_baseline(&self) -> Vec2 {
        if self.touch || !self.quality.blur_enabled() {
            return Vec2::ZERO;
        }
        let [x, y] = self.blur_strength;
        let strength = Vec2::new(x, y);
        if strength.is_finite() {
            strength.max(Vec2::ZERO)
        } else {
            Vec2::ONE
        }
    }

    /// Multiplier for tween durations (respects reduced_motion)
    pub fn effective_duration_scale(&self) -> f32 {
        if self.reduced_motion { 0.0 } else { 1.0 }
    }

    /// Camera tuning with reduced_motion applied to angle blends
    pub fn effective_camera(&self) -> CameraTuning {
        CameraTuning {
            blend_scale: self.camera.blend_scale * self.effective_duration_scale(),
            ..self.camera
        }
    }

    pub fn spawn_point(&self) -> Vec2 {
        Vec2::from(self.spawn)
    }

    pub fn from_json(json: &str) -> Result<Self, SceneError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SceneError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from `path`; a missing file yields defaults
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let json = fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), SceneError> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}
