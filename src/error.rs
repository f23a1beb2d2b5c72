//! Error taxonomy
//!
//! Runtime-loop errors (`InvalidTimestep`, `UnknownCameraPreset`) are logged
//! and swallowed by the scheduler. Setup errors (`MalformedTriggerGeometry`,
//! unknown quality names, settings I/O) propagate to the caller.

use glam::Vec2;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SceneError {
    /// Physics step requested with a non-positive or non-finite delta.
    #[error("invalid timestep {dt}: physics step skipped")]
    InvalidTimestep { dt: f32 },

    /// A camera angle name that has no entry in the preset table.
    #[error("unknown camera preset '{name}'")]
    UnknownCameraPreset { name: String },

    /// A quality preset name that is not Low, Medium or High.
    #[error("unknown quality preset '{name}'")]
    UnknownQualityPreset { name: String },

    /// Zone/area rectangle with zero, negative or non-finite extents.
    #[error("malformed trigger geometry: center {center}, half extents {half_extents}")]
    MalformedTriggerGeometry { center: Vec2, half_extents: Vec2 },

    #[error("settings I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings JSON invalid: {0}")]
    Json(#[from] serde_json::Error),
}

impl SceneError {
    /// True for errors the frame loop recovers from on its own
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SceneError::InvalidTimestep { .. } | SceneError::UnknownCameraPreset { .. }
        )
    }
}
