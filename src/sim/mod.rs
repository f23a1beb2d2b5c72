//! Deterministic scene core
//!
//! Everything that decides *what happens* each frame lives here:
//! - Clamped substepping only
//! - Stable iteration order (by registration)
//! - No rendering or platform dependencies

pub mod areas;
pub mod physics;
pub mod rect;
pub mod tween;
pub mod vehicle;
pub mod zones;

pub use areas::{Area, AreaDesc, AreaHandle, AreaId, AreaRegistry, InteractTrigger};
pub use physics::{
    ChassisBody, ChassisPose, Footprint, ForceCommand, PhysicsTuning, PhysicsWorld,
};
pub use rect::Rect;
pub use tween::{Ease, Tween};
pub use vehicle::{VehicleController, VehicleInput, VehicleTuning};
pub use zones::{Zone, ZoneDesc, ZoneEvent, ZoneHandle, ZoneId, ZoneRegistry, ZoneTransition};
