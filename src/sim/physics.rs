//! Rigid-body world: vehicle chassis, flat ground, static box obstacles
//!
//! The world is Z-up; the ground plane is XY. Each `step` clamps the frame
//! delta to `MAX_FRAME_DT` and splits it into at most `MAX_SUBSTEPS` equal
//! substeps of roughly `SIM_DT`. Forces and torques applied before a step act
//! over the whole step and are cleared afterwards.

use glam::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::rect::Rect;
use crate::consts::*;
use crate::error::SceneError;

/// Small gap under which the chassis counts as touching the ground
const GROUND_EPSILON: f32 = 0.02;

/// Tunable physical parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsTuning {
    pub gravity: f32,
    pub ground_height: f32,
    /// Rate at which sideways sliding is cancelled while grounded (1/s)
    pub lateral_grip: f32,
    /// Rate at which forward rolling speed bleeds off while grounded (1/s)
    pub rolling_resistance: f32,
    /// Rate at which spin decays (1/s)
    pub angular_damping: f32,
    /// Bounciness for ground and obstacle contacts (0 = dead stop)
    pub restitution: f32,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            ground_height: 0.0,
            lateral_grip: 8.0,
            rolling_resistance: 0.4,
            angular_damping: 4.0,
            restitution: 0.2,
        }
    }
}

/// The simulated vehicle body
#[derive(Debug, Clone, PartialEq)]
pub struct ChassisBody {
    pub position: Vec3,
    pub orientation: Quat,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
    pub mass: f32,
    /// Box half-extents along local X (forward), Y (left), Z (up)
    pub half_extents: Vec3,
    force: Vec3,
    torque: Vec3,
}

impl ChassisBody {
    pub fn new(position: Vec3, yaw: f32) -> Self {
        Self {
            position,
            orientation: Quat::from_rotation_z(yaw),
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            mass: CHASSIS_MASS,
            half_extents: Vec3::new(CHASSIS_HALF_LENGTH, CHASSIS_HALF_WIDTH, CHASSIS_HALF_HEIGHT),
            force: Vec3::ZERO,
            torque: Vec3::ZERO,
        }
    }

    /// Principal moments of inertia of a solid box
    pub fn inertia(&self) -> Vec3 {
        let e = self.half_extents * 2.0;
        let k = self.mass / 12.0;
        Vec3::new(
            k * (e.y * e.y + e.z * e.z),
            k * (e.x * e.x + e.z * e.z),
            k * (e.x * e.x + e.y * e.y),
        )
    }

    /// Ground-plane footprint: center, unit forward/left axes, half extents
    pub fn footprint(&self) -> Footprint {
        let forward = crate::ground(self.orientation * Vec3::X).normalize_or(Vec2::X);
        Footprint {
            center: crate::ground(self.position),
            axes: [forward, forward.perp()],
            half_extents: self.half_extents.truncate(),
        }
    }

    /// Read-only view handed to everything outside the world
    pub fn pose(&self) -> ChassisPose {
        ChassisPose {
            position: self.position,
            orientation: self.orientation,
            linear_velocity: self.linear_velocity,
            angular_velocity: self.angular_velocity,
        }
    }
}

/// Snapshot of the chassis state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChassisPose {
    pub position: Vec3,
    pub orientation: Quat,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
}

impl ChassisPose {
    /// Position on the ground plane (height dropped)
    #[inline]
    pub fn ground_position(&self) -> Vec2 {
        crate::ground(self.position)
    }

    /// Unit vector the chassis nose points along
    #[inline]
    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::X
    }

    /// Heading angle on the ground plane (radians, 0 = +X)
    pub fn heading(&self) -> f32 {
        let f = self.forward();
        f.y.atan2(f.x)
    }

    /// Signed speed along the nose direction
    pub fn forward_speed(&self) -> f32 {
        let f = crate::ground(self.forward()).normalize_or_zero();
        crate::ground(self.linear_velocity).dot(f)
    }

    /// Speed on the ground plane
    pub fn planar_speed(&self) -> f32 {
        crate::ground(self.linear_velocity).length()
    }
}

/// Oriented rectangle the chassis covers on the ground plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Footprint {
    pub center: Vec2,
    pub axes: [Vec2; 2],
    pub half_extents: Vec2,
}

impl Footprint {
    /// Half-width of the footprint projected onto `axis`
    fn reach(&self, axis: Vec2) -> f32 {
        self.half_extents.x * self.axes[0].dot(axis).abs()
            + self.half_extents.y * self.axes[1].dot(axis).abs()
    }

    pub fn corners(&self) -> [Vec2; 4] {
        let [u, v] = self.axes;
        let (a, b) = (u * self.half_extents.x, v * self.half_extents.y);
        [
            self.center + a + b,
            self.center + a - b,
            self.center - a - b,
            self.center - a + b,
        ]
    }

    /// Smallest push (unit normal out of `rect`, depth) that separates the
    /// footprint from `rect`, or `None` when they do not overlap
    pub fn penetration(&self, rect: &Rect) -> Option<(Vec2, f32)> {
        let delta = self.center - rect.center;
        let mut best: Option<(Vec2, f32)> = None;
        for axis in [Vec2::X, Vec2::Y, self.axes[0], self.axes[1]] {
            let rect_reach =
                rect.half_extents.x * axis.x.abs() + rect.half_extents.y * axis.y.abs();
            let distance = delta.dot(axis);
            let overlap = self.reach(axis) + rect_reach - distance.abs();
            if overlap <= 0.0 {
                return None;
            }
            if best.is_none_or(|(_, depth)| overlap < depth) {
                let sign = if distance < 0.0 { -1.0 } else { 1.0 };
                best = Some((axis * sign, overlap));
            }
        }
        best
    }
}

/// Force/torque pair applied to the chassis for one step
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ForceCommand {
    pub force: Vec3,
    pub torque: Vec3,
}

#[derive(Debug, Clone)]
pub struct PhysicsWorld {
    chassis: ChassisBody,
    obstacles: Vec<Rect>,
    tuning: PhysicsTuning,
    /// Total simulated seconds
    time: f32,
    /// Total substeps integrated
    substeps: u64,
}

impl PhysicsWorld {
    /// World with the chassis dropped at `spawn` (ground coords) facing `yaw`
    pub fn new(spawn: Vec2, yaw: f32, tuning: PhysicsTuning) -> Self {
        let chassis = ChassisBody::new(
            crate::lift(spawn, tuning.ground_height + CHASSIS_SPAWN_HEIGHT),
            yaw,
        );
        Self {
            chassis,
            obstacles: Vec::new(),
            tuning,
            time: 0.0,
            substeps: 0,
        }
    }

    /// Register a static box collider on the ground plane
    pub fn add_obstacle(&mut self, rect: Rect) -> Result<(), SceneError> {
        rect.validate()?;
        log::debug!(
            "Obstacle at ({:.1}, {:.1}) half extents ({:.1}, {:.1})",
            rect.center.x,
            rect.center.y,
            rect.half_extents.x,
            rect.half_extents.y
        );
        self.obstacles.push(rect);
        Ok(())
    }

    pub fn obstacles(&self) -> &[Rect] {
        &self.obstacles
    }

    pub fn chassis_pose(&self) -> ChassisPose {
        self.chassis.pose()
    }

    pub fn chassis(&self) -> &ChassisBody {
        &self.chassis
    }

    pub fn tuning(&self) -> &PhysicsTuning {
        &self.tuning
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn substeps(&self) -> u64 {
        self.substeps
    }

    /// Teleport the chassis (respawn), clearing all motion
    pub fn reset_chassis(&mut self, spawn: Vec2, yaw: f32) {
        let mass = self.chassis.mass;
        self.chassis = ChassisBody::new(
            crate::lift(spawn, self.tuning.ground_height + CHASSIS_SPAWN_HEIGHT),
            yaw,
        );
        self.chassis.mass = mass;
    }

    /// Accumulate a force/torque command for the next step
    pub fn apply(&mut self, command: ForceCommand) {
        if !command.force.is_finite() || !command.torque.is_finite() {
            log::warn!("Ignoring non-finite force command {:?}", command);
            return;
        }
        self.chassis.force += command.force;
        self.chassis.torque += command.torque;
    }

    /// Drop pending forces without stepping (the frame's step was skipped)
    pub fn clear_forces(&mut self) {
        self.chassis.force = Vec3::ZERO;
        self.chassis.torque = Vec3::ZERO;
    }

    /// Advance the world by `dt` seconds (clamped)
    ///
    /// Non-positive or non-finite `dt` leaves every body untouched.
    pub fn step(&mut self, dt: f32) -> Result<(), SceneError> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(SceneError::InvalidTimestep { dt });
        }

        let dt = dt.min(MAX_FRAME_DT);
        let count = ((dt / SIM_DT).ceil() as u32).clamp(1, MAX_SUBSTEPS);
        let h = dt / count as f32;

        for _ in 0..count {
            self.integrate(h);
            self.resolve_ground();
            self.resolve_obstacles();
            self.substeps += 1;
        }

        self.time += dt;
        self.clear_forces();
        Ok(())
    }

    fn is_grounded(&self) -> bool {
        let bottom = self.chassis.position.z - self.chassis.half_extents.z;
        bottom <= self.tuning.ground_height + GROUND_EPSILON
    }

    /// Semi-implicit Euler for one substep
    fn integrate(&mut self, h: f32) {
        let grounded = self.is_grounded();
        let tuning = self.tuning;
        let body = &mut self.chassis;

        let accel = body.force / body.mass + Vec3::new(0.0, 0.0, -tuning.gravity);
        body.linear_velocity += accel * h;

        if grounded {
            // Tyre model: kill sideways slide quickly, let rolling speed coast
            let forward = crate::ground(body.orientation * Vec3::X).normalize_or_zero();
            let side = forward.perp();
            let planar = crate::ground(body.linear_velocity);
            let along = planar.dot(forward) * (1.0 - tuning.rolling_resistance * h).max(0.0);
            let across = planar.dot(side) * (1.0 - tuning.lateral_grip * h).max(0.0);
            let planar = forward * along + side * across;
            body.linear_velocity = planar.extend(body.linear_velocity.z);
        }

        let angular_accel = body.torque / body.inertia();
        body.angular_velocity += angular_accel * h;
        body.angular_velocity *= (1.0 - tuning.angular_damping * h).max(0.0);

        body.position += body.linear_velocity * h;

        let w = body.angular_velocity;
        let spin = Quat::from_xyzw(w.x, w.y, w.z, 0.0) * body.orientation;
        body.orientation = (body.orientation + spin * (0.5 * h)).normalize();
    }

    fn resolve_ground(&mut self) {
        let floor = self.tuning.ground_height + self.chassis.half_extents.z;
        let restitution = self.tuning.restitution;
        let body = &mut self.chassis;
        if body.position.z > floor {
            return;
        }

        body.position.z = floor;
        if body.linear_velocity.z < 0.0 {
            body.linear_velocity.z = -body.linear_velocity.z * restitution;
        }

        // Resting on flat ground: no roll or pitch
        let forward = crate::ground(body.orientation * Vec3::X);
        let yaw = if forward.length_squared() > 1e-8 {
            forward.y.atan2(forward.x)
        } else {
            0.0
        };
        body.orientation = Quat::from_rotation_z(yaw);
        body.angular_velocity.x = 0.0;
        body.angular_velocity.y = 0.0;
    }

    /// Push the chassis footprint out of static boxes
    fn resolve_obstacles(&mut self) {
        let restitution = self.tuning.restitution;

        for rect in &self.obstacles {
            let body = &mut self.chassis;
            let Some((normal, depth)) = body.footprint().penetration(rect) else {
                continue;
            };

            body.position.x += normal.x * depth;
            body.position.y += normal.y * depth;

            let planar = crate::ground(body.linear_velocity);
            let vn = planar.dot(normal);
            if vn < 0.0 {
                let planar = planar - normal * vn * (1.0 + restitution);
                body.linear_velocity.x = planar.x;
                body.linear_velocity.y = planar.y;
            }
        }
    }
}
