//! Vehicle controller: normalized input -> chassis force/torque
//!
//! Pure mapping, no camera or trigger coupling. Inputs are clamped to their
//! valid ranges (NaN becomes 0) so the control loop never stalls on bad data.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::physics::{ChassisPose, ForceCommand, PhysicsWorld};
use crate::clamp_axis;

/// Normalized driving input for one frame
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VehicleInput {
    /// -1 (full reverse) .. 1 (full forward)
    pub throttle: f32,
    /// -1 (full left) .. 1 (full right)
    pub steer: f32,
    /// 0 (off) .. 1 (full brake)
    pub brake: f32,
    /// Engine boost (shift key)
    #[serde(default)]
    pub boost: bool,
}

impl VehicleInput {
    /// Clamp every axis into range, replacing non-finite values with 0
    pub fn sanitized(&self) -> Self {
        Self {
            throttle: clamp_axis(self.throttle),
            steer: clamp_axis(self.steer),
            brake: clamp_axis(self.brake).max(0.0),
            boost: self.boost,
        }
    }

    /// True when any axis was out of range or non-finite
    pub fn is_malformed(&self) -> bool {
        self.sanitized() != *self
    }

    /// Build from digital key state (arrows / WASD)
    pub fn from_keys(up: bool, down: bool, left: bool, right: bool, brake: bool) -> Self {
        let axis = |neg: bool, pos: bool| (pos as i8 - neg as i8) as f32;
        Self {
            throttle: axis(down, up),
            steer: axis(left, right),
            brake: if brake { 1.0 } else { 0.0 },
            boost: false,
        }
    }
}

/// Controller gains
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleTuning {
    /// Forward drive force at full throttle (N)
    pub engine_force: f32,
    /// Drive force multiplier while boosting
    pub boost_multiplier: f32,
    /// Reverse drive force as a fraction of forward
    pub reverse_ratio: f32,
    /// Peak braking force (N)
    pub brake_force: f32,
    /// Yaw torque at full steer and full steering speed (N*m)
    pub steer_torque: f32,
    /// Forward speed at which steering reaches full authority (m/s)
    pub steer_full_speed: f32,
    /// Drive force is withheld above this forward speed (m/s)
    pub max_speed: f32,
}

impl Default for VehicleTuning {
    fn default() -> Self {
        Self {
            engine_force: 260.0,
            boost_multiplier: 1.6,
            reverse_ratio: 0.5,
            brake_force: 320.0,
            steer_torque: 90.0,
            steer_full_speed: 4.0,
            max_speed: 14.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct VehicleController {
    tuning: VehicleTuning,
}

impl VehicleController {
    pub fn new(tuning: VehicleTuning) -> Self {
        Self { tuning }
    }

    pub fn tuning(&self) -> &VehicleTuning {
        &self.tuning
    }

    /// Map input plus current pose to a force/torque command
    pub fn command(&self, input: &VehicleInput, pose: &ChassisPose, mass: f32) -> ForceCommand {
        let input = input.sanitized();
        let t = &self.tuning;

        let forward = crate::ground(pose.forward()).normalize_or_zero();
        let speed = pose.forward_speed();
        let mut force = Vec3::ZERO;

        // Drive
        let boost = if input.boost { t.boost_multiplier } else { 1.0 };
        let max_speed = t.max_speed * boost;
        let drive = if input.throttle >= 0.0 {
            input.throttle * t.engine_force * boost
        } else {
            input.throttle * t.engine_force * t.reverse_ratio
        };
        let over_limit = (drive > 0.0 && speed >= max_speed)
            || (drive < 0.0 && speed <= -max_speed * t.reverse_ratio);
        if !over_limit {
            force += (forward * drive).extend(0.0);
        }

        // Brake opposes planar motion; capped so a single step can only stop the car
        let planar = crate::ground(pose.linear_velocity);
        let planar_speed = planar.length();
        if input.brake > 0.0 && planar_speed > 1e-4 {
            let max_stop = planar_speed * mass / crate::consts::MAX_FRAME_DT;
            let magnitude = (input.brake * t.brake_force).min(max_stop);
            force += (-planar / planar_speed * magnitude).extend(0.0);
        }

        // Steering authority scales with speed and flips in reverse
        let authority = (speed / t.steer_full_speed).clamp(-1.0, 1.0);
        let torque = Vec3::new(0.0, 0.0, -input.steer * t.steer_torque * authority);

        ForceCommand { force, torque }
    }

    /// Compute and hand the command to the world for its next step
    pub fn drive(&self, input: &VehicleInput, world: &mut PhysicsWorld) -> ForceCommand {
        if input.is_malformed() {
            log::warn!("Clamping malformed vehicle input {:?}", input);
        }
        let command = self.command(input, &world.chassis_pose(), world.chassis().mass);
        world.apply(command);
        command
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::physics::PhysicsTuning;
    use glam::{Quat, Vec2};
    use proptest::prelude::*;

    fn pose_with_velocity(v: Vec3) -> ChassisPose {
        ChassisPose {
            position: Vec3::new(0.0, 0.0, 0.35),
            orientation: Quat::IDENTITY,
            linear_velocity: v,
            angular_velocity: Vec3::ZERO,
        }
    }

    #[test]
    fn test_sanitize() {
        let input = VehicleInput {
            throttle: 3.0,
            steer: f32::NAN,
            brake: -1.0,
            boost: false,
        };
        assert!(input.is_malformed());
        let clean = input.sanitized();
        assert_eq!(clean.throttle, 1.0);
        assert_eq!(clean.steer, 0.0);
        assert_eq!(clean.brake, 0.0);
        assert!(!clean.is_malformed());
    }

    #[test]
    fn test_from_keys() {
        let input = VehicleInput::from_keys(true, false, true, false, false);
        assert_eq!(input.throttle, 1.0);
        assert_eq!(input.steer, -1.0);
        let both = VehicleInput::from_keys(true, true, true, true, true);
        assert_eq!(both.throttle, 0.0);
        assert_eq!(both.steer, 0.0);
        assert_eq!(both.brake, 1.0);
    }

    #[test]
    fn test_throttle_pushes_along_nose() {
        let controller = VehicleController::default();
        let cmd = controller.command(
            &VehicleInput {
                throttle: 1.0,
                ..Default::default()
            },
            &pose_with_velocity(Vec3::ZERO),
            20.0,
        );
        assert!(cmd.force.x > 0.0);
        assert_eq!(cmd.force.y, 0.0);
        assert_eq!(cmd.force.z, 0.0);
    }

    #[test]
    fn test_no_drive_above_max_speed() {
        let controller = VehicleController::default();
        let fast = pose_with_velocity(Vec3::new(100.0, 0.0, 0.0));
        let cmd = controller.command(
            &VehicleInput {
                throttle: 1.0,
                ..Default::default()
            },
            &fast,
            20.0,
        );
        assert_eq!(cmd.force, Vec3::ZERO);
    }

    #[test]
    fn test_steer_needs_speed() {
        let controller = VehicleController::default();
        let input = VehicleInput {
            steer: 1.0,
            ..Default::default()
        };
        let idle = controller.command(&input, &pose_with_velocity(Vec3::ZERO), 20.0);
        assert_eq!(idle.torque.z, 0.0);

        let moving = controller.command(&input, &pose_with_velocity(Vec3::new(8.0, 0.0, 0.0)), 20.0);
        assert!(moving.torque.z < 0.0, "steering right turns clockwise");

        let reversing =
            controller.command(&input, &pose_with_velocity(Vec3::new(-8.0, 0.0, 0.0)), 20.0);
        assert!(reversing.torque.z > 0.0);
    }

    #[test]
    fn test_brake_opposes_motion_and_is_capped() {
        let controller = VehicleController::default();
        let input = VehicleInput {
            brake: 1.0,
            ..Default::default()
        };
        let cmd = controller.command(&input, &pose_with_velocity(Vec3::new(0.0, 0.1, 0.0)), 20.0);
        assert!(cmd.force.y < 0.0);
        // 0.1 m/s * 20 kg / 0.1 s = 20 N, well under the tuning's peak
        assert!((cmd.force.y + 20.0).abs() < 1e-3);

        let parked = controller.command(&input, &pose_with_velocity(Vec3::ZERO), 20.0);
        assert_eq!(parked.force, Vec3::ZERO);
    }

    #[test]
    fn test_drive_moves_chassis_forward() {
        let mut world = PhysicsWorld::new(Vec2::ZERO, 0.0, PhysicsTuning::default());
        let controller = VehicleController::default();
        let input = VehicleInput {
            throttle: 1.0,
            ..Default::default()
        };
        for _ in 0..240 {
            controller.drive(&input, &mut world);
            world.step(SIM_DT * 2.0).unwrap();
        }
        let pose = world.chassis_pose();
        assert!(pose.position.x > 5.0);
        assert!(pose.position.y.abs() < 1e-3);
    }

    proptest! {
        #[test]
        fn prop_sanitized_axes_in_range(
            throttle in proptest::num::f32::ANY,
            steer in proptest::num::f32::ANY,
            brake in proptest::num::f32::ANY,
        ) {
            let clean = VehicleInput { throttle, steer, brake, boost: false }.sanitized();
            prop_assert!((-1.0..=1.0).contains(&clean.throttle));
            prop_assert!((-1.0..=1.0).contains(&clean.steer));
            prop_assert!((0.0..=1.0).contains(&clean.brake));
        }

        #[test]
        fn prop_command_is_finite(
            throttle in proptest::num::f32::ANY,
            steer in proptest::num::f32::ANY,
            brake in proptest::num::f32::ANY,
            vx in -50.0f32..50.0,
            vy in -50.0f32..50.0,
        ) {
            let controller = VehicleController::default();
            let input = VehicleInput { throttle, steer, brake, boost: false };
            let cmd = controller.command(&input, &pose_with_velocity(Vec3::new(vx, vy, 0.0)), 20.0);
            prop_assert!(cmd.force.is_finite());
            prop_assert!(cmd.torque.is_finite());
        }
    }
}
