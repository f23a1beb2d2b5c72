//! Per-frame scheduler
//!
//! Owns every component and runs them in a fixed order each frame:
//! 1. clock tick
//! 2. vehicle controller hands its command to the physics world
//! 3. physics step (clamped, substepped)
//! 4. chassis pose read back
//! 5. zones evaluated against the fresh pose (observers touch camera,
//!    effects, areas and content)
//! 6. interaction input offered to the areas
//! 7. camera follow/zoom/blend
//! 8. snapshot for the renderer

use glam::Vec2;

use crate::camera::{CameraAngle, CameraPose, CameraRig};
use crate::clock::{Clock, FrameTime};
use crate::effects::{EffectCoordinator, EffectUniforms};
use crate::error::SceneError;
use crate::sections::{Section, SectionId, SectionSpec, Stage, ZonePayload, assemble};
use crate::settings::Settings;
use crate::sim::areas::{AreaId, AreaRegistry, InteractTrigger};
use crate::sim::physics::{ChassisPose, PhysicsWorld};
use crate::sim::rect::Rect;
use crate::sim::vehicle::{VehicleController, VehicleInput};
use crate::sim::zones::{ZoneRegistry, ZoneTransition};

pub use crate::sections::SceneAction;

/// Input gathered by the host since the previous frame
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameInput {
    pub vehicle: VehicleInput,
    /// Interaction key press or click/tap this frame
    pub interact: Option<InteractTrigger>,
    /// Scroll delta applied to the camera zoom target
    pub zoom: f32,
}

/// Per-section state the renderer needs
#[derive(Debug, Clone, PartialEq)]
pub struct SectionView {
    pub id: SectionId,
    /// Vehicle is inside the section's zone
    pub occupied: bool,
    pub area_active: bool,
    /// Opacity of each content item, in declaration order
    pub opacities: Vec<f32>,
}

/// Everything handed to render submission for one frame
#[derive(Debug, Clone)]
pub struct FrameSnapshot {
    pub time: FrameTime,
    pub chassis: ChassisPose,
    pub camera: CameraPose,
    pub camera_angle: CameraAngle,
    pub blur: Vec2,
    pub uniforms: EffectUniforms,
    /// Zone transitions fired this frame, in dispatch order
    pub transitions: Vec<ZoneTransition>,
    /// Areas that accepted this frame's interaction input
    pub interactions: Vec<AreaId>,
    pub sections: Vec<SectionView>,
}

pub struct Scene {
    clock: Clock,
    world: PhysicsWorld,
    controller: VehicleController,
    zones: ZoneRegistry<ZonePayload, Stage>,
    stage: Stage,
    sections: Vec<Section>,
    /// Outbox drained by the host
    actions: Vec<SceneAction>,
    spawn: Vec2,
    spawn_heading: f32,
    debug: bool,
}

impl Scene {
    /// Build the scene with the layout from `settings`
    pub fn new(settings: &Settings) -> Result<Self, SceneError> {
        Self::with_sections(settings, settings.sections.iter().cloned())
    }

    /// Build the scene with an explicit section layout
    pub fn with_sections(
        settings: &Settings,
        sections: impl IntoIterator<Item = SectionSpec>,
    ) -> Result<Self, SceneError> {
        let spawn = settings.spawn_point();
        let spawn = if spawn.is_finite() { spawn } else { Vec2::ZERO };
        let spawn_heading = if settings.spawn_heading.is_finite() {
            settings.spawn_heading
        } else {
            0.0
        };

        let mut camera = CameraRig::new(settings.effective_camera());
        camera.set_target(spawn);
        camera.snap_to_target();

        let effects = EffectCoordinator::new(settings.effective_blur_baseline())
            .with_duration_scale(settings.effective_duration_scale());
        let mut stage = Stage::new(camera, effects);
        stage.fade_scale = settings.effective_duration_scale();

        let mut scene = Self {
            clock: Clock::new(),
            world: PhysicsWorld::new(spawn, spawn_heading, settings.physics),
            controller: VehicleController::new(settings.vehicle),
            zones: ZoneRegistry::new(),
            stage,
            sections: Vec::new(),
            actions: Vec::new(),
            spawn,
            spawn_heading,
            debug: settings.debug,
        };
        for spec in sections {
            scene.add_section(spec)?;
        }
        log::info!(
            "Scene ready: {} sections, {} zones, {} areas, quality {}",
            scene.sections.len(),
            scene.zones.len(),
            scene.stage.areas.len(),
            settings.quality.as_str()
        );
        Ok(scene)
    }

    /// Register a section; malformed geometry fails without side effects
    pub fn add_section(&mut self, spec: SectionSpec) -> Result<SectionId, SceneError> {
        if self.debug {
            let rect = spec.zone_rect();
            log::debug!(
                "Section '{}' zone x [{:.1}, {:.1}] y [{:.1}, {:.1}]",
                spec.name,
                rect.min().x,
                rect.max().x,
                rect.min().y,
                rect.max().y
            );
        }
        let section = assemble(spec, &mut self.zones, &mut self.stage)?;
        let id = section.id;
        self.sections.push(section);
        Ok(id)
    }

    /// Static box collider (walls, props)
    pub fn add_obstacle(&mut self, rect: Rect) -> Result<(), SceneError> {
        self.world.add_obstacle(rect)
    }

    /// Run one frame at host timestamp `now` (seconds)
    pub fn frame(&mut self, now: f64, input: &FrameInput) -> FrameSnapshot {
        let time = self.clock.tick(now);
        self.advance(time, input)
    }

    /// Run one frame `dt` seconds after the previous one
    pub fn frame_by(&mut self, dt: f32, input: &FrameInput) -> FrameSnapshot {
        let time = self.clock.tick_by(dt);
        self.advance(time, input)
    }

    fn advance(&mut self, time: FrameTime, input: &FrameInput) -> FrameSnapshot {
        self.controller.drive(&input.vehicle, &mut self.world);
        if let Err(err) = self.world.step(time.delta) {
            log::warn!("Frame {}: {err}", time.frame);
            self.world.clear_forces();
        }

        let pose = self.world.chassis_pose();
        let position = pose.ground_position();

        self.stage.now = time.elapsed;
        let transitions = self.zones.update(position, &mut self.stage);
        for transition in &transitions {
            if let Some(zone) = self.zones.get(transition.zone) {
                let section = &self.sections[zone.payload().section.0];
                log::info!("{:?} '{}' at {:.2}s", transition.event, section.spec.name, time.elapsed);
            }
        }

        let interactions = match input.interact {
            Some(trigger) => self
                .stage
                .areas
                .poll_interaction(position, trigger, &mut self.actions),
            None => Vec::new(),
        };

        let camera = &mut self.stage.camera;
        camera.zoom_by(input.zoom);
        camera.set_target(position);
        camera.update(time.delta);

        let snapshot = self.snapshot(time, pose, transitions, interactions);
        log::trace!(
            "Frame {} pos ({:.2}, {:.2}) blur ({:.2}, {:.2})",
            time.frame,
            position.x,
            position.y,
            snapshot.blur.x,
            snapshot.blur.y
        );
        snapshot
    }

    fn snapshot(
        &self,
        time: FrameTime,
        chassis: ChassisPose,
        transitions: Vec<ZoneTransition>,
        interactions: Vec<AreaId>,
    ) -> FrameSnapshot {
        let now = time.elapsed;
        let sections = self
            .sections
            .iter()
            .map(|section| SectionView {
                id: section.id,
                occupied: self.zones.get(section.zone).is_some_and(|z| z.is_inside()),
                area_active: section.area.is_some_and(|a| self.stage.areas.is_active(a)),
                opacities: self.stage.contents[section.id.0].opacities(now),
            })
            .collect();

        FrameSnapshot {
            time,
            chassis,
            camera: self.stage.camera.pose(),
            camera_angle: self.stage.camera.angle(),
            blur: self.stage.effects.value_at(now),
            uniforms: self.stage.effects.uniforms(now),
            transitions,
            interactions,
            sections,
        }
    }

    /// Take every action queued since the last drain
    pub fn drain_actions(&mut self) -> Vec<SceneAction> {
        std::mem::take(&mut self.actions)
    }

    /// Camera request by name (console, config); unknown names are ignored
    pub fn request_camera(&mut self, name: &str) -> bool {
        self.stage.camera.set_named(name).unwrap_or(false)
    }

    /// Put the vehicle back on its spawn point
    pub fn respawn(&mut self) {
        log::info!("Respawning at ({:.1}, {:.1})", self.spawn.x, self.spawn.y);
        self.world.reset_chassis(self.spawn, self.spawn_heading);
        self.stage.camera.set_target(self.spawn);
        self.stage.camera.snap_to_target();
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn camera(&self) -> &CameraRig {
        &self.stage.camera
    }

    pub fn effects(&self) -> &EffectCoordinator {
        &self.stage.effects
    }

    pub fn areas(&self) -> &AreaRegistry<Vec<SceneAction>> {
        &self.stage.areas
    }

    pub fn zones(&self) -> &ZoneRegistry<ZonePayload, Stage> {
        &self.zones
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, id: SectionId) -> Option<&Section> {
        self.sections.get(id.0)
    }

    pub fn section_by_name(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.spec.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::default_layout;
    use crate::sim::zones::ZoneEvent;

    const DT: f32 = 1.0 / 60.0;

    fn forward() -> FrameInput {
        FrameInput {
            vehicle: VehicleInput {
                throttle: 1.0,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn settle(scene: &mut Scene) {
        for _ in 0..60 {
            scene.frame_by(DT, &FrameInput::default());
        }
    }

    #[test]
    fn test_default_scene_builds() {
        let scene = Scene::new(&Settings::default()).unwrap();
        assert_eq!(scene.sections().len(), 4);
        assert_eq!(scene.zones().len(), 4);
        assert_eq!(scene.areas().len(), 3);
        assert_eq!(scene.camera().angle(), CameraAngle::Default);
    }

    #[test]
    fn test_chassis_settles_outside_zones() {
        let mut scene = Scene::new(&Settings::default()).unwrap();
        settle(&mut scene);
        let snap = scene.frame_by(DT, &FrameInput::default());
        assert!(snap.sections.iter().all(|s| !s.occupied));
        assert_eq!(snap.blur, Vec2::ONE);
        assert!(snap.chassis.position.z < 0.5);
    }

    #[test]
    fn test_driving_into_research_hub() {
        let mut scene = Scene::new(&Settings::default()).unwrap();
        settle(&mut scene);
        let hub = scene.section_by_name("research_hub").unwrap().id;

        let mut entered = None;
        for _ in 0..300 {
            let snap = scene.frame_by(DT, &forward());
            if let Some(t) = snap.transitions.iter().find(|t| t.event == ZoneEvent::In) {
                entered = Some((t.zone, snap.chassis.position.y));
                break;
            }
        }
        let (zone, y) = entered.expect("vehicle never reached the zone");
        assert_eq!(zone, scene.section(hub).unwrap().zone);
        assert!(y >= 8.0 && y < 9.0, "entered at y = {y}");
        assert_eq!(scene.camera().angle(), CameraAngle::Projects);
        assert!(scene.areas().is_active(scene.section(hub).unwrap().area.unwrap()));
    }

    #[test]
    fn test_interact_reaches_outbox() {
        let mut scene = Scene::new(&Settings::default()).unwrap();
        settle(&mut scene);
        // Drive until the vehicle sits inside the hub's area (y in 15..25)
        while scene.world().chassis_pose().position.y < 17.0 {
            scene.frame_by(DT, &forward());
        }
        let press = FrameInput {
            interact: Some(InteractTrigger::Key),
            ..Default::default()
        };
        let snap = scene.frame_by(DT, &press);
        assert_eq!(snap.interactions.len(), 1);
        let actions = scene.drain_actions();
        assert!(matches!(
            actions.as_slice(),
            [SceneAction::OpenLink { name, .. }] if name == "research_hub"
        ));
        assert!(scene.drain_actions().is_empty());
    }

    #[test]
    fn test_interact_outside_areas_does_nothing() {
        let mut scene = Scene::new(&Settings::default()).unwrap();
        let press = FrameInput {
            interact: Some(InteractTrigger::Key),
            ..Default::default()
        };
        let snap = scene.frame_by(DT, &press);
        assert!(snap.interactions.is_empty());
        assert!(scene.drain_actions().is_empty());
    }

    #[test]
    fn test_invalid_delta_skips_physics() {
        let mut scene = Scene::new(&Settings::default()).unwrap();
        scene.frame_by(DT, &forward());
        let before = scene.world().chassis().clone();
        let snap = scene.frame_by(f32::NAN, &forward());
        assert_eq!(snap.time.delta, 0.0);
        assert_eq!(scene.world().chassis(), &before);

        // Forces from the skipped frame must not leak into the next step
        let mut twin = Scene::new(&Settings::default()).unwrap();
        twin.frame_by(DT, &forward());
        scene.frame_by(DT, &forward());
        twin.frame_by(DT, &forward());
        assert_eq!(scene.world().chassis_pose(), twin.world().chassis_pose());
    }

    #[test]
    fn test_bad_section_fails_setup() {
        let mut layout = default_layout();
        layout[2].zone.half_extents = Vec2::new(-1.0, 4.0);
        let err = Scene::with_sections(&Settings::default(), layout).err().unwrap();
        assert!(matches!(err, SceneError::MalformedTriggerGeometry { .. }));
    }

    #[test]
    fn test_request_camera_by_name() {
        let mut scene = Scene::with_sections(&Settings::default(), Vec::new()).unwrap();
        assert!(scene.request_camera("projects"));
        assert!(!scene.request_camera("projects"));
        assert!(!scene.request_camera("orbit"));
        assert_eq!(scene.camera().angle(), CameraAngle::Projects);
    }

    #[test]
    fn test_reduced_motion_snaps_everything() {
        let settings = Settings {
            reduced_motion: true,
            ..Settings::default()
        };
        let mut scene = Scene::with_sections(
            &settings,
            [SectionSpec::research_hub(Vec2::new(0.0, 20.0))],
        )
        .unwrap();
        scene.frame_by(DT, &FrameInput::default());
        scene.respawn();
        let mut snap = scene.frame_by(DT, &FrameInput::default());
        for _ in 0..600 {
            snap = scene.frame_by(DT, &forward());
            if !snap.transitions.is_empty() {
                break;
            }
        }
        assert_eq!(snap.blur, Vec2::ZERO);
        assert!(!scene.camera().is_blending());
        assert!(snap.sections[0].opacities.iter().all(|&o| o == 1.0));
    }

    #[test]
    fn test_touch_runs_without_blur() {
        let settings = Settings {
            touch: true,
            ..Settings::default()
        };
        let mut scene = Scene::new(&settings).unwrap();
        let snap = scene.frame_by(DT, &FrameInput::default());
        assert_eq!(snap.blur, Vec2::ZERO);
        assert_eq!(snap.uniforms.horizontal, [0.0, 0.0]);
    }

    #[test]
    fn test_respawn_resets_chassis() {
        let mut scene = Scene::new(&Settings::default()).unwrap();
        for _ in 0..60 {
            scene.frame_by(DT, &forward());
        }
        scene.respawn();
        let pose = scene.world().chassis_pose();
        assert_eq!(pose.ground_position(), Vec2::ZERO);
        assert_eq!(pose.linear_velocity, glam::Vec3::ZERO);
        assert_eq!(scene.camera().target_eased(), Vec2::ZERO);
    }
}
