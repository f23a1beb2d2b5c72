//! Section assemblies
//!
//! A section is a patch of floor content with exactly one zone and at most
//! one interaction area. Entering the zone switches the camera angle, fades
//! the blur passes out, activates the area and fades the section's content
//! in. Leaving reverts the camera to `Default`, restores the blur and
//! deactivates the area. Content stays visible after leaving.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::camera::{CameraAngle, CameraRig};
use crate::consts::EFFECT_TWEEN_DURATION;
use crate::effects::EffectCoordinator;
use crate::error::SceneError;
use crate::sim::areas::{AreaDesc, AreaId, AreaRegistry};
use crate::sim::rect::Rect;
use crate::sim::tween::{Ease, Tween};
use crate::sim::zones::{ZoneDesc, ZoneEvent, ZoneId, ZoneRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SectionId(pub usize);

/// Requests the core hands to the host (it never performs I/O itself)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SceneAction {
    /// A section's interaction area was used
    OpenLink {
        section: SectionId,
        name: String,
        link: Option<String>,
    },
}

/// Zone payload: which section it belongs to and the angle it asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZonePayload {
    pub section: SectionId,
    pub camera: CameraAngle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneSpec {
    /// Zone center relative to the section origin
    #[serde(default)]
    pub offset: Vec2,
    pub half_extents: Vec2,
    #[serde(default)]
    pub camera: CameraAngle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaSpec {
    #[serde(default)]
    pub offset: Vec2,
    pub half_extents: Vec2,
    #[serde(default)]
    pub requires_key: bool,
    #[serde(default = "default_true")]
    pub test_vehicle: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItemSpec {
    pub label: String,
    /// Seconds after zone entry before this item starts fading in
    #[serde(default)]
    pub delay: f32,
    #[serde(default)]
    pub ease: Ease,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionSpec {
    pub name: String,
    pub origin: Vec2,
    pub zone: ZoneSpec,
    #[serde(default)]
    pub area: Option<AreaSpec>,
    /// Blur fade duration on entry/exit
    #[serde(default = "default_effect_duration")]
    pub effect_duration: f32,
    /// Content fade-in duration
    #[serde(default = "default_fade_duration")]
    pub fade_duration: f32,
    #[serde(default)]
    pub content: Vec<ContentItemSpec>,
    #[serde(default)]
    pub link: Option<String>,
}

fn default_effect_duration() -> f32 {
    EFFECT_TWEEN_DURATION
}

fn default_fade_duration() -> f32 {
    1.0
}

/// Items revealed `step` seconds apart
fn staggered(labels: &[&str], step: f32) -> Vec<ContentItemSpec> {
    labels
        .iter()
        .enumerate()
        .map(|(i, label)| ContentItemSpec {
            label: label.to_string(),
            delay: i as f32 * step,
            ease: Ease::default(),
        })
        .collect()
}

impl SectionSpec {
    pub fn zone_rect(&self) -> Rect {
        Rect {
            center: self.origin + self.zone.offset,
            half_extents: self.zone.half_extents,
        }
    }

    pub fn area_desc(&self) -> Option<AreaDesc> {
        self.area.as_ref().map(|area| AreaDesc {
            rect: Rect {
                center: self.origin + area.offset,
                half_extents: area.half_extents,
            },
            requires_key: area.requires_key,
            test_vehicle: area.test_vehicle,
            active: false,
        })
    }

    /// Proposal intro: zone sits 15 units before the panel, no area
    pub fn proposal_intro(origin: Vec2) -> Self {
        Self {
            name: "proposal_intro".into(),
            origin,
            zone: ZoneSpec {
                offset: Vec2::new(0.0, -15.0),
                half_extents: Vec2::new(10.0, 8.0),
                camera: CameraAngle::Projects,
            },
            area: None,
            effect_duration: 2.0,
            fade_duration: 1.0,
            content: staggered(&["title", "body"], 0.2),
            link: None,
        }
    }

    pub fn research_hub(origin: Vec2) -> Self {
        Self {
            name: "research_hub".into(),
            origin,
            zone: ZoneSpec {
                offset: Vec2::ZERO,
                half_extents: Vec2::new(12.0, 12.0),
                camera: CameraAngle::Projects,
            },
            area: Some(AreaSpec {
                offset: Vec2::ZERO,
                half_extents: Vec2::new(8.0, 5.0),
                requires_key: false,
                test_vehicle: true,
            }),
            effect_duration: 2.0,
            fade_duration: 1.0,
            content: staggered(&["title", "subtitle", "body", "cta"], 0.1),
            link: None,
        }
    }

    pub fn project_aims(origin: Vec2) -> Self {
        Self {
            name: "project_aims".into(),
            origin,
            zone: ZoneSpec {
                offset: Vec2::ZERO,
                half_extents: Vec2::new(14.0, 14.0),
                camera: CameraAngle::Projects,
            },
            area: Some(AreaSpec {
                offset: Vec2::ZERO,
                half_extents: Vec2::new(9.0, 6.0),
                requires_key: false,
                test_vehicle: true,
            }),
            effect_duration: 2.0,
            fade_duration: 0.8,
            content: staggered(&["title", "label", "body", "quote", "cta"], 0.1),
            link: None,
        }
    }

    pub fn live_analyser(origin: Vec2) -> Self {
        let mut content = staggered(&["title", "subtitle", "body", "warning", "cta"], 0.1);
        // Title lands first and harder, the rest trail behind it
        content[0].ease = Ease::Power2Out;
        for item in content.iter_mut().skip(1) {
            item.delay += 0.05;
        }
        Self {
            name: "live_analyser".into(),
            origin,
            zone: ZoneSpec {
                offset: Vec2::ZERO,
                half_extents: Vec2::new(16.0, 16.0),
                camera: CameraAngle::Projects,
            },
            area: Some(AreaSpec {
                offset: Vec2::ZERO,
                half_extents: Vec2::new(10.0, 7.0),
                requires_key: false,
                test_vehicle: true,
            }),
            effect_duration: 2.5,
            fade_duration: 1.0,
            content,
            link: None,
        }
    }
}

/// The stock layout: four sections strung out ahead of the spawn point
pub fn default_layout() -> Vec<SectionSpec> {
    vec![
        SectionSpec::proposal_intro(Vec2::new(0.0, -10.0)),
        SectionSpec::research_hub(Vec2::new(0.0, 20.0)),
        SectionSpec::project_aims(Vec2::new(40.0, 20.0)),
        SectionSpec::live_analyser(Vec2::new(0.0, 60.0)),
    ]
}

/// One fading piece of section content
#[derive(Debug, Clone)]
pub struct ContentItem {
    pub label: String,
    opacity: Tween,
    delay: f32,
    ease: Ease,
}

impl ContentItem {
    pub fn opacity_at(&self, now: f32) -> f32 {
        self.opacity.value_at(now)
    }
}

/// Visibility state of a section's content
#[derive(Debug, Clone)]
pub struct SectionContent {
    items: Vec<ContentItem>,
    fade_duration: f32,
}

impl SectionContent {
    pub fn new(spec: &SectionSpec) -> Self {
        Self {
            items: spec
                .content
                .iter()
                .map(|item| ContentItem {
                    label: item.label.clone(),
                    opacity: Tween::settled(1.0),
                    delay: item.delay.max(0.0),
                    ease: item.ease,
                })
                .collect(),
            fade_duration: if spec.fade_duration.is_finite() {
                spec.fade_duration.max(0.0)
            } else {
                default_fade_duration()
            },
        }
    }

    /// Restart the staggered fade-in from transparent
    pub fn reveal(&mut self, now: f32, duration_scale: f32) {
        let scale = duration_scale.max(0.0);
        for item in &mut self.items {
            item.opacity = Tween::new(0.0, 1.0, now, self.fade_duration * scale)
                .with_delay(item.delay * scale)
                .with_ease(item.ease);
        }
    }

    pub fn items(&self) -> &[ContentItem] {
        &self.items
    }

    pub fn opacities(&self, now: f32) -> Vec<f32> {
        self.items.iter().map(|item| item.opacity_at(now)).collect()
    }
}

/// Everything zone observers are allowed to touch
#[derive(Debug)]
pub struct Stage {
    /// Scene time of the frame being dispatched
    pub now: f32,
    /// Duration multiplier for content fades (0 = instant)
    pub fade_scale: f32,
    pub camera: CameraRig,
    pub effects: EffectCoordinator,
    pub areas: AreaRegistry<Vec<SceneAction>>,
    pub contents: Vec<SectionContent>,
}

impl Stage {
    pub fn new(camera: CameraRig, effects: EffectCoordinator) -> Self {
        Self {
            now: 0.0,
            fade_scale: 1.0,
            camera,
            effects,
            areas: AreaRegistry::new(),
            contents: Vec::new(),
        }
    }
}

/// A wired-up section
#[derive(Debug, Clone)]
pub struct Section {
    pub id: SectionId,
    pub spec: SectionSpec,
    pub zone: ZoneId,
    pub area: Option<AreaId>,
}

/// Register a section's zone and area and hook up its reactions
///
/// The section id is the index of its content in `stage.contents`.
pub fn assemble(
    spec: SectionSpec,
    zones: &mut ZoneRegistry<ZonePayload, Stage>,
    stage: &mut Stage,
) -> Result<Section, SceneError> {
    // Validate everything before registering anything
    let zone_rect = spec.zone_rect();
    zone_rect.validate()?;
    let area_desc = spec.area_desc();
    if let Some(desc) = &area_desc {
        desc.rect.validate()?;
    }
    if !spec.effect_duration.is_finite() || !spec.fade_duration.is_finite() {
        log::warn!("Section '{}' has non-finite durations, using defaults", spec.name);
    }
    let effect_duration = if spec.effect_duration.is_finite() {
        spec.effect_duration.max(0.0)
    } else {
        EFFECT_TWEEN_DURATION
    };

    let id = SectionId(stage.contents.len());
    let area = match area_desc {
        Some(desc) => {
            let name = spec.name.clone();
            let link = spec.link.clone();
            let handle = stage.areas.add(desc)?.on_interact(move |_, outbox| {
                outbox.push(SceneAction::OpenLink {
                    section: id,
                    name: name.clone(),
                    link: link.clone(),
                });
            });
            Some(handle.id())
        }
        None => None,
    };

    stage.contents.push(SectionContent::new(&spec));

    let zone = zones
        .add(ZoneDesc {
            rect: zone_rect,
            payload: ZonePayload {
                section: id,
                camera: spec.zone.camera,
            },
        })?
        .on(ZoneEvent::In, move |payload, stage: &mut Stage| {
            stage.camera.set(payload.camera);
            stage.effects.suppress(stage.now, effect_duration);
            if let Some(area) = area {
                stage.areas.activate(area);
            }
            let (now, scale) = (stage.now, stage.fade_scale);
            if let Some(content) = stage.contents.get_mut(payload.section.0) {
                content.reveal(now, scale);
            }
        })
        .on(ZoneEvent::Out, move |_, stage: &mut Stage| {
            stage.camera.set(CameraAngle::Default);
            stage.effects.restore(stage.now, effect_duration);
            if let Some(area) = area {
                stage.areas.deactivate(area);
            }
        })
        .id();

    log::info!(
        "Section '{}' at ({:.1}, {:.1}) ready (zone {}, area {:?})",
        spec.name,
        spec.origin.x,
        spec.origin.y,
        zone.0,
        area.map(|a| a.0)
    );

    Ok(Section {
        id,
        spec,
        zone,
        area,
    })
}
