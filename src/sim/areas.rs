//! Interaction area registry
//!
//! Areas are deliberate-action regions: they never fire on proximity. An
//! "interact" observer runs only when an explicit interaction input arrives
//! and every gate passes:
//! 1. the area is active (toggled externally, usually by a zone)
//! 2. if `test_vehicle`, the vehicle lies inside the area rectangle
//! 3. if `requires_key`, the input came from the keyboard key
//!
//! Pointer input additionally has to land inside the area it targets.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rect::Rect;
use crate::error::SceneError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AreaId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AreaDesc {
    pub rect: Rect,
    /// Only the interaction key may trigger this area
    #[serde(default)]
    pub requires_key: bool,
    /// The vehicle must overlap the area rectangle
    #[serde(default = "default_test_vehicle")]
    pub test_vehicle: bool,
    /// Initial activation state
    #[serde(default)]
    pub active: bool,
}

fn default_test_vehicle() -> bool {
    true
}

impl AreaDesc {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            requires_key: false,
            test_vehicle: true,
            active: false,
        }
    }
}

/// A discrete interaction input event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractTrigger {
    /// The interaction key (Enter) was pressed
    Key,
    /// A click/tap, already projected onto the ground plane
    Pointer(Vec2),
}

#[derive(Debug, Clone)]
pub struct Area {
    desc: AreaDesc,
    active: bool,
}

impl Area {
    pub fn rect(&self) -> &Rect {
        &self.desc.rect
    }

    pub fn desc(&self) -> &AreaDesc {
        &self.desc
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether `trigger` with the vehicle at `vehicle` passes every gate
    pub fn accepts(&self, vehicle: Vec2, trigger: InteractTrigger) -> bool {
        if !self.active {
            return false;
        }
        if self.desc.test_vehicle && !self.desc.rect.contains(vehicle) {
            return false;
        }
        match trigger {
            InteractTrigger::Key => true,
            InteractTrigger::Pointer(point) => {
                !self.desc.requires_key && self.desc.rect.contains(point)
            }
        }
    }
}

pub type AreaHandler<C> = Box<dyn FnMut(AreaId, &mut C)>;

pub struct AreaRegistry<C> {
    areas: Vec<Area>,
    handlers: Vec<Vec<AreaHandler<C>>>,
}

impl<C> Default for AreaRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for AreaRegistry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AreaRegistry")
            .field("areas", &self.areas)
            .finish_non_exhaustive()
    }
}

impl<C> AreaRegistry<C> {
    pub fn new() -> Self {
        Self {
            areas: Vec::new(),
            handlers: Vec::new(),
        }
    }

    pub fn add(&mut self, desc: AreaDesc) -> Result<AreaHandle<'_, C>, SceneError> {
        desc.rect.validate()?;
        let id = AreaId(self.areas.len());
        log::debug!(
            "Area {} at ({:.1}, {:.1}) half extents ({:.1}, {:.1})",
            id.0,
            desc.rect.center.x,
            desc.rect.center.y,
            desc.rect.half_extents.x,
            desc.rect.half_extents.y
        );
        self.areas.push(Area {
            desc,
            active: desc.active,
        });
        self.handlers.push(Vec::new());
        Ok(AreaHandle { registry: self, id })
    }

    pub fn on_interact<F>(&mut self, id: AreaId, handler: F)
    where
        F: FnMut(AreaId, &mut C) + 'static,
    {
        if let Some(list) = self.handlers.get_mut(id.0) {
            list.push(Box::new(handler));
        } else {
            log::warn!("Subscription to unknown area {}", id.0);
        }
    }

    /// Idempotent
    pub fn activate(&mut self, id: AreaId) {
        self.set_active(id, true);
    }

    /// Idempotent
    pub fn deactivate(&mut self, id: AreaId) {
        self.set_active(id, false);
    }

    fn set_active(&mut self, id: AreaId, active: bool) {
        match self.areas.get_mut(id.0) {
            Some(area) if area.active != active => {
                log::debug!("Area {} {}", id.0, if active { "activated" } else { "deactivated" });
                area.active = active;
            }
            Some(_) => {}
            None => log::warn!("Activation of unknown area {}", id.0),
        }
    }

    pub fn get(&self, id: AreaId) -> Option<&Area> {
        self.areas.get(id.0)
    }

    pub fn is_active(&self, id: AreaId) -> bool {
        self.get(id).is_some_and(Area::is_active)
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (AreaId, &Area)> {
        self.areas.iter().enumerate().map(|(i, a)| (AreaId(i), a))
    }

    /// Offer one interaction input to a single area; true if it fired
    pub fn poll_area(
        &mut self,
        id: AreaId,
        vehicle: Vec2,
        trigger: InteractTrigger,
        ctx: &mut C,
    ) -> bool {
        let Some(area) = self.areas.get(id.0) else {
            return false;
        };
        if !area.accepts(vehicle, trigger) {
            return false;
        }
        log::debug!("Area {} interact ({:?})", id.0, trigger);
        for handler in self.handlers[id.0].iter_mut() {
            handler(id, ctx);
        }
        true
    }

    /// Offer one interaction input to every area, in registration order
    ///
    /// Each accepting area fires its observers exactly once for this input.
    pub fn poll_interaction(
        &mut self,
        vehicle: Vec2,
        trigger: InteractTrigger,
        ctx: &mut C,
    ) -> Vec<AreaId> {
        (0..self.areas.len())
            .map(AreaId)
            .filter(|&id| self.poll_area(id, vehicle, trigger, ctx))
            .collect()
    }
}

/// Returned by `AreaRegistry::add`
pub struct AreaHandle<'a, C> {
    registry: &'a mut AreaRegistry<C>,
    id: AreaId,
}

impl<C> AreaHandle<'_, C> {
    pub fn id(&self) -> AreaId {
        self.id
    }

    pub fn activate(self) -> Self {
        self.registry.activate(self.id);
        self
    }

    pub fn deactivate(self) -> Self {
        self.registry.deactivate(self.id);
        self
    }

    pub fn on_interact<F>(self, handler: F) -> Self
    where
        F: FnMut(AreaId, &mut C) + 'static,
    {
        self.registry.on_interact(self.id, handler);
        self
    }
}
