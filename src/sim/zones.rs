//! Trigger volume registry
//!
//! Zones are axis-aligned rectangles on the ground plane. Every frame the
//! registry tests the vehicle position against each zone (inclusive edges)
//! and fires observers only when a zone's membership flag flips:
//! - `In`: outside -> inside, observers receive the zone payload
//! - `Out`: inside -> outside
//!
//! Dispatch is synchronous, in registration order. Overlapping zones are
//! legal and evaluated independently, so the last zone to fire in a frame
//! wins any conflicting request.

use std::fmt;

use glam::Vec2;

use super::rect::Rect;
use crate::error::SceneError;

/// Stable handle to a registered zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ZoneId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZoneEvent {
    In,
    Out,
}

/// Geometry plus an opaque payload handed to observers
#[derive(Debug, Clone)]
pub struct ZoneDesc<P> {
    pub rect: Rect,
    pub payload: P,
}

#[derive(Debug, Clone)]
pub struct Zone<P> {
    rect: Rect,
    payload: P,
    inside: bool,
}

impl<P> Zone<P> {
    pub fn rect(&self) -> &Rect {
        &self.rect
    }

    pub fn payload(&self) -> &P {
        &self.payload
    }

    /// Membership as of the last `update`
    pub fn is_inside(&self) -> bool {
        self.inside
    }
}

/// Observer closure; `C` is the context the owner threads through dispatch
pub type ZoneHandler<P, C> = Box<dyn FnMut(&P, &mut C)>;

/// Per-zone dispatch table keyed by event kind
struct ZoneObservers<P, C> {
    on_in: Vec<ZoneHandler<P, C>>,
    on_out: Vec<ZoneHandler<P, C>>,
}

impl<P, C> ZoneObservers<P, C> {
    fn new() -> Self {
        Self {
            on_in: Vec::new(),
            on_out: Vec::new(),
        }
    }

    fn list_mut(&mut self, event: ZoneEvent) -> &mut Vec<ZoneHandler<P, C>> {
        match event {
            ZoneEvent::In => &mut self.on_in,
            ZoneEvent::Out => &mut self.on_out,
        }
    }
}

/// A zone membership change observed during `update`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneTransition {
    pub zone: ZoneId,
    pub event: ZoneEvent,
}

pub struct ZoneRegistry<P, C> {
    zones: Vec<Zone<P>>,
    observers: Vec<ZoneObservers<P, C>>,
}

impl<P, C> Default for ZoneRegistry<P, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P, C> fmt::Debug for ZoneRegistry<P, C>
where
    P: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZoneRegistry")
            .field("zones", &self.zones)
            .finish_non_exhaustive()
    }
}

impl<P, C> ZoneRegistry<P, C> {
    pub fn new() -> Self {
        Self {
            zones: Vec::new(),
            observers: Vec::new(),
        }
    }

    /// Register a zone; fails on malformed geometry
    pub fn add(&mut self, desc: ZoneDesc<P>) -> Result<ZoneHandle<'_, P, C>, SceneError> {
        desc.rect.validate()?;
        let id = ZoneId(self.zones.len());
        log::debug!(
            "Zone {} at ({:.1}, {:.1}) half extents ({:.1}, {:.1})",
            id.0,
            desc.rect.center.x,
            desc.rect.center.y,
            desc.rect.half_extents.x,
            desc.rect.half_extents.y
        );
        self.zones.push(Zone {
            rect: desc.rect,
            payload: desc.payload,
            inside: false,
        });
        self.observers.push(ZoneObservers::new());
        Ok(ZoneHandle { registry: self, id })
    }

    /// Subscribe to a zone event
    pub fn on<F>(&mut self, id: ZoneId, event: ZoneEvent, handler: F)
    where
        F: FnMut(&P, &mut C) + 'static,
    {
        if let Some(observers) = self.observers.get_mut(id.0) {
            observers.list_mut(event).push(Box::new(handler));
        } else {
            log::warn!("Subscription to unknown zone {}", id.0);
        }
    }

    pub fn get(&self, id: ZoneId) -> Option<&Zone<P>> {
        self.zones.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ZoneId, &Zone<P>)> {
        self.zones.iter().enumerate().map(|(i, z)| (ZoneId(i), z))
    }

    /// Zones currently containing the vehicle
    pub fn occupied(&self) -> impl Iterator<Item = ZoneId> + '_ {
        self.iter().filter(|(_, z)| z.inside).map(|(id, _)| id)
    }

    /// Evaluate the vehicle position against every zone
    ///
    /// Returns the transitions that fired, in dispatch order.
    pub fn update(&mut self, position: Vec2, ctx: &mut C) -> Vec<ZoneTransition> {
        let mut fired = Vec::new();
        if !position.is_finite() {
            log::warn!("Skipping zone update for non-finite position {}", position);
            return fired;
        }

        for (index, (zone, observers)) in self.zones.iter_mut().zip(&mut self.observers).enumerate()
        {
            let inside = zone.rect.contains(position);
            if inside == zone.inside {
                continue;
            }
            zone.inside = inside;

            let event = if inside { ZoneEvent::In } else { ZoneEvent::Out };
            log::debug!("Zone {} {:?} at ({:.2}, {:.2})", index, event, position.x, position.y);
            for handler in observers.list_mut(event).iter_mut() {
                handler(&zone.payload, ctx);
            }
            fired.push(ZoneTransition {
                zone: ZoneId(index),
                event,
            });
        }
        fired
    }
}

/// Returned by `ZoneRegistry::add` for chained subscriptions
pub struct ZoneHandle<'a, P, C> {
    registry: &'a mut ZoneRegistry<P, C>,
    id: ZoneId,
}

impl<P, C> ZoneHandle<'_, P, C> {
    pub fn id(&self) -> ZoneId {
        self.id
    }

    pub fn on<F>(self, event: ZoneEvent, handler: F) -> Self
    where
        F: FnMut(&P, &mut C) + 'static,
    {
        self.registry.on(self.id, event, handler);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Log {
        entered: Vec<&'static str>,
        exits: u32,
    }

    fn registry_with_zone(
        center: Vec2,
        half: Vec2,
        tag: &'static str,
    ) -> (ZoneRegistry<&'static str, Log>, ZoneId) {
        let mut zones = ZoneRegistry::new();
        let id = zones
            .add(ZoneDesc {
                rect: Rect::new(center, half).unwrap(),
                payload: tag,
            })
            .unwrap()
            .on(ZoneEvent::In, |tag, log: &mut Log| log.entered.push(*tag))
            .on(ZoneEvent::Out, |_, log: &mut Log| log.exits += 1)
            .id();
        (zones, id)
    }

    #[test]
    fn test_in_fires_once_while_inside() {
        let (mut zones, id) = registry_with_zone(Vec2::ZERO, Vec2::splat(5.0), "a");
        let mut log = Log::default();

        zones.update(Vec2::new(10.0, 0.0), &mut log);
        assert!(log.entered.is_empty());

        for x in [4.0, 3.0, 0.0, -2.0, -4.9] {
            zones.update(Vec2::new(x, 0.0), &mut log);
        }
        assert_eq!(log.entered, vec!["a"]);
        assert!(zones.get(id).unwrap().is_inside());
        assert_eq!(log.exits, 0);

        zones.update(Vec2::new(-6.0, 0.0), &mut log);
        zones.update(Vec2::new(-7.0, 0.0), &mut log);
        assert_eq!(log.exits, 1);
        assert!(!zones.get(id).unwrap().is_inside());
    }

    #[test]
    fn test_boundary_is_inside_on_all_edges() {
        let center = Vec2::new(0.0, 20.0);
        let half = Vec2::new(12.0, 12.0);
        for edge in [
            Vec2::new(-12.0, 20.0),
            Vec2::new(12.0, 20.0),
            Vec2::new(0.0, 8.0),
            Vec2::new(0.0, 32.0),
        ] {
            let (mut zones, id) = registry_with_zone(center, half, "edge");
            let mut log = Log::default();
            let fired = zones.update(edge, &mut log);
            assert_eq!(
                fired,
                vec![ZoneTransition {
                    zone: id,
                    event: ZoneEvent::In
                }],
                "edge {edge} must count as inside"
            );
            assert!(zones.get(id).unwrap().is_inside());
        }
    }

    #[test]
    fn test_malformed_geometry_rejected() {
        let mut zones: ZoneRegistry<(), ()> = ZoneRegistry::new();
        let bad = ZoneDesc {
            rect: Rect {
                center: Vec2::ZERO,
                half_extents: Vec2::new(0.0, 4.0),
            },
            payload: (),
        };
        assert!(matches!(
            zones.add(bad),
            Err(SceneError::MalformedTriggerGeometry { .. })
        ));
        assert!(zones.is_empty());
    }

    #[test]
    fn test_overlapping_zones_fire_in_registration_order() {
        let mut zones: ZoneRegistry<&'static str, Vec<&'static str>> = ZoneRegistry::new();
        for tag in ["first", "second"] {
            zones
                .add(ZoneDesc {
                    rect: Rect::new(Vec2::ZERO, Vec2::splat(3.0)).unwrap(),
                    payload: tag,
                })
                .unwrap()
                .on(ZoneEvent::In, |tag, order: &mut Vec<&'static str>| {
                    order.push(*tag)
                });
        }
        let mut order = Vec::new();
        zones.update(Vec2::ZERO, &mut order);
        assert_eq!(order, vec!["first", "second"]);
        assert_eq!(zones.occupied().count(), 2);
    }

    #[test]
    fn test_non_finite_position_keeps_membership() {
        let (mut zones, id) = registry_with_zone(Vec2::ZERO, Vec2::splat(5.0), "a");
        let mut log = Log::default();
        zones.update(Vec2::ZERO, &mut log);
        let fired = zones.update(Vec2::new(f32::NAN, 0.0), &mut log);
        assert!(fired.is_empty());
        assert!(zones.get(id).unwrap().is_inside());
        assert_eq!(log.exits, 0);
    }

    #[test]
    fn test_multiple_handlers_per_event() {
        let mut zones: ZoneRegistry<(), u32> = ZoneRegistry::new();
        let id = zones
            .add(ZoneDesc {
                rect: Rect::new(Vec2::ZERO, Vec2::ONE).unwrap(),
                payload: (),
            })
            .unwrap()
            .id();
        zones.on(id, ZoneEvent::In, |_, n| *n += 1);
        zones.on(id, ZoneEvent::In, |_, n| *n += 10);
        let mut count = 0;
        zones.update(Vec2::ZERO, &mut count);
        assert_eq!(count, 11);
    }
}
