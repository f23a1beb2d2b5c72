//! Axis-aligned rectangles on the ground plane
//!
//! Shared shape for zones, areas and static obstacles:
//! - center: (x, y) in ground coordinates
//! - half_extents: (hx, hy), both strictly positive

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::SceneError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub center: Vec2,
    pub half_extents: Vec2,
}

impl Rect {
    /// Validated constructor; rejects zero, negative or non-finite extents
    pub fn new(center: Vec2, half_extents: Vec2) -> Result<Self, SceneError> {
        let rect = Self {
            center,
            half_extents,
        };
        rect.validate()?;
        Ok(rect)
    }

    /// Check an already-built rectangle (e.g. one deserialized from config)
    pub fn validate(&self) -> Result<(), SceneError> {
        let valid = self.center.is_finite()
            && self.half_extents.is_finite()
            && self.half_extents.x > 0.0
            && self.half_extents.y > 0.0;
        if valid {
            Ok(())
        } else {
            Err(SceneError::MalformedTriggerGeometry {
                center: self.center,
                half_extents: self.half_extents,
            })
        }
    }

    /// Inclusive containment: a point exactly on an edge is inside
    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        (point.x - self.center.x).abs() <= self.half_extents.x
            && (point.y - self.center.y).abs() <= self.half_extents.y
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        self.center - self.half_extents
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.center + self.half_extents
    }

    /// Closest point of the rectangle to `point`
    #[inline]
    pub fn clamp_point(&self, point: Vec2) -> Vec2 {
        point.clamp(self.min(), self.max())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn zone_rect() -> Rect {
        Rect::new(Vec2::new(0.0, 20.0), Vec2::new(12.0, 12.0)).unwrap()
    }

    #[test]
    fn test_rejects_bad_extents() {
        assert!(Rect::new(Vec2::ZERO, Vec2::new(0.0, 1.0)).is_err());
        assert!(Rect::new(Vec2::ZERO, Vec2::new(1.0, -1.0)).is_err());
        assert!(Rect::new(Vec2::ZERO, Vec2::new(f32::NAN, 1.0)).is_err());
        assert!(Rect::new(Vec2::new(f32::INFINITY, 0.0), Vec2::ONE).is_err());
        assert!(Rect::new(Vec2::ZERO, Vec2::new(0.001, 0.001)).is_ok());
    }

    #[test]
    fn test_all_four_edges_inclusive() {
        let r = zone_rect();
        assert!(r.contains(Vec2::new(-12.0, 20.0)));
        assert!(r.contains(Vec2::new(12.0, 20.0)));
        assert!(r.contains(Vec2::new(0.0, 8.0)));
        assert!(r.contains(Vec2::new(0.0, 32.0)));
        // Corners too
        assert!(r.contains(Vec2::new(12.0, 32.0)));
        assert!(r.contains(Vec2::new(-12.0, 8.0)));
    }

    #[test]
    fn test_just_outside() {
        let r = zone_rect();
        assert!(!r.contains(Vec2::new(12.001, 20.0)));
        assert!(!r.contains(Vec2::new(0.0, 7.999)));
        assert!(!r.contains(Vec2::new(0.0, 40.0)));
    }

    #[test]
    fn test_clamp_point() {
        let r = zone_rect();
        assert_eq!(r.clamp_point(Vec2::new(30.0, 0.0)), Vec2::new(12.0, 8.0));
        assert_eq!(r.clamp_point(Vec2::new(1.0, 21.0)), Vec2::new(1.0, 21.0));
    }

    proptest! {
        #[test]
        fn prop_boundary_points_are_inside(
            cx in -100i32..100,
            cy in -100i32..100,
            hx in 1i32..50,
            hy in 1i32..50,
            t in -1.0f64..=1.0,
        ) {
            // Integer-valued geometry keeps edge coordinates exact in f32
            let r = Rect::new(
                Vec2::new(cx as f32, cy as f32),
                Vec2::new(hx as f32, hy as f32),
            ).unwrap();
            let along_x = (cx + (t * hx as f64).round() as i32) as f32;
            let along_y = (cy + (t * hy as f64).round() as i32) as f32;
            let (left, right) = ((cx - hx) as f32, (cx + hx) as f32);
            let (bottom, top) = ((cy - hy) as f32, (cy + hy) as f32);
            prop_assert!(r.contains(Vec2::new(along_x, bottom)));
            prop_assert!(r.contains(Vec2::new(along_x, top)));
            prop_assert!(r.contains(Vec2::new(left, along_y)));
            prop_assert!(r.contains(Vec2::new(right, along_y)));
        }

        #[test]
        fn prop_far_points_are_outside(
            hx in 0.5f32..50.0,
            hy in 0.5f32..50.0,
            dx in 1.0f32..100.0,
        ) {
            let r = Rect::new(Vec2::ZERO, Vec2::new(hx, hy)).unwrap();
            prop_assert!(!r.contains(Vec2::new(hx + dx, 0.0)));
            prop_assert!(!r.contains(Vec2::new(0.0, -(hy + dx))));
        }
    }
}
