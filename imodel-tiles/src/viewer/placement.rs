//! Model placement for tilesets positioned on the earth's surface.
//!
//! Mesh export tilesets sit in earth-fixed coordinates, thousands of
//! kilometers from the origin. To view one in a local Y-up scene, the group
//! holding the tiles is rotated so the surface normal at the model points
//! along +Y, then lowered by the distance to the earth's center so the model
//! lands at the origin.

use glam::{DMat4, DQuat, DVec3};

use super::manifest::BoundingSphere;

/// How to place a loaded tileset in a Y-up scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewFit {
    /// Bounding-sphere center, earth-fixed.
    pub center: DVec3,
    pub radius: f64,
    pub distance_to_ellipsoid_center: f64,
    /// Rotation taking the surface normal to +Y.
    pub rotation: DQuat,
    /// Translation applied after the rotation.
    pub offset: DVec3,
}

impl ViewFit {
    pub fn from_bounding_sphere(sphere: &BoundingSphere) -> Self {
        let distance = sphere.center.length();
        let rotation = if distance > 0.0 {
            DQuat::from_rotation_arc(sphere.center / distance, DVec3::Y)
        } else {
            DQuat::IDENTITY
        };

        Self {
            center: sphere.center,
            radius: sphere.radius,
            distance_to_ellipsoid_center: distance,
            rotation,
            offset: DVec3::new(0.0, -distance, 0.0),
        }
    }

    /// Group transform: rotate, then offset.
    pub fn transform(&self) -> DMat4 {
        DMat4::from_rotation_translation(self.rotation, self.offset)
    }

    /// Where the model center ends up in the scene.
    pub fn placed_center(&self) -> DVec3 {
        self.transform().transform_point3(self.center)
    }
}
