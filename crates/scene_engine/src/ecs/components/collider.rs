//! Collider component
//!
//! Shape and material of the physics fixture attached to an entity's body.
//! A new collider starts dirty and setters raise the flag again; the transform
//! sync pass pushes changed properties to the physics world and clears it.

use crate::ecs::Component;
use crate::foundation::math::Vec3;
use crate::physics::{ColliderShape, FixtureDesc};
use serde::{Deserialize, Serialize};

/// Fixture properties for a rigid body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColliderComponent {
    shape: ColliderShape,
    density: f32,
    friction: f32,
    restitution: f32,
    offset: Vec3,
    #[serde(skip, default = "fresh")]
    dirty: bool,
}

impl Component for ColliderComponent {}

const fn fresh() -> bool {
    true
}

impl Default for ColliderComponent {
    fn default() -> Self {
        Self::new(ColliderShape::Box {
            half_extents: Vec3::new(0.5, 0.5, 0.5),
        })
    }
}

impl ColliderComponent {
    /// Collider with default material
    pub fn new(shape: ColliderShape) -> Self {
        Self {
            shape,
            density: 1.0,
            friction: 0.5,
            restitution: 0.0,
            offset: Vec3::zeros(),
            dirty: true,
        }
    }

    /// Axis-aligned box collider
    pub fn cuboid(half_extents: Vec3) -> Self {
        Self::new(ColliderShape::Box { half_extents })
    }

    /// Sphere collider
    pub fn sphere(radius: f32) -> Self {
        Self::new(ColliderShape::Sphere { radius })
    }

    /// Builder pattern: Set restitution
    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    /// Builder pattern: Set density
    pub fn with_density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }

    /// Collision shape
    pub const fn shape(&self) -> &ColliderShape {
        &self.shape
    }

    /// Mass per unit volume
    pub const fn density(&self) -> f32 {
        self.density
    }

    /// Friction coefficient
    pub const fn friction(&self) -> f32 {
        self.friction
    }

    /// Bounciness
    pub const fn restitution(&self) -> f32 {
        self.restitution
    }

    /// Offset from the body origin
    pub const fn offset(&self) -> Vec3 {
        self.offset
    }

    /// Replace the collision shape
    pub fn set_shape(&mut self, shape: ColliderShape) {
        self.shape = shape;
        self.dirty = true;
    }

    /// Set density
    pub fn set_density(&mut self, density: f32) {
        self.density = density;
        self.dirty = true;
    }

    /// Set friction
    pub fn set_friction(&mut self, friction: f32) {
        self.friction = friction;
        self.dirty = true;
    }

    /// Set restitution
    pub fn set_restitution(&mut self, restitution: f32) {
        self.restitution = restitution;
        self.dirty = true;
    }

    /// Set offset from the body origin
    pub fn set_offset(&mut self, offset: Vec3) {
        self.offset = offset;
        self.dirty = true;
    }

    /// Whether properties changed since the physics world last saw them
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mark the properties as pushed to the physics world
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Fixture description for the physics world
    pub fn fixture(&self) -> FixtureDesc {
        FixtureDesc {
            shape: self.shape.clone(),
            density: self.density,
            friction: self.friction,
            restitution: self.restitution,
            offset: self.offset,
        }
    }
}
