//! Rigid body component
//!
//! Declares that an entity takes part in the simulation. The body itself is
//! owned by the physics bridge and only exists while the runtime is active.

use crate::ecs::Component;
use crate::foundation::math::Vec3;
use crate::physics::BodyType;
use serde::{Deserialize, Serialize};

/// Simulation parameters for an entity's physics body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RigidBodyComponent {
    /// How the body moves
    pub body_type: BodyType,

    /// Keep the body's rotation fixed
    pub fixed_rotation: bool,

    /// Velocity applied when the body is created
    pub initial_velocity: Vec3,

    /// Multiplier on world gravity
    pub gravity_scale: f32,
}

impl Component for RigidBodyComponent {}

impl Default for RigidBodyComponent {
    fn default() -> Self {
        Self {
            body_type: BodyType::Static,
            fixed_rotation: false,
            initial_velocity: Vec3::zeros(),
            gravity_scale: 1.0,
        }
    }
}

impl RigidBodyComponent {
    /// Body that never moves
    pub fn fixed() -> Self {
        Self::default()
    }

    /// Body moved by forces and collisions
    pub fn dynamic() -> Self {
        Self {
            body_type: BodyType::Dynamic,
            ..Self::default()
        }
    }

    /// Body moved only by its velocity
    pub fn kinematic() -> Self {
        Self {
            body_type: BodyType::Kinematic,
            ..Self::default()
        }
    }

    /// Builder pattern: Set the initial velocity
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.initial_velocity = velocity;
        self
    }

    /// Builder pattern: Set the gravity multiplier
    pub fn with_gravity_scale(mut self, scale: f32) -> Self {
        self.gravity_scale = scale;
        self
    }
}
