//! Physics world collaborator interface

use super::contact::ContactListener;
use crate::error::SceneResult;
use crate::foundation::collections::BodyHandle;
use crate::foundation::math::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How a body responds to the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BodyType {
    /// Never moves
    #[default]
    Static,
    /// Moved by gravity and collisions
    Dynamic,
    /// Moved by its own velocity only
    Kinematic,
}

/// Collision geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColliderShape {
    /// Box given by half extents
    Box {
        /// Half size along each axis
        half_extents: Vec3,
    },
    /// Sphere
    Sphere {
        /// Radius
        radius: f32,
    },
}

impl ColliderShape {
    /// Whether every dimension is finite and positive
    pub fn is_valid(&self) -> bool {
        match self {
            Self::Box { half_extents } => half_extents.iter().all(|v| v.is_finite() && *v > 0.0),
            Self::Sphere { radius } => radius.is_finite() && *radius > 0.0,
        }
    }

    /// Radius of the smallest sphere around the shape
    pub fn bounding_radius(&self) -> f32 {
        match self {
            Self::Box { half_extents } => half_extents.norm(),
            Self::Sphere { radius } => *radius,
        }
    }

    /// Enclosed volume
    pub fn volume(&self) -> f32 {
        match self {
            Self::Box { half_extents } => 8.0 * half_extents.x * half_extents.y * half_extents.z,
            Self::Sphere { radius } => 4.0 / 3.0 * std::f32::consts::PI * radius.powi(3),
        }
    }
}

/// Fixture attached to a body
#[derive(Debug, Clone, PartialEq)]
pub struct FixtureDesc {
    /// Collision geometry
    pub shape: ColliderShape,
    /// Mass per unit volume
    pub density: f32,
    /// Friction coefficient
    pub friction: f32,
    /// Bounciness
    pub restitution: f32,
    /// Offset from the body origin
    pub offset: Vec3,
}

/// Everything needed to create a body
#[derive(Debug, Clone, PartialEq)]
pub struct BodyDesc {
    /// Motion type
    pub body_type: BodyType,
    /// Initial position
    pub position: Vec3,
    /// Initial rotation
    pub rotation: Quat,
    /// Initial linear velocity
    pub linear_velocity: Vec3,
    /// Multiplier on world gravity
    pub gravity_scale: f32,
    /// Lock rotation
    pub fixed_rotation: bool,
    /// Optional collision fixture
    pub fixture: Option<FixtureDesc>,
}

/// Simulated position and orientation of a body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyPose {
    /// World position
    pub position: Vec3,
    /// World rotation
    pub rotation: Quat,
}

/// Simulation world used by the physics bridge
///
/// Implementations own every body they create and hand out [`BodyHandle`]s;
/// a handle stays valid until `destroy_body` or until the world is dropped.
/// Contact callbacks are invoked synchronously from inside `step`.
pub trait PhysicsWorld: Send {
    /// Create a body, or fail with [`SceneError::BodyCreation`](crate::error::SceneError::BodyCreation)
    fn create_body(&mut self, desc: &BodyDesc) -> SceneResult<BodyHandle>;

    /// Release a body; `false` if the handle was unknown
    fn destroy_body(&mut self, handle: BodyHandle) -> bool;

    /// Replace the fixture of a body; `false` if the handle was unknown or the fixture invalid
    fn set_fixture(&mut self, handle: BodyHandle, fixture: &FixtureDesc) -> bool;

    /// Current pose of a body
    fn body_pose(&self, handle: BodyHandle) -> Option<BodyPose>;

    /// Advance the simulation by exactly `dt` seconds
    fn step(&mut self, dt: f32, velocity_iterations: u32, position_iterations: u32);

    /// Install the contact listener, replacing any previous one
    fn set_contact_listener(&mut self, listener: Arc<dyn ContactListener>);

    /// Detach the contact listener
    fn clear_contact_listener(&mut self);

    /// Number of live bodies
    fn body_count(&self) -> usize;
}

/// Builds a world for the given gravity at runtime start
pub type WorldFactory = Box<dyn Fn(Vec3) -> Box<dyn PhysicsWorld> + Send>;
