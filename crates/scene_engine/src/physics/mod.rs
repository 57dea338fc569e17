//! Physics integration
//!
//! The simulation itself sits behind the [`PhysicsWorld`] trait. The
//! [`PhysicsBridge`] owns the world for the duration of a runtime, maps
//! entities to bodies by id, and relays contact callbacks to the update thread.

pub mod world;
pub mod contact;
pub mod point_mass;
pub mod bridge;

pub use world::{BodyDesc, BodyPose, BodyType, ColliderShape, FixtureDesc, PhysicsWorld, WorldFactory};
pub use contact::{ContactEvent, ContactListener, ContactPhase, ContactRelay, EntityContact};
pub use point_mass::PointMassWorld;
pub use bridge::PhysicsBridge;
