//! ECS Components module
//!
//! Built-in components the scene orchestrator understands.

pub mod transform;
pub mod rigid_body;
pub mod collider;
pub mod camera;
pub mod renderable;

pub use transform::TransformComponent;
pub use rigid_body::RigidBodyComponent;
pub use collider::ColliderComponent;
pub use camera::{CameraComponent, ProjectionType, SceneCamera};
pub use renderable::{MeshComponent, SpriteComponent};

use crate::ecs::EntityRegistry;
use crate::error::SceneResult;

/// Register every built-in component with its clone function
///
/// Rigid body removals are tracked so the physics bridge can release bodies.
pub fn register_builtin(registry: &mut EntityRegistry) -> SceneResult<()> {
    registry.register_component::<TransformComponent>()?;
    registry.register_component::<RigidBodyComponent>()?;
    registry.register_component::<ColliderComponent>()?;
    registry.register_component::<CameraComponent>()?;
    registry.register_component::<SpriteComponent>()?;
    registry.register_component::<MeshComponent>()?;
    registry.track_removals::<RigidBodyComponent>()
}
