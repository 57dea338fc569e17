//! External collaborators driven by the scene
//!
//! Scripts, renderers and the scene serializer live outside this crate. The
//! scene calls them at fixed points of the frame through these traits.

use super::snapshot::SceneSnapshot;
use crate::ecs::components::{MeshComponent, SceneCamera, SpriteComponent};
use crate::ecs::{Entity, EntityRegistry};
use crate::error::SceneError;
use crate::foundation::math::Mat4;
use crate::physics::EntityContact;
use thiserror::Error;

/// Game logic hooks
pub trait ScriptCollaborator: Send {
    /// Runtime has started; bodies exist
    fn on_runtime_start(&mut self, _registry: &mut EntityRegistry) {}

    /// Once per running frame with the real elapsed time
    fn on_update(&mut self, dt: f32, registry: &mut EntityRegistry);

    /// Contact reported by the physics phase
    fn on_contact(&mut self, _contact: &EntityContact, _registry: &mut EntityRegistry) {}

    /// A reload was requested since the last frame
    fn on_reload_requested(&mut self) {}

    /// Runtime is stopping; bodies still exist
    fn on_runtime_stop(&mut self, _registry: &mut EntityRegistry) {}
}

/// One drawable entity, collected once per frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderItem {
    /// Source entity
    pub entity: Entity,
    /// World transform
    pub transform: Mat4,
    /// Mesh, if the entity has one
    pub mesh: Option<MeshComponent>,
    /// Sprite, if the entity has one
    pub sprite: Option<SpriteComponent>,
}

/// Immediate-mode 2D renderer
pub trait Render2DCollaborator {
    /// Start a pass from the primary camera
    fn begin_scene(&mut self, camera: &SceneCamera, camera_transform: &Mat4);

    /// Draw one sprite
    fn draw(&mut self, transform: &Mat4, sprite: &SpriteComponent, entity: Entity);

    /// Finish the pass
    fn end_scene(&mut self);
}

/// Batch 3D renderer
pub trait Render3DCollaborator {
    /// Render every item from the primary camera
    fn render(&mut self, camera: &SceneCamera, camera_transform: &Mat4, items: &[RenderItem]);
}

/// Snapshot load/save errors
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// Storage failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot could not be encoded or decoded
    #[error("Format error: {0}")]
    Format(String),

    /// Scene rejected the operation
    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// Persistence for scene snapshots; the format is the implementor's choice
pub trait SceneSerializer {
    /// Persist a snapshot
    fn save(&mut self, snapshot: &SceneSnapshot) -> Result<(), SnapshotError>;

    /// Read a snapshot back
    fn load(&mut self) -> Result<SceneSnapshot, SnapshotError>;
}
