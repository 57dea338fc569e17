//! Scene snapshots
//!
//! A serde-friendly copy of every entity and its built-in components. The
//! scene hands snapshots to a [`SceneSerializer`](super::SceneSerializer),
//! which owns the storage format.

use super::camera_resolver::CameraResolver;
use crate::ecs::components::{
    CameraComponent, ColliderComponent, MeshComponent, RigidBodyComponent, SpriteComponent, TransformComponent,
};
use crate::ecs::{Entity, EntityRegistry};
use crate::error::SceneResult;
use serde::{Deserialize, Serialize};

/// One entity and its components
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EntitySnapshot {
    /// Display name
    pub name: String,
    /// Transform
    pub transform: Option<TransformComponent>,
    /// Rigid body
    pub rigid_body: Option<RigidBodyComponent>,
    /// Collider
    pub collider: Option<ColliderComponent>,
    /// Camera
    pub camera: Option<CameraComponent>,
    /// Whether the camera is the primary one
    pub primary_camera: bool,
    /// Sprite
    pub sprite: Option<SpriteComponent>,
    /// Mesh
    pub mesh: Option<MeshComponent>,
}

/// Every entity of a scene, in storage order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SceneSnapshot {
    /// Entities
    pub entities: Vec<EntitySnapshot>,
}

impl SceneSnapshot {
    /// Copy the registry's entities
    pub fn capture(registry: &EntityRegistry) -> Self {
        let entities = registry
            .entities()
            .map(|entity| {
                let camera = registry.get_component::<CameraComponent>(entity);
                EntitySnapshot {
                    name: registry.name(entity).unwrap_or_default().to_string(),
                    transform: registry.get_component::<TransformComponent>(entity).copied(),
                    rigid_body: registry.get_component::<RigidBodyComponent>(entity).copied(),
                    collider: registry.get_component::<ColliderComponent>(entity).cloned(),
                    camera: camera.cloned(),
                    primary_camera: camera.is_some_and(CameraComponent::is_primary),
                    sprite: registry.get_component::<SpriteComponent>(entity).copied(),
                    mesh: registry.get_component::<MeshComponent>(entity).copied(),
                }
            })
            .collect();
        Self { entities }
    }

    /// Recreate the snapshot's entities with fresh ids
    pub fn restore(&self, registry: &mut EntityRegistry, cameras: &mut CameraResolver) -> SceneResult<Vec<Entity>> {
        let mut created = Vec::with_capacity(self.entities.len());
        let mut primary = None;
        for snapshot in &self.entities {
            let entity = registry.create_entity(snapshot.name.clone())?;
            if let Some(transform) = snapshot.transform {
                registry.add_component(entity, transform)?;
            }
            if let Some(body) = snapshot.rigid_body {
                registry.add_component(entity, body)?;
            }
            if let Some(collider) = &snapshot.collider {
                registry.add_component(entity, collider.clone())?;
            }
            if let Some(camera) = &snapshot.camera {
                registry.add_component(entity, camera.clone())?;
                if snapshot.primary_camera {
                    primary = Some(entity);
                }
            }
            if let Some(sprite) = snapshot.sprite {
                registry.add_component(entity, sprite)?;
            }
            if let Some(mesh) = snapshot.mesh {
                registry.add_component(entity, mesh)?;
            }
            created.push(entity);
        }

        match primary {
            Some(entity) => cameras.set_primary(registry, entity)?,
            None => cameras.invalidate(),
        }
        Ok(created)
    }
}
