//! # Scene Engine
//!
//! Entity/component store and per-frame scene orchestrator for real-time
//! simulation loops.
//!
//! ## Features
//!
//! - **ECS**: sparse-set storage, cached groups, deferred destruction barrier
//! - **Fixed-step physics**: accumulator with a bounded per-frame catch-up
//! - **Id-mapped bodies**: entities and physics bodies linked by id only
//! - **Primary camera**: exclusive flag with a cached resolution
//! - **Collaborators**: scripts, 2D/3D renderers and serializers plug in through traits
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_engine::prelude::*;
//!
//! fn main() -> Result<(), SceneError> {
//!     let mut scene = Scene::new(SceneConfig::default())?;
//!     let ball = scene.create_entity("ball")?;
//!     scene.registry_mut().add_component(ball, RigidBodyComponent::dynamic())?;
//!
//!     scene.runtime_start()?;
//!     for _ in 0..60 {
//!         scene.frame_update(1.0 / 60.0);
//!     }
//!     scene.runtime_stop()?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod error;
pub mod ecs;
pub mod physics;
pub mod scene;

pub use error::{ErrorKind, SceneError, SceneResult};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, SceneConfig},
        ecs::{
            components::{
                CameraComponent, ColliderComponent, MeshComponent, ProjectionType, RigidBodyComponent,
                SceneCamera, SpriteComponent, TransformComponent,
            },
            Component, Entity, EntityRegistry, LifecycleObserver,
        },
        error::{ErrorKind, SceneError, SceneResult},
        foundation::math::{Mat4, Quat, Vec3, Vec4},
        physics::{BodyType, ColliderShape, EntityContact, PhysicsWorld},
        scene::{
            Render2DCollaborator, Render3DCollaborator, RenderItem, Scene, SceneSerializer, SceneState,
            ScriptCollaborator,
        },
    };
}
