//! Primary camera resolution
//!
//! The resolver caches which entity is the primary camera. The scan over
//! camera entities only runs when the camera set changed; every other frame
//! re-reads the cached entity's components directly.

use crate::ecs::components::{CameraComponent, SceneCamera, TransformComponent};
use crate::ecs::{Entity, EntityRegistry};
use crate::error::{SceneError, SceneResult};
use crate::foundation::math::{self, Mat4};

/// The primary camera as seen this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedCamera {
    /// Camera entity
    pub entity: Entity,
    /// Projection parameters
    pub camera: SceneCamera,
    /// World transform of the camera
    pub transform: Mat4,
    /// Inverse of `transform`, or identity when it is singular
    pub view: Mat4,
}

/// Owner of the primary camera cache
#[derive(Debug, Default)]
pub struct CameraResolver {
    primary: Option<Entity>,
    dirty: bool,
    seen_generation: u64,
    scans: u64,
    scratch: Vec<Entity>,
}

impl CameraResolver {
    /// Resolver that scans on first use
    pub fn new() -> Self {
        Self {
            dirty: true,
            ..Self::default()
        }
    }

    /// Primary camera for this frame, or `None` to skip rendering
    pub fn resolve(&mut self, registry: &mut EntityRegistry) -> Option<ResolvedCamera> {
        let generation = registry.component_generation::<CameraComponent>();
        if generation != self.seen_generation {
            self.dirty = true;
        }

        if !self.dirty {
            if let Some(resolved) = self.primary.and_then(|entity| Self::read(registry, entity)) {
                return Some(resolved);
            }
        }

        self.scan(registry);
        self.seen_generation = generation;
        self.primary.and_then(|entity| Self::read(registry, entity))
    }

    fn scan(&mut self, registry: &mut EntityRegistry) {
        self.scans += 1;
        self.dirty = false;
        self.primary = registry
            .tags_of::<(CameraComponent, TransformComponent)>()
            .and_then(|required| {
                registry.query_with(required, |registry, entities| {
                    entities.iter().copied().find(|&entity| {
                        registry
                            .get_component::<CameraComponent>(entity)
                            .is_some_and(CameraComponent::is_primary)
                    })
                })
            });
        log::trace!("Primary camera scan found {:?}", self.primary);
    }

    fn read(registry: &EntityRegistry, entity: Entity) -> Option<ResolvedCamera> {
        let camera = registry.get_component::<CameraComponent>(entity)?;
        if !camera.is_primary() {
            return None;
        }
        let transform = registry.get_component::<TransformComponent>(entity)?.to_matrix();
        let (view, fell_back) = math::inverse_or_identity(&transform);
        if fell_back {
            log::warn!("{}; using identity view", SceneError::SingularTransform(entity));
        }
        Some(ResolvedCamera {
            entity,
            camera: camera.camera,
            transform,
            view,
        })
    }

    /// Make `entity` the only primary camera
    ///
    /// Every other camera loses the flag in the same call.
    pub fn set_primary(&mut self, registry: &mut EntityRegistry, entity: Entity) -> SceneResult<()> {
        if !registry.has_component::<CameraComponent>(entity) {
            return Err(SceneError::EntityNotFound(entity));
        }

        self.clear_flags(registry, Some(entity));
        if let Some(camera) = registry.get_component_mut::<CameraComponent>(entity) {
            camera.primary = true;
        }
        self.primary = Some(entity);
        self.dirty = true;
        Ok(())
    }

    /// Remove the primary flag from every camera
    pub fn clear_primary(&mut self, registry: &mut EntityRegistry) {
        self.clear_flags(registry, None);
        self.primary = None;
        self.dirty = true;
    }

    fn clear_flags(&mut self, registry: &mut EntityRegistry, keep: Option<Entity>) {
        let Some(required) = registry.tags_of::<CameraComponent>() else {
            return;
        };
        registry.query_into(required, &mut self.scratch);
        for &other in &self.scratch {
            if Some(other) == keep {
                continue;
            }
            if let Some(camera) = registry.get_component_mut::<CameraComponent>(other) {
                camera.primary = false;
            }
        }
    }

    /// Force a scan on the next `resolve`
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    /// Cached primary entity; may be stale until the next `resolve`
    pub const fn cached_primary(&self) -> Option<Entity> {
        self.primary
    }

    /// Number of scans performed
    pub const fn scans(&self) -> u64 {
        self.scans
    }
}
