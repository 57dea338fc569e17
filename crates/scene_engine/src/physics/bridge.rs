//! Physics bridge
//!
//! Owns the physics world between runtime start and stop. Entities and bodies
//! are linked through an id map in both directions; nothing on the physics
//! side ever holds an entity reference, and nothing on the ECS side holds a
//! body.

use super::contact::{ContactEvent, ContactRelay, EntityContact};
use super::world::{BodyDesc, PhysicsWorld, WorldFactory};
use crate::config::SceneConfig;
use crate::ecs::components::{ColliderComponent, RigidBodyComponent, TransformComponent};
use crate::ecs::{Entity, EntityRegistry};
use crate::error::{SceneError, SceneResult};
use crate::foundation::collections::{BodyHandle, SecondaryMap};
use crate::foundation::math::Vec3;
use crossbeam_channel::Receiver;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Entity ↔ body mapping and world lifetime
pub struct PhysicsBridge {
    factory: WorldFactory,
    world: Option<Box<dyn PhysicsWorld>>,
    gravity: Vec3,
    velocity_iterations: u32,
    position_iterations: u32,
    bodies: HashMap<Entity, BodyHandle>,
    entities: SecondaryMap<BodyHandle, Entity>,
    active: Arc<AtomicBool>,
    contacts: Option<Receiver<ContactEvent>>,
    scratch: Vec<Entity>,
    removed: Vec<Entity>,
    failed: HashMap<Entity, bool>,
    steps_taken: u64,
}

impl PhysicsBridge {
    /// Bridge that will build its world with `factory` at initialization
    pub fn new(config: &SceneConfig, factory: WorldFactory) -> Self {
        Self {
            factory,
            world: None,
            gravity: Vec3::from(config.gravity),
            velocity_iterations: config.velocity_iterations,
            position_iterations: config.position_iterations,
            bodies: HashMap::new(),
            entities: SecondaryMap::new(),
            active: Arc::new(AtomicBool::new(false)),
            contacts: None,
            scratch: Vec::new(),
            removed: Vec::new(),
            failed: HashMap::new(),
            steps_taken: 0,
        }
    }

    /// Create the world and a body for every rigid body with a transform
    ///
    /// Bodies that fail to create are logged and skipped until their rigid
    /// body or collider changes. Returns the number of bodies created.
    pub fn initialize(&mut self, registry: &mut EntityRegistry) -> usize {
        if self.world.is_some() {
            self.shutdown();
        }

        let mut world = (self.factory)(self.gravity);
        self.active = Arc::new(AtomicBool::new(true));
        let (sender, receiver) = crossbeam_channel::unbounded();
        world.set_contact_listener(Arc::new(ContactRelay::new(Arc::clone(&self.active), sender)));
        self.contacts = Some(receiver);
        self.world = Some(world);
        self.failed.clear();
        self.steps_taken = 0;

        // Removals recorded while editing have no bodies to release
        registry.drain_removed::<RigidBodyComponent>(&mut self.removed);
        self.removed.clear();

        let Some(required) = registry.tags_of::<(RigidBodyComponent, TransformComponent)>() else {
            log::debug!("Physics initialized with no rigid bodies");
            return 0;
        };
        let mut scratch = std::mem::take(&mut self.scratch);
        registry.query_into(required, &mut scratch);
        let created = scratch
            .iter()
            .filter(|&&entity| self.create_body(registry, entity).is_ok())
            .count();
        self.scratch = scratch;

        log::debug!("Physics initialized with {created} bodies");
        created
    }

    fn create_body(&mut self, registry: &mut EntityRegistry, entity: Entity) -> SceneResult<BodyHandle> {
        let Some(world) = self.world.as_mut() else {
            return Err(SceneError::BodyCreation("physics world not initialized".to_string()));
        };
        let (Some(body), Some(transform)) = (
            registry.get_component::<RigidBodyComponent>(entity),
            registry.get_component::<TransformComponent>(entity),
        ) else {
            return Err(SceneError::EntityNotFound(entity));
        };

        let desc = BodyDesc {
            body_type: body.body_type,
            position: transform.position,
            rotation: transform.rotation,
            linear_velocity: body.initial_velocity,
            gravity_scale: body.gravity_scale,
            fixed_rotation: body.fixed_rotation,
            fixture: registry
                .get_component::<ColliderComponent>(entity)
                .map(ColliderComponent::fixture),
        };

        match world.create_body(&desc) {
            Ok(handle) => {
                self.bodies.insert(entity, handle);
                self.entities.insert(handle, entity);
                if let Some(collider) = registry.get_component_mut::<ColliderComponent>(entity) {
                    collider.clear_dirty();
                }
                log::trace!("Created body for entity {entity}");
                Ok(handle)
            }
            Err(err) => {
                log::warn!("Skipping physics body for entity {entity}: {err}");
                let collider = registry.get_component_mut::<ColliderComponent>(entity);
                let had_collider = collider.is_some();
                if let Some(collider) = collider {
                    collider.clear_dirty();
                }
                self.failed.insert(entity, had_collider);
                Err(err)
            }
        }
    }

    /// Advance the world by exactly `fixed_dt`
    pub fn step(&mut self, fixed_dt: f32) {
        if let Some(world) = self.world.as_mut() {
            world.step(fixed_dt, self.velocity_iterations, self.position_iterations);
            self.steps_taken += 1;
        }
    }

    /// Copy simulated poses into transforms
    ///
    /// One pass over rigid body + transform entities. Collider fixtures are
    /// pushed to the world only when dirty, which includes colliders added or
    /// replaced since the last pass. Rigid bodies added since the last pass
    /// get their body here; a body that failed to create is retried once its
    /// collider changes.
    pub fn sync_transforms(&mut self, registry: &mut EntityRegistry) -> usize {
        if self.world.is_none() {
            return 0;
        }
        let Some(required) = registry.tags_of::<(RigidBodyComponent, TransformComponent)>() else {
            return 0;
        };

        let mut scratch = std::mem::take(&mut self.scratch);
        registry.query_into(required, &mut scratch);
        let mut synced = 0;
        for &entity in &scratch {
            let Some(&handle) = self.bodies.get(&entity) else {
                if self.should_create(registry, entity) && self.create_body(registry, entity).is_ok() {
                    self.failed.remove(&entity);
                }
                continue;
            };
            let Some(world) = self.world.as_mut() else {
                break;
            };

            if let Some(pose) = world.body_pose(handle) {
                if let Some(transform) = registry.get_component_mut::<TransformComponent>(entity) {
                    transform.position = pose.position;
                    transform.rotation = pose.rotation;
                    synced += 1;
                }
            }

            if let Some(collider) = registry.get_component_mut::<ColliderComponent>(entity) {
                if collider.is_dirty() {
                    if !world.set_fixture(handle, &collider.fixture()) {
                        log::warn!("Physics world rejected fixture update for entity {entity}");
                    }
                    collider.clear_dirty();
                }
            }
        }
        self.scratch = scratch;
        synced
    }

    /// Whether `entity` has no failed attempt, or changed its collider since one
    fn should_create(&self, registry: &EntityRegistry, entity: Entity) -> bool {
        let Some(&had_collider) = self.failed.get(&entity) else {
            return true;
        };
        match registry.get_component::<ColliderComponent>(entity) {
            Some(collider) => collider.is_dirty(),
            None => had_collider,
        }
    }

    /// Release the body of `entity`, if it has one
    pub fn release_entity(&mut self, entity: Entity) -> bool {
        let Some(handle) = self.bodies.remove(&entity) else {
            return false;
        };
        self.entities.remove(handle);
        if let Some(world) = self.world.as_mut() {
            world.destroy_body(handle);
        }
        log::trace!("Released body for entity {entity}");
        true
    }

    /// Release bodies whose rigid body component was removed, replaced or purged
    ///
    /// A replaced rigid body gets a new body on the next sync. Always drains
    /// the registry's removal record, even with no world.
    pub fn release_removed(&mut self, registry: &mut EntityRegistry) -> usize {
        let mut removed = std::mem::take(&mut self.removed);
        registry.drain_removed::<RigidBodyComponent>(&mut removed);
        let mut released = 0;
        for entity in removed.drain(..) {
            self.failed.remove(&entity);
            if self.release_entity(entity) {
                released += 1;
            }
        }
        self.removed = removed;
        released
    }

    /// Move queued contacts into `out`, resolving bodies to entities
    ///
    /// Contacts involving a body that no longer maps to an entity are dropped.
    pub fn drain_contacts(&mut self, out: &mut Vec<EntityContact>) -> usize {
        let Some(receiver) = self.contacts.as_ref() else {
            return 0;
        };
        let before = out.len();
        for event in receiver.try_iter() {
            let (Some(&entity_a), Some(&entity_b)) = (self.entities.get(event.body_a), self.entities.get(event.body_b)) else {
                continue;
            };
            out.push(EntityContact {
                phase: event.phase,
                entity_a,
                entity_b,
            });
        }
        out.len() - before
    }

    /// Tear down the world
    ///
    /// Order matters: the contact relay is deactivated before anything else,
    /// every body is released explicitly, the listener is detached, and only
    /// then is the world dropped. Queued contacts are discarded.
    pub fn shutdown(&mut self) {
        self.active.store(false, Ordering::Release);
        let Some(mut world) = self.world.take() else {
            return;
        };

        let released = self.bodies.len();
        for (_, handle) in self.bodies.drain() {
            world.destroy_body(handle);
        }
        self.entities.clear();
        world.clear_contact_listener();
        drop(world);
        self.contacts = None;
        self.removed.clear();
        self.failed.clear();

        log::debug!("Physics shut down, released {released} bodies after {} steps", self.steps_taken);
    }

    /// Body of `entity`
    pub fn body_of(&self, entity: Entity) -> Option<BodyHandle> {
        self.bodies.get(&entity).copied()
    }

    /// Entity owning `body`
    pub fn entity_of(&self, body: BodyHandle) -> Option<Entity> {
        self.entities.get(body).copied()
    }

    /// Number of tracked bodies
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Whether a world exists
    pub const fn is_initialized(&self) -> bool {
        self.world.is_some()
    }

    /// Steps since initialization
    pub const fn steps_taken(&self) -> u64 {
        self.steps_taken
    }

    /// Number of entities whose body creation failed and awaits a change
    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }
}

impl Drop for PhysicsBridge {
    fn drop(&mut self) {
        self.shutdown();
    }
}
