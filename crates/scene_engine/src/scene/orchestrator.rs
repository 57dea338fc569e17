//! # Scene orchestrator
//!
//! `Scene` owns the entity registry, the physics bridge and the camera
//! resolver, and drives them together with the external collaborators once per
//! frame:
//!
//! 1. script update with the real elapsed time
//! 2. fixed-step physics with a bounded catch-up
//! 3. transform sync from physics
//! 4. primary camera resolution
//! 5. render dispatch
//! 6. queued commands, then the destruction barrier
//!
//! Scripts and physics only run in [`SceneState::RuntimeRunning`]; editing
//! frames still resolve the camera, render and run the barrier.

use super::camera_resolver::{CameraResolver, ResolvedCamera};
use super::collaborators::{
    Render2DCollaborator, Render3DCollaborator, RenderItem, SceneSerializer, ScriptCollaborator, SnapshotError,
};
use super::commands::{CommandQueue, CommandSender, ReloadFlag, SceneCommand};
use super::snapshot::SceneSnapshot;
use super::state::SceneState;
use super::stats::SceneStats;
use crate::config::{self, SceneConfig};
use crate::ecs::components::{self, CameraComponent, MeshComponent, SpriteComponent, TransformComponent};
use crate::ecs::{Entity, EntityRegistry, LifecycleObserver, ObserverId};
use crate::error::{SceneError, SceneResult};
use crate::physics::{EntityContact, PhysicsBridge, PointMassWorld, WorldFactory};

/// Scene orchestrator
pub struct Scene {
    config: SceneConfig,
    state: SceneState,
    registry: EntityRegistry,
    physics: PhysicsBridge,
    cameras: CameraResolver,

    script: Option<Box<dyn ScriptCollaborator>>,
    renderer_2d: Option<Box<dyn Render2DCollaborator>>,
    renderer_3d: Option<Box<dyn Render3DCollaborator>>,

    accumulator: f32,
    viewport: Option<(u32, u32)>,
    commands: CommandQueue,
    reload: ReloadFlag,
    runtime_observers: Vec<ObserverId>,
    stats: SceneStats,

    render_items: Vec<RenderItem>,
    render_scratch: Vec<Entity>,
    contacts: Vec<EntityContact>,
    pending_commands: Vec<SceneCommand>,
}

impl Scene {
    /// Scene simulated by the built-in [`PointMassWorld`]
    pub fn new(config: SceneConfig) -> SceneResult<Self> {
        Self::with_physics_world(config, PointMassWorld::factory())
    }

    /// Scene whose runtime builds its physics world with `factory`
    pub fn with_physics_world(config: SceneConfig, factory: WorldFactory) -> SceneResult<Self> {
        config.validate()?;

        let mut registry = EntityRegistry::new();
        components::register_builtin(&mut registry)?;

        Ok(Self {
            physics: PhysicsBridge::new(&config, factory),
            viewport: config.initial_viewport.map(|[width, height]| (width, height)),
            config,
            state: SceneState::Editing,
            registry,
            cameras: CameraResolver::new(),
            script: None,
            renderer_2d: None,
            renderer_3d: None,
            accumulator: 0.0,
            commands: CommandQueue::new(),
            reload: ReloadFlag::default(),
            runtime_observers: Vec::new(),
            stats: SceneStats::default(),
            render_items: Vec::new(),
            render_scratch: Vec::new(),
            contacts: Vec::new(),
            pending_commands: Vec::new(),
        })
    }

    /// Install the script collaborator
    pub fn set_script(&mut self, script: Box<dyn ScriptCollaborator>) {
        self.script = Some(script);
    }

    /// Install the 2D renderer
    pub fn set_renderer_2d(&mut self, renderer: Box<dyn Render2DCollaborator>) {
        self.renderer_2d = Some(renderer);
    }

    /// Install the 3D renderer
    pub fn set_renderer_3d(&mut self, renderer: Box<dyn Render3DCollaborator>) {
        self.renderer_3d = Some(renderer);
    }

    // ------------------------------------------------------------------
    // Entities
    // ------------------------------------------------------------------

    /// Create an entity with a default transform
    pub fn create_entity(&mut self, name: impl Into<String>) -> SceneResult<Entity> {
        let entity = self.registry.create_entity(name)?;
        self.registry.add_component(entity, TransformComponent::default())?;
        Ok(entity)
    }

    /// Queue an entity for destruction at the end of the frame
    pub fn destroy_entity(&mut self, entity: Entity) -> SceneResult<()> {
        self.registry.destroy_entity(entity)
    }

    /// Copy an entity; a copied camera is never primary
    pub fn duplicate_entity(&mut self, entity: Entity) -> SceneResult<Entity> {
        self.registry.duplicate_entity(entity)
    }

    /// Create a camera entity sized to the current viewport
    pub fn add_camera(
        &mut self,
        name: impl Into<String>,
        mut camera: CameraComponent,
        transform: TransformComponent,
    ) -> SceneResult<Entity> {
        if let (Some((width, height)), false) = (self.viewport, camera.fixed_aspect_ratio) {
            camera.camera.set_viewport_size(width, height);
        }
        let entity = self.registry.create_entity(name)?;
        self.registry.add_component(entity, transform)?;
        self.registry.add_component(entity, camera)?;
        Ok(entity)
    }

    /// Make `entity` the only primary camera
    pub fn set_primary_camera(&mut self, entity: Entity) -> SceneResult<()> {
        self.cameras.set_primary(&mut self.registry, entity)
    }

    /// Current primary camera entity
    pub fn primary_camera(&mut self) -> Option<Entity> {
        self.cameras.resolve(&mut self.registry).map(|resolved| resolved.entity)
    }

    /// Resize every camera that does not keep a fixed aspect ratio
    ///
    /// A zero dimension is rejected and nothing changes.
    pub fn viewport_resize(&mut self, width: u32, height: u32) -> SceneResult<()> {
        if let Err(err) = config::validate_viewport(width, height) {
            log::warn!("Rejected viewport resize: {err}");
            return Err(err);
        }
        self.viewport = Some((width, height));

        let Some(required) = self.registry.tags_of::<CameraComponent>() else {
            return Ok(());
        };
        self.registry.query_into(required, &mut self.render_scratch);
        for &entity in &self.render_scratch {
            if let Some(camera) = self.registry.get_component_mut::<CameraComponent>(entity) {
                if !camera.fixed_aspect_ratio {
                    camera.camera.set_viewport_size(width, height);
                }
            }
        }
        log::debug!("Viewport resized to {width}x{height}");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Runtime
    // ------------------------------------------------------------------

    /// Build the physics world and start running scripts
    pub fn runtime_start(&mut self) -> SceneResult<()> {
        if self.state != SceneState::Editing {
            return Err(SceneError::InvalidTransition {
                from: self.state,
                to: SceneState::RuntimeStarting,
            });
        }

        self.state = SceneState::RuntimeStarting;
        let bodies = self.physics.initialize(&mut self.registry);
        self.accumulator = 0.0;
        if let Some(script) = self.script.as_mut() {
            script.on_runtime_start(&mut self.registry);
        }
        self.state = SceneState::RuntimeRunning;
        log::info!("Runtime started with {bodies} physics bodies");
        Ok(())
    }

    /// Tear down the physics world and return to editing
    ///
    /// Runtime observers are unsubscribed; the registry keeps its entities.
    pub fn runtime_stop(&mut self) -> SceneResult<()> {
        if self.state != SceneState::RuntimeRunning {
            return Err(SceneError::InvalidTransition {
                from: self.state,
                to: SceneState::RuntimeStopping,
            });
        }

        self.state = SceneState::RuntimeStopping;
        if let Some(script) = self.script.as_mut() {
            script.on_runtime_stop(&mut self.registry);
        }
        self.physics.shutdown();
        for id in self.runtime_observers.drain(..) {
            self.registry.unsubscribe(id);
        }
        self.accumulator = 0.0;
        self.state = SceneState::Editing;
        log::info!("Runtime stopped");
        Ok(())
    }

    /// Subscribe an observer that is removed at the next `runtime_stop`
    pub fn subscribe_runtime(&mut self, observer: Box<dyn LifecycleObserver>) -> ObserverId {
        let id = self.registry.subscribe(observer);
        self.runtime_observers.push(id);
        id
    }

    /// Advance one frame of `dt` seconds of wall time
    pub fn frame_update(&mut self, dt: f32) {
        self.stats.frames += 1;
        self.stats.physics_steps_last_frame = 0;

        if self.state.is_running() {
            self.script_phase(dt);
            self.physics.release_removed(&mut self.registry);
            let steps = self.physics_phase(dt);
            self.stats.physics_steps_last_frame = steps;
            self.stats.physics_steps_total += u64::from(steps);
            self.physics.sync_transforms(&mut self.registry);
            self.deliver_contacts();
        }

        match self.cameras.resolve(&mut self.registry) {
            Some(camera) => self.stats.rendered_items = self.render_phase(&camera),
            None => {
                log::trace!("No primary camera, render skipped");
                self.stats.rendered_items = 0;
            }
        }

        self.apply_commands();
        let purged = self.registry.apply_pending_destructions();
        self.physics.release_removed(&mut self.registry);

        self.stats.destroyed_last_frame = purged;
        self.stats.entity_count = self.registry.entity_count();
    }

    fn script_phase(&mut self, dt: f32) {
        let Some(script) = self.script.as_mut() else {
            return;
        };
        if self.reload.take() {
            log::debug!("Script reload requested");
            script.on_reload_requested();
        }
        script.on_update(dt, &mut self.registry);
    }

    fn physics_phase(&mut self, dt: f32) -> u32 {
        if dt.is_finite() && dt > 0.0 {
            self.accumulator += dt;
        } else {
            log::warn!("Ignoring invalid frame time {dt} for physics");
        }

        let fixed_step = self.config.fixed_step;
        let mut steps = 0;
        while self.accumulator >= fixed_step && steps < self.config.max_steps_per_frame {
            self.physics.step(fixed_step);
            self.accumulator -= fixed_step;
            steps += 1;
        }

        if self.accumulator >= fixed_step {
            log::debug!(
                "Physics fell behind by {:.4}s after {steps} steps, dropping backlog",
                self.accumulator
            );
            self.accumulator = 0.0;
            self.stats.clamped_frames += 1;
        }
        log::trace!("Physics took {steps} steps");
        steps
    }

    fn deliver_contacts(&mut self) {
        self.contacts.clear();
        if self.physics.drain_contacts(&mut self.contacts) == 0 {
            return;
        }
        if let Some(script) = self.script.as_mut() {
            for contact in &self.contacts {
                script.on_contact(contact, &mut self.registry);
            }
            self.stats.contacts_delivered += self.contacts.len() as u64;
        }
    }

    fn render_phase(&mut self, camera: &ResolvedCamera) -> usize {
        self.render_items.clear();
        if let Some(required) = self.registry.tags_of::<TransformComponent>() {
            self.registry.query_into(required, &mut self.render_scratch);
            for &entity in &self.render_scratch {
                let mesh = self.registry.get_component::<MeshComponent>(entity).copied();
                let sprite = self.registry.get_component::<SpriteComponent>(entity).copied();
                if mesh.is_none() && sprite.is_none() {
                    continue;
                }
                let Some(transform) = self.registry.get_component::<TransformComponent>(entity) else {
                    continue;
                };
                self.render_items.push(RenderItem {
                    entity,
                    transform: transform.to_matrix(),
                    mesh,
                    sprite,
                });
            }
        }

        if let Some(renderer) = self.renderer_3d.as_mut() {
            renderer.render(&camera.camera, &camera.transform, &self.render_items);
        }
        if let Some(renderer) = self.renderer_2d.as_mut() {
            renderer.begin_scene(&camera.camera, &camera.transform);
            for item in &self.render_items {
                if let Some(sprite) = &item.sprite {
                    renderer.draw(&item.transform, sprite, item.entity);
                }
            }
            renderer.end_scene();
        }
        self.render_items.len()
    }

    fn apply_commands(&mut self) {
        self.commands.drain_into(&mut self.pending_commands);
        let mut commands = std::mem::take(&mut self.pending_commands);
        for command in commands.drain(..) {
            let result = match command {
                SceneCommand::DestroyEntity(entity) => self.registry.destroy_entity(entity),
                SceneCommand::ResizeViewport { width, height } => self.viewport_resize(width, height),
            };
            if let Err(err) = result {
                log::warn!("Dropped queued command {command:?}: {err}");
            }
        }
        self.pending_commands = commands;
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    /// Change the physics step; rejected values keep the current one
    pub fn set_fixed_step(&mut self, fixed_step: f32) -> SceneResult<()> {
        if let Err(err) = config::validate_fixed_step(fixed_step) {
            log::warn!("Rejected fixed step: {err}");
            return Err(err);
        }
        self.config.fixed_step = fixed_step;
        Ok(())
    }

    /// Change the per-frame step cap; zero is rejected
    pub fn set_max_steps_per_frame(&mut self, max_steps: u32) -> SceneResult<()> {
        if let Err(err) = config::validate_max_steps(max_steps) {
            log::warn!("Rejected max steps per frame: {err}");
            return Err(err);
        }
        self.config.max_steps_per_frame = max_steps;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Snapshots
    // ------------------------------------------------------------------

    /// Capture every entity and hand it to `serializer`
    pub fn save(&self, serializer: &mut dyn SceneSerializer) -> Result<usize, SnapshotError> {
        let snapshot = SceneSnapshot::capture(&self.registry);
        serializer.save(&snapshot)?;
        log::info!("Saved scene with {} entities", snapshot.entities.len());
        Ok(snapshot.entities.len())
    }

    /// Replace every entity with the snapshot read by `serializer`
    ///
    /// Only allowed while editing. Loaded entities get fresh ids. The snapshot
    /// is restored into a staging registry first, so a failed load leaves the
    /// current entities untouched.
    pub fn load(&mut self, serializer: &mut dyn SceneSerializer) -> Result<usize, SnapshotError> {
        if self.state != SceneState::Editing {
            return Err(SceneError::InvalidTransition {
                from: self.state,
                to: SceneState::Editing,
            }
            .into());
        }

        let snapshot = serializer.load()?;
        let mut staged = self.registry.staging();
        let mut cameras = CameraResolver::new();
        let created = snapshot.restore(&mut staged, &mut cameras)?;
        self.registry.replace_with(staged);
        self.cameras = cameras;
        if let Some((width, height)) = self.viewport {
            self.viewport_resize(width, height)?;
        }
        log::info!("Loaded scene with {} entities", created.len());
        Ok(created.len())
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Cloneable sender for requests from other threads
    pub fn command_sender(&self) -> CommandSender {
        self.commands.sender()
    }

    /// Cloneable flag a watcher raises to request a script reload
    pub fn reload_flag(&self) -> ReloadFlag {
        self.reload.clone()
    }

    /// Current lifecycle state
    pub const fn state(&self) -> SceneState {
        self.state
    }

    /// Frame statistics
    pub const fn stats(&self) -> &SceneStats {
        &self.stats
    }

    /// Active configuration
    pub const fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Unconsumed simulation time
    pub const fn accumulator(&self) -> f32 {
        self.accumulator
    }

    /// Last accepted viewport size
    pub const fn viewport(&self) -> Option<(u32, u32)> {
        self.viewport
    }

    /// Entity registry
    pub const fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    /// Mutable entity registry
    pub fn registry_mut(&mut self) -> &mut EntityRegistry {
        &mut self.registry
    }

    /// Physics bridge
    pub const fn physics(&self) -> &PhysicsBridge {
        &self.physics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::RigidBodyComponent;
    use crate::scene::snapshot::EntitySnapshot;
    use approx::assert_relative_eq;

    struct FixedSnapshot(SceneSnapshot);

    impl SceneSerializer for FixedSnapshot {
        fn save(&mut self, snapshot: &SceneSnapshot) -> Result<(), SnapshotError> {
            self.0 = snapshot.clone();
            Ok(())
        }

        fn load(&mut self) -> Result<SceneSnapshot, SnapshotError> {
            Ok(self.0.clone())
        }
    }

    fn running_scene() -> Scene {
        let mut scene = Scene::new(SceneConfig::default()).unwrap();
        let ball = scene.create_entity("ball").unwrap();
        scene
            .registry_mut()
            .add_component(ball, RigidBodyComponent::dynamic())
            .unwrap();
        scene.runtime_start().unwrap();
        scene
    }

    #[test]
    fn test_state_transitions() {
        let mut scene = Scene::new(SceneConfig::default()).unwrap();
        assert_eq!(scene.state(), SceneState::Editing);
        assert!(scene.runtime_stop().is_err());

        scene.runtime_start().unwrap();
        assert_eq!(scene.state(), SceneState::RuntimeRunning);
        assert_eq!(
            scene.runtime_start(),
            Err(SceneError::InvalidTransition {
                from: SceneState::RuntimeRunning,
                to: SceneState::RuntimeStarting,
            })
        );

        scene.runtime_stop().unwrap();
        assert_eq!(scene.state(), SceneState::Editing);
        assert!(!scene.physics().is_initialized());
    }

    #[test]
    fn test_large_dt_is_clamped() {
        let mut scene = running_scene();
        scene.frame_update(1.0);
        assert_eq!(scene.stats().physics_steps_last_frame, 5);
        assert_eq!(scene.stats().clamped_frames, 1);
        assert_relative_eq!(scene.accumulator(), 0.0);
    }

    #[test]
    fn test_small_dt_accumulates() {
        let mut scene = running_scene();
        scene.frame_update(0.01);
        assert_eq!(scene.stats().physics_steps_last_frame, 0);
        scene.frame_update(0.01);
        assert_eq!(scene.stats().physics_steps_last_frame, 1);
        assert!(scene.accumulator() < scene.config().fixed_step);
    }

    #[test]
    fn test_editing_frames_skip_physics() {
        let mut scene = Scene::new(SceneConfig::default()).unwrap();
        scene.frame_update(1.0);
        assert_eq!(scene.stats().physics_steps_total, 0);
        assert_relative_eq!(scene.accumulator(), 0.0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SceneConfig {
            fixed_step: 0.0,
            ..SceneConfig::default()
        };
        assert!(matches!(Scene::new(config), Err(SceneError::InvalidFixedStep(_))));
    }

    #[test]
    fn test_rejected_setters_keep_values() {
        let mut scene = Scene::new(SceneConfig::default()).unwrap();
        assert!(scene.set_fixed_step(f32::NAN).is_err());
        assert!(scene.set_max_steps_per_frame(0).is_err());
        assert_relative_eq!(scene.config().fixed_step, config::DEFAULT_FIXED_STEP);
        assert_eq!(scene.config().max_steps_per_frame, config::DEFAULT_MAX_STEPS_PER_FRAME);
    }
    #[test]
    fn test_failed_load_keeps_current_entities() {
        let mut scene = Scene::new(SceneConfig::default()).unwrap();
        let keep = scene.create_entity("keep").unwrap();
        let named = |name: &str| EntitySnapshot {
            name: name.to_string(),
            ..EntitySnapshot::default()
        };
        let mut serializer = FixedSnapshot(SceneSnapshot {
            entities: vec![named("a"), named("b")],
        });

        scene.registry.set_next_id(u64::MAX - 1);
        let result = scene.load(&mut serializer);

        assert!(matches!(result, Err(SnapshotError::Scene(SceneError::IdSpaceExhausted))));
        assert_eq!(scene.registry().entity_count(), 1);
        assert_eq!(scene.registry().name(keep), Some("keep"));
        assert!(scene.registry().has_component::<TransformComponent>(keep));
    }

    #[test]
    fn test_load_replaces_entities() {
        let mut scene = Scene::new(SceneConfig::default()).unwrap();
        let old = scene.create_entity("old").unwrap();
        let mut serializer = FixedSnapshot(SceneSnapshot::default());
        scene.save(&mut serializer).unwrap();
        scene.registry_mut().destroy_entity(old).unwrap();
        scene.registry_mut().apply_pending_destructions();
        scene.create_entity("other").unwrap();

        assert_eq!(scene.load(&mut serializer).unwrap(), 1);
        let loaded = scene.registry().find_by_name("old").unwrap();
        assert!(loaded.id() > old.id());
        assert_eq!(scene.registry().entity_count(), 1);
    }
}
