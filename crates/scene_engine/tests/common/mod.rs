//! Recording collaborators shared by the integration tests
#![allow(dead_code)]

use scene_engine::foundation::collections::BodyHandle;
use scene_engine::physics::{BodyDesc, BodyPose, ContactListener, FixtureDesc, PointMassWorld};
use scene_engine::prelude::*;
use scene_engine::scene::{SceneSnapshot, SnapshotError};
use std::sync::{Arc, Mutex};

pub type Log<T> = Arc<Mutex<Vec<T>>>;

pub fn log<T>() -> Log<T> {
    Arc::new(Mutex::new(Vec::new()))
}

/// Script that records what the scene hands it
#[derive(Default, Clone)]
pub struct RecordingScript {
    pub dts: Log<f32>,
    pub contacts: Log<EntityContact>,
    pub reloads: Log<()>,
    pub lifecycle: Log<&'static str>,
    /// Destroy this entity during the next update
    pub destroy_next: Arc<Mutex<Option<Entity>>>,
}

impl ScriptCollaborator for RecordingScript {
    fn on_runtime_start(&mut self, _registry: &mut EntityRegistry) {
        self.lifecycle.lock().unwrap().push("start");
    }

    fn on_update(&mut self, dt: f32, registry: &mut EntityRegistry) {
        self.dts.lock().unwrap().push(dt);
        if let Some(entity) = self.destroy_next.lock().unwrap().take() {
            registry.destroy_entity(entity).unwrap();
        }
    }

    fn on_contact(&mut self, contact: &EntityContact, _registry: &mut EntityRegistry) {
        self.contacts.lock().unwrap().push(*contact);
    }

    fn on_reload_requested(&mut self) {
        self.reloads.lock().unwrap().push(());
    }

    fn on_runtime_stop(&mut self, _registry: &mut EntityRegistry) {
        self.lifecycle.lock().unwrap().push("stop");
    }
}

/// 3D renderer recording the entities of every call
#[derive(Default, Clone)]
pub struct Recording3D {
    pub calls: Log<Vec<Entity>>,
}

impl Render3DCollaborator for Recording3D {
    fn render(&mut self, _camera: &SceneCamera, _transform: &Mat4, items: &[RenderItem]) {
        self.calls
            .lock()
            .unwrap()
            .push(items.iter().map(|item| item.entity).collect());
    }
}

/// 2D renderer recording begin/draw/end
#[derive(Default, Clone)]
pub struct Recording2D {
    pub events: Log<String>,
}

impl Render2DCollaborator for Recording2D {
    fn begin_scene(&mut self, _camera: &SceneCamera, _transform: &Mat4) {
        self.events.lock().unwrap().push("begin".to_string());
    }

    fn draw(&mut self, _transform: &Mat4, _sprite: &SpriteComponent, entity: Entity) {
        self.events.lock().unwrap().push(format!("draw {entity}"));
    }

    fn end_scene(&mut self) {
        self.events.lock().unwrap().push("end".to_string());
    }
}

/// Serializer keeping the snapshot as RON text in memory
#[derive(Default)]
pub struct MemorySerializer {
    pub text: Option<String>,
}

impl SceneSerializer for MemorySerializer {
    fn save(&mut self, snapshot: &SceneSnapshot) -> Result<(), SnapshotError> {
        let text = ron::to_string(snapshot).map_err(|e| SnapshotError::Format(e.to_string()))?;
        self.text = Some(text);
        Ok(())
    }

    fn load(&mut self) -> Result<SceneSnapshot, SnapshotError> {
        let text = self
            .text
            .as_deref()
            .ok_or_else(|| SnapshotError::Format("nothing saved".to_string()))?;
        ron::from_str(text).map_err(|e| SnapshotError::Format(e.to_string()))
    }
}

/// Physics world that records the calls the bridge makes
pub struct RecordingWorld {
    inner: PointMassWorld,
    pub calls: Log<String>,
    pub listener: Arc<Mutex<Option<Arc<dyn ContactListener>>>>,
}

impl RecordingWorld {
    pub fn new(gravity: Vec3, calls: Log<String>, listener: Arc<Mutex<Option<Arc<dyn ContactListener>>>>) -> Self {
        Self {
            inner: PointMassWorld::new(gravity),
            calls,
            listener,
        }
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

impl PhysicsWorld for RecordingWorld {
    fn create_body(&mut self, desc: &BodyDesc) -> SceneResult<BodyHandle> {
        self.record("create");
        self.inner.create_body(desc)
    }

    fn destroy_body(&mut self, handle: BodyHandle) -> bool {
        self.record("destroy");
        // A late callback during teardown must be harmless
        if let Some(listener) = self.listener.lock().unwrap().as_ref() {
            listener.begin_contact(handle, handle);
        }
        self.inner.destroy_body(handle)
    }

    fn set_fixture(&mut self, handle: BodyHandle, fixture: &FixtureDesc) -> bool {
        self.record("fixture");
        self.inner.set_fixture(handle, fixture)
    }

    fn body_pose(&self, handle: BodyHandle) -> Option<BodyPose> {
        self.inner.body_pose(handle)
    }

    fn step(&mut self, dt: f32, velocity_iterations: u32, position_iterations: u32) {
        self.record(format!("step {dt}"));
        self.inner.step(dt, velocity_iterations, position_iterations);
    }

    fn set_contact_listener(&mut self, listener: Arc<dyn ContactListener>) {
        self.record("set_listener");
        *self.listener.lock().unwrap() = Some(Arc::clone(&listener));
        self.inner.set_contact_listener(listener);
    }

    fn clear_contact_listener(&mut self) {
        self.record("clear_listener");
        self.inner.clear_contact_listener();
    }

    fn body_count(&self) -> usize {
        self.inner.body_count()
    }
}

impl Drop for RecordingWorld {
    fn drop(&mut self) {
        self.record("drop");
    }
}

/// Scene with a default config and zero gravity
pub fn weightless_config() -> SceneConfig {
    SceneConfig {
        gravity: [0.0, 0.0, 0.0],
        ..SceneConfig::default()
    }
}

/// Number of cameras currently flagged primary
pub fn primary_count(registry: &EntityRegistry) -> usize {
    registry
        .iter_components::<CameraComponent>()
        .filter(|(_, camera)| camera.is_primary())
        .count()
}
