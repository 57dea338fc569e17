//! Runtime start/stop, physics teardown and cross-thread requests

mod common;

use common::{log, weightless_config, MemorySerializer, RecordingScript, RecordingWorld};
use scene_engine::ecs::LifecycleObserver;
use scene_engine::physics::{ContactPhase, PhysicsWorld};
use scene_engine::prelude::*;
use scene_engine::scene::{SceneCommand, SnapshotError};
use std::sync::{Arc, Mutex};

struct DestroyCounter(Arc<Mutex<usize>>);

impl LifecycleObserver for DestroyCounter {
    fn on_entity_destroyed(&mut self, _entity: Entity, _name: &str) {
        *self.0.lock().unwrap() += 1;
    }
}

#[test]
fn test_shutdown_order() {
    let calls = log::<String>();
    let listener = Arc::new(Mutex::new(None));
    let factory_calls = calls.clone();
    let factory_listener = listener.clone();
    let mut scene = Scene::with_physics_world(
        SceneConfig::default(),
        Box::new(move |gravity| -> Box<dyn PhysicsWorld> {
            Box::new(RecordingWorld::new(gravity, factory_calls.clone(), factory_listener.clone()))
        }),
    )
    .unwrap();
    for i in 0..3 {
        let entity = scene.create_entity(format!("body{i}")).unwrap();
        scene
            .registry_mut()
            .add_component(entity, RigidBodyComponent::dynamic())
            .unwrap();
    }

    scene.runtime_start().unwrap();
    scene.frame_update(1.0 / 60.0);
    calls.lock().unwrap().clear();
    scene.runtime_stop().unwrap();

    let calls = calls.lock().unwrap().clone();
    assert_eq!(
        calls,
        vec!["destroy", "destroy", "destroy", "clear_listener", "drop"]
    );
    assert_eq!(scene.physics().body_count(), 0);
    assert!(listener.lock().unwrap().is_some());
}

#[test]
fn test_restart_recreates_bodies() {
    let mut scene = Scene::new(SceneConfig::default()).unwrap();
    let entity = scene.create_entity("ball").unwrap();
    scene
        .registry_mut()
        .add_component(entity, RigidBodyComponent::dynamic())
        .unwrap();

    scene.runtime_start().unwrap();
    let first = scene.physics().body_of(entity);
    scene.runtime_stop().unwrap();
    assert!(scene.physics().body_of(entity).is_none());

    scene.runtime_start().unwrap();
    assert!(scene.physics().body_of(entity).is_some());
    assert!(first.is_some());
}

#[test]
fn test_contacts_reach_script_as_entities() {
    let mut scene = Scene::new(weightless_config()).unwrap();
    let script = RecordingScript::default();
    let contacts = script.contacts.clone();
    scene.set_script(Box::new(script));

    let left = scene.create_entity("left").unwrap();
    let right = scene.create_entity("right").unwrap();
    for (entity, x, vx) in [(left, -1.0, 2.0), (right, 1.0, -2.0)] {
        let registry = scene.registry_mut();
        registry
            .add_component(entity, TransformComponent::from_position(Vec3::new(x, 0.0, 0.0)))
            .unwrap();
        registry
            .add_component(entity, RigidBodyComponent::dynamic().with_velocity(Vec3::new(vx, 0.0, 0.0)))
            .unwrap();
        registry.add_component(entity, ColliderComponent::sphere(0.5)).unwrap();
    }

    scene.runtime_start().unwrap();
    for _ in 0..60 {
        scene.frame_update(1.0 / 60.0);
    }

    let contacts = contacts.lock().unwrap();
    let first = contacts.first().copied().unwrap();
    assert_eq!(first.phase, ContactPhase::Begin);
    assert_eq!((first.entity_a, first.entity_b), (left, right));
    assert_eq!(scene.stats().contacts_delivered, contacts.len() as u64);
}

#[test]
fn test_runtime_observers_unsubscribed_on_stop() {
    let count = Arc::new(Mutex::new(0));
    let mut scene = Scene::new(SceneConfig::default()).unwrap();
    scene.runtime_start().unwrap();
    scene.subscribe_runtime(Box::new(DestroyCounter(count.clone())));

    let a = scene.create_entity("a").unwrap();
    scene.destroy_entity(a).unwrap();
    scene.destroy_entity(a).unwrap();
    scene.frame_update(1.0 / 60.0);
    assert_eq!(*count.lock().unwrap(), 1);

    scene.runtime_stop().unwrap();
    assert_eq!(scene.registry().observer_count(), 0);

    let b = scene.create_entity("b").unwrap();
    scene.destroy_entity(b).unwrap();
    scene.frame_update(1.0 / 60.0);
    assert_eq!(*count.lock().unwrap(), 1);
}

#[test]
fn test_commands_from_other_threads() {
    let mut scene = Scene::new(SceneConfig::default()).unwrap();
    let camera = scene
        .add_camera("camera", CameraComponent::default(), TransformComponent::identity())
        .unwrap();
    let target = scene.create_entity("target").unwrap();
    let sender = scene.command_sender();

    std::thread::spawn(move || {
        sender.send(SceneCommand::DestroyEntity(target));
        sender.send(SceneCommand::ResizeViewport { width: 300, height: 100 });
        sender.send(SceneCommand::ResizeViewport { width: 0, height: 100 });
    })
    .join()
    .unwrap();

    assert!(scene.registry().is_alive(target));
    scene.frame_update(1.0 / 60.0);

    assert!(!scene.registry().is_alive(target));
    assert_eq!(scene.viewport(), Some((300, 100)));
    let aspect = scene
        .registry()
        .get_component::<CameraComponent>(camera)
        .unwrap()
        .camera
        .aspect_ratio();
    approx::assert_relative_eq!(aspect, 3.0);
}

#[test]
fn test_unknown_entity_operations() {
    let mut scene = Scene::new(SceneConfig::default()).unwrap();
    let a = scene.create_entity("a").unwrap();
    scene.destroy_entity(a).unwrap();
    scene.frame_update(1.0 / 60.0);

    assert_eq!(scene.destroy_entity(a), Err(SceneError::EntityNotFound(a)));
    assert_eq!(scene.duplicate_entity(a), Err(SceneError::EntityNotFound(a)));
    assert_eq!(scene.set_primary_camera(a), Err(SceneError::EntityNotFound(a)));
    assert!(scene.registry().get_component::<TransformComponent>(a).is_none());
    assert_eq!(SceneError::EntityNotFound(a).kind(), ErrorKind::Lifecycle);
}

#[test]
fn test_snapshot_round_trip() {
    let mut scene = Scene::new(SceneConfig::default()).unwrap();
    let camera = scene
        .add_camera("camera", CameraComponent::default(), TransformComponent::identity())
        .unwrap();
    scene.set_primary_camera(camera).unwrap();
    let ball = scene.create_entity("ball").unwrap();
    scene
        .registry_mut()
        .add_component(ball, ColliderComponent::sphere(2.0))
        .unwrap();

    let mut serializer = MemorySerializer::default();
    assert_eq!(scene.save(&mut serializer).unwrap(), 2);

    scene.runtime_start().unwrap();
    assert!(matches!(
        scene.load(&mut serializer),
        Err(SnapshotError::Scene(SceneError::InvalidTransition { .. }))
    ));
    scene.runtime_stop().unwrap();

    assert_eq!(scene.load(&mut serializer).unwrap(), 2);
    let loaded_ball = scene.registry().find_by_name("ball").unwrap();
    assert!(loaded_ball.id() > ball.id());
    assert!(!scene.registry().is_alive(ball));
    assert_eq!(
        scene.registry().get_component::<ColliderComponent>(loaded_ball),
        Some(&ColliderComponent::sphere(2.0))
    );
    let primary = scene.primary_camera().unwrap();
    assert_eq!(scene.registry().name(primary), Some("camera"));
}

#[test]
fn test_config_file_round_trip() {
    let path = std::env::temp_dir().join("scene_engine_runtime_config.toml");
    let path = path.to_string_lossy().to_string();
    let config = SceneConfig {
        max_steps_per_frame: 3,
        ..SceneConfig::default()
    };
    config.save_to_file(&path).unwrap();
    let loaded = SceneConfig::load_from_file(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded.max_steps_per_frame, 3);
    let mut scene = Scene::new(loaded).unwrap();
    let ball = scene.create_entity("ball").unwrap();
    scene
        .registry_mut()
        .add_component(ball, RigidBodyComponent::dynamic())
        .unwrap();
    scene.runtime_start().unwrap();
    scene.frame_update(1.0);
    assert_eq!(scene.stats().physics_steps_last_frame, 3);
}
