//! Per-frame orchestration scenarios

mod common;

use common::{Recording2D, Recording3D, RecordingScript};
use scene_engine::physics::{BodyDesc, PointMassWorld};
use scene_engine::prelude::*;

fn scene_with_bodies(count: usize) -> (Scene, Vec<Entity>) {
    let mut scene = Scene::new(SceneConfig::default()).unwrap();
    let entities = (0..count)
        .map(|i| {
            let entity = scene.create_entity(format!("body{i}")).unwrap();
            #[allow(clippy::cast_precision_loss)]
            let position = Vec3::new(i as f32 * 10.0, 5.0, 0.0);
            let registry = scene.registry_mut();
            registry
                .add_component(entity, TransformComponent::from_position(position))
                .unwrap();
            registry.add_component(entity, RigidBodyComponent::dynamic()).unwrap();
            entity
        })
        .collect();
    (scene, entities)
}

#[test]
fn test_transforms_follow_physics() {
    let (mut scene, entities) = scene_with_bodies(3);
    scene.runtime_start().unwrap();
    for _ in 0..10 {
        scene.frame_update(1.0 / 60.0);
    }

    let mut world = PointMassWorld::new(Vec3::new(0.0, -9.81, 0.0));
    let handles: Vec<_> = (0..3)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let position = Vec3::new(i as f32 * 10.0, 5.0, 0.0);
            world
                .create_body(&BodyDesc {
                    body_type: BodyType::Dynamic,
                    position,
                    rotation: Quat::identity(),
                    linear_velocity: Vec3::zeros(),
                    gravity_scale: 1.0,
                    fixed_rotation: false,
                    fixture: None,
                })
                .unwrap()
        })
        .collect();
    for _ in 0..10 {
        world.step(1.0 / 60.0, 8, 3);
    }

    assert_eq!(scene.stats().physics_steps_total, 10);
    for (entity, handle) in entities.iter().zip(handles) {
        let transform = scene.registry().get_component::<TransformComponent>(*entity).unwrap();
        assert_eq!(transform.position, world.body_pose(handle).unwrap().position);
        assert!(transform.position.y < 5.0);
    }
}

#[test]
fn test_script_receives_real_dt() {
    let script = RecordingScript::default();
    let dts = script.dts.clone();
    let mut scene = Scene::new(SceneConfig::default()).unwrap();
    scene.set_script(Box::new(script));
    scene.runtime_start().unwrap();

    scene.frame_update(0.0123);
    scene.frame_update(0.25);
    assert_eq!(*dts.lock().unwrap(), vec![0.0123, 0.25]);
}

#[test]
fn test_accumulator_bound_holds_for_any_dt() {
    let (mut scene, _) = scene_with_bodies(1);
    scene.runtime_start().unwrap();
    let fixed_step = scene.config().fixed_step;
    let max_steps = scene.config().max_steps_per_frame;

    // Deterministic spread of frame times from 0 to ~0.5s
    let mut seed: u32 = 12345;
    for _ in 0..500 {
        seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12345);
        #[allow(clippy::cast_precision_loss)]
        let dt = (seed >> 16) as f32 / 65536.0 * 0.5;
        scene.frame_update(dt);

        assert!(scene.stats().physics_steps_last_frame <= max_steps);
        assert!(scene.accumulator() >= 0.0);
        assert!(scene.accumulator() < fixed_step);
    }
}

#[test]
fn test_destroy_during_frame_is_applied_at_barrier() {
    let (mut scene, entities) = scene_with_bodies(3);
    let script = RecordingScript::default();
    let destroy_next = script.destroy_next.clone();
    scene.set_script(Box::new(script));
    scene.runtime_start().unwrap();

    let doomed = entities[1];
    let required = scene.registry().tags_of::<(RigidBodyComponent, TransformComponent)>().unwrap();
    assert!(scene.registry_mut().query(required).contains(&doomed));

    *destroy_next.lock().unwrap() = Some(doomed);
    scene.frame_update(1.0 / 60.0);

    assert!(!scene.registry_mut().query(required).contains(&doomed));
    assert!(!scene.registry().is_alive(doomed));
    assert!(scene.physics().body_of(doomed).is_none());
    assert_eq!(scene.physics().body_count(), 2);
    assert_eq!(scene.stats().destroyed_last_frame, 1);
}

#[test]
fn test_rigid_body_removed_mid_run_releases_body() {
    let (mut scene, entities) = scene_with_bodies(2);
    scene.runtime_start().unwrap();
    scene
        .registry_mut()
        .remove_component::<RigidBodyComponent>(entities[0]);
    scene.frame_update(1.0 / 60.0);

    assert!(scene.physics().body_of(entities[0]).is_none());
    assert_eq!(scene.physics().body_count(), 1);
}

#[test]
fn test_render_dispatch_once_per_renderer() {
    let mut scene = Scene::new(SceneConfig::default()).unwrap();
    let renderer_3d = Recording3D::default();
    let renderer_2d = Recording2D::default();
    let calls_3d = renderer_3d.calls.clone();
    let events_2d = renderer_2d.events.clone();
    scene.set_renderer_3d(Box::new(renderer_3d));
    scene.set_renderer_2d(Box::new(renderer_2d));

    let sprite = scene.create_entity("sprite").unwrap();
    scene
        .registry_mut()
        .add_component(sprite, SpriteComponent::default())
        .unwrap();
    let mesh = scene.create_entity("mesh").unwrap();
    scene
        .registry_mut()
        .add_component(mesh, MeshComponent::new(1, 2))
        .unwrap();
    scene.create_entity("empty").unwrap();

    scene.frame_update(1.0 / 60.0);
    assert!(calls_3d.lock().unwrap().is_empty());
    assert!(events_2d.lock().unwrap().is_empty());

    let camera = scene
        .add_camera("camera", CameraComponent::default(), TransformComponent::identity())
        .unwrap();
    scene.set_primary_camera(camera).unwrap();
    scene.frame_update(1.0 / 60.0);

    assert_eq!(*calls_3d.lock().unwrap(), vec![vec![sprite, mesh]]);
    assert_eq!(
        *events_2d.lock().unwrap(),
        vec!["begin".to_string(), format!("draw {sprite}"), "end".to_string()]
    );
    assert_eq!(scene.stats().rendered_items, 2);
}

#[test]
fn test_editing_frame_skips_script() {
    let script = RecordingScript::default();
    let dts = script.dts.clone();
    let mut scene = Scene::new(SceneConfig::default()).unwrap();
    scene.set_script(Box::new(script));

    scene.frame_update(1.0 / 60.0);
    assert!(dts.lock().unwrap().is_empty());
}

#[test]
fn test_reload_flag_reaches_script_once() {
    let script = RecordingScript::default();
    let reloads = script.reloads.clone();
    let mut scene = Scene::new(SceneConfig::default()).unwrap();
    scene.set_script(Box::new(script));
    scene.runtime_start().unwrap();

    let flag = scene.reload_flag();
    std::thread::spawn(move || flag.request()).join().unwrap();
    scene.frame_update(1.0 / 60.0);
    scene.frame_update(1.0 / 60.0);
    assert_eq!(reloads.lock().unwrap().len(), 1);
}

#[test]
fn test_colliders_added_while_running_collide() {
    let mut scene = Scene::new(common::weightless_config()).unwrap();
    let balls: Vec<Entity> = [(-2.0, 2.0), (2.0, -2.0)]
        .into_iter()
        .map(|(x, vx)| {
            let entity = scene.create_entity("ball").unwrap();
            let registry = scene.registry_mut();
            registry
                .add_component(entity, TransformComponent::from_position(Vec3::new(x, 0.0, 0.0)))
                .unwrap();
            registry
                .add_component(entity, RigidBodyComponent::dynamic().with_velocity(Vec3::new(vx, 0.0, 0.0)))
                .unwrap();
            entity
        })
        .collect();
    let script = RecordingScript::default();
    scene.set_script(Box::new(script.clone()));
    scene.runtime_start().unwrap();

    for &ball in &balls {
        scene
            .registry_mut()
            .add_component(ball, ColliderComponent::sphere(0.5))
            .unwrap();
    }
    for _ in 0..60 {
        scene.frame_update(1.0 / 60.0);
    }

    assert!(!script.contacts.lock().unwrap().is_empty());
}

#[test]
fn test_switching_body_type_while_running() {
    let mut scene = Scene::new(SceneConfig::default()).unwrap();
    let crate_entity = scene.create_entity("crate").unwrap();
    let registry = scene.registry_mut();
    registry
        .add_component(crate_entity, TransformComponent::from_position(Vec3::new(0.0, 10.0, 0.0)))
        .unwrap();
    registry.add_component(crate_entity, RigidBodyComponent::fixed()).unwrap();
    scene.runtime_start().unwrap();
    scene.frame_update(1.0 / 60.0);

    scene
        .registry_mut()
        .add_component(crate_entity, RigidBodyComponent::dynamic())
        .unwrap();
    for _ in 0..30 {
        scene.frame_update(1.0 / 60.0);
    }

    let y = scene
        .registry()
        .get_component::<TransformComponent>(crate_entity)
        .unwrap()
        .position
        .y;
    assert!(y < 10.0);
    assert_eq!(scene.physics().body_count(), 1);
}
