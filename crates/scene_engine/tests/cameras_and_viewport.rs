//! Primary camera and viewport behavior through the scene API

mod common;

use common::primary_count;
use approx::assert_relative_eq;
use scene_engine::prelude::*;

#[test]
fn test_zero_viewport_is_rejected() {
    let mut scene = Scene::new(SceneConfig::default()).unwrap();
    let camera = scene
        .add_camera("camera", CameraComponent::default(), TransformComponent::identity())
        .unwrap();
    scene.viewport_resize(800, 600).unwrap();
    let before = scene.registry().get_component::<CameraComponent>(camera).unwrap().clone();

    assert_eq!(
        scene.viewport_resize(0, 600),
        Err(SceneError::InvalidViewport { width: 0, height: 600 })
    );
    let after = scene.registry().get_component::<CameraComponent>(camera).unwrap();
    assert_relative_eq!(after.camera.aspect_ratio(), before.camera.aspect_ratio());
    assert_eq!(after.camera.projection_matrix(), before.camera.projection_matrix());
    assert_eq!(scene.viewport(), Some((800, 600)));
}

#[test]
fn test_resize_skips_fixed_aspect_cameras() {
    let mut scene = Scene::new(SceneConfig::default()).unwrap();
    let free = scene
        .add_camera("free", CameraComponent::default(), TransformComponent::identity())
        .unwrap();
    let fixed = scene
        .add_camera(
            "fixed",
            CameraComponent::default().with_fixed_aspect_ratio(),
            TransformComponent::identity(),
        )
        .unwrap();
    let fixed_aspect = scene
        .registry()
        .get_component::<CameraComponent>(fixed)
        .unwrap()
        .camera
        .aspect_ratio();

    scene.viewport_resize(1000, 500).unwrap();
    let registry = scene.registry();
    assert_relative_eq!(registry.get_component::<CameraComponent>(free).unwrap().camera.aspect_ratio(), 2.0);
    assert_relative_eq!(
        registry.get_component::<CameraComponent>(fixed).unwrap().camera.aspect_ratio(),
        fixed_aspect
    );
}

#[test]
fn test_new_camera_takes_current_viewport() {
    let config = SceneConfig {
        initial_viewport: Some([400, 400]),
        ..SceneConfig::default()
    };
    let mut scene = Scene::new(config).unwrap();
    let camera = scene
        .add_camera("camera", CameraComponent::default(), TransformComponent::identity())
        .unwrap();
    let aspect = scene
        .registry()
        .get_component::<CameraComponent>(camera)
        .unwrap()
        .camera
        .aspect_ratio();
    assert_relative_eq!(aspect, 1.0);
}

#[test]
fn test_primary_camera_stays_unique() {
    let mut scene = Scene::new(SceneConfig::default()).unwrap();
    let cameras: Vec<_> = (0..4)
        .map(|i| {
            scene
                .add_camera(format!("cam{i}"), CameraComponent::default(), TransformComponent::identity())
                .unwrap()
        })
        .collect();

    for &camera in cameras.iter().chain(cameras.iter().rev()) {
        scene.set_primary_camera(camera).unwrap();
        assert_eq!(primary_count(scene.registry()), 1);
        assert_eq!(scene.primary_camera(), Some(camera));
    }

    let primary = cameras[0];
    let copy = scene.duplicate_entity(primary).unwrap();
    assert!(!scene.registry().get_component::<CameraComponent>(copy).unwrap().is_primary());
    assert_eq!(primary_count(scene.registry()), 1);

    scene
        .registry_mut()
        .add_component(cameras[1], CameraComponent::default())
        .unwrap();
    assert_eq!(primary_count(scene.registry()), 1);

    scene.registry_mut().remove_component::<CameraComponent>(primary);
    assert_eq!(primary_count(scene.registry()), 0);
    assert_eq!(scene.primary_camera(), None);
}
