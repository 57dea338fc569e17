//! Headless scene demo
//!
//! Drops a handful of balls onto a static floor, runs the simulation from a
//! wall clock for a few seconds and logs what the renderers would draw.
//!
//! Usage: `scene_demo [config.toml|config.ron]`

use rand::Rng;
use scene_engine::foundation::time::FrameClock;
use scene_engine::prelude::*;
use std::time::Duration;

const BALL_COUNT: usize = 8;
const FRAME_COUNT: u64 = 240;
const FRAME_BUDGET: Duration = Duration::from_millis(16);

/// Destroys balls that leave the play area and logs contacts
struct DemoScript {
    kill_height: f32,
    scratch: Vec<Entity>,
}

impl ScriptCollaborator for DemoScript {
    fn on_runtime_start(&mut self, registry: &mut EntityRegistry) {
        log::info!("Script started with {} entities", registry.entity_count());
    }

    fn on_update(&mut self, _dt: f32, registry: &mut EntityRegistry) {
        let Some(required) = registry.tags_of::<(RigidBodyComponent, TransformComponent)>() else {
            return;
        };
        registry.query_into(required, &mut self.scratch);
        for &entity in &self.scratch {
            let fell = registry
                .get_component::<TransformComponent>(entity)
                .is_some_and(|transform| transform.position.y < self.kill_height);
            if fell && registry.destroy_entity(entity).is_ok() {
                log::info!("{} left the play area", registry.name(entity).unwrap_or("?"));
            }
        }
    }

    fn on_contact(&mut self, contact: &EntityContact, registry: &mut EntityRegistry) {
        log::debug!(
            "{:?} contact: {} / {}",
            contact.phase,
            registry.name(contact.entity_a).unwrap_or("?"),
            registry.name(contact.entity_b).unwrap_or("?")
        );
    }

    fn on_runtime_stop(&mut self, registry: &mut EntityRegistry) {
        log::info!("Script stopped with {} entities", registry.entity_count());
    }
}

/// Counts what a 3D pass would submit
struct LogRenderer3D {
    frames: u64,
}

impl Render3DCollaborator for LogRenderer3D {
    fn render(&mut self, camera: &SceneCamera, _camera_transform: &Mat4, items: &[RenderItem]) {
        self.frames += 1;
        if self.frames % 60 == 0 {
            log::info!(
                "3D pass {}: {} items, aspect {:.2}",
                self.frames,
                items.iter().filter(|item| item.mesh.is_some()).count(),
                camera.aspect_ratio()
            );
        }
    }
}

/// Traces every sprite a 2D pass would draw
struct LogRenderer2D;

impl Render2DCollaborator for LogRenderer2D {
    fn begin_scene(&mut self, _camera: &SceneCamera, _camera_transform: &Mat4) {}

    fn draw(&mut self, transform: &Mat4, _sprite: &SpriteComponent, entity: Entity) {
        log::trace!("Sprite {entity} at ({:.2}, {:.2})", transform[(0, 3)], transform[(1, 3)]);
    }

    fn end_scene(&mut self) {}
}

fn load_config() -> Result<SceneConfig, Box<dyn std::error::Error>> {
    match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading scene config from {path}");
            Ok(SceneConfig::load_from_file(&path)?)
        }
        None => Ok(SceneConfig::default()),
    }
}

fn build_scene(config: SceneConfig) -> Result<Scene, SceneError> {
    let mut scene = Scene::new(config)?;
    scene.set_script(Box::new(DemoScript {
        kill_height: -20.0,
        scratch: Vec::new(),
    }));
    scene.set_renderer_3d(Box::new(LogRenderer3D { frames: 0 }));
    scene.set_renderer_2d(Box::new(LogRenderer2D));
    scene.viewport_resize(1280, 720)?;

    let camera = scene.add_camera(
        "Main Camera",
        CameraComponent::new(SceneCamera::perspective(60.0, 0.1, 500.0)),
        TransformComponent::from_position(Vec3::new(0.0, 5.0, 30.0)),
    )?;
    scene.set_primary_camera(camera)?;

    let floor = scene.create_entity("Floor")?;
    let registry = scene.registry_mut();
    registry.add_component(floor, TransformComponent::from_position(Vec3::new(0.0, -50.0, 0.0)))?;
    registry.add_component(floor, RigidBodyComponent::fixed())?;
    registry.add_component(floor, ColliderComponent::sphere(49.0))?;
    registry.add_component(floor, MeshComponent::new(0, 0))?;

    let mut rng = rand::thread_rng();
    for i in 0..BALL_COUNT {
        let ball = scene.create_entity(format!("Ball {i}"))?;
        let position = Vec3::new(rng.gen_range(-5.0..5.0), rng.gen_range(5.0..15.0), 0.0);
        let velocity = Vec3::new(rng.gen_range(-2.0..2.0), 0.0, 0.0);
        let color = Vec4::new(rng.gen(), rng.gen(), rng.gen(), 1.0);

        let registry = scene.registry_mut();
        registry.add_component(ball, TransformComponent::from_position(position))?;
        registry.add_component(ball, RigidBodyComponent::dynamic().with_velocity(velocity))?;
        registry.add_component(ball, ColliderComponent::sphere(0.5).with_restitution(0.6))?;
        registry.add_component(ball, SpriteComponent::new(color))?;
        registry.add_component(ball, MeshComponent::new(1, 1))?;
    }

    Ok(scene)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("Starting scene demo");
    let mut scene = build_scene(load_config()?)?;
    scene.runtime_start()?;

    let mut clock = FrameClock::new();
    while clock.frame_count() < FRAME_COUNT {
        std::thread::sleep(FRAME_BUDGET);
        let dt = clock.tick();
        scene.frame_update(dt);
    }

    scene.runtime_stop()?;
    let stats = scene.stats();
    log::info!(
        "Finished {} frames: {} physics steps ({:.2}/frame), {} clamped, {} contacts, {} entities left",
        stats.frames,
        stats.physics_steps_total,
        stats.average_steps_per_frame(),
        stats.clamped_frames,
        stats.contacts_delivered,
        stats.entity_count
    );
    log::info!("Average frame rate {:.1} fps", clock.average_fps());
    Ok(())
}
