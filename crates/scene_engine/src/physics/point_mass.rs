//! Reference physics world
//!
//! Bodies are point masses with a bounding-sphere fixture. Stepping applies
//! gravity, resolves overlapping pairs with impulses, integrates positions and
//! pushes overlapping bodies apart. No randomness and no clock reads, so the
//! same inputs always produce bit-identical positions.

use super::contact::ContactListener;
use super::world::{BodyDesc, BodyPose, BodyType, FixtureDesc, PhysicsWorld, WorldFactory};
use crate::error::{SceneError, SceneResult};
use crate::foundation::collections::{BodyArena, BodyHandle};
use crate::foundation::math::{Quat, Vec3};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Fraction of penetration removed per position iteration
const POSITION_CORRECTION: f32 = 0.2;

/// Penetration tolerated without correction
const PENETRATION_SLOP: f32 = 0.005;

#[derive(Debug, Clone, Copy)]
struct PointBody {
    body_type: BodyType,
    position: Vec3,
    rotation: Quat,
    velocity: Vec3,
    gravity_scale: f32,
    inverse_mass: f32,
    radius: Option<f32>,
    offset: Vec3,
    restitution: f32,
}

impl PointBody {
    fn center(&self) -> Vec3 {
        self.position + self.rotation * self.offset
    }

    fn apply_fixture(&mut self, fixture: Option<&FixtureDesc>) {
        let Some(fixture) = fixture else {
            self.radius = None;
            self.offset = Vec3::zeros();
            self.restitution = 0.0;
            self.inverse_mass = if self.body_type == BodyType::Dynamic { 1.0 } else { 0.0 };
            return;
        };

        self.radius = Some(fixture.shape.bounding_radius());
        self.offset = fixture.offset;
        self.restitution = fixture.restitution;
        let mass = fixture.density * fixture.shape.volume();
        self.inverse_mass = if self.body_type == BodyType::Dynamic && mass > 0.0 {
            1.0 / mass
        } else if self.body_type == BodyType::Dynamic {
            1.0
        } else {
            0.0
        };
    }
}

/// Overlap between two bodies, normal pointing from `a` to `b`
struct Overlap {
    a: BodyHandle,
    b: BodyHandle,
    normal: Vec3,
    depth: f32,
}

/// Deterministic point-mass physics world
pub struct PointMassWorld {
    gravity: Vec3,
    bodies: BodyArena<PointBody>,
    listener: Option<Arc<dyn ContactListener>>,
    touching: BTreeSet<(BodyHandle, BodyHandle)>,
    handles: Vec<BodyHandle>,
}

impl PointMassWorld {
    /// Empty world with the given gravity
    pub fn new(gravity: Vec3) -> Self {
        Self {
            gravity,
            bodies: BodyArena::with_key(),
            listener: None,
            touching: BTreeSet::new(),
            handles: Vec::new(),
        }
    }

    /// Factory producing a fresh `PointMassWorld` per runtime
    pub fn factory() -> WorldFactory {
        Box::new(|gravity: Vec3| -> Box<dyn PhysicsWorld> { Box::new(Self::new(gravity)) })
    }

    /// World gravity
    pub const fn gravity(&self) -> Vec3 {
        self.gravity
    }

    /// Linear velocity of a body
    pub fn velocity(&self, handle: BodyHandle) -> Option<Vec3> {
        self.bodies.get(handle).map(|body| body.velocity)
    }

    /// Whether a contact listener is attached
    pub const fn has_contact_listener(&self) -> bool {
        self.listener.is_some()
    }

    fn validate(desc: &BodyDesc) -> SceneResult<()> {
        let finite = desc.position.iter().all(|v| v.is_finite())
            && desc.linear_velocity.iter().all(|v| v.is_finite())
            && desc.gravity_scale.is_finite();
        if !finite {
            return Err(SceneError::BodyCreation("non-finite body state".to_string()));
        }
        if let Some(fixture) = &desc.fixture {
            Self::validate_fixture(fixture)?;
        }
        Ok(())
    }

    fn validate_fixture(fixture: &FixtureDesc) -> SceneResult<()> {
        if !fixture.shape.is_valid() {
            return Err(SceneError::BodyCreation(format!("invalid shape {:?}", fixture.shape)));
        }
        if !fixture.density.is_finite() || fixture.density < 0.0 {
            return Err(SceneError::BodyCreation(format!("invalid density {}", fixture.density)));
        }
        Ok(())
    }

    fn overlap(&self, a: BodyHandle, b: BodyHandle) -> Option<Overlap> {
        let body_a = self.bodies.get(a)?;
        let body_b = self.bodies.get(b)?;
        let reach = body_a.radius? + body_b.radius?;
        if body_a.inverse_mass == 0.0 && body_b.inverse_mass == 0.0 {
            return None;
        }

        let delta = body_b.center() - body_a.center();
        let distance = delta.norm();
        if distance >= reach {
            return None;
        }
        let normal = if distance > f32::EPSILON {
            delta / distance
        } else {
            Vec3::y()
        };
        Some(Overlap {
            a,
            b,
            normal,
            depth: reach - distance,
        })
    }

    fn overlaps(&self) -> Vec<Overlap> {
        let mut overlaps = Vec::new();
        for (i, &a) in self.handles.iter().enumerate() {
            for &b in &self.handles[i + 1..] {
                if let Some(overlap) = self.overlap(a, b) {
                    overlaps.push(overlap);
                }
            }
        }
        overlaps
    }

    fn resolve_velocity(&mut self, overlap: &Overlap) {
        let (Some(a), Some(b)) = (self.bodies.get(overlap.a).copied(), self.bodies.get(overlap.b).copied()) else {
            return;
        };
        let approach = (b.velocity - a.velocity).dot(&overlap.normal);
        if approach >= 0.0 {
            return;
        }
        let restitution = a.restitution.max(b.restitution);
        let impulse = -(1.0 + restitution) * approach / (a.inverse_mass + b.inverse_mass);
        if let Some(body) = self.bodies.get_mut(overlap.a) {
            body.velocity -= overlap.normal * (impulse * a.inverse_mass);
        }
        if let Some(body) = self.bodies.get_mut(overlap.b) {
            body.velocity += overlap.normal * (impulse * b.inverse_mass);
        }
    }

    fn resolve_position(&mut self, overlap: &Overlap) {
        let (Some(a), Some(b)) = (self.bodies.get(overlap.a).copied(), self.bodies.get(overlap.b).copied()) else {
            return;
        };
        let total = a.inverse_mass + b.inverse_mass;
        let correction = (overlap.depth - PENETRATION_SLOP).max(0.0) * POSITION_CORRECTION / total;
        if correction == 0.0 {
            return;
        }
        if let Some(body) = self.bodies.get_mut(overlap.a) {
            body.position -= overlap.normal * (correction * a.inverse_mass);
        }
        if let Some(body) = self.bodies.get_mut(overlap.b) {
            body.position += overlap.normal * (correction * b.inverse_mass);
        }
    }

    fn report_contacts(&mut self) {
        let current: BTreeSet<_> = self
            .overlaps()
            .into_iter()
            .map(|overlap| (overlap.a, overlap.b))
            .collect();

        if let Some(listener) = &self.listener {
            for &(a, b) in current.difference(&self.touching) {
                listener.begin_contact(a, b);
            }
            for &(a, b) in self.touching.difference(&current) {
                listener.end_contact(a, b);
            }
        }
        self.touching = current;
    }
}

impl PhysicsWorld for PointMassWorld {
    fn create_body(&mut self, desc: &BodyDesc) -> SceneResult<BodyHandle> {
        Self::validate(desc)?;
        let mut body = PointBody {
            body_type: desc.body_type,
            position: desc.position,
            rotation: desc.rotation,
            velocity: if desc.body_type == BodyType::Static {
                Vec3::zeros()
            } else {
                desc.linear_velocity
            },
            gravity_scale: desc.gravity_scale,
            inverse_mass: 0.0,
            radius: None,
            offset: Vec3::zeros(),
            restitution: 0.0,
        };
        body.apply_fixture(desc.fixture.as_ref());
        Ok(self.bodies.insert(body))
    }

    fn destroy_body(&mut self, handle: BodyHandle) -> bool {
        if self.bodies.remove(handle).is_none() {
            return false;
        }
        self.touching.retain(|&(a, b)| a != handle && b != handle);
        true
    }

    fn set_fixture(&mut self, handle: BodyHandle, fixture: &FixtureDesc) -> bool {
        if Self::validate_fixture(fixture).is_err() {
            return false;
        }
        self.bodies.get_mut(handle).is_some_and(|body| {
            body.apply_fixture(Some(fixture));
            true
        })
    }

    fn body_pose(&self, handle: BodyHandle) -> Option<BodyPose> {
        self.bodies.get(handle).map(|body| BodyPose {
            position: body.position,
            rotation: body.rotation,
        })
    }

    fn step(&mut self, dt: f32, velocity_iterations: u32, position_iterations: u32) {
        self.handles.clear();
        self.handles.extend(self.bodies.keys());

        let gravity = self.gravity;
        for body in self.bodies.values_mut() {
            if body.body_type == BodyType::Dynamic {
                body.velocity += gravity * (body.gravity_scale * dt);
            }
        }

        let overlaps = self.overlaps();
        for _ in 0..velocity_iterations {
            for overlap in &overlaps {
                self.resolve_velocity(overlap);
            }
        }

        for body in self.bodies.values_mut() {
            if body.body_type != BodyType::Static {
                body.position += body.velocity * dt;
            }
        }

        for _ in 0..position_iterations {
            for overlap in self.overlaps() {
                self.resolve_position(&overlap);
            }
        }

        self.report_contacts();
    }

    fn set_contact_listener(&mut self, listener: Arc<dyn ContactListener>) {
        self.listener = Some(listener);
    }

    fn clear_contact_listener(&mut self) {
        self.listener = None;
    }

    fn body_count(&self) -> usize {
        self.bodies.len()
    }
}
