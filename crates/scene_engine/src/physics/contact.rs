//! Contact callbacks
//!
//! Worlds report contacts through a [`ContactListener`] while stepping. The
//! bridge installs a [`ContactRelay`] that only queues events; the update
//! thread drains the queue after the physics phase and resolves handles to
//! entities through the bridge's id map.

use crate::ecs::Entity;
use crate::foundation::collections::BodyHandle;
use crossbeam_channel::Sender;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Whether a contact started or ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactPhase {
    /// Bodies started touching
    Begin,
    /// Bodies stopped touching
    End,
}

/// Contact between two bodies as reported by the world
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactEvent {
    /// Begin or end
    pub phase: ContactPhase,
    /// First body
    pub body_a: BodyHandle,
    /// Second body
    pub body_b: BodyHandle,
}

/// Contact between two entities, delivered to scripts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityContact {
    /// Begin or end
    pub phase: ContactPhase,
    /// First entity
    pub entity_a: Entity,
    /// Second entity
    pub entity_b: Entity,
}

/// Receiver of contact callbacks from a physics world
pub trait ContactListener: Send + Sync {
    /// Two bodies started touching
    fn begin_contact(&self, body_a: BodyHandle, body_b: BodyHandle);

    /// Two bodies stopped touching
    fn end_contact(&self, body_a: BodyHandle, body_b: BodyHandle);
}

/// Listener that queues contacts while its flag is active
pub struct ContactRelay {
    active: Arc<AtomicBool>,
    sender: Sender<ContactEvent>,
}

impl ContactRelay {
    /// Relay gated by `active`
    pub const fn new(active: Arc<AtomicBool>, sender: Sender<ContactEvent>) -> Self {
        Self { active, sender }
    }

    fn relay(&self, phase: ContactPhase, body_a: BodyHandle, body_b: BodyHandle) {
        if !self.active.load(Ordering::Acquire) {
            return;
        }
        // Receiver gone means the bridge already shut down
        let _ = self.sender.send(ContactEvent { phase, body_a, body_b });
    }
}

impl ContactListener for ContactRelay {
    fn begin_contact(&self, body_a: BodyHandle, body_b: BodyHandle) {
        self.relay(ContactPhase::Begin, body_a, body_b);
    }

    fn end_contact(&self, body_a: BodyHandle, body_b: BodyHandle) {
        self.relay(ContactPhase::End, body_a, body_b);
    }
}
