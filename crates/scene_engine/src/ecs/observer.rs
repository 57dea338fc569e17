//! Registry-owned lifecycle observers
//!
//! Observers are held by the registry and removed explicitly with the id
//! returned from `subscribe`, so no subscription outlives its owner.

use super::Entity;

/// Callback interface for entity lifecycle events
pub trait LifecycleObserver: Send {
    /// Called after an entity is created
    fn on_entity_created(&mut self, _entity: Entity, _name: &str) {}

    /// Called once per entity purged at the destruction barrier
    fn on_entity_destroyed(&mut self, entity: Entity, name: &str);
}

/// Subscription id for a [`LifecycleObserver`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

#[derive(Default)]
pub(crate) struct ObserverList {
    next_id: u64,
    observers: Vec<(ObserverId, Box<dyn LifecycleObserver>)>,
}

impl ObserverList {
    pub(crate) fn subscribe(&mut self, observer: Box<dyn LifecycleObserver>) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, observer));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    pub(crate) fn clear(&mut self) {
        self.observers.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.observers.len()
    }

    pub(crate) fn notify_created(&mut self, entity: Entity, name: &str) {
        for (_, observer) in &mut self.observers {
            observer.on_entity_created(entity, name);
        }
    }

    pub(crate) fn notify_destroyed(&mut self, entity: Entity, name: &str) {
        for (_, observer) in &mut self.observers {
            observer.on_entity_destroyed(entity, name);
        }
    }
}
