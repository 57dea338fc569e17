//! Dense per-type component storage
//!
//! Each component type lives in its own sparse set: values are packed in a
//! `Vec` for linear scans, with an entity → slot index for O(1) lookups.
//! Removal swaps the last element into the hole, so slots are never left empty.

use super::{Component, Entity};
use std::any::Any;
use std::collections::HashMap;

/// Clone function installed for a component type at registration
pub type CloneFn<T> = fn(&T) -> T;

/// Packed storage for one component type
pub struct ComponentStorage<T: Component> {
    dense: Vec<T>,
    owners: Vec<Entity>,
    slots: HashMap<Entity, usize>,
    cloner: Option<CloneFn<T>>,
}

impl<T: Component> ComponentStorage<T> {
    /// Create empty storage; `cloner` enables entity duplication for this type
    pub fn new(cloner: Option<CloneFn<T>>) -> Self {
        Self {
            dense: Vec::new(),
            owners: Vec::new(),
            slots: HashMap::new(),
            cloner,
        }
    }

    /// Install or replace the clone function
    pub(crate) fn set_cloner(&mut self, cloner: CloneFn<T>) {
        self.cloner = Some(cloner);
    }

    /// Insert or replace the value for `entity`, returning the replaced value
    pub fn insert(&mut self, entity: Entity, value: T) -> Option<T> {
        if let Some(&slot) = self.slots.get(&entity) {
            return Some(std::mem::replace(&mut self.dense[slot], value));
        }
        self.slots.insert(entity, self.dense.len());
        self.dense.push(value);
        self.owners.push(entity);
        None
    }

    /// Remove the value for `entity`
    pub fn remove(&mut self, entity: Entity) -> Option<T> {
        let slot = self.slots.remove(&entity)?;
        let value = self.dense.swap_remove(slot);
        self.owners.swap_remove(slot);
        if let Some(&moved) = self.owners.get(slot) {
            self.slots.insert(moved, slot);
        }
        Some(value)
    }

    /// Value for `entity`
    pub fn get(&self, entity: Entity) -> Option<&T> {
        self.slots.get(&entity).map(|&slot| &self.dense[slot])
    }

    /// Mutable value for `entity`
    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        self.slots.get(&entity).map(|&slot| &mut self.dense[slot])
    }

    /// Whether `entity` has a value
    pub fn contains(&self, entity: Entity) -> bool {
        self.slots.contains_key(&entity)
    }

    /// Number of stored values
    pub fn len(&self) -> usize {
        self.dense.len()
    }

    /// Whether the storage is empty
    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    /// Iterate `(entity, value)` pairs in storage order
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.owners.iter().copied().zip(self.dense.iter())
    }
}

/// Type-erased view over a [`ComponentStorage`] used by the registry
pub(crate) trait ErasedStorage: Send + Sync {
    fn remove_entity(&mut self, entity: Entity) -> bool;
    fn duplicate(&mut self, source: Entity, target: Entity) -> bool;
    fn can_duplicate(&self) -> bool;
    fn empty_like(&self) -> Box<dyn ErasedStorage>;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> ErasedStorage for ComponentStorage<T> {
    fn remove_entity(&mut self, entity: Entity) -> bool {
        self.remove(entity).is_some()
    }

    fn duplicate(&mut self, source: Entity, target: Entity) -> bool {
        let Some(cloner) = self.cloner else {
            return false;
        };
        let Some(copy) = self.get(source).map(cloner) else {
            return false;
        };
        self.insert(target, copy);
        true
    }

    fn can_duplicate(&self) -> bool {
        self.cloner.is_some()
    }

    fn empty_like(&self) -> Box<dyn ErasedStorage> {
        Box::new(Self::new(self.cloner))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
