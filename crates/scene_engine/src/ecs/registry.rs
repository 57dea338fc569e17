//! Entity registry
//!
//! Owns entity identity and every component storage. Structural changes
//! (entity or component add/remove) bump a generation counter that invalidates
//! cached groups; destruction is deferred to a single barrier per frame so no
//! query ever observes a half-removed entity.

use super::component::{ComponentSet, ComponentTag, TagSet, MAX_COMPONENT_TYPES};
use super::entity::EntityAllocator;
use super::observer::{LifecycleObserver, ObserverId, ObserverList};
use super::query::{EntityRecord, QueryCache};
use super::storage::{CloneFn, ComponentStorage, ErasedStorage};
use super::{Component, Entity};
use crate::error::{SceneError, SceneResult};
use std::any::{type_name, TypeId};
use std::collections::{HashMap, HashSet};

struct ComponentSlot {
    name: &'static str,
    storage: Box<dyn ErasedStorage>,
    generation: u64,
    removals: Option<Vec<Entity>>,
}

impl ComponentSlot {
    fn bump(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    fn record_removal(&mut self, entity: Entity) {
        if let Some(removals) = self.removals.as_mut() {
            removals.push(entity);
        }
    }
}

/// Entity and component store
///
/// Single-owner: only the update thread mutates it. Group slices returned by
/// [`query`](Self::query) are valid until the next structural change and must
/// never be kept across [`apply_pending_destructions`](Self::apply_pending_destructions).
pub struct EntityRegistry {
    allocator: EntityAllocator,
    records: Vec<EntityRecord>,
    index: HashMap<Entity, usize>,
    tags: HashMap<TypeId, ComponentTag>,
    slots: Vec<ComponentSlot>,
    queries: QueryCache,
    structure_generation: u64,
    pending: Vec<Entity>,
    pending_set: HashSet<Entity>,
    observers: ObserverList,
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            allocator: EntityAllocator::new(),
            records: Vec::new(),
            index: HashMap::new(),
            tags: HashMap::new(),
            slots: Vec::new(),
            queries: QueryCache::default(),
            structure_generation: 0,
            pending: Vec::new(),
            pending_set: HashSet::new(),
            observers: ObserverList::default(),
        }
    }

    // ------------------------------------------------------------------
    // Component types
    // ------------------------------------------------------------------

    /// Register `T` with `Clone::clone` as its duplication function
    pub fn register_component<T: Component + Clone>(&mut self) -> SceneResult<ComponentTag> {
        self.register_inner::<T>(Some(T::clone))
    }

    /// Register `T` with a custom duplication function
    pub fn register_component_with<T: Component>(&mut self, cloner: CloneFn<T>) -> SceneResult<ComponentTag> {
        self.register_inner::<T>(Some(cloner))
    }

    fn register_inner<T: Component>(&mut self, cloner: Option<CloneFn<T>>) -> SceneResult<ComponentTag> {
        if let Some(&tag) = self.tags.get(&TypeId::of::<T>()) {
            if let Some(cloner) = cloner {
                if let Some(storage) = self.slots[tag.index()]
                    .storage
                    .as_any_mut()
                    .downcast_mut::<ComponentStorage<T>>()
                {
                    storage.set_cloner(cloner);
                }
            }
            return Ok(tag);
        }

        let tag = ComponentTag::from_index(self.slots.len())
            .ok_or(SceneError::ComponentLimit(MAX_COMPONENT_TYPES))?;
        self.slots.push(ComponentSlot {
            name: type_name::<T>(),
            storage: Box::new(ComponentStorage::<T>::new(cloner)),
            generation: 0,
            removals: None,
        });
        self.tags.insert(TypeId::of::<T>(), tag);
        log::trace!("Registered component {} as tag {}", type_name::<T>(), tag.index());
        Ok(tag)
    }

    /// Tag assigned to `T`, if registered
    pub fn tag_of<T: Component>(&self) -> Option<ComponentTag> {
        self.tags.get(&TypeId::of::<T>()).copied()
    }

    /// Tag set for a component group, if every member is registered
    pub fn tags_of<Q: ComponentSet>(&self) -> Option<TagSet> {
        Q::tag_set(self)
    }

    /// Type name registered under `tag`
    pub fn component_name(&self, tag: ComponentTag) -> Option<&'static str> {
        self.slots.get(tag.index()).map(|slot| slot.name)
    }

    /// Number of registered component types
    pub fn component_type_count(&self) -> usize {
        self.slots.len()
    }

    /// Change counter for `T`: bumped whenever a `T` is added, replaced or removed
    pub fn component_generation<T: Component>(&self) -> u64 {
        self.tag_of::<T>()
            .map_or(0, |tag| self.slots[tag.index()].generation)
    }

    /// Start recording entities that lose or replace their `T`
    pub fn track_removals<T: Component>(&mut self) -> SceneResult<()> {
        let tag = self.register_inner::<T>(None)?;
        let slot = &mut self.slots[tag.index()];
        if slot.removals.is_none() {
            slot.removals = Some(Vec::new());
        }
        Ok(())
    }

    /// Move recorded removals of `T` into `out`
    pub fn drain_removed<T: Component>(&mut self, out: &mut Vec<Entity>) {
        let Some(tag) = self.tag_of::<T>() else {
            return;
        };
        if let Some(removals) = self.slots[tag.index()].removals.as_mut() {
            out.append(removals);
        }
    }

    // ------------------------------------------------------------------
    // Entities
    // ------------------------------------------------------------------

    /// Create an entity with the next sequential id and no components
    pub fn create_entity(&mut self, name: impl Into<String>) -> SceneResult<Entity> {
        let entity = self.allocator.allocate().ok_or(SceneError::IdSpaceExhausted)?;
        let name = name.into();
        self.observers.notify_created(entity, &name);
        self.index.insert(entity, self.records.len());
        self.records.push(EntityRecord {
            entity,
            name,
            tags: TagSet::empty(),
        });
        self.structure_generation += 1;
        log::trace!("Created entity {entity}");
        Ok(entity)
    }

    /// Queue `entity` for removal at the next barrier
    ///
    /// Storage is untouched until [`apply_pending_destructions`](Self::apply_pending_destructions).
    /// Queuing an entity twice is the same as queuing it once.
    pub fn destroy_entity(&mut self, entity: Entity) -> SceneResult<()> {
        if !self.index.contains_key(&entity) {
            return Err(SceneError::EntityNotFound(entity));
        }
        if self.pending_set.insert(entity) {
            self.pending.push(entity);
        }
        Ok(())
    }

    /// Copy `source` into a new entity with the same name
    ///
    /// Only component types registered with a clone function are copied.
    pub fn duplicate_entity(&mut self, source: Entity) -> SceneResult<Entity> {
        let Some(&source_index) = self.index.get(&source) else {
            return Err(SceneError::EntityNotFound(source));
        };
        if self.pending_set.contains(&source) {
            return Err(SceneError::EntityNotFound(source));
        }

        let name = self.records[source_index].name.clone();
        let source_tags = self.records[source_index].tags;
        let target = self.create_entity(name)?;

        let mut copied = TagSet::empty();
        for tag in source_tags.iter() {
            let slot = &mut self.slots[tag.index()];
            if slot.storage.duplicate(source, target) {
                slot.bump();
                copied.insert(tag);
            } else if !slot.storage.can_duplicate() {
                log::debug!("Component {} has no clone function, skipped on duplicate", slot.name);
            }
        }

        if let Some(&target_index) = self.index.get(&target) {
            self.records[target_index].tags = copied;
        }
        self.structure_generation += 1;
        Ok(target)
    }

    /// Whether `entity` exists (pending entities still exist until the barrier)
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.index.contains_key(&entity)
    }

    /// Whether `entity` is queued for destruction
    pub fn is_pending_destruction(&self, entity: Entity) -> bool {
        self.pending_set.contains(&entity)
    }

    /// Number of live entities
    pub fn entity_count(&self) -> usize {
        self.records.len()
    }

    /// Number of entities queued for destruction
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Display name of `entity`
    pub fn name(&self, entity: Entity) -> Option<&str> {
        self.index
            .get(&entity)
            .map(|&i| self.records[i].name.as_str())
    }

    /// First entity with the given name, in storage order
    pub fn find_by_name(&self, name: &str) -> Option<Entity> {
        self.records
            .iter()
            .find(|record| record.name == name)
            .map(|record| record.entity)
    }

    /// Iterate live entities in storage order
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.records.iter().map(|record| record.entity)
    }

    /// Tags currently held by `entity`
    pub fn tags(&self, entity: Entity) -> Option<TagSet> {
        self.index.get(&entity).map(|&i| self.records[i].tags)
    }

    // ------------------------------------------------------------------
    // Components
    // ------------------------------------------------------------------

    /// Attach `value` to `entity`, replacing any existing `T`
    ///
    /// A replaced `T` is recorded as a removal when `T`'s removals are tracked.
    pub fn add_component<T: Component>(&mut self, entity: Entity, value: T) -> SceneResult<()> {
        let Some(&record_index) = self.index.get(&entity) else {
            return Err(SceneError::EntityNotFound(entity));
        };
        let tag = self.register_inner::<T>(None)?;

        let slot = &mut self.slots[tag.index()];
        let storage = slot
            .storage
            .as_any_mut()
            .downcast_mut::<ComponentStorage<T>>()
            .ok_or(SceneError::EntityNotFound(entity))?;
        let replaced = storage.insert(entity, value).is_some();
        slot.bump();

        if replaced {
            slot.record_removal(entity);
        } else {
            self.records[record_index].tags.insert(tag);
            self.structure_generation += 1;
        }
        Ok(())
    }

    /// Detach and return the `T` of `entity`
    pub fn remove_component<T: Component>(&mut self, entity: Entity) -> Option<T> {
        let tag = self.tag_of::<T>()?;
        let record_index = *self.index.get(&entity)?;

        let slot = &mut self.slots[tag.index()];
        let value = slot
            .storage
            .as_any_mut()
            .downcast_mut::<ComponentStorage<T>>()?
            .remove(entity)?;
        slot.bump();
        slot.record_removal(entity);

        self.records[record_index].tags.remove(tag);
        self.structure_generation += 1;
        Some(value)
    }

    /// The `T` of `entity`
    pub fn get_component<T: Component>(&self, entity: Entity) -> Option<&T> {
        self.storage::<T>()?.get(entity)
    }

    /// Mutable `T` of `entity`
    pub fn get_component_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        self.storage_mut::<T>()?.get_mut(entity)
    }

    /// Whether `entity` holds a `T`
    pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
        self.storage::<T>().is_some_and(|storage| storage.contains(entity))
    }

    /// Iterate every `(entity, &T)` pair in storage order
    pub fn iter_components<T: Component>(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.storage::<T>().into_iter().flat_map(|storage| storage.iter())
    }

    fn storage<T: Component>(&self) -> Option<&ComponentStorage<T>> {
        let tag = self.tag_of::<T>()?;
        self.slots[tag.index()].storage.as_any().downcast_ref()
    }

    fn storage_mut<T: Component>(&mut self) -> Option<&mut ComponentStorage<T>> {
        let tag = self.tag_of::<T>()?;
        self.slots[tag.index()].storage.as_any_mut().downcast_mut()
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Entities holding every tag in `required`
    ///
    /// One linear scan over the compact entity table on a cache miss; a valid
    /// cached group is returned without scanning or allocating.
    pub fn query(&mut self, required: TagSet) -> &[Entity] {
        self.queries
            .refresh(required, self.structure_generation, &self.records);
        self.queries.cached(required).unwrap_or(&[])
    }

    /// Entities holding every component of `Q`; empty if any type is unregistered
    pub fn query_of<Q: ComponentSet>(&mut self) -> &[Entity] {
        match self.tags_of::<Q>() {
            Some(required) => self.query(required),
            None => &[],
        }
    }

    /// Run `f` with shared access to the registry and the group for `required`
    pub fn query_with<R>(&mut self, required: TagSet, f: impl FnOnce(&Self, &[Entity]) -> R) -> R {
        self.queries
            .refresh(required, self.structure_generation, &self.records);
        let entities = self.queries.cached(required).unwrap_or(&[]);
        f(self, entities)
    }

    /// Copy the group for `required` into `out`, replacing its contents
    ///
    /// For passes that mutate components while walking the group; `out` keeps
    /// its capacity between frames.
    pub fn query_into(&mut self, required: TagSet, out: &mut Vec<Entity>) {
        out.clear();
        out.extend_from_slice(self.query(required));
    }

    /// Current structure generation
    pub const fn structure_generation(&self) -> u64 {
        self.structure_generation
    }

    /// Number of times any cached group has been rebuilt
    pub const fn query_rebuilds(&self) -> u64 {
        self.queries.rebuilds()
    }

    // ------------------------------------------------------------------
    // Destruction barrier
    // ------------------------------------------------------------------

    /// Purge every queued entity in one pass
    ///
    /// Must run between frame phases, never while a group is being walked.
    /// Invalidates cached groups once regardless of how many entities go.
    pub fn apply_pending_destructions(&mut self) -> usize {
        if self.pending.is_empty() {
            return 0;
        }

        let mut pending = std::mem::take(&mut self.pending);
        let mut purged = 0;
        for &entity in &pending {
            let Some(record_index) = self.index.remove(&entity) else {
                continue;
            };
            let record = self.records.swap_remove(record_index);
            if let Some(moved) = self.records.get(record_index) {
                self.index.insert(moved.entity, record_index);
            }

            for tag in record.tags.iter() {
                let slot = &mut self.slots[tag.index()];
                if slot.storage.remove_entity(entity) {
                    slot.bump();
                    slot.record_removal(entity);
                }
            }

            self.observers.notify_destroyed(entity, &record.name);
            purged += 1;
        }

        pending.clear();
        self.pending = pending;
        self.pending_set.clear();
        self.structure_generation += 1;
        log::debug!("Destruction barrier purged {purged} entities");
        purged
    }

    /// Destroy every entity immediately
    ///
    /// Ids keep counting up afterwards; nothing is reused.
    pub fn clear(&mut self) -> usize {
        for index in 0..self.records.len() {
            let entity = self.records[index].entity;
            if self.pending_set.insert(entity) {
                self.pending.push(entity);
            }
        }
        self.apply_pending_destructions()
    }

    /// Empty registry with the same component types that continues this id sequence
    ///
    /// Fill it, then hand it to [`replace_with`](Self::replace_with); dropping
    /// it instead leaves this registry untouched.
    pub fn staging(&self) -> Self {
        let slots = self
            .slots
            .iter()
            .map(|slot| ComponentSlot {
                name: slot.name,
                storage: slot.storage.empty_like(),
                generation: slot.generation,
                removals: slot.removals.as_ref().map(|_| Vec::new()),
            })
            .collect();
        Self {
            allocator: self.allocator.clone(),
            records: Vec::new(),
            index: HashMap::new(),
            tags: self.tags.clone(),
            slots,
            queries: QueryCache::default(),
            structure_generation: self.structure_generation,
            pending: Vec::new(),
            pending_set: HashSet::new(),
            observers: ObserverList::default(),
        }
    }

    /// Destroy every entity and take over the entities of `staged`
    ///
    /// Observers stay with this registry and see the purge followed by one
    /// creation per adopted entity. Removals recorded by the purge are kept.
    pub fn replace_with(&mut self, mut staged: Self) {
        self.clear();

        for (index, slot) in staged.slots.iter_mut().enumerate() {
            if let Some(old) = self.slots.get_mut(index) {
                slot.generation = slot.generation.max(old.generation).wrapping_add(1);
                if let (Some(kept), Some(recorded)) = (slot.removals.as_mut(), old.removals.as_mut()) {
                    recorded.append(kept);
                    std::mem::swap(kept, recorded);
                }
            }
        }

        self.allocator = staged.allocator;
        self.records = staged.records;
        self.index = staged.index;
        self.tags = staged.tags;
        self.slots = staged.slots;
        self.pending = staged.pending;
        self.pending_set = staged.pending_set;
        self.structure_generation = self.structure_generation.max(staged.structure_generation) + 1;
        for record in &self.records {
            self.observers.notify_created(record.entity, &record.name);
        }
        log::debug!("Adopted {} staged entities", self.records.len());
    }

    #[cfg(test)]
    pub(crate) fn set_next_id(&mut self, next_id: u64) {
        self.allocator = EntityAllocator::starting_at(next_id);
    }

    // ------------------------------------------------------------------
    // Observers
    // ------------------------------------------------------------------

    /// Register a lifecycle observer
    pub fn subscribe(&mut self, observer: Box<dyn LifecycleObserver>) -> ObserverId {
        self.observers.subscribe(observer)
    }

    /// Remove a lifecycle observer; `false` if the id was unknown
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Remove every lifecycle observer
    pub fn clear_observers(&mut self) {
        self.observers.clear();
    }

    /// Number of subscribed observers
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }
}
