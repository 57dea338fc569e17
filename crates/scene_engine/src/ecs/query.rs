//! Cached entity groups
//!
//! A group is the list of entities holding every tag of a required set. Each
//! cached group remembers the structure generation it was built against; a
//! structural change bumps the generation and the group is rebuilt in place on
//! its next use, reusing its allocation.

use super::{Entity, TagSet};
use std::collections::HashMap;

/// Registry bookkeeping for one live entity
#[derive(Debug, Clone)]
pub(crate) struct EntityRecord {
    pub(crate) entity: Entity,
    pub(crate) name: String,
    pub(crate) tags: TagSet,
}

struct CachedGroup {
    generation: u64,
    entities: Vec<Entity>,
}

/// Per-tag-set group cache
#[derive(Default)]
pub(crate) struct QueryCache {
    groups: HashMap<TagSet, CachedGroup>,
    rebuilds: u64,
}

impl QueryCache {
    /// Make sure the group for `required` matches `generation`
    pub(crate) fn refresh(&mut self, required: TagSet, generation: u64, records: &[EntityRecord]) {
        let group = self.groups.entry(required).or_insert_with(|| CachedGroup {
            generation: generation.wrapping_sub(1),
            entities: Vec::new(),
        });
        if group.generation == generation {
            return;
        }

        group.entities.clear();
        group.entities.extend(
            records
                .iter()
                .filter(|record| record.tags.contains_all(required))
                .map(|record| record.entity),
        );
        group.generation = generation;
        self.rebuilds += 1;
    }

    /// Group for `required`, if it has been built
    pub(crate) fn cached(&self, required: TagSet) -> Option<&[Entity]> {
        self.groups.get(&required).map(|group| group.entities.as_slice())
    }

    /// Total number of group rebuilds
    pub(crate) const fn rebuilds(&self) -> u64 {
        self.rebuilds
    }
}
