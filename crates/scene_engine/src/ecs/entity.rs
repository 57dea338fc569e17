//! Entity implementation

use serde::{Deserialize, Serialize};
use std::fmt;

/// Entity identifier
///
/// Ids come from a monotonically increasing counter owned by the registry and
/// are never handed out twice within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Entity {
    id: u64,
}

impl Entity {
    /// Create an entity handle with the given ID
    pub(crate) const fn new(id: u64) -> Self {
        Self { id }
    }

    /// Get the entity ID
    pub const fn id(&self) -> u64 {
        self.id
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.id)
    }
}

/// Sequential id source
#[derive(Debug, Clone)]
pub(crate) struct EntityAllocator {
    next_id: u64,
}

impl EntityAllocator {
    pub(crate) const fn new() -> Self {
        Self { next_id: 1 }
    }

    /// Next id, or `None` once the counter is exhausted
    pub(crate) fn allocate(&mut self) -> Option<Entity> {
        let id = self.next_id;
        self.next_id = id.checked_add(1)?;
        Some(Entity::new(id))
    }

    #[cfg(test)]
    pub(crate) const fn starting_at(next_id: u64) -> Self {
        Self { next_id }
    }
}
