//! Specialized collection types

pub use slotmap::{SecondaryMap, SlotMap};

slotmap::new_key_type! {
    /// Generational handle to a body owned by a physics world.
    ///
    /// Handles are plain values: a stale handle fails lookups instead of
    /// aliasing a newer body that reused the slot.
    pub struct BodyHandle;
}

/// Handle-keyed arena used for physics bodies
pub type BodyArena<T> = SlotMap<BodyHandle, T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stale_handle_misses_reused_slot() {
        let mut arena: BodyArena<u32> = BodyArena::with_key();
        let first = arena.insert(1);
        arena.remove(first);
        let second = arena.insert(2);

        assert!(arena.get(first).is_none());
        assert_eq!(arena.get(second), Some(&2));
    }
}
