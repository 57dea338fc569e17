//! Component trait, tags and tag sets

use super::registry::EntityRegistry;

/// Marker trait for components
pub trait Component: 'static + Send + Sync {}

/// Maximum number of distinct component types per registry
pub const MAX_COMPONENT_TYPES: usize = 64;

/// Registry-assigned tag for one component type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentTag(u8);

impl ComponentTag {
    pub(crate) fn from_index(index: usize) -> Option<Self> {
        if index < MAX_COMPONENT_TYPES {
            u8::try_from(index).ok().map(Self)
        } else {
            None
        }
    }

    /// Slot index of this tag
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Set of component tags, stored as a bit mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TagSet(u64);

impl TagSet {
    /// The empty set
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Copy of this set with `tag` added
    #[must_use]
    pub const fn with(self, tag: ComponentTag) -> Self {
        Self(self.0 | (1 << tag.0))
    }

    /// Add a tag
    pub fn insert(&mut self, tag: ComponentTag) {
        self.0 |= 1 << tag.0;
    }

    /// Remove a tag
    pub fn remove(&mut self, tag: ComponentTag) {
        self.0 &= !(1 << tag.0);
    }

    /// Whether `tag` is in the set
    pub const fn contains(self, tag: ComponentTag) -> bool {
        self.0 & (1 << tag.0) != 0
    }

    /// Whether every tag of `required` is in the set
    pub const fn contains_all(self, required: Self) -> bool {
        self.0 & required.0 == required.0
    }

    /// Whether the set is empty
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of tags
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterate tags in ascending order
    pub fn iter(self) -> impl Iterator<Item = ComponentTag> {
        let mut bits = self.0;
        std::iter::from_fn(move || {
            if bits == 0 {
                return None;
            }
            let index = bits.trailing_zeros();
            bits &= bits - 1;
            // index < 64 always fits a tag
            Some(ComponentTag(index as u8))
        })
    }
}

/// A group of component types that can be resolved to a [`TagSet`]
///
/// Implemented for single components and tuples of up to four.
pub trait ComponentSet {
    /// Tags for the group, or `None` if any type was never registered
    fn tag_set(registry: &EntityRegistry) -> Option<TagSet>;
}

impl<T: Component> ComponentSet for T {
    fn tag_set(registry: &EntityRegistry) -> Option<TagSet> {
        Some(TagSet::empty().with(registry.tag_of::<T>()?))
    }
}

macro_rules! impl_component_set {
    ($($name:ident),+) => {
        impl<$($name: Component),+> ComponentSet for ($($name,)+) {
            fn tag_set(registry: &EntityRegistry) -> Option<TagSet> {
                Some(TagSet::empty()$(.with(registry.tag_of::<$name>()?))+)
            }
        }
    };
}

impl_component_set!(A);
impl_component_set!(A, B);
impl_component_set!(A, B, C);
impl_component_set!(A, B, C, D);
