//! Entity-Component-System implementation
//!
//! Single-owner entity and component store with cached groups and a
//! deferred destruction barrier.

pub mod entity;
pub mod component;
pub mod storage;
pub mod query;
pub mod observer;
pub mod registry;
pub mod components;

pub use entity::Entity;
pub use component::{Component, ComponentSet, ComponentTag, TagSet, MAX_COMPONENT_TYPES};
pub use storage::{CloneFn, ComponentStorage};
pub use observer::{LifecycleObserver, ObserverId};
pub use registry::EntityRegistry;
