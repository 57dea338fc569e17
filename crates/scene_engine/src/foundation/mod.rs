//! Foundation module - Core utilities and types
//!
//! Low-level building blocks shared by the ECS, physics and scene layers:
//! - Math types and operations
//! - Handle-based collections
//! - Frame timing
//! - Logging utilities

pub mod math;
pub mod collections;
pub mod time;
pub mod logging;
