//! Error types for the orchestration core
//!
//! Every failure falls into one of three kinds. Configuration errors are
//! rejected at the boundary with prior state retained, resource errors are
//! recovered locally by the subsystem that hit them, and lifecycle errors are
//! handed back to the caller. None of them is fatal.

use crate::ecs::Entity;
use crate::scene::SceneState;
use thiserror::Error;

/// Classification of a [`SceneError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid input rejected at the API boundary
    Configuration,
    /// A subsystem resource could not be produced
    Resource,
    /// Operation on an entity or state that does not exist
    Lifecycle,
}

/// Scene-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    /// Viewport with a zero dimension
    #[error("Invalid viewport size {width}x{height}")]
    InvalidViewport {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
    },

    /// Fixed step that is not a finite positive number
    #[error("Invalid fixed step: {0}")]
    InvalidFixedStep(f32),

    /// Zero physics steps per frame
    #[error("Invalid max steps per frame: {0}")]
    InvalidMaxSteps(u32),

    /// Any other rejected configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The physics world refused to create a body
    #[error("Body creation failed: {0}")]
    BodyCreation(String),

    /// A transform matrix could not be inverted
    #[error("Non-invertible transform on entity {0}")]
    SingularTransform(Entity),

    /// Entity id is unknown or already destroyed
    #[error("Entity {0} not found")]
    EntityNotFound(Entity),

    /// Runtime transition not allowed from the current state
    #[error("Cannot transition scene from {from:?} to {to:?}")]
    InvalidTransition {
        /// Current state
        from: SceneState,
        /// Requested state
        to: SceneState,
    },

    /// Too many registered component types
    #[error("Component type limit of {0} reached")]
    ComponentLimit(usize),

    /// Entity id counter exhausted
    #[error("Entity id space exhausted")]
    IdSpaceExhausted,
}

impl SceneError {
    /// Kind of this error
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidViewport { .. }
            | Self::InvalidFixedStep(_)
            | Self::InvalidMaxSteps(_)
            | Self::InvalidConfig(_) => ErrorKind::Configuration,
            Self::BodyCreation(_) | Self::SingularTransform(_) => ErrorKind::Resource,
            Self::EntityNotFound(_)
            | Self::InvalidTransition { .. }
            | Self::ComponentLimit(_)
            | Self::IdSpaceExhausted => ErrorKind::Lifecycle,
        }
    }
}

/// Result alias for scene operations
pub type SceneResult<T> = Result<T, SceneError>;
