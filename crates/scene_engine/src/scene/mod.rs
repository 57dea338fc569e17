//! Scene orchestration
//!
//! The [`Scene`] state machine, its external collaborator traits, the primary
//! camera resolver and the cross-thread request types.

pub mod state;
pub mod collaborators;
pub mod camera_resolver;
pub mod commands;
pub mod stats;
pub mod snapshot;
pub mod orchestrator;

pub use state::SceneState;
pub use collaborators::{
    Render2DCollaborator, Render3DCollaborator, RenderItem, SceneSerializer, ScriptCollaborator, SnapshotError,
};
pub use camera_resolver::{CameraResolver, ResolvedCamera};
pub use commands::{CommandSender, ReloadFlag, SceneCommand};
pub use stats::SceneStats;
pub use snapshot::{EntitySnapshot, SceneSnapshot};
pub use orchestrator::Scene;
