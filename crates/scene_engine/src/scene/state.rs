//! Scene lifecycle states

use serde::{Deserialize, Serialize};

/// Where the scene is in its edit/run cycle
///
/// `Editing → RuntimeStarting → RuntimeRunning → RuntimeStopping → Editing`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SceneState {
    /// No simulation; scripts and physics are idle
    #[default]
    Editing,
    /// Physics world is being built
    RuntimeStarting,
    /// Simulation advances every frame
    RuntimeRunning,
    /// Physics world is being torn down
    RuntimeStopping,
}

impl SceneState {
    /// Whether scripts and physics run in this state
    pub const fn is_running(self) -> bool {
        matches!(self, Self::RuntimeRunning)
    }
}
