//! Configuration system
//!
//! File-backed configuration in TOML or RON, plus the scene's own settings.

use crate::error::{SceneError, SceneResult};
pub use serde::{Deserialize, Serialize};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        // Try different formats
        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Default fixed simulation step in seconds
pub const DEFAULT_FIXED_STEP: f32 = 1.0 / 60.0;

/// Default cap on physics steps per frame
pub const DEFAULT_MAX_STEPS_PER_FRAME: u32 = 5;

/// Default solver velocity iterations
pub const DEFAULT_VELOCITY_ITERATIONS: u32 = 8;

/// Default solver position iterations
pub const DEFAULT_POSITION_ITERATIONS: u32 = 3;

/// Settings for the scene orchestrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Simulation step in seconds
    pub fixed_step: f32,

    /// Maximum physics steps taken by a single frame
    pub max_steps_per_frame: u32,

    /// Solver velocity iterations per step
    pub velocity_iterations: u32,

    /// Solver position iterations per step
    pub position_iterations: u32,

    /// World gravity in units per second squared
    pub gravity: [f32; 3],

    /// Viewport applied to cameras before the first resize
    pub initial_viewport: Option<[u32; 2]>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            fixed_step: DEFAULT_FIXED_STEP,
            max_steps_per_frame: DEFAULT_MAX_STEPS_PER_FRAME,
            velocity_iterations: DEFAULT_VELOCITY_ITERATIONS,
            position_iterations: DEFAULT_POSITION_ITERATIONS,
            gravity: [0.0, -9.81, 0.0],
            initial_viewport: None,
        }
    }
}

impl Config for SceneConfig {}

impl SceneConfig {
    /// Check every field, returning the first rejected value
    pub fn validate(&self) -> SceneResult<()> {
        validate_fixed_step(self.fixed_step)?;
        validate_max_steps(self.max_steps_per_frame)?;
        if self.velocity_iterations == 0 || self.position_iterations == 0 {
            return Err(SceneError::InvalidConfig(format!(
                "solver iterations must be non-zero (velocity {}, position {})",
                self.velocity_iterations, self.position_iterations
            )));
        }
        if self.gravity.iter().any(|g| !g.is_finite()) {
            return Err(SceneError::InvalidConfig(format!("non-finite gravity {:?}", self.gravity)));
        }
        if let Some([width, height]) = self.initial_viewport {
            validate_viewport(width, height)?;
        }
        Ok(())
    }
}

/// Reject fixed steps that are not finite and positive
pub fn validate_fixed_step(step: f32) -> SceneResult<()> {
    if step.is_finite() && step > 0.0 {
        Ok(())
    } else {
        Err(SceneError::InvalidFixedStep(step))
    }
}

/// Reject a zero step cap
pub fn validate_max_steps(max_steps: u32) -> SceneResult<()> {
    if max_steps == 0 {
        Err(SceneError::InvalidMaxSteps(max_steps))
    } else {
        Ok(())
    }
}

/// Reject viewports with a zero dimension
pub fn validate_viewport(width: u32, height: u32) -> SceneResult<()> {
    if width == 0 || height == 0 {
        Err(SceneError::InvalidViewport { width, height })
    } else {
        Ok(())
    }
}
