//! Render data components
//!
//! Plain data handed to the render collaborators. Mesh and material ids are
//! opaque to the scene; the 3D renderer owns their meaning.

use crate::ecs::Component;
use crate::foundation::math::Vec4;
use serde::{Deserialize, Serialize};

/// Flat-colored quad drawn by the 2D renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpriteComponent {
    /// RGBA color
    pub color: Vec4,

    /// Texture repeat factor
    pub tiling_factor: f32,
}

impl Component for SpriteComponent {}

impl Default for SpriteComponent {
    fn default() -> Self {
        Self::new(Vec4::new(1.0, 1.0, 1.0, 1.0))
    }
}

impl SpriteComponent {
    /// Sprite with the given color
    pub const fn new(color: Vec4) -> Self {
        Self {
            color,
            tiling_factor: 1.0,
        }
    }
}

/// Mesh drawn by the 3D renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MeshComponent {
    /// Renderer-side mesh id
    pub mesh_id: u32,

    /// Renderer-side material id
    pub material_id: u32,
}

impl Component for MeshComponent {}

impl MeshComponent {
    /// Mesh with a material
    pub const fn new(mesh_id: u32, material_id: u32) -> Self {
        Self { mesh_id, material_id }
    }
}
