//! Camera components
//!
//! `SceneCamera` holds projection parameters only; the view comes from the
//! owning entity's transform. Projection matrices are computed on demand.

use crate::ecs::Component;
use crate::foundation::math::{utils, Mat4};
use serde::{Deserialize, Serialize};

/// Projection model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectionType {
    /// Field-of-view projection
    Perspective,
    /// Parallel projection sized by `ortho_size`
    Orthographic,
}

/// Projection parameters for a scene camera
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneCamera {
    projection: ProjectionType,

    /// Vertical field of view in radians
    fov: f32,

    /// Visible height in world units for orthographic projection
    ortho_size: f32,

    near: f32,
    far: f32,

    /// Width / height
    aspect: f32,
}

impl Default for SceneCamera {
    fn default() -> Self {
        Self::perspective(45.0, 0.1, 1000.0)
    }
}

impl SceneCamera {
    /// Perspective camera; `fov_degrees` is converted to radians
    pub fn perspective(fov_degrees: f32, near: f32, far: f32) -> Self {
        Self {
            projection: ProjectionType::Perspective,
            fov: utils::deg_to_rad(fov_degrees),
            ortho_size: 10.0,
            near,
            far,
            aspect: 16.0 / 9.0,
        }
    }

    /// Orthographic camera showing `size` world units vertically
    pub fn orthographic(size: f32, near: f32, far: f32) -> Self {
        Self {
            projection: ProjectionType::Orthographic,
            fov: utils::deg_to_rad(45.0),
            ortho_size: size,
            near,
            far,
            aspect: 16.0 / 9.0,
        }
    }

    /// Projection model
    pub const fn projection_type(&self) -> ProjectionType {
        self.projection
    }

    /// Vertical field of view in radians
    pub const fn fov(&self) -> f32 {
        self.fov
    }

    /// Orthographic height
    pub const fn ortho_size(&self) -> f32 {
        self.ortho_size
    }

    /// Near clip distance
    pub const fn near(&self) -> f32 {
        self.near
    }

    /// Far clip distance
    pub const fn far(&self) -> f32 {
        self.far
    }

    /// Width / height
    pub const fn aspect_ratio(&self) -> f32 {
        self.aspect
    }

    /// Recompute the aspect ratio from a viewport size
    ///
    /// Zero dimensions are ignored; callers validate before propagating.
    pub fn set_viewport_size(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        #[allow(clippy::cast_precision_loss)]
        let aspect = width as f32 / height as f32;
        if (self.aspect - aspect).abs() > 0.01 {
            log::trace!("Camera aspect ratio changed from {:.3} to {:.3}", self.aspect, aspect);
        }
        self.aspect = aspect;
    }

    /// Projection matrix for the current parameters
    pub fn projection_matrix(&self) -> Mat4 {
        match self.projection {
            ProjectionType::Perspective => Mat4::new_perspective(self.aspect, self.fov, self.near, self.far),
            ProjectionType::Orthographic => {
                let half_height = self.ortho_size * 0.5;
                let half_width = half_height * self.aspect;
                Mat4::new_orthographic(-half_width, half_width, -half_height, half_height, self.near, self.far)
            }
        }
    }
}

/// Camera attached to an entity
///
/// The primary flag can only be changed through the camera resolver, which
/// keeps at most one camera primary at a time. Cloning never copies it.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraComponent {
    /// Projection parameters
    pub camera: SceneCamera,

    #[serde(skip)]
    pub(crate) primary: bool,

    /// Ignore viewport resizes
    pub fixed_aspect_ratio: bool,
}

impl Component for CameraComponent {}

impl Clone for CameraComponent {
    fn clone(&self) -> Self {
        Self {
            camera: self.camera,
            primary: false,
            fixed_aspect_ratio: self.fixed_aspect_ratio,
        }
    }
}

impl Default for CameraComponent {
    fn default() -> Self {
        Self::new(SceneCamera::default())
    }
}

impl CameraComponent {
    /// Non-primary camera that follows viewport resizes
    pub const fn new(camera: SceneCamera) -> Self {
        Self {
            camera,
            primary: false,
            fixed_aspect_ratio: false,
        }
    }

    /// Builder pattern: Keep the aspect ratio on viewport resize
    pub const fn with_fixed_aspect_ratio(mut self) -> Self {
        self.fixed_aspect_ratio = true;
        self
    }

    /// Whether this camera is the scene's primary viewpoint
    pub const fn is_primary(&self) -> bool {
        self.primary
    }
}
