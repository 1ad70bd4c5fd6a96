//! Look-at perspective camera.

use glam::{Mat4, Vec3};
use solaris_scene::FrameContext;

/// A perspective camera aimed at a fixed target.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Width / height. Only window resizes change it.
    pub aspect_ratio: f32,
    /// Near clip plane distance (always positive).
    pub near: f32,
    /// Far clip plane distance (always positive, > near).
    pub far: f32,
}

impl Camera {
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Perspective projection with reverse-Z: near maps to 1, far to 0.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect_ratio, self.far, self.near)
    }

    /// Update the aspect ratio from a surface size; zero heights are ignored.
    pub fn set_aspect_ratio(&mut self, width: f32, height: f32) {
        if height > 0.0 && width > 0.0 {
            self.aspect_ratio = width / height;
        }
    }

    /// Camera state for one frame at `sim_time`.
    pub fn frame_context(&self, sim_time: f64) -> FrameContext {
        FrameContext {
            view: self.view_matrix(),
            projection: self.projection_matrix(),
            camera_position: self.position,
            sim_time,
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 8.0, 30.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y: 45_f32.to_radians(),
            aspect_ratio: 4.0 / 3.0,
            near: 0.1,
            far: 80.1,
        }
    }
}
