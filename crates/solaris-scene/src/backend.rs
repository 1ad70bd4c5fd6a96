//! The boundary between the scene and whatever draws it.

use std::path::Path;

use glam::Mat4;
use solaris_mesh::SphereMesh;

use crate::scene::Scene;
use crate::transform::FrameContext;

/// Per-draw data for one body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyDraw {
    pub model: Mat4,
    pub mvp: Mat4,
    pub emissive: bool,
}

/// Uploads geometry and textures once, then draws them every frame.
pub trait RenderBackend {
    /// GPU-side copy of a [`SphereMesh`].
    type Geometry;
    /// A texture ready for sampling.
    type Texture;

    fn upload(&mut self, mesh: &SphereMesh) -> Self::Geometry;

    /// Load a texture from disk. `None` or a file that fails to load yields a
    /// fallback texture rather than an error.
    fn load_texture(&mut self, path: Option<&Path>) -> Self::Texture;

    fn draw(&mut self, geometry: &Self::Geometry, draw: &BodyDraw, texture: &Self::Texture);
}

/// Backend resources for a [`Scene`]: one geometry per mesh and one texture
/// per body.
pub struct SceneResources<B: RenderBackend> {
    geometry: Vec<B::Geometry>,
    textures: Vec<B::Texture>,
}

impl<B: RenderBackend> SceneResources<B> {
    /// Upload every mesh and load every body texture.
    pub fn upload(scene: &Scene, backend: &mut B) -> Self {
        let geometry = scene.meshes().iter().map(|m| backend.upload(m)).collect();
        let textures = scene
            .bodies()
            .iter()
            .map(|b| backend.load_texture(b.appearance.texture.as_deref()))
            .collect();
        Self { geometry, textures }
    }

    /// Issue one draw per body, parents first.
    ///
    /// Bodies without uploaded geometry or texture are skipped, which happens
    /// when `scene` is not the scene these resources were uploaded from.
    pub fn draw_frame(&self, scene: &Scene, frame: &FrameContext, backend: &mut B) {
        let view_projection = frame.view_projection();
        for transform in scene.frame_transforms(frame.sim_time) {
            let index = transform.body.0 as usize;
            let body = &scene.bodies()[index];
            let Some(geometry) = body.mesh.and_then(|m| self.geometry.get(m.0 as usize)) else {
                continue;
            };
            let Some(texture) = self.textures.get(index) else {
                continue;
            };
            let draw = BodyDraw {
                model: transform.model,
                mvp: view_projection * transform.model,
                emissive: body.appearance.emissive,
            };
            backend.draw(geometry, &draw, texture);
        }
    }
}
