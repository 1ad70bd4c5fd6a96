//! wgpu rendering for the solar system: device and surface setup, sphere
//! buffers, body textures, the lit body pipeline and a [`RenderBackend`]
//! implementation that draws a scene.
//!
//! [`RenderBackend`]: solaris_scene::RenderBackend

pub mod backend;
pub mod body_pipeline;
pub mod buffer;
pub mod camera;
pub mod depth;
pub mod gpu;
pub mod pass;
pub mod surface;
pub mod texture;

pub use backend::WgpuBackend;
pub use body_pipeline::{BODY_SHADER_SOURCE, BodyPipeline, BodyUniform, FrameUniform};
pub use buffer::{BufferAllocator, MeshBuffer, VertexPositionNormalUv, interleave_sphere};
pub use camera::Camera;
pub use depth::DepthBuffer;
pub use gpu::{RenderContext, RenderContextError, SurfaceError, init_render_context_blocking};
pub use pass::{FrameEncoder, RenderPassBuilder};
pub use surface::{PhysicalSize, SurfaceWrapper};
pub use texture::{ManagedTexture, TextureError, TextureManager, checkerboard};
