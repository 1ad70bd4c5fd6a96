//! Scene graph and per-frame transform composition for the solar system.
//!
//! A [`Scene`] owns its sphere meshes and an ordered list of
//! [`BodyDescriptor`]s in which every parent precedes its children. Each frame,
//! [`Scene::frame_transforms`] evaluates orbit and spin for every body and
//! [`SceneResources::draw_frame`] hands the results to a [`RenderBackend`].

mod backend;
mod body;
mod error;
mod scene;
mod transform;

pub use backend::{BodyDraw, RenderBackend, SceneResources};
pub use body::{Appearance, BodyDescriptor, BodyId, MeshId};
pub use error::{ErrorKind, SceneError};
pub use scene::{Scene, SceneBuilder, pole_closure, solar_system};
pub use transform::{FrameContext, FrameTransform, compute_model_matrix, orbit_center};
