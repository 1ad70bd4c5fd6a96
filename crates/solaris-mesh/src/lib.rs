//! Procedural UV-sphere tessellation.
//!
//! [`generate_sphere`] turns a radius and a tessellation resolution into a
//! [`SphereMesh`]: parallel position/normal/texture-coordinate arrays plus a
//! triangle index list ready for GPU upload. Generation is pure and runs once
//! per body at startup.

mod error;
mod sphere;

pub use error::MeshError;
pub use sphere::{PoleClosure, SphereMesh, generate_sphere, generate_sphere_with};
