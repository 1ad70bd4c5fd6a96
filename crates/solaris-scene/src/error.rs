//! Scene construction errors.

use solaris_mesh::MeshError;

use crate::body::{BodyId, MeshId};

/// Broad classification of a [`SceneError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A value was out of range or not finite.
    InvalidArgument,
    /// Something the body refers to does not exist.
    MissingDependency,
}

/// Errors raised while building a [`crate::Scene`]. Nothing here can occur
/// once the scene is built.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SceneError {
    #[error("body `{body}` has no mesh")]
    MissingMesh { body: String },

    #[error("body `{body}` refers to unknown mesh {mesh:?}")]
    UnknownMesh { body: String, mesh: MeshId },

    /// The parent was never added, or was added after the child.
    #[error("body `{body}` refers to unknown parent {parent:?}")]
    UnknownParent { body: String, parent: BodyId },

    #[error("no body with id {0:?}")]
    UnknownBody(BodyId),

    #[error("body `{body}`: {reason}")]
    InvalidBody { body: String, reason: String },

    #[error("mesh generation failed: {0}")]
    Mesh(#[from] MeshError),
}

impl SceneError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SceneError::MissingMesh { .. }
            | SceneError::UnknownMesh { .. }
            | SceneError::UnknownParent { .. }
            | SceneError::UnknownBody(_) => ErrorKind::MissingDependency,
            SceneError::InvalidBody { .. } | SceneError::Mesh(_) => ErrorKind::InvalidArgument,
        }
    }
}
