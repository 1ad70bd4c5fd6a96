//! Scene ownership and construction.

use glam::{Mat4, Vec3};
use solaris_config::{PoleClosureMode, SceneConfig};
use solaris_mesh::{PoleClosure, SphereMesh, generate_sphere_with};

use crate::body::{BodyDescriptor, BodyId, MeshId};
use crate::error::SceneError;
use crate::transform::{FrameTransform, compute_model_matrix, orbit_center};

/// Meshes and bodies, with every body stored after its parent.
#[derive(Debug, Clone)]
pub struct Scene {
    meshes: Vec<SphereMesh>,
    bodies: Vec<BodyDescriptor>,
}

/// Collects meshes and bodies, validating each body as it is added.
#[derive(Debug, Default)]
pub struct SceneBuilder {
    meshes: Vec<SphereMesh>,
    bodies: Vec<BodyDescriptor>,
}

impl SceneBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a mesh and return its handle.
    pub fn add_mesh(&mut self, mesh: SphereMesh) -> MeshId {
        self.meshes.push(mesh);
        MeshId(self.meshes.len() as u32 - 1)
    }

    /// Add a body. Its mesh and parent must already be in the builder.
    pub fn add_body(&mut self, body: BodyDescriptor) -> Result<BodyId, SceneError> {
        body.validate()?;

        match body.mesh {
            None => {
                return Err(SceneError::MissingMesh { body: body.name });
            }
            Some(mesh) if mesh.0 as usize >= self.meshes.len() => {
                return Err(SceneError::UnknownMesh {
                    body: body.name,
                    mesh,
                });
            }
            Some(_) => {}
        }

        if let Some(parent) = body.parent
            && parent.0 as usize >= self.bodies.len()
        {
            return Err(SceneError::UnknownParent {
                body: body.name,
                parent,
            });
        }

        self.bodies.push(body);
        Ok(BodyId(self.bodies.len() as u32 - 1))
    }

    pub fn build(self) -> Scene {
        Scene {
            meshes: self.meshes,
            bodies: self.bodies,
        }
    }
}

impl Scene {
    pub fn meshes(&self) -> &[SphereMesh] {
        &self.meshes
    }

    /// Bodies in evaluation order (parents first).
    pub fn bodies(&self) -> &[BodyDescriptor] {
        &self.bodies
    }

    pub fn body(&self, id: BodyId) -> Option<&BodyDescriptor> {
        self.bodies.get(id.0 as usize)
    }

    pub fn find(&self, name: &str) -> Option<BodyId> {
        self.bodies
            .iter()
            .position(|b| b.name == name)
            .map(|i| BodyId(i as u32))
    }

    /// World-space centre of a body, walking up its parent chain.
    pub fn world_center(&self, id: BodyId, sim_time: f64) -> Result<Vec3, SceneError> {
        let body = self.body(id).ok_or(SceneError::UnknownBody(id))?;
        let parent_center = match body.parent {
            Some(parent) => Some(self.world_center(parent, sim_time)?),
            None => None,
        };
        Ok(orbit_center(body, sim_time, parent_center))
    }

    /// Model matrix of a single body at `sim_time`.
    pub fn compute_model_matrix(&self, id: BodyId, sim_time: f64) -> Result<Mat4, SceneError> {
        let body = self.body(id).ok_or(SceneError::UnknownBody(id))?;
        let parent_center = match body.parent {
            Some(parent) => Some(self.world_center(parent, sim_time)?),
            None => None,
        };
        Ok(compute_model_matrix(body, sim_time, parent_center))
    }

    /// Transforms for every body, in storage order.
    ///
    /// Each parent's centre is computed once and reused by its children.
    pub fn frame_transforms(&self, sim_time: f64) -> Vec<FrameTransform> {
        let mut transforms: Vec<FrameTransform> = Vec::with_capacity(self.bodies.len());
        for (index, body) in self.bodies.iter().enumerate() {
            let parent_center = body.parent.map(|p| transforms[p.0 as usize].center);
            transforms.push(FrameTransform {
                body: BodyId(index as u32),
                center: orbit_center(body, sim_time, parent_center),
                model: compute_model_matrix(body, sim_time, parent_center),
            });
        }
        transforms
    }
}

/// Map the config-level closure setting onto the mesh generator's.
pub fn pole_closure(mode: PoleClosureMode) -> PoleClosure {
    match mode {
        PoleClosureMode::Pinched => PoleClosure::Pinched,
        PoleClosureMode::Collapsed => PoleClosure::Collapsed,
    }
}

/// Build the sun, earth and moon hierarchy from config.
///
/// The sun is the root, the earth orbits the sun and the moon orbits the
/// earth. Each body gets its own mesh at its configured radius.
pub fn solar_system(
    config: &SceneConfig,
    resolution: u32,
    closure: PoleClosure,
) -> Result<Scene, SceneError> {
    let mut builder = SceneBuilder::new();
    let mut parent = None;

    for (name, body) in [
        ("sun", &config.sun),
        ("earth", &config.earth),
        ("moon", &config.moon),
    ] {
        let mesh = builder.add_mesh(generate_sphere_with(body.radius, resolution, closure)?);
        let mut descriptor =
            BodyDescriptor::from_config(name, body, config.texture_path(body))?.with_mesh(mesh);
        if let Some(parent) = parent {
            descriptor = descriptor.with_parent(parent);
        }
        parent = Some(builder.add_body(descriptor)?);
    }

    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use solaris_mesh::generate_sphere;

    fn default_system() -> Scene {
        solar_system(&SceneConfig::default(), 24, PoleClosure::Pinched).unwrap()
    }

    #[test]
    fn test_solar_system_hierarchy() {
        let scene = default_system();
        assert_eq!(scene.bodies().len(), 3);
        assert_eq!(scene.meshes().len(), 3);

        let sun = scene.find("sun").unwrap();
        let earth = scene.find("earth").unwrap();
        let moon = scene.find("moon").unwrap();
        assert_eq!(scene.body(sun).unwrap().parent, None);
        assert_eq!(scene.body(earth).unwrap().parent, Some(sun));
        assert_eq!(scene.body(moon).unwrap().parent, Some(earth));

        let moon_mesh = scene.body(moon).unwrap().mesh.unwrap();
        assert_eq!(scene.meshes()[moon_mesh.0 as usize].radius(), 0.25);
        assert!(scene.body(sun).unwrap().appearance.emissive);
    }

    #[test]
    fn test_moon_tracks_earth() {
        let scene = default_system();
        let earth = scene.find("earth").unwrap();
        let moon = scene.find("moon").unwrap();

        for step in 0..500 {
            let t = step as f64 * 0.0371;
            let frame = scene.frame_transforms(t);
            let earth_center = frame[earth.0 as usize].center;
            let moon_center = frame[moon.0 as usize].center;

            let expected = earth_center
                + glam::Mat3::from_rotation_y((144.0 * t).rem_euclid(360.0).to_radians() as f32)
                    * Vec3::new(2.0, 0.0, 0.0);
            assert!(moon_center.abs_diff_eq(expected, 1e-4), "t={t}");
            assert!(((moon_center - earth_center).length() - 2.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_frame_transforms_match_single_body_queries() {
        let scene = default_system();
        let t = 12.34;
        for transform in scene.frame_transforms(t) {
            let single = scene.compute_model_matrix(transform.body, t).unwrap();
            assert_eq!(single, transform.model);
            assert_eq!(scene.world_center(transform.body, t).unwrap(), transform.center);
            assert_eq!(transform.model.w_axis.truncate(), transform.center);
        }
    }

    #[test]
    fn test_frame_transforms_are_repeatable() {
        let scene = default_system();
        assert_eq!(scene.frame_transforms(7.5), scene.frame_transforms(7.5));
    }

    #[test]
    fn test_missing_mesh_is_missing_dependency() {
        let mut builder = SceneBuilder::new();
        let err = builder.add_body(BodyDescriptor::new("ghost")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingDependency);

        let err = builder
            .add_body(BodyDescriptor::new("ghost").with_mesh(MeshId(3)))
            .unwrap_err();
        assert!(matches!(err, SceneError::UnknownMesh { .. }));
        assert_eq!(err.kind(), ErrorKind::MissingDependency);
    }

    #[test]
    fn test_parent_must_come_first() {
        let mut builder = SceneBuilder::new();
        let mesh = builder.add_mesh(generate_sphere(1.0, 8).unwrap());
        let err = builder
            .add_body(
                BodyDescriptor::new("orphan")
                    .with_mesh(mesh)
                    .with_parent(BodyId(0)),
            )
            .unwrap_err();
        assert!(matches!(err, SceneError::UnknownParent { .. }));
        assert_eq!(err.kind(), ErrorKind::MissingDependency);

        let root = builder
            .add_body(BodyDescriptor::new("root").with_mesh(mesh))
            .unwrap();
        let child = builder
            .add_body(BodyDescriptor::new("child").with_mesh(mesh).with_parent(root))
            .unwrap();
        assert_eq!(child, BodyId(1));
        let scene = builder.build();
        assert_eq!(scene.bodies().len(), 2);
        assert_eq!(scene.meshes().len(), 1);
    }

    #[test]
    fn test_invalid_config_is_invalid_argument() {
        let mut config = SceneConfig::default();
        config.moon.radius = -0.25;
        let err = solar_system(&config, 24, PoleClosure::Pinched).unwrap_err();
        assert!(matches!(err, SceneError::Mesh(_)));
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let mut config = SceneConfig::default();
        config.earth.orbit_radius = -10.0;
        let err = solar_system(&config, 24, PoleClosure::Pinched).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let err = solar_system(&SceneConfig::default(), 1, PoleClosure::Pinched).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_unknown_body_query() {
        let scene = default_system();
        let err = scene.compute_model_matrix(BodyId(9), 0.0).unwrap_err();
        assert_eq!(err, SceneError::UnknownBody(BodyId(9)));
    }

    #[test]
    fn test_pole_closure_mapping() {
        assert_eq!(pole_closure(PoleClosureMode::Pinched), PoleClosure::Pinched);
        assert_eq!(pole_closure(PoleClosureMode::Collapsed), PoleClosure::Collapsed);
    }
}
