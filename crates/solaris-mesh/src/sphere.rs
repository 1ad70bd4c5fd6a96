//! Latitude/longitude sphere generation.

use std::f32::consts::{PI, TAU};

use glam::Vec3;

use crate::error::MeshError;

/// How the tessellation closes the rows that land on the poles.
///
/// Every sample on the first and last latitude row sits on a pole, so half
/// of each quad touching a pole has two coincident corners.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PoleClosure {
    /// Skip the triangle of each pole quad whose two corners share the pole.
    /// Every emitted triangle has non-zero area.
    #[default]
    Pinched,
    /// Emit every grid quad, then close each vertex on the seam (`i = n−1`)
    /// or the north pole (`j = n−1`) with a degenerate `(k, P, P)` triple,
    /// where `P = n² − 1` is the final vertex.
    ///
    /// Every index stays in range and no quad wraps past the top of a column
    /// into the next one.
    Collapsed,
}

/// Sphere geometry centred on the origin.
///
/// `positions`, `normals` and `tex_coords` are parallel arrays indexed by
/// vertex; `indices` holds triangles as consecutive triples, counter-clockwise
/// when seen from outside.
#[derive(Debug, Clone, PartialEq)]
pub struct SphereMesh {
    radius: f32,
    resolution: u32,
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    tex_coords: Vec<[f32; 2]>,
    indices: Vec<u32>,
}

/// Generate a sphere with the default [`PoleClosure::Pinched`] policy.
///
/// `resolution` is the number of samples along each angular parameter, so the
/// mesh has `resolution²` vertices.
pub fn generate_sphere(radius: f32, resolution: u32) -> Result<SphereMesh, MeshError> {
    generate_sphere_with(radius, resolution, PoleClosure::default())
}

/// Generate a sphere with an explicit pole closure policy.
///
/// Sample `(i, j)` sits at azimuth `φ = π − i·2π/(n−1)` and polar angle
/// `θ = π − j·π/(n−1)`: `i` sweeps one full turn, `j` climbs from the south
/// pole (`y = −r`) to the north pole (`y = r`). Its texture coordinate is
/// `(i/(n−1), 1 − j/(n−1))` and vertices are stored row-major, `k = i·n + j`.
pub fn generate_sphere_with(
    radius: f32,
    resolution: u32,
    closure: PoleClosure,
) -> Result<SphereMesh, MeshError> {
    if resolution < 2 {
        return Err(MeshError::ResolutionTooLow(resolution));
    }
    if u64::from(resolution) * u64::from(resolution) > u64::from(u32::MAX) {
        return Err(MeshError::ResolutionTooHigh(resolution));
    }
    if !radius.is_finite() || radius <= 0.0 {
        return Err(MeshError::InvalidRadius(radius));
    }

    let n = resolution;
    let vertex_count = (n * n) as usize;
    let last = (n - 1) as f32;
    let azimuth_step = TAU / last;
    let polar_step = PI / last;

    let mut positions = Vec::with_capacity(vertex_count);
    let mut tex_coords = Vec::with_capacity(vertex_count);

    for i in 0..n {
        let phi = PI - i as f32 * azimuth_step;
        let (sin_phi, cos_phi) = phi.sin_cos();
        for j in 0..n {
            let theta = PI - j as f32 * polar_step;
            let (sin_theta, cos_theta) = theta.sin_cos();
            positions.push(Vec3::new(
                radius * sin_theta * cos_phi,
                radius * cos_theta,
                radius * sin_phi * sin_theta,
            ));
            tex_coords.push([i as f32 / last, 1.0 - j as f32 / last]);
        }
    }

    // Unnormalised, like the positions they come from.
    let normals = positions.clone();

    let indices = match closure {
        PoleClosure::Pinched => pinched_indices(n),
        PoleClosure::Collapsed => collapsed_indices(n),
    };

    Ok(SphereMesh {
        radius,
        resolution,
        positions,
        normals,
        tex_coords,
        indices,
    })
}

/// Grid quads with the pole-sharing triangle of each pole quad dropped.
fn pinched_indices(n: u32) -> Vec<u32> {
    let quads = (n - 1) as usize * (n - 1) as usize;
    let mut indices = Vec::with_capacity(quads * 6 - (n as usize - 1) * 6);

    for i in 0..n - 1 {
        for j in 0..n - 1 {
            let k = i * n + j;
            // j == 0: k and k+n both sit on the south pole.
            if j != 0 {
                indices.extend_from_slice(&[k, k + n, k + n + 1]);
            }
            // j == n-2: k+1 and k+n+1 both sit on the north pole.
            if j != n - 2 {
                indices.extend_from_slice(&[k, k + n + 1, k + 1]);
            }
        }
    }
    indices
}

/// Every grid quad plus a degenerate triple per seam or north-pole vertex.
fn collapsed_indices(n: u32) -> Vec<u32> {
    let pole = n * n - 1;
    let quads = (n - 1) as usize * (n - 1) as usize;
    let mut indices = Vec::with_capacity(quads * 6 + (2 * n as usize - 1) * 3);

    for i in 0..n {
        for j in 0..n {
            let k = i * n + j;
            if i < n - 1 && j < n - 1 {
                indices.extend_from_slice(&[k, k + n, k + n + 1]);
                indices.extend_from_slice(&[k, k + n + 1, k + 1]);
            } else {
                indices.extend_from_slice(&[k, pole, pole]);
            }
        }
    }
    indices
}

impl SphereMesh {
    /// Radius the mesh was generated with.
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Samples per angular parameter.
    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Per-vertex normals. They equal the positions and are not unit length
    /// unless the radius is 1.
    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn tex_coords(&self) -> &[[f32; 2]] {
        &self.tex_coords
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Index triples, one per triangle.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices
            .chunks_exact(3)
            .map(|tri| [tri[0], tri[1], tri[2]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertex(mesh: &SphereMesh, i: u32, j: u32) -> usize {
        (i * mesh.resolution() + j) as usize
    }

    #[test]
    fn test_vertices_lie_on_sphere() {
        for &(radius, resolution) in &[(1.0_f32, 24_u32), (0.5, 24), (0.25, 7), (12.0, 40)] {
            let mesh = generate_sphere(radius, resolution).unwrap();
            assert_eq!(mesh.vertex_count(), (resolution * resolution) as usize);
            for pos in mesh.positions() {
                let len = pos.length();
                assert!(
                    (len - radius).abs() < 1e-5 * radius.max(1.0),
                    "vertex at distance {len}, expected {radius}"
                );
            }
        }
    }

    #[test]
    fn test_normals_equal_positions() {
        let mesh = generate_sphere(3.0, 10).unwrap();
        assert_eq!(mesh.normals(), mesh.positions());
        assert_eq!(mesh.tex_coords().len(), mesh.vertex_count());
    }

    #[test]
    fn test_indices_valid_for_both_closures() {
        for closure in [PoleClosure::Pinched, PoleClosure::Collapsed] {
            for resolution in [2, 3, 5, 24] {
                let mesh = generate_sphere_with(1.0, resolution, closure).unwrap();
                assert_eq!(mesh.indices().len() % 3, 0);
                let count = mesh.vertex_count() as u32;
                for &idx in mesh.indices() {
                    assert!(
                        idx < count,
                        "{closure:?} n={resolution}: index {idx} out of bounds ({count})"
                    );
                }
            }
        }
    }

    #[test]
    fn test_index_counts() {
        let n = 24_usize;
        let pinched = generate_sphere_with(1.0, n as u32, PoleClosure::Pinched).unwrap();
        assert_eq!(pinched.triangle_count(), 2 * (n - 1) * (n - 1) - 2 * (n - 1));

        let collapsed = generate_sphere_with(1.0, n as u32, PoleClosure::Collapsed).unwrap();
        assert_eq!(
            collapsed.indices().len(),
            6 * (n - 1) * (n - 1) + 3 * (2 * n - 1)
        );
    }

    #[test]
    fn test_tex_coords_monotonic() {
        let mesh = generate_sphere(1.0, 16).unwrap();
        let n = mesh.resolution();
        let uv = mesh.tex_coords();

        for j in 0..n {
            assert_eq!(uv[vertex(&mesh, 0, j)][0], 0.0);
            assert_eq!(uv[vertex(&mesh, n - 1, j)][0], 1.0);
            for i in 1..n {
                assert!(uv[vertex(&mesh, i, j)][0] > uv[vertex(&mesh, i - 1, j)][0]);
            }
        }
        for i in 0..n {
            assert_eq!(uv[vertex(&mesh, i, 0)][1], 1.0);
            assert_eq!(uv[vertex(&mesh, i, n - 1)][1], 0.0);
            for j in 1..n {
                assert!(uv[vertex(&mesh, i, j)][1] < uv[vertex(&mesh, i, j - 1)][1]);
            }
        }
    }

    #[test]
    fn test_rows_run_south_to_north() {
        let mesh = generate_sphere(2.0, 9).unwrap();
        let south = mesh.positions()[vertex(&mesh, 3, 0)];
        let north = mesh.positions()[vertex(&mesh, 3, 8)];
        assert!((south.y + 2.0).abs() < 1e-5);
        assert!((north.y - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_collapsed_closes_seam_and_north_pole() {
        let n = 5_u32;
        let mesh = generate_sphere_with(1.0, n, PoleClosure::Collapsed).unwrap();
        let pole = n * n - 1;

        let mut closed = Vec::new();
        for tri in mesh.indices().chunks(3) {
            if tri[1] == pole && tri[2] == pole {
                closed.push(tri[0]);
            } else {
                // Grid quads never reach from the top of one column into the next.
                let (i, j) = (tri[0] / n, tri[0] % n);
                assert!(i < n - 1 && j < n - 1, "quad at boundary vertex {}", tri[0]);
            }
        }
        let boundary: Vec<u32> = (0..n * n)
            .filter(|k| k / n == n - 1 || k % n == n - 1)
            .collect();
        assert_eq!(closed, boundary);
    }

    #[test]
    fn test_resolution_two() {
        let pinched = generate_sphere(1.0, 2).unwrap();
        assert_eq!(pinched.vertex_count(), 4);
        assert_eq!(pinched.triangle_count(), 0);
        for pos in pinched.positions() {
            assert!((pos.y.abs() - 1.0).abs() < 1e-5, "expected a pole, got {pos}");
        }

        let collapsed = generate_sphere_with(1.0, 2, PoleClosure::Collapsed).unwrap();
        assert_eq!(
            collapsed.indices(),
            &[0, 2, 3, 0, 3, 1, 1, 3, 3, 2, 3, 3, 3, 3, 3]
        );
    }

    #[test]
    fn test_rejects_bad_arguments() {
        assert_eq!(generate_sphere(1.0, 1), Err(MeshError::ResolutionTooLow(1)));
        assert_eq!(generate_sphere(1.0, 0), Err(MeshError::ResolutionTooLow(0)));
        assert_eq!(
            generate_sphere(1.0, 70_000),
            Err(MeshError::ResolutionTooHigh(70_000))
        );
        assert_eq!(generate_sphere(0.0, 8), Err(MeshError::InvalidRadius(0.0)));
        assert_eq!(generate_sphere(-1.0, 8), Err(MeshError::InvalidRadius(-1.0)));
        assert!(matches!(
            generate_sphere(f32::NAN, 8),
            Err(MeshError::InvalidRadius(_))
        ));
        assert!(generate_sphere(f32::INFINITY, 8).is_err());
    }

    #[test]
    fn test_generation_is_deterministic() {
        let a = generate_sphere(0.5, 24).unwrap();
        let b = generate_sphere(0.5, 24).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_pinched_has_no_degenerate_triangles() {
        let mesh = generate_sphere(1.0, 24).unwrap();
        let pos = mesh.positions();
        for [a, b, c] in mesh.triangles() {
            let (a, b, c) = (pos[a as usize], pos[b as usize], pos[c as usize]);
            let area = (b - a).cross(c - a).length() * 0.5;
            assert!(area > 1e-5, "zero-area triangle {a} {b} {c}");
        }
    }

    #[test]
    fn test_winding_faces_outward() {
        for closure in [PoleClosure::Pinched, PoleClosure::Collapsed] {
            let mesh = generate_sphere_with(1.0, 12, closure).unwrap();
            let pos = mesh.positions();
            for [a, b, c] in mesh.triangles() {
                let (a, b, c) = (pos[a as usize], pos[b as usize], pos[c as usize]);
                let normal = (b - a).cross(c - a);
                if normal.length() < 1e-5 {
                    continue;
                }
                let centroid = (a + b + c) / 3.0;
                assert!(normal.dot(centroid) > 0.0, "inward triangle at {centroid}");
            }
        }
    }
}
