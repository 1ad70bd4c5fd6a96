//! Vertex and index buffers for sphere meshes.

use bytemuck::{Pod, Zeroable};
use solaris_mesh::SphereMesh;
use wgpu::util::DeviceExt;

/// Vertex and index buffers of one uploaded mesh.
pub struct MeshBuffer {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

impl MeshBuffer {
    /// Bind the buffers and issue one indexed draw. Empty meshes draw nothing.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        if self.index_count == 0 {
            return;
        }
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

/// Creates immutable GPU buffers.
pub struct BufferAllocator<'a> {
    device: &'a wgpu::Device,
}

impl<'a> BufferAllocator<'a> {
    pub fn new(device: &'a wgpu::Device) -> Self {
        Self { device }
    }

    /// Upload vertices and `u32` indices as one mesh.
    pub fn create_mesh<V: Pod>(&self, label: &str, vertices: &[V], indices: &[u32]) -> MeshBuffer {
        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label}-vertices")),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label}-indices")),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            });

        MeshBuffer {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        }
    }

    /// Interleave and upload a sphere.
    pub fn upload_sphere(&self, label: &str, mesh: &SphereMesh) -> MeshBuffer {
        let vertices = interleave_sphere(mesh);
        log::debug!(
            "Uploading sphere '{label}': {} vertices, {} triangles",
            vertices.len(),
            mesh.triangle_count()
        );
        self.create_mesh(label, &vertices, mesh.indices())
    }
}

/// Interleaved position, normal and texture coordinate.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct VertexPositionNormalUv {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl VertexPositionNormalUv {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Zip a sphere's parallel arrays into GPU vertices.
pub fn interleave_sphere(mesh: &SphereMesh) -> Vec<VertexPositionNormalUv> {
    mesh.positions()
        .iter()
        .zip(mesh.normals())
        .zip(mesh.tex_coords())
        .map(|((position, normal), uv)| VertexPositionNormalUv {
            position: position.to_array(),
            normal: normal.to_array(),
            uv: *uv,
        })
        .collect()
}
