//! [`RenderBackend`] implementation on top of wgpu.
//!
//! Draws are recorded during [`RenderBackend::draw`] and replayed into a
//! render pass by [`WgpuBackend::encode`]. Each draw owns one slot of a
//! dynamic-offset uniform buffer that grows when a frame has more draws than
//! slots.

use std::path::Path;
use std::sync::Arc;

use glam::Vec3;
use solaris_mesh::SphereMesh;
use solaris_scene::{BodyDraw, FrameContext, RenderBackend};

use crate::body_pipeline::{BodyPipeline, BodyUniform, FrameUniform, slot_stride};
use crate::buffer::{BufferAllocator, MeshBuffer};
use crate::texture::{ManagedTexture, TextureManager};

struct PendingDraw {
    mesh: Arc<MeshBuffer>,
    texture: Arc<ManagedTexture>,
    offset: u32,
}

/// Draws scene bodies with [`BodyPipeline`].
pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: BodyPipeline,
    textures: TextureManager,
    frame_buffer: wgpu::Buffer,
    body_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    slot_stride: u64,
    slot_capacity: u64,
    staging: Vec<u8>,
    pending: Vec<PendingDraw>,
    wireframe: bool,
    light_position: Vec3,
}

const INITIAL_SLOTS: u64 = 8;

impl WgpuBackend {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        line_mode: bool,
    ) -> Self {
        let textures = TextureManager::new(device);
        let pipeline = BodyPipeline::new(
            device,
            surface_format,
            textures.bind_group_layout(),
            line_mode,
        );

        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("frame-uniform"),
            size: std::mem::size_of::<FrameUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let stride = slot_stride(
            std::mem::size_of::<BodyUniform>() as u64,
            u64::from(device.limits().min_uniform_buffer_offset_alignment),
        );
        let body_buffer = create_body_buffer(device, stride, INITIAL_SLOTS);
        let uniform_bind_group =
            create_uniform_bind_group(device, &pipeline, &frame_buffer, &body_buffer);

        Self {
            device: device.clone(),
            queue: queue.clone(),
            pipeline,
            textures,
            frame_buffer,
            body_buffer,
            uniform_bind_group,
            slot_stride: stride,
            slot_capacity: INITIAL_SLOTS,
            staging: Vec::new(),
            pending: Vec::new(),
            wireframe: false,
            light_position: Vec3::ZERO,
        }
    }

    /// Switch between fill and line rendering. Returns the mode in effect,
    /// which stays fill when the device cannot draw lines.
    pub fn set_wireframe(&mut self, enabled: bool) -> bool {
        self.wireframe = enabled && self.pipeline.wireframe.is_some();
        self.wireframe
    }

    /// World-space position of the point light (the sun's centre).
    pub fn set_light_position(&mut self, position: Vec3) {
        self.light_position = position;
    }

    /// Start recording a frame: drop last frame's draws and upload the
    /// camera and light.
    pub fn begin_frame(&mut self, frame: &FrameContext) {
        self.pending.clear();
        self.staging.clear();
        let uniform = FrameUniform::new(frame.camera_position, self.light_position);
        self.queue
            .write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(&uniform));
    }

    /// Upload the recorded per-body uniforms and replay the draws into `pass`.
    pub fn encode(&mut self, pass: &mut wgpu::RenderPass<'_>) {
        if self.pending.is_empty() {
            return;
        }
        self.ensure_capacity(self.pending.len() as u64);
        self.queue.write_buffer(&self.body_buffer, 0, &self.staging);

        let pipeline = match (&self.pipeline.wireframe, self.wireframe) {
            (Some(line), true) => line,
            _ => &self.pipeline.fill,
        };
        pass.set_pipeline(pipeline);
        for draw in &self.pending {
            pass.set_bind_group(0, &self.uniform_bind_group, &[draw.offset]);
            pass.set_bind_group(1, &draw.texture.bind_group, &[]);
            draw.mesh.draw(pass);
        }
    }

    fn ensure_capacity(&mut self, slots: u64) {
        if slots <= self.slot_capacity {
            return;
        }
        let capacity = slots.next_power_of_two();
        log::debug!("Growing body uniform buffer to {capacity} slots");
        self.body_buffer = create_body_buffer(&self.device, self.slot_stride, capacity);
        self.uniform_bind_group = create_uniform_bind_group(
            &self.device,
            &self.pipeline,
            &self.frame_buffer,
            &self.body_buffer,
        );
        self.slot_capacity = capacity;
    }
}

impl RenderBackend for WgpuBackend {
    type Geometry = Arc<MeshBuffer>;
    type Texture = Arc<ManagedTexture>;

    fn upload(&mut self, mesh: &SphereMesh) -> Self::Geometry {
        let label = format!("sphere-r{}-n{}", mesh.radius(), mesh.resolution());
        Arc::new(BufferAllocator::new(&self.device).upload_sphere(&label, mesh))
    }

    fn load_texture(&mut self, path: Option<&Path>) -> Self::Texture {
        self.textures
            .load_or_fallback(&self.device, &self.queue, path)
    }

    fn draw(&mut self, geometry: &Self::Geometry, draw: &BodyDraw, texture: &Self::Texture) {
        let offset = self.staging.len() as u64;
        let uniform = BodyUniform::new(draw.mvp, draw.model, draw.emissive);
        self.staging.extend_from_slice(bytemuck::bytes_of(&uniform));
        self.staging
            .resize((offset + self.slot_stride) as usize, 0);

        self.pending.push(PendingDraw {
            mesh: Arc::clone(geometry),
            texture: Arc::clone(texture),
            offset: offset as u32,
        });
    }
}

fn create_body_buffer(device: &wgpu::Device, stride: u64, slots: u64) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("body-uniforms"),
        size: stride * slots,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_uniform_bind_group(
    device: &wgpu::Device,
    pipeline: &BodyPipeline,
    frame_buffer: &wgpu::Buffer,
    body_buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("body-uniform-bind-group"),
        layout: &pipeline.uniform_bind_group_layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: body_buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<BodyUniform>() as u64),
                }),
            },
        ],
    })
}
