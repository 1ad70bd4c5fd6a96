//! Textured, lit pipeline for sphere bodies.
//!
//! Group 0 holds the per-frame uniform (binding 0) and the per-body uniform
//! (binding 1, dynamic offset). Group 1 is the body texture from
//! [`crate::TextureManager`].

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::buffer::VertexPositionNormalUv;
use crate::depth::DepthBuffer;

/// Camera and light positions shared by every body in a frame.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct FrameUniform {
    pub camera_position: [f32; 4],
    pub light_position: [f32; 4],
}

impl FrameUniform {
    pub fn new(camera_position: Vec3, light_position: Vec3) -> Self {
        Self {
            camera_position: camera_position.extend(1.0).to_array(),
            light_position: light_position.extend(1.0).to_array(),
        }
    }
}

/// Per-body transforms and shading flags.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct BodyUniform {
    pub mvp: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    /// x: 1.0 for emissive bodies. yzw unused.
    pub flags: [f32; 4],
}

impl BodyUniform {
    pub fn new(mvp: Mat4, model: Mat4, emissive: bool) -> Self {
        Self {
            mvp: mvp.to_cols_array_2d(),
            model: model.to_cols_array_2d(),
            flags: [if emissive { 1.0 } else { 0.0 }, 0.0, 0.0, 0.0],
        }
    }
}

/// Round `size` up to a multiple of `alignment` (a power of two).
pub fn slot_stride(size: u64, alignment: u64) -> u64 {
    size.div_ceil(alignment) * alignment
}

/// Fill pipeline plus an optional line pipeline for wireframe.
pub struct BodyPipeline {
    pub fill: wgpu::RenderPipeline,
    /// `None` when the device lacks `POLYGON_MODE_LINE`.
    pub wireframe: Option<wgpu::RenderPipeline>,
    pub uniform_bind_group_layout: wgpu::BindGroupLayout,
}

impl BodyPipeline {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        texture_bind_group_layout: &wgpu::BindGroupLayout,
        line_mode: bool,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("body-shader"),
            source: wgpu::ShaderSource::Wgsl(BODY_SHADER_SOURCE.into()),
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("body-uniform-bgl"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: wgpu::BufferSize::new(
                                std::mem::size_of::<FrameUniform>() as u64,
                            ),
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: true,
                            min_binding_size: wgpu::BufferSize::new(
                                std::mem::size_of::<BodyUniform>() as u64,
                            ),
                        },
                        count: None,
                    },
                ],
            });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("body-pipeline-layout"),
            bind_group_layouts: &[&uniform_bind_group_layout, texture_bind_group_layout],
            immediate_size: 0,
        });

        let build = |label: &str, polygon_mode: wgpu::PolygonMode| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[VertexPositionNormalUv::layout()],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    // Sphere triangles wind counter-clockwise seen from outside.
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: Some(wgpu::Face::Back),
                    unclipped_depth: false,
                    polygon_mode,
                    conservative: false,
                },
                depth_stencil: Some(DepthBuffer::stencil_state()),
                multisample: wgpu::MultisampleState::default(),
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: surface_format,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                multiview_mask: None,
                cache: None,
            })
        };

        let fill = build("body-pipeline-fill", wgpu::PolygonMode::Fill);
        let wireframe = line_mode.then(|| build("body-pipeline-line", wgpu::PolygonMode::Line));

        Self {
            fill,
            wireframe,
            uniform_bind_group_layout,
        }
    }
}

/// WGSL source of the body shader.
pub const BODY_SHADER_SOURCE: &str = r#"
struct FrameUniform {
    camera_position: vec4<f32>,
    light_position: vec4<f32>,
};

struct BodyUniform {
    mvp: mat4x4<f32>,
    model: mat4x4<f32>,
    flags: vec4<f32>,
};

@group(0) @binding(0) var<uniform> frame: FrameUniform;
@group(0) @binding(1) var<uniform> body: BodyUniform;

@group(1) @binding(0) var t_surface: texture_2d<f32>;
@group(1) @binding(1) var s_surface: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = body.mvp * vec4<f32>(in.position, 1.0);
    out.world_position = (body.model * vec4<f32>(in.position, 1.0)).xyz;
    // Model matrices are rigid, so the upper 3x3 transforms normals too.
    out.world_normal = (body.model * vec4<f32>(in.normal, 0.0)).xyz;
    out.uv = in.uv;
    return out;
}

const AMBIENT: f32 = 0.12;
const SPECULAR_STRENGTH: f32 = 0.25;
const SHININESS: f32 = 32.0;

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let albedo = textureSample(t_surface, s_surface, in.uv).rgb;
    if (body.flags.x > 0.5) {
        return vec4<f32>(albedo, 1.0);
    }

    let n = normalize(in.world_normal);
    let l = normalize(frame.light_position.xyz - in.world_position);
    let v = normalize(frame.camera_position.xyz - in.world_position);
    let h = normalize(l + v);

    let diffuse = max(dot(n, l), 0.0);
    var specular = 0.0;
    if (diffuse > 0.0) {
        specular = SPECULAR_STRENGTH * pow(max(dot(n, h), 0.0), SHININESS);
    }

    let color = albedo * (AMBIENT + diffuse) + vec3<f32>(specular);
    return vec4<f32>(color, 1.0);
}
"#;
