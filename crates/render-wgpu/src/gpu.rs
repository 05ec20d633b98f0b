use crate::projection::Projection;
use crate::shaders;
use bytemuck::{Pod, Zeroable};
use cubeyard_common::Cube;
use cubeyard_scene::Scene;
use glam::{Mat4, Quat, Vec3};
use wgpu::util::DeviceExt;

/// Uniform scale applied to every cube instance.
const CUBE_SCALE: f32 = 0.33;

/// Front and back faces of a cube.
const FACE_BRIGHT: [f32; 3] = [79.0 / 255.0, 171.0 / 255.0, 67.0 / 255.0];
/// Top, bottom, left, and right faces.
const FACE_DARK: [f32; 3] = [36.0 / 255.0, 79.0 / 255.0, 31.0 / 255.0];

/// Background gradient endpoints.
const BACKGROUND_TOP: [f32; 3] = [0.0, 0.3, 0.7];
const BACKGROUND_BOTTOM: [f32; 3] = [0.0, 0.15, 0.35];

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Vertex {
    position: [f32; 3],
    color: [f32; 3],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Instance {
    model_0: [f32; 4],
    model_1: [f32; 4],
    model_2: [f32; 4],
    model_3: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct BackgroundVertex {
    position: [f32; 2],
    color: [f32; 3],
}

/// Generate the shared unit cube: 6 faces x 4 vertices, flat face colors
/// baked into the vertex data.
fn cube_mesh() -> (Vec<Vertex>, Vec<u16>) {
    let p = 0.5_f32;
    #[rustfmt::skip]
    let vertices = vec![
        // +Z face (front)
        Vertex { position: [-p, -p,  p], color: FACE_BRIGHT },
        Vertex { position: [ p, -p,  p], color: FACE_BRIGHT },
        Vertex { position: [ p,  p,  p], color: FACE_BRIGHT },
        Vertex { position: [-p,  p,  p], color: FACE_BRIGHT },
        // -Z face (back)
        Vertex { position: [ p, -p, -p], color: FACE_BRIGHT },
        Vertex { position: [-p, -p, -p], color: FACE_BRIGHT },
        Vertex { position: [-p,  p, -p], color: FACE_BRIGHT },
        Vertex { position: [ p,  p, -p], color: FACE_BRIGHT },
        // +X face
        Vertex { position: [ p, -p,  p], color: FACE_DARK },
        Vertex { position: [ p, -p, -p], color: FACE_DARK },
        Vertex { position: [ p,  p, -p], color: FACE_DARK },
        Vertex { position: [ p,  p,  p], color: FACE_DARK },
        // -X face
        Vertex { position: [-p, -p, -p], color: FACE_DARK },
        Vertex { position: [-p, -p,  p], color: FACE_DARK },
        Vertex { position: [-p,  p,  p], color: FACE_DARK },
        Vertex { position: [-p,  p, -p], color: FACE_DARK },
        // +Y face
        Vertex { position: [-p,  p,  p], color: FACE_DARK },
        Vertex { position: [ p,  p,  p], color: FACE_DARK },
        Vertex { position: [ p,  p, -p], color: FACE_DARK },
        Vertex { position: [-p,  p, -p], color: FACE_DARK },
        // -Y face
        Vertex { position: [-p, -p, -p], color: FACE_DARK },
        Vertex { position: [ p, -p, -p], color: FACE_DARK },
        Vertex { position: [ p, -p,  p], color: FACE_DARK },
        Vertex { position: [-p, -p,  p], color: FACE_DARK },
    ];
    #[rustfmt::skip]
    let indices: Vec<u16> = vec![
        0,1,2, 2,3,0,       // +Z
        4,5,6, 6,7,4,       // -Z
        8,9,10, 10,11,8,    // +X
        12,13,14, 14,15,12, // -X
        16,17,18, 18,19,16, // +Y
        20,21,22, 22,23,20, // -Y
    ];
    (vertices, indices)
}

/// Full-screen quad in clip space, bottom color on the lower edge and top
/// color on the upper edge.
fn background_mesh() -> (Vec<BackgroundVertex>, Vec<u16>) {
    let vertices = vec![
        BackgroundVertex {
            position: [-1.0, -1.0],
            color: BACKGROUND_BOTTOM,
        },
        BackgroundVertex {
            position: [1.0, -1.0],
            color: BACKGROUND_BOTTOM,
        },
        BackgroundVertex {
            position: [1.0, 1.0],
            color: BACKGROUND_TOP,
        },
        BackgroundVertex {
            position: [-1.0, 1.0],
            color: BACKGROUND_TOP,
        },
    ];
    let indices: Vec<u16> = vec![0, 1, 2, 2, 3, 0];
    (vertices, indices)
}

fn instance_for(cube: &Cube) -> Instance {
    let model = Mat4::from_scale_rotation_translation(
        Vec3::splat(CUBE_SCALE),
        Quat::from_rotation_y(cube.angle.to_radians()),
        cube.position,
    );
    let cols = model.to_cols_array_2d();
    Instance {
        model_0: cols[0],
        model_1: cols[1],
        model_2: cols[2],
        model_3: cols[3],
    }
}

/// Build per-frame instance data: committed cubes in insertion order, active
/// cube last so it draws on top of the committed sequence. The active cube
/// is always included, even when the committed list hits the buffer cap.
fn scene_instances(scene: &Scene, max_instances: usize) -> Vec<Instance> {
    let committed = scene.committed();
    let take = committed.len().min(max_instances.saturating_sub(1));
    let mut instances = Vec::with_capacity(take + 1);
    for cube in &committed[..take] {
        instances.push(instance_for(cube));
    }
    instances.push(instance_for(scene.active()));
    instances
}

/// wgpu-based scene renderer.
pub struct SceneRenderer {
    background_pipeline: wgpu::RenderPipeline,
    cube_pipeline: wgpu::RenderPipeline,
    uniform_bind_group: wgpu::BindGroup,
    background_vertex_buffer: wgpu::Buffer,
    background_index_buffer: wgpu::Buffer,
    background_index_count: u32,
    cube_vertex_buffer: wgpu::Buffer,
    cube_index_buffer: wgpu::Buffer,
    cube_index_count: u32,
    instance_buffer: wgpu::Buffer,
    max_instances: u32,
    depth_texture: wgpu::TextureView,
}

impl SceneRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        projection: &Projection,
    ) -> Self {
        // The projection never changes, so the uniform buffer is written
        // exactly once, here.
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("uniform_buffer"),
            contents: bytemuck::bytes_of(&Uniforms {
                view_proj: projection.matrix().to_cols_array_2d(),
            }),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let cube_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("cube_pipeline_layout"),
                bind_group_layouts: &[&bind_group_layout],
                push_constant_ranges: &[],
            });

        let cube_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("cube_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::CUBE_SHADER.into()),
        });

        let cube_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("cube_pipeline"),
            layout: Some(&cube_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &cube_shader,
                entry_point: Some("vs_cube"),
                compilation_options: Default::default(),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<Vertex>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![
                            0 => Float32x3,
                            1 => Float32x3,
                        ],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<Instance>() as u64,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &wgpu::vertex_attr_array![
                            2 => Float32x4,
                            3 => Float32x4,
                            4 => Float32x4,
                            5 => Float32x4,
                        ],
                    },
                ],
            },
            fragment: Some(wgpu::FragmentState {
                module: &cube_shader,
                entry_point: Some("fs_cube"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let background_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("background_pipeline_layout"),
                bind_group_layouts: &[],
                push_constant_ranges: &[],
            });

        let background_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("background_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::BACKGROUND_SHADER.into()),
        });

        // The background shares the render pass with the cubes, so it needs
        // a matching depth state; it tests Always and never writes.
        let background_pipeline =
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("background_pipeline"),
                layout: Some(&background_pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &background_shader,
                    entry_point: Some("vs_background"),
                    compilation_options: Default::default(),
                    buffers: &[wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<BackgroundVertex>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![
                            0 => Float32x2,
                            1 => Float32x3,
                        ],
                    }],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &background_shader,
                    entry_point: Some("fs_background"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: surface_format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: wgpu::TextureFormat::Depth32Float,
                    depth_write_enabled: false,
                    depth_compare: wgpu::CompareFunction::Always,
                    stencil: Default::default(),
                    bias: Default::default(),
                }),
                multisample: Default::default(),
                multiview: None,
                cache: None,
            });

        let (cube_verts, cube_indices) = cube_mesh();
        let cube_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cube_vertex_buffer"),
            contents: bytemuck::cast_slice(&cube_verts),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let cube_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cube_index_buffer"),
            contents: bytemuck::cast_slice(&cube_indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let cube_index_count = cube_indices.len() as u32;

        let (background_verts, background_indices) = background_mesh();
        let background_vertex_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("background_vertex_buffer"),
                contents: bytemuck::cast_slice(&background_verts),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let background_index_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("background_index_buffer"),
                contents: bytemuck::cast_slice(&background_indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        let background_index_count = background_indices.len() as u32;

        // Instance buffer (pre-allocated; 150 floor cubes plus whatever the
        // user places).
        let max_instances = 4096u32;
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_buffer"),
            size: (max_instances as u64) * std::mem::size_of::<Instance>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let depth_texture = Self::create_depth_texture(device, width, height);

        Self {
            background_pipeline,
            cube_pipeline,
            uniform_bind_group,
            background_vertex_buffer,
            background_index_buffer,
            background_index_count,
            cube_vertex_buffer,
            cube_index_buffer,
            cube_index_count,
            instance_buffer,
            max_instances,
            depth_texture,
        }
    }

    /// Recreate the depth buffer to match a resized surface. The projection
    /// is deliberately left untouched.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    /// Render one frame: clear, background gradient, then every committed
    /// cube and the active cube last.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        scene: &Scene,
    ) {
        let instances = scene_instances(scene, self.max_instances as usize);
        queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            // Background gradient, no depth writes.
            pass.set_pipeline(&self.background_pipeline);
            pass.set_vertex_buffer(0, self.background_vertex_buffer.slice(..));
            pass.set_index_buffer(
                self.background_index_buffer.slice(..),
                wgpu::IndexFormat::Uint16,
            );
            pass.draw_indexed(0..self.background_index_count, 0, 0..1);

            // Instanced cubes under the fixed projection.
            pass.set_pipeline(&self.cube_pipeline);
            pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            pass.set_vertex_buffer(0, self.cube_vertex_buffer.slice(..));
            pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
            pass.set_index_buffer(self.cube_index_buffer.slice(..), wgpu::IndexFormat::Uint16);
            pass.draw_indexed(0..self.cube_index_count, 0, 0..instances.len() as u32);
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubeyard_common::Axis;

    #[test]
    fn cube_mesh_is_six_quads() {
        let (verts, indices) = cube_mesh();
        assert_eq!(verts.len(), 24);
        assert_eq!(indices.len(), 36);

        // Front and back faces are bright, the rest dark.
        for v in &verts[..8] {
            assert_eq!(v.color, FACE_BRIGHT);
        }
        for v in &verts[8..] {
            assert_eq!(v.color, FACE_DARK);
        }
    }

    #[test]
    fn background_spans_clip_space() {
        let (verts, indices) = background_mesh();
        assert_eq!(verts.len(), 4);
        assert_eq!(indices.len(), 6);
        assert_eq!(verts[0].color, BACKGROUND_BOTTOM);
        assert_eq!(verts[3].color, BACKGROUND_TOP);
        assert_eq!(verts[0].position, [-1.0, -1.0]);
        assert_eq!(verts[2].position, [1.0, 1.0]);
    }

    #[test]
    fn instances_put_active_cube_last() {
        let mut scene = Scene::with_floor_grid();
        scene.translate_active(Axis::X, 1.25);

        let instances = scene_instances(&scene, 4096);
        assert_eq!(instances.len(), 151);

        let last = instances.last().unwrap();
        let pos = scene.active().position;
        assert_eq!(last.model_3[0], pos.x);
        assert_eq!(last.model_3[1], pos.y);
        assert_eq!(last.model_3[2], pos.z);
    }

    #[test]
    fn instance_model_applies_uniform_scale() {
        let cube = Cube::SPAWN;
        let inst = instance_for(&cube);
        // Zero rotation: the basis columns are pure scale.
        assert_eq!(inst.model_0[0], CUBE_SCALE);
        assert_eq!(inst.model_1[1], CUBE_SCALE);
        assert_eq!(inst.model_2[2], CUBE_SCALE);
    }

    #[test]
    fn instance_cap_never_drops_the_active_cube() {
        let mut scene = Scene::new();
        for _ in 0..10 {
            scene.commit_active();
        }
        scene.translate_active(Axis::Y, 9.0);

        let instances = scene_instances(&scene, 4);
        assert_eq!(instances.len(), 4);
        assert_eq!(instances.last().unwrap().model_3[1], 9.0);
    }
}
