//! wgpu renderer: one instanced draw per decoration category plus one
//! textured billboard per photo.

use std::collections::HashMap;
use std::sync::Arc;

use glam::{Mat4, Vec3};
use tinsel::animator::{InstanceBuffer, InstanceRaw};
use tinsel::polaroid::load_data_uri;
use tinsel::{Category, CommittedPhoto, PhotoId, Scene, UserPhoto, ViewerError};
use wgpu::util::DeviceExt;
use winit::window::Window;

use super::camera::OrbitCamera;
use super::mesh::{category_mesh, photo_quad, MeshVertex, QuadVertex};
use super::shaders::{Material, Uniforms, MESH_SHADER, PHOTO_SHADER};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
/// The whole tree is drawn shifted down so the cone sits in frame.
const SCENE_OFFSET: Vec3 = Vec3::new(0.0, -5.0, 0.0);
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.01,
    g: 0.02,
    b: 0.04,
    a: 1.0,
};

const INSTANCE_ATTRIBUTES: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
    2 => Float32x3,
    3 => Float32,
    4 => Float32x4,
    5 => Float32x4,
];
const MESH_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];
const QUAD_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2];

fn instance_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &INSTANCE_ATTRIBUTES,
    }
}

fn material(category: Category) -> Material {
    let (emissive, shininess, specular) = match category {
        Category::Needle => (0.0, 8.0, 0.05),
        Category::Ornament => (0.0, 64.0, 0.9),
        Category::Light => (1.0, 1.0, 0.0),
    };
    Material {
        emissive,
        shininess,
        specular,
        _padding: 0.0,
    }
}

/// GPU resources for one decoration category.
struct MeshDraw {
    vertices: wgpu::Buffer,
    vertex_count: u32,
    instances: wgpu::Buffer,
    instance_count: u32,
    material: wgpu::BindGroup,
}

pub struct Renderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    depth_texture: wgpu::TextureView,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    mesh_pipeline: wgpu::RenderPipeline,
    photo_pipeline: wgpu::RenderPipeline,
    /// Indexed like [`Category::ALL`].
    meshes: Vec<MeshDraw>,
    photo_quad: wgpu::Buffer,
    photo_instances: wgpu::Buffer,
    photo_capacity: usize,
    /// One bind group per uploaded photo, in display order.
    photo_textures: Vec<wgpu::BindGroup>,
    /// Pixels handed over by the upload worker, waiting for a texture.
    staged_pixels: HashMap<PhotoId, image::RgbaImage>,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    staging: Vec<InstanceRaw>,
}

impl Renderer {
    pub async fn new(window: Arc<Window>, scene: &Scene) -> Result<Self, ViewerError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(ViewerError::NoAdapter)?;
        log::info!("Using adapter: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        // Instance colors and photo pixels are already sRGB-encoded; write them as-is.
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture = create_depth_texture(&device, &config);

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Uniform Buffer"),
            size: std::mem::size_of::<Uniforms>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_layout = create_uniform_layout(
            &device,
            "Uniform Bind Group Layout",
            wgpu::ShaderStages::VERTEX_FRAGMENT,
        );
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Uniform Bind Group"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let material_layout = create_uniform_layout(
            &device,
            "Material Bind Group Layout",
            wgpu::ShaderStages::FRAGMENT,
        );

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Photo Texture Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Photo Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let mesh_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mesh Shader"),
            source: wgpu::ShaderSource::Wgsl(MESH_SHADER.into()),
        });
        let mesh_pipeline = create_pipeline(
            &device,
            "Mesh Pipeline",
            &mesh_shader,
            &[&uniform_layout, &material_layout],
            &[
                wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &MESH_ATTRIBUTES,
                },
                instance_layout(),
            ],
            config.format,
        );

        let photo_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Photo Shader"),
            source: wgpu::ShaderSource::Wgsl(PHOTO_SHADER.into()),
        });
        let photo_pipeline = create_pipeline(
            &device,
            "Photo Pipeline",
            &photo_shader,
            &[&uniform_layout, &texture_layout],
            &[
                wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &QUAD_ATTRIBUTES,
                },
                instance_layout(),
            ],
            config.format,
        );

        let meshes = Category::ALL
            .iter()
            .map(|&category| {
                let vertices = category_mesh(category);
                let count = scene.animator(category).len();
                let material_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Material Buffer"),
                    contents: bytemuck::bytes_of(&material(category)),
                    usage: wgpu::BufferUsages::UNIFORM,
                });
                MeshDraw {
                    vertices: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some(category.name()),
                        contents: bytemuck::cast_slice(&vertices),
                        usage: wgpu::BufferUsages::VERTEX,
                    }),
                    vertex_count: vertices.len() as u32,
                    instances: create_instance_buffer(&device, count),
                    instance_count: count as u32,
                    material: device.create_bind_group(&wgpu::BindGroupDescriptor {
                        label: Some("Material Bind Group"),
                        layout: &material_layout,
                        entries: &[wgpu::BindGroupEntry {
                            binding: 0,
                            resource: material_buffer.as_entire_binding(),
                        }],
                    }),
                }
            })
            .collect();

        let photo_quad = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Photo Quad"),
            contents: bytemuck::cast_slice(&photo_quad()),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let photo_capacity = 8;
        let photo_instances = create_instance_buffer(&device, photo_capacity);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            depth_texture,
            uniform_buffer,
            uniform_bind_group,
            mesh_pipeline,
            photo_pipeline,
            meshes,
            photo_quad,
            photo_instances,
            photo_capacity,
            photo_textures: Vec::new(),
            staged_pixels: HashMap::new(),
            texture_layout,
            sampler,
            staging: Vec::new(),
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.depth_texture = create_depth_texture(&self.device, &self.config);
        }
    }

    /// Keep a freshly committed photo's pixels for its texture.
    pub fn stage_photo(&mut self, photo: CommittedPhoto) {
        self.staged_pixels.insert(photo.id, photo.pixels);
    }

    /// Create textures for photos committed since the last call. Photos
    /// without staged pixels are decoded from their data URI.
    fn sync_photos(&mut self, photos: &[UserPhoto]) {
        for photo in &photos[self.photo_textures.len().min(photos.len())..] {
            let pixels = match self.staged_pixels.remove(&photo.id) {
                Some(pixels) => pixels,
                None => load_data_uri(&photo.image).unwrap_or_else(|e| {
                    log::warn!("photo {} has no usable texture: {}", photo.id, e);
                    image::RgbaImage::from_pixel(1, 1, image::Rgba([255, 255, 255, 255]))
                }),
            };
            let bind_group = self.create_photo_texture(&pixels);
            self.photo_textures.push(bind_group);
        }

        if photos.len() > self.photo_capacity {
            self.photo_capacity = photos.len().next_power_of_two();
            self.photo_instances = create_instance_buffer(&self.device, self.photo_capacity);
        }
    }

    fn create_photo_texture(&self, pixels: &image::RgbaImage) -> wgpu::BindGroup {
        let (width, height) = pixels.dimensions();
        let extent = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Photo Texture"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels.as_raw(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            extent,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Photo Bind Group"),
            layout: &self.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        })
    }

    fn update_uniforms(&mut self, camera: &OrbitCamera, time: f32) {
        let aspect = self.config.width as f32 / self.config.height as f32;
        let view = camera.view_matrix();
        let view_proj =
            camera.projection_matrix(aspect) * view * Mat4::from_translation(SCENE_OFFSET);
        let eye = camera.position() - SCENE_OFFSET;

        let uniforms = Uniforms {
            view_proj: view_proj.to_cols_array_2d(),
            camera_right: view.row(0).truncate().extend(0.0).to_array(),
            camera_up: view.row(1).truncate().extend(0.0).to_array(),
            camera_position: eye.extend(1.0).to_array(),
            time,
            _padding: [0.0; 3],
        };
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));
    }

    pub fn render(
        &mut self,
        scene: &Scene,
        camera: &OrbitCamera,
        time: f32,
    ) -> Result<(), wgpu::SurfaceError> {
        self.sync_photos(scene.photos());
        self.update_uniforms(camera, time);

        for (mesh, animator) in self.meshes.iter().zip(scene.decorations()) {
            upload_instances(&self.queue, &mut self.staging, animator.buffer(), &mesh.instances);
        }
        upload_instances(
            &self.queue,
            &mut self.staging,
            scene.photo_animator().buffer(),
            &self.photo_instances,
        );
        let photo_count = scene.photo_animator().len().min(self.photo_textures.len());

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
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
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&self.mesh_pipeline);
            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            for mesh in &self.meshes {
                if mesh.instance_count == 0 {
                    continue;
                }
                render_pass.set_bind_group(1, &mesh.material, &[]);
                render_pass.set_vertex_buffer(0, mesh.vertices.slice(..));
                render_pass.set_vertex_buffer(1, mesh.instances.slice(..));
                render_pass.draw(0..mesh.vertex_count, 0..mesh.instance_count);
            }

            render_pass.set_pipeline(&self.photo_pipeline);
            render_pass.set_vertex_buffer(0, self.photo_quad.slice(..));
            render_pass.set_vertex_buffer(1, self.photo_instances.slice(..));
            for (i, texture) in self.photo_textures.iter().take(photo_count).enumerate() {
                let i = i as u32;
                render_pass.set_bind_group(1, texture, &[]);
                render_pass.draw(0..6, i..i + 1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

fn create_uniform_layout(
    device: &wgpu::Device,
    label: &str,
    visibility: wgpu::ShaderStages,
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

fn create_pipeline(
    device: &wgpu::Device,
    label: &str,
    shader: &wgpu::ShaderModule,
    bind_group_layouts: &[&wgpu::BindGroupLayout],
    buffers: &[wgpu::VertexBufferLayout],
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts,
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn upload_instances(
    queue: &wgpu::Queue,
    staging: &mut Vec<InstanceRaw>,
    buffer: &InstanceBuffer,
    target: &wgpu::Buffer,
) {
    if buffer.is_empty() {
        return;
    }
    staging.resize(buffer.len(), InstanceRaw::default());
    buffer.pack_into(staging);
    queue.write_buffer(target, 0, bytemuck::cast_slice(&staging[..buffer.len()]));
}

fn create_instance_buffer(device: &wgpu::Device, count: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Instance Buffer"),
        size: (count.max(1) * std::mem::size_of::<InstanceRaw>()) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_depth_texture(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
