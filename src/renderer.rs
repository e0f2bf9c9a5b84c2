use anyhow::{Context, Result};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::controls::ControlEvent;
use crate::lifecycle::LifecycleStatus;
use crate::scene::{NodeHandle, Scene};
use crate::session::{describe_pose, ViewerSession};
use crate::types::{CameraUniform, InstanceUniform, MeshData, Vertex};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.06,
    g: 0.07,
    b: 0.09,
    a: 1.0,
};

/// GPU copy of one mesh node
struct GpuMesh {
    mesh: Arc<MeshData>,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    instance_buffer: wgpu::Buffer,
    instance_bind_group: wgpu::BindGroup,
}

/// Flat-lit rasterizer for the scene plus the egui overlay
/// Per-frame numbers shown in the debug overlay
#[derive(Debug, Clone, Copy, Default)]
pub struct OverlayStats {
    pub fps: f32,
    pub frame: u64,
    pub loads_in_flight: usize,
}

pub struct MeshRenderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    size: winit::dpi::PhysicalSize<u32>,
    pipeline: wgpu::RenderPipeline,
    depth_view: wgpu::TextureView,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    instance_layout: wgpu::BindGroupLayout,
    meshes: HashMap<NodeHandle, GpuMesh>,
    egui_renderer: egui_wgpu::Renderer,
    egui_state: egui_winit::State,
    egui_ctx: egui::Context,
    show_ui: bool,
}

impl MeshRenderer {
    pub async fn new(window: Arc<Window>, show_ui: bool) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;
        let adapter = Self::request_adapter(&instance, &surface).await?;
        let (device, queue) = Self::request_device(&adapter).await?;

        let config = Self::create_surface_config(&surface, &adapter, size)?;
        surface.configure(&device, &config);

        let camera_layout = Self::uniform_layout(&device, "Camera Bind Group Layout");
        let instance_layout = Self::uniform_layout(&device, "Instance Bind Group Layout");

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[CameraUniform {
                view_proj: glam::Mat4::IDENTITY.to_cols_array_2d(),
                eye: [0.0; 3],
                _pad: 0.0,
            }]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Camera Bind Group"),
            layout: &camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let pipeline = Self::create_pipeline(&device, config.format, &camera_layout, &instance_layout);
        let depth_view = Self::create_depth_view(&device, size);

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, config.format, egui_wgpu::RendererOptions::default());

        log::info!("Renderer initialized: {}x{} {:?}", size.width, size.height, config.format);

        Ok(Self {
            device,
            queue,
            surface,
            config,
            size,
            pipeline,
            depth_view,
            camera_buffer,
            camera_bind_group,
            instance_layout,
            meshes: HashMap::new(),
            egui_renderer,
            egui_state,
            egui_ctx,
            show_ui,
        })
    }

    async fn request_adapter(instance: &wgpu::Instance, surface: &wgpu::Surface<'_>) -> Result<wgpu::Adapter> {
        instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(surface),
                force_fallback_adapter: false,
            })
            .await
            .context("Failed to find appropriate adapter")
    }

    async fn request_device(adapter: &wgpu::Adapter) -> Result<(wgpu::Device, wgpu::Queue)> {
        adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                experimental_features: Default::default(),
                trace: Default::default(),
            })
            .await
            .context("Failed to create device")
    }

    fn create_surface_config(
        surface: &wgpu::Surface,
        adapter: &wgpu::Adapter,
        size: winit::dpi::PhysicalSize<u32>,
    ) -> Result<wgpu::SurfaceConfiguration> {
        let surface_caps = surface.get_capabilities(adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("Surface reports no formats")?;

        Ok(wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps.present_modes.first().copied().unwrap_or(wgpu::PresentMode::Fifo),
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        })
    }

    fn uniform_layout(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(label),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        })
    }

    fn create_depth_view(device: &wgpu::Device, size: winit::dpi::PhysicalSize<u32>) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: size.width.max(1),
                height: size.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    fn create_pipeline(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        camera_layout: &wgpu::BindGroupLayout,
        instance_layout: &wgpu::BindGroupLayout,
    ) -> wgpu::RenderPipeline {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mesh Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("mesh.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Pipeline Layout"),
            bind_group_layouts: &[camera_layout, instance_layout],
            push_constant_ranges: &[],
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Mesh Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
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
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        })
    }

    fn upload_mesh(&self, mesh: &Arc<MeshData>) -> GpuMesh {
        let label = mesh.name.as_deref().unwrap_or("mesh");

        let vertex_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let instance_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Instance Buffer"),
            contents: bytemuck::cast_slice(&[InstanceUniform::new(glam::Mat4::IDENTITY, mesh.base_color)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let instance_bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Instance Bind Group"),
            layout: &self.instance_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: instance_buffer.as_entire_binding(),
            }],
        });

        GpuMesh {
            mesh: mesh.clone(),
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
            instance_buffer,
            instance_bind_group,
        }
    }

    /// Upload new meshes, refresh world matrices, drop detached nodes
    fn sync_meshes(&mut self, scene: &Scene) {
        let mut live = HashSet::new();

        for instance in scene.mesh_instances() {
            if instance.mesh.vertices.is_empty() || instance.mesh.indices.is_empty() {
                continue;
            }
            live.insert(instance.handle);

            let stale = self
                .meshes
                .get(&instance.handle)
                .is_none_or(|gpu| !Arc::ptr_eq(&gpu.mesh, &instance.mesh));
            if stale {
                let gpu = self.upload_mesh(&instance.mesh);
                self.meshes.insert(instance.handle, gpu);
            }

            if let Some(gpu) = self.meshes.get(&instance.handle) {
                let uniform = InstanceUniform::new(instance.world, instance.mesh.base_color);
                self.queue
                    .write_buffer(&gpu.instance_buffer, 0, bytemuck::cast_slice(&[uniform]));
            }
        }

        let before = self.meshes.len();
        self.meshes.retain(|handle, _| live.contains(handle));
        if self.meshes.len() != before {
            log::debug!("Released {} GPU meshes", before - self.meshes.len());
        }
    }

    pub fn aspect(&self) -> f32 {
        self.size.width.max(1) as f32 / self.size.height.max(1) as f32
    }

    pub fn size(&self) -> winit::dpi::PhysicalSize<u32> {
        self.size
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.size = new_size;
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
        self.depth_view = Self::create_depth_view(&self.device, new_size);
    }

    /// Draw one frame; returns the control changes made in the overlay
    pub fn render(
        &mut self,
        window: &Window,
        session: &mut ViewerSession,
        stats: OverlayStats,
    ) -> std::result::Result<Vec<ControlEvent>, wgpu::SurfaceError> {
        self.sync_meshes(session.scene());

        let camera_uniform = session.camera().to_uniform(self.aspect());
        self.queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[camera_uniform]));

        let output = self.surface.get_current_texture()?;
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Encoder"),
        });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Mesh Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
            for gpu in self.meshes.values() {
                render_pass.set_bind_group(1, &gpu.instance_bind_group, &[]);
                render_pass.set_vertex_buffer(0, gpu.vertex_buffer.slice(..));
                render_pass.set_index_buffer(gpu.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..gpu.index_count, 0, 0..1);
            }
        }

        let mut events = Vec::new();
        if self.show_ui {
            events = self.render_overlay(window, session, stats, &mut encoder, &view);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(events)
    }

    fn render_overlay(
        &mut self,
        window: &Window,
        session: &mut ViewerSession,
        stats: OverlayStats,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
    ) -> Vec<ControlEvent> {
        let mut events = Vec::new();
        let raw_input = self.egui_state.take_egui_input(window);

        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            egui::Window::new("Debug Info")
                .title_bar(true)
                .resizable(false)
                .fixed_pos(egui::pos2(10.0, 10.0))
                .default_width(250.0)
                .show(ctx, |ui| {
                    let fps = stats.fps;
                    ui.heading(
                        egui::RichText::new(format!("{:.0} FPS", fps))
                            .size(32.0)
                            .color(egui::Color32::from_rgb(74, 158, 255)),
                    );
                    let frame_time_ms = if fps > 0.0 { 1000.0 / fps } else { 0.0 };
                    ui.label(
                        egui::RichText::new(format!("{:.2} ms  frame {}", frame_time_ms, stats.frame))
                            .size(14.0)
                            .color(egui::Color32::GRAY),
                    );

                    ui.add_space(10.0);
                    ui.separator();
                    ui.add_space(5.0);

                    ui.label(
                        egui::RichText::new("Model")
                            .size(16.0)
                            .color(egui::Color32::from_rgb(100, 200, 100)),
                    );
                    match session.status() {
                        LifecycleStatus::Empty => ui.monospace("none"),
                        LifecycleStatus::Loading { id } => ui.monospace(format!("loading {}...", id)),
                        LifecycleStatus::Ready { id } => ui.monospace(id),
                        LifecycleStatus::Failed { id, message } => ui.colored_label(
                            egui::Color32::from_rgb(230, 90, 90),
                            format!("{} failed: {}", id, message),
                        ),
                    };
                    if let Some(clip) = session.lifecycle().current().and_then(|m| m.clip()) {
                        ui.monospace(format!("clip \"{}\" {:.2}s", clip.name, clip.duration));
                    }
                    if stats.loads_in_flight > 0 {
                        ui.monospace(format!("{} load(s) in flight", stats.loads_in_flight));
                    }

                    ui.add_space(5.0);
                    ui.separator();
                    ui.add_space(5.0);

                    ui.label(
                        egui::RichText::new("Scroll")
                            .size(16.0)
                            .color(egui::Color32::from_rgb(100, 200, 100)),
                    );
                    ui.monospace(describe_pose(session));
                    ui.monospace(format!(
                        "offset {:.0} / {:.0} px",
                        session.scroll().offset(),
                        session.scroll().max_extent()
                    ));
                    ui.monospace(format!(
                        "playback {}",
                        if session.gate().is_enabled() { "on" } else { "off" }
                    ));

                    ui.add_space(5.0);
                    ui.separator();
                    ui.add_space(5.0);

                    let camera = session.camera();
                    ui.monospace(format!(
                        "Yaw: {:.1}° Pitch: {:.1}° Dist: {:.2}{}",
                        camera.yaw.to_degrees(),
                        camera.pitch.to_degrees(),
                        camera.distance,
                        if camera.is_moving() { " (moving)" } else { "" }
                    ));
                });

            egui::Window::new("Controls")
                .resizable(false)
                .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-10.0, 10.0))
                .default_width(220.0)
                .show(ctx, |ui| {
                    events.extend(session.panel_mut().show(ui));
                });
        });

        self.egui_state
            .handle_platform_output(window, full_output.platform_output);

        let tris = self
            .egui_ctx
            .tessellate(full_output.shapes, self.egui_ctx.pixels_per_point());
        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.size.width, self.size.height],
            pixels_per_point: window.scale_factor() as f32,
        };

        self.egui_renderer
            .update_buffers(&self.device, &self.queue, encoder, &tris, &screen_descriptor);

        {
            let mut render_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    occlusion_query_set: None,
                    timestamp_writes: None,
                })
                .forget_lifetime();

            self.egui_renderer
                .render(&mut render_pass, &tris, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        events
    }

    /// Returns true when egui consumed the event
    pub fn handle_event(&mut self, window: &Window, event: &winit::event::WindowEvent) -> bool {
        self.show_ui && self.egui_state.on_window_event(window, event).consumed
    }
}
