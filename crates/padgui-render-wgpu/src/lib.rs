use std::borrow::Cow;
use std::sync::Arc;

use padgui_core::{Rect, RenderBackend, Scene, SceneNode, TextureId};
use slotmap::SlotMap;

pub mod viewport;

pub use viewport::{Letterbox, quad_corners, uv_rect};

#[derive(Clone)]
struct UploadRing {
    buf: wgpu::Buffer,
    cap: u64,
    head: u64,
}
impl UploadRing {
    fn new(device: &wgpu::Device, label: &str, cap: u64) -> Self {
        let buf = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: cap,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self { buf, cap, head: 0 }
    }
    fn reset(&mut self) {
        self.head = 0;
    }
    /// Grow (dropping contents) so a frame's worth of `needed` bytes fits.
    fn reserve(&mut self, device: &wgpu::Device, label: &str, needed: u64) {
        if needed > self.cap {
            let cap = needed.next_power_of_two();
            log::debug!("{label}: growing upload ring to {cap} bytes");
            *self = Self::new(device, label, cap);
        }
    }
    fn alloc_write(&mut self, queue: &wgpu::Queue, bytes: &[u8]) -> u64 {
        let align = 4u64;
        let start = (self.head + (align - 1)) & !(align - 1);
        queue.write_buffer(&self.buf, start, bytes);
        self.head = start + bytes.len() as u64;
        start
    }
}

struct GpuTexture {
    size: (u32, u32),
    // kept alive for the bind group's view
    _texture: wgpu::Texture,
    bind: wgpu::BindGroup,
}

pub struct WgpuBackend {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    logical: (u32, u32),

    fill_pipeline: wgpu::RenderPipeline,
    outline_pipeline: wgpu::RenderPipeline,
    image_pipeline: wgpu::RenderPipeline,
    image_bind_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,

    textures: SlotMap<TextureId, GpuTexture>,

    // per-frame upload rings
    ring_fill: UploadRing,
    ring_outline: UploadRing,
    ring_image: UploadRing,
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct FillInstance {
    // xy in NDC (y is the bottom edge), wh in NDC extents
    xywh: [f32; 4],
    // surface pixels, for the SDF
    size: [f32; 2],
    radius: f32,
    // rgba (linear)
    color: [f32; 4],
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct OutlineInstance {
    xywh: [f32; 4],
    size: [f32; 2],
    radius: f32,
    stroke: f32,
    color: [f32; 4],
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct ImageInstance {
    // NDC corners: tl, tr / bl, br
    p01: [f32; 4],
    p23: [f32; 4],
    uv: [f32; 4],
    color: [f32; 4],
}

enum Cmd {
    Fill { off: u64, cnt: u32 },
    Outline { off: u64, cnt: u32 },
    Image { texture: TextureId, off: u64, cnt: u32 },
}

/// Consecutive nodes of one kind (and, for images, one texture) are drawn
/// with a single instanced call; scene order is kept across kinds.
#[derive(Default)]
struct Batch {
    fills: Vec<FillInstance>,
    outlines: Vec<OutlineInstance>,
    images: Vec<ImageInstance>,
    runs: Vec<Run>,
}

enum Run {
    Fill(std::ops::Range<usize>),
    Outline(std::ops::Range<usize>),
    Image(TextureId, std::ops::Range<usize>),
}

impl Batch {
    fn push_fill(&mut self, inst: FillInstance) {
        let i = self.fills.len();
        self.fills.push(inst);
        match self.runs.last_mut() {
            Some(Run::Fill(r)) => r.end = i + 1,
            _ => self.runs.push(Run::Fill(i..i + 1)),
        }
    }
    fn push_outline(&mut self, inst: OutlineInstance) {
        let i = self.outlines.len();
        self.outlines.push(inst);
        match self.runs.last_mut() {
            Some(Run::Outline(r)) => r.end = i + 1,
            _ => self.runs.push(Run::Outline(i..i + 1)),
        }
    }
    fn push_image(&mut self, texture: TextureId, inst: ImageInstance) {
        let i = self.images.len();
        self.images.push(inst);
        match self.runs.last_mut() {
            Some(Run::Image(t, r)) if *t == texture => r.end = i + 1,
            _ => self.runs.push(Run::Image(texture, i..i + 1)),
        }
    }
}

fn instance_layout<'a>(
    stride: usize,
    attributes: &'a [wgpu::VertexAttribute],
) -> wgpu::VertexBufferLayout<'a> {
    wgpu::VertexBufferLayout {
        array_stride: stride as u64,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes,
    }
}

fn attr(shader_location: u32, offset: u64, format: wgpu::VertexFormat) -> wgpu::VertexAttribute {
    wgpu::VertexAttribute {
        shader_location,
        offset,
        format,
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    label: &str,
    shader: &wgpu::ShaderModule,
    layout: &wgpu::PipelineLayout,
    buffer: wgpu::VertexBufferLayout<'_>,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[buffer],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

impl WgpuBackend {
    pub fn new(window: Arc<winit::window::Window>) -> anyhow::Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::from_env_or_default());
        let surface = instance.create_surface(window.clone())?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .map_err(|_e| anyhow::anyhow!("No adapter"))?;
        log::info!("wgpu adapter: {:?}", adapter.get_info().name);

        let (device, queue) =
            pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
                label: Some("padgui device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                    .using_resolution(adapter.limits()),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            }))?;

        let size = window.inner_size();

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("surface reports no formats"))?;
        // vsync paces the frame loop on handhelds
        let present_mode = caps
            .present_modes
            .iter()
            .copied()
            .find(|m| *m == wgpu::PresentMode::Fifo)
            .unwrap_or(wgpu::PresentMode::AutoVsync);
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let plain_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("shape pipeline layout"),
            bind_group_layouts: &[],
            immediate_size: 0,
        });

        // Pipelines: Fills
        let fill_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("fill.wgsl"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!("shaders/fill.wgsl"))),
        });
        let fill_attrs = [
            attr(0, 0, wgpu::VertexFormat::Float32x4),
            attr(1, 16, wgpu::VertexFormat::Float32x2),
            attr(2, 24, wgpu::VertexFormat::Float32),
            attr(3, 28, wgpu::VertexFormat::Float32x4),
        ];
        let fill_pipeline = create_pipeline(
            &device,
            "fill pipeline",
            &fill_shader,
            &plain_layout,
            instance_layout(std::mem::size_of::<FillInstance>(), &fill_attrs),
            config.format,
        );

        // Pipelines: Outlines (SDF ring)
        let outline_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("outline.wgsl"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!(
                "shaders/outline.wgsl"
            ))),
        });
        let outline_attrs = [
            attr(0, 0, wgpu::VertexFormat::Float32x4),
            attr(1, 16, wgpu::VertexFormat::Float32x2),
            attr(2, 24, wgpu::VertexFormat::Float32),
            attr(3, 28, wgpu::VertexFormat::Float32),
            attr(4, 32, wgpu::VertexFormat::Float32x4),
        ];
        let outline_pipeline = create_pipeline(
            &device,
            "outline pipeline",
            &outline_shader,
            &plain_layout,
            instance_layout(std::mem::size_of::<OutlineInstance>(), &outline_attrs),
            config.format,
        );

        // Pipelines: Images
        let image_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("image.wgsl"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!("shaders/image.wgsl"))),
        });
        let image_bind_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("image bind layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
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
        let image_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("image pipeline layout"),
                bind_group_layouts: &[&image_bind_layout],
                immediate_size: 0,
            });
        let image_attrs = [
            attr(0, 0, wgpu::VertexFormat::Float32x4),
            attr(1, 16, wgpu::VertexFormat::Float32x4),
            attr(2, 32, wgpu::VertexFormat::Float32x4),
            attr(3, 48, wgpu::VertexFormat::Float32x4),
        ];
        let image_pipeline = create_pipeline(
            &device,
            "image pipeline",
            &image_shader,
            &image_pipeline_layout,
            instance_layout(std::mem::size_of::<ImageInstance>(), &image_attrs),
            config.format,
        );

        // pixel art and glyph atlases stay crisp when scaled up
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("image sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let ring_fill = UploadRing::new(&device, "ring fill", 1 << 16);
        let ring_outline = UploadRing::new(&device, "ring outline", 1 << 14);
        let ring_image = UploadRing::new(&device, "ring image", 1 << 18);

        log::info!(
            "wgpu surface {}x{} {:?} {:?}",
            config.width,
            config.height,
            config.format,
            config.present_mode
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            logical: (size.width.max(1), size.height.max(1)),
            fill_pipeline,
            outline_pipeline,
            image_pipeline,
            image_bind_layout,
            sampler,
            textures: SlotMap::with_key(),
            ring_fill,
            ring_outline,
            ring_image,
        })
    }

    pub fn surface_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    fn letterbox(&self) -> Letterbox {
        Letterbox::fit(self.logical, (self.config.width, self.config.height))
    }

    fn batch(&self, scene: &Scene) -> Batch {
        let lb = self.letterbox();
        let mut batch = Batch::default();

        // the logical screen gets the clear color; the bars stay black
        let screen = Rect::new(0, 0, self.logical.0 as i32, self.logical.1 as i32);
        let [_, _, sw, sh] = lb.rect(screen);
        batch.push_fill(FillInstance {
            xywh: lb.ndc_rect(screen),
            size: [sw, sh],
            radius: 0.0,
            color: scene.clear_color.to_linear(),
        });

        for node in &scene.nodes {
            match node {
                SceneNode::Fill {
                    rect,
                    color,
                    radius,
                } => {
                    let [_, _, w, h] = lb.rect(*rect);
                    batch.push_fill(FillInstance {
                        xywh: lb.ndc_rect(*rect),
                        size: [w, h],
                        radius: *radius as f32 * lb.scale,
                        color: color.to_linear(),
                    });
                }
                SceneNode::Outline {
                    rect,
                    color,
                    thickness,
                    radius,
                } => {
                    let [_, _, w, h] = lb.rect(*rect);
                    batch.push_outline(OutlineInstance {
                        xywh: lb.ndc_rect(*rect),
                        size: [w, h],
                        radius: *radius as f32 * lb.scale,
                        stroke: *thickness as f32 * lb.scale,
                        color: color.to_linear(),
                    });
                }
                SceneNode::Image {
                    texture,
                    src,
                    dst,
                    tint,
                    flip,
                    angle,
                    pivot,
                } => {
                    let Some(tex) = self.textures.get(*texture) else {
                        log::warn!("scene refers to destroyed texture {texture:?}");
                        continue;
                    };
                    let c = quad_corners(*dst, *angle, *pivot).map(|(x, y)| lb.ndc_point(x, y));
                    batch.push_image(
                        *texture,
                        ImageInstance {
                            p01: [c[0][0], c[0][1], c[1][0], c[1][1]],
                            p23: [c[2][0], c[2][1], c[3][0], c[3][1]],
                            uv: uv_rect(*src, tex.size, *flip),
                            color: tint.to_linear(),
                        },
                    );
                }
            }
        }
        batch
    }

    fn upload(&mut self, batch: &Batch) -> Vec<Cmd> {
        let fill_bytes: &[u8] = bytemuck::cast_slice(&batch.fills);
        let outline_bytes: &[u8] = bytemuck::cast_slice(&batch.outlines);
        let image_bytes: &[u8] = bytemuck::cast_slice(&batch.images);
        self.ring_fill
            .reserve(&self.device, "ring fill", fill_bytes.len() as u64);
        self.ring_outline
            .reserve(&self.device, "ring outline", outline_bytes.len() as u64);
        self.ring_image
            .reserve(&self.device, "ring image", image_bytes.len() as u64);
        self.ring_fill.reset();
        self.ring_outline.reset();
        self.ring_image.reset();

        fn stride<T>() -> usize {
            std::mem::size_of::<T>()
        }
        let fill_off = if fill_bytes.is_empty() {
            0
        } else {
            self.ring_fill.alloc_write(&self.queue, fill_bytes)
        };
        let outline_off = if outline_bytes.is_empty() {
            0
        } else {
            self.ring_outline.alloc_write(&self.queue, outline_bytes)
        };
        let image_off = if image_bytes.is_empty() {
            0
        } else {
            self.ring_image.alloc_write(&self.queue, image_bytes)
        };

        batch
            .runs
            .iter()
            .map(|run| match run {
                Run::Fill(r) => Cmd::Fill {
                    off: fill_off + (r.start * stride::<FillInstance>()) as u64,
                    cnt: r.len() as u32,
                },
                Run::Outline(r) => Cmd::Outline {
                    off: outline_off + (r.start * stride::<OutlineInstance>()) as u64,
                    cnt: r.len() as u32,
                },
                Run::Image(t, r) => Cmd::Image {
                    texture: *t,
                    off: image_off + (r.start * stride::<ImageInstance>()) as u64,
                    cnt: r.len() as u32,
                },
            })
            .collect()
    }
}

impl RenderBackend for WgpuBackend {
    fn configure_surface(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        log::debug!("surface resized to {width}x{height}");
    }

    fn set_logical_size(&mut self, width: u32, height: u32) {
        self.logical = (width.max(1), height.max(1));
    }

    fn create_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> TextureId {
        let (width, height, rgba) = if width == 0
            || height == 0
            || rgba.len() < (width as usize * height as usize * 4)
        {
            log::warn!("texture {width}x{height} with {} bytes; using a blank pixel", rgba.len());
            (1, 1, &[0u8; 4][..])
        } else {
            (width, height, rgba)
        };
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("padgui texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfoBase {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: Some(height),
            },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("texture bind"),
            layout: &self.image_bind_layout,
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
        });
        self.textures.insert(GpuTexture {
            size: (width, height),
            _texture: texture,
            bind,
        })
    }

    fn destroy_texture(&mut self, id: TextureId) {
        if self.textures.remove(id).is_none() {
            log::warn!("destroy of unknown texture {id:?}");
        }
    }

    fn frame(&mut self, scene: &Scene) {
        if self.config.width == 0 || self.config.height == 0 {
            return;
        }
        let frame = loop {
            match self.surface.get_current_texture() {
                Ok(f) => break f,
                Err(wgpu::SurfaceError::Lost) => {
                    log::warn!("surface lost; reconfiguring");
                    self.surface.configure(&self.device, &self.config);
                }
                Err(wgpu::SurfaceError::Outdated) => {
                    log::warn!("surface outdated; reconfiguring");
                    self.surface.configure(&self.device, &self.config);
                }
                Err(wgpu::SurfaceError::Timeout) => {
                    log::warn!("surface timeout; skipping frame");
                    return;
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("surface OOM");
                    return;
                }
                Err(wgpu::SurfaceError::Other) => {
                    log::error!("surface error");
                    return;
                }
            }
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let batch = self.batch(scene);
        let cmds = self.upload(&batch);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame encoder"),
            });

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main pass"),
                multiview_mask: None,
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            let (x, y, w, h) = self.letterbox().scissor(self.logical);
            if w == 0 || h == 0 {
                log::debug!("letterbox is empty; nothing to draw");
            } else {
                rpass.set_scissor_rect(x, y, w, h);
                for cmd in &cmds {
                    match *cmd {
                        Cmd::Fill { off, cnt } => {
                            rpass.set_pipeline(&self.fill_pipeline);
                            let bytes = cnt as u64 * std::mem::size_of::<FillInstance>() as u64;
                            rpass.set_vertex_buffer(0, self.ring_fill.buf.slice(off..off + bytes));
                            rpass.draw(0..6, 0..cnt);
                        }
                        Cmd::Outline { off, cnt } => {
                            rpass.set_pipeline(&self.outline_pipeline);
                            let bytes =
                                cnt as u64 * std::mem::size_of::<OutlineInstance>() as u64;
                            rpass.set_vertex_buffer(
                                0,
                                self.ring_outline.buf.slice(off..off + bytes),
                            );
                            rpass.draw(0..6, 0..cnt);
                        }
                        Cmd::Image { texture, off, cnt } => {
                            let Some(tex) = self.textures.get(texture) else {
                                continue;
                            };
                            rpass.set_pipeline(&self.image_pipeline);
                            rpass.set_bind_group(0, &tex.bind, &[]);
                            let bytes = cnt as u64 * std::mem::size_of::<ImageInstance>() as u64;
                            rpass
                                .set_vertex_buffer(0, self.ring_image.buf.slice(off..off + bytes));
                            rpass.draw(0..6, 0..cnt);
                        }
                    }
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
    }
}
