//! Reusable resource fixtures.
//!
//! Small constructors for each handle kind, plus [`ResourceSet`], one of
//! everything with a reference-count snapshot for balance checks.

use strand_core::{
    AnyResource, Buffer, BufferDesc, BufferUsage, ComputePipelineState, ComputePipelineStateDesc,
    DepthStencilView, Format, GraphicsPipelineState, GraphicsPipelineStateDesc,
    PrimitiveTopology, RayTracingGeometry, RayTracingGeometryDesc, RayTracingGeometryInstance,
    RayTracingPipelineState, RayTracingPipelineStateDesc, RayTracingScene, RayTracingSceneDesc,
    RenderTargetView, SamplerDesc, SamplerState, Shader, ShaderDesc, ShaderResourceView,
    ShaderStage, ShaderViewDesc, Texture, TextureDesc, TextureViewDesc, UnorderedAccessView,
};

pub fn vertex_buffer(name: &str) -> Buffer {
    Buffer::new(
        name,
        BufferDesc::new(4096, BufferUsage::VERTEX | BufferUsage::COPY_DST).with_stride(32),
    )
}

pub fn index_buffer(name: &str) -> Buffer {
    Buffer::new(
        name,
        BufferDesc::new(1024, BufferUsage::INDEX | BufferUsage::COPY_DST).with_stride(4),
    )
}

pub fn constant_buffer(name: &str) -> Buffer {
    Buffer::new(
        name,
        BufferDesc::new(256, BufferUsage::CONSTANT | BufferUsage::DYNAMIC),
    )
}

/// A buffer usable as copy source and destination.
pub fn staging_buffer(name: &str, size: u64) -> Buffer {
    Buffer::new(
        name,
        BufferDesc::new(size, BufferUsage::COPY_SRC | BufferUsage::COPY_DST),
    )
}

pub fn texture(name: &str, width: u32, height: u32) -> Texture {
    Texture::new(
        name,
        TextureDesc::texture_2d(Format::R8G8B8A8Unorm, width, height),
    )
}

/// A color texture and a render-target view of it.
pub fn render_target(name: &str, width: u32, height: u32) -> (Texture, RenderTargetView) {
    let tex = texture(name, width, height);
    let rtv = RenderTargetView::new(format!("{name}.rtv"), TextureViewDesc::new(tex.clone()));
    (tex, rtv)
}

/// A depth texture and a depth-stencil view of it.
pub fn depth_stencil(name: &str, width: u32, height: u32) -> (Texture, DepthStencilView) {
    let tex = Texture::new(name, TextureDesc::texture_2d(Format::D32Float, width, height));
    let dsv = DepthStencilView::new(format!("{name}.dsv"), TextureViewDesc::new(tex.clone()));
    (tex, dsv)
}

pub fn shader_resource_view(texture: &Texture) -> ShaderResourceView {
    ShaderResourceView::new(
        format!("{}.srv", texture.name()),
        ShaderViewDesc::texture(texture.clone()),
    )
}

pub fn unordered_access_view(texture: &Texture) -> UnorderedAccessView {
    UnorderedAccessView::new(
        format!("{}.uav", texture.name()),
        ShaderViewDesc::texture(texture.clone()),
    )
}

pub fn sampler(name: &str) -> SamplerState {
    SamplerState::new(name, SamplerDesc::default())
}

pub fn shader(stage: ShaderStage) -> Shader {
    Shader::new(format!("{stage}_shader"), ShaderDesc::new(stage))
}

pub fn graphics_pipeline(name: &str) -> GraphicsPipelineState {
    GraphicsPipelineState::new(
        name,
        GraphicsPipelineStateDesc {
            vertex_shader: shader(ShaderStage::Vertex),
            pixel_shader: Some(shader(ShaderStage::Pixel)),
            topology: PrimitiveTopology::TriangleList,
            render_target_formats: vec![Format::R8G8B8A8Unorm],
            depth_stencil_format: Format::D32Float,
        },
    )
}

pub fn compute_pipeline(name: &str) -> ComputePipelineState {
    ComputePipelineState::new(
        name,
        ComputePipelineStateDesc {
            shader: shader(ShaderStage::Compute),
        },
    )
}

pub fn ray_tracing_pipeline(name: &str) -> RayTracingPipelineState {
    RayTracingPipelineState::new(
        name,
        RayTracingPipelineStateDesc {
            ray_gen: shader(ShaderStage::Compute),
            max_recursion_depth: 1,
        },
    )
}

pub fn ray_tracing_geometry(name: &str, allow_update: bool) -> RayTracingGeometry {
    RayTracingGeometry::new(
        name,
        RayTracingGeometryDesc {
            vertex_count: 3,
            index_count: 3,
            allow_update,
        },
    )
}

pub fn ray_tracing_scene(name: &str, allow_update: bool) -> RayTracingScene {
    RayTracingScene::new(
        name,
        RayTracingSceneDesc {
            max_instances: 16,
            allow_update,
        },
    )
}

/// One handle of every kind.
///
/// Views are built over `color`, so a recorded view also retains the
/// texture through the view's description.
pub struct ResourceSet {
    pub vertex_buffer: Buffer,
    pub index_buffer: Buffer,
    pub constant_buffer: Buffer,
    pub staging: Buffer,
    pub color: Texture,
    pub resolve: Texture,
    pub rtv: RenderTargetView,
    pub depth: Texture,
    pub dsv: DepthStencilView,
    pub srv: ShaderResourceView,
    pub uav: UnorderedAccessView,
    pub sampler: SamplerState,
    pub shader: Shader,
    pub graphics_pipeline: GraphicsPipelineState,
    pub compute_pipeline: ComputePipelineState,
    pub ray_tracing_pipeline: RayTracingPipelineState,
    pub blas: RayTracingGeometry,
    pub tlas: RayTracingScene,
}

impl ResourceSet {
    pub fn new() -> Self {
        let (color, rtv) = render_target("color", 64, 64);
        let (depth, dsv) = depth_stencil("depth", 64, 64);
        let srv = shader_resource_view(&color);
        let uav = unordered_access_view(&color);
        Self {
            vertex_buffer: vertex_buffer("vb"),
            index_buffer: index_buffer("ib"),
            constant_buffer: constant_buffer("cb"),
            staging: staging_buffer("staging", 4096),
            resolve: texture("resolve", 64, 64),
            color,
            rtv,
            depth,
            dsv,
            srv,
            uav,
            sampler: sampler("linear"),
            shader: shader(ShaderStage::Pixel),
            graphics_pipeline: graphics_pipeline("opaque"),
            compute_pipeline: compute_pipeline("cull"),
            ray_tracing_pipeline: ray_tracing_pipeline("shadows"),
            blas: ray_tracing_geometry("blas", true),
            tlas: ray_tracing_scene("tlas", true),
        }
    }

    /// One instance of `blas` for scene builds.
    pub fn instance(&self) -> RayTracingGeometryInstance {
        RayTracingGeometryInstance::new(self.blas.clone(), 0)
    }

    /// Every handle in the set, type-erased.
    pub fn all(&self) -> Vec<AnyResource> {
        vec![
            self.vertex_buffer.clone().into(),
            self.index_buffer.clone().into(),
            self.constant_buffer.clone().into(),
            self.staging.clone().into(),
            self.color.clone().into(),
            self.resolve.clone().into(),
            self.rtv.clone().into(),
            self.depth.clone().into(),
            self.dsv.clone().into(),
            self.srv.clone().into(),
            self.uav.clone().into(),
            self.sampler.clone().into(),
            self.shader.clone().into(),
            self.graphics_pipeline.clone().into(),
            self.compute_pipeline.clone().into(),
            self.ray_tracing_pipeline.clone().into(),
            self.blas.clone().into(),
            self.tlas.clone().into(),
        ]
    }

    /// Current reference count of every handle, in [`all`](Self::all)
    /// order, not counting the temporaries `all` creates.
    pub fn ref_counts(&self) -> Vec<usize> {
        self.all().iter().map(|r| r.ref_count() - 1).collect()
    }
}

impl Default for ResourceSet {
    fn default() -> Self {
        Self::new()
    }
}
