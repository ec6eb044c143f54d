//! Reference-counted GPU resource handles.
//!
//! Each handle is a newtype over `Arc<ResourceObject<Desc>>`. The handle
//! types are generated by `resource_handle!` so that every one of them has
//! the same surface: `new`, `id`, `name`, `desc`, `ref_count`, `ptr_eq`,
//! plus `Clone` (retain) and `Drop` (release) from the `Arc`.
//!
//! Views hold their underlying resource, so a live view keeps its texture
//! or buffer alive.

use std::fmt;
use std::sync::Arc;

use crate::id::ResourceId;
use crate::types::{
    BufferUsage, Format, PrimitiveTopology, SamplerAddressMode, SamplerFilter, ShaderStage,
};

/// Shared backing object for every handle type.
struct ResourceObject<D> {
    id: ResourceId,
    name: String,
    desc: D,
}

macro_rules! resource_handle {
    ($(#[$meta:meta])* $name:ident => $desc:ty) => {
        $(#[$meta])*
        #[derive(Clone)]
        pub struct $name(Arc<ResourceObject<$desc>>);

        impl $name {
            /// Create a new object with a fresh [`ResourceId`] and a
            /// reference count of one.
            pub fn new(name: impl Into<String>, desc: $desc) -> Self {
                Self(Arc::new(ResourceObject {
                    id: ResourceId::next(),
                    name: name.into(),
                    desc,
                }))
            }

            /// Unique identifier of the underlying object.
            pub fn id(&self) -> ResourceId {
                self.0.id
            }

            /// Debug name given at creation.
            pub fn name(&self) -> &str {
                &self.0.name
            }

            /// Creation description.
            pub fn desc(&self) -> &$desc {
                &self.0.desc
            }

            /// Current number of live handles to the underlying object.
            pub fn ref_count(&self) -> usize {
                Arc::strong_count(&self.0)
            }

            /// Whether both handles refer to the same object.
            pub fn ptr_eq(&self, other: &Self) -> bool {
                Arc::ptr_eq(&self.0, &other.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("id", &self.0.id)
                    .field("name", &self.0.name)
                    .finish()
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.ptr_eq(other)
            }
        }

        impl Eq for $name {}

        impl From<$name> for AnyResource {
            fn from(value: $name) -> Self {
                AnyResource::$name(value)
            }
        }
    };
}

// ── Descriptions ────────────────────────────────────────────────

/// Creation description of a [`Buffer`].
#[derive(Clone, Debug, PartialEq)]
pub struct BufferDesc {
    /// Size in bytes.
    pub size: u64,
    /// Element stride in bytes; `0` for raw buffers.
    pub stride: u32,
    /// Pipeline bindings the buffer supports.
    pub usage: BufferUsage,
}

impl BufferDesc {
    /// A buffer of `size` bytes with the given usage and no stride.
    pub fn new(size: u64, usage: BufferUsage) -> Self {
        Self {
            size,
            stride: 0,
            usage,
        }
    }

    /// Set the element stride.
    pub fn with_stride(mut self, stride: u32) -> Self {
        self.stride = stride;
        self
    }
}

/// Dimensionality of a [`Texture`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TextureDimension {
    /// A single 2D image.
    #[default]
    Texture2D,
    /// An array of 2D images.
    Texture2DArray,
    /// Six 2D faces.
    TextureCube,
    /// A volume.
    Texture3D,
}

/// Creation description of a [`Texture`].
#[derive(Clone, Debug, PartialEq)]
pub struct TextureDesc {
    /// Dimensionality.
    pub dimension: TextureDimension,
    /// Texel format.
    pub format: Format,
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
    /// Depth for volumes, slice count for arrays, `1` otherwise.
    pub depth_or_array_size: u32,
    /// Number of mip levels.
    pub mip_levels: u32,
    /// MSAA sample count.
    pub sample_count: u32,
}

impl TextureDesc {
    /// A single-sample, single-mip 2D texture.
    pub fn texture_2d(format: Format, width: u32, height: u32) -> Self {
        Self {
            dimension: TextureDimension::Texture2D,
            format,
            width,
            height,
            depth_or_array_size: 1,
            mip_levels: 1,
            sample_count: 1,
        }
    }

    /// Set the mip level count.
    pub fn with_mip_levels(mut self, mip_levels: u32) -> Self {
        self.mip_levels = mip_levels;
        self
    }

    /// Set the MSAA sample count.
    pub fn with_sample_count(mut self, sample_count: u32) -> Self {
        self.sample_count = sample_count;
        self
    }
}

/// Description of a render-target or depth-stencil view.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureViewDesc {
    /// Viewed texture. Holding it keeps the texture alive.
    pub texture: Texture,
    /// View format; [`Format::Unknown`] inherits the texture format.
    pub format: Format,
    /// Mip level the view addresses.
    pub mip_level: u32,
}

impl TextureViewDesc {
    /// View of mip 0 with the texture's own format.
    pub fn new(texture: Texture) -> Self {
        Self {
            texture,
            format: Format::Unknown,
            mip_level: 0,
        }
    }
}

/// The resource behind a shader-resource or unordered-access view.
#[derive(Clone, Debug, PartialEq)]
pub enum ViewResource {
    /// A texture view.
    Texture(Texture),
    /// A buffer view.
    Buffer(Buffer),
}

impl ViewResource {
    /// Identifier of the viewed resource.
    pub fn id(&self) -> ResourceId {
        match self {
            Self::Texture(t) => t.id(),
            Self::Buffer(b) => b.id(),
        }
    }
}

/// Description of a shader-resource or unordered-access view.
#[derive(Clone, Debug, PartialEq)]
pub struct ShaderViewDesc {
    /// Viewed resource.
    pub resource: ViewResource,
    /// View format.
    pub format: Format,
}

impl ShaderViewDesc {
    /// View of a texture with its own format.
    pub fn texture(texture: Texture) -> Self {
        Self {
            resource: ViewResource::Texture(texture),
            format: Format::Unknown,
        }
    }

    /// View of a buffer.
    pub fn buffer(buffer: Buffer) -> Self {
        Self {
            resource: ViewResource::Buffer(buffer),
            format: Format::Unknown,
        }
    }
}

/// Creation description of a [`SamplerState`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SamplerDesc {
    /// Filtering mode.
    pub filter: SamplerFilter,
    /// Addressing mode for all axes.
    pub address_mode: SamplerAddressMode,
    /// Anisotropy clamp, used with [`SamplerFilter::Anisotropic`].
    pub max_anisotropy: u32,
}

/// Creation description of a [`Shader`].
#[derive(Clone, Debug, PartialEq)]
pub struct ShaderDesc {
    /// Stage the shader runs in.
    pub stage: ShaderStage,
    /// Entry point name.
    pub entry_point: String,
}

impl ShaderDesc {
    /// A shader for `stage` with entry point `main`.
    pub fn new(stage: ShaderStage) -> Self {
        Self {
            stage,
            entry_point: "main".to_owned(),
        }
    }
}

/// Creation description of a [`GraphicsPipelineState`].
#[derive(Clone, Debug, PartialEq)]
pub struct GraphicsPipelineStateDesc {
    /// Vertex stage.
    pub vertex_shader: Shader,
    /// Pixel stage, absent for depth-only passes.
    pub pixel_shader: Option<Shader>,
    /// Primitive topology class.
    pub topology: PrimitiveTopology,
    /// Render target formats, one per bound target.
    pub render_target_formats: Vec<Format>,
    /// Depth-stencil format or [`Format::Unknown`].
    pub depth_stencil_format: Format,
}

/// Creation description of a [`ComputePipelineState`].
#[derive(Clone, Debug, PartialEq)]
pub struct ComputePipelineStateDesc {
    /// Compute stage.
    pub shader: Shader,
}

/// Creation description of a [`RayTracingPipelineState`].
#[derive(Clone, Debug, PartialEq)]
pub struct RayTracingPipelineStateDesc {
    /// Ray generation shader.
    pub ray_gen: Shader,
    /// Maximum trace recursion depth.
    pub max_recursion_depth: u32,
}

/// Creation description of a [`RayTracingGeometry`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RayTracingGeometryDesc {
    /// Number of vertices.
    pub vertex_count: u32,
    /// Number of indices; `0` for non-indexed geometry.
    pub index_count: u32,
    /// Whether the structure may be refit in place.
    pub allow_update: bool,
}

/// Creation description of a [`RayTracingScene`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RayTracingSceneDesc {
    /// Maximum number of instances.
    pub max_instances: u32,
    /// Whether the structure may be refit in place.
    pub allow_update: bool,
}

// ── Handles ─────────────────────────────────────────────────────

resource_handle! {
    /// GPU buffer.
    Buffer => BufferDesc
}

resource_handle! {
    /// GPU texture.
    Texture => TextureDesc
}

resource_handle! {
    /// Render-target view of a texture.
    RenderTargetView => TextureViewDesc
}

resource_handle! {
    /// Depth-stencil view of a texture.
    DepthStencilView => TextureViewDesc
}

resource_handle! {
    /// Read-only shader view of a texture or buffer.
    ShaderResourceView => ShaderViewDesc
}

resource_handle! {
    /// Read-write shader view of a texture or buffer.
    UnorderedAccessView => ShaderViewDesc
}

resource_handle! {
    /// Sampler state object.
    SamplerState => SamplerDesc
}

resource_handle! {
    /// Compiled shader for a single stage.
    Shader => ShaderDesc
}

resource_handle! {
    /// Graphics pipeline state object.
    GraphicsPipelineState => GraphicsPipelineStateDesc
}

resource_handle! {
    /// Compute pipeline state object.
    ComputePipelineState => ComputePipelineStateDesc
}

resource_handle! {
    /// Ray-tracing pipeline state object.
    RayTracingPipelineState => RayTracingPipelineStateDesc
}

resource_handle! {
    /// Bottom-level ray-tracing acceleration structure.
    RayTracingGeometry => RayTracingGeometryDesc
}

resource_handle! {
    /// Top-level ray-tracing acceleration structure.
    RayTracingScene => RayTracingSceneDesc
}

impl Buffer {
    /// Whether the buffer was created with every flag in `usage`.
    pub fn supports(&self, usage: BufferUsage) -> bool {
        self.desc().usage.contains(usage)
    }
}

impl Shader {
    /// Stage the shader runs in.
    pub fn stage(&self) -> ShaderStage {
        self.desc().stage
    }
}

impl RayTracingGeometry {
    /// Whether the structure may be refit in place.
    pub fn allows_update(&self) -> bool {
        self.desc().allow_update
    }
}

impl RayTracingScene {
    /// Whether the structure may be refit in place.
    pub fn allows_update(&self) -> bool {
        self.desc().allow_update
    }
}

/// One instance of a bottom-level structure placed in a scene.
#[derive(Clone, Debug, PartialEq)]
pub struct RayTracingGeometryInstance {
    /// Instanced geometry. Holding it keeps the geometry alive.
    pub geometry: RayTracingGeometry,
    /// Row-major 3x4 object-to-world transform.
    pub transform: [[f32; 4]; 3],
    /// Value exposed to shaders as the instance id.
    pub instance_id: u32,
    /// Visibility mask tested against the ray mask.
    pub mask: u8,
    /// Offset into the hit group table.
    pub hit_group_index: u32,
}

impl RayTracingGeometryInstance {
    /// Identity transform.
    pub const IDENTITY: [[f32; 4]; 3] = [
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
    ];

    /// Instance with an identity transform and a full mask.
    pub fn new(geometry: RayTracingGeometry, instance_id: u32) -> Self {
        Self {
            geometry,
            transform: Self::IDENTITY,
            instance_id,
            mask: 0xFF,
            hit_group_index: 0,
        }
    }
}

// ── Type-erased handle ──────────────────────────────────────────

/// Any resource handle, for operations that accept every kind
/// (destruction, discard, deferred deletion).
#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum AnyResource {
    Buffer(Buffer),
    Texture(Texture),
    RenderTargetView(RenderTargetView),
    DepthStencilView(DepthStencilView),
    ShaderResourceView(ShaderResourceView),
    UnorderedAccessView(UnorderedAccessView),
    SamplerState(SamplerState),
    Shader(Shader),
    GraphicsPipelineState(GraphicsPipelineState),
    ComputePipelineState(ComputePipelineState),
    RayTracingPipelineState(RayTracingPipelineState),
    RayTracingGeometry(RayTracingGeometry),
    RayTracingScene(RayTracingScene),
}

macro_rules! any_resource_dispatch {
    ($self:ident, $r:ident => $body:expr) => {
        match $self {
            AnyResource::Buffer($r) => $body,
            AnyResource::Texture($r) => $body,
            AnyResource::RenderTargetView($r) => $body,
            AnyResource::DepthStencilView($r) => $body,
            AnyResource::ShaderResourceView($r) => $body,
            AnyResource::UnorderedAccessView($r) => $body,
            AnyResource::SamplerState($r) => $body,
            AnyResource::Shader($r) => $body,
            AnyResource::GraphicsPipelineState($r) => $body,
            AnyResource::ComputePipelineState($r) => $body,
            AnyResource::RayTracingPipelineState($r) => $body,
            AnyResource::RayTracingGeometry($r) => $body,
            AnyResource::RayTracingScene($r) => $body,
        }
    };
}

impl AnyResource {
    /// Identifier of the wrapped object.
    pub fn id(&self) -> ResourceId {
        any_resource_dispatch!(self, r => r.id())
    }

    /// Debug name of the wrapped object.
    pub fn name(&self) -> &str {
        any_resource_dispatch!(self, r => r.name())
    }

    /// Current number of live handles to the wrapped object.
    pub fn ref_count(&self) -> usize {
        any_resource_dispatch!(self, r => r.ref_count())
    }

    /// Short name of the resource kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Buffer(_) => "Buffer",
            Self::Texture(_) => "Texture",
            Self::RenderTargetView(_) => "RenderTargetView",
            Self::DepthStencilView(_) => "DepthStencilView",
            Self::ShaderResourceView(_) => "ShaderResourceView",
            Self::UnorderedAccessView(_) => "UnorderedAccessView",
            Self::SamplerState(_) => "SamplerState",
            Self::Shader(_) => "Shader",
            Self::GraphicsPipelineState(_) => "GraphicsPipelineState",
            Self::ComputePipelineState(_) => "ComputePipelineState",
            Self::RayTracingPipelineState(_) => "RayTracingPipelineState",
            Self::RayTracingGeometry(_) => "RayTracingGeometry",
            Self::RayTracingScene(_) => "RayTracingScene",
        }
    }
}

// Compile-time assertion: handles must cross to the submission thread.
const _: () = {
    fn _assert_send_sync<T: Send + Sync>() {}
    fn _check() {
        _assert_send_sync::<AnyResource>();
        _assert_send_sync::<RayTracingGeometryInstance>();
    }
};

#[cfg(test)]
mod tests {
    use super::*;

    fn vertex_buffer() -> Buffer {
        Buffer::new("vb", BufferDesc::new(1024, BufferUsage::VERTEX))
    }

    #[test]
    fn clone_retains_and_drop_releases() {
        let buf = vertex_buffer();
        assert_eq!(buf.ref_count(), 1);
        let copy = buf.clone();
        assert_eq!(buf.ref_count(), 2);
        assert!(copy.ptr_eq(&buf));
        assert_eq!(copy.id(), buf.id());
        drop(copy);
        assert_eq!(buf.ref_count(), 1);
    }

    #[test]
    fn distinct_objects_are_not_equal() {
        let a = vertex_buffer();
        let b = vertex_buffer();
        assert_ne!(a, b);
        assert_ne!(a.id(), b.id());
        assert_eq!(a.desc(), b.desc());
    }

    #[test]
    fn view_keeps_texture_alive() {
        let tex = Texture::new(
            "color",
            TextureDesc::texture_2d(Format::R8G8B8A8Unorm, 64, 64),
        );
        let rtv = RenderTargetView::new("color.rtv", TextureViewDesc::new(tex.clone()));
        assert_eq!(tex.ref_count(), 2);
        assert!(rtv.desc().texture.ptr_eq(&tex));
        drop(rtv);
        assert_eq!(tex.ref_count(), 1);
    }

    #[test]
    fn any_resource_forwards_identity() {
        let buf = vertex_buffer();
        let any = AnyResource::from(buf.clone());
        assert_eq!(any.id(), buf.id());
        assert_eq!(any.name(), "vb");
        assert_eq!(any.kind(), "Buffer");
        assert_eq!(any.ref_count(), 2);
        drop(any);
        assert_eq!(buf.ref_count(), 1);
    }

    #[test]
    fn usage_and_update_queries() {
        let buf = vertex_buffer();
        assert!(buf.supports(BufferUsage::VERTEX));
        assert!(!buf.supports(BufferUsage::INDEX));

        let geom = RayTracingGeometry::new(
            "blas",
            RayTracingGeometryDesc {
                vertex_count: 3,
                index_count: 0,
                allow_update: true,
            },
        );
        assert!(geom.allows_update());
        let scene = RayTracingScene::new("tlas", RayTracingSceneDesc::default());
        assert!(!scene.allows_update());
    }

    #[test]
    fn shader_stage_accessor() {
        let vs = Shader::new("vs", ShaderDesc::new(ShaderStage::Vertex));
        assert_eq!(vs.stage(), ShaderStage::Vertex);
        assert_eq!(vs.desc().entry_point, "main");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn ref_count_tracks_live_clones(clones in 0usize..32, dropped in 0usize..32) {
                let buf = vertex_buffer();
                let mut live: Vec<Buffer> = (0..clones).map(|_| buf.clone()).collect();
                prop_assert_eq!(buf.ref_count(), clones + 1);
                live.truncate(clones.saturating_sub(dropped));
                prop_assert_eq!(buf.ref_count(), live.len() + 1);
                prop_assert!(live.iter().all(|b| b.id() == buf.id() && b.ptr_eq(&buf)));
                let erased = AnyResource::from(buf.clone());
                prop_assert_eq!(erased.id(), buf.id());
                prop_assert_eq!(erased.ref_count(), live.len() + 2);
            }

            #[test]
            fn distinct_handles_get_increasing_ids(count in 1usize..64) {
                let ids: Vec<ResourceId> = (0..count).map(|_| vertex_buffer().id()).collect();
                prop_assert!(ids.windows(2).all(|w| w[0] < w[1]));
            }
        }
    }
}
