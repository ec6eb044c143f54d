//! Plain value types carried by recorded commands.
//!
//! Everything here is `Copy`. The `#[repr(C)]` types derive
//! [`bytemuck::Pod`] so they can be copied into arena memory as bytes.

use std::fmt;

use bitflags::bitflags;
use bytemuck::{Pod, Zeroable};

// ── Clear values ────────────────────────────────────────────────

/// RGBA clear color, one `f32` per channel.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct ClearColor {
    /// Red channel.
    pub r: f32,
    /// Green channel.
    pub g: f32,
    /// Blue channel.
    pub b: f32,
    /// Alpha channel.
    pub a: f32,
}

impl ClearColor {
    /// Opaque black.
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    /// Opaque white.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Construct from individual channels.
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// The channels as an `[r, g, b, a]` array.
    pub const fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<[f32; 4]> for ClearColor {
    fn from([r, g, b, a]: [f32; 4]) -> Self {
        Self::new(r, g, b, a)
    }
}

/// Depth and stencil values used to clear a depth-stencil view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DepthStencilClearValue {
    /// Depth clear value, normally in `[0, 1]`.
    pub depth: f32,
    /// Stencil clear value.
    pub stencil: u8,
}

impl DepthStencilClearValue {
    /// Construct a clear value.
    pub const fn new(depth: f32, stencil: u8) -> Self {
        Self { depth, stencil }
    }
}

impl Default for DepthStencilClearValue {
    fn default() -> Self {
        Self::new(1.0, 0)
    }
}

// ── Formats ─────────────────────────────────────────────────────

/// Texel and vertex element formats.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Format {
    /// No format; the view inherits the resource format.
    #[default]
    Unknown,
    /// 8-bit single channel, normalized.
    R8Unorm,
    /// 8-bit two channel, normalized.
    R8G8Unorm,
    /// 8-bit RGBA, normalized.
    R8G8B8A8Unorm,
    /// 8-bit BGRA, normalized.
    B8G8R8A8Unorm,
    /// 10-bit RGB with 2-bit alpha, normalized.
    R10G10B10A2Unorm,
    /// 16-bit float, single channel.
    R16Float,
    /// 16-bit float, two channel.
    R16G16Float,
    /// 16-bit float, RGBA.
    R16G16B16A16Float,
    /// 32-bit unsigned integer, single channel.
    R32Uint,
    /// 32-bit float, single channel.
    R32Float,
    /// 32-bit float, two channel.
    R32G32Float,
    /// 32-bit float, RGB.
    R32G32B32Float,
    /// 32-bit float, RGBA.
    R32G32B32A32Float,
    /// 32-bit float depth.
    D32Float,
    /// 24-bit depth with 8-bit stencil.
    D24UnormS8Uint,
}

impl Format {
    /// Size in bytes of one element of this format, or `0` for
    /// [`Format::Unknown`].
    pub const fn byte_stride(self) -> u32 {
        match self {
            Self::Unknown => 0,
            Self::R8Unorm => 1,
            Self::R8G8Unorm | Self::R16Float => 2,
            Self::R8G8B8A8Unorm
            | Self::B8G8R8A8Unorm
            | Self::R10G10B10A2Unorm
            | Self::R16G16Float
            | Self::R32Uint
            | Self::R32Float
            | Self::D32Float
            | Self::D24UnormS8Uint => 4,
            Self::R16G16B16A16Float | Self::R32G32Float => 8,
            Self::R32G32B32Float => 12,
            Self::R32G32B32A32Float => 16,
        }
    }

    /// Whether this is a depth or depth-stencil format.
    pub const fn is_depth(self) -> bool {
        matches!(self, Self::D32Float | Self::D24UnormS8Uint)
    }
}

/// Element width of an index buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IndexFormat {
    /// 16-bit indices.
    U16,
    /// 32-bit indices.
    U32,
}

impl IndexFormat {
    /// Size in bytes of one index.
    pub const fn byte_stride(self) -> u32 {
        match self {
            Self::U16 => 2,
            Self::U32 => 4,
        }
    }
}

/// Primitive assembly topology.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PrimitiveTopology {
    /// Not set.
    #[default]
    Undefined,
    /// Independent points.
    PointList,
    /// Independent line segments.
    LineList,
    /// Connected line strip.
    LineStrip,
    /// Independent triangles.
    TriangleList,
    /// Connected triangle strip.
    TriangleStrip,
}

// ── Resource states ─────────────────────────────────────────────

/// Usage state of a resource, as seen by a barrier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ResourceState {
    /// Common state, usable for presentation and implicit promotion.
    #[default]
    Common,
    /// Bound as a vertex or constant buffer.
    VertexAndConstantBuffer,
    /// Bound as an index buffer.
    IndexBuffer,
    /// Written as a render target.
    RenderTarget,
    /// Read or written through an unordered-access view.
    UnorderedAccess,
    /// Depth-stencil write.
    DepthWrite,
    /// Depth-stencil read only.
    DepthRead,
    /// Read by a non-pixel shader stage.
    NonPixelShaderResource,
    /// Read by the pixel shader stage.
    PixelShaderResource,
    /// Destination of a copy.
    CopyDest,
    /// Source of a copy.
    CopySource,
    /// Destination of a resolve.
    ResolveDest,
    /// Source of a resolve.
    ResolveSource,
    /// Ray-tracing acceleration structure.
    RayTracingAccelerationStructure,
    /// Variable-rate shading image.
    ShadingRateSource,
    /// Generic read of any kind.
    GenericRead,
    /// Ready for presentation.
    Present,
}

impl fmt::Display for ResourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// ── Shader stages ───────────────────────────────────────────────

/// Programmable pipeline stage a per-stage binding targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShaderStage {
    /// Vertex shader.
    Vertex,
    /// Hull (tessellation control) shader.
    Hull,
    /// Domain (tessellation evaluation) shader.
    Domain,
    /// Geometry shader.
    Geometry,
    /// Pixel shader.
    Pixel,
    /// Compute shader.
    Compute,
}

impl ShaderStage {
    /// Every stage, in pipeline order.
    pub const ALL: [ShaderStage; 6] = [
        Self::Vertex,
        Self::Hull,
        Self::Domain,
        Self::Geometry,
        Self::Pixel,
        Self::Compute,
    ];
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Vertex => "vertex",
            Self::Hull => "hull",
            Self::Domain => "domain",
            Self::Geometry => "geometry",
            Self::Pixel => "pixel",
            Self::Compute => "compute",
        };
        f.write_str(name)
    }
}

/// Coarse pixel shading rate for variable-rate shading.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ShadingRate {
    /// One shade per pixel.
    #[default]
    Rate1x1,
    /// One shade per 1x2 block.
    Rate1x2,
    /// One shade per 2x1 block.
    Rate2x1,
    /// One shade per 2x2 block.
    Rate2x2,
    /// One shade per 2x4 block.
    Rate2x4,
    /// One shade per 4x2 block.
    Rate4x2,
    /// One shade per 4x4 block.
    Rate4x4,
}

// ── Samplers ────────────────────────────────────────────────────

/// Texture filtering mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SamplerFilter {
    /// Nearest-texel sampling.
    Point,
    /// Linear interpolation.
    #[default]
    Linear,
    /// Anisotropic filtering.
    Anisotropic,
}

/// Addressing mode for coordinates outside `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SamplerAddressMode {
    /// Tile the texture.
    #[default]
    Wrap,
    /// Tile with every other repetition mirrored.
    Mirror,
    /// Clamp to the edge texel.
    Clamp,
    /// Use the border color.
    Border,
}

// ── Buffer usage ────────────────────────────────────────────────

bitflags! {
    /// Ways a buffer may be bound to the pipeline.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct BufferUsage: u32 {
        /// Bindable as a vertex buffer.
        const VERTEX = 1 << 0;
        /// Bindable as an index buffer.
        const INDEX = 1 << 1;
        /// Bindable as a constant buffer.
        const CONSTANT = 1 << 2;
        /// Readable through a shader-resource view.
        const SHADER_RESOURCE = 1 << 3;
        /// Writable through an unordered-access view.
        const UNORDERED_ACCESS = 1 << 4;
        /// Usable as a copy source.
        const COPY_SRC = 1 << 5;
        /// Usable as a copy destination.
        const COPY_DST = 1 << 6;
        /// CPU-updatable every frame.
        const DYNAMIC = 1 << 7;
    }
}

// ── Copy descriptions ───────────────────────────────────────────

/// Byte range for a buffer-to-buffer copy.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct CopyBufferInfo {
    /// Offset into the source buffer.
    pub src_offset: u64,
    /// Offset into the destination buffer.
    pub dst_offset: u64,
    /// Number of bytes to copy.
    pub size: u64,
}

impl CopyBufferInfo {
    /// Construct a copy description.
    pub const fn new(src_offset: u64, dst_offset: u64, size: u64) -> Self {
        Self {
            src_offset,
            dst_offset,
            size,
        }
    }
}

/// One end of a texture region copy.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct CopyTextureSubresource {
    /// Texel x offset.
    pub x: u32,
    /// Texel y offset.
    pub y: u32,
    /// Texel z offset (depth slice).
    pub z: u32,
    /// Mip level.
    pub mip_level: u32,
    /// Array slice.
    pub array_slice: u32,
}

/// Region for a texture-to-texture copy.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct CopyTextureInfo {
    /// Source subresource and offset.
    pub src: CopyTextureSubresource,
    /// Destination subresource and offset.
    pub dst: CopyTextureSubresource,
    /// Region width in texels.
    pub width: u32,
    /// Region height in texels.
    pub height: u32,
    /// Region depth in texels.
    pub depth: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_color_array_conversion() {
        let c = ClearColor::from([0.1, 0.2, 0.3, 0.4]);
        assert_eq!(c.to_array(), [0.1, 0.2, 0.3, 0.4]);
        assert_eq!(ClearColor::BLACK.a, 1.0);
    }

    #[test]
    fn clear_color_is_sixteen_pod_bytes() {
        let c = ClearColor::new(1.0, 0.0, 0.0, 1.0);
        let bytes: &[u8] = bytemuck::bytes_of(&c);
        assert_eq!(bytes.len(), 16);
        let back: ClearColor = bytemuck::pod_read_unaligned(bytes);
        assert_eq!(back, c);
    }

    #[test]
    fn format_strides() {
        assert_eq!(Format::Unknown.byte_stride(), 0);
        assert_eq!(Format::R8G8B8A8Unorm.byte_stride(), 4);
        assert_eq!(Format::R32G32B32Float.byte_stride(), 12);
        assert_eq!(Format::R32G32B32A32Float.byte_stride(), 16);
        assert!(Format::D32Float.is_depth());
        assert!(!Format::R32Float.is_depth());
        assert_eq!(IndexFormat::U16.byte_stride(), 2);
    }

    #[test]
    fn depth_stencil_default_is_far_plane() {
        let v = DepthStencilClearValue::default();
        assert_eq!(v.depth, 1.0);
        assert_eq!(v.stencil, 0);
    }

    #[test]
    fn shader_stage_display_and_order() {
        assert_eq!(ShaderStage::Pixel.to_string(), "pixel");
        let mut sorted = ShaderStage::ALL;
        sorted.sort();
        assert_eq!(sorted, ShaderStage::ALL);
    }

    #[test]
    fn buffer_usage_flags_combine() {
        let usage = BufferUsage::VERTEX | BufferUsage::COPY_DST;
        assert!(usage.contains(BufferUsage::VERTEX));
        assert!(!usage.contains(BufferUsage::INDEX));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn clear_color_survives_word_storage(bits in prop::array::uniform4(any::<u32>())) {
                // Any bit pattern, including NaN payloads, is stored exactly.
                let color = ClearColor::from(bits.map(f32::from_bits));
                let words: Vec<u32> = bytemuck::cast_slice(bytemuck::bytes_of(&color)).to_vec();
                prop_assert_eq!(words.as_slice(), &bits[..]);
                let back: ClearColor = bytemuck::pod_read_unaligned(bytemuck::cast_slice(&words));
                prop_assert_eq!(back.to_array().map(f32::to_bits), bits);
            }

            #[test]
            fn copy_buffer_info_is_three_words(
                src in any::<u64>(), dst in any::<u64>(), size in any::<u64>(),
            ) {
                let info = CopyBufferInfo::new(src, dst, size);
                let bytes = bytemuck::bytes_of(&info);
                prop_assert_eq!(bytes.len(), 24);
                let back: CopyBufferInfo = bytemuck::pod_read_unaligned(bytes);
                prop_assert_eq!(back, info);
            }
        }
    }
}
