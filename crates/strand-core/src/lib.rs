//! Core types and traits for the Strand command recording core.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! vocabulary shared by every other Strand crate:
//!
//! - [`ResourceId`] and the reference-counted resource handles
//!   ([`Buffer`], [`Texture`], the view types, pipeline states and
//!   ray-tracing structures).
//! - Plain value types passed through commands ([`ClearColor`],
//!   [`ResourceState`], [`CopyBufferInfo`], ...).
//! - The [`CommandContext`] trait, the backend seam every recorded command
//!   is replayed against.
//!
//! # Reference counting
//!
//! Every handle is a thin wrapper over an `Arc`. Cloning a handle is a
//! *retain*; dropping it is a *release*. [`Buffer::ref_count`] and friends
//! expose the current strong count so callers can verify that recording
//! and resetting a command list leaves counts balanced.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod context;
pub mod id;
pub mod resource;
pub mod types;

pub use context::CommandContext;
pub use id::ResourceId;
pub use resource::{
    AnyResource, Buffer, BufferDesc, ComputePipelineState, ComputePipelineStateDesc,
    DepthStencilView, GraphicsPipelineState, GraphicsPipelineStateDesc, RayTracingGeometry,
    RayTracingGeometryDesc, RayTracingGeometryInstance, RayTracingPipelineState,
    RayTracingPipelineStateDesc, RayTracingScene, RayTracingSceneDesc, RenderTargetView,
    SamplerDesc, SamplerState, Shader, ShaderDesc, ShaderResourceView, ShaderViewDesc, Texture,
    TextureDesc, TextureDimension, TextureViewDesc, UnorderedAccessView, ViewResource,
};
pub use types::{
    BufferUsage, ClearColor, CopyBufferInfo, CopyTextureInfo, CopyTextureSubresource,
    DepthStencilClearValue, Format, IndexFormat, PrimitiveTopology, ResourceState,
    SamplerAddressMode, SamplerFilter, ShaderStage, ShadingRate,
};
