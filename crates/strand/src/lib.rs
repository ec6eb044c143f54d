//! Strand: arena-backed deferred GPU command recording and replay.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Strand sub-crates.
//!
//! # Quick start
//!
//! ```rust
//! use strand::prelude::*;
//!
//! let vb = Buffer::new("quad", BufferDesc::new(1024, BufferUsage::VERTEX).with_stride(16));
//! let color = Texture::new("color", TextureDesc::texture_2d(Format::R8G8B8A8Unorm, 64, 64));
//! let rtv = RenderTargetView::new("color.rtv", TextureViewDesc::new(color.clone()));
//!
//! let mut list = CommandList::default();
//! list.begin();
//! list.clear_render_target_view(&rtv, ClearColor::BLACK);
//! list.bind_render_targets(&[rtv.clone()], None);
//! list.bind_vertex_buffers(&[vb.clone()], 0);
//! list.draw(6, 0);
//! list.end();
//!
//! // begin and end are recorded too.
//! assert_eq!(list.len(), 6);
//! assert_eq!(list.stats().num_draw_calls, 1);
//! // The list retains what it recorded until reset.
//! assert_eq!(vb.ref_count(), 2);
//! list.reset();
//! assert_eq!(vb.ref_count(), 1);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `strand-core` | Resource handles, value types, [`types::CommandContext`] |
//! | [`arena`] | `strand-arena` | Payload arenas and [`arena::CommandAllocator`] |
//! | [`command`] | `strand-command` | Command lists, commands and the executor |
//! | [`engine`] | `strand-engine` | Submission thread and deferred deletion |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Resource handles, value types and the backend context trait
/// (`strand-core`).
pub use strand_core as types;

/// Payload arenas (`strand-arena`).
///
/// Most users never touch this directly; every
/// [`command::CommandList`] owns a [`arena::CommandAllocator`].
pub use strand_arena as arena;

/// Command recording and replay (`strand-command`).
pub use strand_command as command;

/// Submission thread and deferred deletion (`strand-engine`).
pub use strand_engine as engine;

/// Common imports for typical Strand usage.
///
/// ```rust
/// use strand::prelude::*;
/// ```
pub mod prelude {
    // Handles
    pub use strand_core::{
        AnyResource, Buffer, BufferDesc, ComputePipelineState, DepthStencilView,
        GraphicsPipelineState, RayTracingGeometry, RayTracingGeometryInstance,
        RayTracingPipelineState, RayTracingScene, RenderTargetView, SamplerState, Shader,
        ShaderResourceView, Texture, TextureDesc, TextureViewDesc, UnorderedAccessView,
    };

    // Values
    pub use strand_core::{
        BufferUsage, ClearColor, CopyBufferInfo, CopyTextureInfo, DepthStencilClearValue, Format,
        IndexFormat, PrimitiveTopology, ResourceState, ShaderStage, ShadingRate,
    };

    // Backend seam
    pub use strand_core::CommandContext;

    // Recording and replay
    pub use strand_arena::ArenaConfig;
    pub use strand_command::{CommandList, CommandListExecutor, ExecuteError, ListState};

    // Engine
    pub use strand_engine::{DeletionQueue, EngineConfig, SubmissionThread, SubmitError};
}
