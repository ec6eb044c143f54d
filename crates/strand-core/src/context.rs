//! The backend seam: [`CommandContext`].

use crate::resource::{
    AnyResource, Buffer, ComputePipelineState, DepthStencilView, GraphicsPipelineState,
    RayTracingGeometry, RayTracingGeometryInstance, RayTracingPipelineState, RayTracingScene,
    RenderTargetView, SamplerState, Shader, ShaderResourceView, Texture, UnorderedAccessView,
};
use crate::types::{
    ClearColor, CopyBufferInfo, CopyTextureInfo, DepthStencilClearValue, IndexFormat,
    PrimitiveTopology, ResourceState, ShaderStage, ShadingRate,
};

/// A backend command encoder.
///
/// Every recorded command replays as exactly one call on this trait, with
/// the arguments it was recorded with. Implementations translate the calls
/// into native API work (a D3D12 command list, a Vulkan command buffer, a
/// test recorder, ...).
///
/// Resource arguments are borrowed: the recorded command keeps ownership of
/// its captured handles, and an implementation that needs a resource to
/// outlive the call clones the handle itself.
///
/// # Contract
///
/// - Calls arrive in recording order, on the thread that owns the
///   executor. The trait therefore takes `&mut self` and never needs
///   interior locking.
/// - [`flush`](CommandContext::flush) blocks until all previously issued
///   GPU work has completed.
/// - Slices are never empty unless the corresponding list method was
///   called with an empty slice.
pub trait CommandContext {
    // ── Lifecycle ───────────────────────────────────────────────

    /// Start a batch of work.
    fn begin(&mut self);

    /// Finish the current batch of work.
    fn end(&mut self);

    // ── Clears ──────────────────────────────────────────────────

    /// Clear a render target to `color`.
    fn clear_render_target_view(&mut self, view: &RenderTargetView, color: ClearColor);

    /// Clear a depth-stencil view.
    fn clear_depth_stencil_view(&mut self, view: &DepthStencilView, value: DepthStencilClearValue);

    /// Clear an unordered-access view with float values.
    fn clear_unordered_access_view_float(&mut self, view: &UnorderedAccessView, color: ClearColor);

    // ── Render pass and fixed-function state ────────────────────

    /// Set the coarse shading rate.
    fn set_shading_rate(&mut self, rate: ShadingRate);

    /// Set or clear the shading-rate image.
    fn set_shading_rate_image(&mut self, image: Option<&Texture>);

    /// Open a render pass over the bound targets.
    fn begin_render_pass(&mut self);

    /// Close the current render pass.
    fn end_render_pass(&mut self);

    /// Set the viewport.
    fn bind_viewport(
        &mut self,
        width: f32,
        height: f32,
        min_depth: f32,
        max_depth: f32,
        x: f32,
        y: f32,
    );

    /// Set the scissor rectangle.
    fn bind_scissor_rect(&mut self, width: f32, height: f32, x: f32, y: f32);

    /// Set the blend factor.
    fn bind_blend_factor(&mut self, color: ClearColor);

    /// Set the primitive topology.
    fn bind_primitive_topology(&mut self, topology: PrimitiveTopology);

    // ── Pipeline binds ──────────────────────────────────────────

    /// Bind render targets and an optional depth-stencil view.
    fn bind_render_targets(
        &mut self,
        render_targets: &[RenderTargetView],
        depth_stencil: Option<&DepthStencilView>,
    );

    /// Bind vertex buffers starting at `start_slot`.
    fn bind_vertex_buffers(&mut self, buffers: &[Buffer], start_slot: u32);

    /// Bind or unbind the index buffer.
    fn bind_index_buffer(&mut self, buffer: Option<&Buffer>, format: IndexFormat);

    /// Bind the top-level acceleration structure for ray dispatch.
    fn bind_ray_tracing_scene(&mut self, scene: &RayTracingScene);

    /// Bind a graphics pipeline state.
    fn bind_graphics_pipeline_state(&mut self, pipeline: &GraphicsPipelineState);

    /// Bind a compute pipeline state.
    fn bind_compute_pipeline_state(&mut self, pipeline: &ComputePipelineState);

    /// Bind a ray-tracing pipeline state.
    fn bind_ray_tracing_pipeline_state(&mut self, pipeline: &RayTracingPipelineState);

    // ── Per-stage binds ─────────────────────────────────────────

    /// Bind shader-resource views to `stage`.
    fn bind_shader_resource_views(
        &mut self,
        stage: ShaderStage,
        views: &[ShaderResourceView],
        start_slot: u32,
    );

    /// Bind unordered-access views to `stage`.
    fn bind_unordered_access_views(
        &mut self,
        stage: ShaderStage,
        views: &[UnorderedAccessView],
        start_slot: u32,
    );

    /// Bind constant buffers to `stage`.
    fn bind_constant_buffers(&mut self, stage: ShaderStage, buffers: &[Buffer], start_slot: u32);

    /// Bind samplers to `stage`.
    fn bind_samplers(&mut self, stage: ShaderStage, samplers: &[SamplerState], start_slot: u32);

    /// Set root constants for `shader`.
    fn set_32bit_shader_constants(&mut self, shader: &Shader, constants: &[u32]);

    // ── Resource operations ─────────────────────────────────────

    /// Upload `data` into `dst` at byte `offset`.
    fn update_buffer(&mut self, dst: &Buffer, offset: u64, data: &[u8]);

    /// Upload `data` into one mip of a 2D texture.
    fn update_texture_2d(
        &mut self,
        dst: &Texture,
        width: u32,
        height: u32,
        mip_level: u32,
        data: &[u8],
    );

    /// Resolve a multisampled texture into `dst`.
    fn resolve_texture(&mut self, dst: &Texture, src: &Texture);

    /// Copy a byte range between buffers.
    fn copy_buffer(&mut self, dst: &Buffer, src: &Buffer, info: &CopyBufferInfo);

    /// Copy a whole texture.
    fn copy_texture(&mut self, dst: &Texture, src: &Texture);

    /// Copy a texture region.
    fn copy_texture_region(&mut self, dst: &Texture, src: &Texture, info: &CopyTextureInfo);

    /// Destroy a resource once the GPU is done with it.
    fn destroy_resource(&mut self, resource: &AnyResource);

    /// Mark a resource's contents as undefined.
    fn discard_resource(&mut self, resource: &AnyResource);

    /// Build or refit a bottom-level acceleration structure.
    fn build_ray_tracing_geometry(
        &mut self,
        geometry: &RayTracingGeometry,
        vertex_buffer: Option<&Buffer>,
        index_buffer: Option<&Buffer>,
        update: bool,
    );

    /// Build or refit a top-level acceleration structure.
    fn build_ray_tracing_scene(
        &mut self,
        scene: &RayTracingScene,
        instances: &[RayTracingGeometryInstance],
        update: bool,
    );

    /// Generate the mip chain of a texture.
    fn generate_mips(&mut self, texture: &Texture);

    // ── Barriers ────────────────────────────────────────────────

    /// Transition a texture between states.
    fn transition_texture(&mut self, texture: &Texture, before: ResourceState, after: ResourceState);

    /// Transition a buffer between states.
    fn transition_buffer(&mut self, buffer: &Buffer, before: ResourceState, after: ResourceState);

    /// Order unordered-access writes to a texture.
    fn unordered_access_texture_barrier(&mut self, texture: &Texture);

    /// Order unordered-access writes to a buffer.
    fn unordered_access_buffer_barrier(&mut self, buffer: &Buffer);

    // ── Work ────────────────────────────────────────────────────

    /// Non-indexed draw.
    fn draw(&mut self, vertex_count: u32, start_vertex: u32);

    /// Indexed draw.
    fn draw_indexed(&mut self, index_count: u32, start_index: u32, base_vertex: i32);

    /// Instanced non-indexed draw.
    fn draw_instanced(
        &mut self,
        vertex_count_per_instance: u32,
        instance_count: u32,
        start_vertex: u32,
        start_instance: u32,
    );

    /// Instanced indexed draw.
    fn draw_indexed_instanced(
        &mut self,
        index_count_per_instance: u32,
        instance_count: u32,
        start_index: u32,
        base_vertex: i32,
        start_instance: u32,
    );

    /// Compute dispatch in thread groups.
    fn dispatch(&mut self, groups_x: u32, groups_y: u32, groups_z: u32);

    /// Ray dispatch over a `width` x `height` x `depth` grid.
    fn dispatch_rays(&mut self, width: u32, height: u32, depth: u32);

    // ── Debugging ───────────────────────────────────────────────

    /// Insert a named marker into the GPU timeline.
    fn insert_marker(&mut self, _marker: &str) {}

    /// Break into an attached debugger.
    fn debug_break(&mut self) {}

    /// Start a capture in an attached graphics debugger.
    fn begin_external_capture(&mut self) {}

    /// Stop the capture started by
    /// [`begin_external_capture`](CommandContext::begin_external_capture).
    fn end_external_capture(&mut self) {}

    // ── State ───────────────────────────────────────────────────

    /// Reset all bound state to defaults.
    fn clear_state(&mut self);

    /// Submit pending work and block until the GPU has finished it.
    fn flush(&mut self);
}
