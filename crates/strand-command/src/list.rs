//! The recording API: [`CommandList`].

use std::thread::{self, ThreadId};

use strand_arena::{Allocation, ArenaConfig, ArenaError, CommandAllocator};
use strand_core::{
    AnyResource, Buffer, BufferUsage, ClearColor, ComputePipelineState, CopyBufferInfo,
    CopyTextureInfo, DepthStencilClearValue, DepthStencilView, GraphicsPipelineState,
    IndexFormat, PrimitiveTopology, RayTracingGeometry, RayTracingGeometryInstance,
    RayTracingPipelineState, RayTracingScene, RenderTargetView, ResourceState, SamplerState,
    Shader, ShaderResourceView, ShaderStage, ShadingRate, Texture, UnorderedAccessView,
};

use crate::command::{RenderCommand, MAX_RENDER_TARGETS};
use crate::stats::CommandListStats;

/// Recording state of a [`CommandList`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ListState {
    /// Not between `begin()` and `end()`. Commands may still be recorded.
    #[default]
    Idle,
    /// Between `begin()` and `end()`.
    Recording,
    /// Replayed by an executor; must be reset before recording again.
    Executed,
}

/// An ordered, replayable list of GPU commands.
///
/// Each recording method clones the handles it is given into a new
/// [`RenderCommand`], copies any variable-length payload into the list's
/// [`CommandAllocator`], and appends the command at the tail. Nothing
/// reaches a backend until the list is executed by a
/// [`CommandListExecutor`](crate::CommandListExecutor).
///
/// Lists are meant to be reused: [`reset`](Self::reset) keeps both the
/// record vector's capacity and the allocator's arenas.
///
/// # Thread affinity
///
/// The first command recorded after construction or [`reset`](Self::reset)
/// claims the list for the calling thread. Recording from any other thread
/// panics until the next reset. Executing and resetting are allowed from
/// any thread, so a finished list can be sent to a submission thread.
///
/// # Panics
///
/// Recording methods panic on contract violations: mismatched
/// `begin()`/`end()`, recording into an [`Executed`](ListState::Executed)
/// list, recording from a thread that does not own the list, binding a
/// buffer without the matching [`BufferUsage`], requesting an update of an
/// acceleration structure built without `allow_update`, or a payload that
/// exceeds the allocator's capacity.
pub struct CommandList {
    pub(crate) commands: Vec<RenderCommand>,
    pub(crate) allocator: CommandAllocator,
    pub(crate) state: ListState,
    stats: CommandListStats,
    owner: Option<ThreadId>,
}

// Compile-time assertion: lists move to the submission thread.
const _: () = {
    fn _assert_send<T: Send>() {}
    fn _check() {
        _assert_send::<CommandList>();
    }
};

impl CommandList {
    /// Create an empty list whose allocator uses `config`.
    pub fn new(config: &ArenaConfig) -> Result<Self, ArenaError> {
        Ok(Self::with_allocator(CommandAllocator::new(config)?))
    }

    /// Create an empty list around an existing allocator.
    pub fn with_allocator(mut allocator: CommandAllocator) -> Self {
        allocator.reset();
        Self {
            commands: Vec::new(),
            allocator,
            state: ListState::Idle,
            stats: CommandListStats::default(),
            owner: None,
        }
    }

    // ── Accessors ───────────────────────────────────────────────

    /// Recorded commands in recording order.
    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    /// Number of recorded commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether no commands are recorded.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Current recording state.
    pub fn state(&self) -> ListState {
        self.state
    }

    /// Whether the list is between `begin()` and `end()`.
    pub fn is_recording(&self) -> bool {
        self.state == ListState::Recording
    }

    /// Counters for the commands recorded since the last reset.
    pub fn stats(&self) -> CommandListStats {
        self.stats
    }

    /// Payload storage.
    pub fn allocator(&self) -> &CommandAllocator {
        &self.allocator
    }

    /// Thread that currently owns recording, if any.
    pub fn owner(&self) -> Option<ThreadId> {
        self.owner
    }

    // ── Internals ───────────────────────────────────────────────

    fn check_recordable(&mut self) {
        assert!(
            self.state != ListState::Executed,
            "command list was already executed; call reset() before recording into it again"
        );
        let current = thread::current().id();
        match self.owner {
            None => self.owner = Some(current),
            Some(owner) => assert!(
                owner == current,
                "command list is owned by thread {owner:?} and cannot be recorded from {current:?}"
            ),
        }
    }

    fn push(&mut self, command: RenderCommand) {
        self.check_recordable();
        self.stats.count(&command);
        self.commands.push(command);
    }

    fn payload_bytes(&mut self, data: &[u8]) -> Allocation {
        self.check_recordable();
        match self.allocator.alloc_bytes(data) {
            Ok(alloc) => alloc,
            Err(err) => panic!("command payload does not fit: {err}"),
        }
    }

    fn payload_words(&mut self, data: &[u32]) -> Allocation {
        self.check_recordable();
        match self.allocator.alloc_slice(data) {
            Ok(alloc) => alloc,
            Err(err) => panic!("command payload does not fit: {err}"),
        }
    }

    fn check_buffer_usage(buffer: &Buffer, usage: BufferUsage, bind: &str) {
        assert!(
            buffer.supports(usage),
            "{bind}: buffer '{}' was not created with {usage:?} usage",
            buffer.name()
        );
    }

    // ── Lifecycle ───────────────────────────────────────────────

    /// Start recording.
    ///
    /// # Panics
    ///
    /// Panics if the list is already recording.
    pub fn begin(&mut self) {
        assert!(
            self.state != ListState::Recording,
            "begin() called on a command list that is already recording"
        );
        self.push(RenderCommand::Begin);
        self.state = ListState::Recording;
    }

    /// Finish recording.
    ///
    /// # Panics
    ///
    /// Panics if the list is not recording.
    pub fn end(&mut self) {
        assert!(
            self.state == ListState::Recording,
            "end() called without a matching begin()"
        );
        self.push(RenderCommand::End);
        self.state = ListState::Idle;
    }

    /// Drop every command, rewind the allocator, zero the stats, return to
    /// [`ListState::Idle`] and release the owning thread.
    ///
    /// Commands are dropped in recording order, releasing each captured
    /// handle once. Idempotent.
    pub fn reset(&mut self) {
        self.commands.clear();
        self.allocator.reset();
        self.stats = CommandListStats::default();
        self.state = ListState::Idle;
        self.owner = None;
    }

    // ── Clears ──────────────────────────────────────────────────

    /// Clear a render target.
    pub fn clear_render_target_view(&mut self, view: &RenderTargetView, color: ClearColor) {
        self.push(RenderCommand::ClearRenderTargetView {
            view: view.clone(),
            color,
        });
    }

    /// Clear a depth-stencil view.
    pub fn clear_depth_stencil_view(
        &mut self,
        view: &DepthStencilView,
        value: DepthStencilClearValue,
    ) {
        self.push(RenderCommand::ClearDepthStencilView {
            view: view.clone(),
            value,
        });
    }

    /// Clear an unordered-access view with float values.
    pub fn clear_unordered_access_view_float(
        &mut self,
        view: &UnorderedAccessView,
        color: ClearColor,
    ) {
        self.push(RenderCommand::ClearUnorderedAccessViewFloat {
            view: view.clone(),
            color,
        });
    }

    // ── Render pass and fixed-function state ────────────────────

    /// Set the coarse shading rate.
    pub fn set_shading_rate(&mut self, rate: ShadingRate) {
        self.push(RenderCommand::SetShadingRate { rate });
    }

    /// Set or clear the shading-rate image.
    pub fn set_shading_rate_image(&mut self, image: Option<&Texture>) {
        self.push(RenderCommand::SetShadingRateImage {
            image: image.cloned(),
        });
    }

    /// Open a render pass.
    pub fn begin_render_pass(&mut self) {
        self.push(RenderCommand::BeginRenderPass);
    }

    /// Close the current render pass.
    pub fn end_render_pass(&mut self) {
        self.push(RenderCommand::EndRenderPass);
    }

    /// Set the viewport.
    pub fn bind_viewport(
        &mut self,
        width: f32,
        height: f32,
        min_depth: f32,
        max_depth: f32,
        x: f32,
        y: f32,
    ) {
        self.push(RenderCommand::BindViewport {
            width,
            height,
            min_depth,
            max_depth,
            x,
            y,
        });
    }

    /// Set the scissor rectangle.
    pub fn bind_scissor_rect(&mut self, width: f32, height: f32, x: f32, y: f32) {
        self.push(RenderCommand::BindScissorRect {
            width,
            height,
            x,
            y,
        });
    }

    /// Set the blend factor.
    pub fn bind_blend_factor(&mut self, color: ClearColor) {
        self.push(RenderCommand::BindBlendFactor { color });
    }

    /// Set the primitive topology.
    pub fn bind_primitive_topology(&mut self, topology: PrimitiveTopology) {
        self.push(RenderCommand::BindPrimitiveTopology { topology });
    }

    // ── Pipeline binds ──────────────────────────────────────────

    /// Bind render targets and an optional depth-stencil view.
    ///
    /// # Panics
    ///
    /// Panics if more than [`MAX_RENDER_TARGETS`] targets are given.
    pub fn bind_render_targets(
        &mut self,
        render_targets: &[RenderTargetView],
        depth_stencil: Option<&DepthStencilView>,
    ) {
        assert!(
            render_targets.len() <= MAX_RENDER_TARGETS,
            "bind_render_targets: {} targets exceeds the maximum of {MAX_RENDER_TARGETS}",
            render_targets.len()
        );
        self.push(RenderCommand::BindRenderTargets {
            render_targets: render_targets.iter().cloned().collect(),
            depth_stencil: depth_stencil.cloned(),
        });
    }

    /// Bind vertex buffers starting at `start_slot`.
    ///
    /// # Panics
    ///
    /// Panics if a buffer lacks [`BufferUsage::VERTEX`].
    pub fn bind_vertex_buffers(&mut self, buffers: &[Buffer], start_slot: u32) {
        for buffer in buffers {
            Self::check_buffer_usage(buffer, BufferUsage::VERTEX, "bind_vertex_buffers");
        }
        self.push(RenderCommand::BindVertexBuffers {
            buffers: buffers.iter().cloned().collect(),
            start_slot,
        });
    }

    /// Bind or unbind the index buffer.
    ///
    /// # Panics
    ///
    /// Panics if the buffer lacks [`BufferUsage::INDEX`].
    pub fn bind_index_buffer(&mut self, buffer: Option<&Buffer>, format: IndexFormat) {
        if let Some(buffer) = buffer {
            Self::check_buffer_usage(buffer, BufferUsage::INDEX, "bind_index_buffer");
        }
        self.push(RenderCommand::BindIndexBuffer {
            buffer: buffer.cloned(),
            format,
        });
    }

    /// Bind the top-level acceleration structure for ray dispatch.
    pub fn bind_ray_tracing_scene(&mut self, scene: &RayTracingScene) {
        self.push(RenderCommand::BindRayTracingScene {
            scene: scene.clone(),
        });
    }

    /// Bind a graphics pipeline state.
    pub fn bind_graphics_pipeline_state(&mut self, pipeline: &GraphicsPipelineState) {
        self.push(RenderCommand::BindGraphicsPipelineState {
            pipeline: pipeline.clone(),
        });
    }

    /// Bind a compute pipeline state.
    pub fn bind_compute_pipeline_state(&mut self, pipeline: &ComputePipelineState) {
        self.push(RenderCommand::BindComputePipelineState {
            pipeline: pipeline.clone(),
        });
    }

    /// Bind a ray-tracing pipeline state.
    pub fn bind_ray_tracing_pipeline_state(&mut self, pipeline: &RayTracingPipelineState) {
        self.push(RenderCommand::BindRayTracingPipelineState {
            pipeline: pipeline.clone(),
        });
    }

    // ── Per-stage binds ─────────────────────────────────────────

    /// Bind shader-resource views to `stage`.
    pub fn bind_shader_resource_views(
        &mut self,
        stage: ShaderStage,
        views: &[ShaderResourceView],
        start_slot: u32,
    ) {
        self.push(RenderCommand::BindShaderResourceViews {
            stage,
            views: views.iter().cloned().collect(),
            start_slot,
        });
    }

    /// Bind unordered-access views to `stage`.
    pub fn bind_unordered_access_views(
        &mut self,
        stage: ShaderStage,
        views: &[UnorderedAccessView],
        start_slot: u32,
    ) {
        self.push(RenderCommand::BindUnorderedAccessViews {
            stage,
            views: views.iter().cloned().collect(),
            start_slot,
        });
    }

    /// Bind constant buffers to `stage`.
    ///
    /// # Panics
    ///
    /// Panics if a buffer lacks [`BufferUsage::CONSTANT`].
    pub fn bind_constant_buffers(&mut self, stage: ShaderStage, buffers: &[Buffer], start_slot: u32) {
        for buffer in buffers {
            Self::check_buffer_usage(buffer, BufferUsage::CONSTANT, "bind_constant_buffers");
        }
        self.push(RenderCommand::BindConstantBuffers {
            stage,
            buffers: buffers.iter().cloned().collect(),
            start_slot,
        });
    }

    /// Bind samplers to `stage`.
    pub fn bind_samplers(&mut self, stage: ShaderStage, samplers: &[SamplerState], start_slot: u32) {
        self.push(RenderCommand::BindSamplers {
            stage,
            samplers: samplers.iter().cloned().collect(),
            start_slot,
        });
    }

    /// Set root constants for `shader`. The words are copied into the
    /// list's arena.
    pub fn set_32bit_shader_constants(&mut self, shader: &Shader, constants: &[u32]) {
        let constants = self.payload_words(constants);
        self.push(RenderCommand::Set32BitShaderConstants {
            shader: shader.clone(),
            constants,
        });
    }

    // ── Resource operations ─────────────────────────────────────

    /// Upload `data` into `dst` at byte `offset`. The bytes are copied into
    /// the list's arena, so `data` may be reused immediately.
    pub fn update_buffer(&mut self, dst: &Buffer, offset: u64, data: &[u8]) {
        let data = self.payload_bytes(data);
        self.push(RenderCommand::UpdateBuffer {
            dst: dst.clone(),
            offset,
            data,
        });
    }

    /// Upload `data` into one mip of a 2D texture. The bytes are copied
    /// into the list's arena.
    pub fn update_texture_2d(
        &mut self,
        dst: &Texture,
        width: u32,
        height: u32,
        mip_level: u32,
        data: &[u8],
    ) {
        let data = self.payload_bytes(data);
        self.push(RenderCommand::UpdateTexture2D {
            dst: dst.clone(),
            width,
            height,
            mip_level,
            data,
        });
    }

    /// Resolve a multisampled texture into `dst`.
    pub fn resolve_texture(&mut self, dst: &Texture, src: &Texture) {
        self.push(RenderCommand::ResolveTexture {
            dst: dst.clone(),
            src: src.clone(),
        });
    }

    /// Copy a byte range between buffers.
    pub fn copy_buffer(&mut self, dst: &Buffer, src: &Buffer, info: CopyBufferInfo) {
        self.push(RenderCommand::CopyBuffer {
            dst: dst.clone(),
            src: src.clone(),
            info,
        });
    }

    /// Copy a whole texture.
    pub fn copy_texture(&mut self, dst: &Texture, src: &Texture) {
        self.push(RenderCommand::CopyTexture {
            dst: dst.clone(),
            src: src.clone(),
        });
    }

    /// Copy a texture region.
    pub fn copy_texture_region(&mut self, dst: &Texture, src: &Texture, info: CopyTextureInfo) {
        self.push(RenderCommand::CopyTextureRegion {
            dst: dst.clone(),
            src: src.clone(),
            info,
        });
    }

    /// Destroy `resource` at this point of the command timeline.
    pub fn destroy_resource(&mut self, resource: &AnyResource) {
        self.push(RenderCommand::DestroyResource {
            resource: resource.clone(),
        });
    }

    /// Mark a resource's contents as undefined.
    pub fn discard_resource(&mut self, resource: &AnyResource) {
        self.push(RenderCommand::DiscardResource {
            resource: resource.clone(),
        });
    }

    /// Build, or refit when `update` is set, a bottom-level acceleration
    /// structure.
    ///
    /// # Panics
    ///
    /// Panics if `update` is set and `geometry` was created without
    /// `allow_update`.
    pub fn build_ray_tracing_geometry(
        &mut self,
        geometry: &RayTracingGeometry,
        vertex_buffer: Option<&Buffer>,
        index_buffer: Option<&Buffer>,
        update: bool,
    ) {
        assert!(
            !update || geometry.allows_update(),
            "build_ray_tracing_geometry: '{}' was not created with allow_update",
            geometry.name()
        );
        self.push(RenderCommand::BuildRayTracingGeometry {
            geometry: geometry.clone(),
            vertex_buffer: vertex_buffer.cloned(),
            index_buffer: index_buffer.cloned(),
            update,
        });
    }

    /// Build, or refit when `update` is set, a top-level acceleration
    /// structure from `instances`.
    ///
    /// # Panics
    ///
    /// Panics if `update` is set and `scene` was created without
    /// `allow_update`.
    pub fn build_ray_tracing_scene(
        &mut self,
        scene: &RayTracingScene,
        instances: &[RayTracingGeometryInstance],
        update: bool,
    ) {
        assert!(
            !update || scene.allows_update(),
            "build_ray_tracing_scene: '{}' was not created with allow_update",
            scene.name()
        );
        self.push(RenderCommand::BuildRayTracingScene {
            scene: scene.clone(),
            instances: instances.iter().cloned().collect(),
            update,
        });
    }

    /// Generate the mip chain of a texture.
    pub fn generate_mips(&mut self, texture: &Texture) {
        self.push(RenderCommand::GenerateMips {
            texture: texture.clone(),
        });
    }

    // ── Barriers ────────────────────────────────────────────────

    /// Transition a texture between states. A transition whose states are
    /// equal is skipped with a warning.
    pub fn transition_texture(
        &mut self,
        texture: &Texture,
        before: ResourceState,
        after: ResourceState,
    ) {
        if before == after {
            self.check_recordable();
            tracing::warn!(
                resource = texture.name(),
                state = %before,
                "redundant texture transition skipped"
            );
            return;
        }
        self.push(RenderCommand::TransitionTexture {
            texture: texture.clone(),
            before,
            after,
        });
    }

    /// Transition a buffer between states. A transition whose states are
    /// equal is skipped with a warning.
    pub fn transition_buffer(&mut self, buffer: &Buffer, before: ResourceState, after: ResourceState) {
        if before == after {
            self.check_recordable();
            tracing::warn!(
                resource = buffer.name(),
                state = %before,
                "redundant buffer transition skipped"
            );
            return;
        }
        self.push(RenderCommand::TransitionBuffer {
            buffer: buffer.clone(),
            before,
            after,
        });
    }

    /// Order unordered-access writes to a texture.
    pub fn unordered_access_texture_barrier(&mut self, texture: &Texture) {
        self.push(RenderCommand::UnorderedAccessTextureBarrier {
            texture: texture.clone(),
        });
    }

    /// Order unordered-access writes to a buffer.
    pub fn unordered_access_buffer_barrier(&mut self, buffer: &Buffer) {
        self.push(RenderCommand::UnorderedAccessBufferBarrier {
            buffer: buffer.clone(),
        });
    }

    // ── Work ────────────────────────────────────────────────────

    /// Non-indexed draw.
    pub fn draw(&mut self, vertex_count: u32, start_vertex: u32) {
        self.push(RenderCommand::Draw {
            vertex_count,
            start_vertex,
        });
    }

    /// Indexed draw.
    pub fn draw_indexed(&mut self, index_count: u32, start_index: u32, base_vertex: i32) {
        self.push(RenderCommand::DrawIndexed {
            index_count,
            start_index,
            base_vertex,
        });
    }

    /// Instanced non-indexed draw.
    pub fn draw_instanced(
        &mut self,
        vertex_count_per_instance: u32,
        instance_count: u32,
        start_vertex: u32,
        start_instance: u32,
    ) {
        self.push(RenderCommand::DrawInstanced {
            vertex_count_per_instance,
            instance_count,
            start_vertex,
            start_instance,
        });
    }

    /// Instanced indexed draw.
    pub fn draw_indexed_instanced(
        &mut self,
        index_count_per_instance: u32,
        instance_count: u32,
        start_index: u32,
        base_vertex: i32,
        start_instance: u32,
    ) {
        self.push(RenderCommand::DrawIndexedInstanced {
            index_count_per_instance,
            instance_count,
            start_index,
            base_vertex,
            start_instance,
        });
    }

    /// Compute dispatch in thread groups.
    pub fn dispatch(&mut self, groups_x: u32, groups_y: u32, groups_z: u32) {
        self.push(RenderCommand::Dispatch {
            groups_x,
            groups_y,
            groups_z,
        });
    }

    /// Ray dispatch. Counted as a dispatch in [`CommandListStats`].
    pub fn dispatch_rays(&mut self, width: u32, height: u32, depth: u32) {
        self.push(RenderCommand::DispatchRays {
            width,
            height,
            depth,
        });
    }

    // ── Debugging ───────────────────────────────────────────────

    /// Insert a named marker. The text is copied into the list's arena.
    pub fn insert_marker(&mut self, marker: &str) {
        let text = self.payload_bytes(marker.as_bytes());
        self.push(RenderCommand::InsertMarker { text });
    }

    /// Break into an attached debugger when replayed.
    pub fn debug_break(&mut self) {
        self.push(RenderCommand::DebugBreak);
    }

    /// Start a graphics-debugger capture when replayed.
    pub fn begin_external_capture(&mut self) {
        self.push(RenderCommand::BeginExternalCapture);
    }

    /// Stop a graphics-debugger capture when replayed.
    pub fn end_external_capture(&mut self) {
        self.push(RenderCommand::EndExternalCapture);
    }

    // ── State ───────────────────────────────────────────────────

    /// Reset all bound backend state to defaults.
    pub fn clear_state(&mut self) {
        self.push(RenderCommand::ClearState);
    }

    /// Submit and wait for all work issued so far, at this point of the
    /// timeline.
    pub fn flush(&mut self) {
        self.push(RenderCommand::Flush);
    }
}

impl Default for CommandList {
    fn default() -> Self {
        Self::with_allocator(CommandAllocator::default())
    }
}

impl std::fmt::Debug for CommandList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandList")
            .field("len", &self.commands.len())
            .field("state", &self.state)
            .field("stats", &self.stats)
            .field("arena_count", &self.allocator.arena_count())
            .finish()
    }
}
