//! The replayable command set.

use smallvec::SmallVec;
use strand_arena::{Allocation, CommandAllocator};
use strand_core::{
    AnyResource, Buffer, ClearColor, CommandContext, ComputePipelineState, CopyBufferInfo,
    CopyTextureInfo, DepthStencilClearValue, DepthStencilView, GraphicsPipelineState,
    IndexFormat, PrimitiveTopology, RayTracingGeometry, RayTracingGeometryInstance,
    RayTracingPipelineState, RayTracingScene, RenderTargetView, ResourceState, SamplerState,
    Shader, ShaderResourceView, ShaderStage, ShadingRate, Texture, UnorderedAccessView,
};

/// Inline capacity for render-target arrays (the pipeline maximum).
pub const MAX_RENDER_TARGETS: usize = 8;

/// Owned array of captured handles. Small binds stay inline in the record.
pub type HandleArray<T> = SmallVec<[T; 4]>;

/// One recorded unit of GPU work.
///
/// Each variant mirrors exactly one [`CommandContext`] method. Fixed-size
/// arguments are stored by value; resource handles are owned clones;
/// variable-length payloads live in the owning list's
/// [`CommandAllocator`] and are referenced by [`Allocation`].
///
/// Dropping a command drops every handle it owns, so releasing captured
/// resources needs no per-kind bookkeeping.
#[derive(Debug)]
pub enum RenderCommand {
    /// Start a batch of work.
    Begin,
    /// Finish a batch of work.
    End,

    /// Clear a render target to a color.
    ClearRenderTargetView {
        /// Target view.
        view: RenderTargetView,
        /// Clear color.
        color: ClearColor,
    },
    /// Clear a depth-stencil view.
    ClearDepthStencilView {
        /// Target view.
        view: DepthStencilView,
        /// Depth and stencil values.
        value: DepthStencilClearValue,
    },
    /// Clear an unordered-access view with float values.
    ClearUnorderedAccessViewFloat {
        /// Target view.
        view: UnorderedAccessView,
        /// Clear values.
        color: ClearColor,
    },

    /// Set the coarse shading rate.
    SetShadingRate {
        /// Shading rate.
        rate: ShadingRate,
    },
    /// Set or clear the per-tile shading rate image.
    SetShadingRateImage {
        /// Rate image, or `None` to disable.
        image: Option<Texture>,
    },
    /// Open a render pass.
    BeginRenderPass,
    /// Close the current render pass.
    EndRenderPass,
    /// Bind one viewport.
    BindViewport {
        /// Viewport width.
        width: f32,
        /// Viewport height.
        height: f32,
        /// Minimum depth.
        min_depth: f32,
        /// Maximum depth.
        max_depth: f32,
        /// Left edge.
        x: f32,
        /// Top edge.
        y: f32,
    },
    /// Bind one scissor rectangle.
    BindScissorRect {
        /// Rectangle width.
        width: f32,
        /// Rectangle height.
        height: f32,
        /// Left edge.
        x: f32,
        /// Top edge.
        y: f32,
    },
    /// Set the constant blend factor.
    BindBlendFactor {
        /// Blend factor per channel.
        color: ClearColor,
    },
    /// Set how vertices assemble into primitives.
    BindPrimitiveTopology {
        /// Primitive topology.
        topology: PrimitiveTopology,
    },

    /// Bind color targets and an optional depth-stencil view.
    BindRenderTargets {
        /// Color targets, in slot order.
        render_targets: SmallVec<[RenderTargetView; MAX_RENDER_TARGETS]>,
        /// Depth-stencil view, if any.
        depth_stencil: Option<DepthStencilView>,
    },
    /// Bind vertex buffers to consecutive slots.
    BindVertexBuffers {
        /// Buffers, in slot order.
        buffers: HandleArray<Buffer>,
        /// First slot.
        start_slot: u32,
    },
    /// Bind or unbind the index buffer.
    BindIndexBuffer {
        /// The buffer.
        buffer: Option<Buffer>,
        /// Index format.
        format: IndexFormat,
    },
    /// Bind the scene used by ray dispatches.
    BindRayTracingScene {
        /// The scene.
        scene: RayTracingScene,
    },
    /// Bind a graphics pipeline.
    BindGraphicsPipelineState {
        /// The pipeline.
        pipeline: GraphicsPipelineState,
    },
    /// Bind a compute pipeline.
    BindComputePipelineState {
        /// The pipeline.
        pipeline: ComputePipelineState,
    },
    /// Bind a ray-tracing pipeline.
    BindRayTracingPipelineState {
        /// The pipeline.
        pipeline: RayTracingPipelineState,
    },

    /// Bind shader-resource views for one stage.
    BindShaderResourceViews {
        /// Shader stage.
        stage: ShaderStage,
        /// Views, in slot order.
        views: HandleArray<ShaderResourceView>,
        /// First slot.
        start_slot: u32,
    },
    /// Bind unordered-access views for one stage.
    BindUnorderedAccessViews {
        /// Shader stage.
        stage: ShaderStage,
        /// Views, in slot order.
        views: HandleArray<UnorderedAccessView>,
        /// First slot.
        start_slot: u32,
    },
    /// Bind constant buffers for one stage.
    BindConstantBuffers {
        /// Shader stage.
        stage: ShaderStage,
        /// Buffers, in slot order.
        buffers: HandleArray<Buffer>,
        /// First slot.
        start_slot: u32,
    },
    /// Bind samplers for one stage.
    BindSamplers {
        /// Shader stage.
        stage: ShaderStage,
        /// Samplers, in slot order.
        samplers: HandleArray<SamplerState>,
        /// First slot.
        start_slot: u32,
    },
    /// Set root constants for a shader.
    Set32BitShaderConstants {
        /// Target shader.
        shader: Shader,
        /// `u32` words in list payload memory.
        constants: Allocation,
    },

    /// Upload bytes into a buffer.
    UpdateBuffer {
        /// Destination.
        dst: Buffer,
        /// Byte offset into `dst`.
        offset: u64,
        /// Bytes in list payload memory.
        data: Allocation,
    },
    /// Upload texels into one mip of a 2D texture.
    UpdateTexture2D {
        /// Destination.
        dst: Texture,
        /// Region width in texels.
        width: u32,
        /// Region height in texels.
        height: u32,
        /// Target mip level.
        mip_level: u32,
        /// Bytes in list payload memory.
        data: Allocation,
    },
    /// Resolve a multisampled texture.
    ResolveTexture {
        /// Destination.
        dst: Texture,
        /// Source.
        src: Texture,
    },
    /// Copy a byte range between buffers.
    CopyBuffer {
        /// Destination.
        dst: Buffer,
        /// Source.
        src: Buffer,
        /// Ranges to copy.
        info: CopyBufferInfo,
    },
    /// Copy a whole texture.
    CopyTexture {
        /// Destination.
        dst: Texture,
        /// Source.
        src: Texture,
    },
    /// Copy a region between textures.
    CopyTextureRegion {
        /// Destination.
        dst: Texture,
        /// Source.
        src: Texture,
        /// Ranges to copy.
        info: CopyTextureInfo,
    },
    /// Destroy a resource on the command timeline.
    DestroyResource {
        /// The resource.
        resource: AnyResource,
    },
    /// Mark a resource's contents undefined.
    DiscardResource {
        /// The resource.
        resource: AnyResource,
    },
    /// Build or refit a bottom-level acceleration structure.
    BuildRayTracingGeometry {
        /// The geometry.
        geometry: RayTracingGeometry,
        /// Vertex source, if any.
        vertex_buffer: Option<Buffer>,
        /// Index source, if any.
        index_buffer: Option<Buffer>,
        /// Refit in place instead of rebuilding.
        update: bool,
    },
    /// Build or refit a top-level acceleration structure.
    BuildRayTracingScene {
        /// The scene.
        scene: RayTracingScene,
        /// Instances, each owning its geometry.
        instances: HandleArray<RayTracingGeometryInstance>,
        /// Refit in place instead of rebuilding.
        update: bool,
    },
    /// Generate the mip chain of a texture.
    GenerateMips {
        /// The texture.
        texture: Texture,
    },

    /// Transition a texture between states.
    TransitionTexture {
        /// The texture.
        texture: Texture,
        /// Current state.
        before: ResourceState,
        /// New state.
        after: ResourceState,
    },
    /// Transition a buffer between states.
    TransitionBuffer {
        /// The buffer.
        buffer: Buffer,
        /// Current state.
        before: ResourceState,
        /// New state.
        after: ResourceState,
    },
    /// Order unordered-access writes to a texture.
    UnorderedAccessTextureBarrier {
        /// The texture.
        texture: Texture,
    },
    /// Order unordered-access writes to a buffer.
    UnorderedAccessBufferBarrier {
        /// The buffer.
        buffer: Buffer,
    },

    /// Non-indexed draw.
    Draw {
        /// Vertices to draw.
        vertex_count: u32,
        /// First vertex.
        start_vertex: u32,
    },
    /// Indexed draw.
    DrawIndexed {
        /// Indices to draw.
        index_count: u32,
        /// First index.
        start_index: u32,
        /// Added to each index.
        base_vertex: i32,
    },
    /// Instanced non-indexed draw.
    DrawInstanced {
        /// Vertices per instance.
        vertex_count_per_instance: u32,
        /// Instances to draw.
        instance_count: u32,
        /// First vertex.
        start_vertex: u32,
        /// First instance.
        start_instance: u32,
    },
    /// Instanced indexed draw.
    DrawIndexedInstanced {
        /// Indices per instance.
        index_count_per_instance: u32,
        /// Instances to draw.
        instance_count: u32,
        /// First index.
        start_index: u32,
        /// Added to each index.
        base_vertex: i32,
        /// First instance.
        start_instance: u32,
    },
    /// Compute dispatch.
    Dispatch {
        /// Thread groups in x.
        groups_x: u32,
        /// Thread groups in y.
        groups_y: u32,
        /// Thread groups in z.
        groups_z: u32,
    },
    /// Ray-tracing dispatch.
    DispatchRays {
        /// Rays in x.
        width: u32,
        /// Rays in y.
        height: u32,
        /// Rays in z.
        depth: u32,
    },

    /// Insert a debug marker.
    InsertMarker {
        /// UTF-8 bytes in list payload memory.
        text: Allocation,
    },
    /// Break into an attached debugger.
    DebugBreak,
    /// Start an external frame capture.
    BeginExternalCapture,
    /// End an external frame capture.
    EndExternalCapture,

    /// Reset all bound context state.
    ClearState,
    /// Submit pending work and block until the GPU is idle.
    Flush,
}

impl RenderCommand {
    /// Replay this command against `ctx`.
    ///
    /// `payloads` must be the allocator of the list that recorded the
    /// command; variable-length arguments are read back from it.
    pub fn execute<C: CommandContext + ?Sized>(&self, ctx: &mut C, payloads: &CommandAllocator) {
        match self {
            Self::Begin => ctx.begin(),
            Self::End => ctx.end(),

            Self::ClearRenderTargetView { view, color } => {
                ctx.clear_render_target_view(view, *color)
            }
            Self::ClearDepthStencilView { view, value } => {
                ctx.clear_depth_stencil_view(view, *value)
            }
            Self::ClearUnorderedAccessViewFloat { view, color } => {
                ctx.clear_unordered_access_view_float(view, *color)
            }

            Self::SetShadingRate { rate } => ctx.set_shading_rate(*rate),
            Self::SetShadingRateImage { image } => ctx.set_shading_rate_image(image.as_ref()),
            Self::BeginRenderPass => ctx.begin_render_pass(),
            Self::EndRenderPass => ctx.end_render_pass(),
            Self::BindViewport {
                width,
                height,
                min_depth,
                max_depth,
                x,
                y,
            } => ctx.bind_viewport(*width, *height, *min_depth, *max_depth, *x, *y),
            Self::BindScissorRect {
                width,
                height,
                x,
                y,
            } => ctx.bind_scissor_rect(*width, *height, *x, *y),
            Self::BindBlendFactor { color } => ctx.bind_blend_factor(*color),
            Self::BindPrimitiveTopology { topology } => ctx.bind_primitive_topology(*topology),

            Self::BindRenderTargets {
                render_targets,
                depth_stencil,
            } => ctx.bind_render_targets(render_targets, depth_stencil.as_ref()),
            Self::BindVertexBuffers {
                buffers,
                start_slot,
            } => ctx.bind_vertex_buffers(buffers, *start_slot),
            Self::BindIndexBuffer { buffer, format } => {
                ctx.bind_index_buffer(buffer.as_ref(), *format)
            }
            Self::BindRayTracingScene { scene } => ctx.bind_ray_tracing_scene(scene),
            Self::BindGraphicsPipelineState { pipeline } => {
                ctx.bind_graphics_pipeline_state(pipeline)
            }
            Self::BindComputePipelineState { pipeline } => {
                ctx.bind_compute_pipeline_state(pipeline)
            }
            Self::BindRayTracingPipelineState { pipeline } => {
                ctx.bind_ray_tracing_pipeline_state(pipeline)
            }

            Self::BindShaderResourceViews {
                stage,
                views,
                start_slot,
            } => ctx.bind_shader_resource_views(*stage, views, *start_slot),
            Self::BindUnorderedAccessViews {
                stage,
                views,
                start_slot,
            } => ctx.bind_unordered_access_views(*stage, views, *start_slot),
            Self::BindConstantBuffers {
                stage,
                buffers,
                start_slot,
            } => ctx.bind_constant_buffers(*stage, buffers, *start_slot),
            Self::BindSamplers {
                stage,
                samplers,
                start_slot,
            } => ctx.bind_samplers(*stage, samplers, *start_slot),
            Self::Set32BitShaderConstants { shader, constants } => {
                ctx.set_32bit_shader_constants(shader, payloads.slice::<u32>(*constants))
            }

            Self::UpdateBuffer { dst, offset, data } => {
                ctx.update_buffer(dst, *offset, payloads.bytes(*data))
            }
            Self::UpdateTexture2D {
                dst,
                width,
                height,
                mip_level,
                data,
            } => ctx.update_texture_2d(dst, *width, *height, *mip_level, payloads.bytes(*data)),
            Self::ResolveTexture { dst, src } => ctx.resolve_texture(dst, src),
            Self::CopyBuffer { dst, src, info } => ctx.copy_buffer(dst, src, info),
            Self::CopyTexture { dst, src } => ctx.copy_texture(dst, src),
            Self::CopyTextureRegion { dst, src, info } => ctx.copy_texture_region(dst, src, info),
            Self::DestroyResource { resource } => ctx.destroy_resource(resource),
            Self::DiscardResource { resource } => ctx.discard_resource(resource),
            Self::BuildRayTracingGeometry {
                geometry,
                vertex_buffer,
                index_buffer,
                update,
            } => ctx.build_ray_tracing_geometry(
                geometry,
                vertex_buffer.as_ref(),
                index_buffer.as_ref(),
                *update,
            ),
            Self::BuildRayTracingScene {
                scene,
                instances,
                update,
            } => ctx.build_ray_tracing_scene(scene, instances, *update),
            Self::GenerateMips { texture } => ctx.generate_mips(texture),

            Self::TransitionTexture {
                texture,
                before,
                after,
            } => ctx.transition_texture(texture, *before, *after),
            Self::TransitionBuffer {
                buffer,
                before,
                after,
            } => ctx.transition_buffer(buffer, *before, *after),
            Self::UnorderedAccessTextureBarrier { texture } => {
                ctx.unordered_access_texture_barrier(texture)
            }
            Self::UnorderedAccessBufferBarrier { buffer } => {
                ctx.unordered_access_buffer_barrier(buffer)
            }

            Self::Draw {
                vertex_count,
                start_vertex,
            } => ctx.draw(*vertex_count, *start_vertex),
            Self::DrawIndexed {
                index_count,
                start_index,
                base_vertex,
            } => ctx.draw_indexed(*index_count, *start_index, *base_vertex),
            Self::DrawInstanced {
                vertex_count_per_instance,
                instance_count,
                start_vertex,
                start_instance,
            } => ctx.draw_instanced(
                *vertex_count_per_instance,
                *instance_count,
                *start_vertex,
                *start_instance,
            ),
            Self::DrawIndexedInstanced {
                index_count_per_instance,
                instance_count,
                start_index,
                base_vertex,
                start_instance,
            } => ctx.draw_indexed_instanced(
                *index_count_per_instance,
                *instance_count,
                *start_index,
                *base_vertex,
                *start_instance,
            ),
            Self::Dispatch {
                groups_x,
                groups_y,
                groups_z,
            } => ctx.dispatch(*groups_x, *groups_y, *groups_z),
            Self::DispatchRays {
                width,
                height,
                depth,
            } => ctx.dispatch_rays(*width, *height, *depth),

            Self::InsertMarker { text } => {
                ctx.insert_marker(&String::from_utf8_lossy(payloads.bytes(*text)))
            }
            Self::DebugBreak => ctx.debug_break(),
            Self::BeginExternalCapture => ctx.begin_external_capture(),
            Self::EndExternalCapture => ctx.end_external_capture(),

            Self::ClearState => ctx.clear_state(),
            Self::Flush => ctx.flush(),
        }
    }

    /// Name of the [`CommandContext`] method this command replays as.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Begin => "begin",
            Self::End => "end",
            Self::ClearRenderTargetView { .. } => "clear_render_target_view",
            Self::ClearDepthStencilView { .. } => "clear_depth_stencil_view",
            Self::ClearUnorderedAccessViewFloat { .. } => "clear_unordered_access_view_float",
            Self::SetShadingRate { .. } => "set_shading_rate",
            Self::SetShadingRateImage { .. } => "set_shading_rate_image",
            Self::BeginRenderPass => "begin_render_pass",
            Self::EndRenderPass => "end_render_pass",
            Self::BindViewport { .. } => "bind_viewport",
            Self::BindScissorRect { .. } => "bind_scissor_rect",
            Self::BindBlendFactor { .. } => "bind_blend_factor",
            Self::BindPrimitiveTopology { .. } => "bind_primitive_topology",
            Self::BindRenderTargets { .. } => "bind_render_targets",
            Self::BindVertexBuffers { .. } => "bind_vertex_buffers",
            Self::BindIndexBuffer { .. } => "bind_index_buffer",
            Self::BindRayTracingScene { .. } => "bind_ray_tracing_scene",
            Self::BindGraphicsPipelineState { .. } => "bind_graphics_pipeline_state",
            Self::BindComputePipelineState { .. } => "bind_compute_pipeline_state",
            Self::BindRayTracingPipelineState { .. } => "bind_ray_tracing_pipeline_state",
            Self::BindShaderResourceViews { .. } => "bind_shader_resource_views",
            Self::BindUnorderedAccessViews { .. } => "bind_unordered_access_views",
            Self::BindConstantBuffers { .. } => "bind_constant_buffers",
            Self::BindSamplers { .. } => "bind_samplers",
            Self::Set32BitShaderConstants { .. } => "set_32bit_shader_constants",
            Self::UpdateBuffer { .. } => "update_buffer",
            Self::UpdateTexture2D { .. } => "update_texture_2d",
            Self::ResolveTexture { .. } => "resolve_texture",
            Self::CopyBuffer { .. } => "copy_buffer",
            Self::CopyTexture { .. } => "copy_texture",
            Self::CopyTextureRegion { .. } => "copy_texture_region",
            Self::DestroyResource { .. } => "destroy_resource",
            Self::DiscardResource { .. } => "discard_resource",
            Self::BuildRayTracingGeometry { .. } => "build_ray_tracing_geometry",
            Self::BuildRayTracingScene { .. } => "build_ray_tracing_scene",
            Self::GenerateMips { .. } => "generate_mips",
            Self::TransitionTexture { .. } => "transition_texture",
            Self::TransitionBuffer { .. } => "transition_buffer",
            Self::UnorderedAccessTextureBarrier { .. } => "unordered_access_texture_barrier",
            Self::UnorderedAccessBufferBarrier { .. } => "unordered_access_buffer_barrier",
            Self::Draw { .. } => "draw",
            Self::DrawIndexed { .. } => "draw_indexed",
            Self::DrawInstanced { .. } => "draw_instanced",
            Self::DrawIndexedInstanced { .. } => "draw_indexed_instanced",
            Self::Dispatch { .. } => "dispatch",
            Self::DispatchRays { .. } => "dispatch_rays",
            Self::InsertMarker { .. } => "insert_marker",
            Self::DebugBreak => "debug_break",
            Self::BeginExternalCapture => "begin_external_capture",
            Self::EndExternalCapture => "end_external_capture",
            Self::ClearState => "clear_state",
            Self::Flush => "flush",
        }
    }

    /// Whether this is one of the draw commands.
    pub fn is_draw(&self) -> bool {
        matches!(
            self,
            Self::Draw { .. }
                | Self::DrawIndexed { .. }
                | Self::DrawInstanced { .. }
                | Self::DrawIndexedInstanced { .. }
        )
    }

    /// Whether this is a compute or ray dispatch.
    pub fn is_dispatch(&self) -> bool {
        matches!(self, Self::Dispatch { .. } | Self::DispatchRays { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strand_core::{BufferDesc, BufferUsage};
    use strand_test_utils::{ContextCall, RecordingContext};

    #[test]
    fn execute_forwards_arguments() {
        let payloads = CommandAllocator::default();
        let mut ctx = RecordingContext::new();
        RenderCommand::Dispatch {
            groups_x: 8,
            groups_y: 4,
            groups_z: 1,
        }
        .execute(&mut ctx, &payloads);
        assert_eq!(ctx.calls(), &[ContextCall::Dispatch(8, 4, 1)]);
    }

    #[test]
    fn payload_commands_read_from_allocator() {
        let mut payloads = CommandAllocator::default();
        let text = payloads.alloc_bytes(b"shadow pass").unwrap();
        let words = payloads.alloc_slice(&[7u32, 9]).unwrap();
        let shader = Shader::new("cs", strand_core::ShaderDesc::new(ShaderStage::Compute));

        let mut ctx = RecordingContext::new();
        RenderCommand::InsertMarker { text }.execute(&mut ctx, &payloads);
        RenderCommand::Set32BitShaderConstants {
            shader: shader.clone(),
            constants: words,
        }
        .execute(&mut ctx, &payloads);

        assert_eq!(
            ctx.calls(),
            &[
                ContextCall::InsertMarker("shadow pass".into()),
                ContextCall::Set32BitShaderConstants(shader.id(), vec![7, 9]),
            ]
        );
    }

    #[test]
    fn dropping_command_releases_every_element() {
        let a = Buffer::new("a", BufferDesc::new(64, BufferUsage::CONSTANT));
        let b = Buffer::new("b", BufferDesc::new(64, BufferUsage::CONSTANT));
        let cmd = RenderCommand::BindConstantBuffers {
            stage: ShaderStage::Pixel,
            buffers: [a.clone(), b.clone()].into_iter().collect(),
            start_slot: 0,
        };
        assert_eq!((a.ref_count(), b.ref_count()), (2, 2));
        drop(cmd);
        assert_eq!((a.ref_count(), b.ref_count()), (1, 1));
    }

    #[test]
    fn classification() {
        let draw = RenderCommand::Draw {
            vertex_count: 3,
            start_vertex: 0,
        };
        let rays = RenderCommand::DispatchRays {
            width: 1,
            height: 1,
            depth: 1,
        };
        assert!(draw.is_draw() && !draw.is_dispatch());
        assert!(rays.is_dispatch() && !rays.is_draw());
        assert!(!RenderCommand::Flush.is_draw());
        assert_eq!(draw.name(), "draw");
        assert_eq!(rays.name(), "dispatch_rays");
    }
}
