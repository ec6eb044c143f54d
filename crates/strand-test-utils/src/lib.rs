//! Test utilities and mock contexts for Strand development.
//!
//! Provides [`RecordingContext`], a [`CommandContext`] that logs every call
//! it receives as a [`ContextCall`], and resource [`fixtures`].
//!
//! `ContextCall` carries [`ResourceId`]s, never handles, so replaying a
//! list into a `RecordingContext` does not change any reference count.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use strand_core::{
    AnyResource, Buffer, ClearColor, CommandContext, ComputePipelineState, CopyBufferInfo,
    CopyTextureInfo, DepthStencilClearValue, DepthStencilView, GraphicsPipelineState,
    IndexFormat, PrimitiveTopology, RayTracingGeometry, RayTracingGeometryInstance,
    RayTracingPipelineState, RayTracingScene, RenderTargetView, ResourceId, ResourceState,
    SamplerState, Shader, ShaderResourceView, ShaderStage, ShadingRate, Texture,
    UnorderedAccessView,
};

/// One call received by a [`RecordingContext`], with resources reduced to
/// their ids.
#[derive(Clone, Debug, PartialEq)]
pub enum ContextCall {
    Begin,
    End,
    ClearRenderTargetView(ResourceId, ClearColor),
    ClearDepthStencilView(ResourceId, DepthStencilClearValue),
    ClearUnorderedAccessViewFloat(ResourceId, ClearColor),
    SetShadingRate(ShadingRate),
    SetShadingRateImage(Option<ResourceId>),
    BeginRenderPass,
    EndRenderPass,
    /// `(width, height, min_depth, max_depth, x, y)`
    BindViewport(f32, f32, f32, f32, f32, f32),
    /// `(width, height, x, y)`
    BindScissorRect(f32, f32, f32, f32),
    BindBlendFactor(ClearColor),
    BindPrimitiveTopology(PrimitiveTopology),
    BindRenderTargets(Vec<ResourceId>, Option<ResourceId>),
    BindVertexBuffers(Vec<ResourceId>, u32),
    BindIndexBuffer(Option<ResourceId>, IndexFormat),
    BindRayTracingScene(ResourceId),
    BindGraphicsPipelineState(ResourceId),
    BindComputePipelineState(ResourceId),
    BindRayTracingPipelineState(ResourceId),
    BindShaderResourceViews(ShaderStage, Vec<ResourceId>, u32),
    BindUnorderedAccessViews(ShaderStage, Vec<ResourceId>, u32),
    BindConstantBuffers(ShaderStage, Vec<ResourceId>, u32),
    BindSamplers(ShaderStage, Vec<ResourceId>, u32),
    Set32BitShaderConstants(ResourceId, Vec<u32>),
    UpdateBuffer(ResourceId, u64, Vec<u8>),
    /// `(dst, width, height, mip_level, data)`
    UpdateTexture2D(ResourceId, u32, u32, u32, Vec<u8>),
    ResolveTexture(ResourceId, ResourceId),
    CopyBuffer(ResourceId, ResourceId, CopyBufferInfo),
    CopyTexture(ResourceId, ResourceId),
    CopyTextureRegion(ResourceId, ResourceId, CopyTextureInfo),
    DestroyResource(ResourceId),
    DiscardResource(ResourceId),
    /// `(geometry, vertex_buffer, index_buffer, update)`
    BuildRayTracingGeometry(ResourceId, Option<ResourceId>, Option<ResourceId>, bool),
    /// `(scene, instance geometries, update)`
    BuildRayTracingScene(ResourceId, Vec<ResourceId>, bool),
    GenerateMips(ResourceId),
    TransitionTexture(ResourceId, ResourceState, ResourceState),
    TransitionBuffer(ResourceId, ResourceState, ResourceState),
    UnorderedAccessTextureBarrier(ResourceId),
    UnorderedAccessBufferBarrier(ResourceId),
    Draw(u32, u32),
    DrawIndexed(u32, u32, i32),
    DrawInstanced(u32, u32, u32, u32),
    DrawIndexedInstanced(u32, u32, u32, i32, u32),
    Dispatch(u32, u32, u32),
    DispatchRays(u32, u32, u32),
    InsertMarker(String),
    DebugBreak,
    BeginExternalCapture,
    EndExternalCapture,
    ClearState,
    Flush,
}

fn ids<'a, T: 'a>(items: impl IntoIterator<Item = &'a T>, id: fn(&T) -> ResourceId) -> Vec<ResourceId> {
    items.into_iter().map(id).collect()
}

/// A [`CommandContext`] that records every call in order.
///
/// Inspect results with [`calls`](RecordingContext::calls); `flush` calls
/// are also counted so executor waits can be asserted on.
#[derive(Debug, Default)]
pub struct RecordingContext {
    calls: Vec<ContextCall>,
    flushes: usize,
    received: usize,
    discard: bool,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// A context that counts calls but keeps none, for long-running
    /// benchmarks.
    pub fn discarding() -> Self {
        Self {
            discard: true,
            ..Self::default()
        }
    }

    /// Total calls received, including drained or discarded ones.
    pub fn received(&self) -> usize {
        self.received
    }

    /// Calls received so far, in order.
    pub fn calls(&self) -> &[ContextCall] {
        &self.calls
    }

    /// Drain the recorded calls.
    pub fn take_calls(&mut self) -> Vec<ContextCall> {
        std::mem::take(&mut self.calls)
    }

    /// Number of `flush` calls received.
    pub fn flush_count(&self) -> usize {
        self.flushes
    }

    /// Ids passed to `destroy_resource`, in order.
    pub fn destroyed(&self) -> Vec<ResourceId> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                ContextCall::DestroyResource(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    fn push(&mut self, call: ContextCall) {
        self.received += 1;
        if !self.discard {
            self.calls.push(call);
        }
    }
}

impl CommandContext for RecordingContext {
    fn begin(&mut self) {
        self.push(ContextCall::Begin);
    }

    fn end(&mut self) {
        self.push(ContextCall::End);
    }

    fn clear_render_target_view(&mut self, view: &RenderTargetView, color: ClearColor) {
        self.push(ContextCall::ClearRenderTargetView(view.id(), color));
    }

    fn clear_depth_stencil_view(&mut self, view: &DepthStencilView, value: DepthStencilClearValue) {
        self.push(ContextCall::ClearDepthStencilView(view.id(), value));
    }

    fn clear_unordered_access_view_float(&mut self, view: &UnorderedAccessView, color: ClearColor) {
        self.push(ContextCall::ClearUnorderedAccessViewFloat(view.id(), color));
    }

    fn set_shading_rate(&mut self, rate: ShadingRate) {
        self.push(ContextCall::SetShadingRate(rate));
    }

    fn set_shading_rate_image(&mut self, image: Option<&Texture>) {
        self.push(ContextCall::SetShadingRateImage(image.map(Texture::id)));
    }

    fn begin_render_pass(&mut self) {
        self.push(ContextCall::BeginRenderPass);
    }

    fn end_render_pass(&mut self) {
        self.push(ContextCall::EndRenderPass);
    }

    fn bind_viewport(
        &mut self,
        width: f32,
        height: f32,
        min_depth: f32,
        max_depth: f32,
        x: f32,
        y: f32,
    ) {
        self.push(ContextCall::BindViewport(
            width, height, min_depth, max_depth, x, y,
        ));
    }

    fn bind_scissor_rect(&mut self, width: f32, height: f32, x: f32, y: f32) {
        self.push(ContextCall::BindScissorRect(width, height, x, y));
    }

    fn bind_blend_factor(&mut self, color: ClearColor) {
        self.push(ContextCall::BindBlendFactor(color));
    }

    fn bind_primitive_topology(&mut self, topology: PrimitiveTopology) {
        self.push(ContextCall::BindPrimitiveTopology(topology));
    }

    fn bind_render_targets(
        &mut self,
        render_targets: &[RenderTargetView],
        depth_stencil: Option<&DepthStencilView>,
    ) {
        self.push(ContextCall::BindRenderTargets(
            ids(render_targets, RenderTargetView::id),
            depth_stencil.map(DepthStencilView::id),
        ));
    }

    fn bind_vertex_buffers(&mut self, buffers: &[Buffer], start_slot: u32) {
        self.push(ContextCall::BindVertexBuffers(ids(buffers, Buffer::id), start_slot));
    }

    fn bind_index_buffer(&mut self, buffer: Option<&Buffer>, format: IndexFormat) {
        self.push(ContextCall::BindIndexBuffer(buffer.map(Buffer::id), format));
    }

    fn bind_ray_tracing_scene(&mut self, scene: &RayTracingScene) {
        self.push(ContextCall::BindRayTracingScene(scene.id()));
    }

    fn bind_graphics_pipeline_state(&mut self, pipeline: &GraphicsPipelineState) {
        self.push(ContextCall::BindGraphicsPipelineState(pipeline.id()));
    }

    fn bind_compute_pipeline_state(&mut self, pipeline: &ComputePipelineState) {
        self.push(ContextCall::BindComputePipelineState(pipeline.id()));
    }

    fn bind_ray_tracing_pipeline_state(&mut self, pipeline: &RayTracingPipelineState) {
        self.push(ContextCall::BindRayTracingPipelineState(pipeline.id()));
    }

    fn bind_shader_resource_views(
        &mut self,
        stage: ShaderStage,
        views: &[ShaderResourceView],
        start_slot: u32,
    ) {
        self.push(ContextCall::BindShaderResourceViews(
            stage,
            ids(views, ShaderResourceView::id),
            start_slot,
        ));
    }

    fn bind_unordered_access_views(
        &mut self,
        stage: ShaderStage,
        views: &[UnorderedAccessView],
        start_slot: u32,
    ) {
        self.push(ContextCall::BindUnorderedAccessViews(
            stage,
            ids(views, UnorderedAccessView::id),
            start_slot,
        ));
    }

    fn bind_constant_buffers(&mut self, stage: ShaderStage, buffers: &[Buffer], start_slot: u32) {
        self.push(ContextCall::BindConstantBuffers(
            stage,
            ids(buffers, Buffer::id),
            start_slot,
        ));
    }

    fn bind_samplers(&mut self, stage: ShaderStage, samplers: &[SamplerState], start_slot: u32) {
        self.push(ContextCall::BindSamplers(
            stage,
            ids(samplers, SamplerState::id),
            start_slot,
        ));
    }

    fn set_32bit_shader_constants(&mut self, shader: &Shader, constants: &[u32]) {
        self.push(ContextCall::Set32BitShaderConstants(
            shader.id(),
            constants.to_vec(),
        ));
    }

    fn update_buffer(&mut self, dst: &Buffer, offset: u64, data: &[u8]) {
        self.push(ContextCall::UpdateBuffer(dst.id(), offset, data.to_vec()));
    }

    fn update_texture_2d(
        &mut self,
        dst: &Texture,
        width: u32,
        height: u32,
        mip_level: u32,
        data: &[u8],
    ) {
        self.push(ContextCall::UpdateTexture2D(
            dst.id(),
            width,
            height,
            mip_level,
            data.to_vec(),
        ));
    }

    fn resolve_texture(&mut self, dst: &Texture, src: &Texture) {
        self.push(ContextCall::ResolveTexture(dst.id(), src.id()));
    }

    fn copy_buffer(&mut self, dst: &Buffer, src: &Buffer, info: &CopyBufferInfo) {
        self.push(ContextCall::CopyBuffer(dst.id(), src.id(), *info));
    }

    fn copy_texture(&mut self, dst: &Texture, src: &Texture) {
        self.push(ContextCall::CopyTexture(dst.id(), src.id()));
    }

    fn copy_texture_region(&mut self, dst: &Texture, src: &Texture, info: &CopyTextureInfo) {
        self.push(ContextCall::CopyTextureRegion(dst.id(), src.id(), *info));
    }

    fn destroy_resource(&mut self, resource: &AnyResource) {
        self.push(ContextCall::DestroyResource(resource.id()));
    }

    fn discard_resource(&mut self, resource: &AnyResource) {
        self.push(ContextCall::DiscardResource(resource.id()));
    }

    fn build_ray_tracing_geometry(
        &mut self,
        geometry: &RayTracingGeometry,
        vertex_buffer: Option<&Buffer>,
        index_buffer: Option<&Buffer>,
        update: bool,
    ) {
        self.push(ContextCall::BuildRayTracingGeometry(
            geometry.id(),
            vertex_buffer.map(Buffer::id),
            index_buffer.map(Buffer::id),
            update,
        ));
    }

    fn build_ray_tracing_scene(
        &mut self,
        scene: &RayTracingScene,
        instances: &[RayTracingGeometryInstance],
        update: bool,
    ) {
        self.push(ContextCall::BuildRayTracingScene(
            scene.id(),
            instances.iter().map(|i| i.geometry.id()).collect(),
            update,
        ));
    }

    fn generate_mips(&mut self, texture: &Texture) {
        self.push(ContextCall::GenerateMips(texture.id()));
    }

    fn transition_texture(&mut self, texture: &Texture, before: ResourceState, after: ResourceState) {
        self.push(ContextCall::TransitionTexture(texture.id(), before, after));
    }

    fn transition_buffer(&mut self, buffer: &Buffer, before: ResourceState, after: ResourceState) {
        self.push(ContextCall::TransitionBuffer(buffer.id(), before, after));
    }

    fn unordered_access_texture_barrier(&mut self, texture: &Texture) {
        self.push(ContextCall::UnorderedAccessTextureBarrier(texture.id()));
    }

    fn unordered_access_buffer_barrier(&mut self, buffer: &Buffer) {
        self.push(ContextCall::UnorderedAccessBufferBarrier(buffer.id()));
    }

    fn draw(&mut self, vertex_count: u32, start_vertex: u32) {
        self.push(ContextCall::Draw(vertex_count, start_vertex));
    }

    fn draw_indexed(&mut self, index_count: u32, start_index: u32, base_vertex: i32) {
        self.push(ContextCall::DrawIndexed(index_count, start_index, base_vertex));
    }

    fn draw_instanced(
        &mut self,
        vertex_count_per_instance: u32,
        instance_count: u32,
        start_vertex: u32,
        start_instance: u32,
    ) {
        self.push(ContextCall::DrawInstanced(
            vertex_count_per_instance,
            instance_count,
            start_vertex,
            start_instance,
        ));
    }

    fn draw_indexed_instanced(
        &mut self,
        index_count_per_instance: u32,
        instance_count: u32,
        start_index: u32,
        base_vertex: i32,
        start_instance: u32,
    ) {
        self.push(ContextCall::DrawIndexedInstanced(
            index_count_per_instance,
            instance_count,
            start_index,
            base_vertex,
            start_instance,
        ));
    }

    fn dispatch(&mut self, groups_x: u32, groups_y: u32, groups_z: u32) {
        self.push(ContextCall::Dispatch(groups_x, groups_y, groups_z));
    }

    fn dispatch_rays(&mut self, width: u32, height: u32, depth: u32) {
        self.push(ContextCall::DispatchRays(width, height, depth));
    }

    fn insert_marker(&mut self, marker: &str) {
        self.push(ContextCall::InsertMarker(marker.to_owned()));
    }

    fn debug_break(&mut self) {
        self.push(ContextCall::DebugBreak);
    }

    fn begin_external_capture(&mut self) {
        self.push(ContextCall::BeginExternalCapture);
    }

    fn end_external_capture(&mut self) {
        self.push(ContextCall::EndExternalCapture);
    }

    fn clear_state(&mut self) {
        self.push(ContextCall::ClearState);
    }

    fn flush(&mut self) {
        self.flushes += 1;
        self.push(ContextCall::Flush);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_in_order() {
        let mut ctx = RecordingContext::new();
        ctx.draw(3, 0);
        ctx.flush();
        assert_eq!(ctx.calls(), &[ContextCall::Draw(3, 0), ContextCall::Flush]);
        assert_eq!(ctx.flush_count(), 1);
    }

    #[test]
    fn discarding_counts_without_storing() {
        let mut ctx = RecordingContext::discarding();
        ctx.dispatch(1, 1, 1);
        ctx.flush();
        assert!(ctx.calls().is_empty());
        assert_eq!(ctx.received(), 2);
        assert_eq!(ctx.flush_count(), 1);
    }
}
