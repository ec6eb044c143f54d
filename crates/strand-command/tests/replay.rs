//! Replay tests: recorded operations reach the context in recording order
//! with the arguments they were recorded with.

use strand_arena::ArenaConfig;
use strand_command::{CommandList, CommandListExecutor, ListState};
use strand_core::{
    AnyResource, ClearColor, CopyBufferInfo, CopyTextureInfo, DepthStencilClearValue,
    IndexFormat, PrimitiveTopology, ResourceState, ShaderStage, ShadingRate,
};
use strand_test_utils::fixtures::{self, ResourceSet};
use strand_test_utils::{ContextCall, RecordingContext};

#[test]
fn clear_viewport_draw_scenario() {
    let (_color, rtv) = fixtures::render_target("backbuffer", 1920, 1080);
    let color = ClearColor::new(0.1, 0.2, 0.3, 1.0);

    let mut list = CommandList::default();
    list.begin();
    list.clear_render_target_view(&rtv, color);
    list.bind_viewport(1920.0, 1080.0, 0.0, 1.0, 0.0, 0.0);
    list.draw_indexed_instanced(36, 1, 0, 0, 0);
    list.end();

    let mut executor = CommandListExecutor::with_context(RecordingContext::new());
    executor.execute_command_list(&mut list).unwrap();

    assert_eq!(
        executor.context().unwrap().calls(),
        &[
            ContextCall::Begin,
            ContextCall::ClearRenderTargetView(rtv.id(), color),
            ContextCall::BindViewport(1920.0, 1080.0, 0.0, 1.0, 0.0, 0.0),
            ContextCall::DrawIndexedInstanced(36, 1, 0, 0, 0),
            ContextCall::End,
        ]
    );
}

/// Record one of every operation.
fn record_all(list: &mut CommandList, set: &ResourceSet) {
    list.begin();
    list.clear_render_target_view(&set.rtv, ClearColor::BLACK);
    list.clear_depth_stencil_view(&set.dsv, DepthStencilClearValue::default());
    list.clear_unordered_access_view_float(&set.uav, ClearColor::TRANSPARENT);
    list.set_shading_rate(ShadingRate::Rate2x2);
    list.set_shading_rate_image(Some(&set.color));
    list.begin_render_pass();
    list.bind_viewport(64.0, 64.0, 0.0, 1.0, 0.0, 0.0);
    list.bind_scissor_rect(64.0, 64.0, 0.0, 0.0);
    list.bind_blend_factor(ClearColor::WHITE);
    list.bind_primitive_topology(PrimitiveTopology::TriangleList);
    list.bind_render_targets(std::slice::from_ref(&set.rtv), Some(&set.dsv));
    list.bind_vertex_buffers(std::slice::from_ref(&set.vertex_buffer), 0);
    list.bind_index_buffer(Some(&set.index_buffer), IndexFormat::U32);
    list.bind_graphics_pipeline_state(&set.graphics_pipeline);
    list.bind_shader_resource_views(ShaderStage::Pixel, std::slice::from_ref(&set.srv), 0);
    list.bind_unordered_access_views(ShaderStage::Pixel, std::slice::from_ref(&set.uav), 1);
    list.bind_constant_buffers(ShaderStage::Vertex, std::slice::from_ref(&set.constant_buffer), 2);
    list.bind_samplers(ShaderStage::Pixel, std::slice::from_ref(&set.sampler), 0);
    list.set_32bit_shader_constants(&set.shader, &[1, 2, 3]);
    list.draw(3, 0);
    list.draw_indexed(6, 0, -2);
    list.draw_instanced(3, 4, 0, 1);
    list.draw_indexed_instanced(36, 2, 0, 0, 0);
    list.end_render_pass();
    list.update_buffer(&set.staging, 16, b"payload");
    list.update_texture_2d(&set.color, 2, 1, 0, &[9; 8]);
    list.resolve_texture(&set.resolve, &set.color);
    list.copy_buffer(&set.vertex_buffer, &set.staging, CopyBufferInfo::new(0, 16, 7));
    list.copy_texture(&set.resolve, &set.color);
    list.copy_texture_region(&set.resolve, &set.color, CopyTextureInfo::default());
    list.generate_mips(&set.color);
    list.transition_texture(&set.color, ResourceState::RenderTarget, ResourceState::PixelShaderResource);
    list.transition_buffer(&set.staging, ResourceState::CopyDest, ResourceState::CopySource);
    list.unordered_access_texture_barrier(&set.color);
    list.unordered_access_buffer_barrier(&set.staging);
    list.bind_compute_pipeline_state(&set.compute_pipeline);
    list.dispatch(8, 8, 1);
    list.build_ray_tracing_geometry(&set.blas, Some(&set.vertex_buffer), Some(&set.index_buffer), true);
    list.build_ray_tracing_scene(&set.tlas, &[set.instance()], true);
    list.bind_ray_tracing_scene(&set.tlas);
    list.bind_ray_tracing_pipeline_state(&set.ray_tracing_pipeline);
    list.dispatch_rays(64, 64, 1);
    list.discard_resource(&AnyResource::from(set.resolve.clone()));
    list.insert_marker("frame end");
    list.debug_break();
    list.end();
    list.begin_external_capture();
    list.end_external_capture();
    list.clear_state();
    list.destroy_resource(&AnyResource::from(set.staging.clone()));
    list.flush();
}

#[test]
fn every_operation_replays_one_to_one() {
    let set = ResourceSet::new();
    let mut list = CommandList::default();
    record_all(&mut list, &set);

    let mut executor = CommandListExecutor::with_context(RecordingContext::new());
    executor.execute_command_list(&mut list).unwrap();
    let calls = executor.context().unwrap().calls().to_vec();

    let expected = vec![
        ContextCall::Begin,
        ContextCall::ClearRenderTargetView(set.rtv.id(), ClearColor::BLACK),
        ContextCall::ClearDepthStencilView(set.dsv.id(), DepthStencilClearValue::default()),
        ContextCall::ClearUnorderedAccessViewFloat(set.uav.id(), ClearColor::TRANSPARENT),
        ContextCall::SetShadingRate(ShadingRate::Rate2x2),
        ContextCall::SetShadingRateImage(Some(set.color.id())),
        ContextCall::BeginRenderPass,
        ContextCall::BindViewport(64.0, 64.0, 0.0, 1.0, 0.0, 0.0),
        ContextCall::BindScissorRect(64.0, 64.0, 0.0, 0.0),
        ContextCall::BindBlendFactor(ClearColor::WHITE),
        ContextCall::BindPrimitiveTopology(PrimitiveTopology::TriangleList),
        ContextCall::BindRenderTargets(vec![set.rtv.id()], Some(set.dsv.id())),
        ContextCall::BindVertexBuffers(vec![set.vertex_buffer.id()], 0),
        ContextCall::BindIndexBuffer(Some(set.index_buffer.id()), IndexFormat::U32),
        ContextCall::BindGraphicsPipelineState(set.graphics_pipeline.id()),
        ContextCall::BindShaderResourceViews(ShaderStage::Pixel, vec![set.srv.id()], 0),
        ContextCall::BindUnorderedAccessViews(ShaderStage::Pixel, vec![set.uav.id()], 1),
        ContextCall::BindConstantBuffers(ShaderStage::Vertex, vec![set.constant_buffer.id()], 2),
        ContextCall::BindSamplers(ShaderStage::Pixel, vec![set.sampler.id()], 0),
        ContextCall::Set32BitShaderConstants(set.shader.id(), vec![1, 2, 3]),
        ContextCall::Draw(3, 0),
        ContextCall::DrawIndexed(6, 0, -2),
        ContextCall::DrawInstanced(3, 4, 0, 1),
        ContextCall::DrawIndexedInstanced(36, 2, 0, 0, 0),
        ContextCall::EndRenderPass,
        ContextCall::UpdateBuffer(set.staging.id(), 16, b"payload".to_vec()),
        ContextCall::UpdateTexture2D(set.color.id(), 2, 1, 0, vec![9; 8]),
        ContextCall::ResolveTexture(set.resolve.id(), set.color.id()),
        ContextCall::CopyBuffer(set.vertex_buffer.id(), set.staging.id(), CopyBufferInfo::new(0, 16, 7)),
        ContextCall::CopyTexture(set.resolve.id(), set.color.id()),
        ContextCall::CopyTextureRegion(set.resolve.id(), set.color.id(), CopyTextureInfo::default()),
        ContextCall::GenerateMips(set.color.id()),
        ContextCall::TransitionTexture(
            set.color.id(),
            ResourceState::RenderTarget,
            ResourceState::PixelShaderResource,
        ),
        ContextCall::TransitionBuffer(set.staging.id(), ResourceState::CopyDest, ResourceState::CopySource),
        ContextCall::UnorderedAccessTextureBarrier(set.color.id()),
        ContextCall::UnorderedAccessBufferBarrier(set.staging.id()),
        ContextCall::BindComputePipelineState(set.compute_pipeline.id()),
        ContextCall::Dispatch(8, 8, 1),
        ContextCall::BuildRayTracingGeometry(
            set.blas.id(),
            Some(set.vertex_buffer.id()),
            Some(set.index_buffer.id()),
            true,
        ),
        ContextCall::BuildRayTracingScene(set.tlas.id(), vec![set.blas.id()], true),
        ContextCall::BindRayTracingScene(set.tlas.id()),
        ContextCall::BindRayTracingPipelineState(set.ray_tracing_pipeline.id()),
        ContextCall::DispatchRays(64, 64, 1),
        ContextCall::DiscardResource(set.resolve.id()),
        ContextCall::InsertMarker("frame end".to_owned()),
        ContextCall::DebugBreak,
        ContextCall::End,
        ContextCall::BeginExternalCapture,
        ContextCall::EndExternalCapture,
        ContextCall::ClearState,
        ContextCall::DestroyResource(set.staging.id()),
        ContextCall::Flush,
    ];
    assert_eq!(calls, expected);
    assert_eq!(list.len(), expected.len());

    let stats = list.stats();
    assert_eq!(stats.num_commands as usize, expected.len());
    assert_eq!(stats.num_draw_calls, 4);
    assert_eq!(stats.num_dispatch_calls, 2);
}

#[test]
fn lists_replay_in_execution_order() {
    let mut first = CommandList::default();
    first.insert_marker("first");
    let mut second = CommandList::default();
    second.insert_marker("second");

    let mut executor = CommandListExecutor::with_context(RecordingContext::new());
    executor.execute_command_list(&mut second).unwrap();
    executor.execute_command_list(&mut first).unwrap();

    assert_eq!(
        executor.context().unwrap().calls(),
        &[
            ContextCall::InsertMarker("second".into()),
            ContextCall::InsertMarker("first".into()),
        ]
    );
}

#[test]
fn large_payloads_survive_arena_growth() {
    let config = ArenaConfig {
        block_size: 256,
        max_arenas: 64,
    };
    let mut list = CommandList::new(&config).unwrap();
    let buffer = fixtures::staging_buffer("upload", 4096);
    let blobs: Vec<Vec<u8>> = (0..20u8).map(|i| vec![i; 100 + i as usize]).collect();
    for (i, blob) in blobs.iter().enumerate() {
        list.update_buffer(&buffer, i as u64 * 256, blob);
    }
    assert!(list.allocator().arena_count() > 1);

    let mut executor = CommandListExecutor::with_context(RecordingContext::new());
    executor.execute_command_list(&mut list).unwrap();
    let calls = executor.context_mut().unwrap().take_calls();
    for (i, (call, blob)) in calls.iter().zip(&blobs).enumerate() {
        assert_eq!(
            call,
            &ContextCall::UpdateBuffer(buffer.id(), i as u64 * 256, blob.clone())
        );
    }
}

#[test]
fn reset_list_is_reusable_after_execution() {
    let set = ResourceSet::new();
    let mut list = CommandList::default();
    let mut executor = CommandListExecutor::with_context(RecordingContext::new());

    for frame in 0..3 {
        record_all(&mut list, &set);
        executor.execute_command_list(&mut list).unwrap();
        assert_eq!(list.state(), ListState::Executed);
        list.reset();
        assert_eq!(list.state(), ListState::Idle, "frame {frame}");
    }
    let arena_count = list.allocator().arena_count();
    assert_eq!(arena_count, 1);
}

mod proptests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Clone, Debug)]
    enum Op {
        Draw(u32, u32),
        Dispatch(u32, u32, u32),
        Marker(String),
        Constants(Vec<u32>),
        Viewport(f32, f32),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (any::<u32>(), any::<u32>()).prop_map(|(a, b)| Op::Draw(a, b)),
            (1u32..64, 1u32..64, 1u32..4).prop_map(|(x, y, z)| Op::Dispatch(x, y, z)),
            "[a-z ]{0,40}".prop_map(Op::Marker),
            prop::collection::vec(any::<u32>(), 0..16).prop_map(Op::Constants),
            (1.0f32..4096.0, 1.0f32..4096.0).prop_map(|(w, h)| Op::Viewport(w, h)),
        ]
    }

    proptest! {
        #[test]
        fn replay_matches_recording_order(ops in prop::collection::vec(op(), 0..200)) {
            let shader = fixtures::shader(ShaderStage::Compute);
            let config = ArenaConfig { block_size: 128, max_arenas: 1024 };
            let mut list = CommandList::new(&config).unwrap();
            let mut expected = Vec::with_capacity(ops.len());

            for op in &ops {
                match op {
                    Op::Draw(count, start) => {
                        list.draw(*count, *start);
                        expected.push(ContextCall::Draw(*count, *start));
                    }
                    Op::Dispatch(x, y, z) => {
                        list.dispatch(*x, *y, *z);
                        expected.push(ContextCall::Dispatch(*x, *y, *z));
                    }
                    Op::Marker(text) => {
                        list.insert_marker(text);
                        expected.push(ContextCall::InsertMarker(text.clone()));
                    }
                    Op::Constants(words) => {
                        list.set_32bit_shader_constants(&shader, words);
                        expected.push(ContextCall::Set32BitShaderConstants(shader.id(), words.clone()));
                    }
                    Op::Viewport(w, h) => {
                        list.bind_viewport(*w, *h, 0.0, 1.0, 0.0, 0.0);
                        expected.push(ContextCall::BindViewport(*w, *h, 0.0, 1.0, 0.0, 0.0));
                    }
                }
            }

            let mut executor = CommandListExecutor::with_context(RecordingContext::new());
            executor.execute_command_list(&mut list).unwrap();
            prop_assert_eq!(executor.context().unwrap().calls(), expected.as_slice());

            list.reset();
            prop_assert_eq!(shader.ref_count(), 1);
        }
    }
}
