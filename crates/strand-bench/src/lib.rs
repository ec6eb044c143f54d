//! Benchmark profiles for Strand.
//!
//! - [`record_frame`]: a representative frame of state binds, uploads and
//!   draws recorded into one list
//! - [`record_upload`]: payload-heavy recording that spans several arenas

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use strand_command::CommandList;
use strand_core::{ClearColor, DepthStencilClearValue, IndexFormat, ResourceState, ShaderStage};
use strand_test_utils::fixtures::ResourceSet;

/// Record `draws` indexed draws with per-draw constants, bracketed by the
/// usual render-target setup and a compute pass.
pub fn record_frame(list: &mut CommandList, set: &ResourceSet, draws: u32) {
    list.begin();
    list.transition_texture(&set.color, ResourceState::PixelShaderResource, ResourceState::RenderTarget);
    list.clear_render_target_view(&set.rtv, ClearColor::BLACK);
    list.clear_depth_stencil_view(&set.dsv, DepthStencilClearValue::default());
    list.bind_render_targets(std::slice::from_ref(&set.rtv), Some(&set.dsv));
    list.bind_viewport(64.0, 64.0, 0.0, 1.0, 0.0, 0.0);
    list.bind_graphics_pipeline_state(&set.graphics_pipeline);
    list.bind_vertex_buffers(std::slice::from_ref(&set.vertex_buffer), 0);
    list.bind_index_buffer(Some(&set.index_buffer), IndexFormat::U32);
    list.bind_samplers(ShaderStage::Pixel, std::slice::from_ref(&set.sampler), 0);

    for i in 0..draws {
        list.set_32bit_shader_constants(&set.shader, &[i, i + 1, i + 2, i + 3]);
        list.bind_constant_buffers(ShaderStage::Vertex, std::slice::from_ref(&set.constant_buffer), 0);
        list.draw_indexed(36, 0, 0);
    }

    list.transition_texture(&set.color, ResourceState::RenderTarget, ResourceState::UnorderedAccess);
    list.bind_compute_pipeline_state(&set.compute_pipeline);
    list.bind_unordered_access_views(ShaderStage::Compute, std::slice::from_ref(&set.uav), 0);
    list.dispatch(8, 8, 1);
    list.end();
}

/// Record `count` buffer updates of `bytes` each.
pub fn record_upload(list: &mut CommandList, set: &ResourceSet, count: u32, bytes: usize) {
    let data = vec![0xA5u8; bytes];
    list.begin();
    for i in 0..count {
        let offset = u64::from(i) * bytes as u64 % set.staging.desc().size;
        list.update_buffer(&set.staging, offset, &data);
    }
    list.end();
}
