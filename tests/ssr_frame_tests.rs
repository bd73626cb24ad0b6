//! End-to-end frame tests for the reflections feature.
//!
//! Each test drives a [`Renderer`] through one or more frames against the
//! in-process render graph and checks what the frame looks like afterwards:
//! which nodes were declared, what they read and write, and where the
//! frame's camera color points.
//!
//! ```bash
//! cargo test --test ssr_frame_tests
//! ```

mod common;

use rstest::rstest;

use common::{init_logger, ssr_feature, PresentFeature, PROGRAM_NAME};
use ssr_render_feature::render_graph::{BlitScaleBias, Command, TextureBinding};
use ssr_render_feature::ssr::GBUFFER2_SLOT;
use ssr_render_feature::{
    CameraData, FrameData, GraphConfig, RenderGraph, RenderGraphExecutor, RenderStage, Renderer,
    ReflectionVariant, SsrFeature, SsrSettings, TextureFormat, GBUFFER_NORMAL_ROUGHNESS,
};

// ============================================================================
// Splicing
// ============================================================================

/// A deferred frame gets both nodes, and camera color ends on the composite
/// target.
#[rstest]
#[case::baseline(ReflectionVariant::Baseline, "RaymarchPass", "CompositePass")]
#[case::linear(
    ReflectionVariant::Linear,
    "LinearSSRRaymarchPass",
    "LinearSSRCompositePass"
)]
fn test_deferred_frame_is_spliced(
    #[case] variant: ReflectionVariant,
    #[case] raymarch_label: &str,
    #[case] composite_label: &str,
) {
    init_logger();

    let mut renderer = Renderer::new();
    renderer.add_feature(ssr_feature(variant));

    let mut graph = RenderGraph::new();
    let mut frame = FrameData::deferred(&mut graph, 0, CameraData::new("main", 1920, 1080));
    let scene_color = frame.resources.camera_color;
    let attributes = frame.resources.gbuffer(GBUFFER_NORMAL_ROUGHNESS);

    let recorded = renderer.record_frame(&mut graph, &mut frame);
    assert_eq!(recorded, vec![variant.feature_name()]);
    assert_eq!(graph.pass_count(), 2);

    let raymarch = graph.find_pass(raymarch_label).unwrap();
    let composite = graph.find_pass(composite_label).unwrap();
    let raw = graph.get_pass(raymarch).unwrap().render_attachment().unwrap();
    let output = graph.get_pass(composite).unwrap().render_attachment().unwrap();

    assert_eq!(frame.resources.camera_color, output);
    assert_ne!(output, raw);
    assert_ne!(output, scene_color);
    assert_eq!(graph.texture_name(raw), Some(variant.first_pass_texture()));
    assert_eq!(graph.texture_name(output), Some(variant.second_pass_texture()));

    let composite_pass = graph.get_pass(composite).unwrap();
    assert!(composite_pass.reads_resource(raw));
    assert!(composite_pass.reads_resource(attributes));
    assert!(composite_pass.reads_resource(scene_color));
    assert!(graph.get_pass(raymarch).unwrap().reads_resource(scene_color));

    let compiled = graph.compile().unwrap();
    assert_eq!(compiled.pass_order(), &[raymarch, composite]);
    assert!(compiled.dependencies(composite).unwrap().contains(&raymarch));
}

/// Both intermediates follow the viewport and carry no depth.
#[rstest]
#[case::full_hd(1920, 1080)]
#[case::odd(1023, 577)]
#[case::single_pixel(1, 1)]
fn test_intermediates_match_viewport(#[case] width: u32, #[case] height: u32) {
    let mut renderer = Renderer::new();
    renderer.add_feature(ssr_feature(ReflectionVariant::Baseline));

    let mut graph = RenderGraph::new();
    let mut frame = FrameData::deferred(&mut graph, 0, CameraData::new("main", width, height));
    renderer.record_frame(&mut graph, &mut frame);

    assert_eq!(graph.transient_count(), 2);
    for pass in graph.passes() {
        let desc = graph
            .texture_descriptor(pass.render_attachment().unwrap())
            .unwrap();
        assert_eq!((desc.width, desc.height), (width, height));
        assert_eq!(desc.depth_bits, 0);
        assert_eq!(desc.format, TextureFormat::Rgba32Float);
    }
}

/// A viewport change between frames is picked up on the next frame.
#[test]
fn test_resize_between_frames() {
    init_logger();

    let mut renderer = Renderer::new();
    renderer.add_feature(ssr_feature(ReflectionVariant::Linear));
    let mut graph = RenderGraph::new();

    let mut frame = FrameData::deferred(&mut graph, 0, CameraData::new("main", 1920, 1080));
    renderer.record_frame(&mut graph, &mut frame);
    let first = frame.resources.camera_color;
    let desc = graph.texture_descriptor(first).unwrap();
    assert_eq!((desc.width, desc.height), (1920, 1080));

    graph.clear();
    let mut frame = FrameData::deferred(&mut graph, 1, CameraData::new("main", 800, 600));
    renderer.record_frame(&mut graph, &mut frame);

    for pass in graph.passes() {
        let desc = graph
            .texture_descriptor(pass.render_attachment().unwrap())
            .unwrap();
        assert_eq!((desc.width, desc.height), (800, 600));
    }
    assert!(graph.texture_descriptor(first).is_none());
    assert_eq!(renderer.frames_recorded(), 2);
}

// ============================================================================
// Skipping
// ============================================================================

/// Cameras rendering straight to the back buffer are left alone.
#[rstest]
#[case::baseline(ReflectionVariant::Baseline)]
#[case::linear(ReflectionVariant::Linear)]
fn test_final_surface_frame_is_untouched(#[case] variant: ReflectionVariant) {
    let mut renderer = Renderer::new();
    renderer.add_feature(ssr_feature(variant));

    let mut graph = RenderGraph::new();
    let mut frame =
        FrameData::direct_to_back_buffer(&mut graph, 0, CameraData::new("main", 1920, 1080));
    let before = frame.clone();

    // A skip still counts as a successful recording.
    let recorded = renderer.record_frame(&mut graph, &mut frame);
    assert_eq!(recorded.len(), 1);

    assert_eq!(frame, before);
    assert_eq!(graph.pass_count(), 0);
    assert_eq!(graph.transient_count(), 0);
    assert_eq!(graph.transient_bytes(), 0);
}

/// Forward cameras have no attribute buffers; the frame renders without
/// reflections.
#[rstest]
#[case::baseline(ReflectionVariant::Baseline)]
#[case::linear(ReflectionVariant::Linear)]
fn test_forward_frame_is_untouched(#[case] variant: ReflectionVariant) {
    let mut renderer = Renderer::new();
    renderer.add_feature(ssr_feature(variant));

    let mut graph = RenderGraph::new();
    let mut frame = FrameData::forward(&mut graph, 0, CameraData::new("main", 1920, 1080));
    let before = frame.resources.clone();

    renderer.record_frame(&mut graph, &mut frame);
    assert_eq!(frame.resources, before);
    assert_eq!(graph.pass_count(), 0);
    assert_eq!(graph.transient_count(), 0);
    assert_eq!(graph.transient_bytes(), 0);
}

/// Pool pressure degrades to a frame without reflections.
#[test]
fn test_transient_budget_exhausted() {
    let mut renderer = Renderer::new();
    renderer.add_feature(ssr_feature(ReflectionVariant::Baseline));

    // Room for exactly one 64x64 RGBA32F intermediate.
    let mut graph = RenderGraph::with_config(GraphConfig {
        max_transient_bytes: Some(64 * 64 * 16),
    });
    let mut frame = FrameData::deferred(&mut graph, 0, CameraData::new("main", 64, 64));
    let before = frame.resources.camera_color;

    renderer.record_frame(&mut graph, &mut frame);
    assert_eq!(frame.resources.camera_color, before);
    assert_eq!(graph.pass_count(), 0);

    // The refused frame leaves the whole budget to later passes.
    assert_eq!(graph.transient_bytes(), 0);
    assert_eq!(graph.transient_count(), 0);
}

/// A disabled feature enqueues nothing.
#[test]
fn test_inactive_feature() {
    let mut feature = ssr_feature(ReflectionVariant::Baseline);
    feature.set_active(false);
    let mut renderer = Renderer::new();
    renderer.add_feature(feature);

    let mut graph = RenderGraph::new();
    let mut frame = FrameData::deferred(&mut graph, 0, CameraData::new("main", 64, 64));
    assert!(renderer.record_frame(&mut graph, &mut frame).is_empty());
    assert_eq!(graph.pass_count(), 0);
}

#[test]
fn test_missing_program_disables_feature() {
    assert!(SsrFeature::new(SsrSettings::default()).is_err());

    let mut feature = ssr_feature(ReflectionVariant::Baseline);
    assert!(feature.set_settings(SsrSettings::default()).is_err());

    let mut renderer = Renderer::new();
    renderer.add_feature(feature);
    let mut graph = RenderGraph::new();
    let mut frame = FrameData::deferred(&mut graph, 0, CameraData::new("main", 64, 64));
    assert!(renderer.record_frame(&mut graph, &mut frame).is_empty());
}

// ============================================================================
// Execution
// ============================================================================

/// Full frame: reflections, then presentation reading the spliced color.
#[rstest]
#[case::baseline(ReflectionVariant::Baseline)]
#[case::linear(ReflectionVariant::Linear)]
fn test_execute_with_present(#[case] variant: ReflectionVariant) {
    init_logger();

    let mut renderer = Renderer::new();
    renderer.add_feature(PresentFeature::new());
    renderer.add_feature(ssr_feature(variant));

    let mut graph = RenderGraph::new();
    let mut frame = FrameData::deferred(&mut graph, 0, CameraData::new("main", 320, 180));
    let scene_color = frame.resources.camera_color;
    let back_buffer = frame.resources.back_buffer;
    let attributes = frame.resources.gbuffer(GBUFFER_NORMAL_ROUGHNESS);

    let mut executor = RenderGraphExecutor::new();
    let (compiled, executed) = renderer
        .render_frame(&mut graph, &mut frame, &mut executor)
        .unwrap();

    let names: Vec<_> = executed.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            variant.raymarch_label(),
            variant.composite_label(),
            "FinalBlit"
        ]
    );

    let raw = executed[0].attachment;
    let output = executed[1].attachment;
    assert_eq!(executed[2].attachment, back_buffer);
    assert!(frame.resources.active_target_is_back_buffer);

    assert_eq!(
        executed[0].commands,
        vec![
            Command::SetTexture(TextureBinding {
                slot: GBUFFER2_SLOT,
                texture: attributes,
            }),
            Command::Blit {
                source: scene_color,
                target: raw,
                scale_bias: BlitScaleBias::IDENTITY,
                program: PROGRAM_NAME.to_string(),
                kernel_index: 0,
            },
        ]
    );
    assert_eq!(
        executed[1].commands,
        vec![
            Command::SetTexture(TextureBinding {
                slot: GBUFFER2_SLOT,
                texture: attributes,
            }),
            Command::SetTexture(TextureBinding {
                slot: variant.raw_reflection_slot(),
                texture: raw,
            }),
            Command::Blit {
                source: scene_color,
                target: output,
                scale_bias: BlitScaleBias::IDENTITY,
                program: PROGRAM_NAME.to_string(),
                kernel_index: 1,
            },
        ]
    );
    assert_eq!(
        executed[2].commands,
        vec![Command::Copy {
            source: output,
            target: back_buffer,
        }]
    );

    // The raw estimate dies with the composite; the output lives until
    // presentation.
    let raw_life = compiled.lifetime(raw).unwrap();
    assert_eq!((raw_life.first_use, raw_life.last_use), (0, 1));
    assert!(compiled.is_resource_alive(output, 2));
    assert!(!compiled.is_resource_alive(raw, 2));
    assert_eq!(executor.frames_executed(), 1);
}

/// Several frames through the same renderer and executor.
#[test]
fn test_steady_state_frames() {
    let mut renderer = Renderer::new();
    renderer.add_feature(ssr_feature(ReflectionVariant::Baseline));
    renderer.add_feature(PresentFeature::new());

    let mut graph = RenderGraph::new();
    let mut executor = RenderGraphExecutor::new();

    for frame_index in 0..4 {
        graph.clear();
        let mut frame =
            FrameData::deferred(&mut graph, frame_index, CameraData::new("main", 128, 128));
        let (_, executed) = renderer
            .render_frame(&mut graph, &mut frame, &mut executor)
            .unwrap();
        assert_eq!(executed.len(), 3);
    }
    assert_eq!(executor.frames_executed(), 4);
}

/// The configured stage places reflections relative to other passes.
#[test]
fn test_stage_orders_against_present() {
    let feature = SsrFeature::new(
        SsrSettings::new(common::program()).with_stage(RenderStage::AfterRenderingDeferredLights),
    )
    .unwrap();
    assert_eq!(
        feature.pass().map(|p| p.variant()),
        Some(ReflectionVariant::Baseline)
    );

    let mut renderer = Renderer::new();
    renderer.add_feature(PresentFeature::new());
    renderer.add_feature(feature);

    let mut graph = RenderGraph::new();
    let mut frame = FrameData::deferred(&mut graph, 0, CameraData::new("main", 64, 64));
    let recorded = renderer.record_frame(&mut graph, &mut frame);
    assert_eq!(recorded, vec!["ScreenSpaceReflections", "FinalBlit"]);
}
