use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use ssr_render_feature::{
    CameraData, FrameData, ReflectionProgram, ReflectionVariant, RenderGraph, RenderGraphExecutor,
    Renderer, SsrFeature, SsrSettings,
};

fn renderer(variant: ReflectionVariant) -> Renderer {
    let program = Arc::new(ReflectionProgram::new("Hidden/ScreenSpaceReflections"));
    let mut renderer = Renderer::new();
    if let Ok(feature) = SsrFeature::new(SsrSettings::new(program).with_variant(variant)) {
        renderer.add_feature(feature);
    }
    renderer
}

// ---------------------------------------------------------------------------
// Frame recording
// ---------------------------------------------------------------------------

fn bench_record_deferred(c: &mut Criterion) {
    let mut renderer = renderer(ReflectionVariant::Baseline);
    let mut graph = RenderGraph::new();
    c.bench_function("ssr_record_deferred_1080p", |b| {
        b.iter(|| {
            graph.clear();
            let mut frame =
                FrameData::deferred(&mut graph, 0, CameraData::new("main", 1920, 1080));
            black_box(renderer.record_frame(&mut graph, &mut frame));
        });
    });
}

fn bench_record_skipped(c: &mut Criterion) {
    let mut renderer = renderer(ReflectionVariant::Linear);
    let mut graph = RenderGraph::new();
    c.bench_function("ssr_record_forward_skip", |b| {
        b.iter(|| {
            graph.clear();
            let mut frame = FrameData::forward(&mut graph, 0, CameraData::new("main", 1920, 1080));
            black_box(renderer.record_frame(&mut graph, &mut frame));
        });
    });
}

// ---------------------------------------------------------------------------
// Compile and execute
// ---------------------------------------------------------------------------

fn bench_render_frame(c: &mut Criterion) {
    let mut renderer = renderer(ReflectionVariant::Baseline);
    let mut graph = RenderGraph::new();
    let mut executor = RenderGraphExecutor::new();
    c.bench_function("ssr_render_frame_1080p", |b| {
        b.iter(|| {
            graph.clear();
            let mut frame =
                FrameData::deferred(&mut graph, 0, CameraData::new("main", 1920, 1080));
            black_box(
                renderer
                    .render_frame(&mut graph, &mut frame, &mut executor)
                    .unwrap(),
            );
        });
    });
}

criterion_group!(
    benches,
    bench_record_deferred,
    bench_record_skipped,
    bench_render_frame,
);
criterion_main!(benches);
