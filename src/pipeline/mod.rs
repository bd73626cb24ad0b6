//! Frame pipeline
//!
//! The renderer owns a list of long-lived features. Every frame it:
//! 1. Asks each active feature to enqueue its passes
//! 2. Sorts the queue by [`RenderStage`]
//! 3. Lets each pass record its nodes into the frame's [`RenderGraph`]
//!
//! Recording never aborts the frame: a pass that fails is logged and skipped.

pub mod final_blit;

pub use final_blit::FinalBlitPass;

use std::sync::Arc;

use crate::error::GraphResult;
use crate::frame::FrameData;
use crate::render_graph::{CompiledGraph, ExecutedPass, RenderGraph, RenderGraphExecutor};

/// Scheduling points of a frame, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum RenderStage {
    BeforeRendering,
    BeforeRenderingShadows,
    AfterRenderingShadows,
    BeforeRenderingPrePasses,
    AfterRenderingPrePasses,
    BeforeRenderingGbuffer,
    AfterRenderingGbuffer,
    BeforeRenderingDeferredLights,
    AfterRenderingDeferredLights,
    BeforeRenderingOpaques,
    AfterRenderingOpaques,
    BeforeRenderingSkybox,
    AfterRenderingSkybox,
    BeforeRenderingTransparents,
    AfterRenderingTransparents,
    #[default]
    BeforeRenderingPostProcessing,
    AfterRenderingPostProcessing,
    AfterRendering,
}

impl RenderStage {
    pub const ALL: [RenderStage; 18] = [
        RenderStage::BeforeRendering,
        RenderStage::BeforeRenderingShadows,
        RenderStage::AfterRenderingShadows,
        RenderStage::BeforeRenderingPrePasses,
        RenderStage::AfterRenderingPrePasses,
        RenderStage::BeforeRenderingGbuffer,
        RenderStage::AfterRenderingGbuffer,
        RenderStage::BeforeRenderingDeferredLights,
        RenderStage::AfterRenderingDeferredLights,
        RenderStage::BeforeRenderingOpaques,
        RenderStage::AfterRenderingOpaques,
        RenderStage::BeforeRenderingSkybox,
        RenderStage::AfterRenderingSkybox,
        RenderStage::BeforeRenderingTransparents,
        RenderStage::AfterRenderingTransparents,
        RenderStage::BeforeRenderingPostProcessing,
        RenderStage::AfterRenderingPostProcessing,
        RenderStage::AfterRendering,
    ];
}

/// A pass that records nodes into the frame's render graph.
pub trait ScriptablePass: Send + Sync {
    /// Get the pass name for debugging
    fn name(&self) -> &str;

    /// When in the frame this pass records.
    fn stage(&self) -> RenderStage;

    /// Declare resources and nodes for this frame.
    fn record(&self, graph: &mut RenderGraph, frame: &mut FrameData) -> GraphResult<()>;
}

/// Long-lived registration hook that owns configuration and passes.
pub trait RendererFeature: Send + Sync {
    fn name(&self) -> &str;

    /// (Re)build the feature's passes from its configuration.
    fn create(&mut self);

    fn is_active(&self) -> bool {
        true
    }

    /// Enqueue this frame's passes.
    fn add_render_passes(&self, queue: &mut PassQueue, frame: &FrameData);
}

/// The frame's ordered list of passes to record.
#[derive(Default)]
pub struct PassQueue {
    passes: Vec<Arc<dyn ScriptablePass>>,
}

impl PassQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `pass` unless it is already queued this frame.
    ///
    /// Returns whether the pass was added.
    pub fn enqueue(&mut self, pass: Arc<dyn ScriptablePass>) -> bool {
        let queued = self.passes.iter().any(|p| same_pass(p, &pass));
        if queued {
            log::warn!("Pass '{}' already enqueued this frame", pass.name());
            return false;
        }
        self.passes.push(pass);
        true
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn ScriptablePass>> {
        self.passes.iter()
    }

    /// Stable sort; passes sharing a stage keep their enqueue order.
    pub fn sort_by_stage(&mut self) {
        self.passes.sort_by_key(|p| p.stage());
    }

    pub fn clear(&mut self) {
        self.passes.clear();
    }
}

fn same_pass(a: &Arc<dyn ScriptablePass>, b: &Arc<dyn ScriptablePass>) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}

/// Drives features and passes through a frame.
#[derive(Default)]
pub struct Renderer {
    features: Vec<Box<dyn RendererFeature>>,
    queue: PassQueue,
    frames_recorded: u64,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a feature. Its passes are built once, here.
    pub fn add_feature<F: RendererFeature + 'static>(&mut self, mut feature: F) {
        feature.create();
        log::debug!("Registered renderer feature '{}'", feature.name());
        self.features.push(Box::new(feature));
    }

    pub fn features(&self) -> impl Iterator<Item = &dyn RendererFeature> {
        self.features.iter().map(|f| f.as_ref())
    }

    pub fn frames_recorded(&self) -> u64 {
        self.frames_recorded
    }

    /// Record one frame into `graph`.
    ///
    /// Returns the names of the passes that recorded successfully, in
    /// recording order.
    pub fn record_frame(&mut self, graph: &mut RenderGraph, frame: &mut FrameData) -> Vec<String> {
        for feature in self.features.iter().filter(|f| f.is_active()) {
            feature.add_render_passes(&mut self.queue, frame);
        }
        self.queue.sort_by_stage();

        let mut recorded = Vec::with_capacity(self.queue.len());
        for pass in self.queue.iter() {
            match pass.record(graph, frame) {
                Ok(()) => recorded.push(pass.name().to_string()),
                Err(e) => log::error!("Pass '{}' failed to record: {}", pass.name(), e),
            }
        }

        self.queue.clear();
        self.frames_recorded += 1;
        recorded
    }

    /// Record, compile and execute one frame.
    pub fn render_frame(
        &mut self,
        graph: &mut RenderGraph,
        frame: &mut FrameData,
        executor: &mut RenderGraphExecutor,
    ) -> GraphResult<(CompiledGraph, Vec<ExecutedPass>)> {
        self.record_frame(graph, frame);
        let compiled = graph.compile()?;
        let executed = executor.execute(graph, &compiled)?;
        Ok((compiled, executed))
    }
}
