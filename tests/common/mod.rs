//! Shared fixtures for the frame tests.

use std::sync::Arc;

use ssr_render_feature::{
    FinalBlitPass, FrameData, PassQueue, ReflectionProgram, ReflectionVariant, RendererFeature,
    SsrFeature, SsrSettings,
};

pub const PROGRAM_NAME: &str = "Hidden/ScreenSpaceReflections";

/// Install a test logger once per binary.
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn program() -> Arc<ReflectionProgram> {
    Arc::new(ReflectionProgram::new(PROGRAM_NAME))
}

pub fn ssr_feature(variant: ReflectionVariant) -> SsrFeature {
    match SsrFeature::new(SsrSettings::new(program()).with_variant(variant)) {
        Ok(feature) => feature,
        Err(e) => panic!("valid settings rejected: {e}"),
    }
}

/// Feature that presents the frame by blitting camera color to the back buffer.
#[derive(Default)]
pub struct PresentFeature {
    pass: Arc<FinalBlitPass>,
}

impl PresentFeature {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RendererFeature for PresentFeature {
    fn name(&self) -> &str {
        "Present"
    }

    fn create(&mut self) {}

    fn add_render_passes(&self, queue: &mut PassQueue, _frame: &FrameData) {
        queue.enqueue(self.pass.clone());
    }
}
