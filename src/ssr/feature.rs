//! Screen-space reflections renderer feature
//!
//! The feature owns the long-lived configuration, builds the [`SsrPass`]
//! once, and enqueues it every frame.

use std::ops::RangeInclusive;
use std::sync::Arc;

use crate::error::ConfigError;
use crate::frame::FrameData;
use crate::pipeline::{PassQueue, RenderStage, RendererFeature};
use crate::ssr::pass::SsrPass;
use crate::ssr::program::ReflectionProgram;

/// Stages where attribute buffers are resolved and post-processing has not
/// started yet.
pub const SUPPORTED_STAGES: RangeInclusive<RenderStage> =
    RenderStage::AfterRenderingDeferredLights..=RenderStage::BeforeRenderingPostProcessing;

/// The two flavors of the effect. They share the pass structure; the
/// marching algorithm lives in the program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReflectionVariant {
    #[default]
    Baseline,
    /// Linear screen-space marching.
    Linear,
}

impl ReflectionVariant {
    pub fn feature_name(&self) -> &'static str {
        match self {
            ReflectionVariant::Baseline => "ScreenSpaceReflections",
            ReflectionVariant::Linear => "LinearSSR",
        }
    }

    pub fn raymarch_label(&self) -> &'static str {
        match self {
            ReflectionVariant::Baseline => "RaymarchPass",
            ReflectionVariant::Linear => "LinearSSRRaymarchPass",
        }
    }

    pub fn composite_label(&self) -> &'static str {
        match self {
            ReflectionVariant::Baseline => "CompositePass",
            ReflectionVariant::Linear => "LinearSSRCompositePass",
        }
    }

    /// Name of the raw reflection estimate texture.
    pub fn first_pass_texture(&self) -> &'static str {
        match self {
            ReflectionVariant::Baseline => "_FirstPassTexture",
            ReflectionVariant::Linear => "_LinearSSR_FirstPassTexture",
        }
    }

    /// Name of the composited output texture.
    pub fn second_pass_texture(&self) -> &'static str {
        match self {
            ReflectionVariant::Baseline => "_SecondPassTexture",
            ReflectionVariant::Linear => "_LinearSSR_SecondPassTexture",
        }
    }

    /// Composite kernel slot receiving the raw estimate. The program reads
    /// it under the same name as the texture.
    pub fn raw_reflection_slot(&self) -> &'static str {
        self.first_pass_texture()
    }
}

/// Configuration for the reflections feature
#[derive(Debug, Clone, Default)]
pub struct SsrSettings {
    pub variant: ReflectionVariant,
    pub stage: RenderStage,
    pub program: Option<Arc<ReflectionProgram>>,
}

impl SsrSettings {
    pub fn new(program: Arc<ReflectionProgram>) -> Self {
        Self {
            program: Some(program),
            ..Self::default()
        }
    }

    pub fn with_variant(mut self, variant: ReflectionVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn with_stage(mut self, stage: RenderStage) -> Self {
        self.stage = stage;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.program.is_none() {
            return Err(ConfigError::MissingProgram);
        }
        if !SUPPORTED_STAGES.contains(&self.stage) {
            return Err(ConfigError::StageOutOfRange {
                stage: self.stage,
                min: *SUPPORTED_STAGES.start(),
                max: *SUPPORTED_STAGES.end(),
            });
        }
        Ok(())
    }
}

/// Renderer feature wrapping [`SsrPass`].
#[derive(Debug)]
pub struct SsrFeature {
    settings: SsrSettings,
    pass: Option<Arc<SsrPass>>,
    active: bool,
}

impl SsrFeature {
    /// Validate `settings` and build the pass.
    pub fn new(settings: SsrSettings) -> Result<Self, ConfigError> {
        settings.validate()?;
        let mut feature = Self {
            settings,
            pass: None,
            active: true,
        };
        feature.create();
        Ok(feature)
    }

    pub fn settings(&self) -> &SsrSettings {
        &self.settings
    }

    /// Replace the configuration and rebuild the pass.
    ///
    /// Invalid settings are stored but leave the feature without a pass, so
    /// it enqueues nothing until valid settings arrive.
    pub fn set_settings(&mut self, settings: SsrSettings) -> Result<(), ConfigError> {
        self.settings = settings;
        self.create();
        self.settings.validate()
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn pass(&self) -> Option<&Arc<SsrPass>> {
        self.pass.as_ref()
    }
}

impl RendererFeature for SsrFeature {
    fn name(&self) -> &str {
        self.settings.variant.feature_name()
    }

    fn create(&mut self) {
        self.pass = match (self.settings.validate(), &self.settings.program) {
            (Ok(()), Some(program)) => Some(Arc::new(SsrPass::new(
                self.settings.variant,
                self.settings.stage,
                program.clone(),
            ))),
            (Err(e), _) => {
                log::warn!("{} disabled: {}", self.name(), e);
                None
            }
            (Ok(()), None) => None,
        };
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn add_render_passes(&self, queue: &mut PassQueue, _frame: &FrameData) {
        if let Some(pass) = &self.pass {
            queue.enqueue(pass.clone());
        }
    }
}
