//! Screen-space reflection pass
//!
//! Per frame the pass:
//! 1. Skips when the camera color is the presentation surface
//! 2. Skips when there is no normal/roughness buffer
//! 3. Derives a descriptor for its intermediates from the camera target
//! 4. Requests the raw estimate and composite targets from the transient pool,
//!    returning the first one when the second is refused
//! 5. Adds the raymarch node, then the composite node reading its output
//! 6. Points the frame's camera color at the composite target
//!
//! Every skip leaves the frame and the transient pool untouched.

use std::sync::Arc;

use crate::error::GraphResult;
use crate::frame::{FrameData, GBUFFER_NORMAL_ROUGHNESS};
use crate::pipeline::{RenderStage, ScriptablePass};
use crate::render_graph::{
    PassId, RenderGraph, TextureDescriptor, TextureFormat, TextureHandle, TextureUsage,
};
use crate::ssr::feature::ReflectionVariant;
use crate::ssr::params::PassData;
use crate::ssr::program::{KernelKind, ReflectionProgram, GBUFFER2_SLOT};

/// Format of both intermediates. Reflections can exceed display range.
pub const INTERMEDIATE_FORMAT: TextureFormat = TextureFormat::Rgba32Float;

/// Descriptor for the intermediates, derived fresh from the camera target.
///
/// Size follows the camera; the format is fixed and depth is dropped since
/// the intermediates are color-only.
pub fn derive_descriptor(camera_target: &TextureDescriptor) -> TextureDescriptor {
    TextureDescriptor::new_2d(
        camera_target.width,
        camera_target.height,
        INTERMEDIATE_FORMAT,
        TextureUsage::RENDER_ATTACHMENT | TextureUsage::TEXTURE_BINDING,
    )
}

/// Why a frame was rendered without reflections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// Camera color is the surface about to be presented.
    FinalSurface,
    /// The transient pool refused one of the intermediates.
    TransientAllocationFailed,
    /// No packed normal/roughness buffer on this rendering path.
    MissingAttributeBuffer,
}

/// Result of recording one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Both nodes were added and camera color now points at `output`.
    Spliced {
        raymarch: PassId,
        composite: PassId,
        raw_reflection: TextureHandle,
        output: TextureHandle,
    },
    Skipped(SkipReason),
}

impl RecordOutcome {
    pub fn is_spliced(&self) -> bool {
        matches!(self, RecordOutcome::Spliced { .. })
    }
}

/// Two-node screen-space reflection pass.
#[derive(Debug)]
pub struct SsrPass {
    variant: ReflectionVariant,
    stage: RenderStage,
    program: Arc<ReflectionProgram>,
}

impl SsrPass {
    pub fn new(variant: ReflectionVariant, stage: RenderStage, program: Arc<ReflectionProgram>) -> Self {
        Self {
            variant,
            stage,
            program,
        }
    }

    pub fn variant(&self) -> ReflectionVariant {
        self.variant
    }

    pub fn program(&self) -> &Arc<ReflectionProgram> {
        &self.program
    }

    /// Record this frame's nodes.
    ///
    /// Skips are reported through [`RecordOutcome::Skipped`]; an `Err` means
    /// the graph rejected a node. In both cases camera color is unchanged.
    pub fn record_render_graph(
        &self,
        graph: &mut RenderGraph,
        frame: &mut FrameData,
    ) -> GraphResult<RecordOutcome> {
        if frame.resources.active_target_is_back_buffer {
            return Ok(self.skip(frame, SkipReason::FinalSurface));
        }

        let attributes = frame.resources.gbuffer(GBUFFER_NORMAL_ROUGHNESS);
        if !attributes.is_valid() {
            return Ok(self.skip(frame, SkipReason::MissingAttributeBuffer));
        }

        let descriptor = derive_descriptor(&frame.camera.target_descriptor);
        let raw_reflection = graph.create_texture(&descriptor, self.variant.first_pass_texture());
        if !raw_reflection.is_valid() {
            return Ok(self.skip(frame, SkipReason::TransientAllocationFailed));
        }
        let output = graph.create_texture(&descriptor, self.variant.second_pass_texture());
        if !output.is_valid() {
            graph.release_texture(raw_reflection);
            return Ok(self.skip(frame, SkipReason::TransientAllocationFailed));
        }

        let scene_color = frame.resources.camera_color;

        let raymarch = PassData::new(
            self.program.clone(),
            KernelKind::Raymarch,
            scene_color,
            raw_reflection,
        )
        .with_binding(GBUFFER2_SLOT, attributes);
        let raymarch =
            match graph.add_raster_pass(raymarch.into_raster_pass(self.variant.raymarch_label())) {
                Ok(id) => id,
                Err(e) => {
                    graph.release_texture(output);
                    graph.release_texture(raw_reflection);
                    return Err(e);
                }
            };

        let composite = PassData::new(
            self.program.clone(),
            KernelKind::Composite,
            scene_color,
            output,
        )
        .with_binding(GBUFFER2_SLOT, attributes)
        .with_binding(self.variant.raw_reflection_slot(), raw_reflection);
        let composite =
            graph.add_raster_pass(composite.into_raster_pass(self.variant.composite_label()))?;

        frame.resources.camera_color = output;
        log::trace!(
            "{}: frame {} spliced {}x{} reflections",
            self.variant.feature_name(),
            frame.frame_index,
            descriptor.width,
            descriptor.height
        );

        Ok(RecordOutcome::Spliced {
            raymarch,
            composite,
            raw_reflection,
            output,
        })
    }

    fn skip(&self, frame: &FrameData, reason: SkipReason) -> RecordOutcome {
        log::trace!(
            "{}: frame {} skipped ({:?})",
            self.variant.feature_name(),
            frame.frame_index,
            reason
        );
        RecordOutcome::Skipped(reason)
    }
}

impl ScriptablePass for SsrPass {
    fn name(&self) -> &str {
        self.variant.feature_name()
    }

    fn stage(&self) -> RenderStage {
        self.stage
    }

    fn record(&self, graph: &mut RenderGraph, frame: &mut FrameData) -> GraphResult<()> {
        self.record_render_graph(graph, frame).map(|_| ())
    }
}
