//! Final blit to the back buffer
//!
//! Copies whatever `camera_color` currently points at into the back buffer,
//! making it the last consumer of the frame's color chain.

use crate::error::GraphResult;
use crate::frame::FrameData;
use crate::pipeline::{RenderStage, ScriptablePass};
use crate::render_graph::{RasterPass, RenderGraph};

/// Copies the current camera color into the back buffer.
#[derive(Debug, Default)]
pub struct FinalBlitPass;

impl FinalBlitPass {
    pub fn new() -> Self {
        Self
    }
}

impl ScriptablePass for FinalBlitPass {
    fn name(&self) -> &str {
        "FinalBlit"
    }

    fn stage(&self) -> RenderStage {
        RenderStage::AfterRendering
    }

    fn record(&self, graph: &mut RenderGraph, frame: &mut FrameData) -> GraphResult<()> {
        let resources = &mut frame.resources;
        if resources.active_target_is_back_buffer {
            return Ok(());
        }

        let source = resources.camera_color;
        let mut pass = RasterPass::new(self.name());
        pass.use_texture(source)
            .set_render_attachment(resources.back_buffer)
            .set_render_func(source, |source, ctx| ctx.copy_texture(*source));
        graph.add_raster_pass(pass)?;

        resources.camera_color = resources.back_buffer;
        resources.active_target_is_back_buffer = true;
        Ok(())
    }
}
