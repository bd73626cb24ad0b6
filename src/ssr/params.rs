//! Per-node parameter records
//!
//! Each reflection node captures one [`PassData`] by value when it is
//! declared. The same record drives both the declared read set and the
//! render function, so a node cannot sample a texture it did not declare.

use std::sync::Arc;

use crate::error::GraphResult;
use crate::render_graph::{BlitScaleBias, RasterContext, RasterPass, TextureBinding, TextureHandle};
use crate::ssr::program::{KernelKind, ReflectionProgram};

/// Immutable inputs and output of one reflection node.
#[derive(Debug, Clone)]
pub struct PassData {
    /// Primary blit source (scene color).
    pub source: TextureHandle,
    /// The node's only write.
    pub target: TextureHandle,
    pub program: Arc<ReflectionProgram>,
    pub kernel: KernelKind,
    /// Auxiliary textures bound to named kernel slots before the draw.
    pub bindings: Vec<TextureBinding>,
    pub scale_bias: BlitScaleBias,
}

impl PassData {
    pub fn new(
        program: Arc<ReflectionProgram>,
        kernel: KernelKind,
        source: TextureHandle,
        target: TextureHandle,
    ) -> Self {
        Self {
            source,
            target,
            program,
            kernel,
            bindings: Vec::new(),
            scale_bias: BlitScaleBias::IDENTITY,
        }
    }

    pub fn with_binding(mut self, slot: &'static str, texture: TextureHandle) -> Self {
        self.bindings.push(TextureBinding { slot, texture });
        self
    }

    /// Every texture the render function samples.
    pub fn reads(&self) -> impl Iterator<Item = TextureHandle> + '_ {
        std::iter::once(self.source).chain(self.bindings.iter().map(|b| b.texture))
    }

    /// Turn this record into a raster pass: reads first, then the
    /// attachment, then the render function owning the record.
    pub fn into_raster_pass(self, label: &str) -> RasterPass {
        let mut pass = RasterPass::new(label);
        for texture in self.reads() {
            pass.use_texture(texture);
        }
        pass.set_render_attachment(self.target);
        pass.set_render_func(self, |data, ctx| data.execute(ctx));
        pass
    }

    /// Bind auxiliary textures, then draw `source` with the selected kernel.
    pub fn execute(&self, ctx: &mut RasterContext<'_>) -> GraphResult<()> {
        for binding in &self.bindings {
            ctx.set_texture(binding.slot, binding.texture)?;
        }
        let kernel = self.program.kernel(self.kernel);
        ctx.blit_texture(
            self.source,
            self.scale_bias,
            self.program.name(),
            kernel.pass_index(),
        )
    }
}
