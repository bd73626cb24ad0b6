//! Render graph executor

use crate::error::{GraphError, GraphResult};
use crate::render_graph::graph::*;
use crate::render_graph::pass::*;
use crate::render_graph::resource::*;

/// Commands recorded by one pass during execution
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutedPass {
    pub id: PassId,
    pub name: String,
    pub attachment: TextureHandle,
    pub commands: Vec<Command>,
}

/// Executor for running the compiled render graph.
///
/// Render functions are consumed as they run, so a graph can be executed
/// once per frame. The recorded commands are returned in execution order for
/// a backend to translate.
#[derive(Debug, Default)]
pub struct RenderGraphExecutor {
    frames_executed: u64,
}

impl RenderGraphExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of graphs executed successfully so far.
    pub fn frames_executed(&self) -> u64 {
        self.frames_executed
    }

    /// Execute the render graph
    pub fn execute(
        &mut self,
        graph: &mut RenderGraph,
        compiled: &CompiledGraph,
    ) -> GraphResult<Vec<ExecutedPass>> {
        if compiled.generation != graph.generation()
            || compiled.pass_order().len() != graph.pass_count()
        {
            return Err(GraphError::StaleCompilation);
        }

        let mut executed = Vec::with_capacity(compiled.pass_order().len());

        for &pass_id in compiled.pass_order() {
            let pass = graph
                .get_pass_mut(pass_id)
                .ok_or(GraphError::UnknownPass(pass_id))?;
            let func = pass
                .take_render_func()
                .ok_or_else(|| GraphError::AlreadyExecuted(pass.name().to_string()))?;
            let attachment = pass
                .render_attachment()
                .ok_or_else(|| GraphError::MissingRenderAttachment(pass.name().to_string()))?;

            let mut commands = Vec::new();
            let mut ctx = RasterContext::new(pass.name(), pass.accesses(), attachment, &mut commands);
            func(&mut ctx)?;

            log::trace!("Executed pass '{}': {} commands", pass.name(), commands.len());
            executed.push(ExecutedPass {
                id: pass_id,
                name: pass.name().to_string(),
                attachment,
                commands,
            });
        }

        self.frames_executed += 1;
        Ok(executed)
    }
}
