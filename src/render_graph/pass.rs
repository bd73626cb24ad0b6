//! Render pass definitions for the render graph

use bytemuck::{Pod, Zeroable};
use glam::Vec4;

use crate::error::{GraphError, GraphResult};
use crate::render_graph::resource::*;

/// Unique identifier for a render pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PassId(pub(crate) u32);

impl PassId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Deferred work recorded by a pass, run by the executor after compilation.
pub type RenderFunc = Box<dyn FnOnce(&mut RasterContext<'_>) -> GraphResult<()> + Send>;

/// Scale and bias applied to the source UVs of a full-screen blit.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct BlitScaleBias {
    pub scale: [f32; 2],
    pub bias: [f32; 2],
}

impl BlitScaleBias {
    /// Sample the whole source with no offset.
    pub const IDENTITY: Self = Self {
        scale: [1.0, 1.0],
        bias: [0.0, 0.0],
    };

    pub fn to_vec4(self) -> Vec4 {
        Vec4::new(self.scale[0], self.scale[1], self.bias[0], self.bias[1])
    }
}

impl Default for BlitScaleBias {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<Vec4> for BlitScaleBias {
    fn from(v: Vec4) -> Self {
        Self {
            scale: [v.x, v.y],
            bias: [v.z, v.w],
        }
    }
}

/// A texture bound to a named shader slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureBinding {
    pub slot: &'static str,
    pub texture: TextureHandle,
}

/// A command recorded while executing a pass.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Bind a texture to a shader slot for the next draw.
    SetTexture(TextureBinding),
    /// Full-screen draw of `source` into the pass attachment using one
    /// kernel of a shading program.
    Blit {
        source: TextureHandle,
        target: TextureHandle,
        scale_bias: BlitScaleBias,
        program: String,
        kernel_index: u32,
    },
    /// Plain copy of `source` into the pass attachment.
    Copy {
        source: TextureHandle,
        target: TextureHandle,
    },
}

/// A raster pass under construction.
///
/// Accesses are kept in declaration order. Configure the pass fully, then
/// hand it to [`RenderGraph::add_raster_pass`](super::RenderGraph::add_raster_pass).
pub struct RasterPass {
    name: String,
    accesses: Vec<ResourceAccess>,
    render_func: Option<RenderFunc>,
}

impl RasterPass {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            accesses: Vec::new(),
            render_func: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declare that this pass samples `texture`.
    pub fn use_texture(&mut self, texture: TextureHandle) -> &mut Self {
        let access = ResourceAccess {
            resource: texture,
            usage: ResourceUsage::TextureRead,
        };
        if !self.accesses.contains(&access) {
            self.accesses.push(access);
        }
        self
    }

    /// Declare `texture` as the color attachment this pass writes.
    pub fn set_render_attachment(&mut self, texture: TextureHandle) -> &mut Self {
        self.accesses.push(ResourceAccess {
            resource: texture,
            usage: ResourceUsage::RenderTarget,
        });
        self
    }

    /// Set the deferred render function.
    ///
    /// `data` is moved into the function and handed back by reference at
    /// execution time, so nothing from the recording scope is shared.
    pub fn set_render_func<D, F>(&mut self, data: D, func: F) -> &mut Self
    where
        D: Send + 'static,
        F: FnOnce(&D, &mut RasterContext<'_>) -> GraphResult<()> + Send + 'static,
    {
        self.render_func = Some(Box::new(move |ctx: &mut RasterContext<'_>| {
            func(&data, ctx)
        }));
        self
    }

    pub fn accesses(&self) -> &[ResourceAccess] {
        &self.accesses
    }

    pub fn reads(&self) -> impl Iterator<Item = TextureHandle> + '_ {
        self.accesses
            .iter()
            .filter(|a| a.is_read())
            .map(|a| a.resource)
    }

    pub fn writes(&self) -> impl Iterator<Item = TextureHandle> + '_ {
        self.accesses
            .iter()
            .filter(|a| a.is_write())
            .map(|a| a.resource)
    }

    /// The pass's single color attachment, if one was declared.
    pub fn render_attachment(&self) -> Option<TextureHandle> {
        self.writes().next()
    }

    pub fn reads_resource(&self, resource: TextureHandle) -> bool {
        self.reads().any(|r| r == resource)
    }

    pub fn writes_resource(&self, resource: TextureHandle) -> bool {
        self.writes().any(|w| w == resource)
    }

    pub fn touches_resource(&self, resource: TextureHandle) -> bool {
        self.accesses.iter().any(|a| a.resource == resource)
    }

    pub fn has_render_func(&self) -> bool {
        self.render_func.is_some()
    }

    pub(crate) fn take_render_func(&mut self) -> Option<RenderFunc> {
        self.render_func.take()
    }
}

impl std::fmt::Debug for RasterPass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterPass")
            .field("name", &self.name)
            .field("accesses", &self.accesses)
            .field("has_render_func", &self.render_func.is_some())
            .finish()
    }
}

/// Context handed to a pass's render function.
///
/// Every texture the function samples must have been declared as a read on
/// the pass; the only texture it may write is the pass attachment.
pub struct RasterContext<'a> {
    pass_name: &'a str,
    accesses: &'a [ResourceAccess],
    attachment: TextureHandle,
    commands: &'a mut Vec<Command>,
}

impl<'a> RasterContext<'a> {
    pub(crate) fn new(
        pass_name: &'a str,
        accesses: &'a [ResourceAccess],
        attachment: TextureHandle,
        commands: &'a mut Vec<Command>,
    ) -> Self {
        Self {
            pass_name,
            accesses,
            attachment,
            commands,
        }
    }

    pub fn pass_name(&self) -> &str {
        self.pass_name
    }

    pub fn render_attachment(&self) -> TextureHandle {
        self.attachment
    }

    /// Bind `texture` to a shader slot for the next draw.
    pub fn set_texture(&mut self, slot: &'static str, texture: TextureHandle) -> GraphResult<()> {
        self.check_read(texture)?;
        self.commands
            .push(Command::SetTexture(TextureBinding { slot, texture }));
        Ok(())
    }

    /// Draw `source` into the attachment with the kernel at `kernel_index`.
    pub fn blit_texture(
        &mut self,
        source: TextureHandle,
        scale_bias: BlitScaleBias,
        program: &str,
        kernel_index: u32,
    ) -> GraphResult<()> {
        self.check_read(source)?;
        self.commands.push(Command::Blit {
            source,
            target: self.attachment,
            scale_bias,
            program: program.to_string(),
            kernel_index,
        });
        Ok(())
    }

    /// Copy `source` into the attachment without a shading program.
    pub fn copy_texture(&mut self, source: TextureHandle) -> GraphResult<()> {
        self.check_read(source)?;
        self.commands.push(Command::Copy {
            source,
            target: self.attachment,
        });
        Ok(())
    }

    fn check_read(&self, texture: TextureHandle) -> GraphResult<()> {
        let declared = self
            .accesses
            .iter()
            .any(|a| a.is_read() && a.resource == texture);
        if declared {
            Ok(())
        } else {
            Err(GraphError::UndeclaredRead {
                pass: self.pass_name.to_string(),
                texture,
            })
        }
    }
}
