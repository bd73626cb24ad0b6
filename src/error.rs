//! Error types for render graph recording and feature configuration

use thiserror::Error;

use crate::pipeline::RenderStage;
use crate::render_graph::{PassId, TextureHandle};

/// Render graph error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Pass '{pass}' references an invalid texture handle")]
    InvalidTexture { pass: String },
    #[error("Texture {texture:?} does not belong to the current frame")]
    StaleTexture { texture: TextureHandle },
    #[error("Pass '{0}' has no render attachment")]
    MissingRenderAttachment(String),
    #[error("Pass '{0}' declares more than one render attachment")]
    MultipleRenderAttachments(String),
    #[error("Pass '{0}' has no render function")]
    MissingRenderFunc(String),
    #[error("Pass '{pass}' samples its own attachment {texture:?}")]
    ReadWriteConflict { pass: String, texture: TextureHandle },
    #[error("Pass '{pass}' reads transient texture '{texture}' before any pass writes it")]
    ReadBeforeWrite { pass: String, texture: String },
    #[error("Pass '{pass}' accessed texture {texture:?} without declaring a read")]
    UndeclaredRead { pass: String, texture: TextureHandle },
    #[error("Unknown pass {0:?}")]
    UnknownPass(PassId),
    #[error("Pass '{0}' was already executed")]
    AlreadyExecuted(String),
    #[error("Compiled graph does not match the current frame")]
    StaleCompilation,
    #[error("Render graph contains cyclic dependency")]
    CyclicDependency,
}

pub type GraphResult<T> = Result<T, GraphError>;

/// Feature configuration error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("No reflection program assigned")]
    MissingProgram,
    #[error("Stage {stage:?} is outside the supported range {min:?}..={max:?}")]
    StageOutOfRange {
        stage: RenderStage,
        min: RenderStage,
        max: RenderStage,
    },
}
