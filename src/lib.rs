//! # SSR Render Feature
//!
//! Screen-space reflections as a post-process plugged into a render graph.
//!
//! ## Overview
//!
//! This crate provides:
//! - [`RenderGraph`] - Per-frame graph of raster passes and transient textures
//! - [`Renderer`] - Drives [`RendererFeature`]s and their passes through a frame
//! - [`SsrFeature`] - The reflections feature, in baseline and linear variants
//! - `backend` - Conversions to wgpu types (feature `wgpu-backend`)
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use ssr_render_feature::{
//!     CameraData, FrameData, ReflectionProgram, RenderGraph, Renderer, SsrFeature, SsrSettings,
//! };
//!
//! let program = Arc::new(ReflectionProgram::new("Hidden/ScreenSpaceReflections"));
//! let mut renderer = Renderer::new();
//! renderer.add_feature(SsrFeature::new(SsrSettings::new(program)).unwrap());
//!
//! let mut graph = RenderGraph::new();
//! let mut frame = FrameData::deferred(&mut graph, 0, CameraData::new("main", 1280, 720));
//! let scene_color = frame.resources.camera_color;
//! renderer.record_frame(&mut graph, &mut frame);
//! assert_ne!(frame.resources.camera_color, scene_color);
//! ```

#[cfg(feature = "wgpu-backend")]
pub mod backend;
pub mod error;
pub mod frame;
pub mod pipeline;
pub mod render_graph;
pub mod ssr;

pub use error::{ConfigError, GraphError, GraphResult};
pub use frame::{CameraData, FrameData, FrameResources, GBUFFER_NORMAL_ROUGHNESS};
pub use pipeline::{
    FinalBlitPass, PassQueue, RenderStage, Renderer, RendererFeature, ScriptablePass,
};
pub use render_graph::{
    CompiledGraph, GraphConfig, RasterPass, RenderGraph, RenderGraphExecutor, TextureDescriptor,
    TextureFormat, TextureHandle, TextureUsage,
};
pub use ssr::{ReflectionProgram, ReflectionVariant, SsrFeature, SsrPass, SsrSettings};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log the library version. Call once after installing a logger.
pub fn init() {
    log::info!("SSR render feature v{} initialized", VERSION);
}
