//! Render Graph System
//!
//! A declarative system for describing a frame's GPU work as a directed
//! acyclic graph. Passes declare which textures they sample and which one
//! they render into; the graph infers ordering from those declarations,
//! hands out per-frame transient textures, and runs each pass's deferred
//! render function once compilation is done.

pub mod executor;
pub mod graph;
pub mod pass;
pub mod resource;

pub use executor::*;
pub use graph::*;
pub use pass::*;
pub use resource::*;
