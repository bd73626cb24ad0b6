//! Screen-space reflections
//!
//! A [`SsrFeature`] owns the configuration and a single [`SsrPass`]. Each
//! frame the pass adds two nodes to the render graph:
//!
//! - **Raymarch**: scene color + normal/roughness buffer into a raw
//!   reflection estimate
//! - **Composite**: blends the estimate over scene color into a second
//!   target, which becomes the frame's camera color
//!
//! The two [`ReflectionVariant`]s differ in node labels, texture names and
//! the program they are paired with.

pub mod feature;
pub mod params;
pub mod pass;
pub mod program;

pub use feature::{ReflectionVariant, SsrFeature, SsrSettings, SUPPORTED_STAGES};
pub use params::PassData;
pub use pass::{derive_descriptor, RecordOutcome, SkipReason, SsrPass, INTERMEDIATE_FORMAT};
pub use program::{Kernel, KernelKind, ReflectionProgram, GBUFFER2_SLOT};
