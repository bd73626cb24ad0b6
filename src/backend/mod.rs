//! GPU backend glue
//!
//! Only the type conversions live here; device ownership belongs to the
//! host application.

mod wgpu_conversion;

pub use wgpu_conversion::texture_descriptor;
