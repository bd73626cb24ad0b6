//! Conversions from render graph types to wgpu

use crate::render_graph::{TextureDescriptor, TextureFormat, TextureUsage};

impl From<TextureFormat> for wgpu::TextureFormat {
    fn from(format: TextureFormat) -> Self {
        match format {
            TextureFormat::Rgba8Unorm => wgpu::TextureFormat::Rgba8Unorm,
            TextureFormat::Rgba8UnormSrgb => wgpu::TextureFormat::Rgba8UnormSrgb,
            TextureFormat::Bgra8Unorm => wgpu::TextureFormat::Bgra8Unorm,
            TextureFormat::Bgra8UnormSrgb => wgpu::TextureFormat::Bgra8UnormSrgb,
            TextureFormat::Rgba16Float => wgpu::TextureFormat::Rgba16Float,
            TextureFormat::Rgba32Float => wgpu::TextureFormat::Rgba32Float,
            TextureFormat::Depth32Float => wgpu::TextureFormat::Depth32Float,
            TextureFormat::Depth24PlusStencil8 => wgpu::TextureFormat::Depth24PlusStencil8,
        }
    }
}

impl From<TextureUsage> for wgpu::TextureUsages {
    fn from(usage: TextureUsage) -> Self {
        let mut result = wgpu::TextureUsages::empty();
        if usage.contains(TextureUsage::COPY_SRC) {
            result |= wgpu::TextureUsages::COPY_SRC;
        }
        if usage.contains(TextureUsage::COPY_DST) {
            result |= wgpu::TextureUsages::COPY_DST;
        }
        if usage.contains(TextureUsage::TEXTURE_BINDING) {
            result |= wgpu::TextureUsages::TEXTURE_BINDING;
        }
        if usage.contains(TextureUsage::STORAGE_BINDING) {
            result |= wgpu::TextureUsages::STORAGE_BINDING;
        }
        if usage.contains(TextureUsage::RENDER_ATTACHMENT) {
            result |= wgpu::TextureUsages::RENDER_ATTACHMENT;
        }
        result
    }
}

/// Single-mip 2D descriptor for allocating a graph texture on a wgpu device.
///
/// `depth_bits` is not part of the color texture; hosts that need a depth
/// target allocate it separately.
pub fn texture_descriptor<'a>(
    desc: &TextureDescriptor,
    label: Option<&'a str>,
) -> wgpu::TextureDescriptor<'a> {
    wgpu::TextureDescriptor {
        label,
        size: wgpu::Extent3d {
            width: desc.width,
            height: desc.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: desc.format.into(),
        usage: desc.usage.into(),
        view_formats: &[],
    }
}
