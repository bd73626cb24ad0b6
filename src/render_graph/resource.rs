//! Virtual resources for the render graph

/// Handle to a texture registered with a [`RenderGraph`](super::RenderGraph).
///
/// Handles are only meaningful within the frame that produced them. Clearing
/// the graph bumps its generation, so a handle kept across frames is rejected
/// instead of silently pointing at a newer resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl TextureHandle {
    /// Handle returned when the graph refuses an allocation.
    pub const INVALID: Self = Self {
        index: u32::MAX,
        generation: u32::MAX,
    };

    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Whether this handle refers to a resource at all.
    ///
    /// A valid handle can still be stale; use
    /// [`RenderGraph::contains_texture`](super::RenderGraph::contains_texture)
    /// to check it against a specific frame.
    pub fn is_valid(&self) -> bool {
        self.index != u32::MAX
    }

    pub(crate) fn index(self) -> usize {
        self.index as usize
    }
}

impl Default for TextureHandle {
    fn default() -> Self {
        Self::INVALID
    }
}

/// Texture format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    Rgba8Unorm,
    Rgba8UnormSrgb,
    Bgra8Unorm,
    Bgra8UnormSrgb,
    Rgba16Float,
    Rgba32Float,
    Depth32Float,
    Depth24PlusStencil8,
}

impl TextureFormat {
    pub fn is_depth(&self) -> bool {
        matches!(
            self,
            TextureFormat::Depth32Float | TextureFormat::Depth24PlusStencil8
        )
    }

    /// Float formats can hold values above 1.0.
    pub fn is_hdr(&self) -> bool {
        matches!(self, TextureFormat::Rgba16Float | TextureFormat::Rgba32Float)
    }

    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            TextureFormat::Rgba8Unorm
            | TextureFormat::Rgba8UnormSrgb
            | TextureFormat::Bgra8Unorm
            | TextureFormat::Bgra8UnormSrgb
            | TextureFormat::Depth32Float
            | TextureFormat::Depth24PlusStencil8 => 4,
            TextureFormat::Rgba16Float => 8,
            TextureFormat::Rgba32Float => 16,
        }
    }
}

/// Texture usage flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureUsage(u32);

impl TextureUsage {
    pub const COPY_SRC: Self = Self(1 << 0);
    pub const COPY_DST: Self = Self(1 << 1);
    pub const TEXTURE_BINDING: Self = Self(1 << 2);
    pub const STORAGE_BINDING: Self = Self(1 << 3);
    pub const RENDER_ATTACHMENT: Self = Self(1 << 4);

    pub fn contains(&self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    pub fn bits(&self) -> u32 {
        self.0
    }
}

impl std::ops::BitOr for TextureUsage {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

/// Texture descriptor
///
/// `depth_bits` describes an optional depth buffer paired with the color
/// surface. Color-only intermediates keep it at zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureDescriptor {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub depth_bits: u32,
    pub usage: TextureUsage,
}

impl Default for TextureDescriptor {
    fn default() -> Self {
        Self {
            width: 1,
            height: 1,
            format: TextureFormat::Rgba8Unorm,
            depth_bits: 0,
            usage: TextureUsage::TEXTURE_BINDING | TextureUsage::COPY_DST,
        }
    }
}

impl TextureDescriptor {
    /// Create a color-only 2D texture descriptor.
    pub fn new_2d(width: u32, height: u32, format: TextureFormat, usage: TextureUsage) -> Self {
        Self {
            width,
            height,
            format,
            depth_bits: 0,
            usage,
        }
    }

    pub fn with_depth_bits(mut self, depth_bits: u32) -> Self {
        self.depth_bits = depth_bits;
        self
    }

    /// True when either dimension is zero and nothing can be allocated.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Approximate GPU memory footprint, including the depth buffer if any.
    ///
    /// `None` when the size does not fit in a `u64`.
    pub fn size_in_bytes(&self) -> Option<u64> {
        let pixels = u64::from(self.width).checked_mul(u64::from(self.height))?;
        let depth_bytes = u64::from(self.depth_bits).div_ceil(8);
        pixels.checked_mul(u64::from(self.format.bytes_per_pixel()) + depth_bytes)
    }
}

/// Virtual texture resource in the render graph
#[derive(Debug, Clone)]
pub struct VirtualTexture {
    pub handle: TextureHandle,
    pub desc: TextureDescriptor,
    pub name: String,
}

/// Resource type enumeration
#[derive(Debug, Clone)]
pub enum VirtualResource {
    /// Allocated from the frame's transient pool; contents start undefined.
    Transient(VirtualTexture),
    /// Owned outside the graph (camera targets, G-buffer, back buffer).
    Imported(VirtualTexture),
}

impl VirtualResource {
    pub fn handle(&self) -> TextureHandle {
        self.texture().handle
    }

    pub fn name(&self) -> &str {
        &self.texture().name
    }

    pub fn desc(&self) -> &TextureDescriptor {
        &self.texture().desc
    }

    pub fn is_imported(&self) -> bool {
        matches!(self, VirtualResource::Imported(_))
    }

    fn texture(&self) -> &VirtualTexture {
        match self {
            VirtualResource::Transient(t) | VirtualResource::Imported(t) => t,
        }
    }
}

/// How a pass uses a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceUsage {
    /// Sampled in a shader
    TextureRead,
    /// Written as the pass's color attachment
    RenderTarget,
}

/// Resource access declaration for a pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceAccess {
    pub resource: TextureHandle,
    pub usage: ResourceUsage,
}

impl ResourceAccess {
    pub fn is_read(&self) -> bool {
        self.usage == ResourceUsage::TextureRead
    }

    pub fn is_write(&self) -> bool {
        self.usage == ResourceUsage::RenderTarget
    }
}
