//! Per-frame state shared by every pass recorded into a frame

use glam::UVec2;

use crate::render_graph::{RenderGraph, TextureDescriptor, TextureFormat, TextureHandle, TextureUsage};

/// Number of deferred attribute buffers exposed to passes.
pub const GBUFFER_SLOT_COUNT: usize = 4;

/// Slot holding albedo and material occlusion.
pub const GBUFFER_ALBEDO: usize = 0;
/// Slot holding specular color and metallic.
pub const GBUFFER_SPECULAR_METALLIC: usize = 1;
/// Slot holding the packed world normal and perceptual roughness.
pub const GBUFFER_NORMAL_ROUGHNESS: usize = 2;
/// Slot holding emission and baked lighting.
pub const GBUFFER_EMISSION: usize = 3;

const GBUFFER_NAMES: [&str; GBUFFER_SLOT_COUNT] =
    ["_GBuffer0", "_GBuffer1", "_GBuffer2", "_GBuffer3"];

/// Camera state for the frame.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraData {
    pub name: String,
    /// Descriptor of the camera's color target, including its depth bits.
    pub target_descriptor: TextureDescriptor,
}

impl CameraData {
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            target_descriptor: TextureDescriptor::new_2d(
                width,
                height,
                TextureFormat::Rgba16Float,
                TextureUsage::RENDER_ATTACHMENT | TextureUsage::TEXTURE_BINDING,
            )
            .with_depth_bits(24),
        }
    }

    /// Active viewport size in pixels.
    pub fn viewport(&self) -> UVec2 {
        UVec2::new(self.target_descriptor.width, self.target_descriptor.height)
    }
}

/// Resource handles shared by the passes of one frame.
///
/// `camera_color` is the single "current color" slot. A pass that replaces
/// it does so once, after all of its nodes were added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameResources {
    pub camera_color: TextureHandle,
    pub back_buffer: TextureHandle,
    /// True when `camera_color` is the surface about to be presented.
    pub active_target_is_back_buffer: bool,
    pub gbuffer: [TextureHandle; GBUFFER_SLOT_COUNT],
}

impl FrameResources {
    /// Attribute buffer at `slot`, or an invalid handle when the rendering
    /// path has none.
    pub fn gbuffer(&self, slot: usize) -> TextureHandle {
        self.gbuffer
            .get(slot)
            .copied()
            .unwrap_or(TextureHandle::INVALID)
    }
}

/// Everything a pass can see while recording a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameData {
    pub frame_index: u64,
    pub camera: CameraData,
    pub resources: FrameResources,
}

impl FrameData {
    /// Deferred path: an offscreen camera color target plus a full G-buffer.
    pub fn deferred(graph: &mut RenderGraph, frame_index: u64, camera: CameraData) -> Self {
        let mut frame = Self::forward(graph, frame_index, camera);
        let viewport = frame.camera.viewport();
        for (slot, name) in GBUFFER_NAMES.iter().enumerate() {
            frame.resources.gbuffer[slot] = graph.import_texture(
                name,
                TextureDescriptor::new_2d(
                    viewport.x,
                    viewport.y,
                    TextureFormat::Rgba8Unorm,
                    TextureUsage::RENDER_ATTACHMENT | TextureUsage::TEXTURE_BINDING,
                ),
            );
        }
        frame
    }

    /// Forward path: an offscreen camera color target and no attribute
    /// buffers.
    pub fn forward(graph: &mut RenderGraph, frame_index: u64, camera: CameraData) -> Self {
        let back_buffer = import_back_buffer(graph, &camera);
        let color_desc = TextureDescriptor {
            depth_bits: 0,
            ..camera.target_descriptor.clone()
        };
        let camera_color = graph.import_texture("_CameraColorAttachmentA", color_desc);

        Self {
            frame_index,
            camera,
            resources: FrameResources {
                camera_color,
                back_buffer,
                active_target_is_back_buffer: false,
                gbuffer: [TextureHandle::INVALID; GBUFFER_SLOT_COUNT],
            },
        }
    }

    /// Camera renders straight into the back buffer.
    pub fn direct_to_back_buffer(
        graph: &mut RenderGraph,
        frame_index: u64,
        camera: CameraData,
    ) -> Self {
        let back_buffer = import_back_buffer(graph, &camera);
        Self {
            frame_index,
            camera,
            resources: FrameResources {
                camera_color: back_buffer,
                back_buffer,
                active_target_is_back_buffer: true,
                gbuffer: [TextureHandle::INVALID; GBUFFER_SLOT_COUNT],
            },
        }
    }
}

fn import_back_buffer(graph: &mut RenderGraph, camera: &CameraData) -> TextureHandle {
    let viewport = camera.viewport();
    graph.import_texture(
        "_BackBuffer",
        TextureDescriptor::new_2d(
            viewport.x,
            viewport.y,
            TextureFormat::Bgra8UnormSrgb,
            TextureUsage::RENDER_ATTACHMENT,
        ),
    )
}
