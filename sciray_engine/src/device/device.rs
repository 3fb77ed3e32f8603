/// Device trait - the ray-tracing backend as seen by the engine core
///
/// The core never depends on which library implements the device. Every
/// backend object (camera, light, material, renderer, geometry, group,
/// instance, world, framebuffer) is addressed through an opaque
/// `ObjectHandle` and configured through named parameters, then committed.

use std::time::Duration;
use bitflags::bitflags;
use glam::{Mat4, Quat, UVec2, Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use crate::error::Result;

// ===== HANDLES =====

new_key_type! {
    /// Stable handle of a backend object.
    ///
    /// Handles remain valid until the object is released.
    pub struct ObjectHandle;
}

/// Category of a backend object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Camera,
    Light,
    Material,
    Renderer,
    Geometry,
    /// Geometry + material/color binding
    GeometricModel,
    /// Set of geometric models and lights shared by every instance of a model
    Group,
    /// Placement (transform) of a group in the world
    Instance,
    World,
    /// Framebuffer post-processing stage (tone mapping, etc.)
    ImageOperation,
    Framebuffer,
}

// ===== PARAMETERS =====

/// A typed parameter value pushed to a backend object
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Bool(bool),
    Int(i32),
    UInt(u32),
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    UVec2(UVec2),
    Quat(Quat),
    Mat4(Mat4),
    String(String),
    Object(ObjectHandle),
    ObjectList(Vec<ObjectHandle>),
    FloatArray(Vec<f32>),
    UIntArray(Vec<u32>),
    Vec3Array(Vec<Vec3>),
    Vec4Array(Vec<Vec4>),
}

// ===== FRAMEBUFFER =====

/// Pixel format of the color channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PixelFormat {
    /// 8 bits per channel, linear
    #[default]
    #[serde(rename = "rgba8")]
    Rgba8,
    /// 8 bits per channel, sRGB encoded
    #[serde(rename = "srgba8")]
    SRgba8,
    /// 32-bit float per channel
    #[serde(rename = "rgba32f")]
    Rgba32F,
}

impl PixelFormat {
    /// Size in bytes of one channel of one pixel
    pub fn channel_size(&self) -> usize {
        match self {
            PixelFormat::Rgba8 | PixelFormat::SRgba8 => 1,
            PixelFormat::Rgba32F => 4,
        }
    }

    /// Size in bytes of one RGBA pixel
    pub fn pixel_size(&self) -> usize {
        self.channel_size() * 4
    }
}

crate::impl_exact_eq!(PixelFormat);

bitflags! {
    /// Framebuffer channels allocated by the backend
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FramebufferChannels: u32 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
        const ACCUMULATION = 1 << 2;
        const VARIANCE = 1 << 3;
    }
}

/// Descriptor for creating a backend framebuffer
#[derive(Debug, Clone, PartialEq)]
pub struct FramebufferDesc {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Color channel format
    pub format: PixelFormat,
    /// Allocated channels (color always)
    pub channels: FramebufferChannels,
    /// Post-processing image operations, applied in order
    pub operations: Vec<ObjectHandle>,
}

// ===== RENDERING =====

/// Everything the backend needs to render one pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderRequest {
    pub framebuffer: ObjectHandle,
    pub renderer: ObjectHandle,
    pub camera: ObjectHandle,
    pub world: ObjectHandle,
}

/// Result of a render pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderTask {
    duration: Duration,
    progress: f32,
}

impl RenderTask {
    pub fn new(duration: Duration, progress: f32) -> Self {
        Self { duration, progress }
    }

    /// Block until the pass is done and return how long it took
    pub fn wait_and_get_duration(&self) -> Duration {
        self.duration
    }

    /// Completion ratio in [0, 1]
    pub fn progress(&self) -> f32 {
        self.progress
    }
}

// ============================================================================
// Device trait
// ============================================================================

/// Ray-tracing backend.
///
/// Implemented by backend crates (e.g. `sciray_device_cpu`). A single device
/// exists per process and is only touched from the render thread.
pub trait Device: Send {
    /// Create a backend object
    ///
    /// # Arguments
    ///
    /// * `kind` - Object category
    /// * `subtype` - Backend type name within the category (e.g. "perspective", "sphere")
    fn create_object(&mut self, kind: ObjectKind, subtype: &str) -> Result<ObjectHandle>;

    /// Set a named parameter on an object (takes effect at the next commit)
    fn set_param(&mut self, handle: ObjectHandle, name: &str, value: ParamValue) -> Result<()>;

    /// Remove a named parameter from an object
    fn remove_param(&mut self, handle: ObjectHandle, name: &str) -> Result<()>;

    /// Apply all pending parameter changes of an object
    fn commit(&mut self, handle: ObjectHandle) -> Result<()>;

    /// Release an object. Unknown handles are ignored.
    fn release(&mut self, handle: ObjectHandle);

    /// Create a framebuffer with its pixel storage
    fn create_framebuffer(&mut self, desc: &FramebufferDesc) -> Result<ObjectHandle>;

    /// Discard the accumulated samples of a framebuffer
    fn reset_accumulation(&mut self, framebuffer: ObjectHandle) -> Result<()>;

    /// Render one pass into the request's framebuffer
    fn render(&mut self, request: &RenderRequest) -> Result<RenderTask>;

    /// Map a framebuffer channel and return its content.
    ///
    /// The mapping stays open until `unmap()`.
    fn map(&mut self, framebuffer: ObjectHandle, channel: FramebufferChannels) -> Result<Vec<u8>>;

    /// Close the mapping opened by `map()`
    fn unmap(&mut self, framebuffer: ObjectHandle) -> Result<()>;

    /// Load an optional backend module (extra geometry/renderer types)
    fn load_module(&mut self, name: &str) -> Result<()>;
}
