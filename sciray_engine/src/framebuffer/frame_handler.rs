/// FrameHandler trait - accumulation state machine over backend framebuffers
///
/// A frame handler owns one or more backend framebuffers and tracks how many
/// passes were accumulated into them. The session drives it in a fixed
/// order every frame:
///
/// 1. `commit()` (recreates the framebuffer if size/format/channels changed)
/// 2. render into `handle()`
/// 3. `increment_accum_frames()`
/// 4. `image()` (or `map()` / `color_buffer()` / `unmap()`)
///
/// Any change that invalidates the accumulated samples must be followed by
/// `clear()`.

use glam::UVec2;
use crate::device::{Device, ObjectHandle, PixelFormat};
use crate::engine_err;
use crate::error::Result;
use crate::framebuffer::image::Image;

/// Smallest accepted framebuffer width and height
pub const MIN_FRAME_SIZE: u32 = 64;

/// Fails with InvalidArgument if either dimension is below `MIN_FRAME_SIZE`
pub fn check_frame_size(size: UVec2) -> Result<()> {
    if size.x < MIN_FRAME_SIZE || size.y < MIN_FRAME_SIZE {
        return Err(engine_err!("sciray::FrameHandler", InvalidArgument =>
            "Frame size must be at least {}x{}, got {}x{}",
            MIN_FRAME_SIZE, MIN_FRAME_SIZE, size.x, size.y));
    }
    Ok(())
}

pub trait FrameHandler: Send {
    /// Fails with InvalidArgument below `MIN_FRAME_SIZE` in either dimension
    fn set_frame_size(&mut self, size: UVec2) -> Result<()>;

    fn frame_size(&self) -> UVec2;

    /// Enable the accumulation channel (takes effect at the next commit)
    fn set_accumulation(&mut self, enabled: bool);

    fn is_accumulating(&self) -> bool;

    fn set_format(&mut self, format: PixelFormat);

    fn format(&self) -> PixelFormat;

    /// Attach a tone-mapping image operation (takes effect at the next commit)
    fn set_tone_mapping(&mut self, enabled: bool);

    fn is_tone_mapping(&self) -> bool;

    /// Whether the next `commit()` will recreate backend framebuffers
    fn is_modified(&self) -> bool;

    /// Recreate the backend framebuffer(s) if modified.
    ///
    /// Returns true if anything was recreated. Accumulation is always
    /// cleared after a recreation.
    fn commit(&mut self, device: &mut dyn Device) -> Result<bool>;

    /// Restart accumulation from zero
    fn clear(&mut self, device: &mut dyn Device) -> Result<()>;

    /// Framebuffer the next render pass must target (None before the first commit)
    fn handle(&self) -> Option<ObjectHandle>;

    /// Count one completed render pass
    fn increment_accum_frames(&mut self);

    /// Passes accumulated into the framebuffer read back by `image()`
    fn accum_frame_count(&self) -> u32;

    /// Whether `image()` still reads back a reduced-resolution preview
    fn is_showing_preview(&self) -> bool {
        false
    }

    /// Whether a pass was accumulated since `reset_new_accumulation_frame()`
    fn has_new_accumulation_frame(&self) -> bool;

    fn reset_new_accumulation_frame(&mut self);

    /// Map the color channel of the framebuffer read back by `image()`
    fn map(&mut self, device: &mut dyn Device) -> Result<()>;

    /// Close the current mapping (no-op if nothing is mapped)
    fn unmap(&mut self, device: &mut dyn Device) -> Result<()>;

    /// Color channel of the current mapping.
    ///
    /// Fails if `map()` was not called.
    fn color_buffer(&self) -> Result<&[u8]>;

    /// Read back the color channel as a top-down `Image`
    fn image(&mut self, device: &mut dyn Device) -> Result<Image>;

    /// Release every backend framebuffer
    fn release(&mut self, device: &mut dyn Device);
}
