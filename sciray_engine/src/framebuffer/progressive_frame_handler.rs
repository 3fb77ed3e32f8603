/// ProgressiveFrameHandler - fast low-resolution preview, then full resolution
///
/// Two static handlers share the configuration: `low` renders at
/// `frame_size / scale`, `high` at `frame_size`. Within one accumulation
/// cycle the first pass goes to `low`; every later pass goes to `high`.
/// Readback shows `high` as soon as it holds a pass, `low` before that.
/// `clear()` restarts the cycle at low resolution.

use glam::UVec2;
use crate::device::{Device, ObjectHandle, PixelFormat};
use crate::engine_err;
use crate::error::Result;
use crate::framebuffer::frame_handler::{check_frame_size, FrameHandler};
use crate::framebuffer::image::Image;
use crate::framebuffer::static_frame_handler::StaticFrameHandler;
use crate::log::SharedLogger;

pub const DEFAULT_PROGRESSIVE_SCALE: u32 = 4;

pub struct ProgressiveFrameHandler {
    low: StaticFrameHandler,
    high: StaticFrameHandler,
    scale: u32,
}

impl ProgressiveFrameHandler {
    /// 800x600 at full resolution, 200x150 preview
    pub fn new(logger: SharedLogger) -> Self {
        let mut low = StaticFrameHandler::new(logger.clone());
        let high = StaticFrameHandler::new(logger);
        low.set_frame_size(high.frame_size() / DEFAULT_PROGRESSIVE_SCALE)
            .expect("default preview size is valid");
        Self { low, high, scale: DEFAULT_PROGRESSIVE_SCALE }
    }

    /// Fails with InvalidArgument for 0 or if the current frame size divided
    /// by `scale` falls below the minimum
    pub fn with_scale(scale: u32, logger: SharedLogger) -> Result<Self> {
        let mut handler = Self::new(logger);
        handler.set_scale(scale)?;
        Ok(handler)
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Fails with InvalidArgument for 0 or if the low-resolution frame size
    /// falls below the minimum. Nothing changes on failure.
    pub fn set_scale(&mut self, scale: u32) -> Result<()> {
        if scale == 0 {
            return Err(engine_err!("sciray::ProgressiveFrameHandler", InvalidArgument =>
                "Progressive scale must be at least 1"));
        }
        self.low.set_frame_size(self.high.frame_size() / scale)?;
        self.scale = scale;
        Ok(())
    }

    /// Resolution of the preview pass
    pub fn low_resolution_size(&self) -> UVec2 {
        self.low.frame_size()
    }

    /// Whether the next pass is the low-resolution preview
    pub fn is_preview_pass(&self) -> bool {
        self.low.accum_frame_count() == 0
    }

    fn render_target(&self) -> &StaticFrameHandler {
        if self.is_preview_pass() { &self.low } else { &self.high }
    }

    fn render_target_mut(&mut self) -> &mut StaticFrameHandler {
        if self.is_preview_pass() { &mut self.low } else { &mut self.high }
    }

    fn readback(&self) -> &StaticFrameHandler {
        if self.high.accum_frame_count() > 0 { &self.high } else { &self.low }
    }

    fn readback_mut(&mut self) -> &mut StaticFrameHandler {
        if self.high.accum_frame_count() > 0 { &mut self.high } else { &mut self.low }
    }
}

impl FrameHandler for ProgressiveFrameHandler {
    fn set_frame_size(&mut self, size: UVec2) -> Result<()> {
        check_frame_size(size)?;
        self.low.set_frame_size(size / self.scale)?;
        self.high.set_frame_size(size)
    }

    fn frame_size(&self) -> UVec2 {
        self.high.frame_size()
    }

    fn set_accumulation(&mut self, enabled: bool) {
        self.low.set_accumulation(enabled);
        self.high.set_accumulation(enabled);
    }

    fn is_accumulating(&self) -> bool {
        self.high.is_accumulating()
    }

    fn set_format(&mut self, format: PixelFormat) {
        self.low.set_format(format);
        self.high.set_format(format);
    }

    fn format(&self) -> PixelFormat {
        self.high.format()
    }

    fn set_tone_mapping(&mut self, enabled: bool) {
        self.low.set_tone_mapping(enabled);
        self.high.set_tone_mapping(enabled);
    }

    fn is_tone_mapping(&self) -> bool {
        self.high.is_tone_mapping()
    }

    fn is_modified(&self) -> bool {
        self.low.is_modified() || self.high.is_modified()
    }

    fn commit(&mut self, device: &mut dyn Device) -> Result<bool> {
        let low = self.low.commit(device)?;
        let high = self.high.commit(device)?;
        if low != high {
            // Both resolutions restart together
            self.clear(device)?;
        }
        Ok(low || high)
    }

    fn clear(&mut self, device: &mut dyn Device) -> Result<()> {
        self.low.clear(device)?;
        self.high.clear(device)
    }

    fn handle(&self) -> Option<ObjectHandle> {
        self.render_target().handle()
    }

    fn increment_accum_frames(&mut self) {
        self.render_target_mut().increment_accum_frames();
    }

    fn accum_frame_count(&self) -> u32 {
        self.readback().accum_frame_count()
    }

    fn is_showing_preview(&self) -> bool {
        self.high.accum_frame_count() == 0
    }

    fn has_new_accumulation_frame(&self) -> bool {
        self.low.has_new_accumulation_frame() || self.high.has_new_accumulation_frame()
    }

    fn reset_new_accumulation_frame(&mut self) {
        self.low.reset_new_accumulation_frame();
        self.high.reset_new_accumulation_frame();
    }

    fn map(&mut self, device: &mut dyn Device) -> Result<()> {
        self.readback_mut().map(device)
    }

    fn unmap(&mut self, device: &mut dyn Device) -> Result<()> {
        self.low.unmap(device)?;
        self.high.unmap(device)
    }

    fn color_buffer(&self) -> Result<&[u8]> {
        if self.high.is_mapped() {
            return self.high.color_buffer();
        }
        self.low.color_buffer()
    }

    fn image(&mut self, device: &mut dyn Device) -> Result<Image> {
        self.readback_mut().image(device)
    }

    fn release(&mut self, device: &mut dyn Device) {
        self.low.release(device);
        self.high.release(device);
    }
}

#[cfg(test)]
#[path = "progressive_frame_handler_tests.rs"]
mod tests;
