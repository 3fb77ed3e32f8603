/// StaticFrameHandler - a single backend framebuffer at full resolution

use glam::UVec2;
use crate::device::{Device, FramebufferChannels, FramebufferDesc, ObjectHandle, ObjectKind, PixelFormat};
use crate::engine_debug;
use crate::engine_err;
use crate::error::Result;
use crate::framebuffer::frame_handler::{check_frame_size, FrameHandler};
use crate::framebuffer::image::Image;
use crate::log::SharedLogger;
use crate::modified::ModifiedFlag;

/// Buffer content captured by `map()`
struct Mapping {
    framebuffer: ObjectHandle,
    data: Vec<u8>,
}

pub struct StaticFrameHandler {
    frame_size: UVec2,
    format: PixelFormat,
    accumulation: bool,
    tone_mapping: bool,
    accum_frames: u32,
    new_accumulation_frame: bool,
    framebuffer: Option<ObjectHandle>,
    tone_mapper: Option<ObjectHandle>,
    mapping: Option<Mapping>,
    flag: ModifiedFlag,
    logger: SharedLogger,
}

impl StaticFrameHandler {
    /// 800x600 RGBA8 framebuffer with accumulation
    pub fn new(logger: SharedLogger) -> Self {
        Self {
            frame_size: UVec2::new(800, 600),
            format: PixelFormat::Rgba8,
            accumulation: true,
            tone_mapping: false,
            accum_frames: 0,
            new_accumulation_frame: false,
            framebuffer: None,
            tone_mapper: None,
            mapping: None,
            flag: ModifiedFlag::new(),
            logger,
        }
    }

    /// Backend channels allocated at commit
    pub fn channels(&self) -> FramebufferChannels {
        let mut channels = FramebufferChannels::COLOR | FramebufferChannels::DEPTH;
        if self.accumulation {
            channels |= FramebufferChannels::ACCUMULATION | FramebufferChannels::VARIANCE;
        }
        channels
    }

    pub fn is_mapped(&self) -> bool {
        self.mapping.is_some()
    }

    fn release_backend(&mut self, device: &mut dyn Device) -> Result<()> {
        self.unmap(device)?;
        if let Some(framebuffer) = self.framebuffer.take() {
            device.release(framebuffer);
        }
        if let Some(tone_mapper) = self.tone_mapper.take() {
            device.release(tone_mapper);
        }
        Ok(())
    }
}

impl FrameHandler for StaticFrameHandler {
    fn set_frame_size(&mut self, size: UVec2) -> Result<()> {
        check_frame_size(size)?;
        self.flag.update(&mut self.frame_size, size);
        Ok(())
    }

    fn frame_size(&self) -> UVec2 {
        self.frame_size
    }

    fn set_accumulation(&mut self, enabled: bool) {
        self.flag.update(&mut self.accumulation, enabled);
    }

    fn is_accumulating(&self) -> bool {
        self.accumulation
    }

    fn set_format(&mut self, format: PixelFormat) {
        self.flag.update(&mut self.format, format);
    }

    fn format(&self) -> PixelFormat {
        self.format
    }

    fn set_tone_mapping(&mut self, enabled: bool) {
        self.flag.update(&mut self.tone_mapping, enabled);
    }

    fn is_tone_mapping(&self) -> bool {
        self.tone_mapping
    }

    fn is_modified(&self) -> bool {
        self.flag.is_modified()
    }

    fn commit(&mut self, device: &mut dyn Device) -> Result<bool> {
        if !self.flag.is_modified() {
            return Ok(false);
        }

        self.release_backend(device)?;

        let mut operations = Vec::new();
        if self.tone_mapping {
            let tone_mapper = device.create_object(ObjectKind::ImageOperation, "tonemapper")?;
            self.tone_mapper = Some(tone_mapper);
            device.commit(tone_mapper)?;
            operations.push(tone_mapper);
        }

        let desc = FramebufferDesc {
            width: self.frame_size.x,
            height: self.frame_size.y,
            format: self.format,
            channels: self.channels(),
            operations,
        };
        let framebuffer = device.create_framebuffer(&desc)?;
        self.framebuffer = Some(framebuffer);
        device.commit(framebuffer)?;

        self.clear(device)?;
        self.flag.reset_modified();

        engine_debug!(self.logger, "sciray::StaticFrameHandler",
            "Framebuffer recreated ({}x{}, {:?}, accumulation: {})",
            desc.width, desc.height, desc.format, self.accumulation);
        Ok(true)
    }

    fn clear(&mut self, device: &mut dyn Device) -> Result<()> {
        self.accum_frames = 0;
        self.new_accumulation_frame = false;
        if let Some(framebuffer) = self.framebuffer {
            device.reset_accumulation(framebuffer)?;
        }
        Ok(())
    }

    fn handle(&self) -> Option<ObjectHandle> {
        self.framebuffer
    }

    fn increment_accum_frames(&mut self) {
        self.accum_frames += 1;
        self.new_accumulation_frame = true;
    }

    fn accum_frame_count(&self) -> u32 {
        self.accum_frames
    }

    fn has_new_accumulation_frame(&self) -> bool {
        self.new_accumulation_frame
    }

    fn reset_new_accumulation_frame(&mut self) {
        self.new_accumulation_frame = false;
    }

    fn map(&mut self, device: &mut dyn Device) -> Result<()> {
        let framebuffer = self.framebuffer
            .ok_or_else(|| engine_err!("sciray::StaticFrameHandler", "Cannot map a framebuffer before commit"))?;
        if self.mapping.is_some() {
            return Err(engine_err!("sciray::StaticFrameHandler", "Framebuffer already mapped"));
        }
        let data = device.map(framebuffer, FramebufferChannels::COLOR)?;
        self.mapping = Some(Mapping { framebuffer, data });
        Ok(())
    }

    fn unmap(&mut self, device: &mut dyn Device) -> Result<()> {
        match self.mapping.take() {
            Some(mapping) => device.unmap(mapping.framebuffer),
            None => Ok(()),
        }
    }

    fn color_buffer(&self) -> Result<&[u8]> {
        self.mapping
            .as_ref()
            .map(|mapping| mapping.data.as_slice())
            .ok_or_else(|| engine_err!("sciray::StaticFrameHandler", "Color buffer read without an active map()"))
    }

    fn image(&mut self, device: &mut dyn Device) -> Result<Image> {
        let was_mapped = self.mapping.is_some();
        if !was_mapped {
            self.map(device)?;
        }

        let data = self.color_buffer()?.to_vec();
        if !was_mapped {
            self.unmap(device)?;
        }

        let mut image = Image::new(self.frame_size.x, self.frame_size.y, self.format, data)?;
        image.flip_vertical();
        Ok(image)
    }

    fn release(&mut self, device: &mut dyn Device) {
        if let Err(error) = self.release_backend(device) {
            engine_debug!(self.logger, "sciray::StaticFrameHandler", "Release failed: {}", error);
        }
        self.flag.mark_modified();
    }
}

#[cfg(test)]
#[path = "static_frame_handler_tests.rs"]
mod tests;
