/// Self-contained copy of a framebuffer color channel
///
/// Rows are stored top to bottom (the backend produces bottom-up rows,
/// `FrameHandler::image` flips them).

use crate::device::PixelFormat;
use crate::engine_err;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    width: u32,
    height: u32,
    channels: usize,
    channel_size: usize,
    data: Vec<u8>,
}

impl Image {
    /// Wrap RGBA pixels of `format`.
    ///
    /// Fails with InvalidArgument if `data` does not hold exactly
    /// `width * height` pixels.
    pub fn new(width: u32, height: u32, format: PixelFormat, data: Vec<u8>) -> Result<Self> {
        let image = Self {
            width,
            height,
            channels: 4,
            channel_size: format.channel_size(),
            data,
        };
        let expected = image.row_size() * height as usize;
        if image.data.len() != expected {
            return Err(engine_err!("sciray::Image", InvalidArgument =>
                "Image data holds {} bytes, expected {} for {}x{}", image.data.len(), expected, width, height));
        }
        Ok(image)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Channels per pixel (always 4, RGBA)
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Bytes per channel
    pub fn channel_size(&self) -> usize {
        self.channel_size
    }

    pub fn pixel_size(&self) -> usize {
        self.channels * self.channel_size
    }

    pub fn row_size(&self) -> usize {
        self.width as usize * self.pixel_size()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes of row `y`
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.row_size();
        &self.data[start..start + self.row_size()]
    }

    /// Bytes of pixel (x, y)
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let start = y as usize * self.row_size() + x as usize * self.pixel_size();
        &self.data[start..start + self.pixel_size()]
    }

    /// Swap rows top to bottom in place
    pub fn flip_vertical(&mut self) {
        let row_size = self.row_size();
        let height = self.height as usize;
        for y in 0..height / 2 {
            let (top, bottom) = self.data.split_at_mut((height - 1 - y) * row_size);
            top[y * row_size..(y + 1) * row_size].swap_with_slice(&mut bottom[..row_size]);
        }
    }
}
