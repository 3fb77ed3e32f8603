/// Framebuffer - pixel memory of the CPU device
///
/// Rows are stored bottom-up. Accumulating framebuffers keep the running
/// sum of every pass; the color channel is the sum divided by the pass
/// count, converted to the framebuffer format at `map()` time.

use glam::Vec4;
use sciray_engine::sciray::device::{FramebufferChannels, FramebufferDesc, PixelFormat};

pub(crate) struct CpuFramebuffer {
    desc: FramebufferDesc,
    /// Sum of every accumulated sample (or the last sample without accumulation)
    accumulation: Vec<Vec4>,
    /// Hit distance of the last pass, `f32::INFINITY` on miss
    depth: Vec<f32>,
    frames: u32,
    tone_mapping: bool,
    pub(crate) mapped: bool,
}

impl CpuFramebuffer {
    pub(crate) fn new(desc: FramebufferDesc, tone_mapping: bool) -> Self {
        let pixels = desc.width as usize * desc.height as usize;
        let depth = if desc.channels.contains(FramebufferChannels::DEPTH) {
            vec![f32::INFINITY; pixels]
        } else {
            Vec::new()
        };
        Self {
            desc,
            accumulation: vec![Vec4::ZERO; pixels],
            depth,
            frames: 0,
            tone_mapping,
            mapped: false,
        }
    }

    pub(crate) fn desc(&self) -> &FramebufferDesc {
        &self.desc
    }

    pub(crate) fn frames(&self) -> u32 {
        self.frames
    }

    pub(crate) fn is_accumulating(&self) -> bool {
        self.desc.channels.contains(FramebufferChannels::ACCUMULATION)
    }

    pub(crate) fn reset(&mut self) {
        self.accumulation.fill(Vec4::ZERO);
        self.depth.fill(f32::INFINITY);
        self.frames = 0;
    }

    /// Store one pass. `samples` and `depth` hold one entry per pixel.
    pub(crate) fn add_pass(&mut self, samples: &[Vec4], depth: &[f32]) {
        if self.is_accumulating() {
            for (sum, sample) in self.accumulation.iter_mut().zip(samples) {
                *sum += *sample;
            }
            self.frames += 1;
        } else {
            self.accumulation.copy_from_slice(samples);
            self.frames = 1;
        }
        if !self.depth.is_empty() {
            self.depth.copy_from_slice(depth);
        }
    }

    /// Averaged color of every pixel, after image operations
    pub(crate) fn colors(&self) -> Vec<Vec4> {
        let scale = if self.frames == 0 { 0.0 } else { 1.0 / self.frames as f32 };
        self.accumulation.iter()
            .map(|sum| {
                let color = *sum * scale;
                if self.tone_mapping {
                    // Reinhard on RGB, alpha untouched
                    let rgb = color.truncate();
                    (rgb / (rgb + 1.0)).extend(color.w)
                } else {
                    color
                }
            })
            .collect()
    }

    /// Color channel bytes in the framebuffer format
    pub(crate) fn color_bytes(&self) -> Vec<u8> {
        let colors = self.colors();
        match self.desc.format {
            PixelFormat::Rgba32F => bytemuck::cast_slice::<Vec4, u8>(&colors).to_vec(),
            PixelFormat::Rgba8 => colors.iter()
                .flat_map(|color| color.to_array().map(unorm8))
                .collect(),
            PixelFormat::SRgba8 => colors.iter()
                .flat_map(|color| {
                    let [r, g, b, a] = color.to_array();
                    [unorm8(linear_to_srgb(r)), unorm8(linear_to_srgb(g)), unorm8(linear_to_srgb(b)), unorm8(a)]
                })
                .collect(),
        }
    }

    /// Depth channel bytes (f32 per pixel), None without depth channel
    pub(crate) fn depth_bytes(&self) -> Option<Vec<u8>> {
        if self.depth.is_empty() {
            return None;
        }
        Some(bytemuck::cast_slice::<f32, u8>(&self.depth).to_vec())
    }
}

fn unorm8(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn linear_to_srgb(value: f32) -> f32 {
    let value = value.clamp(0.0, 1.0);
    if value <= 0.003_130_8 {
        value * 12.92
    } else {
        1.055 * value.powf(1.0 / 2.4) - 0.055
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn framebuffer(format: PixelFormat, channels: FramebufferChannels) -> CpuFramebuffer {
        CpuFramebuffer::new(FramebufferDesc {
            width: 2,
            height: 1,
            format,
            channels,
            operations: Vec::new(),
        }, false)
    }

    fn accumulating() -> FramebufferChannels {
        FramebufferChannels::COLOR | FramebufferChannels::ACCUMULATION
    }

    #[test]
    fn test_accumulation_averages_passes() {
        let mut framebuffer = framebuffer(PixelFormat::Rgba32F, accumulating());
        framebuffer.add_pass(&[Vec4::ONE, Vec4::ZERO], &[]);
        framebuffer.add_pass(&[Vec4::ZERO, Vec4::ZERO], &[]);
        assert_eq!(framebuffer.frames(), 2);
        assert_eq!(framebuffer.colors()[0], Vec4::splat(0.5));

        framebuffer.reset();
        assert_eq!(framebuffer.frames(), 0);
        assert_eq!(framebuffer.colors()[0], Vec4::ZERO);
    }

    #[test]
    fn test_without_accumulation_keeps_last_pass() {
        let mut framebuffer = framebuffer(PixelFormat::Rgba32F, FramebufferChannels::COLOR);
        framebuffer.add_pass(&[Vec4::ONE, Vec4::ONE], &[]);
        framebuffer.add_pass(&[Vec4::splat(0.25), Vec4::ONE], &[]);
        assert_eq!(framebuffer.frames(), 1);
        assert_eq!(framebuffer.colors()[0], Vec4::splat(0.25));
    }

    #[test]
    fn test_color_bytes_per_format() {
        let mut framebuffer = framebuffer(PixelFormat::Rgba8, accumulating());
        framebuffer.add_pass(&[Vec4::new(1.0, 0.5, 0.0, 2.0), Vec4::ZERO], &[]);
        assert_eq!(&framebuffer.color_bytes()[..4], &[255, 128, 0, 255]);

        let mut framebuffer = self::framebuffer(PixelFormat::SRgba8, accumulating());
        framebuffer.add_pass(&[Vec4::new(0.5, 0.0, 1.0, 0.5), Vec4::ZERO], &[]);
        assert_eq!(&framebuffer.color_bytes()[..4], &[188, 0, 255, 128]);

        let mut framebuffer = self::framebuffer(PixelFormat::Rgba32F, accumulating());
        framebuffer.add_pass(&[Vec4::new(0.25, 0.0, 0.0, 1.0), Vec4::ZERO], &[]);
        let bytes = framebuffer.color_bytes();
        assert_eq!(bytes.len(), 2 * 16);
        assert_eq!(f32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]), 0.25);
    }

    #[test]
    fn test_tone_mapping_compresses_rgb() {
        let desc = FramebufferDesc {
            width: 1,
            height: 1,
            format: PixelFormat::Rgba32F,
            channels: FramebufferChannels::COLOR,
            operations: Vec::new(),
        };
        let mut framebuffer = CpuFramebuffer::new(desc, true);
        framebuffer.add_pass(&[Vec4::new(1.0, 3.0, 0.0, 1.0)], &[]);
        assert_eq!(framebuffer.colors()[0], Vec4::new(0.5, 0.75, 0.0, 1.0));
    }

    #[test]
    fn test_depth_channel_optional() {
        let mut framebuffer = framebuffer(PixelFormat::Rgba8, FramebufferChannels::COLOR);
        framebuffer.add_pass(&[Vec4::ZERO, Vec4::ZERO], &[1.0, 2.0]);
        assert!(framebuffer.depth_bytes().is_none());

        let mut framebuffer = self::framebuffer(PixelFormat::Rgba8, FramebufferChannels::COLOR | FramebufferChannels::DEPTH);
        framebuffer.add_pass(&[Vec4::ZERO, Vec4::ZERO], &[1.0, 2.0]);
        assert_eq!(framebuffer.depth_bytes().unwrap().len(), 8);
    }
}
