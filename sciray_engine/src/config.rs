/// EngineConfig - startup configuration of the engine and its sessions
///
/// Every field has a default, so a JSON document only needs the keys it
/// changes:
///
/// ```no_run
/// use sciray_engine::sciray::EngineConfig;
///
/// let config = EngineConfig::from_json(r#"{ "frame_size": [1920, 1080], "progressive": true }"#)?;
/// # Ok::<(), sciray_engine::sciray::Error>(())
/// ```

use glam::UVec2;
use serde::{Deserialize, Serialize};
use crate::device::PixelFormat;
use crate::engine_err;
use crate::error::Result;
use crate::framebuffer::check_frame_size;
use crate::framebuffer::DEFAULT_PROGRESSIVE_SCALE;
use crate::log::LogSeverity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Application name, used in logs
    pub app_name: String,

    /// Initial framebuffer size (each dimension >= 64)
    pub frame_size: UVec2,

    /// Color channel format
    pub pixel_format: PixelFormat,

    /// Accumulate samples across frames while the scene is unchanged
    pub accumulation: bool,

    /// Render a low-resolution preview before full resolution
    pub progressive: bool,

    /// Preview resolution divisor (>= 1)
    pub progressive_scale: u32,

    /// Stop rendering once this many passes were accumulated
    pub max_accumulation_frames: u32,

    /// Minimum severity printed by the default logger
    pub log_severity: LogSeverity,

    /// Optional backend modules loaded at device creation
    pub modules: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            app_name: "sciray".to_string(),
            frame_size: UVec2::new(800, 600),
            pixel_format: PixelFormat::Rgba8,
            accumulation: true,
            progressive: false,
            progressive_scale: DEFAULT_PROGRESSIVE_SCALE,
            max_accumulation_frames: 128,
            log_severity: LogSeverity::Info,
            modules: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)
            .map_err(|error| engine_err!("sciray::EngineConfig", Serialization => "Invalid config: {}", error))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Fails with InvalidArgument for a frame size below the minimum, a zero
    /// progressive scale, or a preview resolution below the minimum
    pub fn validate(&self) -> Result<()> {
        check_frame_size(self.frame_size)?;
        if self.progressive_scale == 0 {
            return Err(engine_err!("sciray::EngineConfig", InvalidArgument =>
                "progressive_scale must be at least 1"));
        }
        if self.progressive {
            check_frame_size(self.frame_size / self.progressive_scale)?;
        }
        check_max_accumulation_frames(self.max_accumulation_frames)
    }
}

/// Fails with InvalidArgument for 0
pub(crate) fn check_max_accumulation_frames(frames: u32) -> Result<()> {
    if frames == 0 {
        return Err(engine_err!("sciray::EngineConfig", InvalidArgument =>
            "max_accumulation_frames must be at least 1"));
    }
    Ok(())
}
