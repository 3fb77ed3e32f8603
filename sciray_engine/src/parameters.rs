/// Parameters shared by the whole pipeline
///
/// `ParametersManager` is the first thing mutated by incoming requests in a
/// frame. Every group carries its own `ModifiedFlag` so the session knows
/// whether the image must be restarted.

use glam::UVec2;
use crate::engine_err;
use crate::error::Result;
use crate::framebuffer::MIN_FRAME_SIZE;
use crate::modified::{BaseObject, ModifiedFlag};

// ===== ANIMATION =====

/// Simulation playback state
#[derive(Debug, Clone)]
pub struct AnimationParameters {
    start_frame: u32,
    end_frame: u32,
    current_frame: u32,
    /// Simulation time between two frames
    delta: f64,
    flag: ModifiedFlag,
}

impl AnimationParameters {
    pub fn new() -> Self {
        Self {
            start_frame: 0,
            end_frame: 0,
            current_frame: 0,
            delta: 1.0,
            flag: ModifiedFlag::new(),
        }
    }

    pub fn start_frame(&self) -> u32 {
        self.start_frame
    }

    pub fn end_frame(&self) -> u32 {
        self.end_frame
    }

    pub fn current_frame(&self) -> u32 {
        self.current_frame
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// Simulation time of the current frame
    pub fn current_time(&self) -> f64 {
        self.current_frame as f64 * self.delta
    }

    /// Set the playable range. The current frame is clamped into it.
    pub fn set_frame_range(&mut self, start: u32, end: u32) -> Result<()> {
        if start > end {
            return Err(engine_err!("sciray::AnimationParameters", InvalidArgument =>
                "Invalid frame range [{}, {}]", start, end));
        }
        self.flag.update(&mut self.start_frame, start);
        self.flag.update(&mut self.end_frame, end);
        let current = self.current_frame.clamp(start, end);
        self.flag.update(&mut self.current_frame, current);
        Ok(())
    }

    /// Set the current frame, clamped into the playable range
    pub fn set_current_frame(&mut self, frame: u32) {
        let frame = frame.clamp(self.start_frame, self.end_frame);
        self.flag.update(&mut self.current_frame, frame);
    }

    pub fn set_delta(&mut self, delta: f64) -> Result<()> {
        if delta <= 0.0 {
            return Err(engine_err!("sciray::AnimationParameters", InvalidArgument =>
                "Animation delta must be positive, got {}", delta));
        }
        self.flag.update(&mut self.delta, delta);
        Ok(())
    }
}

impl Default for AnimationParameters {
    fn default() -> Self {
        Self::new()
    }
}

impl BaseObject for AnimationParameters {
    fn modified_flag(&self) -> &ModifiedFlag {
        &self.flag
    }
}

// ===== APPLICATION =====

/// Output settings of the application
#[derive(Debug, Clone)]
pub struct ApplicationParameters {
    frame_size: UVec2,
    flag: ModifiedFlag,
}

impl ApplicationParameters {
    pub fn new() -> Self {
        Self {
            frame_size: UVec2::new(800, 600),
            flag: ModifiedFlag::new(),
        }
    }

    pub fn frame_size(&self) -> UVec2 {
        self.frame_size
    }

    /// Fails with InvalidArgument below 64x64
    pub fn set_frame_size(&mut self, size: UVec2) -> Result<()> {
        if size.x < MIN_FRAME_SIZE || size.y < MIN_FRAME_SIZE {
            return Err(engine_err!("sciray::ApplicationParameters", InvalidArgument =>
                "Frame size must be at least {}x{}, got {}x{}",
                MIN_FRAME_SIZE, MIN_FRAME_SIZE, size.x, size.y));
        }
        self.flag.update(&mut self.frame_size, size);
        Ok(())
    }
}

impl Default for ApplicationParameters {
    fn default() -> Self {
        Self::new()
    }
}

impl BaseObject for ApplicationParameters {
    fn modified_flag(&self) -> &ModifiedFlag {
        &self.flag
    }
}

// ===== MANAGER =====

#[derive(Debug, Clone, Default)]
pub struct ParametersManager {
    animation: AnimationParameters,
    application: ApplicationParameters,
}

impl ParametersManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn animation(&self) -> &AnimationParameters {
        &self.animation
    }

    pub fn animation_mut(&mut self) -> &mut AnimationParameters {
        &mut self.animation
    }

    pub fn application(&self) -> &ApplicationParameters {
        &self.application
    }

    pub fn application_mut(&mut self) -> &mut ApplicationParameters {
        &mut self.application
    }

    /// Whether any parameter group changed since the last reset
    pub fn is_modified(&self) -> bool {
        self.animation.is_modified() || self.application.is_modified()
    }

    pub fn reset_modified(&self) {
        self.animation.reset_modified();
        self.application.reset_modified();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_defaults() {
        let parameters = ParametersManager::new();
        assert_eq!(parameters.application().frame_size(), UVec2::new(800, 600));
        assert_eq!(parameters.animation().current_frame(), 0);
        assert!(parameters.is_modified());
    }

    #[test]
    fn test_frame_size_validation() {
        let mut parameters = ParametersManager::new();
        parameters.reset_modified();

        let result = parameters.application_mut().set_frame_size(UVec2::new(63, 600));
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
        assert!(!parameters.is_modified());

        parameters.application_mut().set_frame_size(UVec2::new(64, 64)).unwrap();
        assert_eq!(parameters.application().frame_size(), UVec2::new(64, 64));
        assert!(parameters.is_modified());
    }

    #[test]
    fn test_current_frame_clamped_to_range() {
        let mut animation = AnimationParameters::new();
        animation.set_frame_range(10, 20).unwrap();
        assert_eq!(animation.current_frame(), 10);

        animation.set_current_frame(50);
        assert_eq!(animation.current_frame(), 20);

        animation.set_delta(0.5).unwrap();
        assert_eq!(animation.current_time(), 10.0);
    }

    #[test]
    fn test_invalid_range_and_delta() {
        let mut animation = AnimationParameters::new();
        assert!(matches!(animation.set_frame_range(5, 1), Err(Error::InvalidArgument(_))));
        assert!(matches!(animation.set_delta(0.0), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_same_frame_does_not_mark() {
        let mut animation = AnimationParameters::new();
        animation.set_frame_range(0, 10).unwrap();
        animation.set_current_frame(3);
        animation.reset_modified();

        animation.set_current_frame(3);
        assert!(!animation.is_modified());
    }
}
