/// ColorRamp - transfer function from scalar values to colors

use glam::{Vec2, Vec4};
use serde::{Deserialize, Serialize};
use crate::engine_err;
use crate::error::Result;
use crate::model::Component;
use crate::modified::ModifiedFlag;

/// Colors evenly spread over a value range `[range.x, range.y]`.
///
/// Values outside the range are clamped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorRamp {
    colors: Vec<Vec4>,
    range: Vec2,
    #[serde(skip)]
    flag: ModifiedFlag,
}

fn check_colors(colors: &[Vec4]) -> Result<()> {
    if colors.is_empty() {
        return Err(engine_err!("sciray::ColorRamp", InvalidArgument => "Color ramp needs at least one color"));
    }
    Ok(())
}

fn check_range(range: Vec2) -> Result<()> {
    if !(range.y > range.x) {
        return Err(engine_err!("sciray::ColorRamp", InvalidArgument =>
            "Color ramp range must be positive, got [{}, {}]", range.x, range.y));
    }
    Ok(())
}

impl ColorRamp {
    /// Fails with InvalidArgument for no colors or `range.y <= range.x`
    pub fn new(colors: Vec<Vec4>, range: Vec2) -> Result<Self> {
        check_colors(&colors)?;
        check_range(range)?;
        Ok(Self { colors, range, flag: ModifiedFlag::new() })
    }

    pub fn colors(&self) -> &[Vec4] {
        &self.colors
    }

    pub fn set_colors(&mut self, colors: Vec<Vec4>) -> Result<()> {
        check_colors(&colors)?;
        self.flag.update(&mut self.colors, colors);
        Ok(())
    }

    pub fn range(&self) -> Vec2 {
        self.range
    }

    pub fn set_range(&mut self, range: Vec2) -> Result<()> {
        check_range(range)?;
        self.flag.update(&mut self.range, range);
        Ok(())
    }

    /// Linear interpolation between the two colors bracketing `value`
    pub fn get_color_for_value(&self, value: f32) -> Vec4 {
        let last = self.colors.len() - 1;
        let normalized = ((value - self.range.x) / (self.range.y - self.range.x)).clamp(0.0, 1.0);
        let position = normalized * last as f32;
        let index = position.floor() as usize;
        if index >= last {
            return self.colors[last];
        }
        self.colors[index].lerp(self.colors[index + 1], position - index as f32)
    }

    /// Whether colors or range changed since `reset_modified()`
    pub fn is_modified(&self) -> bool {
        self.flag.is_modified()
    }

    pub fn reset_modified(&self) {
        self.flag.reset_modified();
    }
}

impl Default for ColorRamp {
    /// Blue to red over [0, 1]
    fn default() -> Self {
        Self {
            colors: vec![Vec4::new(0.0, 0.0, 1.0, 1.0), Vec4::new(1.0, 0.0, 0.0, 1.0)],
            range: Vec2::new(0.0, 1.0),
            flag: ModifiedFlag::new(),
        }
    }
}

impl Component for ColorRamp {}
