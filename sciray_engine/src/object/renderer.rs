/// Renderers - integrators turning the world into pixels
///
/// Both renderers share samples per pixel, max ray depth and background
/// color. `interactive` trades quality for speed (shadows, ambient
/// occlusion); `production` path traces.

use glam::Vec4;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::device::{Device, ObjectHandle, ObjectKind, ParamValue};
use crate::engine_err;
use crate::error::Result;
use crate::object::engine_object::{EngineObject, ObjectState};
use crate::object::schema;

pub trait Renderer: EngineObject {
    fn samples_per_pixel(&self) -> u32;

    /// Fails with InvalidArgument for 0
    fn set_samples_per_pixel(&mut self, samples: u32) -> Result<()>;

    fn max_ray_depth(&self) -> u32;

    /// Fails with InvalidArgument for 0
    fn set_max_ray_depth(&mut self, depth: u32) -> Result<()>;

    fn background_color(&self) -> Vec4;

    fn set_background_color(&mut self, color: Vec4);
}

fn check_positive(name: &str, value: u32) -> Result<()> {
    if value == 0 {
        return Err(engine_err!("sciray::Renderer", InvalidArgument => "{} must be at least 1", name));
    }
    Ok(())
}

fn common_schema() -> Vec<(&'static str, Value)> {
    vec![
        ("samples_per_pixel", schema::integer_min("Samples per pixel per frame", 1)),
        ("max_ray_depth", schema::integer_min("Maximum ray bounces", 1)),
        ("background_color", schema::vector("Background color (RGBA)", 4)),
    ]
}

fn push_common(device: &mut dyn Device, handle: ObjectHandle, samples: u32, depth: u32, background: Vec4) -> Result<()> {
    device.set_param(handle, "pixelSamples", ParamValue::UInt(samples))?;
    device.set_param(handle, "maxPathLength", ParamValue::UInt(depth))?;
    device.set_param(handle, "backgroundColor", ParamValue::Vec4(background))?;
    Ok(())
}

macro_rules! impl_renderer_common {
    ($renderer:ty) => {
        impl Renderer for $renderer {
            fn samples_per_pixel(&self) -> u32 {
                self.samples_per_pixel
            }

            fn set_samples_per_pixel(&mut self, samples: u32) -> Result<()> {
                check_positive("Samples per pixel", samples)?;
                self.state.flag().update(&mut self.samples_per_pixel, samples);
                Ok(())
            }

            fn max_ray_depth(&self) -> u32 {
                self.max_ray_depth
            }

            fn set_max_ray_depth(&mut self, depth: u32) -> Result<()> {
                check_positive("Max ray depth", depth)?;
                self.state.flag().update(&mut self.max_ray_depth, depth);
                Ok(())
            }

            fn background_color(&self) -> Vec4 {
                self.background_color
            }

            fn set_background_color(&mut self, color: Vec4) {
                self.state.flag().update(&mut self.background_color, color);
            }
        }
    };
}

// ===== INTERACTIVE =====

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractiveRenderer {
    samples_per_pixel: u32,
    max_ray_depth: u32,
    background_color: Vec4,
    shadows_enabled: bool,
    ao_samples: u32,
    #[serde(skip)]
    state: ObjectState,
}

impl InteractiveRenderer {
    pub fn shadows_enabled(&self) -> bool {
        self.shadows_enabled
    }

    pub fn set_shadows_enabled(&mut self, enabled: bool) {
        self.state.flag().update(&mut self.shadows_enabled, enabled);
    }

    pub fn ao_samples(&self) -> u32 {
        self.ao_samples
    }

    pub fn set_ao_samples(&mut self, samples: u32) {
        self.state.flag().update(&mut self.ao_samples, samples);
    }
}

impl Default for InteractiveRenderer {
    fn default() -> Self {
        Self {
            samples_per_pixel: 1,
            max_ray_depth: 3,
            background_color: Vec4::new(0.004, 0.016, 0.102, 0.0),
            shadows_enabled: false,
            ao_samples: 0,
            state: ObjectState::new(),
        }
    }
}

impl EngineObject for InteractiveRenderer {
    crate::object_state_accessors!();

    fn kind(&self) -> ObjectKind {
        ObjectKind::Renderer
    }

    fn backend_subtype(&self) -> &'static str {
        "scivis"
    }

    fn push_params(&self, device: &mut dyn Device, handle: ObjectHandle) -> Result<()> {
        push_common(device, handle, self.samples_per_pixel, self.max_ray_depth, self.background_color)?;
        device.set_param(handle, "shadows", ParamValue::Bool(self.shadows_enabled))?;
        device.set_param(handle, "aoSamples", ParamValue::UInt(self.ao_samples))?;
        Ok(())
    }

    fn schema(&self) -> Value {
        let mut properties = common_schema();
        properties.push(("shadows_enabled", schema::boolean("Cast shadows")));
        properties.push(("ao_samples", schema::integer_min("Ambient occlusion samples", 0)));
        schema::object("interactive", "Fast renderer for interactive exploration", properties)
    }
}

impl_renderer_common!(InteractiveRenderer);

// ===== PRODUCTION =====

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductionRenderer {
    samples_per_pixel: u32,
    max_ray_depth: u32,
    background_color: Vec4,
    #[serde(skip)]
    state: ObjectState,
}

impl Default for ProductionRenderer {
    fn default() -> Self {
        Self {
            samples_per_pixel: 1,
            max_ray_depth: 5,
            background_color: Vec4::new(0.004, 0.016, 0.102, 0.0),
            state: ObjectState::new(),
        }
    }
}

impl EngineObject for ProductionRenderer {
    crate::object_state_accessors!();

    fn kind(&self) -> ObjectKind {
        ObjectKind::Renderer
    }

    fn backend_subtype(&self) -> &'static str {
        "pathtracer"
    }

    fn push_params(&self, device: &mut dyn Device, handle: ObjectHandle) -> Result<()> {
        push_common(device, handle, self.samples_per_pixel, self.max_ray_depth, self.background_color)
    }

    fn schema(&self) -> Value {
        schema::object("production", "Path tracer for final images", common_schema())
    }
}

impl_renderer_common!(ProductionRenderer);
