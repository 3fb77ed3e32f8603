/// Materials - surface appearance of geometries
///
/// The base color of a surface comes from the geometry colors; a material
/// only describes how light interacts with it.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::device::{Device, ObjectHandle, ObjectKind, ParamValue};
use crate::engine_err;
use crate::error::Result;
use crate::object::engine_object::{EngineObject, ObjectState};
use crate::object::schema;

pub trait Material: EngineObject {}

fn check_unit(source: &'static str, name: &str, value: f32) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(engine_err!("sciray::Material", InvalidArgument =>
            "{}: {} must be in [0, 1], got {}", source, name, value));
    }
    Ok(())
}

// ===== MATTE =====

/// Lambertian surface
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatteMaterial {
    opacity: f32,
    #[serde(skip)]
    state: ObjectState,
}

impl MatteMaterial {
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn set_opacity(&mut self, opacity: f32) -> Result<()> {
        check_unit("matte", "opacity", opacity)?;
        self.state.flag().update(&mut self.opacity, opacity);
        Ok(())
    }
}

impl Default for MatteMaterial {
    fn default() -> Self {
        Self { opacity: 1.0, state: ObjectState::new() }
    }
}

impl EngineObject for MatteMaterial {
    crate::object_state_accessors!();

    fn kind(&self) -> ObjectKind {
        ObjectKind::Material
    }

    fn backend_subtype(&self) -> &'static str {
        "matte"
    }

    fn push_params(&self, device: &mut dyn Device, handle: ObjectHandle) -> Result<()> {
        device.set_param(handle, "opacity", ParamValue::Float(self.opacity))
    }

    fn schema(&self) -> Value {
        schema::object("matte", "Diffuse material", vec![
            ("opacity", schema::number_min("Surface opacity in [0, 1]", 0.0)),
        ])
    }
}

impl Material for MatteMaterial {}

// ===== METAL =====

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetalMaterial {
    roughness: f32,
    #[serde(skip)]
    state: ObjectState,
}

impl MetalMaterial {
    pub fn roughness(&self) -> f32 {
        self.roughness
    }

    pub fn set_roughness(&mut self, roughness: f32) -> Result<()> {
        check_unit("metal", "roughness", roughness)?;
        self.state.flag().update(&mut self.roughness, roughness);
        Ok(())
    }
}

impl Default for MetalMaterial {
    fn default() -> Self {
        Self { roughness: 0.0, state: ObjectState::new() }
    }
}

impl EngineObject for MetalMaterial {
    crate::object_state_accessors!();

    fn kind(&self) -> ObjectKind {
        ObjectKind::Material
    }

    fn backend_subtype(&self) -> &'static str {
        "metal"
    }

    fn push_params(&self, device: &mut dyn Device, handle: ObjectHandle) -> Result<()> {
        device.set_param(handle, "roughness", ParamValue::Float(self.roughness))
    }

    fn schema(&self) -> Value {
        schema::object("metal", "Metallic material", vec![
            ("roughness", schema::number_min("Surface roughness in [0, 1]", 0.0)),
        ])
    }
}

impl Material for MetalMaterial {}

// ===== GLASS =====

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GlassMaterial {
    /// Index of refraction
    ior: f32,
    #[serde(skip)]
    state: ObjectState,
}

impl GlassMaterial {
    pub fn ior(&self) -> f32 {
        self.ior
    }

    /// Fails with InvalidArgument below 1
    pub fn set_ior(&mut self, ior: f32) -> Result<()> {
        if ior < 1.0 {
            return Err(engine_err!("sciray::GlassMaterial", InvalidArgument =>
                "Index of refraction must be >= 1, got {}", ior));
        }
        self.state.flag().update(&mut self.ior, ior);
        Ok(())
    }
}

impl Default for GlassMaterial {
    fn default() -> Self {
        Self { ior: 1.5, state: ObjectState::new() }
    }
}

impl EngineObject for GlassMaterial {
    crate::object_state_accessors!();

    fn kind(&self) -> ObjectKind {
        ObjectKind::Material
    }

    fn backend_subtype(&self) -> &'static str {
        "glass"
    }

    fn push_params(&self, device: &mut dyn Device, handle: ObjectHandle) -> Result<()> {
        device.set_param(handle, "eta", ParamValue::Float(self.ior))
    }

    fn schema(&self) -> Value {
        schema::object("glass", "Refractive material", vec![
            ("ior", schema::number_min("Index of refraction", 1.0)),
        ])
    }
}

impl Material for GlassMaterial {}

// ===== EMISSIVE =====

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmissiveMaterial {
    color: Vec3,
    intensity: f32,
    #[serde(skip)]
    state: ObjectState,
}

impl EmissiveMaterial {
    pub fn color(&self) -> Vec3 {
        self.color
    }

    pub fn set_color(&mut self, color: Vec3) {
        self.state.flag().update(&mut self.color, color);
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    pub fn set_intensity(&mut self, intensity: f32) -> Result<()> {
        if intensity < 0.0 {
            return Err(engine_err!("sciray::EmissiveMaterial", InvalidArgument =>
                "Emission intensity must be positive, got {}", intensity));
        }
        self.state.flag().update(&mut self.intensity, intensity);
        Ok(())
    }
}

impl Default for EmissiveMaterial {
    fn default() -> Self {
        Self { color: Vec3::ONE, intensity: 1.0, state: ObjectState::new() }
    }
}

impl EngineObject for EmissiveMaterial {
    crate::object_state_accessors!();

    fn kind(&self) -> ObjectKind {
        ObjectKind::Material
    }

    fn backend_subtype(&self) -> &'static str {
        "luminous"
    }

    fn push_params(&self, device: &mut dyn Device, handle: ObjectHandle) -> Result<()> {
        device.set_param(handle, "color", ParamValue::Vec3(self.color))?;
        device.set_param(handle, "intensity", ParamValue::Float(self.intensity))?;
        Ok(())
    }

    fn schema(&self) -> Value {
        schema::object("emissive", "Light-emitting material", vec![
            ("color", schema::vector("Emitted color (RGB)", 3)),
            ("intensity", schema::number_min("Emission intensity", 0.0)),
        ])
    }
}

impl Material for EmissiveMaterial {}
