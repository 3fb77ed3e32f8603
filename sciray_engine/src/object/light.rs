/// Lights - ambient, directional and sphere lights
///
/// Lights are attached to a model's group by `LightComponent`, so that a
/// light model can be instanced and transformed like any other model.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::device::{Device, ObjectHandle, ObjectKind, ParamValue};
use crate::engine_err;
use crate::error::Result;
use crate::math::Bounds;
use crate::object::engine_object::{EngineObject, ObjectState};
use crate::object::schema;

pub trait Light: EngineObject {
    fn color(&self) -> Vec3;

    fn set_color(&mut self, color: Vec3);

    fn intensity(&self) -> f32;

    /// Fails with InvalidArgument if negative
    fn set_intensity(&mut self, intensity: f32) -> Result<()>;

    /// Whether the light itself is seen by camera rays
    fn is_visible(&self) -> bool;

    fn set_visible(&mut self, visible: bool);

    /// Local-space bounds of the emitter (empty for lights at infinity)
    fn bounds(&self) -> Bounds {
        Bounds::empty()
    }
}

fn common_schema() -> Vec<(&'static str, Value)> {
    vec![
        ("color", schema::vector("Light color (RGB)", 3)),
        ("intensity", schema::number_min("Light intensity", 0.0)),
        ("visible", schema::boolean("Light seen by camera rays")),
    ]
}

fn push_common(device: &mut dyn Device, handle: ObjectHandle, color: Vec3, intensity: f32, visible: bool) -> Result<()> {
    device.set_param(handle, "color", ParamValue::Vec3(color))?;
    device.set_param(handle, "intensity", ParamValue::Float(intensity))?;
    device.set_param(handle, "visible", ParamValue::Bool(visible))?;
    Ok(())
}

macro_rules! impl_light_common {
    () => {
        fn color(&self) -> Vec3 {
            self.color
        }

        fn set_color(&mut self, color: Vec3) {
            self.state.flag().update(&mut self.color, color);
        }

        fn intensity(&self) -> f32 {
            self.intensity
        }

        fn set_intensity(&mut self, intensity: f32) -> Result<()> {
            if intensity < 0.0 {
                return Err(engine_err!("sciray::Light", InvalidArgument =>
                    "Light intensity must be positive, got {}", intensity));
            }
            self.state.flag().update(&mut self.intensity, intensity);
            Ok(())
        }

        fn is_visible(&self) -> bool {
            self.visible
        }

        fn set_visible(&mut self, visible: bool) {
            self.state.flag().update(&mut self.visible, visible);
        }
    };
}

// ===== AMBIENT =====

/// Uniform light coming from every direction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbientLight {
    color: Vec3,
    intensity: f32,
    visible: bool,
    #[serde(skip)]
    state: ObjectState,
}

impl Default for AmbientLight {
    fn default() -> Self {
        Self { color: Vec3::ONE, intensity: 1.0, visible: true, state: ObjectState::new() }
    }
}

impl EngineObject for AmbientLight {
    crate::object_state_accessors!();

    fn kind(&self) -> ObjectKind {
        ObjectKind::Light
    }

    fn backend_subtype(&self) -> &'static str {
        "ambient"
    }

    fn push_params(&self, device: &mut dyn Device, handle: ObjectHandle) -> Result<()> {
        push_common(device, handle, self.color, self.intensity, self.visible)
    }

    fn schema(&self) -> Value {
        schema::object("ambient", "Ambient light", common_schema())
    }
}

impl Light for AmbientLight {
    impl_light_common!();
}

// ===== DIRECTIONAL =====

/// Light at infinity shining along a direction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectionalLight {
    color: Vec3,
    intensity: f32,
    visible: bool,
    direction: Vec3,
    /// Apparent size in degrees (0 gives hard shadows)
    angular_diameter: f32,
    #[serde(skip)]
    state: ObjectState,
}

impl DirectionalLight {
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Fails with InvalidArgument for a zero vector
    pub fn set_direction(&mut self, direction: Vec3) -> Result<()> {
        let normalized = direction.try_normalize()
            .ok_or_else(|| engine_err!("sciray::DirectionalLight", InvalidArgument =>
                "Light direction must not be zero"))?;
        self.state.flag().update(&mut self.direction, normalized);
        Ok(())
    }

    pub fn angular_diameter(&self) -> f32 {
        self.angular_diameter
    }

    pub fn set_angular_diameter(&mut self, degrees: f32) {
        self.state.flag().update(&mut self.angular_diameter, degrees.max(0.0));
    }
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            intensity: 1.0,
            visible: true,
            direction: Vec3::NEG_Z,
            angular_diameter: 0.0,
            state: ObjectState::new(),
        }
    }
}

impl EngineObject for DirectionalLight {
    crate::object_state_accessors!();

    fn kind(&self) -> ObjectKind {
        ObjectKind::Light
    }

    fn backend_subtype(&self) -> &'static str {
        "distant"
    }

    fn push_params(&self, device: &mut dyn Device, handle: ObjectHandle) -> Result<()> {
        push_common(device, handle, self.color, self.intensity, self.visible)?;
        device.set_param(handle, "direction", ParamValue::Vec3(self.direction))?;
        device.set_param(handle, "angularDiameter", ParamValue::Float(self.angular_diameter))?;
        Ok(())
    }

    fn schema(&self) -> Value {
        let mut properties = common_schema();
        properties.push(("direction", schema::vector("Light direction", 3)));
        properties.push(("angular_diameter", schema::number_min("Apparent size in degrees", 0.0)));
        schema::object("directional", "Directional light", properties)
    }
}

impl Light for DirectionalLight {
    impl_light_common!();
}

// ===== SPHERE =====

/// Spherical area light
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SphereLight {
    color: Vec3,
    intensity: f32,
    visible: bool,
    position: Vec3,
    radius: f32,
    #[serde(skip)]
    state: ObjectState,
}

impl SphereLight {
    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.state.flag().update(&mut self.position, position);
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Fails with InvalidArgument if negative
    pub fn set_radius(&mut self, radius: f32) -> Result<()> {
        if radius < 0.0 {
            return Err(engine_err!("sciray::SphereLight", InvalidArgument =>
                "Light radius must be positive, got {}", radius));
        }
        self.state.flag().update(&mut self.radius, radius);
        Ok(())
    }
}

impl Default for SphereLight {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            intensity: 1.0,
            visible: true,
            position: Vec3::ZERO,
            radius: 0.0,
            state: ObjectState::new(),
        }
    }
}

impl EngineObject for SphereLight {
    crate::object_state_accessors!();

    fn kind(&self) -> ObjectKind {
        ObjectKind::Light
    }

    fn backend_subtype(&self) -> &'static str {
        "sphere"
    }

    fn push_params(&self, device: &mut dyn Device, handle: ObjectHandle) -> Result<()> {
        push_common(device, handle, self.color, self.intensity, self.visible)?;
        device.set_param(handle, "position", ParamValue::Vec3(self.position))?;
        device.set_param(handle, "radius", ParamValue::Float(self.radius))?;
        Ok(())
    }

    fn schema(&self) -> Value {
        let mut properties = common_schema();
        properties.push(("position", schema::vector("Light center", 3)));
        properties.push(("radius", schema::number_min("Light radius", 0.0)));
        schema::object("sphere", "Sphere light", properties)
    }
}

impl Light for SphereLight {
    impl_light_common!();

    fn bounds(&self) -> Bounds {
        Bounds::from_sphere(self.position, self.radius)
    }
}
