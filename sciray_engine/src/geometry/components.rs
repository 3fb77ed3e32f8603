/// Backend-owning components of geometry and light models
///
/// - `MaterialComponent`: the material shared by every geometry of a model
/// - `GeometryRendererComponent`: one backend Geometry + GeometricModel per
///   entry of `Geometries`, attached to the model's group
/// - `LightComponent`: lights attached to the model's group

use crate::device::{Device, ObjectHandle, ObjectKind, ParamValue};
use crate::engine_err;
use crate::error::Result;
use crate::geometry::geometry::Geometries;
use crate::model::{Component, ComponentContext};
use crate::modified::ModifiedFlag;
use crate::object::{EngineObject, Light, Material, MatteMaterial};

// ===== MATERIAL =====

pub struct MaterialComponent {
    material: Box<dyn Material>,
    /// Replaced materials waiting for release
    retired: Vec<Box<dyn Material>>,
}

impl MaterialComponent {
    pub fn new(material: Box<dyn Material>) -> Self {
        Self { material, retired: Vec::new() }
    }

    pub fn material(&self) -> &dyn Material {
        &*self.material
    }

    pub fn material_mut(&mut self) -> &mut dyn Material {
        &mut *self.material
    }

    /// Replace the material. The previous backend object is released at the
    /// next commit.
    pub fn set_material(&mut self, material: Box<dyn Material>) {
        let previous = std::mem::replace(&mut self.material, material);
        self.retired.push(previous);
    }

    /// Backend handle (None before the first commit)
    pub fn handle(&self) -> Option<ObjectHandle> {
        self.material.handle()
    }

    /// Release retired materials and commit the current one
    pub fn sync(&mut self, device: &mut dyn Device) -> Result<bool> {
        let mut changed = false;
        for mut material in self.retired.drain(..) {
            material.release(device);
            changed = true;
        }
        Ok(self.material.commit(device)? || changed)
    }
}

impl Default for MaterialComponent {
    fn default() -> Self {
        Self::new(Box::new(MatteMaterial::default()))
    }
}

impl Component for MaterialComponent {
    fn commit(&mut self, context: &mut ComponentContext) -> Result<bool> {
        self.sync(context.device)
    }

    fn on_destroy(&mut self, context: &mut ComponentContext) {
        for mut material in self.retired.drain(..) {
            material.release(context.device);
        }
        self.material.release(context.device);
    }
}

// ===== GEOMETRY RENDERER =====

/// Backend objects of one geometry
#[derive(Debug, Clone, Copy)]
struct GeometryHandles {
    subtype: &'static str,
    geometry: ObjectHandle,
    model: ObjectHandle,
}

/// Uploads `Geometries` to the backend, colored and shaded by the model's
/// `MaterialComponent`
#[derive(Debug, Default)]
pub struct GeometryRendererComponent {
    handles: Vec<GeometryHandles>,
    material: Option<ObjectHandle>,
}

impl GeometryRendererComponent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend GeometricModel handles, one per geometry
    pub fn model_handles(&self) -> Vec<ObjectHandle> {
        self.handles.iter().map(|handles| handles.model).collect()
    }

    fn release_handles(device: &mut dyn Device, handles: GeometryHandles) {
        device.release(handles.model);
        device.release(handles.geometry);
    }
}

impl Component for GeometryRendererComponent {
    fn commit(&mut self, context: &mut ComponentContext) -> Result<bool> {
        let material = context.components.get_mut::<MaterialComponent>()?;
        let mut changed = material.sync(context.device)?;
        let material = material.handle()
            .ok_or_else(|| engine_err!("sciray::GeometryRendererComponent", "Material has no backend object"))?;
        let rebind_material = self.material != Some(material);
        self.material = Some(material);

        let geometries = context.components.get::<Geometries>()?;
        let device = &mut *context.device;

        let full_upload = geometries.is_structure_modified();
        let mut structure_changed = false;

        while self.handles.len() > geometries.len() {
            if let Some(handles) = self.handles.pop() {
                Self::release_handles(device, handles);
                structure_changed = true;
            }
        }

        for (index, geometry) in geometries.iter().enumerate() {
            let subtype = geometry.backend_subtype();
            let stale = self.handles.get(index).map_or(true, |handles| handles.subtype != subtype);
            let created = if stale {
                let handles = GeometryHandles {
                    subtype,
                    geometry: device.create_object(ObjectKind::Geometry, subtype)?,
                    model: device.create_object(ObjectKind::GeometricModel, "geometric_model")?,
                };
                match self.handles.get_mut(index) {
                    Some(previous) => Self::release_handles(device, std::mem::replace(previous, handles)),
                    None => self.handles.push(handles),
                }
                structure_changed = true;
                true
            } else {
                false
            };
            let handles = self.handles[index];

            let mut model_dirty = created || rebind_material;
            if created || full_upload || geometry.is_shape_modified() {
                geometry.push_shape(device, handles.geometry)?;
                device.commit(handles.geometry)?;
                device.set_param(handles.model, "geometry", ParamValue::Object(handles.geometry))?;
                model_dirty = true;
            }
            if created || full_upload || geometry.is_color_modified() {
                geometry.push_colors(device, handles.model)?;
                model_dirty = true;
            }
            if model_dirty {
                device.set_param(handles.model, "material", ParamValue::Object(material))?;
                device.commit(handles.model)?;
                changed = true;
            }
        }

        if structure_changed {
            device.set_param(context.group, "geometry", ParamValue::ObjectList(self.model_handles()))?;
            changed = true;
        }
        geometries.reset_structure_modified();
        Ok(changed)
    }

    fn on_destroy(&mut self, context: &mut ComponentContext) {
        for handles in self.handles.drain(..) {
            Self::release_handles(context.device, handles);
        }
        self.material = None;
        if let Some(geometries) = context.components.find::<Geometries>() {
            // Everything is uploaded again if the model is recommitted
            geometries.iter().for_each(|geometry| geometry.mark_modified());
        }
    }
}

// ===== LIGHTS =====

#[derive(Default)]
pub struct LightComponent {
    lights: Vec<Box<dyn Light>>,
    retired: Vec<Box<dyn Light>>,
    /// Set when lights are added or removed
    flag: ModifiedFlag,
}

impl LightComponent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a light and return its index
    pub fn add(&mut self, light: Box<dyn Light>) -> usize {
        self.lights.push(light);
        self.flag.mark_modified();
        self.lights.len() - 1
    }

    /// Fails with NotFound for an index out of range
    pub fn remove(&mut self, index: usize) -> Result<()> {
        if index >= self.lights.len() {
            return Err(engine_err!("sciray::LightComponent", NotFound =>
                "Light {} not found (model has {})", index, self.lights.len()));
        }
        self.retired.push(self.lights.remove(index));
        self.flag.mark_modified();
        Ok(())
    }

    pub fn lights(&self) -> &[Box<dyn Light>] {
        &self.lights
    }

    pub fn light_mut(&mut self, index: usize) -> Option<&mut dyn Light> {
        match self.lights.get_mut(index) {
            Some(light) => Some(&mut **light),
            None => None,
        }
    }

    pub fn len(&self) -> usize {
        self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }
}

impl Component for LightComponent {
    fn commit(&mut self, context: &mut ComponentContext) -> Result<bool> {
        let mut changed = false;
        for mut light in self.retired.drain(..) {
            light.release(context.device);
            changed = true;
        }

        let mut created = false;
        for light in self.lights.iter_mut() {
            created |= light.handle().is_none();
            changed |= light.commit(context.device)?;
        }

        if created || self.flag.is_modified() {
            let handles = self.lights.iter().filter_map(|light| light.handle()).collect();
            context.device.set_param(context.group, "light", ParamValue::ObjectList(handles))?;
            self.flag.reset_modified();
            changed = true;
        }
        Ok(changed)
    }

    fn on_destroy(&mut self, context: &mut ComponentContext) {
        for mut light in self.retired.drain(..) {
            light.release(context.device);
        }
        for light in self.lights.iter_mut() {
            light.release(context.device);
        }
        self.flag.mark_modified();
    }
}

#[cfg(test)]
#[path = "components_tests.rs"]
mod tests;
