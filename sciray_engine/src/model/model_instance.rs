/// ModelInstance - a placement of a shared Model in the scene
///
/// Lifecycle: `Created -> Committed (repeatable) -> Destroyed`. The backend
/// Instance object is created at the first commit and released when the
/// owning manager processes the removal.

use crate::device::{Device, ObjectHandle, ObjectKind, ParamValue};
use crate::engine_err;
use crate::error::Result;
use crate::math::{Bounds, Transform};
use crate::model::model::{lock_model, SharedModel};
use crate::modified::{BaseObject, ModifiedFlag};

pub struct ModelInstance {
    id: u32,
    model: SharedModel,
    transform: Transform,
    visible: bool,
    handle: Option<ObjectHandle>,
    flag: ModifiedFlag,
}

impl ModelInstance {
    pub(crate) fn new(id: u32, model: SharedModel) -> Self {
        Self {
            id,
            model,
            transform: Transform::IDENTITY,
            visible: true,
            handle: None,
            flag: ModifiedFlag::new(),
        }
    }

    /// Network-visible id, unique among live instances of a manager
    pub fn id(&self) -> u32 {
        self.id
    }

    /// The shared model (mutations are visible to every instance)
    pub fn model(&self) -> &SharedModel {
        &self.model
    }

    pub fn model_type(&self) -> Result<String> {
        Ok(lock_model(&self.model)?.model_type().to_string())
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn set_transform(&mut self, transform: Transform) {
        self.flag.update(&mut self.transform, transform);
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.flag.update(&mut self.visible, visible);
    }

    /// Backend instance (None until the first commit)
    pub fn handle(&self) -> Option<ObjectHandle> {
        self.handle
    }

    /// World-space bounds of the model placed with this instance's transform
    pub fn bounds(&self) -> Result<Bounds> {
        let mut model = lock_model(&self.model)?;
        Ok(model.compute_bounds(&self.transform))
    }

    /// Push the transform to the backend instance.
    ///
    /// The model must have been committed first (its group must exist).
    /// Returns false when nothing changed.
    pub fn commit(&mut self, device: &mut dyn Device) -> Result<bool> {
        if !self.flag.is_modified() && self.handle.is_some() {
            return Ok(false);
        }

        let handle = match self.handle {
            Some(handle) => handle,
            None => {
                let group = lock_model(&self.model)?.group()
                    .ok_or_else(|| engine_err!("sciray::ModelInstance",
                        "Instance {} committed before its model", self.id))?;
                let handle = device.create_object(ObjectKind::Instance, "instance")?;
                device.set_param(handle, "group", ParamValue::Object(group))?;
                self.handle = Some(handle);
                handle
            }
        };

        device.set_param(handle, "transform", ParamValue::Mat4(self.transform.to_matrix()))?;
        device.commit(handle)?;
        self.flag.reset_modified();
        Ok(true)
    }

    /// Release the backend instance
    pub(crate) fn release(&mut self, device: &mut dyn Device) {
        if let Some(handle) = self.handle.take() {
            device.release(handle);
        }
    }

    /// Same model, fresh id, identity transform
    pub(crate) fn instantiate(&self, id: u32) -> Self {
        Self::new(id, self.model.clone())
    }
}

impl BaseObject for ModelInstance {
    fn modified_flag(&self) -> &ModifiedFlag {
        &self.flag
    }
}

impl std::fmt::Debug for ModelInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelInstance")
            .field("id", &self.id)
            .field("transform", &self.transform)
            .field("visible", &self.visible)
            .field("handle", &self.handle)
            .finish()
    }
}
