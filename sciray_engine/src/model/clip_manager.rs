/// SceneClipManager - clipping models of a scene
///
/// Same bookkeeping as `ModelManager` (own id space, deferred backend
/// release), but its instances are attached to the world as clipping
/// geometry instead of rendered geometry.

use crate::device::{Device, ObjectHandle};
use crate::error::Result;
use crate::log::SharedLogger;
use crate::model::model::Model;
use crate::model::model_instance::ModelInstance;
use crate::model::model_manager::ModelManager;

pub struct SceneClipManager {
    models: ModelManager,
}

impl SceneClipManager {
    pub fn new(logger: SharedLogger) -> Self {
        Self { models: ModelManager::new(logger) }
    }

    /// Add a clipping model
    pub fn add(&mut self, model: Model) -> Result<&mut ModelInstance> {
        self.models.add(model)
    }

    pub fn remove_model_instances_by_id(&mut self, ids: &[u32]) -> Result<()> {
        self.models.remove_model_instances_by_id(ids)
    }

    pub fn remove_all_model_instances(&mut self) {
        self.models.remove_all_model_instances();
    }

    pub fn get_model_instance(&self, id: u32) -> Result<&ModelInstance> {
        self.models.get_model_instance(id)
    }

    pub fn get_model_instance_mut(&mut self, id: u32) -> Result<&mut ModelInstance> {
        self.models.get_model_instance_mut(id)
    }

    pub fn get_all_model_instances(&self) -> &[ModelInstance] {
        self.models.get_all_model_instances()
    }

    pub fn instance_count(&self) -> usize {
        self.models.instance_count()
    }

    /// Backend handles of the visible clipping instances
    pub fn clipping_handles(&self) -> Vec<ObjectHandle> {
        self.models.visible_handles()
    }

    pub fn is_modified(&self) -> Result<bool> {
        self.models.is_modified()
    }

    pub fn commit(&mut self, device: &mut dyn Device) -> Result<bool> {
        self.models.commit(device)
    }
}
