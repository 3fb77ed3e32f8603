/// Scene - rendered models, clipping models and the backend World
///
/// The world lists the backend instances of every visible model instance
/// and every visible clipping instance. It is re-committed only when one of
/// the two managers changed.

use std::sync::Arc;
use rustc_hash::FxHashSet;
use crate::device::{Device, ObjectHandle, ObjectKind, ParamValue};
use crate::engine_debug;
use crate::error::Result;
use crate::log::SharedLogger;
use crate::math::Bounds;
use crate::model::{lock_model, ModelManager, SceneClipManager};
use crate::parameters::ParametersManager;

pub struct Scene {
    models: ModelManager,
    clipping: SceneClipManager,
    world: Option<ObjectHandle>,
    logger: SharedLogger,
}

impl Scene {
    pub fn new(logger: SharedLogger) -> Self {
        Self {
            models: ModelManager::new(logger.clone()),
            clipping: SceneClipManager::new(logger.clone()),
            world: None,
            logger,
        }
    }

    pub fn models(&self) -> &ModelManager {
        &self.models
    }

    pub fn models_mut(&mut self) -> &mut ModelManager {
        &mut self.models
    }

    pub fn clipping(&self) -> &SceneClipManager {
        &self.clipping
    }

    pub fn clipping_mut(&mut self) -> &mut SceneClipManager {
        &mut self.clipping
    }

    /// Backend world (None before the first commit)
    pub fn world(&self) -> Option<ObjectHandle> {
        self.world
    }

    /// Union of the bounds of every visible model instance
    pub fn bounds(&self) -> Result<Bounds> {
        self.models.bounds()
    }

    /// Run the update system of every model once
    pub fn update(&mut self, parameters: &ParametersManager) -> Result<()> {
        let mut visited = FxHashSet::default();
        for instance in self.models.get_all_model_instances() {
            if visited.insert(Arc::as_ptr(instance.model())) {
                lock_model(instance.model())?.systems_view().update(parameters);
            }
        }
        Ok(())
    }

    pub fn is_modified(&self) -> Result<bool> {
        Ok(self.world.is_none() || self.models.is_modified()? || self.clipping.is_modified()?)
    }

    /// Commit models, clipping models, then the world.
    ///
    /// # Returns
    ///
    /// true if anything affecting the image changed
    pub fn commit(&mut self, device: &mut dyn Device) -> Result<bool> {
        let mut changed = self.models.commit(device)?;
        changed |= self.clipping.commit(device)?;

        let world = match self.world {
            Some(world) => world,
            None => {
                let world = device.create_object(ObjectKind::World, "world")?;
                self.world = Some(world);
                changed = true;
                world
            }
        };

        if changed {
            let instances = self.models.visible_handles();
            let clipping = self.clipping.clipping_handles();
            engine_debug!(self.logger, "sciray::Scene",
                "World committed with {} instances and {} clipping instances", instances.len(), clipping.len());
            device.set_param(world, "instance", ParamValue::ObjectList(instances))?;
            device.set_param(world, "clipping", ParamValue::ObjectList(clipping))?;
            device.commit(world)?;
        }
        Ok(changed)
    }

    /// Remove everything and release the world
    pub fn release(&mut self, device: &mut dyn Device) -> Result<()> {
        self.models.remove_all_model_instances();
        self.clipping.remove_all_model_instances();
        self.models.commit(device)?;
        self.clipping.commit(device)?;
        if let Some(world) = self.world.take() {
            device.release(world);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "scene_tests.rs"]
mod tests;
