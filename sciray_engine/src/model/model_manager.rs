/// ModelManager - owns the model instances of a scene
///
/// Instances are kept in insertion order and identified by ids from an
/// `IdFactory` (unique among live instances, recycled after removal).
///
/// Backend work is deferred to `commit()`: removed instances are queued and
/// their backend objects released there, and models left without any
/// instance get their `on_destroy` hook run there.

use std::sync::Arc;
use rustc_hash::FxHashSet;
use crate::device::{Device, ObjectHandle};
use crate::engine_err;
use crate::error::Result;
use crate::log::SharedLogger;
use crate::math::Bounds;
use crate::model::model::{lock_model, Model, SharedModel};
use crate::model::model_instance::ModelInstance;
use crate::modified::{BaseObject, ModifiedFlag};
use crate::utils::IdFactory;
use crate::{engine_debug, engine_info, engine_warn};

pub struct ModelManager {
    instances: Vec<ModelInstance>,
    ids: IdFactory,
    /// Removed instances waiting for backend release
    removed: Vec<ModelInstance>,
    /// Models that lost their last instance, destroyed at commit
    orphans: Vec<SharedModel>,
    flag: ModifiedFlag,
    logger: SharedLogger,
}

impl ModelManager {
    pub fn new(logger: SharedLogger) -> Self {
        Self {
            instances: Vec::new(),
            ids: IdFactory::new(),
            removed: Vec::new(),
            orphans: Vec::new(),
            flag: ModifiedFlag::new(),
            logger,
        }
    }

    // ===== ADD =====

    /// Add a model to the scene, wrapped in a new instance.
    ///
    /// Fails with InvalidArgument if the model has no component.
    pub fn add(&mut self, model: Model) -> Result<&mut ModelInstance> {
        Self::validate(&model)?;
        let id = self.insert(model.into_shared());
        engine_info!(self.logger, "sciray::ModelManager", "Added model instance {}", id);
        self.get_model_instance_mut(id)
    }

    /// Add several models at once.
    ///
    /// All-or-nothing: every model is validated before any id is allocated.
    ///
    /// # Returns
    ///
    /// The ids of the new instances, in the order of `models`
    pub fn add_models(&mut self, models: Vec<Model>) -> Result<Vec<u32>> {
        for (index, model) in models.iter().enumerate() {
            Self::validate(model).map_err(|error| engine_err!("sciray::ModelManager", InvalidArgument =>
                "Model {} of batch rejected: {}", index, error))?;
        }

        let ids: Vec<u32> = models.into_iter()
            .map(|model| self.insert(model.into_shared()))
            .collect();
        engine_info!(self.logger, "sciray::ModelManager", "Added {} model instances", ids.len());
        Ok(ids)
    }

    /// Create `count` additional instances of the model referenced by `id`.
    ///
    /// New instances share the model and start at the identity transform.
    pub fn create_instances(&mut self, id: u32, count: usize) -> Result<&[ModelInstance]> {
        let source = self.index_of(id)?;
        let start = self.instances.len();
        for _ in 0..count {
            let new_id = self.ids.generate();
            let instance = self.instances[source].instantiate(new_id);
            self.instances.push(instance);
        }
        if count > 0 {
            self.flag.mark_modified();
        }
        engine_debug!(self.logger, "sciray::ModelManager", "Created {} instances of model {}", count, id);
        Ok(&self.instances[start..])
    }

    // ===== REMOVE =====

    /// Remove instances by id.
    ///
    /// Fails with NotFound (removing nothing) if any id is unknown.
    pub fn remove_model_instances_by_id(&mut self, ids: &[u32]) -> Result<()> {
        for id in ids {
            self.index_of(*id)?;
        }
        let targets: FxHashSet<u32> = ids.iter().copied().collect();
        self.remove_model_instances(|instance| targets.contains(&instance.id()));
        Ok(())
    }

    /// Remove every instance for which `predicate` returns true.
    ///
    /// # Returns
    ///
    /// The number of removed instances
    pub fn remove_model_instances<F: FnMut(&ModelInstance) -> bool>(&mut self, mut predicate: F) -> usize {
        let (removed, kept): (Vec<ModelInstance>, Vec<ModelInstance>) =
            std::mem::take(&mut self.instances)
                .into_iter()
                .partition(|instance| predicate(instance));
        self.instances = kept;

        let count = removed.len();
        for instance in removed {
            self.retire(instance);
        }
        if count > 0 {
            self.flag.mark_modified();
            engine_info!(self.logger, "sciray::ModelManager", "Removed {} model instances", count);
        }
        count
    }

    pub fn remove_all_model_instances(&mut self) {
        self.remove_model_instances(|_| true);
    }

    // ===== QUERIES =====

    /// Fails with NotFound if `id` is not a live instance
    pub fn get_model_instance(&self, id: u32) -> Result<&ModelInstance> {
        let index = self.index_of(id)?;
        Ok(&self.instances[index])
    }

    pub fn get_model_instance_mut(&mut self, id: u32) -> Result<&mut ModelInstance> {
        let index = self.index_of(id)?;
        Ok(&mut self.instances[index])
    }

    /// Live instances in insertion order
    pub fn get_all_model_instances(&self) -> &[ModelInstance] {
        &self.instances
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Union of the bounds of every visible instance
    pub fn bounds(&self) -> Result<Bounds> {
        let mut bounds = Bounds::empty();
        for instance in self.instances.iter().filter(|instance| instance.is_visible()) {
            bounds.expand(&instance.bounds()?);
        }
        Ok(bounds)
    }

    /// Backend handles of the committed, visible instances
    pub fn visible_handles(&self) -> Vec<ObjectHandle> {
        self.instances.iter()
            .filter(|instance| instance.is_visible())
            .filter_map(|instance| instance.handle())
            .collect()
    }

    /// OR of the manager, instance and model dirty states
    pub fn is_modified(&self) -> Result<bool> {
        if self.flag.is_modified() || !self.removed.is_empty() {
            return Ok(true);
        }
        for instance in &self.instances {
            if instance.is_modified() || lock_model(instance.model())?.is_modified() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    // ===== COMMIT =====

    /// Synchronize every pending change with the backend.
    ///
    /// Order: release removed instances, destroy orphaned models, commit each
    /// distinct model once, then commit instances.
    ///
    /// # Returns
    ///
    /// true if any backend state changed (including instance list changes)
    pub fn commit(&mut self, device: &mut dyn Device) -> Result<bool> {
        let mut changed = self.flag.is_modified();

        for mut instance in self.removed.drain(..) {
            instance.release(device);
            changed = true;
        }

        for model in std::mem::take(&mut self.orphans) {
            let referenced = self.instances.iter()
                .any(|instance| Arc::ptr_eq(instance.model(), &model));
            if !referenced {
                lock_model(&model)?.on_destroy(device);
            }
        }

        let mut committed = FxHashSet::default();
        for instance in &self.instances {
            if committed.insert(Arc::as_ptr(instance.model())) {
                changed |= lock_model(instance.model())?.commit(device)?;
            }
        }

        for instance in &mut self.instances {
            changed |= instance.commit(device)?;
        }

        self.flag.reset_modified();
        Ok(changed)
    }

    // ===== INTERNALS =====

    fn validate(model: &Model) -> Result<()> {
        if model.components().is_empty() {
            return Err(engine_err!("sciray::ModelManager", InvalidArgument =>
                "Model '{}' has no component", model.model_type()));
        }
        Ok(())
    }

    fn insert(&mut self, model: SharedModel) -> u32 {
        let id = self.ids.generate();
        self.instances.push(ModelInstance::new(id, model));
        self.flag.mark_modified();
        id
    }

    fn index_of(&self, id: u32) -> Result<usize> {
        self.instances.iter()
            .position(|instance| instance.id() == id)
            .ok_or_else(|| engine_err!("sciray::ModelManager", NotFound => "Model not found: {}", id))
    }

    fn retire(&mut self, instance: ModelInstance) {
        if let Err(error) = self.ids.release(instance.id()) {
            engine_warn!(self.logger, "sciray::ModelManager", "Removed instance kept a stale id: {}", error);
        }
        let model = instance.model().clone();
        let still_used = self.instances.iter()
            .any(|other| Arc::ptr_eq(other.model(), &model));
        if !still_used && !self.orphans.iter().any(|orphan| Arc::ptr_eq(orphan, &model)) {
            self.orphans.push(model);
        }
        self.removed.push(instance);
    }
}

#[cfg(test)]
#[path = "model_manager_tests.rs"]
mod tests;
