/// Model - the shared, renderable unit
///
/// A Model owns one `Components` container and one `Systems` table, plus the
/// backend Group every instance of the model points to. It has no id of its
/// own: identity comes from the `ModelInstance`s referencing it.

use std::any::TypeId;
use std::sync::{Arc, Mutex, MutexGuard};
use crate::device::{Device, ObjectHandle, ObjectKind};
use crate::engine_err;
use crate::error::Result;
use crate::math::{Bounds, Transform};
use crate::model::components::{Component, ComponentContext, ComponentEntry, Components};
use crate::model::systems::{Systems, SystemsView};

/// Model shared between instances
pub type SharedModel = Arc<Mutex<Model>>;

/// Lock a shared model, mapping poisoning to BackendError
pub fn lock_model(model: &SharedModel) -> Result<MutexGuard<'_, Model>> {
    model.lock()
        .map_err(|_| engine_err!("sciray::Model", "Model lock poisoned"))
}

pub struct Model {
    model_type: String,
    components: Components,
    systems: Systems,
    /// Backend group, created at first commit
    group: Option<ObjectHandle>,
}

impl Model {
    /// Create an empty model
    ///
    /// # Arguments
    ///
    /// * `model_type` - Free-form category ("geometry", "light", "xyz"...)
    pub fn new(model_type: impl Into<String>) -> Self {
        Self {
            model_type: model_type.into(),
            components: Components::new(),
            systems: Systems::new(),
            group: None,
        }
    }

    /// Wrap into a `SharedModel`
    pub fn into_shared(self) -> SharedModel {
        Arc::new(Mutex::new(self))
    }

    pub fn model_type(&self) -> &str {
        &self.model_type
    }

    // ===== COMPONENTS =====

    pub fn components(&self) -> &Components {
        &self.components
    }

    pub fn components_mut(&mut self) -> &mut Components {
        &mut self.components
    }

    pub fn add_component<T: Component>(&mut self, component: T) -> &mut T {
        self.components.add(component)
    }

    pub fn get_component<T: Component>(&self) -> Result<&T> {
        self.components.get::<T>()
    }

    pub fn get_component_mut<T: Component>(&mut self) -> Result<&mut T> {
        self.components.get_mut::<T>()
    }

    pub fn find_component<T: Component>(&self) -> Option<&T> {
        self.components.find::<T>()
    }

    pub fn has_component<T: Component>(&self) -> bool {
        self.components.has::<T>()
    }

    // ===== SYSTEMS =====

    pub fn systems(&self) -> &Systems {
        &self.systems
    }

    pub fn systems_mut(&mut self) -> &mut Systems {
        &mut self.systems
    }

    /// Bind this model's systems to its components
    pub fn systems_view(&mut self) -> SystemsView<'_> {
        SystemsView::new(&self.systems, &mut self.components)
    }

    /// World-space bounds of the model placed with `transform`
    pub fn compute_bounds(&mut self, transform: &Transform) -> Bounds {
        self.systems_view().compute_bounds(transform)
    }

    // ===== LIFECYCLE =====

    /// Backend group (None until the first commit)
    pub fn group(&self) -> Option<ObjectHandle> {
        self.group
    }

    /// Whether components were added/replaced/removed since the last commit
    pub fn is_modified(&self) -> bool {
        self.group.is_none() || self.components.is_modified()
    }

    /// Synchronize the model with the backend.
    ///
    /// Creates the group and runs `on_create` of new components on first
    /// sight, runs `on_destroy` of retired components, then `commit` of every
    /// component in insertion order. The group is committed only if
    /// something changed.
    ///
    /// # Returns
    ///
    /// true if any backend state changed
    pub fn commit(&mut self, device: &mut dyn Device) -> Result<bool> {
        let mut changed = false;
        let group = match self.group {
            Some(group) => group,
            None => {
                let group = device.create_object(ObjectKind::Group, "group")?;
                self.group = Some(group);
                changed = true;
                group
            }
        };

        for mut entry in self.components.take_retired() {
            if entry.created {
                let mut context = ComponentContext { device: &mut *device, group, components: &mut self.components };
                entry.component.on_destroy(&mut context);
                changed = true;
            }
        }

        for key in self.components.keys() {
            changed |= self.commit_component(device, group, key)?;
        }

        if self.components.is_modified() {
            self.components.reset_modified();
            changed = true;
        }

        if changed {
            device.commit(group)?;
        }
        Ok(changed)
    }

    fn commit_component(&mut self, device: &mut dyn Device, group: ObjectHandle, key: TypeId) -> Result<bool> {
        let mut entry = match self.components.take_entry(key) {
            Some(entry) => entry,
            None => return Ok(false),
        };

        let result = Self::run_commit(&mut entry, device, group, &mut self.components);
        self.components.restore_entry(key, entry);
        result
    }

    fn run_commit(
        entry: &mut ComponentEntry,
        device: &mut dyn Device,
        group: ObjectHandle,
        components: &mut Components,
    ) -> Result<bool> {
        let mut context = ComponentContext { device, group, components };
        let mut changed = false;
        if !entry.created {
            entry.component.on_create(&mut context)?;
            entry.created = true;
            changed = true;
        }
        Ok(entry.component.commit(&mut context)? || changed)
    }

    /// Run `on_destroy` of every created component and release the group.
    ///
    /// The model can be committed again afterwards (everything is recreated).
    pub fn on_destroy(&mut self, device: &mut dyn Device) {
        let group = match self.group.take() {
            Some(group) => group,
            None => return,
        };

        for mut entry in self.components.take_retired() {
            if entry.created {
                let mut context = ComponentContext { device: &mut *device, group, components: &mut self.components };
                entry.component.on_destroy(&mut context);
            }
        }

        for key in self.components.keys() {
            if let Some(mut entry) = self.components.take_entry(key) {
                if entry.created {
                    let mut context = ComponentContext { device: &mut *device, group, components: &mut self.components };
                    entry.component.on_destroy(&mut context);
                    entry.created = false;
                }
                self.components.restore_entry(key, entry);
            }
        }

        device.release(group);
    }
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
