/// Systems - pluggable behavior attached to a Model
///
/// A `Systems` table holds at most one strategy object per capability
/// (bounds, color, data, update, inspect). Strategies are stateless: they
/// only act on the `Components` handed to them for the duration of a call.
/// An empty slot means the model does not support that capability, so the
/// matching `SystemsView` call returns a default value instead of failing.

use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::error::Result;
use crate::math::{Bounds, Transform};
use crate::model::components::Components;
use crate::parameters::ParametersManager;

// ===== SYSTEM TRAITS =====

/// Computes the world-space bounds of a model
pub trait BoundsSystem: Send + Sync {
    /// May mutate components (e.g. to cache a world-space center)
    fn compute(&self, transform: &Transform, components: &mut Components) -> Bounds;
}

/// Named `(variable, color)` pairs given to a color method
pub type ColorMethodInput = Vec<(String, Vec4)>;

/// Exposes coloring methods (e.g. "solid", "primitive") of a model
pub trait ColorSystem: Send + Sync {
    /// Available method names
    fn methods(&self) -> Vec<String>;

    /// Variables a method accepts. Fails with NotFound for unknown methods.
    fn values(&self, method: &str, components: &mut Components) -> Result<Vec<String>>;

    /// Apply a method. Fails with NotFound for unknown methods and
    /// InvalidArgument for unknown variables.
    fn apply(&self, method: &str, input: &ColorMethodInput, components: &mut Components) -> Result<()>;
}

/// Exports the raw data of a model (geometry summary, report values...)
pub trait DataSystem: Send + Sync {
    fn get_data(&self, components: &mut Components) -> Result<Value>;
}

/// Per-frame update, run once before render (simulation playback, etc.)
pub trait UpdateSystem: Send + Sync {
    fn execute(&self, parameters: &ParametersManager, components: &mut Components);
}

/// Hit information given to an inspect (pick) query
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InspectContext {
    /// World-space hit position
    pub position: Vec3,
    /// Index of the hit geometry inside the model
    pub geometry_index: u32,
    /// Index of the hit primitive inside the geometry
    pub primitive_index: u32,
}

/// Answers pick/hover queries on a model
pub trait InspectSystem: Send + Sync {
    fn execute(&self, context: &InspectContext, components: &mut Components) -> Value;
}

// ===== SYSTEMS TABLE =====

/// Optional strategy slots of one model
#[derive(Default)]
pub struct Systems {
    bounds: Option<Box<dyn BoundsSystem>>,
    color: Option<Box<dyn ColorSystem>>,
    data: Option<Box<dyn DataSystem>>,
    update: Option<Box<dyn UpdateSystem>>,
    inspect: Option<Box<dyn InspectSystem>>,
}

impl Systems {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_bounds_system<S: BoundsSystem + 'static>(&mut self, system: S) {
        self.bounds = Some(Box::new(system));
    }

    pub fn set_color_system<S: ColorSystem + 'static>(&mut self, system: S) {
        self.color = Some(Box::new(system));
    }

    pub fn set_data_system<S: DataSystem + 'static>(&mut self, system: S) {
        self.data = Some(Box::new(system));
    }

    pub fn set_update_system<S: UpdateSystem + 'static>(&mut self, system: S) {
        self.update = Some(Box::new(system));
    }

    pub fn set_inspect_system<S: InspectSystem + 'static>(&mut self, system: S) {
        self.inspect = Some(Box::new(system));
    }

    pub fn has_bounds_system(&self) -> bool {
        self.bounds.is_some()
    }

    pub fn has_color_system(&self) -> bool {
        self.color.is_some()
    }

    pub fn has_data_system(&self) -> bool {
        self.data.is_some()
    }

    pub fn has_update_system(&self) -> bool {
        self.update.is_some()
    }

    pub fn has_inspect_system(&self) -> bool {
        self.inspect.is_some()
    }
}

// ===== SYSTEMS VIEW =====

/// Binds a `Systems` table to the `Components` of the same model for the
/// duration of a call.
pub struct SystemsView<'a> {
    systems: &'a Systems,
    components: &'a mut Components,
}

impl<'a> SystemsView<'a> {
    pub fn new(systems: &'a Systems, components: &'a mut Components) -> Self {
        Self { systems, components }
    }

    /// World-space bounds (empty if the model has no bounds system)
    pub fn compute_bounds(&mut self, transform: &Transform) -> Bounds {
        match &self.systems.bounds {
            Some(system) => system.compute(transform, self.components),
            None => Bounds::empty(),
        }
    }

    /// Color method names (empty if the model cannot be colored)
    pub fn get_color_methods(&self) -> Vec<String> {
        match &self.systems.color {
            Some(system) => system.methods(),
            None => Vec::new(),
        }
    }

    /// Variables of a color method
    pub fn get_color_values(&mut self, method: &str) -> Result<Vec<String>> {
        match &self.systems.color {
            Some(system) => system.values(method, self.components),
            None => Ok(Vec::new()),
        }
    }

    /// Apply a color method
    pub fn apply_color(&mut self, method: &str, input: &ColorMethodInput) -> Result<()> {
        match &self.systems.color {
            Some(system) => system.apply(method, input, self.components),
            None => Ok(()),
        }
    }

    /// Raw model data (`Value::Null` if the model has no data system)
    pub fn get_data(&mut self) -> Result<Value> {
        match &self.systems.data {
            Some(system) => system.get_data(self.components),
            None => Ok(Value::Null),
        }
    }

    /// Per-frame update
    pub fn update(&mut self, parameters: &ParametersManager) {
        if let Some(system) = &self.systems.update {
            system.execute(parameters, self.components);
        }
    }

    /// Pick query (`Value::Null` if the model cannot be inspected)
    pub fn inspect(&mut self, context: &InspectContext) -> Value {
        match &self.systems.inspect {
            Some(system) => system.execute(context, self.components),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
#[path = "systems_tests.rs"]
mod tests;
