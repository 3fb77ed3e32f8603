/// Model module - entity-component models, instances and their managers

pub mod components;
pub mod systems;
pub mod model;
pub mod model_instance;
pub mod model_manager;
pub mod clip_manager;

pub use components::{AsAny, Component, ComponentContext, Components};
pub use systems::{
    BoundsSystem, ColorMethodInput, ColorSystem, DataSystem, InspectContext, InspectSystem,
    Systems, SystemsView, UpdateSystem,
};
pub use model::{lock_model, Model, SharedModel};
pub use model_instance::ModelInstance;
pub use model_manager::ModelManager;
pub use clip_manager::SceneClipManager;
