/// Engine objects - cameras, lights, materials, renderers and their factories

pub mod engine_object;
pub mod schema;
pub mod camera;
pub mod light;
pub mod material;
pub mod renderer;
pub mod factory;
pub mod factories;

pub use engine_object::{EngineObject, ObjectState};
pub use camera::{Camera, CameraView, OrthographicCamera, PerspectiveCamera};
pub use light::{AmbientLight, DirectionalLight, Light, SphereLight};
pub use material::{EmissiveMaterial, GlassMaterial, Material, MatteMaterial, MetalMaterial};
pub use renderer::{InteractiveRenderer, ProductionRenderer, Renderer};
pub use factory::{EngineFactory, Upcast};
pub use factories::{CameraFactory, EngineFactories, LightFactory, MaterialFactory, RendererFactory};
