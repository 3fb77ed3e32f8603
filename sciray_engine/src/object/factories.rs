/// Default factories of the four engine object families

use crate::object::camera::{Camera, OrthographicCamera, PerspectiveCamera};
use crate::object::factory::EngineFactory;
use crate::object::light::{AmbientLight, DirectionalLight, Light, SphereLight};
use crate::object::material::{EmissiveMaterial, GlassMaterial, Material, MatteMaterial, MetalMaterial};
use crate::object::renderer::{InteractiveRenderer, ProductionRenderer, Renderer};

pub type CameraFactory = EngineFactory<dyn Camera>;
pub type LightFactory = EngineFactory<dyn Light>;
pub type MaterialFactory = EngineFactory<dyn Material>;
pub type RendererFactory = EngineFactory<dyn Renderer>;

/// Factories used to resolve type names coming from requests
pub struct EngineFactories {
    pub cameras: CameraFactory,
    pub lights: LightFactory,
    pub materials: MaterialFactory,
    pub renderers: RendererFactory,
}

impl EngineFactories {
    /// Empty factories (backends register their own types)
    pub fn empty() -> Self {
        Self {
            cameras: EngineFactory::new(),
            lights: EngineFactory::new(),
            materials: EngineFactory::new(),
            renderers: EngineFactory::new(),
        }
    }
}

impl Default for EngineFactories {
    /// Factories holding every built-in type
    fn default() -> Self {
        let mut factories = Self::empty();

        factories.cameras
            .register_type::<PerspectiveCamera>("perspective")
            .register_type::<OrthographicCamera>("orthographic");

        factories.lights
            .register_type::<AmbientLight>("ambient")
            .register_type::<DirectionalLight>("directional")
            .register_type::<SphereLight>("sphere");

        factories.materials
            .register_type::<MatteMaterial>("matte")
            .register_type::<MetalMaterial>("metal")
            .register_type::<GlassMaterial>("glass")
            .register_type::<EmissiveMaterial>("emissive");

        factories.renderers
            .register_type::<InteractiveRenderer>("interactive")
            .register_type::<ProductionRenderer>("production");

        factories
    }
}
