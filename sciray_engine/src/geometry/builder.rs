/// ModelBuilder - assembles the standard geometry and light models
///
/// ```no_run
/// use sciray_engine::sciray::geometry::{Geometry, ModelBuilder, Sphere};
/// use sciray_engine::glam::Vec3;
///
/// let model = ModelBuilder::new("spheres")
///     .geometry(Geometry::spheres(vec![Sphere { center: Vec3::ZERO, radius: 1.0 }]))
///     .build();
/// ```

use crate::geometry::color_ramp::ColorRamp;
use crate::geometry::components::{GeometryRendererComponent, LightComponent, MaterialComponent};
use crate::geometry::geometry::{Geometries, Geometry};
use crate::geometry::report::ReportData;
use crate::geometry::systems::{
    GeometryBoundsSystem, GeometryColorSystem, GeometryDataSystem, GeometryInspectSystem,
    LightBoundsSystem, ReportUpdateSystem,
};
use crate::model::Model;
use crate::object::{Light, Material};

pub struct ModelBuilder {
    model_type: String,
    geometries: Vec<Geometry>,
    material: Option<Box<dyn Material>>,
    lights: Vec<Box<dyn Light>>,
    color_ramp: Option<ColorRamp>,
    report: Option<ReportData>,
}

impl ModelBuilder {
    pub fn new(model_type: impl Into<String>) -> Self {
        Self {
            model_type: model_type.into(),
            geometries: Vec::new(),
            material: None,
            lights: Vec::new(),
            color_ramp: None,
            report: None,
        }
    }

    pub fn geometry(mut self, geometry: Geometry) -> Self {
        self.geometries.push(geometry);
        self
    }

    pub fn geometries(mut self, geometries: impl IntoIterator<Item = Geometry>) -> Self {
        self.geometries.extend(geometries);
        self
    }

    /// Material of every geometry (matte if never set)
    pub fn material(mut self, material: Box<dyn Material>) -> Self {
        self.material = Some(material);
        self
    }

    pub fn light(mut self, light: Box<dyn Light>) -> Self {
        self.lights.push(light);
        self
    }

    pub fn color_ramp(mut self, color_ramp: ColorRamp) -> Self {
        self.color_ramp = Some(color_ramp);
        self
    }

    /// Per-frame values colored through the color ramp (default ramp if none)
    pub fn report(mut self, report: ReportData) -> Self {
        self.report = Some(report);
        self
    }

    /// Build the model.
    ///
    /// Geometries get the geometry systems (bounds, color, inspect, data);
    /// light-only models get light bounds. A report adds the report update
    /// system.
    pub fn build(self) -> Model {
        let mut model = Model::new(self.model_type);
        let has_geometries = !self.geometries.is_empty();

        if has_geometries {
            model.add_component(Geometries::from(self.geometries));
            model.add_component(MaterialComponent::new(
                self.material.unwrap_or_else(|| Box::new(crate::object::MatteMaterial::default()))));
            model.add_component(GeometryRendererComponent::new());

            let systems = model.systems_mut();
            systems.set_bounds_system(GeometryBoundsSystem);
            systems.set_color_system(GeometryColorSystem);
            systems.set_inspect_system(GeometryInspectSystem);
            systems.set_data_system(GeometryDataSystem);
        }

        if !self.lights.is_empty() {
            let component = model.add_component(LightComponent::new());
            for light in self.lights {
                component.add(light);
            }
            if !has_geometries {
                model.systems_mut().set_bounds_system(LightBoundsSystem);
            }
        }

        if let Some(report) = self.report {
            model.add_component(report);
            model.add_component(self.color_ramp.unwrap_or_default());
            model.systems_mut().set_update_system(ReportUpdateSystem);
        } else if let Some(color_ramp) = self.color_ramp {
            model.add_component(color_ramp);
        }

        model
    }
}
