/// Stock systems of geometry and light models

use glam::Vec4;
use serde_json::{json, Value};
use crate::engine_err;
use crate::engine_warn;
use crate::error::Result;
use crate::geometry::color_ramp::ColorRamp;
use crate::geometry::components::LightComponent;
use crate::geometry::geometry::Geometries;
use crate::geometry::report::ReportData;
use crate::math::{Bounds, Transform};
use crate::model::{
    BoundsSystem, ColorMethodInput, ColorSystem, Components, DataSystem, InspectContext,
    InspectSystem, UpdateSystem,
};
use crate::parameters::ParametersManager;

pub const SOLID_COLOR_METHOD: &str = "solid";
pub const PRIMITIVE_COLOR_METHOD: &str = "primitive";

// ===== BOUNDS =====

/// World-space bounds of `Geometries`
#[derive(Debug, Default)]
pub struct GeometryBoundsSystem;

impl BoundsSystem for GeometryBoundsSystem {
    fn compute(&self, transform: &Transform, components: &mut Components) -> Bounds {
        match components.find::<Geometries>() {
            Some(geometries) => geometries.bounds().transformed(&transform.to_matrix()),
            None => Bounds::empty(),
        }
    }
}

/// World-space bounds of the emitters of a `LightComponent`
#[derive(Debug, Default)]
pub struct LightBoundsSystem;

impl BoundsSystem for LightBoundsSystem {
    fn compute(&self, transform: &Transform, components: &mut Components) -> Bounds {
        let lights = match components.find::<LightComponent>() {
            Some(lights) => lights,
            None => return Bounds::empty(),
        };
        let local = lights.lights().iter()
            .fold(Bounds::empty(), |bounds, light| bounds.union(&light.bounds()));
        local.transformed(&transform.to_matrix())
    }
}

// ===== COLOR =====

/// Colors every geometry of a model.
///
/// - `solid`: variable `color`, applied to every primitive
/// - `primitive`: variables are primitive indices, applied to each geometry
///   holding that index
#[derive(Debug, Default)]
pub struct GeometryColorSystem;

fn unknown_method(method: &str) -> crate::error::Error {
    engine_err!("sciray::GeometryColorSystem", NotFound => "Unknown color method '{}'", method)
}

impl ColorSystem for GeometryColorSystem {
    fn methods(&self) -> Vec<String> {
        vec![SOLID_COLOR_METHOD.to_string(), PRIMITIVE_COLOR_METHOD.to_string()]
    }

    fn values(&self, method: &str, components: &mut Components) -> Result<Vec<String>> {
        match method {
            SOLID_COLOR_METHOD => Ok(vec!["color".to_string()]),
            PRIMITIVE_COLOR_METHOD => {
                let geometries = components.get::<Geometries>()?;
                let count = geometries.iter().map(|geometry| geometry.primitive_count()).max().unwrap_or(0);
                Ok((0..count).map(|index| index.to_string()).collect())
            }
            _ => Err(unknown_method(method)),
        }
    }

    fn apply(&self, method: &str, input: &ColorMethodInput, components: &mut Components) -> Result<()> {
        match method {
            SOLID_COLOR_METHOD => {
                let color = solid_color(input)?;
                let geometries = components.get_mut::<Geometries>()?;
                geometries.iter_mut().for_each(|geometry| geometry.set_color(color));
                Ok(())
            }
            PRIMITIVE_COLOR_METHOD => {
                let geometries = components.get_mut::<Geometries>()?;
                let max_count = geometries.iter().map(|geometry| geometry.primitive_count()).max().unwrap_or(0);
                let mut indexed = Vec::with_capacity(input.len());
                for (variable, color) in input {
                    match variable.parse::<usize>() {
                        Ok(index) if index < max_count => indexed.push((index, *color)),
                        _ => return Err(engine_err!("sciray::GeometryColorSystem", InvalidArgument =>
                            "Invalid primitive '{}' (model has {} primitives per geometry)", variable, max_count)),
                    }
                }
                for geometry in geometries.iter_mut() {
                    for (index, color) in &indexed {
                        if *index < geometry.primitive_count() {
                            geometry.set_primitive_color(*index, *color)?;
                        }
                    }
                }
                Ok(())
            }
            _ => Err(unknown_method(method)),
        }
    }
}

fn solid_color(input: &ColorMethodInput) -> Result<Vec4> {
    let mut color = None;
    for (variable, value) in input {
        if variable != "color" {
            return Err(engine_err!("sciray::GeometryColorSystem", InvalidArgument =>
                "Unknown variable '{}' for method 'solid'", variable));
        }
        color = Some(*value);
    }
    color.ok_or_else(|| engine_err!("sciray::GeometryColorSystem", InvalidArgument =>
        "Method 'solid' expects a 'color' variable"))
}

// ===== INSPECT / DATA =====

/// Describes the primitive hit by a pick query
#[derive(Debug, Default)]
pub struct GeometryInspectSystem;

impl InspectSystem for GeometryInspectSystem {
    fn execute(&self, context: &InspectContext, components: &mut Components) -> Value {
        let geometry = components.find::<Geometries>()
            .and_then(|geometries| geometries.get(context.geometry_index as usize));
        let geometry = match geometry {
            Some(geometry) => geometry,
            None => return Value::Null,
        };
        let primitive = context.primitive_index as usize;
        let description = match geometry.primitives().primitive_json(primitive) {
            Some(description) => description,
            None => return Value::Null,
        };

        let mut result = json!({
            "position": context.position.to_array(),
            "geometry_index": context.geometry_index,
            "primitive_index": context.primitive_index,
            "type": geometry.primitives().type_name(),
            "primitive": description,
        });
        if let Some(color) = geometry.primitive_color(primitive) {
            result["color"] = json!(color.to_array());
        }
        if let Some(report) = components.find::<ReportData>() {
            let value = report.applied_frame()
                .and_then(|frame| report.values(frame))
                .and_then(|values| values.get(primitive));
            if let Some(value) = value {
                result["value"] = json!(value);
                result["unit"] = json!(report.unit());
            }
        }
        result
    }
}

/// Summary of the geometries of a model
#[derive(Debug, Default)]
pub struct GeometryDataSystem;

impl DataSystem for GeometryDataSystem {
    fn get_data(&self, components: &mut Components) -> Result<Value> {
        let geometries = components.get::<Geometries>()?;
        let entries: Vec<Value> = geometries.iter()
            .map(|geometry| {
                let bounds = geometry.bounds();
                json!({
                    "type": geometry.primitives().type_name(),
                    "primitive_count": geometry.primitive_count(),
                    "bounds": { "min": bounds.min.to_array(), "max": bounds.max.to_array() },
                })
            })
            .collect();
        Ok(json!({ "geometries": entries, "primitive_count": geometries.primitive_count() }))
    }
}

// ===== UPDATE =====

/// Colors primitives from the report frame matching the current simulation
/// frame, through the model's `ColorRamp`
#[derive(Debug, Default)]
pub struct ReportUpdateSystem;

impl UpdateSystem for ReportUpdateSystem {
    fn execute(&self, parameters: &ParametersManager, components: &mut Components) {
        let frame = parameters.animation().current_frame();
        let (index, colors) = {
            let (report, ramp) = match (components.find::<ReportData>(), components.find::<ColorRamp>()) {
                (Some(report), Some(ramp)) => (report, ramp),
                _ => return,
            };
            let index = match report.frame_index(frame) {
                Some(index) => index,
                None => return,
            };
            if report.applied_frame() == Some(index) && !ramp.is_modified() {
                return;
            }
            let values = report.values(index).unwrap_or(&[]);
            let colors: Vec<Vec4> = values.iter().map(|value| ramp.get_color_for_value(*value)).collect();
            ramp.reset_modified();
            (index, colors)
        };

        if let Some(geometries) = components.find_mut::<Geometries>() {
            for geometry in geometries.iter_mut() {
                if geometry.primitive_count() != colors.len() {
                    engine_warn!("sciray::ReportUpdateSystem",
                        "Report holds {} values for {} primitives, geometry left unchanged",
                        colors.len(), geometry.primitive_count());
                    continue;
                }
                if let Err(error) = geometry.set_primitive_colors(colors.clone()) {
                    engine_warn!("sciray::ReportUpdateSystem", "Report colors not applied: {}", error);
                }
            }
        }
        if let Some(report) = components.find_mut::<ReportData>() {
            report.set_applied_frame(Some(index));
        }
    }
}

#[cfg(test)]
#[path = "systems_tests.rs"]
mod tests;
