use super::*;
use glam::{Vec2, Vec3};
use crate::error::Error;
use crate::geometry::builder::ModelBuilder;
use crate::geometry::geometry::{Geometry, Sphere};
use crate::model::Model;
use crate::object::SphereLight;

fn spheres(count: usize) -> Geometry {
    Geometry::spheres((0..count)
        .map(|index| Sphere { center: Vec3::new(index as f32 * 2.0, 0.0, 0.0), radius: 1.0 })
        .collect())
}

fn geometries(model: &Model) -> &Geometries {
    model.get_component::<Geometries>().unwrap()
}

// ============================================================================
// Bounds
// ============================================================================

#[test]
fn test_geometry_bounds_follow_transform() {
    let mut model = ModelBuilder::new("spheres").geometry(spheres(2)).build();
    let bounds = model.compute_bounds(&Transform::from_translation(Vec3::new(10.0, 0.0, 0.0)));
    assert_eq!(bounds.min, Vec3::new(9.0, -1.0, -1.0));
    assert_eq!(bounds.max, Vec3::new(13.0, 1.0, 1.0));
}

#[test]
fn test_light_bounds() {
    let mut light = SphereLight::default();
    light.set_radius(1.0).unwrap();
    let mut model = ModelBuilder::new("light").light(Box::new(light)).build();
    let bounds = model.compute_bounds(&Transform::from_translation(Vec3::Y));
    assert_eq!(bounds.center(), Vec3::Y);
    assert_eq!(bounds.size(), Vec3::splat(2.0));
}

// ============================================================================
// Color
// ============================================================================

#[test]
fn test_color_methods_and_values() {
    let mut model = ModelBuilder::new("spheres").geometry(spheres(3)).build();
    let mut view = model.systems_view();
    assert_eq!(view.get_color_methods(), vec!["solid", "primitive"]);
    assert_eq!(view.get_color_values("solid").unwrap(), vec!["color"]);
    assert_eq!(view.get_color_values("primitive").unwrap(), vec!["0", "1", "2"]);
    assert!(matches!(view.get_color_values("rainbow"), Err(Error::NotFound(_))));
}

#[test]
fn test_apply_solid_color() {
    let mut model = ModelBuilder::new("spheres").geometry(spheres(2)).geometry(spheres(1)).build();
    model.systems_view().apply_color("solid", &vec![("color".to_string(), Vec4::X)]).unwrap();
    assert!(geometries(&model).iter().all(|geometry| geometry.color() == Vec4::X));

    let result = model.systems_view().apply_color("solid", &vec![("colour".to_string(), Vec4::X)]);
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
    let result = model.systems_view().apply_color("solid", &vec![]);
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
}

#[test]
fn test_apply_primitive_colors() {
    let mut model = ModelBuilder::new("spheres").geometry(spheres(3)).geometry(spheres(1)).build();
    let input = vec![("0".to_string(), Vec4::X), ("2".to_string(), Vec4::Y)];
    model.systems_view().apply_color("primitive", &input).unwrap();

    let first = geometries(&model).get(0).unwrap();
    assert_eq!(first.primitive_color(0), Some(Vec4::X));
    assert_eq!(first.primitive_color(2), Some(Vec4::Y));
    assert_eq!(geometries(&model).get(1).unwrap().primitive_color(0), Some(Vec4::X));

    for bad in ["3", "-1", "first"] {
        let result = model.systems_view().apply_color("primitive", &vec![(bad.to_string(), Vec4::Z)]);
        assert!(matches!(result, Err(Error::InvalidArgument(_))), "variable {}", bad);
    }
    assert!(matches!(model.systems_view().apply_color("nope", &vec![]), Err(Error::NotFound(_))));
}

// ============================================================================
// Inspect / data
// ============================================================================

#[test]
fn test_inspect_hit_primitive() {
    let mut model = ModelBuilder::new("spheres").geometry(spheres(2)).build();
    let context = InspectContext { position: Vec3::new(2.0, 1.0, 0.0), geometry_index: 0, primitive_index: 1 };
    let result = model.systems_view().inspect(&context);

    assert_eq!(result["type"], "spheres");
    assert_eq!(result["primitive"]["center"], serde_json::json!([2.0, 0.0, 0.0]));
    assert_eq!(result["primitive_index"], 1);
    assert!(result.get("value").is_none());

    let miss = InspectContext { primitive_index: 5, ..context };
    assert!(model.systems_view().inspect(&miss).is_null());
    let miss = InspectContext { geometry_index: 1, ..context };
    assert!(model.systems_view().inspect(&miss).is_null());
}

#[test]
fn test_data_summary() {
    let mut model = ModelBuilder::new("spheres").geometry(spheres(2)).geometry(spheres(3)).build();
    let data = model.systems_view().get_data().unwrap();
    assert_eq!(data["primitive_count"], 5);
    assert_eq!(data["geometries"].as_array().unwrap().len(), 2);
    assert_eq!(data["geometries"][1]["bounds"]["max"], serde_json::json!([5.0, 1.0, 1.0]));
}

// ============================================================================
// Report update
// ============================================================================

fn report_model() -> Model {
    let ramp = ColorRamp::new(vec![Vec4::ZERO, Vec4::ONE], Vec2::new(0.0, 1.0)).unwrap();
    let report = ReportData::new(5, vec![vec![0.0, 1.0], vec![1.0, 0.5]], "mV").unwrap();
    ModelBuilder::new("report").geometry(spheres(2)).color_ramp(ramp).report(report).build()
}

#[test]
fn test_report_colors_follow_current_frame() {
    let mut model = report_model();
    let mut parameters = ParametersManager::new();
    parameters.animation_mut().set_frame_range(0, 10).unwrap();

    model.systems_view().update(&parameters);
    assert_eq!(geometries(&model).get(0).unwrap().primitive_colors(), &[Vec4::ZERO, Vec4::ONE]);
    assert_eq!(model.get_component::<ReportData>().unwrap().applied_frame(), Some(0));

    parameters.animation_mut().set_current_frame(9);
    model.systems_view().update(&parameters);
    assert_eq!(geometries(&model).get(0).unwrap().primitive_colors(), &[Vec4::ONE, Vec4::splat(0.5)]);

    let context = InspectContext { position: Vec3::ZERO, geometry_index: 0, primitive_index: 1 };
    let result = model.systems_view().inspect(&context);
    assert_eq!(result["value"], 0.5);
    assert_eq!(result["unit"], "mV");
}

#[test]
fn test_report_update_skips_unchanged_frame() {
    let mut model = report_model();
    let parameters = ParametersManager::new();
    model.systems_view().update(&parameters);

    model.get_component_mut::<Geometries>().unwrap().get_mut(0).unwrap().set_color(Vec4::X);
    model.systems_view().update(&parameters);
    assert!(geometries(&model).get(0).unwrap().primitive_colors().is_empty());

    model.get_component_mut::<ColorRamp>().unwrap().set_range(Vec2::new(0.0, 2.0)).unwrap();
    model.systems_view().update(&parameters);
    assert_eq!(geometries(&model).get(0).unwrap().primitive_colors()[1], Vec4::splat(0.5));
}

#[test]
fn test_report_size_mismatch_leaves_geometry() {
    let report = ReportData::new(0, vec![vec![0.5; 3]], "mV").unwrap();
    let mut model = ModelBuilder::new("report").geometry(spheres(2)).report(report).build();
    model.systems_view().update(&ParametersManager::new());
    assert!(geometries(&model).get(0).unwrap().primitive_colors().is_empty());
}
