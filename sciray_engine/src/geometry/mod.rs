/// Geometry module - primitive data, stock components and systems
///
/// Everything needed to turn spheres, capsules, boxes and meshes into a
/// renderable `Model`. `ModelBuilder` wires the usual combination.

pub mod geometry;
pub mod color_ramp;
pub mod report;
pub mod components;
pub mod systems;
pub mod builder;

pub use geometry::{
    BoxShape, Capsule, Geometries, Geometry, Primitives, Sphere, TriangleMesh, DEFAULT_GEOMETRY_COLOR,
};
pub use color_ramp::ColorRamp;
pub use report::ReportData;
pub use components::{GeometryRendererComponent, LightComponent, MaterialComponent};
pub use systems::{
    GeometryBoundsSystem, GeometryColorSystem, GeometryDataSystem, GeometryInspectSystem,
    LightBoundsSystem, ReportUpdateSystem, PRIMITIVE_COLOR_METHOD, SOLID_COLOR_METHOD,
};
pub use builder::ModelBuilder;
