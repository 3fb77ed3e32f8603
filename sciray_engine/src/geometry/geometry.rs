/// Geometry - CPU-side primitive data uploaded to backend Geometry objects
///
/// A `Geometry` holds one kind of primitive (spheres, capsules, boxes or a
/// triangle mesh) and its coloring: either a uniform color or one color per
/// primitive. Shape and colors carry separate dirty bits so that recoloring
/// never re-uploads the primitives.

use glam::{UVec3, Vec3, Vec4};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::device::{Device, ObjectHandle, ParamValue};
use crate::engine_err;
use crate::error::Result;
use crate::math::Bounds;
use crate::model::Component;
use crate::modified::ModifiedFlag;

// ===== PRIMITIVES =====

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

/// Cone segment between two spheres
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Capsule {
    pub p0: Vec3,
    pub r0: f32,
    pub p1: Vec3,
    pub r1: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxShape {
    pub min: Vec3,
    pub max: Vec3,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TriangleMesh {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    indices: Vec<UVec3>,
}

impl TriangleMesh {
    /// Fails with InvalidArgument if `normals` is neither empty nor one per
    /// position, or if an index is out of range
    pub fn new(positions: Vec<Vec3>, normals: Vec<Vec3>, indices: Vec<UVec3>) -> Result<Self> {
        if !normals.is_empty() && normals.len() != positions.len() {
            return Err(engine_err!("sciray::TriangleMesh", InvalidArgument =>
                "Mesh has {} normals for {} positions", normals.len(), positions.len()));
        }
        let count = positions.len() as u32;
        if let Some(triangle) = indices.iter().find(|triangle| triangle.max_element() >= count) {
            return Err(engine_err!("sciray::TriangleMesh", InvalidArgument =>
                "Triangle {:?} references a vertex out of range (mesh has {})", triangle, count));
        }
        Ok(Self { positions, normals, indices })
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn indices(&self) -> &[UVec3] {
        &self.indices
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }
}

/// Primitive payload of a geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Primitives {
    Spheres(Vec<Sphere>),
    Capsules(Vec<Capsule>),
    Boxes(Vec<BoxShape>),
    Mesh(TriangleMesh),
}

impl Primitives {
    /// Number of primitives (triangles for meshes)
    pub fn len(&self) -> usize {
        match self {
            Primitives::Spheres(spheres) => spheres.len(),
            Primitives::Capsules(capsules) => capsules.len(),
            Primitives::Boxes(boxes) => boxes.len(),
            Primitives::Mesh(mesh) => mesh.triangle_count(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Backend geometry subtype
    pub fn backend_subtype(&self) -> &'static str {
        match self {
            Primitives::Spheres(_) => "sphere",
            Primitives::Capsules(_) => "curve",
            Primitives::Boxes(_) => "box",
            Primitives::Mesh(_) => "mesh",
        }
    }

    /// Short name used in data exports
    pub fn type_name(&self) -> &'static str {
        match self {
            Primitives::Spheres(_) => "spheres",
            Primitives::Capsules(_) => "capsules",
            Primitives::Boxes(_) => "boxes",
            Primitives::Mesh(_) => "mesh",
        }
    }

    /// Local-space bounds of one primitive
    pub fn primitive_bounds(&self, index: usize) -> Option<Bounds> {
        match self {
            Primitives::Spheres(spheres) => spheres.get(index)
                .map(|sphere| Bounds::from_sphere(sphere.center, sphere.radius)),
            Primitives::Capsules(capsules) => capsules.get(index).map(|capsule| {
                Bounds::from_sphere(capsule.p0, capsule.r0)
                    .union(&Bounds::from_sphere(capsule.p1, capsule.r1))
            }),
            Primitives::Boxes(boxes) => boxes.get(index).map(|shape| Bounds::new(shape.min, shape.max)),
            Primitives::Mesh(mesh) => mesh.indices.get(index).map(|triangle| {
                Bounds::from_points(triangle.to_array().iter().map(|&vertex| &mesh.positions[vertex as usize]))
            }),
        }
    }

    /// Local-space bounds of every primitive
    pub fn bounds(&self) -> Bounds {
        if let Primitives::Mesh(mesh) = self {
            return Bounds::from_points(mesh.positions.iter());
        }
        let mut bounds = Bounds::empty();
        for index in 0..self.len() {
            if let Some(primitive) = self.primitive_bounds(index) {
                bounds.expand(&primitive);
            }
        }
        bounds
    }

    /// JSON description of one primitive
    pub fn primitive_json(&self, index: usize) -> Option<Value> {
        let value = match self {
            Primitives::Spheres(spheres) => serde_json::to_value(spheres.get(index)?),
            Primitives::Capsules(capsules) => serde_json::to_value(capsules.get(index)?),
            Primitives::Boxes(boxes) => serde_json::to_value(boxes.get(index)?),
            Primitives::Mesh(mesh) => {
                let triangle = mesh.indices.get(index)?;
                let vertices: Vec<Vec3> = triangle.to_array().iter()
                    .map(|&vertex| mesh.positions[vertex as usize])
                    .collect();
                serde_json::to_value(vertices)
            }
        };
        value.ok()
    }

    fn push_params(&self, device: &mut dyn Device, handle: ObjectHandle) -> Result<()> {
        match self {
            Primitives::Spheres(spheres) => {
                device.set_param(handle, "sphere.position",
                    ParamValue::Vec3Array(spheres.iter().map(|sphere| sphere.center).collect()))?;
                device.set_param(handle, "sphere.radius",
                    ParamValue::FloatArray(spheres.iter().map(|sphere| sphere.radius).collect()))?;
            }
            Primitives::Capsules(capsules) => {
                let vertices = capsules.iter()
                    .flat_map(|capsule| [capsule.p0.extend(capsule.r0), capsule.p1.extend(capsule.r1)])
                    .collect();
                let segments = (0..capsules.len() as u32).map(|index| index * 2).collect();
                device.set_param(handle, "vertex.position_radius", ParamValue::Vec4Array(vertices))?;
                device.set_param(handle, "index", ParamValue::UIntArray(segments))?;
            }
            Primitives::Boxes(boxes) => {
                let corners = boxes.iter().flat_map(|shape| [shape.min, shape.max]).collect();
                device.set_param(handle, "box", ParamValue::Vec3Array(corners))?;
            }
            Primitives::Mesh(mesh) => {
                device.set_param(handle, "vertex.position", ParamValue::Vec3Array(mesh.positions.clone()))?;
                if mesh.normals.is_empty() {
                    device.remove_param(handle, "vertex.normal")?;
                } else {
                    device.set_param(handle, "vertex.normal", ParamValue::Vec3Array(mesh.normals.clone()))?;
                }
                let indices = mesh.indices.iter().flat_map(|triangle| triangle.to_array()).collect();
                device.set_param(handle, "index", ParamValue::UIntArray(indices))?;
            }
        }
        Ok(())
    }
}

// ===== GEOMETRY =====

pub const DEFAULT_GEOMETRY_COLOR: Vec4 = Vec4::new(0.8, 0.8, 0.8, 1.0);

#[derive(Debug, Clone)]
pub struct Geometry {
    primitives: Primitives,
    color: Vec4,
    /// Empty for a uniform color
    primitive_colors: Vec<Vec4>,
    shape_flag: ModifiedFlag,
    color_flag: ModifiedFlag,
}

impl Geometry {
    pub fn new(primitives: Primitives) -> Self {
        Self {
            primitives,
            color: DEFAULT_GEOMETRY_COLOR,
            primitive_colors: Vec::new(),
            shape_flag: ModifiedFlag::new(),
            color_flag: ModifiedFlag::new(),
        }
    }

    pub fn spheres(spheres: Vec<Sphere>) -> Self {
        Self::new(Primitives::Spheres(spheres))
    }

    pub fn capsules(capsules: Vec<Capsule>) -> Self {
        Self::new(Primitives::Capsules(capsules))
    }

    pub fn boxes(boxes: Vec<BoxShape>) -> Self {
        Self::new(Primitives::Boxes(boxes))
    }

    pub fn mesh(mesh: TriangleMesh) -> Self {
        Self::new(Primitives::Mesh(mesh))
    }

    pub fn primitives(&self) -> &Primitives {
        &self.primitives
    }

    /// Replace the primitives. Per-primitive colors are dropped if the
    /// primitive count changes.
    pub fn set_primitives(&mut self, primitives: Primitives) {
        if primitives.len() != self.primitives.len() && !self.primitive_colors.is_empty() {
            self.primitive_colors.clear();
            self.color_flag.mark_modified();
        }
        self.primitives = primitives;
        self.shape_flag.mark_modified();
    }

    pub fn primitive_count(&self) -> usize {
        self.primitives.len()
    }

    pub fn backend_subtype(&self) -> &'static str {
        self.primitives.backend_subtype()
    }

    /// Local-space bounds
    pub fn bounds(&self) -> Bounds {
        self.primitives.bounds()
    }

    // ===== COLORS =====

    pub fn color(&self) -> Vec4 {
        self.color
    }

    /// Color every primitive with `color`
    pub fn set_color(&mut self, color: Vec4) {
        if !self.primitive_colors.is_empty() {
            self.primitive_colors.clear();
            self.color_flag.mark_modified();
        }
        self.color_flag.update(&mut self.color, color);
    }

    /// Per-primitive colors (empty when the geometry is uniformly colored)
    pub fn primitive_colors(&self) -> &[Vec4] {
        &self.primitive_colors
    }

    /// Color of one primitive
    pub fn primitive_color(&self, index: usize) -> Option<Vec4> {
        if index >= self.primitive_count() {
            return None;
        }
        Some(self.primitive_colors.get(index).copied().unwrap_or(self.color))
    }

    /// Fails with InvalidArgument unless there is one color per primitive
    pub fn set_primitive_colors(&mut self, colors: Vec<Vec4>) -> Result<()> {
        if colors.len() != self.primitive_count() {
            return Err(engine_err!("sciray::Geometry", InvalidArgument =>
                "Expected {} primitive colors, got {}", self.primitive_count(), colors.len()));
        }
        self.color_flag.update(&mut self.primitive_colors, colors);
        Ok(())
    }

    /// Fails with InvalidArgument for an index out of range
    pub fn set_primitive_color(&mut self, index: usize, color: Vec4) -> Result<()> {
        let count = self.primitive_count();
        if index >= count {
            return Err(engine_err!("sciray::Geometry", InvalidArgument =>
                "Primitive index {} out of range (geometry has {})", index, count));
        }
        if self.primitive_colors.is_empty() {
            self.primitive_colors = vec![self.color; count];
        }
        self.color_flag.update(&mut self.primitive_colors[index], color);
        Ok(())
    }

    // ===== BACKEND SYNC =====

    /// Whether primitives changed since the last upload
    pub fn is_shape_modified(&self) -> bool {
        self.shape_flag.is_modified()
    }

    /// Whether colors changed since the last upload
    pub fn is_color_modified(&self) -> bool {
        self.color_flag.is_modified()
    }

    /// Force a full upload at the next commit
    pub fn mark_modified(&self) {
        self.shape_flag.mark_modified();
        self.color_flag.mark_modified();
    }

    /// Upload primitives to a backend Geometry
    pub fn push_shape(&self, device: &mut dyn Device, geometry: ObjectHandle) -> Result<()> {
        self.primitives.push_params(device, geometry)?;
        self.shape_flag.reset_modified();
        Ok(())
    }

    /// Upload colors to a backend GeometricModel
    pub fn push_colors(&self, device: &mut dyn Device, model: ObjectHandle) -> Result<()> {
        let value = if self.primitive_colors.is_empty() {
            ParamValue::Vec4(self.color)
        } else {
            ParamValue::Vec4Array(self.primitive_colors.clone())
        };
        device.set_param(model, "color", value)?;
        self.color_flag.reset_modified();
        Ok(())
    }
}

// ===== GEOMETRIES COMPONENT =====

/// The geometries of a model
#[derive(Debug, Clone, Default)]
pub struct Geometries {
    items: Vec<Geometry>,
    /// Set when geometries are added or removed
    structure_flag: ModifiedFlag,
}

impl Geometries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a geometry and return its index
    pub fn add(&mut self, geometry: Geometry) -> usize {
        self.items.push(geometry);
        self.structure_flag.mark_modified();
        self.items.len() - 1
    }

    /// Fails with NotFound for an index out of range
    pub fn remove(&mut self, index: usize) -> Result<Geometry> {
        if index >= self.items.len() {
            return Err(engine_err!("sciray::Geometries", NotFound =>
                "Geometry {} not found (model has {})", index, self.items.len()));
        }
        self.structure_flag.mark_modified();
        Ok(self.items.remove(index))
    }

    pub fn get(&self, index: usize) -> Option<&Geometry> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Geometry> {
        self.items.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Geometry> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Geometry> {
        self.items.iter_mut()
    }

    /// Total number of primitives
    pub fn primitive_count(&self) -> usize {
        self.items.iter().map(Geometry::primitive_count).sum()
    }

    /// Local-space bounds of every geometry
    pub fn bounds(&self) -> Bounds {
        self.items.iter().fold(Bounds::empty(), |bounds, geometry| bounds.union(&geometry.bounds()))
    }

    /// Whether geometries were added or removed since `reset_structure_modified()`
    pub fn is_structure_modified(&self) -> bool {
        self.structure_flag.is_modified()
    }

    pub fn reset_structure_modified(&self) {
        self.structure_flag.reset_modified();
    }
}

impl From<Vec<Geometry>> for Geometries {
    fn from(items: Vec<Geometry>) -> Self {
        Self { items, structure_flag: ModifiedFlag::new() }
    }
}

impl Component for Geometries {}

#[cfg(test)]
#[path = "geometry_tests.rs"]
mod tests;
