//! Spatial types shared by models, systems and the scene.

mod bounds;
mod transform;

pub use bounds::Bounds;
pub use transform::Transform;
