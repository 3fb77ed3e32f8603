/// Ray caster of the CPU device
///
/// A `RenderScene` is a flat, world-space snapshot of the committed object
/// graph (world -> instances -> group -> geometric models -> geometry),
/// rebuilt for every pass. Curves are not traced.

use glam::{Mat4, Vec2, Vec3, Vec4};

/// Shading of a hit: ambient part, the rest follows the headlight
const AMBIENT: f32 = 0.25;

#[derive(Debug, Clone, Copy)]
pub(crate) struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

// ===== CAMERA =====

#[derive(Debug, Clone, Copy)]
pub(crate) enum Projection {
    /// Vertical field of view in degrees
    Perspective { fovy: f32 },
    /// Height of the view volume in world units
    Orthographic { height: f32 },
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct CameraRig {
    pub position: Vec3,
    pub direction: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub projection: Projection,
}

impl CameraRig {
    /// Ray through `uv` in [0, 1]^2, (0, 0) being the bottom-left corner
    pub(crate) fn ray(&self, uv: Vec2) -> Ray {
        let forward = self.direction.normalize_or_zero();
        let right = forward.cross(self.up).normalize_or_zero();
        let up = right.cross(forward);
        let offset = uv * 2.0 - Vec2::ONE;

        match self.projection {
            Projection::Perspective { fovy } => {
                let half_height = (fovy.to_radians() * 0.5).tan();
                let half_width = half_height * self.aspect;
                let direction = forward + right * (offset.x * half_width) + up * (offset.y * half_height);
                Ray { origin: self.position, direction: direction.normalize() }
            }
            Projection::Orthographic { height } => {
                let half_height = height * 0.5;
                let half_width = half_height * self.aspect;
                let origin = self.position + right * (offset.x * half_width) + up * (offset.y * half_height);
                Ray { origin, direction: forward }
            }
        }
    }
}

// ===== PRIMITIVES =====

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Shape {
    Sphere { center: Vec3, radius: f32 },
    /// Axis-aligned box in world space
    Box { min: Vec3, max: Vec3 },
    Triangle { a: Vec3, b: Vec3, c: Vec3 },
}

impl Shape {
    /// Closest hit distance in (epsilon, max) and the surface normal
    fn intersect(&self, ray: &Ray, max: f32) -> Option<(f32, Vec3)> {
        const EPSILON: f32 = 1e-4;
        match *self {
            Shape::Sphere { center, radius } => {
                let oc = ray.origin - center;
                let b = oc.dot(ray.direction);
                let c = oc.length_squared() - radius * radius;
                let discriminant = b * b - c;
                if discriminant < 0.0 {
                    return None;
                }
                let root = discriminant.sqrt();
                let t = [-b - root, -b + root].into_iter().find(|t| *t > EPSILON && *t < max)?;
                Some((t, (ray.at(t) - center) / radius))
            }
            Shape::Box { min, max: corner } => {
                let inverse = ray.direction.recip();
                let t0 = (min - ray.origin) * inverse;
                let t1 = (corner - ray.origin) * inverse;
                let near = t0.min(t1);
                let far = t0.max(t1);
                let t_near = near.max_element();
                let t_far = far.min_element();
                if t_near > t_far {
                    return None;
                }
                let t = if t_near > EPSILON { t_near } else { t_far };
                if t <= EPSILON || t >= max {
                    return None;
                }
                let point = ray.at(t);
                let center = (min + corner) * 0.5;
                let local = (point - center) / ((corner - min) * 0.5).max(Vec3::splat(EPSILON));
                let axis = local.abs().max_element();
                let normal = Vec3::select(local.abs().cmpeq(Vec3::splat(axis)), local.signum(), Vec3::ZERO);
                Some((t, normal.normalize_or_zero()))
            }
            Shape::Triangle { a, b, c } => {
                // Möller-Trumbore
                let edge1 = b - a;
                let edge2 = c - a;
                let p = ray.direction.cross(edge2);
                let determinant = edge1.dot(p);
                if determinant.abs() < 1e-8 {
                    return None;
                }
                let inverse = 1.0 / determinant;
                let s = ray.origin - a;
                let u = s.dot(p) * inverse;
                if !(0.0..=1.0).contains(&u) {
                    return None;
                }
                let q = s.cross(edge1);
                let v = ray.direction.dot(q) * inverse;
                if v < 0.0 || u + v > 1.0 {
                    return None;
                }
                let t = edge2.dot(q) * inverse;
                if t <= EPSILON || t >= max {
                    return None;
                }
                Some((t, edge1.cross(edge2).normalize_or_zero()))
            }
        }
    }

    /// World-space copy of a local shape
    pub(crate) fn transformed(&self, transform: &Mat4) -> Shape {
        match *self {
            Shape::Sphere { center, radius } => {
                let (scale, _, _) = transform.to_scale_rotation_translation();
                Shape::Sphere {
                    center: transform.transform_point3(center),
                    radius: radius * scale.abs().max_element(),
                }
            }
            Shape::Box { min, max } => {
                let mut world_min = Vec3::splat(f32::INFINITY);
                let mut world_max = Vec3::splat(f32::NEG_INFINITY);
                for index in 0..8 {
                    let corner = Vec3::new(
                        if index & 1 == 0 { min.x } else { max.x },
                        if index & 2 == 0 { min.y } else { max.y },
                        if index & 4 == 0 { min.z } else { max.z },
                    );
                    let corner = transform.transform_point3(corner);
                    world_min = world_min.min(corner);
                    world_max = world_max.max(corner);
                }
                Shape::Box { min: world_min, max: world_max }
            }
            Shape::Triangle { a, b, c } => Shape::Triangle {
                a: transform.transform_point3(a),
                b: transform.transform_point3(b),
                c: transform.transform_point3(c),
            },
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Primitive {
    pub shape: Shape,
    pub color: Vec4,
}

// ===== SCENE =====

pub(crate) struct RenderScene {
    pub camera: CameraRig,
    pub background: Vec4,
    pub primitives: Vec<Primitive>,
}

/// Result of one traced sample
#[derive(Debug, Clone, Copy)]
pub(crate) struct Sample {
    pub color: Vec4,
    /// Hit distance, infinity on miss
    pub depth: f32,
}

impl RenderScene {
    pub(crate) fn trace(&self, uv: Vec2) -> Sample {
        let ray = self.camera.ray(uv);
        let mut closest = f32::INFINITY;
        let mut hit: Option<(Vec3, Vec4)> = None;

        for primitive in &self.primitives {
            if let Some((t, normal)) = primitive.shape.intersect(&ray, closest) {
                closest = t;
                hit = Some((normal, primitive.color));
            }
        }

        match hit {
            Some((normal, color)) => {
                let facing = normal.dot(-ray.direction).abs();
                let shade = AMBIENT + (1.0 - AMBIENT) * facing;
                Sample { color: (color.truncate() * shade).extend(color.w), depth: closest }
            }
            None => Sample { color: self.background, depth: f32::INFINITY },
        }
    }
}

/// Radical inverse of `index` in `base`: low-discrepancy pixel jitter
pub(crate) fn halton(mut index: u32, base: u32) -> f32 {
    let mut result = 0.0;
    let mut fraction = 1.0 / base as f32;
    while index > 0 {
        result += (index % base) as f32 * fraction;
        index /= base;
        fraction /= base as f32;
    }
    result
}
