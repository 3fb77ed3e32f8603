use super::*;
use glam::Quat;

#[test]
fn test_empty_bounds() {
    let bounds = Bounds::empty();
    assert!(bounds.is_empty());
    assert_eq!(bounds.size(), Vec3::ZERO);
    assert_eq!(Bounds::default(), bounds);
}

#[test]
fn test_from_sphere() {
    let bounds = Bounds::from_sphere(Vec3::new(1.0, 0.0, 0.0), 2.0);
    assert_eq!(bounds.min, Vec3::new(-1.0, -2.0, -2.0));
    assert_eq!(bounds.max, Vec3::new(3.0, 2.0, 2.0));
    assert_eq!(bounds.center(), Vec3::new(1.0, 0.0, 0.0));
}

#[test]
fn test_from_points() {
    let points = [Vec3::new(1.0, 5.0, -1.0), Vec3::new(-2.0, 0.0, 3.0)];
    let bounds = Bounds::from_points(&points);
    assert_eq!(bounds.min, Vec3::new(-2.0, 0.0, -1.0));
    assert_eq!(bounds.max, Vec3::new(1.0, 5.0, 3.0));
}

#[test]
fn test_union_ignores_empty() {
    let a = Bounds::new(Vec3::ZERO, Vec3::ONE);
    assert_eq!(a.union(&Bounds::empty()), a);
    assert_eq!(Bounds::empty().union(&a), a);

    let b = Bounds::new(Vec3::splat(-1.0), Vec3::splat(0.5));
    let u = a.union(&b);
    assert_eq!(u.min, Vec3::splat(-1.0));
    assert_eq!(u.max, Vec3::ONE);
}

#[test]
fn test_transformed_translation() {
    let bounds = Bounds::new(Vec3::ZERO, Vec3::ONE);
    let moved = bounds.transformed(&Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0)));
    assert_eq!(moved.min, Vec3::new(10.0, 0.0, 0.0));
    assert_eq!(moved.max, Vec3::new(11.0, 1.0, 1.0));
}

#[test]
fn test_transformed_rotation_is_tight() {
    let bounds = Bounds::new(Vec3::new(-1.0, -2.0, -3.0), Vec3::new(1.0, 2.0, 3.0));
    let matrix = Mat4::from_quat(Quat::from_rotation_z(std::f32::consts::FRAC_PI_2));
    let rotated = bounds.transformed(&matrix);
    assert!((rotated.min - Vec3::new(-2.0, -1.0, -3.0)).length() < 1e-5);
    assert!((rotated.max - Vec3::new(2.0, 1.0, 3.0)).length() < 1e-5);
}

#[test]
fn test_transformed_empty_stays_empty() {
    let moved = Bounds::empty().transformed(&Mat4::from_scale(Vec3::splat(2.0)));
    assert!(moved.is_empty());
}

#[test]
fn test_contains_and_intersects() {
    let outer = Bounds::new(Vec3::ZERO, Vec3::splat(10.0));
    let inner = Bounds::new(Vec3::ONE, Vec3::splat(2.0));
    let apart = Bounds::new(Vec3::splat(20.0), Vec3::splat(21.0));

    assert!(outer.contains(&inner));
    assert!(!inner.contains(&outer));
    assert!(outer.intersects(&inner));
    assert!(!outer.intersects(&apart));
}
