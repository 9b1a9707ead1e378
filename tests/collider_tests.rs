use approx::assert_abs_diff_eq;
use jiggle_bones::*;

fn prepared(config: ColliderConfig, world: Transform) -> BoneCollider {
    let mut collider = BoneCollider::new(config);
    collider.prepare(&world);
    collider
}

#[test]
fn penetrating_particle_is_pushed_to_sphere_surface() {
    let collider = prepared(ColliderConfig::sphere(1.0), Transform::IDENTITY);
    let mut position = Vec3::new(0.5, 0.0, 0.0);

    assert!(collider.collide(&mut position, 0.25));
    assert!(position.abs_diff_eq(Vec3::new(1.25, 0.0, 0.0), 1e-6));

    // A second pass finds the particle resting on the surface.
    assert!(!collider.collide(&mut position, 0.25));
    assert!(position.abs_diff_eq(Vec3::new(1.25, 0.0, 0.0), 1e-6));
}

#[test]
fn particle_outside_sphere_is_untouched() {
    let collider = prepared(ColliderConfig::sphere(1.0), Transform::IDENTITY);
    let mut position = Vec3::new(0.0, 2.0, 0.0);
    assert!(!collider.collide(&mut position, 0.5));
    assert_eq!(position, Vec3::new(0.0, 2.0, 0.0));
}

#[test]
fn zero_separation_is_not_a_collision() {
    let collider = prepared(ColliderConfig::sphere(1.0), Transform::IDENTITY);
    let mut position = Vec3::ZERO;
    assert!(!collider.collide(&mut position, 0.1));
    assert!(position.is_finite());
    assert_eq!(position, Vec3::ZERO);
}

#[test]
fn inside_sphere_pulls_escaping_particle_back() {
    let collider = prepared(ColliderConfig::sphere(2.0).inside(), Transform::IDENTITY);
    let mut position = Vec3::new(3.0, 0.0, 0.0);
    assert!(collider.collide(&mut position, 0.5));
    assert!(position.abs_diff_eq(Vec3::new(1.5, 0.0, 0.0), 1e-6));

    let mut contained = Vec3::new(0.5, 0.0, 0.0);
    assert!(!collider.collide(&mut contained, 0.5));
}

#[test]
fn capsule_uses_end_cap_beyond_segment() {
    let collider = prepared(ColliderConfig::capsule(0.5, 3.0), Transform::IDENTITY);
    let PreparedShape::OutsideCapsule { c0, c1, .. } = *collider.shape() else {
        panic!("expected a capsule, got {:?}", collider.shape());
    };
    assert!(c0.abs_diff_eq(Vec3::new(0.0, 1.0, 0.0), 1e-6));
    assert!(c1.abs_diff_eq(Vec3::new(0.0, -1.0, 0.0), 1e-6));

    let mut position = Vec3::new(0.0, 1.2, 0.1);
    assert!(collider.collide(&mut position, 0.0));
    assert_abs_diff_eq!(position.distance(c0), 0.5, epsilon = 1e-5);
}

#[test]
fn capsule_pushes_out_along_segment_normal() {
    let collider = prepared(ColliderConfig::capsule(0.5, 3.0), Transform::IDENTITY);
    let mut position = Vec3::new(0.2, 0.3, 0.0);
    assert!(collider.collide(&mut position, 0.1));
    assert!(position.abs_diff_eq(Vec3::new(0.6, 0.3, 0.0), 1e-5));
}

#[test]
fn prepare_bakes_bone_transform_and_scale() {
    let config = ColliderConfig::sphere(0.5).with_center(Vec3::new(0.0, 1.0, 0.0));
    let world = Transform::from_position(Vec3::new(5.0, 0.0, 0.0)).with_scale(Vec3::splat(2.0));
    let collider = prepared(config, world);

    assert_eq!(collider.scale, 2.0);
    let PreparedShape::OutsideSphere { center, radius } = *collider.shape() else {
        panic!("expected a sphere, got {:?}", collider.shape());
    };
    assert!(center.abs_diff_eq(Vec3::new(5.0, 2.0, 0.0), 1e-6));
    assert_abs_diff_eq!(radius, 1.0, epsilon = 1e-6);

    let mut position = Vec3::new(5.5, 2.0, 0.0);
    assert!(collider.collide(&mut position, 0.0));
    assert!(position.abs_diff_eq(Vec3::new(6.0, 2.0, 0.0), 1e-5));
}

#[test]
fn tapered_capsule_with_short_height_becomes_largest_sphere() {
    let collider = prepared(
        ColliderConfig::tapered_capsule(0.4, 1.0, 1.5),
        Transform::IDENTITY,
    );
    let PreparedShape::OutsideSphere { radius, .. } = *collider.shape() else {
        panic!("expected a sphere, got {:?}", collider.shape());
    };
    assert_abs_diff_eq!(radius, 1.0, epsilon = 1e-6);
}

#[test]
fn unprepared_collider_is_stale() {
    let collider = BoneCollider::new(ColliderConfig::sphere(1.0));
    assert_eq!(*collider.shape(), PreparedShape::Stale);
    let mut position = Vec3::new(0.1, 0.0, 0.0);
    assert!(!collider.collide(&mut position, 0.0));
}

#[test]
fn inside_tapered_capsule_pulls_back_to_interpolated_radius() {
    let collider = prepared(
        ColliderConfig::tapered_capsule(1.0, 0.5, 4.0)
            .with_direction(Axis::X)
            .inside(),
        Transform::IDENTITY,
    );
    assert!(matches!(
        collider.shape(),
        PreparedShape::InsideTaperedCapsule { .. }
    ));

    // Midway along the segment the radius is 0.75, minus the particle radius.
    let mut escaping = Vec3::new(-0.25, 2.0, 0.0);
    assert!(collider.collide(&mut escaping, 0.25));
    assert!(escaping.abs_diff_eq(Vec3::new(-0.25, 0.5, 0.0), 1e-5));

    let mut contained = Vec3::new(-0.25, 0.3, 0.0);
    assert!(!collider.collide(&mut contained, 0.25));
    assert_eq!(contained, Vec3::new(-0.25, 0.3, 0.0));
}
