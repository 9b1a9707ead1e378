use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::types::{Axis, BoundMode, Transform};
use crate::config::TAPER_EPSILON;
use crate::rig::BoneId;

/// Authoring description of a collider attached to a bone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColliderConfig {
    /// Bone the collider follows. World space when absent.
    pub bone: Option<BoneId>,
    pub direction: Axis,
    pub center: Vec3,
    pub bound: BoundMode,
    pub radius: f32,
    pub height: f32,
    /// Radius at the far end of a tapered capsule. Non-positive disables tapering.
    pub radius2: f32,
}

impl Default for ColliderConfig {
    fn default() -> Self {
        Self {
            bone: None,
            direction: Axis::Y,
            center: Vec3::ZERO,
            bound: BoundMode::Outside,
            radius: 0.5,
            height: 0.0,
            radius2: 0.0,
        }
    }
}

impl ColliderConfig {
    pub fn sphere(radius: f32) -> Self {
        Self {
            radius,
            ..Self::default()
        }
    }

    /// `height` is the full length including both caps.
    pub fn capsule(radius: f32, height: f32) -> Self {
        Self {
            radius,
            height,
            ..Self::default()
        }
    }

    pub fn tapered_capsule(radius: f32, radius2: f32, height: f32) -> Self {
        Self {
            radius,
            radius2,
            height,
            ..Self::default()
        }
    }

    pub fn with_bone(mut self, bone: BoneId) -> Self {
        self.bone = Some(bone);
        self
    }

    pub fn with_center(mut self, center: Vec3) -> Self {
        self.center = center;
        self
    }

    pub fn with_direction(mut self, direction: Axis) -> Self {
        self.direction = direction;
        self
    }

    pub fn inside(mut self) -> Self {
        self.bound = BoundMode::Inside;
        self
    }
}

/// World-space geometry baked by [`BoneCollider::prepare`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PreparedShape {
    /// Not prepared for the current frame; never collides.
    #[default]
    Stale,
    OutsideSphere {
        center: Vec3,
        radius: f32,
    },
    InsideSphere {
        center: Vec3,
        radius: f32,
    },
    OutsideCapsule {
        c0: Vec3,
        c1: Vec3,
        radius: f32,
        length: f32,
    },
    InsideCapsule {
        c0: Vec3,
        c1: Vec3,
        radius: f32,
        length: f32,
    },
    OutsideTaperedCapsule {
        c0: Vec3,
        c1: Vec3,
        radius0: f32,
        radius1: f32,
        length: f32,
    },
    InsideTaperedCapsule {
        c0: Vec3,
        c1: Vec3,
        radius0: f32,
        radius1: f32,
        length: f32,
    },
}

/// Collider snapshot stored in the shared collider storage.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoneCollider {
    pub config: ColliderConfig,
    /// Lossy scale of the collider bone, refreshed by every [`prepare`](Self::prepare).
    pub scale: f32,
    /// Cleared when the owning group is released.
    pub valid: bool,
    shape: PreparedShape,
}

impl BoneCollider {
    pub fn new(config: ColliderConfig) -> Self {
        Self {
            config,
            scale: 1.0,
            valid: true,
            shape: PreparedShape::Stale,
        }
    }

    pub fn bone(&self) -> Option<BoneId> {
        self.config.bone
    }

    pub fn shape(&self) -> &PreparedShape {
        &self.shape
    }

    pub fn invalidate(&mut self) {
        self.valid = false;
        self.shape = PreparedShape::Stale;
    }

    /// Drops the baked geometry until the next successful [`prepare`](Self::prepare).
    pub fn mark_stale(&mut self) {
        self.shape = PreparedShape::Stale;
    }

    /// Bakes world-space centers and scaled radii from the collider bone's world transform.
    pub fn prepare(&mut self, world: &Transform) {
        if !self.valid {
            self.shape = PreparedShape::Stale;
            return;
        }
        self.scale = world.scale.x.abs();

        let config = &self.config;
        let half_height = config.height * 0.5;
        let axis = config.direction.unit();
        let outside = config.bound == BoundMode::Outside;

        let untapered =
            config.radius2 <= 0.0 || (config.radius - config.radius2).abs() < TAPER_EPSILON;

        self.shape = if untapered {
            let radius = config.radius * self.scale;
            let h = half_height - config.radius;
            if h <= 0.0 {
                sphere(world.transform_point(config.center), radius, outside)
            } else {
                let c0 = world.transform_point(config.center + axis * h);
                let c1 = world.transform_point(config.center - axis * h);
                let length = c0.distance(c1);
                if outside {
                    PreparedShape::OutsideCapsule {
                        c0,
                        c1,
                        radius,
                        length,
                    }
                } else {
                    PreparedShape::InsideCapsule {
                        c0,
                        c1,
                        radius,
                        length,
                    }
                }
            }
        } else {
            let largest = config.radius.max(config.radius2);
            if half_height - largest <= 0.0 {
                sphere(
                    world.transform_point(config.center),
                    largest * self.scale,
                    outside,
                )
            } else {
                let c0 = world.transform_point(config.center + axis * (half_height - config.radius));
                let c1 =
                    world.transform_point(config.center - axis * (half_height - config.radius2));
                let length = c0.distance(c1);
                let radius0 = config.radius * self.scale;
                let radius1 = config.radius2 * self.scale;
                if outside {
                    PreparedShape::OutsideTaperedCapsule {
                        c0,
                        c1,
                        radius0,
                        radius1,
                        length,
                    }
                } else {
                    PreparedShape::InsideTaperedCapsule {
                        c0,
                        c1,
                        radius0,
                        radius1,
                        length,
                    }
                }
            }
        };
    }

    /// Pushes a particle sphere out of (or back into) the collider.
    ///
    /// Returns whether `position` was corrected.
    pub fn collide(&self, position: &mut Vec3, particle_radius: f32) -> bool {
        match self.shape {
            PreparedShape::Stale => false,
            PreparedShape::OutsideSphere { center, radius } => {
                push_out_of_sphere(position, center, radius + particle_radius)
            }
            PreparedShape::InsideSphere { center, radius } => {
                pull_into_sphere(position, center, radius - particle_radius)
            }
            PreparedShape::OutsideCapsule {
                c0,
                c1,
                radius,
                length,
            } => capsule(position, c0, c1, length, Bound::Outside, |_| {
                radius + particle_radius
            }),
            PreparedShape::InsideCapsule {
                c0,
                c1,
                radius,
                length,
            } => capsule(position, c0, c1, length, Bound::Inside, |_| {
                radius - particle_radius
            }),
            PreparedShape::OutsideTaperedCapsule {
                c0,
                c1,
                radius0,
                radius1,
                length,
            } => capsule(position, c0, c1, length, Bound::Outside, |t| {
                lerp(radius0, radius1, t) + particle_radius
            }),
            PreparedShape::InsideTaperedCapsule {
                c0,
                c1,
                radius0,
                radius1,
                length,
            } => capsule(position, c0, c1, length, Bound::Inside, |t| {
                lerp(radius0, radius1, t) - particle_radius
            }),
        }
    }
}

fn sphere(center: Vec3, radius: f32, outside: bool) -> PreparedShape {
    if outside {
        PreparedShape::OutsideSphere { center, radius }
    } else {
        PreparedShape::InsideSphere { center, radius }
    }
}

#[derive(Clone, Copy)]
enum Bound {
    Outside,
    Inside,
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

fn push_out_of_sphere(position: &mut Vec3, center: Vec3, r: f32) -> bool {
    let d = *position - center;
    let dlen2 = d.length_squared();
    if dlen2 > 0.0 && dlen2 < r * r {
        *position = center + d * (r / dlen2.sqrt());
        return true;
    }
    false
}

fn pull_into_sphere(position: &mut Vec3, center: Vec3, r: f32) -> bool {
    let d = *position - center;
    let dlen2 = d.length_squared();
    if dlen2 > 0.0 && dlen2 > r * r {
        *position = center + d * (r / dlen2.sqrt());
        return true;
    }
    false
}

/// Shared capsule routine. `radius_at` maps the normalized segment parameter to the
/// effective (particle-inflated) radius.
fn capsule(
    position: &mut Vec3,
    c0: Vec3,
    c1: Vec3,
    length: f32,
    bound: Bound,
    radius_at: impl Fn(f32) -> f32,
) -> bool {
    let dir = c1 - c0;
    let d = *position - c0;
    let t = d.dot(dir);
    let length2 = length * length;

    if t <= 0.0 || length2 <= 0.0 {
        return end_cap(position, c0, radius_at(0.0), bound);
    }
    if t >= length2 {
        return end_cap(position, c1, radius_at(1.0), bound);
    }

    let q = d - dir * (t / length2);
    let qlen2 = q.length_squared();
    let r = radius_at(t / length2);
    let hit = match bound {
        Bound::Outside => qlen2 > 0.0 && qlen2 < r * r,
        Bound::Inside => qlen2 > 0.0 && qlen2 > r * r,
    };
    if hit {
        let qlen = qlen2.sqrt();
        *position += q * ((r - qlen) / qlen);
    }
    hit
}

fn end_cap(position: &mut Vec3, center: Vec3, r: f32, bound: Bound) -> bool {
    match bound {
        Bound::Outside => push_out_of_sphere(position, center, r),
        Bound::Inside => pull_into_sphere(position, center, r),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn prepared(config: ColliderConfig) -> BoneCollider {
        let mut collider = BoneCollider::new(config);
        collider.prepare(&Transform::IDENTITY);
        collider
    }

    #[test]
    fn short_capsule_collapses_to_sphere() {
        let collider = prepared(ColliderConfig::capsule(0.5, 0.8));
        assert!(matches!(
            collider.shape(),
            PreparedShape::OutsideSphere { .. }
        ));
    }

    #[test]
    fn near_equal_radii_are_not_tapered() {
        let collider = prepared(ColliderConfig::tapered_capsule(0.5, 0.505, 3.0));
        assert!(matches!(
            collider.shape(),
            PreparedShape::OutsideCapsule { .. }
        ));
    }

    #[test]
    fn tapered_capsule_interpolates_radius_along_segment() {
        let collider =
            prepared(ColliderConfig::tapered_capsule(1.0, 0.5, 4.0).with_direction(Axis::X));
        let PreparedShape::OutsideTaperedCapsule { c0, c1, .. } = *collider.shape() else {
            panic!("expected tapered capsule");
        };
        assert!(c0.abs_diff_eq(Vec3::new(1.0, 0.0, 0.0), 1e-6));
        assert!(c1.abs_diff_eq(Vec3::new(-1.5, 0.0, 0.0), 1e-6));

        // Halfway along the segment the radius is 0.75.
        let mut position = Vec3::new(-0.25, 0.1, 0.0);
        assert!(collider.collide(&mut position, 0.0));
        assert_abs_diff_eq!(position.y, 0.75, epsilon = 1e-5);
        assert_abs_diff_eq!(position.x, -0.25, epsilon = 1e-5);
    }

    #[test]
    fn inside_capsule_keeps_particle_within_cylinder() {
        let collider = prepared(ColliderConfig::capsule(1.0, 4.0).inside());
        let mut position = Vec3::new(3.0, 0.5, 0.0);
        assert!(collider.collide(&mut position, 0.25));
        assert_abs_diff_eq!(position.x, 0.75, epsilon = 1e-5);
        assert_abs_diff_eq!(position.y, 0.5, epsilon = 1e-5);
    }

    #[test]
    fn particle_on_capsule_axis_is_left_alone() {
        let collider = prepared(ColliderConfig::capsule(1.0, 4.0));
        let mut position = Vec3::new(0.0, 0.3, 0.0);
        assert!(!collider.collide(&mut position, 0.1));
        assert_eq!(position, Vec3::new(0.0, 0.3, 0.0));
    }

    #[test]
    fn invalidated_collider_never_collides() {
        let mut collider = prepared(ColliderConfig::sphere(1.0));
        collider.invalidate();
        collider.prepare(&Transform::IDENTITY);
        let mut position = Vec3::new(0.1, 0.0, 0.0);
        assert!(!collider.collide(&mut position, 0.0));
    }
}
