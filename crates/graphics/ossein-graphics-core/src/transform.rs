//! Rigid-transform composition helpers.
//!
//! Transforms are kept as separate translation/rotation pairs rather than
//! matrices; composing and inverting stays in quaternion space.

use glam::{Quat, Vec3};

/// Compose a parent world transform with a child local transform, producing
/// the child's world transform.
#[inline]
pub fn compose(
    parent_translation: Vec3,
    parent_rotation: Quat,
    local_translation: Vec3,
    local_rotation: Quat,
) -> (Vec3, Quat) {
    (
        parent_rotation * local_translation + parent_translation,
        parent_rotation * local_rotation,
    )
}

/// Express a world transform relative to a parent world transform, producing
/// the child's local transform.
#[inline]
pub fn relative_to(
    parent_translation: Vec3,
    parent_rotation: Quat,
    world_translation: Vec3,
    world_rotation: Quat,
) -> (Vec3, Quat) {
    let inverse = parent_rotation.conjugate();
    (
        inverse * (world_translation - parent_translation),
        inverse * world_rotation,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn compose_then_relative_round_trips() {
        let pt = Vec3::new(1.0, 2.0, 3.0);
        let pr = Quat::from_rotation_y(FRAC_PI_2);
        let lt = Vec3::new(0.5, 0.0, -1.0);
        let lr = Quat::from_rotation_x(0.3);

        let (wt, wr) = compose(pt, pr, lt, lr);
        let (lt2, lr2) = relative_to(pt, pr, wt, wr);

        assert!(lt.abs_diff_eq(lt2, 1e-5));
        assert!(lr.abs_diff_eq(lr2, 1e-5));
    }

    #[test]
    fn identity_parent_is_a_no_op() {
        let lt = Vec3::new(4.0, -2.0, 7.0);
        let lr = Quat::from_rotation_z(1.1);
        let (wt, wr) = compose(Vec3::ZERO, Quat::IDENTITY, lt, lr);
        assert!(wt.abs_diff_eq(lt, 1e-6));
        assert!(wr.abs_diff_eq(lr, 1e-6));
    }
}
