//! Canned skeletons and clips shared across the workspace's tests and
//! benches. Everything here is deterministic and tiny on purpose.

use std::sync::Arc;

use glam::{Quat, Vec3};
use ossein_graphics_core::{Animation, Bone, Skeleton, SkeletonAnimation};

/// Root at the origin, "tip" one unit up its Y axis.
pub fn two_bone_skeleton() -> Skeleton {
    let mut skeleton = Skeleton::new();
    let root = skeleton.add_bone(Bone::new("root"));
    let mut tip = Bone::with_parent("tip", Some(root));
    tip.base_local_translation = Vec3::new(0.0, 1.0, 0.0);
    skeleton.add_bone(tip);
    skeleton.generate_world_transforms();
    skeleton
}

/// root -> mid -> tip, each child one unit up from its parent.
pub fn three_bone_chain() -> Skeleton {
    let mut skeleton = Skeleton::new();
    let root = skeleton.add_bone(Bone::new("root"));
    let mut mid = Bone::with_parent("mid", Some(root));
    mid.base_local_translation = Vec3::new(0.0, 1.0, 0.0);
    let mid = skeleton.add_bone(mid);
    let mut tip = Bone::with_parent("tip", Some(mid));
    tip.base_local_translation = Vec3::new(0.0, 1.0, 0.0);
    skeleton.add_bone(tip);
    skeleton.generate_world_transforms();
    skeleton
}

/// Absolute local-space clip sliding "root" from the origin to (10,0,0)
/// over frames 0..10.
pub fn slide_clip(skeleton: Option<Arc<Skeleton>>) -> Animation {
    let mut animation = Animation::new("slide");
    let mut sa = SkeletonAnimation::new(skeleton);
    let target = sa.create_target("root");
    target.add_translation_frame(0.0, Vec3::ZERO);
    target.add_translation_frame(10.0, Vec3::new(10.0, 0.0, 0.0));
    animation.skeleton_animation = Some(sa);
    animation
}

/// Absolute local-space clip rotating "tip" a quarter turn about Z and
/// back over frames 0..20.
pub fn nod_clip(skeleton: Option<Arc<Skeleton>>) -> Animation {
    let mut animation = Animation::new("nod");
    let mut sa = SkeletonAnimation::new(skeleton);
    let target = sa.create_target("tip");
    target.add_rotation_frame(0.0, Quat::IDENTITY);
    target.add_rotation_frame(10.0, Quat::from_rotation_z(std::f32::consts::FRAC_PI_2));
    target.add_rotation_frame(20.0, Quat::IDENTITY);
    animation.skeleton_animation = Some(sa);
    animation
}

/// The JSON-described wave clip: a rotation track on "tip" plus a
/// "wave_peak" action at frame 10.
pub fn wave_clip() -> Animation {
    serde_json::from_str(include_str!("../fixtures/wave.json")).expect("wave.json parses")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wave_clip_parses() {
        let clip = wave_clip();
        assert_eq!(clip.name, "wave");
        assert_eq!(clip.frame_count(), 21.0);
        assert_eq!(clip.action_count(), 1);
        let sa = clip.skeleton_animation.expect("skeletal data");
        assert_eq!(sa.targets.len(), 1);
        assert_eq!(sa.targets[0].rotation_frame_count(), 3);
    }
}
