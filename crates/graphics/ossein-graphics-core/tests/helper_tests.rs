//! Kinematic regeneration and the whole-animation editing helpers.

use std::sync::Arc;

use glam::{Quat, Vec3};
use ossein_graphics_core::helper::{append, convert_transform_space};
use ossein_graphics_core::{Animation, Pose, SkeletonAnimation, TransformSpace, TransformType};
use ossein_test_fixtures::{slide_clip, three_bone_chain, two_bone_skeleton};

#[test]
fn rotating_a_mid_bone_swings_its_subtree() {
    let skeleton = three_bone_chain();
    let mut pose = Pose::from_skeleton(&skeleton);

    pose.bone_mut(1).local_rotation = Quat::from_rotation_z(std::f32::consts::FRAC_PI_2);
    for i in skeleton.traversal_order() {
        pose.generate_world_from_local(&skeleton, i);
    }

    assert!(pose.bone(1).world_translation.abs_diff_eq(Vec3::new(0.0, 1.0, 0.0), 1e-5));
    assert!(pose.bone(2).world_translation.abs_diff_eq(Vec3::new(-1.0, 1.0, 0.0), 1e-5));
}

#[test]
fn world_edits_resolve_back_to_local() {
    let skeleton = three_bone_chain();
    let mut pose = Pose::from_skeleton(&skeleton);

    pose.bone_mut(2).world_translation = Vec3::new(0.0, 5.0, 0.0);
    pose.generate_local_from_world(&skeleton, 2);
    // Parent "mid" sits at (0,1,0), so the new local offset is four up.
    assert!(pose.bone(2).local_translation.abs_diff_eq(Vec3::new(0.0, 4.0, 0.0), 1e-5));
}

#[test]
fn append_shifts_keys_and_actions() {
    let mut root = slide_clip(None);
    root.create_action("start").frames.push(0.0);

    let mut tail = Animation::new("tail");
    let mut sa = SkeletonAnimation::new(None);
    sa.create_target("root")
        .add_translation_frame(0.0, Vec3::new(-1.0, 0.0, 0.0));
    tail.skeleton_animation = Some(sa);
    tail.create_action("start").frames.push(2.0);
    tail.create_action("stop").frames.push(4.0);

    // slide spans frames 0..10, so the tail lands at 11.
    append(&mut root, &tail);

    let sa = root.skeleton_animation.as_ref().expect("skeletal data");
    let target = &sa.targets[sa.target_index("root").unwrap()];
    let frames = target.translation_frames.as_ref().unwrap();
    assert_eq!(frames.len(), 3);
    assert_eq!(frames[2].time, 11.0);

    assert_eq!(root.action("start").unwrap().frames, vec![0.0, 13.0]);
    assert_eq!(root.action("stop").unwrap().frames, vec![15.0]);
}

#[test]
fn convert_bakes_local_into_world_space() {
    let skeleton = two_bone_skeleton();
    let animation = Arc::new(slide_clip(None));

    let converted =
        convert_transform_space(&animation, Some(&skeleton), TransformSpace::World)
            .expect("conversion succeeds");

    let sa = converted.skeleton_animation.as_ref().expect("skeletal data");
    assert_eq!(sa.transform_space, TransformSpace::World);
    assert_eq!(sa.transform_type, TransformType::Absolute);

    let target = &sa.targets[sa.target_index("root").unwrap()];
    let frames = target.translation_frames.as_ref().unwrap();
    assert_eq!(frames.len(), 11);
    // Root has no parent, so its world track mirrors the local slide.
    assert!(frames[5].value.abs_diff_eq(Vec3::new(5.0, 0.0, 0.0), 1e-5));
    assert_eq!(target.rotation_frame_count(), 11);
}

#[test]
fn convert_is_identity_for_matching_space() {
    let animation = Arc::new(slide_clip(None));
    let skeleton = two_bone_skeleton();
    let same = convert_transform_space(&animation, Some(&skeleton), TransformSpace::Local)
        .expect("conversion succeeds");
    let sa = same.skeleton_animation.as_ref().unwrap();
    assert_eq!(sa.transform_space, TransformSpace::Local);
    assert_eq!(sa.targets[0].translation_frame_count(), 2);
}
