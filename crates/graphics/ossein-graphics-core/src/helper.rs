//! Whole-animation editing utilities built on the sampler.

use std::sync::Arc;

use log::debug;

use crate::animation::{Animation, SkeletonAnimation, TransformSpace, TransformType};
use crate::error::SampleError;
use crate::pose::Pose;
use crate::sampler::{resolve_skeleton, AnimationSampler, SampleMode};
use crate::skeleton::Skeleton;

/// Appends `input` to the end of `root`, shifting every key and action of
/// `input` by `root`'s frame count. Targets are merged by bone name.
pub fn append(root: &mut Animation, input: &Animation) {
    let shift = root.frame_count();
    debug!("appending '{}' onto '{}' at frame {}", input.name, root.name, shift);

    if let Some(input_sa) = &input.skeleton_animation {
        let root_sa = root.skeleton_animation.get_or_insert_with(|| {
            let mut sa = SkeletonAnimation::new(input_sa.skeleton.clone());
            sa.transform_type = input_sa.transform_type;
            sa.transform_space = input_sa.transform_space;
            sa
        });

        for source in &input_sa.targets {
            let target = root_sa.create_target(&source.bone_name);
            for f in source.translation_frames.iter().flatten() {
                target.add_translation_frame(f.time + shift, f.value);
            }
            for f in source.rotation_frames.iter().flatten() {
                target.add_rotation_frame(f.time + shift, f.value);
            }
            for f in source.scale_frames.iter().flatten() {
                target.add_scale_frame(f.time + shift, f.value);
            }
        }
    }

    for action in &input.actions {
        let merged = root.create_action(&action.name);
        merged.frames.extend(action.frames.iter().map(|t| t + shift));
    }
}

/// Bakes an animation into the other transform space by sampling it frame
/// by frame against a skeleton and re-keying the resulting pose. The output
/// is absolute in `space`; animations without skeletal data or already in
/// `space` are returned unchanged.
pub fn convert_transform_space(
    animation: &Arc<Animation>,
    skeleton: Option<&Skeleton>,
    space: TransformSpace,
) -> Result<Animation, SampleError> {
    let source_sa = match &animation.skeleton_animation {
        Some(sa) => sa,
        None => return Ok(animation.as_ref().clone()),
    };
    if source_sa.transform_space == space {
        return Ok(animation.as_ref().clone());
    }

    let skeleton = resolve_skeleton(animation, skeleton)?;
    let mut sampler = AnimationSampler::bind(Arc::clone(animation), &skeleton);
    let mut pose = Pose::from_skeleton(&skeleton);

    let mut result = Animation::new(animation.name.clone());
    result.framerate = animation.framerate;
    result.actions = animation.actions.clone();
    let mut result_sa = SkeletonAnimation::new(source_sa.skeleton.clone());
    result_sa.transform_type = TransformType::Absolute;
    result_sa.transform_space = space;

    let bound: Vec<usize> = sampler
        .skeleton_sampler()
        .map(|ss| ss.bound_targets().map(|(bone, _)| bone).collect())
        .unwrap_or_default();
    for &bone in &bound {
        result_sa.create_target(&skeleton.bones()[bone].name);
    }

    let frame_count = sampler.frame_count() as i32;
    for frame in 0..frame_count {
        let time = frame as f32;
        pose.reset(&skeleton);
        sampler.update(&skeleton, &mut pose, time, SampleMode::FrameTime);

        for &bone in &bound {
            let current = pose.bone(bone);
            let (translation, rotation) = match space {
                TransformSpace::Local => (current.local_translation, current.local_rotation),
                TransformSpace::World => (current.world_translation, current.world_rotation),
            };
            let target = result_sa.create_target(&skeleton.bones()[bone].name);
            target.add_translation_frame(time, translation);
            target.add_rotation_frame(time, rotation);
        }
    }

    result.skeleton_animation = Some(result_sa);
    Ok(result)
}
