//! Single-layer animation sampling.
//!
//! An [`AnimationSampler`] binds one animation against one skeleton: each
//! bone is matched to a target by name up front, so the per-tick path never
//! touches strings. Sampling writes into a caller-owned [`Pose`].

use std::sync::Arc;

use glam::{Quat, Vec3};

use crate::animation::{Animation, Keyframe, SkeletonAnimation, TransformSpace, TransformType};
use crate::error::SampleError;
use crate::pose::Pose;
use crate::sampling::{frame_pair, pair_fraction, sample_weight};
use crate::skeleton::Skeleton;

/// How the `time` argument of an update is interpreted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SampleMode {
    /// Time is a frame number, used as-is.
    #[default]
    FrameTime,
    /// Time is a 0..1 fraction of the animation's frame count.
    Percentage,
    /// Time is in seconds, converted through the framerate.
    Seconds,
    /// Time is a delta in seconds accumulated onto the current frame time.
    DeltaSeconds,
}

/// Resolves the skeleton a sampler or player should bind against: the
/// caller's, else the animation's own, else an error when skeletal data
/// exists with nothing to drive it.
pub(crate) fn resolve_skeleton(
    animation: &Animation,
    skeleton: Option<&Skeleton>,
) -> Result<Skeleton, SampleError> {
    match &animation.skeleton_animation {
        Some(sa) => skeleton
            .map(Skeleton::create_copy)
            .or_else(|| sa.skeleton.as_deref().map(Skeleton::create_copy))
            .ok_or(SampleError::MissingSkeleton),
        None => Ok(skeleton.map(Skeleton::create_copy).unwrap_or_default()),
    }
}

/// Per-bone sampler state. `target` is `None` for bones the animation does
/// not drive; those still get their complementary transform regenerated so
/// children of animated bones follow.
struct TargetSampler {
    bone: usize,
    target: Option<usize>,
    transform_type: TransformType,
    translation_cursor: usize,
    rotation_cursor: usize,
}

impl TargetSampler {
    fn update(
        &mut self,
        animation: &SkeletonAnimation,
        skeleton: &Skeleton,
        pose: &mut Pose,
        time: f32,
        start_time: f32,
        weight: f32,
    ) {
        let local = animation.transform_space == TransformSpace::Local;
        let bone = &skeleton.bones()[self.bone];

        if let Some(target_index) = self.target {
            if bone.can_animate {
                let target = &animation.targets[target_index];

                if let Some(frames) = target.translation_frames.as_deref() {
                    if let Some(pair) =
                        frame_pair(frames, time, start_time, self.translation_cursor)
                    {
                        let sampled = interpolate_vec3(frames, pair, time, start_time);
                        let current = if local {
                            pose.bone(self.bone).local_translation
                        } else {
                            pose.bone(self.bone).world_translation
                        };
                        let result = match self.transform_type {
                            TransformType::Additive => current + sampled,
                            TransformType::Relative => bone.base_local_translation + sampled,
                            _ => sampled,
                        };
                        let blended = current.lerp(result, weight);
                        if local {
                            pose.bone_mut(self.bone).local_translation = blended;
                        } else {
                            pose.bone_mut(self.bone).world_translation = blended;
                        }
                        self.translation_cursor = pair.0;
                    }
                }

                if let Some(frames) = target.rotation_frames.as_deref() {
                    if let Some(pair) = frame_pair(frames, time, start_time, self.rotation_cursor)
                    {
                        let sampled = interpolate_quat(frames, pair, time, start_time);
                        let current = if local {
                            pose.bone(self.bone).local_rotation
                        } else {
                            pose.bone(self.bone).world_rotation
                        };
                        let result = match self.transform_type {
                            TransformType::Additive => current * sampled,
                            _ => sampled,
                        };
                        let blended = current.slerp(result, weight);
                        if local {
                            pose.bone_mut(self.bone).local_rotation = blended;
                        } else {
                            pose.bone_mut(self.bone).world_rotation = blended;
                        }
                        self.rotation_cursor = pair.0;
                    }
                }

                if let Some(frames) = target.scale_frames.as_deref() {
                    if let Some(pair) = frame_pair(frames, time, start_time, 0) {
                        let sampled = interpolate_vec3(frames, pair, time, start_time);
                        let current = pose.bone(self.bone).scale;
                        let result = match self.transform_type {
                            TransformType::Additive => current + sampled,
                            TransformType::Relative => bone.base_scale + sampled,
                            _ => sampled,
                        };
                        pose.bone_mut(self.bone).scale = current.lerp(result, weight);
                    }
                }
            }
        }

        // Keep both spaces coherent, driven space wins.
        if local {
            pose.generate_world_from_local(skeleton, self.bone);
        } else {
            pose.generate_local_from_world(skeleton, self.bone);
        }
    }
}

fn interpolate_vec3(
    frames: &[Keyframe<Vec3>],
    pair: (usize, usize),
    time: f32,
    start_time: f32,
) -> Vec3 {
    if pair.0 == pair.1 {
        frames[pair.0].value
    } else {
        let fraction = pair_fraction(frames, pair, time, start_time);
        frames[pair.0].value.lerp(frames[pair.1].value, fraction)
    }
}

fn interpolate_quat(
    frames: &[Keyframe<Quat>],
    pair: (usize, usize),
    time: f32,
    start_time: f32,
) -> Quat {
    if pair.0 == pair.1 {
        frames[pair.0].value
    } else {
        let fraction = pair_fraction(frames, pair, time, start_time);
        frames[pair.0].value.slerp(frames[pair.1].value, fraction)
    }
}

/// Sampler for the skeletal portion of one animation. Target samplers are
/// ordered parent-before-child so regenerated transforms see up-to-date
/// parents.
pub struct SkeletonAnimationSampler {
    samplers: Vec<TargetSampler>,
}

impl SkeletonAnimationSampler {
    fn new(animation: &SkeletonAnimation, skeleton: &Skeleton) -> Self {
        let lookup = skeleton.name_lookup();
        let mut target_for_bone: Vec<Option<usize>> = vec![None; skeleton.len()];
        for (i, target) in animation.targets.iter().enumerate() {
            if let Some(&bone) = lookup.get(&target.bone_name.to_ascii_lowercase()) {
                target_for_bone[bone] = Some(i);
            }
        }

        let samplers = skeleton
            .traversal_order()
            .into_iter()
            .map(|bone| {
                let target = target_for_bone[bone];
                let transform_type = target
                    .map(|t| animation.targets[t].transform_type)
                    .filter(|&t| t != TransformType::Parent)
                    .unwrap_or(animation.transform_type);
                TargetSampler {
                    bone,
                    target,
                    transform_type,
                    translation_cursor: 0,
                    rotation_cursor: 0,
                }
            })
            .collect();

        Self { samplers }
    }

    fn update(
        &mut self,
        animation: &SkeletonAnimation,
        skeleton: &Skeleton,
        pose: &mut Pose,
        time: f32,
        start_time: f32,
        weight: f32,
    ) {
        for sampler in &mut self.samplers {
            sampler.update(animation, skeleton, pose, time, start_time, weight);
        }
    }

    /// Bound `(bone, target)` pairs for bones the animation drives.
    pub fn bound_targets(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.samplers
            .iter()
            .filter_map(|s| s.target.map(|t| (s.bone, t)))
    }
}

/// One playback layer: an animation bound to a skeleton, with its own clock
/// and weight curve.
pub struct AnimationSampler {
    animation: Arc<Animation>,
    skeleton_sampler: Option<SkeletonAnimationSampler>,
    /// Layer weight curve; empty means constant full weight.
    pub weights: Vec<Keyframe<f32>>,
    /// Frame offset added to every key time on lookup.
    pub start_frame: f32,
    weights_cursor: usize,
    current_weight: f32,
    current_time: f32,
    frame_count: f32,
    frame_rate: f32,
}

impl AnimationSampler {
    /// Binds `animation` against `skeleton`. Bones without a matching target
    /// are carried inert; targets without a matching bone are ignored.
    pub fn bind(animation: Arc<Animation>, skeleton: &Skeleton) -> Self {
        let skeleton_sampler = animation
            .skeleton_animation
            .as_ref()
            .map(|sa| SkeletonAnimationSampler::new(sa, skeleton));
        let frame_count = animation.frame_count();
        let frame_rate = animation.framerate;
        Self {
            animation,
            skeleton_sampler,
            weights: Vec::new(),
            start_frame: 0.0,
            weights_cursor: 0,
            current_weight: 1.0,
            current_time: 0.0,
            frame_count,
            frame_rate,
        }
    }

    pub fn animation(&self) -> &Arc<Animation> {
        &self.animation
    }

    pub fn skeleton_sampler(&self) -> Option<&SkeletonAnimationSampler> {
        self.skeleton_sampler.as_ref()
    }

    /// Resolved frame time after the last update.
    pub fn current_time(&self) -> f32 {
        self.current_time
    }

    /// Layer weight applied during the last update.
    pub fn current_weight(&self) -> f32 {
        self.current_weight
    }

    pub fn frame_count(&self) -> f32 {
        self.frame_count
    }

    pub fn frame_rate(&self) -> f32 {
        self.frame_rate
    }

    /// Duration of one frame in seconds.
    pub fn frame_time(&self) -> f32 {
        1.0 / self.frame_rate
    }

    /// Duration of the whole animation in seconds.
    pub fn length(&self) -> f32 {
        self.frame_count / self.frame_rate
    }

    /// Resolves `time` per `mode`, samples the weight curve, then applies
    /// the skeletal tracks to `pose`.
    pub fn update(&mut self, skeleton: &Skeleton, pose: &mut Pose, time: f32, mode: SampleMode) {
        self.current_time = match mode {
            SampleMode::FrameTime => time,
            SampleMode::Percentage => self.frame_count * time,
            SampleMode::Seconds => time * self.frame_rate,
            SampleMode::DeltaSeconds => self.current_time + time * self.frame_rate,
        };

        let mut cursor = self.weights_cursor;
        self.current_weight = sample_weight(
            &self.weights,
            self.current_time,
            self.start_frame,
            1.0,
            &mut cursor,
        );
        self.weights_cursor = cursor;

        if let Some(sampler) = &mut self.skeleton_sampler {
            if let Some(sa) = &self.animation.skeleton_animation {
                sampler.update(
                    sa,
                    skeleton,
                    pose,
                    self.current_time,
                    self.start_frame,
                    self.current_weight,
                );
            }
        }
    }
}
