//! Keyframed animation data: targets, skeletal animation, the animation
//! container, and notetrack actions.

use std::sync::Arc;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::skeleton::Skeleton;

/// How sampled values combine with the pose.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransformType {
    /// Inherit sentinel: a target with `Parent` uses the owning animation's
    /// type. Never meaningful at the animation level.
    #[default]
    Parent,
    /// Values offset the bone's base transform.
    Relative,
    /// Values replace the current transform.
    Absolute,
    /// Values combine with the current transform (translation adds,
    /// rotation multiplies).
    Additive,
}

/// Which space the animation's values drive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransformSpace {
    #[default]
    Local,
    World,
}

/// One sample on a track. Times are frame numbers, fractional allowed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyframe<T> {
    pub time: f32,
    pub value: T,
}

impl<T> Keyframe<T> {
    pub fn new(time: f32, value: T) -> Self {
        Self { time, value }
    }
}

/// Per-bone track bundle. Tracks are `Option` so "no channel" and "empty
/// channel" both read as absent; frames are kept sorted by time by the
/// `add_*` helpers' callers (codecs emit them in order).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnimationTarget {
    pub bone_name: String,
    /// `Parent` inherits the owning animation's type.
    pub transform_type: TransformType,
    pub translation_frames: Option<Vec<Keyframe<Vec3>>>,
    pub rotation_frames: Option<Vec<Keyframe<Quat>>>,
    pub scale_frames: Option<Vec<Keyframe<Vec3>>>,
}

impl AnimationTarget {
    pub fn new(bone_name: impl Into<String>) -> Self {
        Self {
            bone_name: bone_name.into(),
            transform_type: TransformType::Parent,
            translation_frames: None,
            rotation_frames: None,
            scale_frames: None,
        }
    }

    pub fn add_translation_frame(&mut self, time: f32, value: Vec3) {
        self.translation_frames
            .get_or_insert_with(Vec::new)
            .push(Keyframe::new(time, value));
    }

    pub fn add_rotation_frame(&mut self, time: f32, value: Quat) {
        self.rotation_frames
            .get_or_insert_with(Vec::new)
            .push(Keyframe::new(time, value));
    }

    pub fn add_scale_frame(&mut self, time: f32, value: Vec3) {
        self.scale_frames
            .get_or_insert_with(Vec::new)
            .push(Keyframe::new(time, value));
    }

    pub fn translation_frame_count(&self) -> usize {
        self.translation_frames.as_ref().map_or(0, Vec::len)
    }

    pub fn rotation_frame_count(&self) -> usize {
        self.rotation_frames.as_ref().map_or(0, Vec::len)
    }

    pub fn scale_frame_count(&self) -> usize {
        self.scale_frames.as_ref().map_or(0, Vec::len)
    }
}

/// The skeletal portion of an animation: targets plus combine semantics.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SkeletonAnimation {
    /// Optional default skeleton; players may supply their own instead.
    #[serde(skip)]
    pub skeleton: Option<Arc<Skeleton>>,
    pub targets: Vec<AnimationTarget>,
    pub transform_type: TransformType,
    pub transform_space: TransformSpace,
}

impl SkeletonAnimation {
    pub fn new(skeleton: Option<Arc<Skeleton>>) -> Self {
        Self {
            skeleton,
            targets: Vec::new(),
            transform_type: TransformType::Absolute,
            transform_space: TransformSpace::Local,
        }
    }

    /// Case-insensitive target lookup by bone name.
    pub fn target_index(&self, bone_name: &str) -> Option<usize> {
        self.targets
            .iter()
            .position(|t| t.bone_name.eq_ignore_ascii_case(bone_name))
    }

    /// Returns the target for `bone_name`, creating it if absent.
    pub fn create_target(&mut self, bone_name: &str) -> &mut AnimationTarget {
        let index = match self.target_index(bone_name) {
            Some(i) => i,
            None => {
                self.targets.push(AnimationTarget::new(bone_name));
                self.targets.len() - 1
            }
        };
        &mut self.targets[index]
    }
}

/// A named notetrack event with its occurrence frames.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnimationAction {
    pub name: String,
    pub frames: Vec<f32>,
}

/// Top-level animation container.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Animation {
    pub name: String,
    pub framerate: f32,
    pub skeleton_animation: Option<SkeletonAnimation>,
    pub actions: Vec<AnimationAction>,
}

impl Animation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            framerate: 30.0,
            skeleton_animation: None,
            actions: Vec::new(),
        }
    }

    pub fn with_skeleton(name: impl Into<String>, skeleton: Arc<Skeleton>) -> Self {
        let mut animation = Self::new(name);
        animation.skeleton_animation = Some(SkeletonAnimation::new(Some(skeleton)));
        animation
    }

    /// Effective transform type: the skeletal animation's, or `Absolute`
    /// when there is no skeletal data.
    pub fn transform_type(&self) -> TransformType {
        self.skeleton_animation
            .as_ref()
            .map_or(TransformType::Absolute, |sa| sa.transform_type)
    }

    pub fn target_count(&self) -> usize {
        self.skeleton_animation
            .as_ref()
            .map_or(0, |sa| sa.targets.len())
    }

    /// Total action occurrences across all names.
    pub fn action_count(&self) -> usize {
        self.actions.iter().map(|a| a.frames.len()).sum()
    }

    pub fn has_translation_frames(&self) -> bool {
        self.skeleton_animation.as_ref().is_some_and(|sa| {
            sa.targets.iter().any(|t| t.translation_frame_count() > 0)
        })
    }

    pub fn has_rotation_frames(&self) -> bool {
        self.skeleton_animation
            .as_ref()
            .is_some_and(|sa| sa.targets.iter().any(|t| t.rotation_frame_count() > 0))
    }

    pub fn has_scale_frames(&self) -> bool {
        self.skeleton_animation
            .as_ref()
            .is_some_and(|sa| sa.targets.iter().any(|t| t.scale_frame_count() > 0))
    }

    /// Derived frame count: span between the smallest and largest key time
    /// across every track and action, inclusive. Zero when no keys exist.
    pub fn frame_count(&self) -> f32 {
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        let mut span = |time: f32| {
            min = min.min(time);
            max = max.max(time);
        };

        if let Some(sa) = &self.skeleton_animation {
            for target in &sa.targets {
                for f in target.translation_frames.iter().flatten() {
                    span(f.time);
                }
                for f in target.rotation_frames.iter().flatten() {
                    span(f.time);
                }
                for f in target.scale_frames.iter().flatten() {
                    span(f.time);
                }
            }
        }
        for action in &self.actions {
            for &time in &action.frames {
                span(time);
            }
        }

        if min.is_finite() {
            (max - min) + 1.0
        } else {
            0.0
        }
    }

    pub fn action(&self, name: &str) -> Option<&AnimationAction> {
        self.actions.iter().find(|a| a.name == name)
    }

    /// Returns the action for `name`, creating it if absent.
    pub fn create_action(&mut self, name: &str) -> &mut AnimationAction {
        let index = match self.actions.iter().position(|a| a.name == name) {
            Some(i) => i,
            None => {
                self.actions.push(AnimationAction {
                    name: name.to_string(),
                    frames: Vec::new(),
                });
                self.actions.len() - 1
            }
        };
        &mut self.actions[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_count_spans_tracks_and_actions() {
        let mut animation = Animation::new("test");
        let mut sa = SkeletonAnimation::new(None);
        let target = sa.create_target("root");
        target.add_translation_frame(2.0, Vec3::ZERO);
        target.add_translation_frame(10.0, Vec3::ONE);
        animation.skeleton_animation = Some(sa);
        animation.create_action("step").frames.push(14.0);

        // keys at 2..14 inclusive
        assert_eq!(animation.frame_count(), 13.0);
    }

    #[test]
    fn frame_count_is_zero_without_keys() {
        let animation = Animation::new("empty");
        assert_eq!(animation.frame_count(), 0.0);

        let mut with_target = Animation::new("empty-target");
        let mut sa = SkeletonAnimation::new(None);
        sa.create_target("root");
        with_target.skeleton_animation = Some(sa);
        assert_eq!(with_target.frame_count(), 0.0);
    }

    #[test]
    fn create_target_is_get_or_insert() {
        let mut sa = SkeletonAnimation::new(None);
        sa.create_target("Root").add_translation_frame(0.0, Vec3::ZERO);
        sa.create_target("root").add_translation_frame(1.0, Vec3::ONE);
        assert_eq!(sa.targets.len(), 1);
        assert_eq!(sa.targets[0].translation_frame_count(), 2);
    }

    #[test]
    fn action_count_sums_occurrences() {
        let mut animation = Animation::new("steps");
        animation.create_action("left").frames.extend([1.0, 3.0]);
        animation.create_action("right").frames.push(2.0);
        assert_eq!(animation.action_count(), 3);
    }
}
