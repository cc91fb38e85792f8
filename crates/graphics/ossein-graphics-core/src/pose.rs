//! Per-session current transforms, parallel to a skeleton's bone arena.
//!
//! A `Pose` is the mutable scratch a player writes during a tick; the
//! skeleton itself stays immutable base data. Keeping them separate lets
//! several players share one skeleton without copying it per instance.

use glam::{Quat, Vec3};

use crate::skeleton::Skeleton;
use crate::transform;

/// Current transform of one bone, in both spaces, plus scale.
#[derive(Clone, Copy, Debug)]
pub struct BonePose {
    pub local_translation: Vec3,
    pub local_rotation: Quat,
    pub world_translation: Vec3,
    pub world_rotation: Quat,
    pub scale: Vec3,
}

/// Scratch pose indexed the same way as the skeleton's bones.
#[derive(Clone, Debug, Default)]
pub struct Pose {
    bones: Vec<BonePose>,
}

impl Pose {
    /// A pose initialized to the skeleton's base transforms.
    pub fn from_skeleton(skeleton: &Skeleton) -> Self {
        let mut pose = Self::default();
        pose.reset(skeleton);
        pose
    }

    /// Resets every bone back to its base transform. Called at the top of
    /// each player tick so layers accumulate within a tick, never across.
    pub fn reset(&mut self, skeleton: &Skeleton) {
        self.bones.clear();
        self.bones.extend(skeleton.bones().iter().map(|b| BonePose {
            local_translation: b.base_local_translation,
            local_rotation: b.base_local_rotation,
            world_translation: b.base_world_translation,
            world_rotation: b.base_world_rotation,
            scale: b.base_scale,
        }));
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    pub fn bones(&self) -> &[BonePose] {
        &self.bones
    }

    pub fn bone(&self, index: usize) -> &BonePose {
        &self.bones[index]
    }

    pub fn bone_mut(&mut self, index: usize) -> &mut BonePose {
        &mut self.bones[index]
    }

    /// Regenerates one bone's current world transform from its current local
    /// transform and its parent's current world transform.
    pub fn generate_world_from_local(&mut self, skeleton: &Skeleton, index: usize) {
        match skeleton.bones()[index].parent {
            Some(p) => {
                let pt = self.bones[p].world_translation;
                let pr = self.bones[p].world_rotation;
                let bone = &mut self.bones[index];
                let (t, r) =
                    transform::compose(pt, pr, bone.local_translation, bone.local_rotation);
                bone.world_translation = t;
                bone.world_rotation = r;
            }
            None => {
                let bone = &mut self.bones[index];
                bone.world_translation = bone.local_translation;
                bone.world_rotation = bone.local_rotation;
            }
        }
    }

    /// Regenerates one bone's current local transform from its current world
    /// transform and its parent's current world transform.
    pub fn generate_local_from_world(&mut self, skeleton: &Skeleton, index: usize) {
        match skeleton.bones()[index].parent {
            Some(p) => {
                let pt = self.bones[p].world_translation;
                let pr = self.bones[p].world_rotation;
                let bone = &mut self.bones[index];
                let (t, r) =
                    transform::relative_to(pt, pr, bone.world_translation, bone.world_rotation);
                bone.local_translation = t;
                bone.local_rotation = r;
            }
            None => {
                let bone = &mut self.bones[index];
                bone.local_translation = bone.world_translation;
                bone.local_rotation = bone.world_rotation;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skeleton::Bone;

    #[test]
    fn reset_restores_base_transforms() {
        let mut skeleton = Skeleton::new();
        let mut root = Bone::new("root");
        root.base_local_translation = Vec3::new(1.0, 0.0, 0.0);
        root.base_world_translation = Vec3::new(1.0, 0.0, 0.0);
        skeleton.add_bone(root);

        let mut pose = Pose::from_skeleton(&skeleton);
        pose.bone_mut(0).local_translation = Vec3::splat(99.0);
        pose.reset(&skeleton);
        assert_eq!(pose.bone(0).local_translation, Vec3::new(1.0, 0.0, 0.0));
    }
}
