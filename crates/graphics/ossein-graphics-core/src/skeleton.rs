//! Bone hierarchy storage and kinematic chain resolution.
//!
//! Bones live in a flat arena indexed by `usize`; parent links are
//! `Option<usize>` into the same arena. The skeleton stores the *base* pose
//! (bind pose) in both local and world terms; per-session current transforms
//! live in [`crate::pose::Pose`].

use glam::{Quat, Vec3};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::error::SkeletonError;
use crate::transform;

/// A single joint: identity, hierarchy link, and base transforms.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Bone {
    /// Unique within a skeleton; lookups are case-insensitive.
    pub name: String,
    /// Arena index of the parent, `None` for roots.
    pub parent: Option<usize>,
    pub base_local_translation: Vec3,
    pub base_local_rotation: Quat,
    pub base_world_translation: Vec3,
    pub base_world_rotation: Quat,
    pub base_scale: Vec3,
    /// Bones with this cleared keep their base transform during sampling.
    pub can_animate: bool,
}

impl Bone {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            base_local_translation: Vec3::ZERO,
            base_local_rotation: Quat::IDENTITY,
            base_world_translation: Vec3::ZERO,
            base_world_rotation: Quat::IDENTITY,
            base_scale: Vec3::ONE,
            can_animate: true,
        }
    }

    pub fn with_parent(name: impl Into<String>, parent: Option<usize>) -> Self {
        let mut bone = Self::new(name);
        bone.parent = parent;
        bone
    }
}

/// A bone arena plus derived hierarchy queries.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Skeleton {
    bones: Vec<Bone>,
}

impl Skeleton {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a skeleton from a complete bone list, validating parent links.
    pub fn from_bones(bones: Vec<Bone>) -> Result<Self, SkeletonError> {
        let skeleton = Self { bones };
        skeleton.validate()?;
        Ok(skeleton)
    }

    /// Appends a bone and returns its arena index. The parent link is not
    /// checked here; callers wiring parents after the fact run [`validate`].
    ///
    /// [`validate`]: Skeleton::validate
    pub fn add_bone(&mut self, bone: Bone) -> usize {
        self.bones.push(bone);
        self.bones.len() - 1
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    pub fn bone(&self, index: usize) -> Option<&Bone> {
        self.bones.get(index)
    }

    pub fn bone_mut(&mut self, index: usize) -> Option<&mut Bone> {
        self.bones.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// Case-insensitive name lookup.
    pub fn bone_index(&self, name: &str) -> Option<usize> {
        self.bones
            .iter()
            .position(|b| b.name.eq_ignore_ascii_case(name))
    }

    pub fn contains_bone(&self, name: &str) -> bool {
        self.bone_index(name).is_some()
    }

    /// Lowercased name→index map for bind-time resolution.
    pub fn name_lookup(&self) -> HashMap<String, usize> {
        self.bones
            .iter()
            .enumerate()
            .map(|(i, b)| (b.name.to_ascii_lowercase(), i))
            .collect()
    }

    /// Deep copy for playback instances that need exclusive state.
    pub fn create_copy(&self) -> Skeleton {
        self.clone()
    }

    pub fn children_of(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.bones
            .iter()
            .enumerate()
            .filter(move |(_, b)| b.parent == Some(index))
            .map(|(i, _)| i)
    }

    /// True when `bone` sits anywhere below `ancestor`.
    pub fn is_descendant_of(&self, bone: usize, ancestor: usize) -> bool {
        let mut current = self.bones.get(bone).and_then(|b| b.parent);
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            current = self.bones[p].parent;
        }
        false
    }

    /// Bone indices ordered parent-before-child (roots first, depth-first).
    /// Requires a validated hierarchy; unreachable bones would indicate a
    /// cycle and are never produced by [`validate`]d skeletons.
    pub fn traversal_order(&self) -> Vec<usize> {
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); self.bones.len()];
        let mut stack: Vec<usize> = Vec::new();
        for (i, bone) in self.bones.iter().enumerate() {
            match bone.parent {
                Some(p) => children[p].push(i),
                None => stack.push(i),
            }
        }
        stack.reverse();

        let mut order = Vec::with_capacity(self.bones.len());
        while let Some(i) = stack.pop() {
            order.push(i);
            for &c in children[i].iter().rev() {
                stack.push(c);
            }
        }
        order
    }

    /// Checks every parent link: in range, not self-referential, acyclic.
    pub fn validate(&self) -> Result<(), SkeletonError> {
        for (i, bone) in self.bones.iter().enumerate() {
            if let Some(p) = bone.parent {
                if p >= self.bones.len() {
                    return Err(SkeletonError::ParentOutOfRange { bone: i, parent: p });
                }
            }
        }
        for i in 0..self.bones.len() {
            let mut steps = 0usize;
            let mut current = self.bones[i].parent;
            while let Some(p) = current {
                if p == i || steps > self.bones.len() {
                    return Err(SkeletonError::ParentCycle { bone: i });
                }
                steps += 1;
                current = self.bones[p].parent;
            }
        }
        Ok(())
    }

    /// Derives one bone's base local transform from its base world transform.
    pub fn generate_local_from_world(&mut self, index: usize) {
        match self.bones[index].parent {
            Some(p) => {
                let pt = self.bones[p].base_world_translation;
                let pr = self.bones[p].base_world_rotation;
                let bone = &mut self.bones[index];
                let (t, r) = transform::relative_to(
                    pt,
                    pr,
                    bone.base_world_translation,
                    bone.base_world_rotation,
                );
                bone.base_local_translation = t;
                bone.base_local_rotation = r;
            }
            None => {
                let bone = &mut self.bones[index];
                bone.base_local_translation = bone.base_world_translation;
                bone.base_local_rotation = bone.base_world_rotation;
            }
        }
    }

    /// Derives one bone's base world transform from its base local transform.
    pub fn generate_world_from_local(&mut self, index: usize) {
        match self.bones[index].parent {
            Some(p) => {
                let pt = self.bones[p].base_world_translation;
                let pr = self.bones[p].base_world_rotation;
                let bone = &mut self.bones[index];
                let (t, r) = transform::compose(
                    pt,
                    pr,
                    bone.base_local_translation,
                    bone.base_local_rotation,
                );
                bone.base_world_translation = t;
                bone.base_world_rotation = r;
            }
            None => {
                let bone = &mut self.bones[index];
                bone.base_world_translation = bone.base_local_translation;
                bone.base_world_rotation = bone.base_local_rotation;
            }
        }
    }

    /// Rebuilds all base local transforms from base world transforms,
    /// parent-before-child.
    pub fn generate_local_transforms(&mut self) {
        for i in self.traversal_order() {
            self.generate_local_from_world(i);
        }
    }

    /// Rebuilds all base world transforms from base local transforms,
    /// parent-before-child.
    pub fn generate_world_transforms(&mut self) {
        for i in self.traversal_order() {
            self.generate_world_from_local(i);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> Skeleton {
        let mut s = Skeleton::new();
        let root = s.add_bone(Bone::new("root"));
        let mid = s.add_bone(Bone::with_parent("mid", Some(root)));
        s.add_bone(Bone::with_parent("tip", Some(mid)));
        s
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let s = chain();
        assert_eq!(s.bone_index("ROOT"), Some(0));
        assert_eq!(s.bone_index("Tip"), Some(2));
        assert_eq!(s.bone_index("missing"), None);
    }

    #[test]
    fn traversal_visits_parents_first() {
        let mut s = Skeleton::new();
        // Children stored before their parent on purpose.
        s.add_bone(Bone::with_parent("tip", Some(2)));
        s.add_bone(Bone::with_parent("mid", Some(2)));
        s.add_bone(Bone::new("root"));
        s.validate().unwrap();

        let order = s.traversal_order();
        let pos = |i: usize| order.iter().position(|&x| x == i).unwrap();
        assert!(pos(2) < pos(1));
        assert!(pos(2) < pos(0));
        assert_eq!(order.len(), 3);
    }

    #[test]
    fn cycle_is_rejected() {
        let mut s = Skeleton::new();
        s.add_bone(Bone::with_parent("a", Some(1)));
        s.add_bone(Bone::with_parent("b", Some(0)));
        assert!(matches!(
            s.validate(),
            Err(SkeletonError::ParentCycle { .. })
        ));
    }

    #[test]
    fn out_of_range_parent_is_rejected() {
        let mut s = Skeleton::new();
        s.add_bone(Bone::with_parent("a", Some(9)));
        assert!(matches!(
            s.validate(),
            Err(SkeletonError::ParentOutOfRange { bone: 0, parent: 9 })
        ));
    }

    #[test]
    fn descendant_query_walks_the_chain() {
        let s = chain();
        assert!(s.is_descendant_of(2, 0));
        assert!(s.is_descendant_of(1, 0));
        assert!(!s.is_descendant_of(0, 2));
    }
}
