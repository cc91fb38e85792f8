//! Multi-layer animation playback over one skeleton instance.

use std::sync::Arc;

use log::debug;

use crate::animation::Animation;
use crate::error::SampleError;
use crate::pose::Pose;
use crate::sampler::{resolve_skeleton, AnimationSampler, SampleMode};
use crate::skeleton::Skeleton;

/// Post-sampling pose refinement (IK chains, look-ats, constraints).
/// Solvers run after every layer, with the main layer's resolved time.
pub trait SamplerSolver {
    fn update(&mut self, skeleton: &Skeleton, pose: &mut Pose, time: f32);
}

/// Owns a skeleton copy, a scratch pose, a mandatory main layer, named
/// sub-layers, and named solvers. Layers and solvers both run in insertion
/// order.
///
/// The skeleton is deep-copied at construction so each player instance has
/// exclusive state; many players can share the same `Arc<Animation>` data.
pub struct AnimationPlayer {
    skeleton: Skeleton,
    pose: Pose,
    main_layer: AnimationSampler,
    layers: Vec<(String, AnimationSampler)>,
    solvers: Vec<(String, Box<dyn SamplerSolver>)>,
}

impl AnimationPlayer {
    /// Creates a player for `animation`. The skeleton comes from the caller
    /// when given, else from the animation itself; an animation with
    /// skeletal data and no skeleton anywhere fails with
    /// [`SampleError::MissingSkeleton`].
    pub fn new(
        animation: Arc<Animation>,
        skeleton: Option<&Skeleton>,
    ) -> Result<Self, SampleError> {
        let skeleton = resolve_skeleton(&animation, skeleton)?;
        let pose = Pose::from_skeleton(&skeleton);
        debug!(
            "player bound '{}' against {} bones",
            animation.name,
            skeleton.len()
        );
        let main_layer = AnimationSampler::bind(animation, &skeleton);
        Ok(Self {
            skeleton,
            pose,
            main_layer,
            layers: Vec::new(),
            solvers: Vec::new(),
        })
    }

    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    /// The pose produced by the last [`update`](Self::update).
    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    pub fn main_layer(&self) -> &AnimationSampler {
        &self.main_layer
    }

    pub fn main_layer_mut(&mut self) -> &mut AnimationSampler {
        &mut self.main_layer
    }

    /// Adds a named sub-layer bound to this player's skeleton. Sub-layers
    /// apply after the main layer, in insertion order.
    pub fn add_layer(&mut self, name: impl Into<String>, animation: Arc<Animation>) {
        let name = name.into();
        debug!("adding layer '{}' ({})", name, animation.name);
        let sampler = AnimationSampler::bind(animation, &self.skeleton);
        self.layers.push((name, sampler));
    }

    pub fn layer(&self, name: &str) -> Option<&AnimationSampler> {
        self.layers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| s)
    }

    pub fn layer_mut(&mut self, name: &str) -> Option<&mut AnimationSampler> {
        self.layers
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, s)| s)
    }

    pub fn add_solver(&mut self, name: impl Into<String>, solver: Box<dyn SamplerSolver>) {
        self.solvers.push((name.into(), solver));
    }

    pub fn remove_solver(&mut self, name: &str) -> Option<Box<dyn SamplerSolver>> {
        let index = self.solvers.iter().position(|(n, _)| n == name)?;
        Some(self.solvers.remove(index).1)
    }

    pub fn frame_count(&self) -> f32 {
        self.main_layer.frame_count()
    }

    pub fn frame_rate(&self) -> f32 {
        self.main_layer.frame_rate()
    }

    /// Duration of the main animation in seconds.
    pub fn length(&self) -> f32 {
        self.main_layer.length()
    }

    /// Advances playback with `time` read as a frame number.
    pub fn update(&mut self, time: f32) -> &Pose {
        self.update_with(time, SampleMode::FrameTime)
    }

    /// Advances playback: resets the pose to the base, applies the main
    /// layer, then each sub-layer, then every solver at the main layer's
    /// resolved time.
    pub fn update_with(&mut self, time: f32, mode: SampleMode) -> &Pose {
        self.pose.reset(&self.skeleton);
        self.main_layer
            .update(&self.skeleton, &mut self.pose, time, mode);
        for (_, layer) in &mut self.layers {
            layer.update(&self.skeleton, &mut self.pose, time, mode);
        }
        let current = self.main_layer.current_time();
        for (_, solver) in &mut self.solvers {
            solver.update(&self.skeleton, &mut self.pose, current);
        }
        &self.pose
    }
}
