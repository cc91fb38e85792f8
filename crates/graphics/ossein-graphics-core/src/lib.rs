//! Ossein Graphics Core (engine-agnostic)
//!
//! Data model and runtime for skeletal character interchange: bones and
//! skeletons, keyframed animation data, a sampling/blending engine with
//! multi-layer playback, and the translator surface that binary codec crates
//! implement. Codecs populate and consume these types; the sampler is
//! codec-agnostic.

pub mod animation;
pub mod binary;
pub mod compression;
pub mod error;
pub mod helper;
pub mod model;
pub mod player;
pub mod pose;
pub mod sampler;
pub mod sampling;
pub mod skeleton;
pub mod transform;
pub mod translator;

// Re-exports for consumers (codec crates and hosts)
pub use animation::{
    Animation, AnimationAction, AnimationTarget, Keyframe, SkeletonAnimation, TransformSpace,
    TransformType,
};
pub use binary::{BinaryReader, BinaryWriter};
pub use compression::Compressor;
pub use error::{FormatError, SampleError, SkeletonError};
pub use model::{BoneInfluence, Material, MaterialTextures, Mesh, Model};
pub use player::{AnimationPlayer, SamplerSolver};
pub use pose::{BonePose, Pose};
pub use sampler::{AnimationSampler, SampleMode, SkeletonAnimationSampler};
pub use sampling::{frame_pair, sample_weight};
pub use skeleton::{Bone, Skeleton};
pub use translator::{Translator, TranslatorIo, TranslatorRegistry};
