//! Error taxonomy shared by the data model, the sampler, and the codecs.

use thiserror::Error;

/// Errors produced while reading or writing a binary container.
///
/// Codec crates return these from `Translator::read`/`Translator::write`.
/// Every variant is fatal for the file being processed; codecs never
/// best-effort past a malformed header or a reserved byte.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("{format}: magic bytes do not match")]
    InvalidMagic { format: &'static str },

    #[error("{format}: unsupported version {found}")]
    InvalidVersion { format: &'static str, found: u16 },

    #[error("{format}: unexpected header size {found}")]
    InvalidHeaderSize { format: &'static str, found: u16 },

    #[error("reserved flag byte must be zero, found {found:#04x}")]
    ReservedFlag { found: u8 },

    #[error("unexpected end of stream")]
    Truncated,

    #[error("index {index} out of range for a table of {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("count {count} exceeds the widest supported index width")]
    CapacityExceeded { count: usize },

    #[error("negative count {found}")]
    NegativeCount { found: i32 },

    #[error("unknown transform type byte {found:#04x}")]
    UnknownTransformType { found: u8 },

    #[error("decompressed size mismatch: expected {expected} bytes, got {actual}")]
    Decompress { expected: usize, actual: usize },

    #[error("nothing to write: container holds no {what}")]
    NothingToWrite { what: &'static str },

    #[error(transparent)]
    Skeleton(#[from] SkeletonError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors produced while binding an animation for playback.
#[derive(Debug, Error)]
pub enum SampleError {
    #[error("animation carries skeletal data but no skeleton was supplied")]
    MissingSkeleton,
}

/// Structural errors detected when validating a bone hierarchy.
#[derive(Debug, Error)]
pub enum SkeletonError {
    #[error("bone {bone} references parent {parent} outside the skeleton")]
    ParentOutOfRange { bone: usize, parent: usize },

    #[error("bone {bone} participates in a parent cycle")]
    ParentCycle { bone: usize },
}
