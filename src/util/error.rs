//! Error types for forestpatch.

use thiserror::Error;

/// Result alias for forestpatch operations.
pub type ForestPatchResult<T> = std::result::Result<T, ForestPatchError>;

/// Errors that can occur while building feature channels or sampling patches.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ForestPatchError {
    /// Width or height is zero, or the element count overflows.
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// Row stride is smaller than the row width.
    #[error("invalid stride {stride} for width {width}")]
    InvalidStride { width: usize, stride: usize },
    /// Backing buffer is shorter than the view requires.
    #[error("buffer too small: needed {needed} elements, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// Requested region does not fit inside the image.
    #[error("roi {x},{y} {width}x{height} outside image {img_width}x{img_height}")]
    RoiOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        img_width: usize,
        img_height: usize,
    },
    /// Two buffers that must share dimensions do not.
    #[error("size mismatch: expected {expected:?}, got {got:?}")]
    SizeMismatch {
        expected: (usize, usize),
        got: (usize, usize),
    },
    /// Channel stack does not hold the required number of channels.
    #[error("expected {expected} channels, got {got}")]
    InvalidChannelCount { expected: usize, got: usize },
    /// Label is not below the sampler's label count.
    #[error("label {label} out of range for {num_labels} labels")]
    LabelOutOfRange { label: usize, num_labels: usize },
    /// Texture sampling needs at least one object center.
    #[error("texture sampling requires at least one object center")]
    MissingCenters,
    /// Sampling region cannot hold a single patch.
    #[error("region {width}x{height} smaller than patch {patch_width}x{patch_height}")]
    RegionTooSmall {
        width: usize,
        height: usize,
        patch_width: usize,
        patch_height: usize,
    },
    /// Sample count or frame index does not fit the signed index range.
    #[error("too many {what} for the source index range")]
    CapacityExceeded { what: &'static str },
    /// Texture sampling ran out of batches before reaching its target.
    #[error("texture sampling exhausted after {batches} batches ({positives}/{target} positives)")]
    SamplingExhausted {
        batches: usize,
        positives: usize,
        target: usize,
    },
    /// Configuration values are inconsistent.
    #[error("invalid config: {reason}")]
    InvalidConfig { reason: &'static str },
    /// Image decoding failed (image-io feature).
    #[error("image io: {reason}")]
    ImageIo { reason: String },
}
