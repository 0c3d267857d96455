//! forestpatch prepares training data for Hough-forest object detectors.
//!
//! The crate turns RGB images into a fixed 32-channel feature stack (Lab,
//! gradient magnitudes, orientation histograms, and their 5x5 min/max
//! envelopes) and samples fixed-size patches from it into per-label
//! collections. Patches carry their offsets to annotated object centers, so a
//! forest trained on them can later cast center votes.
//!
//! The min/max envelope uses a streaming extremum filter that costs amortized
//! O(1) per pixel for any window width. Texture-aware sampling labels
//! candidates by gray-level co-occurrence contrast. The `rayon` feature
//! parallelizes per-channel filtering; `tracing` enables spans and events;
//! `image-io` adds image file loading.

pub mod detect;
pub mod features;
pub mod filter;
pub mod image;
pub mod lowlevel;
pub mod sampler;
pub mod texture;
mod trace;
pub mod util;

pub use detect::{VoteAccumulator, VoteCells};
pub use features::{
    extract_feature_channels, FeatureBuilder, FeatureChannels, FeatureConfig, NUM_CHANNELS,
};
pub use filter::{
    max_filter, max_filter_in_place, max_filter_into, max_min_filter, min_filter,
    min_filter_in_place, min_filter_into,
};
pub use image::{ImageView, Offset, OwnedImage, Point, Rect, Rgb};
pub use sampler::{
    PatchFeature, PatchSampler, SamplerConfig, SourceIndex, TextureStats, LABEL_NEGATIVE,
    LABEL_POSITIVE,
};
pub use texture::{glcm_contrast, glcm_contrast_rgb};
pub use util::{ForestPatchError, ForestPatchResult};
