//! Seam for a downstream Hough-vote detector.
//!
//! Sampled patches train a forest whose leaves store center offsets. A
//! detector then runs the forest over the feature channels of a test image
//! and casts votes into one accumulator per scale and class. This crate only
//! fixes the call shape; implementations live with the forest.

use std::collections::BTreeMap;

use crate::features::FeatureChannels;
use crate::image::{OwnedImage, Rect};
use crate::util::ForestPatchResult;

/// Sparse vote mass keyed by row, then column.
pub type VoteCells = BTreeMap<i32, BTreeMap<i32, f32>>;

/// Accumulates forest votes over a region of one image.
pub trait VoteAccumulator {
    /// Votes for every patch position inside `roi`.
    ///
    /// `size` is the `(width, height)` of the voting image and `ratios` the
    /// aspect ratios to vote for. One dense map per scale is pushed onto
    /// `detections`. The result is indexed by scale, then class.
    fn accumulate_votes(
        &self,
        size: (usize, usize),
        roi: Rect,
        features: &FeatureChannels,
        ratios: &[f32],
        detections: &mut Vec<OwnedImage<f32>>,
    ) -> ForestPatchResult<Vec<Vec<VoteCells>>>;
}
