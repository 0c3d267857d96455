//! Sampled training patches.

use std::fmt;

use crate::features::FeatureChannels;
use crate::image::{ImageView, Offset, OwnedImage, Point, Rect};
use crate::util::{ForestPatchError, ForestPatchResult};

/// Identity of a patch within the training set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceIndex {
    /// Extraction call (image) that produced the patch.
    pub frame: i32,
    /// Running position among same-label patches of that call.
    pub patch: i32,
}

impl SourceIndex {
    pub const fn new(frame: i32, patch: i32) -> Self {
        Self { frame, patch }
    }
}

/// A sampled patch: its region, vote offsets, identity, and channel content.
///
/// Records are immutable; the sampler is the only producer.
#[derive(Debug)]
pub struct PatchFeature {
    roi: Rect,
    offsets: Vec<Offset>,
    source_index: SourceIndex,
    channels: Vec<OwnedImage<u8>>,
}

impl PatchFeature {
    pub(crate) fn capture(
        features: &FeatureChannels,
        roi: Rect,
        centers: &[Point],
        source_index: SourceIndex,
    ) -> ForestPatchResult<Self> {
        Ok(Self {
            roi,
            offsets: center_offsets(roi, centers)?,
            source_index,
            channels: features.crop(roi)?,
        })
    }

    pub fn roi(&self) -> Rect {
        self.roi
    }

    /// Patch center minus each object center, in the order the centers were
    /// given. Empty for background samples.
    pub fn offsets(&self) -> &[Offset] {
        &self.offsets
    }

    pub fn source_index(&self) -> SourceIndex {
        self.source_index
    }

    /// Number of stored channel crops.
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Crop of channel `index`.
    pub fn channel(&self, index: usize) -> Option<ImageView<'_, u8>> {
        self.channels.get(index).map(OwnedImage::view)
    }

    pub fn channels(&self) -> &[OwnedImage<u8>] {
        &self.channels
    }
}

/// Prints `x y w h` followed by every offset, space separated.
impl fmt::Display for PatchFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.roi)?;
        for offset in &self.offsets {
            write!(f, " {offset}")?;
        }
        Ok(())
    }
}

fn center_offsets(roi: Rect, centers: &[Point]) -> ForestPatchResult<Vec<Offset>> {
    let overflow = || ForestPatchError::CapacityExceeded {
        what: "offset coordinates",
    };
    let cx = i32::try_from(roi.x + roi.width / 2).map_err(|_| overflow())?;
    let cy = i32::try_from(roi.y + roi.height / 2).map_err(|_| overflow())?;
    centers
        .iter()
        .map(|c| match (cx.checked_sub(c.x), cy.checked_sub(c.y)) {
            (Some(dx), Some(dy)) => Ok(Offset::new(dx, dy)),
            _ => Err(overflow()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_use_integer_patch_center() {
        let roi = Rect::new(10, 20, 5, 4);
        let offsets = center_offsets(roi, &[Point::new(0, 0), Point::new(15, 30)]).unwrap();
        // Patch center is (10 + 2, 20 + 2).
        assert_eq!(offsets, vec![Offset::new(12, 22), Offset::new(-3, -8)]);
    }

    #[test]
    fn no_centers_means_no_offsets() {
        assert!(center_offsets(Rect::new(0, 0, 3, 3), &[]).unwrap().is_empty());
    }

    #[test]
    fn offsets_outside_i32_are_rejected() {
        let roi = Rect::new(10, 20, 4, 4);
        for center in [Point::new(i32::MIN, 0), Point::new(0, i32::MIN + 5)] {
            assert_eq!(
                center_offsets(roi, &[center]),
                Err(ForestPatchError::CapacityExceeded {
                    what: "offset coordinates"
                })
            );
        }
        let near_limit = center_offsets(roi, &[Point::new(i32::MIN + 13, 0)]).unwrap();
        assert_eq!(near_limit, vec![Offset::new(i32::MAX, 22)]);
    }
}
