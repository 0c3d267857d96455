//! Gray-level co-occurrence contrast.
//!
//! The co-occurrence matrix counts horizontally adjacent pixel pairs over the
//! full 8-bit range, is made symmetric by adding its transpose, and is
//! normalized to sum to one. Contrast is `sum (i - j)^2 P(i, j)` divided by
//! the bin count (256 * 256). The texture labeling threshold of the sampler is
//! expressed in exactly these units.

use crate::image::ops::rgb_to_gray;
use crate::image::{ImageView, Rgb};

/// Gray levels per axis.
pub const GRAY_LEVELS: usize = 256;

const BINS: usize = GRAY_LEVELS * GRAY_LEVELS;

/// Normalized symmetric 256x256 co-occurrence histogram.
#[derive(Clone)]
pub struct CooccurrenceMatrix {
    bins: Vec<f32>,
}

impl CooccurrenceMatrix {
    /// Builds the matrix from horizontally adjacent pairs of a gray patch.
    ///
    /// A patch narrower than two pixels has no pairs and yields an all-zero
    /// matrix.
    pub fn horizontal(patch: ImageView<'_, u8>) -> Self {
        let mut counts = vec![0u32; BINS];
        let mut pairs = 0u64;
        for row in patch.rows() {
            for pair in row.windows(2) {
                let (a, b) = (usize::from(pair[0]), usize::from(pair[1]));
                counts[a * GRAY_LEVELS + b] += 1;
                counts[b * GRAY_LEVELS + a] += 1;
                pairs += 2;
            }
        }

        let bins = if pairs == 0 {
            vec![0.0; BINS]
        } else {
            let inv = 1.0 / pairs as f64;
            counts.iter().map(|&c| (f64::from(c) * inv) as f32).collect()
        };
        Self { bins }
    }

    /// Probability mass of the pair `(i, j)`.
    pub fn get(&self, i: u8, j: u8) -> f32 {
        self.bins[usize::from(i) * GRAY_LEVELS + usize::from(j)]
    }

    /// Total mass; one for any patch with at least one pair.
    pub fn sum(&self) -> f64 {
        self.bins.iter().map(|&p| f64::from(p)).sum()
    }

    /// Contrast normalized by the bin count.
    pub fn contrast(&self) -> f32 {
        let mut acc = 0.0f64;
        for (idx, &p) in self.bins.iter().enumerate() {
            if p == 0.0 {
                continue;
            }
            let d = (idx / GRAY_LEVELS) as f64 - (idx % GRAY_LEVELS) as f64;
            acc += d * d * f64::from(p);
        }
        (acc / BINS as f64) as f32
    }
}

/// Co-occurrence contrast of a gray patch.
pub fn glcm_contrast(patch: ImageView<'_, u8>) -> f32 {
    CooccurrenceMatrix::horizontal(patch).contrast()
}

/// Co-occurrence contrast of an RGB patch after luma conversion.
pub fn glcm_contrast_rgb(patch: ImageView<'_, Rgb>) -> f32 {
    glcm_contrast(rgb_to_gray(patch).view())
}
