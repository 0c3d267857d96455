//! Weighted orientation histograms over a small neighbourhood.
//!
//! Orientation codes are bytes in `[0, 80 * pi)`. Each pixel of a 5x5
//! neighbourhood votes with its gradient magnitude times a normalized Gaussian
//! weight, split linearly between the two nearest of 9 bins (bins wrap
//! around). The histogram is written at the neighbourhood center.

use crate::image::{ImageView, OwnedImage};
use crate::util::{ForestPatchError, ForestPatchResult};

/// Number of orientation bins.
pub const HOG_BINS: usize = 9;
/// Side of the square voting neighbourhood.
pub const HOG_WINDOW: usize = 5;

const ORIENTATION_SPAN: f32 = std::f32::consts::PI * 80.0;

/// Precomputed Gaussian weights and bin geometry. Holds no per-image state.
#[derive(Clone, Debug)]
pub struct OrientationBinner {
    bin_size: f32,
    weights: [f32; HOG_WINDOW * HOG_WINDOW],
}

impl Default for OrientationBinner {
    fn default() -> Self {
        Self::new()
    }
}

impl OrientationBinner {
    pub fn new() -> Self {
        let a = -((HOG_WINDOW - 1) as f64) / 2.0;
        let half = 0.5 * HOG_WINDOW as f64;
        let sigma2 = 2.0 * half * half;
        let mut raw = [0.0f64; HOG_WINDOW * HOG_WINDOW];
        for y in 0..HOG_WINDOW {
            for x in 0..HOG_WINDOW {
                let (dx, dy) = (a + x as f64, a + y as f64);
                raw[y * HOG_WINDOW + x] = (-(dx * dx + dy * dy) / sigma2).exp();
            }
        }
        let total: f64 = raw.iter().sum();
        Self {
            bin_size: ORIENTATION_SPAN / HOG_BINS as f32,
            weights: raw.map(|w| (w / total) as f32),
        }
    }

    /// Gaussian weight of neighbourhood cell `(x, y)`.
    pub fn weight(&self, x: usize, y: usize) -> f32 {
        self.weights[y * HOG_WINDOW + x]
    }

    /// Splits `weight` between the two bins nearest to `value` (in bin units).
    #[inline]
    fn vote(&self, value: f32, weight: f32, hist: &mut [f64; HOG_BINS]) {
        let bin1 = (value as usize).min(HOG_BINS - 1);
        let mut delta = value - bin1 as f32 - 0.5;
        let bin2 = if delta < 0.0 {
            delta = -delta;
            if bin1 < 1 {
                HOG_BINS - 1
            } else {
                bin1 - 1
            }
        } else if bin1 < HOG_BINS - 1 {
            bin1 + 1
        } else {
            0
        };
        hist[bin1] += f64::from((1.0 - delta) * weight);
        hist[bin2] += f64::from(delta * weight);
    }

    /// Histogram of the neighbourhood whose top-left corner is `(x0, y0)`.
    pub fn histogram_at(
        &self,
        orientation: ImageView<'_, u8>,
        magnitude: ImageView<'_, u8>,
        x0: usize,
        y0: usize,
    ) -> [f64; HOG_BINS] {
        let mut hist = [0.0f64; HOG_BINS];
        for wy in 0..HOG_WINDOW {
            let (Some(o_row), Some(m_row)) = (orientation.row(y0 + wy), magnitude.row(y0 + wy))
            else {
                continue;
            };
            for wx in 0..HOG_WINDOW {
                let x = x0 + wx;
                let (Some(&o), Some(&m)) = (o_row.get(x), m_row.get(x)) else {
                    continue;
                };
                let value = f32::from(o) / self.bin_size;
                self.vote(value, f32::from(m) * self.weight(wx, wy), &mut hist);
            }
        }
        hist
    }

    /// Computes the 9 histogram planes for a whole image.
    ///
    /// Neighbourhood top-left corners range over `0..width - 5` and
    /// `0..height - 5`; every other pixel stays 0.
    pub fn extract(
        &self,
        orientation: ImageView<'_, u8>,
        magnitude: ImageView<'_, u8>,
    ) -> ForestPatchResult<Vec<OwnedImage<u8>>> {
        if orientation.size() != magnitude.size() {
            return Err(ForestPatchError::SizeMismatch {
                expected: orientation.size(),
                got: magnitude.size(),
            });
        }
        let (width, height) = orientation.size();
        let mut planes = (0..HOG_BINS)
            .map(|_| OwnedImage::<u8>::zeros(width, height))
            .collect::<ForestPatchResult<Vec<_>>>()?;

        let half = HOG_WINDOW / 2;
        for y0 in 0..height.saturating_sub(HOG_WINDOW) {
            for x0 in 0..width.saturating_sub(HOG_WINDOW) {
                let hist = self.histogram_at(orientation, magnitude, x0, y0);
                let idx = (y0 + half) * width + x0 + half;
                for (plane, &mass) in planes.iter_mut().zip(hist.iter()) {
                    plane.data_mut()[idx] = mass as u8;
                }
            }
        }
        Ok(planes)
    }
}
