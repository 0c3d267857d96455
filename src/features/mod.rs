//! Per-pixel feature channels for patch-based forest training.
//!
//! [`FeatureBuilder::build`] turns an RGB image into a stack of exactly
//! [`NUM_CHANNELS`] `u8` planes with a fixed meaning per index:
//!
//! | index  | content                                              |
//! |--------|------------------------------------------------------|
//! | 0..3   | L, a, b                                              |
//! | 3, 4   | `0.25 * abs` of the first Sobel derivatives in x, y  |
//! | 5, 6   | `0.25 * abs` of the second Sobel derivatives in x, y |
//! | 7..16  | 9-bin weighted orientation histogram                 |
//! | 16..32 | 5x5 minimum of channels 0..16                        |
//!
//! Channels 0..16 are finally replaced by their 5x5 maximum. Trained forests
//! address channels by index, so this order is part of the data format.

use crate::filter::max_min_filter;
use crate::image::ops::{
    convert_scale_abs, ensure_size, rgb_to_gray, rgb_to_lab, sobel, SobelOrder,
};
use crate::image::{ImageView, OwnedImage, Rect, Rgb};
use crate::trace::{trace_event, trace_span};
use crate::util::{ForestPatchError, ForestPatchResult};

mod hog;

pub use hog::{OrientationBinner, HOG_BINS, HOG_WINDOW};

/// Total channel count of a feature stack.
pub const NUM_CHANNELS: usize = 32;
/// Channels computed directly from the image (before the min/max envelope).
pub const BASE_CHANNELS: usize = 16;
/// First orientation histogram channel.
pub const HOG_OFFSET: usize = 7;
/// First min-filtered channel.
pub const MIN_OFFSET: usize = BASE_CHANNELS;

const DERIVATIVE_SCALE: f32 = 0.25;
const ORIENTATION_SCALE: f32 = 80.0;

/// Feature extraction parameters.
#[derive(Clone, Debug)]
pub struct FeatureConfig {
    /// Side of the square min/max envelope window.
    pub extremum_width: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self { extremum_width: 5 }
    }
}

impl FeatureConfig {
    pub fn validate(&self) -> ForestPatchResult<()> {
        if self.extremum_width == 0 {
            return Err(ForestPatchError::InvalidConfig {
                reason: "extremum_width must be >= 1",
            });
        }
        Ok(())
    }
}

/// Ordered stack of same-sized feature planes.
#[derive(Clone, Debug)]
pub struct FeatureChannels {
    width: usize,
    height: usize,
    channels: Vec<OwnedImage<u8>>,
}

impl FeatureChannels {
    /// Wraps caller-supplied planes; there must be exactly [`NUM_CHANNELS`]
    /// of them, all the same size.
    pub fn from_channels(channels: Vec<OwnedImage<u8>>) -> ForestPatchResult<Self> {
        if channels.len() != NUM_CHANNELS {
            return Err(ForestPatchError::InvalidChannelCount {
                expected: NUM_CHANNELS,
                got: channels.len(),
            });
        }
        let (width, height) = channels[0].size();
        ensure_size((width, height), &channels)?;
        Ok(Self {
            width,
            height,
            channels,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Number of planes (always [`NUM_CHANNELS`]).
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// View of plane `index`.
    pub fn channel(&self, index: usize) -> Option<ImageView<'_, u8>> {
        self.channels.get(index).map(OwnedImage::view)
    }

    pub fn channels(&self) -> &[OwnedImage<u8>] {
        &self.channels
    }

    /// Copies `rect` out of every plane, in stack order.
    pub fn crop(&self, rect: Rect) -> ForestPatchResult<Vec<OwnedImage<u8>>> {
        self.channels
            .iter()
            .map(|ch| ch.view().roi(rect).map(|roi| roi.to_owned_image()))
            .collect()
    }

    pub fn into_channels(self) -> Vec<OwnedImage<u8>> {
        self.channels
    }
}

/// Builds feature stacks; reusable across images and threads.
#[derive(Clone, Debug, Default)]
pub struct FeatureBuilder {
    cfg: FeatureConfig,
    binner: OrientationBinner,
}

impl FeatureBuilder {
    pub fn new(cfg: FeatureConfig) -> ForestPatchResult<Self> {
        cfg.validate()?;
        Ok(Self {
            cfg,
            binner: OrientationBinner::new(),
        })
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.cfg
    }

    /// Computes the full channel stack for `img`.
    pub fn build(&self, img: ImageView<'_, Rgb>) -> ForestPatchResult<FeatureChannels> {
        let _span = trace_span!(
            "extract_feature_channels",
            width = img.width(),
            height = img.height()
        )
        .entered();

        let mut planes = self.base_channels(img)?;
        debug_assert_eq!(planes.len(), MIN_OFFSET);
        let envelope = min_max_envelope(&mut planes, self.cfg.extremum_width);
        planes.extend(envelope);

        trace_event!("feature_channels", count = planes.len());
        FeatureChannels::from_channels(planes)
    }

    /// Computes channels `0..BASE_CHANNELS` before the min/max envelope.
    pub fn base_channels(
        &self,
        img: ImageView<'_, Rgb>,
    ) -> ForestPatchResult<Vec<OwnedImage<u8>>> {
        let gray = rgb_to_gray(img);
        let ix = sobel(gray.view(), SobelOrder::Dx);
        let iy = sobel(gray.view(), SobelOrder::Dy);
        let (orientation, magnitude) = orientation_and_magnitude(&ix, &iy)?;
        let hog = self.binner.extract(orientation.view(), magnitude.view())?;
        let ixx = sobel(gray.view(), SobelOrder::Dxx);
        let iyy = sobel(gray.view(), SobelOrder::Dyy);
        let [l, a, b] = rgb_to_lab(img);

        let mut base = Vec::with_capacity(NUM_CHANNELS);
        base.extend([l, a, b]);
        base.push(convert_scale_abs(ix.view(), DERIVATIVE_SCALE));
        base.push(convert_scale_abs(iy.view(), DERIVATIVE_SCALE));
        base.push(convert_scale_abs(ixx.view(), DERIVATIVE_SCALE));
        base.push(convert_scale_abs(iyy.view(), DERIVATIVE_SCALE));
        debug_assert_eq!(base.len(), HOG_OFFSET);
        base.extend(hog);
        debug_assert_eq!(base.len(), BASE_CHANNELS);
        Ok(base)
    }
}

/// Builds a feature stack with the default configuration.
pub fn extract_feature_channels(img: ImageView<'_, Rgb>) -> ForestPatchResult<FeatureChannels> {
    FeatureBuilder::default().build(img)
}

/// Quantized gradient orientation and saturated gradient magnitude.
///
/// Orientation is `(atan(dy / dx') + pi / 2) * 80` truncated to a byte, where
/// `dx'` is `dx` nudged away from zero by `1e-6` with the sign of `dx`.
pub fn orientation_and_magnitude(
    ix: &OwnedImage<i16>,
    iy: &OwnedImage<i16>,
) -> ForestPatchResult<(OwnedImage<u8>, OwnedImage<u8>)> {
    if ix.size() != iy.size() {
        return Err(ForestPatchError::SizeMismatch {
            expected: ix.size(),
            got: iy.size(),
        });
    }
    let (width, height) = ix.size();
    let len = width * height;
    let mut orientation = Vec::with_capacity(len);
    let mut magnitude = Vec::with_capacity(len);
    for (&gx, &gy) in ix.data().iter().zip(iy.data()) {
        let (dx, dy) = (f32::from(gx), f32::from(gy));
        let tx = dx + 1e-6f32.copysign(dx);
        let angle = (dy / tx).atan() + std::f32::consts::FRAC_PI_2;
        orientation.push((angle * ORIENTATION_SCALE) as u8);
        magnitude.push(dx.hypot(dy) as u8);
    }
    Ok((
        OwnedImage::new(orientation, width, height)?,
        OwnedImage::new(magnitude, width, height)?,
    ))
}

/// Replaces each plane with its max filter and returns the min filters of the
/// original values, in the same order.
#[cfg(not(feature = "rayon"))]
fn min_max_envelope(planes: &mut [OwnedImage<u8>], width: usize) -> Vec<OwnedImage<u8>> {
    planes
        .iter_mut()
        .map(|plane| envelope_one(plane, width))
        .collect()
}

#[cfg(feature = "rayon")]
fn min_max_envelope(planes: &mut [OwnedImage<u8>], width: usize) -> Vec<OwnedImage<u8>> {
    use rayon::prelude::*;
    planes
        .par_iter_mut()
        .map(|plane| envelope_one(plane, width))
        .collect()
}

fn envelope_one(plane: &mut OwnedImage<u8>, width: usize) -> OwnedImage<u8> {
    let (hi, lo) = max_min_filter(plane.view(), width);
    *plane = hi;
    lo
}
