//! Low-level building blocks for custom feature pipelines.
//!
//! These expose the strided 1D filters, the individual pixel primitives, and
//! the histogram types the feature builder is assembled from. Most users
//! should prefer [`crate::FeatureBuilder`] and [`crate::PatchSampler`].

pub use crate::features::{orientation_and_magnitude, OrientationBinner, HOG_BINS, HOG_WINDOW};
pub use crate::filter::{
    max_filter_1d, max_filter_1d_in_place, max_min_filter_1d, min_filter_1d,
    min_filter_1d_in_place, Extremum, Max, Min, Strided, StridedMut,
};
pub use crate::image::ops::{
    convert_scale_abs, gray_pixel, rgb_to_gray, rgb_to_lab, sobel, SobelOrder,
};
pub use crate::texture::{CooccurrenceMatrix, GRAY_LEVELS};
