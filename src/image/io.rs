//! Convenience helpers for loading images via the `image` crate.
//!
//! Available when the `image-io` feature is enabled.

use crate::image::{OwnedImage, Rgb};
use crate::util::{ForestPatchError, ForestPatchResult};
use std::path::Path;

/// Copies an `image` RGB buffer into an owned RGB image.
pub fn owned_from_rgb_image(img: &image::RgbImage) -> ForestPatchResult<OwnedImage<Rgb>> {
    let width = img.width() as usize;
    let height = img.height() as usize;
    let pixels = img.pixels().map(|p| p.0).collect();
    OwnedImage::new(pixels, width, height)
}

/// Converts any decoded image to owned RGB.
pub fn owned_from_dynamic_image(img: &image::DynamicImage) -> ForestPatchResult<OwnedImage<Rgb>> {
    owned_from_rgb_image(&img.to_rgb8())
}

/// Loads an image from disk as RGB.
pub fn load_rgb_image<P: AsRef<Path>>(path: P) -> ForestPatchResult<OwnedImage<Rgb>> {
    let img = image::open(path).map_err(|err| ForestPatchError::ImageIo {
        reason: err.to_string(),
    })?;
    owned_from_dynamic_image(&img)
}
