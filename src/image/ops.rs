//! Pixel primitives used by the feature pipeline.
//!
//! These follow the 8-bit OpenCV conventions the channel layout was tuned
//! against: fixed-point luma weights, the 8-bit Lab encoding
//! (`L * 255 / 100`, `a + 128`, `b + 128`), 3x3 Sobel kernels with a
//! reflect-101 border, and `convert_scale_abs` rounding half to even.

use palette::{FromColor, Lab, LinSrgb, Srgb};

use crate::image::{ImageView, OwnedImage, Rgb};
use crate::util::math::{reflect_101, saturate_u8};
use crate::util::{ForestPatchError, ForestPatchResult};

const GRAY_SHIFT: u32 = 14;
const GRAY_R: u32 = 4899;
const GRAY_G: u32 = 9617;
const GRAY_B: u32 = 1868;

/// Luma of one RGB pixel.
#[inline]
pub fn gray_pixel(px: Rgb) -> u8 {
    let [r, g, b] = px.map(u32::from);
    let sum = r * GRAY_R + g * GRAY_G + b * GRAY_B + (1 << (GRAY_SHIFT - 1));
    (sum >> GRAY_SHIFT) as u8
}

/// Converts an RGB image to single-channel luma.
pub fn rgb_to_gray(src: ImageView<'_, Rgb>) -> OwnedImage<u8> {
    let mut data = Vec::with_capacity(src.width() * src.height());
    for row in src.rows() {
        data.extend(row.iter().copied().map(gray_pixel));
    }
    OwnedImage::from_parts(data, src.width(), src.height())
}

/// Converts an RGB image to 8-bit CIE Lab (D65) and returns the L, a, b planes.
pub fn rgb_to_lab(src: ImageView<'_, Rgb>) -> [OwnedImage<u8>; 3] {
    let len = src.width() * src.height();
    let mut planes = [
        Vec::with_capacity(len),
        Vec::with_capacity(len),
        Vec::with_capacity(len),
    ];

    for row in src.rows() {
        for &[r, g, b] in row {
            let linear: LinSrgb = Srgb::new(r, g, b).into_format::<f32>().into_linear();
            let lab: Lab = Lab::from_color(linear);
            planes[0].push(saturate_u8(lab.l * 255.0 / 100.0));
            planes[1].push(saturate_u8(lab.a + 128.0));
            planes[2].push(saturate_u8(lab.b + 128.0));
        }
    }

    planes.map(|data| OwnedImage::from_parts(data, src.width(), src.height()))
}

/// Derivative order of a 3x3 Sobel operator along one axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SobelOrder {
    /// First derivative along x.
    Dx,
    /// First derivative along y.
    Dy,
    /// Second derivative along x.
    Dxx,
    /// Second derivative along y.
    Dyy,
}

impl SobelOrder {
    const SMOOTH: [i32; 3] = [1, 2, 1];
    const FIRST: [i32; 3] = [-1, 0, 1];
    const SECOND: [i32; 3] = [1, -2, 1];

    fn kernels(self) -> ([i32; 3], [i32; 3]) {
        match self {
            SobelOrder::Dx => (Self::FIRST, Self::SMOOTH),
            SobelOrder::Dy => (Self::SMOOTH, Self::FIRST),
            SobelOrder::Dxx => (Self::SECOND, Self::SMOOTH),
            SobelOrder::Dyy => (Self::SMOOTH, Self::SECOND),
        }
    }
}

/// Signed 3x3 Sobel response with a reflect-101 border.
///
/// Results fit `i16` for `u8` input (at most `4 * 510` in magnitude).
pub fn sobel(src: ImageView<'_, u8>, order: SobelOrder) -> OwnedImage<i16> {
    let (kx, ky) = order.kernels();
    let width = src.width();
    let height = src.height();
    let data = src.as_slice();
    let stride = src.stride();

    let cols: Vec<[usize; 3]> = (0..width)
        .map(|x| std::array::from_fn(|k| reflect_101(x as isize + k as isize - 1, width)))
        .collect();

    let mut out = Vec::with_capacity(width * height);
    for y in 0..height {
        let rows: [usize; 3] =
            std::array::from_fn(|k| reflect_101(y as isize + k as isize - 1, height) * stride);
        for taps in &cols {
            let mut acc = 0i32;
            for (row_start, wy) in rows.iter().zip(ky) {
                if wy == 0 {
                    continue;
                }
                let mut line = 0i32;
                for (&col, wx) in taps.iter().zip(kx) {
                    line += wx * i32::from(data[row_start + col]);
                }
                acc += wy * line;
            }
            out.push(acc as i16);
        }
    }
    OwnedImage::from_parts(out, width, height)
}

/// `saturate(|v * scale|)` per element, rounding half to even.
pub fn convert_scale_abs(src: ImageView<'_, i16>, scale: f32) -> OwnedImage<u8> {
    let mut out = Vec::with_capacity(src.width() * src.height());
    for row in src.rows() {
        out.extend(row.iter().map(|&v| saturate_u8((f32::from(v) * scale).abs())));
    }
    OwnedImage::from_parts(out, src.width(), src.height())
}

/// Checks that every plane in `planes` has the given size.
pub(crate) fn ensure_size<T: Copy>(
    expected: (usize, usize),
    planes: &[OwnedImage<T>],
) -> ForestPatchResult<()> {
    match planes.iter().find(|p| p.size() != expected) {
        Some(plane) => Err(ForestPatchError::SizeMismatch {
            expected,
            got: plane.size(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(data: &[u8], width: usize, height: usize) -> ImageView<'_, u8> {
        ImageView::from_slice(data, width, height).unwrap()
    }

    #[test]
    fn gray_matches_fixed_point_weights() {
        assert_eq!(gray_pixel([0, 0, 0]), 0);
        assert_eq!(gray_pixel([255, 255, 255]), 255);
        assert_eq!(gray_pixel([255, 0, 0]), 76);
        assert_eq!(gray_pixel([0, 255, 0]), 150);
        assert_eq!(gray_pixel([0, 0, 255]), 29);
    }

    #[test]
    fn lab_matches_reference_colors() {
        let pixels: [Rgb; 3] = [[255, 255, 255], [0, 0, 0], [255, 0, 0]];
        let src = ImageView::from_slice(&pixels, 3, 1).unwrap();
        let [l, a, b] = rgb_to_lab(src);
        assert_eq!(l.data()[..2], [255, 0]);
        assert_eq!(a.data()[..2], [128, 128]);
        assert_eq!(b.data()[..2], [128, 128]);
        assert!((i32::from(l.data()[2]) - 136).abs() <= 1);
        assert!((i32::from(a.data()[2]) - 208).abs() <= 1);
        assert!((i32::from(b.data()[2]) - 195).abs() <= 1);
    }

    #[test]
    fn sobel_dx_of_horizontal_ramp_is_constant() {
        let data: Vec<u8> = (0..5).flat_map(|_| (0..6u8).map(|x| x * 10)).collect();
        let dx = sobel(view(&data, 6, 5), SobelOrder::Dx);
        // Interior columns see a slope of 10 per pixel: (20) * (1 + 2 + 1).
        for y in 0..5 {
            for x in 1..5 {
                assert_eq!(dx.get(x, y), Some(80));
            }
            // Reflect-101 mirrors the neighbour, so the edge derivative vanishes.
            assert_eq!(dx.get(0, y), Some(0));
            assert_eq!(dx.get(5, y), Some(0));
        }
        let dy = sobel(view(&data, 6, 5), SobelOrder::Dy);
        assert!(dy.data().iter().all(|&v| v == 0));
    }

    #[test]
    fn sobel_second_derivative_of_ramp_is_zero_inside() {
        let data: Vec<u8> = (0..4).flat_map(|y| (0..4u8).map(move |_| y * 7)).collect();
        let dyy = sobel(view(&data, 4, 4), SobelOrder::Dyy);
        for x in 0..4 {
            assert_eq!(dyy.get(x, 1), Some(0));
            assert_eq!(dyy.get(x, 2), Some(0));
        }
    }

    #[test]
    fn convert_scale_abs_rounds_and_saturates() {
        let data = [-6i16, 2, 10, 2000];
        let src = ImageView::from_slice(&data, 4, 1).unwrap();
        let out = convert_scale_abs(src, 0.25);
        assert_eq!(out.data(), &[2, 0, 2, 255]);
    }
}
