//! Separable min/max (extremum) filters.
//!
//! The 1D filter in [`line`] runs in amortized O(1) per element for any
//! window width. A square `w x w` filter is one pass along every row followed
//! by one pass along every column, which yields the exact 2D neighbourhood
//! extremum because min and max are separable.
//!
//! Windows are clipped at the image border: output `(x, y)` covers the part of
//! `[x - L, x + R] x [y - L, y + R]` inside the image, with
//! `R = (w + 1) / 2 - 1` and `L = w - 1 - R`.

use std::collections::VecDeque;

use crate::image::{ImageView, OwnedImage};
use crate::util::{ForestPatchError, ForestPatchResult};

pub mod line;
pub mod strided;

pub use line::{
    max_filter_1d, max_filter_1d_in_place, max_min_filter_1d, min_filter_1d,
    min_filter_1d_in_place,
};
pub use strided::{Strided, StridedMut};

/// Ordering that decides which of two values survives in a window.
pub trait Extremum {
    /// Returns true if a queued value can never again be the window extremum
    /// once `incoming` has been seen.
    fn dominates<T: Ord>(incoming: T, queued: T) -> bool;
}

/// Sliding maximum.
#[derive(Clone, Copy, Debug)]
pub struct Max;

/// Sliding minimum.
#[derive(Clone, Copy, Debug)]
pub struct Min;

impl Extremum for Max {
    #[inline]
    fn dominates<T: Ord>(incoming: T, queued: T) -> bool {
        incoming >= queued
    }
}

impl Extremum for Min {
    #[inline]
    fn dominates<T: Ord>(incoming: T, queued: T) -> bool {
        incoming <= queued
    }
}

fn new_queue<T>(width: usize, plane: (usize, usize)) -> VecDeque<(usize, T)> {
    VecDeque::with_capacity(width.min(plane.0.max(plane.1)) + 1)
}

fn columns_in_place<E: Extremum, T: Copy + Ord>(
    img: &mut OwnedImage<T>,
    width: usize,
    queue: &mut VecDeque<(usize, T)>,
) {
    let (w, h) = img.size();
    let data = img.data_mut();
    for x in 0..w {
        let mut column = StridedMut::column(&mut *data, w, h, x);
        line::run::<E, T, _>(&mut column, width, queue);
    }
}

fn filter_in_place<E: Extremum, T: Copy + Ord>(img: &mut OwnedImage<T>, width: usize) {
    if width <= 1 {
        return;
    }
    let mut queue = new_queue(width, img.size());
    let (w, h) = img.size();
    {
        let data = img.data_mut();
        for y in 0..h {
            let mut row = StridedMut::row(&mut *data, w, y);
            line::run::<E, T, _>(&mut row, width, &mut queue);
        }
    }
    columns_in_place::<E, T>(img, width, &mut queue);
}

fn filter_into<E: Extremum, T: Copy + Ord>(
    src: ImageView<'_, T>,
    dst: &mut OwnedImage<T>,
    width: usize,
) -> ForestPatchResult<()> {
    if src.size() != dst.size() {
        return Err(ForestPatchError::SizeMismatch {
            expected: src.size(),
            got: dst.size(),
        });
    }
    let mut queue = new_queue(width, src.size());
    let w = src.width();
    {
        let data = dst.data_mut();
        for (y, src_row) in src.rows().enumerate() {
            let mut pass = line::Split {
                src: Strided::contiguous(src_row),
                dst: StridedMut::row(&mut *data, w, y),
            };
            line::run::<E, T, _>(&mut pass, width, &mut queue);
        }
    }
    columns_in_place::<E, T>(dst, width, &mut queue);
    Ok(())
}

/// Square `width x width` maximum filter into a new image.
pub fn max_filter<T: Copy + Ord>(src: ImageView<'_, T>, width: usize) -> OwnedImage<T> {
    let mut out = src.to_owned_image();
    filter_in_place::<Max, T>(&mut out, width);
    out
}

/// Square `width x width` minimum filter into a new image.
pub fn min_filter<T: Copy + Ord>(src: ImageView<'_, T>, width: usize) -> OwnedImage<T> {
    let mut out = src.to_owned_image();
    filter_in_place::<Min, T>(&mut out, width);
    out
}

/// Square maximum filter written into an existing image of the same size.
pub fn max_filter_into<T: Copy + Ord>(
    src: ImageView<'_, T>,
    dst: &mut OwnedImage<T>,
    width: usize,
) -> ForestPatchResult<()> {
    filter_into::<Max, T>(src, dst, width)
}

/// Square minimum filter written into an existing image of the same size.
pub fn min_filter_into<T: Copy + Ord>(
    src: ImageView<'_, T>,
    dst: &mut OwnedImage<T>,
    width: usize,
) -> ForestPatchResult<()> {
    filter_into::<Min, T>(src, dst, width)
}

/// Square maximum filter, overwriting `img`.
pub fn max_filter_in_place<T: Copy + Ord>(img: &mut OwnedImage<T>, width: usize) {
    filter_in_place::<Max, T>(img, width);
}

/// Square minimum filter, overwriting `img`.
pub fn min_filter_in_place<T: Copy + Ord>(img: &mut OwnedImage<T>, width: usize) {
    filter_in_place::<Min, T>(img, width);
}

/// Square maximum and minimum filters of the same source; returns `(max, min)`.
///
/// The row pass reads each source row once for both outputs.
pub fn max_min_filter<T: Copy + Ord>(
    src: ImageView<'_, T>,
    width: usize,
) -> (OwnedImage<T>, OwnedImage<T>) {
    let mut hi = src.to_owned_image();
    let mut lo = hi.clone();
    if width <= 1 {
        return (hi, lo);
    }

    let mut max_queue = new_queue(width, src.size());
    let mut min_queue = new_queue(width, src.size());
    let w = src.width();
    {
        let hi_data = hi.data_mut();
        let lo_data = lo.data_mut();
        for (y, src_row) in src.rows().enumerate() {
            line::run_dual(
                Strided::contiguous(src_row),
                &mut StridedMut::row(&mut *hi_data, w, y),
                &mut StridedMut::row(&mut *lo_data, w, y),
                width,
                &mut max_queue,
                &mut min_queue,
            );
        }
    }
    columns_in_place::<Max, T>(&mut hi, width, &mut max_queue);
    columns_in_place::<Min, T>(&mut lo, width, &mut min_queue);
    (hi, lo)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_filter_spreads_single_peak_to_window() {
        let mut data = vec![0u8; 7 * 7];
        data[3 * 7 + 3] = 200;
        let src = ImageView::from_slice(&data, 7, 7).unwrap();
        let out = max_filter(src, 3);
        for y in 0..7 {
            for x in 0..7 {
                let inside = (2..=4).contains(&x) && (2..=4).contains(&y);
                assert_eq!(out.get(x, y), Some(if inside { 200 } else { 0 }));
            }
        }
    }

    #[test]
    fn filter_into_rejects_mismatched_destination() {
        let data = [1u8; 12];
        let src = ImageView::from_slice(&data, 4, 3).unwrap();
        let mut dst = OwnedImage::<u8>::zeros(3, 4).unwrap();
        assert_eq!(
            min_filter_into(src, &mut dst, 3).unwrap_err(),
            ForestPatchError::SizeMismatch {
                expected: (4, 3),
                got: (3, 4)
            }
        );
    }

    #[test]
    fn strided_source_rows_are_respected() {
        // 3x2 image stored with a padded stride of 5; padding must be ignored.
        let data = [1u8, 2, 3, 250, 250, 4, 5, 6, 250, 250];
        let src = ImageView::new(&data, 3, 2, 5).unwrap();
        let mut dst = OwnedImage::<u8>::zeros(3, 2).unwrap();
        max_filter_into(src, &mut dst, 3).unwrap();
        assert_eq!(dst.data(), &[5, 6, 6, 5, 6, 6]);
    }
}
