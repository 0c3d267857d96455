//! Image views, owned buffers, and the pixel primitives the feature pipeline
//! is built from.
//!
//! `ImageView` is a borrowed 2D view into a 1D buffer with an explicit stride.
//! The stride counts elements between the starts of consecutive rows, so a
//! stride larger than the width represents padded rows. ROI slices are zero-copy
//! views into the same backing slice and retain the original stride.
//!
//! Color images are views over `[u8; 3]` pixels in RGB order.

use crate::util::{ForestPatchError, ForestPatchResult};

mod geom;
#[cfg(feature = "image-io")]
pub mod io;
pub mod ops;
mod owned;

pub use geom::{Offset, Point, Rect};
pub use owned::OwnedImage;

/// Interleaved RGB pixel.
pub type Rgb = [u8; 3];

/// Borrowed 2D image view with an explicit stride.
#[derive(Copy, Clone, Debug)]
pub struct ImageView<'a, T> {
    data: &'a [T],
    width: usize,
    height: usize,
    stride: usize,
}

impl<'a, T> ImageView<'a, T> {
    /// Creates a contiguous view with `stride == width`.
    pub fn from_slice(data: &'a [T], width: usize, height: usize) -> ForestPatchResult<Self> {
        Self::new(data, width, height, width)
    }

    /// Creates a view with an explicit stride.
    pub fn new(
        data: &'a [T],
        width: usize,
        height: usize,
        stride: usize,
    ) -> ForestPatchResult<Self> {
        let needed = required_len(width, height, stride)?;
        if data.len() < needed {
            return Err(ForestPatchError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    pub(crate) fn from_parts(data: &'a [T], width: usize, height: usize, stride: usize) -> Self {
        debug_assert!(required_len(width, height, stride).is_ok_and(|n| n <= data.len()));
        Self {
            data,
            width,
            height,
            stride,
        }
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns `(width, height)`.
    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Returns the stride in elements between row starts.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the backing slice including any row padding.
    pub fn as_slice(&self) -> &'a [T] {
        self.data
    }

    /// Returns the full-image rectangle.
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    /// Returns the element at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<&'a T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = y.checked_mul(self.stride)?.checked_add(x)?;
        self.data.get(idx)
    }

    /// Returns a contiguous slice for row `y` with length `width`.
    pub fn row(&self, y: usize) -> Option<&'a [T]> {
        if y >= self.height {
            return None;
        }
        let start = y.checked_mul(self.stride)?;
        let end = start.checked_add(self.width)?;
        self.data.get(start..end)
    }

    /// Iterates over all rows top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &'a [T]> + '_ {
        (0..self.height).filter_map(move |y| self.row(y))
    }

    /// Returns a zero-copy view of `rect` within this image.
    pub fn roi(&self, rect: Rect) -> ForestPatchResult<ImageView<'a, T>> {
        let Rect {
            x,
            y,
            width,
            height,
        } = rect;
        if width == 0 || height == 0 {
            return Err(ForestPatchError::InvalidDimensions { width, height });
        }
        if !self.bounds().contains_rect(&rect) {
            return Err(ForestPatchError::RoiOutOfBounds {
                x,
                y,
                width,
                height,
                img_width: self.width,
                img_height: self.height,
            });
        }

        let start = y
            .checked_mul(self.stride)
            .and_then(|v| v.checked_add(x))
            .ok_or(ForestPatchError::InvalidDimensions {
                width: self.width,
                height: self.height,
            })?;
        let data = self
            .data
            .get(start..)
            .ok_or(ForestPatchError::BufferTooSmall {
                needed: start.saturating_add(1),
                got: self.data.len(),
            })?;

        ImageView::new(data, width, height, self.stride)
    }
}

impl<T: Copy> ImageView<'_, T> {
    /// Copies the view into a contiguous owned image.
    pub fn to_owned_image(&self) -> OwnedImage<T> {
        let mut data = Vec::with_capacity(self.width * self.height);
        for row in self.rows() {
            data.extend_from_slice(row);
        }
        OwnedImage::from_parts(data, self.width, self.height)
    }
}

fn required_len(width: usize, height: usize, stride: usize) -> ForestPatchResult<usize> {
    if width == 0 || height == 0 {
        return Err(ForestPatchError::InvalidDimensions { width, height });
    }
    if stride < width {
        return Err(ForestPatchError::InvalidStride { width, stride });
    }
    let needed = (height - 1)
        .checked_mul(stride)
        .and_then(|v| v.checked_add(width))
        .ok_or(ForestPatchError::InvalidDimensions { width, height })?;
    Ok(needed)
}
