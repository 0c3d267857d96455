//! Owned contiguous image buffers.

use crate::image::ImageView;
use crate::util::{ForestPatchError, ForestPatchResult};

/// Owned contiguous single-plane image (`stride == width`).
#[derive(Clone, Debug, PartialEq)]
pub struct OwnedImage<T = u8> {
    data: Vec<T>,
    width: usize,
    height: usize,
}

impl<T: Copy> OwnedImage<T> {
    /// Wraps a row-major buffer of exactly `width * height` elements.
    pub fn new(data: Vec<T>, width: usize, height: usize) -> ForestPatchResult<Self> {
        let needed = checked_len(width, height)?;
        if data.len() < needed {
            return Err(ForestPatchError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        if data.len() > needed {
            return Err(ForestPatchError::InvalidDimensions { width, height });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Allocates an image filled with `value`.
    pub fn filled(width: usize, height: usize, value: T) -> ForestPatchResult<Self> {
        let len = checked_len(width, height)?;
        Ok(Self {
            data: vec![value; len],
            width,
            height,
        })
    }

    pub(crate) fn from_parts(data: Vec<T>, width: usize, height: usize) -> Self {
        debug_assert_eq!(data.len(), width * height);
        Self {
            data,
            width,
            height,
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

    /// Returns the row-major pixel buffer.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Returns the row-major pixel buffer for in-place edits.
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consumes the image and returns its buffer.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Returns the pixel at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.width + x).copied()
    }

    /// Returns row `y`.
    pub fn row(&self, y: usize) -> Option<&[T]> {
        if y >= self.height {
            return None;
        }
        let start = y * self.width;
        self.data.get(start..start + self.width)
    }

    /// Returns row `y` for in-place edits.
    pub fn row_mut(&mut self, y: usize) -> Option<&mut [T]> {
        if y >= self.height {
            return None;
        }
        let start = y * self.width;
        self.data.get_mut(start..start + self.width)
    }

    /// Returns a borrowed view of the image.
    pub fn view(&self) -> ImageView<'_, T> {
        ImageView::from_parts(&self.data, self.width, self.height, self.width)
    }
}

impl<T: Copy + Default> OwnedImage<T> {
    /// Allocates a default-filled (zero) image.
    pub fn zeros(width: usize, height: usize) -> ForestPatchResult<Self> {
        Self::filled(width, height, T::default())
    }
}

fn checked_len(width: usize, height: usize) -> ForestPatchResult<usize> {
    if width == 0 || height == 0 {
        return Err(ForestPatchError::InvalidDimensions { width, height });
    }
    width
        .checked_mul(height)
        .ok_or(ForestPatchError::InvalidDimensions { width, height })
}

#[cfg(test)]
mod tests {
    use super::OwnedImage;
    use crate::util::ForestPatchError;

    #[test]
    fn new_rejects_wrong_buffer_length() {
        let err = OwnedImage::new(vec![0u8; 5], 2, 3).unwrap_err();
        assert_eq!(err, ForestPatchError::BufferTooSmall { needed: 6, got: 5 });

        let err = OwnedImage::new(vec![0u8; 7], 2, 3).unwrap_err();
        assert_eq!(
            err,
            ForestPatchError::InvalidDimensions {
                width: 2,
                height: 3
            }
        );
    }

    #[test]
    fn row_mut_edits_single_row() {
        let mut img = OwnedImage::<u8>::zeros(3, 2).unwrap();
        img.row_mut(1).unwrap().copy_from_slice(&[7, 8, 9]);
        assert_eq!(img.data(), &[0, 0, 0, 7, 8, 9]);
        assert_eq!(img.get(2, 1), Some(9));
        assert_eq!(img.get(3, 1), None);
    }
}
