//! Strided 1D views over a flat buffer.
//!
//! A view addresses `len` elements starting at `offset`, `stride` elements
//! apart. Rows of a row-major image are `stride == 1`; columns use
//! `stride == width`. Bounds are validated once at construction, accessors
//! only assert the logical index in debug builds.

use crate::util::{ForestPatchError, ForestPatchResult};

fn validate(
    buf_len: usize,
    offset: usize,
    stride: usize,
    len: usize,
) -> ForestPatchResult<()> {
    if len == 0 {
        return Ok(());
    }
    if stride == 0 && len > 1 {
        return Err(ForestPatchError::InvalidStride { width: len, stride });
    }
    let last = (len - 1)
        .checked_mul(stride)
        .and_then(|v| v.checked_add(offset))
        .ok_or(ForestPatchError::InvalidDimensions {
            width: len,
            height: 1,
        })?;
    if last >= buf_len {
        return Err(ForestPatchError::BufferTooSmall {
            needed: last + 1,
            got: buf_len,
        });
    }
    Ok(())
}

/// Read-only strided view.
#[derive(Clone, Copy, Debug)]
pub struct Strided<'a, T = u8> {
    data: &'a [T],
    offset: usize,
    stride: usize,
    len: usize,
}

impl<'a, T: Copy> Strided<'a, T> {
    /// Creates a view of `len` elements at `data[offset + i * stride]`.
    pub fn new(data: &'a [T], offset: usize, stride: usize, len: usize) -> ForestPatchResult<Self> {
        validate(data.len(), offset, stride, len)?;
        Ok(Self {
            data,
            offset,
            stride,
            len,
        })
    }

    /// Views a whole slice with unit stride.
    pub fn contiguous(data: &'a [T]) -> Self {
        Self {
            data,
            offset: 0,
            stride: 1,
            len: data.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    #[inline]
    pub fn get(&self, i: usize) -> T {
        debug_assert!(i < self.len, "strided index {i} out of range {}", self.len);
        self.data[self.offset + i * self.stride]
    }

    /// Copies the addressed elements into a vector.
    pub fn to_vec(&self) -> Vec<T> {
        (0..self.len).map(|i| self.get(i)).collect()
    }
}

/// Mutable strided view.
#[derive(Debug)]
pub struct StridedMut<'a, T = u8> {
    data: &'a mut [T],
    offset: usize,
    stride: usize,
    len: usize,
}

impl<'a, T: Copy> StridedMut<'a, T> {
    /// Creates a mutable view of `len` elements at `data[offset + i * stride]`.
    pub fn new(
        data: &'a mut [T],
        offset: usize,
        stride: usize,
        len: usize,
    ) -> ForestPatchResult<Self> {
        validate(data.len(), offset, stride, len)?;
        Ok(Self {
            data,
            offset,
            stride,
            len,
        })
    }

    /// Views a whole slice with unit stride.
    pub fn contiguous(data: &'a mut [T]) -> Self {
        let len = data.len();
        Self {
            data,
            offset: 0,
            stride: 1,
            len,
        }
    }

    /// Row `y` of a row-major plane; callers guarantee the geometry.
    pub(crate) fn row(data: &'a mut [T], width: usize, y: usize) -> Self {
        debug_assert!(validate(data.len(), y * width, 1, width).is_ok());
        Self {
            data,
            offset: y * width,
            stride: 1,
            len: width,
        }
    }

    /// Column `x` of a row-major plane; callers guarantee the geometry.
    pub(crate) fn column(data: &'a mut [T], width: usize, height: usize, x: usize) -> Self {
        debug_assert!(validate(data.len(), x, width, height).is_ok());
        Self {
            data,
            offset: x,
            stride: width,
            len: height,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn get(&self, i: usize) -> T {
        debug_assert!(i < self.len, "strided index {i} out of range {}", self.len);
        self.data[self.offset + i * self.stride]
    }

    #[inline]
    pub fn set(&mut self, i: usize, value: T) {
        debug_assert!(i < self.len, "strided index {i} out of range {}", self.len);
        self.data[self.offset + i * self.stride] = value;
    }

    /// Copies the addressed elements into a vector.
    pub fn to_vec(&self) -> Vec<T> {
        (0..self.len).map(|i| self.get(i)).collect()
    }
}
