//! Streaming 1D extremum filter over strided lines.
//!
//! A monotonic deque holds `(index, value)` candidates. Each incoming element
//! evicts the candidates it dominates from the back, expired candidates leave
//! from the front, and the front is the extremum of the current window. Every
//! element is pushed and popped at most once, so a line of `n` elements costs
//! O(n) regardless of the window width.
//!
//! Because the deque carries values, an output position can be written as
//! soon as its window has been read. Reads run ahead of writes, which is what
//! makes the in-place variants safe.

use std::collections::VecDeque;

use crate::filter::strided::{Strided, StridedMut};
use crate::filter::{Extremum, Max, Min};
use crate::util::{ForestPatchError, ForestPatchResult};

/// Left and right reach of a window of `width` elements.
///
/// Output `i` covers `[i - left, i + right]`; even widths lean left.
#[inline]
pub(crate) fn reach(width: usize) -> (usize, usize) {
    if width == 0 {
        return (0, 0);
    }
    let right = (width + 1) / 2 - 1;
    (width - 1 - right, right)
}

/// Source and destination of a single filter pass.
pub(crate) trait Line<T> {
    fn len(&self) -> usize;
    fn read(&self, i: usize) -> T;
    fn write(&mut self, i: usize, value: T);
}

impl<T: Copy> Line<T> for StridedMut<'_, T> {
    fn len(&self) -> usize {
        StridedMut::len(self)
    }

    fn read(&self, i: usize) -> T {
        self.get(i)
    }

    fn write(&mut self, i: usize, value: T) {
        self.set(i, value);
    }
}

/// Pass that reads one view and writes another.
pub(crate) struct Split<'s, 'd, T> {
    pub(crate) src: Strided<'s, T>,
    pub(crate) dst: StridedMut<'d, T>,
}

impl<T: Copy> Line<T> for Split<'_, '_, T> {
    fn len(&self) -> usize {
        self.src.len()
    }

    fn read(&self, i: usize) -> T {
        self.src.get(i)
    }

    fn write(&mut self, i: usize, value: T) {
        self.dst.set(i, value);
    }
}

#[inline]
fn admit<E: Extremum, T: Copy + Ord>(queue: &mut VecDeque<(usize, T)>, idx: usize, value: T) {
    while let Some(&(_, back)) = queue.back() {
        if !E::dominates(value, back) {
            break;
        }
        queue.pop_back();
    }
    queue.push_back((idx, value));
}

#[inline]
fn expire<T>(queue: &mut VecDeque<(usize, T)>, start: usize) {
    while let Some(&(idx, _)) = queue.front() {
        if idx >= start {
            break;
        }
        queue.pop_front();
    }
}

/// Runs one filter pass, reusing `queue` as scratch.
pub(crate) fn run<E: Extremum, T: Copy + Ord, L: Line<T>>(
    line: &mut L,
    width: usize,
    queue: &mut VecDeque<(usize, T)>,
) {
    let len = line.len();
    if width <= 1 {
        copy_through(line);
        return;
    }
    if len == 0 {
        return;
    }

    let (left, right) = reach(width);
    queue.clear();
    let mut next = 0usize;
    for i in 0..len {
        let end = (i + right).min(len - 1);
        while next <= end {
            let value = line.read(next);
            admit::<E, T>(queue, next, value);
            next += 1;
        }
        expire(queue, i.saturating_sub(left));
        if let Some(&(_, value)) = queue.front() {
            line.write(i, value);
        }
    }
}

fn copy_through<T: Copy, L: Line<T>>(line: &mut L) {
    for i in 0..line.len() {
        let value = line.read(i);
        line.write(i, value);
    }
}

/// Runs max and min passes together, reading `src` once.
pub(crate) fn run_dual<T: Copy + Ord>(
    src: Strided<'_, T>,
    max_dst: &mut StridedMut<'_, T>,
    min_dst: &mut StridedMut<'_, T>,
    width: usize,
    max_queue: &mut VecDeque<(usize, T)>,
    min_queue: &mut VecDeque<(usize, T)>,
) {
    let len = src.len();
    if len == 0 {
        return;
    }
    let (left, right) = reach(width);
    max_queue.clear();
    min_queue.clear();
    let mut next = 0usize;
    for i in 0..len {
        let end = (i + right).min(len - 1);
        while next <= end {
            let value = src.get(next);
            admit::<Max, T>(max_queue, next, value);
            admit::<Min, T>(min_queue, next, value);
            next += 1;
        }
        let start = i.saturating_sub(left);
        expire(max_queue, start);
        expire(min_queue, start);
        if let (Some(&(_, hi)), Some(&(_, lo))) = (max_queue.front(), min_queue.front()) {
            max_dst.set(i, hi);
            min_dst.set(i, lo);
        }
    }
}

fn ensure_same_len(expected: usize, got: usize) -> ForestPatchResult<()> {
    if expected != got {
        return Err(ForestPatchError::SizeMismatch {
            expected: (expected, 1),
            got: (got, 1),
        });
    }
    Ok(())
}

fn filter_1d<E: Extremum, T: Copy + Ord>(
    src: Strided<'_, T>,
    dst: StridedMut<'_, T>,
    width: usize,
) -> ForestPatchResult<()> {
    ensure_same_len(src.len(), dst.len())?;
    let mut queue = VecDeque::with_capacity(width.min(src.len()) + 1);
    run::<E, T, _>(&mut Split { src, dst }, width, &mut queue);
    Ok(())
}

fn filter_1d_in_place<E: Extremum, T: Copy + Ord>(mut line: StridedMut<'_, T>, width: usize) {
    let mut queue = VecDeque::with_capacity(width.min(line.len()) + 1);
    run::<E, T, _>(&mut line, width, &mut queue);
}

/// Sliding-window maximum of `src` written to `dst`.
pub fn max_filter_1d<T: Copy + Ord>(
    src: Strided<'_, T>,
    dst: StridedMut<'_, T>,
    width: usize,
) -> ForestPatchResult<()> {
    filter_1d::<Max, T>(src, dst, width)
}

/// Sliding-window minimum of `src` written to `dst`.
pub fn min_filter_1d<T: Copy + Ord>(
    src: Strided<'_, T>,
    dst: StridedMut<'_, T>,
    width: usize,
) -> ForestPatchResult<()> {
    filter_1d::<Min, T>(src, dst, width)
}

/// Sliding-window maximum and minimum of `src` in a single pass.
pub fn max_min_filter_1d<T: Copy + Ord>(
    src: Strided<'_, T>,
    mut max_dst: StridedMut<'_, T>,
    mut min_dst: StridedMut<'_, T>,
    width: usize,
) -> ForestPatchResult<()> {
    ensure_same_len(src.len(), max_dst.len())?;
    ensure_same_len(src.len(), min_dst.len())?;
    let cap = width.min(src.len()) + 1;
    let mut max_queue = VecDeque::with_capacity(cap);
    let mut min_queue = VecDeque::with_capacity(cap);
    run_dual(
        src,
        &mut max_dst,
        &mut min_dst,
        width,
        &mut max_queue,
        &mut min_queue,
    );
    Ok(())
}

/// Sliding-window maximum, overwriting the line.
pub fn max_filter_1d_in_place<T: Copy + Ord>(line: StridedMut<'_, T>, width: usize) {
    filter_1d_in_place::<Max, T>(line, width);
}

/// Sliding-window minimum, overwriting the line.
pub fn min_filter_1d_in_place<T: Copy + Ord>(line: StridedMut<'_, T>, width: usize) {
    filter_1d_in_place::<Min, T>(line, width);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brute(data: &[u8], width: usize, max: bool) -> Vec<u8> {
        let (left, right) = reach(width);
        (0..data.len())
            .map(|i| {
                let lo = i.saturating_sub(left);
                let hi = (i + right).min(data.len() - 1);
                let window = data[lo..=hi].iter().copied();
                if max {
                    window.max().unwrap()
                } else {
                    window.min().unwrap()
                }
            })
            .collect()
    }

    #[test]
    fn reach_leans_left_for_even_widths() {
        assert_eq!(reach(1), (0, 0));
        assert_eq!(reach(4), (2, 1));
        assert_eq!(reach(5), (2, 2));
        assert_eq!(reach(6), (3, 2));
    }

    #[test]
    fn max_filter_matches_hand_computed_window() {
        let src = [1u8, 5, 2, 2, 9, 0, 3];
        let mut dst = [0u8; 7];
        max_filter_1d(
            Strided::contiguous(&src),
            StridedMut::contiguous(&mut dst),
            3,
        )
        .unwrap();
        assert_eq!(dst, [5, 5, 5, 9, 9, 9, 3]);
    }

    #[test]
    fn in_place_matches_out_of_place() {
        let src = [4u8, 4, 1, 7, 7, 2, 8, 0, 0, 6, 3];
        for width in 1..14 {
            let mut line = src;
            min_filter_1d_in_place(StridedMut::contiguous(&mut line), width);
            assert_eq!(line.to_vec(), brute(&src, width, false), "width {width}");
        }
    }

    #[test]
    fn dual_matches_individual_passes() {
        let src = [3u8, 1, 4, 1, 5, 9, 2, 6, 5, 3, 5];
        let mut hi = [0u8; 11];
        let mut lo = [0u8; 11];
        max_min_filter_1d(
            Strided::contiguous(&src),
            StridedMut::contiguous(&mut hi),
            StridedMut::contiguous(&mut lo),
            4,
        )
        .unwrap();
        assert_eq!(hi.to_vec(), brute(&src, 4, true));
        assert_eq!(lo.to_vec(), brute(&src, 4, false));
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let src = [0u8; 4];
        let mut dst = [0u8; 3];
        let err = max_filter_1d(
            Strided::contiguous(&src),
            StridedMut::contiguous(&mut dst),
            3,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ForestPatchError::SizeMismatch {
                expected: (4, 1),
                got: (3, 1)
            }
        );
    }
}
