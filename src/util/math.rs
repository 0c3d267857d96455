//! Numeric helpers shared by the pixel primitives.

/// Maps a possibly out-of-range index into `0..len` by reflecting about the
/// edge pixels without repeating them (`gfedcb|abcdefgh|gfedcba`).
pub(crate) fn reflect_101(idx: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let last = len as isize - 1;
    let period = 2 * last;
    let mut i = idx.rem_euclid(period);
    if i > last {
        i = period - i;
    }
    i as usize
}

/// Rounds half to even and saturates into `u8`.
pub(crate) fn saturate_u8(value: f32) -> u8 {
    let rounded = value.round_ties_even();
    if rounded.is_nan() || rounded <= 0.0 {
        0
    } else if rounded >= 255.0 {
        255
    } else {
        rounded as u8
    }
}
