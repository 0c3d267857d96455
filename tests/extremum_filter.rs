use forestpatch::lowlevel::{
    max_filter_1d, max_filter_1d_in_place, max_min_filter_1d, min_filter_1d, Strided, StridedMut,
};
use forestpatch::{
    max_filter, max_filter_in_place, max_filter_into, max_min_filter, min_filter,
    min_filter_in_place, ImageView, OwnedImage,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn window(width: usize) -> (usize, usize) {
    let right = (width + 1) / 2 - 1;
    (width - 1 - right, right)
}

fn brute_1d(data: &[u8], width: usize, max: bool) -> Vec<u8> {
    let (left, right) = window(width.max(1));
    (0..data.len())
        .map(|i| {
            let lo = i.saturating_sub(left);
            let hi = (i + right).min(data.len() - 1);
            let vals = data[lo..=hi].iter().copied();
            if max {
                vals.max().unwrap()
            } else {
                vals.min().unwrap()
            }
        })
        .collect()
}

fn brute_2d(data: &[u8], w: usize, h: usize, width: usize, max: bool) -> Vec<u8> {
    let (left, right) = window(width.max(1));
    let mut out = Vec::with_capacity(w * h);
    for y in 0..h {
        for x in 0..w {
            let mut acc = if max { 0u8 } else { 255u8 };
            for yy in y.saturating_sub(left)..=(y + right).min(h - 1) {
                for xx in x.saturating_sub(left)..=(x + right).min(w - 1) {
                    let v = data[yy * w + xx];
                    acc = if max { acc.max(v) } else { acc.min(v) };
                }
            }
            out.push(acc);
        }
    }
    out
}

fn random_line(rng: &mut StdRng, len: usize, levels: u8) -> Vec<u8> {
    (0..len).map(|_| rng.random_range(0..levels)).collect()
}

fn check_1d(data: &[u8], width: usize) {
    let mut hi = vec![0u8; data.len()];
    let mut lo = vec![0u8; data.len()];
    max_filter_1d(
        Strided::contiguous(data),
        StridedMut::contiguous(&mut hi),
        width,
    )
    .unwrap();
    min_filter_1d(
        Strided::contiguous(data),
        StridedMut::contiguous(&mut lo),
        width,
    )
    .unwrap();
    assert_eq!(hi, brute_1d(data, width, true), "max width {width} {data:?}");
    assert_eq!(lo, brute_1d(data, width, false), "min width {width} {data:?}");
}

#[test]
fn one_dimensional_filters_match_brute_force_on_random_lines() {
    let mut rng = StdRng::seed_from_u64(11);
    for len in [1usize, 2, 3, 7, 16, 33] {
        let data = random_line(&mut rng, len, 255);
        for width in 1..=len + 2 {
            check_1d(&data, width);
        }
    }
}

#[test]
fn one_dimensional_filters_handle_constant_monotonic_and_tied_lines() {
    let constant = vec![42u8; 20];
    let rising: Vec<u8> = (0u8..20).collect();
    let falling: Vec<u8> = (0u8..20).rev().collect();
    let mut rng = StdRng::seed_from_u64(5);
    let ties = random_line(&mut rng, 40, 3);
    for data in [&constant, &rising, &falling, &ties] {
        for width in [1usize, 2, 3, 4, 5, 8, 19, 20, 25] {
            check_1d(data, width);
        }
    }
}

#[test]
fn width_zero_and_one_copy_the_input() {
    let data = [9u8, 1, 7, 3];
    for width in [0usize, 1] {
        let mut out = [0u8; 4];
        max_filter_1d(
            Strided::contiguous(&data),
            StridedMut::contiguous(&mut out),
            width,
        )
        .unwrap();
        assert_eq!(out, data);
    }
}

#[test]
fn strided_lines_touch_only_their_elements() {
    // Column 1 of a 3-wide, 5-high image.
    let data: Vec<u8> = vec![0, 5, 0, 0, 1, 0, 0, 9, 0, 0, 2, 0, 0, 4, 0];
    let mut out = vec![100u8; 15];
    max_filter_1d(
        Strided::new(&data, 1, 3, 5).unwrap(),
        StridedMut::new(&mut out, 1, 3, 5).unwrap(),
        3,
    )
    .unwrap();
    let column: Vec<u8> = (0..5).map(|i| out[1 + 3 * i]).collect();
    assert_eq!(column, vec![5, 9, 9, 9, 4]);
    assert!(out
        .iter()
        .enumerate()
        .filter(|(i, _)| i % 3 != 1)
        .all(|(_, &v)| v == 100));

    let mut in_place = data.clone();
    max_filter_1d_in_place(StridedMut::new(&mut in_place, 1, 3, 5).unwrap(), 3);
    assert_eq!(in_place[1 + 3 * 4], 4);
    assert_eq!(in_place[0], 0);
}

#[test]
fn dual_pass_matches_brute_force() {
    let mut rng = StdRng::seed_from_u64(3);
    let data = random_line(&mut rng, 50, 255);
    let mut hi = vec![0u8; 50];
    let mut lo = vec![0u8; 50];
    max_min_filter_1d(
        Strided::contiguous(&data),
        StridedMut::contiguous(&mut hi),
        StridedMut::contiguous(&mut lo),
        6,
    )
    .unwrap();
    assert_eq!(hi, brute_1d(&data, 6, true));
    assert_eq!(lo, brute_1d(&data, 6, false));
}

#[test]
fn square_filters_equal_brute_force_neighbourhood() {
    let mut rng = StdRng::seed_from_u64(21);
    let (w, h) = (23, 17);
    let data = random_line(&mut rng, w * h, 255);
    let view = ImageView::from_slice(&data, w, h).unwrap();
    for width in [1usize, 2, 3, 5, 8, 30] {
        assert_eq!(
            max_filter(view, width).data(),
            brute_2d(&data, w, h, width, true).as_slice(),
            "max width {width}"
        );
        assert_eq!(
            min_filter(view, width).data(),
            brute_2d(&data, w, h, width, false).as_slice(),
            "min width {width}"
        );
    }
}

#[test]
fn in_place_into_and_dual_variants_agree() {
    let mut rng = StdRng::seed_from_u64(8);
    let (w, h) = (31, 12);
    let data = random_line(&mut rng, w * h, 255);
    let view = ImageView::from_slice(&data, w, h).unwrap();

    let expected_max = max_filter(view, 5);
    let expected_min = min_filter(view, 5);

    let mut img = OwnedImage::new(data.clone(), w, h).unwrap();
    max_filter_in_place(&mut img, 5);
    assert_eq!(img, expected_max);

    let mut img = OwnedImage::new(data.clone(), w, h).unwrap();
    min_filter_in_place(&mut img, 5);
    assert_eq!(img, expected_min);

    let mut dst = OwnedImage::<u8>::zeros(w, h).unwrap();
    max_filter_into(view, &mut dst, 5).unwrap();
    assert_eq!(dst, expected_max);

    let (hi, lo) = max_min_filter(view, 5);
    assert_eq!(hi, expected_max);
    assert_eq!(lo, expected_min);
}

#[test]
fn max_is_dual_of_min_on_inverted_input() {
    let mut rng = StdRng::seed_from_u64(99);
    let (w, h) = (19, 14);
    let data = random_line(&mut rng, w * h, 255);
    let inverted: Vec<u8> = data.iter().map(|&v| 255 - v).collect();
    let view = ImageView::from_slice(&data, w, h).unwrap();
    let inv_view = ImageView::from_slice(&inverted, w, h).unwrap();

    let hi = max_filter(view, 4);
    let lo_inv = min_filter(inv_view, 4);
    for (a, b) in hi.data().iter().zip(lo_inv.data()) {
        assert_eq!(*a, 255 - *b);
    }

    let line = &data[..w];
    let inv_line = &inverted[..w];
    let mut hi = vec![0u8; w];
    let mut lo = vec![0u8; w];
    max_filter_1d(Strided::contiguous(line), StridedMut::contiguous(&mut hi), 7).unwrap();
    min_filter_1d(Strided::contiguous(inv_line), StridedMut::contiguous(&mut lo), 7).unwrap();
    assert!(hi.iter().zip(&lo).all(|(a, b)| *a == 255 - *b));
}

#[test]
fn wider_element_types_are_supported() {
    let data = [-5i16, 300, -200, 7];
    let view = ImageView::from_slice(&data, 4, 1).unwrap();
    assert_eq!(max_filter(view, 3).data(), &[300, 300, 300, 7]);
    assert_eq!(min_filter(view, 3).data(), &[-5, -200, -200, -200]);
}
