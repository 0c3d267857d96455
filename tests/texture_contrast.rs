use forestpatch::lowlevel::CooccurrenceMatrix;
use forestpatch::{glcm_contrast, glcm_contrast_rgb, ImageView, SamplerConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[test]
fn histogram_of_random_patch_sums_to_one_and_is_symmetric() {
    let mut rng = StdRng::seed_from_u64(17);
    let data: Vec<u8> = (0..16 * 16).map(|_| rng.random_range(0..=255)).collect();
    let matrix = CooccurrenceMatrix::horizontal(ImageView::from_slice(&data, 16, 16).unwrap());
    assert!((matrix.sum() - 1.0).abs() < 1e-4);
    for (i, j) in [(data[0], data[1]), (data[17], data[18]), (3, 250)] {
        assert_eq!(matrix.get(i, j), matrix.get(j, i));
    }
}

#[test]
fn uniform_patch_has_zero_contrast() {
    let data = vec![93u8; 12 * 9];
    assert_eq!(
        glcm_contrast(ImageView::from_slice(&data, 12, 9).unwrap()),
        0.0
    );
}

#[test]
fn hard_step_beats_smooth_ramp() {
    let (w, h) = (16, 16);
    let step: Vec<u8> = (0..w * h)
        .map(|i| if (i % w) % 2 == 0 { 0 } else { 255 })
        .collect();
    let ramp: Vec<u8> = (0..w * h).map(|i| ((i % w) * 16) as u8).collect();
    let step_c = glcm_contrast(ImageView::from_slice(&step, w, h).unwrap());
    let ramp_c = glcm_contrast(ImageView::from_slice(&ramp, w, h).unwrap());
    assert!(step_c > ramp_c);
    // Every pair differs by 255.
    assert!((step_c - 255.0 * 255.0 / 65536.0).abs() < 1e-4);
    // Ramp pairs differ by 16, well under the texture threshold.
    assert!(ramp_c < SamplerConfig::default().contrast_threshold);
}

#[test]
fn rgb_contrast_uses_luma() {
    let px = |v: u8| [v, v, v];
    let data: Vec<[u8; 3]> = (0..8 * 4)
        .map(|i| if i % 2 == 0 { px(10) } else { px(200) })
        .collect();
    let gray: Vec<u8> = data.iter().map(|p| p[0]).collect();
    let rgb = glcm_contrast_rgb(ImageView::from_slice(&data, 8, 4).unwrap());
    let luma = glcm_contrast(ImageView::from_slice(&gray, 8, 4).unwrap());
    assert!((rgb - luma).abs() < 1e-6);
}
