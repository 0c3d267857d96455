use forestpatch::{
    FeatureChannels, ForestPatchError, ImageView, OwnedImage, PatchSampler, Rect, SamplerConfig,
    NUM_CHANNELS,
};

#[test]
fn image_view_rejects_invalid_dimensions() {
    let data = [0u8; 4];

    let err = ImageView::from_slice(&data, 0, 1).err().unwrap();
    assert_eq!(
        err,
        ForestPatchError::InvalidDimensions {
            width: 0,
            height: 1,
        }
    );

    let err = ImageView::from_slice(&data, 1, 0).err().unwrap();
    assert_eq!(
        err,
        ForestPatchError::InvalidDimensions {
            width: 1,
            height: 0,
        }
    );
}

#[test]
fn image_view_rejects_invalid_stride() {
    let data = [0u8; 8];

    let err = ImageView::new(&data, 4, 1, 3).err().unwrap();
    assert_eq!(
        err,
        ForestPatchError::InvalidStride {
            width: 4,
            stride: 3,
        }
    );
}

#[test]
fn image_view_rejects_small_buffer() {
    let data = [0u8; 3];

    let err = ImageView::new(&data, 2, 2, 2).err().unwrap();
    assert_eq!(err, ForestPatchError::BufferTooSmall { needed: 4, got: 3 });
}

#[test]
fn image_view_roi_matches_expected_values() {
    let data: Vec<u8> = (0u8..16).collect();
    let view = ImageView::from_slice(&data, 4, 4).unwrap();
    assert_eq!(view.stride(), 4);
    assert_eq!(view.as_slice(), data.as_slice());

    let roi = view.roi(Rect::new(1, 1, 2, 2)).unwrap();
    assert_eq!(roi.width(), 2);
    assert_eq!(roi.height(), 2);
    assert_eq!(roi.stride(), 4);
    assert_eq!(roi.row(0).unwrap(), &[5u8, 6u8]);
    assert_eq!(roi.row(1).unwrap(), &[9u8, 10u8]);
    assert_eq!(roi.get(0, 0).copied(), Some(5u8));
    assert!(roi.get(2, 0).is_none());
    assert_eq!(roi.to_owned_image().data(), &[5, 6, 9, 10]);

    let err = view.roi(Rect::new(3, 3, 2, 2)).err().unwrap();
    assert_eq!(
        err,
        ForestPatchError::RoiOutOfBounds {
            x: 3,
            y: 3,
            width: 2,
            height: 2,
            img_width: 4,
            img_height: 4,
        }
    );
}

#[test]
fn rgb_views_index_whole_pixels() {
    let data = [[1u8, 2, 3], [4, 5, 6], [7, 8, 9], [10, 11, 12]];
    let view = ImageView::from_slice(&data, 2, 2).unwrap();
    assert_eq!(view.get(1, 1), Some(&[10, 11, 12]));
    let roi = view.roi(Rect::new(1, 0, 1, 2)).unwrap();
    assert_eq!(roi.row(1).unwrap(), &[[10, 11, 12]]);
}

#[test]
fn feature_channels_require_matching_sizes() {
    let mut planes = vec![OwnedImage::<u8>::zeros(5, 4).unwrap(); NUM_CHANNELS];
    planes[20] = OwnedImage::zeros(4, 5).unwrap();
    let err = FeatureChannels::from_channels(planes).unwrap_err();
    assert_eq!(
        err,
        ForestPatchError::SizeMismatch {
            expected: (5, 4),
            got: (4, 5),
        }
    );
}

#[test]
fn sampler_reports_its_shape() {
    let sampler = PatchSampler::new(SamplerConfig {
        patch_width: 12,
        patch_height: 8,
        num_labels: 4,
        ..SamplerConfig::default()
    })
    .unwrap();
    assert_eq!(sampler.num_labels(), 4);
    assert_eq!(sampler.patch_size(), (12, 8));
    assert_eq!(sampler.len(), 0);
    assert!(sampler.is_empty());
    assert!(sampler.patches(7).is_empty());
}
