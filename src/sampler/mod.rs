//! Random patch sampling into per-label training collections.
//!
//! Two strategies share one sampler:
//! - uniform sampling draws `n` top-left positions uniformly from a region
//!   and appends every patch to the caller's label;
//! - texture sampling draws candidates in batches, labels each one by its
//!   co-occurrence contrast on the raw image, and keeps drawing until `n`
//!   candidates were textured. Flat candidates are kept as background.
//!
//! Each record carries a [`SourceIndex`]: `frame` counts the extraction calls
//! previously made on the label path, `patch` is the record's position among
//! same-label records of the call.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::features::{FeatureBuilder, FeatureChannels, FeatureConfig};
use crate::image::{ImageView, Point, Rect, Rgb};
use crate::texture::glcm_contrast_rgb;
use crate::trace::{trace_debug, trace_event, trace_span};
use crate::util::{ForestPatchError, ForestPatchResult};

mod patch;

pub use patch::{PatchFeature, SourceIndex};

/// Label of low-contrast background samples in texture sampling.
pub const LABEL_NEGATIVE: usize = 0;
/// Label of textured samples in texture sampling.
pub const LABEL_POSITIVE: usize = 1;

/// Default contrast above which a candidate counts as textured.
pub const DEFAULT_CONTRAST_THRESHOLD: f32 = 0.015;

const INDEX_LIMIT: usize = i32::MAX as usize;

/// Sampler parameters.
#[derive(Clone, Debug)]
pub struct SamplerConfig {
    pub patch_width: usize,
    pub patch_height: usize,
    /// Number of label collections; texture sampling needs at least two.
    pub num_labels: usize,
    /// Seed of the location generator.
    pub seed: u64,
    pub contrast_threshold: f32,
    /// Candidates per texture batch, as a multiple of the requested count.
    pub batch_factor: usize,
    /// Upper bound on texture batches per call; `None` keeps drawing until
    /// the target is met.
    pub max_texture_batches: Option<usize>,
    pub feature: FeatureConfig,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            patch_width: 16,
            patch_height: 16,
            num_labels: 2,
            seed: 0,
            contrast_threshold: DEFAULT_CONTRAST_THRESHOLD,
            batch_factor: 4,
            max_texture_batches: None,
            feature: FeatureConfig::default(),
        }
    }
}

impl SamplerConfig {
    pub fn validate(&self) -> ForestPatchResult<()> {
        if self.patch_width == 0 || self.patch_height == 0 {
            return Err(ForestPatchError::InvalidDimensions {
                width: self.patch_width,
                height: self.patch_height,
            });
        }
        if self.num_labels == 0 {
            return Err(ForestPatchError::InvalidConfig {
                reason: "num_labels must be >= 1",
            });
        }
        if self.batch_factor == 0 {
            return Err(ForestPatchError::InvalidConfig {
                reason: "batch_factor must be >= 1",
            });
        }
        if !self.contrast_threshold.is_finite() {
            return Err(ForestPatchError::InvalidConfig {
                reason: "contrast_threshold must be finite",
            });
        }
        if self.max_texture_batches == Some(0) {
            return Err(ForestPatchError::InvalidConfig {
                reason: "max_texture_batches must be >= 1 when set",
            });
        }
        self.feature.validate()
    }
}

/// Record counts of one texture sampling call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextureStats {
    pub positives: usize,
    pub negatives: usize,
    pub batches: usize,
}

/// Inclusive ranges of admissible top-left corners.
#[derive(Clone, Copy, Debug)]
struct Placement {
    x0: usize,
    x1: usize,
    y0: usize,
    y1: usize,
}

impl Placement {
    fn draw(&self, rng: &mut StdRng, size: (usize, usize)) -> Rect {
        let x = rng.random_range(self.x0..=self.x1);
        let y = rng.random_range(self.y0..=self.y1);
        Rect::new(x, y, size.0, size.1)
    }
}

/// Seeded patch sampler owning one collection per label.
#[derive(Debug)]
pub struct PatchSampler {
    cfg: SamplerConfig,
    builder: FeatureBuilder,
    rng: StdRng,
    collections: Vec<Vec<PatchFeature>>,
    calls: Vec<usize>,
}

impl PatchSampler {
    pub fn new(cfg: SamplerConfig) -> ForestPatchResult<Self> {
        cfg.validate()?;
        let builder = FeatureBuilder::new(cfg.feature.clone())?;
        let rng = StdRng::seed_from_u64(cfg.seed);
        let collections = (0..cfg.num_labels).map(|_| Vec::new()).collect();
        let calls = vec![0; cfg.num_labels];
        Ok(Self {
            cfg,
            builder,
            rng,
            collections,
            calls,
        })
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.cfg
    }

    pub fn num_labels(&self) -> usize {
        self.collections.len()
    }

    /// Returns `(width, height)` of every sampled patch.
    pub fn patch_size(&self) -> (usize, usize) {
        (self.cfg.patch_width, self.cfg.patch_height)
    }

    /// Records of `label` in insertion order; empty for unknown labels.
    pub fn patches(&self, label: usize) -> &[PatchFeature] {
        self.collections.get(label).map_or(&[], Vec::as_slice)
    }

    /// Total records across all labels.
    pub fn len(&self) -> usize {
        self.collections.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.iter().all(Vec::is_empty)
    }

    /// Consumes the sampler and returns the per-label collections.
    pub fn into_collections(self) -> Vec<Vec<PatchFeature>> {
        self.collections
    }

    /// Builds the feature stack of `img` and samples `n` patches into `label`.
    ///
    /// A patch larger than the image is a no-op. Returns the number of records
    /// appended.
    pub fn extract_patches(
        &mut self,
        img: ImageView<'_, Rgb>,
        n: usize,
        label: usize,
        bbox: Option<Rect>,
        centers: &[Point],
    ) -> ForestPatchResult<usize> {
        self.check_label(label)?;
        if self.cfg.patch_width > img.width() || self.cfg.patch_height > img.height() {
            return Ok(0);
        }
        let features = self.builder.build(img)?;
        self.extract_patches_from_channels(&features, n, label, bbox, centers)
    }

    /// Samples `n` patches uniformly from `bbox` (or the whole stack).
    ///
    /// Offsets are recorded against every entry of `centers`. A region that
    /// cannot hold one patch is a no-op.
    pub fn extract_patches_from_channels(
        &mut self,
        features: &FeatureChannels,
        n: usize,
        label: usize,
        bbox: Option<Rect>,
        centers: &[Point],
    ) -> ForestPatchResult<usize> {
        self.check_label(label)?;
        check_count(n)?;
        let Some(placement) = self.placement(features.size(), bbox)? else {
            return Ok(0);
        };
        if n == 0 {
            return Ok(0);
        }
        let _span = trace_span!("extract_patches", label = label, n = n).entered();

        let frame = self.next_frame(label)?;
        let size = self.patch_size();
        let records = &mut self.collections[label];
        records.reserve(n);
        for patch in 0..n {
            let roi = placement.draw(&mut self.rng, size);
            let index = SourceIndex::new(frame, patch as i32);
            records.push(PatchFeature::capture(features, roi, centers, index)?);
        }

        trace_event!("patches_sampled", label = label, count = n);
        Ok(n)
    }

    /// Samples until `n` textured patches were found.
    ///
    /// Candidates are measured on `img`; their channel content comes from
    /// `features`, which must have been built from the same image. Textured
    /// candidates go to [`LABEL_POSITIVE`] with offsets to every center, the
    /// rest to [`LABEL_NEGATIVE`] without offsets. Records appended before a
    /// [`ForestPatchError::SamplingExhausted`] error stay in place.
    pub fn extract_texture_patches(
        &mut self,
        img: ImageView<'_, Rgb>,
        features: &FeatureChannels,
        n: usize,
        bbox: Option<Rect>,
        centers: &[Point],
    ) -> ForestPatchResult<TextureStats> {
        self.check_label(LABEL_POSITIVE)?;
        if centers.is_empty() {
            return Err(ForestPatchError::MissingCenters);
        }
        if features.size() != img.size() {
            return Err(ForestPatchError::SizeMismatch {
                expected: img.size(),
                got: features.size(),
            });
        }
        check_count(n)?;
        let size = self.patch_size();
        let region = bbox.unwrap_or(img.bounds());
        let Some(placement) = self.placement(img.size(), bbox)? else {
            return Err(ForestPatchError::RegionTooSmall {
                width: region.width,
                height: region.height,
                patch_width: size.0,
                patch_height: size.1,
            });
        };
        let mut stats = TextureStats::default();
        if n == 0 {
            return Ok(stats);
        }
        let _span = trace_span!("extract_texture_patches", n = n).entered();

        let frame = self.next_frame(LABEL_POSITIVE)?;
        let batch = self.cfg.batch_factor.saturating_mul(n);
        let mut next_patch = [0i32; 2];
        while stats.positives < n {
            if let Some(limit) = self.cfg.max_texture_batches {
                if stats.batches >= limit {
                    return Err(ForestPatchError::SamplingExhausted {
                        batches: stats.batches,
                        positives: stats.positives,
                        target: n,
                    });
                }
            }
            stats.batches += 1;

            let mut drawn = 0usize;
            while stats.positives < n && drawn < batch {
                drawn += 1;
                let roi = placement.draw(&mut self.rng, size);
                let contrast = glcm_contrast_rgb(img.roi(roi)?);
                let (label, offsets_from) = if contrast > self.cfg.contrast_threshold {
                    stats.positives += 1;
                    (LABEL_POSITIVE, centers)
                } else {
                    stats.negatives += 1;
                    (LABEL_NEGATIVE, &[][..])
                };
                let patch = next_patch[label];
                next_patch[label] = patch
                    .checked_add(1)
                    .ok_or(ForestPatchError::CapacityExceeded { what: "patches" })?;
                let index = SourceIndex::new(frame, patch);
                let record = PatchFeature::capture(features, roi, offsets_from, index)?;
                self.collections[label].push(record);
            }
            trace_debug!(
                "texture_batch",
                batch = stats.batches,
                positives = stats.positives,
                negatives = stats.negatives,
            );
        }

        trace_event!(
            "texture_patches_sampled",
            positives = stats.positives,
            negatives = stats.negatives,
            batches = stats.batches,
        );
        Ok(stats)
    }

    /// Builds the feature stack of `img` and runs texture sampling on it.
    pub fn extract_texture_patches_from_image(
        &mut self,
        img: ImageView<'_, Rgb>,
        n: usize,
        bbox: Option<Rect>,
        centers: &[Point],
    ) -> ForestPatchResult<TextureStats> {
        let features = self.builder.build(img)?;
        self.extract_texture_patches(img, &features, n, bbox, centers)
    }

    fn check_label(&self, label: usize) -> ForestPatchResult<()> {
        if label >= self.collections.len() {
            return Err(ForestPatchError::LabelOutOfRange {
                label,
                num_labels: self.collections.len(),
            });
        }
        Ok(())
    }

    /// Returns the frame index for a new call on `label` and counts the call.
    fn next_frame(&mut self, label: usize) -> ForestPatchResult<i32> {
        let calls = self.calls[label];
        if calls > INDEX_LIMIT {
            return Err(ForestPatchError::CapacityExceeded { what: "frames" });
        }
        self.calls[label] = calls + 1;
        Ok(calls as i32)
    }

    /// Resolves the admissible corner ranges for an image of `size`.
    ///
    /// The region must lie inside the image; `None` means it cannot hold a
    /// single patch.
    fn placement(
        &self,
        size: (usize, usize),
        bbox: Option<Rect>,
    ) -> ForestPatchResult<Option<Placement>> {
        let bounds = Rect::new(0, 0, size.0, size.1);
        let region = bbox.unwrap_or(bounds);
        if !bounds.contains_rect(&region) {
            return Err(ForestPatchError::RoiOutOfBounds {
                x: region.x,
                y: region.y,
                width: region.width,
                height: region.height,
                img_width: size.0,
                img_height: size.1,
            });
        }
        if region.right() > INDEX_LIMIT || region.bottom() > INDEX_LIMIT {
            return Err(ForestPatchError::CapacityExceeded { what: "pixels" });
        }
        let (pw, ph) = self.patch_size();
        if region.width < pw || region.height < ph {
            return Ok(None);
        }
        Ok(Some(Placement {
            x0: region.x,
            x1: region.right() - pw,
            y0: region.y,
            y1: region.bottom() - ph,
        }))
    }
}

fn check_count(n: usize) -> ForestPatchResult<()> {
    if n > INDEX_LIMIT {
        return Err(ForestPatchError::CapacityExceeded { what: "samples" });
    }
    Ok(())
}
