//! Python bindings for the forestpatch library.
//!
//! This module exposes feature channel extraction, the extremum filters, and
//! the patch sampler to Python via PyO3. Images are numpy arrays: RGB input is
//! `(height, width, 3)` uint8, single planes are `(height, width)` uint8.

use numpy::{
    PyArray1, PyArray2, PyArray3, PyArrayMethods, PyReadonlyArray2, PyReadonlyArray3,
    PyUntypedArrayMethods,
};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use forestpatch::{
    FeatureConfig, ForestPatchError, ImageView, OwnedImage, PatchFeature,
    PatchSampler as RustPatchSampler, Point, Rect, Rgb, SamplerConfig, NUM_CHANNELS,
};

/// Convert a ForestPatchError to a Python exception.
fn to_py_err(err: ForestPatchError) -> PyErr {
    PyRuntimeError::new_err(err.to_string())
}

/// Copy an `(H, W, 3)` uint8 array into RGB pixels.
fn rgb_pixels(image: &PyReadonlyArray3<'_, u8>) -> PyResult<(Vec<Rgb>, usize, usize)> {
    let shape = image.shape();
    if shape[2] != 3 {
        return Err(PyValueError::new_err("image must have shape (height, width, 3)"));
    }
    let (height, width) = (shape[0], shape[1]);
    let pixels = image
        .as_slice()?
        .chunks_exact(3)
        .map(|px| [px[0], px[1], px[2]])
        .collect();
    Ok((pixels, width, height))
}

fn plane_to_py<'py>(py: Python<'py>, plane: OwnedImage<u8>) -> PyResult<Bound<'py, PyArray2<u8>>> {
    let (width, height) = plane.size();
    PyArray1::from_vec(py, plane.into_vec()).reshape([height, width])
}

fn stack_to_py<'py>(
    py: Python<'py>,
    planes: &[OwnedImage<u8>],
    width: usize,
    height: usize,
) -> PyResult<Bound<'py, PyArray3<u8>>> {
    let mut data = Vec::with_capacity(planes.len() * width * height);
    for plane in planes {
        data.extend_from_slice(plane.data());
    }
    PyArray1::from_vec(py, data).reshape([planes.len(), height, width])
}

fn to_rect(bbox: Option<(usize, usize, usize, usize)>) -> Option<Rect> {
    bbox.map(|(x, y, w, h)| Rect::new(x, y, w, h))
}

fn to_points(centers: Option<Vec<(i32, i32)>>) -> Vec<Point> {
    centers
        .unwrap_or_default()
        .into_iter()
        .map(|(x, y)| Point::new(x, y))
        .collect()
}

/// Summary of one sampled patch (no pixel data).
#[pyclass]
#[derive(Clone)]
pub struct PatchRecord {
    /// Label collection the patch belongs to.
    #[pyo3(get)]
    pub label: usize,
    /// Region as (x, y, width, height).
    #[pyo3(get)]
    pub roi: (usize, usize, usize, usize),
    /// Patch center minus each object center.
    #[pyo3(get)]
    pub offsets: Vec<(i32, i32)>,
    /// Extraction call that produced the patch.
    #[pyo3(get)]
    pub frame: i32,
    /// Position among same-label patches of that call.
    #[pyo3(get)]
    pub patch: i32,
}

#[pymethods]
impl PatchRecord {
    fn __repr__(&self) -> String {
        format!(
            "PatchRecord(label={}, roi={:?}, offsets={:?}, frame={}, patch={})",
            self.label, self.roi, self.offsets, self.frame, self.patch
        )
    }
}

impl PatchRecord {
    fn new(label: usize, p: &PatchFeature) -> Self {
        let roi = p.roi();
        let index = p.source_index();
        Self {
            label,
            roi: (roi.x, roi.y, roi.width, roi.height),
            offsets: p.offsets().iter().map(|o| (o.dx, o.dy)).collect(),
            frame: index.frame,
            patch: index.patch,
        }
    }
}

/// Seeded patch sampler with one collection per label.
#[pyclass]
pub struct PatchSampler {
    inner: RustPatchSampler,
}

#[pymethods]
impl PatchSampler {
    /// Create a new PatchSampler.
    ///
    /// Args:
    ///     patch_width: Patch width in pixels
    ///     patch_height: Patch height in pixels
    ///     num_labels: Number of label collections (default: 2)
    ///     seed: Location generator seed (default: 0)
    ///     contrast_threshold: Texture contrast threshold (default: 0.015)
    ///     batch_factor: Texture candidates per batch as a multiple of n (default: 4)
    ///     max_texture_batches: Optional cap on texture batches (default: None)
    ///     extremum_width: Min/max envelope window (default: 5)
    #[new]
    #[pyo3(signature = (
        patch_width,
        patch_height,
        num_labels = 2,
        seed = 0,
        contrast_threshold = 0.015,
        batch_factor = 4,
        max_texture_batches = None,
        extremum_width = 5
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        patch_width: usize,
        patch_height: usize,
        num_labels: usize,
        seed: u64,
        contrast_threshold: f32,
        batch_factor: usize,
        max_texture_batches: Option<usize>,
        extremum_width: usize,
    ) -> PyResult<Self> {
        let cfg = SamplerConfig {
            patch_width,
            patch_height,
            num_labels,
            seed,
            contrast_threshold,
            batch_factor,
            max_texture_batches,
            feature: FeatureConfig { extremum_width },
        };
        let inner = RustPatchSampler::new(cfg).map_err(to_py_err)?;
        Ok(Self { inner })
    }

    /// Sample patches uniformly into `label`.
    ///
    /// Args:
    ///     image: (H, W, 3) uint8 numpy array
    ///     n: Number of patches
    ///     label: Target label collection
    ///     bbox: Optional (x, y, width, height) sampling region
    ///     centers: Optional list of (x, y) object centers
    ///
    /// Returns:
    ///     Number of patches added (0 if the patch does not fit)
    #[pyo3(signature = (image, n, label, bbox = None, centers = None))]
    fn extract_patches(
        &mut self,
        image: PyReadonlyArray3<'_, u8>,
        n: usize,
        label: usize,
        bbox: Option<(usize, usize, usize, usize)>,
        centers: Option<Vec<(i32, i32)>>,
    ) -> PyResult<usize> {
        let (pixels, width, height) = rgb_pixels(&image)?;
        let view = ImageView::from_slice(&pixels, width, height).map_err(to_py_err)?;
        self.inner
            .extract_patches(view, n, label, to_rect(bbox), &to_points(centers))
            .map_err(to_py_err)
    }

    /// Sample until `n` textured patches were found.
    ///
    /// Args:
    ///     image: (H, W, 3) uint8 numpy array
    ///     n: Number of textured patches
    ///     centers: Non-empty list of (x, y) object centers
    ///     bbox: Optional (x, y, width, height) sampling region
    ///
    /// Returns:
    ///     Tuple (positives, negatives, batches)
    #[pyo3(signature = (image, n, centers, bbox = None))]
    fn extract_texture_patches(
        &mut self,
        image: PyReadonlyArray3<'_, u8>,
        n: usize,
        centers: Vec<(i32, i32)>,
        bbox: Option<(usize, usize, usize, usize)>,
    ) -> PyResult<(usize, usize, usize)> {
        let (pixels, width, height) = rgb_pixels(&image)?;
        let view = ImageView::from_slice(&pixels, width, height).map_err(to_py_err)?;
        let stats = self
            .inner
            .extract_texture_patches_from_image(view, n, to_rect(bbox), &to_points(Some(centers)))
            .map_err(to_py_err)?;
        Ok((stats.positives, stats.negatives, stats.batches))
    }

    /// Summaries of every patch in `label`, in insertion order.
    fn records(&self, label: usize) -> Vec<PatchRecord> {
        self.inner
            .patches(label)
            .iter()
            .map(|p| PatchRecord::new(label, p))
            .collect()
    }

    /// Channel crops of one patch as a (32, patch_height, patch_width) array.
    fn patch_channels<'py>(
        &self,
        py: Python<'py>,
        label: usize,
        index: usize,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let patch = self
            .inner
            .patches(label)
            .get(index)
            .ok_or_else(|| PyValueError::new_err("patch index out of range"))?;
        let roi = patch.roi();
        stack_to_py(py, patch.channels(), roi.width, roi.height)
    }

    #[getter]
    fn num_labels(&self) -> usize {
        self.inner.num_labels()
    }

    #[getter]
    fn patch_size(&self) -> (usize, usize) {
        self.inner.patch_size()
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }

    fn __repr__(&self) -> String {
        let (w, h) = self.inner.patch_size();
        format!(
            "PatchSampler(patch={}x{}, num_labels={}, patches={})",
            w,
            h,
            self.inner.num_labels(),
            self.inner.len()
        )
    }
}

/// Compute the 32-channel feature stack of an RGB image.
///
/// Args:
///     image: (H, W, 3) uint8 numpy array
///
/// Returns:
///     (32, H, W) uint8 numpy array
#[pyfunction]
fn extract_feature_channels<'py>(
    py: Python<'py>,
    image: PyReadonlyArray3<'py, u8>,
) -> PyResult<Bound<'py, PyArray3<u8>>> {
    let (pixels, width, height) = rgb_pixels(&image)?;
    let view = ImageView::from_slice(&pixels, width, height).map_err(to_py_err)?;
    let channels = forestpatch::extract_feature_channels(view).map_err(to_py_err)?;
    debug_assert_eq!(channels.len(), NUM_CHANNELS);
    stack_to_py(py, channels.channels(), width, height)
}

/// Square max filter of a (H, W) uint8 array.
#[pyfunction]
fn max_filter<'py>(
    py: Python<'py>,
    image: PyReadonlyArray2<'py, u8>,
    width: usize,
) -> PyResult<Bound<'py, PyArray2<u8>>> {
    let shape = image.shape();
    let view = ImageView::from_slice(image.as_slice()?, shape[1], shape[0]).map_err(to_py_err)?;
    plane_to_py(py, forestpatch::max_filter(view, width))
}

/// Square min filter of a (H, W) uint8 array.
#[pyfunction]
fn min_filter<'py>(
    py: Python<'py>,
    image: PyReadonlyArray2<'py, u8>,
    width: usize,
) -> PyResult<Bound<'py, PyArray2<u8>>> {
    let shape = image.shape();
    let view = ImageView::from_slice(image.as_slice()?, shape[1], shape[0]).map_err(to_py_err)?;
    plane_to_py(py, forestpatch::min_filter(view, width))
}

/// Gray-level co-occurrence contrast of a (H, W) uint8 patch.
#[pyfunction]
fn glcm_contrast(image: PyReadonlyArray2<'_, u8>) -> PyResult<f32> {
    let shape = image.shape();
    let view = ImageView::from_slice(image.as_slice()?, shape[1], shape[0]).map_err(to_py_err)?;
    Ok(forestpatch::glcm_contrast(view))
}

/// Load an image file as a (H, W, 3) uint8 array.
#[pyfunction]
fn load_rgb<'py>(py: Python<'py>, path: &str) -> PyResult<Bound<'py, PyArray3<u8>>> {
    let owned = forestpatch::image::io::load_rgb_image(path).map_err(to_py_err)?;
    let (width, height) = owned.size();
    let flat: Vec<u8> = owned.into_vec().into_iter().flatten().collect();
    PyArray1::from_vec(py, flat).reshape([height, width, 3])
}

/// Python module for forestpatch.
#[pymodule]
fn _forestpatch(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PatchRecord>()?;
    m.add_class::<PatchSampler>()?;
    m.add_function(wrap_pyfunction!(extract_feature_channels, m)?)?;
    m.add_function(wrap_pyfunction!(max_filter, m)?)?;
    m.add_function(wrap_pyfunction!(min_filter, m)?)?;
    m.add_function(wrap_pyfunction!(glcm_contrast, m)?)?;
    m.add_function(wrap_pyfunction!(load_rgb, m)?)?;

    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
