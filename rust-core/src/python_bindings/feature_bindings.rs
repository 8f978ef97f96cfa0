//! Python bindings for segmentation and the feature catalog

use numpy::{IntoPyArray, PyArray2, PyReadonlyArray1};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use super::as_samples;
use crate::buffer::{self, SampleBuffer, SegmentationSpec};
use crate::features::{self, FeatureKind, FeatureParameter, FeatureSelection, FeatureSpec};

/// Names of every feature in the catalog
#[pyfunction]
pub fn available_features() -> Vec<&'static str> {
    FeatureKind::ALL.iter().map(|kind| kind.name()).collect()
}

/// (start, end) sample indices of each segment
#[pyfunction]
#[pyo3(signature = (num_samples, sampling_rate_hz, segment_seconds=1.0, overlap_percent=0.0))]
pub fn segment_bounds(
    num_samples: usize,
    sampling_rate_hz: f64,
    segment_seconds: f64,
    overlap_percent: f64,
) -> PyResult<Vec<(usize, usize)>> {
    let samples = SampleBuffer::new(vec![0.0; num_samples], sampling_rate_hz)?;
    let spec = SegmentationSpec::new(segment_seconds, overlap_percent);
    Ok(buffer::segment(&samples, &spec)?
        .iter()
        .map(|s| (s.start(), s.start() + s.len()))
        .collect())
}

/// Feature selection session exposed to Python
#[pyclass(name = "FeatureSelection")]
pub struct PyFeatureSelection {
    selection: FeatureSelection,
}

#[pymethods]
impl PyFeatureSelection {
    #[new]
    fn new() -> Self {
        Self {
            selection: FeatureSelection::new(),
        }
    }

    /// Add a feature by catalog name
    ///
    /// Args:
    ///     name: Feature name, e.g. "RootMeanSquared"
    ///     bins: Histogram bins for ShannonEntropy
    ///     segment_length: Welch segment length for PowerSpectralDensity
    #[pyo3(signature = (name, bins=None, segment_length=None))]
    fn select(&mut self, name: &str, bins: Option<usize>, segment_length: Option<usize>) -> PyResult<()> {
        let kind: FeatureKind = name.parse()?;
        let spec = match (bins, segment_length) {
            (Some(bins), None) => FeatureSpec::with_parameter(kind, FeatureParameter::Bins(bins))?,
            (None, Some(len)) => {
                FeatureSpec::with_parameter(kind, FeatureParameter::SegmentLength(len))?
            }
            (None, None) => FeatureSpec::new(kind),
            (Some(_), Some(_)) => {
                return Err(PyValueError::new_err(
                    "pass at most one of bins and segment_length",
                ))
            }
        };
        self.selection.select(spec)?;
        Ok(())
    }

    /// Clear the selection
    fn reset(&mut self) {
        self.selection.reset();
    }

    /// Selected feature names in order
    fn selected(&self) -> Vec<&'static str> {
        self.selection.iter().map(|spec| spec.kind().name()).collect()
    }

    fn __len__(&self) -> usize {
        self.selection.len()
    }

    /// Segment the signal and evaluate every selected feature
    ///
    /// Returns:
    ///     (column names, values[segment, feature])
    #[pyo3(signature = (samples, sampling_rate_hz, segment_seconds=1.0, overlap_percent=0.0))]
    fn compute<'py>(
        &self,
        py: Python<'py>,
        samples: PyReadonlyArray1<f64>,
        sampling_rate_hz: f64,
        segment_seconds: f64,
        overlap_percent: f64,
    ) -> PyResult<(Vec<String>, &'py PyArray2<f64>)> {
        let buffer = SampleBuffer::from_slice(as_samples(&samples)?, sampling_rate_hz)?;
        let spec = SegmentationSpec::new(segment_seconds, overlap_percent);
        let result = features::extract_features(&buffer, &spec, &self.selection)?;
        let names = result.column_names().to_vec();
        Ok((names, result.into_values().into_pyarray(py)))
    }
}
