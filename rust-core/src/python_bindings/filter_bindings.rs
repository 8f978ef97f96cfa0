//! Python bindings for Butterworth filtering

use numpy::{IntoPyArray, PyArray1, PyReadonlyArray1};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use super::as_samples;
use crate::filters::{self, FilterSpec};

fn filter_spec(kind: &str, cutoff_hz: Vec<f64>, order: usize) -> PyResult<FilterSpec> {
    match (kind, cutoff_hz.as_slice()) {
        ("lowpass", &[cutoff]) => Ok(FilterSpec::lowpass(cutoff, order)),
        ("highpass", &[cutoff]) => Ok(FilterSpec::highpass(cutoff, order)),
        ("bandpass", &[low, high]) => Ok(FilterSpec::bandpass(low, high, order)),
        ("lowpass" | "highpass", _) => Err(PyValueError::new_err(format!(
            "{kind} takes exactly one cutoff"
        ))),
        ("bandpass", _) => Err(PyValueError::new_err("bandpass takes exactly two cutoffs")),
        _ => Err(PyValueError::new_err(format!(
            "unknown filter kind '{kind}', expected lowpass, highpass or bandpass"
        ))),
    }
}

/// Zero-phase Butterworth filter
///
/// Args:
///     samples: Input signal as numpy array
///     sampling_rate_hz: Sampling rate in Hz
///     kind: "lowpass", "highpass" or "bandpass"
///     cutoff_hz: One cutoff, or [low, high] for bandpass
///     order: Filter order, 1 to 5
///
/// Returns:
///     Filtered signal as numpy array
#[pyfunction]
#[pyo3(signature = (samples, sampling_rate_hz, kind, cutoff_hz, order=4))]
pub fn apply_filter<'py>(
    py: Python<'py>,
    samples: PyReadonlyArray1<f64>,
    sampling_rate_hz: f64,
    kind: &str,
    cutoff_hz: Vec<f64>,
    order: usize,
) -> PyResult<&'py PyArray1<f64>> {
    let spec = filter_spec(kind, cutoff_hz, order)?;
    let filtered = filters::apply_filter(as_samples(&samples)?, sampling_rate_hz, &spec)?;
    Ok(filtered.into_pyarray(py))
}
