//! PyO3 bindings for Python integration

use numpy::PyReadonlyArray1;
use pyo3::exceptions::{PyArithmeticError, PyValueError};
use pyo3::prelude::*;

use crate::error::SignalError;

mod feature_bindings;
mod filter_bindings;
mod spectrum_bindings;

impl From<SignalError> for PyErr {
    fn from(err: SignalError) -> Self {
        match err {
            SignalError::ComputationError(_) => PyArithmeticError::new_err(err.to_string()),
            _ => PyValueError::new_err(err.to_string()),
        }
    }
}

/// Borrow a contiguous numpy array as a slice
pub(crate) fn as_samples<'a>(array: &'a PyReadonlyArray1<'_, f64>) -> PyResult<&'a [f64]> {
    array
        .as_slice()
        .map_err(|_| PyValueError::new_err("samples must be a contiguous float64 array"))
}

/// Python module definition
#[pymodule]
fn signal_features(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(spectrum_bindings::spectrum, m)?)?;
    m.add_function(wrap_pyfunction!(spectrum_bindings::spectrum_range, m)?)?;
    m.add_function(wrap_pyfunction!(spectrum_bindings::envelope_spectrum, m)?)?;
    m.add_function(wrap_pyfunction!(spectrum_bindings::stft, m)?)?;
    m.add_function(wrap_pyfunction!(filter_bindings::apply_filter, m)?)?;
    m.add_function(wrap_pyfunction!(feature_bindings::segment_bounds, m)?)?;
    m.add_function(wrap_pyfunction!(feature_bindings::available_features, m)?)?;

    m.add_class::<feature_bindings::PyFeatureSelection>()?;

    Ok(())
}
