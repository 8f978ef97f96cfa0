//! Python bindings for spectra, envelope spectra and spectrograms

use numpy::{IntoPyArray, PyArray1, PyArray2, PyReadonlyArray1};
use pyo3::prelude::*;

use super::as_samples;
use crate::spectrum::{self, Band};

type SpectrumPair<'py> = (&'py PyArray1<f64>, &'py PyArray1<f64>);

/// Single-sided FFT magnitude spectrum
///
/// Args:
///     samples: Input signal as numpy array
///     sampling_rate_hz: Sampling rate in Hz
///
/// Returns:
///     (frequencies, magnitudes) as numpy arrays
#[pyfunction]
pub fn spectrum<'py>(
    py: Python<'py>,
    samples: PyReadonlyArray1<f64>,
    sampling_rate_hz: f64,
) -> PyResult<SpectrumPair<'py>> {
    let result = spectrum::spectrum(as_samples(&samples)?, sampling_rate_hz)?;
    Ok((result.frequencies.into_pyarray(py), result.magnitudes.into_pyarray(py)))
}

/// Spectrum of the samples between two times in seconds
#[pyfunction]
pub fn spectrum_range<'py>(
    py: Python<'py>,
    samples: PyReadonlyArray1<f64>,
    sampling_rate_hz: f64,
    start_seconds: f64,
    end_seconds: f64,
) -> PyResult<SpectrumPair<'py>> {
    let result = spectrum::spectrum_range(
        as_samples(&samples)?,
        sampling_rate_hz,
        start_seconds,
        end_seconds,
    )?;
    Ok((result.frequencies.into_pyarray(py), result.magnitudes.into_pyarray(py)))
}

/// Spectrum of the Hilbert envelope of a band-limited signal
///
/// Args:
///     samples: Input signal as numpy array
///     sampling_rate_hz: Sampling rate in Hz
///     low_hz: Lower band edge in Hz
///     high_hz: Upper band edge in Hz
#[pyfunction]
pub fn envelope_spectrum<'py>(
    py: Python<'py>,
    samples: PyReadonlyArray1<f64>,
    sampling_rate_hz: f64,
    low_hz: f64,
    high_hz: f64,
) -> PyResult<SpectrumPair<'py>> {
    let result = spectrum::envelope_spectrum(
        as_samples(&samples)?,
        sampling_rate_hz,
        Band::new(low_hz, high_hz),
    )?;
    Ok((result.frequencies.into_pyarray(py), result.magnitudes.into_pyarray(py)))
}

/// Gaussian-taper short-time Fourier transform
///
/// Returns:
///     (times, frequencies, magnitude[frequency, time])
#[pyfunction]
#[pyo3(signature = (samples, sampling_rate_hz, window_seconds=1.0, hop_seconds=1.0))]
pub fn stft<'py>(
    py: Python<'py>,
    samples: PyReadonlyArray1<f64>,
    sampling_rate_hz: f64,
    window_seconds: f64,
    hop_seconds: f64,
) -> PyResult<(&'py PyArray1<f64>, &'py PyArray1<f64>, &'py PyArray2<f64>)> {
    let grid = spectrum::stft(
        as_samples(&samples)?,
        sampling_rate_hz,
        window_seconds,
        hop_seconds,
    )?;
    Ok((
        grid.times.into_pyarray(py),
        grid.frequencies.into_pyarray(py),
        grid.magnitude.into_pyarray(py),
    ))
}
