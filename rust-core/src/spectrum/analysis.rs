//! Half-spectrum analysis of whole buffers and time ranges

use tracing::trace;

use super::fft::FftEngine;
use crate::error::{Result, SignalError};

/// Magnitude half-spectrum with its frequency axis
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Spectrum {
    /// Bin frequencies in Hz, ascending from 0
    pub frequencies: Vec<f64>,

    /// |X[k]| for each bin
    pub magnitudes: Vec<f64>,
}

impl Spectrum {
    /// Build from magnitudes of an N-point transform, where `k * fs / N`
    /// gives each bin's frequency
    pub fn from_magnitudes(magnitudes: Vec<f64>, sampling_rate_hz: f64, fft_size: usize) -> Self {
        let df = sampling_rate_hz / fft_size as f64;
        let frequencies = (0..magnitudes.len()).map(|k| k as f64 * df).collect();
        Self {
            frequencies,
            magnitudes,
        }
    }

    pub fn len(&self) -> usize {
        self.magnitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.magnitudes.is_empty()
    }

    /// Largest magnitude, 0 for an empty spectrum
    pub fn peak_magnitude(&self) -> f64 {
        self.magnitudes.iter().fold(0.0, |acc, &m| acc.max(m))
    }

    /// Frequency of the largest magnitude
    pub fn peak_frequency(&self) -> Option<f64> {
        self.magnitudes
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, f64)>, (k, &m)| match best {
                Some((_, top)) if top >= m => best,
                _ => Some((k, m)),
            })
            .map(|(k, _)| self.frequencies[k])
    }

    /// Sum of squared magnitudes
    pub fn energy(&self) -> f64 {
        self.magnitudes.iter().map(|m| m * m).sum()
    }
}

pub(crate) fn check_sampling_rate(sampling_rate_hz: f64) -> Result<()> {
    if sampling_rate_hz.is_finite() && sampling_rate_hz > 0.0 {
        Ok(())
    } else {
        Err(SignalError::invalid(format!(
            "sampling rate must be positive, got {sampling_rate_hz}"
        )))
    }
}

/// Magnitude half-spectrum of the full input
///
/// # Arguments
/// * `samples` - Input signal of length N, transformed without padding
/// * `sampling_rate_hz` - Sampling rate in Hz
///
/// # Returns
/// The first `floor(N/2)` bins; empty for N = 1
///
/// # Errors
/// `InvalidParameter` for N = 0 or a non-positive sampling rate
pub fn spectrum(samples: &[f64], sampling_rate_hz: f64) -> Result<Spectrum> {
    check_sampling_rate(sampling_rate_hz)?;
    let engine = FftEngine::new(samples.len())?;
    spectrum_with(&engine, samples, sampling_rate_hz)
}

/// Same as [`spectrum`] with a prepared engine, for many equal-length inputs
pub fn spectrum_with(engine: &FftEngine, samples: &[f64], sampling_rate_hz: f64) -> Result<Spectrum> {
    let magnitudes = engine.magnitude_half(samples)?;
    trace!(n = samples.len(), bins = magnitudes.len(), "computed half-spectrum");
    Ok(Spectrum::from_magnitudes(
        magnitudes,
        sampling_rate_hz,
        engine.fft_size(),
    ))
}

/// Half-spectrum of the samples between two times
///
/// Covers `samples[floor(start * fs) .. floor(end * fs)]`, with the end
/// clamped to the signal length.
///
/// # Errors
/// `InvalidParameter` when `start_seconds` is negative or not before
/// `end_seconds`; `InsufficientData` when the clamped range is empty
pub fn spectrum_range(
    samples: &[f64],
    sampling_rate_hz: f64,
    start_seconds: f64,
    end_seconds: f64,
) -> Result<Spectrum> {
    check_sampling_rate(sampling_rate_hz)?;
    if !(start_seconds >= 0.0) || !(start_seconds < end_seconds) {
        return Err(SignalError::invalid(format!(
            "time range {start_seconds}..{end_seconds} s is empty or negative"
        )));
    }

    let start = (start_seconds * sampling_rate_hz).floor() as usize;
    let end = ((end_seconds * sampling_rate_hz).floor() as usize).min(samples.len());
    if start >= end {
        return Err(SignalError::insufficient(format!(
            "time range {start_seconds}..{end_seconds} s selects no samples of {}",
            samples.len()
        )));
    }

    spectrum(&samples[start..end], sampling_rate_hz)
}
