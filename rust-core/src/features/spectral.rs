//! Frequency-domain features over one segment

use crate::error::Result;
use crate::spectrum::welch::welch;

/// Largest half-spectrum magnitude
pub fn peak_value_fft(half_spectrum: &[f64]) -> f64 {
    half_spectrum.iter().fold(0.0, |acc: f64, &m| acc.max(m))
}

/// Sum of squared half-spectrum magnitudes
pub fn energy_fft(half_spectrum: &[f64]) -> f64 {
    half_spectrum.iter().map(|m| m * m).sum()
}

/// Sum of the Welch PSD with averaging segments of `segment_length`
pub fn power_spectral_density(x: &[f64], sampling_rate_hz: f64, segment_length: usize) -> Result<f64> {
    Ok(welch(x, sampling_rate_hz, segment_length)?.total())
}
