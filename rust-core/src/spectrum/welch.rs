//! Welch power spectral density estimate
//!
//! Averages one-sided periodograms of half-overlapping, constant-detrended,
//! Hann-windowed segments, with density scaling (units²/Hz).

use tracing::trace;

use super::analysis::check_sampling_rate;
use super::fft::FftEngine;
use super::windowing::{apply_coefficients_inplace, window_power_sum};
use crate::buffer::segment_starts;
use crate::error::{Result, SignalError};
use crate::filters::windows::{generate_window, Symmetry, WindowType};

/// Default averaging segment length in samples
pub const DEFAULT_SEGMENT_LENGTH: usize = 256;

/// One-sided PSD with its frequency axis
#[derive(Debug, Clone, PartialEq)]
pub struct WelchPsd {
    /// `k * fs / L` for `k = 0..=L/2`
    pub frequencies: Vec<f64>,

    /// Power spectral density per bin
    pub density: Vec<f64>,
}

impl WelchPsd {
    /// Sum of the density over all bins
    pub fn total(&self) -> f64 {
        self.density.iter().sum()
    }
}

fn detrend_constant(frame: &mut [f64]) {
    let mean = frame.iter().sum::<f64>() / frame.len() as f64;
    for v in frame.iter_mut() {
        *v -= mean;
    }
}

/// Welch PSD of `samples` with averaging segments of `segment_length`
///
/// # Errors
/// `InvalidParameter` when `segment_length` is 0 or exceeds the input
pub fn welch(samples: &[f64], sampling_rate_hz: f64, segment_length: usize) -> Result<WelchPsd> {
    check_sampling_rate(sampling_rate_hz)?;
    if segment_length == 0 || segment_length > samples.len() {
        return Err(SignalError::invalid(format!(
            "PSD segment length {segment_length} must be in [1, {}]",
            samples.len()
        )));
    }

    let window = generate_window(WindowType::Hann, segment_length, Symmetry::Periodic);
    let norm = sampling_rate_hz * window_power_sum(&window);
    let engine = FftEngine::new(segment_length)?;

    let overlap = segment_length / 2;
    let step = segment_length - overlap;
    let nyquist_bin = (segment_length % 2 == 0).then_some(segment_length / 2);

    let mut accum = vec![0.0; segment_length / 2 + 1];
    let mut count = 0usize;
    for start in segment_starts(samples.len(), segment_length, step) {
        let mut frame = samples[start..start + segment_length].to_vec();
        detrend_constant(&mut frame);
        apply_coefficients_inplace(&mut frame, &window);

        for (k, (acc, x)) in accum.iter_mut().zip(engine.compute_complex(&frame)?).enumerate() {
            let scale = if k == 0 || Some(k) == nyquist_bin { 1.0 } else { 2.0 };
            *acc += scale * x.norm_sqr() / norm;
        }
        count += 1;
    }

    trace!(segment_length, segments = count, "welch average");
    let density = accum.into_iter().map(|v| v / count as f64).collect();
    let df = engine.bin_width_hz(sampling_rate_hz);
    let frequencies = (0..=segment_length / 2).map(|k| k as f64 * df).collect();

    Ok(WelchPsd {
        frequencies,
        density,
    })
}
