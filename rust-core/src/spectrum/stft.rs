//! Short-time Fourier transform with a Gaussian taper
//!
//! Frames are centred at `p * hop` for `p = 0, 1, ...` while the centre
//! lies inside the signal, so the time axis covers `[0, N / fs)`. Frames
//! overhanging either end are zero-padded. The taper is normalised to unit
//! sum, which makes a full-scale sinusoid read as half its amplitude.

use ndarray::Array2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::analysis::check_sampling_rate;
use super::fft::FftEngine;
use super::windowing::{extract_windowed_frame, window_sum};
use crate::error::{Result, SignalError};
use crate::filters::windows::{generate_window, Symmetry, WindowType};

/// Window and hop lengths in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StftSpec {
    pub window_seconds: f64,
    pub hop_seconds: f64,
}

impl Default for StftSpec {
    fn default() -> Self {
        Self {
            window_seconds: 1.0,
            hop_seconds: 1.0,
        }
    }
}

impl StftSpec {
    pub fn new(window_seconds: f64, hop_seconds: f64) -> Self {
        Self {
            window_seconds,
            hop_seconds,
        }
    }

    /// `(window_samples, hop_samples)`, both truncated and at least 2
    pub fn sample_counts(&self, sampling_rate_hz: f64) -> Result<(usize, usize)> {
        check_sampling_rate(sampling_rate_hz)?;
        let to_samples = |seconds: f64| {
            if seconds.is_finite() && seconds > 0.0 {
                (seconds * sampling_rate_hz).floor() as usize
            } else {
                0
            }
        };

        let window = to_samples(self.window_seconds);
        let hop = to_samples(self.hop_seconds);
        if window < 2 || hop < 2 {
            return Err(SignalError::invalid(format!(
                "window ({window}) and hop ({hop}) must both span at least 2 samples at {sampling_rate_hz} Hz"
            )));
        }
        Ok((window, hop))
    }

    /// Run [`stft`] with these lengths
    pub fn compute(&self, samples: &[f64], sampling_rate_hz: f64) -> Result<Spectrogram> {
        stft(samples, sampling_rate_hz, self.window_seconds, self.hop_seconds)
    }
}

/// Time-frequency magnitude grid
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrogram {
    /// Frame centre times in seconds
    pub times: Vec<f64>,

    /// Bin frequencies in Hz
    pub frequencies: Vec<f64>,

    /// Magnitudes indexed `[frequency, time]`
    pub magnitude: Array2<f64>,

    /// Hop in seconds
    pub delta_t: f64,

    /// Bin spacing in Hz
    pub delta_f: f64,

    /// Taper standard deviation in seconds
    pub sigma_seconds: f64,
}

impl Spectrogram {
    pub fn num_frames(&self) -> usize {
        self.times.len()
    }

    pub fn num_bins(&self) -> usize {
        self.frequencies.len()
    }

    /// Magnitudes of one frame across frequency
    pub fn frame(&self, index: usize) -> Option<Vec<f64>> {
        (index < self.num_frames()).then(|| self.magnitude.column(index).to_vec())
    }
}

/// Short-time Fourier transform magnitude
///
/// # Arguments
/// * `samples` - Input signal
/// * `sampling_rate_hz` - Sampling rate in Hz
/// * `window_seconds` - Taper length, truncated to whole samples
/// * `hop_seconds` - Frame spacing, truncated to whole samples
///
/// # Errors
/// `InvalidParameter` when the window or hop is under 2 samples;
/// `InsufficientData` for an empty signal
pub fn stft(
    samples: &[f64],
    sampling_rate_hz: f64,
    window_seconds: f64,
    hop_seconds: f64,
) -> Result<Spectrogram> {
    let (window_len, hop) =
        StftSpec::new(window_seconds, hop_seconds).sample_counts(sampling_rate_hz)?;
    if samples.is_empty() {
        return Err(SignalError::insufficient("spectrogram of an empty signal"));
    }

    let std = window_len as f64 / 3.0;
    let mut taper = generate_window(WindowType::Gaussian { std }, window_len, Symmetry::Symmetric);
    let total = window_sum(&taper);
    for w in taper.iter_mut() {
        *w /= total;
    }

    let engine = FftEngine::new(window_len)?;
    let num_frames = (samples.len() + hop - 1) / hop;
    let num_bins = engine.num_half_bins();
    debug!(window_len, hop, num_frames, num_bins, "computing spectrogram");

    let columns: Vec<Vec<f64>> = (0..num_frames)
        .into_par_iter()
        .map(|p| {
            let frame = extract_windowed_frame(samples, p * hop, &taper);
            engine.magnitude_half(&frame)
        })
        .collect::<Result<_>>()?;

    let magnitude = Array2::from_shape_fn((num_bins, num_frames), |(k, p)| columns[p][k]);

    Ok(Spectrogram {
        times: (0..num_frames)
            .map(|p| (p * hop) as f64 / sampling_rate_hz)
            .collect(),
        frequencies: engine.frequency_axis_hz(sampling_rate_hz),
        magnitude,
        delta_t: hop as f64 / sampling_rate_hz,
        delta_f: engine.bin_width_hz(sampling_rate_hz),
        sigma_seconds: std / sampling_rate_hz,
    })
}
