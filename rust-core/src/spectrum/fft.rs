//! FFT engine using realfft for real-valued signals
//!
//! The plan is built once per length and shared, so one engine can serve
//! every segment of an analysis from several threads.

use num_complex::Complex64;
use realfft::{RealFftPlanner, RealToComplex};
use std::sync::Arc;

use crate::error::{Result, SignalError};

/// FFT engine for real-valued signals of one fixed length
#[derive(Clone)]
pub struct FftEngine {
    /// FFT size (number of samples)
    fft_size: usize,

    /// Real FFT processor
    r2c: Arc<dyn RealToComplex<f64>>,
}

impl std::fmt::Debug for FftEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FftEngine").field("fft_size", &self.fft_size).finish()
    }
}

impl FftEngine {
    /// Create new FFT engine
    ///
    /// # Arguments
    /// * `fft_size` - FFT size (number of samples), must be at least 1
    pub fn new(fft_size: usize) -> Result<Self> {
        if fft_size == 0 {
            return Err(SignalError::invalid("FFT size must be at least 1"));
        }
        let mut planner = RealFftPlanner::<f64>::new();
        let r2c = planner.plan_fft_forward(fft_size);
        Ok(Self { fft_size, r2c })
    }

    /// Complex spectrum X[k] for k = 0..=N/2
    ///
    /// The input must be exactly `fft_size` long; nothing is padded.
    pub fn compute_complex(&self, signal: &[f64]) -> Result<Vec<Complex64>> {
        if signal.len() != self.fft_size {
            return Err(SignalError::invalid(format!(
                "FFT of size {} given {} samples",
                self.fft_size,
                signal.len()
            )));
        }

        let mut input = signal.to_vec();
        let mut output = self.r2c.make_output_vec();
        self.r2c.process(&mut input, &mut output)?;
        Ok(output)
    }

    /// Magnitude spectrum |X[k]| for k = 0..=N/2
    pub fn compute_magnitude(&self, signal: &[f64]) -> Result<Vec<f64>> {
        Ok(self
            .compute_complex(signal)?
            .iter()
            .map(|c| c.norm())
            .collect())
    }

    /// Half-spectrum magnitudes: the first `floor(N/2)` bins
    ///
    /// Nyquist is excluded for even N, so every bin lies in `[0, fs/2)`.
    pub fn magnitude_half(&self, signal: &[f64]) -> Result<Vec<f64>> {
        let mut magnitude = self.compute_magnitude(signal)?;
        magnitude.truncate(self.num_half_bins());
        Ok(magnitude)
    }

    /// Get FFT size
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Number of bins returned by [`FftEngine::magnitude_half`]
    pub fn num_half_bins(&self) -> usize {
        self.fft_size / 2
    }

    /// Spacing between bins in Hz
    pub fn bin_width_hz(&self, sampling_rate_hz: f64) -> f64 {
        sampling_rate_hz / self.fft_size as f64
    }

    /// Frequency axis of the half-spectrum in Hz: `k * fs / N`
    pub fn frequency_axis_hz(&self, sampling_rate_hz: f64) -> Vec<f64> {
        let df = self.bin_width_hz(sampling_rate_hz);
        (0..self.num_half_bins()).map(|k| k as f64 * df).collect()
    }
}
