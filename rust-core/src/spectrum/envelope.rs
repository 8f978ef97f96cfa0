//! Envelope analysis: band-limit, Hilbert envelope, re-spectralise
//!
//! # Algorithm
//! 1. Full complex FFT of the signal
//! 2. Keep bins `[idx_low, idx_high]` and their mirrors at `N - k`
//! 3. Inverse FFT (scaled by 1/N); the element magnitude is the
//!    band-limited signal, so a tone comes out rectified
//! 4. Analytic signal via the FFT-based Hilbert transform; its magnitude
//!    is the envelope
//! 5. Half-spectrum of the envelope

use num_complex::Complex64;
use rustfft::FftPlanner;
use tracing::debug;

use super::analysis::{check_sampling_rate, Spectrum};
use super::fft::FftEngine;
use crate::error::{Result, SignalError};

/// Frequency band in Hz
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Band {
    pub low_hz: f64,
    pub high_hz: f64,
}

impl Band {
    pub fn new(low_hz: f64, high_hz: f64) -> Self {
        Self { low_hz, high_hz }
    }

    /// Bin indices `(round(low / df), round(high / df))`
    ///
    /// # Errors
    /// `InvalidParameter` for negative or non-finite edges,
    /// `ComputationError` when the bins are empty or run past `N/2`
    pub fn bin_range(&self, sampling_rate_hz: f64, n: usize) -> Result<(usize, usize)> {
        if !(self.low_hz.is_finite() && self.high_hz.is_finite()) || self.low_hz < 0.0 {
            return Err(SignalError::invalid(format!(
                "band {}-{} Hz must be finite and non-negative",
                self.low_hz, self.high_hz
            )));
        }

        let df = sampling_rate_hz / n as f64;
        let idx_low = (self.low_hz / df).round() as usize;
        let idx_high = (self.high_hz / df).round() as usize;

        if idx_high <= idx_low {
            return Err(SignalError::computation(format!(
                "band {}-{} Hz maps to empty bin range {idx_low}..={idx_high}",
                self.low_hz, self.high_hz
            )));
        }
        if idx_high > n / 2 {
            return Err(SignalError::computation(format!(
                "band upper bin {idx_high} exceeds N/2 = {}",
                n / 2
            )));
        }
        Ok((idx_low, idx_high))
    }
}

fn inverse_fft(planner: &mut FftPlanner<f64>, buffer: &mut [Complex64]) {
    let n = buffer.len();
    planner.plan_fft_inverse(n).process(buffer);
    let scale = 1.0 / n as f64;
    for c in buffer.iter_mut() {
        *c *= scale;
    }
}

/// Analytic signal of a real sequence
///
/// Positive-frequency bins are doubled, negative ones zeroed; DC (and
/// Nyquist for even lengths) are kept as is.
pub fn hilbert(signal: &[f64]) -> Vec<Complex64> {
    let n = signal.len();
    if n == 0 {
        return Vec::new();
    }

    let mut planner = FftPlanner::<f64>::new();
    let mut buffer: Vec<Complex64> = signal.iter().map(|&x| Complex64::new(x, 0.0)).collect();
    planner.plan_fft_forward(n).process(&mut buffer);

    // h[0] = 1; h[1..(n+1)/2] = 2; h[n/2] = 1 for even n; rest 0
    let positive_end = (n + 1) / 2;
    for (k, c) in buffer.iter_mut().enumerate() {
        if k == 0 || (n % 2 == 0 && k == n / 2) {
            continue;
        }
        if k < positive_end {
            *c *= 2.0;
        } else {
            *c = Complex64::new(0.0, 0.0);
        }
    }

    inverse_fft(&mut planner, &mut buffer);
    buffer
}

/// Instantaneous amplitude `|hilbert(signal)|`
pub fn envelope(signal: &[f64]) -> Vec<f64> {
    hilbert(signal).iter().map(|c| c.norm()).collect()
}

/// Band-limit a signal in the frequency domain
///
/// Keeps bins `[idx_low, idx_high]` and their negative-frequency mirrors and
/// returns the magnitude of each reconstructed element.
fn band_limit(signal: &[f64], idx_low: usize, idx_high: usize) -> Vec<f64> {
    let n = signal.len();
    let mut planner = FftPlanner::<f64>::new();
    let mut buffer: Vec<Complex64> = signal.iter().map(|&x| Complex64::new(x, 0.0)).collect();
    planner.plan_fft_forward(n).process(&mut buffer);

    let mut kept = vec![Complex64::new(0.0, 0.0); n];
    for k in idx_low..=idx_high {
        kept[k] = buffer[k];
        if k != 0 {
            kept[n - k] = buffer[n - k];
        }
    }

    inverse_fft(&mut planner, &mut kept);
    kept.iter().map(|c| c.norm()).collect()
}

/// Envelope spectrum of the band `band` of `samples`
///
/// # Returns
/// Half-spectrum of the Hilbert envelope, `floor(N/2)` bins at `k * fs / N`
///
/// # Errors
/// `InvalidParameter` for an empty input or bad rate/band edges;
/// `ComputationError` when the band covers no bins or passes `N/2`
pub fn envelope_spectrum(samples: &[f64], sampling_rate_hz: f64, band: Band) -> Result<Spectrum> {
    check_sampling_rate(sampling_rate_hz)?;
    let n = samples.len();
    if n == 0 {
        return Err(SignalError::invalid("envelope analysis of an empty signal"));
    }

    let (idx_low, idx_high) = band.bin_range(sampling_rate_hz, n)?;
    debug!(n, idx_low, idx_high, "envelope band bins");

    let limited = band_limit(samples, idx_low, idx_high);
    let env = envelope(&limited);

    let engine = FftEngine::new(n)?;
    let magnitudes = engine.magnitude_half(&env)?;
    Ok(Spectrum::from_magnitudes(magnitudes, sampling_rate_hz, n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::f64::consts::PI;

    fn sine(freq: f64, fs: f64, n: usize) -> Vec<f64> {
        (0..n).map(|i| (2.0 * PI * freq * i as f64 / fs).sin()).collect()
    }

    #[test]
    fn test_hilbert_of_cosine_is_complex_exponential() {
        let n = 64;
        let x: Vec<f64> = (0..n).map(|i| (2.0 * PI * 4.0 * i as f64 / n as f64).cos()).collect();
        let z = hilbert(&x);
        for (i, c) in z.iter().enumerate() {
            let phase = 2.0 * PI * 4.0 * i as f64 / n as f64;
            assert!((c.re - phase.cos()).abs() < 1e-12);
            assert!((c.im - phase.sin()).abs() < 1e-12);
        }
    }

    #[test]
    fn test_hilbert_odd_length_keeps_real_part() {
        let x = [0.3, -1.2, 2.5, 0.7, -0.4];
        let z = hilbert(&x);
        for (c, v) in z.iter().zip(x.iter()) {
            assert!((c.re - v).abs() < 1e-12);
        }
    }

    #[test]
    fn test_sine_in_band_concentrates_at_dc() {
        let fs = 100.0;
        let x = sine(10.0, fs, 1000);
        let spec = envelope_spectrum(&x, fs, Band::new(5.0, 15.0)).unwrap();

        assert_eq!(spec.len(), 500);
        assert_eq!(spec.peak_frequency(), Some(0.0));
        let rest: f64 = spec.magnitudes[1..].iter().map(|m| m * m).sum();
        assert!(rest < 0.2 * spec.energy());
    }

    #[test]
    fn test_rectified_tone_has_line_at_twice_frequency() {
        let fs = 100.0;
        let x = sine(10.0, fs, 1000);
        let spec = envelope_spectrum(&x, fs, Band::new(5.0, 15.0)).unwrap();

        assert!((spec.magnitudes[0] - 701.7012).abs() < 1e-3);
        // |sin| repeats at 20 Hz, then 40 Hz
        assert!((spec.magnitudes[200] - 212.9546).abs() < 1e-3);
        assert!((spec.magnitudes[400] - 137.896).abs() < 1e-3);
        assert!(spec.magnitudes[100] < 1e-6);
    }

    #[test]
    fn test_modulated_carrier_envelope_peak() {
        // 20 Hz carrier, 2 Hz amplitude modulation
        let fs = 200.0;
        let n = 2000;
        let x: Vec<f64> = (0..n)
            .map(|i| {
                let t = i as f64 / fs;
                (1.0 + 0.5 * (2.0 * PI * 2.0 * t).cos()) * (2.0 * PI * 20.0 * t).sin()
            })
            .collect();

        let spec = envelope_spectrum(&x, fs, Band::new(15.0, 25.0)).unwrap();
        let mut ranked: Vec<(f64, f64)> = spec
            .frequencies
            .iter()
            .copied()
            .zip(spec.magnitudes.iter().copied())
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());

        // DC, then the rectified carrier at 40 Hz and the modulation at 2 Hz
        assert_eq!(ranked[0].0, 0.0);
        assert!((ranked[1].0 - 40.0).abs() < 1e-9, "{:?}", &ranked[..3]);
        assert!((ranked[2].0 - 2.0).abs() < 1e-9, "{:?}", &ranked[..3]);
        assert!((spec.magnitudes[20] - 346.1577).abs() < 1e-3);
    }

    #[test]
    fn test_out_of_band_sine_is_rejected_by_band() {
        let fs = 100.0;
        let x = sine(10.0, fs, 1000);
        let spec = envelope_spectrum(&x, fs, Band::new(20.0, 30.0)).unwrap();
        assert!(spec.peak_magnitude() < 1e-6);
    }

    #[test]
    fn test_band_errors() {
        let x = sine(10.0, 100.0, 1000);
        let kind = |b: Band| envelope_spectrum(&x, 100.0, b).unwrap_err().kind();

        assert_eq!(kind(Band::new(15.0, 5.0)), ErrorKind::ComputationError);
        assert_eq!(kind(Band::new(10.0, 10.02)), ErrorKind::ComputationError);
        assert_eq!(kind(Band::new(10.0, 60.0)), ErrorKind::ComputationError);
        assert_eq!(kind(Band::new(-1.0, 10.0)), ErrorKind::InvalidParameter);
        assert_eq!(
            envelope_spectrum(&[], 100.0, Band::new(1.0, 2.0)).unwrap_err().kind(),
            ErrorKind::InvalidParameter
        );
    }

    #[test]
    fn test_band_up_to_nyquist_bin() {
        let x = sine(10.0, 100.0, 100);
        assert!(envelope_spectrum(&x, 100.0, Band::new(0.0, 50.0)).is_ok());
    }
}
