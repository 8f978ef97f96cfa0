//! Butterworth filter specification, validation and application

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::butterworth::{design_sections, NormalizedBand};
use super::iir::Biquad;
use super::zero_phase::filtfilt;
use crate::error::{Result, SignalError};

/// Highest supported prototype order
pub const MAX_ORDER: usize = 5;

/// Lowest sampling rate a filter can be designed for
pub const MIN_SAMPLING_RATE_HZ: f64 = 2.0;

/// Lowest accepted high-pass cutoff
pub const MIN_HIGHPASS_CUTOFF_HZ: f64 = 1.0;

/// Filter response type with its cutoff(s) in Hz
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterKind {
    LowPass { cutoff_hz: f64 },
    HighPass { cutoff_hz: f64 },
    BandPass { low_hz: f64, high_hz: f64 },
}

/// Butterworth filter specification
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Response type and cutoff(s)
    #[serde(flatten)]
    pub kind: FilterKind,

    /// Prototype order in [1, 5]; zero-phase application doubles it
    pub order: usize,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            kind: FilterKind::LowPass { cutoff_hz: 1.0 },
            order: 4,
        }
    }
}

impl FilterSpec {
    pub fn lowpass(cutoff_hz: f64, order: usize) -> Self {
        Self {
            kind: FilterKind::LowPass { cutoff_hz },
            order,
        }
    }

    pub fn highpass(cutoff_hz: f64, order: usize) -> Self {
        Self {
            kind: FilterKind::HighPass { cutoff_hz },
            order,
        }
    }

    pub fn bandpass(low_hz: f64, high_hz: f64, order: usize) -> Self {
        Self {
            kind: FilterKind::BandPass { low_hz, high_hz },
            order,
        }
    }

    /// Check order and cutoffs against the Nyquist frequency
    ///
    /// Needs no sample data, so configuration can be checked up front.
    pub fn validate(&self, sampling_rate_hz: f64) -> Result<()> {
        if !sampling_rate_hz.is_finite() || sampling_rate_hz < MIN_SAMPLING_RATE_HZ {
            return Err(SignalError::invalid(format!(
                "sampling rate must be at least {MIN_SAMPLING_RATE_HZ} Hz, got {sampling_rate_hz}"
            )));
        }
        if !(1..=MAX_ORDER).contains(&self.order) {
            return Err(SignalError::invalid(format!(
                "filter order must be in [1, {MAX_ORDER}], got {}",
                self.order
            )));
        }

        let nyquist = 0.5 * sampling_rate_hz;
        let in_band = |f: f64| f.is_finite() && f > 0.0 && f < nyquist;

        match self.kind {
            FilterKind::LowPass { cutoff_hz } => {
                if !in_band(cutoff_hz) {
                    return Err(SignalError::invalid(format!(
                        "low-pass cutoff {cutoff_hz} Hz must lie in (0, {nyquist}) Hz"
                    )));
                }
            }
            FilterKind::HighPass { cutoff_hz } => {
                if cutoff_hz < MIN_HIGHPASS_CUTOFF_HZ || !in_band(cutoff_hz) {
                    return Err(SignalError::invalid(format!(
                        "high-pass cutoff {cutoff_hz} Hz must lie in [{MIN_HIGHPASS_CUTOFF_HZ}, {nyquist}) Hz"
                    )));
                }
            }
            FilterKind::BandPass { low_hz, high_hz } => {
                if !(in_band(low_hz) && in_band(high_hz)) {
                    return Err(SignalError::invalid(format!(
                        "band-pass edges {low_hz}-{high_hz} Hz must lie in (0, {nyquist}) Hz"
                    )));
                }
                if low_hz >= high_hz {
                    return Err(SignalError::invalid(format!(
                        "band-pass low edge {low_hz} Hz must be below high edge {high_hz} Hz"
                    )));
                }
            }
        }

        Ok(())
    }

    /// Cutoff(s) divided by the Nyquist frequency
    pub fn normalized_band(&self, sampling_rate_hz: f64) -> NormalizedBand {
        let nyquist = 0.5 * sampling_rate_hz;
        match self.kind {
            FilterKind::LowPass { cutoff_hz } => NormalizedBand::LowPass(cutoff_hz / nyquist),
            FilterKind::HighPass { cutoff_hz } => NormalizedBand::HighPass(cutoff_hz / nyquist),
            FilterKind::BandPass { low_hz, high_hz } => {
                NormalizedBand::BandPass(low_hz / nyquist, high_hz / nyquist)
            }
        }
    }

    /// Validate and design the second-order sections
    pub fn design(&self, sampling_rate_hz: f64) -> Result<Vec<Biquad>> {
        self.validate(sampling_rate_hz)?;
        let sections = design_sections(self.order, self.normalized_band(sampling_rate_hz));
        debug!(
            kind = ?self.kind,
            order = self.order,
            sections = sections.len(),
            "designed butterworth filter"
        );
        Ok(sections)
    }
}

/// Design a Butterworth filter and apply it with zero phase
///
/// # Arguments
/// * `samples` - Input signal
/// * `sampling_rate_hz` - Sampling rate in Hz
/// * `spec` - Response type, cutoff(s) and order
///
/// # Returns
/// Filtered signal, same length and time-aligned with the input
///
/// # Errors
/// `InvalidParameter` for a bad rate, order or cutoff; `InsufficientData`
/// when `len(samples) <= 3 * order`. All checks run before filtering.
pub fn apply_filter(samples: &[f64], sampling_rate_hz: f64, spec: &FilterSpec) -> Result<Vec<f64>> {
    spec.validate(sampling_rate_hz)?;
    if samples.len() <= 3 * spec.order {
        return Err(SignalError::insufficient(format!(
            "order {} needs more than {} samples, got {}",
            spec.order,
            3 * spec.order,
            samples.len()
        )));
    }

    let sections = spec.design(sampling_rate_hz)?;
    Ok(filtfilt(&sections, samples))
}
