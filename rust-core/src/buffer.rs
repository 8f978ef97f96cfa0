//! Sample buffers and fixed-length segmentation
//!
//! A [`SampleBuffer`] is one channel of uniformly-sampled data. Segmentation
//! produces borrowed, read-only [`Segment`] windows into it.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SignalError};

/// One channel of samples plus its sampling rate
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    samples: Vec<f64>,
    sampling_rate_hz: f64,
}

impl SampleBuffer {
    /// Create a buffer, taking ownership of the samples
    ///
    /// # Errors
    /// `InvalidParameter` if `samples` is empty or the rate is not a
    /// positive finite number.
    pub fn new(samples: Vec<f64>, sampling_rate_hz: f64) -> Result<Self> {
        if samples.is_empty() {
            return Err(SignalError::invalid("sample buffer must hold at least one sample"));
        }
        if !sampling_rate_hz.is_finite() || sampling_rate_hz <= 0.0 {
            return Err(SignalError::invalid(format!(
                "sampling rate must be positive, got {sampling_rate_hz}"
            )));
        }

        Ok(Self {
            samples,
            sampling_rate_hz,
        })
    }

    /// Create a buffer by copying a slice
    pub fn from_slice(samples: &[f64], sampling_rate_hz: f64) -> Result<Self> {
        Self::new(samples.to_vec(), sampling_rate_hz)
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn sampling_rate_hz(&self) -> f64 {
        self.sampling_rate_hz
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Nyquist frequency (half the sampling rate)
    pub fn nyquist_hz(&self) -> f64 {
        0.5 * self.sampling_rate_hz
    }

    /// Duration in seconds
    pub fn duration_seconds(&self) -> f64 {
        self.samples.len() as f64 / self.sampling_rate_hz
    }

    /// Release the underlying samples
    pub fn into_samples(self) -> Vec<f64> {
        self.samples
    }
}

/// Segment length and overlap
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationSpec {
    /// Segment length in seconds
    pub segment_seconds: f64,

    /// Overlap between consecutive segments, percent in [0, 100)
    pub overlap_percent: f64,
}

impl Default for SegmentationSpec {
    fn default() -> Self {
        Self {
            segment_seconds: 1.0,
            overlap_percent: 0.0,
        }
    }
}

impl SegmentationSpec {
    pub fn new(segment_seconds: f64, overlap_percent: f64) -> Self {
        Self {
            segment_seconds,
            overlap_percent,
        }
    }

    /// Check ranges that do not depend on the sampling rate
    pub fn validate(&self) -> Result<()> {
        if !self.segment_seconds.is_finite() || self.segment_seconds <= 0.0 {
            return Err(SignalError::invalid(format!(
                "segment length must be positive, got {} s",
                self.segment_seconds
            )));
        }
        if !(0.0..100.0).contains(&self.overlap_percent) {
            return Err(SignalError::invalid(format!(
                "overlap must be in [0, 100), got {}%",
                self.overlap_percent
            )));
        }
        Ok(())
    }

    /// Derive `(segment_samples, step_samples)` for a sampling rate
    ///
    /// # Errors
    /// `InvalidParameter` when the rate is below 1 Hz, a range check fails,
    /// or the segment rounds down to zero samples.
    pub fn sample_counts(&self, sampling_rate_hz: f64) -> Result<(usize, usize)> {
        self.validate()?;
        if !sampling_rate_hz.is_finite() || sampling_rate_hz < 1.0 {
            return Err(SignalError::invalid(format!(
                "sampling rate must be at least 1 Hz, got {sampling_rate_hz}"
            )));
        }

        let segment_samples = (self.segment_seconds * sampling_rate_hz).floor() as usize;
        if segment_samples == 0 {
            return Err(SignalError::invalid(format!(
                "{} s at {} Hz is shorter than one sample",
                self.segment_seconds, sampling_rate_hz
            )));
        }

        let step = (segment_samples as f64 * (1.0 - self.overlap_percent / 100.0)).floor() as usize;
        Ok((segment_samples, step.max(1)))
    }
}

/// Read-only window `[start, start + len)` into a [`SampleBuffer`]
#[derive(Debug, Clone, Copy)]
pub struct Segment<'a> {
    buffer: &'a SampleBuffer,
    index: usize,
    start: usize,
    len: usize,
}

impl<'a> Segment<'a> {
    /// Position of this segment in the produced sequence
    pub fn index(&self) -> usize {
        self.index
    }

    /// First sample index in the parent buffer
    pub fn start(&self) -> usize {
        self.start
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn samples(&self) -> &'a [f64] {
        &self.buffer.samples[self.start..self.start + self.len]
    }

    pub fn sampling_rate_hz(&self) -> f64 {
        self.buffer.sampling_rate_hz
    }

    /// Start time in seconds relative to the buffer start
    pub fn start_seconds(&self) -> f64 {
        self.start as f64 / self.buffer.sampling_rate_hz
    }
}

/// Split a buffer into fixed-length, optionally overlapping segments
///
/// Segments come out in increasing start order; a trailing window that does
/// not fully fit is dropped. An empty result means the segment is longer
/// than the buffer, which is not an error.
pub fn segment<'a>(buffer: &'a SampleBuffer, spec: &SegmentationSpec) -> Result<Vec<Segment<'a>>> {
    let (segment_samples, step) = spec.sample_counts(buffer.sampling_rate_hz)?;

    let segments: Vec<Segment<'a>> = segment_starts(buffer.len(), segment_samples, step)
        .enumerate()
        .map(|(index, start)| Segment {
            buffer,
            index,
            start,
            len: segment_samples,
        })
        .collect();

    debug!(
        segment_samples,
        step,
        count = segments.len(),
        "segmented {} samples",
        buffer.len()
    );

    Ok(segments)
}

/// Start indices of every full window of `window` samples advancing by `step`
pub(crate) fn segment_starts(len: usize, window: usize, step: usize) -> impl Iterator<Item = usize> {
    let count = if window == 0 || step == 0 || window > len {
        0
    } else {
        (len - window) / step + 1
    };
    (0..count).map(move |i| i * step)
}
