//! Feature selection and per-segment evaluation
//!
//! A [`FeatureSelection`] is the caller-held, append-only list of features
//! for one analysis session. [`compute_features`] validates it, then
//! evaluates every selected feature on every segment in parallel and
//! assembles rows in segment order.

use ndarray::Array2;
use rayon::prelude::*;
use std::collections::HashSet;
use tracing::debug;

use super::spectral;
use super::temporal;
use super::types::{FeatureKind, FeatureResult, FeatureSpec};
use crate::buffer::{segment, segment_starts, SampleBuffer, Segment, SegmentationSpec};
use crate::error::{Result, SignalError};
use crate::spectrum::FftEngine;

/// Ordered, duplicate-free list of selected features
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureSelection {
    specs: Vec<FeatureSpec>,
}

impl FeatureSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selection of catalog names with default parameters, in order
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        let mut selection = Self::new();
        for name in names {
            selection.select(FeatureSpec::parse(name.as_ref())?)?;
        }
        Ok(selection)
    }

    /// Append a feature
    ///
    /// # Errors
    /// `InvalidParameter` if that kind is already selected
    pub fn select(&mut self, spec: impl Into<FeatureSpec>) -> Result<()> {
        let spec = spec.into();
        if self.is_selected(spec.kind()) {
            return Err(SignalError::invalid(format!(
                "feature {} is already selected",
                spec.kind()
            )));
        }
        self.specs.push(spec);
        Ok(())
    }

    /// Append a feature by catalog name with default parameters
    pub fn select_name(&mut self, name: &str) -> Result<()> {
        self.select(FeatureSpec::parse(name)?)
    }

    pub fn is_selected(&self, kind: FeatureKind) -> bool {
        self.specs.iter().any(|s| s.kind() == kind)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Clear the session so every feature can be selected again
    pub fn reset(&mut self) {
        self.specs.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FeatureSpec> {
        self.specs.iter()
    }

    pub fn as_slice(&self) -> &[FeatureSpec] {
        &self.specs
    }

    /// Features not yet selected, in catalog order
    pub fn available(&self) -> Vec<FeatureKind> {
        FeatureKind::ALL
            .iter()
            .copied()
            .filter(|&kind| !self.is_selected(kind))
            .collect()
    }
}

impl<'a> IntoIterator for &'a FeatureSelection {
    type Item = &'a FeatureSpec;
    type IntoIter = std::slice::Iter<'a, FeatureSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.specs.iter()
    }
}

fn check_unique(features: &[FeatureSpec]) -> Result<()> {
    let mut seen = HashSet::with_capacity(features.len());
    for spec in features {
        if !seen.insert(spec.kind()) {
            return Err(SignalError::invalid(format!(
                "feature {} is selected more than once",
                spec.kind()
            )));
        }
    }
    Ok(())
}

/// Evaluate one feature on one segment
fn evaluate(spec: &FeatureSpec, x: &[f64], sampling_rate_hz: f64, half_spectrum: &[f64]) -> Result<f64> {
    let value = match spec.kind() {
        FeatureKind::RootMeanSquared => temporal::root_mean_squared(x),
        FeatureKind::PeakValue => temporal::peak_value(x),
        FeatureKind::Variance => temporal::variance(x),
        FeatureKind::CrestFactor => temporal::crest_factor(x)?,
        FeatureKind::Kurtosis => temporal::kurtosis(x),
        FeatureKind::ClearanceFactor => temporal::clearance_factor(x)?,
        FeatureKind::ImpulseFactor => temporal::impulse_factor(x)?,
        FeatureKind::LineIntegral => temporal::line_integral(x),
        FeatureKind::PeakToPeak => temporal::peak_to_peak(x),
        FeatureKind::ShannonEntropy => temporal::shannon_entropy(x, spec.bins())?,
        FeatureKind::Skewness => temporal::skewness(x),
        FeatureKind::PeakValueFft => spectral::peak_value_fft(half_spectrum),
        FeatureKind::EnergyFft => spectral::energy_fft(half_spectrum),
        FeatureKind::PowerSpectralDensity => {
            spectral::power_spectral_density(x, sampling_rate_hz, spec.segment_length())?
        }
    };
    Ok(value)
}

fn segment_row(segment: &Segment<'_>, features: &[FeatureSpec], shared_fft: Option<&FftEngine>) -> Result<Vec<f64>> {
    let x = segment.samples();

    let half_spectrum = match shared_fft {
        Some(engine) if engine.fft_size() == x.len() => engine.magnitude_half(x)?,
        Some(_) => FftEngine::new(x.len())?.magnitude_half(x)?,
        None => Vec::new(),
    };

    features
        .iter()
        .map(|spec| evaluate(spec, x, segment.sampling_rate_hz(), &half_spectrum))
        .collect()
}

/// Evaluate the selected features on every segment
///
/// # Arguments
/// * `segments` - Segments in output row order
/// * `features` - Selected features in output column order
///
/// # Returns
/// One row per segment and one column per feature. No segments gives a
/// table with zero rows and the selected column names.
///
/// # Errors
/// `InvalidParameter` for a duplicate selection or a PSD length longer than
/// a segment, `InsufficientData` for an empty segment, `ComputationError`
/// when a feature is undefined on some segment. Parameters are checked
/// before any feature is computed.
pub fn compute_features(segments: &[Segment<'_>], features: &[FeatureSpec]) -> Result<FeatureResult> {
    check_unique(features)?;
    for seg in segments {
        if seg.is_empty() {
            return Err(SignalError::insufficient(format!(
                "segment {} holds no samples",
                seg.index()
            )));
        }
        for spec in features {
            spec.validate_for_segment(seg.len())?;
        }
    }

    let needs_fft = features.iter().any(|s| s.kind().needs_half_spectrum());
    let shared_fft = match segments.first() {
        Some(first) if needs_fft => Some(FftEngine::new(first.len())?),
        _ => None,
    };

    debug!(
        segments = segments.len(),
        features = features.len(),
        "computing feature table"
    );

    let rows: Vec<Vec<f64>> = segments
        .par_iter()
        .map(|seg| segment_row(seg, features, shared_fft.as_ref()))
        .collect::<Result<_>>()?;

    let column_names = features.iter().map(|s| s.kind().name().to_string()).collect();
    let values = Array2::from_shape_vec(
        (rows.len(), features.len()),
        rows.into_iter().flatten().collect(),
    )?;

    Ok(FeatureResult::new(column_names, values))
}

/// Segment a buffer and evaluate a selection on each segment
///
/// The selection and segmentation are both validated before any
/// segmenting happens.
pub fn extract_features(
    buffer: &SampleBuffer,
    segmentation: &SegmentationSpec,
    selection: &FeatureSelection,
) -> Result<FeatureResult> {
    check_unique(selection.as_slice())?;
    let (segment_len, _) = segmentation.sample_counts(buffer.sampling_rate_hz())?;
    for spec in selection {
        spec.validate_for_segment(segment_len)?;
    }

    let segments = segment(buffer, segmentation)?;
    compute_features(&segments, selection.as_slice())
}

/// RMS of each segment of the buffer
///
/// A segment longer than the signal is shortened to the whole signal, so
/// the series always has at least one value.
pub fn rms_series(buffer: &SampleBuffer, segmentation: &SegmentationSpec) -> Result<Vec<f64>> {
    let (segment_len, step) = segmentation.sample_counts(buffer.sampling_rate_hz())?;
    let window = segment_len.min(buffer.len());
    let samples = buffer.samples();

    Ok(segment_starts(samples.len(), window, step)
        .map(|start| temporal::root_mean_squared(&samples[start..start + window]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::features::types::FeatureParameter;
    use std::f64::consts::PI;

    fn sine_buffer(freq: f64, fs: f64, n: usize, amplitude: f64) -> SampleBuffer {
        let samples = (0..n)
            .map(|i| amplitude * (2.0 * PI * freq * i as f64 / fs).sin())
            .collect();
        SampleBuffer::new(samples, fs).unwrap()
    }

    #[test]
    fn test_selection_rejects_duplicates() {
        let mut selection = FeatureSelection::new();
        selection.select(FeatureKind::Variance).unwrap();
        selection.select_name("Kurtosis").unwrap();

        let err = selection.select(FeatureKind::Variance).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
        assert_eq!(selection.len(), 2);
        assert!(!selection.available().contains(&FeatureKind::Kurtosis));

        selection.reset();
        assert!(selection.is_empty());
        selection.select(FeatureKind::Variance).unwrap();
    }

    #[test]
    fn test_unknown_name_rejected() {
        let err = FeatureSelection::from_names(&["RootMeanSquared", "Jitter"]).unwrap_err();
        assert_eq!(err, SignalError::UnknownFeature("Jitter".into()));
    }

    #[test]
    fn test_columns_follow_selection_order() {
        // 20 samples per period, so both extremes are sampled
        let buffer = sine_buffer(5.0, 100.0, 1000, 2.0);
        let selection =
            FeatureSelection::from_names(&["PeakToPeak", "EnergyFFT", "RootMeanSquared"]).unwrap();

        let result = extract_features(&buffer, &SegmentationSpec::new(1.0, 0.0), &selection).unwrap();
        assert_eq!(result.column_names(), ["PeakToPeak", "EnergyFFT", "RootMeanSquared"]);
        assert_eq!(result.num_rows(), 10);

        for row in result.rows() {
            assert!((row[0] - 4.0).abs() < 1e-9);
            assert!((row[2] - 2.0 / 2f64.sqrt()).abs() < 1e-9);
        }
    }

    #[test]
    fn test_overlap_row_count() {
        let buffer = sine_buffer(3.0, 50.0, 500, 1.0);
        let selection = FeatureSelection::from_names(&["Variance"]).unwrap();
        let result = extract_features(&buffer, &SegmentationSpec::new(2.0, 50.0), &selection).unwrap();
        // segment 100, step 50: (500 - 100) / 50 + 1
        assert_eq!(result.num_rows(), 9);
    }

    #[test]
    fn test_rows_stay_in_segment_order() {
        // distinct value per segment, enough segments to split across threads
        let samples: Vec<f64> = (0..25_000).map(|i| (i as f64 * 0.01).powi(2)).collect();
        let buffer = SampleBuffer::new(samples.clone(), 100.0).unwrap();
        let selection = FeatureSelection::from_names(&["PeakValue", "RootMeanSquared"]).unwrap();
        let segmentation = SegmentationSpec::new(1.0, 50.0);

        let result = extract_features(&buffer, &segmentation, &selection).unwrap();
        assert_eq!(result.num_rows(), (25_000 - 100) / 50 + 1);

        for (i, row) in result.rows().iter().enumerate() {
            let window = &samples[i * 50..i * 50 + 100];
            assert_eq!(row[0], temporal::peak_value(window), "row {i}");
            assert_eq!(row[1], temporal::root_mean_squared(window), "row {i}");
        }

        let series = rms_series(&buffer, &segmentation).unwrap();
        assert_eq!(series.len(), result.num_rows());
        for (i, rms) in series.iter().enumerate() {
            assert_eq!(*rms, temporal::root_mean_squared(&samples[i * 50..i * 50 + 100]));
        }
    }

    #[test]
    fn test_no_segments_fit() {
        let buffer = sine_buffer(3.0, 50.0, 40, 1.0);
        let selection = FeatureSelection::from_names(&["Variance", "PeakValue"]).unwrap();
        let result = extract_features(&buffer, &SegmentationSpec::default(), &selection).unwrap();
        assert_eq!(result.num_rows(), 0);
        assert_eq!(result.num_columns(), 2);
    }

    #[test]
    fn test_computation_error_propagates() {
        let buffer = SampleBuffer::new(vec![0.0; 200], 100.0).unwrap();
        let selection = FeatureSelection::from_names(&["RootMeanSquared", "CrestFactor"]).unwrap();
        let err = extract_features(&buffer, &SegmentationSpec::default(), &selection).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ComputationError);
    }

    #[test]
    fn test_psd_length_checked_before_compute() {
        let buffer = sine_buffer(5.0, 100.0, 1000, 1.0);
        let mut selection = FeatureSelection::new();
        selection.select(FeatureKind::PowerSpectralDensity).unwrap();

        // segments of 100 samples, default PSD length 256
        let err = extract_features(&buffer, &SegmentationSpec::default(), &selection).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);

        selection.reset();
        selection
            .select(
                FeatureSpec::with_parameter(
                    FeatureKind::PowerSpectralDensity,
                    FeatureParameter::SegmentLength(50),
                )
                .unwrap(),
            )
            .unwrap();
        let result = extract_features(&buffer, &SegmentationSpec::default(), &selection).unwrap();
        assert!(result.values().iter().all(|&v| v > 0.0));
    }

    #[test]
    fn test_duplicate_slice_rejected() {
        let buffer = sine_buffer(5.0, 100.0, 1000, 1.0);
        let segments = segment(&buffer, &SegmentationSpec::default()).unwrap();
        let features = [
            FeatureSpec::new(FeatureKind::Skewness),
            FeatureSpec::new(FeatureKind::Skewness),
        ];
        assert_eq!(
            compute_features(&segments, &features).unwrap_err().kind(),
            ErrorKind::InvalidParameter
        );
    }

    #[test]
    fn test_every_feature_evaluates_on_a_sine() {
        let buffer = sine_buffer(7.0, 512.0, 2048, 1.0);
        let names: Vec<&str> = FeatureKind::ALL.iter().map(|k| k.name()).collect();
        let selection = FeatureSelection::from_names(&names).unwrap();

        let result = extract_features(&buffer, &SegmentationSpec::new(1.0, 50.0), &selection).unwrap();
        assert_eq!(result.num_columns(), 14);
        assert_eq!(result.num_rows(), 7);
        assert!(result.values().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_rms_series_clamps_long_segment() {
        let buffer = sine_buffer(1.0, 10.0, 30, 1.0);
        let series = rms_series(&buffer, &SegmentationSpec::new(10.0, 0.0)).unwrap();
        assert_eq!(series.len(), 1);
        assert!((series[0] - 0.5f64.sqrt()).abs() < 1e-9);

        let series = rms_series(&buffer, &SegmentationSpec::new(1.0, 0.0)).unwrap();
        assert_eq!(series.len(), 3);
    }
}
