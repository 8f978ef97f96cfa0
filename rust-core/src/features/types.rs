//! Feature kinds, per-feature parameters and the result table

use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SignalError};

/// Default histogram bin count for Shannon entropy
pub const DEFAULT_ENTROPY_BINS: usize = 10;

/// Default Welch averaging length for the PSD feature
pub const DEFAULT_PSD_SEGMENT_LENGTH: usize = crate::spectrum::welch::DEFAULT_SEGMENT_LENGTH;

/// Which representation a feature is computed from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureDomain {
    Time,
    Frequency,
}

/// Every feature in the catalog
///
/// Variant names double as the canonical column names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureKind {
    RootMeanSquared,
    PeakValue,
    Variance,
    CrestFactor,
    Kurtosis,
    ClearanceFactor,
    ImpulseFactor,
    LineIntegral,
    PeakToPeak,
    ShannonEntropy,
    Skewness,
    #[serde(rename = "PeakValueFFT")]
    PeakValueFft,
    #[serde(rename = "EnergyFFT")]
    EnergyFft,
    PowerSpectralDensity,
}

impl FeatureKind {
    /// Catalog order
    pub const ALL: [FeatureKind; 14] = [
        FeatureKind::RootMeanSquared,
        FeatureKind::PeakValue,
        FeatureKind::Variance,
        FeatureKind::CrestFactor,
        FeatureKind::Kurtosis,
        FeatureKind::ClearanceFactor,
        FeatureKind::ImpulseFactor,
        FeatureKind::LineIntegral,
        FeatureKind::PeakToPeak,
        FeatureKind::ShannonEntropy,
        FeatureKind::Skewness,
        FeatureKind::PeakValueFft,
        FeatureKind::EnergyFft,
        FeatureKind::PowerSpectralDensity,
    ];

    /// Canonical name, used for parsing and as the result column name
    pub fn name(self) -> &'static str {
        match self {
            FeatureKind::RootMeanSquared => "RootMeanSquared",
            FeatureKind::PeakValue => "PeakValue",
            FeatureKind::Variance => "Variance",
            FeatureKind::CrestFactor => "CrestFactor",
            FeatureKind::Kurtosis => "Kurtosis",
            FeatureKind::ClearanceFactor => "ClearanceFactor",
            FeatureKind::ImpulseFactor => "ImpulseFactor",
            FeatureKind::LineIntegral => "LineIntegral",
            FeatureKind::PeakToPeak => "PeakToPeak",
            FeatureKind::ShannonEntropy => "ShannonEntropy",
            FeatureKind::Skewness => "Skewness",
            FeatureKind::PeakValueFft => "PeakValueFFT",
            FeatureKind::EnergyFft => "EnergyFFT",
            FeatureKind::PowerSpectralDensity => "PowerSpectralDensity",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            FeatureKind::RootMeanSquared => "Square root of the mean squared sample value",
            FeatureKind::PeakValue => "Largest absolute sample value",
            FeatureKind::Variance => "Population variance of the samples",
            FeatureKind::CrestFactor => "Peak value divided by the RMS value",
            FeatureKind::Kurtosis => "Fisher kurtosis, the tailedness of the amplitude distribution",
            FeatureKind::ClearanceFactor => "Peak value divided by the mean square root of absolute values",
            FeatureKind::ImpulseFactor => "Peak value divided by the mean absolute value",
            FeatureKind::LineIntegral => "Simpson's-rule integral of the samples at unit spacing",
            FeatureKind::PeakToPeak => "Difference between the largest and smallest sample",
            FeatureKind::ShannonEntropy => "Entropy in bits of the amplitude histogram density",
            FeatureKind::Skewness => "Fisher-Pearson skewness, the asymmetry of the amplitude distribution",
            FeatureKind::PeakValueFft => "Largest magnitude of the half-spectrum",
            FeatureKind::EnergyFft => "Sum of squared half-spectrum magnitudes",
            FeatureKind::PowerSpectralDensity => "Sum of the Welch power spectral density estimate",
        }
    }

    pub fn domain(self) -> FeatureDomain {
        match self {
            FeatureKind::PeakValueFft | FeatureKind::EnergyFft | FeatureKind::PowerSpectralDensity => {
                FeatureDomain::Frequency
            }
            _ => FeatureDomain::Time,
        }
    }

    /// Whether the feature reads the segment's half-spectrum
    pub(crate) fn needs_half_spectrum(self) -> bool {
        matches!(self, FeatureKind::PeakValueFft | FeatureKind::EnergyFft)
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FeatureKind {
    type Err = SignalError;

    fn from_str(s: &str) -> Result<Self> {
        FeatureKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| SignalError::UnknownFeature(s.to_string()))
    }
}

/// Optional per-feature setting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureParameter {
    /// Histogram bin count for `ShannonEntropy`
    Bins(usize),

    /// Welch segment length for `PowerSpectralDensity`
    SegmentLength(usize),
}

/// A selected feature with its parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSpec {
    kind: FeatureKind,
    parameter: Option<FeatureParameter>,
}

impl FeatureSpec {
    /// Feature with default parameters
    pub fn new(kind: FeatureKind) -> Self {
        Self {
            kind,
            parameter: None,
        }
    }

    /// Feature with an explicit parameter
    ///
    /// # Errors
    /// `InvalidParameter` if `kind` does not take this parameter or the
    /// value is zero
    pub fn with_parameter(kind: FeatureKind, parameter: FeatureParameter) -> Result<Self> {
        match (kind, parameter) {
            (FeatureKind::ShannonEntropy, FeatureParameter::Bins(0)) => Err(SignalError::invalid(
                "ShannonEntropy bin count must be at least 1",
            )),
            (FeatureKind::PowerSpectralDensity, FeatureParameter::SegmentLength(0)) => Err(
                SignalError::invalid("PowerSpectralDensity segment length must be at least 1"),
            ),
            (FeatureKind::ShannonEntropy, FeatureParameter::Bins(_))
            | (FeatureKind::PowerSpectralDensity, FeatureParameter::SegmentLength(_)) => Ok(Self {
                kind,
                parameter: Some(parameter),
            }),
            _ => Err(SignalError::invalid(format!(
                "{kind} does not accept parameter {parameter:?}"
            ))),
        }
    }

    /// Parse a catalog name with default parameters
    pub fn parse(name: &str) -> Result<Self> {
        Ok(Self::new(name.parse()?))
    }

    pub fn kind(&self) -> FeatureKind {
        self.kind
    }

    pub fn parameter(&self) -> Option<FeatureParameter> {
        self.parameter
    }

    /// Histogram bin count (ShannonEntropy)
    pub fn bins(&self) -> usize {
        match self.parameter {
            Some(FeatureParameter::Bins(bins)) => bins,
            _ => DEFAULT_ENTROPY_BINS,
        }
    }

    /// Welch segment length (PowerSpectralDensity)
    pub fn segment_length(&self) -> usize {
        match self.parameter {
            Some(FeatureParameter::SegmentLength(len)) => len,
            _ => DEFAULT_PSD_SEGMENT_LENGTH,
        }
    }

    /// Check parameters against the length of the segments they will see
    pub fn validate_for_segment(&self, segment_len: usize) -> Result<()> {
        if self.kind == FeatureKind::PowerSpectralDensity && self.segment_length() > segment_len {
            return Err(SignalError::invalid(format!(
                "PSD segment length {} exceeds segment length {segment_len}",
                self.segment_length()
            )));
        }
        Ok(())
    }
}

impl From<FeatureKind> for FeatureSpec {
    fn from(kind: FeatureKind) -> Self {
        Self::new(kind)
    }
}

/// Rectangular feature table: one row per segment, one column per feature
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureResult {
    column_names: Vec<String>,
    values: Array2<f64>,
}

impl FeatureResult {
    pub(crate) fn new(column_names: Vec<String>, values: Array2<f64>) -> Self {
        Self {
            column_names,
            values,
        }
    }

    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// Values indexed `[segment, feature]`
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn num_rows(&self) -> usize {
        self.values.nrows()
    }

    pub fn num_columns(&self) -> usize {
        self.column_names.len()
    }

    pub fn row(&self, index: usize) -> Option<ArrayView1<'_, f64>> {
        (index < self.num_rows()).then(|| self.values.row(index))
    }

    /// Values of the named column across all segments
    pub fn column(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        self.column_names
            .iter()
            .position(|c| c == name)
            .map(|idx| self.values.column(idx))
    }

    /// Rows as plain vectors
    pub fn rows(&self) -> Vec<Vec<f64>> {
        self.values.outer_iter().map(|row| row.to_vec()).collect()
    }

    pub fn into_values(self) -> Array2<f64> {
        self.values
    }
}
