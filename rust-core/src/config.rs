//! Analysis configuration loaded from TOML
//!
//! Every section except the sampling rate is optional and falls back to
//! its default. `validate` runs all cross-parameter checks without sample
//! data.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::buffer::SegmentationSpec;
use crate::error::{Result, SignalError};
use crate::features::{FeatureKind, FeatureParameter, FeatureSelection, FeatureSpec};
use crate::filters::FilterSpec;
use crate::spectrum::{Band, StftSpec};

/// One entry of the `features` list: a bare name or a table with parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureEntry {
    Name(String),
    Configured {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bins: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        segment_length: Option<usize>,
    },
}

impl FeatureEntry {
    pub fn to_spec(&self) -> Result<FeatureSpec> {
        match self {
            FeatureEntry::Name(name) => FeatureSpec::parse(name),
            FeatureEntry::Configured {
                name,
                bins,
                segment_length,
            } => {
                let kind: FeatureKind = name.parse()?;
                match (bins, segment_length) {
                    (None, None) => Ok(FeatureSpec::new(kind)),
                    (Some(bins), None) => {
                        FeatureSpec::with_parameter(kind, FeatureParameter::Bins(*bins))
                    }
                    (None, Some(len)) => {
                        FeatureSpec::with_parameter(kind, FeatureParameter::SegmentLength(*len))
                    }
                    (Some(_), Some(_)) => Err(SignalError::invalid(format!(
                        "{kind} takes at most one parameter"
                    ))),
                }
            }
        }
    }
}

/// Everything needed to run the pipeline on one channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub sampling_rate_hz: f64,

    #[serde(default)]
    pub segmentation: SegmentationSpec,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterSpec>,

    #[serde(default)]
    pub stft: StftSpec,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub envelope_band: Option<Band>,

    #[serde(default)]
    pub features: Vec<FeatureEntry>,
}

impl AnalysisConfig {
    /// Defaults for every section at the given sampling rate
    pub fn new(sampling_rate_hz: f64) -> Self {
        Self {
            sampling_rate_hz,
            segmentation: SegmentationSpec::default(),
            filter: None,
            stft: StftSpec::default(),
            envelope_band: None,
            features: Vec::new(),
        }
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        debug!(
            sampling_rate_hz = config.sampling_rate_hz,
            features = config.features.len(),
            "loaded analysis config"
        );
        Ok(config)
    }

    /// Serialise back to TOML
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }

    /// The feature list as a selection session
    pub fn feature_selection(&self) -> Result<FeatureSelection> {
        let mut selection = FeatureSelection::new();
        for entry in &self.features {
            selection.select(entry.to_spec()?)?;
        }
        Ok(selection)
    }

    /// Run every parameter check that does not need sample data
    pub fn validate(&self) -> Result<()> {
        let fs = self.sampling_rate_hz;
        let (segment_len, _) = self.segmentation.sample_counts(fs)?;

        if let Some(filter) = &self.filter {
            filter.validate(fs)?;
        }

        self.stft.sample_counts(fs)?;

        if let Some(band) = &self.envelope_band {
            let nyquist = 0.5 * fs;
            if !(band.low_hz >= 0.0 && band.low_hz < band.high_hz && band.high_hz <= nyquist) {
                return Err(SignalError::invalid(format!(
                    "envelope band {}-{} Hz must satisfy 0 <= low < high <= {nyquist}",
                    band.low_hz, band.high_hz
                )));
            }
        }

        for spec in &self.feature_selection()? {
            spec.validate_for_segment(segment_len)?;
        }
        Ok(())
    }
}
