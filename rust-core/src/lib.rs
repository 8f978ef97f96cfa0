//! Signal Features - segmentation, spectral analysis and feature extraction
//!
//! Turns a sampled signal into per-segment scalar features, spectra,
//! envelope spectra and spectrograms, with zero-phase Butterworth
//! filtering, plus optional Python bindings.

// PyO3 macro-generated impls trip this lint
#![cfg_attr(feature = "python", allow(non_local_definitions))]

pub mod buffer;
pub mod config;
pub mod error;
pub mod features;
pub mod filters;
pub mod spectrum;
pub mod table;

#[cfg(feature = "python")]
mod python_bindings;

pub use buffer::{segment, SampleBuffer, Segment, SegmentationSpec};
pub use config::{AnalysisConfig, FeatureEntry};
pub use error::{ErrorKind, Result, SignalError};
pub use features::{
    compute_features, extract_features, rms_series, FeatureDomain, FeatureKind, FeatureParameter,
    FeatureResult, FeatureSelection, FeatureSpec,
};
pub use filters::{apply_filter, FilterKind, FilterSpec};
pub use spectrum::{
    envelope_spectrum, spectrum, spectrum_range, stft, welch, Band, Spectrogram, Spectrum,
    StftSpec, WelchPsd,
};
pub use table::{ResultTable, SignalTable};
