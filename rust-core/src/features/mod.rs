//! Per-segment scalar features and the feature catalog

pub mod catalog;
pub mod spectral;
pub mod temporal;
pub mod types;

pub use catalog::{compute_features, extract_features, rms_series, FeatureSelection};
pub use types::{FeatureDomain, FeatureKind, FeatureParameter, FeatureResult, FeatureSpec};
