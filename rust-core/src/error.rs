//! Error types shared by every stage of the pipeline

use thiserror::Error;

/// Errors returned by the public operations
///
/// Every operation either returns a fully-formed value or exactly one of
/// these; nothing is logged and no partial result is exposed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SignalError {
    /// Out-of-range or inconsistent configuration
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Signal too short for the requested order or window
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    /// Feature name not present in the catalog
    #[error("unknown feature: {0}")]
    UnknownFeature(String),

    /// Mathematically undefined result
    #[error("computation error: {0}")]
    ComputationError(String),

    /// Configuration document could not be parsed
    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Configuration could not be written as TOML
    #[error("configuration error: {0}")]
    ConfigWrite(String),
}

/// Discriminant of [`SignalError`] without the message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidParameter,
    InsufficientData,
    UnknownFeature,
    ComputationError,
    Config,
}

impl SignalError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    pub(crate) fn insufficient(msg: impl Into<String>) -> Self {
        Self::InsufficientData(msg.into())
    }

    pub(crate) fn computation(msg: impl Into<String>) -> Self {
        Self::ComputationError(msg.into())
    }

    /// Kind of this error, for branching without matching on messages
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidParameter(_) => ErrorKind::InvalidParameter,
            Self::InsufficientData(_) => ErrorKind::InsufficientData,
            Self::UnknownFeature(_) => ErrorKind::UnknownFeature,
            Self::ComputationError(_) => ErrorKind::ComputationError,
            Self::Config(_) | Self::ConfigWrite(_) => ErrorKind::Config,
        }
    }
}

impl From<realfft::FftError> for SignalError {
    fn from(err: realfft::FftError) -> Self {
        Self::ComputationError(format!("FFT processing failed: {err}"))
    }
}

impl From<toml::ser::Error> for SignalError {
    fn from(err: toml::ser::Error) -> Self {
        Self::ConfigWrite(err.to_string())
    }
}

impl From<ndarray::ShapeError> for SignalError {
    fn from(err: ndarray::ShapeError) -> Self {
        Self::ComputationError(format!("result shape mismatch: {err}"))
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, SignalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_variant() {
        assert_eq!(SignalError::invalid("x").kind(), ErrorKind::InvalidParameter);
        assert_eq!(SignalError::insufficient("x").kind(), ErrorKind::InsufficientData);
        assert_eq!(
            SignalError::UnknownFeature("Foo".into()).kind(),
            ErrorKind::UnknownFeature
        );
        assert_eq!(SignalError::computation("x").kind(), ErrorKind::ComputationError);
    }

    #[test]
    fn test_toml_write_failure_is_config_kind() {
        let err: SignalError =
            <toml::ser::Error as serde::ser::Error>::custom("unsupported value").into();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(err.to_string().contains("unsupported value"));
    }

    #[test]
    fn test_display_includes_message() {
        let err = SignalError::invalid("cutoff 60 Hz is above Nyquist 50 Hz");
        assert_eq!(
            err.to_string(),
            "invalid parameter: cutoff 60 Hz is above Nyquist 50 Hz"
        );
    }
}
