//! Spectral analysis with FFT

pub mod analysis;
pub mod envelope;
pub mod fft;
pub mod stft;
pub mod welch;
pub mod windowing;

pub use analysis::{spectrum, spectrum_range, Spectrum};
pub use envelope::{envelope_spectrum, hilbert, Band};
pub use fft::FftEngine;
pub use stft::{stft, Spectrogram, StftSpec};
pub use welch::{welch, WelchPsd};
