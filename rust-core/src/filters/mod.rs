//! Butterworth IIR design and zero-phase filtering

pub mod butterworth;
pub mod design;
pub mod iir;
pub mod windows;
pub mod zero_phase;

pub use butterworth::{design_sections, NormalizedBand};
pub use design::{apply_filter, FilterKind, FilterSpec};
pub use iir::{Biquad, SosFilter};
pub use windows::{generate_window, Symmetry, WindowType};
pub use zero_phase::filtfilt;
