//! Window functions for spectral estimation and short-time analysis

use std::f64::consts::PI;

/// Window function types
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WindowType {
    /// Hann window: w[n] = 0.5 - 0.5*cos(2πn/D)
    /// D = M-1 (symmetric) or M (periodic)
    Hann,

    /// Gaussian window: w[n] = exp(-0.5 * ((n - (M-1)/2) / std)²)
    Gaussian {
        /// Standard deviation in samples
        std: f64,
    },

    /// Rectangular window (no tapering)
    Rectangular,
}

/// Whether a window is symmetric or periodic
///
/// Periodic windows are what spectral averaging (Welch) uses; symmetric
/// ones are used for filter design and tapering a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symmetry {
    Symmetric,
    Periodic,
}

/// Generate window coefficients
///
/// # Arguments
/// * `window_type` - Type of window function
/// * `length` - Number of samples (M)
/// * `symmetry` - Symmetric or periodic form
///
/// # Returns
/// Vector of window coefficients w[n] for n = 0..M-1
pub fn generate_window(window_type: WindowType, length: usize, symmetry: Symmetry) -> Vec<f64> {
    if length == 0 {
        return Vec::new();
    }
    if length == 1 {
        return vec![1.0];
    }

    // Periodic form: compute M+1 symmetric points and drop the last
    let extended = match symmetry {
        Symmetry::Symmetric => length,
        Symmetry::Periodic => length + 1,
    };
    let denom = (extended - 1) as f64;

    let mut window = Vec::with_capacity(extended);
    match window_type {
        WindowType::Hann => {
            for n in 0..extended {
                let angle = 2.0 * PI * n as f64 / denom;
                window.push(0.5 - 0.5 * angle.cos());
            }
        }

        WindowType::Gaussian { std } => {
            let center = denom / 2.0;
            for n in 0..extended {
                let x = (n as f64 - center) / std;
                window.push((-0.5 * x * x).exp());
            }
        }

        WindowType::Rectangular => {
            window.resize(extended, 1.0);
        }
    }

    window.truncate(length);
    window
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hann_symmetric_endpoints_and_center() {
        let hann = generate_window(WindowType::Hann, 101, Symmetry::Symmetric);
        assert_eq!(hann.len(), 101);
        assert!(hann[0].abs() < 1e-12);
        assert!(hann[100].abs() < 1e-12);
        assert!((hann[50] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_hann_periodic() {
        // Periodic Hann of length 4: [0, 0.5, 1, 0.5]
        let hann = generate_window(WindowType::Hann, 4, Symmetry::Periodic);
        let expected = [0.0, 0.5, 1.0, 0.5];
        for (w, e) in hann.iter().zip(expected.iter()) {
            assert!((w - e).abs() < 1e-12, "{:?}", hann);
        }
    }

    #[test]
    fn test_gaussian_window() {
        let length = 90;
        let w = generate_window(WindowType::Gaussian { std: 30.0 }, length, Symmetry::Symmetric);
        assert_eq!(w.len(), length);

        // Symmetric around (M-1)/2
        for i in 0..length / 2 {
            assert!((w[i] - w[length - 1 - i]).abs() < 1e-12);
        }

        // Edges sit about 1.5 standard deviations from the centre
        let expected_edge = (-0.5 * (44.5f64 / 30.0).powi(2)).exp();
        assert!((w[0] - expected_edge).abs() < 1e-12);
        assert!(w.iter().all(|&v| v > 0.0 && v <= 1.0));
    }

    #[test]
    fn test_rectangular_window() {
        let window = generate_window(WindowType::Rectangular, 100, Symmetry::Periodic);
        assert_eq!(window.len(), 100);
        assert!(window.iter().all(|&w| w == 1.0));
    }

    #[test]
    fn test_degenerate_lengths() {
        assert!(generate_window(WindowType::Hann, 0, Symmetry::Symmetric).is_empty());
        assert_eq!(generate_window(WindowType::Hann, 1, Symmetry::Periodic), vec![1.0]);
    }
}
