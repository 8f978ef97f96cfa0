//! Windowing helpers for spectral estimation
//!
//! Applies windows to time-domain frames before FFT and extracts centred
//! frames for short-time analysis.

/// Multiply a frame by precomputed coefficients in place
pub fn apply_coefficients_inplace(frame: &mut [f64], window: &[f64]) {
    for (s, w) in frame.iter_mut().zip(window.iter()) {
        *s *= w;
    }
}

/// Extract a tapered frame centred on `center`
///
/// Frame sample `j` is `signal[center - L/2 + j]`; positions falling
/// outside the signal read as zero.
///
/// # Arguments
/// * `signal` - Long signal
/// * `center` - Centre index of the frame
/// * `window` - Taper coefficients, whose length is the frame length L
pub fn extract_windowed_frame(signal: &[f64], center: usize, window: &[f64]) -> Vec<f64> {
    let length = window.len();
    let offset = center as isize - (length / 2) as isize;

    let mut frame: Vec<f64> = (0..length as isize)
        .map(|j| {
            let idx = offset + j;
            if idx >= 0 && (idx as usize) < signal.len() {
                signal[idx as usize]
            } else {
                0.0
            }
        })
        .collect();

    apply_coefficients_inplace(&mut frame, window);
    frame
}

/// Sum of the coefficients (coherent gain times length)
pub fn window_sum(window: &[f64]) -> f64 {
    window.iter().sum()
}

/// Sum of squared coefficients, used for density scaling
pub fn window_power_sum(window: &[f64]) -> f64 {
    window.iter().map(|&w| w * w).sum()
}
