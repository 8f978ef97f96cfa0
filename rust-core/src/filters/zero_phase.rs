//! Zero-phase (forward-backward) filtering
//!
//! The signal is extended at both ends by odd reflection, filtered forward
//! with steady-state initial conditions, reversed, filtered again and
//! reversed back. Phase shifts of the two passes cancel and the magnitude
//! response is squared.

use super::iir::{Biquad, SosFilter};

/// Default padding length for a cascade: three times the longer of the
/// equivalent transfer-function numerator/denominator
pub fn default_padlen(sections: &[Biquad]) -> usize {
    let order = SosFilter::new(sections.to_vec()).order();
    3 * (order + 1)
}

/// Odd extension: `2*x[0] - x[pad..1]` before, `2*x[n-1] - x[n-2..n-1-pad]` after
fn odd_extend(signal: &[f64], padlen: usize) -> Vec<f64> {
    let n = signal.len();
    let first = signal[0];
    let last = signal[n - 1];

    let mut extended = Vec::with_capacity(n + 2 * padlen);
    extended.extend((1..=padlen).rev().map(|i| 2.0 * first - signal[i]));
    extended.extend_from_slice(signal);
    extended.extend((1..=padlen).map(|i| 2.0 * last - signal[n - 1 - i]));
    extended
}

/// Apply a cascade forward and backward
///
/// Padding is capped at `len - 1` so any signal of two or more samples can
/// be reflected. Callers validate order against length beforehand.
pub fn filtfilt(sections: &[Biquad], signal: &[f64]) -> Vec<f64> {
    if signal.len() < 2 {
        return signal.to_vec();
    }

    let padlen = default_padlen(sections).min(signal.len() - 1);
    let mut work = odd_extend(signal, padlen);

    let mut filter = SosFilter::new(sections.to_vec());

    filter.prime(work[0]);
    filter.process_block_inplace(&mut work);

    work.reverse();
    filter.prime(work[0]);
    filter.process_block_inplace(&mut work);
    work.reverse();

    work[padlen..padlen + signal.len()].to_vec()
}
