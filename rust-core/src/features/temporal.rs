//! Time-domain statistics over one segment
//!
//! Inputs are non-empty slices; the catalog checks that before dispatch.

use crate::error::{Result, SignalError};

fn mean(x: &[f64]) -> f64 {
    x.iter().sum::<f64>() / x.len() as f64
}

/// Biased central moments (m2, m3, m4)
fn central_moments(x: &[f64]) -> (f64, f64, f64) {
    let mu = mean(x);
    let n = x.len() as f64;
    let (mut m2, mut m3, mut m4) = (0.0, 0.0, 0.0);
    for &v in x {
        let d = v - mu;
        let d2 = d * d;
        m2 += d2;
        m3 += d2 * d;
        m4 += d2 * d2;
    }
    (m2 / n, m3 / n, m4 / n)
}

pub fn root_mean_squared(x: &[f64]) -> f64 {
    (x.iter().map(|v| v * v).sum::<f64>() / x.len() as f64).sqrt()
}

pub fn peak_value(x: &[f64]) -> f64 {
    x.iter().fold(0.0, |acc: f64, v| acc.max(v.abs()))
}

pub fn variance(x: &[f64]) -> f64 {
    central_moments(x).0
}

pub fn peak_to_peak(x: &[f64]) -> f64 {
    let (lo, hi) = x
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    hi - lo
}

fn ratio(name: &str, numerator: f64, denominator: f64) -> Result<f64> {
    if denominator == 0.0 {
        return Err(SignalError::computation(format!(
            "{name} is undefined for a segment whose denominator is zero"
        )));
    }
    Ok(numerator / denominator)
}

/// Peak over RMS
pub fn crest_factor(x: &[f64]) -> Result<f64> {
    ratio("CrestFactor", peak_value(x), root_mean_squared(x))
}

/// Peak over mean of `sqrt(|x|)`
pub fn clearance_factor(x: &[f64]) -> Result<f64> {
    let denominator = mean(&x.iter().map(|v| v.abs().sqrt()).collect::<Vec<_>>());
    ratio("ClearanceFactor", peak_value(x), denominator)
}

/// Peak over mean absolute value
pub fn impulse_factor(x: &[f64]) -> Result<f64> {
    let denominator = x.iter().map(|v| v.abs()).sum::<f64>() / x.len() as f64;
    ratio("ImpulseFactor", peak_value(x), denominator)
}

/// Fisher (excess) kurtosis from biased moments, 0 for constant input
pub fn kurtosis(x: &[f64]) -> f64 {
    let (m2, _, m4) = central_moments(x);
    if m2 == 0.0 {
        return 0.0;
    }
    m4 / (m2 * m2) - 3.0
}

/// Fisher-Pearson skewness from biased moments, 0 for constant input
pub fn skewness(x: &[f64]) -> f64 {
    let (m2, m3, _) = central_moments(x);
    if m2 == 0.0 {
        return 0.0;
    }
    m3 / m2.powf(1.5)
}

/// Composite Simpson over an odd number of points at unit spacing
fn simpson_odd(y: &[f64]) -> f64 {
    if y.len() < 3 {
        return 0.0;
    }
    let last = y.len() - 1;
    let interior: f64 = y[1..last]
        .iter()
        .enumerate()
        .map(|(i, v)| if i % 2 == 0 { 4.0 * v } else { 2.0 * v })
        .sum();
    (y[0] + interior + y[last]) / 3.0
}

/// Integral of the samples at unit spacing by Simpson's rule
///
/// An even sample count leaves one interval over; the result averages
/// placing the trapezoid on the last interval and on the first.
pub fn line_integral(x: &[f64]) -> f64 {
    let n = x.len();
    if n < 2 {
        return 0.0;
    }
    if n % 2 == 1 {
        return simpson_odd(x);
    }

    let simpson_first = simpson_odd(&x[..n - 1]) + 0.5 * (x[n - 2] + x[n - 1]);
    let simpson_last = 0.5 * (x[0] + x[1]) + simpson_odd(&x[1..]);
    0.5 * (simpson_first + simpson_last)
}

/// Histogram density over `bins` equal-width bins spanning `[min, max]`
///
/// Constant input spans `[v - 0.5, v + 0.5]`. The last bin includes its
/// right edge. Each bin holds `count / (n * width)`.
pub fn histogram_density(x: &[f64], bins: usize) -> Vec<f64> {
    let (mut lo, mut hi) = x
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }

    let width = (hi - lo) / bins as f64;
    let mut counts = vec![0usize; bins];
    for &v in x {
        let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }

    let norm = x.len() as f64 * width;
    counts.into_iter().map(|c| c as f64 / norm).collect()
}

/// Entropy in bits of the amplitude histogram density
///
/// # Errors
/// `InvalidParameter` when `bins` is 0
pub fn shannon_entropy(x: &[f64], bins: usize) -> Result<f64> {
    if bins == 0 {
        return Err(SignalError::invalid("ShannonEntropy bin count must be at least 1"));
    }
    Ok(-histogram_density(x, bins)
        .iter()
        .map(|p| p * (p + f64::EPSILON).log2())
        .sum::<f64>())
}
