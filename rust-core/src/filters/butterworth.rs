//! Digital Butterworth design via the bilinear transform
//!
//! # Algorithm
//! 1. Analog prototype poles on the unit circle in the left half-plane
//! 2. Pre-warp the normalised cutoff(s) so the digital edges land exactly
//! 3. Transform the prototype to low-pass, high-pass or band-pass
//! 4. Map s-plane zeros/poles to the z-plane with the bilinear transform
//! 5. Group conjugate poles into second-order sections

use num_complex::Complex64;
use std::f64::consts::PI;

use super::iir::Biquad;

/// Bilinear transform constant 2*fs with fs = 2 (normalised frequencies)
const FS2: f64 = 4.0;

/// Imaginary parts below this are treated as real poles
const REAL_TOLERANCE: f64 = 1e-10;

/// Band edges normalised to Nyquist (0 < w < 1)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NormalizedBand {
    LowPass(f64),
    HighPass(f64),
    BandPass(f64, f64),
}

/// Zeros, poles and gain of a filter
#[derive(Debug, Clone)]
struct Zpk {
    zeros: Vec<Complex64>,
    poles: Vec<Complex64>,
    gain: f64,
}

/// Analog Butterworth prototype with cutoff 1 rad/s
fn prototype(order: usize) -> Zpk {
    let n = order as f64;
    let poles = (0..order)
        .map(|k| {
            let m = -(order as f64) + 1.0 + 2.0 * k as f64;
            -Complex64::from_polar(1.0, PI * m / (2.0 * n))
        })
        .collect();

    Zpk {
        zeros: Vec::new(),
        poles,
        gain: 1.0,
    }
}

/// Pre-warp a normalised digital frequency to the analog domain
fn warp(w: f64) -> f64 {
    FS2 * (PI * w / 2.0).tan()
}

fn lowpass(proto: Zpk, wo: f64) -> Zpk {
    let degree = (proto.poles.len() - proto.zeros.len()) as i32;
    Zpk {
        zeros: proto.zeros.iter().map(|z| *z * wo).collect(),
        poles: proto.poles.iter().map(|p| *p * wo).collect(),
        gain: proto.gain * wo.powi(degree),
    }
}

fn highpass(proto: Zpk, wo: f64) -> Zpk {
    let degree = proto.poles.len() - proto.zeros.len();
    let num: Complex64 = proto.zeros.iter().map(|z| -z).product();
    let den: Complex64 = proto.poles.iter().map(|p| -p).product();

    let mut zeros: Vec<Complex64> = proto.zeros.iter().map(|z| Complex64::from(wo) / z).collect();
    zeros.extend(std::iter::repeat(Complex64::new(0.0, 0.0)).take(degree));

    Zpk {
        zeros,
        poles: proto.poles.iter().map(|p| Complex64::from(wo) / p).collect(),
        gain: proto.gain * (num / den).re,
    }
}

fn bandpass(proto: Zpk, wo: f64, bw: f64) -> Zpk {
    let degree = proto.poles.len() - proto.zeros.len();
    let split = |roots: &[Complex64]| -> Vec<Complex64> {
        let scaled: Vec<Complex64> = roots.iter().map(|r| *r * (bw / 2.0)).collect();
        let mut out = Vec::with_capacity(2 * scaled.len());
        for r in &scaled {
            out.push(*r + (*r * *r - wo * wo).sqrt());
        }
        for r in &scaled {
            out.push(*r - (*r * *r - wo * wo).sqrt());
        }
        out
    };

    let mut zeros = split(&proto.zeros);
    zeros.extend(std::iter::repeat(Complex64::new(0.0, 0.0)).take(degree));

    Zpk {
        zeros,
        poles: split(&proto.poles),
        gain: proto.gain * bw.powi(degree as i32),
    }
}

fn bilinear(analog: Zpk) -> Zpk {
    let degree = analog.poles.len() - analog.zeros.len();
    let fs2 = Complex64::from(FS2);
    let map = |r: &Complex64| (fs2 + r) / (fs2 - r);

    let num: Complex64 = analog.zeros.iter().map(|z| fs2 - z).product();
    let den: Complex64 = analog.poles.iter().map(|p| fs2 - p).product();

    let mut zeros: Vec<Complex64> = analog.zeros.iter().map(map).collect();
    zeros.extend(std::iter::repeat(Complex64::new(-1.0, 0.0)).take(degree));

    Zpk {
        zeros,
        poles: analog.poles.iter().map(map).collect(),
        gain: analog.gain * (num / den).re,
    }
}

/// Monic real polynomial coefficients `[1, c1, c2]` from up to two roots
fn quadratic(roots: &[Complex64]) -> [f64; 3] {
    match roots {
        [] => [1.0, 0.0, 0.0],
        [r] => [1.0, -r.re, 0.0],
        [r1, r2, ..] => [1.0, -(r1 + r2).re, (r1 * r2).re],
    }
}

/// Group poles into conjugate pairs (and leftover reals) and pair each group
/// with the same number of zeros
fn to_sections(digital: Zpk) -> Vec<Biquad> {
    let mut complex_poles: Vec<Complex64> = Vec::new();
    let mut real_poles: Vec<Complex64> = Vec::new();
    for p in &digital.poles {
        if p.im > REAL_TOLERANCE {
            complex_poles.push(*p);
        } else if p.im.abs() <= REAL_TOLERANCE {
            real_poles.push(Complex64::new(p.re, 0.0));
        }
    }

    let mut pole_groups: Vec<Vec<Complex64>> = complex_poles
        .iter()
        .map(|p| vec![*p, p.conj()])
        .collect();
    for chunk in real_poles.chunks(2) {
        pole_groups.push(chunk.to_vec());
    }

    // Interleave +1/-1 zeros so band-pass sections get one of each
    let mut positive: Vec<Complex64> = Vec::new();
    let mut negative: Vec<Complex64> = Vec::new();
    for z in &digital.zeros {
        if z.re >= 0.0 {
            positive.push(*z);
        } else {
            negative.push(*z);
        }
    }
    let mut zeros = Vec::with_capacity(digital.zeros.len());
    let mut pos_iter = positive.into_iter();
    let mut neg_iter = negative.into_iter();
    loop {
        let p = pos_iter.next();
        let n = neg_iter.next();
        if p.is_none() && n.is_none() {
            break;
        }
        zeros.extend(p);
        zeros.extend(n);
    }

    let mut zero_iter = zeros.into_iter();
    let mut sections: Vec<Biquad> = pole_groups
        .iter()
        .map(|group| {
            let section_zeros: Vec<Complex64> = zero_iter.by_ref().take(group.len()).collect();
            Biquad::new(quadratic(&section_zeros), quadratic(group))
        })
        .collect();

    if let Some(first) = sections.first_mut() {
        for b in first.b.iter_mut() {
            *b *= digital.gain;
        }
    }

    sections
}

/// Design a digital Butterworth filter as second-order sections
///
/// # Arguments
/// * `order` - Prototype order (band-pass doubles the pole count)
/// * `band` - Cutoff(s) normalised to Nyquist
pub fn design_sections(order: usize, band: NormalizedBand) -> Vec<Biquad> {
    let proto = prototype(order);

    let analog = match band {
        NormalizedBand::LowPass(w) => lowpass(proto, warp(w)),
        NormalizedBand::HighPass(w) => highpass(proto, warp(w)),
        NormalizedBand::BandPass(lo, hi) => {
            let (w_lo, w_hi) = (warp(lo), warp(hi));
            bandpass(proto, (w_lo * w_hi).sqrt(), w_hi - w_lo)
        }
    };

    to_sections(bilinear(analog))
}
