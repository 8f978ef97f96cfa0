//! Cascaded second-order-section (SOS) IIR filter with state management
//!
//! Each section runs in transposed direct form II, which keeps two state
//! values per section and behaves well numerically for low orders.

use num_complex::Complex64;

/// One second-order section, normalised so that `a[0] == 1`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Biquad {
    /// Numerator coefficients b0, b1, b2
    pub b: [f64; 3],

    /// Denominator coefficients 1, a1, a2
    pub a: [f64; 3],
}

impl Biquad {
    pub fn new(b: [f64; 3], a: [f64; 3]) -> Self {
        let a0 = a[0];
        Self {
            b: [b[0] / a0, b[1] / a0, b[2] / a0],
            a: [1.0, a[1] / a0, a[2] / a0],
        }
    }

    /// Gain at DC (z = 1)
    pub fn dc_gain(&self) -> f64 {
        (self.b[0] + self.b[1] + self.b[2]) / (self.a[0] + self.a[1] + self.a[2])
    }

    /// Steady-state delay-line values for a unit step input
    ///
    /// With these as initial state, a constant input of 1 produces a
    /// constant output equal to the DC gain from the first sample.
    pub fn step_state(&self) -> [f64; 2] {
        let g = self.dc_gain();
        let z1 = self.b[2] - self.a[2] * g;
        let z0 = self.b[1] - self.a[1] * g + z1;
        [z0, z1]
    }

    /// Complex response H(e^jω) at normalised angular frequency ω (rad/sample)
    pub fn response(&self, omega: f64) -> Complex64 {
        let z1 = Complex64::from_polar(1.0, -omega);
        let z2 = z1 * z1;
        let num = self.b[0] + self.b[1] * z1 + self.b[2] * z2;
        let den = self.a[0] + self.a[1] * z1 + self.a[2] * z2;
        num / den
    }
}

/// IIR filter built from cascaded biquads, keeping per-section state
#[derive(Debug, Clone)]
pub struct SosFilter {
    sections: Vec<Biquad>,

    /// Delay line per section (transposed direct form II)
    state: Vec<[f64; 2]>,
}

impl SosFilter {
    /// Create a filter with zeroed state
    pub fn new(sections: Vec<Biquad>) -> Self {
        let state = vec![[0.0; 2]; sections.len()];
        Self { sections, state }
    }

    /// Steady-state initial conditions of the whole cascade for a unit step
    ///
    /// Section `k` sees the product of the DC gains of sections `0..k` as
    /// its input level, so its unit-step state is scaled accordingly.
    pub fn step_state(&self) -> Vec<[f64; 2]> {
        let mut scale = 1.0;
        self.sections
            .iter()
            .map(|section| {
                let [z0, z1] = section.step_state();
                let scaled = [z0 * scale, z1 * scale];
                scale *= section.dc_gain();
                scaled
            })
            .collect()
    }

    /// Initialise the delay lines as if `level` had been applied forever
    pub fn prime(&mut self, level: f64) {
        self.state = self
            .step_state()
            .into_iter()
            .map(|[z0, z1]| [z0 * level, z1 * level])
            .collect();
    }

    /// Process a single sample
    #[inline]
    pub fn process_sample(&mut self, input: f64) -> f64 {
        let mut x = input;
        for (section, z) in self.sections.iter().zip(self.state.iter_mut()) {
            let y = section.b[0] * x + z[0];
            z[0] = section.b[1] * x - section.a[1] * y + z[1];
            z[1] = section.b[2] * x - section.a[2] * y;
            x = y;
        }
        x
    }

    /// Process a block of samples
    pub fn process_block(&mut self, input: &[f64]) -> Vec<f64> {
        input.iter().map(|&x| self.process_sample(x)).collect()
    }

    /// Process a block in place
    pub fn process_block_inplace(&mut self, buffer: &mut [f64]) {
        for sample in buffer.iter_mut() {
            *sample = self.process_sample(*sample);
        }
    }

    /// Reset filter state (clear delay lines)
    pub fn reset(&mut self) {
        for z in self.state.iter_mut() {
            *z = [0.0; 2];
        }
    }

    pub fn sections(&self) -> &[Biquad] {
        &self.sections
    }

    /// Filter order (number of poles)
    pub fn order(&self) -> usize {
        self.sections
            .iter()
            .map(|s| if s.a[2] == 0.0 && s.b[2] == 0.0 { 1 } else { 2 })
            .sum()
    }

    /// Complex response of the cascade at normalised angular frequency ω
    pub fn response(&self, omega: f64) -> Complex64 {
        self.sections
            .iter()
            .fold(Complex64::new(1.0, 0.0), |acc, s| acc * s.response(omega))
    }
}
