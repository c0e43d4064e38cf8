//! # Complex Baseband Sample
//!
//! One I/Q sample as a pair of 32-bit floats. The whole signal path uses
//! this single representation; arithmetic is defined here once so no stage
//! reinvents complex math on bare tuples.

use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// A complex baseband sample (in-phase, quadrature).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IqSample {
    pub i: f32,
    pub q: f32,
}

impl IqSample {
    /// Construct from rectangular parts.
    pub fn new(i: f32, q: f32) -> Self {
        Self { i, q }
    }

    /// Unit sample at the given phase in radians.
    pub fn from_phase(phase: f32) -> Self {
        Self {
            i: phase.cos(),
            q: phase.sin(),
        }
    }

    /// Complex conjugate.
    pub fn conj(self) -> Self {
        Self {
            i: self.i,
            q: -self.q,
        }
    }

    /// Squared magnitude.
    pub fn norm_sq(self) -> f32 {
        self.i * self.i + self.q * self.q
    }

    /// Magnitude.
    pub fn abs(self) -> f32 {
        self.norm_sq().sqrt()
    }

    /// Argument in (-pi, pi].
    pub fn arg(self) -> f32 {
        self.q.atan2(self.i)
    }

    /// Scale both components.
    pub fn scale(self, factor: f32) -> Self {
        Self {
            i: self.i * factor,
            q: self.q * factor,
        }
    }
}

impl Add for IqSample {
    type Output = IqSample;
    fn add(self, rhs: IqSample) -> IqSample {
        IqSample::new(self.i + rhs.i, self.q + rhs.q)
    }
}

impl AddAssign for IqSample {
    fn add_assign(&mut self, rhs: IqSample) {
        self.i += rhs.i;
        self.q += rhs.q;
    }
}

impl Sub for IqSample {
    type Output = IqSample;
    fn sub(self, rhs: IqSample) -> IqSample {
        IqSample::new(self.i - rhs.i, self.q - rhs.q)
    }
}

impl Neg for IqSample {
    type Output = IqSample;
    fn neg(self) -> IqSample {
        IqSample::new(-self.i, -self.q)
    }
}

impl Mul for IqSample {
    type Output = IqSample;
    fn mul(self, rhs: IqSample) -> IqSample {
        IqSample::new(
            self.i * rhs.i - self.q * rhs.q,
            self.i * rhs.q + self.q * rhs.i,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn multiply_rotates() {
        let a = IqSample::from_phase(0.3);
        let b = IqSample::from_phase(0.4);
        let c = a * b;
        assert!((c.arg() - 0.7).abs() < 1e-6);
        assert!((c.abs() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn conjugate_negates_phase() {
        let a = IqSample::from_phase(FRAC_PI_2 / 3.0);
        let z = a * a.conj();
        assert!(z.arg().abs() < 1e-6);
        assert!((z.i - 1.0).abs() < 1e-6);
    }

    #[test]
    fn phase_difference_via_conjugate_product() {
        let a = IqSample::from_phase(1.0);
        let b = IqSample::from_phase(1.25);
        let d = (b * a.conj()).arg();
        assert!((d - 0.25).abs() < 1e-6);
    }
}
