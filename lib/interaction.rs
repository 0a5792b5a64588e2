//! Pairwise propagation delays and retarded dipole-dipole coupling
//! coefficients.
//!
//! For a source dot `s` and a destination dot `d` separated by `r` along unit
//! vector `r̂`, the coupling is the projection of the free-space dyadic
//! Green's function onto the two dipole axes, with the `exp(ikr)` retardation
//! phase removed (retardation is carried explicitly by the delay):
//! ```text
//! η_near = 3 (d̂_d·r̂)(d̂_s·r̂) - d̂_d·d̂_s
//! η_far  = d̂_d·d̂_s - (d̂_d·r̂)(d̂_s·r̂)
//! C(s, d) = [ g(kr) (1/r³ - ik/r²) η_near + (k²/r) η_far ] / 4π
//! ```
//! where `g` switches off the quasi-static term between the inner and outer
//! cutoffs of [`Weights`].

use std::f64::consts::PI;
use itertools::Itertools;
use ndarray as nd;
use num_complex::Complex64 as C64;
use rustc_hash::FxHashSet as HashSet;
use crate::{ dot::QuantumDot, error::BlochError };

/// Vacuum speed of light in μm/ps.
pub const SPEED_OF_LIGHT: f64 = 299.792458;

/// Parameters of the coupling model.
///
/// Cutoffs are given in units of the dimensionless retardation parameter
/// `kr`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Weights {
    /// Below this `kr` the quasi-static (near/intermediate) term is kept in
    /// full.
    pub inner_cutoff: f64,
    /// Above this `kr` the quasi-static term is dropped.
    pub outer_cutoff: f64,
    /// Characteristic wavenumber `k` of the radiated field.
    pub wavenumber: f64,
    /// Separations below this are treated as coincident dots.
    pub tolerance: f64,
}

impl Weights {
    /// Create a new `Weights`, checking that `0 ≤ inner ≤ outer`, `k > 0`, and
    /// `tolerance ≥ 0`.
    pub fn new(
        inner_cutoff: f64,
        outer_cutoff: f64,
        wavenumber: f64,
        tolerance: f64,
    ) -> Result<Self, BlochError>
    {
        if !(0.0 <= inner_cutoff && inner_cutoff <= outer_cutoff) {
            return Err(BlochError::InvalidParameter(format!(
                "cutoffs must satisfy 0 <= inner <= outer, got ({}, {})",
                inner_cutoff, outer_cutoff,
            )));
        }
        if !(wavenumber > 0.0 && wavenumber.is_finite()) {
            return Err(BlochError::InvalidParameter(
                format!("wavenumber must be positive, got {}", wavenumber)));
        }
        if !(tolerance >= 0.0) {
            return Err(BlochError::InvalidParameter(
                format!("tolerance must be non-negative, got {}", tolerance)));
        }
        Ok(Self { inner_cutoff, outer_cutoff, wavenumber, tolerance })
    }

    /// Weight applied to the quasi-static term at retardation parameter `kr`.
    pub fn near_gate(&self, kr: f64) -> f64 {
        if kr <= self.inner_cutoff {
            1.0
        } else if kr >= self.outer_cutoff {
            0.0
        } else {
            let x = (kr - self.inner_cutoff)
                / (self.outer_cutoff - self.inner_cutoff);
            1.0 - x * x * (3.0 - 2.0 * x)
        }
    }

    /// Coupling coefficient for emission by `src` received at `dst`.
    pub fn coefficient(&self, src: &QuantumDot, dst: &QuantumDot, r: f64)
        -> C64
    {
        let rhat = src.separation(dst) * r.recip();
        let ds = src.dipole_axis();
        let dd = dst.dipole_axis();
        let proj = dd.dot(&rhat) * ds.dot(&rhat);
        let parallel = dd.dot(&ds);
        let eta_near = 3.0 * proj - parallel;
        let eta_far = parallel - proj;

        let k = self.wavenumber;
        let near = C64::new(r.powi(-3), -k * r.powi(-2)) * eta_near;
        let far = k * k / r * eta_far;
        (near * self.near_gate(k * r) + far) / (4.0 * PI)
    }
}

/// Conversion from lengths to numbers of time steps.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Propagation {
    /// Field propagation speed, in length per unit time.
    pub speed: f64,
    /// Integration time step.
    pub dt: f64,
}

impl Default for Propagation {
    fn default() -> Self { Self { speed: SPEED_OF_LIGHT, dt: 1e-3 } }
}

impl Propagation {
    pub fn new(speed: f64, dt: f64) -> Result<Self, BlochError> {
        if !(speed > 0.0 && speed.is_finite() && dt > 0.0 && dt.is_finite()) {
            return Err(BlochError::InvalidParameter(format!(
                "propagation speed and time step must be positive, got ({}, {})",
                speed, dt,
            )));
        }
        Ok(Self { speed, dt })
    }

    /// Distance travelled per time step.
    pub fn step_length(&self) -> f64 { self.speed * self.dt }

    /// Travel time across `r`, in (fractional) time steps.
    pub fn delay_steps(&self, r: f64) -> f64 { r / self.step_length() }
}

/// Delays and coupling coefficients for every ordered pair of dots, indexed as
/// `(src, dst)`.
#[derive(Clone, Debug)]
pub struct InteractionTable {
    delays: nd::Array2<f64>,
    coefficients: nd::Array2<C64>,
}

impl InteractionTable {
    /// Compute the table for a set of dots.
    ///
    /// Fails with [`BlochError::DegenerateGeometry`] if any two dots lie
    /// closer than `weights.tolerance`, or [`BlochError::DuplicateDot`] if two
    /// dots share an id.
    pub fn build(
        dots: &[QuantumDot],
        weights: &Weights,
        propagation: &Propagation,
    ) -> Result<Self, BlochError>
    {
        let mut seen: HashSet<usize> = HashSet::default();
        if let Some(dup) = dots.iter().find(|qd| !seen.insert(qd.id())) {
            return Err(BlochError::DuplicateDot(dup.id()));
        }

        let n = dots.len();
        let mut delays: nd::Array2<f64> = nd::Array2::zeros((n, n));
        let mut coefficients: nd::Array2<C64> = nd::Array2::zeros((n, n));
        let pairs
            = dots.iter().enumerate()
            .cartesian_product(dots.iter().enumerate())
            .filter(|((s, _), (d, _))| s != d);
        for ((s, src), (d, dst)) in pairs {
            let r = src.separation(dst).norm();
            if !(r >= weights.tolerance) || r == 0.0 {
                return Err(BlochError::DegenerateGeometry {
                    src: s,
                    dst: d,
                    distance: r,
                    tolerance: weights.tolerance,
                });
            }
            delays[[s, d]] = propagation.delay_steps(r);
            coefficients[[s, d]] = weights.coefficient(src, dst, r);
        }
        let table = Self { delays, coefficients };
        log::debug!(
            "interaction table: {} dots, max delay {:.6} steps",
            n, table.max_delay(),
        );
        Ok(table)
    }

    /// Number of dots covered by the table.
    pub fn len(&self) -> usize { self.delays.nrows() }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Propagation delay from `src` to `dst`, in time steps.
    ///
    /// *Panics* if either index is out of bounds.
    pub fn delay(&self, src: usize, dst: usize) -> f64 { self.delays[[src, dst]] }

    /// Strength with which the past emission of `src` drives `dst`.
    ///
    /// *Panics* if either index is out of bounds.
    pub fn coefficient(&self, src: usize, dst: usize) -> C64 {
        self.coefficients[[src, dst]]
    }

    pub fn delays(&self) -> nd::ArrayView2<'_, f64> { self.delays.view() }

    pub fn coefficients(&self) -> nd::ArrayView2<'_, C64> {
        self.coefficients.view()
    }

    /// Iterate over all ordered pairs `(src, dst)` with `src != dst`.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> {
        let n = self.len();
        (0..n).cartesian_product(0..n).filter(|(s, d)| s != d)
    }

    /// Largest delay in the table, or zero for fewer than two dots.
    pub fn max_delay(&self) -> f64 {
        self.delays.iter().copied().fold(0.0, f64::max)
    }

    /// Smallest pre-roll depth that lets an interpolation stencil of the given
    /// order resolve every delay at step 0.
    ///
    /// Integer delays only read their newest sample, so for them this bound
    /// is not tight.
    pub fn required_preroll(&self, order: usize) -> usize {
        self.max_delay().ceil() as usize + order
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn dot(pos: [f64; 3], id: usize, axis: [f64; 3]) -> QuantumDot {
        QuantumDot::new(pos, id, (10.0, 20.0), axis).unwrap()
    }

    fn weights() -> Weights { Weights::new(18.0, 22.0, 3.15, 1e-12).unwrap() }

    #[test]
    fn delays_scale_with_distance() {
        let dots = [
            dot([0.0, 0.0, 0.0], 0, [0.0, 0.0, 1.0]),
            dot([3.0, 4.0, 0.0], 1, [0.0, 0.0, 1.0]),
            dot([0.0, 0.0, 10.0], 2, [1.0, 0.0, 0.0]),
        ];
        let prop = Propagation::new(2.0, 0.5).unwrap();
        let table = InteractionTable::build(&dots, &weights(), &prop).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.delay(0, 1), 5.0);
        assert_eq!(table.delay(0, 2), 10.0);
        assert_eq!(table.max_delay(), table.delay(1, 2));
        assert_eq!(table.required_preroll(3), 15);
        assert_eq!(table.pairs().count(), 6);
        for (s, d) in table.pairs() {
            assert_eq!(table.delay(s, d), table.delay(d, s));
        }
    }

    #[test]
    fn coincident_dots_are_rejected() {
        let dots = [
            dot([1.0, 1.0, 1.0], 0, [0.0, 0.0, 1.0]),
            dot([1.0, 1.0, 1.0], 1, [0.0, 0.0, 1.0]),
        ];
        let res = InteractionTable::build(&dots, &weights(), &Propagation::default());
        assert!(matches!(res, Err(BlochError::DegenerateGeometry { .. })));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let dots = [
            dot([0.0, 0.0, 0.0], 7, [0.0, 0.0, 1.0]),
            dot([1.0, 0.0, 0.0], 7, [0.0, 0.0, 1.0]),
        ];
        let res = InteractionTable::build(&dots, &weights(), &Propagation::default());
        assert_eq!(res.unwrap_err(), BlochError::DuplicateDot(7));
    }

    #[test]
    fn coefficient_orientation() {
        let w = weights();
        // side-by-side dipoles: η_near = -1, η_far = 1
        let a = dot([0.0, 0.0, 0.0], 0, [0.0, 0.0, 1.0]);
        let b = dot([0.1, 0.0, 0.0], 1, [0.0, 0.0, 1.0]);
        let r: f64 = 0.1;
        let k = w.wavenumber;
        let expected
            = (C64::new(-r.powi(-3), k * r.powi(-2)) + k * k / r) / (4.0 * PI);
        let c = w.coefficient(&a, &b, r);
        assert!((c - expected).norm() < 1e-9 * expected.norm());
        assert_eq!(c, w.coefficient(&b, &a, r));

        // head-to-tail dipoles: η_near = 2, η_far = 0
        let b = dot([0.0, 0.0, 0.1], 1, [0.0, 0.0, 1.0]);
        let expected = C64::new(2.0 * r.powi(-3), -2.0 * k * r.powi(-2)) / (4.0 * PI);
        let c = w.coefficient(&a, &b, r);
        assert!((c - expected).norm() < 1e-9 * expected.norm());

        // orthogonal dipoles along the separation: no coupling
        let b = dot([0.1, 0.0, 0.0], 1, [0.0, 1.0, 0.0]);
        assert!(w.coefficient(&a, &b, r).norm() < 1e-12);
    }

    #[test]
    fn near_gate_is_smooth() {
        let w = weights();
        assert_eq!(w.near_gate(0.0), 1.0);
        assert_eq!(w.near_gate(18.0), 1.0);
        assert_eq!(w.near_gate(20.0), 0.5);
        assert_eq!(w.near_gate(22.0), 0.0);
        assert_eq!(w.near_gate(100.0), 0.0);
    }

    #[test]
    fn bad_weights_are_rejected() {
        assert!(Weights::new(22.0, 18.0, 3.15, 1e-12).is_err());
        assert!(Weights::new(18.0, 22.0, 0.0, 1e-12).is_err());
        assert!(Weights::new(18.0, 22.0, 3.15, -1.0).is_err());
        assert!(Propagation::new(0.0, 1.0).is_err());
    }
}
