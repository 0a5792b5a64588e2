//! Description of a single quantum-dot emitter.

use crate::{ error::BlochError, vector::Vec3 };

/// An immutable two-level emitter fixed in space.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct QuantumDot {
    position: Vec3,
    id: usize,
    transition_band: (f64, f64),
    dipole_axis: Vec3,
}

impl QuantumDot {
    /// Create a new dot.
    ///
    /// `transition_band` is the `(lower, upper)` frequency range of the
    /// transition, and `dipole_axis` need not be normalized. Fails if the band
    /// is inverted, any input is non-finite, or the dipole axis has zero
    /// length.
    pub fn new<P, D>(
        position: P,
        id: usize,
        transition_band: (f64, f64),
        dipole_axis: D,
    ) -> Result<Self, BlochError>
    where
        P: Into<Vec3>,
        D: Into<Vec3>,
    {
        let position = position.into();
        if !position.is_finite() {
            return Err(BlochError::InvalidParameter(
                format!("dot {}: non-finite position {:?}", id, position.0)));
        }
        let (lower, upper) = transition_band;
        if !(lower.is_finite() && upper.is_finite() && lower <= upper) {
            return Err(BlochError::InvalidParameter(
                format!("dot {}: bad transition band ({}, {})", id, lower, upper)));
        }
        let dipole = dipole_axis.into();
        let dipole_axis = dipole.normalized()
            .ok_or_else(|| BlochError::InvalidParameter(
                format!("dot {}: degenerate dipole axis {:?}", id, dipole.0)))?;
        Ok(Self { position, id, transition_band, dipole_axis })
    }

    pub fn position(&self) -> Vec3 { self.position }

    pub fn id(&self) -> usize { self.id }

    pub fn transition_band(&self) -> (f64, f64) { self.transition_band }

    /// Unit vector along the transition dipole.
    pub fn dipole_axis(&self) -> Vec3 { self.dipole_axis }

    /// Midpoint of the transition band.
    pub fn center_frequency(&self) -> f64 {
        (self.transition_band.0 + self.transition_band.1) / 2.0
    }

    pub fn bandwidth(&self) -> f64 {
        self.transition_band.1 - self.transition_band.0
    }

    /// Displacement pointing from `self` to `other`.
    pub fn separation(&self, other: &Self) -> Vec3 {
        other.position - self.position
    }
}
