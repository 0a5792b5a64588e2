//! Lagrange weights for evaluating a uniformly sampled series between samples.
//!
//! Stencils are one-sided: for a target time `τ`, the nodes are the samples
//! at `⌊τ⌋, ⌊τ⌋ - 1, ..., ⌊τ⌋ - p` and the target lies a fraction
//! `x = τ - ⌊τ⌋` of a step *after* the newest node. A stencil therefore never
//! reads a sample later than `⌊τ⌋`, so a lookup at `t - delay` can never see
//! history from after `t`.

use ndarray as nd;
use rustc_hash::FxHashMap as HashMap;
use crate::{ error::BlochError, interaction::InteractionTable };

/// Compute the `order + 1` Lagrange weights for fractional offset `offset`.
///
/// The `k`-th weight multiplies the sample `k` steps before the stencil base:
/// ```text
/// w_k(x) = Π_{m ≠ k} (x + m) / (m - k),  k = 0, ..., p
/// ```
/// An offset of zero gives exactly `[1, 0, ..., 0]`.
pub fn lagrange_weights(offset: f64, order: usize)
    -> Result<nd::Array1<f64>, BlochError>
{
    if !(0.0..1.0).contains(&offset) {
        return Err(BlochError::InvalidOffset(offset));
    }
    if order == 0 {
        return Err(BlochError::InvalidParameter(
            "interpolation order must be at least 1".into()));
    }
    let weights: nd::Array1<f64>
        = (0..=order)
        .map(|k| {
            (0..=order)
                .filter(|m| *m != k)
                .map(|m| (offset + m as f64) / (m as f64 - k as f64))
                .product::<f64>()
        })
        .collect();
    Ok(weights)
}

/// Split a non-negative delay `d` into a whole number of steps `⌈d⌉` and the
/// forward offset `⌈d⌉ - d ∈ [0, 1)` that the stencil is evaluated at.
pub(crate) fn split_delay(delay: f64) -> (usize, f64) {
    let lag = delay.ceil();
    let offset = lag - delay;
    // tiny delays can round to offset == 1.0
    if offset >= 1.0 {
        ((lag - 1.0) as usize, 0.0)
    } else {
        (lag as usize, offset)
    }
}

/// Split a real-valued time `τ` into `⌊τ⌋` and the forward offset
/// `τ - ⌊τ⌋ ∈ [0, 1)`.
pub(crate) fn split_time(time: f64) -> (isize, f64) {
    let base = time.floor();
    let offset = time - base;
    if offset >= 1.0 {
        (base as isize + 1, 0.0)
    } else {
        (base as isize, offset)
    }
}

/// Precomputed lookup for one fixed delay.
#[derive(Clone, Debug, PartialEq)]
pub struct Stencil {
    /// Number of whole steps between the lookup time and the newest sample.
    pub lag: usize,
    /// Weights for samples `lag, lag + 1, ..., lag + p` steps in the past.
    pub weights: nd::Array1<f64>,
}

impl Stencil {
    /// Build the stencil for a delay given in (fractional) time steps.
    pub fn for_delay(delay: f64, order: usize) -> Result<Self, BlochError> {
        if !(delay >= 0.0 && delay.is_finite()) {
            return Err(BlochError::InvalidParameter(
                format!("delay must be finite and non-negative, got {}", delay)));
        }
        let (lag, offset) = split_delay(delay);
        let weights = lagrange_weights(offset, order)?;
        Ok(Self { lag, weights })
    }

    /// Oldest lag touched by the stencil.
    pub fn depth(&self) -> usize { self.lag + self.weights.len() - 1 }
}

/// Fixed-order interpolation weights, cached per ordered dot pair.
///
/// Geometry is static for a run, so every pair's delay (and hence its
/// stencil) is known at construction.
#[derive(Clone, Debug)]
pub struct LagrangeInterpolationSet {
    order: usize,
    stencils: HashMap<(usize, usize), Stencil>,
}

impl LagrangeInterpolationSet {
    /// Compute stencils for every pair in `table`.
    pub fn new(order: usize, table: &InteractionTable)
        -> Result<Self, BlochError>
    {
        if order == 0 {
            return Err(BlochError::InvalidParameter(
                "interpolation order must be at least 1".into()));
        }
        let stencils: HashMap<(usize, usize), Stencil>
            = table.pairs()
            .map(|(s, d)| {
                Stencil::for_delay(table.delay(s, d), order)
                    .map(|stencil| ((s, d), stencil))
            })
            .collect::<Result<_, _>>()?;
        log::debug!(
            "cached {} interpolation stencils of order {}",
            stencils.len(), order,
        );
        Ok(Self { order, stencils })
    }

    pub fn order(&self) -> usize { self.order }

    /// Number of samples read per lookup.
    pub fn width(&self) -> usize { self.order + 1 }

    /// Compute weights for an arbitrary offset at this set's order.
    pub fn weights_for(&self, offset: f64)
        -> Result<nd::Array1<f64>, BlochError>
    {
        lagrange_weights(offset, self.order)
    }

    /// Cached stencil for emission travelling from `src` to `dst`.
    pub fn stencil(&self, src: usize, dst: usize) -> Option<&Stencil> {
        self.stencils.get(&(src, dst))
    }
}
