//! Per-dot record of past field and current samples.
//!
//! Samples are addressed by `(dot, time, level, component)`, where `time` is
//! the true simulation step and may be negative down to `-preroll`. The
//! negative region holds externally seeded values that satisfy retarded
//! lookups before the first step; it is mapped onto storage by a constant
//! offset so callers never see the layout.

use std::ops::Range;
use ndarray as nd;
use num_complex::Complex64 as C64;
use crate::{
    error::BlochError,
    lagrange::{ LagrangeInterpolationSet, split_time },
};

/// Number of levels stored per sample.
pub const LEVELS: usize = 2;

/// Number of components stored per level.
pub const COMPONENTS: usize = 2;

/// Names a single `(level, component)` entry of a sample.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Slot {
    pub level: usize,
    pub component: usize,
}

impl Slot {
    pub const fn new(level: usize, component: usize) -> Self {
        Self { level, component }
    }
}

impl From<(usize, usize)> for Slot {
    fn from(lc: (usize, usize)) -> Self { Self::new(lc.0, lc.1) }
}

/// Fixed-capacity history for every dot in a system.
#[derive(Clone, Debug)]
pub struct HistoryBuffer {
    preroll: usize,
    capacity: usize,
    data: nd::Array4<C64>,
}

impl HistoryBuffer {
    /// Create a zero-filled buffer spanning times `[-preroll, capacity)`.
    pub fn new(ndots: usize, preroll: usize, capacity: usize) -> Self {
        let data = nd::Array4::zeros((ndots, preroll + capacity, LEVELS, COMPONENTS));
        Self { preroll, capacity, data }
    }

    pub fn ndots(&self) -> usize { self.data.shape()[0] }

    pub fn preroll(&self) -> usize { self.preroll }

    pub fn capacity(&self) -> usize { self.capacity }

    /// Valid time indices.
    pub fn time_range(&self) -> Range<isize> {
        -(self.preroll as isize)..self.capacity as isize
    }

    fn check_slot(&self, dot: usize, slot: Slot) -> Result<(), BlochError> {
        let ndots = self.ndots();
        if dot >= ndots {
            return Err(BlochError::NoSuchDot { dot, ndots });
        }
        if slot.level >= LEVELS || slot.component >= COMPONENTS {
            return Err(BlochError::NoSuchSlot {
                level: slot.level,
                component: slot.component,
            });
        }
        Ok(())
    }

    fn index(&self, dot: usize, time: isize, slot: Slot)
        -> Result<[usize; 4], BlochError>
    {
        self.check_slot(dot, slot)?;
        let range = self.time_range();
        if !range.contains(&time) {
            return Err(BlochError::OutOfRange {
                time,
                start: range.start,
                end: range.end,
            });
        }
        let k = (time + self.preroll as isize) as usize;
        Ok([dot, k, slot.level, slot.component])
    }

    /// Store a sample.
    pub fn record<S>(&mut self, dot: usize, time: isize, slot: S, value: C64)
        -> Result<(), BlochError>
    where S: Into<Slot>
    {
        let idx = self.index(dot, time, slot.into())?;
        self.data[idx] = value;
        Ok(())
    }

    /// Fetch a sample.
    pub fn read<S>(&self, dot: usize, time: isize, slot: S)
        -> Result<C64, BlochError>
    where S: Into<Slot>
    {
        let idx = self.index(dot, time, slot.into())?;
        Ok(self.data[idx])
    }

    /// Weighted sum of the samples at `base`, `base - 1`, and so on, one per
    /// weight.
    ///
    /// Samples with zero weight are skipped. Every other sample is
    /// bounds-checked; a stencil reaching past either end of the buffer fails
    /// instead of being clamped.
    pub fn apply_stencil<S>(
        &self,
        dot: usize,
        base: isize,
        slot: S,
        weights: &nd::Array1<f64>,
    ) -> Result<C64, BlochError>
    where S: Into<Slot>
    {
        let slot = slot.into();
        weights.iter().enumerate()
            .filter(|(_, w)| **w != 0.0)
            .try_fold(C64::from(0.0), |acc, (k, w)| {
                self.read(dot, base - k as isize, slot).map(|h| acc + h * *w)
            })
    }

    /// Evaluate a slot at a real-valued time.
    ///
    /// The time is split into `⌊time⌋` and a forward offset, and the
    /// `order + 1` samples ending at `⌊time⌋` are combined with Lagrange
    /// weights from `lagrange`. Integer times reproduce [`Self::read`]
    /// exactly.
    pub fn interpolate<S>(
        &self,
        dot: usize,
        time: f64,
        slot: S,
        lagrange: &LagrangeInterpolationSet,
    ) -> Result<C64, BlochError>
    where S: Into<Slot>
    {
        if !time.is_finite() {
            return Err(BlochError::InvalidParameter(
                format!("cannot interpolate history at time {}", time)));
        }
        let (base, offset) = split_time(time);
        let weights = lagrange.weights_for(offset)?;
        self.apply_stencil(dot, base, slot, &weights)
    }

    /// Overwrite a slot of one dot over the entire time range with values
    /// computed from the step index.
    pub fn fill_with<S, F>(&mut self, dot: usize, slot: S, mut f: F)
        -> Result<(), BlochError>
    where
        S: Into<Slot>,
        F: FnMut(isize) -> C64,
    {
        let slot = slot.into();
        self.check_slot(dot, slot)?;
        let preroll = self.preroll as isize;
        self.data.slice_mut(nd::s![dot, .., slot.level, slot.component])
            .iter_mut()
            .enumerate()
            .for_each(|(k, h)| { *h = f(k as isize - preroll); });
        Ok(())
    }

    /// Copy out the full time series of one slot of one dot.
    pub fn series<S>(&self, dot: usize, slot: S)
        -> Result<nd::Array1<C64>, BlochError>
    where S: Into<Slot>
    {
        let slot = slot.into();
        self.check_slot(dot, slot)?;
        Ok(self.data.slice(nd::s![dot, .., slot.level, slot.component]).to_owned())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::interaction::{ InteractionTable, Propagation, Weights };

    const SLOT: Slot = Slot::new(1, 1);

    fn lagrange(order: usize) -> LagrangeInterpolationSet {
        let weights = Weights::new(18.0, 22.0, 3.15, 1e-12).unwrap();
        let table = InteractionTable::build(&[], &weights, &Propagation::default())
            .unwrap();
        LagrangeInterpolationSet::new(order, &table).unwrap()
    }

    #[test]
    fn record_and_read() {
        let mut hist = HistoryBuffer::new(2, 4, 16);
        assert_eq!(hist.time_range(), -4..16);
        hist.record(1, -4, SLOT, C64::new(1.0, 2.0)).unwrap();
        hist.record(1, 15, (0, 1), C64::new(3.0, 0.0)).unwrap();
        assert_eq!(hist.read(1, -4, SLOT).unwrap(), C64::new(1.0, 2.0));
        assert_eq!(hist.read(1, 15, (0, 1)).unwrap(), C64::new(3.0, 0.0));
        assert_eq!(hist.read(0, -4, SLOT).unwrap(), C64::from(0.0));
    }

    #[test]
    fn bounds_are_checked() {
        let mut hist = HistoryBuffer::new(2, 4, 16);
        assert_eq!(
            hist.read(0, -5, SLOT),
            Err(BlochError::OutOfRange { time: -5, start: -4, end: 16 }),
        );
        assert_eq!(
            hist.record(0, 16, SLOT, C64::from(1.0)),
            Err(BlochError::OutOfRange { time: 16, start: -4, end: 16 }),
        );
        assert_eq!(
            hist.read(2, 0, SLOT),
            Err(BlochError::NoSuchDot { dot: 2, ndots: 2 }),
        );
        assert_eq!(
            hist.read(0, 0, (2, 0)),
            Err(BlochError::NoSuchSlot { level: 2, component: 0 }),
        );
    }

    #[test]
    fn interpolation_at_integer_times_is_exact() {
        let mut hist = HistoryBuffer::new(1, 8, 32);
        hist.fill_with(0, SLOT, |t| C64::new((t as f64 * 0.37).sin(), t as f64))
            .unwrap();
        let lagrange = lagrange(4);
        for t in -8..32 {
            assert_eq!(
                hist.interpolate(0, t as f64, SLOT, &lagrange).unwrap(),
                hist.read(0, t, SLOT).unwrap(),
            );
        }
    }

    #[test]
    fn integer_time_at_start_of_preroll() {
        let mut hist = HistoryBuffer::new(1, 4, 8);
        hist.record(0, -4, SLOT, C64::from(7.0)).unwrap();
        let lagrange = lagrange(3);
        assert_eq!(hist.interpolate(0, -4.0, SLOT, &lagrange), Ok(C64::from(7.0)));
        assert!(matches!(
            hist.interpolate(0, -3.5, SLOT, &lagrange),
            Err(BlochError::OutOfRange { time: -5, .. }),
        ));
    }

    #[test]
    fn interpolation_tracks_smooth_series() {
        let mut hist = HistoryBuffer::new(1, 8, 32);
        let f = |t: f64| C64::new((0.05 * t).cos(), (0.03 * t).sin());
        hist.fill_with(0, SLOT, |t| f(t as f64)).unwrap();
        let lagrange = lagrange(5);
        for n in 0..100 {
            let t = -2.0 + 0.3 * n as f64;
            let approx = hist.interpolate(0, t, SLOT, &lagrange).unwrap();
            assert!((approx - f(t)).norm() < 1e-6, "t = {}", t);
        }
    }

    #[test]
    fn interpolation_rejects_short_history() {
        let hist = HistoryBuffer::new(1, 2, 8);
        let lagrange = lagrange(3);
        // ⌊-0.5⌋ = -1 needs samples down to -4
        assert_eq!(
            hist.interpolate(0, -0.5, SLOT, &lagrange),
            Err(BlochError::OutOfRange { time: -3, start: -2, end: 8 }),
        );
        assert!(matches!(
            hist.interpolate(0, 8.0, SLOT, &lagrange),
            Err(BlochError::OutOfRange { time: 8, .. }),
        ));
    }

    #[test]
    fn fill_and_series() {
        let mut hist = HistoryBuffer::new(2, 3, 5);
        hist.fill_with(1, SLOT, |t| C64::from(t as f64)).unwrap();
        let series = hist.series(1, SLOT).unwrap();
        assert_eq!(series.len(), 8);
        assert_eq!(series[0], C64::from(-3.0));
        assert_eq!(series[7], C64::from(4.0));
        assert!(hist.series(0, SLOT).unwrap().iter().all(|h| *h == C64::from(0.0)));
        assert!(hist.fill_with(2, SLOT, |_| C64::from(0.0)).is_err());
    }
}
