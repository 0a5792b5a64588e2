//! Time-stepped driver for a set of retarded-coupled quantum dots.
//!
//! A [`BlochSystem`] owns everything one run needs: the dots, the
//! [`InteractionTable`], the cached Lagrange stencils, the [`HistoryBuffer`],
//! the time cursor, and the per-dot Rabi frequencies produced by the latest
//! convolution. Nothing is shared between systems, so independent runs (e.g.
//! parameter sweeps) can coexist.
//!
//! Each step proceeds as
//! 1. [`BlochSystem::convolve_currents`] at `now`, which reads history only;
//! 2. the caller integrates the two-level dynamics with the new Rabi
//!    frequencies and records what it produced into the history;
//! 3. [`BlochSystem::step`] advances `now` by one.
//!
//! [`BlochSystem::run`] packages this loop.

use ndarray as nd;
use num_complex::Complex64 as C64;
use rayon::prelude::*;
use crate::{
    dot::QuantumDot,
    error::BlochError,
    history::{ HistoryBuffer, Slot },
    interaction::{ InteractionTable, Propagation, Weights },
    lagrange::LagrangeInterpolationSet,
};

/// History slots read by the convolution.
///
/// The pump is a boundary condition written straight into each dot's own
/// history and is read undelayed; inter-dot emission lives in a separate slot
/// and is only ever seen through the retarded sum.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Channels {
    /// External drive seen directly by each dot.
    pub drive: Slot,
    /// Emission radiated to the other dots.
    pub source: Slot,
}

impl Default for Channels {
    fn default() -> Self {
        Self { drive: Slot::new(0, 1), source: Slot::new(1, 1) }
    }
}

/// Numerical parameters of a run.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SystemParams {
    /// Order of the Lagrange interpolating polynomial.
    pub interpolation_order: usize,
    /// Number of history steps before time 0.
    pub preroll: usize,
    /// Number of steps the run may take.
    pub capacity: usize,
    pub propagation: Propagation,
}

impl Default for SystemParams {
    fn default() -> Self {
        Self {
            interpolation_order: 3,
            preroll: 22,
            capacity: 2048,
            propagation: Propagation::default(),
        }
    }
}

/// Retarded-interaction engine for a fixed set of dots.
#[derive(Clone, Debug)]
pub struct BlochSystem {
    weights: Weights,
    dots: Vec<QuantumDot>,
    table: InteractionTable,
    lagrange: LagrangeInterpolationSet,
    history: HistoryBuffer,
    channels: Channels,
    now: usize,
    rabi_freqs: nd::Array1<C64>,
}

impl BlochSystem {
    /// Build the interaction table and interpolation stencils for `dots` and
    /// allocate a zeroed history.
    ///
    /// A pre-roll shallower than [`InteractionTable::required_preroll`] is
    /// accepted but logged; the first convolution reaching past it will fail
    /// with [`BlochError::OutOfRange`].
    pub fn new(weights: Weights, dots: Vec<QuantumDot>, params: SystemParams)
        -> Result<Self, BlochError>
    {
        if params.capacity == 0 {
            return Err(BlochError::InvalidParameter(
                "history capacity must be at least 1".into()));
        }
        let table = InteractionTable::build(&dots, &weights, &params.propagation)?;
        let lagrange
            = LagrangeInterpolationSet::new(params.interpolation_order, &table)?;
        let required = table.required_preroll(params.interpolation_order);
        if params.preroll < required {
            log::warn!(
                "pre-roll of {} steps is too short for a max delay of {:.3} \
                steps at order {}; need at least {}",
                params.preroll,
                table.max_delay(),
                params.interpolation_order,
                required,
            );
        }
        let n = dots.len();
        let history = HistoryBuffer::new(n, params.preroll, params.capacity);
        log::info!(
            "bloch system: {} dots, order {}, history [-{}, {})",
            n, params.interpolation_order, params.preroll, params.capacity,
        );
        Ok(Self {
            weights,
            dots,
            table,
            lagrange,
            history,
            channels: Channels::default(),
            now: 0,
            rabi_freqs: nd::Array1::zeros(n),
        })
    }

    /// Use a different pair of drive/source slots.
    pub fn with_channels(mut self, channels: Channels) -> Self {
        self.channels = channels;
        self
    }

    pub fn weights(&self) -> &Weights { &self.weights }

    pub fn dots(&self) -> &[QuantumDot] { &self.dots }

    pub fn table(&self) -> &InteractionTable { &self.table }

    pub fn lagrange(&self) -> &LagrangeInterpolationSet { &self.lagrange }

    pub fn channels(&self) -> Channels { self.channels }

    pub fn history(&self) -> &HistoryBuffer { &self.history }

    /// Mutable access to the history, for seeding and recording samples.
    pub fn history_mut(&mut self) -> &mut HistoryBuffer { &mut self.history }

    /// Current time index.
    pub fn now(&self) -> usize { self.now }

    pub fn capacity(&self) -> usize { self.history.capacity() }

    /// Rabi frequencies from the most recent convolution.
    pub fn rabi_freqs(&self) -> &nd::Array1<C64> { &self.rabi_freqs }

    /// Total field at dot `dst` and time `t`: its own drive plus the retarded
    /// emission of every other dot.
    fn incident_field(&self, dst: usize, t: isize) -> Result<C64, BlochError> {
        let drive = self.history.read(dst, t, self.channels.drive)?;
        let ndots = self.dots.len();
        (0..ndots)
            .filter(|src| *src != dst)
            .try_fold(drive, |acc, src| {
                let stencil = self.lagrange.stencil(src, dst)
                    .ok_or(BlochError::NoSuchDot { dot: src, ndots })?;
                let emitted = self.history.apply_stencil(
                    src,
                    t - stencil.lag as isize,
                    self.channels.source,
                    &stencil.weights,
                )?;
                Ok(acc + self.table.coefficient(src, dst) * emitted)
            })
    }

    /// Compute the Rabi frequency of every dot at time `t`.
    ///
    /// For each dot `i` this is the drive recorded in `i`'s own history at `t`
    /// plus `Σ_{j≠i} C(j, i) h_j(t - τ(j, i))`, where `h_j` is the emission of
    /// `j` interpolated between samples. No history after `t` is read.
    ///
    /// `rabi_freqs` is overwritten only if every dot succeeds; neither `now`
    /// nor the history is modified. Times at or past the capacity fail with
    /// [`BlochError::OutOfRange`].
    pub fn convolve_currents(&mut self, t: usize)
        -> Result<&nd::Array1<C64>, BlochError>
    {
        let range = self.history.time_range();
        let t = isize::try_from(t)
            .ok()
            .filter(|t| range.contains(t))
            .ok_or(BlochError::OutOfRange {
                time: isize::try_from(t).unwrap_or(isize::MAX),
                start: range.start,
                end: range.end,
            })?;
        let this: &Self = self;
        let fields: Vec<C64>
            = (0..this.dots.len()).into_par_iter()
            .map(|i| this.incident_field(i, t))
            .collect::<Result<_, _>>()?;
        self.rabi_freqs.iter_mut().zip(fields)
            .for_each(|(rabi, field)| { *rabi = field; });
        Ok(&self.rabi_freqs)
    }

    /// Advance the time cursor by one step, returning the new value.
    ///
    /// Fails with [`BlochError::CapacityExceeded`] once `now` has reached the
    /// history capacity.
    pub fn step(&mut self) -> Result<usize, BlochError> {
        if self.now >= self.capacity() {
            return Err(BlochError::CapacityExceeded { capacity: self.capacity() });
        }
        self.now += 1;
        log::trace!("now = {}", self.now);
        Ok(self.now)
    }

    /// Run `steps` iterations of convolve, integrate, advance.
    ///
    /// `integrate` receives the current time, the freshly computed Rabi
    /// frequencies, and the history, into which it should record whatever the
    /// two-level dynamics produced.
    pub fn run<F>(&mut self, steps: usize, mut integrate: F)
        -> Result<(), BlochError>
    where F: FnMut(usize, nd::ArrayView1<C64>, &mut HistoryBuffer) -> Result<(), BlochError>
    {
        for _ in 0..steps {
            let t = self.now;
            if t >= self.capacity() {
                return Err(BlochError::CapacityExceeded { capacity: self.capacity() });
            }
            self.convolve_currents(t)?;
            integrate(t, self.rabi_freqs.view(), &mut self.history)?;
            self.step()?;
        }
        Ok(())
    }
}
