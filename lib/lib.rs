//! Retarded dipole-dipole coupling between driven quantum dots.
//!
//! Each dot radiates a field that reaches every other dot after a
//! propagation delay. A [`BlochSystem`] keeps a per-dot history of past
//! samples and, at every step, evaluates each dot's delayed emission at the
//! moment it left its source (interpolating between samples), weights it by a
//! pairwise coupling coefficient, and sums the result into the Rabi frequency
//! seen by every other dot.

pub mod vector;
pub mod error;
pub mod dot;
pub mod interaction;
pub mod lagrange;
pub mod history;
pub mod bloch;
pub mod pulse;
pub mod config;

pub use bloch::{ BlochSystem, Channels, SystemParams };
pub use dot::QuantumDot;
pub use error::{ BlochError, ConfigError };
pub use history::{ HistoryBuffer, Slot };
pub use interaction::{ InteractionTable, Propagation, Weights };
pub use lagrange::{ LagrangeInterpolationSet, Stencil, lagrange_weights };
