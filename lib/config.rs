//! TOML run configuration.
//!
//! Every section falls back to the two-dot, z-polarized run used by the
//! `two_dot` driver, so an empty file is a valid configuration.

use std::path::Path;
use serde::Deserialize;
use crate::{
    bloch::SystemParams,
    dot::QuantumDot,
    error::ConfigError,
    interaction::{ Propagation, SPEED_OF_LIGHT, Weights },
    pulse::SkewGaussian,
};

/// Top-level run configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimConfig {
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub weights: WeightsConfig,
    #[serde(default)]
    pub pulse: PulseConfig,
    #[serde(default = "default_dots")]
    pub dots: Vec<DotConfig>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            weights: WeightsConfig::default(),
            pulse: PulseConfig::default(),
            dots: default_dots(),
        }
    }
}

/// Numerical parameters.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationConfig {
    #[serde(default = "default_interpolation_order")]
    pub interpolation_order: usize,
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    #[serde(default = "default_preroll")]
    pub preroll: usize,
    /// Integration time step (ps).
    #[serde(default = "default_dt")]
    pub dt: f64,
    /// Field propagation speed (μm/ps).
    #[serde(default = "default_propagation_speed")]
    pub propagation_speed: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            interpolation_order: default_interpolation_order(),
            capacity: default_capacity(),
            preroll: default_preroll(),
            dt: default_dt(),
            propagation_speed: default_propagation_speed(),
        }
    }
}

fn default_interpolation_order() -> usize { 3 }
fn default_capacity() -> usize { 2048 }
fn default_preroll() -> usize { 22 }
fn default_dt() -> f64 { 1e-3 }
fn default_propagation_speed() -> f64 { SPEED_OF_LIGHT }

/// Coupling-model parameters; see [`Weights`].
#[derive(Copy, Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WeightsConfig {
    pub inner_cutoff: f64,
    pub outer_cutoff: f64,
    pub wavenumber: f64,
    pub tolerance: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            inner_cutoff: 18.0,
            outer_cutoff: 22.0,
            wavenumber: 3.15,
            tolerance: 1e-12,
        }
    }
}

/// Drive pulse seeded into the first dot.
#[derive(Copy, Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PulseConfig {
    #[serde(default = "default_amplitude")]
    pub amplitude: f64,
    #[serde(default = "default_skew")]
    pub skew: f64,
    #[serde(default = "default_center")]
    pub center: f64,
    #[serde(default = "default_width")]
    pub width: f64,
}

impl Default for PulseConfig {
    fn default() -> Self {
        let SkewGaussian { amplitude, skew, center, width } = SkewGaussian::default();
        Self { amplitude, skew, center, width }
    }
}

fn default_amplitude() -> f64 { SkewGaussian::default().amplitude }
fn default_skew() -> f64 { SkewGaussian::default().skew }
fn default_center() -> f64 { SkewGaussian::default().center }
fn default_width() -> f64 { SkewGaussian::default().width }

/// A single dot.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DotConfig {
    pub position: [f64; 3],
    pub id: usize,
    #[serde(default = "default_band")]
    pub transition_band: [f64; 2],
    #[serde(default = "default_dipole_axis")]
    pub dipole_axis: [f64; 3],
}

fn default_band() -> [f64; 2] { [10.0, 20.0] }
fn default_dipole_axis() -> [f64; 3] { [0.0, 0.0, 1.0] }

fn default_dots() -> Vec<DotConfig> {
    vec![
        DotConfig {
            position: [0.0, 0.0, 0.0],
            id: 0,
            transition_band: default_band(),
            dipole_axis: default_dipole_axis(),
        },
        DotConfig {
            position: [0.005, 0.005, 0.005],
            id: 1,
            transition_band: default_band(),
            dipole_axis: default_dipole_axis(),
        },
    ]
}

impl SimConfig {
    /// Read and validate a configuration file.
    pub fn load<P>(path: P) -> Result<Self, ConfigError>
    where P: AsRef<Path>
    {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&text)
    }

    /// Parse and validate a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values that serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sim = &self.simulation;
        if sim.interpolation_order == 0 {
            return Err(ConfigError::Invalid(
                "simulation.interpolation_order must be at least 1".into()));
        }
        if sim.capacity == 0 {
            return Err(ConfigError::Invalid(
                "simulation.capacity must be at least 1".into()));
        }
        if self.dots.is_empty() {
            return Err(ConfigError::Invalid("at least one dot is required".into()));
        }
        if !(self.pulse.width > 0.0) {
            return Err(ConfigError::Invalid(
                format!("pulse.width must be positive, got {}", self.pulse.width)));
        }
        self.weights()?;
        self.params()?;
        self.dots()?;
        Ok(())
    }

    pub fn weights(&self) -> Result<Weights, ConfigError> {
        let WeightsConfig { inner_cutoff, outer_cutoff, wavenumber, tolerance }
            = self.weights;
        Ok(Weights::new(inner_cutoff, outer_cutoff, wavenumber, tolerance)?)
    }

    pub fn params(&self) -> Result<SystemParams, ConfigError> {
        let sim = &self.simulation;
        Ok(SystemParams {
            interpolation_order: sim.interpolation_order,
            preroll: sim.preroll,
            capacity: sim.capacity,
            propagation: Propagation::new(sim.propagation_speed, sim.dt)?,
        })
    }

    pub fn dots(&self) -> Result<Vec<QuantumDot>, ConfigError> {
        self.dots.iter()
            .map(|qd| {
                QuantumDot::new(
                    qd.position,
                    qd.id,
                    (qd.transition_band[0], qd.transition_band[1]),
                    qd.dipole_axis,
                )
                .map_err(ConfigError::from)
            })
            .collect()
    }

    pub fn pulse(&self) -> SkewGaussian {
        let PulseConfig { amplitude, skew, center, width } = self.pulse;
        SkewGaussian { amplitude, skew, center, width }
    }
}
