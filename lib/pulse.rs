//! Analytic pulse envelopes used to seed drive histories.

use std::f64::consts::{ PI, SQRT_2 };
use statrs::function::erf::erfc;

/// Normalized skew-normal profile with skewness parameter `alpha`.
///
/// ```text
/// f(t) = exp(-t²/2) / √(2π) · erfc(-α t / √2)
/// ```
/// `alpha = 0` recovers the standard normal density.
pub fn skew_gaussian(alpha: f64, t: f64) -> f64 {
    (-t * t / 2.0).exp() / (2.0 * PI).sqrt() * erfc(-alpha * t / SQRT_2)
}

/// A skewed Gaussian pulse laid out on the step grid.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SkewGaussian {
    pub amplitude: f64,
    /// Skewness parameter.
    pub skew: f64,
    /// Step index of the profile's origin.
    pub center: f64,
    /// Width of the profile, in steps.
    pub width: f64,
}

impl Default for SkewGaussian {
    fn default() -> Self {
        Self { amplitude: 1.0, skew: 5.0, center: 1024.0, width: 256.0 }
    }
}

impl SkewGaussian {
    /// Evaluate the pulse at step `step`.
    pub fn at(&self, step: isize) -> f64 {
        self.amplitude
            * skew_gaussian(self.skew, (step as f64 - self.center) / self.width)
    }
}
