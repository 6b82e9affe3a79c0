use nalgebra::Point2;

use crate::{
    discretization::DiscretizationParameters,
    fd::scheme::TemporalScheme,
};

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimulationConfig {
    pub points_per_wavelength: f64,

    pub courant_number: f64,

    /// Simulated time in seconds
    pub total_time: f64,

    pub source: SourceConfig,

    /// Grid points at which pressure is recorded
    #[cfg_attr(feature = "serde", serde(default))]
    pub receivers: Vec<Point2<usize>>,

    pub spatial_order: usize,

    #[cfg_attr(feature = "serde", serde(default))]
    pub temporal_scheme: TemporalScheme,

    #[cfg_attr(feature = "serde", serde(default))]
    pub stability_policy: StabilityPolicy,
}

impl SimulationConfig {
    pub fn discretization_parameters(&self) -> DiscretizationParameters {
        DiscretizationParameters {
            frequency: self.source.frequency,
            points_per_wavelength: self.points_per_wavelength,
            courant_number: self.courant_number,
            total_time: self.total_time,
        }
    }
}

/// Ricker source at a grid point.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceConfig {
    /// Peak frequency in Hz
    pub frequency: f64,
    pub amplitude: f64,
    pub position: Point2<usize>,
}

/// What to do if the Courant number exceeds the stability limit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StabilityPolicy {
    /// Log a warning and run anyway.
    #[default]
    Warn,

    /// Refuse to create the solver.
    Deny,
}
