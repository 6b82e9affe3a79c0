use nalgebra::{
    Point2,
    Vector2,
};

use crate::fd::scheme::TimeIntegrator;

#[derive(Clone, Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid spatial order {order}: must be an even number of at least 4")]
    InvalidOrder { order: usize },

    #[error("Stencil system for spatial order {order} is singular")]
    SingularStencil { order: usize },

    #[error("Invalid medium model")]
    InvalidModel(#[from] InvalidModel),

    #[error("Invalid total simulation time {total_time}: must be positive")]
    InvalidTime { total_time: f64 },

    #[error("Invalid configuration: {parameter} = {value}")]
    InvalidConfig { parameter: &'static str, value: f64 },

    #[error("Out of range")]
    OutOfRange(#[from] OutOfRange),

    #[error(
        "Courant number {courant_number} exceeds the stability limit {max_courant} for spatial order {spatial_order} with {integrator:?}"
    )]
    StabilityViolation {
        spatial_order: usize,
        integrator: TimeIntegrator,
        courant_number: f64,
        max_courant: f64,
    },

    #[error("Seismogram shapes differ: {expected:?} vs {found:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },
}

#[derive(Clone, Debug, thiserror::Error)]
pub enum InvalidModel {
    #[error("Model has no grid points")]
    Empty,

    #[error("Velocity grid {velocity:?} and density grid {density:?} have different shapes")]
    ShapeMismatch {
        velocity: Vector2<usize>,
        density: Vector2<usize>,
    },

    #[error("Expected {expected} samples for a {size:?} grid, got {found}")]
    SampleCount {
        size: Vector2<usize>,
        expected: usize,
        found: usize,
    },

    #[error("Non-positive material at {point:?}: velocity = {velocity}, density = {density}")]
    NonPositive {
        point: Point2<usize>,
        velocity: f64,
        density: f64,
    },
}

#[derive(Clone, Debug, thiserror::Error)]
pub enum OutOfRange {
    #[error("Point {point:?} is outside of the grid {size:?}")]
    OutsideGrid {
        point: Point2<usize>,
        size: Vector2<usize>,
    },

    #[error("Point {point:?} lies within the unsimulated margin of {margin} cells")]
    InMargin { point: Point2<usize>, margin: usize },

    #[error("Step index {step} is beyond the number of time steps {num_steps}")]
    Step { step: usize, num_steps: usize },

    #[error("Receiver {receiver} doesn't exist, there are {num_receivers} receivers")]
    Receiver {
        receiver: usize,
        num_receivers: usize,
    },
}
