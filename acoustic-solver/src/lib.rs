#![warn(clippy::todo, unused_qualifications)]

//! Acoustic wave propagation on staggered finite-difference grids.
//!
//! A [`MediumModel`](medium::MediumModel) and a
//! [`SimulationConfig`](fd::config::SimulationConfig) define a run. The
//! [`WaveFieldSolver`](solver::WaveFieldSolver) steps the pressure and
//! velocity fields and records a [`Seismogram`](seismogram::Seismogram) at the
//! receivers.

pub mod discretization;
pub mod error;
pub mod fd;
pub mod lattice;
pub mod medium;
pub mod seismogram;
pub mod solver;
pub mod source;
pub mod stability;
pub mod stencil;

pub use crate::{
    error::Error,
    solver::{
        WaveFieldSolver,
        simulate,
    },
};
