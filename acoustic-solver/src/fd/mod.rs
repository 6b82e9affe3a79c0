//! Staggered-grid finite-difference update of the acoustic wave equation.
//!
//! Pressure lives on the integer grid points, the velocity components `vx`
//! and `vy` half a cell further along their axis. Velocity is half a time step
//! behind pressure. One update advances both by one time step:
//!
//! 1. velocity from the previous velocity and pressure
//! 2. source injection into the previous pressure
//! 3. pressure from the previous pressure and the new velocity

pub mod config;
pub mod scheme;
pub mod threading;
pub mod util;

use nalgebra::{
    Point2,
    Vector2,
};

use crate::{
    Error,
    discretization::{
        Axis,
        DiscretizationPlan,
        Resolution,
    },
    error::OutOfRange,
    fd::{
        scheme::TemporalScheme,
        threading::{
            LatticeForEach,
            SingleThreaded,
        },
        util::{
            DerivativeHistory,
            SwapBuffer,
            SwapBufferIndex,
            UpdateCoefficients,
        },
    },
    lattice::{
        Interior,
        Lattice,
        Strider,
    },
    medium::{
        Material,
        MediumModel,
    },
    stencil::{
        StencilCoefficients,
        THIRD_DERIVATIVE_WEIGHTS,
        backward_difference,
        forward_difference,
    },
};

/// Second difference across the other axis, used by the mixed terms of the
/// Lax-Wendroff correction.
const SECOND_DIFFERENCE_WEIGHTS: [(isize, f64); 3] = [(-1, 1.0), (0, -2.0), (1, 1.0)];

#[derive(Clone, derive_more::Debug)]
pub struct FdSolverInstance<Threading = SingleThreaded> {
    strider: Strider,
    resolution: Resolution,
    margin: usize,
    interior: Interior,
    stencil: StencilCoefficients,
    scheme: TemporalScheme,
    #[debug(ignore)]
    update_coefficients: Lattice<UpdateCoefficients>,
    #[debug(ignore)]
    materials: Lattice<Material>,
    threading: Threading,
}

impl<Threading> FdSolverInstance<Threading> {
    pub fn new(
        medium: &MediumModel,
        plan: &DiscretizationPlan,
        spatial_order: usize,
        scheme: TemporalScheme,
        threading: Threading,
    ) -> Result<Self, Error> {
        let stencil = StencilCoefficients::compute(spatial_order)?;
        let margin = stencil.half_width();
        let strider = *medium.strider();
        let resolution = *plan.resolution();

        let interior = Interior::new(strider.size(), margin);
        let update_coefficients = Lattice::from_fn(&strider, |index, _| {
            UpdateCoefficients::new(&resolution, &medium.materials()[index])
        });

        Ok(Self {
            strider,
            resolution,
            margin,
            interior,
            stencil,
            scheme,
            update_coefficients,
            materials: medium.materials().clone(),
            threading,
        })
    }

    pub fn create_state(&self) -> FdSolverState {
        FdSolverState::new(&self.strider, self.scheme.history_len())
    }

    /// Width of the unsimulated margin along every simulated axis.
    pub fn margin(&self) -> usize {
        self.margin
    }

    pub fn strider(&self) -> &Strider {
        &self.strider
    }

    pub fn resolution(&self) -> &Resolution {
        &self.resolution
    }

    pub fn stencil(&self) -> &StencilCoefficients {
        &self.stencil
    }

    pub fn scheme(&self) -> TemporalScheme {
        self.scheme
    }

    pub fn is_one_dimensional(&self) -> bool {
        self.strider.size().y == 1
    }

    /// Points that are updated. The margin keeps its initial value.
    pub fn interior(&self) -> &Interior {
        &self.interior
    }

    pub fn is_interior(&self, point: &Point2<usize>) -> bool {
        self.interior.contains(point)
    }

    /// Lattice index of a point that can carry a source or receiver.
    pub fn lattice_index(&self, point: &Point2<usize>) -> Result<usize, OutOfRange> {
        let index = self
            .strider
            .to_index(point)
            .ok_or_else(|| {
                OutOfRange::OutsideGrid {
                    point: *point,
                    size: *self.strider.size(),
                }
            })?;

        if self.is_interior(point) {
            Ok(index)
        }
        else {
            Err(OutOfRange::InMargin {
                point: *point,
                margin: self.margin,
            })
        }
    }

    /// Bytes needed for the lattices of a solver.
    pub fn memory_required(size: &Vector2<usize>, scheme: TemporalScheme) -> usize {
        let per_cell = size_of::<UpdateCoefficients>()
            + size_of::<Material>()
            + size_of::<SwapBuffer<f64>>()
            + size_of::<SwapBuffer<Vector2<f64>>>()
            + scheme.history_len()
                * (size_of::<f64>() + size_of::<Vector2<f64>>());
        per_cell * size.x * size.y
    }

    /// `½ Σ (p²/κ + ρ|v|²)` times the cell area.
    pub fn total_energy(&self, state: &FdSolverState) -> f64 {
        let energy: f64 = self
            .materials
            .as_slice()
            .iter()
            .zip(state.pressure().as_slice())
            .zip(state.velocity().as_slice())
            .map(|((material, pressure), velocity)| {
                pressure.powi(2) / material.modulus() + material.density * velocity.norm_squared()
            })
            .sum();
        0.5 * energy * self.resolution.cell_area(self.is_one_dimensional())
    }

    fn axes(&self) -> &'static [Axis] {
        if self.is_one_dimensional() {
            &[Axis::X]
        }
        else {
            &Axis::ALL
        }
    }

    fn sample<T: Copy>(
        &self,
        lattice: &Lattice<T>,
        point: &Point2<usize>,
        offset: Vector2<isize>,
    ) -> T {
        lattice[self.strider.offset_index(point, &offset)]
    }

    /// `∇p` at the velocity points next to `point`.
    fn pressure_gradient(&self, pressure: &Lattice<f64>, point: &Point2<usize>) -> Vector2<f64> {
        let mut gradient = Vector2::zeros();
        for axis in self.axes() {
            let i = axis.vector_index();
            gradient[i] = self
                .stencil
                .forward(|m| self.sample(pressure, point, axis.offset(m)))
                / self.resolution.spatial[i];
        }
        gradient
    }

    /// `∂ₐ∇²p` at the velocity points next to `point`.
    fn pressure_third_derivative(
        &self,
        pressure: &Lattice<f64>,
        point: &Point2<usize>,
    ) -> Vector2<f64> {
        let d = &self.resolution.spatial;
        let mut derivative = Vector2::zeros();

        for axis in self.axes() {
            let i = axis.vector_index();
            let mut value = forward_difference(&THIRD_DERIVATIVE_WEIGHTS, |m| {
                self.sample(pressure, point, axis.offset(m))
            }) / d[i].powi(3);

            if !self.is_one_dimensional() {
                let other = axis.other();
                let j = other.vector_index();
                let mixed: f64 = SECOND_DIFFERENCE_WEIGHTS
                    .iter()
                    .map(|(o, w)| {
                        let across = other.offset(*o);
                        w * (self.sample(pressure, point, across + axis.offset(1))
                            - self.sample(pressure, point, across))
                    })
                    .sum();
                value += mixed / (d[i] * d[j].powi(2));
            }

            derivative[i] = value;
        }

        derivative
    }

    /// `∇·v` at `point`.
    fn velocity_divergence(&self, velocity: &Lattice<Vector2<f64>>, point: &Point2<usize>) -> f64 {
        let mut divergence = 0.0;
        for axis in self.axes() {
            let i = axis.vector_index();
            divergence += self
                .stencil
                .backward(|m| self.sample(velocity, point, axis.offset(m))[i])
                / self.resolution.spatial[i];
        }
        divergence
    }

    /// `∇²(∇·v)` at `point`.
    fn velocity_third_derivative(
        &self,
        velocity: &Lattice<Vector2<f64>>,
        point: &Point2<usize>,
    ) -> f64 {
        let d = &self.resolution.spatial;
        let mut derivative = 0.0;

        for axis in self.axes() {
            let i = axis.vector_index();
            derivative += backward_difference(&THIRD_DERIVATIVE_WEIGHTS, |m| {
                self.sample(velocity, point, axis.offset(m))[i]
            }) / d[i].powi(3);

            if !self.is_one_dimensional() {
                let other = axis.other();
                let j = other.vector_index();
                let mixed: f64 = SECOND_DIFFERENCE_WEIGHTS
                    .iter()
                    .map(|(o, w)| {
                        let across = other.offset(*o);
                        w * (self.sample(velocity, point, across)[i]
                            - self.sample(velocity, point, across + axis.offset(-1))[i])
                    })
                    .sum();
                derivative += mixed / (d[i] * d[j].powi(2));
            }
        }

        derivative
    }
}

impl<Threading> FdSolverInstance<Threading>
where
    Threading: LatticeForEach,
{
    /// Advances the state by one time step.
    ///
    /// `forcing` is added to the pressure at the given lattice index between
    /// the velocity and pressure passes.
    pub fn update(&self, state: &mut FdSolverState, forcing: Option<(usize, f64)>) {
        let previous = SwapBufferIndex::from_tick(state.tick);
        let next = previous.other();

        self.update_velocity(state, previous, next);

        if let Some((index, value)) = forcing {
            state.pressure[previous][index] += value;
        }

        self.update_pressure(state, next);

        state.tick += 1;
    }

    fn update_velocity(
        &self,
        state: &mut FdSolverState,
        previous: SwapBufferIndex,
        next: SwapBufferIndex,
    ) {
        let pressure = &state.pressure[previous];

        if let Some(gradient) = state.pressure_gradient.advance() {
            self.threading.for_each(
                &self.strider,
                &self.interior,
                gradient,
                |_, point, gradient| {
                    *gradient = self.pressure_gradient(pressure, &point);
                },
            );
        }

        let history = state.pressure_gradient.as_slice();
        let weights = self.scheme.integrator().weights();
        let (velocity_next, velocity_previous) = state.velocity.pair_mut(next);
        let velocity_previous = &*velocity_previous;

        self.threading.for_each(
            &self.strider,
            &self.interior,
            velocity_next,
            |index, point, velocity_next| {
                let coefficients = &self.update_coefficients[index];
                let gradient = if history.is_empty() {
                    self.pressure_gradient(pressure, &point)
                }
                else {
                    weighted_sum(weights, history, index)
                };

                let mut update = coefficients.velocity * gradient;
                if self.scheme.uses_third_derivative() {
                    update += coefficients.velocity_correction
                        * self.pressure_third_derivative(pressure, &point);
                }

                *velocity_next = velocity_previous[index] - update;
            },
        );
    }

    fn update_pressure(&self, state: &mut FdSolverState, next: SwapBufferIndex) {
        // note: this is `next`, the velocity was already updated in this step.
        let velocity = &state.velocity[next];

        if let Some(divergence) = state.velocity_divergence.advance() {
            self.threading.for_each(
                &self.strider,
                &self.interior,
                divergence,
                |_, point, divergence| {
                    *divergence = self.velocity_divergence(velocity, &point);
                },
            );
        }

        let history = state.velocity_divergence.as_slice();
        let weights = self.scheme.integrator().weights();
        let (pressure_next, pressure_previous) = state.pressure.pair_mut(next);
        let pressure_previous = &*pressure_previous;

        self.threading.for_each(
            &self.strider,
            &self.interior,
            pressure_next,
            |index, point, pressure_next| {
                let coefficients = &self.update_coefficients[index];
                let divergence = if history.is_empty() {
                    self.velocity_divergence(velocity, &point)
                }
                else {
                    weighted_sum(weights, history, index)
                };

                let mut update = coefficients.pressure * divergence;
                if self.scheme.uses_third_derivative() {
                    update += coefficients.pressure_correction
                        * self.velocity_third_derivative(velocity, &point);
                }

                *pressure_next = pressure_previous[index] - update;
            },
        );
    }
}

fn weighted_sum<T>(weights: &[f64], history: &[Lattice<T>], index: usize) -> T
where
    T: Copy + Default + std::ops::Add<Output = T> + std::ops::Mul<f64, Output = T>,
{
    weights
        .iter()
        .zip(history)
        .fold(T::default(), |sum, (weight, lattice)| {
            sum + lattice[index] * *weight
        })
}

/// Pressure and velocity lattices of a running simulation.
#[derive(Clone, derive_more::Debug)]
pub struct FdSolverState {
    #[debug(ignore)]
    pressure: SwapBuffer<Lattice<f64>>,
    #[debug(ignore)]
    velocity: SwapBuffer<Lattice<Vector2<f64>>>,
    #[debug(ignore)]
    pressure_gradient: DerivativeHistory<Lattice<Vector2<f64>>>,
    #[debug(ignore)]
    velocity_divergence: DerivativeHistory<Lattice<f64>>,
    tick: usize,
}

impl FdSolverState {
    fn new(strider: &Strider, history_len: usize) -> Self {
        Self {
            pressure: SwapBuffer::from_fn(|_| Lattice::from_default(strider)),
            velocity: SwapBuffer::from_fn(|_| Lattice::from_default(strider)),
            pressure_gradient: DerivativeHistory::from_fn(history_len, |_| {
                Lattice::from_default(strider)
            }),
            velocity_divergence: DerivativeHistory::from_fn(history_len, |_| {
                Lattice::from_default(strider)
            }),
            tick: 0,
        }
    }

    pub fn tick(&self) -> usize {
        self.tick
    }

    /// Pressure after the last update.
    pub fn pressure(&self) -> &Lattice<f64> {
        &self.pressure[SwapBufferIndex::from_tick(self.tick)]
    }

    /// Velocity after the last update, half a time step behind the pressure.
    pub fn velocity(&self) -> &Lattice<Vector2<f64>> {
        &self.velocity[SwapBufferIndex::from_tick(self.tick)]
    }
}
