use std::ops::{
    Index,
    IndexMut,
};

use crate::{
    discretization::Resolution,
    medium::Material,
};

/// Buffer holding 2 values.
///
/// One value is the current value, the other one is the value from the
/// previous step. Which one is which depends on the [`SwapBufferIndex`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SwapBuffer<T> {
    buffer: [T; 2],
}

impl<T> SwapBuffer<T> {
    pub fn from_fn(mut f: impl FnMut(SwapBufferIndex) -> T) -> Self {
        Self {
            buffer: std::array::from_fn(|index| f(SwapBufferIndex { index })),
        }
    }

    /// Returns `(self[index], self[index.other()])`.
    pub fn pair_mut(&mut self, index: SwapBufferIndex) -> (&mut T, &mut T) {
        let [first, second] = &mut self.buffer;
        if index.index == 0 {
            (first, second)
        }
        else {
            (second, first)
        }
    }
}

impl<T> Index<SwapBufferIndex> for SwapBuffer<T> {
    type Output = T;

    fn index(&self, index: SwapBufferIndex) -> &Self::Output {
        &self.buffer[index.index]
    }
}

impl<T> IndexMut<SwapBufferIndex> for SwapBuffer<T> {
    fn index_mut(&mut self, index: SwapBufferIndex) -> &mut Self::Output {
        &mut self.buffer[index.index]
    }
}

/// Index into a [`SwapBuffer`].
///
/// This can be derived from the simulation tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SwapBufferIndex {
    index: usize,
}

impl SwapBufferIndex {
    pub fn from_tick(tick: usize) -> Self {
        Self { index: tick % 2 }
    }

    pub fn other(&self) -> Self {
        Self {
            index: (self.index + 1) % 2,
        }
    }
}

/// Ring of derivative lattices for multi-step integrators, newest first.
#[derive(Clone, Debug)]
pub struct DerivativeHistory<T> {
    entries: Vec<T>,
}

impl<T> DerivativeHistory<T> {
    pub fn from_fn(len: usize, f: impl FnMut(usize) -> T) -> Self {
        Self {
            entries: (0..len).map(f).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Makes the oldest entry the newest one and returns it, so it can be
    /// overwritten.
    pub fn advance(&mut self) -> Option<&mut T> {
        if self.entries.is_empty() {
            None
        }
        else {
            self.entries.rotate_right(1);
            self.entries.first_mut()
        }
    }

    /// Entries, newest first.
    pub fn as_slice(&self) -> &[T] {
        &self.entries
    }
}

/// Per-point coefficients of the update equations.
#[derive(Clone, Copy, Debug, Default)]
pub struct UpdateCoefficients {
    /// `Δt / ρ`
    pub velocity: f64,

    /// `κ Δt`
    pub pressure: f64,

    /// `Δt³/24 · κ/ρ²`
    pub velocity_correction: f64,

    /// `Δt³/24 · κ²/ρ`
    pub pressure_correction: f64,
}

impl UpdateCoefficients {
    pub fn new(resolution: &Resolution, material: &Material) -> Self {
        let dt = resolution.temporal;
        let modulus = material.modulus();
        let density = material.density;
        let correction = dt.powi(3) / 24.0;

        Self {
            velocity: dt / density,
            pressure: modulus * dt,
            velocity_correction: correction * modulus / density.powi(2),
            pressure_correction: correction * modulus.powi(2) / density,
        }
    }
}
