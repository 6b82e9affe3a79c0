/// Time integrator used for the von Neumann analysis and the weighted
/// derivative history of a [`TemporalScheme`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TimeIntegrator {
    Leapfrog2,
    AdamsBashforth3,
    AdamsBashforth4,
}

impl TimeIntegrator {
    pub const ALL: [Self; 3] = [
        Self::Leapfrog2,
        Self::AdamsBashforth3,
        Self::AdamsBashforth4,
    ];

    /// Weights applied to the stored derivatives, newest first.
    ///
    /// These are the staggered Adams-Bashforth weights, i.e. the
    /// derivatives are taken half a step away from where the update is
    /// centered.
    pub fn weights(&self) -> &'static [f64] {
        match self {
            Self::Leapfrog2 => &[1.0],
            Self::AdamsBashforth3 => &[25.0 / 24.0, -1.0 / 12.0, 1.0 / 24.0],
            Self::AdamsBashforth4 => &[13.0 / 12.0, -5.0 / 24.0, 1.0 / 6.0, -1.0 / 24.0],
        }
    }

    pub fn history_len(&self) -> usize {
        self.weights().len()
    }
}

/// Temporal update scheme of the solver.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TemporalScheme {
    /// Second order leapfrog.
    #[default]
    Leapfrog2,

    /// Leapfrog with a third spatial derivative correction, 4th order in
    /// time.
    LaxWendroff4,

    AdamsBashforth3,

    AdamsBashforth4,
}

impl TemporalScheme {
    pub fn order(&self) -> usize {
        match self {
            Self::Leapfrog2 => 2,
            Self::LaxWendroff4 => 4,
            Self::AdamsBashforth3 => 3,
            Self::AdamsBashforth4 => 4,
        }
    }

    /// The integrator whose stability bound applies to this scheme.
    ///
    /// Lax-Wendroff steps like leapfrog, the correction term doesn't widen
    /// the bound.
    pub fn integrator(&self) -> TimeIntegrator {
        match self {
            Self::Leapfrog2 | Self::LaxWendroff4 => TimeIntegrator::Leapfrog2,
            Self::AdamsBashforth3 => TimeIntegrator::AdamsBashforth3,
            Self::AdamsBashforth4 => TimeIntegrator::AdamsBashforth4,
        }
    }

    /// Number of derivative lattices kept per field component.
    pub fn history_len(&self) -> usize {
        match self {
            Self::AdamsBashforth3 | Self::AdamsBashforth4 => self.integrator().history_len(),
            Self::Leapfrog2 | Self::LaxWendroff4 => 0,
        }
    }

    pub fn uses_third_derivative(&self) -> bool {
        matches!(self, Self::LaxWendroff4)
    }
}

#[cfg(test)]
mod tests {
    use crate::fd::scheme::{
        TemporalScheme,
        TimeIntegrator,
    };

    #[test]
    fn it_has_consistent_integrator_weights() {
        // a consistent integrator reproduces a constant derivative
        for integrator in TimeIntegrator::ALL {
            let sum: f64 = integrator.weights().iter().sum();
            assert!((sum - 1.0).abs() < 1e-15, "{integrator:?}");
        }
    }

    #[test]
    fn it_keeps_history_only_for_multistep_schemes() {
        assert_eq!(TemporalScheme::Leapfrog2.history_len(), 0);
        assert_eq!(TemporalScheme::LaxWendroff4.history_len(), 0);
        assert_eq!(TemporalScheme::AdamsBashforth3.history_len(), 3);
        assert_eq!(TemporalScheme::AdamsBashforth4.history_len(), 4);
        assert_eq!(
            TemporalScheme::LaxWendroff4.integrator(),
            TimeIntegrator::Leapfrog2
        );
    }
}
