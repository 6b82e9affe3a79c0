use nalgebra::{
    Point2,
    Vector2,
};

use crate::{
    Error,
    discretization::DiscretizationPlan,
    error::OutOfRange,
    fd::{
        FdSolverInstance,
        FdSolverState,
        config::{
            SimulationConfig,
            StabilityPolicy,
        },
        threading::{
            LatticeForEach,
            SingleThreaded,
        },
    },
    medium::MediumModel,
    seismogram::{
        Seismogram,
        SeismogramRecorder,
    },
    source::SourceWavelet,
    stability::{
        StabilityAnalyzer,
        StabilityReport,
    },
};

/// Runs a simulation from a medium and a configuration.
pub fn simulate(medium: &MediumModel, config: &SimulationConfig) -> Result<Seismogram, Error> {
    let mut solver = WaveFieldSolver::new(medium, config)?;
    solver.run()?;
    Ok(solver.into_seismogram())
}

/// Time stepping of the wave field with source injection and receiver
/// sampling.
#[derive(derive_more::Debug)]
pub struct WaveFieldSolver<Threading = SingleThreaded> {
    instance: FdSolverInstance<Threading>,
    state: FdSolverState,
    plan: DiscretizationPlan,
    stability_report: StabilityReport,
    #[debug(ignore)]
    source_wavelet: SourceWavelet,
    source_index: usize,
    receivers: Vec<usize>,
    #[debug(ignore)]
    recorder: SeismogramRecorder,
}

impl WaveFieldSolver<SingleThreaded> {
    pub fn new(medium: &MediumModel, config: &SimulationConfig) -> Result<Self, Error> {
        Self::with_threading(medium, config, SingleThreaded)
    }
}

impl<Threading> WaveFieldSolver<Threading>
where
    Threading: LatticeForEach,
{
    pub fn with_threading(
        medium: &MediumModel,
        config: &SimulationConfig,
        threading: Threading,
    ) -> Result<Self, Error> {
        let plan = DiscretizationPlan::build(medium, &config.discretization_parameters())?;

        let stability_report = StabilityAnalyzer::default().report(
            config.spatial_order,
            config.temporal_scheme.integrator(),
        )?;
        tracing::info!(
            spatial_order = stability_report.spatial_order,
            integrator = ?stability_report.integrator,
            max_courant = stability_report.max_courant,
            courant_number = config.courant_number,
            "stability limit"
        );
        if let Err(error) = stability_report.check(config.courant_number) {
            match config.stability_policy {
                StabilityPolicy::Warn => tracing::warn!(%error, "running unstable configuration"),
                StabilityPolicy::Deny => return Err(error),
            }
        }

        let instance = FdSolverInstance::new(
            medium,
            &plan,
            config.spatial_order,
            config.temporal_scheme,
            threading,
        )?;

        let source_index = instance.lattice_index(&config.source.position)?;
        let receivers = config
            .receivers
            .iter()
            .map(|receiver| instance.lattice_index(receiver))
            .collect::<Result<Vec<_>, _>>()?;

        let source_wavelet = SourceWavelet::generate(
            config.source.frequency,
            config.source.amplitude,
            &plan.time_samples(),
        );
        let recorder = SeismogramRecorder::new(receivers.len(), plan.num_steps())?;

        tracing::debug!(
            size = ?plan.size(),
            margin = instance.margin(),
            scheme = ?config.temporal_scheme,
            num_receivers = receivers.len(),
            memory_required = FdSolverInstance::<Threading>::memory_required(
                plan.size(),
                config.temporal_scheme
            ),
            "created solver"
        );

        let state = instance.create_state();

        Ok(Self {
            instance,
            state,
            plan,
            stability_report,
            source_wavelet,
            source_index,
            receivers,
            recorder,
        })
    }

    /// Advances the simulation by one time step and records the receivers.
    pub fn step(&mut self) -> Result<(), Error> {
        let step = self.state.tick();
        if step >= self.plan.num_steps() {
            return Err(OutOfRange::Step {
                step,
                num_steps: self.plan.num_steps(),
            }
            .into());
        }

        let forcing = self.source_wavelet.sample(step);
        self.instance
            .update(&mut self.state, Some((self.source_index, forcing)));

        let pressure = self.state.pressure();
        for (receiver, index) in self.receivers.iter().enumerate() {
            self.recorder.record(receiver, step, pressure[*index])?;
        }

        tracing::trace!(step, time = self.plan.time(step), "step");

        Ok(())
    }

    /// Steps until all time steps are done.
    pub fn run(&mut self) -> Result<(), Error> {
        let num_steps = self.plan.num_steps();
        let report_interval = (num_steps / 10).max(1);

        while !self.is_finished() {
            self.step()?;

            let tick = self.tick();
            if tick % report_interval == 0 {
                tracing::debug!(tick, num_steps, "progress");
            }
        }

        Ok(())
    }
}

impl<Threading> WaveFieldSolver<Threading> {
    pub fn is_finished(&self) -> bool {
        self.state.tick() >= self.plan.num_steps()
    }

    /// Number of completed time steps.
    pub fn tick(&self) -> usize {
        self.state.tick()
    }

    /// Simulated time of the current pressure field.
    pub fn time(&self) -> f64 {
        self.plan.time(self.state.tick())
    }

    pub fn num_steps(&self) -> usize {
        self.plan.num_steps()
    }

    pub fn plan(&self) -> &DiscretizationPlan {
        &self.plan
    }

    pub fn stability_report(&self) -> &StabilityReport {
        &self.stability_report
    }

    pub fn margin(&self) -> usize {
        self.instance.margin()
    }

    pub fn source_wavelet(&self) -> &SourceWavelet {
        &self.source_wavelet
    }

    pub fn total_energy(&self) -> f64 {
        self.instance.total_energy(&self.state)
    }

    pub fn pressure_at(&self, point: &Point2<usize>) -> Option<f64> {
        self.state
            .pressure()
            .get_point(self.instance.strider(), point)
            .copied()
    }

    pub fn velocity_at(&self, point: &Point2<usize>) -> Option<Vector2<f64>> {
        self.state
            .velocity()
            .get_point(self.instance.strider(), point)
            .copied()
    }

    /// The whole pressure field, `y` outer and `x` inner.
    pub fn pressure_field(&self) -> &[f64] {
        self.state.pressure().as_slice()
    }

    /// Finishes recording. Steps that weren't run are zero.
    pub fn into_seismogram(self) -> Seismogram {
        self.recorder.finalize()
    }
}
