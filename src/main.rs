#![warn(unused_qualifications)]

pub mod config;
pub mod util;

use std::{
    path::PathBuf,
    time::Instant,
};

use acoustic_solver::{
    fd::{
        FdSolverInstance,
        scheme::TimeIntegrator,
        threading::{
            LatticeForEach,
            SingleThreaded,
        },
    },
    medium::MediumModel,
    solver::WaveFieldSolver,
    stability::StabilityAnalyzer,
};
use clap::{
    Parser,
    Subcommand,
};
use color_eyre::eyre::{
    Error,
    bail,
};
use dotenvy::dotenv;
use nalgebra::Point2;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::{
    config::{
        Parallelization,
        RunConfig,
    },
    util::format_size,
};

fn main() -> Result<(), Error> {
    let _ = dotenv();
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    match args.command {
        Command::Run { config, output } => {
            let config = RunConfig::load(&config)?;
            run(&config, output)?;
        }
        Command::Stability { spatial_order } => {
            let analyzer = StabilityAnalyzer::default();
            for integrator in TimeIntegrator::ALL {
                let max_courant = analyzer.max_courant(spatial_order, integrator)?;
                println!("{integrator:?}: {max_courant:.6}");
            }
        }
        Command::DumpDefaultConfig { output, format } => {
            let config = RunConfig::default();
            let config = match format.as_str() {
                "toml" => toml::to_string_pretty(&config)?,
                "json" => serde_json::to_string_pretty(&config)?,
                _ => bail!("Invalid format: {format}"),
            };
            if let Some(output) = &output {
                std::fs::write(output, &config)?;
            }
            else {
                println!("{config}");
            }
        }
    }

    Ok(())
}

#[derive(Debug, Parser)]
struct Args {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run a simulation and write the seismogram.
    Run {
        config: PathBuf,
        #[clap(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the largest stable Courant number of every time integrator.
    Stability {
        #[clap(short, long, default_value = "4")]
        spatial_order: usize,
    },
    DumpDefaultConfig {
        #[clap(short, long)]
        output: Option<PathBuf>,
        #[clap(short, long, default_value = "toml")]
        format: String,
    },
}

fn run(config: &RunConfig, output: Option<PathBuf>) -> Result<(), Error> {
    let medium = config.medium.build()?;
    tracing::info!(
        size = ?medium.size(),
        min_velocity = medium.min_velocity(),
        max_velocity = medium.max_velocity(),
        "loaded medium"
    );

    match config.parallelization {
        Parallelization::SingleThreaded => run_with(&medium, config, SingleThreaded, output),
        #[cfg(feature = "rayon")]
        Parallelization::MultiThreaded { num_threads } => {
            let threading = match num_threads {
                Some(num_threads) => {
                    acoustic_solver::fd::threading::MultiThreaded::from_num_threads(num_threads)?
                }
                None => acoustic_solver::fd::threading::MultiThreaded::from_default_thread_pool(),
            };
            tracing::info!(num_threads = threading.num_threads(), "multi-threaded");
            run_with(&medium, config, threading, output)
        }
        #[cfg(not(feature = "rayon"))]
        Parallelization::MultiThreaded { .. } => {
            bail!("Multi-threading requires the `rayon` feature")
        }
    }
}

fn run_with<Threading>(
    medium: &MediumModel,
    config: &RunConfig,
    threading: Threading,
    output: Option<PathBuf>,
) -> Result<(), Error>
where
    Threading: LatticeForEach,
{
    let mut solver = WaveFieldSolver::with_threading(medium, &config.simulation, threading)?;

    let plan = solver.plan();
    tracing::info!(
        size = ?plan.size(),
        resolution = ?plan.resolution(),
        num_steps = plan.num_steps(),
        points_per_min_wavelength = plan.points_per_min_wavelength(),
        memory_required = %format_size(FdSolverInstance::<Threading>::memory_required(
            plan.size(),
            config.simulation.temporal_scheme,
        )),
        "discretization"
    );

    let start = Instant::now();
    solver.run()?;
    let elapsed = start.elapsed();

    tracing::info!(
        ?elapsed,
        time = solver.time(),
        energy = solver.total_energy(),
        "finished"
    );

    let time = solver.plan().time_samples();
    let seismogram = solver.into_seismogram();

    for (position, trace) in config.simulation.receivers.iter().zip(seismogram.iter()) {
        let peak = trace.iter().fold(0.0f64, |peak, x| peak.max(x.abs()));
        tracing::info!(?position, peak, "receiver");
    }

    if let Some(output) = &output {
        let traces = SeismogramOutput {
            time,
            receivers: config
                .simulation
                .receivers
                .iter()
                .zip(seismogram.iter())
                .map(|(position, samples)| {
                    ReceiverTrace {
                        position: *position,
                        samples,
                    }
                })
                .collect(),
        };
        std::fs::write(output, serde_json::to_string_pretty(&traces)?)?;
        tracing::info!(?output, "wrote seismogram");
    }

    Ok(())
}

#[derive(Debug, Serialize)]
struct SeismogramOutput<'a> {
    time: Vec<f64>,
    receivers: Vec<ReceiverTrace<'a>>,
}

#[derive(Debug, Serialize)]
struct ReceiverTrace<'a> {
    position: Point2<usize>,
    samples: &'a [f64],
}
