use std::path::Path;

use acoustic_solver::{
    error::InvalidModel,
    fd::{
        config::{
            SimulationConfig,
            SourceConfig,
            StabilityPolicy,
        },
        scheme::TemporalScheme,
    },
    medium::{
        Material,
        MediumModel,
    },
};
use color_eyre::eyre::Error;
use nalgebra::{
    Point2,
    Vector2,
};
use serde::{
    Deserialize,
    Serialize,
};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunConfig {
    pub medium: MediumConfig,

    pub simulation: SimulationConfig,

    #[serde(default)]
    pub parallelization: Parallelization,
}

impl RunConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let toml = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&toml)?)
    }
}

impl Default for RunConfig {
    /// Two layers with a velocity contrast at the center of a 1-D line.
    fn default() -> Self {
        Self {
            medium: MediumConfig::Layered {
                height: default_height(),
                layers: vec![
                    Layer {
                        thickness: 1000,
                        velocity: 1000.0,
                        density: 1.0,
                    },
                    Layer {
                        thickness: 1000,
                        velocity: 1500.0,
                        density: 1.5,
                    },
                ],
            },
            simulation: SimulationConfig {
                points_per_wavelength: 20.0,
                courant_number: 0.5,
                total_time: 10.0,
                source: SourceConfig {
                    frequency: 10.0,
                    amplitude: 1.0,
                    position: Point2::new(100, 0),
                },
                receivers: vec![
                    Point2::new(400, 0),
                    Point2::new(800, 0),
                    Point2::new(1800, 0),
                ],
                spatial_order: 4,
                temporal_scheme: TemporalScheme::default(),
                stability_policy: StabilityPolicy::default(),
            },
            parallelization: Parallelization::default(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MediumConfig {
    Homogeneous {
        size: Vector2<usize>,
        velocity: f64,
        density: f64,
    },

    /// Layers stacked along the x axis. Every layer spans the whole height.
    Layered {
        #[serde(default = "default_height")]
        height: usize,
        layers: Vec<Layer>,
    },
}

impl MediumConfig {
    pub fn build(&self) -> Result<MediumModel, InvalidModel> {
        match self {
            Self::Homogeneous {
                size,
                velocity,
                density,
            } => MediumModel::homogeneous(*size, Material::new(*velocity, *density)),
            Self::Layered { height, layers } => {
                let profile = layers
                    .iter()
                    .flat_map(|layer| {
                        std::iter::repeat_n(
                            Material::new(layer.velocity, layer.density),
                            layer.thickness,
                        )
                    })
                    .collect::<Vec<_>>();

                MediumModel::from_fn(Vector2::new(profile.len(), *height), |_, point| {
                    profile[point.x]
                })
            }
        }
    }
}

fn default_height() -> usize {
    1
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Layer {
    /// in grid cells
    pub thickness: usize,
    pub velocity: f64,
    pub density: f64,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Parallelization {
    #[default]
    SingleThreaded,
    MultiThreaded {
        #[serde(default)]
        num_threads: Option<usize>,
    },
}
