use nalgebra::Vector2;

use crate::{
    Error,
    medium::MediumModel,
    seismogram::MAX_SAMPLES,
};

/// Grid spacings below this many points per minimum wavelength are logged as
/// under-resolved.
pub const MIN_POINTS_PER_WAVELENGTH: f64 = 5.0;

/// The highest frequency the source carries, given its peak frequency.
///
/// A Ricker wavelet has negligible energy above twice its peak frequency.
pub fn estimate_max_frequency(peak_frequency: f64) -> f64 {
    2.0 * peak_frequency
}

pub fn estimate_spatial_resolution(
    min_velocity: f64,
    max_frequency: f64,
    points_per_wavelength: f64,
) -> f64 {
    min_velocity / (max_frequency * points_per_wavelength)
}

pub fn estimate_temporal_resolution(
    max_velocity: f64,
    spatial_resolution: f64,
    courant_number: f64,
) -> f64 {
    spatial_resolution / max_velocity * courant_number
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Resolution {
    pub spatial: Vector2<f64>,
    pub temporal: f64,
}

impl Resolution {
    /// Area of one grid cell. For 1-D grids this is just `dx`.
    pub fn cell_area(&self, one_dimensional: bool) -> f64 {
        if one_dimensional {
            self.spatial.x
        }
        else {
            self.spatial.x * self.spatial.y
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    pub const ALL: [Self; 2] = [Self::X, Self::Y];

    pub fn vector_index(&self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
        }
    }

    pub fn other(&self) -> Self {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }

    /// Offset of `distance` cells along this axis.
    pub fn offset(&self, distance: isize) -> Vector2<isize> {
        match self {
            Axis::X => Vector2::new(distance, 0),
            Axis::Y => Vector2::new(0, distance),
        }
    }
}

/// Scalar inputs to [`DiscretizationPlan::build`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DiscretizationParameters {
    /// Peak frequency `f0` of the source
    pub frequency: f64,
    pub points_per_wavelength: f64,
    pub courant_number: f64,
    pub total_time: f64,
}

/// Grid spacing, time step and step count for a model.
#[derive(Clone, Debug, PartialEq)]
pub struct DiscretizationPlan {
    size: Vector2<usize>,
    resolution: Resolution,
    num_steps: usize,
    max_frequency: f64,
    min_wavelength: f64,
    courant_number: f64,
}

impl DiscretizationPlan {
    pub fn build(medium: &MediumModel, parameters: &DiscretizationParameters) -> Result<Self, Error> {
        if !(parameters.total_time.is_finite() && parameters.total_time > 0.0) {
            return Err(Error::InvalidTime {
                total_time: parameters.total_time,
            });
        }
        for (parameter, value) in [
            ("frequency", parameters.frequency),
            ("points_per_wavelength", parameters.points_per_wavelength),
            ("courant_number", parameters.courant_number),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::InvalidConfig { parameter, value });
            }
        }

        let max_frequency = estimate_max_frequency(parameters.frequency);
        let dx = estimate_spatial_resolution(
            medium.min_velocity(),
            max_frequency,
            parameters.points_per_wavelength,
        );
        let dt = estimate_temporal_resolution(medium.max_velocity(), dx, parameters.courant_number);
        let num_steps = (parameters.total_time / dt).ceil();
        if num_steps > MAX_SAMPLES as f64 {
            return Err(Error::InvalidTime {
                total_time: parameters.total_time,
            });
        }
        let num_steps = num_steps as usize;

        let plan = Self {
            size: *medium.size(),
            resolution: Resolution {
                spatial: Vector2::repeat(dx),
                temporal: dt,
            },
            num_steps,
            max_frequency,
            min_wavelength: medium.min_velocity() / max_frequency,
            courant_number: parameters.courant_number,
        };

        tracing::debug!(
            dx,
            dt,
            num_steps,
            extent = ?plan.extent(),
            min_wavelength = plan.min_wavelength,
            points_per_wavelength = plan.points_per_min_wavelength(),
            "discretization"
        );
        if plan.points_per_min_wavelength() < MIN_POINTS_PER_WAVELENGTH {
            tracing::warn!(
                points_per_wavelength = plan.points_per_min_wavelength(),
                "minimum wavelength is under-resolved"
            );
        }

        Ok(plan)
    }

    pub fn size(&self) -> &Vector2<usize> {
        &self.size
    }

    pub fn resolution(&self) -> &Resolution {
        &self.resolution
    }

    pub fn num_steps(&self) -> usize {
        self.num_steps
    }

    pub fn max_frequency(&self) -> f64 {
        self.max_frequency
    }

    pub fn courant_number(&self) -> f64 {
        self.courant_number
    }

    /// Time of step `n`
    pub fn time(&self, step: usize) -> f64 {
        step as f64 * self.resolution.temporal
    }

    pub fn time_samples(&self) -> Vec<f64> {
        (0..self.num_steps).map(|n| self.time(n)).collect()
    }

    pub fn x_coordinates(&self) -> Vec<f64> {
        coordinates(self.size.x, self.resolution.spatial.x)
    }

    pub fn y_coordinates(&self) -> Vec<f64> {
        coordinates(self.size.y, self.resolution.spatial.y)
    }

    /// Physical size of the model.
    pub fn extent(&self) -> Vector2<f64> {
        self.size.cast::<f64>().component_mul(&self.resolution.spatial)
    }

    pub fn min_wavelength(&self) -> f64 {
        self.min_wavelength
    }

    /// Grid points per minimum wavelength actually achieved.
    pub fn points_per_min_wavelength(&self) -> f64 {
        self.min_wavelength / self.resolution.spatial.x
    }
}

fn coordinates(n: usize, spacing: f64) -> Vec<f64> {
    (0..n).map(|k| k as f64 * spacing).collect()
}

#[cfg(test)]
mod tests {
    use nalgebra::Vector2;

    use crate::{
        Error,
        discretization::{
            DiscretizationParameters,
            DiscretizationPlan,
        },
        medium::{
            Material,
            MediumModel,
        },
    };

    fn parameters() -> DiscretizationParameters {
        DiscretizationParameters {
            frequency: 10.0,
            points_per_wavelength: 20.0,
            courant_number: 0.5,
            total_time: 1.0,
        }
    }

    #[test]
    fn it_derives_steps_from_the_velocity_bounds() {
        let velocity: Vec<f64> = (0..100)
            .map(|k| if k < 50 { 1500.0 } else { 3000.0 })
            .collect();
        let density = vec![1.0; 100];
        let medium = MediumModel::from_profile(&velocity, &density).unwrap();
        let plan = DiscretizationPlan::build(&medium, &parameters()).unwrap();

        // dx from the slowest, dt from the fastest velocity
        let dx = 1500.0 / (20.0 * 20.0);
        let dt = dx / 3000.0 * 0.5;
        assert!((plan.resolution().spatial.x - dx).abs() < 1e-12);
        assert!((plan.resolution().temporal - dt).abs() < 1e-15);
        assert_eq!(plan.num_steps(), (1.0 / dt).ceil() as usize);
        assert!(
            plan.resolution().temporal
                <= 0.5 * plan.resolution().spatial.x / 3000.0 * (1.0 + 1e-12)
        );
    }

    #[test]
    fn it_builds_coordinates() {
        let medium =
            MediumModel::homogeneous(Vector2::new(10, 4), Material::new(1500.0, 1.0)).unwrap();
        let plan = DiscretizationPlan::build(&medium, &parameters()).unwrap();

        let x = plan.x_coordinates();
        assert_eq!(x.len(), 10);
        assert!((x[4] - 4.0 * 3.75).abs() < 1e-12);
        assert_eq!(plan.y_coordinates().len(), 4);

        let t = plan.time_samples();
        assert_eq!(t.len(), plan.num_steps());
        assert_eq!(t[0], 0.0);
        assert!((t[10] - 10.0 * 0.00125).abs() < 1e-12);

        assert!((plan.extent().x - 37.5).abs() < 1e-12);
        assert!((plan.min_wavelength() - 75.0).abs() < 1e-12);
        assert!((plan.points_per_min_wavelength() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn it_rejects_non_positive_time() {
        let medium =
            MediumModel::homogeneous(Vector2::new(10, 1), Material::new(1500.0, 1.0)).unwrap();
        for total_time in [0.0, -1.0] {
            let parameters = DiscretizationParameters {
                total_time,
                ..self::parameters()
            };
            assert!(matches!(
                DiscretizationPlan::build(&medium, &parameters),
                Err(Error::InvalidTime { .. })
            ));
        }

        let parameters = DiscretizationParameters {
            total_time: 1e300,
            ..self::parameters()
        };
        assert!(matches!(
            DiscretizationPlan::build(&medium, &parameters),
            Err(Error::InvalidTime { total_time }) if total_time == 1e300
        ));

        let parameters = DiscretizationParameters {
            courant_number: f64::NAN,
            ..self::parameters()
        };
        assert!(matches!(
            DiscretizationPlan::build(&medium, &parameters),
            Err(Error::InvalidConfig {
                parameter: "courant_number",
                ..
            })
        ));
    }
}
