use nalgebra::{
    Point2,
    Vector2,
};

use crate::{
    error::InvalidModel,
    lattice::{
        Lattice,
        Strider,
    },
};

/// Acoustic material at a single grid point.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Material {
    /// P-wave velocity
    pub velocity: f64,
    pub density: f64,
}

impl Material {
    pub fn new(velocity: f64, density: f64) -> Self {
        Self { velocity, density }
    }

    /// Bulk modulus `κ = ρ·c²`
    pub fn modulus(&self) -> f64 {
        self.density * self.velocity.powi(2)
    }

    fn is_valid(&self) -> bool {
        self.velocity.is_finite()
            && self.density.is_finite()
            && self.velocity > 0.0
            && self.density > 0.0
    }
}

/// Velocity and density on a 1-D or 2-D grid.
///
/// Immutable once constructed. A 1-D model has `size.y == 1`.
#[derive(Clone, Debug)]
pub struct MediumModel {
    strider: Strider,
    materials: Lattice<Material>,
    min_velocity: f64,
    max_velocity: f64,
}

impl MediumModel {
    /// Creates a model from flat velocity and density samples, x fastest.
    pub fn new(
        size: Vector2<usize>,
        velocity: &[f64],
        density: &[f64],
    ) -> Result<Self, InvalidModel> {
        let expected = size.x * size.y;
        for found in [velocity.len(), density.len()] {
            if found != expected {
                return Err(InvalidModel::SampleCount {
                    size,
                    expected,
                    found,
                });
            }
        }

        Self::from_fn(size, |index, _| Material::new(velocity[index], density[index]))
    }

    /// Creates a model from rows of samples, `rows[y][x]`.
    pub fn from_rows(velocity: &[Vec<f64>], density: &[Vec<f64>]) -> Result<Self, InvalidModel> {
        let velocity_size = rows_size(velocity)?;
        let density_size = rows_size(density)?;
        if velocity_size != density_size {
            return Err(InvalidModel::ShapeMismatch {
                velocity: velocity_size,
                density: density_size,
            });
        }

        Self::from_fn(velocity_size, |_, point| {
            Material::new(velocity[point.y][point.x], density[point.y][point.x])
        })
    }

    /// Creates a 1-D model along x.
    pub fn from_profile(velocity: &[f64], density: &[f64]) -> Result<Self, InvalidModel> {
        if velocity.len() != density.len() {
            return Err(InvalidModel::ShapeMismatch {
                velocity: Vector2::new(velocity.len(), 1),
                density: Vector2::new(density.len(), 1),
            });
        }
        Self::new(Vector2::new(velocity.len(), 1), velocity, density)
    }

    pub fn homogeneous(size: Vector2<usize>, material: Material) -> Result<Self, InvalidModel> {
        Self::from_fn(size, |_, _| material)
    }

    pub fn from_fn(
        size: Vector2<usize>,
        f: impl FnMut(usize, Point2<usize>) -> Material,
    ) -> Result<Self, InvalidModel> {
        let strider = Strider::new(&size);
        if strider.is_empty() {
            return Err(InvalidModel::Empty);
        }

        let materials = Lattice::from_fn(&strider, f);

        let mut min_velocity = f64::INFINITY;
        let mut max_velocity = f64::NEG_INFINITY;
        for (_, point, material) in materials.iter(&strider) {
            if !material.is_valid() {
                return Err(InvalidModel::NonPositive {
                    point,
                    velocity: material.velocity,
                    density: material.density,
                });
            }
            min_velocity = min_velocity.min(material.velocity);
            max_velocity = max_velocity.max(material.velocity);
        }

        Ok(Self {
            strider,
            materials,
            min_velocity,
            max_velocity,
        })
    }

    pub fn size(&self) -> &Vector2<usize> {
        self.strider.size()
    }

    pub fn strider(&self) -> &Strider {
        &self.strider
    }

    /// `true` if the model only extends along x.
    pub fn is_one_dimensional(&self) -> bool {
        self.size().y == 1
    }

    pub fn materials(&self) -> &Lattice<Material> {
        &self.materials
    }

    pub fn material(&self, point: &Point2<usize>) -> Option<&Material> {
        self.materials.get_point(&self.strider, point)
    }

    pub fn min_velocity(&self) -> f64 {
        self.min_velocity
    }

    pub fn max_velocity(&self) -> f64 {
        self.max_velocity
    }
}

fn rows_size(rows: &[Vec<f64>]) -> Result<Vector2<usize>, InvalidModel> {
    let width = rows.first().map_or(0, |row| row.len());
    let size = Vector2::new(width, rows.len());
    for row in rows {
        if row.len() != width {
            return Err(InvalidModel::SampleCount {
                size,
                expected: width,
                found: row.len(),
            });
        }
    }
    Ok(size)
}

#[cfg(test)]
mod tests {
    use nalgebra::{
        Point2,
        Vector2,
    };

    use crate::{
        error::InvalidModel,
        medium::{
            Material,
            MediumModel,
        },
    };

    #[test]
    fn it_derives_modulus_and_velocity_bounds() {
        let velocity = [1500.0, 1500.0, 2500.0, 2500.0];
        let density = [1.0, 1.0, 2.0, 2.0];
        let model = MediumModel::from_profile(&velocity, &density).unwrap();
        assert!(model.is_one_dimensional());
        assert_eq!(model.min_velocity(), 1500.0);
        assert_eq!(model.max_velocity(), 2500.0);

        let material = model.material(&Point2::new(2, 0)).unwrap();
        assert_eq!(material.modulus(), 2.0 * 2500.0 * 2500.0);
    }

    #[test]
    fn it_rejects_non_positive_materials() {
        let result = MediumModel::from_profile(&[1500.0, 0.0, 1500.0], &[1.0, 1.0, 1.0]);
        assert!(matches!(
            result,
            Err(InvalidModel::NonPositive { point, .. }) if point == Point2::new(1, 0)
        ));

        let result = MediumModel::homogeneous(Vector2::new(3, 3), Material::new(1500.0, -1.0));
        assert!(matches!(result, Err(InvalidModel::NonPositive { .. })));
    }

    #[test]
    fn it_rejects_mismatched_grids() {
        let velocity = vec![vec![1500.0; 4]; 3];
        let density = vec![vec![1.0; 3]; 3];
        assert!(matches!(
            MediumModel::from_rows(&velocity, &density),
            Err(InvalidModel::ShapeMismatch { .. })
        ));

        assert!(matches!(
            MediumModel::new(Vector2::new(2, 2), &[1.0; 4], &[1.0; 3]),
            Err(InvalidModel::SampleCount {
                expected: 4,
                found: 3,
                ..
            })
        ));

        assert!(matches!(
            MediumModel::from_profile(&[], &[]),
            Err(InvalidModel::Empty)
        ));
    }

    #[test]
    fn it_reads_rows_y_outer() {
        let velocity = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]];
        let density = vec![vec![1.0; 3]; 2];
        let model = MediumModel::from_rows(&velocity, &density).unwrap();
        assert_eq!(*model.size(), Vector2::new(3, 2));
        assert_eq!(model.material(&Point2::new(1, 1)).unwrap().velocity, 5.0);
    }
}
