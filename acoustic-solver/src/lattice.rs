use std::ops::{
    Index,
    IndexMut,
    Range,
};

use nalgebra::{
    Point2,
    Vector2,
    Vector3,
};

/// Flat storage for one value per grid point.
///
/// The lattice doesn't know its own shape. All point-based access goes
/// through a [`Strider`], which maps points to indices (x fastest).
#[derive(Clone, Debug)]
pub struct Lattice<T> {
    data: Box<[T]>,
}

impl<T> Lattice<T>
where
    T: Default,
{
    pub fn from_default(strider: &Strider) -> Self {
        Self::from_fn(strider, |_, _| Default::default())
    }
}

impl<T> Lattice<T> {
    pub fn from_fn(strider: &Strider, mut init: impl FnMut(usize, Point2<usize>) -> T) -> Self {
        let data = (0..strider.len())
            .map(|index| init(index, strider.from_index_unchecked(index)))
            .collect();
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get_point(&self, strider: &Strider, point: &Point2<usize>) -> Option<&T> {
        let index = strider.to_index(point)?;
        self.data.get(index)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn iter<'a>(
        &'a self,
        strider: &'a Strider,
    ) -> impl Iterator<Item = (usize, Point2<usize>, &'a T)> + 'a {
        self.data
            .iter()
            .enumerate()
            .map(|(index, value)| (index, strider.from_index_unchecked(index), value))
    }

    /// Interior rows as `(y, index of the first interior point, points)`.
    pub fn interior_rows_mut<'a>(
        &'a mut self,
        strider: &Strider,
        interior: &Interior,
    ) -> impl Iterator<Item = (usize, usize, &'a mut [T])> + 'a {
        let row_len = strider.size().x.max(1);
        let columns = interior.x_range();
        let rows = interior.y_range();

        self.data
            .chunks_mut(row_len)
            .enumerate()
            .skip(rows.start)
            .take(rows.len())
            .map(move |(y, row)| (y, y * row_len + columns.start, &mut row[columns.clone()]))
    }

    #[cfg(feature = "rayon")]
    pub fn par_interior_rows_mut<'a>(
        &'a mut self,
        strider: &Strider,
        interior: &Interior,
    ) -> impl rayon::iter::ParallelIterator<Item = (usize, usize, &'a mut [T])> + 'a
    where
        T: Send,
    {
        use rayon::{
            iter::{
                IndexedParallelIterator as _,
                ParallelIterator as _,
            },
            slice::ParallelSliceMut as _,
        };

        let row_len = strider.size().x.max(1);
        let columns = interior.x_range();
        let rows = interior.y_range();

        self.data
            .par_chunks_mut(row_len)
            .enumerate()
            .skip(rows.start)
            .take(rows.len())
            .map(move |(y, row)| (y, y * row_len + columns.start, &mut row[columns.clone()]))
    }
}

impl<T> Index<usize> for Lattice<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        &self.data[index]
    }
}

impl<T> IndexMut<usize> for Lattice<T> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.data[index]
    }
}

/// Maps 2-D grid points to flat lattice indices.
///
/// A 1-D grid is a 2-D grid with `size.y == 1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Strider {
    strides: Vector3<usize>,
    size: Vector2<usize>,
}

impl Strider {
    pub fn new(size: &Vector2<usize>) -> Self {
        Self {
            strides: strides_for_size(size),
            size: *size,
        }
    }

    pub fn from_index(&self, index: usize) -> Option<Point2<usize>> {
        (index < self.strides.z).then(|| self.from_index_unchecked(index))
    }

    fn from_index_unchecked(&self, index: usize) -> Point2<usize> {
        Point2::new(index % self.strides.y, index / self.strides.y)
    }

    fn to_index_unchecked(&self, point: &Point2<usize>) -> usize {
        point.coords.dot(&self.strides.xy())
    }

    pub fn to_index(&self, point: &Point2<usize>) -> Option<usize> {
        self.is_inside(point)
            .then(|| self.to_index_unchecked(point))
    }

    /// Index of the point at `offset` from `point`.
    ///
    /// The caller must make sure the offset point lies inside the grid. The
    /// solver only calls this for interior points, whose stencils never reach
    /// past the margin.
    pub fn offset_index(&self, point: &Point2<usize>, offset: &Vector2<isize>) -> usize {
        let x = point.x as isize + offset.x;
        let y = point.y as isize + offset.y;
        debug_assert!(
            x >= 0 && y >= 0 && (x as usize) < self.size.x && (y as usize) < self.size.y,
            "stencil offset {offset:?} from {point:?} leaves the grid {:?}",
            self.size
        );
        x as usize * self.strides.x + y as usize * self.strides.y
    }

    pub fn size(&self) -> &Vector2<usize> {
        &self.size
    }

    pub fn len(&self) -> usize {
        self.strides.z
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_inside(&self, point: &Point2<usize>) -> bool {
        point.x < self.size.x && point.y < self.size.y
    }
}

pub fn strides_for_size(size: &Vector2<usize>) -> Vector3<usize> {
    let mut strides = Vector3::zeros();
    strides.x = 1;
    strides.y = strides.x * size.x;
    strides.z = strides.y * size.y;
    strides
}

/// Points at least `margin` cells away from the edges of every simulated
/// axis.
///
/// A 1-D grid has no margin along y.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Interior {
    min: Point2<usize>,
    /// exclusive
    max: Point2<usize>,
}

impl Interior {
    pub fn new(size: &Vector2<usize>, margin: usize) -> Self {
        let bounds = |n: usize| {
            let start = margin.min(n);
            (start, n.saturating_sub(margin).max(start))
        };
        let (min_x, max_x) = bounds(size.x);
        let (min_y, max_y) = if size.y == 1 {
            (0, 1)
        }
        else {
            bounds(size.y)
        };

        Self {
            min: Point2::new(min_x, min_y),
            max: Point2::new(max_x, max_y),
        }
    }

    pub fn contains(&self, point: &Point2<usize>) -> bool {
        self.x_range().contains(&point.x) && self.y_range().contains(&point.y)
    }

    pub fn len(&self) -> usize {
        self.x_range().len() * self.y_range().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn x_range(&self) -> Range<usize> {
        self.min.x..self.max.x
    }

    pub fn y_range(&self) -> Range<usize> {
        self.min.y..self.max.y
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::{
        Point2,
        Vector2,
    };

    use crate::lattice::{
        Interior,
        Lattice,
        Strider,
    };

    #[test]
    fn it_maps_points_to_indices_row_major() {
        let strider = Strider::new(&Vector2::new(4, 3));
        assert_eq!(strider.len(), 12);
        assert_eq!(strider.to_index(&Point2::new(0, 0)), Some(0));
        assert_eq!(strider.to_index(&Point2::new(3, 0)), Some(3));
        assert_eq!(strider.to_index(&Point2::new(1, 2)), Some(9));
        assert_eq!(strider.to_index(&Point2::new(4, 0)), None);
        assert_eq!(strider.from_index(9), Some(Point2::new(1, 2)));
        assert_eq!(strider.from_index(12), None);
    }

    #[test]
    fn it_offsets_points() {
        let strider = Strider::new(&Vector2::new(5, 5));
        let point = Point2::new(2, 2);
        assert_eq!(
            strider.offset_index(&point, &Vector2::new(-2, 1)),
            strider.to_index(&Point2::new(0, 3)).unwrap()
        );
    }

    #[test]
    fn it_initializes_every_point() {
        let strider = Strider::new(&Vector2::new(3, 2));
        let lattice = Lattice::from_fn(&strider, |index, point| (index, point));
        for (index, point, value) in lattice.iter(&strider) {
            assert_eq!(*value, (index, point));
        }
        assert_eq!(
            lattice.get_point(&strider, &Point2::new(2, 1)),
            Some(&(5, Point2::new(2, 1)))
        );
    }

    #[test]
    fn it_bounds_the_interior() {
        let interior = Interior::new(&Vector2::new(10, 8), 2);
        assert_eq!(interior.x_range(), 2..8);
        assert_eq!(interior.y_range(), 2..6);
        assert_eq!(interior.len(), 24);
        assert!(interior.contains(&Point2::new(7, 5)));
        assert!(!interior.contains(&Point2::new(8, 5)));

        let line = Interior::new(&Vector2::new(10, 1), 3);
        assert_eq!(line.y_range(), 0..1);
        assert!(line.contains(&Point2::new(3, 0)));

        assert!(Interior::new(&Vector2::new(3, 3), 2).is_empty());
    }

    #[test]
    fn it_yields_interior_rows() {
        let strider = Strider::new(&Vector2::new(5, 4));
        let interior = Interior::new(strider.size(), 1);
        let mut lattice = Lattice::from_fn(&strider, |index, _| index);

        let rows = lattice
            .interior_rows_mut(&strider, &interior)
            .map(|(y, start, row)| (y, start, row.to_vec()))
            .collect::<Vec<_>>();
        assert_eq!(
            rows,
            vec![(1, 6, vec![6, 7, 8]), (2, 11, vec![11, 12, 13])]
        );
    }
}
