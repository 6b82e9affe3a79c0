use nalgebra::Point2;

use crate::lattice::{
    Interior,
    Lattice,
    Strider,
};

/// Defines how a pass of the state update iterates over the interior of the
/// lattice.
///
/// Every point of a pass only reads lattices that aren't written in that
/// pass, so the order of iteration doesn't change the result. Points outside
/// the interior are never visited.
pub trait LatticeForEach: Send + Sync + 'static {
    fn for_each<T, F>(
        &self,
        strider: &Strider,
        interior: &Interior,
        lattice: &mut Lattice<T>,
        f: F,
    )
    where
        T: Send + Sync,
        F: Fn(usize, Point2<usize>, &mut T) + Send + Sync;
}

/// Use single-threading
#[derive(Clone, Copy, Debug, Default)]
pub struct SingleThreaded;

impl LatticeForEach for SingleThreaded {
    fn for_each<T, F>(
        &self,
        strider: &Strider,
        interior: &Interior,
        lattice: &mut Lattice<T>,
        f: F,
    )
    where
        T: Send + Sync,
        F: Fn(usize, Point2<usize>, &mut T) + Send + Sync,
    {
        let x0 = interior.x_range().start;
        for (y, start, row) in lattice.interior_rows_mut(strider, interior) {
            for (offset, value) in row.iter_mut().enumerate() {
                f(start + offset, Point2::new(x0 + offset, y), value);
            }
        }
    }
}

/// Use multi-threading
///
/// Both the rows and the points within a row are distributed over the thread
/// pool.
#[cfg(feature = "rayon")]
#[derive(Clone, Debug)]
pub struct MultiThreaded {
    thread_pool: Option<std::sync::Arc<rayon::ThreadPool>>,
}

#[cfg(feature = "rayon")]
impl LatticeForEach for MultiThreaded {
    fn for_each<T, F>(
        &self,
        strider: &Strider,
        interior: &Interior,
        lattice: &mut Lattice<T>,
        f: F,
    )
    where
        T: Send + Sync,
        F: Fn(usize, Point2<usize>, &mut T) + Send + Sync,
    {
        use rayon::iter::{
            IndexedParallelIterator as _,
            IntoParallelRefMutIterator as _,
            ParallelIterator as _,
        };

        let x0 = interior.x_range().start;
        let mut f = || {
            lattice
                .par_interior_rows_mut(strider, interior)
                .for_each(|(y, start, row)| {
                    row.par_iter_mut().enumerate().for_each(|(offset, value)| {
                        f(start + offset, Point2::new(x0 + offset, y), value)
                    })
                })
        };

        if let Some(thread_pool) = &self.thread_pool {
            thread_pool.install(f);
        }
        else {
            f();
        }
    }
}

#[cfg(feature = "rayon")]
impl MultiThreaded {
    /// Use default number of threads (see [`rayon::current_num_threads`])
    pub fn from_default_thread_pool() -> Self {
        Self { thread_pool: None }
    }

    pub fn from_num_threads(num_threads: usize) -> Result<Self, rayon::ThreadPoolBuildError> {
        Ok(Self {
            thread_pool: Some(std::sync::Arc::new(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(num_threads)
                    .build()?,
            )),
        })
    }

    pub fn num_threads(&self) -> usize {
        self.thread_pool
            .as_ref()
            .map_or_else(rayon::current_num_threads, |thread_pool| {
                thread_pool.current_num_threads()
            })
    }
}

#[cfg(feature = "rayon")]
impl Default for MultiThreaded {
    fn default() -> Self {
        Self::from_default_thread_pool()
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::Vector2;

    use crate::{
        fd::threading::{
            LatticeForEach,
            SingleThreaded,
        },
        lattice::{
            Interior,
            Lattice,
            Strider,
        },
    };

    fn fill(threading: &impl LatticeForEach) -> Lattice<usize> {
        let strider = Strider::new(&Vector2::new(7, 5));
        let interior = Interior::new(strider.size(), 1);
        let mut lattice = Lattice::from_default(&strider);
        threading.for_each(&strider, &interior, &mut lattice, |index, point, value| {
            *value = 1000 + index * 100 + point.x + point.y * 10;
        });
        lattice
    }

    #[test]
    fn it_visits_only_the_interior() {
        let lattice = fill(&SingleThreaded);
        assert_eq!(lattice[8], 1000 + 800 + 1 + 10);
        assert_eq!(lattice[26], 1000 + 2600 + 5 + 30);

        let visited = lattice.as_slice().iter().filter(|value| **value != 0).count();
        assert_eq!(visited, 5 * 3);
        // margin
        assert_eq!(lattice[0], 0);
        assert_eq!(lattice[6], 0);
        assert_eq!(lattice[13], 0);
        assert_eq!(lattice[29], 0);
    }

    #[cfg(feature = "rayon")]
    #[test]
    fn it_matches_single_threading() {
        use crate::fd::threading::MultiThreaded;

        let multi_threaded = MultiThreaded::from_num_threads(3).unwrap();
        assert_eq!(multi_threaded.num_threads(), 3);
        assert_eq!(
            fill(&SingleThreaded).as_slice(),
            fill(&multi_threaded).as_slice()
        );
    }
}
