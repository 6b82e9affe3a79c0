use crate::{
    Error,
    error::OutOfRange,
};

/// Largest number of `f64` samples a single buffer can hold.
pub const MAX_SAMPLES: usize = isize::MAX as usize / size_of::<f64>();

/// Collects receiver samples during a run.
///
/// Storage for all samples is allocated up front. Unrecorded samples are zero.
#[derive(Clone, Debug)]
pub struct SeismogramRecorder {
    num_receivers: usize,
    num_steps: usize,
    samples: Vec<f64>,
}

impl SeismogramRecorder {
    pub fn new(num_receivers: usize, num_steps: usize) -> Result<Self, Error> {
        let num_samples = num_receivers
            .checked_mul(num_steps)
            .filter(|num_samples| *num_samples <= MAX_SAMPLES)
            .ok_or(Error::InvalidConfig {
                parameter: "num_receivers",
                value: num_receivers as f64,
            })?;

        Ok(Self {
            num_receivers,
            num_steps,
            samples: vec![0.0; num_samples],
        })
    }

    pub fn record(&mut self, receiver: usize, step: usize, value: f64) -> Result<(), Error> {
        if receiver >= self.num_receivers {
            return Err(OutOfRange::Receiver {
                receiver,
                num_receivers: self.num_receivers,
            }
            .into());
        }
        if step >= self.num_steps {
            return Err(OutOfRange::Step {
                step,
                num_steps: self.num_steps,
            }
            .into());
        }

        self.samples[receiver * self.num_steps + step] = value;
        Ok(())
    }

    pub fn num_receivers(&self) -> usize {
        self.num_receivers
    }

    pub fn num_steps(&self) -> usize {
        self.num_steps
    }

    pub fn finalize(self) -> Seismogram {
        Seismogram {
            num_receivers: self.num_receivers,
            num_steps: self.num_steps,
            samples: self.samples,
        }
    }
}

/// Recorded traces, one per receiver, each `num_steps` samples long.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Seismogram {
    num_receivers: usize,
    num_steps: usize,
    samples: Vec<f64>,
}

impl Seismogram {
    pub fn num_receivers(&self) -> usize {
        self.num_receivers
    }

    pub fn num_steps(&self) -> usize {
        self.num_steps
    }

    /// `(num_receivers, num_steps)`
    pub fn shape(&self) -> (usize, usize) {
        (self.num_receivers, self.num_steps)
    }

    pub fn trace(&self, receiver: usize) -> Option<&[f64]> {
        (receiver < self.num_receivers).then(|| {
            let start = receiver * self.num_steps;
            &self.samples[start..start + self.num_steps]
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &[f64]> {
        (0..self.num_receivers).map(|receiver| {
            let start = receiver * self.num_steps;
            &self.samples[start..start + self.num_steps]
        })
    }

    /// All samples, receiver-major.
    pub fn to_row_major(&self) -> &[f64] {
        &self.samples
    }

    pub fn peak_amplitude(&self) -> f64 {
        self.samples.iter().fold(0.0f64, |peak, x| peak.max(x.abs()))
    }

    /// Root mean square of the sample-wise difference.
    pub fn rms_difference(&self, other: &Seismogram) -> Result<f64, Error> {
        self.check_shape(other)?;
        if self.samples.is_empty() {
            return Ok(0.0);
        }
        let sum: f64 = self
            .samples
            .iter()
            .zip(&other.samples)
            .map(|(a, b)| (a - b).powi(2))
            .sum();
        Ok((sum / self.samples.len() as f64).sqrt())
    }

    pub fn max_abs_difference(&self, other: &Seismogram) -> Result<f64, Error> {
        self.check_shape(other)?;
        Ok(self
            .samples
            .iter()
            .zip(&other.samples)
            .fold(0.0f64, |max, (a, b)| max.max((a - b).abs())))
    }

    fn check_shape(&self, other: &Seismogram) -> Result<(), Error> {
        if self.shape() == other.shape() {
            Ok(())
        }
        else {
            Err(Error::ShapeMismatch {
                expected: self.shape(),
                found: other.shape(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        Error,
        error::OutOfRange,
        seismogram::SeismogramRecorder,
    };

    #[test]
    fn it_records_traces_by_receiver() {
        let mut recorder = SeismogramRecorder::new(2, 3).unwrap();
        recorder.record(0, 0, 1.0).unwrap();
        recorder.record(1, 2, -4.0).unwrap();
        let seismogram = recorder.finalize();

        assert_eq!(seismogram.shape(), (2, 3));
        assert_eq!(seismogram.trace(0), Some(&[1.0, 0.0, 0.0][..]));
        assert_eq!(seismogram.trace(1), Some(&[0.0, 0.0, -4.0][..]));
        assert_eq!(seismogram.trace(2), None);
        assert_eq!(seismogram.iter().count(), 2);
        assert_eq!(seismogram.peak_amplitude(), 4.0);
    }

    #[test]
    fn it_rejects_out_of_range_samples() {
        let mut recorder = SeismogramRecorder::new(2, 3).unwrap();
        assert!(matches!(
            recorder.record(0, 3, 1.0),
            Err(Error::OutOfRange(OutOfRange::Step {
                step: 3,
                num_steps: 3
            }))
        ));
        assert!(matches!(
            recorder.record(2, 0, 1.0),
            Err(Error::OutOfRange(OutOfRange::Receiver { receiver: 2, .. }))
        ));
    }

    #[test]
    fn it_compares_seismograms() {
        let mut a = SeismogramRecorder::new(1, 4).unwrap();
        let mut b = SeismogramRecorder::new(1, 4).unwrap();
        for (step, value) in [1.0, 2.0, 3.0, 4.0].into_iter().enumerate() {
            a.record(0, step, value).unwrap();
            b.record(0, step, value + if step == 1 { 2.0 } else { 0.0 })
                .unwrap();
        }
        let (a, b) = (a.finalize(), b.finalize());

        assert_eq!(a.rms_difference(&a).unwrap(), 0.0);
        assert!((a.rms_difference(&b).unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(a.max_abs_difference(&b).unwrap(), 2.0);

        let c = SeismogramRecorder::new(2, 4).unwrap().finalize();
        assert!(matches!(
            a.rms_difference(&c),
            Err(Error::ShapeMismatch {
                expected: (1, 4),
                found: (2, 4)
            })
        ));
    }

    #[test]
    fn it_rejects_oversized_recordings() {
        assert!(matches!(
            SeismogramRecorder::new(usize::MAX, 2),
            Err(Error::InvalidConfig {
                parameter: "num_receivers",
                ..
            })
        ));
        assert!(matches!(
            SeismogramRecorder::new(2, usize::MAX / 2),
            Err(Error::InvalidConfig { .. })
        ));
    }
}
