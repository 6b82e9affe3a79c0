use std::f64::consts::PI;

/// A source time function.
pub trait Wavelet {
    fn sample(&self, time: f64) -> f64;
}

/// Zero-phase Ricker wavelet, delayed by `1.5 / frequency` so that it starts
/// close to zero.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ricker {
    /// Peak frequency `f0`
    pub frequency: f64,
    pub amplitude: f64,
}

impl Ricker {
    pub fn delay(&self) -> f64 {
        1.5 / self.frequency
    }
}

impl Wavelet for Ricker {
    fn sample(&self, time: f64) -> f64 {
        let tau = PI * self.frequency * (time - self.delay());
        let tau2 = tau.powi(2);
        self.amplitude * (1.0 - 2.0 * tau2) * (-tau2).exp()
    }
}

/// Source samples, one per time step.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SourceWavelet {
    samples: Vec<f64>,
}

impl SourceWavelet {
    /// Samples a Ricker wavelet with peak frequency `frequency` and amplitude
    /// `amplitude`.
    pub fn generate(frequency: f64, amplitude: f64, time_samples: &[f64]) -> Self {
        Self::from_wavelet(
            &Ricker {
                frequency,
                amplitude,
            },
            time_samples,
        )
    }

    pub fn from_wavelet(wavelet: &impl Wavelet, time_samples: &[f64]) -> Self {
        Self {
            samples: time_samples.iter().map(|t| wavelet.sample(*t)).collect(),
        }
    }

    /// Sample for step `n`. Zero past the end.
    pub fn sample(&self, step: usize) -> f64 {
        self.samples.get(step).copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.samples
    }
}

#[cfg(test)]
mod tests {
    use crate::source::{
        Ricker,
        SourceWavelet,
        Wavelet,
    };

    #[test]
    fn it_peaks_at_the_delay() {
        let ricker = Ricker {
            frequency: 10.0,
            amplitude: 2.0,
        };
        assert!((ricker.sample(0.15) - 2.0).abs() < 1e-12);
        // zero crossings at τ = ±1/√2
        let crossing = 0.15 + 1.0 / (2.0f64.sqrt() * std::f64::consts::PI * 10.0);
        assert!(ricker.sample(crossing).abs() < 1e-12);
        // starts out small
        assert!(ricker.sample(0.0).abs() < 1e-3 * 2.0);
    }

    #[test]
    fn it_samples_per_time_step() {
        let dt = 0.001;
        let times: Vec<f64> = (0..400).map(|n| n as f64 * dt).collect();
        let wavelet = SourceWavelet::generate(10.0, 1.0, &times);
        assert_eq!(wavelet.len(), 400);
        assert!((wavelet.sample(150) - 1.0).abs() < 1e-9);
        assert_eq!(wavelet.sample(400), 0.0);

        // zero amplitude gives zero samples
        let silent = SourceWavelet::generate(10.0, 0.0, &times);
        assert!(silent.as_slice().iter().all(|q| *q == 0.0));
    }
}
