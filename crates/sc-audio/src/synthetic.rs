use sc_core::config::{ClassifierConfig, Waveform};
use sc_core::error::AcquisitionError;
use sc_core::traits::AnalogSource;

/// Générateur de signal déterministe, sans matériel.
///
/// Sert aux démos et aux tests : la même configuration produit toujours la
/// même suite d'échantillons.
///
/// # Example
/// ```
/// use sc_audio::synthetic::SyntheticSource;
/// use sc_core::traits::AnalogSource;
///
/// // 500 Hz sampled at 1 kHz: +a, -a, +a, -a, ...
/// let mut src = SyntheticSource::square(100, 500.0, 1000.0);
/// assert_eq!(src.read().unwrap(), 100);
/// assert_eq!(src.read().unwrap(), -100);
/// ```
#[derive(Clone, Debug)]
pub struct SyntheticSource {
    waveform: Waveform,
    amplitude: i32,
    offset: i32,
    frequency_hz: f64,
    sample_rate_hz: f64,
    /// Index of the next sample.
    tick: u64,
}

impl SyntheticSource {
    /// Constant signal at `offset`.
    #[must_use]
    pub fn silence(offset: i32) -> Self {
        Self {
            waveform: Waveform::Silence,
            amplitude: 0,
            offset,
            frequency_hz: 0.0,
            sample_rate_hz: 1000.0,
            tick: 0,
        }
    }

    /// ±`amplitude` square wave.
    #[must_use]
    pub fn square(amplitude: i32, frequency_hz: f64, sample_rate_hz: f64) -> Self {
        Self {
            waveform: Waveform::Square,
            amplitude,
            offset: 0,
            frequency_hz,
            sample_rate_hz,
            tick: 0,
        }
    }

    /// Sine of peak `amplitude`.
    #[must_use]
    pub fn sine(amplitude: i32, frequency_hz: f64, sample_rate_hz: f64) -> Self {
        Self {
            waveform: Waveform::Sine,
            amplitude,
            offset: 0,
            frequency_hz,
            sample_rate_hz,
            tick: 0,
        }
    }

    /// Build the generator described by the `[source]` section.
    #[must_use]
    pub fn from_config(config: &ClassifierConfig) -> Self {
        Self {
            waveform: config.waveform,
            amplitude: config.amplitude,
            offset: config.offset,
            frequency_hz: config.frequency_hz,
            sample_rate_hz: config.sample_rate_hz(),
            tick: 0,
        }
    }

    /// Ajoute une composante continue.
    #[must_use]
    pub fn with_offset(mut self, offset: i32) -> Self {
        self.offset = offset;
        self
    }

    fn value_at(&self, tick: u64) -> i32 {
        if self.frequency_hz <= 0.0 || self.sample_rate_hz <= 0.0 {
            return self.offset;
        }
        let cycles = tick as f64 * self.frequency_hz / self.sample_rate_hz;
        let wave = match self.waveform {
            Waveform::Silence => 0,
            Waveform::Square => {
                if cycles.fract() < 0.5 {
                    self.amplitude
                } else {
                    -self.amplitude
                }
            }
            Waveform::Sine => {
                let phase = cycles.fract() * std::f64::consts::TAU;
                (f64::from(self.amplitude) * phase.sin()).round() as i32
            }
        };
        self.offset.saturating_add(wave)
    }
}

impl AnalogSource for SyntheticSource {
    fn read(&mut self) -> Result<i32, AcquisitionError> {
        let v = self.value_at(self.tick);
        self.tick = self.tick.wrapping_add(1);
        Ok(v)
    }

    fn name(&self) -> &'static str {
        "synthetic"
    }
}
