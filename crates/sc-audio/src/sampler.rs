use sc_core::error::AcquisitionError;
use sc_core::traits::{AnalogSource, Delay};
use sc_core::window::RawWindow;
use sc_core::{DELAY_US, SAMPLE_SIZE};

/// Capture d'une fenêtre à cadence fixe.
///
/// Chaque lecture est suivie d'une attente complète de `delay_us`. Aucune
/// lecture n'est sautée, aucun retry : une lecture en échec abandonne la
/// fenêtre entière.
///
/// # Example
/// ```
/// use sc_audio::sampler::SampleAcquirer;
/// use sc_audio::synthetic::SyntheticSource;
/// use sc_core::traits::Delay;
///
/// struct NoWait;
/// impl Delay for NoWait {
///     fn delay_us(&mut self, _us: u64) {}
/// }
///
/// let mut acq = SampleAcquirer::new(SyntheticSource::silence(0), NoWait);
/// let window = acq.collect().unwrap();
/// assert_eq!(window.len(), 128);
/// ```
pub struct SampleAcquirer<S, D> {
    source: S,
    delay: D,
    sample_size: usize,
    delay_us: u64,
}

impl<S: AnalogSource, D: Delay> SampleAcquirer<S, D> {
    /// Acquirer with the default timing (`SAMPLE_SIZE` samples, `DELAY_US` apart).
    #[must_use]
    pub fn new(source: S, delay: D) -> Self {
        Self::with_timing(source, delay, SAMPLE_SIZE, DELAY_US)
    }

    /// Acquirer with explicit timing. `sample_size` is raised to 2 if smaller.
    #[must_use]
    pub fn with_timing(source: S, delay: D, sample_size: usize, delay_us: u64) -> Self {
        Self {
            source,
            delay,
            sample_size: sample_size.max(2),
            delay_us,
        }
    }

    /// Applique un nouveau timing. Prend effet à la prochaine fenêtre.
    pub fn set_timing(&mut self, sample_size: usize, delay_us: u64) {
        let sample_size = sample_size.max(2);
        if sample_size != self.sample_size || delay_us != self.delay_us {
            log::info!(
                "Timing d'acquisition : {sample_size} échantillons, {delay_us} µs"
            );
        }
        self.sample_size = sample_size;
        self.delay_us = delay_us;
    }

    /// Capture une fenêtre de `sample_size` échantillons.
    ///
    /// Latence totale ≈ `sample_size × delay_us`.
    ///
    /// # Errors
    /// Returns the first `AcquisitionError` raised by the source; the
    /// partial window is dropped.
    pub fn collect(&mut self) -> Result<RawWindow, AcquisitionError> {
        let mut samples = Vec::with_capacity(self.sample_size);
        for _ in 0..self.sample_size {
            samples.push(self.source.read()?);
            self.delay.delay_us(self.delay_us);
        }
        Ok(RawWindow::new(samples))
    }

    #[must_use]
    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    #[must_use]
    pub fn delay_us(&self) -> u64 {
        self.delay_us
    }

    /// Name of the underlying source.
    #[must_use]
    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }
}
