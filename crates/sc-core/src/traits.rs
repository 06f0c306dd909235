use crate::error::AcquisitionError;
use crate::window::ClassificationResult;

/// Canal analogique lu échantillon par échantillon.
///
/// Implémenté par : `SyntheticSource`, `IioSource`, `MicSource`.
/// Le backend est choisi une fois au démarrage, jamais dans la boucle.
///
/// # Example
/// ```
/// use sc_core::traits::AnalogSource;
/// use sc_core::error::AcquisitionError;
///
/// struct Flat;
/// impl AnalogSource for Flat {
///     fn read(&mut self) -> Result<i32, AcquisitionError> { Ok(2048) }
///     fn name(&self) -> &'static str { "flat" }
/// }
/// ```
pub trait AnalogSource: Send {
    /// Lit un échantillon brut.
    ///
    /// # Errors
    /// Returns an `AcquisitionError` if the device cannot be read.
    fn read(&mut self) -> Result<i32, AcquisitionError>;

    /// Nom lisible pour les logs.
    fn name(&self) -> &'static str;
}

impl<S: AnalogSource + ?Sized> AnalogSource for Box<S> {
    fn read(&mut self) -> Result<i32, AcquisitionError> {
        (**self).read()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Attente bloquante.
///
/// CONTRAT : l'attente est complète au retour, jamais raccourcie.
///
/// # Example
/// ```
/// use sc_core::traits::Delay;
///
/// struct NoWait;
/// impl Delay for NoWait {
///     fn delay_us(&mut self, _us: u64) {}
/// }
/// NoWait.delay_ms(200);
/// ```
pub trait Delay: Send {
    /// Block for `us` microseconds.
    fn delay_us(&mut self, us: u64);

    /// Block for `ms` milliseconds.
    fn delay_ms(&mut self, ms: u64) {
        self.delay_us(ms.saturating_mul(1000));
    }
}

/// Reçoit un résultat par cycle terminé. Aucun acquittement attendu.
///
/// Toute closure `FnMut(&ClassificationResult) + Send` est un observateur.
///
/// # Example
/// ```
/// use sc_core::traits::Observer;
/// use sc_core::window::ClassificationResult;
///
/// let mut seen = 0;
/// let mut obs = |_r: &ClassificationResult| seen += 1;
/// # let _ = &mut obs;
/// ```
pub trait Observer: Send {
    /// Publish one result.
    fn emit(&mut self, result: &ClassificationResult);
}

impl<F> Observer for F
where
    F: FnMut(&ClassificationResult) + Send,
{
    fn emit(&mut self, result: &ClassificationResult) {
        self(result);
    }
}
