use std::io::Write;

use sc_core::traits::Observer;
use sc_core::window::ClassificationResult;

/// Ligne affichée une fois au démarrage, avant le premier résultat.
pub const STARTUP_BANNER: &str = "TinyML Sound Classifier Started...";

/// Affiche `Prediction: CLAP Confidence: 0.365` par cycle.
///
/// # Example
/// ```
/// use sc_app::observer::ConsoleObserver;
/// use sc_core::traits::Observer;
/// use sc_core::window::{Label, ProbabilityVector};
///
/// let mut obs = ConsoleObserver::new(Vec::new());
/// obs.emit(&ProbabilityVector::new([0.2, 0.7, 0.1]).classify(&Label::ALL));
/// assert_eq!(obs.into_inner(), b"Prediction: KNOCK Confidence: 0.700\n");
/// ```
pub struct ConsoleObserver<W> {
    out: W,
}

impl ConsoleObserver<std::io::Stdout> {
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> ConsoleObserver<W> {
    #[must_use]
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Écrit une ligne hors résultat (bannière de démarrage).
    pub fn announce(&mut self, line: &str) {
        self.write_line(format_args!("{line}"));
    }

    fn write_line(&mut self, line: std::fmt::Arguments<'_>) {
        if let Err(e) = writeln!(self.out, "{line}").and_then(|()| self.out.flush()) {
            log::warn!("Écriture sur la console impossible : {e}");
        }
    }

    /// Rend le writer sous-jacent.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> Observer for ConsoleObserver<W> {
    fn emit(&mut self, result: &ClassificationResult) {
        self.write_line(format_args!("{result}"));
    }
}

/// Publie chaque résultat via `log::info!`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogObserver;

impl Observer for LogObserver {
    fn emit(&mut self, result: &ClassificationResult) {
        log::info!("{result}");
    }
}

/// Transmet chaque résultat dans un canal flume.
///
/// Un récepteur fermé n'arrête pas la boucle : le résultat est perdu.
///
/// # Example
/// ```
/// use sc_app::observer::ChannelObserver;
/// use sc_core::traits::Observer;
/// use sc_core::window::{Label, ProbabilityVector};
///
/// let (tx, rx) = flume::unbounded();
/// let mut obs = ChannelObserver::new(tx);
/// obs.emit(&ProbabilityVector::new([1.0, 0.0, 0.0]).classify(&Label::ALL));
/// assert_eq!(rx.try_recv().unwrap().label, Label::Clap);
/// ```
pub struct ChannelObserver {
    tx: flume::Sender<ClassificationResult>,
}

impl ChannelObserver {
    #[must_use]
    pub fn new(tx: flume::Sender<ClassificationResult>) -> Self {
        Self { tx }
    }
}

impl Observer for ChannelObserver {
    fn emit(&mut self, result: &ClassificationResult) {
        if self.tx.send(*result).is_err() {
            log::debug!("Récepteur de résultats fermé");
        }
    }
}
