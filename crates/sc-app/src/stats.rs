use std::time::{Duration, Instant};

/// Compteurs de cycles et cadence moyenne depuis le premier cycle.
///
/// Télémétrie uniquement : rien ici ne revient dans l'inférence.
///
/// # Example
/// ```
/// use sc_app::stats::CycleStats;
/// let mut stats = CycleStats::new();
/// stats.record_completed();
/// stats.record_skipped();
/// assert_eq!(stats.completed(), 1);
/// assert_eq!(stats.skipped(), 1);
/// ```
#[derive(Debug, Default)]
pub struct CycleStats {
    completed: u64,
    skipped: u64,
    /// Fin du premier et du dernier cycle.
    span: Option<(Instant, Instant)>,
}

impl CycleStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cycle terminé avec un résultat émis.
    pub fn record_completed(&mut self) {
        self.completed += 1;
        self.mark(Instant::now());
    }

    /// Cycle abandonné sur erreur d'acquisition.
    pub fn record_skipped(&mut self) {
        self.skipped += 1;
        self.mark(Instant::now());
    }

    fn mark(&mut self, now: Instant) {
        self.span = Some(self.span.map_or((now, now), |(first, _)| (first, now)));
    }

    #[must_use]
    pub fn completed(&self) -> u64 {
        self.completed
    }

    #[must_use]
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    /// Total cycles, emitted or not.
    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.completed + self.skipped
    }

    /// Temps entre la fin du premier et du dernier cycle.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.span.map_or(Duration::ZERO, |(first, last)| last - first)
    }

    /// Cycles par seconde. 0 tant que moins de deux cycles sont passés.
    #[must_use]
    pub fn rate(&self) -> f64 {
        let secs = self.elapsed().as_secs_f64();
        if secs > 0.0 {
            (self.cycles() - 1) as f64 / secs
        } else {
            0.0
        }
    }
}
