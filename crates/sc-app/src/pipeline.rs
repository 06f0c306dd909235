use std::sync::Arc;
use std::thread;

use arc_swap::ArcSwap;
use sc_audio::features::extract_features;
use sc_audio::sampler::SampleAcquirer;
use sc_core::clock::CancelToken;
use sc_core::config::ClassifierConfig;
use sc_core::error::AcquisitionError;
use sc_core::traits::{AnalogSource, Delay, Observer};
use sc_core::window::{ClassificationResult, RawWindow};
use sc_infer::Classifier;

use crate::stats::CycleStats;

/// Issue d'un cycle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CycleOutcome {
    /// A result was emitted to the observer.
    Emitted(ClassificationResult),
    /// Acquisition failed; nothing was emitted.
    Skipped,
}

/// Bilan d'une exécution de la boucle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Cycles that emitted a result.
    pub completed: u64,
    /// Cycles dropped on an acquisition error.
    pub skipped: u64,
}

/// Boucle `sample → extract → infer → emit → idle`.
///
/// Chaque cycle repart de zéro : seule la télémétrie survit d'un cycle à
/// l'autre. Une `AcquisitionError` abandonne le cycle courant, la boucle
/// continue au suivant. La config est relue à chaque frontière de cycle.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use arc_swap::ArcSwap;
/// use sc_app::pipeline::ClassificationLoop;
/// use sc_audio::synthetic::SyntheticSource;
/// use sc_core::clock::CancelToken;
/// use sc_core::config::ClassifierConfig;
/// use sc_core::traits::Delay;
/// use sc_core::window::{ClassificationResult, Label};
/// use sc_infer::Classifier;
///
/// #[derive(Clone)]
/// struct NoWait;
/// impl Delay for NoWait {
///     fn delay_us(&mut self, _us: u64) {}
/// }
///
/// let config = Arc::new(ArcSwap::from_pointee(ClassifierConfig::default()));
/// let mut labels = Vec::new();
/// let observer = |r: &ClassificationResult| labels.push(r.label);
/// let mut cycle = ClassificationLoop::new(
///     SyntheticSource::square(100, 500.0, 1000.0),
///     NoWait,
///     Classifier::builtin(),
///     observer,
///     config,
/// )
/// .with_max_cycles(Some(2));
/// let summary = cycle.run(&CancelToken::new());
/// assert_eq!(summary.completed, 2);
/// drop(cycle);
/// assert_eq!(labels, vec![Label::Knock, Label::Knock]);
/// ```
pub struct ClassificationLoop<'m, S, D, O> {
    acquirer: SampleAcquirer<S, D>,
    idle: D,
    classifier: Classifier<'m>,
    observer: O,
    config: Arc<ArcSwap<ClassifierConfig>>,
    max_cycles: Option<u64>,
    stats: CycleStats,
}

impl<'m, S, D, O> ClassificationLoop<'m, S, D, O>
where
    S: AnalogSource,
    D: Delay + Clone,
    O: Observer,
{
    /// Assemble the loop. The source is fixed for the loop's lifetime.
    #[must_use]
    pub fn new(
        source: S,
        delay: D,
        classifier: Classifier<'m>,
        observer: O,
        config: Arc<ArcSwap<ClassifierConfig>>,
    ) -> Self {
        let (sample_size, delay_us) = {
            let c = config.load();
            (c.sample_size, c.delay_us)
        };
        Self {
            acquirer: SampleAcquirer::with_timing(source, delay.clone(), sample_size, delay_us),
            idle: delay,
            classifier,
            observer,
            config,
            max_cycles: None,
            stats: CycleStats::new(),
        }
    }

    /// Stop after `max` cycles (emitted or skipped). `None` runs until cancelled.
    #[must_use]
    pub fn with_max_cycles(mut self, max: Option<u64>) -> Self {
        self.max_cycles = max;
        self
    }

    /// Télémétrie de la boucle.
    #[must_use]
    pub fn stats(&self) -> &CycleStats {
        &self.stats
    }

    /// Un cycle complet sans la pause finale.
    pub fn run_cycle(&mut self) -> CycleOutcome {
        let (sample_size, delay_us) = {
            let c = self.config.load();
            (c.sample_size, c.delay_us)
        };
        self.acquirer.set_timing(sample_size, delay_us);
        let window = self.acquirer.collect();
        finish_cycle(window, self.classifier, &mut self.observer, &mut self.stats)
    }

    /// Run until `cancel` fires or `max_cycles` is reached.
    ///
    /// Uses the pipelined variant when the config asks for it.
    pub fn run(&mut self, cancel: &CancelToken) -> RunSummary {
        if self.config.load().pipelined {
            return self.run_pipelined(cancel);
        }
        log::info!(
            "Boucle séquentielle sur la source {}",
            self.acquirer.source_name()
        );
        let start = self.stats.cycles();
        loop {
            if cancel.is_cancelled() || self.limit_reached(start) {
                break;
            }
            self.run_cycle();
            if cancel.is_cancelled() || self.limit_reached(start) {
                break;
            }
            let pause = self.config.load().cycle_delay_ms;
            self.idle.delay_ms(pause);
        }
        self.summary()
    }

    /// Acquisition sur un thread dédié, inférence sur le thread appelant.
    ///
    /// Les fenêtres passent par un canal à une place. Le thread
    /// d'acquisition attend l'acquittement du cycle N avant de capturer la
    /// fenêtre N+1 : le résultat N est toujours émis avant.
    pub fn run_pipelined(&mut self, cancel: &CancelToken) -> RunSummary {
        log::info!(
            "Boucle pipelinée sur la source {}",
            self.acquirer.source_name()
        );
        let start = self.stats.cycles();
        let max_cycles = self.max_cycles;
        let acquirer = &mut self.acquirer;
        let config = &self.config;
        let classifier = self.classifier;
        let observer = &mut self.observer;
        let stats = &mut self.stats;
        let idle = &mut self.idle;

        thread::scope(|s| {
            let (window_tx, window_rx) = flume::bounded::<Result<RawWindow, AcquisitionError>>(1);
            let (ack_tx, ack_rx) = flume::bounded::<()>(1);

            let acq_cancel = cancel.clone();
            let acq_config = Arc::clone(config);
            let acquisition = thread::Builder::new()
                .name("sc-acquire".to_string())
                .spawn_scoped(s, move || {
                    loop {
                        if acq_cancel.is_cancelled() {
                            break;
                        }
                        let (sample_size, delay_us) = {
                            let c = acq_config.load();
                            (c.sample_size, c.delay_us)
                        };
                        acquirer.set_timing(sample_size, delay_us);
                        if window_tx.send(acquirer.collect()).is_err() {
                            break;
                        }
                        if ack_rx.recv().is_err() {
                            break;
                        }
                    }
                });
            if let Err(e) = acquisition {
                log::error!("Thread d'acquisition impossible : {e}");
                return;
            }

            let reached = |stats: &CycleStats| {
                max_cycles.is_some_and(|max| stats.cycles() - start >= max)
            };

            while let Ok(window) = window_rx.recv() {
                if cancel.is_cancelled() {
                    break;
                }
                finish_cycle(window, classifier, &mut *observer, &mut *stats);
                if cancel.is_cancelled() || reached(&*stats) {
                    break;
                }
                idle.delay_ms(config.load().cycle_delay_ms);
                if ack_tx.send(()).is_err() {
                    break;
                }
            }
            // Wakes the acquisition thread if it is waiting on either channel
            drop(ack_tx);
            drop(window_rx);
        });

        self.summary()
    }

    fn limit_reached(&self, start: u64) -> bool {
        self.max_cycles
            .is_some_and(|max| self.stats.cycles() - start >= max)
    }

    fn summary(&self) -> RunSummary {
        RunSummary {
            completed: self.stats.completed(),
            skipped: self.stats.skipped(),
        }
    }
}

/// Étapes extract → infer → emit d'un cycle, à partir de la fenêtre capturée.
fn finish_cycle<O: Observer>(
    window: Result<RawWindow, AcquisitionError>,
    classifier: Classifier<'_>,
    observer: &mut O,
    stats: &mut CycleStats,
) -> CycleOutcome {
    let window = match window {
        Ok(w) => w,
        Err(e) => {
            log::warn!("Cycle ignoré : {e}");
            stats.record_skipped();
            return CycleOutcome::Skipped;
        }
    };

    let features = extract_features(window.samples());
    drop(window);
    let result = classifier.classify(&features);
    log::debug!(
        "features={:?} probs={:?} -> {}",
        features.as_array(),
        result.probabilities.as_array(),
        result.label
    );
    observer.emit(&result);
    stats.record_completed();
    CycleOutcome::Emitted(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU64, Ordering};

    use sc_audio::synthetic::SyntheticSource;
    use sc_core::window::Label;

    /// Records every wait without sleeping.
    #[derive(Clone, Default)]
    struct RecordingDelay {
        total_us: Arc<AtomicU64>,
        cycle_pauses: Arc<AtomicU64>,
    }

    impl Delay for RecordingDelay {
        fn delay_us(&mut self, us: u64) {
            self.total_us.fetch_add(us, Ordering::Relaxed);
        }

        fn delay_ms(&mut self, ms: u64) {
            self.cycle_pauses.fetch_add(1, Ordering::Relaxed);
            self.delay_us(ms * 1000);
        }
    }

    /// Plays scripted windows; `None` entries fail at that read.
    struct Scripted {
        reads: std::vec::IntoIter<Option<i32>>,
    }

    impl Scripted {
        fn new(windows: &[Vec<Option<i32>>]) -> Self {
            let all: Vec<Option<i32>> = windows.iter().flatten().copied().collect();
            Self {
                reads: all.into_iter(),
            }
        }
    }

    impl AnalogSource for Scripted {
        fn read(&mut self) -> Result<i32, AcquisitionError> {
            match self.reads.next() {
                Some(Some(v)) => Ok(v),
                Some(None) => Err(AcquisitionError::Stream("scripted failure".into())),
                None => Err(AcquisitionError::NoData {
                    source_name: "scripted",
                }),
            }
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    fn config(sample_size: usize) -> Arc<ArcSwap<ClassifierConfig>> {
        Arc::new(ArcSwap::from_pointee(ClassifierConfig {
            sample_size,
            ..ClassifierConfig::default()
        }))
    }

    fn silence(n: usize) -> Vec<Option<i32>> {
        vec![Some(0); n]
    }

    fn alternating(n: usize) -> Vec<Option<i32>> {
        (0..n)
            .map(|i| Some(if i % 2 == 0 { 100 } else { -100 }))
            .collect()
    }

    #[test]
    fn silence_window_yields_clap() {
        let (tx, rx) = flume::unbounded();
        let observer = crate::observer::ChannelObserver::new(tx);
        let mut cycle = ClassificationLoop::new(
            Scripted::new(&[silence(128)]),
            RecordingDelay::default(),
            Classifier::builtin(),
            observer,
            config(128),
        );
        match cycle.run_cycle() {
            CycleOutcome::Emitted(r) => {
                assert_eq!(r.label, Label::Clap);
                assert!((r.confidence - 0.365_08).abs() < 1e-5);
            }
            CycleOutcome::Skipped => panic!("silence must classify"),
        }
        assert_eq!(rx.try_recv().unwrap().label, Label::Clap);
    }

    #[test]
    fn failure_mid_window_skips_only_that_cycle() {
        let mut broken = alternating(128);
        broken[60] = None;
        // the failed window stops at read 61; the rest of it is never read
        broken.truncate(61);

        let (tx, rx) = flume::unbounded();
        let delay = RecordingDelay::default();
        let mut cycle = ClassificationLoop::new(
            Scripted::new(&[broken, alternating(128)]),
            delay.clone(),
            Classifier::builtin(),
            crate::observer::ChannelObserver::new(tx),
            config(128),
        )
        .with_max_cycles(Some(2));

        let summary = cycle.run(&CancelToken::new());
        assert_eq!(summary, RunSummary { completed: 1, skipped: 1 });

        let results: Vec<_> = rx.try_iter().collect();
        assert_eq!(results.len(), 1);
        // clean second window, unaffected by the partial first one
        assert_eq!(results[0].label, Label::Knock);
        // idle between the two cycles only
        assert_eq!(delay.cycle_pauses.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn cancelled_token_runs_nothing() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let mut emitted = 0;
        let mut cycle = ClassificationLoop::new(
            SyntheticSource::silence(0),
            RecordingDelay::default(),
            Classifier::builtin(),
            |_: &ClassificationResult| emitted += 1,
            config(16),
        );
        let summary = cycle.run(&cancel);
        assert_eq!(summary, RunSummary::default());
        drop(cycle);
        assert_eq!(emitted, 0);
    }

    #[test]
    fn observer_can_cancel_the_loop() {
        let cancel = CancelToken::new();
        let remote = cancel.clone();
        let mut seen = 0;
        let mut cycle = ClassificationLoop::new(
            SyntheticSource::silence(0),
            RecordingDelay::default(),
            Classifier::builtin(),
            |_: &ClassificationResult| {
                seen += 1;
                if seen == 3 {
                    remote.cancel();
                }
            },
            config(8),
        );
        let summary = cycle.run(&cancel);
        assert_eq!(summary.completed, 3);
    }

    #[test]
    fn timing_follows_config_snapshot() {
        let cfg = config(16);
        let delay = RecordingDelay::default();
        let mut cycle = ClassificationLoop::new(
            SyntheticSource::silence(0),
            delay.clone(),
            Classifier::builtin(),
            |_: &ClassificationResult| {},
            Arc::clone(&cfg),
        );
        cycle.run_cycle();
        assert_eq!(delay.total_us.load(Ordering::Relaxed), 16 * 1000);

        cfg.store(Arc::new(ClassifierConfig {
            sample_size: 4,
            delay_us: 10,
            ..ClassifierConfig::default()
        }));
        cycle.run_cycle();
        assert_eq!(delay.total_us.load(Ordering::Relaxed), 16 * 1000 + 4 * 10);
    }

    #[test]
    fn cycle_pause_uses_configured_delay() {
        let cfg = Arc::new(ArcSwap::from_pointee(ClassifierConfig {
            sample_size: 2,
            delay_us: 1,
            cycle_delay_ms: 200,
            ..ClassifierConfig::default()
        }));
        let delay = RecordingDelay::default();
        let mut cycle = ClassificationLoop::new(
            SyntheticSource::silence(0),
            delay.clone(),
            Classifier::builtin(),
            |_: &ClassificationResult| {},
            cfg,
        )
        .with_max_cycles(Some(3));
        cycle.run(&CancelToken::new());
        // 3 windows of 2 samples, 2 pauses of 200 ms
        assert_eq!(delay.cycle_pauses.load(Ordering::Relaxed), 2);
        assert_eq!(delay.total_us.load(Ordering::Relaxed), 3 * 2 + 2 * 200_000);
    }

    #[test]
    fn pipelined_keeps_window_order() {
        let cfg = Arc::new(ArcSwap::from_pointee(ClassifierConfig {
            sample_size: 128,
            pipelined: true,
            ..ClassifierConfig::default()
        }));
        let windows = [silence(128), alternating(128), silence(128), alternating(128)];
        let labels = Mutex::new(Vec::new());
        let mut cycle = ClassificationLoop::new(
            Scripted::new(&windows),
            RecordingDelay::default(),
            Classifier::builtin(),
            |r: &ClassificationResult| labels.lock().unwrap().push(r.label),
            cfg,
        )
        .with_max_cycles(Some(4));
        let summary = cycle.run(&CancelToken::new());
        assert_eq!(summary.completed, 4);
        drop(cycle);
        assert_eq!(
            labels.into_inner().unwrap(),
            vec![Label::Clap, Label::Knock, Label::Clap, Label::Knock]
        );
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    enum Event {
        Read { window: usize },
        Emit { window: usize },
    }

    /// Alternating source that logs every read into a shared timeline.
    struct Tracing {
        timeline: Arc<Mutex<Vec<Event>>>,
        window_len: usize,
        reads: usize,
    }

    impl AnalogSource for Tracing {
        fn read(&mut self) -> Result<i32, AcquisitionError> {
            let window = self.reads / self.window_len;
            self.timeline.lock().unwrap().push(Event::Read { window });
            self.reads += 1;
            Ok(if self.reads % 2 == 0 { -100 } else { 100 })
        }

        fn name(&self) -> &'static str {
            "tracing"
        }
    }

    #[test]
    fn pipelined_emits_before_next_capture() {
        let timeline = Arc::new(Mutex::new(Vec::new()));
        let cfg = Arc::new(ArcSwap::from_pointee(ClassifierConfig {
            sample_size: 4,
            pipelined: true,
            ..ClassifierConfig::default()
        }));
        let source = Tracing {
            timeline: Arc::clone(&timeline),
            window_len: 4,
            reads: 0,
        };
        let sink = Arc::clone(&timeline);
        let mut emitted = 0;
        let mut cycle = ClassificationLoop::new(
            source,
            RecordingDelay::default(),
            Classifier::builtin(),
            move |_: &ClassificationResult| {
                sink.lock().unwrap().push(Event::Emit { window: emitted });
                emitted += 1;
            },
            cfg,
        )
        .with_max_cycles(Some(4));
        let summary = cycle.run(&CancelToken::new());
        assert_eq!(summary.completed, 4);
        drop(cycle);

        let events = timeline.lock().unwrap().clone();
        let position = |e: Event| events.iter().position(|x| *x == e);
        for n in 0..4 {
            let emit = position(Event::Emit { window: n }).unwrap();
            if let Some(next_read) = position(Event::Read { window: n + 1 }) {
                assert!(emit < next_read, "window {} read before result {n}", n + 1);
            }
        }
        // no capture starts once the last result is out
        assert_eq!(events.iter().filter(|e| matches!(e, Event::Read { .. })).count(), 16);
        assert_eq!(events.last(), Some(&Event::Emit { window: 3 }));
    }

    #[test]
    fn pipelined_recovers_from_failure() {
        let mut broken = silence(8);
        broken[3] = None;
        broken.truncate(4);
        let cfg = config(8);
        let (tx, rx) = flume::unbounded();
        let mut cycle = ClassificationLoop::new(
            Scripted::new(&[broken, alternating(8)]),
            RecordingDelay::default(),
            Classifier::builtin(),
            crate::observer::ChannelObserver::new(tx),
            cfg,
        )
        .with_max_cycles(Some(2));
        let summary = cycle.run_pipelined(&CancelToken::new());
        assert_eq!(summary, RunSummary { completed: 1, skipped: 1 });
        assert_eq!(rx.try_iter().count(), 1);
    }

    #[test]
    fn pipelined_counts_repeated_failures() {
        // empty script: every window fails with NoData
        let mut cycle = ClassificationLoop::new(
            Scripted::new(&[]),
            RecordingDelay::default(),
            Classifier::builtin(),
            |_: &ClassificationResult| {},
            config(4),
        )
        .with_max_cycles(Some(5));
        let summary = cycle.run_pipelined(&CancelToken::new());
        assert_eq!(summary, RunSummary { completed: 0, skipped: 5 });
    }
}
