use std::sync::Arc;

use anyhow::{Context, Result};
use arc_swap::ArcSwap;
use clap::Parser;
use sc_app::cli::Cli;
use sc_app::hotreload;
use sc_app::observer::{ConsoleObserver, LogObserver, STARTUP_BANNER};
use sc_app::pipeline::{ClassificationLoop, RunSummary};
use sc_audio::source::create_source;
use sc_core::clock::{CancelToken, SystemDelay};
use sc_core::config::ClassifierConfig;
use sc_core::traits::{AnalogSource, Observer};
use sc_infer::Classifier;

fn main() -> Result<()> {
    // 1. Parser CLI
    let cli = Cli::parse();

    // 2. Initialiser le logging
    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    // 3. Charger la config, appliquer les overrides CLI
    let overrides = cli.overrides()?;
    let mut config = resolve_config(&cli)?;
    overrides.apply(&mut config);
    let config = Arc::new(ArcSwap::from_pointee(config));

    // 4. Hot-reload (seulement si le fichier existe)
    let _watcher = if cli.config.exists() {
        Some(hotreload::spawn_config_watcher(&cli.config, &config, overrides.clone())?)
    } else {
        None
    };

    // 5. Arrêt propre sur Ctrl-C, vérifié à chaque frontière de cycle
    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        ctrlc::set_handler(move || cancel.cancel())
            .context("Impossible d'installer le handler Ctrl-C")?;
    }

    // 6. Source analogique, choisie une seule fois
    let snapshot = config.load_full();
    let source = create_source(&snapshot)?;

    log::info!(
        "Classifieur démarré : {} échantillons @ {} µs, pause {} ms",
        snapshot.sample_size,
        snapshot.delay_us,
        snapshot.cycle_delay_ms
    );

    // 7. Boucle principale
    let summary = if snapshot.console {
        let mut console = ConsoleObserver::stdout();
        console.announce(STARTUP_BANNER);
        run_with(source, console, &config, &cli, &cancel)
    } else {
        log::info!("{STARTUP_BANNER}");
        run_with(source, LogObserver, &config, &cli, &cancel)
    };

    log::info!(
        "Arrêt : {} cycles émis, {} ignorés",
        summary.completed,
        summary.skipped
    );
    Ok(())
}

fn run_with<S: AnalogSource, O: Observer>(
    source: S,
    observer: O,
    config: &Arc<ArcSwap<ClassifierConfig>>,
    cli: &Cli,
    cancel: &CancelToken,
) -> RunSummary {
    let mut cycle = ClassificationLoop::new(
        source,
        SystemDelay,
        Classifier::builtin(),
        observer,
        Arc::clone(config),
    )
    .with_max_cycles(cli.cycles);
    let summary = cycle.run(cancel);
    log::info!("Cadence finale : {:.2} cycles/s", cycle.stats().rate());
    summary
}

/// Resolve config: file if present, defaults otherwise.
fn resolve_config(cli: &Cli) -> Result<ClassifierConfig> {
    if cli.config.exists() {
        sc_core::config::load_config(&cli.config)
    } else {
        log::warn!(
            "Config introuvable : {}. Utilisation des défauts.",
            cli.config.display()
        );
        Ok(ClassifierConfig::default())
    }
}
