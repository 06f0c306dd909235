use std::path::PathBuf;

use clap::Parser;
use sc_core::config::{ClassifierConfig, SourceKind, Waveform};

/// soundclass — classifieur d'événements sonores embarqué.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Fichier de configuration TOML. Défaut : config/default.toml.
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Source analogique : "synthetic", "iio", ou "mic" (requiert --features mic).
    #[arg(long)]
    pub source: Option<String>,

    /// Forme d'onde synthétique : "silence", "square" ou "sine".
    #[arg(long)]
    pub waveform: Option<String>,

    /// Échantillons par fenêtre.
    #[arg(long)]
    pub sample_size: Option<usize>,

    /// Délai entre deux lectures, en µs.
    #[arg(long)]
    pub delay_us: Option<u64>,

    /// Pause entre deux cycles, en ms.
    #[arg(long)]
    pub cycle_delay_ms: Option<u64>,

    /// S'arrêter après N cycles (défaut : jusqu'à Ctrl-C).
    #[arg(long)]
    pub cycles: Option<u64>,

    /// Acquisition sur un thread dédié.
    #[arg(long, default_value_t = false)]
    pub pipelined: bool,

    /// Ne pas afficher les résultats sur stdout (ils restent dans les logs).
    #[arg(short, long, default_value_t = false)]
    pub quiet: bool,

    /// Niveau de log : error, warn, info, debug, trace.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

/// Valeurs de la ligne de commande qui priment sur le fichier.
///
/// Réappliquées après chaque rechargement à chaud.
///
/// # Example
/// ```
/// use sc_app::cli::Overrides;
/// use sc_core::config::ClassifierConfig;
///
/// let overrides = Overrides { cycle_delay_ms: Some(0), ..Overrides::default() };
/// let mut config = ClassifierConfig::default();
/// overrides.apply(&mut config);
/// assert_eq!(config.cycle_delay_ms, 0);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub source: Option<SourceKind>,
    pub waveform: Option<Waveform>,
    pub sample_size: Option<usize>,
    pub delay_us: Option<u64>,
    pub cycle_delay_ms: Option<u64>,
    pub pipelined: bool,
    pub quiet: bool,
}

impl Overrides {
    pub fn apply(&self, config: &mut ClassifierConfig) {
        if let Some(v) = self.source {
            config.source = v;
        }
        if let Some(v) = self.waveform {
            config.waveform = v;
        }
        if let Some(v) = self.sample_size {
            config.sample_size = v;
        }
        if let Some(v) = self.delay_us {
            config.delay_us = v;
        }
        if let Some(v) = self.cycle_delay_ms {
            config.cycle_delay_ms = v;
        }
        if self.pipelined {
            config.pipelined = true;
        }
        if self.quiet {
            config.console = false;
        }
        config.clamp_all();
    }
}

impl Cli {
    /// Extract the overrides, validating the source and waveform names.
    ///
    /// # Errors
    /// Returns an error if `--source` or `--waveform` names an unknown value.
    pub fn overrides(&self) -> anyhow::Result<Overrides> {
        let source = self
            .source
            .as_deref()
            .map(str::parse::<SourceKind>)
            .transpose()?;
        let waveform = self
            .waveform
            .as_deref()
            .map(str::parse::<Waveform>)
            .transpose()?;
        Ok(Overrides {
            source,
            waveform,
            sample_size: self.sample_size,
            delay_us: self.delay_us,
            cycle_delay_ms: self.cycle_delay_ms,
            pipelined: self.pipelined,
            quiet: self.quiet,
        })
    }
}
