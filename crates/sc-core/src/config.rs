use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::{CYCLE_DELAY_MS, DELAY_US, SAMPLE_SIZE};

/// Configuration complète du classifieur, hot-rechargeable.
///
/// Sérialisable en TOML. Chaque champ a une valeur par défaut saine, égale
/// aux constantes embarquées.
///
/// # Example
/// ```
/// use sc_core::config::ClassifierConfig;
/// let config = ClassifierConfig::default();
/// assert_eq!(config.sample_size, 128);
/// assert_eq!(config.cycle_delay_ms, 200);
/// ```
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ClassifierConfig {
    // === Échantillonnage ===
    /// Échantillons par fenêtre [2, 8192].
    pub sample_size: usize,
    /// Délai entre deux lectures (µs) [1, 1_000_000].
    pub delay_us: u64,
    /// Résolution du convertisseur.
    pub resolution: AdcResolution,

    // === Boucle ===
    /// Pause entre deux cycles (ms) [0, 60_000].
    pub cycle_delay_ms: u64,
    /// Acquisition sur un thread dédié.
    pub pipelined: bool,

    // === Source ===
    /// Backend analogique, figé au démarrage.
    pub source: SourceKind,
    /// Forme d'onde du générateur synthétique.
    pub waveform: Waveform,
    /// Amplitude crête du générateur synthétique (codes ADC).
    pub amplitude: i32,
    /// Fréquence du générateur synthétique (Hz).
    pub frequency_hz: f64,
    /// Composante continue ajoutée au générateur synthétique.
    pub offset: i32,
    /// Index du périphérique IIO (`iio:deviceN`).
    pub iio_device: u32,
    /// Canal IIO (`in_voltageN_raw`).
    pub iio_channel: u32,

    // === Sortie ===
    /// Afficher chaque résultat sur stdout.
    pub console: bool,
}

/// Analog backend selection.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Deterministic signal generator.
    #[default]
    Synthetic,
    /// Linux industrial-I/O ADC via sysfs.
    Iio,
    /// Default microphone through cpal. Requires `--features mic`.
    Mic,
}

impl FromStr for SourceKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "synthetic" | "synth" => Ok(Self::Synthetic),
            "iio" | "adc" => Ok(Self::Iio),
            "mic" | "microphone" => Ok(Self::Mic),
            _ => Err(ConfigError::UnknownSource { kind: s.to_string() }),
        }
    }
}

/// Synthetic waveform shape.
///
/// # Example
/// ```
/// use sc_core::config::Waveform;
/// let w: Waveform = "sine".parse().unwrap();
/// assert_eq!(w, Waveform::Sine);
/// ```
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    /// Constant `offset`.
    Silence,
    /// ±amplitude square wave.
    #[default]
    Square,
    /// Sine of the given amplitude.
    Sine,
}

impl FromStr for Waveform {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "silence" => Ok(Self::Silence),
            "square" => Ok(Self::Square),
            "sine" => Ok(Self::Sine),
            _ => Err(ConfigError::UnknownWaveform { name: s.to_string() }),
        }
    }
}

/// Converter resolution. Boards expose either a 12-bit or a 16-bit read.
///
/// # Example
/// ```
/// use sc_core::config::AdcResolution;
/// assert_eq!(AdcResolution::Bits12.max_code(), 4095);
/// assert_eq!(AdcResolution::Bits16.max_code(), 65535);
/// ```
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum AdcResolution {
    #[default]
    Bits12,
    Bits16,
}

impl AdcResolution {
    /// Largest code the converter can return.
    #[must_use]
    pub fn max_code(self) -> i32 {
        match self {
            Self::Bits12 => 4095,
            Self::Bits16 => 65535,
        }
    }

    /// Map a normalized sample in [-1, 1] onto an unsigned mid-scale code.
    ///
    /// # Example
    /// ```
    /// use sc_core::config::AdcResolution;
    /// assert_eq!(AdcResolution::Bits12.quantize(-1.0), 0);
    /// assert_eq!(AdcResolution::Bits12.quantize(1.0), 4095);
    /// ```
    #[must_use]
    pub fn quantize(self, sample: f32) -> i32 {
        let max = f64::from(self.max_code());
        let unit = (f64::from(sample.clamp(-1.0, 1.0)) + 1.0) * 0.5;
        (unit * max).round() as i32
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            sample_size: SAMPLE_SIZE,
            delay_us: DELAY_US,
            resolution: AdcResolution::Bits12,
            cycle_delay_ms: CYCLE_DELAY_MS,
            pipelined: false,
            source: SourceKind::Synthetic,
            waveform: Waveform::Square,
            amplitude: 100,
            frequency_hz: 250.0,
            offset: 0,
            iio_device: 0,
            iio_channel: 0,
            console: true,
        }
    }
}

impl ClassifierConfig {
    /// Clamp all numeric fields to their valid ranges.
    /// Called after TOML deserialization to prevent out-of-range values.
    ///
    /// Returns `true` if any field was changed; each change is logged at `warn`.
    pub fn clamp_all(&mut self) -> bool {
        let mut clamped = false;
        clamped |= clamp_field("sample_size", &mut self.sample_size, 2, 8192);
        clamped |= clamp_field("delay_us", &mut self.delay_us, 1, 1_000_000);
        clamped |= clamp_field("cycle_delay_ms", &mut self.cycle_delay_ms, 0, 60_000);
        clamped |= clamp_field("amplitude", &mut self.amplitude, 0, 1 << 20);
        if !self.frequency_hz.is_finite() || self.frequency_hz < 0.0 {
            log::warn!(
                "Config : frequency_hz = {} invalide, ramené à 0",
                self.frequency_hz
            );
            self.frequency_hz = 0.0;
            clamped = true;
        }
        clamped
    }

    /// Effective sampling rate implied by `delay_us` (Hz).
    #[must_use]
    pub fn sample_rate_hz(&self) -> f64 {
        1_000_000.0 / self.delay_us.max(1) as f64
    }
}

fn clamp_field<T>(name: &str, value: &mut T, min: T, max: T) -> bool
where
    T: Copy + Ord + std::fmt::Display,
{
    let bounded = (*value).clamp(min, max);
    if bounded == *value {
        return false;
    }
    log::warn!(
        "Config : {name} = {value} hors bornes [{min}, {max}], ramené à {bounded}"
    );
    *value = bounded;
    true
}

/// Structure TOML intermédiaire pour désérialisation avec valeurs optionnelles.
#[derive(Deserialize, Default)]
struct ConfigFile {
    sampling: Option<SamplingSection>,
    #[serde(rename = "loop")]
    cycle: Option<LoopSection>,
    source: Option<SourceSection>,
    output: Option<OutputSection>,
}

#[derive(Deserialize)]
struct SamplingSection {
    sample_size: Option<usize>,
    delay_us: Option<u64>,
    resolution: Option<AdcResolution>,
}

#[derive(Deserialize)]
struct LoopSection {
    cycle_delay_ms: Option<u64>,
    pipelined: Option<bool>,
}

#[derive(Deserialize)]
struct SourceSection {
    kind: Option<SourceKind>,
    waveform: Option<Waveform>,
    amplitude: Option<i32>,
    frequency_hz: Option<f64>,
    offset: Option<i32>,
    iio_device: Option<u32>,
    iio_channel: Option<u32>,
}

#[derive(Deserialize)]
struct OutputSection {
    console: Option<bool>,
}

/// Parse une configuration TOML et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the text is not valid TOML for this schema.
///
/// # Example
/// ```
/// use sc_core::config::parse_config;
/// let config = parse_config("[loop]\ncycle_delay_ms = 50\n").unwrap();
/// assert_eq!(config.cycle_delay_ms, 50);
/// assert_eq!(config.sample_size, 128);
/// ```
pub fn parse_config(content: &str) -> Result<ClassifierConfig> {
    let file: ConfigFile = toml::from_str(content).context("Erreur de parsing TOML")?;
    let mut config = ClassifierConfig::default();

    if let Some(s) = file.sampling {
        if let Some(v) = s.sample_size {
            config.sample_size = v;
        }
        if let Some(v) = s.delay_us {
            config.delay_us = v;
        }
        if let Some(v) = s.resolution {
            config.resolution = v;
        }
    }

    if let Some(l) = file.cycle {
        if let Some(v) = l.cycle_delay_ms {
            config.cycle_delay_ms = v;
        }
        if let Some(v) = l.pipelined {
            config.pipelined = v;
        }
    }

    if let Some(s) = file.source {
        if let Some(v) = s.kind {
            config.source = v;
        }
        if let Some(v) = s.waveform {
            config.waveform = v;
        }
        if let Some(v) = s.amplitude {
            config.amplitude = v;
        }
        if let Some(v) = s.frequency_hz {
            config.frequency_hz = v;
        }
        if let Some(v) = s.offset {
            config.offset = v;
        }
        if let Some(v) = s.iio_device {
            config.iio_device = v;
        }
        if let Some(v) = s.iio_channel {
            config.iio_channel = v;
        }
    }

    if let Some(o) = file.output {
        if let Some(v) = o.console {
            config.console = v;
        }
    }

    config.clamp_all();
    Ok(config)
}

/// Charge un fichier TOML et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
///
/// # Example
/// ```no_run
/// use sc_core::config::load_config;
/// use std::path::Path;
/// let config = load_config(Path::new("config/default.toml")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<ClassifierConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Configuration invalide dans {}", path.display()))
}
