/// Configuration, types, and shared structures for soundclass.
///
/// This crate contains the data model of one classification cycle, the
/// seam traits implemented by hardware backends, and the configuration
/// logic shared across the workspace.

pub mod clock;
pub mod config;
pub mod error;
pub mod traits;
pub mod window;

pub use clock::{CancelToken, SystemDelay};
pub use config::ClassifierConfig;
pub use error::{AcquisitionError, ConfigError};
pub use window::{ClassificationResult, FeatureVector, Label, ProbabilityVector, RawWindow};

/// Nombre d'échantillons par fenêtre.
pub const SAMPLE_SIZE: usize = 128;

/// Délai entre deux lectures analogiques (µs), soit ~1 kHz.
pub const DELAY_US: u64 = 1000;

/// Pause entre deux cycles de classification (ms).
pub const CYCLE_DELAY_MS: u64 = 200;

/// Dimension du vecteur de features.
pub const FEATURE_DIM: usize = 4;

/// Nombre de neurones cachés.
pub const HIDDEN_DIM: usize = 6;

/// Nombre de classes en sortie.
pub const CLASS_COUNT: usize = 3;
