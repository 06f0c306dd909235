use thiserror::Error;

/// Errors raised while reading the analog channel.
///
/// Recovered at the cycle boundary: the current window is dropped and the
/// next cycle starts from scratch.
#[derive(Error, Debug)]
pub enum AcquisitionError {
    /// The underlying device could not be read.
    #[error("Lecture analogique impossible : {0}")]
    Io(#[from] std::io::Error),

    /// The device answered with something that is not an integer sample.
    #[error("Échantillon illisible : {raw:?}")]
    Malformed {
        /// Raw text returned by the device.
        raw: String,
    },

    /// The source has not produced any sample yet.
    #[error("Aucun échantillon disponible sur {source_name}")]
    NoData {
        /// Name of the source that had nothing to give.
        source_name: &'static str,
    },

    /// The capture stream reported an error.
    #[error("Erreur de stream : {0}")]
    Stream(String),
}

/// Errors originating from configuration handling.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Unknown analog source kind.
    #[error("Source inconnue : {kind}. Supporté : synthetic, iio, mic")]
    UnknownSource {
        /// The kind string that was requested.
        kind: String,
    },

    /// Unknown synthetic waveform.
    #[error("Forme d'onde inconnue : {name}. Supporté : silence, square, sine")]
    UnknownWaveform {
        /// The waveform name that was requested.
        name: String,
    },
}
