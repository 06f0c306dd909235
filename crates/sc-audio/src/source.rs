use sc_core::config::{ClassifierConfig, SourceKind};
use sc_core::traits::AnalogSource;

use crate::iio::IioSource;
use crate::synthetic::SyntheticSource;

/// Fabrique le backend analogique choisi par la configuration.
///
/// Appelé une seule fois au démarrage ; la boucle ne branche jamais sur le
/// type de source.
///
/// # Errors
/// Retourne une erreur si le périphérique ne peut pas être ouvert, ou si
/// `mic` est demandé sans la feature `mic`.
///
/// # Example
/// ```
/// use sc_audio::source::create_source;
/// use sc_core::config::ClassifierConfig;
/// use sc_core::traits::AnalogSource;
/// let src = create_source(&ClassifierConfig::default()).unwrap();
/// assert_eq!(src.name(), "synthetic");
/// ```
pub fn create_source(config: &ClassifierConfig) -> anyhow::Result<Box<dyn AnalogSource>> {
    let source: Box<dyn AnalogSource> = match config.source {
        SourceKind::Synthetic => Box::new(SyntheticSource::from_config(config)),
        SourceKind::Iio => Box::new(IioSource::open(config.iio_device, config.iio_channel)?),
        SourceKind::Mic => open_mic(config)?,
    };
    log::info!("Source analogique : {}", source.name());
    Ok(source)
}

#[cfg(feature = "mic")]
fn open_mic(config: &ClassifierConfig) -> anyhow::Result<Box<dyn AnalogSource>> {
    Ok(Box::new(crate::capture::MicSource::start_default(
        config.resolution,
    )?))
}

#[cfg(not(feature = "mic"))]
fn open_mic(_config: &ClassifierConfig) -> anyhow::Result<Box<dyn AnalogSource>> {
    anyhow::bail!("Source micro indisponible : recompiler avec --features mic")
}

#[cfg(test)]
mod tests {
    use super::*;
    use sc_core::config::Waveform;

    #[test]
    fn synthetic_follows_config() {
        let config = ClassifierConfig {
            waveform: Waveform::Silence,
            offset: 9,
            ..ClassifierConfig::default()
        };
        let mut src = create_source(&config).unwrap();
        assert_eq!(src.read().unwrap(), 9);
    }

    #[test]
    fn missing_iio_device_is_an_error() {
        let config = ClassifierConfig {
            source: SourceKind::Iio,
            iio_device: 4242,
            ..ClassifierConfig::default()
        };
        assert!(create_source(&config).is_err());
    }

    #[cfg(not(feature = "mic"))]
    #[test]
    fn mic_requires_feature() {
        let config = ClassifierConfig {
            source: SourceKind::Mic,
            ..ClassifierConfig::default()
        };
        let err = create_source(&config).err().unwrap();
        assert!(err.to_string().contains("mic"));
    }
}
