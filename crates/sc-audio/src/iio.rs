use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sc_core::error::AcquisitionError;
use sc_core::traits::AnalogSource;

/// Racine sysfs des convertisseurs industrial-I/O.
pub const IIO_SYSFS_ROOT: &str = "/sys/bus/iio/devices";

/// ADC Linux exposé par le sous-système IIO.
///
/// Lit `iio:deviceN/in_voltageC_raw`. Le fichier reste ouvert ; chaque
/// lecture revient au début et relit la valeur courante.
///
/// # Example
/// ```no_run
/// use sc_audio::iio::IioSource;
/// use sc_core::traits::AnalogSource;
/// let mut adc = IioSource::open(0, 0).unwrap();
/// let sample = adc.read().unwrap();
/// ```
pub struct IioSource {
    file: File,
    path: PathBuf,
    buf: String,
}

impl IioSource {
    /// Open channel `channel` of `iio:device{device}` under the sysfs root.
    ///
    /// # Errors
    /// Returns an error if the channel file cannot be opened.
    pub fn open(device: u32, channel: u32) -> Result<Self> {
        Self::open_path(&channel_path(Path::new(IIO_SYSFS_ROOT), device, channel))
    }

    /// Open an explicit `*_raw` attribute file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened.
    pub fn open_path(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Canal ADC introuvable : {}", path.display()))?;
        log::info!("ADC IIO ouvert : {}", path.display());
        Ok(Self {
            file,
            path: path.to_path_buf(),
            buf: String::with_capacity(16),
        })
    }

    /// Path of the attribute being read.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// `<root>/iio:device{device}/in_voltage{channel}_raw`
#[must_use]
pub fn channel_path(root: &Path, device: u32, channel: u32) -> PathBuf {
    root.join(format!("iio:device{device}"))
        .join(format!("in_voltage{channel}_raw"))
}

impl AnalogSource for IioSource {
    fn read(&mut self) -> Result<i32, AcquisitionError> {
        self.file.seek(SeekFrom::Start(0))?;
        self.buf.clear();
        self.file.read_to_string(&mut self.buf)?;
        let text = self.buf.trim();
        text.parse::<i32>().map_err(|_| AcquisitionError::Malformed {
            raw: text.to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "iio"
    }
}
