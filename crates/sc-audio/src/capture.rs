use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use anyhow::Result;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::{Consumer, RingBuffer};
use sc_core::config::AdcResolution;
use sc_core::error::AcquisitionError;
use sc_core::traits::AnalogSource;

/// Microphone vu comme un canal analogique, via cpal.
///
/// Le callback cpal pousse des échantillons mono f32 dans un ring buffer
/// lock-free. Chaque `read()` vide le buffer et renvoie le dernier
/// échantillon (échantillonneur-bloqueur), quantifié à la résolution ADC.
///
/// Le `cpal::Stream` n'est pas `Send` : il vit dans un thread dédié qui le
/// garde ouvert jusqu'au drop de la source.
///
/// # Example
/// ```no_run
/// use sc_audio::capture::MicSource;
/// use sc_core::config::AdcResolution;
/// let mic = MicSource::start_default(AdcResolution::Bits12).unwrap();
/// ```
pub struct MicSource {
    consumer: Consumer<f32>,
    resolution: AdcResolution,
    last: Option<f32>,
    failed: Arc<AtomicBool>,
    stop_tx: flume::Sender<()>,
}

impl MicSource {
    /// Start capturing from the default input device.
    ///
    /// # Errors
    /// Returns an error if the audio device is unavailable.
    pub fn start_default(resolution: AdcResolution) -> Result<Self> {
        let (ready_tx, ready_rx) = flume::bounded::<Result<Consumer<f32>>>(1);
        let (stop_tx, stop_rx) = flume::bounded::<()>(1);
        let failed = Arc::new(AtomicBool::new(false));
        let failed_cb = Arc::clone(&failed);

        thread::Builder::new()
            .name("sc-mic".to_string())
            .spawn(move || match open_stream(failed_cb) {
                Ok((stream, consumer)) => {
                    let _ = ready_tx.send(Ok(consumer));
                    // Keep the stream alive until the source is dropped
                    let _ = stop_rx.recv();
                    drop(stream);
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                }
            })?;

        let consumer = ready_rx
            .recv()
            .map_err(|_| anyhow::anyhow!("Thread micro terminé avant l'ouverture du stream"))??;

        Ok(Self {
            consumer,
            resolution,
            last: None,
            failed,
            stop_tx,
        })
    }
}

fn open_stream(failed: Arc<AtomicBool>) -> Result<(cpal::Stream, Consumer<f32>)> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| anyhow::anyhow!("Pas de périphérique audio trouvé"))?;

    let config = device.default_input_config()?;
    let sample_rate = config.sample_rate().0;
    let channels = usize::from(config.channels()).max(1);

    // Ring buffer: 1 second of audio @ sample_rate
    let (mut producer, consumer) = RingBuffer::new(sample_rate as usize);

    let stream = device.build_input_stream(
        &config.into(),
        move |data: &[f32], _: &cpal::InputCallbackInfo| {
            // Downmix to mono and push into ring buffer
            for chunk in data.chunks(channels) {
                let mono: f32 = chunk.iter().sum::<f32>() / channels as f32;
                let _ = producer.push(mono);
            }
        },
        move |err| {
            log::error!("Audio stream error: {err}");
            failed.store(true, Ordering::Relaxed);
        },
        None,
    )?;

    stream.play()?;
    log::info!("Capture micro démarrée @ {sample_rate}Hz, {channels} canaux");
    Ok((stream, consumer))
}

impl AnalogSource for MicSource {
    fn read(&mut self) -> Result<i32, AcquisitionError> {
        if self.failed.swap(false, Ordering::Relaxed) {
            self.last = None;
            return Err(AcquisitionError::Stream(
                "le périphérique d'entrée a signalé une erreur".into(),
            ));
        }
        while let Ok(sample) = self.consumer.pop() {
            self.last = Some(sample);
        }
        self.last
            .map(|s| self.resolution.quantize(s))
            .ok_or(AcquisitionError::NoData { source_name: "mic" })
    }

    fn name(&self) -> &'static str {
        "mic"
    }
}

impl Drop for MicSource {
    fn drop(&mut self) {
        let _ = self.stop_tx.try_send(());
    }
}
