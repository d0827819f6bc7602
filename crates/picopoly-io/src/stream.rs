//! Real-time audio output via cpal.
//!
//! The cpal output callback is the render context: it owns the engine and
//! the consumer half of the event queue, drains pending events before each
//! fixed-size block, renders, and hands converted samples to the device.

use crate::{Error, OutputStage, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Host, Stream};
use picopoly_core::IntDivider;
use picopoly_synth::queue::HeapCons;
use picopoly_synth::{MidiEvent, SynthEngine};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Extract device name via `description()` (cpal 0.17+).
fn device_name(device: &Device) -> std::result::Result<String, cpal::DeviceNameError> {
    device.description().map(|d| d.name().to_string())
}

/// Audio output device information.
#[derive(Debug, Clone)]
pub struct AudioDevice {
    /// Human-readable device name.
    pub name: String,
    /// Default sample rate in Hz.
    pub default_sample_rate: u32,
    /// Default channel count.
    pub channels: u16,
}

/// List all available audio output devices.
pub fn list_output_devices() -> Result<Vec<AudioDevice>> {
    let host = cpal::default_host();
    let mut devices = Vec::new();

    if let Ok(outputs) = host.output_devices() {
        for device in outputs {
            if let Ok(info) = describe(&device) {
                devices.push(info);
            }
        }
    }

    Ok(devices)
}

/// Get the default audio output device info.
pub fn default_output_device() -> Result<Option<AudioDevice>> {
    let host = cpal::default_host();
    Ok(host.default_output_device().and_then(|d| describe(&d).ok()))
}

fn describe(device: &Device) -> std::result::Result<AudioDevice, cpal::DeviceNameError> {
    let name = device_name(device)?;
    let (default_sample_rate, channels) = device
        .default_output_config()
        .map(|c| (c.sample_rate(), c.channels()))
        .unwrap_or((48000, 2));
    Ok(AudioDevice {
        name,
        default_sample_rate,
        channels,
    })
}

/// Find an output device by case-insensitive name substring or list index,
/// or return the default.
fn find_output_device(host: &Host, name_or_index: Option<&str>) -> Result<Device> {
    let Some(search) = name_or_index else {
        return host.default_output_device().ok_or(Error::NoDevice);
    };

    let devices: Vec<Device> = host
        .output_devices()
        .map_err(|e| Error::Stream(e.to_string()))?
        .collect();

    if let Ok(index) = search.parse::<usize>()
        && let Some(device) = devices.get(index)
    {
        return Ok(device.clone());
    }

    let search_lower = search.to_lowercase();
    devices
        .into_iter()
        .find(|d| {
            device_name(d)
                .map(|n| n.to_lowercase().contains(&search_lower))
                .unwrap_or(false)
        })
        .ok_or_else(|| Error::DeviceNotFound(format!("no output device matching '{}'", search)))
}

/// Output stream settings.
#[derive(Debug, Clone)]
pub struct SynthStreamConfig {
    /// Requested sample rate in Hz; must match the engine's.
    pub sample_rate: u32,
    /// Frames rendered per engine block.
    pub block_size: usize,
    /// Conversion from the engine mix to device samples.
    pub stage: OutputStage,
    /// Output device name substring or index (uses default if `None`).
    pub device: Option<String>,
}

impl Default for SynthStreamConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            block_size: 256,
            stage: OutputStage::default(),
            device: None,
        }
    }
}

/// A running output stream rendering a [`SynthEngine`].
///
/// The stream plays until it is stopped or dropped.
pub struct SynthStream {
    _stream: Stream,
    device_name: String,
    sample_rate: u32,
    channels: u16,
    running: Arc<AtomicBool>,
}

impl SynthStream {
    /// Move `engine` and the consumer half of the event queue into a new
    /// output stream and start playback.
    ///
    /// All render buffers are allocated here; the callback never allocates.
    pub fn start<const VOICES: usize, D>(
        mut engine: SynthEngine<VOICES, D>,
        mut events: HeapCons<MidiEvent>,
        config: &SynthStreamConfig,
    ) -> Result<Self>
    where
        D: IntDivider + Send + 'static,
    {
        let host = cpal::default_host();
        let device = find_output_device(&host, config.device.as_deref())?;
        let name = device_name(&device).unwrap_or_else(|_| "unknown".to_string());

        let channels = device
            .default_output_config()
            .map(|c| c.channels())
            .unwrap_or(2)
            .max(1);

        if engine.sample_rate() != config.sample_rate {
            tracing::warn!(
                engine = engine.sample_rate(),
                stream = config.sample_rate,
                "engine and stream sample rates differ, pitch will be off"
            );
        }

        let stream_config = cpal::StreamConfig {
            channels,
            sample_rate: config.sample_rate,
            buffer_size: cpal::BufferSize::Default,
        };

        let block_frames = config.block_size.max(1);
        let stage = config.stage;
        let out_channels = usize::from(channels);
        let mut block = vec![0i32; block_frames * 2];
        let mut fifo = vec![0.0f32; block_frames * 2];
        let mut read = fifo.len();

        let running = Arc::new(AtomicBool::new(true));
        let output_running = Arc::clone(&running);

        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    if !output_running.load(Ordering::Relaxed) {
                        data.fill(0.0);
                        return;
                    }

                    for frame in data.chunks_mut(out_channels) {
                        if read >= fifo.len() {
                            block.fill(0);
                            engine.process_block(&mut events, &mut block);
                            stage.write_f32(&block, &mut fifo);
                            read = 0;
                        }
                        let (left, right) = (fifo[read], fifo[read + 1]);
                        read += 2;

                        match frame {
                            [mono] => *mono = (left + right) * 0.5,
                            [l, r, rest @ ..] => {
                                *l = left;
                                *r = right;
                                rest.fill(0.0);
                            }
                            [] => {}
                        }
                    }
                },
                |err| tracing::warn!(error = %err, "output stream error"),
                None,
            )
            .map_err(|e| Error::Stream(e.to_string()))?;

        stream.play().map_err(|e| Error::Stream(e.to_string()))?;
        tracing::info!(
            device = %name,
            channels,
            sample_rate = config.sample_rate,
            block_size = block_frames,
            "output stream started"
        );

        Ok(Self {
            _stream: stream,
            device_name: name,
            sample_rate: config.sample_rate,
            channels,
            running,
        })
    }

    /// Name of the output device.
    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Stream sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Device channel count.
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Silence the output. The callback keeps running but no longer renders.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    /// Check if the stream is rendering.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for SynthStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SynthStream")
            .field("device_name", &self.device_name)
            .field("sample_rate", &self.sample_rate)
            .field("channels", &self.channels)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}
