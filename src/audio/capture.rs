//! Live microphone capture via CPAL.
//!
//! The capture driver invokes its data callback once per filled block,
//! sequentially. The callback stamps each block against the capture clock
//! and hands it over a channel; the consuming loop therefore sees blocks
//! strictly in arrival order, one at a time. Driver errors travel the same
//! channel so the consumer can report and skip them.

use crate::audio::{AudioBlock, BlockSource, CaptureEvent};
use crate::config::CaptureConfig;
use anyhow::{Result, anyhow};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, StreamInstant};
use std::sync::mpsc::{Receiver, channel};

/// Information about an available audio input device.
#[derive(Debug)]
pub struct AudioDeviceInfo {
    pub name: String,
    pub is_default: bool,
    pub supported_sample_rates: Vec<u32>,
    pub supported_formats: Vec<SampleFormat>,
}

/// List all available audio input devices.
pub fn list_devices() -> Result<Vec<AudioDeviceInfo>> {
    let host = cpal::default_host();
    let devices = host.input_devices()?;
    let default_device = host.default_input_device();

    let mut device_infos = Vec::new();

    for device in devices {
        let name = device.name().unwrap_or("Unknown Device".to_string());
        let is_default = default_device
            .as_ref()
            .map(|d| d.name().unwrap_or_default() == name)
            .unwrap_or(false);

        let supported_sample_rates = device
            .supported_input_configs()?
            .map(|c| c.max_sample_rate().0)
            .collect();

        let supported_formats = device
            .supported_input_configs()?
            .map(|c| c.sample_format())
            .collect();

        device_infos.push(AudioDeviceInfo {
            name,
            is_default,
            supported_sample_rates,
            supported_formats,
        });
    }

    Ok(device_infos)
}

/// A live [`BlockSource`] backed by a CPAL input stream.
///
/// The stream is owned here; dropping the source stops capture.
pub struct LiveCapture {
    _stream: cpal::Stream,
    rx: Receiver<CaptureEvent>,
}

impl LiveCapture {
    /// Open the configured named device and start capturing.
    pub fn open(config: &CaptureConfig) -> Result<Self> {
        let host = cpal::default_host();
        let device = find_device(&host, &config.device_name)?;

        let stream_config = cpal::StreamConfig {
            channels: config.channels,
            sample_rate: cpal::SampleRate(config.sample_rate),
            buffer_size: cpal::BufferSize::Fixed(config.block_frames() as u32),
        };

        let (tx, rx) = channel();
        let error_tx = tx.clone();
        let sample_rate = config.sample_rate;
        let channels = config.channels;

        // Timestamps are capture-clock offsets from the first callback;
        // the frame counter is the fallback if the clock ever steps back.
        let mut first_instant: Option<StreamInstant> = None;
        let mut frames_seen: u64 = 0;

        let stream = device.build_input_stream(
            &stream_config,
            move |data: &[f32], info: &cpal::InputCallbackInfo| {
                let capture = info.timestamp().capture;
                let timestamp = match first_instant {
                    None => {
                        first_instant = Some(capture);
                        0.0
                    }
                    Some(first) => capture
                        .duration_since(&first)
                        .map(|d| d.as_secs_f64())
                        .unwrap_or(frames_seen as f64 / sample_rate as f64),
                };
                frames_seen += (data.len() / channels.max(1) as usize) as u64;

                let _ = tx.send(CaptureEvent::Block(AudioBlock {
                    samples: data.to_vec(),
                    channels,
                    sample_rate,
                    timestamp,
                }));
            },
            move |err| {
                let _ = error_tx.send(CaptureEvent::Error(err.to_string()));
            },
            None,
        )?;

        stream.play()?;

        Ok(Self {
            _stream: stream,
            rx,
        })
    }
}

impl BlockSource for LiveCapture {
    fn next_event(&mut self) -> Option<CaptureEvent> {
        self.rx.recv().ok()
    }
}

fn find_device(host: &cpal::Host, name: &str) -> Result<Device> {
    for device in host.input_devices()? {
        if device.name().map(|n| n.contains(name)).unwrap_or(false) {
            return Ok(device);
        }
    }
    Err(anyhow!(
        "Audio input device '{}' not found (run `beepmon devices` to list)",
        name
    ))
}
