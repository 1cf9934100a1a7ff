use anyhow::{anyhow, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, SampleRate, StreamConfig};
use std::sync::{Arc, Mutex};
use tracing::error;

use super::capture::{MicrophoneConfig, SampleSource};

/// Default input device of the default cpal host
pub struct DeviceSource;

impl DeviceSource {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DeviceSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleSource for DeviceSource {
    fn record(&self, config: &MicrophoneConfig) -> Result<Vec<i16>> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .context("No default input device available")?;

        let stream_config = StreamConfig {
            channels: config.channels,
            sample_rate: SampleRate(config.sample_rate),
            buffer_size: BufferSize::Default,
        };

        let samples = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&samples);

        let data_callback = move |data: &[f32], _: &cpal::InputCallbackInfo| {
            if let Ok(mut buffer) = sink.lock() {
                buffer.extend(data.iter().map(|&s| {
                    (s * i16::MAX as f32).clamp(i16::MIN as f32, i16::MAX as f32) as i16
                }));
            }
        };

        let stream = device
            .build_input_stream(
                &stream_config,
                data_callback,
                |err| error!("Microphone stream error: {}", err),
                None,
            )
            .context("Failed to open input stream")?;

        stream.play().context("Failed to start input stream")?;
        std::thread::sleep(config.duration);
        drop(stream);

        let samples = samples
            .lock()
            .map_err(|_| anyhow!("Sample buffer poisoned"))?
            .clone();

        Ok(samples)
    }

    fn name(&self) -> &str {
        "default input device"
    }
}
