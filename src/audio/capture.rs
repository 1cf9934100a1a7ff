use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

use super::wav::WavClip;

/// How recordings reach the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CaptureMode {
    /// WAV file posted from the browser page
    Browser,
    /// Fixed-length capture from the server's default input device
    Microphone,
}

/// Parameters for a fixed-duration microphone capture
#[derive(Debug, Clone)]
pub struct MicrophoneConfig {
    pub duration: Duration,
    pub sample_rate: u32,
    pub channels: u16,
}

impl Default for MicrophoneConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(5),
            sample_rate: 44100,
            channels: 2,
        }
    }
}

/// Blocking source of interleaved 16-bit PCM samples
///
/// Implementations:
/// - `DeviceSource`: default input device via cpal (feature `microphone`)
pub trait SampleSource: Send + Sync {
    /// Record for `config.duration` and return the interleaved samples.
    /// Blocks the calling thread for the whole capture.
    fn record(&self, config: &MicrophoneConfig) -> Result<Vec<i16>>;

    /// Source name for logging
    fn name(&self) -> &str;
}

/// Fixed-duration microphone capture producing a WAV clip
pub struct MicrophoneCapture {
    config: MicrophoneConfig,
    source: Box<dyn SampleSource>,
}

impl MicrophoneCapture {
    pub fn new(config: MicrophoneConfig, source: Box<dyn SampleSource>) -> Self {
        Self { config, source }
    }

    pub fn config(&self) -> &MicrophoneConfig {
        &self.config
    }

    /// Run one capture. Blocks for the configured duration.
    pub fn capture(&self) -> Result<WavClip> {
        // Checked before the device is opened
        anyhow::ensure!(
            self.config.sample_rate > 0 && self.config.channels > 0,
            "Capture needs a non-zero sample rate and channel count"
        );

        info!(
            "Capturing {:.1}s from {} ({}Hz, {} channels)",
            self.config.duration.as_secs_f64(),
            self.source.name(),
            self.config.sample_rate,
            self.config.channels
        );

        let samples = self
            .source
            .record(&self.config)
            .context("Microphone capture failed")?;

        WavClip::encode(&samples, self.config.sample_rate, self.config.channels)
    }
}

/// Accept a WAV payload posted by the browser widget.
pub fn browser_clip(bytes: Vec<u8>) -> Result<WavClip> {
    if bytes.is_empty() {
        anyhow::bail!("No audio was recorded");
    }
    WavClip::from_bytes(bytes)
}

/// Build the sample source for server-side capture.
pub fn default_sample_source() -> Result<Box<dyn SampleSource>> {
    #[cfg(feature = "microphone")]
    {
        Ok(Box::new(super::device::DeviceSource::new()))
    }

    #[cfg(not(feature = "microphone"))]
    {
        anyhow::bail!("Microphone capture requires building with the `microphone` feature")
    }
}
