use anyhow::{Context, Result};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::io::Cursor;
use tracing::debug;

/// A WAV payload held in memory together with its format details
#[derive(Debug, Clone)]
pub struct WavClip {
    pub bytes: Vec<u8>,
    pub sample_rate: u32,
    pub channels: u16,
    pub duration_seconds: f64,
}

impl WavClip {
    /// Wrap an existing WAV payload, reading its header.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let (spec, frames) = {
            let reader = WavReader::new(Cursor::new(bytes.as_slice()))
                .context("Payload is not a WAV file")?;
            // duration() counts frames, not samples
            (reader.spec(), reader.duration())
        };

        let duration_seconds = frames as f64 / spec.sample_rate.max(1) as f64;

        debug!(
            "WAV payload: {:.1}s, {}Hz, {} channels, {} bytes",
            duration_seconds,
            spec.sample_rate,
            spec.channels,
            bytes.len()
        );

        Ok(Self {
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            duration_seconds,
            bytes,
        })
    }

    /// Encode interleaved 16-bit PCM samples as a WAV payload.
    pub fn encode(samples: &[i16], sample_rate: u32, channels: u16) -> Result<Self> {
        anyhow::ensure!(sample_rate > 0, "Sample rate must be greater than zero");
        anyhow::ensure!(channels > 0, "Channel count must be greater than zero");

        let spec = WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer =
                WavWriter::new(&mut cursor, spec).context("Failed to create WAV writer")?;
            for &sample in samples {
                writer
                    .write_sample(sample)
                    .context("Failed to write WAV sample")?;
            }
            writer.finalize().context("Failed to finalize WAV")?;
        }

        let frames = samples.len() / channels as usize;

        Ok(Self {
            bytes: cursor.into_inner(),
            sample_rate,
            channels,
            duration_seconds: frames as f64 / sample_rate as f64,
        })
    }
}
