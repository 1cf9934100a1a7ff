// Shared fixtures for integration tests: a service wired to in-memory stores,
// a temporary prompt file and a temporary recordings directory.
#![allow(dead_code)]

use anyhow::Result;
use lyngual_crowd::store::{MemoryObjectStore, MemoryRecordingStore};
use lyngual_crowd::{
    Capture, CrowdService, MicrophoneConfig, ObjectStore, PromptAssigner, SampleSource,
    Submitter, WavClip,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub struct Harness {
    pub service: Arc<CrowdService>,
    pub objects: Arc<MemoryObjectStore>,
    pub records: Arc<MemoryRecordingStore>,
    pub prompts_path: PathBuf,
    pub recordings_dir: PathBuf,
    // Kept alive for the lifetime of the harness
    pub dir: TempDir,
}

pub fn harness(prompts: &[&str]) -> Result<Harness> {
    harness_with_capture(prompts, Capture::Browser)
}

pub fn harness_with_capture(prompts: &[&str], capture: Capture) -> Result<Harness> {
    let dir = tempfile::tempdir()?;
    let prompts_path = write_prompts(dir.path(), prompts)?;
    let recordings_dir = dir.path().join("recordings");
    std::fs::create_dir_all(&recordings_dir)?;

    let objects = Arc::new(MemoryObjectStore::new());
    let records = Arc::new(MemoryRecordingStore::new());

    let service = CrowdService::new(
        PromptAssigner::new(&prompts_path, records.clone()),
        Submitter::new(objects.clone(), records.clone()),
        capture,
        &recordings_dir,
    );

    Ok(Harness {
        service: Arc::new(service),
        objects,
        records,
        prompts_path,
        recordings_dir,
        dir,
    })
}

/// Write a one-column prompt CSV
pub fn write_prompts(dir: &Path, prompts: &[&str]) -> Result<PathBuf> {
    let path = dir.join("prompts.csv");
    let mut writer = csv::Writer::from_path(&path)?;
    writer.write_record(["prompt"])?;
    for prompt in prompts {
        writer.write_record([*prompt])?;
    }
    writer.flush()?;
    Ok(path)
}

/// A short stereo 44.1kHz WAV payload
pub fn wav_bytes(frames: usize) -> Result<Vec<u8>> {
    let samples: Vec<i16> = (0..frames * 2).map(|i| ((i % 64) as i16 - 32) * 256).collect();
    Ok(WavClip::encode(&samples, 44100, 2)?.bytes)
}

/// Deterministic sample source standing in for a microphone
pub struct ToneSource;

impl SampleSource for ToneSource {
    fn record(&self, config: &MicrophoneConfig) -> Result<Vec<i16>> {
        let frames = (config.duration.as_secs_f64() * config.sample_rate as f64) as usize;
        Ok((0..frames * config.channels as usize)
            .map(|i| ((i % 100) as i16 - 50) * 100)
            .collect())
    }

    fn name(&self) -> &str {
        "tone"
    }
}

/// Source whose device cannot be opened
pub struct BrokenSource;

impl SampleSource for BrokenSource {
    fn record(&self, _config: &MicrophoneConfig) -> Result<Vec<i16>> {
        anyhow::bail!("No default input device available")
    }

    fn name(&self) -> &str {
        "broken"
    }
}

/// Object store whose writes take `delay` before succeeding
pub struct SlowObjectStore {
    pub delay: Duration,
    pub inner: MemoryObjectStore,
}

#[async_trait::async_trait]
impl ObjectStore for SlowObjectStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<()> {
        tokio::time::sleep(self.delay).await;
        self.inner.put(key, bytes, content_type).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.inner.delete(key).await
    }

    fn name(&self) -> &str {
        "slow"
    }
}

/// Object store that panics on write
pub struct PanickingObjectStore;

#[async_trait::async_trait]
impl ObjectStore for PanickingObjectStore {
    async fn put(&self, _key: &str, _bytes: Vec<u8>, _content_type: &str) -> Result<()> {
        panic!("storage client crashed")
    }

    async fn delete(&self, _key: &str) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "panicking"
    }
}

/// A browser-mode service over the given object store and fresh metadata store
pub fn service_with_objects(
    dir: &Path,
    prompts: &[&str],
    objects: Arc<dyn ObjectStore>,
) -> Result<(CrowdService, Arc<MemoryRecordingStore>)> {
    let prompts_path = write_prompts(dir, prompts)?;
    let recordings_dir = dir.join("recordings");
    std::fs::create_dir_all(&recordings_dir)?;

    let records = Arc::new(MemoryRecordingStore::new());
    let service = CrowdService::new(
        PromptAssigner::new(&prompts_path, records.clone()),
        Submitter::new(objects, records.clone()),
        Capture::Browser,
        &recordings_dir,
    );
    Ok((service, records))
}
