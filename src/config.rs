use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

use crate::audio::CaptureMode;

/// Environment variable holding the serialized service-account JSON
pub const CREDENTIALS_VAR: &str = "firebase_credentials";

/// Environment variable holding the Cloud Storage bucket name
pub const BUCKET_VAR: &str = "storage_bucket";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub prompts: PromptsConfig,
    pub capture: CaptureConfig,
    pub firebase: FirebaseConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
    /// Idle time after which a browser session and its held recording are dropped
    pub session_ttl_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PromptsConfig {
    /// CSV file with a `prompt` column
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CaptureConfig {
    pub mode: CaptureMode,
    /// Directory that receives the local WAV copy of every capture
    pub recordings_path: PathBuf,
    /// Microphone capture length
    pub duration_secs: u64,
    pub sample_rate: u32,
    pub channels: u16,
    /// Largest browser upload accepted, in bytes
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FirebaseConfig {
    pub storage_url: String,
    pub firestore_url: String,
    pub collection: String,
}

impl Config {
    /// Load configuration from an optional file plus `CROWD__*` environment overrides.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("service.name", "lyngual-crowd")?
            .set_default("service.http.bind", "0.0.0.0")?
            .set_default("service.http.port", 8501)?
            .set_default("service.session_ttl_secs", 60 * 60)?
            .set_default("prompts.path", "prompts.csv")?
            .set_default("capture.mode", "browser")?
            .set_default("capture.recordings_path", ".")?
            .set_default("capture.duration_secs", 5)?
            .set_default("capture.sample_rate", 44100)?
            .set_default("capture.channels", 2)?
            .set_default("capture.max_upload_bytes", 25 * 1024 * 1024)?
            .set_default("firebase.storage_url", "https://storage.googleapis.com")?
            .set_default("firebase.firestore_url", "https://firestore.googleapis.com/v1")?
            .set_default("firebase.collection", "recordings")?
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("CROWD").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

/// Secrets that must come from the process environment
#[derive(Debug, Clone)]
pub struct FirebaseSecrets {
    /// Serialized service-account key
    pub credentials: String,
    pub storage_bucket: String,
}

impl FirebaseSecrets {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            credentials: std::env::var(CREDENTIALS_VAR)
                .with_context(|| format!("Environment variable {} not set", CREDENTIALS_VAR))?,
            storage_bucket: std::env::var(BUCKET_VAR)
                .with_context(|| format!("Environment variable {} not set", BUCKET_VAR))?,
        })
    }
}
