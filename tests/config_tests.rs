// Integration tests for configuration loading

use anyhow::Result;
use lyngual_crowd::config::{BUCKET_VAR, CREDENTIALS_VAR};
use lyngual_crowd::{CaptureMode, Config, FirebaseSecrets};
use std::path::PathBuf;

#[test]
fn test_defaults_without_config_file() -> Result<()> {
    let cfg = Config::load("/nonexistent/lyngual-crowd")?;

    assert_eq!(cfg.service.http.port, 8501);
    assert_eq!(cfg.service.session_ttl_secs, 3600);
    assert_eq!(cfg.prompts.path, PathBuf::from("prompts.csv"));
    assert_eq!(cfg.capture.mode, CaptureMode::Browser);
    assert_eq!(cfg.capture.duration_secs, 5);
    assert_eq!(cfg.capture.sample_rate, 44100);
    assert_eq!(cfg.capture.channels, 2);
    assert_eq!(cfg.firebase.collection, "recordings");

    Ok(())
}

#[test]
fn test_file_overrides_defaults() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("crowd.toml");
    std::fs::write(
        &path,
        "[capture]\nmode = \"microphone\"\nduration_secs = 3\n\n[prompts]\npath = \"data/prompts.csv\"\n",
    )?;

    let cfg = Config::load(path.to_str().unwrap())?;

    assert_eq!(cfg.capture.mode, CaptureMode::Microphone);
    assert_eq!(cfg.capture.duration_secs, 3);
    assert_eq!(cfg.capture.sample_rate, 44100, "unset keys keep defaults");
    assert_eq!(cfg.prompts.path, PathBuf::from("data/prompts.csv"));

    Ok(())
}

#[test]
fn test_secrets_are_required() {
    std::env::remove_var(CREDENTIALS_VAR);
    std::env::set_var(BUCKET_VAR, "lyngual-labs.appspot.com");

    let err = FirebaseSecrets::from_env().unwrap_err();
    assert!(err.to_string().contains(CREDENTIALS_VAR));

    std::env::set_var(CREDENTIALS_VAR, "{}");
    std::env::remove_var(BUCKET_VAR);

    let err = FirebaseSecrets::from_env().unwrap_err();
    assert!(err.to_string().contains(BUCKET_VAR));

    std::env::set_var(BUCKET_VAR, "lyngual-labs.appspot.com");
    let secrets = FirebaseSecrets::from_env().unwrap();
    assert_eq!(secrets.storage_bucket, "lyngual-labs.appspot.com");
    assert_eq!(secrets.credentials, "{}");
}
