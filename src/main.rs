use anyhow::{Context, Result};
use clap::Parser;
use lyngual_crowd::audio::default_sample_source;
use lyngual_crowd::{
    create_router, AppState, Capture, CaptureMode, Config, CrowdService, FirebaseClients,
    FirebaseSecrets, MicrophoneCapture, MicrophoneConfig, PromptAssigner, Submitter,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Parser)]
#[command(version, about = "Crowdsourced prompt recording server")]
struct Args {
    /// Configuration file (extension optional)
    #[arg(long, default_value = "config/lyngual-crowd")]
    config: String,

    /// Override the configured capture mode
    #[arg(long, value_enum)]
    capture: Option<CaptureMode>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let mut cfg = Config::load(&args.config)?;
    if let Some(mode) = args.capture {
        cfg.capture.mode = mode;
    }

    let secrets = FirebaseSecrets::from_env()?;

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));
    info!("Prompt file: {}", cfg.prompts.path.display());
    info!("Storage bucket: {}", secrets.storage_bucket);
    info!("Capture mode: {:?}", cfg.capture.mode);

    let firebase = FirebaseClients::connect(&cfg.firebase, &secrets)?;

    let capture = match cfg.capture.mode {
        CaptureMode::Browser => Capture::Browser,
        CaptureMode::Microphone => {
            let config = MicrophoneConfig {
                duration: Duration::from_secs(cfg.capture.duration_secs),
                sample_rate: cfg.capture.sample_rate,
                channels: cfg.capture.channels,
            };
            Capture::Microphone(Arc::new(MicrophoneCapture::new(
                config,
                default_sample_source()?,
            )))
        }
    };

    std::fs::create_dir_all(&cfg.capture.recordings_path).with_context(|| {
        format!(
            "Failed to create recordings directory {}",
            cfg.capture.recordings_path.display()
        )
    })?;

    let service = CrowdService::new(
        PromptAssigner::new(&cfg.prompts.path, firebase.firestore.clone()),
        Submitter::new(firebase.storage.clone(), firebase.firestore.clone()),
        capture,
        &cfg.capture.recordings_path,
    )
    .with_session_ttl(Duration::from_secs(cfg.service.session_ttl_secs));
    let service = Arc::new(service);

    // Sweep even when no new sessions arrive
    let sessions = service.sessions().clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sessions.idle_ttl().max(Duration::from_secs(1)));
        loop {
            ticker.tick().await;
            sessions.evict_idle().await;
        }
    });

    let state = AppState::new(
        service,
        &cfg.service.name,
        cfg.capture.max_upload_bytes,
    );
    let app = create_router(state);

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("HTTP server listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
