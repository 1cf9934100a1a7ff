use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::assignment::PromptAssigner;
use crate::audio::{browser_clip, CaptureMode, MicrophoneCapture, WavClip};
use crate::session::{
    recording_filename, HeldRecording, Notice, PhaseName, Session, SessionError,
    SessionRegistry,
};
use crate::submission::{Review, Submitter};

pub const SUBMITTED_MESSAGE: &str = "Your contribution has been submitted!";
pub const DISCARDED_MESSAGE: &str = "Recording discarded. Ready to start a new one.";
pub const EXHAUSTED_MESSAGE: &str =
    "No more prompts available for you to record. Thank you for your contributions!";
pub const UPLOAD_ERROR_PREFIX: &str = "An error occurred during upload:";
pub const INTERRUPTED_MESSAGE: &str = "the upload was interrupted.";

/// How this server obtains recordings
pub enum Capture {
    Browser,
    Microphone(Arc<MicrophoneCapture>),
}

impl Capture {
    pub fn mode(&self) -> CaptureMode {
        match self {
            Capture::Browser => CaptureMode::Browser,
            Capture::Microphone(_) => CaptureMode::Microphone,
        }
    }
}

/// Result of an upload attempt, as shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Submitted,
    Failed(String),
}

/// Drives every session through identification, assignment, capture and submission
pub struct CrowdService {
    sessions: SessionRegistry,
    assigner: PromptAssigner,
    submitter: Submitter,
    capture: Capture,
    recordings_dir: PathBuf,
}

impl CrowdService {
    pub fn new(
        assigner: PromptAssigner,
        submitter: Submitter,
        capture: Capture,
        recordings_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            sessions: SessionRegistry::new(),
            assigner,
            submitter,
            capture,
            recordings_dir: recordings_dir.into(),
        }
    }

    /// Evict sessions idle for longer than `ttl` instead of the default hour.
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.sessions = SessionRegistry::with_idle_ttl(ttl);
        self
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    pub fn capture_mode(&self) -> CaptureMode {
        self.capture.mode()
    }

    /// Length of one microphone capture, 0 in browser mode
    pub fn microphone_secs(&self) -> u64 {
        match &self.capture {
            Capture::Microphone(capture) => capture.config().duration.as_secs(),
            Capture::Browser => 0,
        }
    }

    /// Username form submission. Blank input leaves a warning and stores nothing.
    pub fn identify(&self, session: &mut Session, input: &str) -> Result<(), SessionError> {
        match session.submit_username(input) {
            Ok(()) => Ok(()),
            Err(SessionError::BlankUsername) => {
                session.notify(Notice::warning(SessionError::BlankUsername.to_string()));
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Run prompt assignment if the session is waiting for a prompt.
    pub async fn refresh(&self, session: &mut Session) -> Result<()> {
        let Some(username) = session.needs_assignment().map(str::to_string) else {
            return Ok(());
        };

        let assignment = self.assigner.assign(&username).await?;
        session.apply_assignment(assignment)?;
        Ok(())
    }

    /// Hold a WAV payload posted by the browser.
    pub async fn record_upload(&self, session: &mut Session, bytes: Vec<u8>) -> Result<()> {
        let clip = browser_clip(bytes)?;
        self.hold(session, clip).await
    }

    /// Capture from the microphone; the session stays locked for the whole capture.
    pub async fn record_microphone(&self, session: &mut Session) -> Result<()> {
        let capture = match &self.capture {
            Capture::Microphone(capture) => Arc::clone(capture),
            Capture::Browser => anyhow::bail!("Microphone capture is not enabled"),
        };

        // Reject before blocking for the capture duration
        if session.prompt().is_none() {
            return Err(SessionError::InvalidTransition {
                action: "hold a recording",
                phase: session.phase_name(),
            }
            .into());
        }

        let clip = tokio::task::spawn_blocking(move || capture.capture())
            .await
            .context("Capture task panicked")??;

        self.hold(session, clip).await
    }

    /// Upload the held recording. Failures are reported through the session
    /// notice and keep the recording so the user can try again.
    pub async fn upload(&self, session: &mut Session, review: Review) -> Result<UploadOutcome> {
        let ticket = session.begin_submit()?;
        let mut guard = SubmitGuard {
            session,
            settled: false,
        };

        let result = self.submitter.submit(&ticket, &review).await;
        guard.settled = true;
        let session = &mut *guard.session;

        match result {
            Ok(receipt) => {
                session.complete_submit()?;
                info!(
                    "Session {} submitted {} as {}",
                    session.id(),
                    receipt.audio_path,
                    receipt.document_id
                );
                session.notify(Notice::success(SUBMITTED_MESSAGE));
                Ok(UploadOutcome::Submitted)
            }
            Err(e) => {
                session.fail_submit()?;
                let message = format!("{} {:#}", UPLOAD_ERROR_PREFIX, e);
                error!("Session {}: {}", session.id(), message);
                session.notify(Notice::error(message.clone()));
                Ok(UploadOutcome::Failed(message))
            }
        }
    }

    pub fn discard(&self, session: &mut Session) -> Result<(), SessionError> {
        session.discard()?;
        session.notify(Notice::info(DISCARDED_MESSAGE));
        Ok(())
    }

    async fn hold(&self, session: &mut Session, clip: WavClip) -> Result<()> {
        let username = match session.username() {
            Some(name) if session.prompt().is_some() => name.to_string(),
            _ => {
                return Err(SessionError::InvalidTransition {
                    action: "hold a recording",
                    phase: session.phase_name(),
                }
                .into())
            }
        };

        let filename = recording_filename(
            &username,
            chrono::Utc::now().timestamp(),
            &mut rand::thread_rng(),
        );
        let local_path = self.recordings_dir.join(&filename);

        tokio::fs::write(&local_path, &clip.bytes)
            .await
            .with_context(|| format!("Failed to write {}", local_path.display()))?;

        if clip.duration_seconds <= 0.0 {
            warn!("Session {} captured an empty clip", session.id());
        }

        session.hold_recording(HeldRecording {
            filename,
            local_path,
            clip,
        })?;
        Ok(())
    }
}

/// Returns a session to review when an upload is dropped or panics before
/// it settles, so the recording can be retried or discarded.
struct SubmitGuard<'a> {
    session: &'a mut Session,
    settled: bool,
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        if self.settled || self.session.phase_name() != PhaseName::Submitting {
            return;
        }

        warn!(
            "Session {}: upload abandoned before it finished",
            self.session.id()
        );
        match self.session.fail_submit() {
            Ok(()) => self.session.notify(Notice::error(format!(
                "{} {}",
                UPLOAD_ERROR_PREFIX, INTERRUPTED_MESSAGE
            ))),
            Err(e) => error!("Session {}: {}", self.session.id(), e),
        }
    }
}
