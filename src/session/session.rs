use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{debug, info};

use super::recording::HeldRecording;
use super::snapshot::{Notice, RecordingSummary, SessionSnapshot};
use crate::assignment::Assignment;

/// Phase of a session, without its data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseName {
    AwaitingUsername,
    AwaitingPromptAssignment,
    PromptsExhausted,
    AwaitingRecording,
    ReviewingRecording,
    Submitting,
}

impl fmt::Display for PhaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PhaseName::AwaitingUsername => "awaiting username",
            PhaseName::AwaitingPromptAssignment => "awaiting prompt assignment",
            PhaseName::PromptsExhausted => "prompts exhausted",
            PhaseName::AwaitingRecording => "awaiting recording",
            PhaseName::ReviewingRecording => "reviewing recording",
            PhaseName::Submitting => "submitting",
        };
        f.write_str(name)
    }
}

/// Session phase with the data each phase carries
#[derive(Debug, Clone)]
pub enum Phase {
    AwaitingUsername,
    AwaitingPromptAssignment {
        username: String,
    },
    PromptsExhausted {
        username: String,
    },
    AwaitingRecording {
        username: String,
        prompt: String,
    },
    ReviewingRecording {
        username: String,
        prompt: String,
        recording: HeldRecording,
    },
    Submitting {
        username: String,
        prompt: String,
        recording: HeldRecording,
    },
}

impl Phase {
    pub fn name(&self) -> PhaseName {
        match self {
            Phase::AwaitingUsername => PhaseName::AwaitingUsername,
            Phase::AwaitingPromptAssignment { .. } => PhaseName::AwaitingPromptAssignment,
            Phase::PromptsExhausted { .. } => PhaseName::PromptsExhausted,
            Phase::AwaitingRecording { .. } => PhaseName::AwaitingRecording,
            Phase::ReviewingRecording { .. } => PhaseName::ReviewingRecording,
            Phase::Submitting { .. } => PhaseName::Submitting,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Please enter a valid username.")]
    BlankUsername,

    #[error("Cannot {action} while {phase}")]
    InvalidTransition {
        action: &'static str,
        phase: PhaseName,
    },
}

/// Everything an upload needs, taken from the session when submission starts
#[derive(Debug, Clone)]
pub struct SubmissionTicket {
    pub username: String,
    pub prompt: String,
    pub recording: HeldRecording,
}

/// One browser session's state machine
///
/// Every operation either performs its transition or returns a
/// `SessionError` and leaves the session untouched.
#[derive(Debug)]
pub struct Session {
    id: String,
    created_at: DateTime<Utc>,
    phase: Phase,
    notice: Option<Notice>,
}

impl Session {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            created_at: Utc::now(),
            phase: Phase::AwaitingUsername,
            notice: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn phase_name(&self) -> PhaseName {
        self.phase.name()
    }

    pub fn username(&self) -> Option<&str> {
        match &self.phase {
            Phase::AwaitingUsername => None,
            Phase::AwaitingPromptAssignment { username }
            | Phase::PromptsExhausted { username }
            | Phase::AwaitingRecording { username, .. }
            | Phase::ReviewingRecording { username, .. }
            | Phase::Submitting { username, .. } => Some(username),
        }
    }

    pub fn prompt(&self) -> Option<&str> {
        match &self.phase {
            Phase::AwaitingRecording { prompt, .. }
            | Phase::ReviewingRecording { prompt, .. }
            | Phase::Submitting { prompt, .. } => Some(prompt),
            _ => None,
        }
    }

    pub fn recording(&self) -> Option<&HeldRecording> {
        match &self.phase {
            Phase::ReviewingRecording { recording, .. } | Phase::Submitting { recording, .. } => {
                Some(recording)
            }
            _ => None,
        }
    }

    /// Username of a session waiting for a prompt
    pub fn needs_assignment(&self) -> Option<&str> {
        match &self.phase {
            Phase::AwaitingPromptAssignment { username } => Some(username),
            _ => None,
        }
    }

    pub fn notify(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }

    /// Take the pending notice so it is shown once
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Store the trimmed username. Blank input is rejected and nothing is stored.
    pub fn submit_username(&mut self, input: &str) -> Result<(), SessionError> {
        self.require_phase(PhaseName::AwaitingUsername, "submit a username")?;

        let username = input.trim();
        if username.is_empty() {
            return Err(SessionError::BlankUsername);
        }

        info!("Session {} identified as {}", self.id, username);
        self.phase = Phase::AwaitingPromptAssignment {
            username: username.to_string(),
        };
        Ok(())
    }

    pub fn apply_assignment(&mut self, assignment: Assignment) -> Result<(), SessionError> {
        let username = match &self.phase {
            Phase::AwaitingPromptAssignment { username } => username.clone(),
            other => return Err(invalid("assign a prompt", other)),
        };

        self.phase = match assignment {
            Assignment::Prompt(prompt) => {
                debug!("Session {} assigned prompt: {}", self.id, prompt);
                Phase::AwaitingRecording { username, prompt }
            }
            Assignment::Exhausted => {
                info!("Session {}: no prompts left for {}", self.id, username);
                Phase::PromptsExhausted { username }
            }
        };
        Ok(())
    }

    /// Hold a fresh capture, replacing any recording already held.
    pub fn hold_recording(&mut self, recording: HeldRecording) -> Result<(), SessionError> {
        let (username, prompt) = match &self.phase {
            Phase::AwaitingRecording { username, prompt }
            | Phase::ReviewingRecording {
                username, prompt, ..
            } => (username.clone(), prompt.clone()),
            other => return Err(invalid("hold a recording", other)),
        };

        debug!("Session {} holding {}", self.id, recording.filename);
        self.phase = Phase::ReviewingRecording {
            username,
            prompt,
            recording,
        };
        Ok(())
    }

    pub fn begin_submit(&mut self) -> Result<SubmissionTicket, SessionError> {
        let phase = std::mem::replace(&mut self.phase, Phase::AwaitingUsername);
        match phase {
            Phase::ReviewingRecording {
                username,
                prompt,
                recording,
            } => {
                let ticket = SubmissionTicket {
                    username: username.clone(),
                    prompt: prompt.clone(),
                    recording: recording.clone(),
                };
                self.phase = Phase::Submitting {
                    username,
                    prompt,
                    recording,
                };
                Ok(ticket)
            }
            other => {
                let err = invalid("submit a recording", &other);
                self.phase = other;
                Err(err)
            }
        }
    }

    /// Upload finished: drop the recording and prompt so the next render reassigns.
    pub fn complete_submit(&mut self) -> Result<(), SessionError> {
        let username = match &self.phase {
            Phase::Submitting { username, .. } => username.clone(),
            other => return Err(invalid("complete a submission", other)),
        };

        self.phase = Phase::AwaitingPromptAssignment { username };
        Ok(())
    }

    /// Upload failed: return to review with the same recording and prompt.
    pub fn fail_submit(&mut self) -> Result<(), SessionError> {
        let phase = std::mem::replace(&mut self.phase, Phase::AwaitingUsername);
        match phase {
            Phase::Submitting {
                username,
                prompt,
                recording,
            } => {
                self.phase = Phase::ReviewingRecording {
                    username,
                    prompt,
                    recording,
                };
                Ok(())
            }
            other => {
                let err = invalid("fail a submission", &other);
                self.phase = other;
                Err(err)
            }
        }
    }

    /// Drop the held recording and the current prompt without persisting anything.
    pub fn discard(&mut self) -> Result<HeldRecording, SessionError> {
        let phase = std::mem::replace(&mut self.phase, Phase::AwaitingUsername);
        match phase {
            Phase::ReviewingRecording {
                username,
                recording,
                ..
            } => {
                info!("Session {} discarded {}", self.id, recording.filename);
                self.phase = Phase::AwaitingPromptAssignment { username };
                Ok(recording)
            }
            other => {
                let err = invalid("discard a recording", &other);
                self.phase = other;
                Err(err)
            }
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id.clone(),
            phase: self.phase_name(),
            username: self.username().map(str::to_string),
            prompt: self.prompt().map(str::to_string),
            recording: self.recording().map(RecordingSummary::from),
            notice: self.notice.clone(),
        }
    }

    fn require_phase(&self, expected: PhaseName, action: &'static str) -> Result<(), SessionError> {
        if self.phase_name() == expected {
            Ok(())
        } else {
            Err(invalid(action, &self.phase))
        }
    }
}

fn invalid(action: &'static str, phase: &Phase) -> SessionError {
    SessionError::InvalidTransition {
        action,
        phase: phase.name(),
    }
}
