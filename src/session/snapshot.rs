use serde::{Deserialize, Serialize};

use super::recording::HeldRecording;
use super::session::PhaseName;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// One-shot message shown on the next render
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Held recording details exposed to the page and the JSON API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingSummary {
    pub filename: String,
    pub duration_secs: f64,
    pub sample_rate: u32,
    pub channels: u16,
    pub size_bytes: usize,
}

impl From<&HeldRecording> for RecordingSummary {
    fn from(recording: &HeldRecording) -> Self {
        Self {
            filename: recording.filename.clone(),
            duration_secs: recording.clip.duration_seconds,
            sample_rate: recording.clip.sample_rate,
            channels: recording.clip.channels,
            size_bytes: recording.clip.bytes.len(),
        }
    }
}

/// Serializable view of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub phase: PhaseName,
    pub username: Option<String>,
    pub prompt: Option<String>,
    pub recording: Option<RecordingSummary>,
    pub notice: Option<Notice>,
}
