use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Rater-supplied quality label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Rating {
    #[default]
    Good,
    Average,
    Poor,
}

impl Rating {
    pub const ALL: [Rating; 3] = [Rating::Good, Rating::Average, Rating::Poor];

    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::Good => "Good",
            Rating::Average => "Average",
            Rating::Poor => "Poor",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rating {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rating::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| format!("Unknown rating: {}", s))
    }
}

/// One submitted recording, as persisted in the `recordings` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingMetadata {
    pub user_id: String,
    pub text_prompt: String,
    /// Object key of the WAV upload (`audio/...`)
    pub audio_path: String,
    /// Assigned by the store on write; `None` before that
    pub timestamp: Option<DateTime<Utc>>,
    pub rating: Rating,
    pub comments: String,
}
