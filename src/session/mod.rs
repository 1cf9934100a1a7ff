//! Per-browser session management
//!
//! This module provides the `Session` state machine that tracks:
//! - The username gate
//! - The prompt currently assigned
//! - The recording held for review
//! - One-shot notices for the next render

mod recording;
mod registry;
mod session;
mod snapshot;

pub use recording::{recording_filename, HeldRecording};
pub use registry::{SessionHandle, SessionRegistry};
pub use session::{Phase, PhaseName, Session, SessionError, SubmissionTicket};
pub use snapshot::{Notice, NoticeLevel, RecordingSummary, SessionSnapshot};
