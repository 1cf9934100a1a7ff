pub mod assignment;
pub mod audio;
pub mod config;
pub mod firebase;
pub mod http;
pub mod prompts;
pub mod service;
pub mod session;
pub mod store;
pub mod submission;

pub use assignment::{Assignment, PromptAssigner};
pub use audio::{CaptureMode, MicrophoneCapture, MicrophoneConfig, SampleSource, WavClip};
pub use config::{Config, FirebaseSecrets};
pub use firebase::FirebaseClients;
pub use http::{create_router, AppState};
pub use prompts::PromptSet;
pub use service::{Capture, CrowdService, UploadOutcome};
pub use session::{Session, SessionError, SessionRegistry, SessionSnapshot};
pub use store::{ObjectStore, Rating, RecordingMetadata, RecordingStore};
pub use submission::{Review, Submitter};
