//! HTTP surface of the recorder
//!
//! One HTML page per session plus form endpoints:
//! - GET / - Render the page for the session's phase
//! - POST /username - Identify the session
//! - POST /record - Hold a browser-recorded WAV
//! - POST /record/microphone - Capture from the server microphone
//! - GET /recording/audio - Play back the held recording
//! - POST /upload - Submit the held recording
//! - POST /discard - Drop the held recording
//! - GET /api/session - Session snapshot as JSON
//! - GET /health - Health check

mod cookie;
mod error;
mod handlers;
mod routes;
mod state;
pub mod views;

pub use cookie::SESSION_COOKIE;
pub use error::AppError;
pub use routes::create_router;
pub use state::AppState;
