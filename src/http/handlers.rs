use super::cookie;
use super::error::AppError;
use super::state::AppState;
use super::views;
use crate::session::SessionHandle;
use crate::store::{Rating, WAV_CONTENT_TYPE};
use crate::submission::Review;
use axum::{
    extract::{Multipart, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Json, Redirect, Response},
    Form,
};
use serde::Deserialize;
use tracing::{debug, info};

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct UsernameForm {
    #[serde(default)]
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct UploadForm {
    /// Defaults to "Good" when absent
    pub rating: Option<String>,

    /// Optional free-text comment
    #[serde(default)]
    pub comments: String,
}

// ============================================================================
// Session plumbing
// ============================================================================

/// Session bound to the request's cookie, and whether it was just created
struct BoundSession {
    id: String,
    handle: SessionHandle,
    created: bool,
}

async fn bind_session(state: &AppState, headers: &HeaderMap) -> BoundSession {
    let (id, handle, created) = state
        .service
        .sessions()
        .get_or_create(cookie::session_id(headers).as_deref())
        .await;

    BoundSession {
        id,
        handle,
        created,
    }
}

/// Attach the session cookie when the session was created by this request
fn respond(bound: &BoundSession, response: impl IntoResponse) -> Response {
    let mut response = response.into_response();
    if bound.created {
        response
            .headers_mut()
            .append(header::SET_COOKIE, cookie::set_session(&bound.id));
    }
    response
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /
/// Render the page for the session's current phase
pub async fn index(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, AppError> {
    let bound = bind_session(&state, &headers).await;

    let snapshot = {
        let mut session = bound.handle.lock().await;
        state.service.refresh(&mut session).await?;
        let snapshot = session.snapshot();
        session.take_notice();
        snapshot
    };

    let page = views::render_page(&state.page, &snapshot);
    Ok(respond(&bound, Html(page)))
}

/// POST /username
/// Identify the session
pub async fn submit_username(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<UsernameForm>,
) -> Result<Response, AppError> {
    let bound = bind_session(&state, &headers).await;

    {
        let mut session = bound.handle.lock().await;
        state.service.identify(&mut session, &form.username)?;
    }

    Ok(respond(&bound, Redirect::to("/")))
}

/// POST /record
/// Hold a WAV file posted by the browser (multipart field `audio`)
pub async fn record_upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let bound = bind_session(&state, &headers).await;

    let mut audio = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::MalformedPayload(e.to_string()))?
    {
        if field.name() == Some("audio") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::MalformedPayload(e.to_string()))?;
            audio = Some(bytes);
        }
    }

    let audio = match audio {
        Some(bytes) if !bytes.is_empty() => bytes,
        _ => return Err(AppError::MalformedPayload("No audio was recorded".to_string())),
    };

    debug!("Session {} posted {} bytes of audio", bound.id, audio.len());

    {
        let mut session = bound.handle.lock().await;
        state
            .service
            .record_upload(&mut session, audio.to_vec())
            .await?;
    }

    Ok(respond(&bound, Redirect::to("/")))
}

/// POST /record/microphone
/// Capture from the server's microphone; returns once the capture has finished
pub async fn record_microphone(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let bound = bind_session(&state, &headers).await;

    {
        let mut session = bound.handle.lock().await;
        state.service.record_microphone(&mut session).await?;
    }

    Ok(respond(&bound, Redirect::to("/")))
}

/// GET /recording/audio
/// Play back the held recording
pub async fn recording_audio(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let bound = bind_session(&state, &headers).await;

    let bytes = {
        let session = bound.handle.lock().await;
        session
            .recording()
            .map(|r| r.clip.bytes.clone())
            .ok_or(AppError::NoRecording)?
    };

    Ok(respond(
        &bound,
        ([(header::CONTENT_TYPE, WAV_CONTENT_TYPE)], bytes),
    ))
}

/// POST /upload
/// Upload the held recording with its rating and comment
pub async fn upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<UploadForm>,
) -> Result<Response, AppError> {
    let rating = match form.rating.as_deref() {
        None | Some("") => Rating::default(),
        Some(value) => value.parse().map_err(AppError::MalformedPayload)?,
    };

    let bound = bind_session(&state, &headers).await;

    let outcome = {
        let mut session = bound.handle.lock().await;
        state
            .service
            .upload(
                &mut session,
                Review {
                    rating,
                    comments: form.comments,
                },
            )
            .await?
    };

    info!("Session {} upload: {:?}", bound.id, outcome);
    Ok(respond(&bound, Redirect::to("/")))
}

/// POST /discard
/// Drop the held recording and the current prompt
pub async fn discard(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let bound = bind_session(&state, &headers).await;

    {
        let mut session = bound.handle.lock().await;
        state.service.discard(&mut session)?;
    }

    Ok(respond(&bound, Redirect::to("/")))
}

/// GET /api/session
/// JSON view of the session, after any pending prompt assignment
pub async fn session_status(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let bound = bind_session(&state, &headers).await;

    let snapshot = {
        let mut session = bound.handle.lock().await;
        state.service.refresh(&mut session).await?;
        session.snapshot()
    };

    Ok(respond(&bound, Json(snapshot)))
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
