// Integration tests for the HTTP surface, driving the router in-process

mod common;

use anyhow::Result;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use lyngual_crowd::http::SESSION_COOKIE;
use lyngual_crowd::session::PhaseName;
use lyngual_crowd::{create_router, AppState, SessionSnapshot};
use tower::ServiceExt;

const BOUNDARY: &str = "crowd-test-boundary";

struct Client {
    app: Router,
    cookie: Option<String>,
}

impl Client {
    fn new(h: &common::Harness) -> Self {
        let state = AppState::new(h.service.clone(), "lyngual-crowd", 1024 * 1024);
        Self {
            app: create_router(state),
            cookie: None,
        }
    }

    async fn send(&mut self, request: Request<Body>) -> Result<Response> {
        let mut request = request;
        if let Some(cookie) = &self.cookie {
            request
                .headers_mut()
                .insert(header::COOKIE, format!("{}={}", SESSION_COOKIE, cookie).parse()?);
        }

        let response = self.app.clone().oneshot(request).await?;

        if let Some(value) = response.headers().get(header::SET_COOKIE) {
            let value = value.to_str()?;
            let pair = value.split(';').next().unwrap_or_default();
            if let Some((_, id)) = pair.split_once('=') {
                self.cookie = Some(id.to_string());
            }
        }

        Ok(response)
    }

    async fn get(&mut self, uri: &str) -> Result<Response> {
        self.send(Request::get(uri).body(Body::empty())?).await
    }

    async fn post_form(&mut self, uri: &str, form: &str) -> Result<Response> {
        self.send(
            Request::post(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form.to_string()))?,
        )
        .await
    }

    async fn post_audio(&mut self, wav: &[u8]) -> Result<Response> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"audio\"; filename=\"clip.wav\"\r\n\
                 Content-Type: audio/wav\r\n\r\n",
                BOUNDARY
            )
            .as_bytes(),
        );
        body.extend_from_slice(wav);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

        self.send(
            Request::post("/record")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={}", BOUNDARY),
                )
                .body(Body::from(body))?,
        )
        .await
    }

    async fn page(&mut self) -> Result<String> {
        let response = self.get("/").await?;
        assert_eq!(response.status(), StatusCode::OK);
        text(response).await
    }

    async fn snapshot(&mut self) -> Result<SessionSnapshot> {
        let response = self.get("/api/session").await?;
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

async fn text(response: Response) -> Result<String> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(String::from_utf8(bytes.to_vec())?)
}

#[tokio::test]
async fn test_health_check() -> Result<()> {
    let h = common::harness(&["one"])?;
    let mut client = Client::new(&h);

    let response = client.get("/health").await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(text(response).await?, "OK");

    Ok(())
}

#[tokio::test]
async fn test_first_visit_sets_cookie_and_asks_for_username() -> Result<()> {
    let h = common::harness(&["one"])?;
    let mut client = Client::new(&h);

    let page = client.page().await?;

    assert!(client.cookie.is_some(), "session cookie should be set");
    assert!(page.contains("Enter your username:"));
    assert!(!page.contains("Prompt:"));

    Ok(())
}

#[tokio::test]
async fn test_blank_username_shows_warning() -> Result<()> {
    let h = common::harness(&["one"])?;
    let mut client = Client::new(&h);
    client.page().await?;

    let response = client.post_form("/username", "username=+++").await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let page = client.page().await?;
    assert!(page.contains("Please enter a valid username."));
    assert!(page.contains("Enter your username:"));

    // The warning is shown once
    let page = client.page().await?;
    assert!(!page.contains("Please enter a valid username."));

    Ok(())
}

#[tokio::test]
async fn test_full_upload_flow() -> Result<()> {
    let h = common::harness(&["Hello, bawo ni?"])?;
    let mut client = Client::new(&h);
    client.page().await?;

    client.post_form("/username", "username=alice").await?;
    let page = client.page().await?;
    assert!(page.contains("Username: alice"));
    assert!(page.contains("Hello, bawo ni?"));
    assert!(page.contains("action=\"/record\""));

    let response = client.post_audio(&common::wav_bytes(4410)?).await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let page = client.page().await?;
    assert!(page.contains("Review your recording and choose an action:"));
    assert!(page.contains("value=\"Good\" checked"));

    let response = client.get("/recording/audio").await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/wav");
    let audio = to_bytes(response.into_body(), usize::MAX).await?;
    assert_eq!(&audio[0..4], b"RIFF");

    let response = client
        .post_form("/upload", "rating=Average&comments=a+little+noisy")
        .await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let page = client.page().await?;
    assert!(page.contains("Your contribution has been submitted!"));
    assert!(page.contains("<progress"));
    assert!(page.contains("No more prompts available for you to record."));
    assert!(!page.contains("action=\"/record\""));

    let stored = h.records.records_for("alice");
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].comments, "a little noisy");
    assert_eq!(h.objects.len(), 1);

    let snapshot = client.snapshot().await?;
    assert_eq!(snapshot.phase, PhaseName::PromptsExhausted);
    assert!(snapshot.recording.is_none());

    Ok(())
}

#[tokio::test]
async fn test_upload_failure_is_shown_and_recording_kept() -> Result<()> {
    let h = common::harness(&["one"])?;
    let mut client = Client::new(&h);
    client.page().await?;
    client.post_form("/username", "username=alice").await?;
    client.page().await?;
    client.post_audio(&common::wav_bytes(4410)?).await?;

    h.objects.fail_with("simulated network fault");
    let response = client.post_form("/upload", "rating=Good").await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let page = client.page().await?;
    assert!(page.contains("An error occurred during upload:"));
    assert!(page.contains("simulated network fault"));
    assert!(page.contains("Upload Recording"));

    let snapshot = client.snapshot().await?;
    assert_eq!(snapshot.phase, PhaseName::ReviewingRecording);
    assert_eq!(snapshot.prompt.as_deref(), Some("one"));

    Ok(())
}

#[tokio::test]
async fn test_discard_flow() -> Result<()> {
    let h = common::harness(&["one", "two"])?;
    let mut client = Client::new(&h);
    client.page().await?;
    client.post_form("/username", "username=alice").await?;
    client.page().await?;
    client.post_audio(&common::wav_bytes(4410)?).await?;

    let response = client.post_form("/discard", "").await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let page = client.page().await?;
    assert!(page.contains("Recording discarded. Ready to start a new one."));
    assert!(h.objects.is_empty());
    assert!(h.records.is_empty());

    let snapshot = client.snapshot().await?;
    assert_eq!(snapshot.phase, PhaseName::AwaitingRecording);
    assert!(snapshot.recording.is_none());

    Ok(())
}

#[tokio::test]
async fn test_actions_out_of_order_conflict() -> Result<()> {
    let h = common::harness(&["one"])?;
    let mut client = Client::new(&h);
    client.page().await?;

    let response = client.post_form("/upload", "rating=Good").await?;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = client.post_form("/discard", "").await?;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = client.get("/recording/audio").await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_malformed_uploads_are_rejected() -> Result<()> {
    let h = common::harness(&["one"])?;
    let mut client = Client::new(&h);
    client.page().await?;
    client.post_form("/username", "username=alice").await?;
    client.page().await?;

    let response = client.post_audio(b"definitely not audio").await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client.post_audio(b"").await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    client.post_audio(&common::wav_bytes(100)?).await?;
    let response = client.post_form("/upload", "rating=Excellent").await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    Ok(())
}
