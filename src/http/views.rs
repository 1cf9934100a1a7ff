use std::fmt::Write;

use crate::audio::CaptureMode;
use crate::service::EXHAUSTED_MESSAGE;
use crate::session::{Notice, NoticeLevel, PhaseName, SessionSnapshot};
use crate::store::Rating;

const APP_TITLE: &str = "LyngualLabs Crowdsourcing App";
const APP_INTRO: &str = "Help us collect data for Yoruba-English code-switching! \
                         Record yourself reading the prompt below.";

const STYLE: &str = "body{font-family:sans-serif;margin:0;display:flex}\
aside{width:14rem;padding:1rem;background:#f0f2f6;min-height:100vh}\
main{padding:1rem 2rem;max-width:44rem}\
.notice{padding:.75rem;border-radius:.4rem;margin:1rem 0}\
.notice-info{background:#e8f0fe}.notice-success{background:#e6f4ea}\
.notice-warning{background:#fef7e0}.notice-error{background:#fce8e6}\
.prompt{font-size:1.25rem}.actions{display:flex;gap:1rem}";

/// Options that shape the page independent of the session
#[derive(Debug, Clone)]
pub struct PageOptions {
    pub title: String,
    pub capture_mode: CaptureMode,
    pub microphone_secs: u64,
}

/// Render the single page for the session's current phase.
pub fn render_page(options: &PageOptions, snapshot: &SessionSnapshot) -> String {
    let mut body = String::new();

    match snapshot.username.as_deref() {
        None => {
            body.push_str("<main>");
            push_notice(&mut body, snapshot.notice.as_ref());
            push_username_form(&mut body);
            body.push_str("</main>");
        }
        Some(username) => {
            let _ = write!(
                body,
                "<aside><h2>User Info</h2><p>Username: {}</p></aside>",
                escape(username)
            );
            body.push_str("<main>");
            let _ = write!(body, "<h1>{}</h1><p>{}</p>", APP_TITLE, APP_INTRO);
            push_notice(&mut body, snapshot.notice.as_ref());

            match snapshot.prompt.as_deref() {
                Some(prompt) => {
                    let _ = write!(
                        body,
                        "<h2>Prompt:</h2><p class=\"prompt\">{}</p>",
                        escape(prompt)
                    );
                    push_record_control(&mut body, options);
                }
                None if snapshot.phase == PhaseName::PromptsExhausted => {
                    let _ = write!(body, "<p>{}</p>", EXHAUSTED_MESSAGE);
                }
                None => {}
            }

            if let Some(recording) = &snapshot.recording {
                push_review(&mut body, &recording.filename, recording.duration_secs);
            }

            body.push_str("</main>");
        }
    }

    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{}</title>\
         <style>{}</style></head><body>{}</body></html>",
        escape(&options.title),
        STYLE,
        body
    )
}

fn push_notice(body: &mut String, notice: Option<&Notice>) {
    let Some(notice) = notice else {
        return;
    };

    let class = match notice.level {
        NoticeLevel::Info => "info",
        NoticeLevel::Success => "success",
        NoticeLevel::Warning => "warning",
        NoticeLevel::Error => "error",
    };

    let _ = write!(
        body,
        "<div class=\"notice notice-{}\">{}</div>",
        class,
        escape(&notice.message)
    );

    // Upload has already finished by now; the bar is only a visual cue
    if notice.level == NoticeLevel::Success {
        body.push_str("<progress value=\"100\" max=\"100\"></progress>");
    }
}

fn push_username_form(body: &mut String) {
    body.push_str(
        "<form method=\"post\" action=\"/username\">\
         <label for=\"username\">Enter your username:</label> \
         <input id=\"username\" name=\"username\" placeholder=\"Enter a unique username\"> \
         <button type=\"submit\">Submit</button></form>",
    );
}

fn push_record_control(body: &mut String, options: &PageOptions) {
    match options.capture_mode {
        CaptureMode::Browser => body.push_str(
            "<form method=\"post\" action=\"/record\" enctype=\"multipart/form-data\">\
             <input type=\"file\" name=\"audio\" accept=\"audio/wav\" capture required> \
             <button type=\"submit\">Click to record</button></form>",
        ),
        CaptureMode::Microphone => {
            let _ = write!(
                body,
                "<form method=\"post\" action=\"/record/microphone\">\
                 <button type=\"submit\">Record {}s</button></form>",
                options.microphone_secs
            );
        }
    }
}

fn push_review(body: &mut String, filename: &str, duration_secs: f64) {
    let _ = write!(
        body,
        "<section><audio controls src=\"/recording/audio?f={}\"></audio>\
         <p>{:.1}s recorded</p>\
         <p>Review your recording and choose an action:</p>\
         <div class=\"actions\"><form method=\"post\" action=\"/upload\">\
         <fieldset><legend>Rate the quality of this recording:</legend>",
        escape(&urlencoding::encode(filename)),
        duration_secs
    );

    for rating in Rating::ALL {
        let checked = if rating == Rating::default() {
            " checked"
        } else {
            ""
        };
        let _ = write!(
            body,
            "<label><input type=\"radio\" name=\"rating\" value=\"{0}\"{1}> {0}</label> ",
            rating, checked
        );
    }

    body.push_str(
        "</fieldset><label>Comments (optional): <input name=\"comments\"></label> \
         <button type=\"submit\">Upload Recording</button></form>\
         <form method=\"post\" action=\"/discard\">\
         <button type=\"submit\">Discard Recording</button></form></div></section>",
    );
}

/// Escape text for HTML element content and quoted attributes
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
