use axum::http::{header, HeaderMap, HeaderValue};

pub const SESSION_COOKIE: &str = "crowd_session";

/// Session ID from the request's `Cookie` headers, if present
pub fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value binding the browser to `session_id`
pub fn set_session(session_id: &str) -> HeaderValue {
    HeaderValue::from_str(&format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax",
        SESSION_COOKIE, session_id
    ))
    .unwrap_or_else(|_| HeaderValue::from_static("crowd_session=; Path=/"))
}
