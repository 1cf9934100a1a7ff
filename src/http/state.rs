use std::sync::Arc;

use super::views::PageOptions;
use crate::service::CrowdService;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<CrowdService>,
    pub page: Arc<PageOptions>,
    /// Largest request body accepted by the record endpoint
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(service: Arc<CrowdService>, title: impl Into<String>, max_upload_bytes: usize) -> Self {
        let page = PageOptions {
            title: title.into(),
            capture_mode: service.capture_mode(),
            microphone_secs: service.microphone_secs(),
        };

        Self {
            service,
            page: Arc::new(page),
            max_upload_bytes,
        }
    }
}
