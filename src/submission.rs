use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::session::SubmissionTicket;
use crate::store::{ObjectStore, Rating, RecordingMetadata, RecordingStore, WAV_CONTENT_TYPE};

/// Rater input collected on the review form
#[derive(Debug, Clone, Default)]
pub struct Review {
    pub rating: Rating,
    pub comments: String,
}

/// Where a submission ended up
#[derive(Debug, Clone)]
pub struct Receipt {
    pub audio_path: String,
    pub document_id: String,
}

/// Uploads a held recording and records its metadata
pub struct Submitter {
    objects: Arc<dyn ObjectStore>,
    records: Arc<dyn RecordingStore>,
}

impl Submitter {
    pub fn new(objects: Arc<dyn ObjectStore>, records: Arc<dyn RecordingStore>) -> Self {
        Self { objects, records }
    }

    /// Upload the WAV object, then append the metadata record.
    ///
    /// If the metadata write fails the uploaded object is deleted again so no
    /// orphaned audio is left behind. Nothing is retried.
    pub async fn submit(&self, ticket: &SubmissionTicket, review: &Review) -> Result<Receipt> {
        let audio_path = ticket.recording.object_key();

        info!(
            "Uploading {} ({} bytes) to {}",
            audio_path,
            ticket.recording.clip.bytes.len(),
            self.objects.name()
        );

        self.objects
            .put(
                &audio_path,
                ticket.recording.clip.bytes.clone(),
                WAV_CONTENT_TYPE,
            )
            .await
            .context("Audio upload failed")?;

        let record = RecordingMetadata {
            user_id: ticket.username.clone(),
            text_prompt: ticket.prompt.clone(),
            audio_path: audio_path.clone(),
            timestamp: None,
            rating: review.rating,
            comments: review.comments.clone(),
        };

        let document_id = match self.records.append(&record).await {
            Ok(id) => id,
            Err(e) => {
                warn!(
                    "Metadata write for {} failed, removing uploaded audio: {}",
                    audio_path, e
                );
                if let Err(cleanup) = self.objects.delete(&audio_path).await {
                    error!("Failed to remove orphaned audio {}: {}", audio_path, cleanup);
                }
                return Err(e.context("Metadata write failed"));
            }
        };

        info!(
            "Recorded submission {} for {} in {}",
            document_id,
            ticket.username,
            self.records.name()
        );

        Ok(Receipt {
            audio_path,
            document_id,
        })
    }
}
