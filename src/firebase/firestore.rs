use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

use super::auth::TokenProvider;
use crate::store::{RecordingMetadata, RecordingStore};

/// Firestore collection of recording metadata, over the REST API
pub struct Firestore {
    base_url: String,
    collection: String,
    http: reqwest::Client,
    tokens: Arc<TokenProvider>,
}

impl Firestore {
    pub fn new(
        base_url: impl Into<String>,
        collection: impl Into<String>,
        http: reqwest::Client,
        tokens: Arc<TokenProvider>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            collection: collection.into(),
            http,
            tokens,
        }
    }

    fn database_path(&self) -> String {
        format!("projects/{}/databases/(default)", self.tokens.project_id())
    }

    fn documents_url(&self, method: &str) -> String {
        format!("{}/{}/documents:{}", self.base_url, self.database_path(), method)
    }
}

#[async_trait::async_trait]
impl RecordingStore for Firestore {
    async fn completed_prompts(&self, user_id: &str) -> Result<HashSet<String>> {
        let token = self.tokens.token().await?;

        let rows: Value = self
            .http
            .post(self.documents_url("runQuery"))
            .bearer_auth(token)
            .json(&run_query_body(&self.collection, user_id))
            .send()
            .await
            .context("Firestore query failed")?
            .error_for_status()
            .context("Firestore rejected query")?
            .json()
            .await
            .context("Failed to parse Firestore query response")?;

        let completed = parse_completed_prompts(&rows);
        debug!("{} has {} completed prompts", user_id, completed.len());
        Ok(completed)
    }

    async fn append(&self, record: &RecordingMetadata) -> Result<String> {
        let token = self.tokens.token().await?;
        let id = uuid::Uuid::new_v4().simple().to_string();
        let name = format!("{}/documents/{}/{}", self.database_path(), self.collection, id);

        self.http
            .post(self.documents_url("commit"))
            .bearer_auth(token)
            .json(&commit_body(&name, record))
            .send()
            .await
            .context("Firestore commit failed")?
            .error_for_status()
            .context("Firestore rejected commit")?;

        debug!("Created document {}", name);
        Ok(id)
    }

    fn name(&self) -> &str {
        "firestore"
    }
}

/// Structured query selecting `text_prompt` of every document with `user_id == user_id`
pub fn run_query_body(collection: &str, user_id: &str) -> Value {
    json!({
        "structuredQuery": {
            "from": [{ "collectionId": collection }],
            "select": { "fields": [{ "fieldPath": "text_prompt" }] },
            "where": {
                "fieldFilter": {
                    "field": { "fieldPath": "user_id" },
                    "op": "EQUAL",
                    "value": { "stringValue": user_id }
                }
            }
        }
    })
}

/// Single create-only write with a server timestamp on `timestamp`
pub fn commit_body(document_name: &str, record: &RecordingMetadata) -> Value {
    json!({
        "writes": [{
            "update": {
                "name": document_name,
                "fields": {
                    "user_id": { "stringValue": record.user_id },
                    "text_prompt": { "stringValue": record.text_prompt },
                    "audio_path": { "stringValue": record.audio_path },
                    "rating": { "stringValue": record.rating.as_str() },
                    "comments": { "stringValue": record.comments }
                }
            },
            "currentDocument": { "exists": false },
            "updateTransforms": [{
                "fieldPath": "timestamp",
                "setToServerValue": "REQUEST_TIME"
            }]
        }]
    })
}

/// Collect `text_prompt` values from a `runQuery` response stream.
///
/// Rows without a document (the trailing read-time row) are skipped.
pub fn parse_completed_prompts(rows: &Value) -> HashSet<String> {
    rows.as_array()
        .into_iter()
        .flatten()
        .filter_map(|row| {
            row.pointer("/document/fields/text_prompt/stringValue")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .collect()
}
