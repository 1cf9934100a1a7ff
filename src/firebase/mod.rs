//! Firebase clients over the Google REST APIs
//!
//! - `TokenProvider`: service-account OAuth2 tokens
//! - `FirebaseStorage`: recording uploads (`ObjectStore`)
//! - `Firestore`: recording metadata (`RecordingStore`)

mod auth;
pub mod firestore;
mod storage;

pub use auth::{ServiceAccountKey, TokenProvider};
pub use firestore::Firestore;
pub use storage::FirebaseStorage;

use anyhow::Result;
use std::sync::Arc;

use crate::config::{FirebaseConfig, FirebaseSecrets};

/// Both Firebase backends sharing one HTTP client and token cache
pub struct FirebaseClients {
    pub storage: Arc<FirebaseStorage>,
    pub firestore: Arc<Firestore>,
}

impl FirebaseClients {
    pub fn connect(config: &FirebaseConfig, secrets: &FirebaseSecrets) -> Result<Self> {
        let key = ServiceAccountKey::from_json(&secrets.credentials)?;
        let http = reqwest::Client::new();
        let tokens = Arc::new(TokenProvider::new(key, http.clone())?);

        Ok(Self {
            storage: Arc::new(FirebaseStorage::new(
                &config.storage_url,
                &secrets.storage_bucket,
                http.clone(),
                Arc::clone(&tokens),
            )),
            firestore: Arc::new(Firestore::new(
                &config.firestore_url,
                &config.collection,
                http,
                tokens,
            )),
        })
    }
}
