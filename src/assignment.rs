use anyhow::{Context, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::prompts::PromptSet;
use crate::store::RecordingStore;

/// Outcome of one assignment cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assignment {
    /// A prompt the user has not recorded yet
    Prompt(String),
    /// Every prompt already has a record for this user
    Exhausted,
}

/// Draws an unrecorded prompt for a user
pub struct PromptAssigner {
    prompts_path: PathBuf,
    records: Arc<dyn RecordingStore>,
}

impl PromptAssigner {
    pub fn new(prompts_path: impl Into<PathBuf>, records: Arc<dyn RecordingStore>) -> Self {
        Self {
            prompts_path: prompts_path.into(),
            records,
        }
    }

    /// Reload the prompt file, subtract the user's completed prompts and draw one at random.
    pub async fn assign(&self, user_id: &str) -> Result<Assignment> {
        let prompts = PromptSet::load(&self.prompts_path)?;

        let completed = self
            .records
            .completed_prompts(user_id)
            .await
            .with_context(|| format!("Failed to list completed prompts for {}", user_id))?;

        let available = prompts.available(&completed);

        info!(
            "Prompt assignment for {}: {} total, {} completed, {} available",
            user_id,
            prompts.len(),
            completed.len(),
            available.len()
        );

        Ok(choose(&available, &mut rand::thread_rng()))
    }
}

/// Pick one element of `available` uniformly at random.
pub fn choose<R: Rng + ?Sized>(available: &[&str], rng: &mut R) -> Assignment {
    match available.choose(rng) {
        Some(prompt) => Assignment::Prompt(prompt.to_string()),
        None => Assignment::Exhausted,
    }
}
