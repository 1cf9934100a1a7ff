use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// Column holding the prompt text
pub const PROMPT_COLUMN: &str = "prompt";

/// The full, immutable list of prompts loaded from a CSV file
#[derive(Debug, Clone, Default)]
pub struct PromptSet {
    prompts: Vec<String>,
}

impl PromptSet {
    pub fn new(prompts: Vec<String>) -> Self {
        Self { prompts }
    }

    /// Read every row's `prompt` column. Rows are kept in file order, duplicates included.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)
            .with_context(|| format!("Failed to open prompt file {}", path.display()))?;

        let column = reader
            .headers()
            .context("Failed to read prompt file header")?
            .iter()
            .position(|h| h.trim() == PROMPT_COLUMN)
            .with_context(|| {
                format!(
                    "Prompt file {} has no `{}` column",
                    path.display(),
                    PROMPT_COLUMN
                )
            })?;

        let mut prompts = Vec::new();
        for record in reader.records() {
            let record = record.context("Failed to read prompt row")?;
            if let Some(prompt) = record.get(column) {
                prompts.push(prompt.to_string());
            }
        }

        debug!("Loaded {} prompts from {}", prompts.len(), path.display());

        Ok(Self { prompts })
    }

    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.prompts.iter().map(String::as_str)
    }

    /// Prompts not present in `completed`
    pub fn available<'a>(&'a self, completed: &HashSet<String>) -> Vec<&'a str> {
        self.iter().filter(|p| !completed.contains(*p)).collect()
    }
}
