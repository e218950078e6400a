//! # Quill Models
//!
//! Model-role configuration for the Quill agents. Each phase of the loop
//! can run on a different model; the defaults match a stock Ollama install.

use serde::{Deserialize, Serialize};

/// Model assignments for the agent roles.
///
/// - `writer` drafts and revises the article
/// - `evaluator` scores the article and plans revisions
/// - `metadata` runs the four post-loop enrichment agents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRoles {
    pub writer: String,
    pub evaluator: String,
    pub metadata: String,
}

impl Default for ModelRoles {
    fn default() -> Self {
        Self {
            writer: "llama3.1".to_string(),
            evaluator: "mistral".to_string(),
            metadata: "llama3.1".to_string(),
        }
    }
}

impl ModelRoles {
    /// Run every role on a single model.
    pub fn uniform(model: impl Into<String>) -> Self {
        let model = model.into();
        Self {
            writer: model.clone(),
            evaluator: model.clone(),
            metadata: model,
        }
    }
}
