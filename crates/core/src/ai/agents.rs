//! Agent facade over the generation client.
//!
//! One method per agent operation; each fills its prompt template and
//! picks the model for its role. The [`ArticleGenerator`] trait is the
//! seam the refinement loop is written against, so tests can drive the
//! loop with scripted agents instead of a live service.

use async_trait::async_trait;

use crate::ai::client::{AiError, OllamaClient};
use crate::ai::prompts;
use crate::models::ModelRoles;
use crate::sink::TokenSink;

/// The generation operations the refinement loop depends on.
///
/// All calls stream token fragments to `sink` as they arrive and return
/// the accumulated text.
#[async_trait]
pub trait ArticleGenerator: Send + Sync {
    /// Generate the initial article draft.
    async fn draft(&self, topic: &str, sink: &dyn TokenSink) -> Result<String, AiError>;

    /// Score the article against the rubric; returns the raw evaluation
    /// payload for [`crate::refine::decode_evaluation`].
    async fn evaluate(&self, article: &str, sink: &dyn TokenSink) -> Result<String, AiError>;

    /// Turn an evaluation into a revision plan.
    async fn plan_revision(
        &self,
        article: &str,
        evaluation: &str,
        sink: &dyn TokenSink,
    ) -> Result<String, AiError>;

    /// Rewrite the article following the plan.
    async fn revise(
        &self,
        topic: &str,
        article: &str,
        plan: &str,
        sink: &dyn TokenSink,
    ) -> Result<String, AiError>;

    async fn references(&self, article: &str, sink: &dyn TokenSink) -> Result<String, AiError>;

    async fn infobox(
        &self,
        topic: &str,
        article: &str,
        sink: &dyn TokenSink,
    ) -> Result<String, AiError>;

    async fn see_also(&self, article: &str, sink: &dyn TokenSink) -> Result<String, AiError>;

    async fn categorize(&self, article: &str, sink: &dyn TokenSink) -> Result<String, AiError>;
}

/// Production agents backed by an [`OllamaClient`].
pub struct ArticleAgents {
    client: OllamaClient,
    models: ModelRoles,
}

impl ArticleAgents {
    pub fn new(client: OllamaClient, models: ModelRoles) -> Self {
        Self { client, models }
    }
}

#[async_trait]
impl ArticleGenerator for ArticleAgents {
    async fn draft(&self, topic: &str, sink: &dyn TokenSink) -> Result<String, AiError> {
        let prompt = prompts::DRAFT.replace("{topic}", topic);
        self.client
            .generate_streaming(&self.models.writer, &prompt, sink)
            .await
    }

    async fn evaluate(&self, article: &str, sink: &dyn TokenSink) -> Result<String, AiError> {
        let prompt = prompts::EVALUATE.replace("{article}", article);
        self.client
            .generate_streaming(&self.models.evaluator, &prompt, sink)
            .await
    }

    async fn plan_revision(
        &self,
        article: &str,
        evaluation: &str,
        sink: &dyn TokenSink,
    ) -> Result<String, AiError> {
        let prompt = prompts::PLAN_REVISION
            .replace("{article}", article)
            .replace("{evaluation}", evaluation);
        self.client
            .generate_streaming(&self.models.evaluator, &prompt, sink)
            .await
    }

    async fn revise(
        &self,
        topic: &str,
        article: &str,
        plan: &str,
        sink: &dyn TokenSink,
    ) -> Result<String, AiError> {
        let prompt = prompts::REVISE
            .replace("{topic}", topic)
            .replace("{article}", article)
            .replace("{plan}", plan);
        self.client
            .generate_streaming(&self.models.writer, &prompt, sink)
            .await
    }

    async fn references(&self, article: &str, sink: &dyn TokenSink) -> Result<String, AiError> {
        let prompt = prompts::REFERENCES.replace("{article}", article);
        self.client
            .generate_streaming(&self.models.metadata, &prompt, sink)
            .await
    }

    async fn infobox(
        &self,
        topic: &str,
        article: &str,
        sink: &dyn TokenSink,
    ) -> Result<String, AiError> {
        let prompt = prompts::INFOBOX
            .replace("{topic}", topic)
            .replace("{article}", article);
        self.client
            .generate_streaming(&self.models.metadata, &prompt, sink)
            .await
    }

    async fn see_also(&self, article: &str, sink: &dyn TokenSink) -> Result<String, AiError> {
        let prompt = prompts::SEE_ALSO.replace("{article}", article);
        self.client
            .generate_streaming(&self.models.metadata, &prompt, sink)
            .await
    }

    async fn categorize(&self, article: &str, sink: &dyn TokenSink) -> Result<String, AiError> {
        let prompt = prompts::CATEGORIES.replace("{article}", article);
        self.client
            .generate_streaming(&self.models.metadata, &prompt, sink)
            .await
    }
}
