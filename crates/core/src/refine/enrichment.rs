//! Post-loop enrichment fan-out.
//!
//! Scatter-gather over the four metadata agents: fire all of them at the
//! final article concurrently, then join every task - success or failure -
//! before assembling the bundle. One slow or broken agent never cancels
//! the other three, and the join itself never fails.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use tracing::warn;

use crate::ai::{AiError, ArticleGenerator};

use super::controller::EnrichmentSinks;

const TASK_REFERENCES: &str = "references";
const TASK_INFOBOX: &str = "infobox";
const TASK_SEEALSO: &str = "seealso";
const TASK_CATEGORIES: &str = "categories";

/// Auxiliary content generated after the loop. Any field may be empty if
/// its agent failed; failures land in `errors` instead of rejecting the
/// bundle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnrichmentBundle {
    pub references: String,
    pub infobox: String,
    pub see_also: String,
    pub categories: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub errors: Vec<String>,
}

/// Outcome of one enrichment task, consumed exactly once during the join.
struct AgentResult {
    task: &'static str,
    value: String,
    error: Option<AiError>,
}

impl AgentResult {
    fn from(task: &'static str, outcome: Result<String, AiError>) -> Self {
        match outcome {
            Ok(value) => Self {
                task,
                value,
                error: None,
            },
            Err(error) => Self {
                task,
                value: String::new(),
                error: Some(error),
            },
        }
    }
}

/// Run the four enrichment agents concurrently against the final article
/// and join all of them into one bundle.
pub async fn enrich(
    agents: Arc<dyn ArticleGenerator>,
    topic: &str,
    article: &str,
    sinks: &EnrichmentSinks,
) -> EnrichmentBundle {
    let mut join_set = JoinSet::new();

    {
        let agents = Arc::clone(&agents);
        let article = article.to_string();
        let sink = Arc::clone(&sinks.references);
        join_set.spawn(async move {
            AgentResult::from(
                TASK_REFERENCES,
                agents.references(&article, sink.as_ref()).await,
            )
        });
    }

    {
        let agents = Arc::clone(&agents);
        let topic = topic.to_string();
        let article = article.to_string();
        let sink = Arc::clone(&sinks.infobox);
        join_set.spawn(async move {
            AgentResult::from(
                TASK_INFOBOX,
                agents.infobox(&topic, &article, sink.as_ref()).await,
            )
        });
    }

    {
        let agents = Arc::clone(&agents);
        let article = article.to_string();
        let sink = Arc::clone(&sinks.see_also);
        join_set.spawn(async move {
            AgentResult::from(TASK_SEEALSO, agents.see_also(&article, sink.as_ref()).await)
        });
    }

    {
        let article = article.to_string();
        let sink = Arc::clone(&sinks.categories);
        join_set.spawn(async move {
            AgentResult::from(
                TASK_CATEGORIES,
                agents.categorize(&article, sink.as_ref()).await,
            )
        });
    }

    // Gather: wait for all four, regardless of individual outcome.
    let mut bundle = EnrichmentBundle::default();
    while let Some(joined) = join_set.join_next().await {
        let result = match joined {
            Ok(result) => result,
            Err(err) => {
                warn!(error = %err, "enrichment task panicked");
                bundle.errors.push(format!("task panicked: {err}"));
                continue;
            }
        };

        if let Some(err) = result.error {
            warn!(task = result.task, error = %err, "enrichment agent failed");
            bundle.errors.push(format!("{}: {}", result.task, err));
            continue;
        }

        match result.task {
            TASK_REFERENCES => bundle.references = result.value,
            TASK_INFOBOX => bundle.infobox = result.value,
            TASK_SEEALSO => bundle.see_also = result.value,
            TASK_CATEGORIES => bundle.categories = result.value,
            _ => {}
        }
    }

    bundle
}
