//! Scripted agents for driving the loop without a live generation service.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::ai::{AiError, ArticleGenerator};
use crate::sink::TokenSink;

/// Build a raw evaluation payload with fixed sub-scores.
pub fn eval_json(overall: f64, critical_issues: &[&str]) -> String {
    serde_json::json!({
        "scores": {
            "factual_accuracy": 7,
            "completeness": 7,
            "neutrality": 7,
            "clarity": 7,
            "structure": 7
        },
        "overall": overall,
        "critical_issues": critical_issues,
    })
    .to_string()
}

/// An error of the non-transport kind, fabricated without a network stack.
pub fn scripted_error() -> AiError {
    let source = serde_json::from_str::<serde_json::Value>("garbage").unwrap_err();
    AiError::Decode {
        source,
        raw: "garbage".to_string(),
    }
}

/// [`ArticleGenerator`] driven by a queue of scripted evaluation results.
///
/// Drafting yields `"draft"`, each revision yields `"revision N"`, and the
/// enrichment agents echo the article they were given, so assertions can
/// follow exactly which snapshot reached which stage.
pub struct ScriptedAgents {
    evaluations: Mutex<VecDeque<Result<String, ()>>>,
    plan_calls: AtomicUsize,
    revise_calls: AtomicUsize,
    fail_draft: bool,
    fail_plan: bool,
    fail_revise: bool,
    failing_tasks: HashSet<&'static str>,
}

impl ScriptedAgents {
    pub fn new(evaluations: Vec<Result<String, ()>>) -> Self {
        Self {
            evaluations: Mutex::new(evaluations.into()),
            plan_calls: AtomicUsize::new(0),
            revise_calls: AtomicUsize::new(0),
            fail_draft: false,
            fail_plan: false,
            fail_revise: false,
            failing_tasks: HashSet::new(),
        }
    }

    pub fn failing_draft(mut self) -> Self {
        self.fail_draft = true;
        self
    }

    pub fn failing_plan(mut self) -> Self {
        self.fail_plan = true;
        self
    }

    pub fn failing_revise(mut self) -> Self {
        self.fail_revise = true;
        self
    }

    pub fn failing_task(mut self, task: &'static str) -> Self {
        self.failing_tasks.insert(task);
        self
    }

    pub fn plan_calls(&self) -> usize {
        self.plan_calls.load(Ordering::SeqCst)
    }

    fn enrich_output(&self, task: &'static str, text: String) -> Result<String, AiError> {
        if self.failing_tasks.contains(task) {
            Err(scripted_error())
        } else {
            Ok(text)
        }
    }
}

#[async_trait]
impl ArticleGenerator for ScriptedAgents {
    async fn draft(&self, _topic: &str, sink: &dyn TokenSink) -> Result<String, AiError> {
        if self.fail_draft {
            return Err(scripted_error());
        }
        sink.accept("draft");
        Ok("draft".to_string())
    }

    async fn evaluate(&self, _article: &str, sink: &dyn TokenSink) -> Result<String, AiError> {
        let next = self.evaluations.lock().unwrap().pop_front();
        match next {
            Some(Ok(raw)) => {
                sink.accept(&raw);
                Ok(raw)
            }
            Some(Err(())) | None => Err(scripted_error()),
        }
    }

    async fn plan_revision(
        &self,
        _article: &str,
        _evaluation: &str,
        sink: &dyn TokenSink,
    ) -> Result<String, AiError> {
        if self.fail_plan {
            return Err(scripted_error());
        }
        let n = self.plan_calls.fetch_add(1, Ordering::SeqCst) + 1;
        let plan = format!("plan {n}");
        sink.accept(&plan);
        Ok(plan)
    }

    async fn revise(
        &self,
        _topic: &str,
        _article: &str,
        _plan: &str,
        sink: &dyn TokenSink,
    ) -> Result<String, AiError> {
        if self.fail_revise {
            return Err(scripted_error());
        }
        let n = self.revise_calls.fetch_add(1, Ordering::SeqCst) + 1;
        let revised = format!("revision {n}");
        sink.accept(&revised);
        Ok(revised)
    }

    async fn references(&self, article: &str, sink: &dyn TokenSink) -> Result<String, AiError> {
        let out = self.enrich_output("references", format!("references for {article}"))?;
        sink.accept(&out);
        Ok(out)
    }

    async fn infobox(
        &self,
        _topic: &str,
        article: &str,
        sink: &dyn TokenSink,
    ) -> Result<String, AiError> {
        let out = self.enrich_output("infobox", format!("infobox for {article}"))?;
        sink.accept(&out);
        Ok(out)
    }

    async fn see_also(&self, article: &str, sink: &dyn TokenSink) -> Result<String, AiError> {
        let out = self.enrich_output("seealso", format!("see also for {article}"))?;
        sink.accept(&out);
        Ok(out)
    }

    async fn categorize(&self, article: &str, sink: &dyn TokenSink) -> Result<String, AiError> {
        let out = self.enrich_output("categories", format!("categories for {article}"))?;
        sink.accept(&out);
        Ok(out)
    }
}
