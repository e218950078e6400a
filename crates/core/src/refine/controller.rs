//! The round controller: generate, evaluate, compare, plan, revise.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::ai::{AiError, ArticleGenerator};
use crate::sink::{events, EventSink, EventTokenSink, NullEventSink, NullSink, TokenSink};

use super::enrichment::{enrich, EnrichmentBundle};
use super::evaluation::{decode_evaluation, Evaluation};
use super::policy::{has_converged, is_stagnant};

/// One iteration of the loop. Appended to the round history exactly once
/// and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Round {
    pub number: u32,
    /// Snapshot of the article as evaluated this round.
    pub article: String,
    pub evaluation: Evaluation,
    /// Present only if a revision was attempted for this round.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub revision_plan: Option<String>,
}

/// Terminal artifact of one controller run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleState {
    pub topic: String,
    pub final_article: String,
    pub enrichment: EnrichmentBundle,
    pub rounds: Vec<Round>,
    pub converged: bool,
}

/// Token sinks for the four enrichment agents.
pub struct EnrichmentSinks {
    pub references: Arc<dyn TokenSink>,
    pub infobox: Arc<dyn TokenSink>,
    pub see_also: Arc<dyn TokenSink>,
    pub categories: Arc<dyn TokenSink>,
}

/// Destinations for everything a run emits: per-phase token sinks plus
/// the event sink carrying round completions and the converged signal.
pub struct LoopSinks {
    pub article: Arc<dyn TokenSink>,
    pub evaluation: Arc<dyn TokenSink>,
    pub revision_plan: Arc<dyn TokenSink>,
    pub enrichment: EnrichmentSinks,
    pub events: Arc<dyn EventSink>,
}

impl LoopSinks {
    /// Wire every phase to its standard event name on `sink`.
    pub fn from_events(sink: Arc<dyn EventSink>) -> Self {
        let token = |event| -> Arc<dyn TokenSink> {
            Arc::new(EventTokenSink::new(Arc::clone(&sink), event))
        };
        Self {
            article: token(events::ARTICLE_TOKEN),
            evaluation: token(events::EVALUATION_TOKEN),
            revision_plan: token(events::REVISION_PLAN_TOKEN),
            enrichment: EnrichmentSinks {
                references: token(events::REFERENCES_TOKEN),
                infobox: token(events::INFOBOX_TOKEN),
                see_also: token(events::SEEALSO_TOKEN),
                categories: token(events::CATEGORY_TOKEN),
            },
            events: sink,
        }
    }

    /// Sinks that drop everything. Useful for headless runs and tests.
    pub fn discard() -> Self {
        let null: Arc<dyn TokenSink> = Arc::new(NullSink);
        Self {
            article: Arc::clone(&null),
            evaluation: Arc::clone(&null),
            revision_plan: Arc::clone(&null),
            enrichment: EnrichmentSinks {
                references: Arc::clone(&null),
                infobox: Arc::clone(&null),
                see_also: Arc::clone(&null),
                categories: null,
            },
            events: Arc::new(NullEventSink),
        }
    }
}

/// Execute the full refinement loop for `topic`.
///
/// Failure handling follows a strict taxonomy:
/// - the initial draft failing is fatal and propagates;
/// - evaluation, decode, plan, and revision failures end the loop early
///   but keep the last good article;
/// - enrichment failures are collected per-task and never escalate.
///
/// Enrichment always runs on whatever article exists after loop exit,
/// and the returned round history is strictly ordered by round number.
pub async fn run_article_loop(
    agents: Arc<dyn ArticleGenerator>,
    topic: &str,
    max_rounds: u32,
    sinks: &LoopSinks,
) -> Result<ArticleState, AiError> {
    // Actuator: the initial draft. Nothing downstream can proceed
    // without one, so this is the only fatal failure point.
    let mut article = agents.draft(topic, sinks.article.as_ref()).await?;
    info!(topic, "finished generating initial draft");

    let mut rounds: Vec<Round> = Vec::new();
    let mut converged = false;

    for number in 1..=max_rounds {
        info!(topic, round = number, "starting evaluation round");

        // Sensor: evaluate the current article.
        let eval_raw = match agents.evaluate(&article, sinks.evaluation.as_ref()).await {
            Ok(raw) => raw,
            Err(err) => {
                warn!(round = number, error = %err, "evaluation call failed, ending loop");
                break;
            }
        };
        let evaluation = match decode_evaluation(&eval_raw) {
            Ok(eval) => eval,
            Err(err) => {
                warn!(round = number, error = %err, "evaluation decode failed, ending loop");
                break;
            }
        };

        let mut round = Round {
            number,
            article: article.clone(),
            evaluation,
            revision_plan: None,
        };

        // Comparator: stop on convergence or stagnation.
        if has_converged(&round.evaluation) {
            info!(topic, round = number, overall = round.evaluation.overall, "article converged");
            complete_round(&mut rounds, round, sinks);
            converged = true;
            break;
        }

        if number > 1
            && rounds
                .last()
                .is_some_and(|prev| is_stagnant(&round.evaluation, &prev.evaluation))
        {
            info!(topic, round = number, overall = round.evaluation.overall, "scores stagnated, accepting article as-is");
            complete_round(&mut rounds, round, sinks);
            break;
        }

        // Controller: plan the revision.
        let plan = match agents
            .plan_revision(&article, &eval_raw, sinks.revision_plan.as_ref())
            .await
        {
            Ok(plan) => plan,
            Err(err) => {
                warn!(round = number, error = %err, "revision planning failed, keeping unrevised article");
                rounds.push(round);
                break;
            }
        };
        round.revision_plan = Some(plan.clone());
        complete_round(&mut rounds, round, sinks);

        // Actuator: revise.
        match agents
            .revise(topic, &article, &plan, sinks.article.as_ref())
            .await
        {
            Ok(revised) => {
                article = revised;
                info!(topic, round = number, "finished revision");
            }
            Err(err) => {
                warn!(round = number, error = %err, "revision failed, keeping pre-revision article");
                break;
            }
        }
    }

    if converged {
        sinks.events.emit(events::CONVERGED, "");
    }

    // Post-loop: enrichment agents run once on the final article.
    let enrichment = enrich(Arc::clone(&agents), topic, &article, &sinks.enrichment).await;
    if !enrichment.errors.is_empty() {
        warn!(topic, failed = enrichment.errors.len(), "enrichment agent(s) reported errors");
    }

    Ok(ArticleState {
        topic: topic.to_string(),
        final_article: article,
        enrichment,
        rounds,
        converged,
    })
}

/// Append the round and notify the consumer it is complete.
fn complete_round(rounds: &mut Vec<Round>, round: Round, sinks: &LoopSinks) {
    if let Ok(value) = serde_json::to_value(&round) {
        sinks.events.emit_json(events::ROUND_COMPLETE, value);
    }
    rounds.push(round);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refine::testutil::{eval_json, ScriptedAgents};
    use crate::sink::{ChannelSink, SinkEvent};

    fn run(
        agents: ScriptedAgents,
        max_rounds: u32,
    ) -> (Arc<ScriptedAgents>, Result<ArticleState, AiError>) {
        let agents = Arc::new(agents);
        let handle = Arc::clone(&agents);
        let result = tokio_test::block_on(run_article_loop(
            agents,
            "Test Topic",
            max_rounds,
            &LoopSinks::discard(),
        ));
        (handle, result)
    }

    #[test]
    fn test_loop_exhausts_max_rounds_without_convergence() {
        let agents = ScriptedAgents::new(vec![
            Ok(eval_json(5.0, &[])),
            Ok(eval_json(5.5, &[])),
            Ok(eval_json(6.0, &[])),
        ]);
        let (agents, result) = run(agents, 3);
        let state = result.unwrap();

        assert_eq!(state.rounds.len(), 3);
        assert!(!state.converged);
        assert_eq!(agents.plan_calls(), 3);
        let numbers: Vec<u32> = state.rounds.iter().map(|r| r.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        // Third revision still ran, so the final article is one step past
        // the last evaluated snapshot.
        assert_eq!(state.final_article, "revision 3");
    }

    #[test]
    fn test_first_round_convergence_requests_no_plan() {
        let agents = ScriptedAgents::new(vec![Ok(eval_json(9.0, &[]))]);
        let (agents, result) = run(agents, 3);
        let state = result.unwrap();

        assert_eq!(state.rounds.len(), 1);
        assert!(state.converged);
        assert_eq!(agents.plan_calls(), 0);
        assert!(state.rounds[0].revision_plan.is_none());
    }

    #[test]
    fn test_critical_issues_force_another_round() {
        let agents = ScriptedAgents::new(vec![
            Ok(eval_json(9.0, &["unsourced claim"])),
            Ok(eval_json(9.1, &[])),
        ]);
        let (_, result) = run(agents, 3);
        let state = result.unwrap();

        // Round 1 scored above threshold but carried an issue, so the loop
        // revised; round 2 converged.
        assert_eq!(state.rounds.len(), 2);
        assert!(state.converged);
    }

    #[test]
    fn test_stagnation_exits_without_converging() {
        let agents = ScriptedAgents::new(vec![
            Ok(eval_json(5.0, &[])),
            Ok(eval_json(5.2, &[])),
        ]);
        let (agents, result) = run(agents, 5);
        let state = result.unwrap();

        assert_eq!(state.rounds.len(), 2);
        assert!(!state.converged);
        // The stagnant round keeps its article rather than discarding it.
        assert_eq!(agents.plan_calls(), 1);
        assert!(state.rounds[1].revision_plan.is_none());
    }

    #[test]
    fn test_draft_failure_is_fatal() {
        let agents = ScriptedAgents::new(vec![]).failing_draft();
        let (_, result) = run(agents, 3);
        assert!(result.is_err());
    }

    #[test]
    fn test_evaluation_failure_keeps_draft_and_enriches() {
        let agents = ScriptedAgents::new(vec![Err(())]);
        let (_, result) = run(agents, 3);
        let state = result.unwrap();

        assert!(state.rounds.is_empty());
        assert!(!state.converged);
        assert_eq!(state.final_article, "draft");
        // Enrichment still ran on the unevaluated draft.
        assert_eq!(state.enrichment.references, "references for draft");
    }

    #[test]
    fn test_decode_failure_ends_loop_locally() {
        let agents = ScriptedAgents::new(vec![Ok("not an evaluation".to_string())]);
        let (_, result) = run(agents, 3);
        let state = result.unwrap();

        assert!(state.rounds.is_empty());
        assert_eq!(state.final_article, "draft");
    }

    #[test]
    fn test_plan_failure_appends_round_and_exits() {
        let agents = ScriptedAgents::new(vec![Ok(eval_json(5.0, &[]))]).failing_plan();
        let (_, result) = run(agents, 3);
        let state = result.unwrap();

        assert_eq!(state.rounds.len(), 1);
        assert!(state.rounds[0].revision_plan.is_none());
        assert_eq!(state.final_article, "draft");
    }

    #[test]
    fn test_revision_failure_retains_pre_revision_article() {
        let agents = ScriptedAgents::new(vec![Ok(eval_json(5.0, &[]))]).failing_revise();
        let (_, result) = run(agents, 3);
        let state = result.unwrap();

        assert_eq!(state.rounds.len(), 1);
        assert!(state.rounds[0].revision_plan.is_some());
        assert_eq!(state.final_article, "draft");
    }

    #[test]
    fn test_events_emitted_in_order() {
        let (sink, mut rx) = ChannelSink::new();
        let sinks = LoopSinks::from_events(Arc::new(sink));
        let agents: Arc<ScriptedAgents> =
            Arc::new(ScriptedAgents::new(vec![Ok(eval_json(9.0, &[]))]));

        let state =
            tokio_test::block_on(run_article_loop(agents, "Test Topic", 3, &sinks)).unwrap();
        assert!(state.converged);
        drop(sinks);

        let mut names = Vec::new();
        while let Ok(SinkEvent { name, .. }) = rx.try_recv() {
            names.push(name);
        }
        let round_complete = names.iter().filter(|n| *n == "round_complete").count();
        assert_eq!(round_complete, 1);
        let converged_at = names.iter().position(|n| n == "converged").unwrap();
        let round_at = names.iter().position(|n| n == "round_complete").unwrap();
        assert!(round_at < converged_at);
    }
}
