//! Decoding of the evaluator's structured verdict.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rubric sub-scores, 0-10 each. Out-of-range values are passed through
/// verbatim - the evaluator owns its scale, we do not second-guess it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
    pub factual_accuracy: i64,
    pub completeness: i64,
    pub neutrality: i64,
    pub clarity: i64,
    pub structure: i64,
}

/// One evaluation verdict. `overall` is the evaluator's own scalar
/// summary, correlated with but not derived from the sub-scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub scores: Scores,
    pub overall: f64,
    pub critical_issues: Vec<String>,
}

/// The evaluator produced something we could not decode.
#[derive(Debug, Error)]
#[error("malformed evaluation payload: {source}")]
pub struct DecodeError {
    pub source: serde_json::Error,
    /// Raw payload kept for diagnostics.
    pub raw: String,
}

/// Decode the evaluator's raw response into an [`Evaluation`].
///
/// Missing or mistyped fields fail the decode rather than defaulting.
/// Markdown code fences around the JSON body are tolerated, since models
/// frequently wrap structured output in them.
pub fn decode_evaluation(raw: &str) -> Result<Evaluation, DecodeError> {
    let body = strip_code_fences(raw);
    serde_json::from_str(body).map_err(|source| DecodeError {
        source,
        raw: raw.to_string(),
    })
}

/// Extract the fenced body from text like ```` ```json ... ``` ````,
/// or return the input trimmed when no fence is present.
fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Skip the optional language tag on the opening fence line.
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    match body.rfind("```") {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}
