//! Convergence and stagnation decisions for the refinement loop.

use super::evaluation::Evaluation;

/// Revision cycles to attempt when the caller does not specify a count.
pub const DEFAULT_MAX_ROUNDS: u32 = 3;

/// Minimum overall score for an article to be considered done.
pub const QUALITY_THRESHOLD: f64 = 8.0;

/// Score delta below which consecutive rounds count as stagnant.
pub const STAGNATION_EPSILON: f64 = 0.3;

/// True when the evaluation meets the quality threshold and carries no
/// critical issues.
pub fn has_converged(eval: &Evaluation) -> bool {
    eval.overall >= QUALITY_THRESHOLD && eval.critical_issues.is_empty()
}

/// True when the overall score has not moved meaningfully since the
/// previous round. Critical issues are deliberately not consulted here;
/// an article can stagnate score-wise while issues remain open.
pub fn is_stagnant(current: &Evaluation, previous: &Evaluation) -> bool {
    (current.overall - previous.overall).abs() < STAGNATION_EPSILON
}
