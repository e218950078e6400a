//! # Article Refinement
//!
//! The cybernetic feedback loop at the heart of Quill.
//!
//! ## Loop Flow
//!
//! ```text
//! Generate → [Evaluate → Compare → Plan → Revise]* → Enrichment fan-out
//! ```
//!
//! The loop runs for at most `max_rounds` revision cycles, stopping early
//! if the article converges (meets the quality threshold with no critical
//! issues) or its scores stagnate.

pub mod controller;
pub mod enrichment;
pub mod evaluation;
pub mod policy;

#[cfg(test)]
pub(crate) mod testutil;

pub use controller::{run_article_loop, ArticleState, EnrichmentSinks, LoopSinks, Round};
pub use enrichment::{enrich, EnrichmentBundle};
pub use evaluation::{decode_evaluation, DecodeError, Evaluation, Scores};
pub use policy::{
    has_converged, is_stagnant, DEFAULT_MAX_ROUNDS, QUALITY_THRESHOLD, STAGNATION_EPSILON,
};
