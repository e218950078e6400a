//! # Quill Core
//!
//! The "Engine" of the Quill article generator - contains the generation
//! client, the cybernetic refinement loop, and the streaming sinks.
//!
//! ## Architecture
//!
//! - `ai/` - Ollama generation client, agent facade, and prompt templates
//! - `models` - model-role configuration (writer/evaluator/metadata)
//! - `refine/` - evaluation decoding, convergence policy, round controller,
//!   and the post-loop enrichment fan-out
//! - `sink` - event and token sinks multiplexing concurrent producers
//!
//! ## Usage
//!
//! ```rust,ignore
//! use quill_core::ai::{ArticleAgents, OllamaClient};
//! use quill_core::refine::{run_article_loop, LoopSinks};
//!
//! let client = OllamaClient::new("http://localhost:11434")?;
//! let agents = Arc::new(ArticleAgents::new(client, ModelRoles::default()));
//! let state = run_article_loop(agents, "Rust (programming language)", 3, &sinks).await?;
//! ```

pub mod ai;
pub mod models;
pub mod refine;
pub mod sink;
