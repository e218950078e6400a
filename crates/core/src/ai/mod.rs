//! # Generation Client
//!
//! Talks to an Ollama-compatible `/api/generate` endpoint, in both
//! blocking and token-streaming form, and exposes the agent facade the
//! refinement loop drives.

pub mod agents;
pub mod client;
pub mod prompts;

pub use agents::{ArticleAgents, ArticleGenerator};
pub use client::{AiError, OllamaClient, DEFAULT_BASE_URL};
