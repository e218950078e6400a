//! Quill server
//!
//! Axum server exposing the article refinement loop as a streaming API.
//! A request spawns one loop run; everything it produces comes back to
//! the client as a single SSE stream.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    routing::{get, post},
    Json, Router,
};
use clap::Parser;
use futures::stream::Stream;
use quill_core::ai::{ArticleAgents, ArticleGenerator, OllamaClient, DEFAULT_BASE_URL};
use quill_core::models::ModelRoles;
use quill_core::refine::{run_article_loop, LoopSinks, DEFAULT_MAX_ROUNDS};
use quill_core::sink::{events, ChannelSink, EventSink, SinkEvent};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio_stream::{wrappers::UnboundedReceiverStream, StreamExt};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "quill", about = "Iterative article generation server")]
struct Args {
    /// Port to listen on.
    #[arg(long, default_value_t = 8080, env = "QUILL_PORT")]
    port: u16,

    /// Base URL of the Ollama instance.
    #[arg(long, default_value = DEFAULT_BASE_URL, env = "OLLAMA_URL")]
    ollama_url: String,

    /// Model used for drafting and revising.
    #[arg(long, default_value = "llama3.1", env = "QUILL_WRITER_MODEL")]
    writer_model: String,

    /// Model used for evaluation and revision planning.
    #[arg(long, default_value = "mistral", env = "QUILL_EVALUATOR_MODEL")]
    evaluator_model: String,

    /// Model used for the enrichment agents.
    #[arg(long, default_value = "llama3.1", env = "QUILL_METADATA_MODEL")]
    metadata_model: String,
}

struct AppState {
    agents: Arc<ArticleAgents>,
}

type SharedState = Arc<AppState>;

#[derive(Deserialize)]
struct ArticleRequest {
    topic: String,
    max_rounds: Option<i64>,
}

/// Clamp a client-supplied round count to something sane; non-positive
/// or absent values fall back to the default.
fn effective_rounds(requested: Option<i64>) -> u32 {
    match requested {
        Some(n) if n > 0 => n as u32,
        _ => DEFAULT_MAX_ROUNDS,
    }
}

async fn start_article(
    State(state): State<SharedState>,
    Json(req): Json<ArticleRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, (StatusCode, String)> {
    let topic = req.topic.trim().to_string();
    if topic.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "topic must not be empty".into()));
    }
    let max_rounds = effective_rounds(req.max_rounds);
    info!(topic, max_rounds, "starting article run");

    let (sink, rx) = ChannelSink::new();
    let events_sink: Arc<dyn EventSink> = Arc::new(sink);
    let sinks = LoopSinks::from_events(Arc::clone(&events_sink));
    let agents: Arc<dyn ArticleGenerator> = Arc::clone(&state.agents) as Arc<dyn ArticleGenerator>;

    tokio::spawn(async move {
        match run_article_loop(agents, &topic, max_rounds, &sinks).await {
            Ok(state) => {
                events_sink.emit(events::ARTICLE_DONE, &state.final_article);
                match serde_json::to_value(&state) {
                    Ok(value) => events_sink.emit_json(events::DONE, value),
                    Err(err) => {
                        error!(topic, error = %err, "failed to serialize final state");
                        events_sink.emit(events::ERROR, "failed to serialize final state");
                    }
                }
            }
            Err(err) => {
                error!(topic, error = %err, "article run failed");
                events_sink.emit(events::ERROR, &err.to_string());
            }
        }
    });

    let stream = UnboundedReceiverStream::new(rx)
        .map(|SinkEvent { name, data }| Ok(Event::default().event(name).data(data)));
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

async fn healthz() -> impl IntoResponse {
    StatusCode::OK
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    let client = OllamaClient::new(&args.ollama_url)?;
    let models = ModelRoles {
        writer: args.writer_model,
        evaluator: args.evaluator_model,
        metadata: args.metadata_model,
    };
    let state: SharedState = Arc::new(AppState {
        agents: Arc::new(ArticleAgents::new(client, models)),
    });

    let app = Router::new()
        .route("/api/article", post(start_article))
        .route("/healthz", get(healthz))
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    info!(%addr, ollama = args.ollama_url, "quill server listening");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
