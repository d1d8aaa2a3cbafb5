//! HTTP API for the agent orchestrator: plan and chat over JSON, plus an SSE
//! feed of session changes.

mod routes;
mod sse;
mod state;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::Context;
use axum::Router;
use axum::http::HeaderValue;
use axum::routing::get;
use clap::Parser;
use orchestrator::io::config::{DEFAULT_CONFIG_PATH, load_config};
use orchestrator::service::OrchestratorService;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::info;

use crate::state::AppState;

#[derive(Parser, Debug)]
#[command(name = "orchestrator-api")]
#[command(about = "HTTP API for the agent orchestrator")]
struct Args {
    /// Address to bind the server to
    #[arg(long, default_value = "127.0.0.1")]
    bind: String,

    /// Port to listen on
    #[arg(long, default_value = "8000")]
    port: u16,

    /// Orchestrator config file (defaults apply when missing)
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Origin allowed by CORS; repeat for several
    #[arg(
        long = "allow-origin",
        default_values_t = [
            "http://localhost:3000".to_string(),
            "http://127.0.0.1:3000".to_string(),
        ]
    )]
    allow_origins: Vec<String>,

    /// Directory of static UI files served for unmatched paths
    #[arg(long)]
    ui_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("orchestrator_api=info".parse()?),
        )
        .init();

    let args = Args::parse();

    let config = load_config(&args.config)?;
    let service = OrchestratorService::from_config(&config)?;
    service.verify_agents().context("check configured agents")?;
    info!(
        config = %args.config.display(),
        planner = %config.planner,
        agents = ?config.agent_order,
        "starting orchestrator-api"
    );

    let cors = cors_layer(&args.allow_origins)?;
    let app = build_app(AppState::new(service), cors, args.ui_dir.as_deref());

    let addr: SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;
    info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn cors_layer(origins: &[String]) -> anyhow::Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin).with_context(|| format!("invalid origin {origin:?}"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any))
}

fn build_app(state: AppState, cors: CorsLayer, ui_dir: Option<&Path>) -> Router {
    let mut app = Router::new()
        .merge(routes::api_router())
        .route("/events", get(sse::events_handler))
        .layer(cors)
        .with_state(state);

    match ui_dir {
        Some(dir) if dir.exists() => {
            info!(ui_dir = %dir.display(), "serving static UI files");
            app = app.fallback_service(ServeDir::new(dir).append_index_html_on_directories(true));
        }
        Some(dir) => info!(ui_dir = %dir.display(), "UI directory not found, API-only mode"),
        None => {}
    }
    app
}
