use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use unicorn_finder::{
    config::Config,
    history::{FileHistoryStore, HistoryStore},
    llm::create_adapter,
    orchestrator::{PipelineEvent, RequestOrchestrator},
    render,
    routes::create_router,
    upload::UploadCandidate,
    AppState,
};

#[derive(Debug, Parser)]
#[command(
    name = "unicorn-finder",
    version,
    about = "Evaluate startups from their name and pitch documents"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Evaluate a company by name or website
    Evaluate {
        /// Company name or website URL
        query: String,
        /// Document to attach (repeatable)
        #[arg(long = "file", short = 'f', value_name = "PATH")]
        files: Vec<PathBuf>,
        /// Print the raw evaluation JSON
        #[arg(long)]
        json: bool,
    },
    /// List recent searches
    History,
    /// Run the HTTP API
    Serve {
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so `evaluate --json` keeps stdout clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "unicorn_finder=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config::from_env()?;
    info!(
        model = %config.llm.model,
        upload_policy = config.upload.name,
        history = ?config.history.path,
        "Configuration loaded"
    );

    match cli.command {
        Command::Evaluate { query, files, json } => evaluate(config, query, files, json).await,
        Command::History => {
            let history = FileHistoryStore::new(config.history.path.clone()).load().await?;
            println!("{}", render::render_history(history.entries()));
            Ok(())
        }
        Command::Serve { port } => serve(config, port).await,
    }
}

async fn build_orchestrator(config: &Config) -> anyhow::Result<RequestOrchestrator> {
    let llm = create_adapter(&config.llm);
    let store = Arc::new(FileHistoryStore::new(config.history.path.clone()));
    Ok(RequestOrchestrator::new(llm, config.upload.clone(), store).await?)
}

async fn evaluate(config: Config, query: String, paths: Vec<PathBuf>, json: bool) -> anyhow::Result<()> {
    let mut files = Vec::with_capacity(paths.len());
    for path in &paths {
        files.push(UploadCandidate::from_path(path).await?);
    }

    let (tx, mut rx) = mpsc::channel(16);
    let orchestrator = build_orchestrator(&config).await?.with_events(tx);

    let progress = tokio::spawn(async move {
        while let Some(PipelineEvent::StageChanged(stage)) = rx.recv().await {
            if stage.is_busy() {
                eprintln!("{}", stage.message());
            }
        }
    });

    let result = orchestrator.submit(&query, files).await;
    drop(orchestrator);
    progress.await.ok();

    let evaluation = result.map_err(|e| anyhow::anyhow!(e.user_message()))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&evaluation)?);
    } else {
        println!("{}", render::render_evaluation(&evaluation));
    }

    Ok(())
}

async fn serve(config: Config, port: Option<u16>) -> anyhow::Result<()> {
    let orchestrator = build_orchestrator(&config).await?;
    let port = port.unwrap_or(config.server.port);
    let addr = format!("{}:{}", config.server.host, port);

    let state = AppState {
        config,
        orchestrator: Arc::new(orchestrator),
    };
    let app = create_router(state);

    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}
