//! personachat - personality-driven chat for a local LLM
//!
//! Runs a small HTTP chat service in front of the inference backend and a
//! terminal UI that talks to it. Each personality keeps its own conversation
//! for the lifetime of the process.

use std::fs::OpenOptions;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use axum::Router;
use clap::{Parser, Subcommand};
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod client;
mod config;
mod conversation;
mod core;
mod personality;
mod providers;
mod routes;
mod tui;

use client::ChatClient;
use config::{Config, PersonalityLoader};
use core::{ChatBackend, ChatEngine, ChatSession};
use personality::PersonalityCatalog;
use providers::Provider;
use routes::AppState;

#[derive(Parser)]
#[command(name = "personachat", version)]
#[command(about = "Chat with personalities backed by a local language model")]
#[command(
    long_about = "Chat with personalities backed by a local language model.\n\n\
Environment Variables (a .env file is read if present):\n\
  HOST, PORT             Chat service address (127.0.0.1:5001)\n\
  MODEL                  Model name (llama3.2)\n\
  OLLAMA_URL             Inference backend (http://localhost:11434)\n\
  MAX_TOKENS             Token budget per reply (400)\n\
  REQUEST_TIMEOUT_SECS   Backend timeout (120)\n\
  LOG_FILE               Log destination for the chat UI\n\
  PERSONALITIES_DIR      Directory with extra personality .toml files\n\n\
Controls:\n\
  Enter        Send the message (\"quit\" exits)\n\
  Up/Down      Switch personality\n\
  PgUp/PgDn    Scroll the chat\n\
  Ctrl+N       Add a personality\n\
  Ctrl+C       Quit"
)]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override the model name
    #[arg(short = 'm', long, global = true)]
    model: Option<String>,

    /// Override the chat service port
    #[arg(short = 'p', long, global = true)]
    port: Option<u16>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the chat interface (default)
    Chat {
        /// Connect to an already running chat service
        #[arg(long)]
        no_server: bool,

        /// Call the inference backend in-process instead of over HTTP
        #[arg(long, conflicts_with = "no_server")]
        direct: bool,
    },
    /// Run only the HTTP chat service
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let mut config = Config::from_env()?;
    if let Some(model) = args.model {
        config.model = model;
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    let command = args.command.unwrap_or(Commands::Chat {
        no_server: false,
        direct: false,
    });
    let to_stdout = matches!(command, Commands::Serve);
    init_logging(&config, to_stdout)?;

    let catalog = load_catalog(&config).await;

    match command {
        Commands::Serve => {
            let engine = build_engine(&config).await?;
            let listener = bind(&config).await?;
            tracing::info!("Chat service running at http://{}", listener.local_addr()?);
            axum::serve(listener, app_router(&config, engine, catalog))
                .with_graceful_shutdown(shutdown_signal())
                .await?;
            tracing::info!("Chat service stopped");
        }
        Commands::Chat { no_server, direct } => {
            let backend: Arc<dyn ChatBackend> = if direct {
                build_engine(&config).await?
            } else {
                if !no_server {
                    println!("Starting the web server...");
                    let engine = build_engine(&config).await?;
                    let listener = bind(&config).await?;
                    let app = app_router(&config, engine, catalog.clone());
                    tokio::spawn(async move {
                        if let Err(e) = axum::serve(listener, app).await {
                            tracing::error!("Chat service failed: {}", e);
                        }
                    });
                    println!(
                        "Web server started. Logs are written to {}",
                        config.log_file.display()
                    );
                }
                Arc::new(ChatClient::new(config.chat_url(), config.request_timeout())?)
            };

            tui::run(ChatSession::new(catalog), backend).await?;
        }
    }

    Ok(())
}

/// Log to stdout for the service, to a file while the UI owns the terminal
fn init_logging(config: &Config, to_stdout: bool) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "personachat=info,tower_http=info".into());

    let (stdout_layer, file_layer) = if to_stdout {
        (Some(tracing_subscriber::fmt::layer()), None)
    } else {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.log_file)
            .with_context(|| format!("Failed to open log file {}", config.log_file.display()))?;
        let layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(Mutex::new(file));
        (None, Some(layer))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    Ok(())
}

/// Built-in personalities plus any from `PERSONALITIES_DIR`
async fn load_catalog(config: &Config) -> PersonalityCatalog {
    let mut catalog = PersonalityCatalog::with_builtins();

    if let Some(dir) = &config.personalities_dir {
        match PersonalityLoader::new(dir).load_all().await {
            Ok(profiles) => {
                let added = catalog.extend(profiles);
                tracing::info!("Loaded {} personality file(s) from {}", added, dir.display());
            }
            Err(e) => tracing::warn!("Could not read {}: {}", dir.display(), e),
        }
    }

    catalog
}

/// Connect to the inference backend. Failure here is fatal.
async fn build_engine(config: &Config) -> anyhow::Result<Arc<ChatEngine>> {
    let provider = Provider::from_config(config)?;
    provider.check().await.with_context(|| {
        format!(
            "Failed to initialize model '{}' at {}",
            config.model, config.ollama_url
        )
    })?;

    let engine = ChatEngine::new(Arc::new(provider), config.max_tokens);
    tracing::info!(
        model = %config.model,
        max_tokens = engine.max_tokens(),
        "Inference backend ready"
    );
    Ok(Arc::new(engine))
}

async fn bind(config: &Config) -> anyhow::Result<tokio::net::TcpListener> {
    tokio::net::TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", config.host, config.port))
}

fn app_router(config: &Config, engine: Arc<ChatEngine>, catalog: PersonalityCatalog) -> Router {
    let state = AppState {
        backend: engine,
        catalog: Arc::new(catalog),
    };

    Router::new()
        .merge(routes::router())
        .layer(TimeoutLayer::new(config.request_timeout()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
