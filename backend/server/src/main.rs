mod api;
mod config;
mod upload;

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use ecoaware_core::{Mode, ReferenceTables};
use ecoaware_inference::{HuggingFaceClient, InferenceBackend};

use api::AppState;
use config::Config;

#[derive(Parser)]
#[command(name = "ecoaware")]
#[command(about = "EcoAware sustainability analysis backend")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
        /// Inference backend: mock or real
        #[arg(short, long)]
        mode: Option<Mode>,
    },
    /// Query a running server's health endpoint
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    logging::init_logger(&config.log_level, config.log_dir.as_deref());

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port, mode } => {
            let config = Config {
                port: port.unwrap_or(config.port),
                mode: mode.unwrap_or(config.mode),
                ..config
            };
            run_server(config).await?;
        }
        Commands::Status => {
            let client = reqwest::Client::new();
            match client
                .get(format!("http://localhost:{}/health", config.port))
                .send()
                .await
            {
                Ok(resp) => {
                    let body: serde_json::Value = resp.json().await?;
                    println!("{}", serde_json::to_string_pretty(&body)?);
                }
                Err(_) => {
                    println!("EcoAware is not running on port {}", config.port);
                }
            }
        }
    }

    Ok(())
}

fn load_tables(config: &Config) -> Result<ReferenceTables> {
    match &config.tables_path {
        Some(path) => Ok(ReferenceTables::from_file(path)?),
        None => Ok(ReferenceTables::builtin()),
    }
}

fn build_backend(config: &Config, tables: Arc<ReferenceTables>) -> InferenceBackend {
    match config.mode {
        Mode::Mock => InferenceBackend::mock(tables, config.seed),
        Mode::Real => {
            if config.hf_api_token.is_none() {
                warn!("HF_API_TOKEN is not set; model requests will be anonymous and rate limited");
            }
            let client = match HuggingFaceClient::new(config.huggingface()) {
                Ok(client) => Some(client),
                Err(e) => {
                    error!(error = %e, "Could not initialise Hugging Face client");
                    None
                }
            };
            InferenceBackend::real(tables, client)
        }
    }
}

async fn run_server(config: Config) -> Result<()> {
    info!(
        port = config.port,
        bind = %config.bind_address,
        mode = %config.mode,
        "Starting EcoAware backend"
    );

    let tables = Arc::new(load_tables(&config)?);
    let backend = build_backend(&config, tables);
    let state = Arc::new(AppState::new(backend));

    let app = api::build_router(state, config.max_upload_bytes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());
    let addr = format!("{}:{}", config.bind_address, config.port);

    info!(addr = %addr, "HTTP API listening");

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("EcoAware backend stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
