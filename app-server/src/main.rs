use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use semcat_app_server::render::render_rows;
use semcat_app_server::{ServerConfig, router};
use semcat_categories::{CategoryRow, CategoryService};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "semcat-app-server")]
#[command(about = "Register categories and search them by meaning")]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true, env = "SEMCAT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP API (default)
    Serve {
        /// Address to bind to, overriding the config file
        #[arg(long, env = "SEMCAT_BIND")]
        bind: Option<String>,
    },
    /// List categories in insertion order
    List,
    /// Register a category
    Add { name: String },
    /// Remove a category by id
    Remove { id: String },
    /// Rank categories by similarity to a query
    Search {
        query: String,

        /// Maximum number of results
        #[arg(long)]
        top_k: Option<usize>,

        /// Minimum similarity score
        #[arg(long)]
        threshold: Option<f32>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "semcat_app_server=info,semcat_categories=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = ServerConfig::load(cli.config.as_deref())?;
    let service = config.build_service()?;

    match cli.command.unwrap_or(Command::Serve { bind: None }) {
        Command::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| config.bind.clone());
            serve(service, &bind).await?;
        }
        Command::List => {
            let rows: Vec<CategoryRow> = service
                .list()
                .await?
                .into_iter()
                .map(CategoryRow::from)
                .collect();
            print!("{}", render_rows(&rows));
        }
        Command::Add { name } => {
            let category = service.register(&name).await?;
            println!("{}", category.id);
        }
        Command::Remove { id } => {
            service.remove(&id).await?;
        }
        Command::Search {
            query,
            top_k,
            threshold,
        } => {
            let mut options = service.search_defaults();
            if let Some(top_k) = top_k {
                options = options.with_top_k(top_k);
            }
            if let Some(threshold) = threshold {
                options = options.with_threshold(threshold);
            }
            let rows: Vec<CategoryRow> = service
                .search(&query, options)
                .await?
                .into_iter()
                .map(CategoryRow::from)
                .collect();
            print!("{}", render_rows(&rows));
        }
    }

    Ok(())
}

async fn serve(service: CategoryService, bind: &str) -> anyhow::Result<()> {
    let addr: SocketAddr = bind
        .parse()
        .with_context(|| format!("invalid bind address {bind}"))?;
    let app = router(service);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
