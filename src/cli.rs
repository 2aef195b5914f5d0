//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::web::{AppState, build_router, serve};
use crate::domain::clock::SystemClock;
use crate::domain::database_name::validate_database_name;
use crate::domain::error::PriceTrendError;
use crate::ports::config_port::ConfigPort;
use crate::ports::document_port::DocumentPort;

pub const DEFAULT_LISTEN: &str = "127.0.0.1:5000";

#[derive(Parser, Debug)]
#[command(name = "pricetrend", about = "Price history and trend API over a document store")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP server
    Serve {
        /// Database holding one collection per instrument
        database: String,
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Address to bind, overrides [server] listen
        #[arg(short, long)]
        listen: Option<String>,
    },
    /// List the collections in a database
    Collections {
        database: String,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Serve {
            database,
            config,
            listen,
        } => run_serve(&database, config.as_ref(), listen.as_deref()),
        Command::Collections { database, config } => run_collections(&database, config.as_ref()),
    }
}

/// `RUST_LOG` wins; otherwise log at `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

pub fn load_config(path: Option<&PathBuf>) -> Result<FileConfigAdapter, PriceTrendError> {
    match path {
        Some(path) => FileConfigAdapter::from_file(path).map_err(|e| PriceTrendError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        }),
        None => Ok(FileConfigAdapter::empty()),
    }
}

/// `--listen` first, then `[server] listen`, then `DEFAULT_LISTEN`.
pub fn resolve_listen_addr(
    cli_listen: Option<&str>,
    config: &dyn ConfigPort,
) -> Result<SocketAddr, PriceTrendError> {
    let raw = cli_listen
        .map(str::to_string)
        .or_else(|| config.get_string("server", "listen"))
        .unwrap_or_else(|| DEFAULT_LISTEN.to_string());

    raw.parse().map_err(|e: std::net::AddrParseError| PriceTrendError::ConfigInvalid {
        section: "server".into(),
        key: "listen".into(),
        reason: format!("{raw:?}: {e}"),
    })
}

/// Open the store selected by `[store] backend` against `database`.
pub fn build_document_store(
    config: &dyn ConfigPort,
    database: &str,
) -> Result<Arc<dyn DocumentPort + Send + Sync>, PriceTrendError> {
    validate_database_name(database)?;

    let backend = config
        .get_string("store", "backend")
        .unwrap_or_else(|| "sqlite".to_string());

    match backend.as_str() {
        #[cfg(feature = "sqlite")]
        "sqlite" => {
            use crate::adapters::sqlite_adapter::SqliteDocumentStore;
            Ok(Arc::new(SqliteDocumentStore::from_config(config, database)?))
        }
        #[cfg(feature = "postgres")]
        "postgres" => {
            use crate::adapters::postgres_adapter::PostgresDocumentStore;
            Ok(Arc::new(PostgresDocumentStore::from_config(config, database)?))
        }
        other => Err(PriceTrendError::ConfigInvalid {
            section: "store".into(),
            key: "backend".into(),
            reason: format!("{other:?} is not a backend this build supports"),
        }),
    }
}

fn run_serve(database: &str, config_path: Option<&PathBuf>, listen: Option<&str>) -> ExitCode {
    match serve_blocking(database, config_path, listen) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn serve_blocking(
    database: &str,
    config_path: Option<&PathBuf>,
    listen: Option<&str>,
) -> Result<(), PriceTrendError> {
    validate_database_name(database)?;

    if let Some(path) = config_path {
        tracing::info!(config = %path.display(), "loading config");
    }
    let config = load_config(config_path)?;
    let addr = resolve_listen_addr(listen, &config)?;
    let store = build_document_store(&config, database)?;

    tracing::info!(database = store.database(), "document store ready");

    let router = build_router(AppState {
        store,
        clock: Arc::new(SystemClock),
    });

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(serve(router, addr))?;
    Ok(())
}

fn run_collections(database: &str, config_path: Option<&PathBuf>) -> ExitCode {
    let result = load_config(config_path)
        .and_then(|config| build_document_store(&config, database))
        .and_then(|store| store.open_session()?.list_collections());

    match result {
        Ok(names) if names.is_empty() => {
            eprintln!("No collections found in {database}");
            ExitCode::SUCCESS
        }
        Ok(names) => {
            for name in &names {
                println!("{name}");
            }
            eprintln!("{} collections found", names.len());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}
