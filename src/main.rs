mod cli;

use bookshelf::{config, server};
use bookshelf_db::{migrations, pool};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::{Path, PathBuf};

fn open_pool(config: &config::Config) -> Result<pool::DbPool> {
    let db_path = config.database.path.to_string_lossy();
    tracing::info!("Opening database at {}", db_path);
    pool::init_pool(&db_path, config.database.pool_size)
        .with_context(|| format!("Failed to open database {}", db_path))
}

async fn start_server(
    host: Option<String>,
    port: Option<u16>,
    db: Option<PathBuf>,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;

    // CLI flags win over the config file
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    if let Some(db) = db {
        config.database.path = db;
    }
    config::validate_config(&config)?;

    tracing::info!("Starting Bookshelf server");
    let db_pool = open_pool(&config)?;

    server::start_server(config, db_pool).await
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "bookshelf=trace,bookshelf_db=debug,tower_http=debug".to_string()
        } else {
            "bookshelf=debug,bookshelf_db=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Serve { host, port, db } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, db, cli.config.as_deref()))
        }
        Commands::InitDb { db } => init_db(db, cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("bookshelf {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn init_db(db: Option<PathBuf>, config_path: Option<&Path>) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;
    if let Some(db) = db {
        config.database.path = db;
    }

    let db_pool = open_pool(&config)?;
    let conn = pool::get_conn(&db_pool)?;
    let version = migrations::current_version(&conn)?;
    let latest = migrations::latest_version();
    if version < latest {
        anyhow::bail!("Database schema is at version {version}, expected {latest}");
    }

    println!(
        "Database ready: {} (schema version {})",
        config.database.path.display(),
        version
    );
    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  Server: {}:{}", config.server.host, config.server.port);
            println!("  CORS enabled: {}", config.server.cors);
            println!(
                "  Database: {} (pool size {})",
                config.database.path.display(),
                config.database.pool_size
            );
            println!("  Default per page: {}", config.api.default_per_page);
            match config.api.max_per_page {
                Some(max) => println!("  Max per page: {}", max),
                None => println!("  Max per page: unlimited"),
            }
            println!("  GET deletes allowed: {}", config.ui.allow_get_deletes);
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("Default config:");
            println!("  Server: {}:{}", config.server.host, config.server.port);
            println!("  Database: {}", config.database.path.display());
        }
    }

    Ok(())
}
