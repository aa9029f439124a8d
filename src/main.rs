use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::time::Duration;
use tracing::{error, info, warn};

use emochat::config::AppConfig;
use emochat::routes::configure_routes;
use emochat::state::AppState;
use emochat::store::ChatStore;

/// How often expired sessions are purged while serving
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[derive(Parser)]
#[command(name = "emochat")]
#[command(about = "Backend for an emotional-support chat companion")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API (default)
    Serve,

    /// Create any missing tables, indexes and triggers
    InitDb,

    /// Print every table with its columns and row count
    CheckDb,
}

fn init_tracing() -> Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("emochat=info,warn")),
        )
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; variables may come from the environment
    let _ = dotenvy::dotenv();
    init_tracing()?;

    let cli = Cli::parse();
    let config = AppConfig::from_env().context("invalid configuration")?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::InitDb => init_db(config).await,
        Commands::CheckDb => check_db(config).await,
    }
}

async fn connect(config: &AppConfig) -> Result<ChatStore> {
    let store_config = config.store_config()?;
    info!(
        host = %store_config.host,
        database = %store_config.database,
        max_pool_size = store_config.max_pool_size,
        "Connecting to database"
    );
    ChatStore::new(store_config)
        .await
        .context("failed to connect to database")
}

async fn serve(config: AppConfig) -> Result<()> {
    if config.uses_default_secret() {
        warn!("JWT_SECRET is not set; using the built-in default secret");
    }

    let store = connect(&config).await?;
    info!("Database connected");

    let sweeper = store.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            match sweeper.delete_expired_sessions().await {
                Ok(0) => {}
                Ok(removed) => info!(removed, "Purged expired sessions"),
                Err(e) => error!(error = %e, "Failed to purge expired sessions"),
            }
        }
    });

    let addr = config.listen_addr();
    let state = AppState::new(store, &config);

    info!(%addr, development = config.development, "Starting server");
    warp::serve(configure_routes(state)).run(addr).await;

    Ok(())
}

async fn init_db(config: AppConfig) -> Result<()> {
    let store = connect(&config).await?;
    store.apply_schema().await.context("failed to apply schema")?;
    info!("Schema applied");

    for (table, rows) in store.table_row_counts().await? {
        info!(table = %table, rows, "Table ready");
    }
    Ok(())
}

async fn check_db(config: AppConfig) -> Result<()> {
    let store = connect(&config).await?;
    let now = store.now().await?;
    println!("Connected. Server time: {}", now);

    let tables = store.describe_tables().await?;
    if tables.is_empty() {
        println!("No tables found. Run `emochat init-db` first.");
        return Ok(());
    }

    for table in tables {
        println!("\n{} ({} rows)", table.name, table.row_count);
        for column in table.columns {
            let length = column
                .max_length
                .map(|l| format!("({})", l))
                .unwrap_or_default();
            let nullable = if column.nullable { "NULL" } else { "NOT NULL" };
            let default = column
                .default
                .map(|d| format!(" DEFAULT {}", d))
                .unwrap_or_default();
            println!(
                "  {:<20} {}{} {}{}",
                column.name, column.data_type, length, nullable, default
            );
        }
    }
    Ok(())
}
