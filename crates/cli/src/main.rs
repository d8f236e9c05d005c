//! `soil-sampling` CLI entry-point.
//!
//! Available sub-commands:
//! - `serve`   — apply migrations and start the API server.
//! - `migrate` — run pending database migrations and exit.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "soil-sampling",
    about = "Record-keeping API for field soil sampling plans",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct DatabaseArgs {
    /// SQLite connection string; the file is created if missing.
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://soil.db")]
    database_url: String,

    #[arg(long, env = "DATABASE_MAX_CONNECTIONS", default_value_t = 5)]
    max_connections: u32,
}

#[derive(Subcommand)]
enum Command {
    /// Start the REST API server.
    Serve {
        #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8000")]
        bind: String,

        #[command(flatten)]
        database: DatabaseArgs,
    },
    /// Run pending database migrations.
    Migrate {
        #[command(flatten)]
        database: DatabaseArgs,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { bind, database } => {
            let pool = db::pool::create_pool(&database.database_url, database.max_connections)
                .await
                .context("failed to connect to database")?;
            db::pool::run_migrations(&pool)
                .await
                .context("migration failed")?;

            info!("Starting API server on {bind}");
            api::serve(&bind, pool).await.context("API server failed")?;
        }
        Command::Migrate { database } => {
            info!("Running migrations against {}", database.database_url);
            let pool = db::pool::create_pool(&database.database_url, 1)
                .await
                .context("failed to connect to database")?;
            db::pool::run_migrations(&pool)
                .await
                .context("migration failed")?;
            pool.close().await;
            info!("Migrations applied successfully");
        }
    }

    Ok(())
}
