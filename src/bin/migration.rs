use clap::{Parser, Subcommand};
use sea_orm_migration::MigratorTrait;
use tracing::{error, info};

use inventory_api::{config, db, migrator::Migrator};

/// Manage the inventory database schema
#[derive(Debug, Parser)]
#[command(name = "migration", version, about)]
struct Cli {
    /// Connection URL; defaults to the configured `database_url`
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply pending migrations (default)
    Up {
        /// Apply at most this many
        #[arg(short, long)]
        steps: Option<u32>,
    },
    /// Roll back applied migrations
    Down {
        /// Roll back this many, default 1
        #[arg(short, long, default_value_t = 1)]
        steps: u32,
    },
    /// Show which migrations are applied
    Status,
    /// Drop every table and reapply all migrations
    Fresh,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config()?;
    config::init_tracing(cfg.log_level(), cfg.log_json);

    let url = cli
        .database_url
        .clone()
        .unwrap_or_else(|| cfg.database_url().to_string());
    let pool = db::establish_connection(&url).await?;

    let result = match cli.command.unwrap_or(Command::Up { steps: None }) {
        Command::Up { steps } => {
            info!(?steps, "Applying migrations");
            Migrator::up(&pool, steps).await
        }
        Command::Down { steps } => {
            info!(steps, "Rolling back migrations");
            Migrator::down(&pool, Some(steps)).await
        }
        Command::Status => Migrator::status(&pool).await,
        Command::Fresh => {
            info!("Dropping all tables and reapplying migrations");
            Migrator::fresh(&pool).await
        }
    };

    if let Err(e) = &result {
        error!("Migration command failed: {}", e);
    }
    db::close_pool(pool).await?;
    result?;

    info!("Migration command completed");
    Ok(())
}
