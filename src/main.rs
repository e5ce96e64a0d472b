use anyhow::Result;
use clap::{Parser, Subcommand};
use sqlx::migrate::MigrateDatabase;

mod cli;

/// plateplan - 4-week family meal plans and templates
#[derive(Parser)]
#[command(name = "plateplan")]
#[command(about = "Plan family meals over 4 weeks and reuse them as templates", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Drop database if exists and recreate with migrations
    Reset,
    /// Manage meal plans
    Plan {
        #[command(subcommand)]
        command: cli::plan::PlanCommand,
    },
    /// Save, inspect and apply templates
    Template {
        #[command(subcommand)]
        command: cli::template::TemplateCommand,
    },
    /// Recipe summaries and deletion checks
    Recipe {
        #[command(subcommand)]
        command: cli::recipe::RecipeCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = plateplan::config::Config::load(cli.config.clone())?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    plateplan::observability::init_observability(
        "plateplan",
        env!("CARGO_PKG_VERSION"),
        &config.observability.log_level,
    )?;

    match cli.command {
        Commands::Migrate => migrate_command(config).await,
        Commands::Reset => reset_command(config).await,
        Commands::Plan { command } => cli::plan::run(config, command).await,
        Commands::Template { command } => cli::template::run(config, command).await,
        Commands::Recipe { command } => cli::recipe::run(config, command).await,
    }
}

#[tracing::instrument(skip(config))]
async fn migrate_command(config: plateplan::config::Config) -> Result<()> {
    tracing::info!("Running database migrations...");

    if !sqlx::Sqlite::database_exists(&config.database.url).await? {
        tracing::info!("Database does not exist, creating: {}", config.database.url);
        sqlx::Sqlite::create_database(&config.database.url).await?;
    }

    let pool = plateplan::create_pool(&config.database.url, 1).await?;
    plateplan::run_migrations(&pool).await?;

    tracing::info!("Migrations completed successfully");

    Ok(())
}

#[tracing::instrument(skip(config))]
async fn reset_command(config: plateplan::config::Config) -> Result<()> {
    tracing::info!("Resetting database...");

    if sqlx::Sqlite::database_exists(&config.database.url).await? {
        tracing::warn!("Dropping existing database: {}", config.database.url);
        sqlx::Sqlite::drop_database(&config.database.url).await?;
        tracing::info!("Database dropped successfully");
    } else {
        tracing::info!("Database does not exist, nothing to drop");
    }

    migrate_command(config).await?;

    tracing::info!("Database reset completed successfully");

    Ok(())
}
