//! Command-line interface for mongo-transfer
//!
//! ```bash
//! mongo-transfer export mongodb://localhost:27017 shop
//! mongo-transfer import --source-database shop
//! mongo-transfer list
//! mongo-transfer drop shop_imported --force
//! ```
//!
//! Exit code is 0 when every collection or file was transferred, 1 otherwise.

use anyhow::Context;
use clap::{Parser, Subcommand};
use mongo_transfer::{
    confirm_drop, ensure_success, render_report, render_summary, ConnectionOpts, DropArgs,
    ExportArgs, ImportArgs,
};
use mongo_transfer_mongodb::{admin, connect, MongoDatabase, Orchestrator};

#[derive(Parser)]
#[command(name = "mongo-transfer")]
#[command(about = "Export MongoDB databases to JSON snapshots and import them back")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export every collection of a database to <directory>/<database>/<collection>.json
    Export(ExportArgs),

    /// Import the snapshot files of a database into a target database
    Import(ImportArgs),

    /// List user databases with collection and document counts
    List {
        #[command(flatten)]
        connection: ConnectionOpts,
    },

    /// Drop a database after interactive confirmation
    Drop(DropArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Export(args) => {
            let config = args.config();
            tracing::info!("Starting export of database '{}'", config.database);
            let client = connect(&config.connection_string, args.timeout.duration()).await?;
            let source = MongoDatabase::new(&client, &config.database);

            let report = Orchestrator::new(config).export(&source).await?;
            print!("{}", render_report("exported", &report));
            ensure_success(&report, "collections")?;
        }
        Commands::Import(args) => {
            let config = args.config();
            let target_name = args.target_database();
            tracing::info!(
                "Starting import of '{}' snapshots into '{}'",
                config.database,
                target_name
            );
            let client = connect(
                &config.connection_string,
                args.connection.timeout.duration(),
            )
            .await?;
            let target = MongoDatabase::new(&client, &target_name);

            let report = Orchestrator::new(config).import(&target).await?;
            print!("{}", render_report("imported", &report));
            ensure_success(&report, "files")?;
        }
        Commands::List { connection } => {
            let client = connect(&connection.connection_string, connection.timeout.duration()).await?;
            let names = admin::list_databases(&client).await?;
            if names.is_empty() {
                println!("No user databases found");
            }
            for name in names {
                if let Some(summary) = admin::describe_database(&client, &name).await? {
                    println!("{}", render_summary(&summary));
                }
            }
        }
        Commands::Drop(args) => {
            let client = connect(
                &args.connection.connection_string,
                args.connection.timeout.duration(),
            )
            .await?;
            let summary = admin::describe_database(&client, &args.database)
                .await?
                .with_context(|| format!("Database '{}' does not exist", args.database))?;

            println!("Database to drop: {}", render_summary(&summary));
            for (collection, count) in &summary.collections {
                println!("  - {collection}: {count} documents");
            }

            if !args.force {
                let stdin = std::io::stdin();
                let confirmed = confirm_drop(&summary, &mut stdin.lock(), &mut std::io::stdout())
                    .context("Failed to read confirmation")?;
                if !confirmed {
                    anyhow::bail!("Drop of '{}' cancelled", args.database);
                }
            }

            if !admin::drop_database(&client, &args.database).await? {
                anyhow::bail!("Database '{}' is still present after drop", args.database);
            }
            println!("Database '{}' dropped", args.database);
        }
    }

    Ok(())
}
