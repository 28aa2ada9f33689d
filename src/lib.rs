//! mongo-transfer library
//!
//! Command-line options and their resolution into a [`TransferConfig`], plus
//! the small pieces of terminal interaction the binary needs.
//!
//! # CLI Usage
//!
//! ```bash
//! # Export every collection of `shop` to mongodb_export/shop/*.json
//! mongo-transfer export mongodb://localhost:27017 shop
//!
//! # Import mongodb_export/shop/*.json into `shop_imported`
//! mongo-transfer import --source-database shop
//!
//! # Import into an explicitly named database, 500 documents per batch
//! mongo-transfer import shop_restore --source-database shop --batch-size 500
//!
//! # Administration
//! mongo-transfer list
//! mongo-transfer drop shop_imported
//! ```
//!
//! Every option can also be set through the environment (or a `.env` file):
//! `MONGODB_CONNECTION_STRING`, `DATABASE_NAME`, `TARGET_DATABASE_NAME`,
//! `EXPORT_DIRECTORY`, `IMPORT_BATCH_SIZE` and `CONNECT_TIMEOUT_SECS`.

use clap::Parser;
use mongo_transfer_file::DEFAULT_EXPORT_DIRECTORY;
use mongo_transfer_mongodb::{default_target_database, TransferConfig, DEFAULT_BATCH_SIZE};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

pub use mongo_transfer_mongodb::admin::DatabaseSummary;
pub use mongo_transfer_mongodb::TransferReport;

#[derive(Parser, Clone, Debug)]
pub struct ConnectionOpts {
    /// MongoDB connection string
    #[arg(long, env = "MONGODB_CONNECTION_STRING")]
    pub connection_string: String,

    #[command(flatten)]
    pub timeout: TimeoutOpts,
}

#[derive(Parser, Clone, Debug)]
pub struct TimeoutOpts {
    /// Connect and server-selection timeout in seconds
    #[arg(
        long = "connect-timeout-secs",
        env = "CONNECT_TIMEOUT_SECS",
        default_value_t = 10,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub connect_timeout_secs: u64,
}

impl TimeoutOpts {
    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

#[derive(Parser, Clone, Debug)]
pub struct ExportArgs {
    /// MongoDB connection string
    #[arg(env = "MONGODB_CONNECTION_STRING")]
    pub connection_string: String,

    /// Database to export
    #[arg(env = "DATABASE_NAME")]
    pub database: String,

    /// Root directory of the snapshot tree
    #[arg(long, env = "EXPORT_DIRECTORY", default_value = DEFAULT_EXPORT_DIRECTORY)]
    pub directory: PathBuf,

    #[command(flatten)]
    pub timeout: TimeoutOpts,
}

impl ExportArgs {
    pub fn config(&self) -> TransferConfig {
        TransferConfig {
            connection_string: self.connection_string.clone(),
            database: self.database.clone(),
            directory: self.directory.clone(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

#[derive(Parser, Clone, Debug)]
pub struct ImportArgs {
    /// Database to import into (default: <source-database>_imported)
    #[arg(env = "TARGET_DATABASE_NAME")]
    pub target_database: Option<String>,

    /// Database whose snapshot directory is imported
    #[arg(long, env = "DATABASE_NAME")]
    pub source_database: String,

    /// Root directory of the snapshot tree
    #[arg(long, env = "EXPORT_DIRECTORY", default_value = DEFAULT_EXPORT_DIRECTORY)]
    pub directory: PathBuf,

    /// Maximum number of documents per insert batch
    #[arg(
        long,
        env = "IMPORT_BATCH_SIZE",
        default_value_t = DEFAULT_BATCH_SIZE,
        value_parser = parse_batch_size
    )]
    pub batch_size: usize,

    #[command(flatten)]
    pub connection: ConnectionOpts,
}

impl ImportArgs {
    pub fn config(&self) -> TransferConfig {
        TransferConfig {
            connection_string: self.connection.connection_string.clone(),
            database: self.source_database.clone(),
            directory: self.directory.clone(),
            batch_size: self.batch_size,
        }
    }

    pub fn target_database(&self) -> String {
        self.target_database
            .clone()
            .unwrap_or_else(|| default_target_database(&self.source_database))
    }
}

#[derive(Parser, Clone, Debug)]
pub struct DropArgs {
    /// Database to drop
    pub database: String,

    /// Skip the interactive confirmations
    #[arg(long)]
    pub force: bool,

    #[command(flatten)]
    pub connection: ConnectionOpts,
}

fn parse_batch_size(s: &str) -> Result<usize, String> {
    match s.trim().parse::<usize>() {
        Ok(0) => Err("batch size must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(format!("invalid batch size '{s}': {e}")),
    }
}

/// Render a finished run for the terminal: one line per unit, then the total.
pub fn render_report(verb: &str, report: &TransferReport) -> String {
    let mut out = String::new();
    for unit in &report.units {
        out.push_str(&format!(
            "  {}: {} documents {}\n",
            unit.name, unit.documents_written, verb
        ));
    }
    for failure in &report.failures {
        out.push_str(&format!(
            "  {}: FAILED [{}] {}\n",
            failure.name, failure.kind, failure.error
        ));
    }
    out.push_str(&format!("Total: {report}\n"));
    out
}

/// Turn a finished run into the process outcome: any failed unit makes the
/// run fail.
pub fn ensure_success(report: &TransferReport, unit: &str) -> anyhow::Result<()> {
    anyhow::ensure!(
        report.is_success(),
        "{} of {} {} failed",
        report.failures.len(),
        report.failures.len() + report.units.len(),
        unit
    );
    Ok(())
}

/// Summary line used by `list`.
pub fn render_summary(summary: &DatabaseSummary) -> String {
    format!(
        "{}: {} collections, {} documents",
        summary.name,
        summary.collections.len(),
        summary.total_documents()
    )
}

/// Ask the three drop confirmations: yes/no, the exact database name, and
/// the word `DELETE`. Returns `false` as soon as one answer does not match.
pub fn confirm_drop<R: BufRead, W: Write>(
    summary: &DatabaseSummary,
    input: &mut R,
    output: &mut W,
) -> std::io::Result<bool> {
    let name = summary.name.as_str();
    writeln!(output, "WARNING: this permanently deletes database '{name}'")?;
    writeln!(
        output,
        "  {} collections, {} documents, all indexes",
        summary.collections.len(),
        summary.total_documents()
    )?;

    let answer = prompt(
        input,
        output,
        &format!("Are you sure you want to drop database '{name}'? (yes/no): "),
    )?;
    if !matches!(answer.to_lowercase().as_str(), "yes" | "y") {
        writeln!(output, "Operation cancelled")?;
        return Ok(false);
    }

    let answer = prompt(
        input,
        output,
        &format!("Type the exact database name '{name}' to confirm: "),
    )?;
    if answer != name {
        writeln!(output, "Database name mismatch, expected '{name}', got '{answer}'")?;
        return Ok(false);
    }

    let answer = prompt(
        input,
        output,
        &format!("Type 'DELETE' to permanently drop '{name}': "),
    )?;
    if answer != "DELETE" {
        writeln!(output, "Confirmation failed, operation cancelled")?;
        return Ok(false);
    }
    Ok(true)
}

fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> std::io::Result<String> {
    write!(output, "{question}")?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}
