//! MongoDB export/import pipeline for mongo-transfer
//!
//! Moves whole databases through snapshot files: every collection of a source
//! database is exported to `<dir>/<database>/<collection>.json`, and a
//! snapshot directory is imported back into a target database.
//!
//! The pipeline is written against the [`SourceDatabase`] and
//! [`TargetDatabase`] traits; [`MongoDatabase`] implements both over the
//! official driver.

pub mod admin;
mod client;
mod error;
mod export;
mod import;
mod orchestrator;
mod traits;

pub use client::{connect, MongoDatabase, DEFAULT_CONNECT_TIMEOUT};
pub use error::TransferError;
pub use export::{export_collection, render_snapshot};
pub use import::{import_file, parse_snapshot};
pub use orchestrator::{default_target_database, Orchestrator, TransferConfig, DEFAULT_BATCH_SIZE};
pub use traits::{DocumentStream, SourceDatabase, TargetDatabase};
pub use transfer_core::{TransferReport, UnitFailure, UnitReport};
