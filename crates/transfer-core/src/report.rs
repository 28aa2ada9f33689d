//! Transfer reports.
//!
//! A unit is one collection (export) or one snapshot file (import). The
//! orchestrator is the only writer; exporters and importers return counts
//! or errors and never touch the report themselves.

use std::fmt;

/// Counts for one successfully transferred unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitReport {
    /// Collection name
    pub name: String,
    /// Documents read from the source (cursor or file)
    pub documents_seen: u64,
    /// Documents written to the file or inserted into the target
    pub documents_written: u64,
}

/// A unit that failed, with its rendered error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitFailure {
    pub name: String,
    /// Error category, e.g. `CollectionReadError` or `MalformedMarker`
    pub kind: String,
    pub error: String,
}

/// Outcome of one export or import run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferReport {
    pub units: Vec<UnitReport>,
    pub failures: Vec<UnitFailure>,
}

impl TransferReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self, name: impl Into<String>, seen: u64, written: u64) {
        self.units.push(UnitReport {
            name: name.into(),
            documents_seen: seen,
            documents_written: written,
        });
    }

    pub fn record_failure(
        &mut self,
        name: impl Into<String>,
        kind: impl Into<String>,
        error: impl fmt::Display,
    ) {
        self.failures.push(UnitFailure {
            name: name.into(),
            kind: kind.into(),
            error: format!("{error:#}"),
        });
    }

    /// Total documents written or inserted across successful units.
    pub fn total_written(&self) -> u64 {
        self.units.iter().map(|u| u.documents_written).sum()
    }

    /// A run succeeds only when no unit failed.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn unit(&self, name: &str) -> Option<&UnitReport> {
        self.units.iter().find(|u| u.name == name)
    }

    pub fn failure(&self, name: &str) -> Option<&UnitFailure> {
        self.failures.iter().find(|f| f.name == name)
    }
}

impl fmt::Display for TransferReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} succeeded, {} failed, {} documents total",
            self.units.len(),
            self.failures.len(),
            self.total_written()
        )
    }
}
