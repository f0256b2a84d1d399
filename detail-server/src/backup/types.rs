//! Structured results of export and restore

use serde::{Deserialize, Serialize};
use shared::models::{Snapshot, TableName};

use crate::audit::AuditOutcome;
use crate::cache_bust::SideEffectOutcome;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableFailure {
    pub table: TableName,
    pub error: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocalStoreKind {
    Localforage,
    LocalStorage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalKeyFailure {
    pub store: LocalStoreKind,
    pub key: String,
    pub error: String,
}

/// Export result with the failures the snapshot itself cannot show
#[derive(Debug, Clone)]
pub struct ExportOutcome {
    pub snapshot: Snapshot,
    /// Tables exported as `[]` because the fetch failed
    pub failed_tables: Vec<TableFailure>,
    /// Local keys left out because they could not be read
    pub failed_keys: Vec<LocalKeyFailure>,
}

/// Rows upserted for one table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedTable {
    pub table: TableName,
    /// Conflict-key values of the rows sent (rows without one are omitted)
    pub keys: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RollbackReport {
    /// Tables whose applied rows were deleted, in rollback order
    pub deleted: Vec<TableName>,
    /// The delete that failed and stopped the rollback
    pub failed: Option<TableFailure>,
    /// Applied tables left in place because the rollback stopped
    pub skipped: Vec<TableName>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RemotePhase {
    /// No session (or the auth check failed); nothing was sent
    Skipped { reason: String },
    Completed { applied: Vec<AppliedTable> },
    Failed {
        failed_table: TableName,
        error: String,
        /// Tables applied before the failure
        applied: Vec<AppliedTable>,
        rollback: RollbackReport,
        /// Later tables with rows that were never sent
        not_attempted: Vec<TableName>,
    },
}

impl RemotePhase {
    pub fn status(&self) -> &'static str {
        match self {
            RemotePhase::Skipped { .. } => "skipped",
            RemotePhase::Completed { .. } => "completed",
            RemotePhase::Failed { .. } => "failed",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalPhaseReport {
    pub localforage_keys: Vec<String>,
    pub local_storage_keys: Vec<String>,
    pub failed: Vec<LocalKeyFailure>,
}

/// 恢复报告
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestoreReport {
    pub schema_version: u32,
    pub remote: RemotePhase,
    pub local: LocalPhaseReport,
    pub cache_bust: SideEffectOutcome,
    pub audit: AuditOutcome,
}
