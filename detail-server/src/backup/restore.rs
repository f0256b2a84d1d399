use serde_json::Value;
use shared::message::UiEvent;
use shared::models::{ALERTS_STORAGE_KEY, SNAPSHOT_SCHEMA_VERSION, Snapshot, TableName, row_key};
use shared::{AppError, AppResult};

use super::{
    AppliedTable, BackupService, LocalKeyFailure, LocalPhaseReport, LocalStoreKind, RemotePhase,
    RestoreReport, RollbackReport, TableFailure,
};

impl BackupService {
    /// Restore a snapshot from its JSON text.
    ///
    /// Only a payload that does not parse is an error; every other failure
    /// is reported in the returned [`RestoreReport`].
    pub async fn restore_from_json(&self, json: &str) -> AppResult<RestoreReport> {
        let snapshot: Snapshot = serde_json::from_str(json)
            .map_err(|e| AppError::snapshot_invalid(format!("Invalid backup file: {}", e)))?;
        Ok(self.restore_snapshot(&snapshot).await)
    }

    pub async fn restore_snapshot(&self, snapshot: &Snapshot) -> RestoreReport {
        if snapshot.schema_version > SNAPSHOT_SCHEMA_VERSION {
            tracing::warn!(
                found = snapshot.schema_version,
                supported = SNAPSHOT_SCHEMA_VERSION,
                "Snapshot written by a newer schema, restoring known sections"
            );
        }
        for table in snapshot.unknown_tables() {
            tracing::warn!(table = %table, "Snapshot table not recognised, ignoring");
        }

        let (remote, actor) = match self.ports.remote.current_user().await {
            Ok(Some(user)) => {
                let actor = user.actor().to_string();
                (self.restore_tables(snapshot).await, actor)
            }
            Ok(None) => {
                tracing::warn!("No remote session, skipping table restore");
                (
                    RemotePhase::Skipped {
                        reason: "not authenticated".into(),
                    },
                    "anonymous".to_string(),
                )
            }
            Err(e) => {
                tracing::warn!(error = %e, "Auth check failed, skipping table restore");
                (
                    RemotePhase::Skipped {
                        reason: format!("auth check failed: {}", e),
                    },
                    "anonymous".to_string(),
                )
            }
        };

        let local = self.restore_local(snapshot).await;
        self.announce(&remote, &local);

        let cache_bust = self.ports.cache_buster.bust().await;

        let tables: Vec<&str> = match &remote {
            RemotePhase::Completed { applied } => {
                applied.iter().map(|a| a.table.as_str()).collect()
            }
            _ => Vec::new(),
        };
        let audit = self
            .ports
            .audit
            .log(
                "backup_restore",
                actor,
                serde_json::json!({
                    "remote": remote.status(),
                    "tables": tables,
                    "localforage_keys": local.localforage_keys,
                    "local_storage_keys": local.local_storage_keys,
                }),
            )
            .await;

        tracing::info!(
            remote = remote.status(),
            local_keys = local.localforage_keys.len() + local.local_storage_keys.len(),
            local_failures = local.failed.len(),
            "Restore finished"
        );

        RestoreReport {
            schema_version: snapshot.schema_version,
            remote,
            local,
            cache_bust,
            audit,
        }
    }

    /// Upsert every table with rows, parents first; roll back on first failure
    async fn restore_tables(&self, snapshot: &Snapshot) -> RemotePhase {
        let pending: Vec<(TableName, &'static str, &[shared::models::Row])> = self
            .registry
            .restore_order()
            .iter()
            .filter_map(|&table| {
                let rows = snapshot.rows(table).filter(|rows| !rows.is_empty())?;
                let key = self.registry.spec(table).map(|s| s.conflict_key)?;
                Some((table, key, rows))
            })
            .collect();

        let mut applied: Vec<AppliedTable> = Vec::new();
        for (position, &(table, key, rows)) in pending.iter().enumerate() {
            match self.ports.remote.upsert(table.as_str(), rows, key).await {
                Ok(()) => {
                    let keys: Vec<String> = rows.iter().filter_map(|r| row_key(r, key)).collect();
                    tracing::info!(table = %table, rows = rows.len(), "Table restored");
                    applied.push(AppliedTable { table, keys });
                }
                Err(e) => {
                    tracing::error!(table = %table, error = %e, "Table restore failed, rolling back");
                    let rollback = self.rollback(&applied).await;
                    let not_attempted = pending[position + 1..].iter().map(|p| p.0).collect();
                    return RemotePhase::Failed {
                        failed_table: table,
                        error: e.to_string(),
                        applied,
                        rollback,
                        not_attempted,
                    };
                }
            }
        }

        RemotePhase::Completed { applied }
    }

    /// Delete applied rows in reverse order, stopping at the first failed delete
    async fn rollback(&self, applied: &[AppliedTable]) -> RollbackReport {
        let mut report = RollbackReport::default();
        let mut remaining = applied.iter().rev();

        while let Some(entry) = remaining.next() {
            if entry.keys.is_empty() {
                continue;
            }
            let key = self
                .registry
                .spec(entry.table)
                .map_or_else(|| entry.table.conflict_key(), |s| s.conflict_key);
            match self
                .ports
                .remote
                .delete_in(entry.table.as_str(), key, &entry.keys)
                .await
            {
                Ok(()) => {
                    tracing::info!(table = %entry.table, rows = entry.keys.len(), "Rolled back");
                    report.deleted.push(entry.table);
                }
                Err(e) => {
                    tracing::error!(table = %entry.table, error = %e, "Rollback stopped");
                    report.failed = Some(TableFailure {
                        table: entry.table,
                        error: e.to_string(),
                    });
                    report.skipped = remaining.by_ref().map(|a| a.table).collect();
                    break;
                }
            }
        }

        report
    }

    /// Replay both local dumps; runs regardless of the remote outcome
    async fn restore_local(&self, snapshot: &Snapshot) -> LocalPhaseReport {
        let mut report = LocalPhaseReport::default();

        for (key, value) in &snapshot.local.localforage {
            match self.ports.kv.set_item(key, value).await {
                Ok(()) => report.localforage_keys.push(key.clone()),
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "localforage restore failed");
                    report.failed.push(LocalKeyFailure {
                        store: LocalStoreKind::Localforage,
                        key: key.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        for (key, value) in &snapshot.local.local_storage {
            let raw = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            match self.ports.storage.set_item(key, &raw) {
                Ok(()) => report.local_storage_keys.push(key.clone()),
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "localStorage restore failed");
                    report.failed.push(LocalKeyFailure {
                        store: LocalStoreKind::LocalStorage,
                        key: key.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        report
    }

    /// Same-process refresh events for what changed
    fn announce(&self, remote: &RemotePhase, local: &LocalPhaseReport) {
        let bus = &self.ports.bus;
        let restored = local
            .localforage_keys
            .iter()
            .chain(&local.local_storage_keys);
        for key in restored {
            if self.settings.content_keys.iter().any(|k| k == key) {
                bus.publish(UiEvent::content_changed(key));
            }
        }
        if local.local_storage_keys.iter().any(|k| k == ALERTS_STORAGE_KEY) {
            bus.publish(UiEvent::alerts_updated());
        }
        if let RemotePhase::Completed { applied } = remote {
            for entry in applied {
                bus.publish(UiEvent::data_changed(entry.table.as_str()));
            }
        }
    }
}
