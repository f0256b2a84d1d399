use std::path::{Path, PathBuf};

use serde_json::Value;
use shared::models::{AlertType, SNAPSHOT_SCHEMA_VERSION, Snapshot};
use shared::util::now_rfc3339;
use shared::{AppError, AppResult};

use super::{BackupService, ExportOutcome, LocalKeyFailure, LocalStoreKind, TableFailure};

const SNAPSHOT_CONTENT_TYPE: &str = "application/json";

/// `detailing-backup-<YYYY-MM-DD-HHMMSS>.json`
pub fn backup_file_name() -> String {
    format!(
        "detailing-backup-{}.json",
        chrono::Utc::now().format("%Y-%m-%d-%H%M%S")
    )
}

impl BackupService {
    /// Collect a full snapshot; failed tables are exported as `[]`
    pub async fn export_all(&self) -> Snapshot {
        self.export_with_report().await.snapshot
    }

    /// Pretty-printed snapshot JSON
    pub async fn export_json(&self) -> AppResult<String> {
        let snapshot = self.export_all().await;
        serde_json::to_string_pretty(&snapshot).map_err(|e| AppError::internal(e.to_string()))
    }

    /// Collect a snapshot, reporting which tables and keys were substituted
    pub async fn export_with_report(&self) -> ExportOutcome {
        let mut snapshot = Snapshot::default();
        let mut failed_tables = Vec::new();
        let mut failed_keys = Vec::new();

        for spec in self.registry.specs() {
            let table = spec.name;
            let rows = match self.ports.remote.select_all(table.as_str()).await {
                Ok(rows) => {
                    tracing::debug!(table = %table, rows = rows.len(), "Table exported");
                    rows
                }
                Err(e) => {
                    tracing::warn!(table = %table, error = %e, "Table export failed, writing empty list");
                    failed_tables.push(TableFailure {
                        table,
                        error: e.to_string(),
                    });
                    Vec::new()
                }
            };
            snapshot.supabase.insert(table.as_str().to_string(), rows);
        }

        match self.ports.kv.keys().await {
            Ok(keys) => {
                for key in keys {
                    match self.ports.kv.get_item(&key).await {
                        Ok(Some(value)) => {
                            snapshot.local.localforage.insert(key, value);
                        }
                        Ok(None) => {}
                        Err(e) => {
                            tracing::warn!(key = %key, error = %e, "localforage key unreadable");
                            failed_keys.push(LocalKeyFailure {
                                store: LocalStoreKind::Localforage,
                                key,
                                error: e.to_string(),
                            });
                        }
                    }
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "localforage key listing failed");
                failed_keys.push(LocalKeyFailure {
                    store: LocalStoreKind::Localforage,
                    key: "*".into(),
                    error: e.to_string(),
                });
            }
        }

        for key in &self.settings.local_storage_keys {
            match self.ports.storage.get_item(key) {
                Ok(Some(raw)) => {
                    let value = local_storage_value(raw);
                    snapshot.local.local_storage.insert(key.clone(), value);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "localStorage key unreadable");
                    failed_keys.push(LocalKeyFailure {
                        store: LocalStoreKind::LocalStorage,
                        key: key.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        snapshot.schema_version = SNAPSHOT_SCHEMA_VERSION;
        snapshot.exported_at = now_rfc3339();

        tracing::info!(
            tables = snapshot.supabase.len(),
            failed_tables = failed_tables.len(),
            localforage_keys = snapshot.local.localforage.len(),
            local_storage_keys = snapshot.local.local_storage.len(),
            "Snapshot exported"
        );

        ExportOutcome {
            snapshot,
            failed_tables,
            failed_keys,
        }
    }

    /// Write the snapshot into `dir`, returning the file path
    pub async fn export_to_file(&self, dir: impl AsRef<Path>) -> AppResult<PathBuf> {
        let dir = dir.as_ref();
        let json = self.export_json().await?;
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| AppError::internal(format!("create {}: {}", dir.display(), e)))?;
        let path = dir.join(backup_file_name());
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| AppError::internal(format!("write {}: {}", path.display(), e)))?;
        tracing::info!(path = %path.display(), "Snapshot written to file");
        Ok(path)
    }

    /// Upload the snapshot to the configured bucket, returning the object path
    pub async fn upload_snapshot(&self) -> AppResult<String> {
        let bucket = self
            .settings
            .bucket
            .as_deref()
            .ok_or_else(|| AppError::config("No backup bucket configured"))?;
        let json = self.export_json().await?;
        let file_name = backup_file_name();

        let object = self
            .ports
            .remote
            .upload_object(
                bucket,
                &format!("backups/{}", file_name),
                json.into_bytes(),
                SNAPSHOT_CONTENT_TYPE,
            )
            .await
            .map_err(|e| {
                AppError::with_message(shared::ErrorCode::UploadFailed, e.to_string())
                    .with_detail("bucket", bucket)
            })?;
        tracing::info!(object = %object, "Snapshot uploaded");

        if let Err(e) = self
            .ports
            .alerts
            .push_alert(
                AlertType::BackupCompleted,
                format!("Backup uploaded to {}", object),
                "system",
                Some(serde_json::json!({ "path": object })),
            )
            .await
        {
            tracing::warn!(error = %e, "Backup alert not recorded");
        }
        self.ports
            .audit
            .log("backup_upload", "system", serde_json::json!({ "path": object }))
            .await;

        Ok(object)
    }
}

/// Snapshot form of a localStorage value. Restore writes strings back raw
/// and JSON-encodes everything else, so a value that is itself an encoded
/// JSON string (`"\"dark\""`) keeps its raw text to survive the round trip.
fn local_storage_value(raw: String) -> Value {
    match serde_json::from_str::<Value>(&raw) {
        Ok(Value::String(_)) | Err(_) => Value::String(raw),
        Ok(parsed) => parsed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_storage_value_forms() {
        assert_eq!(local_storage_value("dark".into()), Value::String("dark".into()));
        assert_eq!(
            local_storage_value(r#""dark""#.into()),
            Value::String(r#""dark""#.into())
        );
        assert_eq!(local_storage_value("42".into()), serde_json::json!(42));
        assert_eq!(
            local_storage_value(r#"{"tz":"UTC"}"#.into()),
            serde_json::json!({"tz": "UTC"})
        );
    }

    #[test]
    fn test_backup_file_name_format() {
        let name = backup_file_name();
        let stamp = name
            .strip_prefix("detailing-backup-")
            .and_then(|s| s.strip_suffix(".json"))
            .unwrap();
        // YYYY-MM-DD-HHMMSS
        assert_eq!(stamp.len(), 17);
        assert!(chrono::NaiveDateTime::parse_from_str(stamp, "%Y-%m-%d-%H%M%S").is_ok());
    }
}
