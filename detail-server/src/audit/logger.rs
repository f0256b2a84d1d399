use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::models::{AUDIT_FALLBACK_CAPACITY, AUDIT_FALLBACK_KEY, AUDIT_TABLE, AuditRecord};

use crate::remote::RemoteTableClient;
use crate::store::{LocalStorage, StoreResult};

/// Where an audit row ended up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AuditOutcome {
    Remote,
    LocalFallback { reason: String },
    Dropped { reason: String },
}

/// 审计日志记录器
#[derive(Clone)]
pub struct AuditLogger {
    remote: Arc<dyn RemoteTableClient>,
    storage: LocalStorage,
}

impl AuditLogger {
    pub fn new(remote: Arc<dyn RemoteTableClient>, storage: LocalStorage) -> Self {
        Self { remote, storage }
    }

    /// Best-effort append of one audit row
    pub async fn log(
        &self,
        action: impl Into<String>,
        actor: impl Into<String>,
        details: Value,
    ) -> AuditOutcome {
        let record = AuditRecord::new(action, actor, details);
        let row = match serde_json::to_value(&record) {
            Ok(Value::Object(row)) => row,
            Ok(_) | Err(_) => {
                return AuditOutcome::Dropped {
                    reason: "audit record is not a JSON object".into(),
                };
            }
        };

        let reason = match self.remote.insert(AUDIT_TABLE, &row).await {
            Ok(_) => {
                tracing::debug!(action = %record.action, "Audit row written");
                return AuditOutcome::Remote;
            }
            Err(e) => e.to_string(),
        };

        tracing::warn!(action = %record.action, error = %reason, "Audit insert failed, keeping a local copy");
        match self.append_fallback(record) {
            Ok(()) => AuditOutcome::LocalFallback { reason },
            Err(e) => {
                tracing::error!(error = %e, "Audit row dropped");
                AuditOutcome::Dropped {
                    reason: format!("{}; local fallback: {}", reason, e),
                }
            }
        }
    }

    /// Rows that only made it to the local fallback, oldest first
    pub fn fallback_records(&self) -> Vec<AuditRecord> {
        match self.storage.get_json::<Vec<AuditRecord>>(AUDIT_FALLBACK_KEY) {
            Ok(records) => records.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "Audit fallback log unreadable, starting over");
                Vec::new()
            }
        }
    }

    fn append_fallback(&self, record: AuditRecord) -> StoreResult<()> {
        let mut records = self.fallback_records();
        records.push(record);
        if records.len() > AUDIT_FALLBACK_CAPACITY {
            let excess = records.len() - AUDIT_FALLBACK_CAPACITY;
            records.drain(..excess);
        }
        self.storage.set_json(AUDIT_FALLBACK_KEY, &records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::{MemoryRemote, RemoteOp};
    use crate::store::{MemoryBackend, StorageArea};
    use serde_json::json;

    fn logger(remote: Arc<MemoryRemote>) -> AuditLogger {
        AuditLogger::new(remote, StorageArea::in_memory().handle())
    }

    #[tokio::test]
    async fn test_remote_insert() {
        let remote = Arc::new(MemoryRemote::new());
        let audit = logger(remote.clone());

        let outcome = audit
            .log("backup_restore", "owner@example.com", json!({"tables": ["customers"]}))
            .await;

        assert_eq!(outcome, AuditOutcome::Remote);
        let rows = remote.rows(AUDIT_TABLE);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["action"], "backup_restore");
        assert!(audit.fallback_records().is_empty());
    }

    #[tokio::test]
    async fn test_falls_back_locally() {
        let remote = Arc::new(MemoryRemote::new());
        remote.fail_on(AUDIT_TABLE, RemoteOp::Insert);
        let audit = logger(remote);

        let outcome = audit.log("invoice_delete", "system", Value::Null).await;

        assert!(matches!(outcome, AuditOutcome::LocalFallback { .. }));
        let records = audit.fallback_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].action, "invoice_delete");
    }

    #[tokio::test]
    async fn test_fallback_is_bounded() {
        let remote = Arc::new(MemoryRemote::new());
        remote.set_offline(true);
        let audit = logger(remote);

        for i in 0..AUDIT_FALLBACK_CAPACITY + 5 {
            audit.log(format!("action_{}", i), "system", Value::Null).await;
        }

        let records = audit.fallback_records();
        assert_eq!(records.len(), AUDIT_FALLBACK_CAPACITY);
        assert_eq!(records[0].action, "action_5");
    }

    #[tokio::test]
    async fn test_dropped_when_both_fail() {
        let remote = Arc::new(MemoryRemote::new());
        remote.set_offline(true);
        let storage = StorageArea::new(MemoryBackend::with_quota(8)).handle();
        let audit = AuditLogger::new(remote, storage);

        let outcome = audit.log("backup_restore", "system", Value::Null).await;
        assert!(matches!(outcome, AuditOutcome::Dropped { .. }));
    }
}
