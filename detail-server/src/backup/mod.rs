//! 备份与恢复
//!
//! # 导出
//!
//! ```text
//! for table in registry.specs()        → select_all  (失败 → [] 并继续)
//! for key in kv.keys()                 → localforage 全量
//! for key in settings.local_storage_keys → localStorage (JSON; JSON 字符串与非 JSON 保留原文)
//! → Snapshot { schemaVersion, exportedAt, supabase, local }
//! ```
//!
//! # 恢复
//!
//! ```text
//! parse → auth check → upsert in restore order ─┬─ ok → Completed
//!                                              └─ 失败 → reverse delete_in (遇错即停) → Failed
//! local phase (无条件) → UI events → cache bust → audit
//! ```
//!
//! localStorage values restore as: string → written raw, anything else →
//! JSON-encoded. Export keeps the raw text of encoded JSON strings so
//! `"\"dark\""` comes back byte-identical.
//!
//! Remote and local phases are deliberately not atomic together: the local
//! phase runs and is never rolled back, whatever the remote outcome.

mod export;
mod restore;
mod types;

pub use export::backup_file_name;
pub use types::{
    AppliedTable, ExportOutcome, LocalKeyFailure, LocalPhaseReport, LocalStoreKind, RemotePhase,
    RestoreReport, RollbackReport, TableFailure,
};

use std::sync::Arc;

use crate::alerts::AlertCenter;
use crate::audit::AuditLogger;
use crate::cache_bust::CacheBuster;
use crate::message::MessageBus;
use crate::remote::RemoteTableClient;
use crate::store::{KeyValueStore, LocalStorage};
use crate::tables::TableRegistry;

/// Local-storage keys exported when no allow-list is configured
pub const DEFAULT_LOCAL_STORAGE_KEYS: &[&str] = &[
    "admin_alerts",
    "homepage_content",
    "about_content",
    "services_content",
    "gallery_content",
    "faq_content",
    "site_settings",
    "business_hours",
    "booking_settings",
    "theme",
];

/// Keys whose restore must refresh public content
pub const DEFAULT_CONTENT_KEYS: &[&str] = &[
    "homepage_content",
    "about_content",
    "services_content",
    "gallery_content",
    "faq_content",
    "site_settings",
    "business_hours",
];

#[derive(Debug, Clone)]
pub struct BackupSettings {
    /// Allow-listed local-storage keys
    pub local_storage_keys: Vec<String>,
    /// Keys that trigger a `content-changed` event when restored
    pub content_keys: Vec<String>,
    /// Object-storage bucket for uploaded snapshots
    pub bucket: Option<String>,
}

impl Default for BackupSettings {
    fn default() -> Self {
        Self {
            local_storage_keys: DEFAULT_LOCAL_STORAGE_KEYS.iter().map(|k| k.to_string()).collect(),
            content_keys: DEFAULT_CONTENT_KEYS.iter().map(|k| k.to_string()).collect(),
            bucket: None,
        }
    }
}

/// Collaborators of the backup service
#[derive(Clone)]
pub struct BackupPorts {
    pub remote: Arc<dyn RemoteTableClient>,
    pub kv: Arc<dyn KeyValueStore>,
    pub storage: LocalStorage,
    pub bus: MessageBus,
    pub audit: AuditLogger,
    pub alerts: AlertCenter,
    pub cache_buster: Arc<dyn CacheBuster>,
}

/// 备份服务 - export aggregator and restore sequencer
#[derive(Clone)]
pub struct BackupService {
    ports: BackupPorts,
    registry: Arc<TableRegistry>,
    settings: BackupSettings,
}

impl BackupService {
    pub fn new(ports: BackupPorts, registry: Arc<TableRegistry>, settings: BackupSettings) -> Self {
        Self {
            ports,
            registry,
            settings,
        }
    }

    pub fn settings(&self) -> &BackupSettings {
        &self.settings
    }

    pub fn registry(&self) -> &TableRegistry {
        &self.registry
    }
}
