//! 事件类型定义
//!
//! Two notification channels exist side by side:
//! - [`UiEvent`]: same-process events published on the message bus;
//! - [`StorageEvent`]: fired by a local-storage area to every handle except
//!   the one that performed the write.
//!
//! Readers that need a consistent view subscribe to both.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

use crate::util::now_millis;

/// UI refresh event kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UiEventKind {
    /// Alert list changed
    #[serde(rename = "admin_alerts_updated")]
    AdminAlertsUpdated,
    /// A content-bearing key was rewritten
    #[serde(rename = "content-changed")]
    ContentChanged,
    /// Remote rows changed
    #[serde(rename = "data-changed")]
    DataChanged,
    /// A restore finished
    #[serde(rename = "backup-restored")]
    BackupRestored,
}

impl UiEventKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            UiEventKind::AdminAlertsUpdated => "admin_alerts_updated",
            UiEventKind::ContentChanged => "content-changed",
            UiEventKind::DataChanged => "data-changed",
            UiEventKind::BackupRestored => "backup-restored",
        }
    }
}

impl fmt::Display for UiEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 进程内 UI 事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiEvent {
    pub id: Uuid,
    pub kind: UiEventKind,
    /// Free-form payload; consumers do not rely on its shape
    #[serde(default)]
    pub detail: Value,
    pub emitted_at: i64,
}

impl UiEvent {
    pub fn new(kind: UiEventKind, detail: Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            detail,
            emitted_at: now_millis(),
        }
    }

    pub fn alerts_updated() -> Self {
        Self::new(UiEventKind::AdminAlertsUpdated, Value::Null)
    }

    pub fn content_changed(key: &str) -> Self {
        Self::new(
            UiEventKind::ContentChanged,
            serde_json::json!({ "key": key }),
        )
    }

    pub fn data_changed(table: &str) -> Self {
        Self::new(
            UiEventKind::DataChanged,
            serde_json::json!({ "table": table }),
        )
    }
}

/// 存储变更事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageEvent {
    /// `None` when the whole area was cleared
    pub key: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    /// Id of the handle that performed the write
    pub origin: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(
            serde_json::to_string(&UiEventKind::AdminAlertsUpdated).unwrap(),
            "\"admin_alerts_updated\""
        );
        assert_eq!(UiEventKind::ContentChanged.to_string(), "content-changed");
    }

    #[test]
    fn test_content_changed_detail() {
        let event = UiEvent::content_changed("homepage_content");
        assert_eq!(event.kind, UiEventKind::ContentChanged);
        assert_eq!(event.detail["key"], "homepage_content");
    }
}
