//! Audit Log Model

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::util::now_rfc3339;

/// Remote table receiving audit rows
pub const AUDIT_TABLE: &str = "audit_logs";

/// Local-storage key holding audit rows the remote refused
pub const AUDIT_FALLBACK_KEY: &str = "audit_log_fallback";

/// Number of fallback rows kept locally
pub const AUDIT_FALLBACK_CAPACITY: usize = 200;

/// Audit row (审计日志)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub action: String,
    pub actor: String,
    #[serde(default)]
    pub details: Value,
    pub created_at: String,
}

impl AuditRecord {
    pub fn new(action: impl Into<String>, actor: impl Into<String>, details: Value) -> Self {
        Self {
            action: action.into(),
            actor: actor.into(),
            details,
            created_at: now_rfc3339(),
        }
    }
}
