//! 审计日志
//!
//! ```text
//! AuditLogger::log()
//!   ├─ insert → remote `audit_logs`            → AuditOutcome::Remote
//!   └─ (失败) append → local `audit_log_fallback` → AuditOutcome::LocalFallback
//!                    (再失败)                   → AuditOutcome::Dropped
//! ```
//!
//! Logging never fails the caller; the outcome says where the row went.

mod logger;

pub use logger::{AuditLogger, AuditOutcome};
