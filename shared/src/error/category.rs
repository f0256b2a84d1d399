//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 1xxx: Authentication errors
/// - 2xxx: Permission errors
/// - 4xxx: Backup / restore errors
/// - 5xxx: Remote backend errors
/// - 6xxx: Local storage errors
/// - 7xxx: Alert errors
/// - 8xxx: Business entity errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Authentication errors (1xxx)
    Auth,
    /// Permission errors (2xxx)
    Permission,
    /// Backup / restore errors (4xxx)
    Backup,
    /// Remote backend errors (5xxx)
    Remote,
    /// Local storage errors (6xxx)
    Storage,
    /// Alert errors (7xxx)
    Alert,
    /// Business entity errors (8xxx)
    Entity,
    /// System errors (9xxx and anything unassigned)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Auth,
            2000..3000 => Self::Permission,
            4000..5000 => Self::Backup,
            5000..6000 => Self::Remote,
            6000..7000 => Self::Storage,
            7000..8000 => Self::Alert,
            8000..9000 => Self::Entity,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Auth => "auth",
            Self::Permission => "permission",
            Self::Backup => "backup",
            Self::Remote => "remote",
            Self::Storage => "storage",
            Self::Alert => "alert",
            Self::Entity => "entity",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}
