//! Unified error codes for the detailing back-office
//!
//! This module defines all error codes used across detail-server and the
//! admin frontend. Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 4xxx: Backup / restore errors
//! - 5xxx: Remote backend errors
//! - 6xxx: Local storage errors
//! - 7xxx: Alert errors
//! - 8xxx: Business entity errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Session has expired
    SessionExpired = 1005,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,

    // ==================== 4xxx: Backup / Restore ====================
    /// Snapshot payload could not be parsed
    SnapshotInvalid = 4001,
    /// Snapshot was produced by a newer schema
    SnapshotVersionUnsupported = 4002,
    /// Table dependency declaration contains a cycle
    TableDependencyCycle = 4101,
    /// Table dependency references an undeclared table
    TableDependencyUnknown = 4102,
    /// Unknown table name
    UnknownTable = 4103,

    // ==================== 5xxx: Remote ====================
    /// Remote backend rejected the request
    RemoteRejected = 5001,
    /// Remote backend unreachable
    RemoteUnavailable = 5002,
    /// Remote response could not be decoded
    RemoteDecodeFailed = 5003,
    /// Object storage upload failed
    UploadFailed = 5101,

    // ==================== 6xxx: Local storage ====================
    /// Local store read/write failed
    LocalStoreFailed = 6001,
    /// Stored value is corrupted
    LocalStoreCorrupted = 6002,

    // ==================== 7xxx: Alerts ====================
    /// Alert not found
    AlertNotFound = 7001,

    // ==================== 8xxx: Entities ====================
    /// Customer not found
    CustomerNotFound = 8001,
    /// Booking not found
    BookingNotFound = 8101,
    /// Invoice not found
    InvoiceNotFound = 8201,
    /// Inventory item not found
    InventoryItemNotFound = 8301,

    // ==================== 9xxx: System ====================
    /// Internal error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Network error
    NetworkError = 9003,
    /// Timeout
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
    /// Storage full
    StorageFull = 9401,
}

impl ErrorCode {
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::SessionExpired => "Session has expired",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",

            // Backup / Restore
            ErrorCode::SnapshotInvalid => "Backup file is not a valid snapshot",
            ErrorCode::SnapshotVersionUnsupported => "Backup file schema version is not supported",
            ErrorCode::TableDependencyCycle => "Table dependency declaration contains a cycle",
            ErrorCode::TableDependencyUnknown => "Table dependency references an unknown table",
            ErrorCode::UnknownTable => "Unknown table",

            // Remote
            ErrorCode::RemoteRejected => "Remote backend rejected the request",
            ErrorCode::RemoteUnavailable => "Remote backend is unavailable",
            ErrorCode::RemoteDecodeFailed => "Remote response could not be decoded",
            ErrorCode::UploadFailed => "Upload to object storage failed",

            // Local storage
            ErrorCode::LocalStoreFailed => "Local store operation failed",
            ErrorCode::LocalStoreCorrupted => "Local store data is corrupted",

            // Alerts
            ErrorCode::AlertNotFound => "Alert not found",

            // Entities
            ErrorCode::CustomerNotFound => "Customer not found",
            ErrorCode::BookingNotFound => "Booking not found",
            ErrorCode::InvoiceNotFound => "Invoice not found",
            ErrorCode::InventoryItemNotFound => "Inventory item not found",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::StorageFull => "Storage full (disk space insufficient)",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1005 => Ok(ErrorCode::SessionExpired),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),

            // Backup / Restore
            4001 => Ok(ErrorCode::SnapshotInvalid),
            4002 => Ok(ErrorCode::SnapshotVersionUnsupported),
            4101 => Ok(ErrorCode::TableDependencyCycle),
            4102 => Ok(ErrorCode::TableDependencyUnknown),
            4103 => Ok(ErrorCode::UnknownTable),

            // Remote
            5001 => Ok(ErrorCode::RemoteRejected),
            5002 => Ok(ErrorCode::RemoteUnavailable),
            5003 => Ok(ErrorCode::RemoteDecodeFailed),
            5101 => Ok(ErrorCode::UploadFailed),

            // Local storage
            6001 => Ok(ErrorCode::LocalStoreFailed),
            6002 => Ok(ErrorCode::LocalStoreCorrupted),

            // Alerts
            7001 => Ok(ErrorCode::AlertNotFound),

            // Entities
            8001 => Ok(ErrorCode::CustomerNotFound),
            8101 => Ok(ErrorCode::BookingNotFound),
            8201 => Ok(ErrorCode::InvoiceNotFound),
            8301 => Ok(ErrorCode::InventoryItemNotFound),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),
            9401 => Ok(ErrorCode::StorageFull),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_roundtrip_through_u16() {
        for code in [
            ErrorCode::Success,
            ErrorCode::SnapshotInvalid,
            ErrorCode::RemoteRejected,
            ErrorCode::LocalStoreFailed,
            ErrorCode::AlertNotFound,
            ErrorCode::InvoiceNotFound,
            ErrorCode::StorageFull,
        ] {
            let raw: u16 = code.into();
            assert_eq!(ErrorCode::try_from(raw), Ok(code));
        }
    }

    #[test]
    fn test_unknown_code_rejected() {
        assert_eq!(ErrorCode::try_from(4999), Err(InvalidErrorCode(4999)));
    }

    #[test]
    fn test_serializes_as_number() {
        let json = serde_json::to_string(&ErrorCode::SnapshotInvalid).unwrap();
        assert_eq!(json, "4001");
        let back: ErrorCode = serde_json::from_str("7001").unwrap();
        assert_eq!(back, ErrorCode::AlertNotFound);
    }
}
