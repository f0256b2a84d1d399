//! Remote table names and untyped rows
//!
//! The backup core treats business records opaquely: a row is a JSON object
//! and the only field it cares about is the table's conflict key.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::{AppError, ErrorCode};

/// An untyped row of a remote table
pub type Row = Map<String, Value>;

/// Every remote table the back-office exports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableName {
    #[serde(rename = "app_users")]
    Users,
    Customers,
    VehicleTypes,
    Packages,
    AddOns,
    Inventory,
    Bookings,
    Invoices,
    Expenses,
    InventoryUsage,
    InventoryRecords,
    Coupons,
    Services,
    Todos,
    ContactMessages,
}

impl TableName {
    /// All tables, parents first
    pub const ALL: [TableName; 15] = [
        TableName::Users,
        TableName::Customers,
        TableName::VehicleTypes,
        TableName::Packages,
        TableName::AddOns,
        TableName::Inventory,
        TableName::Bookings,
        TableName::Invoices,
        TableName::Expenses,
        TableName::InventoryUsage,
        TableName::InventoryRecords,
        TableName::Coupons,
        TableName::Services,
        TableName::Todos,
        TableName::ContactMessages,
    ];

    /// Remote table name
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Users => "app_users",
            Self::Customers => "customers",
            Self::VehicleTypes => "vehicle_types",
            Self::Packages => "packages",
            Self::AddOns => "add_ons",
            Self::Inventory => "inventory",
            Self::Bookings => "bookings",
            Self::Invoices => "invoices",
            Self::Expenses => "expenses",
            Self::InventoryUsage => "inventory_usage",
            Self::InventoryRecords => "inventory_records",
            Self::Coupons => "coupons",
            Self::Services => "services",
            Self::Todos => "todos",
            Self::ContactMessages => "contact_messages",
        }
    }

    /// Column used as the upsert conflict target (and rollback delete key)
    pub const fn conflict_key(&self) -> &'static str {
        match self {
            Self::Coupons => "code",
            _ => "id",
        }
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TableName {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TableName::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                AppError::with_message(ErrorCode::UnknownTable, format!("Unknown table: {s}"))
                    .with_detail("table", s)
            })
    }
}

/// Extract a row's conflict key as a string.
///
/// Strings are returned verbatim and numbers are stringified; anything else
/// (missing, null, objects) yields `None`.
pub fn row_key(row: &Row, key: &str) -> Option<String> {
    match row.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_names_roundtrip() {
        for table in TableName::ALL {
            assert_eq!(table.as_str().parse::<TableName>().unwrap(), table);
            let json = serde_json::to_string(&table).unwrap();
            assert_eq!(json, format!("\"{}\"", table.as_str()));
        }
    }

    #[test]
    fn test_unknown_table() {
        let err = "payroll".parse::<TableName>().unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownTable);
    }

    #[test]
    fn test_coupons_use_code() {
        assert_eq!(TableName::Coupons.conflict_key(), "code");
        assert_eq!(TableName::Bookings.conflict_key(), "id");
    }

    #[test]
    fn test_row_key() {
        let row = json!({"id": "c1", "code": 42, "meta": {"a": 1}});
        let row = row.as_object().unwrap();
        assert_eq!(row_key(row, "id").as_deref(), Some("c1"));
        assert_eq!(row_key(row, "code").as_deref(), Some("42"));
        assert_eq!(row_key(row, "meta"), None);
        assert_eq!(row_key(row, "missing"), None);
    }
}
