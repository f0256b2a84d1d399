//! Backup snapshot file format
//!
//! ```json
//! {
//!   "schemaVersion": 2,
//!   "exportedAt": "2026-10-16T09:30:00.000Z",
//!   "supabase": { "customers": [ { "id": "c1", ... } ] },
//!   "local": {
//!     "localforage": { "<key>": <any> },
//!     "localStorage": { "<key>": <any> }
//!   }
//! }
//! ```
//!
//! A snapshot is built whole by the exporter and consumed whole by the
//! restorer; nothing mutates it in between.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::table::{Row, TableName};

/// Schema version written by this build
pub const SNAPSHOT_SCHEMA_VERSION: u32 = 2;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub schema_version: u32,
    #[serde(default)]
    pub exported_at: String,
    /// Remote table name → rows. Keyed by string so that snapshots carrying
    /// tables this build does not know still parse.
    #[serde(default)]
    pub supabase: BTreeMap<String, Vec<Row>>,
    #[serde(default)]
    pub local: LocalSection,
}

/// Dumps of the two browser-side stores
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalSection {
    /// Full dump of the async key-value store
    #[serde(default)]
    pub localforage: BTreeMap<String, Value>,
    /// Allow-listed local-storage keys
    #[serde(default, rename = "localStorage")]
    pub local_storage: BTreeMap<String, Value>,
}

impl Snapshot {
    /// Rows for `table`, if the snapshot carries that table at all
    pub fn rows(&self, table: TableName) -> Option<&[Row]> {
        self.supabase.get(table.as_str()).map(Vec::as_slice)
    }

    /// Table names present in the snapshot that this build does not know
    pub fn unknown_tables(&self) -> Vec<&str> {
        self.supabase
            .keys()
            .filter(|k| k.parse::<TableName>().is_err())
            .map(String::as_str)
            .collect()
    }
}
