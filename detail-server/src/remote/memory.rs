//! In-process remote backend
//!
//! Keeps tables as ordered row lists and mirrors PostgREST semantics closely
//! enough for the backup and accessor paths: upsert merges on the conflict
//! column, insert rejects duplicate keys, update/delete filter on one column.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use serde_json::Value;
use shared::models::{Row, row_key};

use super::{RemoteError, RemoteResult, RemoteTableClient, RemoteUser};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteOp {
    Select,
    Insert,
    Update,
    Delete,
    Upsert,
}

/// One recorded call (table + operation)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCall {
    pub table: String,
    pub op: RemoteOp,
}

pub struct MemoryRemote {
    tables: DashMap<String, Vec<Row>>,
    failures: DashSet<(String, RemoteOp)>,
    user: Mutex<Option<RemoteUser>>,
    offline: AtomicBool,
    calls: Mutex<Vec<RemoteCall>>,
    objects: DashMap<String, Vec<u8>>,
}

impl Default for MemoryRemote {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRemote {
    /// Empty backend with a signed-in user
    pub fn new() -> Self {
        Self {
            tables: DashMap::new(),
            failures: DashSet::new(),
            user: Mutex::new(Some(RemoteUser {
                id: "user-1".into(),
                email: Some("owner@example.com".into()),
            })),
            offline: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
            objects: DashMap::new(),
        }
    }

    /// Seed a table, replacing its contents
    pub fn seed(&self, table: &str, rows: Vec<Row>) {
        self.tables.insert(table.to_string(), rows);
    }

    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.tables
            .get(table)
            .map(|rows| rows.value().clone())
            .unwrap_or_default()
    }

    /// Make `op` on `table` fail until [`clear_failures`](Self::clear_failures)
    pub fn fail_on(&self, table: &str, op: RemoteOp) {
        self.failures.insert((table.to_string(), op));
    }

    pub fn clear_failures(&self) {
        self.failures.clear();
    }

    /// Sign in (`Some`) or out (`None`)
    pub fn set_user(&self, user: Option<RemoteUser>) {
        if let Ok(mut guard) = self.user.lock() {
            *guard = user;
        }
    }

    /// Every call fails with `Unavailable` while offline
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Calls made so far, in order
    pub fn calls(&self) -> Vec<RemoteCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Tables touched by `op`, in call order
    pub fn tables_called(&self, op: RemoteOp) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.op == op)
            .map(|c| c.table)
            .collect()
    }

    pub fn object(&self, path: &str) -> Option<Vec<u8>> {
        self.objects.get(path).map(|o| o.value().clone())
    }

    /// Uploaded object paths, `<bucket>/<path>`
    pub fn object_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.objects.iter().map(|o| o.key().clone()).collect();
        paths.sort();
        paths
    }

    fn enter(&self, table: &str, op: RemoteOp) -> RemoteResult<()> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RemoteCall {
                table: table.to_string(),
                op,
            });
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(RemoteError::Unavailable("backend offline".into()));
        }
        if self.failures.contains(&(table.to_string(), op)) {
            return Err(RemoteError::Rejected {
                table: table.to_string(),
                status: 500,
                message: format!("injected {:?} failure", op),
            });
        }
        Ok(())
    }
}

fn matches(row: &Row, key: &str, id: &str) -> bool {
    row_key(row, key).as_deref() == Some(id)
}

#[async_trait]
impl RemoteTableClient for MemoryRemote {
    async fn select_all(&self, table: &str) -> RemoteResult<Vec<Row>> {
        self.enter(table, RemoteOp::Select)?;
        Ok(self.rows(table))
    }

    async fn insert(&self, table: &str, row: &Row) -> RemoteResult<Row> {
        self.enter(table, RemoteOp::Insert)?;
        let mut rows = self.tables.entry(table.to_string()).or_default();
        if let Some(id) = row_key(row, "id")
            && rows.iter().any(|r| matches(r, "id", &id))
        {
            return Err(RemoteError::Rejected {
                table: table.to_string(),
                status: 409,
                message: format!("duplicate key value id={}", id),
            });
        }
        rows.push(row.clone());
        Ok(row.clone())
    }

    async fn update(&self, table: &str, key: &str, id: &str, patch: &Row) -> RemoteResult<Row> {
        self.enter(table, RemoteOp::Update)?;
        let mut rows = self.tables.entry(table.to_string()).or_default();
        let row = rows
            .iter_mut()
            .find(|r| matches(r, key, id))
            .ok_or_else(|| RemoteError::NoRows {
                table: table.to_string(),
            })?;
        for (field, value) in patch {
            row.insert(field.clone(), value.clone());
        }
        Ok(row.clone())
    }

    async fn delete(&self, table: &str, key: &str, id: &str) -> RemoteResult<()> {
        self.enter(table, RemoteOp::Delete)?;
        if let Some(mut rows) = self.tables.get_mut(table) {
            rows.retain(|r| !matches(r, key, id));
        }
        Ok(())
    }

    async fn delete_in(&self, table: &str, key: &str, ids: &[String]) -> RemoteResult<()> {
        self.enter(table, RemoteOp::Delete)?;
        if let Some(mut rows) = self.tables.get_mut(table) {
            rows.retain(|r| match row_key(r, key) {
                Some(k) => !ids.contains(&k),
                None => true,
            });
        }
        Ok(())
    }

    async fn upsert(&self, table: &str, incoming: &[Row], on_conflict: &str) -> RemoteResult<()> {
        self.enter(table, RemoteOp::Upsert)?;
        let mut rows = self.tables.entry(table.to_string()).or_default();
        for row in incoming {
            let existing = row_key(row, on_conflict)
                .and_then(|id| rows.iter().position(|r| matches(r, on_conflict, &id)));
            match existing {
                Some(index) => {
                    for (field, value) in row {
                        rows[index].insert(field.clone(), value.clone());
                    }
                }
                None => rows.push(row.clone()),
            }
        }
        Ok(())
    }

    async fn current_user(&self) -> RemoteResult<Option<RemoteUser>> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(RemoteError::Unavailable("backend offline".into()));
        }
        Ok(self.user.lock().ok().and_then(|u| u.clone()))
    }

    async fn upload_object(
        &self,
        bucket: &str,
        path: &str,
        body: Vec<u8>,
        _content_type: &str,
    ) -> RemoteResult<String> {
        self.enter(bucket, RemoteOp::Insert)?;
        let full = format!("{}/{}", bucket, path);
        self.objects.insert(full.clone(), body);
        Ok(full)
    }
}

/// Build a row from a JSON object literal (test helper)
pub fn row(value: Value) -> Row {
    match value {
        Value::Object(map) => map,
        _ => Row::new(),
    }
}
