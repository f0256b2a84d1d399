//! 远程表访问
//!
//! The hosted backend is reached through the [`RemoteTableClient`] port.
//! [`RestClient`] speaks PostgREST/Supabase over HTTP; [`MemoryRemote`] is an
//! in-process stand-in with failure injection for tests.
//!
//! Every method issues exactly one remote call. Errors are returned as-is:
//! no retry, no backoff.

mod memory;
mod rest;

pub use memory::{MemoryRemote, RemoteCall, RemoteOp, row};
pub use rest::{RestClient, RestClientConfig};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::models::Row;
use shared::{AppError, ErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("{table}: backend rejected request ({status}): {message}")]
    Rejected {
        table: String,
        status: u16,
        message: String,
    },

    #[error("{table}: no row matched")]
    NoRows { table: String },

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

pub type RemoteResult<T> = Result<T, RemoteError>;

impl From<RemoteError> for AppError {
    fn from(err: RemoteError) -> Self {
        match &err {
            RemoteError::Rejected { table, .. } => AppError::remote(table.clone(), err.to_string()),
            RemoteError::NoRows { table } => {
                AppError::with_message(ErrorCode::NotFound, err.to_string())
                    .with_detail("table", table.clone())
            }
            RemoteError::NotAuthenticated => AppError::not_authenticated(),
            RemoteError::Decode(_) => {
                AppError::with_message(ErrorCode::RemoteDecodeFailed, err.to_string())
            }
            RemoteError::Transport(e) if e.is_timeout() => {
                AppError::with_message(ErrorCode::TimeoutError, err.to_string())
            }
            RemoteError::Transport(_) | RemoteError::Unavailable(_) => {
                AppError::remote_unavailable(err.to_string())
            }
        }
    }
}

/// Signed-in backend user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl RemoteUser {
    /// Name recorded as the actor of audit rows
    pub fn actor(&self) -> &str {
        self.email.as_deref().unwrap_or(&self.id)
    }
}

/// Generic row access over named remote tables
#[async_trait]
pub trait RemoteTableClient: Send + Sync {
    /// `SELECT *` over the whole table
    async fn select_all(&self, table: &str) -> RemoteResult<Vec<Row>>;

    /// Insert one row, returning the stored representation
    async fn insert(&self, table: &str, row: &Row) -> RemoteResult<Row>;

    /// Patch the row whose `key` column equals `id`
    async fn update(&self, table: &str, key: &str, id: &str, patch: &Row) -> RemoteResult<Row>;

    async fn delete(&self, table: &str, key: &str, id: &str) -> RemoteResult<()>;

    /// Delete every row whose `key` column is in `ids`
    async fn delete_in(&self, table: &str, key: &str, ids: &[String]) -> RemoteResult<()>;

    /// Insert-or-merge all rows in one call, conflicting on `on_conflict`
    async fn upsert(&self, table: &str, rows: &[Row], on_conflict: &str) -> RemoteResult<()>;

    /// The signed-in user, `None` when there is no session
    async fn current_user(&self) -> RemoteResult<Option<RemoteUser>>;

    /// Upload to object storage, returning the stored object path
    async fn upload_object(
        &self,
        bucket: &str,
        path: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> RemoteResult<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err: AppError = RemoteError::Rejected {
            table: "bookings".into(),
            status: 409,
            message: "duplicate key".into(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::RemoteRejected);
        assert_eq!(
            err.details.as_ref().and_then(|d| d.get("table")),
            Some(&serde_json::json!("bookings"))
        );

        let err: AppError = RemoteError::Unavailable("down".into()).into();
        assert_eq!(err.code, ErrorCode::RemoteUnavailable);

        let err: AppError = RemoteError::NotAuthenticated.into();
        assert_eq!(err.code, ErrorCode::NotAuthenticated);
    }

    #[test]
    fn test_actor_prefers_email() {
        let user = RemoteUser {
            id: "u1".into(),
            email: Some("owner@example.com".into()),
        };
        assert_eq!(user.actor(), "owner@example.com");
        let user = RemoteUser {
            id: "u1".into(),
            email: None,
        };
        assert_eq!(user.actor(), "u1");
    }
}
