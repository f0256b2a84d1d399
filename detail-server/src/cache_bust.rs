//! 缓存刷新
//!
//! After a restore, public pages that cache backend content are pinged with a
//! fresh `v=<millis>` query so the next visitor sees restored data.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Result of a best-effort side effect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum SideEffectOutcome {
    Done,
    Skipped,
    Failed(String),
}

#[async_trait]
pub trait CacheBuster: Send + Sync {
    async fn bust(&self) -> SideEffectOutcome;
}

/// Does nothing; used when no URLs are configured
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCacheBuster;

#[async_trait]
impl CacheBuster for NoopCacheBuster {
    async fn bust(&self) -> SideEffectOutcome {
        SideEffectOutcome::Skipped
    }
}

/// GETs every configured URL; every URL is tried even after a failure
#[derive(Debug, Clone)]
pub struct HttpCacheBuster {
    client: Client,
    urls: Vec<String>,
}

impl HttpCacheBuster {
    pub fn new(urls: Vec<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, urls })
    }
}

#[async_trait]
impl CacheBuster for HttpCacheBuster {
    async fn bust(&self) -> SideEffectOutcome {
        if self.urls.is_empty() {
            return SideEffectOutcome::Skipped;
        }

        let version = shared::util::now_millis().to_string();
        let mut failures = Vec::new();
        for url in &self.urls {
            let result = self
                .client
                .get(url)
                .query(&[("v", version.as_str())])
                .send()
                .await
                .and_then(|r| r.error_for_status());
            if let Err(e) = result {
                tracing::warn!(url = %url, error = %e, "Cache-bust ping failed");
                failures.push(format!("{}: {}", url, e));
            }
        }

        if failures.is_empty() {
            SideEffectOutcome::Done
        } else {
            SideEffectOutcome::Failed(failures.join("; "))
        }
    }
}
