//! PostgREST / Supabase HTTP client
//!
//! | 操作 | 请求 |
//! |------|------|
//! | select_all | `GET /rest/v1/<table>?select=*` |
//! | insert | `POST /rest/v1/<table>` (`Prefer: return=representation`) |
//! | update | `PATCH /rest/v1/<table>?<key>=eq.<id>` |
//! | delete / delete_in | `DELETE /rest/v1/<table>?<key>=eq.<id>` / `in.(…)` |
//! | upsert | `POST /rest/v1/<table>?on_conflict=<key>` (`Prefer: resolution=merge-duplicates`) |
//! | current_user | `GET /auth/v1/user` |
//! | upload_object | `POST /storage/v1/object/<bucket>/<path>` |

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use shared::models::Row;

use super::{RemoteError, RemoteResult, RemoteTableClient, RemoteUser};

#[derive(Debug, Clone)]
pub struct RestClientConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`
    pub base_url: String,
    /// Public API key, sent as `apikey`
    pub anon_key: String,
    /// User session token; without it the anon key is the bearer
    pub access_token: Option<String>,
    pub timeout: Duration,
}

/// HTTP 远程客户端
#[derive(Debug, Clone)]
pub struct RestClient {
    client: Client,
    config: RestClientConfig,
}

impl RestClient {
    pub fn new(config: RestClientConfig) -> RemoteResult<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn table_url(&self, table: &str) -> String {
        self.url(&format!("rest/v1/{}", table))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let bearer = self
            .config
            .access_token
            .as_deref()
            .unwrap_or(&self.config.anon_key);
        request
            .header("apikey", &self.config.anon_key)
            .header(reqwest::header::AUTHORIZATION, format!("Bearer {}", bearer))
    }

    async fn check(table: &str, response: Response) -> RemoteResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await?;
        Err(RemoteError::Rejected {
            table: table.to_string(),
            status: status.as_u16(),
            message: error_message(&body),
        })
    }

    async fn rows(table: &str, response: Response) -> RemoteResult<Vec<Row>> {
        let response = Self::check(table, response).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn first_row(table: &str, response: Response) -> RemoteResult<Row> {
        Self::rows(table, response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RemoteError::NoRows {
                table: table.to_string(),
            })
    }
}

/// PostgREST errors carry `{"message": ...}`; anything else is passed through
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

/// `in.("a","b")` filter value; quoting keeps commas inside ids intact
fn in_filter(ids: &[String]) -> String {
    let quoted: Vec<String> = ids
        .iter()
        .map(|id| format!("\"{}\"", id.replace('\\', "\\\\").replace('"', "\\\"")))
        .collect();
    format!("in.({})", quoted.join(","))
}

#[async_trait]
impl RemoteTableClient for RestClient {
    async fn select_all(&self, table: &str) -> RemoteResult<Vec<Row>> {
        let request = self
            .client
            .get(self.table_url(table))
            .query(&[("select", "*")]);
        let response = self.authorize(request).send().await?;
        Self::rows(table, response).await
    }

    async fn insert(&self, table: &str, row: &Row) -> RemoteResult<Row> {
        let request = self
            .client
            .post(self.table_url(table))
            .header("Prefer", "return=representation")
            .json(row);
        let response = self.authorize(request).send().await?;
        Self::first_row(table, response).await
    }

    async fn update(&self, table: &str, key: &str, id: &str, patch: &Row) -> RemoteResult<Row> {
        let request = self
            .client
            .patch(self.table_url(table))
            .query(&[(key, format!("eq.{}", id))])
            .header("Prefer", "return=representation")
            .json(patch);
        let response = self.authorize(request).send().await?;
        Self::first_row(table, response).await
    }

    async fn delete(&self, table: &str, key: &str, id: &str) -> RemoteResult<()> {
        let request = self
            .client
            .delete(self.table_url(table))
            .query(&[(key, format!("eq.{}", id))]);
        let response = self.authorize(request).send().await?;
        Self::check(table, response).await?;
        Ok(())
    }

    async fn delete_in(&self, table: &str, key: &str, ids: &[String]) -> RemoteResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let request = self
            .client
            .delete(self.table_url(table))
            .query(&[(key, in_filter(ids))]);
        let response = self.authorize(request).send().await?;
        Self::check(table, response).await?;
        Ok(())
    }

    async fn upsert(&self, table: &str, rows: &[Row], on_conflict: &str) -> RemoteResult<()> {
        let request = self
            .client
            .post(self.table_url(table))
            .query(&[("on_conflict", on_conflict)])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(rows);
        let response = self.authorize(request).send().await?;
        Self::check(table, response).await?;
        Ok(())
    }

    async fn current_user(&self) -> RemoteResult<Option<RemoteUser>> {
        if self.config.access_token.is_none() {
            return Ok(None);
        }
        let request = self.client.get(self.url("auth/v1/user"));
        let response = self.authorize(request).send().await?;
        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            _ => {
                let response = Self::check("auth", response).await?;
                let bytes = response.bytes().await?;
                Ok(Some(serde_json::from_slice(&bytes)?))
            }
        }
    }

    async fn upload_object(
        &self,
        bucket: &str,
        path: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> RemoteResult<String> {
        let request = self
            .client
            .post(self.url(&format!("storage/v1/object/{}/{}", bucket, path)))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .header("x-upsert", "true")
            .body(body);
        let response = self.authorize(request).send().await?;
        Self::check(bucket, response).await?;
        Ok(format!("{}/{}", bucket, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_filter_quotes_ids() {
        let ids = vec!["c1".to_string(), "a,b".to_string(), "q\"x".to_string()];
        assert_eq!(in_filter(&ids), r#"in.("c1","a,b","q\"x")"#);
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(r#"{"code":"23505","message":"duplicate key value"}"#),
            "duplicate key value"
        );
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn test_urls() {
        let client = RestClient::new(RestClientConfig {
            base_url: "https://demo.supabase.co/".into(),
            anon_key: "anon".into(),
            access_token: None,
            timeout: Duration::from_secs(5),
        })
        .unwrap();
        assert_eq!(
            client.table_url("customers"),
            "https://demo.supabase.co/rest/v1/customers"
        );
    }

    #[tokio::test]
    async fn test_no_session_means_no_user() {
        let client = RestClient::new(RestClientConfig {
            base_url: "http://127.0.0.1:9".into(),
            anon_key: "anon".into(),
            access_token: None,
            timeout: Duration::from_millis(200),
        })
        .unwrap();
        assert_eq!(client.current_user().await.unwrap(), None);
    }
}
