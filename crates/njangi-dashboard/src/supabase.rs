//! Supabase REST (PostgREST) read client
//!
//! Only `select=*` reads are issued. Credentials are the project URL and the
//! anon key, sent both as `apikey` and as a bearer token.
//!
//! API docs: https://supabase.com/docs/guides/api

use std::future::Future;

use crate::config::Config;
use crate::constants;
use crate::table::Row;

/// Why a remote read failed
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-2xx answer. PostgREST reports missing tables as 404 and
    /// permission problems as 401/403, with a JSON body explaining which.
    #[error("HTTP {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Anything that can hand back the rows of a named table
pub trait TableSource {
    fn fetch(&self, table: &str, limit: Option<usize>) -> impl Future<Output = Result<Vec<Row>, FetchError>>;
}

// =============================================================================
// Supabase Client
// =============================================================================

pub struct SupabaseClient {
    client: reqwest::Client,
    /// `{project_url}/rest/v1`
    rest_url: String,
    anon_key: String,
}

impl SupabaseClient {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            rest_url: format!("{}{}", config.supabase_url, constants::REST_API_PATH),
            anon_key: config.anon_key.clone(),
        })
    }

    fn table_url(&self, table: &str, limit: Option<usize>) -> String {
        match limit {
            Some(limit) => format!("{}/{}?select=*&limit={}", self.rest_url, table, limit),
            None => format!("{}/{}?select=*", self.rest_url, table),
        }
    }
}

impl TableSource for SupabaseClient {
    async fn fetch(&self, table: &str, limit: Option<usize>) -> Result<Vec<Row>, FetchError> {
        let url = self.table_url(table, limit);
        tracing::debug!(table, ?limit, "querying Supabase");

        let response = self
            .client
            .get(&url)
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(FetchError::Status { status, body });
        }

        let rows: Vec<Row> = serde_json::from_str(&body)?;
        tracing::debug!(table, rows = rows.len(), "fetched");

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColumnCandidates;
    use std::time::Duration;

    fn config(url: &str, request_timeout: Duration) -> Config {
        Config {
            supabase_url: url.to_string(),
            anon_key: "key".to_string(),
            request_timeout,
            cache_ttl: Duration::from_secs(30),
            columns: ColumnCandidates::default(),
        }
    }

    fn client() -> SupabaseClient {
        SupabaseClient::new(&config("https://abc.supabase.co", Duration::from_secs(30))).unwrap()
    }

    #[test]
    fn test_table_url() {
        let client = client();
        assert_eq!(
            client.table_url("members", None),
            "https://abc.supabase.co/rest/v1/members?select=*"
        );
        assert_eq!(
            client.table_url("history", Some(200)),
            "https://abc.supabase.co/rest/v1/history?select=*&limit=200"
        );
    }

    #[test]
    fn test_status_error_message() {
        let err = FetchError::Status {
            status: reqwest::StatusCode::NOT_FOUND,
            body: "relation does not exist".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 404 Not Found: relation does not exist");
    }

    #[tokio::test]
    async fn test_stalled_read_times_out() {
        // Accepts connections and never answers
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let client = SupabaseClient::new(&config(&format!("http://{}", addr), Duration::from_millis(200))).unwrap();
        let result = tokio::time::timeout(Duration::from_secs(5), client.fetch("members", None))
            .await
            .expect("fetch should give up on its own");

        match result {
            Err(FetchError::Request(err)) => assert!(err.is_timeout(), "{}", err),
            other => panic!("expected a timeout, got {:?}", other),
        }
    }
}
